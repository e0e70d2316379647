#![no_main]
//! Fuzz target for scene snapshots and hit-test queries
//!
//! Parses random bytes as a JSON display-group snapshot; when parsing
//! succeeds, publishes it to a catalog and sweeps hit tests across a
//! coordinate grid including negative and extreme values. Neither the
//! parse nor any query may panic or wrap into a bogus hit.

use libfuzzer_sys::fuzz_target;

use targeting::types::DisplayGroupInfo;
use targeting::WindowCatalog;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else { return };
    let Ok(group) = serde_json::from_str::<DisplayGroupInfo>(s) else { return };

    let mut catalog = WindowCatalog::new();
    catalog.replace_group(group);

    let probes = [0, 1, -1, 100, -100, i32::MAX, i32::MIN, i32::MAX - 1];
    for &x in &probes {
        for &y in &probes {
            let hits = catalog.windows_at(x, y, None);
            if x < 0 || y < 0 {
                assert!(hits.is_empty());
            }
            let _ = catalog.window_at(x, y, Some(0));
        }
    }
});
