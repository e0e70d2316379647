//! Device-to-display binding
//!
//! Multi-display setups can pin a touch device to one display so its
//! coordinates are always interpreted in that display's space. Unbound
//! devices fall back to the event's own display id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::WindowCatalog;
use crate::errors::TargetingError;
use crate::types::{DeviceId, DisplayId};

/// One row of the bind table, as reported to administrative callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayBindInfo {
    pub device_id: DeviceId,
    pub display_id: DisplayId,
    /// Stable name of the bound display at bind time.
    pub display_name: String,
}

/// Device-to-display bindings, keyed by device id.
#[derive(Debug, Default)]
pub struct DisplayBindTable {
    binds: BTreeMap<DeviceId, DisplayBindInfo>,
}

impl DisplayBindTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a device to a display. Rejects negative ids and displays
    /// absent from the catalog; rebinding an already-bound device is
    /// allowed and replaces the old row.
    pub fn set_display_bind(
        &mut self,
        catalog: &WindowCatalog,
        device_id: DeviceId,
        display_id: DisplayId,
    ) -> Result<(), TargetingError> {
        if device_id < 0 {
            return Err(TargetingError::InvalidDeviceId(device_id));
        }
        let display = catalog
            .physical_display(display_id)
            .ok_or(TargetingError::NoSuchDisplay(display_id))?;
        let info = DisplayBindInfo {
            device_id,
            display_id,
            display_name: display.unique_name.clone(),
        };
        tracing::info!(device = device_id, display = display_id, "display bind set");
        self.binds.insert(device_id, info);
        Ok(())
    }

    /// Remove a device's binding. Unbinding an unbound device is a no-op.
    pub fn clear_display_bind(&mut self, device_id: DeviceId) {
        self.binds.remove(&device_id);
    }

    /// The display a device is bound to, if any.
    pub fn bound_display(&self, device_id: DeviceId) -> Option<DisplayId> {
        self.binds.get(&device_id).map(|b| b.display_id)
    }

    /// Full bind rows for diagnostics, ordered by device id.
    pub fn get_display_bind_info(&self) -> Vec<DisplayBindInfo> {
        self.binds.values().cloned().collect()
    }

    /// Drop bindings that point at displays no longer in the catalog.
    pub fn prune_removed_displays(&mut self, removed: &[DisplayId]) {
        self.binds.retain(|_, b| !removed.contains(&b.display_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DisplayGroupInfo, DisplayInfo};

    fn catalog_with_display(id: DisplayId, name: &str) -> WindowCatalog {
        let mut catalog = WindowCatalog::new();
        catalog.replace_group(DisplayGroupInfo {
            displays: vec![DisplayInfo {
                id,
                unique_name: name.into(),
                ..Default::default()
            }],
            ..Default::default()
        });
        catalog
    }

    #[test]
    fn bind_and_lookup() {
        let catalog = catalog_with_display(2, "hdmi-1");
        let mut table = DisplayBindTable::new();
        table.set_display_bind(&catalog, 7, 2).unwrap();
        assert_eq!(table.bound_display(7), Some(2));
        assert_eq!(table.bound_display(8), None);
        let rows = table.get_display_bind_info();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].display_name, "hdmi-1");
    }

    #[test]
    fn rebind_replaces_existing_row() {
        let mut catalog = catalog_with_display(2, "hdmi-1");
        catalog.apply_incremental(DisplayGroupInfo {
            displays: vec![
                DisplayInfo { id: 2, unique_name: "hdmi-1".into(), ..Default::default() },
                DisplayInfo { id: 3, unique_name: "dp-1".into(), ..Default::default() },
            ],
            ..Default::default()
        });
        let mut table = DisplayBindTable::new();
        table.set_display_bind(&catalog, 7, 2).unwrap();
        table.set_display_bind(&catalog, 7, 3).unwrap();
        assert_eq!(table.bound_display(7), Some(3));
        assert_eq!(table.get_display_bind_info().len(), 1);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let catalog = catalog_with_display(2, "hdmi-1");
        let mut table = DisplayBindTable::new();
        assert_eq!(
            table.set_display_bind(&catalog, -1, 2),
            Err(TargetingError::InvalidDeviceId(-1))
        );
        assert_eq!(
            table.set_display_bind(&catalog, 7, 9),
            Err(TargetingError::NoSuchDisplay(9))
        );
        assert!(table.get_display_bind_info().is_empty());
    }

    #[test]
    fn pruning_drops_stale_bindings() {
        let catalog = catalog_with_display(2, "hdmi-1");
        let mut table = DisplayBindTable::new();
        table.set_display_bind(&catalog, 7, 2).unwrap();
        table.prune_removed_displays(&[2]);
        assert_eq!(table.bound_display(7), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut table = DisplayBindTable::new();
        table.clear_display_bind(5);
        let catalog = catalog_with_display(0, "built-in");
        table.set_display_bind(&catalog, 5, 0).unwrap();
        table.clear_display_bind(5);
        table.clear_display_bind(5);
        assert_eq!(table.bound_display(5), None);
    }
}
