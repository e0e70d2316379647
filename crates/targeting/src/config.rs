//! Runtime configuration

use serde::{Deserialize, Serialize};

/// Targeting policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether AXIS_UPDATE events retarget under the cursor (hover
    /// scroll) or stay pinned to the button-down window
    pub hover_scroll: bool,

    /// Global anti-mistake observer: when set, ANTI_MISTAKE_TOUCH windows
    /// swallow finger input and pass pen input through
    pub anti_mistake_observer: bool,

    /// Contact long-axis threshold (device units) above which a DOWN that
    /// immediately follows a CANCEL on the same pointer is dropped as a
    /// sensor duplicate
    pub touch_long_axis_threshold: i32,

    /// Default edge thickness (pixels) when a window publishes
    /// pointer-change areas with zero entries for an edge it still wants
    pub default_pointer_change_thickness: i32,

    /// Swallow the DOWN of a touch on a navigation window while a back
    /// gesture is being recognized
    pub back_gesture_exclusion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hover_scroll: true,
            anti_mistake_observer: false,
            touch_long_axis_threshold: 120,
            default_pointer_change_thickness: 0,
            back_gesture_exclusion: true,
        }
    }
}

impl Config {
    /// Parse from TOML, falling back to defaults for absent keys.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
