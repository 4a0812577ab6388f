use serde::{Deserialize, Serialize};

/// Authoring defaults for [`StudioAnimationSystem`](crate::StudioAnimationSystem).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Edits to animated properties write keyframes instead of staging.
    pub auto_keyframe: bool,
    /// New tracks use ease-in/ease-out keyframes; otherwise linear.
    pub smooth_interpolation: bool,
    /// Live values closer than this to the evaluated value are not rekeyed.
    pub value_epsilon: f32,
    /// A keyframe within this distance of the target time is updated in place.
    pub time_epsilon: f32,
    pub default_ease_in: f32,
    pub default_ease_out: f32,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            auto_keyframe: false,
            smooth_interpolation: true,
            value_epsilon: 0.001,
            time_epsilon: 0.01,
            default_ease_in: 100.0,
            default_ease_out: 100.0,
        }
    }
}
