//! Animation Settings
//!
//! Tunable defaults shared by animation controllers.
//!
//! Settings are plain data: construct them with struct-update syntax or load a
//! JSON override produced by the host's configuration layer. Missing fields
//! fall back to [`AnimationSettings::default`].
//!
//! ```rust,ignore
//! use armature::settings::AnimationSettings;
//!
//! let settings = AnimationSettings {
//!     default_fade_duration: 0.15,
//!     ..Default::default()
//! };
//!
//! let controller = AnimationController::with_settings(settings);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Defaults applied when an animation API is called without explicit values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Crossfade length used by [`AnimationController::cross_fade_default`](crate::animation::AnimationController::cross_fade_default).
    pub default_fade_duration: f32,
    /// Crossfade length of transitions added without an explicit duration.
    pub default_transition_duration: f32,
    /// Normalized exit time of transitions that enable `has_exit_time`.
    pub default_exit_time: f32,
    /// Tick rate assigned to freshly created clips.
    pub default_ticks_per_second: f32,
    /// Size of the bone array allocated by a new controller.
    pub default_bone_count: usize,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            default_fade_duration: 0.3,
            default_transition_duration: 0.3,
            default_exit_time: 0.9,
            default_ticks_per_second: 25.0,
            default_bone_count: 0,
        }
    }
}

impl AnimationSettings {
    /// Parses settings from a JSON document. Absent keys keep their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(source)?;
        log::debug!("Animation settings loaded: {settings:?}");
        Ok(settings)
    }

    /// Serializes the settings to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
