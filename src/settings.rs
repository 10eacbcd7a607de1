//! Simulation tuning and presentation toggles
//!
//! Loaded from JSON; any missing field falls back to its default.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::RecordError;

/// Shader programs tried, in order, when an element names none
pub const DEFAULT_SHADERS: [&str; 2] = ["basic", "main"];

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Presentation ===
    /// Load the puzzle outline entry
    pub outline_enabled: bool,
    /// Load sky entries
    pub sky_enabled: bool,
    /// Shader programs the host has registered
    pub shaders: Vec<String>,

    // === Orientation ===
    /// Seconds for a discrete 90° turn
    pub turn_duration: f32,
    /// Per-tick rotation cap while snapping to the nearest axis (radians)
    pub max_snap_angle: f32,

    // === Travel ===
    /// Drop gravity (units/s²)
    pub drop_acceleration: f32,
    /// Launch gravity (units/s²)
    pub launch_acceleration: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            outline_enabled: true,
            sky_enabled: true,
            shaders: DEFAULT_SHADERS.iter().map(|s| s.to_string()).collect(),

            turn_duration: TURN_DURATION,
            max_snap_angle: MAX_SNAP_ANGLE,

            drop_acceleration: DROP_ACCELERATION,
            launch_acceleration: LAUNCH_ACCELERATION,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    /// Parse settings from a JSON reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RecordError> {
        let settings: Self = serde_json::from_reader(reader)?;
        Ok(settings.validated())
    }

    /// Replace tuning values that would stall an animation with defaults.
    /// A zero turn duration is allowed and turns instantly.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        fix(&mut self.turn_duration, defaults.turn_duration, "turn_duration", |v| v >= 0.0);
        fix(&mut self.max_snap_angle, defaults.max_snap_angle, "max_snap_angle", |v| v > 0.0);
        fix(
            &mut self.drop_acceleration,
            defaults.drop_acceleration,
            "drop_acceleration",
            |v| v > 0.0,
        );
        fix(
            &mut self.launch_acceleration,
            defaults.launch_acceleration,
            "launch_acceleration",
            |v| v > 0.0,
        );
        self
    }

    /// First registered shader out of [`DEFAULT_SHADERS`]
    pub fn default_shader(&self) -> Option<&str> {
        let found = DEFAULT_SHADERS
            .iter()
            .copied()
            .find(|name| self.shaders.iter().any(|s| s == name));
        if found.is_none() {
            log::warn!("Default shader not found among {:?}", self.shaders);
        }
        found
    }

    /// Resolve an element's shader, falling back to the default
    pub fn resolve_shader(&self, shader: &str) -> String {
        if shader.is_empty() {
            self.default_shader().unwrap_or_default().to_string()
        } else {
            shader.to_string()
        }
    }
}

fn fix(value: &mut f32, default: f32, name: &str, valid: impl Fn(f32) -> bool) {
    if !value.is_finite() || !valid(*value) {
        log::warn!("Setting {name} = {value} is invalid, using {default}");
        *value = default;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"sky_enabled": false, "turn_duration": 0.5}"#).unwrap();
        assert!(!settings.sky_enabled);
        assert!(settings.outline_enabled);
        assert_eq!(settings.turn_duration, 0.5);
        assert_eq!(settings.drop_acceleration, DROP_ACCELERATION);
    }

    #[test]
    fn test_default_shader_prefers_basic() {
        let settings = Settings::default();
        assert_eq!(settings.default_shader(), Some("basic"));

        let settings = Settings {
            shaders: vec!["main".to_string(), "basic".to_string()],
            ..Default::default()
        };
        assert_eq!(settings.default_shader(), Some("basic"));

        let settings = Settings {
            shaders: vec!["main".to_string()],
            ..Default::default()
        };
        assert_eq!(settings.resolve_shader(""), "main");
        assert_eq!(settings.resolve_shader("glow"), "glow");
    }

    #[test]
    fn test_missing_default_shader_resolves_empty() {
        let settings = Settings {
            shaders: Vec::new(),
            ..Default::default()
        };
        assert_eq!(settings.default_shader(), None);
        assert_eq!(settings.resolve_shader(""), "");
    }

    #[test]
    fn test_stalling_values_fall_back_to_defaults() {
        let json = r#"{"max_snap_angle": 0.0, "turn_duration": -1.0, "drop_acceleration": 0.0, "launch_acceleration": -3.0}"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.max_snap_angle, MAX_SNAP_ANGLE);
        assert_eq!(settings.turn_duration, TURN_DURATION);
        assert_eq!(settings.drop_acceleration, DROP_ACCELERATION);
        assert_eq!(settings.launch_acceleration, LAUNCH_ACCELERATION);
    }

    #[test]
    fn test_zero_turn_duration_is_kept() {
        let settings = Settings::from_reader(r#"{"turn_duration": 0.0}"#.as_bytes()).unwrap();
        assert_eq!(settings.turn_duration, 0.0);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(Settings::from_json("{"), Err(RecordError::Json(_))));
    }
}
