//! Configuration for the particle field and its window.
//!
//! Every value has a default matching the stock background, so a JSON file
//! only needs to name the fields it overrides:
//!
//! ```json
//! {
//!     "field": { "node_count": 120, "connect_distance": 100.0 },
//!     "window": { "title": "backdrop" }
//! }
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::segments::MAX_CAPACITY;

/// Largest field a configuration may ask for.
pub const MAX_NODE_COUNT: usize = 1 << 16;

/// Point-size pulse: `base + sin(time * frequency) * amplitude`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub base: f32,
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            base: 3.5,
            amplitude: 0.8,
            frequency: 1.2,
        }
    }
}

impl PulseConfig {
    /// Point size at the given value of the field's time accumulator.
    #[inline]
    pub fn size_at(&self, time: f32) -> f32 {
        self.base + (time * self.frequency).sin() * self.amplitude
    }
}

/// Tunables of the particle field. All per-frame quantities are expressed
/// for one display refresh (`dt = 1.0`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of nodes. Fixed for the lifetime of a field.
    pub node_count: usize,
    /// Half extents of the bounding box.
    pub bounds: Vec3,
    /// Maximum 3D distance for two nodes to be linked.
    pub connect_distance: f32,
    /// Hard cap on links drawn per frame.
    pub max_segments: usize,
    /// Planar distance within which the pointer pushes nodes away.
    pub repulsion_radius: f32,
    /// Impulse scale at zero distance.
    pub repulsion_strength: f32,
    /// Distances at or below this skip repulsion (no direction to push in).
    pub repulsion_epsilon: f32,
    /// Velocity multiplier per frame.
    pub damping: f32,
    /// Full width of the initial velocity range per axis.
    pub initial_speed: Vec3,
    /// Time accumulator increment per frame.
    pub time_step: f32,
    pub pulse: PulseConfig,
    /// Scene rotation around the vertical axis per frame, in radians.
    pub rotation_speed: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            node_count: 72,
            bounds: Vec3::new(420.0, 260.0, 180.0),
            connect_distance: 130.0,
            max_segments: 250,
            repulsion_radius: 90.0,
            repulsion_strength: 0.6,
            repulsion_epsilon: 0.01,
            damping: 0.97,
            initial_speed: Vec3::new(0.25, 0.25, 0.12),
            time_step: 0.008,
            pulse: PulseConfig::default(),
            rotation_speed: 0.0008,
        }
    }
}

impl FieldConfig {
    /// Set the number of nodes.
    pub fn with_node_count(mut self, count: usize) -> Self {
        self.node_count = count;
        self
    }

    /// Set the bounding box half extents.
    pub fn with_bounds(mut self, bounds: Vec3) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the link distance.
    pub fn with_connect_distance(mut self, distance: f32) -> Self {
        self.connect_distance = distance;
        self
    }

    /// Set the per-frame link cap.
    pub fn with_max_segments(mut self, max: usize) -> Self {
        self.max_segments = max;
        self
    }

    /// Set the pointer repulsion radius and strength.
    pub fn with_repulsion(mut self, radius: f32, strength: f32) -> Self {
        self.repulsion_radius = radius;
        self.repulsion_strength = strength;
        self
    }

    /// Set the per-frame damping factor.
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Check that every value is usable by the simulator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_count > MAX_NODE_COUNT {
            return Err(ConfigError::Invalid(format!(
                "node_count must be at most {}, got {}",
                MAX_NODE_COUNT, self.node_count
            )));
        }
        if self.max_segments > MAX_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "max_segments must be at most {}, got {}",
                MAX_CAPACITY, self.max_segments
            )));
        }

        let b = self.bounds;
        if !(b.x > 0.0 && b.y > 0.0 && b.z > 0.0) || !b.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "bounds must be positive and finite, got {:?}",
                b
            )));
        }
        if !(self.repulsion_radius > 0.0) || !self.repulsion_radius.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "repulsion_radius must be positive and finite, got {}",
                self.repulsion_radius
            )));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "damping must be in (0, 1], got {}",
                self.damping
            )));
        }
        if !(self.initial_speed.min_element() >= 0.0) || !self.initial_speed.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "initial_speed must be non-negative and finite, got {:?}",
                self.initial_speed
            )));
        }

        non_negative("connect_distance", self.connect_distance)?;
        non_negative("repulsion_strength", self.repulsion_strength)?;
        non_negative("repulsion_epsilon", self.repulsion_epsilon)?;
        finite("time_step", self.time_step)?;
        finite("rotation_speed", self.rotation_speed)?;
        finite("pulse.base", self.pulse.base)?;
        finite("pulse.amplitude", self.pulse.amplitude)?;
        finite("pulse.frequency", self.pulse.frequency)?;
        Ok(())
    }
}

/// Rejects NaN and infinities (JSON numbers past `f32::MAX` parse as `inf`).
fn finite(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::Invalid(format!(
            "{} must not be negative, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Window the binary opens for the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Let the desktop show through everything except nodes and links.
    pub transparent: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "plexus".into(),
            width: 1280,
            height: 720,
            transparent: true,
        }
    }
}

fn default_theme_file() -> PathBuf {
    PathBuf::from("plexus-theme.json")
}

/// Complete runner configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub field: FieldConfig,
    #[serde(default)]
    pub window: WindowConfig,
    /// Where the light/dark preference is persisted.
    #[serde(default = "default_theme_file")]
    pub theme_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            window: WindowConfig::default(),
            theme_file: default_theme_file(),
        }
    }
}

impl Config {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_background() {
        let config = FieldConfig::default();
        assert_eq!(config.node_count, 72);
        assert_eq!(config.max_segments, 250);
        assert_eq!(config.bounds, Vec3::new(420.0, 260.0, 180.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = Config::from_json(r#"{ "field": { "node_count": 10 } }"#).unwrap();
        assert_eq!(config.field.node_count, 10);
        assert_eq!(config.field.connect_distance, 130.0);
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.theme_file, PathBuf::from("plexus-theme.json"));
    }

    #[test]
    fn test_bounds_parse_as_array() {
        let config =
            Config::from_json(r#"{ "field": { "bounds": [100.0, 50.0, 25.0] } }"#).unwrap();
        assert_eq!(config.field.bounds, Vec3::new(100.0, 50.0, 25.0));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("plexus-config-{}.json", std::process::id()));
        let config = Config {
            field: FieldConfig::default().with_node_count(40).with_max_segments(12),
            ..Config::default()
        };
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let zero_radius = FieldConfig::default().with_repulsion(0.0, 0.6);
        assert!(matches!(zero_radius.validate(), Err(ConfigError::Invalid(_))));

        let flat = FieldConfig::default().with_bounds(Vec3::new(1.0, 0.0, 1.0));
        assert!(flat.validate().is_err());

        let runaway = FieldConfig::default().with_damping(1.5);
        assert!(runaway.validate().is_err());

        let crowd = FieldConfig::default().with_node_count(MAX_NODE_COUNT + 1);
        assert!(matches!(crowd.validate(), Err(ConfigError::Invalid(_))));
        assert!(FieldConfig::default()
            .with_node_count(MAX_NODE_COUNT)
            .validate()
            .is_ok());

        let too_many_links = FieldConfig::default().with_max_segments(MAX_CAPACITY + 1);
        assert!(matches!(too_many_links.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            Config::from_json(r#"{ "field": { "max_segments": 18446744073709551615 } }"#),
            Err(ConfigError::Invalid(_))
        ));

        assert!(matches!(
            Config::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_and_negative_tuning() {
        let cases: [(&str, fn(&mut FieldConfig)); 10] = [
            ("repulsion_strength", |c| c.repulsion_strength = f32::INFINITY),
            ("repulsion_strength", |c| c.repulsion_strength = -0.6),
            ("repulsion_epsilon", |c| c.repulsion_epsilon = f32::NAN),
            ("repulsion_epsilon", |c| c.repulsion_epsilon = -0.01),
            ("time_step", |c| c.time_step = f32::INFINITY),
            ("rotation_speed", |c| c.rotation_speed = f32::NEG_INFINITY),
            ("pulse.base", |c| c.pulse.base = f32::NAN),
            ("pulse.amplitude", |c| c.pulse.amplitude = f32::INFINITY),
            ("pulse.frequency", |c| c.pulse.frequency = f32::NAN),
            ("initial_speed", |c| c.initial_speed.x = f32::INFINITY),
        ];

        for (name, corrupt) in cases {
            let mut config = FieldConfig::default();
            corrupt(&mut config);
            match config.validate() {
                Err(ConfigError::Invalid(msg)) => assert!(msg.starts_with(name), "{msg}"),
                other => panic!("{name}: expected Invalid, got {other:?}"),
            }
        }

        // Out of f32 range in JSON becomes infinity
        assert!(matches!(
            Config::from_json(r#"{ "field": { "repulsion_strength": 1e39 } }"#),
            Err(ConfigError::Invalid(_))
        ));

        // Negative rotation (spin the other way) is fine
        let mut reversed = FieldConfig::default();
        reversed.rotation_speed = -0.0008;
        assert!(reversed.validate().is_ok());
    }

    #[test]
    fn test_pulse_size() {
        let pulse = PulseConfig::default();
        assert_eq!(pulse.size_at(0.0), 3.5);
        let peak = pulse.size_at(std::f32::consts::FRAC_PI_2 / 1.2);
        assert!((peak - 4.3).abs() < 1e-4);
    }
}
