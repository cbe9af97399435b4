//! Field configuration.
//!
//! Every tunable of the effect lives in [`FieldConfig`]. Defaults reproduce the
//! hover-card look: one particle per 11000 square pixels, a cyan accent at 80%
//! alpha, links up to 100 px, and a 300 ms grace period before the surface is
//! wiped after the pointer leaves.
//!
//! Configs serialize to JSON so hosts can ship presets:
//!
//! ```ignore
//! let config = FieldConfig::load("card.json")?;
//! let engine = Engine::new(surface, scheduler, config);
//! ```

use crate::error::ConfigError;
use glam::Vec4;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Surface area (square pixels) per spawned particle.
pub const DENSITY_DIVISOR: u32 = 11_000;

/// Maximum distance at which two particles are linked.
pub const CONNECT_RADIUS: f32 = 100.0;

/// Delay between `stop()` and the final wipe of the surface.
pub const CLEAR_DELAY_MS: u64 = 300;

/// Complete field configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Surface area per particle. Larger values give sparser fields.
    pub density_divisor: u32,
    /// Connection threshold in pixels.
    pub connect_radius: f32,
    /// Per-axis speed bound; each velocity component is drawn from `[-max_speed, max_speed)`.
    pub max_speed: f32,
    /// Smallest particle radius.
    pub min_radius: f32,
    /// Largest particle radius (exclusive).
    pub max_radius: f32,
    /// Accent color shared by particles and connection lines, as 8-bit RGB.
    pub color: [u8; 3],
    /// Particle alpha. Connection alpha is derived from distance instead.
    pub alpha: f32,
    /// Stroke width of connection lines.
    pub line_width: f32,
    /// Grace period before the surface is cleared after stopping.
    pub clear_delay_ms: u64,
    /// Fixed RNG seed for reproducible populations. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            density_divisor: DENSITY_DIVISOR,
            connect_radius: CONNECT_RADIUS,
            max_speed: 0.2,
            min_radius: 1.0,
            max_radius: 2.5,
            color: [107, 235, 244],
            alpha: 0.8,
            line_width: 1.0,
            clear_delay_ms: CLEAR_DELAY_MS,
            seed: None,
        }
    }
}

impl FieldConfig {
    /// Create a config with the default hover-card look.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the area-per-particle divisor.
    pub fn with_density_divisor(mut self, divisor: u32) -> Self {
        self.density_divisor = divisor;
        self
    }

    /// Set the connection threshold.
    pub fn with_connect_radius(mut self, radius: f32) -> Self {
        self.connect_radius = radius;
        self
    }

    /// Set the per-axis speed bound.
    pub fn with_max_speed(mut self, speed: f32) -> Self {
        self.max_speed = speed;
        self
    }

    /// Set the particle radius range.
    pub fn with_radius_range(mut self, min: f32, max: f32) -> Self {
        self.min_radius = min;
        self.max_radius = max;
        self
    }

    /// Set the accent color and particle alpha.
    pub fn with_color(mut self, rgb: [u8; 3], alpha: f32) -> Self {
        self.color = rgb;
        self.alpha = alpha;
        self
    }

    /// Set the connection stroke width.
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Set the grace period before the post-stop clear.
    pub fn with_clear_delay(mut self, delay: Duration) -> Self {
        self.clear_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Particle color as straight RGBA in `0.0..=1.0`.
    pub fn particle_color(&self) -> Vec4 {
        self.accent(self.alpha)
    }

    /// The accent hue with an explicit alpha.
    pub fn accent(&self, alpha: f32) -> Vec4 {
        let [r, g, b] = self.color;
        Vec4::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            alpha,
        )
    }

    /// Grace period as a `Duration`.
    #[inline]
    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.density_divisor == 0 {
            return Err(ConfigError::invalid("density_divisor", "must be at least 1"));
        }
        if !(self.connect_radius.is_finite() && self.connect_radius > 0.0) {
            return Err(ConfigError::invalid(
                "connect_radius",
                format!("must be a positive number, got {}", self.connect_radius),
            ));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(ConfigError::invalid(
                "max_speed",
                format!("must be zero or positive, got {}", self.max_speed),
            ));
        }
        if !(self.min_radius.is_finite() && self.min_radius > 0.0) {
            return Err(ConfigError::invalid(
                "min_radius",
                format!("must be a positive number, got {}", self.min_radius),
            ));
        }
        if !(self.max_radius.is_finite() && self.max_radius >= self.min_radius) {
            return Err(ConfigError::invalid(
                "max_radius",
                format!(
                    "must be at least min_radius ({}), got {}",
                    self.min_radius, self.max_radius
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(ConfigError::invalid(
                "alpha",
                format!("must be within 0.0..=1.0, got {}", self.alpha),
            ));
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(ConfigError::invalid(
                "line_width",
                format!("must be a positive number, got {}", self.line_width),
            ));
        }
        Ok(())
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
