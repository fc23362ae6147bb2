// Simulator configuration
//
// Loads and saves the display, stream and overlay settings as TOML.

use crate::display::{MAX_SCALE, MIN_SCALE};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Default configuration file path
pub const CONFIG_FILE: &str = "ips_sim.toml";

/// Errors that can occur while loading or saving the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML for this configuration
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be written as TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The values are out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Simulator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Display settings
    pub display: DisplayConfig,

    /// Frame stream settings
    pub stream: StreamConfig,

    /// Debug overlay settings
    pub overlay: OverlayConfig,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Window title prefix
    pub title: String,

    /// Window scale (1-8)
    pub scale: u32,

    /// Present into memory instead of a window
    pub headless: bool,
}

/// Frame stream configuration
///
/// Both ends of the stream must agree on the frame size; it is not sent
/// in-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Frame width in pixels
    pub width: usize,

    /// Frame height in pixels
    pub height: usize,
}

/// Overlay configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Mark the frame center with a crosshair
    pub crosshair: bool,

    /// Crosshair arm length in pixels
    pub arm: u32,

    /// Crosshair color (RGB565)
    pub color: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "IPS Simulator".to_string(),
            scale: 2,
            headless: false,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        // MT9V03X camera geometry
        Self {
            width: 188,
            height: 120,
        }
    }
}

impl StreamConfig {
    /// Bytes per frame
    pub fn frame_size(&self) -> usize {
        self.width * self.height
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            crosshair: false,
            arm: 5,
            color: 0xF800,
        }
    }
}

impl SimulatorConfig {
    /// Set the display scale, clamped to 1x..8x
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.display.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self
    }

    /// Set the frame dimensions
    pub fn with_frame_size(mut self, width: usize, height: usize) -> Self {
        self.stream.width = width;
        self.stream.height = height;
        self
    }

    /// Check that the values can drive a simulator
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.width == 0 || self.stream.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "frame size must be positive, got {}x{}",
                self.stream.width, self.stream.height
            )));
        }
        if self.stream.width.checked_mul(self.stream.height).is_none() {
            return Err(ConfigError::Invalid(format!(
                "frame size {}x{} is too large",
                self.stream.width, self.stream.height
            )));
        }
        if !(MIN_SCALE..=MAX_SCALE).contains(&self.display.scale) {
            return Err(ConfigError::Invalid(format!(
                "scale must be between {} and {}, got {}",
                MIN_SCALE, MAX_SCALE, self.display.scale
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    ///
    /// Missing keys take their default values.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: SimulatorConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Load configuration from file, or fall back to defaults
    ///
    /// When the file is missing it is created with the default values.
    /// An unreadable or invalid file is reported and left untouched.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                let config = Self::default();
                // Try to save the default config, but don't fail if we can't
                if let Err(e) = config.save_to_file(path) {
                    warn!(
                        "Could not write default config to {}: {}",
                        path.display(),
                        e
                    );
                }
                config
            }
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
