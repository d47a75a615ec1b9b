//! Editor configuration.

use crate::error::ConfigError;
use crate::shapes::{PenStyle, SerializableColor};
use crate::snap::{GROUP_GRID_SIZE, SnapMode};
use serde::{Deserialize, Serialize};

/// Default number of undo steps kept.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Settings consumed by the scene, the history and the editor state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Pointer snapping step.
    pub grid_step: f64,
    /// Grid used for group mount points and link label geometry.
    pub group_grid: f64,
    /// Whether pointer coordinates snap to the grid.
    pub snap_mode: SnapMode,
    /// Hit-test slack around thin shapes such as lines.
    pub hit_tolerance: f64,
    /// Maximum number of undo steps.
    pub max_history: usize,
    /// Edge length of one addressing zone on a sheet.
    pub zone_size: f64,
    /// Sheet number used in link addresses.
    pub sheet: u32,
    /// Color for newly drawn items.
    pub color: SerializableColor,
    /// Thickness for newly drawn items.
    pub thickness: u32,
    /// Pen style for newly drawn items.
    pub pen_style: PenStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_step: 10.0,
            group_grid: GROUP_GRID_SIZE,
            snap_mode: SnapMode::Grid,
            hit_tolerance: 3.0,
            max_history: DEFAULT_MAX_HISTORY,
            zone_size: 200.0,
            sheet: 1,
            color: SerializableColor::black(),
            thickness: 1,
            pen_style: PenStyle::Solid,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the editor cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_step.is_nan() || self.grid_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "grid_step must be positive, got {}",
                self.grid_step
            )));
        }
        if self.group_grid.is_nan() || self.group_grid <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "group_grid must be positive, got {}",
                self.group_grid
            )));
        }
        if self.max_history == 0 {
            return Err(ConfigError::Invalid("max_history must be at least 1".to_string()));
        }
        if self.zone_size.is_nan() || self.zone_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zone_size must be positive, got {}",
                self.zone_size
            )));
        }
        Ok(())
    }
}
