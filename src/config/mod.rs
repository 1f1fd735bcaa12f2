#[cfg(feature = "cli")]
pub mod cli;
pub mod sector_file;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{validate_positive, validate_range, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WEIGHT_SAFETY_FACTOR: f64 = 1.2;
pub const DEFAULT_DIMENSION_SAFETY_FACTOR: f64 = 1.1;
pub const DEFAULT_LADDER_HEIGHT_REDUCTION_MM: f64 = 15.0;

/// Safety constants applied by the sizing engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingFactors {
    /// Multiplier on the raw cable load before filtering by tray capacity.
    pub weight_safety_factor: f64,
    /// Multiplier on required width and area, applied before the reserve.
    pub dimension_safety_factor: f64,
    /// Height lost to ladder rails, only considered for multi-layer sizing.
    pub ladder_height_reduction_mm: f64,
}

impl Default for SizingFactors {
    fn default() -> Self {
        Self {
            weight_safety_factor: DEFAULT_WEIGHT_SAFETY_FACTOR,
            dimension_safety_factor: DEFAULT_DIMENSION_SAFETY_FACTOR,
            ladder_height_reduction_mm: DEFAULT_LADDER_HEIGHT_REDUCTION_MM,
        }
    }
}

impl Validate for SizingFactors {
    fn validate(&self) -> Result<()> {
        validate_positive("factors.weight_safety_factor", self.weight_safety_factor)?;
        validate_positive("factors.dimension_safety_factor", self.dimension_safety_factor)?;
        validate_range(
            "factors.ladder_height_reduction_mm",
            self.ladder_height_reduction_mm,
            0.0,
            f64::MAX,
        )
    }
}
