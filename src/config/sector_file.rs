//! Sector description files consumed by the CLI.
//!
//! ```toml
//! id = "pump-room"
//! name = "Pump room"
//! tray_type = "ladder"
//! reserve_percentage = 30
//! layout = "single-layer"
//!
//! [[cables]]
//! quantity = 2
//! arrangement = "side-by-side"
//! spec = { nominal_section_mm2 = "10", nominal_section_awg = "8", external_diameter_mm = 10.0, external_area_mm2 = 78.5, mass_per_length_kg_m = 0.5 }
//! ```

use crate::domain::model::{
    Arrangement, CableSpec, InstallationLayout, Sector, TrayType, DEFAULT_RESERVE_PERCENTAGE,
};
use crate::utils::error::{Result, SizingError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorFile {
    pub id: Option<String>,
    pub name: String,
    pub tray_type: TrayType,
    #[serde(default = "default_reserve")]
    pub reserve_percentage: f64,
    pub layout: InstallationLayout,
    #[serde(default)]
    pub cables: Vec<CableEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CableEntry {
    pub spec: CableSpec,
    pub quantity: u32,
    #[serde(default)]
    pub arrangement: Arrangement,
}

fn default_reserve() -> f64 {
    DEFAULT_RESERVE_PERCENTAGE
}

impl SectorFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SizingError::ConfigValidationError {
            field: "sector_file".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Builds the sector through the validated mutation path.
    pub fn into_sector(self) -> Result<Sector> {
        let id = self.id.unwrap_or_else(|| slug(&self.name));
        let mut sector = Sector::new(
            id,
            self.name,
            self.tray_type,
            self.reserve_percentage,
            self.layout,
        )?;
        for cable in self.cables {
            sector.add_group(cable.spec, cable.quantity, cable.arrangement)?;
        }
        Ok(sector)
    }
}

fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
