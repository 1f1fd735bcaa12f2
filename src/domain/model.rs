use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_RESERVE_PERCENTAGE: f64 = 30.0;
pub const GENERAL_SECTOR_NAME: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrayType {
    #[serde(alias = "escalerilla")]
    Ladder,
    #[serde(alias = "canal")]
    Channel,
}

impl TrayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrayType::Ladder => "ladder",
            TrayType::Channel => "channel",
        }
    }
}

impl fmt::Display for TrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallationLayout {
    #[serde(alias = "singleLayer")]
    SingleLayer,
    #[serde(alias = "multiLayer")]
    MultiLayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arrangement {
    #[default]
    #[serde(alias = "horizontal")]
    SideBySide,
    #[serde(alias = "clover", alias = "trefoil")]
    Bundled,
}

/// Reference data for one cable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableSpec {
    pub nominal_section_mm2: String,
    pub nominal_section_awg: String,
    pub external_diameter_mm: f64,
    pub external_area_mm2: f64,
    pub mass_per_length_kg_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableGroup {
    pub id: u32,
    pub spec: CableSpec,
    pub quantity: u32,
    #[serde(default)]
    pub arrangement: Arrangement,
}

/// A set of cables sharing one tray sizing configuration.
///
/// Fields are crate-private so every mutation goes through the methods in
/// `core::aggregate`, which keep `results` consistent with the inputs. Deserialization
/// goes through `SectorRecord` and is checked the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SectorRecord")]
pub struct Sector {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) tray_type: TrayType,
    pub(crate) reserve_percentage: f64,
    pub(crate) layout: InstallationLayout,
    pub(crate) groups: Vec<CableGroup>,
    pub(crate) results: Option<SizingResults>,
    pub(crate) version: u64,
    pub(crate) next_group_id: u32,
}

impl Sector {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tray_type(&self) -> TrayType {
        self.tray_type
    }

    pub fn reserve_percentage(&self) -> f64 {
        self.reserve_percentage
    }

    pub fn layout(&self) -> InstallationLayout {
        self.layout
    }

    pub fn groups(&self) -> &[CableGroup] {
        &self.groups
    }

    pub fn group(&self, group_id: u32) -> Option<&CableGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn results(&self) -> Option<&SizingResults> {
        self.results.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Unchecked serialized form of a `Sector`.
#[derive(Debug, Clone, Deserialize)]
pub struct SectorRecord {
    pub id: String,
    pub name: String,
    pub tray_type: TrayType,
    pub reserve_percentage: f64,
    pub layout: InstallationLayout,
    #[serde(default)]
    pub groups: Vec<CableGroup>,
    #[serde(default)]
    pub results: Option<SizingResults>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub next_group_id: u32,
}

/// Reference to a rendered project calculation report held by an external document service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationReport {
    pub file_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub company: String,
    pub location: String,
    pub(crate) sectors: Vec<Sector>,
    /// Cleared whenever a sector change could alter the reported figures.
    #[serde(default)]
    pub(crate) calculation_report: Option<CalculationReport>,
}

impl Project {
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn calculation_report(&self) -> Option<&CalculationReport> {
        self.calculation_report.as_ref()
    }
}

/// Catalog entry as supplied by the catalog collaborator.
///
/// The serialized form uses the catalog service's field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrayCandidate {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub tray_type: TrayType,
    pub category: String,
    #[serde(rename = "thickness")]
    pub thickness_mm: f64,
    #[serde(rename = "width")]
    pub width_mm: f64,
    #[serde(rename = "height")]
    pub height_mm: f64,
    #[serde(rename = "loadCapacity")]
    pub load_capacity_kg_m: f64,
    #[serde(rename = "isActive", alias = "active", default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalCategory {
    SuperLight,
    Light,
    SemiHeavy,
    Heavy,
    SuperHeavy,
    /// Label not found in the synonym table.
    Unmapped,
}

impl CanonicalCategory {
    /// Category used wherever a concrete weight class is required.
    pub fn effective(&self) -> CanonicalCategory {
        match self {
            CanonicalCategory::Unmapped => CanonicalCategory::Light,
            other => *other,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, CanonicalCategory::Unmapped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalCategory::SuperLight => "super-light",
            CanonicalCategory::Light => "light",
            CanonicalCategory::SemiHeavy => "semi-heavy",
            CanonicalCategory::Heavy => "heavy",
            CanonicalCategory::SuperHeavy => "super-heavy",
            CanonicalCategory::Unmapped => "unmapped",
        }
    }
}

impl fmt::Display for CanonicalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDetails {
    pub thickness_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub load_resistance_kg_m: f64,
}

/// Read-side copy of a catalog tray, detached from the catalog schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrayProjection {
    pub id: String,
    pub tray_type: TrayType,
    pub category: CanonicalCategory,
    pub technical_details: TechnicalDetails,
}

impl TrayProjection {
    pub fn load_capacity_kg_m(&self) -> f64 {
        self.technical_details.load_resistance_kg_m
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SizingWarning {
    UnmappedCategory { tray_id: String, label: String },
    NoClearArrangementMajority { side_by_side: usize, bundled: usize },
}

impl fmt::Display for SizingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizingWarning::UnmappedCategory { tray_id, label } => write!(
                f,
                "tray {} has unrecognised category '{}', treated as light",
                tray_id, label
            ),
            SizingWarning::NoClearArrangementMajority {
                side_by_side,
                bundled,
            } => write!(
                f,
                "no clear arrangement majority ({} side-by-side, {} bundled groups); sized as side-by-side",
                side_by_side, bundled
            ),
        }
    }
}

/// Outcome of one sizing run. `optimal == None` means no catalog tray fits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResults {
    pub optimal: Option<TrayProjection>,
    pub alternatives: Vec<TrayProjection>,
    pub calculated_load_kg_m: f64,
    pub calculated_area_mm2: f64,
    #[serde(default)]
    pub warnings: Vec<SizingWarning>,
    /// Sector version the inputs were read from.
    pub basis_version: u64,
}

impl SizingResults {
    pub fn has_suitable_tray(&self) -> bool {
        self.optimal.is_some()
    }
}
