pub mod aggregate;
pub mod category;
pub mod geometry;
pub mod invalidation;
pub mod load;
pub mod selection;
pub mod sizing;

pub use crate::domain::model::{
    Arrangement, CableGroup, CableSpec, CalculationReport, CanonicalCategory, InstallationLayout,
    Project, Sector, SizingResults, SizingWarning, TrayCandidate, TrayProjection, TrayType,
};
pub use crate::domain::ports::{CatalogQuery, CatalogRepository, SectorStore};
pub use crate::utils::error::Result;
