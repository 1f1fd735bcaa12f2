use crate::domain::model::{Sector, TrayCandidate, TrayType};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Constraints passed to the catalog. Width and height are omitted for multi-layer sizing.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub tray_type: TrayType,
    pub min_load_capacity_kg_m: f64,
    pub min_width_mm: Option<f64>,
    pub min_height_mm: Option<f64>,
}

impl CatalogQuery {
    pub fn by_load(tray_type: TrayType, min_load_capacity_kg_m: f64) -> Self {
        Self {
            tray_type,
            min_load_capacity_kg_m,
            min_width_mm: None,
            min_height_mm: None,
        }
    }

    pub fn with_dimensions(mut self, min_width_mm: f64, min_height_mm: f64) -> Self {
        self.min_width_mm = Some(min_width_mm);
        self.min_height_mm = Some(min_height_mm);
        self
    }

    pub fn matches(&self, tray: &TrayCandidate) -> bool {
        tray.active
            && tray.tray_type == self.tray_type
            && tray.load_capacity_kg_m >= self.min_load_capacity_kg_m
            && self.min_width_mm.map_or(true, |w| tray.width_mm >= w)
            && self.min_height_mm.map_or(true, |h| tray.height_mm >= h)
    }
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Active trays satisfying `query`. Timeouts and retries belong to the implementation.
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<TrayCandidate>>;
}

pub trait SectorStore: Send + Sync {
    fn read(&self, sector_id: &str) -> impl std::future::Future<Output = Result<Sector>> + Send;

    /// Persists `sector` only if the stored copy is still at `expected_version`.
    fn write(
        &self,
        sector: Sector,
        expected_version: u64,
    ) -> impl std::future::Future<Output = Result<u64>> + Send;
}
