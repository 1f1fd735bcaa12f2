use crate::domain::model::Sector;
use crate::domain::ports::SectorStore;
use crate::utils::error::{Result, SizingError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredSector {
    sector: Sector,
    updated_at: DateTime<Utc>,
}

/// Sector store with optimistic concurrency on the sector version.
#[derive(Debug, Clone, Default)]
pub struct InMemorySectorStore {
    sectors: Arc<RwLock<HashMap<String, StoredSector>>>,
}

impl InMemorySectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, sector: Sector) -> Result<()> {
        let mut sectors = self.sectors.write().await;
        if sectors.contains_key(sector.id()) {
            return Err(SizingError::validation(format!(
                "sector '{}' already exists",
                sector.id()
            )));
        }
        sectors.insert(
            sector.id().to_string(),
            StoredSector {
                sector,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    pub async fn updated_at(&self, sector_id: &str) -> Option<DateTime<Utc>> {
        let sectors = self.sectors.read().await;
        sectors.get(sector_id).map(|s| s.updated_at)
    }

    pub async fn remove(&self, sector_id: &str) -> bool {
        self.sectors.write().await.remove(sector_id).is_some()
    }
}

impl SectorStore for InMemorySectorStore {
    async fn read(&self, sector_id: &str) -> Result<Sector> {
        let sectors = self.sectors.read().await;
        sectors
            .get(sector_id)
            .map(|s| s.sector.clone())
            .ok_or_else(|| SizingError::NotFound {
                what: format!("Sector {}", sector_id),
            })
    }

    async fn write(&self, sector: Sector, expected_version: u64) -> Result<u64> {
        let mut sectors = self.sectors.write().await;
        let stored = sectors
            .get_mut(sector.id())
            .ok_or_else(|| SizingError::NotFound {
                what: format!("Sector {}", sector.id()),
            })?;

        if stored.sector.version() != expected_version {
            tracing::warn!(
                "Rejected write to sector {}: expected version {}, stored {}",
                sector.id(),
                expected_version,
                stored.sector.version()
            );
            return Err(SizingError::VersionConflict {
                expected: expected_version,
                actual: stored.sector.version(),
            });
        }

        // The written copy must descend from the expected version.
        if sector.version() < expected_version {
            tracing::warn!(
                "Rejected write to sector {}: copy at version {} is older than {}",
                sector.id(),
                sector.version(),
                expected_version
            );
            return Err(SizingError::VersionConflict {
                expected: expected_version,
                actual: sector.version(),
            });
        }

        let version = sector.version();
        stored.sector = sector;
        stored.updated_at = Utc::now();
        Ok(version)
    }
}
