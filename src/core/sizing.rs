use crate::config::SizingFactors;
use crate::core::aggregate::{validate_quantity, validate_reserve};
use crate::core::geometry::{
    raw_cable_area, required_geometry, ArrangementPolicy, MajorityPolicy, RequiredGeometry,
};
use crate::core::load::aggregate_load;
use crate::core::selection::{
    find_multi_layer_candidates, find_single_layer_candidates, rank_by_load_capacity, select,
};
use crate::domain::model::{InstallationLayout, Sector, SizingResults, SizingWarning};
use crate::domain::ports::{CatalogRepository, SectorStore};
use crate::utils::error::{Result, SizingError};
use crate::utils::validation::Validate;

/// Sizing engine: turns a sector snapshot and the catalog into a `SizingResults`.
pub struct TraySizer<C: CatalogRepository, P: ArrangementPolicy = MajorityPolicy> {
    catalog: C,
    factors: SizingFactors,
    policy: P,
}

impl<C: CatalogRepository> TraySizer<C> {
    pub fn new(catalog: C, factors: SizingFactors) -> Self {
        Self::with_policy(catalog, factors, MajorityPolicy)
    }
}

impl<C: CatalogRepository, P: ArrangementPolicy> TraySizer<C, P> {
    pub fn with_policy(catalog: C, factors: SizingFactors, policy: P) -> Self {
        Self {
            catalog,
            factors,
            policy,
        }
    }

    pub fn factors(&self) -> &SizingFactors {
        &self.factors
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Rejects sectors that cannot be sized. Nothing is computed on failure.
    pub fn validate_sector(&self, sector: &Sector) -> Result<()> {
        if sector.groups().is_empty() {
            return Err(SizingError::validation(format!(
                "sector '{}' has no cable groups",
                sector.name()
            )));
        }
        validate_reserve(sector.reserve_percentage())?;
        for group in sector.groups() {
            validate_quantity(group.quantity)?;
            group.spec.validate()?;
        }
        Ok(())
    }

    /// Computes the optimal tray and up to three alternatives for `sector`.
    ///
    /// A sector with no fitting tray still yields results: `optimal` is `None` and the raw
    /// load and area describe what was required. Catalog failures are returned unchanged.
    pub async fn compute_optimal_tray(&self, sector: &Sector) -> Result<SizingResults> {
        self.validate_sector(sector)?;

        let groups = sector.groups();
        let load = aggregate_load(groups, self.factors.weight_safety_factor);
        let calculated_area_mm2 = raw_cable_area(groups);
        let classification = self.policy.classify(groups);

        let mut warnings = Vec::new();
        if sector.layout() == InstallationLayout::SingleLayer && classification.is_tie() {
            tracing::warn!(
                "Sector '{}' has no clear arrangement majority ({} side-by-side, {} bundled)",
                sector.name(),
                classification.side_by_side_groups,
                classification.bundled_groups
            );
            warnings.push(SizingWarning::NoClearArrangementMajority {
                side_by_side: classification.side_by_side_groups,
                bundled: classification.bundled_groups,
            });
        }

        let geometry = required_geometry(
            sector.layout(),
            classification.arrangement,
            groups,
            self.factors.dimension_safety_factor,
            sector.reserve_percentage(),
        );
        tracing::debug!(
            "Sector '{}': load {:.3} kg/m (adjusted {:.3}), geometry {:?}",
            sector.name(),
            load.raw_kg_m,
            load.adjusted_kg_m,
            geometry
        );

        let candidates = match geometry {
            RequiredGeometry::SingleLayer { dimensions, .. } => {
                find_single_layer_candidates(
                    &self.catalog,
                    sector.tray_type(),
                    load.adjusted_kg_m,
                    dimensions.width_mm,
                    dimensions.height_mm,
                )
                .await?
            }
            RequiredGeometry::MultiLayer { area_mm2 } => {
                find_multi_layer_candidates(
                    &self.catalog,
                    sector.tray_type(),
                    load.adjusted_kg_m,
                    area_mm2,
                    self.factors.ladder_height_reduction_mm,
                )
                .await?
            }
        };

        let ranked = rank_by_load_capacity(candidates);
        let selection = select(&ranked);
        warnings.extend(selection.warnings);

        match &selection.optimal {
            Some(optimal) => tracing::info!(
                "Sector '{}': selected tray {} ({} kg/m) with {} alternatives",
                sector.name(),
                optimal.id,
                optimal.load_capacity_kg_m(),
                selection.alternatives.len()
            ),
            None => tracing::info!(
                "Sector '{}': no {} tray in the catalog fits {:.3} kg/m",
                sector.name(),
                sector.tray_type(),
                load.adjusted_kg_m
            ),
        }

        Ok(SizingResults {
            optimal: selection.optimal,
            alternatives: selection.alternatives,
            calculated_load_kg_m: load.raw_kg_m,
            calculated_area_mm2,
            warnings,
            basis_version: sector.version(),
        })
    }

    /// Computes results for `sector` and stores them on it.
    pub async fn size_sector(&self, sector: &mut Sector) -> Result<()> {
        let results = self.compute_optimal_tray(sector).await?;
        sector.commit_results(results)
    }

    /// Read, compute and write back a stored sector. A concurrent mutation between the
    /// read and the write surfaces as `VersionConflict` and nothing is written.
    pub async fn size_stored_sector<S: SectorStore>(
        &self,
        store: &S,
        sector_id: &str,
    ) -> Result<Sector> {
        let mut sector = store.read(sector_id).await?;
        let expected_version = sector.version();
        self.size_sector(&mut sector).await?;
        store.write(sector.clone(), expected_version).await?;
        Ok(sector)
    }
}
