use crate::core::category::normalize_category;
use crate::domain::model::{
    SizingWarning, TechnicalDetails, TrayCandidate, TrayProjection, TrayType,
};
use crate::domain::ports::{CatalogQuery, CatalogRepository};
use crate::utils::error::Result;

pub const MAX_ALTERNATIVES: usize = 3;

/// Cross-section available to cables. Ladder rails take `ladder_height_reduction_mm` off
/// the height.
pub fn usable_area_mm2(tray: &TrayCandidate, ladder_height_reduction_mm: f64) -> f64 {
    match tray.tray_type {
        TrayType::Ladder => {
            tray.width_mm * (tray.height_mm - ladder_height_reduction_mm).max(0.0)
        }
        TrayType::Channel => tray.width_mm * tray.height_mm,
    }
}

/// Single-layer fit compares the full tray height; no ladder reduction applies here.
pub fn fits_single_layer(tray: &TrayCandidate, width_mm: f64, height_mm: f64) -> bool {
    tray.width_mm >= width_mm && tray.height_mm >= height_mm
}

pub fn fits_multi_layer(
    tray: &TrayCandidate,
    area_mm2: f64,
    ladder_height_reduction_mm: f64,
) -> bool {
    usable_area_mm2(tray, ladder_height_reduction_mm) >= area_mm2
}

pub async fn find_single_layer_candidates<C: CatalogRepository + ?Sized>(
    catalog: &C,
    tray_type: TrayType,
    adjusted_load_kg_m: f64,
    width_mm: f64,
    height_mm: f64,
) -> Result<Vec<TrayCandidate>> {
    let query = CatalogQuery::by_load(tray_type, adjusted_load_kg_m).with_dimensions(width_mm, height_mm);
    let returned = catalog.query(&query).await?;
    let total = returned.len();

    // Catalogs may ignore the dimension bounds of the query.
    let candidates: Vec<TrayCandidate> = returned
        .into_iter()
        .filter(|tray| fits_single_layer(tray, width_mm, height_mm))
        .collect();
    tracing::debug!(
        "{} of {} trays are at least {}mm x {}mm",
        candidates.len(),
        total,
        width_mm,
        height_mm
    );
    Ok(candidates)
}

pub async fn find_multi_layer_candidates<C: CatalogRepository + ?Sized>(
    catalog: &C,
    tray_type: TrayType,
    adjusted_load_kg_m: f64,
    area_mm2: f64,
    ladder_height_reduction_mm: f64,
) -> Result<Vec<TrayCandidate>> {
    let query = CatalogQuery::by_load(tray_type, adjusted_load_kg_m);
    let by_load = catalog.query(&query).await?;
    let total = by_load.len();

    let candidates: Vec<TrayCandidate> = by_load
        .into_iter()
        .filter(|tray| fits_multi_layer(tray, area_mm2, ladder_height_reduction_mm))
        .collect();
    tracing::debug!(
        "{} of {} trays offer at least {}mm² of usable area",
        candidates.len(),
        total,
        area_mm2
    );
    Ok(candidates)
}

/// Ascending load capacity; ties keep catalog order.
pub fn rank_by_load_capacity(mut candidates: Vec<TrayCandidate>) -> Vec<TrayCandidate> {
    candidates.sort_by(|a, b| a.load_capacity_kg_m.total_cmp(&b.load_capacity_kg_m));
    candidates
}

pub fn project_candidate(tray: &TrayCandidate) -> (TrayProjection, Option<SizingWarning>) {
    let category = normalize_category(&tray.category);
    let warning = category.is_unmapped().then(|| {
        tracing::warn!(
            "Tray {} has unrecognised category '{}', treating it as light",
            tray.id,
            tray.category
        );
        SizingWarning::UnmappedCategory {
            tray_id: tray.id.clone(),
            label: tray.category.clone(),
        }
    });

    let projection = TrayProjection {
        id: tray.id.clone(),
        tray_type: tray.tray_type,
        category,
        technical_details: TechnicalDetails {
            thickness_mm: tray.thickness_mm,
            width_mm: tray.width_mm,
            height_mm: tray.height_mm,
            load_resistance_kg_m: tray.load_capacity_kg_m,
        },
    };
    (projection, warning)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub optimal: Option<TrayProjection>,
    pub alternatives: Vec<TrayProjection>,
    pub warnings: Vec<SizingWarning>,
}

/// First ranked tray is the optimal choice, the next `MAX_ALTERNATIVES` are alternatives.
pub fn select(ranked: &[TrayCandidate]) -> Selection {
    let mut selection = Selection::default();
    for (index, tray) in ranked.iter().take(1 + MAX_ALTERNATIVES).enumerate() {
        let (projection, warning) = project_candidate(tray);
        selection.warnings.extend(warning);
        if index == 0 {
            selection.optimal = Some(projection);
        } else {
            selection.alternatives.push(projection);
        }
    }
    selection
}
