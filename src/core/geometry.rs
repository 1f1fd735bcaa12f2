//! Required tray geometry for a cable set.
//!
//! Single-layer sizing produces a width and a height; multi-layer sizing produces only a
//! cross-sectional area. All factored values include the dimension safety factor and the
//! sector reserve; the raw cable area is reported without either.

use crate::domain::model::{Arrangement, CableGroup, InstallationLayout};

/// Number of cables that share one bundled (trefoil) formation.
pub const CABLES_PER_TREFOIL: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrangementClassification {
    pub arrangement: Arrangement,
    pub side_by_side_groups: usize,
    pub bundled_groups: usize,
}

impl ArrangementClassification {
    /// True when the groups split evenly between both arrangements.
    pub fn is_tie(&self) -> bool {
        self.side_by_side_groups > 0 && self.side_by_side_groups == self.bundled_groups
    }

    pub fn is_mixed(&self) -> bool {
        self.side_by_side_groups > 0 && self.bundled_groups > 0
    }
}

/// Decides which single-layer formula applies to a whole cable set.
pub trait ArrangementPolicy: Send + Sync {
    fn classify(&self, groups: &[CableGroup]) -> ArrangementClassification;
}

/// The set is side-by-side when at least half of its groups are side-by-side.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityPolicy;

impl ArrangementPolicy for MajorityPolicy {
    fn classify(&self, groups: &[CableGroup]) -> ArrangementClassification {
        let side_by_side_groups = groups
            .iter()
            .filter(|g| g.arrangement == Arrangement::SideBySide)
            .count();
        let bundled_groups = groups.len() - side_by_side_groups;

        // Integer form of `side_by_side >= len / 2`.
        let arrangement = if side_by_side_groups * 2 >= groups.len() {
            Arrangement::SideBySide
        } else {
            Arrangement::Bundled
        };

        ArrangementClassification {
            arrangement,
            side_by_side_groups,
            bundled_groups,
        }
    }
}

pub fn classify_arrangement(groups: &[CableGroup]) -> ArrangementClassification {
    MajorityPolicy.classify(groups)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub raw_width_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiameterBucket {
    pub diameter_mm: f64,
    pub quantity: u32,
}

impl DiameterBucket {
    pub fn trefoil_groups(&self) -> u32 {
        self.quantity.div_ceil(CABLES_PER_TREFOIL)
    }

    pub fn width_mm(&self) -> f64 {
        f64::from(self.trefoil_groups()) * 2.0 * self.diameter_mm
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequiredGeometry {
    SingleLayer {
        arrangement: Arrangement,
        dimensions: Dimensions,
    },
    MultiLayer {
        area_mm2: f64,
    },
}

pub fn reserve_multiplier(reserve_percentage: f64) -> f64 {
    1.0 + reserve_percentage / 100.0
}

fn max_diameter(groups: &[CableGroup]) -> f64 {
    groups
        .iter()
        .map(|g| g.spec.external_diameter_mm)
        .fold(0.0, f64::max)
}

pub fn side_by_side_dimensions(
    groups: &[CableGroup],
    dimension_safety_factor: f64,
    reserve_percentage: f64,
) -> Dimensions {
    let raw_width_mm: f64 = groups
        .iter()
        .map(|g| g.spec.external_diameter_mm * f64::from(g.quantity))
        .sum();

    Dimensions {
        raw_width_mm,
        width_mm: raw_width_mm * dimension_safety_factor * reserve_multiplier(reserve_percentage),
        height_mm: max_diameter(groups),
    }
}

/// Groups cables by exact diameter, keeping first-seen order.
pub fn diameter_buckets(groups: &[CableGroup]) -> Vec<DiameterBucket> {
    let mut buckets: Vec<DiameterBucket> = Vec::new();
    for g in groups {
        let diameter = g.spec.external_diameter_mm;
        match buckets.iter_mut().find(|b| b.diameter_mm == diameter) {
            Some(bucket) => bucket.quantity += g.quantity,
            None => buckets.push(DiameterBucket {
                diameter_mm: diameter,
                quantity: g.quantity,
            }),
        }
    }
    buckets
}

pub fn bundled_dimensions(
    groups: &[CableGroup],
    dimension_safety_factor: f64,
    reserve_percentage: f64,
) -> Dimensions {
    let buckets = diameter_buckets(groups);
    for bucket in &buckets {
        tracing::debug!(
            "Diameter {}mm: {} cables = {} trefoil groups, {}mm wide",
            bucket.diameter_mm,
            bucket.quantity,
            bucket.trefoil_groups(),
            bucket.width_mm()
        );
    }

    let raw_width_mm: f64 = buckets.iter().map(DiameterBucket::width_mm).sum();

    Dimensions {
        raw_width_mm,
        width_mm: raw_width_mm * dimension_safety_factor * reserve_multiplier(reserve_percentage),
        height_mm: 2.0 * max_diameter(groups),
    }
}

/// Sum of cable cross-sections with no factors applied.
pub fn raw_cable_area(groups: &[CableGroup]) -> f64 {
    groups
        .iter()
        .map(|g| g.spec.external_area_mm2 * f64::from(g.quantity))
        .sum()
}

pub fn multi_layer_area(
    groups: &[CableGroup],
    dimension_safety_factor: f64,
    reserve_percentage: f64,
) -> f64 {
    raw_cable_area(groups) * dimension_safety_factor * reserve_multiplier(reserve_percentage)
}

/// Factored geometry for `layout`. `arrangement` only matters for single-layer sizing.
pub fn required_geometry(
    layout: InstallationLayout,
    arrangement: Arrangement,
    groups: &[CableGroup],
    dimension_safety_factor: f64,
    reserve_percentage: f64,
) -> RequiredGeometry {
    match layout {
        InstallationLayout::SingleLayer => {
            let dimensions = match arrangement {
                Arrangement::SideBySide => {
                    side_by_side_dimensions(groups, dimension_safety_factor, reserve_percentage)
                }
                Arrangement::Bundled => {
                    bundled_dimensions(groups, dimension_safety_factor, reserve_percentage)
                }
            };
            RequiredGeometry::SingleLayer {
                arrangement,
                dimensions,
            }
        }
        InstallationLayout::MultiLayer => RequiredGeometry::MultiLayer {
            area_mm2: multi_layer_area(groups, dimension_safety_factor, reserve_percentage),
        },
    }
}
