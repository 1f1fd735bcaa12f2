use crate::domain::model::CableGroup;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSummary {
    /// Sum of cable mass per metre, reported back to the user.
    pub raw_kg_m: f64,
    /// Raw load times the weight safety factor, used only to filter trays.
    pub adjusted_kg_m: f64,
}

pub fn aggregate_load(groups: &[CableGroup], weight_safety_factor: f64) -> LoadSummary {
    let raw_kg_m: f64 = groups
        .iter()
        .map(|g| g.spec.mass_per_length_kg_m * f64::from(g.quantity))
        .sum();

    LoadSummary {
        raw_kg_m,
        adjusted_kg_m: raw_kg_m * weight_safety_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Arrangement, CableSpec};

    fn group(mass: f64, quantity: u32) -> CableGroup {
        CableGroup {
            id: 0,
            spec: CableSpec {
                nominal_section_mm2: "4".to_string(),
                nominal_section_awg: "12".to_string(),
                external_diameter_mm: 10.0,
                external_area_mm2: 78.5,
                mass_per_length_kg_m: mass,
            },
            quantity,
            arrangement: Arrangement::SideBySide,
        }
    }

    #[test]
    fn test_load_sums_mass_times_quantity() {
        let groups = vec![group(0.5, 2), group(0.5, 2), group(0.5, 2)];
        let load = aggregate_load(&groups, 1.2);
        assert!((load.raw_kg_m - 3.0).abs() < 1e-9);
        assert!((load.adjusted_kg_m - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_empty_group_list_has_zero_load() {
        let load = aggregate_load(&[], 1.2);
        assert_eq!(load.raw_kg_m, 0.0);
        assert_eq!(load.adjusted_kg_m, 0.0);
    }

    #[test]
    fn test_massless_cables_are_allowed() {
        let load = aggregate_load(&[group(0.0, 4)], 1.2);
        assert_eq!(load.raw_kg_m, 0.0);
    }
}
