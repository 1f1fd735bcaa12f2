//! Mutation path of the project/sector aggregate.
//!
//! Every change computes which fields it actually touched, bumps the sector version when
//! anything changed, and clears stored results in the same step when the change affects
//! the calculation inputs.

use crate::core::invalidation::{requires_invalidation, ChangedField};
use crate::domain::model::{
    Arrangement, CableGroup, CableSpec, CalculationReport, InstallationLayout, Project, Sector,
    SectorRecord, SizingResults, TrayType, DEFAULT_RESERVE_PERCENTAGE, GENERAL_SECTOR_NAME,
};
use crate::utils::error::{Result, SizingError};
use crate::utils::validation::{validate_non_empty_string, validate_positive, validate_range, Validate};
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

pub fn validate_reserve(reserve_percentage: f64) -> Result<()> {
    validate_range("reserve_percentage", reserve_percentage, 0.0, 100.0)
        .map_err(|e| SizingError::validation(e.to_string()))
}

pub fn validate_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(SizingError::validation("cable group quantity must be at least 1"));
    }
    Ok(())
}

impl Validate for CableSpec {
    fn validate(&self) -> Result<()> {
        validate_positive("external_diameter_mm", self.external_diameter_mm)
            .and_then(|_| validate_positive("external_area_mm2", self.external_area_mm2))
            .and_then(|_| {
                validate_range(
                    "mass_per_length_kg_m",
                    self.mass_per_length_kg_m,
                    0.0,
                    f64::MAX,
                )
            })
            .map_err(|e| SizingError::validation(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorUpdate {
    pub name: Option<String>,
    pub tray_type: Option<TrayType>,
    pub reserve_percentage: Option<f64>,
    pub layout: Option<InstallationLayout>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupUpdate {
    pub spec: Option<CableSpec>,
    pub quantity: Option<u32>,
    pub arrangement: Option<Arrangement>,
}

impl Sector {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tray_type: TrayType,
        reserve_percentage: f64,
        layout: InstallationLayout,
    ) -> Result<Self> {
        let name = name.into();
        validate_non_empty_string("sector_name", &name)
            .map_err(|e| SizingError::validation(e.to_string()))?;
        validate_reserve(reserve_percentage)?;

        Ok(Self {
            id: id.into(),
            name,
            tray_type,
            reserve_percentage,
            layout,
            groups: Vec::new(),
            results: None,
            version: 0,
            next_group_id: 1,
        })
    }

    /// Sector used by projects that are not split into sectors.
    pub fn general(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: GENERAL_SECTOR_NAME.to_string(),
            tray_type: TrayType::Ladder,
            reserve_percentage: DEFAULT_RESERVE_PERCENTAGE,
            layout: InstallationLayout::SingleLayer,
            groups: Vec::new(),
            results: None,
            version: 0,
            next_group_id: 1,
        }
    }

    /// Applies the provided fields. Returns whether stored results were discarded.
    pub fn update(&mut self, update: SectorUpdate) -> Result<bool> {
        if let Some(name) = &update.name {
            validate_non_empty_string("sector_name", name)
                .map_err(|e| SizingError::validation(e.to_string()))?;
        }
        if let Some(reserve) = update.reserve_percentage {
            validate_reserve(reserve)?;
        }

        let mut changes = Vec::new();
        if let Some(name) = update.name {
            if name != self.name {
                self.name = name;
                changes.push(ChangedField::SectorName);
            }
        }
        if let Some(tray_type) = update.tray_type {
            if tray_type != self.tray_type {
                self.tray_type = tray_type;
                changes.push(ChangedField::TrayType);
            }
        }
        if let Some(reserve) = update.reserve_percentage {
            if reserve != self.reserve_percentage {
                self.reserve_percentage = reserve;
                changes.push(ChangedField::ReservePercentage);
            }
        }
        if let Some(layout) = update.layout {
            if layout != self.layout {
                self.layout = layout;
                changes.push(ChangedField::InstallationLayout);
            }
        }

        Ok(self.record_changes(&changes))
    }

    /// Adds a cable group and returns its id.
    pub fn add_group(
        &mut self,
        spec: CableSpec,
        quantity: u32,
        arrangement: Arrangement,
    ) -> Result<u32> {
        spec.validate()?;
        validate_quantity(quantity)?;

        let id = self.next_group_id;
        self.next_group_id += 1;
        self.groups.push(CableGroup {
            id,
            spec,
            quantity,
            arrangement,
        });
        self.record_changes(&[ChangedField::GroupAdded]);
        Ok(id)
    }

    pub fn update_group(&mut self, group_id: u32, update: GroupUpdate) -> Result<bool> {
        if let Some(spec) = &update.spec {
            spec.validate()?;
        }
        if let Some(quantity) = update.quantity {
            validate_quantity(quantity)?;
        }

        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| SizingError::NotFound {
                what: format!("Cable group {} in sector {}", group_id, self.id),
            })?;

        let mut changes = Vec::new();
        if let Some(spec) = update.spec {
            if spec != group.spec {
                group.spec = spec;
                changes.push(ChangedField::CableSpec);
            }
        }
        if let Some(quantity) = update.quantity {
            if quantity != group.quantity {
                group.quantity = quantity;
                changes.push(ChangedField::Quantity);
            }
        }
        if let Some(arrangement) = update.arrangement {
            if arrangement != group.arrangement {
                group.arrangement = arrangement;
                changes.push(ChangedField::Arrangement);
            }
        }

        Ok(self.record_changes(&changes))
    }

    /// Removing an unknown group is a no-op and returns `false`.
    pub fn remove_group(&mut self, group_id: u32) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != group_id);
        if self.groups.len() == before {
            return false;
        }
        self.record_changes(&[ChangedField::GroupRemoved])
    }

    /// Stores results computed from this sector, refusing results computed from an
    /// older version.
    pub fn commit_results(&mut self, results: SizingResults) -> Result<()> {
        if results.basis_version != self.version {
            return Err(SizingError::StaleResults {
                basis: results.basis_version,
                current: self.version,
            });
        }
        self.results = Some(results);
        Ok(())
    }

    pub fn clear_results(&mut self) {
        self.results = None;
    }

    fn record_changes(&mut self, changes: &[ChangedField]) -> bool {
        if changes.is_empty() {
            return false;
        }
        self.version += 1;

        let invalidate = requires_invalidation(changes) && self.results.is_some();
        if invalidate {
            tracing::debug!(
                "Discarding results of sector {} after {:?}",
                self.id,
                changes
            );
            self.results = None;
        }
        invalidate
    }
}

impl TryFrom<SectorRecord> for Sector {
    type Error = SizingError;

    fn try_from(record: SectorRecord) -> Result<Self> {
        let mut sector = Sector::new(
            record.id,
            record.name,
            record.tray_type,
            record.reserve_percentage,
            record.layout,
        )?;

        let mut ids = HashSet::new();
        for group in &record.groups {
            validate_quantity(group.quantity)?;
            group.spec.validate()?;
            if !ids.insert(group.id) {
                return Err(SizingError::validation(format!(
                    "cable group id {} appears twice in sector {}",
                    group.id, sector.id
                )));
            }
        }
        if let Some(results) = &record.results {
            if results.basis_version != record.version {
                return Err(SizingError::StaleResults {
                    basis: results.basis_version,
                    current: record.version,
                });
            }
        }

        let next_free = ids.iter().max().map_or(1, |id| id.saturating_add(1));
        sector.groups = record.groups;
        sector.results = record.results;
        sector.version = record.version;
        sector.next_group_id = record.next_group_id.max(next_free);
        Ok(sector)
    }
}

/// The parts of a sector that sizing results depend on.
#[derive(Debug, Clone, PartialEq)]
struct SizingInputs {
    tray_type: TrayType,
    reserve_percentage: f64,
    layout: InstallationLayout,
    groups: Vec<CableGroup>,
}

impl SizingInputs {
    fn of(sector: &Sector) -> Self {
        Self {
            tray_type: sector.tray_type,
            reserve_percentage: sector.reserve_percentage,
            layout: sector.layout,
            groups: sector.groups.clone(),
        }
    }
}

/// Mutable access to one sector of a project.
///
/// When dropped, discards the project's calculation report if the sector's sizing inputs
/// changed. Renaming a sector keeps the report.
pub struct SectorEdit<'a> {
    sector: &'a mut Sector,
    report: &'a mut Option<CalculationReport>,
    inputs_before: SizingInputs,
}

impl Deref for SectorEdit<'_> {
    type Target = Sector;

    fn deref(&self) -> &Sector {
        &*self.sector
    }
}

impl DerefMut for SectorEdit<'_> {
    fn deref_mut(&mut self) -> &mut Sector {
        &mut *self.sector
    }
}

impl Drop for SectorEdit<'_> {
    fn drop(&mut self) {
        if SizingInputs::of(&*self.sector) != self.inputs_before {
            if let Some(report) = self.report.take() {
                tracing::debug!(
                    "Discarding calculation report {} after changes to sector {}",
                    report.file_id,
                    self.sector.id
                );
            }
        }
    }
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            location: location.into(),
            sectors: Vec::new(),
            calculation_report: None,
        }
    }

    /// A project that is not split into sectors owns a single "General" sector.
    pub fn unsectored(
        name: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let mut project = Self::new(name, company, location);
        project.sectors.push(Sector::general("general"));
        project
    }

    pub fn add_sector(&mut self, sector: Sector) -> Result<()> {
        if self.sector(sector.id()).is_some() {
            return Err(SizingError::validation(format!(
                "sector id '{}' is already used in project {}",
                sector.id(),
                self.name
            )));
        }
        self.sectors.push(sector);
        self.invalidate_calculation_report();
        Ok(())
    }

    pub fn sector(&self, sector_id: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id == sector_id)
    }

    pub fn sector_mut(&mut self, sector_id: &str) -> Result<SectorEdit<'_>> {
        let sector = self
            .sectors
            .iter_mut()
            .find(|s| s.id == sector_id)
            .ok_or_else(|| SizingError::NotFound {
                what: format!("Sector {} in project {}", sector_id, self.name),
            })?;
        let inputs_before = SizingInputs::of(sector);
        Ok(SectorEdit {
            sector,
            report: &mut self.calculation_report,
            inputs_before,
        })
    }

    pub fn remove_sector(&mut self, sector_id: &str) -> bool {
        let before = self.sectors.len();
        self.sectors.retain(|s| s.id != sector_id);
        let removed = self.sectors.len() != before;
        if removed {
            self.invalidate_calculation_report();
        }
        removed
    }

    pub fn attach_calculation_report(&mut self, report: CalculationReport) {
        self.calculation_report = Some(report);
    }

    /// Drops the report reference and hands it back so the caller can delete the document.
    pub fn invalidate_calculation_report(&mut self) -> Option<CalculationReport> {
        self.calculation_report.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(diameter: f64) -> CableSpec {
        CableSpec {
            nominal_section_mm2: "16".to_string(),
            nominal_section_awg: "6".to_string(),
            external_diameter_mm: diameter,
            external_area_mm2: 120.0,
            mass_per_length_kg_m: 0.3,
        }
    }

    fn computed(sector: &Sector) -> SizingResults {
        SizingResults {
            optimal: None,
            alternatives: Vec::new(),
            calculated_load_kg_m: 1.0,
            calculated_area_mm2: 1.0,
            warnings: Vec::new(),
            basis_version: sector.version(),
        }
    }

    fn sized_sector() -> Sector {
        let mut sector = Sector::new("s1", "Pump room", TrayType::Ladder, 30.0, InstallationLayout::SingleLayer)
            .unwrap();
        sector.add_group(spec(12.0), 3, Arrangement::SideBySide).unwrap();
        let results = computed(&sector);
        sector.commit_results(results).unwrap();
        sector
    }

    #[test]
    fn test_new_sector_rejects_out_of_range_reserve() {
        assert!(Sector::new("s", "A", TrayType::Channel, 101.0, InstallationLayout::MultiLayer).is_err());
        assert!(Sector::new("s", "A", TrayType::Channel, -1.0, InstallationLayout::MultiLayer).is_err());
        assert!(Sector::new("s", "", TrayType::Channel, 30.0, InstallationLayout::MultiLayer).is_err());
    }

    #[test]
    fn test_parameter_updates_clear_results() {
        let updates = [
            SectorUpdate { tray_type: Some(TrayType::Channel), ..Default::default() },
            SectorUpdate { reserve_percentage: Some(50.0), ..Default::default() },
            SectorUpdate { layout: Some(InstallationLayout::MultiLayer), ..Default::default() },
        ];
        for update in updates {
            let mut sector = sized_sector();
            assert!(sector.update(update).unwrap());
            assert!(sector.results().is_none());
        }
    }

    #[test]
    fn test_rename_and_no_op_updates_keep_results() {
        let mut sector = sized_sector();
        let version = sector.version();
        let same = SectorUpdate {
            tray_type: Some(TrayType::Ladder),
            reserve_percentage: Some(30.0),
            ..Default::default()
        };
        assert!(!sector.update(same).unwrap());
        assert_eq!(sector.version(), version);

        let rename = SectorUpdate { name: Some("Boiler room".to_string()), ..Default::default() };
        assert!(!sector.update(rename).unwrap());
        assert!(sector.results().is_some());
        assert_eq!(sector.version(), version + 1);
    }

    #[test]
    fn test_invalid_update_changes_nothing() {
        let mut sector = sized_sector();
        let update = SectorUpdate {
            tray_type: Some(TrayType::Channel),
            reserve_percentage: Some(140.0),
            ..Default::default()
        };
        assert!(sector.update(update).is_err());
        assert_eq!(sector.tray_type(), TrayType::Ladder);
        assert!(sector.results().is_some());
    }

    #[test]
    fn test_group_mutations_clear_results() {
        let mut sector = sized_sector();
        let id = sector.groups()[0].id;
        let update = GroupUpdate { quantity: Some(4), ..Default::default() };
        assert!(sector.update_group(id, update).unwrap());
        assert!(sector.results().is_none());

        let results = computed(&sector);
        sector.commit_results(results).unwrap();
        sector.add_group(spec(20.0), 1, Arrangement::Bundled).unwrap();
        assert!(sector.results().is_none());

        let results = computed(&sector);
        sector.commit_results(results).unwrap();
        assert!(!sector.remove_group(999));
        assert!(sector.results().is_some());
        assert!(sector.remove_group(id));
        assert!(sector.results().is_none());
    }

    #[test]
    fn test_group_validation() {
        let mut sector = sized_sector();
        assert!(sector.add_group(spec(10.0), 0, Arrangement::SideBySide).is_err());
        assert!(sector.add_group(spec(0.0), 1, Arrangement::SideBySide).is_err());
        let missing = sector.update_group(42, GroupUpdate::default());
        assert!(matches!(missing, Err(SizingError::NotFound { .. })));
    }

    #[test]
    fn test_stale_results_are_rejected() {
        let mut sector = sized_sector();
        let stale = computed(&sector);
        sector
            .update(SectorUpdate { reserve_percentage: Some(10.0), ..Default::default() })
            .unwrap();
        let err = sector.commit_results(stale).unwrap_err();
        assert!(matches!(err, SizingError::StaleResults { .. }));
        assert!(sector.results().is_none());
    }

    #[test]
    fn test_unsectored_project_has_general_sector() {
        let project = Project::unsectored("Plant", "ACME", "Santiago");
        assert_eq!(project.sectors.len(), 1);
        let general = &project.sectors[0];
        assert_eq!(general.name(), GENERAL_SECTOR_NAME);
        assert_eq!(general.tray_type(), TrayType::Ladder);
        assert_eq!(general.reserve_percentage(), 30.0);
        assert_eq!(general.layout(), InstallationLayout::SingleLayer);
    }

    fn report() -> CalculationReport {
        CalculationReport { file_id: "doc-1".to_string() }
    }

    #[test]
    fn test_sector_edits_discard_calculation_report() {
        let mut project = Project::unsectored("Plant", "ACME", "Santiago");
        project.attach_calculation_report(report());

        {
            let mut general = project.sector_mut("general").unwrap();
            general
                .update(SectorUpdate { name: Some("Main hall".to_string()), ..Default::default() })
                .unwrap();
            general
                .update(SectorUpdate { reserve_percentage: Some(30.0), ..Default::default() })
                .unwrap();
        }
        assert_eq!(project.calculation_report(), Some(&report()));

        {
            let mut general = project.sector_mut("general").unwrap();
            general.add_group(spec(12.0), 2, Arrangement::SideBySide).unwrap();
        }
        assert!(project.calculation_report().is_none());

        project.attach_calculation_report(report());
        {
            let mut general = project.sector_mut("general").unwrap();
            assert!(!general.remove_group(999));
        }
        assert!(project.calculation_report().is_some());
        {
            let mut general = project.sector_mut("general").unwrap();
            general
                .update(SectorUpdate { layout: Some(InstallationLayout::MultiLayer), ..Default::default() })
                .unwrap();
        }
        assert!(project.calculation_report().is_none());
    }

    #[test]
    fn test_sector_membership_changes_discard_calculation_report() {
        let mut project = Project::new("Plant", "ACME", "Santiago");
        project.attach_calculation_report(report());
        project.add_sector(Sector::general("a")).unwrap();
        assert!(project.calculation_report().is_none());

        project.attach_calculation_report(report());
        assert!(!project.remove_sector("missing"));
        assert!(project.calculation_report().is_some());
        assert!(project.remove_sector("a"));
        assert!(project.calculation_report().is_none());

        project.attach_calculation_report(report());
        assert_eq!(project.invalidate_calculation_report(), Some(report()));
        assert_eq!(project.invalidate_calculation_report(), None);
    }

    #[test]
    fn test_sector_serde_round_trip() {
        let sector = sized_sector();
        let json = serde_json::to_string(&sector).unwrap();
        let restored: Sector = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sector);
    }

    #[test]
    fn test_deserialized_sector_is_checked() {
        let mut value = serde_json::to_value(sized_sector()).unwrap();
        value["reserve_percentage"] = serde_json::json!(150.0);
        assert!(serde_json::from_value::<Sector>(value).is_err());

        let mut value = serde_json::to_value(sized_sector()).unwrap();
        value["version"] = serde_json::json!(7);
        let err = serde_json::from_value::<Sector>(value).unwrap_err();
        assert!(err.to_string().contains("sector is at version 7"), "{}", err);

        let mut value = serde_json::to_value(sized_sector()).unwrap();
        let group = value["groups"][0].clone();
        value["groups"].as_array_mut().unwrap().push(group);
        assert!(serde_json::from_value::<Sector>(value).is_err());

        let mut value = serde_json::to_value(sized_sector()).unwrap();
        value["groups"][0]["quantity"] = serde_json::json!(0);
        assert!(serde_json::from_value::<Sector>(value).is_err());
    }

    #[test]
    fn test_deserialized_sector_never_reuses_group_ids() {
        let mut value = serde_json::to_value(sized_sector()).unwrap();
        value.as_object_mut().unwrap().remove("next_group_id");
        let mut sector: Sector = serde_json::from_value(value).unwrap();
        let existing = sector.groups()[0].id;
        let added = sector.add_group(spec(8.0), 1, Arrangement::Bundled).unwrap();
        assert!(added > existing);
    }

    #[test]
    fn test_project_rejects_duplicate_sector_ids() {
        let mut project = Project::new("Plant", "ACME", "Santiago");
        project.add_sector(Sector::general("a")).unwrap();
        assert!(project.add_sector(Sector::general("a")).is_err());
        assert!(project.sector_mut("missing").is_err());
        assert!(project.remove_sector("a"));
        assert!(project.sectors.is_empty());
    }
}
