/// A field that an update on a sector or one of its cable groups actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangedField {
    SectorName,
    TrayType,
    ReservePercentage,
    InstallationLayout,
    CableSpec,
    Quantity,
    Arrangement,
    GroupAdded,
    GroupRemoved,
}

impl ChangedField {
    pub fn affects_results(&self) -> bool {
        !matches!(self, ChangedField::SectorName)
    }
}

/// Whether stored results must be discarded after `changes` are applied.
pub fn requires_invalidation(changes: &[ChangedField]) -> bool {
    changes.iter().any(ChangedField::affects_results)
}
