use crate::domain::model::CanonicalCategory;

/// Catalog spellings seen in the wild, lower-cased. Order matters: the fuzzy fallback takes
/// the first entry that matches.
const SYNONYMS: &[(&str, CanonicalCategory)] = &[
    ("super liviana", CanonicalCategory::SuperLight),
    ("superliviana", CanonicalCategory::SuperLight),
    ("super-liviana", CanonicalCategory::SuperLight),
    ("liviana", CanonicalCategory::Light),
    ("semi-pesada", CanonicalCategory::SemiHeavy),
    ("semi pesada", CanonicalCategory::SemiHeavy),
    ("semi pesadas", CanonicalCategory::SemiHeavy),
    ("semipesada", CanonicalCategory::SemiHeavy),
    ("pesada", CanonicalCategory::Heavy),
    ("super pesada", CanonicalCategory::SuperHeavy),
    ("superpesada", CanonicalCategory::SuperHeavy),
    ("super-pesada", CanonicalCategory::SuperHeavy),
    ("super light", CanonicalCategory::SuperLight),
    ("super-light", CanonicalCategory::SuperLight),
    ("light", CanonicalCategory::Light),
    ("semi-heavy", CanonicalCategory::SemiHeavy),
    ("semi heavy", CanonicalCategory::SemiHeavy),
    ("heavy", CanonicalCategory::Heavy),
    ("super heavy", CanonicalCategory::SuperHeavy),
    ("super-heavy", CanonicalCategory::SuperHeavy),
];

/// Maps a free-text catalog category to its canonical weight class.
///
/// An exact synonym wins. Otherwise the first table entry that either occurs in the label or
/// contains the label is used. Blank labels and labels matching nothing are `Unmapped`.
pub fn normalize_category(raw_label: &str) -> CanonicalCategory {
    let label = raw_label.trim().to_lowercase();
    if label.is_empty() {
        return CanonicalCategory::Unmapped;
    }

    if let Some((_, category)) = SYNONYMS.iter().find(|(key, _)| *key == label) {
        return *category;
    }

    let partial = SYNONYMS
        .iter()
        .find(|(key, _)| label.contains(key) || key.contains(label.as_str()));
    if let Some((key, category)) = partial {
        tracing::debug!("Category '{}' partially matched synonym '{}'", raw_label, key);
        return *category;
    }

    CanonicalCategory::Unmapped
}
