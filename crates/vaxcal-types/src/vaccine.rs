//! Vaccine reference data

use serde::{Deserialize, Serialize};

/// A vaccine as declared by the external reference-data collaborator.
///
/// Immutable within an engine invocation; a refreshed catalog snapshot
/// replaces the whole set rather than mutating individual entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccine {
    /// Identifier assigned by the external store
    pub id: String,
    /// Display name (e.g. "BCG", "Penta")
    pub name: String,
    /// Number of doses in the full series, 1-based and at least 1
    pub doses_required: u32,
}

impl Vaccine {
    /// Create a new vaccine entry
    pub fn new(id: impl Into<String>, name: impl Into<String>, doses_required: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            doses_required,
        }
    }

    /// The full dose-number range `1..=doses_required`
    pub fn dose_range(&self) -> impl Iterator<Item = u32> + use<> {
        1..=self.doses_required
    }

    /// Whether `dose` is a valid dose number for this vaccine
    pub fn accepts_dose(&self, dose: u32) -> bool {
        dose >= 1 && dose <= self.doses_required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dose_range_is_one_based() {
        let v = Vaccine::new("penta", "Penta", 3);
        assert_eq!(v.dose_range().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(v.accepts_dose(1));
        assert!(v.accepts_dose(3));
        assert!(!v.accepts_dose(0));
        assert!(!v.accepts_dose(4));
    }
}
