//! Calendar windows and the read-only reference catalog
//!
//! A calendar window is an age-based eligibility template: it declares, for
//! a given age (or age range) expressed in weeks, months or years, which
//! vaccine doses are appropriate. A window with an empty vaccine list is
//! unconstrained and may be used by any vaccine/dose pair.

use crate::vaccine::Vaccine;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Unit in which a calendar window expresses ages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeUnit {
    Weeks,
    Months,
    Years,
}

impl fmt::Display for AgeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeUnit::Weeks => write!(f, "weeks"),
            AgeUnit::Months => write!(f, "months"),
            AgeUnit::Years => write!(f, "years"),
        }
    }
}

/// A vaccine entry inside a calendar window: the vaccine and the dose
/// numbers the window declares for it.
///
/// The external store must send `doseNumbers`, not bare vaccine ids,
/// otherwise dose filtering cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowVaccine {
    pub vaccine_id: String,
    pub dose_numbers: SmallVec<[u32; 4]>,
}

impl WindowVaccine {
    pub fn new(vaccine_id: impl Into<String>, dose_numbers: impl IntoIterator<Item = u32>) -> Self {
        Self {
            vaccine_id: vaccine_id.into(),
            dose_numbers: dose_numbers.into_iter().collect(),
        }
    }
}

/// An age-windowed calendar template.
///
/// Exactly one of `specific_age` or the `(min_age, max_age)` pair is
/// meaningful; the range bounds may be open on either end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWindow {
    /// Identifier assigned by the external store
    pub id: String,
    /// Optional human-readable description, preferred as the display label
    #[serde(default)]
    pub description: Option<String>,
    /// Unit for `specific_age` / `min_age` / `max_age`
    pub age_unit: AgeUnit,
    /// Exact age at which the window applies
    #[serde(default)]
    pub specific_age: Option<u32>,
    /// Lower bound of the age range (inclusive)
    #[serde(default)]
    pub min_age: Option<u32>,
    /// Upper bound of the age range (inclusive)
    #[serde(default)]
    pub max_age: Option<u32>,
    /// Declared vaccine/dose pairs; empty means unconstrained
    #[serde(default)]
    pub vaccines: Vec<WindowVaccine>,
}

impl CalendarWindow {
    /// Whether this window places no constraint on vaccine/dose pairs
    pub fn is_unconstrained(&self) -> bool {
        self.vaccines.is_empty()
    }

    /// The declared dose numbers for `vaccine_id`, if the window lists it
    pub fn declared_doses(&self, vaccine_id: &str) -> Option<&[u32]> {
        self.vaccines
            .iter()
            .find(|v| v.vaccine_id == vaccine_id)
            .map(|v| v.dose_numbers.as_slice())
    }

    /// Whether the window lists `vaccine_id` at all
    pub fn lists_vaccine(&self, vaccine_id: &str) -> bool {
        self.vaccines.iter().any(|v| v.vaccine_id == vaccine_id)
    }

    /// Whether `(vaccine_id, dose)` may use this window: either the window
    /// is unconstrained, or the pair appears in its declared set.
    pub fn allows(&self, vaccine_id: &str, dose: u32) -> bool {
        self.is_unconstrained()
            || self
                .declared_doses(vaccine_id)
                .is_some_and(|doses| doses.contains(&dose))
    }

    /// Whether an age expressed in this window's own unit falls inside the
    /// window. A window with neither a specific age nor range bounds is
    /// always open.
    pub fn contains_age(&self, age: u32) -> bool {
        if let Some(specific) = self.specific_age {
            return age == specific;
        }
        self.min_age.is_none_or(|min| age >= min) && self.max_age.is_none_or(|max| age <= max)
    }

    /// Presentation label derived from the age constraint, used when no
    /// description is set (e.g. "at 6 weeks", "9-12 months").
    pub fn age_label(&self) -> String {
        match (self.specific_age, self.min_age, self.max_age) {
            (Some(age), _, _) => format!("at {} {}", age, self.age_unit),
            (None, Some(min), Some(max)) => format!("{}-{} {}", min, max, self.age_unit),
            (None, Some(min), None) => format!("from {} {}", min, self.age_unit),
            (None, None, Some(max)) => format!("up to {} {}", max, self.age_unit),
            (None, None, None) => "any age".to_string(),
        }
    }

    /// The label shown to operators: the description when present,
    /// otherwise the derived age label. Option lists sort on this.
    pub fn label(&self) -> String {
        self.description.clone().unwrap_or_else(|| self.age_label())
    }
}

/// Read-only registry of vaccines and calendar windows.
///
/// Built from lists fetched by an external collaborator and passed into the
/// engine as an explicit snapshot; the engine never reaches into ambient
/// state for reference data. Lookups on unknown ids return `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarCatalog {
    vaccines: IndexMap<String, Vaccine>,
    windows: IndexMap<String, CalendarWindow>,
}

impl CalendarCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from fetched reference lists. Later duplicates of an
    /// id replace earlier ones, matching store overwrite semantics.
    pub fn from_parts(
        vaccines: impl IntoIterator<Item = Vaccine>,
        windows: impl IntoIterator<Item = CalendarWindow>,
    ) -> Self {
        Self {
            vaccines: vaccines.into_iter().map(|v| (v.id.clone(), v)).collect(),
            windows: windows.into_iter().map(|w| (w.id.clone(), w)).collect(),
        }
    }

    /// Look up a vaccine by id
    pub fn vaccine(&self, id: &str) -> Option<&Vaccine> {
        self.vaccines.get(id)
    }

    /// Look up a calendar window by id
    pub fn window(&self, id: &str) -> Option<&CalendarWindow> {
        self.windows.get(id)
    }

    /// All vaccines in insertion order
    pub fn vaccines(&self) -> impl Iterator<Item = &Vaccine> {
        self.vaccines.values()
    }

    /// All calendar windows in insertion order
    pub fn windows(&self) -> impl Iterator<Item = &CalendarWindow> {
        self.windows.values()
    }

    /// Number of vaccines in the catalog
    pub fn vaccine_count(&self) -> usize {
        self.vaccines.len()
    }

    /// Number of windows in the catalog
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Whether the catalog holds no reference data at all
    pub fn is_empty(&self) -> bool {
        self.vaccines.is_empty() && self.windows.is_empty()
    }
}
