//! Eligibility resolution over a catalog + record-store snapshot
//!
//! All functions here are pure reads and total: an id absent from the
//! snapshot yields an empty result, never an error. "No eligible options"
//! is a valid state the operator is told about, not a fault.

use chrono::{DateTime, NaiveDate, Utc};
use vaxcal_types::{Bucket, CalendarCatalog, CalendarWindow, Child, RecordStore, VaccinationRecord};

/// Whether option sets are being computed for a brand-new record or for an
/// edit of an existing one.
///
/// New records only offer the next allowed dose per vaccine; edits may
/// reference any dose the window declares, so history is never silently
/// invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    NewRecord,
    Edit,
}

/// A schedulable vaccine/dose pair offered to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseOffer {
    pub vaccine_id: String,
    pub vaccine_name: String,
    pub dose: u32,
}

/// A vaccine offered within a calendar window, with its valid dose numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOffer {
    pub vaccine_id: String,
    pub vaccine_name: String,
    pub valid_doses: Vec<u32>,
}

/// Pure read layer over one `(CalendarCatalog, RecordStore)` snapshot.
///
/// The resolver borrows the snapshot it was handed and never reaches into
/// ambient state; callers re-create it whenever the snapshot is refreshed.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityResolver<'a> {
    catalog: &'a CalendarCatalog,
    store: &'a RecordStore,
}

impl<'a> EligibilityResolver<'a> {
    /// Create a resolver over a snapshot
    pub fn new(catalog: &'a CalendarCatalog, store: &'a RecordStore) -> Self {
        Self { catalog, store }
    }

    /// The catalog this resolver reads from
    pub fn catalog(&self) -> &'a CalendarCatalog {
        self.catalog
    }

    /// The record store this resolver reads from
    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    /// The next dose number the series allows for `vaccine_id`: one more
    /// than the highest COMPLETED dose, or `None` once the series is
    /// finished (or the vaccine is unknown).
    pub fn next_allowed_dose(&self, vaccine_id: &str) -> Option<u32> {
        let vaccine = self.catalog.vaccine(vaccine_id)?;
        let next = self.store.max_completed_dose(vaccine_id).unwrap_or(0) + 1;
        if next > vaccine.doses_required {
            None
        } else {
            Some(next)
        }
    }

    /// The next dose that can actually be offered for scheduling: the next
    /// allowed dose, unless an open record already claims it.
    pub fn next_schedulable_dose(&self, vaccine_id: &str) -> Option<u32> {
        let next = self.next_allowed_dose(vaccine_id)?;
        if self.store.open_claim(vaccine_id, next, None).is_some() {
            None
        } else {
            Some(next)
        }
    }

    /// Every vaccine with a schedulable dose right now, in catalog order.
    /// An empty list means "no vaccine available to schedule".
    pub fn schedulable_vaccines(&self) -> Vec<DoseOffer> {
        self.catalog
            .vaccines()
            .filter_map(|v| {
                self.next_schedulable_dose(&v.id).map(|dose| DoseOffer {
                    vaccine_id: v.id.clone(),
                    vaccine_name: v.name.clone(),
                    dose,
                })
            })
            .collect()
    }

    /// Calendar windows usable for `(vaccine_id, dose)`: unconstrained
    /// windows plus those declaring the pair, in stable label order.
    pub fn windows_for_vaccine(&self, vaccine_id: &str, dose: u32) -> Vec<&'a CalendarWindow> {
        if self.catalog.vaccine(vaccine_id).is_none() {
            return Vec::new();
        }
        let mut windows: Vec<&CalendarWindow> = self
            .catalog
            .windows()
            .filter(|w| w.allows(vaccine_id, dose))
            .collect();
        sort_by_label(&mut windows);
        windows
    }

    /// Vaccines offered within a window, with their valid dose numbers.
    ///
    /// For [`SelectionMode::NewRecord`] the declared doses are intersected
    /// with the next schedulable dose, so a dose an open record already
    /// claims is never offered only to conflict at create. For
    /// [`SelectionMode::Edit`] the full declared set (clamped to the series
    /// length) is kept. Vaccines with no valid dose left are omitted.
    pub fn vaccines_for_window(&self, window_id: &str, mode: SelectionMode) -> Vec<WindowOffer> {
        let Some(window) = self.catalog.window(window_id) else {
            return Vec::new();
        };
        self.catalog
            .vaccines()
            .filter_map(|vaccine| {
                let declared = if window.is_unconstrained() {
                    None
                } else {
                    Some(window.declared_doses(&vaccine.id)?)
                };
                let valid_doses: Vec<u32> = match mode {
                    SelectionMode::NewRecord => self
                        .next_schedulable_dose(&vaccine.id)
                        .filter(|next| declared.is_none_or(|doses| doses.contains(next)))
                        .into_iter()
                        .collect(),
                    SelectionMode::Edit => match declared {
                        Some(doses) => doses
                            .iter()
                            .copied()
                            .filter(|d| vaccine.accepts_dose(*d))
                            .collect(),
                        None => vaccine.dose_range().collect(),
                    },
                };
                if valid_doses.is_empty() {
                    return None;
                }
                Some(WindowOffer {
                    vaccine_id: vaccine.id.clone(),
                    vaccine_name: vaccine.name.clone(),
                    valid_doses,
                })
            })
            .collect()
    }

    /// Dose numbers selectable for a vaccine under an optional window: the
    /// window's declared set when it names the vaccine, otherwise the full
    /// `1..=doses_required` range. Never a dose outside the series.
    pub fn doses_for_selection(&self, vaccine_id: &str, window_id: Option<&str>) -> Vec<u32> {
        let Some(vaccine) = self.catalog.vaccine(vaccine_id) else {
            return Vec::new();
        };
        if let Some(declared) = window_id
            .and_then(|id| self.catalog.window(id))
            .and_then(|w| w.declared_doses(vaccine_id))
        {
            return declared
                .iter()
                .copied()
                .filter(|d| vaccine.accepts_dose(*d))
                .collect();
        }
        vaccine.dose_range().collect()
    }

    /// Whether an open DUE or SCHEDULED record has slipped past `now` and
    /// is a candidate for promotion to LATE.
    ///
    /// The promotion itself is an external scheduled job; the engine only
    /// reports the comparison.
    pub fn is_overdue_candidate(&self, record: &VaccinationRecord, now: DateTime<Utc>) -> bool {
        matches!(record.bucket, Bucket::Due | Bucket::Scheduled)
            && record.date.is_some_and(|date| date < now)
    }

    /// All records currently eligible for promotion to LATE
    pub fn overdue_candidates(&self, now: DateTime<Utc>) -> Vec<&'a VaccinationRecord> {
        self.store
            .iter()
            .filter(|r| self.is_overdue_candidate(r, now))
            .collect()
    }

    /// Calendar windows whose age constraint contains the child's current
    /// age (expressed in each window's own unit), in stable label order.
    pub fn windows_open_for(&self, child: &Child, today: NaiveDate) -> Vec<&'a CalendarWindow> {
        let mut windows: Vec<&CalendarWindow> = self
            .catalog
            .windows()
            .filter(|w| w.contains_age(child.age_in(w.age_unit, today)))
            .collect();
        sort_by_label(&mut windows);
        windows
    }
}

/// Presentation ordering: label first, id as tie-breaker so equal labels
/// stay deterministic.
pub(crate) fn sort_by_label(windows: &mut [&CalendarWindow]) {
    windows.sort_by(|a, b| a.label().cmp(&b.label()).then_with(|| a.id.cmp(&b.id)));
}
