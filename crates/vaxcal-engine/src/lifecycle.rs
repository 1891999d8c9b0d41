//! Record lifecycle orchestration
//!
//! Create, edit, complete and remove operations over one child's record
//! set. Every operation is validate-then-commit against the snapshot it
//! was handed: validation runs to completion before any mutation, and on
//! failure the caller's snapshot is returned untouched, so no partial
//! state is ever observable.
//!
//! State machine per dose-slot of a vaccine:
//! `∅ → {DUE|LATE|OVERDUE|SCHEDULED} → COMPLETED`, with `remove` able to
//! return any non-terminal slot to `∅`. COMPLETED is terminal.

use crate::error::{EngineError, EngineResult, ResourceKind};
use crate::resolver::EligibilityResolver;
use chrono::{DateTime, Utc};
use vaxcal_types::{
    Bucket, CalendarCatalog, CalendarWindow, RecordStore, Vaccine, VaccinationRecord,
    parse_record_date,
};

/// Fields for creating a record manually.
///
/// The record id is assigned by the external store and supplied by the
/// caller; this engine owns no id sequence.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub id: String,
    pub bucket: Bucket,
    pub vaccine_id: String,
    pub calendar_window_id: Option<String>,
    pub dose: u32,
    /// ISO-8601 timestamp, semantics per bucket
    pub date: String,
    pub administered_by: Option<String>,
}

/// Fields for editing an existing record. Everything but the id may change.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub bucket: Bucket,
    pub vaccine_id: String,
    pub calendar_window_id: Option<String>,
    pub dose: u32,
    pub date: String,
    pub administered_by: Option<String>,
}

/// Result of a successful lifecycle operation: the updated record set plus
/// the record the operation touched (for `remove`, the removed record).
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub store: RecordStore,
    pub record: VaccinationRecord,
}

/// Orchestrates single-record mutations, enforcing the dose invariants
/// before anything reaches the store.
#[derive(Debug, Clone, Copy)]
pub struct RecordLifecycleController<'a> {
    catalog: &'a CalendarCatalog,
}

impl<'a> RecordLifecycleController<'a> {
    /// Create a controller over the current catalog snapshot
    pub fn new(catalog: &'a CalendarCatalog) -> Self {
        Self { catalog }
    }

    /// Manually create a record.
    ///
    /// Validates the vaccine and window references, the dose against
    /// `doses_for_selection`, the date format, id freshness, and that no
    /// record (open or completed) already claims `(vaccine_id, dose)`.
    pub fn create(&self, store: &RecordStore, request: CreateRequest) -> EngineResult<Commit> {
        if request.id.trim().is_empty() {
            return Err(EngineError::validation("id", "record id is required"));
        }
        if store.contains(&request.id) {
            return Err(EngineError::validation(
                "id",
                format!("record '{}' already exists", request.id),
            ));
        }

        let vaccine = self.require_vaccine(&request.vaccine_id)?;
        let window = self.require_window(request.calendar_window_id.as_deref())?;

        // The window link is authoritative at creation time
        if let Some(window) = window
            && !window.allows(&request.vaccine_id, request.dose)
        {
            return Err(EngineError::validation(
                "calendarWindowId",
                format!(
                    "window '{}' does not offer {} dose {}",
                    window.label(),
                    vaccine.name,
                    request.dose
                ),
            ));
        }

        let resolver = EligibilityResolver::new(self.catalog, store);
        let selectable =
            resolver.doses_for_selection(&request.vaccine_id, request.calendar_window_id.as_deref());
        if !selectable.contains(&request.dose) {
            return Err(EngineError::validation(
                "dose",
                format!(
                    "dose {} is not selectable for {} (valid: {:?})",
                    request.dose, vaccine.name, selectable
                ),
            ));
        }

        let date = parse_date(&request.date)?;
        self.check_dose_free(store, &request.vaccine_id, request.dose, None)?;

        let record = VaccinationRecord {
            id: request.id,
            bucket: request.bucket,
            vaccine_id: request.vaccine_id,
            vaccine_name: vaccine.name.clone(),
            dose: request.dose,
            calendar_window_id: request.calendar_window_id,
            date: Some(date),
            administered_by: request.administered_by,
        };

        log::debug!(
            "creating {} record {} for {} dose {}",
            record.bucket,
            record.id,
            record.vaccine_id,
            record.dose
        );

        let mut store = store.clone();
        store.insert(record.clone());
        Ok(Commit { store, record })
    }

    /// Edit an existing record.
    ///
    /// Same validation as [`create`](Self::create) with the edited record
    /// excluded from the duplicate-dose checks, and two differences: the
    /// window link is advisory (an edit never fails window compatibility,
    /// so history is not invalidated by later calendar changes), and a
    /// COMPLETED record can never move back to an open bucket.
    pub fn edit(
        &self,
        store: &RecordStore,
        record_id: &str,
        request: EditRequest,
    ) -> EngineResult<Commit> {
        let existing = store
            .get(record_id)
            .ok_or_else(|| EngineError::not_found(ResourceKind::Record, record_id))?;

        if existing.bucket == Bucket::Completed && request.bucket.is_open() {
            return Err(EngineError::validation(
                "bucket",
                "completed records cannot be reopened",
            ));
        }

        let vaccine = self.require_vaccine(&request.vaccine_id)?;
        self.require_window(request.calendar_window_id.as_deref())?;

        if !vaccine.accepts_dose(request.dose) {
            return Err(EngineError::validation(
                "dose",
                format!(
                    "dose {} is outside 1..={} for {}",
                    request.dose, vaccine.doses_required, vaccine.name
                ),
            ));
        }

        let date = parse_date(&request.date)?;
        self.check_dose_free(store, &request.vaccine_id, request.dose, Some(record_id))?;

        let record = VaccinationRecord {
            id: existing.id.clone(),
            bucket: request.bucket,
            vaccine_id: request.vaccine_id,
            vaccine_name: vaccine.name.clone(),
            dose: request.dose,
            calendar_window_id: request.calendar_window_id,
            date: Some(date),
            administered_by: request.administered_by,
        };

        log::debug!("editing record {} ({} dose {})", record.id, record.vaccine_id, record.dose);

        let mut store = store.clone();
        store.insert(record.clone());
        Ok(Commit { store, record })
    }

    /// Mark a record as administered.
    ///
    /// Atomically replaces the open record with an equivalent COMPLETED
    /// one (same id, `administered_at` = completion date). Completing an
    /// already-completed dose is a conflict, which makes the operation an
    /// idempotency guard against double submission.
    pub fn complete(
        &self,
        store: &RecordStore,
        record_id: &str,
        completion_date: &str,
        administered_by: Option<String>,
    ) -> EngineResult<Commit> {
        let existing = store
            .get(record_id)
            .ok_or_else(|| EngineError::not_found(ResourceKind::Record, record_id))?;

        if existing.bucket == Bucket::Completed {
            return Err(EngineError::conflict(
                &existing.vaccine_id,
                existing.dose,
                "record is already completed",
            ));
        }
        if store
            .completed_claim(&existing.vaccine_id, existing.dose, None)
            .is_some()
        {
            return Err(EngineError::conflict(
                &existing.vaccine_id,
                existing.dose,
                "a completed record for this dose already exists",
            ));
        }

        let administered_at = parse_date(completion_date)?;

        let record = VaccinationRecord {
            bucket: Bucket::Completed,
            date: Some(administered_at),
            administered_by,
            ..existing.clone()
        };

        log::debug!(
            "completing record {} ({} dose {})",
            record.id,
            record.vaccine_id,
            record.dose
        );

        let mut store = store.clone();
        store.remove(record_id);
        store.insert(record.clone());
        Ok(Commit { store, record })
    }

    /// Delete a record from whichever bucket holds it. No cascading side
    /// effects on other records.
    pub fn remove(&self, store: &RecordStore, record_id: &str) -> EngineResult<Commit> {
        if !store.contains(record_id) {
            return Err(EngineError::not_found(ResourceKind::Record, record_id));
        }

        log::debug!("removing record {record_id}");

        let mut store = store.clone();
        let record = store
            .remove(record_id)
            .ok_or_else(|| EngineError::not_found(ResourceKind::Record, record_id))?;
        Ok(Commit { store, record })
    }

    fn require_vaccine(&self, vaccine_id: &str) -> EngineResult<&'a Vaccine> {
        self.catalog
            .vaccine(vaccine_id)
            .ok_or_else(|| EngineError::not_found(ResourceKind::Vaccine, vaccine_id))
    }

    fn require_window(&self, window_id: Option<&str>) -> EngineResult<Option<&'a CalendarWindow>> {
        match window_id {
            None => Ok(None),
            Some(id) => self
                .catalog
                .window(id)
                .map(Some)
                .ok_or_else(|| EngineError::not_found(ResourceKind::CalendarWindow, id)),
        }
    }

    /// Dose-uniqueness invariant: no open record and no COMPLETED record
    /// may already claim the slot, across all buckets at once.
    fn check_dose_free(
        &self,
        store: &RecordStore,
        vaccine_id: &str,
        dose: u32,
        exclude: Option<&str>,
    ) -> EngineResult<()> {
        if store.completed_claim(vaccine_id, dose, exclude).is_some() {
            return Err(EngineError::conflict(
                vaccine_id,
                dose,
                "dose is already completed",
            ));
        }
        if store.open_claim(vaccine_id, dose, exclude).is_some() {
            return Err(EngineError::conflict(
                vaccine_id,
                dose,
                "dose is already claimed by an open record",
            ));
        }
        Ok(())
    }
}

fn parse_date(value: &str) -> EngineResult<DateTime<Utc>> {
    if value.trim().is_empty() {
        return Err(EngineError::validation("date", "date is required"));
    }
    parse_record_date(value)
        .map_err(|err| EngineError::validation("date", format!("'{value}' is not a valid date: {err}")))
}
