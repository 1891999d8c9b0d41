//! Record Lifecycle Tests
//!
//! Tests for: Create, Edit, Complete, Remove, the per-slot state machine
//! and the dose-uniqueness invariants.

use pretty_assertions::assert_eq;
use vaxcal_engine::{
    Commit, CreateRequest, EditRequest, EngineError, RecordLifecycleController, ResourceKind,
};
use vaxcal_types::{
    AgeUnit, Bucket, CalendarCatalog, CalendarWindow, RecordStore, Vaccine, WindowVaccine,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn catalog() -> CalendarCatalog {
    CalendarCatalog::from_parts(
        [
            Vaccine::new("bcg", "BCG", 1),
            Vaccine::new("polio", "Polio", 3),
            Vaccine::new("penta", "Penta", 3),
        ],
        [CalendarWindow {
            id: "w6".to_string(),
            description: Some("Six weeks".to_string()),
            age_unit: AgeUnit::Weeks,
            specific_age: Some(6),
            min_age: None,
            max_age: None,
            vaccines: vec![WindowVaccine::new("polio", [2])],
        }],
    )
}

fn create_request(id: &str, vaccine: &str, dose: u32) -> CreateRequest {
    CreateRequest {
        id: id.to_string(),
        bucket: Bucket::Due,
        vaccine_id: vaccine.to_string(),
        calendar_window_id: None,
        dose,
        date: "2025-01-10T09:00:00Z".to_string(),
        administered_by: None,
    }
}

fn edit_request(vaccine: &str, dose: u32) -> EditRequest {
    EditRequest {
        bucket: Bucket::Due,
        vaccine_id: vaccine.to_string(),
        calendar_window_id: None,
        dose,
        date: "2025-01-10T09:00:00Z".to_string(),
        administered_by: None,
    }
}

/// No two records for the same vaccine may claim the same dose, across all
/// buckets, and no COMPLETED duplicate may exist.
fn assert_dose_invariants(store: &RecordStore) {
    let mut seen = std::collections::HashSet::new();
    for record in store.iter() {
        assert!(
            seen.insert((record.vaccine_id.clone(), record.dose)),
            "duplicate claim for {} dose {}",
            record.vaccine_id,
            record.dose
        );
    }
}

// ============================================================================
// Create Tests
// ============================================================================

#[test]
fn create_then_duplicate_create_conflicts() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let store = RecordStore::new();

    // BCG requires one dose and none is completed yet
    let Commit { store, record } = controller
        .create(&store, create_request("r1", "bcg", 1))
        .unwrap();
    assert_eq!(record.bucket, Bucket::Due);
    assert_eq!(record.vaccine_name, "BCG");
    assert_eq!(store.len(), 1);

    let err = controller
        .create(&store, create_request("r2", "bcg", 1))
        .unwrap_err();
    assert!(err.is_conflict());
    assert_dose_invariants(&store);
}

#[test]
fn create_rejects_unknown_vaccine() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let err = controller
        .create(&RecordStore::new(), create_request("r1", "flu", 1))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::not_found(ResourceKind::Vaccine, "flu")
    );
}

#[test]
fn create_rejects_unknown_window() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let mut request = create_request("r1", "polio", 2);
    request.calendar_window_id = Some("w99".to_string());

    let err = controller.create(&RecordStore::new(), request).unwrap_err();
    assert_eq!(
        err,
        EngineError::not_found(ResourceKind::CalendarWindow, "w99")
    );
}

#[test]
fn create_enforces_the_window_constraint() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    // w6 declares {polio: [2]} only
    let mut request = create_request("r1", "polio", 1);
    request.calendar_window_id = Some("w6".to_string());
    let err = controller.create(&RecordStore::new(), request).unwrap_err();
    assert_eq!(err.field(), Some("calendarWindowId"));

    let mut request = create_request("r1", "penta", 1);
    request.calendar_window_id = Some("w6".to_string());
    let err = controller.create(&RecordStore::new(), request).unwrap_err();
    assert_eq!(err.field(), Some("calendarWindowId"));

    let mut request = create_request("r1", "polio", 2);
    request.calendar_window_id = Some("w6".to_string());
    assert!(controller.create(&RecordStore::new(), request).is_ok());
}

#[test]
fn create_rejects_out_of_range_dose() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let err = controller
        .create(&RecordStore::new(), create_request("r1", "bcg", 2))
        .unwrap_err();
    assert_eq!(err.field(), Some("dose"));
}

#[test]
fn create_rejects_unparsable_date() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let mut request = create_request("r1", "bcg", 1);
    request.date = "soon".to_string();

    let err = controller.create(&RecordStore::new(), request).unwrap_err();
    assert_eq!(err.field(), Some("date"));
}

#[test]
fn create_accepts_bare_dates() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let mut request = create_request("r1", "bcg", 1);
    request.date = "2025-01-10".to_string();

    let commit = controller.create(&RecordStore::new(), request).unwrap();
    assert_eq!(
        commit.record.date.unwrap().to_rfc3339(),
        "2025-01-10T00:00:00+00:00"
    );
}

#[test]
fn create_rejects_duplicate_or_blank_record_ids() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "bcg", 1))
        .unwrap();

    let err = controller
        .create(&store, create_request("r1", "polio", 1))
        .unwrap_err();
    assert_eq!(err.field(), Some("id"));

    let err = controller
        .create(&store, create_request("  ", "polio", 1))
        .unwrap_err();
    assert_eq!(err.field(), Some("id"));
}

#[test]
fn failed_create_leaves_the_snapshot_untouched() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "bcg", 1))
        .unwrap();
    let before = store.clone();

    let _ = controller
        .create(&store, create_request("r2", "bcg", 1))
        .unwrap_err();
    assert_eq!(store, before);
}

// ============================================================================
// Sequencing Tests
// ============================================================================

#[test]
fn completed_history_gates_the_next_dose() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let store = RecordStore::new();

    // Administer penta dose 1
    let Commit { store, .. } = controller
        .create(&store, create_request("r1", "penta", 1))
        .unwrap();
    let Commit { store, .. } = controller
        .complete(&store, "r1", "2025-02-01T10:00:00Z", Some("nurse-7".to_string()))
        .unwrap();

    // Re-entering dose 1 is rejected, dose 2 goes through
    let err = controller
        .create(&store, create_request("r2", "penta", 1))
        .unwrap_err();
    assert!(err.is_conflict());

    let Commit { store, .. } = controller
        .create(&store, create_request("r2", "penta", 2))
        .unwrap();
    assert_dose_invariants(&store);
}

// ============================================================================
// Edit Tests
// ============================================================================

#[test]
fn edit_excludes_itself_from_the_duplicate_check() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "polio", 1))
        .unwrap();

    // Re-submitting the same dose for the same record is not a conflict
    let mut request = edit_request("polio", 1);
    request.bucket = Bucket::Scheduled;
    request.date = "2025-03-01T09:00:00Z".to_string();
    let Commit { store, record } = controller.edit(&store, "r1", request).unwrap();
    assert_eq!(record.bucket, Bucket::Scheduled);
    assert_eq!(store.len(), 1);
    assert_dose_invariants(&store);
}

#[test]
fn edit_conflicts_with_other_records_claims() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "polio", 1))
        .unwrap();
    let Commit { store, .. } = controller
        .create(&store, create_request("r2", "polio", 2))
        .unwrap();

    let err = controller
        .edit(&store, "r2", edit_request("polio", 1))
        .unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn edit_of_a_missing_record_is_not_found() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let err = controller
        .edit(&RecordStore::new(), "ghost", edit_request("polio", 1))
        .unwrap_err();
    assert_eq!(err, EngineError::not_found(ResourceKind::Record, "ghost"));
}

#[test]
fn edit_treats_the_window_link_as_advisory() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "polio", 1))
        .unwrap();

    // w6 declares {polio: [2]}, but an edit may keep dose 1 under it:
    // the calendar changed, the history did not
    let mut request = edit_request("polio", 1);
    request.calendar_window_id = Some("w6".to_string());
    let commit = controller.edit(&store, "r1", request).unwrap();
    assert_eq!(commit.record.calendar_window_id.as_deref(), Some("w6"));
    assert_eq!(commit.record.dose, 1);
}

#[test]
fn edit_never_reopens_a_completed_record() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "bcg", 1))
        .unwrap();
    let Commit { store, .. } = controller
        .complete(&store, "r1", "2025-02-01T10:00:00Z", None)
        .unwrap();

    let err = controller
        .edit(&store, "r1", edit_request("bcg", 1))
        .unwrap_err();
    assert_eq!(err.field(), Some("bucket"));
}

// ============================================================================
// Complete Tests
// ============================================================================

#[test]
fn complete_replaces_the_open_record_atomically() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "penta", 1))
        .unwrap();
    let Commit { store, record } = controller
        .complete(&store, "r1", "2025-02-01T10:00:00Z", Some("nurse-7".to_string()))
        .unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(record.id, "r1");
    assert_eq!(record.bucket, Bucket::Completed);
    assert_eq!(record.administered_by.as_deref(), Some("nurse-7"));
    assert_eq!(store.in_bucket(Bucket::Due).count(), 0);
    assert_eq!(store.in_bucket(Bucket::Completed).count(), 1);
}

#[test]
fn complete_is_an_idempotency_guard() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "penta", 1))
        .unwrap();
    let Commit { store: after_first, .. } = controller
        .complete(&store, "r1", "2025-02-01T10:00:00Z", None)
        .unwrap();

    let err = controller
        .complete(&after_first, "r1", "2025-02-02T10:00:00Z", None)
        .unwrap_err();
    assert!(err.is_conflict());
    // The store is unchanged compared to after the first call
    assert_eq!(after_first.in_bucket(Bucket::Completed).count(), 1);
}

#[test]
fn complete_rejects_a_second_record_for_an_already_completed_dose() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    // Two records for the same slot can only exist if the snapshot came
    // from outside; completion still refuses to double-administer
    let store = RecordStore::from_records([
        vaxcal_types::VaccinationRecord {
            id: "r1".to_string(),
            bucket: Bucket::Completed,
            vaccine_id: "penta".to_string(),
            vaccine_name: "Penta".to_string(),
            dose: 1,
            calendar_window_id: None,
            date: None,
            administered_by: None,
        },
        vaxcal_types::VaccinationRecord {
            id: "r2".to_string(),
            bucket: Bucket::Overdue,
            vaccine_id: "penta".to_string(),
            vaccine_name: "Penta".to_string(),
            dose: 1,
            calendar_window_id: None,
            date: None,
            administered_by: None,
        },
    ]);

    let err = controller
        .complete(&store, "r2", "2025-02-01T10:00:00Z", None)
        .unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn complete_of_a_missing_record_is_not_found() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let err = controller
        .complete(&RecordStore::new(), "ghost", "2025-02-01T10:00:00Z", None)
        .unwrap_err();
    assert_eq!(err, EngineError::not_found(ResourceKind::Record, "ghost"));
}

#[test]
fn complete_validates_the_completion_date() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "bcg", 1))
        .unwrap();
    let err = controller
        .complete(&store, "r1", "yesterday-ish", None)
        .unwrap_err();
    assert_eq!(err.field(), Some("date"));
    // Validation failed before any mutation: the record is still open
    assert_eq!(store.in_bucket(Bucket::Due).count(), 1);
}

// ============================================================================
// Remove Tests
// ============================================================================

#[test]
fn remove_returns_the_slot_to_empty() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);

    let Commit { store, .. } = controller
        .create(&RecordStore::new(), create_request("r1", "bcg", 1))
        .unwrap();
    let Commit { store, record } = controller.remove(&store, "r1").unwrap();
    assert!(store.is_empty());
    assert_eq!(record.id, "r1");

    // The slot is free again
    assert!(controller.create(&store, create_request("r2", "bcg", 1)).is_ok());
}

#[test]
fn remove_of_a_missing_record_is_not_found() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let err = controller.remove(&RecordStore::new(), "ghost").unwrap_err();
    assert_eq!(err, EngineError::not_found(ResourceKind::Record, "ghost"));
}

// ============================================================================
// Invariant Preservation
// ============================================================================

#[test]
fn invariants_hold_across_a_mixed_operation_sequence() {
    let catalog = catalog();
    let controller = RecordLifecycleController::new(&catalog);
    let store = RecordStore::new();

    let Commit { store, .. } = controller
        .create(&store, create_request("r1", "penta", 1))
        .unwrap();
    let Commit { store, .. } = controller
        .create(&store, create_request("r2", "polio", 1))
        .unwrap();
    let Commit { store, .. } = controller
        .complete(&store, "r1", "2025-02-01T10:00:00Z", None)
        .unwrap();
    let Commit { store, .. } = controller
        .create(&store, create_request("r3", "penta", 2))
        .unwrap();
    let mut scheduled = edit_request("polio", 2);
    scheduled.bucket = Bucket::Scheduled;
    let Commit { store, .. } = controller.edit(&store, "r2", scheduled).unwrap();
    let Commit { store, .. } = controller.remove(&store, "r3").unwrap();
    let Commit { store, .. } = controller
        .create(&store, create_request("r4", "penta", 2))
        .unwrap();

    assert_dose_invariants(&store);
    assert_eq!(store.len(), 3);
}
