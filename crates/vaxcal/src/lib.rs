//! Child immunization calendar engine
//!
//! This crate tracks one child's immunization status against a structured
//! vaccination calendar:
//!
//! - **Eligibility**: which vaccine doses may legally be scheduled or
//!   entered right now, given the completed history and the age-windowed
//!   calendar templates
//! - **Classification**: which bucket (due / late / overdue / scheduled /
//!   completed) each record sits in, and which open records have slipped
//!   past their date
//! - **Cascading selection**: how the vaccine, calendar window and dose
//!   choices constrain each other during manual record entry
//! - **Lifecycle**: validated create / edit / complete / remove of single
//!   records, with no duplicate or out-of-sequence dose ever committed
//!
//! Reference data and record snapshots are fetched by an external
//! collaborator (see [`model`]); the engine itself is pure and
//! synchronous.
//!
//! # Example
//!
//! ```
//! use vaxcal::engine::{CreateRequest, EligibilityResolver, RecordLifecycleController};
//! use vaxcal::types::{Bucket, CalendarCatalog, RecordStore, Vaccine};
//!
//! let catalog = CalendarCatalog::from_parts([Vaccine::new("penta", "Penta", 3)], []);
//! let store = RecordStore::new();
//!
//! let controller = RecordLifecycleController::new(&catalog);
//! let commit = controller.create(&store, CreateRequest {
//!     id: "r1".to_string(),
//!     bucket: Bucket::Due,
//!     vaccine_id: "penta".to_string(),
//!     calendar_window_id: None,
//!     dose: 1,
//!     date: "2025-01-10T09:00:00Z".to_string(),
//!     administered_by: None,
//! }).unwrap();
//!
//! let resolver = EligibilityResolver::new(&catalog, &commit.store);
//! assert_eq!(resolver.next_allowed_dose("penta"), Some(1));
//! ```

// Re-export all public APIs from internal crates
pub use vaxcal_engine as engine;
pub use vaxcal_model as model;
pub use vaxcal_types as types;

// Convenience re-exports
pub use vaxcal_engine::{
    CascadingSelector, EligibilityResolver, EngineError, EngineResult, RecordLifecycleController,
};
pub use vaxcal_types::{Bucket, CalendarCatalog, Child, RecordStore, VaccinationRecord, Vaccine};
