//! Dose-eligibility and record-classification engine
//!
//! This crate is the core of the vaccination calendar system. Given a
//! catalog snapshot (vaccines + age-windowed calendar templates) and one
//! child's record store, it answers three questions:
//!
//! - **What can be scheduled or entered right now?**
//!   [`EligibilityResolver`] computes the next allowed dose per vaccine,
//!   the windows valid for a vaccine/dose pair and vice versa, and the
//!   selectable dose numbers for any vaccine/window combination.
//! - **How do manual selections constrain each other?**
//!   [`CascadingSelector`] narrows the vaccine, window and dose choices
//!   consistently as the operator picks each field, and never leaves the
//!   triple in an inconsistent state.
//! - **Is this mutation legal?** [`RecordLifecycleController`] validates
//!   create/edit/complete/remove requests against the dose invariants
//!   before committing, returning a typed error and an untouched snapshot
//!   on failure.
//!
//! The engine is synchronous and side-effect-free: every operation takes a
//! snapshot and returns a new snapshot. Fetching reference data and
//! promoting DUE records to LATE by date are jobs for external
//! collaborators.
//!
//! # Example
//!
//! ```
//! use vaxcal_engine::{EligibilityResolver, RecordLifecycleController, CreateRequest};
//! use vaxcal_types::{Bucket, CalendarCatalog, RecordStore, Vaccine};
//!
//! let catalog = CalendarCatalog::from_parts([Vaccine::new("bcg", "BCG", 1)], []);
//! let store = RecordStore::new();
//!
//! let resolver = EligibilityResolver::new(&catalog, &store);
//! assert_eq!(resolver.next_allowed_dose("bcg"), Some(1));
//!
//! let controller = RecordLifecycleController::new(&catalog);
//! let commit = controller.create(&store, CreateRequest {
//!     id: "r1".to_string(),
//!     bucket: Bucket::Due,
//!     vaccine_id: "bcg".to_string(),
//!     calendar_window_id: None,
//!     dose: 1,
//!     date: "2025-01-10T09:00:00Z".to_string(),
//!     administered_by: None,
//! }).unwrap();
//! assert_eq!(commit.store.len(), 1);
//! ```

pub mod error;
pub mod lifecycle;
pub mod resolver;
pub mod selector;

// Re-export main types
pub use error::{EngineError, EngineResult, ResourceKind};
pub use lifecycle::{Commit, CreateRequest, EditRequest, RecordLifecycleController};
pub use resolver::{DoseOffer, EligibilityResolver, SelectionMode, WindowOffer};
pub use selector::{CascadingSelector, SelectionEvent, SelectionOptions, SelectionState};
