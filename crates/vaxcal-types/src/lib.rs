//! Domain model for the vaccination calendar engine
//!
//! This crate defines the reference data and record types shared by the
//! engine crates:
//! - Vaccines and the read-only [`CalendarCatalog`]
//! - Age-windowed calendar templates ([`CalendarWindow`])
//! - Vaccination records, their [`Bucket`] classification and the
//!   per-child [`RecordStore`]
//! - The [`Child`] identity consumed for age arithmetic

pub mod calendar;
pub mod child;
pub mod record;
pub mod vaccine;

pub use calendar::{AgeUnit, CalendarCatalog, CalendarWindow, WindowVaccine};
pub use child::Child;
pub use record::{Bucket, RecordStore, VaccinationRecord, parse_record_date};
pub use vaccine::Vaccine;
