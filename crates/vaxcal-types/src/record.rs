//! Vaccination records, bucket classification and the per-child store

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification a vaccination record currently holds.
///
/// All buckets except [`Bucket::Completed`] are "open": the dose has been
/// planned or missed but not administered. Date-driven promotion between
/// DUE, LATE and OVERDUE happens in an external scheduled job, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bucket {
    /// Planned, target date in the future (or not yet reclassified)
    Due,
    /// Target date passed recently
    Late,
    /// Target date passed beyond the grace period
    Overdue,
    /// Booked through the appointment collaborator
    Scheduled,
    /// Administered; terminal
    Completed,
}

impl Bucket {
    /// All buckets, in presentation order
    pub const ALL: [Bucket; 5] = [
        Bucket::Due,
        Bucket::Late,
        Bucket::Overdue,
        Bucket::Scheduled,
        Bucket::Completed,
    ];

    /// Whether a record in this bucket still claims an unadministered dose
    pub fn is_open(&self) -> bool {
        !matches!(self, Bucket::Completed)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Due => write!(f, "due"),
            Bucket::Late => write!(f, "late"),
            Bucket::Overdue => write!(f, "overdue"),
            Bucket::Scheduled => write!(f, "scheduled"),
            Bucket::Completed => write!(f, "completed"),
        }
    }
}

/// A single vaccination record for one child.
///
/// The meaning of `date` follows the bucket: scheduled-for on DUE and
/// SCHEDULED records, due-date on LATE and OVERDUE, administered-at on
/// COMPLETED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationRecord {
    /// Identifier assigned by the external store
    pub id: String,
    /// Current classification
    pub bucket: Bucket,
    /// Vaccine this record belongs to
    pub vaccine_id: String,
    /// Denormalized vaccine name carried for display
    pub vaccine_name: String,
    /// 1-based dose number within the vaccine's series
    pub dose: u32,
    /// Calendar window the record was entered under, if any
    #[serde(default)]
    pub calendar_window_id: Option<String>,
    /// Bucket-dependent timestamp (see type docs)
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Reference to whoever administered the dose, on COMPLETED records
    #[serde(default)]
    pub administered_by: Option<String>,
}

/// Parse a collaborator-supplied timestamp.
///
/// Accepts RFC 3339 (`2025-01-10T09:00:00Z`) and, as the external store
/// also sends bare dates for administered records, plain `YYYY-MM-DD`
/// interpreted as midnight UTC.
pub fn parse_record_date(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(err) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
            .map_err(|_| err),
    }
}

/// The authoritative set of vaccination records for one child.
///
/// One collection keyed by record id, with the bucket as a discriminant on
/// each record, so dose-uniqueness can be checked in one place instead of
/// across five separate lists. The store only enforces id uniqueness;
/// domain invariants are validated by the lifecycle controller before any
/// mutation reaches the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordStore {
    records: IndexMap<String, VaccinationRecord>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a fetched record set. A repeated id replaces the
    /// earlier record, matching store overwrite semantics.
    pub fn from_records(records: impl IntoIterator<Item = VaccinationRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Number of records across all buckets
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&VaccinationRecord> {
        self.records.get(id)
    }

    /// Whether a record with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Insert or replace a record, returning the previous one if any
    pub fn insert(&mut self, record: VaccinationRecord) -> Option<VaccinationRecord> {
        self.records.insert(record.id.clone(), record)
    }

    /// Remove a record by id, preserving the order of the rest
    pub fn remove(&mut self, id: &str) -> Option<VaccinationRecord> {
        self.records.shift_remove(id)
    }

    /// All records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &VaccinationRecord> {
        self.records.values()
    }

    /// Records currently classified under `bucket`
    pub fn in_bucket(&self, bucket: Bucket) -> impl Iterator<Item = &VaccinationRecord> {
        self.iter().filter(move |r| r.bucket == bucket)
    }

    /// Records in any open bucket (everything but COMPLETED)
    pub fn open_records(&self) -> impl Iterator<Item = &VaccinationRecord> {
        self.iter().filter(|r| r.bucket.is_open())
    }

    /// Dose numbers with a COMPLETED record for `vaccine_id`
    pub fn completed_doses(&self, vaccine_id: &str) -> impl Iterator<Item = u32> {
        self.in_bucket(Bucket::Completed)
            .filter(move |r| r.vaccine_id == vaccine_id)
            .map(|r| r.dose)
    }

    /// Highest completed dose number for `vaccine_id`, if any
    pub fn max_completed_dose(&self, vaccine_id: &str) -> Option<u32> {
        self.completed_doses(vaccine_id).max()
    }

    /// The COMPLETED record for `(vaccine_id, dose)`, if one exists,
    /// ignoring `exclude`
    pub fn completed_claim(
        &self,
        vaccine_id: &str,
        dose: u32,
        exclude: Option<&str>,
    ) -> Option<&VaccinationRecord> {
        self.in_bucket(Bucket::Completed).find(|r| {
            r.vaccine_id == vaccine_id && r.dose == dose && Some(r.id.as_str()) != exclude
        })
    }

    /// An open record claiming `(vaccine_id, dose)`, ignoring `exclude`
    /// (the record under edit checks duplicates against everyone but
    /// itself).
    pub fn open_claim(
        &self,
        vaccine_id: &str,
        dose: u32,
        exclude: Option<&str>,
    ) -> Option<&VaccinationRecord> {
        self.open_records().find(|r| {
            r.vaccine_id == vaccine_id && r.dose == dose && Some(r.id.as_str()) != exclude
        })
    }

    /// Dose numbers claimed by open records for `vaccine_id`
    pub fn open_dose_claims(&self, vaccine_id: &str) -> impl Iterator<Item = u32> {
        self.open_records()
            .filter(move |r| r.vaccine_id == vaccine_id)
            .map(|r| r.dose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(id: &str, bucket: Bucket, vaccine_id: &str, dose: u32) -> VaccinationRecord {
        VaccinationRecord {
            id: id.to_string(),
            bucket,
            vaccine_id: vaccine_id.to_string(),
            vaccine_name: vaccine_id.to_uppercase(),
            dose,
            calendar_window_id: None,
            date: None,
            administered_by: None,
        }
    }

    #[test]
    fn test_parse_record_date_accepts_rfc3339_and_bare_dates() {
        let full = parse_record_date("2025-01-10T09:00:00Z").unwrap();
        assert_eq!(full.to_rfc3339(), "2025-01-10T09:00:00+00:00");

        let bare = parse_record_date("2025-01-10").unwrap();
        assert_eq!(bare.to_rfc3339(), "2025-01-10T00:00:00+00:00");

        assert!(parse_record_date("next tuesday").is_err());
    }

    #[test]
    fn test_bucket_openness() {
        assert!(Bucket::Due.is_open());
        assert!(Bucket::Overdue.is_open());
        assert!(!Bucket::Completed.is_open());
    }

    #[test]
    fn test_claims_span_buckets() {
        let store = RecordStore::from_records([
            record("r1", Bucket::Completed, "penta", 1),
            record("r2", Bucket::Scheduled, "penta", 2),
            record("r3", Bucket::Overdue, "polio", 1),
        ]);

        assert_eq!(store.max_completed_dose("penta"), Some(1));
        assert_eq!(store.max_completed_dose("polio"), None);
        assert!(store.completed_claim("penta", 1, None).is_some());
        assert!(store.completed_claim("penta", 1, Some("r1")).is_none());
        assert!(store.completed_claim("penta", 2, None).is_none());
        assert_eq!(store.open_claim("penta", 2, None).map(|r| r.id.as_str()), Some("r2"));
        assert!(store.open_claim("penta", 2, Some("r2")).is_none());
        assert_eq!(store.open_dose_claims("polio").collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut store = RecordStore::from_records([
            record("a", Bucket::Due, "bcg", 1),
            record("b", Bucket::Due, "polio", 1),
            record("c", Bucket::Due, "penta", 1),
        ]);
        store.remove("b");
        let ids: Vec<_> = store.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
