//! Wire format for the child vaccination snapshot
//!
//! The external store sends (and accepts) a child's records as five
//! bucket-named lists. Internally the engine works on one collection with
//! the bucket as a discriminant on each record, so the dose-uniqueness
//! invariant can be checked in a single place. This module converts
//! between the two shapes.

use crate::provider::SourceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vaxcal_types::{Bucket, RecordStore, VaccinationRecord};

/// One record as it appears on the wire: the bucket is implied by the list
/// it sits in, so it carries none itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    pub id: String,
    pub vaccine_id: String,
    pub vaccine_name: String,
    pub dose: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_window_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administered_by: Option<String>,
}

impl WireRecord {
    fn into_record(self, bucket: Bucket) -> VaccinationRecord {
        VaccinationRecord {
            id: self.id,
            bucket,
            vaccine_id: self.vaccine_id,
            vaccine_name: self.vaccine_name,
            dose: self.dose,
            calendar_window_id: self.calendar_window_id,
            date: self.date,
            administered_by: self.administered_by,
        }
    }

    fn from_record(record: &VaccinationRecord) -> Self {
        Self {
            id: record.id.clone(),
            vaccine_id: record.vaccine_id.clone(),
            vaccine_name: record.vaccine_name.clone(),
            dose: record.dose,
            calendar_window_id: record.calendar_window_id.clone(),
            date: record.date,
            administered_by: record.administered_by.clone(),
        }
    }
}

/// The five-bucket snapshot as served by `GET child/{id}/vaccinations`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildVaccinations {
    #[serde(default)]
    pub due: Vec<WireRecord>,
    #[serde(default)]
    pub late: Vec<WireRecord>,
    #[serde(default)]
    pub overdue: Vec<WireRecord>,
    #[serde(default)]
    pub scheduled: Vec<WireRecord>,
    #[serde(default)]
    pub completed: Vec<WireRecord>,
}

impl ChildVaccinations {
    /// Decode a wire payload
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        serde_json::from_str(json).map_err(|e| SourceError::Decode(e.to_string()))
    }

    /// Collapse the five lists into the single-collection store
    pub fn into_store(self) -> RecordStore {
        let buckets = [
            (Bucket::Due, self.due),
            (Bucket::Late, self.late),
            (Bucket::Overdue, self.overdue),
            (Bucket::Scheduled, self.scheduled),
            (Bucket::Completed, self.completed),
        ];
        RecordStore::from_records(
            buckets
                .into_iter()
                .flat_map(|(bucket, records)| {
                    records.into_iter().map(move |r| r.into_record(bucket))
                }),
        )
    }

    /// Partition a store back into the five wire lists
    pub fn from_store(store: &RecordStore) -> Self {
        let mut wire = Self::default();
        for record in store.iter() {
            let list = match record.bucket {
                Bucket::Due => &mut wire.due,
                Bucket::Late => &mut wire.late,
                Bucket::Overdue => &mut wire.overdue,
                Bucket::Scheduled => &mut wire.scheduled,
                Bucket::Completed => &mut wire.completed,
            };
            list.push(WireRecord::from_record(record));
        }
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_five_bucket_payload_decodes_into_one_store() {
        let json = r#"{
            "due": [
                {"id": "r1", "vaccineId": "penta", "vaccineName": "Penta",
                 "dose": 2, "date": "2025-03-01T09:00:00Z"}
            ],
            "completed": [
                {"id": "r2", "vaccineId": "penta", "vaccineName": "Penta",
                 "dose": 1, "date": "2025-01-10T09:00:00Z",
                 "administeredBy": "nurse-7"}
            ]
        }"#;

        let store = ChildVaccinations::from_json(json).unwrap().into_store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("r1").unwrap().bucket, Bucket::Due);
        assert_eq!(store.get("r2").unwrap().bucket, Bucket::Completed);
        assert_eq!(
            store.get("r2").unwrap().administered_by.as_deref(),
            Some("nurse-7")
        );
        assert_eq!(store.max_completed_dose("penta"), Some(1));
    }

    #[test]
    fn test_store_partitions_back_into_buckets() {
        let json = r#"{
            "due": [{"id": "a", "vaccineId": "bcg", "vaccineName": "BCG", "dose": 1}],
            "late": [{"id": "b", "vaccineId": "polio", "vaccineName": "Polio", "dose": 1}],
            "overdue": [],
            "scheduled": [{"id": "c", "vaccineId": "polio", "vaccineName": "Polio", "dose": 2}],
            "completed": []
        }"#;

        let decoded = ChildVaccinations::from_json(json).unwrap();
        let round_tripped = ChildVaccinations::from_store(&decoded.clone().into_store());
        assert_eq!(round_tripped, decoded);
    }

    #[test]
    fn test_bad_payload_is_a_decode_error() {
        let err = ChildVaccinations::from_json("{\"due\": 7}").unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }
}
