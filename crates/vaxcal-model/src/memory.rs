//! In-memory data source
//!
//! Serves fixed reference data and per-child record sets from memory.
//! Used as the test double for [`ImmunizationSource`] and by tooling that
//! loads exported snapshots from disk.

use crate::provider::{ImmunizationSource, SourceError};
use async_trait::async_trait;
use std::collections::HashMap;
use vaxcal_types::{CalendarWindow, Child, RecordStore, Vaccine};

/// An [`ImmunizationSource`] backed by plain collections
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    vaccines: Vec<Vaccine>,
    windows: Vec<CalendarWindow>,
    children: HashMap<String, Child>,
    records: HashMap<String, RecordStore>,
}

impl InMemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vaccine reference list
    pub fn with_vaccines(mut self, vaccines: impl IntoIterator<Item = Vaccine>) -> Self {
        self.vaccines = vaccines.into_iter().collect();
        self
    }

    /// Set the calendar window templates
    pub fn with_windows(mut self, windows: impl IntoIterator<Item = CalendarWindow>) -> Self {
        self.windows = windows.into_iter().collect();
        self
    }

    /// Register a child together with their record set
    pub fn with_child(mut self, child: Child, records: RecordStore) -> Self {
        self.records.insert(child.id.clone(), records);
        self.children.insert(child.id.clone(), child);
        self
    }
}

#[async_trait]
impl ImmunizationSource for InMemorySource {
    async fn vaccines(&self) -> Result<Vec<Vaccine>, SourceError> {
        Ok(self.vaccines.clone())
    }

    async fn calendar_windows(&self) -> Result<Vec<CalendarWindow>, SourceError> {
        Ok(self.windows.clone())
    }

    async fn child(&self, child_id: &str) -> Result<Child, SourceError> {
        self.children
            .get(child_id)
            .cloned()
            .ok_or_else(|| SourceError::ChildNotFound(child_id.to_string()))
    }

    async fn child_records(&self, child_id: &str) -> Result<RecordStore, SourceError> {
        self.records
            .get(child_id)
            .cloned()
            .ok_or_else(|| SourceError::ChildNotFound(child_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SnapshotRegistry;
    use chrono::NaiveDate;

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with_vaccines([Vaccine::new("bcg", "BCG", 1)])
            .with_child(
                Child::new("c1", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
                RecordStore::new(),
            )
    }

    #[tokio::test]
    async fn test_known_child_round_trip() {
        let source = source();
        let child = source.child("c1").await.unwrap();
        assert_eq!(child.id, "c1");
        assert!(source.child_records("c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_child_is_not_found() {
        let err = source().child("nope").await.unwrap_err();
        assert!(matches!(err, SourceError::ChildNotFound(_)));
    }

    #[tokio::test]
    async fn test_registry_refresh_pulls_from_the_source() {
        let registry = SnapshotRegistry::empty();
        assert!(!registry.is_loaded());

        registry.refresh(&source()).await.unwrap();
        assert!(registry.is_loaded());
        assert_eq!(registry.catalog().vaccine_count(), 1);
    }
}
