//! Refreshable holder for the latest catalog snapshot
//!
//! The engine never reaches into ambient state: callers take a catalog
//! clone from this registry and pass it into the resolver or controller
//! explicitly. The registry only guards snapshot replacement; engine
//! invocations share nothing mutable.

use crate::provider::{ImmunizationSource, SourceError};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use vaxcal_types::{CalendarCatalog, CalendarWindow, Vaccine};

#[derive(Debug)]
struct Snapshot {
    catalog: CalendarCatalog,
    fetched_at: Option<DateTime<Utc>>,
}

/// Shared, refreshable catalog snapshot.
///
/// Cloning the registry is cheap and clones share the snapshot; cloning
/// the catalog out of it detaches the caller from later refreshes, which
/// is exactly what a validate-then-commit engine invocation wants.
#[derive(Clone, Debug)]
pub struct SnapshotRegistry {
    inner: Arc<RwLock<Snapshot>>,
}

impl Default for SnapshotRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl SnapshotRegistry {
    /// Create a registry with no reference data yet
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot {
                catalog: CalendarCatalog::new(),
                fetched_at: None,
            })),
        }
    }

    /// Create a registry seeded with an already-built catalog
    pub fn new(catalog: CalendarCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot {
                catalog,
                fetched_at: Some(Utc::now()),
            })),
        }
    }

    /// Build a registry from raw JSON reference lists
    pub fn from_json(vaccines_json: &str, windows_json: &str) -> Result<Self, SourceError> {
        let vaccines: Vec<Vaccine> =
            serde_json::from_str(vaccines_json).map_err(|e| SourceError::Decode(e.to_string()))?;
        let windows: Vec<CalendarWindow> =
            serde_json::from_str(windows_json).map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(Self::new(CalendarCatalog::from_parts(vaccines, windows)))
    }

    /// Replace the snapshot with freshly fetched reference data
    pub async fn refresh(&self, source: &dyn ImmunizationSource) -> Result<(), SourceError> {
        let vaccines = source.vaccines().await?;
        let windows = source.calendar_windows().await?;
        let catalog = CalendarCatalog::from_parts(vaccines, windows);

        log::debug!(
            "catalog snapshot refreshed: {} vaccines, {} windows",
            catalog.vaccine_count(),
            catalog.window_count()
        );

        let mut snapshot = self.inner.write();
        snapshot.catalog = catalog;
        snapshot.fetched_at = Some(Utc::now());
        Ok(())
    }

    /// A detached copy of the current catalog, for one engine invocation
    pub fn catalog(&self) -> CalendarCatalog {
        self.inner.read().catalog.clone()
    }

    /// When the current snapshot was fetched, if it ever was
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().fetched_at
    }

    /// Whether the registry still holds the empty initial snapshot
    pub fn is_loaded(&self) -> bool {
        self.inner.read().fetched_at.is_some()
    }
}
