//! Data source traits for the vaccination calendar engine

use async_trait::async_trait;
use vaxcal_types::{CalendarWindow, Child, RecordStore, Vaccine};

/// Trait for the external collaborator the engine fetches its data from.
///
/// Implementations wrap whatever transport the surrounding system uses
/// (HTTP in production); the engine itself only ever sees the decoded
/// snapshots. Fetching is asynchronous, evaluation is not.
#[async_trait]
pub trait ImmunizationSource: Send + Sync {
    /// Fetch the vaccine reference list
    async fn vaccines(&self) -> Result<Vec<Vaccine>, SourceError>;

    /// Fetch the calendar window templates. Each window entry must carry
    /// its dose numbers, not just a vaccine id, otherwise dose filtering
    /// cannot be computed downstream.
    async fn calendar_windows(&self) -> Result<Vec<CalendarWindow>, SourceError>;

    /// Fetch a child's identity and birth date
    async fn child(&self, child_id: &str) -> Result<Child, SourceError>;

    /// Fetch the five-bucket record snapshot for a child, decoded into the
    /// single-collection store
    async fn child_records(&self, child_id: &str) -> Result<RecordStore, SourceError>;
}

/// Data source error
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Child not found: {0}")]
    ChildNotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
