//! Engine errors
//!
//! Nothing in the engine is fatal: every lifecycle operation either returns
//! a valid new snapshot or one of these typed errors, and no error path
//! leaves a partially mutated store behind.

use std::fmt;
use thiserror::Error;

/// Result type for lifecycle operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Kind of referenced resource missing from the current snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Vaccine,
    CalendarWindow,
    Record,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Vaccine => write!(f, "vaccine"),
            ResourceKind::CalendarWindow => write!(f, "calendar window"),
            ResourceKind::Record => write!(f, "record"),
        }
    }
}

/// Errors returned by lifecycle operations.
///
/// All three kinds are recoverable by the operator:
/// - `Validation` carries the offending field for a field-level message
/// - `NotFound` means "option no longer available, re-fetch the snapshot"
/// - `Conflict` is a dose-claim collision, distinct from plain validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A field failed validation before any mutation was applied
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A referenced id is absent from the snapshot the engine was handed
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    /// The requested dose slot is already claimed
    #[error("conflict on {vaccine_id} dose {dose}: {reason}")]
    Conflict {
        vaccine_id: String,
        dose: u32,
        reason: String,
    },
}

impl EngineError {
    /// Create a field-level validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a dose-claim conflict
    pub fn conflict(vaccine_id: impl Into<String>, dose: u32, reason: impl Into<String>) -> Self {
        Self::Conflict {
            vaccine_id: vaccine_id.into(),
            dose,
            reason: reason.into(),
        }
    }

    /// The offending field for validation errors, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Whether this is a conflict (as opposed to generic validation)
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
