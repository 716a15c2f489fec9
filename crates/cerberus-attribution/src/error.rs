use serde::Serialize;
use thiserror::Error;

/// Which input batch a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
    Meta,
    Google,
    Leads,
}

impl std::fmt::Display for BatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchKind::Meta => write!(f, "meta"),
            BatchKind::Google => write!(f, "google"),
            BatchKind::Leads => write!(f, "leads"),
        }
    }
}

/// Hard failures. Only raised when a whole batch has the wrong shape; bad
/// individual records are skipped and reported as [`SkippedRecord`]s instead.
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("{batch} batch must be a JSON array, got {found}")]
    NotASequence { batch: BatchKind, found: &'static str },
}

/// Why a single input record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordError {
    #[error("record is not a JSON object (got {found})")]
    NotAnObject { found: &'static str },

    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("spend must be non-negative, got {spend}")]
    NegativeSpend { spend: String },
}

/// A record excluded from the run, kept for operator visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub batch: BatchKind,
    /// Zero-based position in the input batch.
    pub index: usize,
    pub error: RecordError,
}
