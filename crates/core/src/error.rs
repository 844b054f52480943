//! Error types for the prepwise domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.

use thiserror::Error;

// --- Bounded context errors ---

/// Errors raised at the planning boundary.
///
/// The allocation engine itself never fails; these come from the
/// validators that sit in front of it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error("Days must be a number between {min} and {max} (got {days})")]
    DaysOutOfRange { days: i64, min: u32, max: u32 },

    #[error("Unknown strength level: {0}")]
    UnknownStrength(String),

    #[error("Failed to load syllabus from {path}: {reason}")]
    SyllabusLoad { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurriculumError {
    #[error("Curriculum must be a JSON object keyed by day")]
    NotAnObject,

    #[error("Curriculum contains no day entries (expected keys like \"day1\")")]
    NoDays,

    #[error("Malformed entry for {day}: {reason}")]
    MalformedDay { day: String, reason: String },
}
