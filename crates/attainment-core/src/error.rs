//! Model error types.
//!
//! Raised when textual or numeric input cannot be mapped onto one of the
//! closed model enums. The calculation stages themselves never fail: missing
//! data resolves to documented defaults instead.

use thiserror::Error;

/// Errors converting raw values into model types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An attainment level outside `0..=3`.
    #[error("attainment level out of range: {0} (expected 0-3)")]
    LevelOutOfRange(u8),

    /// A course status string that is not active/completed/future.
    #[error("unknown course status: {0}")]
    UnknownCourseStatus(String),

    /// A student status string that is not active/inactive.
    #[error("unknown student status: {0}")]
    UnknownStudentStatus(String),
}
