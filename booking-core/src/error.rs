//! Error types for the booking core.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while parsing or expanding appointments.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Could not parse {field} '{value}'")]
    Parse { field: &'static str, value: String },

    #[error("Recurrence ends on {end}, before the first occurrence on {anchor}")]
    InvalidRange { anchor: NaiveDate, end: NaiveDate },

    #[error("Recurrence from {anchor} to {end} exceeds {limit} occurrences")]
    IterationBoundExceeded {
        limit: usize,
        anchor: NaiveDate,
        end: NaiveDate,
    },

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BookingError {
    pub(crate) fn parse(field: &'static str, value: impl Into<String>) -> Self {
        BookingError::Parse {
            field,
            value: value.into(),
        }
    }

    /// Whether this error prevents a definition from producing instances.
    ///
    /// An inverted range still yields the anchor occurrence, so it is only
    /// reported.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BookingError::InvalidRange { .. })
    }
}

/// Result type alias for booking operations.
pub type BookingResult<T> = Result<T, BookingError>;
