//! Core types for the booking calendar.
//!
//! This crate turns appointment definitions, as the booking UI stores them,
//! into the dated instances a calendar view renders:
//! - `appointment` for the record/definition/instance types
//! - `recurrence` for date sequence generation
//! - `expand` for turning definitions into instances
//! - `book` for series-aware edits and blackout days

pub mod appointment;
pub mod book;
pub mod config;
pub mod error;
pub mod expand;
pub mod recurrence;

pub use appointment::*;
pub use book::AppointmentBook;
pub use config::{BookingConfig, ErrorPolicy};
pub use error::{BookingError, BookingResult};
pub use expand::{Expander, Expansion, ExpansionIssue, IdGenerator, SequentialIds, UuidV4, expand};
pub use recurrence::date_sequence;
