//! Calendar files as exported by the booking UI.

use std::path::Path;

use anyhow::{Context, Result};
use booking_core::{
    AppointmentBook, AppointmentDefinition, AppointmentRecord, BookingError, Expander,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

/// A day marked unavailable
#[derive(Debug, Clone, Deserialize)]
pub struct BlackoutDay {
    pub date: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDocument {
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    #[serde(default)]
    pub blackout_days: Vec<BlackoutDay>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CalendarFile {
    Appointments(Vec<AppointmentRecord>),
    Document(CalendarDocument),
}

pub fn load(path: &Path) -> Result<CalendarDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;

    parse(&content).with_context(|| format!("Could not parse {}", path.display()))
}

fn parse(content: &str) -> Result<CalendarDocument> {
    let document = match serde_json::from_str(content)? {
        CalendarFile::Appointments(appointments) => CalendarDocument {
            appointments,
            ..Default::default()
        },
        CalendarFile::Document(document) => document,
    };

    Ok(document)
}

impl CalendarDocument {
    /// Build an appointment book, leaving out records and blackout days that
    /// don't parse. Parse failures are returned so they can be reported.
    pub fn into_book(
        self,
        expander: Expander,
    ) -> (AppointmentBook, Vec<(String, BookingError)>) {
        let mut definitions = Vec::new();
        let mut failures = Vec::new();

        for record in &self.appointments {
            match AppointmentDefinition::try_from(record) {
                Ok(definition) => definitions.push(definition),
                Err(e) => failures.push((record.id.clone(), e)),
            }
        }

        let mut book = AppointmentBook::with_definitions(expander, definitions);

        for blackout in self.blackout_days {
            match NaiveDate::parse_from_str(&blackout.date, "%Y-%m-%d") {
                Ok(date) => book.set_blackout(date, blackout.reason),
                Err(_) => warn!(date = %blackout.date, "Skipping blackout day with invalid date"),
            }
        }

        (book, failures)
    }
}
