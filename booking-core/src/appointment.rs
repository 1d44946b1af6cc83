//! Appointment types.
//!
//! `AppointmentRecord` is the loosely-typed shape the booking UI stores and
//! exchanges (camelCase JSON, dates and times as strings). It is parsed into
//! the fixed-shape `AppointmentDefinition` before any date arithmetic happens,
//! and expanded `AppointmentInstance`s are converted back into records for
//! display.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, BookingResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Recurrence cadence of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    OneOff,
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::OneOff => "one-off",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::BiWeekly => "bi-weekly",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::OneOff)
    }

    /// Weekly cadences must land on the anchor's weekday every time.
    pub fn keeps_weekday(&self) -> bool {
        matches!(self, Frequency::Weekly | Frequency::BiWeekly)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = BookingError;

    fn from_str(s: &str) -> BookingResult<Self> {
        match s {
            "one-off" => Ok(Frequency::OneOff),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "bi-weekly" => Ok(Frequency::BiWeekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(BookingError::parse("frequency", other)),
        }
    }
}

/// Where a meeting takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationType {
    #[default]
    InPerson,
    Video,
    Phone,
    Other,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::InPerson => "in-person",
            LocationType::Video => "video",
            LocationType::Phone => "phone",
            LocationType::Other => "other",
        }
    }
}

impl FromStr for LocationType {
    type Err = BookingError;

    fn from_str(s: &str) -> BookingResult<Self> {
        match s {
            "in-person" => Ok(LocationType::InPerson),
            "video" => Ok(LocationType::Video),
            "phone" => Ok(LocationType::Phone),
            "other" => Ok(LocationType::Other),
            other => Err(BookingError::parse("locationType", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub kind: LocationType,
    /// Address, meeting link or phone number
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> BookingResult<Self> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(BookingError::parse("status", other)),
        }
    }
}

/// An appointment as the booking UI stores it.
///
/// Every field is kept as loosely typed as the UI produces it so that one
/// malformed record can be reported on its own instead of failing the whole
/// document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring_instance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_appointment_id: Option<String>,
}

/// A single or recurring appointment, as defined by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDefinition {
    pub id: String,
    pub title: String,
    /// Anchor occurrence, a local civil date
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Free-form meeting type, e.g. "Consultation"
    pub kind: String,
    pub frequency: Frequency,
    pub location: Location,
    /// Inclusive bound for recurring appointments. Without it nothing is expanded.
    pub recurrence_end_date: Option<NaiveDate>,
    pub attendees: Vec<String>,
    pub description: Option<String>,
    pub status: AppointmentStatus,
}

impl AppointmentDefinition {
    /// The end date to expand up to, if this definition should be expanded at all.
    pub fn expansion_end(&self) -> Option<NaiveDate> {
        if self.frequency.is_recurring() {
            self.recurrence_end_date
        } else {
            None
        }
    }
}

/// One concrete, dated occurrence of an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentInstance {
    /// The definition's fields, with `id` and `date` set for this occurrence
    pub appointment: AppointmentDefinition,
    pub is_recurring_instance: bool,
    /// Id of the defining appointment, set only on generated occurrences
    pub original_appointment_id: Option<String>,
}

impl AppointmentInstance {
    /// The anchor occurrence: the definition itself, unchanged.
    pub fn anchor(definition: &AppointmentDefinition) -> Self {
        AppointmentInstance {
            appointment: definition.clone(),
            is_recurring_instance: false,
            original_appointment_id: None,
        }
    }

    /// A generated occurrence of `definition` on `date`.
    pub fn occurrence(definition: &AppointmentDefinition, id: String, date: NaiveDate) -> Self {
        AppointmentInstance {
            appointment: AppointmentDefinition {
                id,
                date,
                ..definition.clone()
            },
            is_recurring_instance: true,
            original_appointment_id: Some(definition.id.clone()),
        }
    }

    pub fn id(&self) -> &str {
        &self.appointment.id
    }

    pub fn date(&self) -> NaiveDate {
        self.appointment.date
    }

    /// Id of the definition this instance belongs to.
    pub fn series_id(&self) -> &str {
        self.original_appointment_id
            .as_deref()
            .unwrap_or(&self.appointment.id)
    }
}

impl fmt::Display for AppointmentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.appointment;
        write!(
            f,
            "{}-{} {}",
            a.start_time.format(TIME_FORMAT),
            a.end_time.format(TIME_FORMAT),
            a.title
        )
    }
}

fn parse_date(field: &'static str, value: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| BookingError::parse(field, value))
}

fn parse_time(field: &'static str, value: &str) -> BookingResult<NaiveTime> {
    let value_trimmed = value.trim();
    NaiveTime::parse_from_str(value_trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value_trimmed, "%H:%M:%S"))
        .map_err(|_| BookingError::parse(field, value))
}

/// The UI submits an empty string when no end date was picked.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl TryFrom<&AppointmentRecord> for AppointmentDefinition {
    type Error = BookingError;

    fn try_from(record: &AppointmentRecord) -> BookingResult<Self> {
        let location_kind = match non_empty(&record.location_type) {
            Some(s) => s.parse()?,
            None => LocationType::default(),
        };
        let status = match non_empty(&record.status) {
            Some(s) => s.parse()?,
            None => AppointmentStatus::default(),
        };
        let recurrence_end_date = non_empty(&record.recurrence_end_date)
            .map(|s| parse_date("recurrenceEndDate", s))
            .transpose()?;

        Ok(AppointmentDefinition {
            id: record.id.clone(),
            title: record.title.clone(),
            date: parse_date("date", &record.date)?,
            start_time: parse_time("startTime", &record.start_time)?,
            end_time: parse_time("endTime", &record.end_time)?,
            kind: record.kind.clone(),
            frequency: record.frequency.parse()?,
            location: Location {
                kind: location_kind,
                details: non_empty(&record.location_details).map(str::to_string),
            },
            recurrence_end_date,
            attendees: record.attendees.clone().unwrap_or_default(),
            description: record.description.clone(),
            status,
        })
    }
}

impl TryFrom<AppointmentRecord> for AppointmentDefinition {
    type Error = BookingError;

    fn try_from(record: AppointmentRecord) -> BookingResult<Self> {
        AppointmentDefinition::try_from(&record)
    }
}

impl From<&AppointmentDefinition> for AppointmentRecord {
    fn from(def: &AppointmentDefinition) -> Self {
        AppointmentRecord {
            id: def.id.clone(),
            title: def.title.clone(),
            date: def.date.format(DATE_FORMAT).to_string(),
            start_time: def.start_time.format(TIME_FORMAT).to_string(),
            end_time: def.end_time.format(TIME_FORMAT).to_string(),
            kind: def.kind.clone(),
            frequency: def.frequency.as_str().to_string(),
            location_type: Some(def.location.kind.as_str().to_string()),
            location_details: def.location.details.clone(),
            recurrence_end_date: def
                .recurrence_end_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            attendees: Some(def.attendees.clone()),
            description: def.description.clone(),
            status: Some(def.status.as_str().to_string()),
            is_recurring_instance: None,
            original_appointment_id: None,
        }
    }
}

impl From<&AppointmentInstance> for AppointmentRecord {
    fn from(instance: &AppointmentInstance) -> Self {
        AppointmentRecord {
            is_recurring_instance: Some(instance.is_recurring_instance),
            original_appointment_id: instance.original_appointment_id.clone(),
            ..AppointmentRecord::from(&instance.appointment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AppointmentRecord {
        AppointmentRecord {
            id: "a1".to_string(),
            title: "Standup".to_string(),
            date: "2025-04-28".to_string(),
            start_time: "09:00".to_string(),
            end_time: "09:15".to_string(),
            kind: "Consultation".to_string(),
            frequency: "weekly".to_string(),
            location_type: Some("video".to_string()),
            location_details: Some("https://meet.example.com/standup".to_string()),
            recurrence_end_date: Some("2025-05-19".to_string()),
            attendees: Some(vec!["alice@example.com".to_string()]),
            description: None,
            status: Some("scheduled".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_record_from_ui_json() {
        let json = r#"{
            "id": "a1",
            "title": "Standup",
            "date": "2025-04-28",
            "startTime": "09:00",
            "endTime": "09:15",
            "type": "Consultation",
            "frequency": "bi-weekly",
            "locationType": "in-person",
            "recurrenceEndDate": "2025-06-30",
            "attendees": ["alice@example.com", "bob@example.com"]
        }"#;

        let record: AppointmentRecord = serde_json::from_str(json).unwrap();
        let def = AppointmentDefinition::try_from(&record).unwrap();

        assert_eq!(def.date, NaiveDate::from_ymd_opt(2025, 4, 28).unwrap());
        assert_eq!(def.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(def.frequency, Frequency::BiWeekly);
        assert_eq!(def.location.kind, LocationType::InPerson);
        assert_eq!(def.status, AppointmentStatus::Scheduled);
        assert_eq!(def.attendees.len(), 2);
        assert_eq!(
            def.recurrence_end_date,
            NaiveDate::from_ymd_opt(2025, 6, 30)
        );
    }

    #[test]
    fn test_empty_recurrence_end_date_is_absent() {
        let record = AppointmentRecord {
            recurrence_end_date: Some(String::new()),
            ..record()
        };

        let def = AppointmentDefinition::try_from(&record).unwrap();
        assert_eq!(def.recurrence_end_date, None);
        assert_eq!(def.expansion_end(), None);
    }

    #[test]
    fn test_malformed_date_is_parse_error() {
        let record = AppointmentRecord {
            date: "2025-02-30".to_string(),
            ..record()
        };

        let err = AppointmentDefinition::try_from(&record).unwrap_err();
        assert!(matches!(err, BookingError::Parse { field: "date", .. }));
    }

    #[test]
    fn test_malformed_time_is_parse_error() {
        let record = AppointmentRecord {
            end_time: "25:00".to_string(),
            ..record()
        };

        let err = AppointmentDefinition::try_from(&record).unwrap_err();
        assert!(matches!(err, BookingError::Parse { field: "endTime", .. }));
    }

    #[test]
    fn test_unknown_frequency_is_parse_error() {
        let record = AppointmentRecord {
            frequency: "yearly".to_string(),
            ..record()
        };

        let err = AppointmentDefinition::try_from(&record).unwrap_err();
        assert!(matches!(err, BookingError::Parse { field: "frequency", .. }));
    }

    #[test]
    fn test_time_with_seconds_is_accepted() {
        let record = AppointmentRecord {
            start_time: "09:00:00".to_string(),
            ..record()
        };

        let def = AppointmentDefinition::try_from(&record).unwrap();
        assert_eq!(def.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn test_one_off_has_no_expansion_end() {
        let record = AppointmentRecord {
            frequency: "one-off".to_string(),
            ..record()
        };

        let def = AppointmentDefinition::try_from(&record).unwrap();
        assert!(def.recurrence_end_date.is_some());
        assert_eq!(def.expansion_end(), None);
    }

    #[test]
    fn test_instance_record_carries_series_fields() {
        let def = AppointmentDefinition::try_from(&record()).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let instance = AppointmentInstance::occurrence(&def, "gen-1".to_string(), date);

        let out = AppointmentRecord::from(&instance);
        assert_eq!(out.id, "gen-1");
        assert_eq!(out.date, "2025-05-05");
        assert_eq!(out.start_time, "09:00");
        assert_eq!(out.is_recurring_instance, Some(true));
        assert_eq!(out.original_appointment_id.as_deref(), Some("a1"));

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["isRecurringInstance"], true);
        assert_eq!(json["originalAppointmentId"], "a1");
        assert_eq!(json["type"], "Consultation");
    }

    #[test]
    fn test_series_id() {
        let def = AppointmentDefinition::try_from(&record()).unwrap();
        let anchor = AppointmentInstance::anchor(&def);
        let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let generated = AppointmentInstance::occurrence(&def, "gen-1".to_string(), date);

        assert_eq!(anchor.series_id(), "a1");
        assert_eq!(generated.series_id(), "a1");
        assert_eq!(generated.to_string(), "09:00-09:15 Standup");
    }
}
