//! The set of appointments behind a calendar.
//!
//! Edits, deletions and cancellations that target a generated occurrence apply
//! to the whole series, since occurrences only exist after expansion. The book
//! re-expands after every change and replaces its previous instances wholesale,
//! so occurrence ids stay stable between changes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::appointment::{AppointmentDefinition, AppointmentInstance, AppointmentStatus};
use crate::error::{BookingError, BookingResult};
use crate::expand::{Expander, Expansion};

/// Appointment definitions plus blackout days, and their current expansion.
#[derive(Default)]
pub struct AppointmentBook {
    definitions: Vec<AppointmentDefinition>,
    /// Reason keyed by date
    blackouts: BTreeMap<NaiveDate, String>,
    expander: Expander,
    expansion: Expansion,
}

impl AppointmentBook {
    pub fn new(expander: Expander) -> Self {
        AppointmentBook {
            definitions: Vec::new(),
            blackouts: BTreeMap::new(),
            expander,
            expansion: Expansion::default(),
        }
    }

    pub fn with_definitions(expander: Expander, definitions: Vec<AppointmentDefinition>) -> Self {
        let mut book = AppointmentBook {
            definitions,
            ..AppointmentBook::new(expander)
        };
        book.refresh();
        book
    }

    fn refresh(&mut self) {
        self.expansion = self.expander.expand(&self.definitions);
        debug!(
            definitions = self.definitions.len(),
            instances = self.expansion.instances.len(),
            issues = self.expansion.issues.len(),
            "Re-expanded appointment book"
        );
    }

    pub fn definitions(&self) -> &[AppointmentDefinition] {
        &self.definitions
    }

    pub fn get(&self, id: &str) -> Option<&AppointmentDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Add a new appointment under a fresh id, which is returned.
    pub fn insert(&mut self, mut definition: AppointmentDefinition) -> String {
        definition.id = uuid::Uuid::new_v4().to_string();
        let id = definition.id.clone();
        info!(id = %id, title = %definition.title, "Created appointment");
        self.definitions.push(definition);
        self.refresh();
        id
    }

    /// Resolve an id that may name a generated occurrence to its definition id.
    fn resolve(&self, target_id: &str) -> BookingResult<String> {
        if self.get(target_id).is_some() {
            return Ok(target_id.to_string());
        }

        self.expansion
            .instances
            .iter()
            .find(|i| i.id() == target_id)
            .map(|i| i.series_id().to_string())
            .ok_or_else(|| BookingError::NotFound(target_id.to_string()))
    }

    fn definition_mut(&mut self, id: &str) -> BookingResult<&mut AppointmentDefinition> {
        self.definitions
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| BookingError::NotFound(id.to_string()))
    }

    /// Replace the appointment `target_id` belongs to, keeping its id.
    pub fn update(
        &mut self,
        target_id: &str,
        mut definition: AppointmentDefinition,
    ) -> BookingResult<()> {
        let series_id = self.resolve(target_id)?;
        debug!(target = target_id, series = %series_id, "Updating appointment");

        definition.id = series_id.clone();
        *self.definition_mut(&series_id)? = definition;
        self.refresh();
        Ok(())
    }

    /// Delete the appointment `target_id` belongs to, with all its occurrences.
    pub fn delete(&mut self, target_id: &str) -> BookingResult<AppointmentDefinition> {
        let series_id = self.resolve(target_id)?;
        let index = self
            .definitions
            .iter()
            .position(|d| d.id == series_id)
            .ok_or_else(|| BookingError::NotFound(series_id.clone()))?;

        info!(target = target_id, series = %series_id, "Deleted appointment");
        let removed = self.definitions.remove(index);
        self.refresh();
        Ok(removed)
    }

    /// Mark the appointment `target_id` belongs to as cancelled.
    pub fn cancel(&mut self, target_id: &str) -> BookingResult<()> {
        let series_id = self.resolve(target_id)?;
        self.definition_mut(&series_id)?.status = AppointmentStatus::Cancelled;
        self.refresh();

        info!(target = target_id, series = %series_id, "Cancelled appointment");
        Ok(())
    }

    /// Mark `date` as unavailable, replacing any earlier reason.
    pub fn set_blackout(&mut self, date: NaiveDate, reason: impl Into<String>) {
        self.blackouts.insert(date, reason.into());
    }

    pub fn clear_blackout(&mut self, date: NaiveDate) -> bool {
        self.blackouts.remove(&date).is_some()
    }

    pub fn is_blackout(&self, date: NaiveDate) -> bool {
        self.blackouts.contains_key(&date)
    }

    pub fn blackout_reason(&self, date: NaiveDate) -> Option<&str> {
        self.blackouts.get(&date).map(String::as_str)
    }

    pub fn blackouts(&self) -> impl Iterator<Item = (NaiveDate, &str)> {
        self.blackouts.iter().map(|(d, r)| (*d, r.as_str()))
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    /// Instances on `date`, ordered by start time.
    pub fn on_date(&self, date: NaiveDate) -> Vec<&AppointmentInstance> {
        self.in_range(date, date)
    }

    /// Instances between `from` and `to` inclusive, ordered by date and start time.
    pub fn in_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<&AppointmentInstance> {
        let mut instances: Vec<&AppointmentInstance> = self
            .expansion
            .instances
            .iter()
            .filter(|i| i.date() >= from && i.date() <= to)
            .collect();

        instances.sort_by_key(|i| (i.date(), i.appointment.start_time));
        instances
    }
}

/// Order by date then start time. Stable, so ties keep expansion order.
pub fn sort_chronologically(instances: &mut [AppointmentInstance]) {
    instances.sort_by_key(|i| (i.date(), i.appointment.start_time));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::{Frequency, Location};
    use crate::config::BookingConfig;
    use crate::expand::SequentialIds;
    use chrono::NaiveTime;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn definition(title: &str, anchor: &str, hour: u32, frequency: Frequency, end: Option<&str>) -> AppointmentDefinition {
        AppointmentDefinition {
            id: String::new(),
            title: title.to_string(),
            date: date(anchor),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
            kind: "Service Work".to_string(),
            frequency,
            location: Location::default(),
            recurrence_end_date: end.map(date),
            attendees: vec![],
            description: None,
            status: AppointmentStatus::Scheduled,
        }
    }

    fn book() -> AppointmentBook {
        AppointmentBook::new(Expander::with_id_generator(
            &BookingConfig::default(),
            SequentialIds::new("occ"),
        ))
    }

    /// Id of the generated occurrence of `series_id` on `on`.
    fn occurrence_id(book: &AppointmentBook, series_id: &str, on: &str) -> String {
        book.on_date(date(on))
            .into_iter()
            .find(|i| i.series_id() == series_id && i.is_recurring_instance)
            .unwrap()
            .id()
            .to_string()
    }

    #[test]
    fn test_insert_assigns_fresh_id() {
        let mut book = book();
        let a = book.insert(definition("A", "2025-06-02", 9, Frequency::OneOff, None));
        let b = book.insert(definition("B", "2025-06-02", 9, Frequency::OneOff, None));

        assert_ne!(a, b);
        assert_eq!(book.get(&a).unwrap().title, "A");
    }

    #[test]
    fn test_update_via_occurrence_updates_series() {
        let mut book = book();
        let id = book.insert(definition("Weekly sync", "2025-06-02", 9, Frequency::Weekly, Some("2025-06-30")));
        let occurrence = occurrence_id(&book, &id, "2025-06-16");

        let edited = definition("Weekly sync (moved)", "2025-06-03", 14, Frequency::Weekly, Some("2025-06-30"));
        book.update(&occurrence, edited).unwrap();

        assert_eq!(book.definitions().len(), 1);
        let def = book.get(&id).unwrap();
        assert_eq!(def.title, "Weekly sync (moved)");
        assert_eq!(def.date, date("2025-06-03"));
        assert!(book.on_date(date("2025-06-16")).is_empty());
        assert_eq!(book.on_date(date("2025-06-17")).len(), 1);
    }

    #[test]
    fn test_delete_occurrence_removes_series() {
        let mut book = book();
        let keep = book.insert(definition("Keep", "2025-06-02", 9, Frequency::OneOff, None));
        let id = book.insert(definition("Daily", "2025-06-01", 8, Frequency::Daily, Some("2025-06-05")));
        let occurrence = occurrence_id(&book, &id, "2025-06-03");

        let removed = book.delete(&occurrence).unwrap();

        assert_eq!(removed.id, id);
        assert_eq!(book.definitions().len(), 1);
        assert_eq!(book.definitions()[0].id, keep);
    }

    #[test]
    fn test_cancel_occurrence_cancels_series() {
        let mut book = book();
        let id = book.insert(definition("Monthly", "2025-01-31", 9, Frequency::Monthly, Some("2025-04-30")));
        let occurrence = occurrence_id(&book, &id, "2025-02-28");

        book.cancel(&occurrence).unwrap();

        assert!(book
            .in_range(date("2025-01-01"), date("2025-12-31"))
            .iter()
            .all(|i| i.appointment.status == AppointmentStatus::Cancelled));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut book = book();
        book.insert(definition("A", "2025-06-02", 9, Frequency::OneOff, None));

        assert!(matches!(book.cancel("nope"), Err(BookingError::NotFound(_))));
        assert!(matches!(book.delete("nope"), Err(BookingError::NotFound(_))));
    }

    #[test]
    fn test_on_date_orders_by_start_time() {
        let mut book = book();
        book.insert(definition("Late", "2025-06-02", 15, Frequency::OneOff, None));
        book.insert(definition("Early", "2025-06-02", 8, Frequency::OneOff, None));
        book.insert(definition("Other day", "2025-06-03", 7, Frequency::OneOff, None));

        let titles: Vec<String> = book
            .on_date(date("2025-06-02"))
            .into_iter()
            .map(|i| i.appointment.title.clone())
            .collect();

        assert_eq!(titles, vec!["Early", "Late"]);
    }

    #[test]
    fn test_blackout_days() {
        let mut book = book();
        let day = date("2025-12-25");

        book.set_blackout(day, "Holiday");
        book.set_blackout(day, "Office closed");

        assert!(book.is_blackout(day));
        assert_eq!(book.blackout_reason(day), Some("Office closed"));
        assert_eq!(book.blackouts().count(), 1);

        assert!(book.clear_blackout(day));
        assert!(!book.is_blackout(day));
        assert!(!book.clear_blackout(day));
    }
}
