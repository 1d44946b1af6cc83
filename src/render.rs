//! Terminal rendering for booking-core types, using owo_colors.

use booking_core::{AppointmentInstance, AppointmentStatus, BookingError, ExpansionIssue};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for AppointmentInstance {
    fn render(&self) -> String {
        let appointment = &self.appointment;
        let line = format!("  {}", self);

        let line = match appointment.status {
            AppointmentStatus::Cancelled => line.strikethrough().dimmed().to_string(),
            AppointmentStatus::Completed => line.dimmed().to_string(),
            AppointmentStatus::Scheduled => line,
        };

        let mut tags = vec![appointment.kind.clone()];
        if self.is_recurring_instance || appointment.frequency.is_recurring() {
            tags.push(appointment.frequency.to_string());
        }
        if appointment.status != AppointmentStatus::Scheduled {
            tags.push(appointment.status.as_str().to_string());
        }

        format!("{} {}", line, format!("[{}]", tags.join(", ")).dimmed())
    }
}

impl Render for ExpansionIssue {
    fn render(&self) -> String {
        let symbol = if self.error.is_fatal() {
            "✗".red().to_string()
        } else {
            "!".yellow().to_string()
        };
        format!("{} {}: {}", symbol, self.definition_id.bold(), self.error)
    }
}

/// Issue for a record that never made it to expansion
pub fn render_failure(id: &str, error: &BookingError) -> String {
    format!("{} {}: {}", "✗".red(), id.bold(), error)
}

/// Day heading, e.g. "Mon Apr 28 2025"
pub fn date_label(date: NaiveDate) -> String {
    date.format("%a %b %-d %Y").to_string()
}

/// Print instances grouped under a heading per day. Expects them in date order.
pub fn print_by_day<'a>(instances: impl IntoIterator<Item = &'a AppointmentInstance>) {
    let mut current_date: Option<NaiveDate> = None;

    for instance in instances {
        if current_date != Some(instance.date()) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label(instance.date()).bold());
            current_date = Some(instance.date());
        }
        println!("{}", instance.render());
    }

    if current_date.is_none() {
        println!("{}", "No appointments found".dimmed());
    }
}
