use anyhow::Result;
use booking_core::{BookingConfig, Expander};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::input::CalendarDocument;
use crate::render::{self, Render};

pub fn run(document: CalendarDocument, config: &BookingConfig, date: NaiveDate) -> Result<()> {
    let (book, failures) = document.into_book(Expander::new(config));

    for (id, error) in &failures {
        eprintln!("{}", render::render_failure(id, error));
    }
    for issue in &book.expansion().issues {
        eprintln!("{}", issue.render());
    }

    if let Some(reason) = book.blackout_reason(date) {
        let reason = if reason.is_empty() { "Unavailable" } else { reason };
        println!("{}", format!("Blackout: {reason}").red());
    }

    render::print_by_day(book.on_date(date));

    Ok(())
}
