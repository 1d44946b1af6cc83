use anyhow::Result;
use booking_core::book::sort_chronologically;
use booking_core::{AppointmentInstance, AppointmentRecord, BookingConfig, ErrorPolicy, Expander};
use chrono::NaiveDate;

use crate::input::CalendarDocument;
use crate::render::{self, Render};

pub fn run(
    document: CalendarDocument,
    config: &BookingConfig,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let expansion = Expander::new(config).expand_records(&document.appointments);

    for issue in &expansion.issues {
        eprintln!("{}", issue.render());
    }

    if config.on_error == ErrorPolicy::Abort && expansion.has_fatal_issues() {
        anyhow::bail!(
            "{} appointment(s) could not be expanded",
            expansion.issues.iter().filter(|i| i.error.is_fatal()).count()
        );
    }

    let in_range = |instance: &AppointmentInstance| {
        from.is_none_or(|from| instance.date() >= from) && to.is_none_or(|to| instance.date() <= to)
    };

    if json {
        // Keep expansion order: grouped by appointment, as the UI consumes it
        let records: Vec<AppointmentRecord> = expansion
            .instances
            .iter()
            .filter(|i| in_range(i))
            .map(AppointmentRecord::from)
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let mut instances: Vec<AppointmentInstance> = expansion
        .instances
        .into_iter()
        .filter(|i| in_range(i))
        .collect();
    sort_chronologically(&mut instances);

    render::print_by_day(&instances);

    Ok(())
}
