//! Date sequences for recurring appointments.
//!
//! Every occurrence is computed from the anchor (anchor + n steps) rather than
//! from the previous occurrence, so monthly clamping never accumulates:
//! Jan 31 goes to Feb 28 and then back to Mar 31.

use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::error;

use crate::appointment::Frequency;
use crate::error::{BookingError, BookingResult};

impl Frequency {
    /// The `n`-th occurrence counting from `anchor`, where `n == 0` is the anchor.
    ///
    /// Monthly occurrences keep the anchor's day-of-month and fall back to the
    /// last day of shorter months. Returns `None` when the date is not
    /// representable, or for `n > 0` on a one-off.
    pub fn nth_from(&self, anchor: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Frequency::OneOff => (n == 0).then_some(anchor),
            Frequency::Daily => anchor.checked_add_days(Days::new(u64::from(n))),
            Frequency::Weekly => anchor.checked_add_days(Days::new(7 * u64::from(n))),
            Frequency::BiWeekly => anchor.checked_add_days(Days::new(14 * u64::from(n))),
            Frequency::Monthly => anchor.checked_add_months(Months::new(n)),
        }
    }
}

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// All occurrence dates from `anchor` up to and including `end`.
///
/// The anchor is always the first element, even when `end` precedes it.
/// Fails with `IterationBoundExceeded` if more than `max_occurrences` dates
/// would fall on or before `end`.
pub fn date_sequence(
    anchor: NaiveDate,
    frequency: Frequency,
    end: NaiveDate,
    max_occurrences: usize,
) -> BookingResult<Vec<NaiveDate>> {
    let mut dates = vec![anchor];

    if !frequency.is_recurring() {
        return Ok(dates);
    }

    let bound_exceeded = || BookingError::IterationBoundExceeded {
        limit: max_occurrences,
        anchor,
        end,
    };

    loop {
        let n = u32::try_from(dates.len()).map_err(|_| bound_exceeded())?;

        // Past the representable range means past `end` as well
        let Some(next) = frequency.nth_from(anchor, n) else {
            break;
        };

        if next > end {
            break;
        }

        if dates.len() >= max_occurrences {
            return Err(bound_exceeded());
        }

        check_weekday(anchor, next, frequency);
        dates.push(next);
    }

    Ok(dates)
}

/// Day-count arithmetic cannot move a weekly occurrence off the anchor's
/// weekday. If it ever does, that is a bug to surface, not to paper over.
fn check_weekday(anchor: NaiveDate, date: NaiveDate, frequency: Frequency) {
    if frequency.keeps_weekday() && date.weekday() != anchor.weekday() {
        error!(
            %anchor,
            %date,
            %frequency,
            expected = %anchor.weekday(),
            actual = %date.weekday(),
            "Weekday drift in recurring dates"
        );
        debug_assert_eq!(
            date.weekday(),
            anchor.weekday(),
            "{frequency} occurrence {date} drifted from anchor {anchor}"
        );
    }
}
