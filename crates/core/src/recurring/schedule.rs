//! Schedule arithmetic for recurring rules.

use chrono::{DateTime, Duration, Months, Utc};

use super::types::Frequency;

/// Returns the occurrence after `from` for the given frequency.
///
/// Monthly and yearly steps clamp to the last valid day of the target
/// month (Jan 31 -> Feb 28/29).
#[must_use]
pub fn next_occurrence(frequency: Frequency, from: DateTime<Utc>) -> DateTime<Utc> {
    match frequency {
        Frequency::Daily => from + Duration::days(1),
        Frequency::Weekly => from + Duration::weeks(1),
        Frequency::Monthly => from
            .checked_add_months(Months::new(1))
            .unwrap_or(from + Duration::days(31)),
        Frequency::Yearly => from
            .checked_add_months(Months::new(12))
            .unwrap_or(from + Duration::days(365)),
    }
}
