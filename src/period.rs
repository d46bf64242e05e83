//! Calendar periods used to filter ledger entries.

use serde::{Deserialize, Deserializer};
use time::{
    Date, Month, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::Error;

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// The first to the last day of `month` in `year`.
    pub fn month(year: i32, month: Month) -> Result<Self, Error> {
        let start = Date::from_calendar_date(year, month, 1)
            .map_err(|_| Error::InvalidPeriod(format!("{year}-{month}")))?;

        let next_year = if month == Month::December {
            year + 1
        } else {
            year
        };
        let end = Date::from_calendar_date(next_year, month.next(), 1)
            .ok()
            .and_then(|first_of_next_month| first_of_next_month.previous_day())
            .ok_or_else(|| Error::InvalidPeriod(format!("{year}-{month}")))?;

        Ok(Self { start, end })
    }

    /// The month containing `date`.
    pub fn month_of(date: Date) -> Result<Self, Error> {
        Self::month(date.year(), date.month())
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Convert a month number in 1..=12 to a [Month].
///
/// # Errors
///
/// Returns [Error::InvalidMonth] for numbers outside 1..=12.
pub fn month_from_number(number: u8) -> Result<Month, Error> {
    Month::try_from(number).map_err(|_| Error::InvalidMonth(number))
}

/// Today's date in the timezone with offset `local_offset`.
pub fn today(local_offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(local_offset).date()
}

/// The `YYYY-MM-DD` format used by date inputs, query strings and the database.
pub const ISO_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month padding:zero]-[day padding:zero]");

/// Format `date` as `YYYY-MM-DD`.
pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Deserialize an optional `YYYY-MM-DD` date where an empty string, as sent by
/// a cleared date input, means no date.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;

    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Date::parse(value, ISO_DATE_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
