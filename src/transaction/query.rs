//! The query string shared by the transactions page and the CSV export.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    period::{DateRange, deserialize_optional_date, format_iso_date},
    transaction::TransactionFilter,
};

/// Filter parameters from the query string.
///
/// Missing dates default to the month containing today.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub from: Option<Date>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub to: Option<Date>,
    /// Checkbox value, any value means checked.
    pub include_transfers: Option<String>,
}

impl TransactionsQuery {
    /// Resolve the query into a filter, filling in defaults relative to `today`.
    ///
    /// A range where `from` is after `to` is kept as is and matches nothing.
    pub fn to_filter(&self, today: Date) -> TransactionFilter {
        let current_month = month_around(today);

        TransactionFilter {
            range: DateRange {
                start: self.from.unwrap_or(current_month.start),
                end: self.to.unwrap_or(current_month.end),
            },
            include_transfers: self.include_transfers.is_some(),
        }
    }
}

fn month_around(today: Date) -> DateRange {
    DateRange::month_of(today).unwrap_or(DateRange {
        start: today,
        end: today,
    })
}

#[derive(Serialize)]
struct FilterParams {
    from: String,
    to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_transfers: Option<&'static str>,
}

/// Encode `filter` as a query string, e.g. for the export link.
pub fn filter_query_string(filter: &TransactionFilter) -> String {
    let params = FilterParams {
        from: format_iso_date(filter.range.start),
        to: format_iso_date(filter.range.end),
        include_transfers: filter.include_transfers.then_some("true"),
    };

    serde_urlencoded::to_string(params).unwrap_or_else(|error| {
        tracing::error!("could not encode transaction filter: {error}");
        String::new()
    })
}
