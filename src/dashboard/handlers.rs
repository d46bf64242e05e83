//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    AppState, Error,
    auth::UserID,
    balance::get_account_balances,
    dashboard::{
        aggregation::{TOP_CATEGORY_COUNT, top_expense_categories, totals_by_currency},
        charts::{DashboardChart, charts_script, charts_view},
        entry::get_dashboard_entries,
        tables::{balances_table, top_categories_table, totals_table},
    },
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, link, page},
    navigation::NavBar,
    period::{DateRange, deserialize_optional_date, format_iso_date, month_from_number, today},
    timezone::get_local_offset,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Lima".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The period to summarise.
///
/// `from` and `to` take precedence over `year` and `month`. Without either,
/// the current month is shown.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub month: Option<u8>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub from: Option<Date>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub to: Option<Date>,
}

/// A resolved dashboard period.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DashboardPeriod {
    Month { year: i32, month: Month },
    Range(DateRange),
}

impl DashboardQuery {
    fn resolve(&self, today: Date) -> Result<DashboardPeriod, Error> {
        if self.from.is_some() || self.to.is_some() {
            let current_month = DateRange::month_of(today)?;

            return Ok(DashboardPeriod::Range(DateRange {
                start: self.from.unwrap_or(current_month.start),
                end: self.to.unwrap_or(current_month.end),
            }));
        }

        let month = match self.month.map(month_from_number) {
            Some(Ok(month)) => month,
            Some(Err(error)) => {
                tracing::debug!("Ignoring dashboard month: {error}");
                today.month()
            }
            None => today.month(),
        };

        Ok(DashboardPeriod::Month {
            year: self.year.unwrap_or(today.year()),
            month,
        })
    }
}

impl DashboardPeriod {
    fn date_range(&self) -> Result<DateRange, Error> {
        match *self {
            DashboardPeriod::Month { year, month } => DateRange::month(year, month),
            DashboardPeriod::Range(range) => Ok(range),
        }
    }

    fn label(&self) -> String {
        match self {
            DashboardPeriod::Month { year, month } => format!("{month} {year}"),
            DashboardPeriod::Range(range) => format!(
                "{} to {}",
                format_iso_date(range.start),
                format_iso_date(range.end)
            ),
        }
    }
}

fn period_forms(period: &DashboardPeriod, range: &DateRange) -> Markup {
    let (year, month) = match *period {
        DashboardPeriod::Month { year, month } => (year, month),
        DashboardPeriod::Range(range) => (range.start.year(), range.start.month()),
    };

    html! {
        div class="flex flex-wrap items-end gap-8"
        {
            form
                method="get"
                action=(endpoints::DASHBOARD_VIEW)
                id="month-form"
                class="flex flex-wrap items-end gap-4"
            {
                div
                {
                    label for="dashboard-month" class=(FORM_LABEL_STYLE) { "Month" }
                    select name="month" id="dashboard-month" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for number in 1..=12u8 {
                            @if let Ok(option_month) = month_from_number(number) {
                                option value=(number) selected[option_month == month] { (option_month.to_string()) }
                            }
                        }
                    }
                }

                div
                {
                    label for="dashboard-year" class=(FORM_LABEL_STYLE) { "Year" }
                    input
                        type="number"
                        name="year"
                        id="dashboard-year"
                        value=(year)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class="px-4 py-2 rounded bg-gray-200 dark:bg-gray-700 text-sm"
                {
                    "Show month"
                }
            }

            form
                method="get"
                action=(endpoints::DASHBOARD_VIEW)
                id="range-form"
                class="flex flex-wrap items-end gap-4"
            {
                div
                {
                    label for="dashboard-from" class=(FORM_LABEL_STYLE) { "From" }
                    input
                        type="date"
                        name="from"
                        id="dashboard-from"
                        value=(format_iso_date(range.start))
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="dashboard-to" class=(FORM_LABEL_STYLE) { "To" }
                    input
                        type="date"
                        name="to"
                        id="dashboard-to"
                        value=(format_iso_date(range.end))
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class="px-4 py-2 rounded bg-gray-200 dark:bg-gray-700 text-sm"
                {
                    "Show range"
                }
            }
        }
    }
}

/// Display the income and expense totals, top expense categories and account
/// balances for the requested period.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let period = query.resolve(today(local_offset))?;
    let range = period.date_range()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entries = get_dashboard_entries(user_id, range, &connection)
        .inspect_err(|error| tracing::error!("could not get dashboard entries: {error}"))?;
    let balances = get_account_balances(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get account balances: {error}"))?;
    drop(connection);

    let totals = totals_by_currency(&entries)
        .inspect_err(|error| tracing::error!("could not total dashboard entries: {error}"))?;
    let top_categories = top_expense_categories(&entries, TOP_CATEGORY_COUNT)
        .inspect_err(|error| tracing::error!("could not rank expense categories: {error}"))?;
    let charts: Vec<DashboardChart> = totals
        .iter()
        .map(|(currency, currency_totals)| {
            DashboardChart::income_vs_expense(currency, currency_totals)
        })
        .collect();

    let body = html! {
        (period_forms(&period, &range))

        h2 class="text-lg font-semibold" id="period-label" { (period.label()) }

        @if balances.is_empty() {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Nothing here yet. "
                (link(endpoints::ACCOUNTS_VIEW, "Add an account"))
                " and record some transactions to see a summary."
            }
        }

        (totals_table(&totals))
        (charts_view(&charts))
        div class="grid gap-6 lg:grid-cols-2"
        {
            (top_categories_table(&top_categories))
            (balances_table(&balances))
        }
    };

    let head_elements = if charts.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            charts_script(&charts),
        ]
    };

    Ok(page(
        "Dashboard",
        NavBar::new(endpoints::DASHBOARD_VIEW).into_html(),
        &head_elements,
        &body,
    )
    .into_response())
}
