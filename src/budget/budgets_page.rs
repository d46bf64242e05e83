//! The budgets page: period selector, budget form and per-category status.

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
    budget::{BudgetStatus, ZeroBudgetPolicy, evaluate_budgets, get_budgets, get_expenses},
    category::{Category, get_categories},
    endpoints,
    html::{FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, link, page, submit_button},
    money::{SUPPORTED_CURRENCIES, format_money},
    navigation::NavBar,
    period::{DateRange, month_from_number, today},
    timezone::get_local_offset,
    transaction::TransactionKind,
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsViewState {
    db_connection: Arc<Mutex<Connection>>,
    local_timezone: String,
    budget_currency: String,
    zero_budget_policy: ZeroBudgetPolicy,
}

impl FromRef<AppState> for BudgetsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            budget_currency: state.budget_currency.clone(),
            zero_budget_policy: state.zero_budget_policy,
        }
    }
}

/// The month to show, defaults to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetsQuery {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

impl BudgetsQuery {
    fn resolve(&self, today: Date) -> (i32, Month) {
        let month = match self.month.map(month_from_number) {
            Some(Ok(month)) => month,
            Some(Err(error)) => {
                tracing::debug!("Ignoring budgets query: {error}");
                today.month()
            }
            None => today.month(),
        };

        (self.year.unwrap_or(today.year()), month)
    }
}

fn period_form(year: i32, month: Month) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::BUDGETS_VIEW)
            id="period-form"
            class="flex flex-wrap items-end gap-4"
        {
            div
            {
                label for="period-month" class=(FORM_LABEL_STYLE) { "Month" }
                select name="month" id="period-month" class=(FORM_TEXT_INPUT_STYLE)
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
                label for="period-year" class=(FORM_LABEL_STYLE) { "Year" }
                input
                    type="number"
                    name="year"
                    id="period-year"
                    value=(year)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class="px-4 py-2 rounded bg-gray-200 dark:bg-gray-700 text-sm"
            {
                "Show"
            }
        }
    }
}

fn budget_form(year: i32, month: Month, categories: &[Category], currency: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-target-error="#alert-container"
            class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-lg font-semibold" { "Set Budget for " (month.to_string()) " " (year) }

            input type="hidden" name="year" value=(year);
            input type="hidden" name="month" value=(month as u8);

            div class="grid gap-4 sm:grid-cols-3"
            {
                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }
                    select name="category_id" id="category_id" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "Expense category" }
                        @for category in categories {
                            option value=(category.id) { (category.name) }
                        }
                    }
                }

                div
                {
                    label for="limit" class=(FORM_LABEL_STYLE) { "Limit" }
                    input
                        type="text"
                        inputmode="decimal"
                        name="limit"
                        id="limit"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }
                    select name="currency" id="currency" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for code in SUPPORTED_CURRENCIES {
                            option value=(code) selected[code == currency] { (code) }
                        }
                    }
                }
            }

            (submit_button("Save Budget"))
        }
    }
}

fn status_list(statuses: &[BudgetStatus]) -> Markup {
    html! {
        @if statuses.is_empty() {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "No expense categories yet. "
                (link(endpoints::SETUP_VIEW, "Add the default categories"))
                " to start budgeting."
            }
        } @else {
            ul class="space-y-2" id="budget-status"
            {
                @for status in statuses {
                    @let border = if status.exceeded {
                        "border-red-500"
                    } else {
                        "border-gray-200 dark:border-gray-700"
                    };

                    li
                        class={ "flex items-center justify-between rounded border bg-white dark:bg-gray-800 px-4 py-3 " (border) }
                        data-exceeded=(status.exceeded.to_string())
                    {
                        div
                        {
                            p class="font-medium" { (status.category.name) }
                            p class="text-sm text-gray-500 dark:text-gray-400"
                            {
                                "Spent " (format_money(status.spent, &status.currency))
                                " of " (format_money(status.limit, &status.currency))
                            }
                        }

                        @if status.exceeded {
                            span class="text-sm font-semibold text-red-600" { "Over budget" }
                        } @else {
                            span class="text-sm text-gray-700 dark:text-gray-300"
                            {
                                (format_money(status.remaining, &status.currency)) " left"
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Render the budget status of every expense category for the selected month.
pub async fn get_budgets_page(
    State(state): State<BudgetsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<BudgetsQuery>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let (year, month) = query.resolve(today(local_offset));
    let range = DateRange::month(year, month)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, Some(TransactionKind::Expense), &connection)?;
    let budgets = get_budgets(user_id, year, month, &connection)?;
    let expenses = get_expenses(user_id, range, &connection)?;

    let statuses = evaluate_budgets(
        &categories,
        &budgets,
        &expenses,
        &state.budget_currency,
        state.zero_budget_policy,
    )
    .inspect_err(|error| tracing::error!("could not evaluate budgets: {error}"))?;

    let body = html! {
        (period_form(year, month))
        (budget_form(year, month, &categories, &state.budget_currency))
        h2 class="text-lg font-semibold" { "Status for " (month.to_string()) " " (year) }
        (status_list(&statuses))
    };

    Ok(page(
        "Budgets",
        NavBar::new(endpoints::BUDGETS_VIEW).into_html(),
        &[],
        &body,
    )
    .into_response())
}
