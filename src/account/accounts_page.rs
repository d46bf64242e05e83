//! Displays accounts with their balances and the form for adding an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    auth::UserID,
    balance::{AccountBalance, get_account_balances},
    endpoints::{self, format_endpoint},
    html::{
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, currency_select, delete_button, page,
        submit_button,
    },
    money::format_money,
    navigation::NavBar,
};

/// The state needed for the [get_accounts_page](crate::account::get_accounts_page) route handler.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The account data to display in the view
#[derive(Debug, PartialEq)]
struct AccountTableRow {
    name: String,
    currency: String,
    starting_balance: Decimal,
    balance: Decimal,
    delete_url: String,
}

impl From<AccountBalance> for AccountTableRow {
    fn from(AccountBalance { account, balance }: AccountBalance) -> Self {
        Self {
            delete_url: format_endpoint(endpoints::DELETE_ACCOUNT, account.id),
            name: account.name,
            currency: account.currency,
            starting_balance: account.starting_balance,
            balance,
        }
    }
}

fn delete_confirm_message(name: &str) -> String {
    format!("Are you sure you want to delete the account '{name}'? This cannot be undone.")
}

fn create_account_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::ACCOUNTS_API)
            hx-target-error="#alert-container"
            class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-lg font-semibold" { "Add Account" }

            div class="grid gap-4 sm:grid-cols-3"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                    input
                        type="text"
                        name="name"
                        id="name"
                        placeholder="e.g. BCP Savings"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }
                    (currency_select("currency", "PEN"))
                }

                div
                {
                    label for="starting_balance" class=(FORM_LABEL_STYLE) { "Starting balance" }
                    input
                        type="text"
                        inputmode="decimal"
                        name="starting_balance"
                        id="starting_balance"
                        value="0"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            (submit_button("Add Account"))
        }
    }
}

fn accounts_table(accounts: &[AccountTableRow]) -> Markup {
    let table_row = |account: &AccountTableRow| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (account.name)
                }

                td class=(TABLE_CELL_STYLE) { (account.currency) }

                td class="px-6 py-4 text-right"
                {
                    (format_money(account.starting_balance, &account.currency))
                }

                td class="px-6 py-4 text-right font-semibold" data-balance="true"
                {
                    (format_money(account.balance, &account.currency))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (delete_button(
                        &account.delete_url,
                        &delete_confirm_message(&account.name),
                        "closest tr",
                        "delete",
                    ))
                }
            }
        )
    };

    html!(
        section class="hidden lg:block w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Currency" }
                        th scope="col" class="px-6 py-3 text-right" { "Starting balance" }
                        th scope="col" class="px-6 py-3 text-right" { "Balance" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for account in accounts {
                        (table_row(account))
                    }

                    @if accounts.is_empty() {
                        tr
                        {
                            td
                                colspan="5"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No accounts yet. Add one with the form above."
                            }
                        }
                    }
                }
            }
        }
    )
}

fn accounts_cards_view(accounts: &[AccountTableRow]) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for account in accounts {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-account-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div class="text-sm font-semibold text-gray-900 dark:text-white"
                        { (account.name) }
                        div class="text-sm tabular-nums text-right text-gray-900 dark:text-white"
                        { (format_money(account.balance, &account.currency)) }
                    }

                    div class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                    {
                        "Started at " (format_money(account.starting_balance, &account.currency))
                    }

                    div class="mt-2 flex items-center gap-4 text-sm"
                    {
                        (delete_button(
                            &account.delete_url,
                            &delete_confirm_message(&account.name),
                            "closest [data-account-card='true']",
                            "outerHTML",
                        ))
                    }
                }
            }

            @if accounts.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No accounts yet. Add one with the form above."
                }
            }
        }
    )
}

fn accounts_view(accounts: &[AccountTableRow]) -> Markup {
    let body = html!(
        (create_account_form())
        (accounts_cards_view(accounts))
        (accounts_table(accounts))
    );

    page(
        "Accounts",
        NavBar::new(endpoints::ACCOUNTS_VIEW).into_html(),
        &[],
        &body,
    )
}

/// Renders the accounts page showing all of the user's accounts.
pub async fn get_accounts_page(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts: Vec<AccountTableRow> = get_account_balances(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get account balances: {error}"))?
        .into_iter()
        .map(AccountTableRow::from)
        .collect();

    Ok(accounts_view(&accounts).into_response())
}
