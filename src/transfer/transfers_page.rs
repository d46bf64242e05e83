//! The transfer form and the history of past transfers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    account::{Account, get_accounts},
    auth::UserID,
    endpoints,
    html::{
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, page, submit_button,
    },
    money::format_money,
    navigation::NavBar,
    period::{format_iso_date, today},
    timezone::get_local_offset,
    transfer::{Transfer, get_transfers},
};

#[derive(Debug, Clone)]
pub struct TransfersViewState {
    db_connection: Arc<Mutex<Connection>>,
    local_timezone: String,
}

impl FromRef<AppState> for TransfersViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn account_select(name: &str, placeholder: &str, accounts: &[Account]) -> Markup {
    html! {
        select name=(name) id=(name) required class=(FORM_TEXT_INPUT_STYLE)
        {
            option value="" { (placeholder) }
            @for account in accounts {
                option value=(account.id) { (account.name) " (" (account.currency) ")" }
            }
        }
    }
}

fn create_transfer_form(today: Date, accounts: &[Account]) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSFERS_API)
            hx-target-error="#alert-container"
            class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-lg font-semibold" { "New Transfer" }

            div class="grid gap-4 sm:grid-cols-2"
            {
                div
                {
                    label for="from_account_id" class=(FORM_LABEL_STYLE) { "From" }
                    (account_select("from_account_id", "Source account", accounts))
                }

                div
                {
                    label for="to_account_id" class=(FORM_LABEL_STYLE) { "To" }
                    (account_select("to_account_id", "Destination account", accounts))
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input
                        type="text"
                        inputmode="decimal"
                        name="amount"
                        id="amount"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                    input
                        type="date"
                        name="date"
                        id="date"
                        value=(format_iso_date(today))
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note (optional)" }
                input type="text" name="note" id="note" class=(FORM_TEXT_INPUT_STYLE);
            }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Both accounts must use the same currency. Transfers change account balances "
                "but are not counted as income or expenses in reports."
            }

            (submit_button("Transfer"))
        }
    }
}

fn transfers_table(transfers: &[Transfer]) -> Markup {
    html! {
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "From" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "To" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                    }
                }

                tbody
                {
                    @for transfer in transfers {
                        tr class=(TABLE_ROW_STYLE) data-transfer-id=(transfer.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (format_iso_date(transfer.date)) }
                            td class=(TABLE_CELL_STYLE) { (transfer.from_account_name) }
                            td class=(TABLE_CELL_STYLE) { (transfer.to_account_name) }
                            td class=(TABLE_CELL_STYLE) { (transfer.note.as_deref().unwrap_or_default()) }
                            td class="px-6 py-4 text-right tabular-nums"
                            {
                                (format_money(transfer.amount, &transfer.currency))
                            }
                        }
                    }

                    @if transfers.is_empty() {
                        tr
                        {
                            td
                                colspan="5"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transfers yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Render the transfer form and the user's transfer history.
pub async fn get_transfers_page(
    State(state): State<TransfersViewState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_accounts(user_id, &connection)?;
    let transfers = get_transfers(user_id, &connection)?;

    let body = html! {
        (create_transfer_form(today(local_offset), &accounts))
        h2 class="text-lg font-semibold" { "History" }
        (transfers_table(&transfers))
    };

    Ok(page(
        "Transfers",
        NavBar::new(endpoints::TRANSFERS_VIEW).into_html(),
        &[],
        &body,
    )
    .into_response())
}
