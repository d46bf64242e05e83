//! Defines the route handler for the page that lists ledger entries and the
//! form for adding one.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    account::{Account, get_accounts},
    auth::UserID,
    category::{Category, get_categories},
    endpoints::{self, format_endpoint},
    html::{
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, delete_button, page, submit_button,
    },
    money::format_money,
    navigation::NavBar,
    period::{format_iso_date, today},
    timezone::get_local_offset,
    transaction::{
        MAX_TRANSACTIONS, Transaction, TransactionFilter, TransactionKind, get_transactions,
        query::{TransactionsQuery, filter_query_string},
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Lima".
    local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn filter_form(filter: &TransactionFilter) -> Markup {
    let export_url = format!(
        "{}?{}",
        endpoints::EXPORT_TRANSACTIONS,
        filter_query_string(filter)
    );

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            id="filter-form"
            class="flex flex-wrap items-end gap-4"
        {
            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    type="date"
                    name="from"
                    id="from"
                    value=(format_iso_date(filter.range.start))
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    type="date"
                    name="to"
                    id="to"
                    value=(format_iso_date(filter.range.end))
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            label class="flex items-center gap-2 text-sm"
            {
                input
                    type="checkbox"
                    name="include_transfers"
                    value="true"
                    checked[filter.include_transfers];
                "Show transfers"
            }

            button type="submit" class="px-4 py-2 rounded bg-gray-200 dark:bg-gray-700 text-sm"
            {
                "Filter"
            }

            a href=(export_url) class=(LINK_STYLE) download { "Export CSV" }
            span id="export-note" class="text-xs text-gray-500 dark:text-gray-400"
            {
                "The export includes every matching transaction, not only the "
                (MAX_TRANSACTIONS) " listed here."
            }
        }
    }
}

fn category_options(categories: &[Category], kind: TransactionKind) -> Markup {
    html! {
        @for category in categories.iter().filter(|category| category.kind == kind) {
            option value=(category.id) { (category.name) }
        }
    }
}

fn create_transaction_form(today: Date, accounts: &[Account], categories: &[Category]) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-target-error="#alert-container"
            class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-lg font-semibold" { "Add Transaction" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for (kind, label) in [
                    (TransactionKind::Expense, "Expense"),
                    (TransactionKind::Income, "Income"),
                ] {
                    div class="flex-1"
                    {
                        input
                            type="radio"
                            name="kind"
                            id={ "kind-" (kind.as_str()) }
                            value=(kind.as_str())
                            checked[kind == TransactionKind::Expense]
                            required
                            class=(FORM_RADIO_INPUT_STYLE);
                        label for={ "kind-" (kind.as_str()) } class=(FORM_RADIO_LABEL_STYLE) { (label) }
                    }
                }
            }

            div class="grid gap-4 sm:grid-cols-2"
            {
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

                div
                {
                    label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }
                    select name="account_id" id="account_id" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "Select an account" }
                        @for account in accounts {
                            option value=(account.id) { (account.name) " (" (account.currency) ")" }
                        }
                    }
                }

                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }
                    select name="category_id" id="category_id" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "None" }
                        optgroup label="Expense" { (category_options(categories, TransactionKind::Expense)) }
                        optgroup label="Income" { (category_options(categories, TransactionKind::Income)) }
                    }
                }
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note" }
                input type="text" name="note" id="note" class=(FORM_TEXT_INPUT_STYLE);
            }

            (submit_button("Add Transaction"))
        }
    }
}

fn signed_amount(transaction: &Transaction) -> Markup {
    let (sign, style) = match transaction.kind {
        TransactionKind::Income => ("+", "text-green-700 dark:text-green-400"),
        TransactionKind::Expense => ("-", "text-red-700 dark:text-red-400"),
    };

    html! {
        span class=(style) { (sign) (format_money(transaction.amount, &transaction.currency)) }
    }
}

fn transactions_table(transactions: &[Transaction]) -> Markup {
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
                        th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (format_iso_date(transaction.date)) }
                            td class=(TABLE_CELL_STYLE) { (transaction.account_name) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if transaction.is_transfer {
                                    "Transfer"
                                } @else {
                                    (transaction.category_name.as_deref().unwrap_or("Uncategorized"))
                                }
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.note.as_deref().unwrap_or_default()) }
                            td class="px-6 py-4 text-right tabular-nums" { (signed_amount(transaction)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if !transaction.is_transfer {
                                    (delete_button(
                                        &format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id),
                                        "Are you sure you want to delete this transaction?",
                                        "closest tr",
                                        "delete",
                                    ))
                                }
                            }
                        }
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan="6"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transactions in this period."
                            }
                        }
                    }
                }
            }

            @if transactions.len() == MAX_TRANSACTIONS as usize {
                p class="px-6 py-2 text-xs text-gray-500"
                {
                    "Showing the latest " (MAX_TRANSACTIONS) " transactions. Narrow the dates to see older ones."
                }
            }
        }
    }
}

fn transactions_view(
    filter: &TransactionFilter,
    today: Date,
    accounts: &[Account],
    categories: &[Category],
    transactions: &[Transaction],
) -> Markup {
    let body = html! {
        (create_transaction_form(today, accounts, categories))
        (filter_form(filter))
        (transactions_table(transactions))
    };

    page(
        "Transactions",
        NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html(),
        &[],
        &body,
    )
}

/// Render the user's transactions in the date range from the query string,
/// by default the current month.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let today = today(local_offset);
    let filter = query.to_filter(today);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_accounts(user_id, &connection)?;
    let categories = get_categories(user_id, None, &connection)?;
    let transactions = get_transactions(user_id, &filter, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    Ok(transactions_view(&filter, today, &accounts, &categories, &transactions).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Error, endpoints,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_valid_html, create_test_account,
            create_test_category, get_test_connection, must_get_form, parse_html_document,
        },
        transaction::{NewTransaction, TransactionKind, insert_transaction, query::TransactionsQuery},
    };

    use super::{TransactionsViewState, get_transactions_page};

    fn query(from: time::Date, to: time::Date, include_transfers: bool) -> TransactionsQuery {
        TransactionsQuery {
            from: Some(from),
            to: Some(to),
            include_transfers: include_transfers.then(|| "true".to_owned()),
        }
    }

    fn insert(
        user_id: crate::UserID,
        account_id: i64,
        date: time::Date,
        is_transfer: bool,
        conn: &rusqlite::Connection,
    ) -> i64 {
        insert_transaction(
            user_id,
            &NewTransaction {
                kind: TransactionKind::Expense,
                amount: dec!(8.5),
                currency: "PEN".to_owned(),
                date,
                note: Some("bus".to_owned()),
                account_id,
                category_id: None,
                is_transfer,
            },
            conn,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn page_has_create_form_and_rows() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        create_test_category(user.id, "Transport", TransactionKind::Expense, &conn);
        insert(user.id, account.id, date!(2025 - 04 - 02), false, &conn);
        insert(user.id, account.id, date!(2025 - 04 - 03), true, &conn);
        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_transactions_page(
            State(state),
            Extension(user.id),
            Query(query(date!(2025 - 04 - 01), date!(2025 - 04 - 30), false)),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "text");
        assert_form_input(&form, "date", "date");

        let rows = document
            .select(&Selector::parse("tr[data-transaction-id]").unwrap())
            .count();
        assert_eq!(rows, 1, "transfer entries should be hidden by default");

        let category_options = document
            .select(&Selector::parse("optgroup[label=Expense] option").unwrap())
            .map(|option| option.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(category_options, vec!["Transport".to_owned()]);
    }

    #[tokio::test]
    async fn transfer_rows_have_no_delete_button() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        insert(user.id, account.id, date!(2025 - 04 - 03), true, &conn);
        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_transactions_page(
            State(state),
            Extension(user.id),
            Query(query(date!(2025 - 04 - 01), date!(2025 - 04 - 30), true)),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        assert_eq!(
            document
                .select(&Selector::parse("tr[data-transaction-id]").unwrap())
                .count(),
            1
        );
        assert_eq!(
            document
                .select(&Selector::parse("tr[data-transaction-id] button[hx-delete]").unwrap())
                .count(),
            0
        );
    }

    #[tokio::test]
    async fn export_link_carries_filter() {
        let (conn, user) = get_test_connection();
        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_transactions_page(
            State(state),
            Extension(user.id),
            Query(query(date!(2025 - 01 - 01), date!(2025 - 03 - 31), false)),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        let href = document
            .select(&Selector::parse("a[download]").unwrap())
            .next()
            .expect("want an export link")
            .value()
            .attr("href")
            .unwrap()
            .to_owned();
        assert_eq!(
            href,
            format!(
                "{}?from=2025-01-01&to=2025-03-31",
                endpoints::EXPORT_TRANSACTIONS
            )
        );
        let note = document
            .select(&Selector::parse("#export-note").unwrap())
            .next()
            .expect("want a note next to the export link")
            .text()
            .collect::<String>();
        assert!(note.contains("every matching transaction"));
    }

    #[tokio::test]
    async fn default_range_is_current_month() {
        let (conn, user) = get_test_connection();
        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_transactions_page(
            State(state),
            Extension(user.id),
            Query(TransactionsQuery::default()),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        let from = document
            .select(&Selector::parse("input#from").unwrap())
            .next()
            .unwrap()
            .value()
            .attr("value")
            .unwrap()
            .to_owned();
        let today = OffsetDateTime::now_utc().date();
        assert_eq!(from, format!("{}-{:02}-01", today.year(), today.month() as u8));
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let (conn, user) = get_test_connection();
        let state = TransactionsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Not/AZone".to_owned(),
        };

        let result = get_transactions_page(
            State(state),
            Extension(user.id),
            Query(TransactionsQuery::default()),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidTimezoneError(_))));
    }
}
