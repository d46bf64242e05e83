//! Download the filtered ledger as a CSV file.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    period::{format_iso_date, today},
    timezone::get_local_offset,
    transaction::{Transaction, TransactionFilter, get_all_transactions, query::TransactionsQuery},
};

const CSV_HEADER: [&str; 8] = [
    "date",
    "kind",
    "amount",
    "currency",
    "account",
    "category",
    "note",
    "is_transfer",
];

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    db_connection: Arc<Mutex<Connection>>,
    local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Write `transactions` as CSV, header first.
fn write_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                format_iso_date(transaction.date),
                transaction.kind.to_string(),
                transaction.amount.to_string(),
                transaction.currency.clone(),
                transaction.account_name.clone(),
                transaction.category_name.clone().unwrap_or_default(),
                transaction.note.clone().unwrap_or_default(),
                transaction.is_transfer.to_string(),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

fn export_file_name(filter: &TransactionFilter) -> String {
    format!(
        "transactions_{}_to_{}.csv",
        format_iso_date(filter.range.start),
        format_iso_date(filter.range.end)
    )
}

/// A route handler that responds with the transactions matching the query as a CSV attachment.
pub async fn export_transactions_endpoint(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let filter = query.to_filter(today(local_offset));

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_transactions(user_id, &filter, &connection)?
    };

    let body = write_csv(&transactions)?;
    let content_disposition = format!("attachment; filename=\"{}\"", export_file_name(&filter));

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (CONTENT_DISPOSITION, content_disposition),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        body::to_bytes,
        extract::{Query, State},
        http::StatusCode,
    };
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        test_utils::{create_test_account, create_test_category, get_test_connection},
        transaction::{NewTransaction, TransactionKind, insert_transaction, query::TransactionsQuery},
    };

    use super::{ExportState, export_transactions_endpoint};

    async fn export(state: ExportState, user_id: crate::UserID, query: &str) -> (StatusCode, String, String) {
        let query: TransactionsQuery = serde_urlencoded::from_str(query).unwrap();
        let response = export_transactions_endpoint(State(state), Extension(user_id), Query(query))
            .await
            .unwrap();

        let status = response.status();
        let disposition = response
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, disposition, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn empty_export_has_header_only() {
        let (conn, user) = get_test_connection();
        let state = ExportState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let (status, disposition, body) =
            export(state, user.id, "from=2025-01-01&to=2025-01-31").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            disposition,
            "attachment; filename=\"transactions_2025-01-01_to_2025-01-31.csv\""
        );
        assert_eq!(
            body,
            "date,kind,amount,currency,account,category,note,is_transfer\n"
        );
    }

    #[tokio::test]
    async fn rows_quote_notes_with_commas() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        let category = create_test_category(user.id, "Food", TransactionKind::Expense, &conn);
        insert_transaction(
            user.id,
            &NewTransaction {
                kind: TransactionKind::Expense,
                amount: dec!(15.40),
                currency: "PEN".to_owned(),
                date: date!(2025 - 01 - 09),
                note: Some("menu, drinks".to_owned()),
                account_id: account.id,
                category_id: Some(category.id),
                is_transfer: false,
            },
            &conn,
        )
        .unwrap();
        let state = ExportState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let (_, _, body) = export(state, user.id, "from=2025-01-01&to=2025-01-31").await;

        let lines = body.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "2025-01-09,expense,15.40,PEN,Wallet,Food,\"menu, drinks\",false"
        );
    }
}
