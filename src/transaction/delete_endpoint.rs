use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    transaction::{TransactionId, delete_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with an alert.
///
/// Entries written by a transfer are refused.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(0) => Error::DeleteMissingTransaction.into_alert_response(),
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(_) => Alert::SuccessSimple {
            message: "Transaction deleted".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::warn!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        test_utils::{create_test_account, get_test_connection},
        transaction::{NewTransaction, TransactionKind, insert_transaction},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn new_income(account_id: i64, is_transfer: bool) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Income,
            amount: dec!(40),
            currency: "PEN".to_owned(),
            date: date!(2025 - 06 - 01),
            note: None,
            account_id,
            category_id: None,
            is_transfer,
        }
    }

    #[tokio::test]
    async fn deletes_then_reports_missing() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        let id = insert_transaction(user.id, &new_income(account.id, false), &conn).unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response =
            delete_transaction_endpoint(State(state.clone()), Extension(user.id), Path(id)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response =
            delete_transaction_endpoint(State(state), Extension(user.id), Path(id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn transfer_half_is_refused() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        let id = insert_transaction(user.id, &new_income(account.id, true), &conn).unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response =
            delete_transaction_endpoint(State(state.clone()), Extension(user.id), Path(id)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let remaining: i64 = state
            .db_connection
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 1);
    }
}
