//! Defines the endpoint for deleting an account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, OptionalExtension};

use crate::{AppState, Error, account::AccountId, alert::Alert, auth::UserID};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The database connection for managing account.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an account, responds with an alert.
///
/// Accounts that still have transactions or transfers are not deleted.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_account(account_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(row_affected) if row_affected != 0 => Alert::SuccessSimple {
            message: "Account deleted successfully".to_owned(),
        }
        .into_response(),
        Ok(_) => Error::DeleteMissingAccount.into_alert_response(),
        Err(error) => {
            tracing::warn!("Could not delete account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

type RowsAffected = usize;

fn delete_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let name: Option<String> = connection
        .query_row(
            "SELECT name FROM account WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
            |row| row.get(0),
        )
        .optional()?;

    let Some(name) = name else {
        return Ok(0);
    };

    let in_use: bool = connection.query_row(
        "SELECT EXISTS (SELECT 1 FROM \"transaction\" WHERE account_id = ?1)
            OR EXISTS (SELECT 1 FROM transfer WHERE from_account_id = ?1 OR to_account_id = ?1)",
        [id],
        |row| row.get(0),
    )?;

    if in_use {
        return Err(Error::AccountInUse(name));
    }

    connection
        .execute(
            "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::AccountInUse(name)
            }
            error => error.into(),
        })
}
