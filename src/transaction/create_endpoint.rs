//! Defines the endpoint for creating a new income or expense entry.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::get_account,
    auth::UserID,
    category::{CategoryId, get_category_of_kind},
    database_id::{DatabaseId, deserialize_optional_id},
    endpoints,
    money::parse_positive_amount,
    transaction::{NewTransaction, TransactionKind, insert_transaction, normalize_note},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    pub kind: TransactionKind,
    /// Kept as text so that both "1.5" and "1,5" are accepted.
    pub amount: String,
    /// The date when the transaction ocurred.
    pub date: Date,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub account_id: Option<DatabaseId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub note: String,
}

/// Check the form against the user's accounts and categories.
///
/// The currency is always taken from the account.
fn validate_transaction(
    form: &TransactionForm,
    user_id: UserID,
    connection: &Connection,
) -> Result<NewTransaction, Error> {
    let amount = parse_positive_amount(&form.amount)?;
    let account_id = form.account_id.ok_or(Error::AccountRequired)?;

    let account = get_account(account_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidAccount,
        error => error,
    })?;

    let category_id = form
        .category_id
        .map(|id| get_category_of_kind(id, form.kind, user_id, connection))
        .transpose()?
        .map(|category| category.id);

    Ok(NewTransaction {
        kind: form.kind,
        amount,
        currency: account.currency,
        date: form.date,
        note: normalize_note(&form.note),
        account_id: account.id,
        category_id,
        is_transfer: false,
    })
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction = match validate_transaction(&form, user_id, &connection) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::debug!("Rejected transaction {form:?}: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = insert_transaction(user_id, &transaction, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
