//! Defines the endpoint for moving money between two accounts.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::{DatabaseId, deserialize_optional_id},
    endpoints,
    transfer::{TransferInput, create_transfer, validate_transfer},
};

/// The state needed to create a transfer.
#[derive(Debug, Clone)]
pub struct CreateTransferState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferForm {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub from_account_id: Option<DatabaseId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub to_account_id: Option<DatabaseId>,
    pub amount: String,
    pub date: Date,
    #[serde(default)]
    pub note: String,
}

/// A route handler for creating a transfer, redirects to the transfers view on success.
pub async fn create_transfer_endpoint(
    State(state): State<CreateTransferState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransferForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let input = TransferInput {
        from_account_id: form.from_account_id,
        to_account_id: form.to_account_id,
        amount: &form.amount,
        date: form.date,
        note: &form.note,
    };

    let transfer = match validate_transfer(input, user_id, &connection) {
        Ok(transfer) => transfer,
        Err(error) => {
            tracing::debug!("Rejected transfer {form:?}: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = create_transfer(user_id, &transfer, &connection) {
        tracing::error!("could not create transfer: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSFERS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
