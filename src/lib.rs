//! Finanzas is a web app for tracking personal finances across accounts in
//! more than one currency.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod balance;
mod budget;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod money;
mod navigation;
mod not_found;
mod period;
mod routing;
mod timezone;
mod transaction;
mod transfer;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppConfig, AppState};
pub use auth::{LogMailer, Mailer, UserID};
pub use budget::ZeroBudgetPolicy;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar")]
    CookieMissing,

    /// The auth cookie could not be decoded into a token.
    #[error("the auth cookie is invalid: {0}")]
    InvalidCookie(String),

    /// The token in the auth cookie has expired.
    #[error("the session has expired")]
    SessionExpired,

    /// The sign-in code does not exist, was already used, or has expired.
    #[error("the sign-in link is invalid or has expired")]
    InvalidSignInCode,

    /// The user entered something that is not an email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The sign-in link could not be delivered.
    #[error("could not send the sign-in link: {0}")]
    MailerError(String),

    /// An amount could not be parsed as a finite decimal number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// An amount was larger than the largest accepted amount in either direction.
    #[error("the amount cannot be more than 1,000,000,000,000,000")]
    AmountTooLarge,

    /// A sum of stored amounts does not fit in a decimal.
    #[error("the total of the stored amounts is too large to compute")]
    AmountOverflow,

    /// An amount that must be greater than zero was zero or negative.
    #[error("the amount must be greater than zero")]
    NonPositiveAmount,

    /// A budget limit was below zero.
    #[error("the budget limit cannot be negative")]
    NegativeBudgetLimit,

    /// A currency code was not three letters.
    #[error("\"{0}\" is not a valid currency code")]
    InvalidCurrency(String),

    /// An empty string was used as an account name.
    #[error("account name cannot be empty")]
    EmptyAccountName,

    /// The specified account name already exists for the user.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountName(String),

    /// No account was selected for a transaction.
    #[error("an account must be selected")]
    AccountRequired,

    /// The account ID does not refer to one of the user's accounts.
    #[error("the account ID does not refer to a valid account")]
    InvalidAccount,

    /// No category was selected where one is required.
    #[error("a category must be selected")]
    CategoryRequired,

    /// The category ID does not refer to one of the user's categories of the right kind.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// One or both accounts of a transfer were not selected.
    #[error("both accounts must be selected for a transfer")]
    TransferAccountsRequired,

    /// The source and destination of a transfer are the same account.
    #[error("cannot transfer from an account to itself")]
    SameTransferAccount,

    /// The source and destination accounts of a transfer use different currencies.
    #[error("cannot transfer from a {from} account to a {to} account")]
    TransferCurrencyMismatch {
        /// Currency of the source account.
        from: String,
        /// Currency of the destination account.
        to: String,
    },

    /// A month number outside of 1 to 12.
    #[error("{0} is not a valid month")]
    InvalidMonth(u8),

    /// A calendar period could not be constructed.
    #[error("invalid period {0}")]
    InvalidPeriod(String),

    /// The account still has ledger entries or transfers referencing it.
    #[error("the account \"{0}\" still has transactions")]
    AccountInUse(String),

    /// Tried to delete an account that does not exist.
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete one half of a transfer.
    #[error("transfer transactions cannot be deleted individually")]
    DeleteTransferTransaction,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The CSV export could not be written.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

fn error_alert(status: StatusCode, message: &str, details: String) -> Response {
    (
        status,
        Alert::Error {
            message: message.to_owned(),
            details,
        },
    )
        .into_response()
}

impl Error {
    fn into_alert_response(self) -> Response {
        let details = self.to_string();

        match self {
            Error::InvalidAmount(_)
            | Error::AmountTooLarge
            | Error::NonPositiveAmount
            | Error::NegativeBudgetLimit
            | Error::InvalidMonth(_)
            | Error::InvalidPeriod(_) => {
                error_alert(StatusCode::BAD_REQUEST, "Invalid amount or date", details)
            }
            Error::InvalidCurrency(_) => {
                error_alert(StatusCode::BAD_REQUEST, "Invalid currency", details)
            }
            Error::EmptyAccountName => error_alert(
                StatusCode::BAD_REQUEST,
                "Invalid account name",
                "Enter a name for the account.".to_owned(),
            ),
            Error::DuplicateAccountName(name) => error_alert(
                StatusCode::BAD_REQUEST,
                "Duplicate Account Name",
                format!(
                    "The account {name} already exists. \
                    Choose a different account name, or delete the existing account."
                ),
            ),
            Error::AccountRequired | Error::InvalidAccount => {
                error_alert(StatusCode::BAD_REQUEST, "Invalid account", details)
            }
            Error::CategoryRequired | Error::InvalidCategory => {
                error_alert(StatusCode::BAD_REQUEST, "Invalid category", details)
            }
            Error::TransferAccountsRequired
            | Error::SameTransferAccount
            | Error::TransferCurrencyMismatch { .. } => {
                error_alert(StatusCode::BAD_REQUEST, "Invalid transfer", details)
            }
            Error::AccountInUse(name) => error_alert(
                StatusCode::CONFLICT,
                "Account in use",
                format!(
                    "The account {name} still has transactions or transfers. \
                    Delete those first, then delete the account."
                ),
            ),
            Error::DeleteMissingAccount => error_alert(
                StatusCode::NOT_FOUND,
                "Could not delete account",
                "The account could not be found. \
                Try refreshing the page to see if the account has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingTransaction => error_alert(
                StatusCode::NOT_FOUND,
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteTransferTransaction => error_alert(
                StatusCode::BAD_REQUEST,
                "Could not delete transaction",
                "This transaction is half of a transfer and cannot be deleted on its own."
                    .to_owned(),
            ),
            Error::InvalidTimezoneError(timezone) => error_alert(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings",
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                error_alert(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                )
            }
        }
    }
}
