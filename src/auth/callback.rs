//! The page that sign-in links point to.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{
        cookie::set_auth_cookie,
        redirect::parse_redirect_url,
        sign_in_code::{RedeemedCode, redeem_sign_in_code},
    },
    endpoints,
};

/// Where a user who followed a bad link is sent.
fn invalid_link_url() -> String {
    format!("{}?error=invalid_link", endpoints::LOG_IN_VIEW)
}

/// The state needed to redeem a sign-in link.
#[derive(Debug, Clone)]
pub struct CallbackState {
    pub cookie_key: Key,
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CallbackState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<CallbackState> for Key {
    fn from_ref(state: &CallbackState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

fn redeem(code: &str, state: &CallbackState) -> Result<RedeemedCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    redeem_sign_in_code(code, OffsetDateTime::now_utc(), &connection)
}

/// Sign the user in with the code from their emailed link.
///
/// A valid code sets the session cookie and redirects to the page the user
/// originally asked for, or the dashboard. Any other code redirects back to the
/// log-in page with an error.
pub async fn get_auth_callback(
    State(state): State<CallbackState>,
    jar: PrivateCookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(code) = query.code.filter(|code| !code.trim().is_empty()) else {
        return Redirect::to(&invalid_link_url()).into_response();
    };

    let redeemed = match redeem(&code, &state) {
        Ok(redeemed) => redeemed,
        Err(Error::InvalidSignInCode) => {
            tracing::info!("Rejected an invalid or expired sign-in code.");
            return Redirect::to(&invalid_link_url()).into_response();
        }
        Err(error) => {
            tracing::error!("Could not redeem sign-in code: {error}");
            return Redirect::to(endpoints::INTERNAL_ERROR_VIEW).into_response();
        }
    };

    let redirect_url = parse_redirect_url(redeemed.redirect_url.as_deref(), "sign-in code")
        .unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

    match set_auth_cookie(jar, redeemed.user_id, state.cookie_duration) {
        Ok(jar) => (jar, Redirect::to(&redirect_url)).into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            Redirect::to(endpoints::INTERNAL_ERROR_VIEW).into_response()
        }
    }
}
