//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::{DEFAULT_COOKIE_DURATION, Mailer},
    budget::ZeroBudgetPolicy,
    db::initialize,
};

/// Server settings that are not secrets.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The local timezone as a canonical timezone name, e.g. "America/Lima".
    pub local_timezone: String,
    /// The public URL of the server, used in emailed sign-in links.
    pub base_url: String,
    /// The currency given to new budgets.
    pub budget_currency: String,
    /// How a budget limit of zero is treated.
    pub zero_budget_policy: ZeroBudgetPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            local_timezone: "Etc/UTC".to_owned(),
            base_url: "http://localhost:3000".to_owned(),
            budget_currency: "PEN".to_owned(),
            zero_budget_policy: ZeroBudgetPolicy::default(),
        }
    }
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "America/Lima".
    pub local_timezone: String,

    /// The public URL of the server, used in emailed sign-in links.
    pub base_url: String,

    /// The currency given to new budgets.
    pub budget_currency: String,

    /// How a budget limit of zero is treated.
    pub zero_budget_policy: ZeroBudgetPolicy,

    /// Delivers sign-in links.
    pub mailer: Arc<dyn Mailer>,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        config: AppConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: config.local_timezone,
            base_url: config.base_url,
            budget_currency: config.budget_currency,
            zero_budget_policy: config.zero_budget_policy,
            mailer,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
