//! The log-in page and the handler that emails a sign-in link.
//!
//! There are no passwords. The user enters their email address and receives a
//! one-time link which signs them in when followed, see [super::callback].

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::{
        Mailer, get_or_create_user,
        redirect::parse_redirect_url,
        sign_in_code::{SIGN_IN_CODE_DURATION, create_sign_in_code},
        user::parse_email,
    },
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, log_in_card, submit_button},
};

/// Shown on the log-in page when the user followed a bad sign-in link.
pub const INVALID_LINK_ERROR_MSG: &str =
    "That sign-in link is invalid or has expired. Request a new one.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    value=(email)
                    placeholder="you@example.com"
                    autocomplete="email"
                    required
                    autofocus
                    tabindex="0"
                    class=(FORM_TEXT_INPUT_STYLE);

                @if let Some(error_message) = error_message {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            (submit_button("Email me a sign-in link"))
        }
    }
}

fn link_sent_view(email: &str) -> Markup {
    html! {
        div id="link-sent" class="space-y-2 text-gray-900 dark:text-white"
        {
            p class="font-semibold" { "Check your email" }
            p class="text-sm" {
                "We sent a sign-in link to " strong { (email) } ". "
                "The link works once and expires in "
                (SIGN_IN_CODE_DURATION.whole_minutes())
                " minutes."
            }
        }
    }
}

#[derive(Deserialize)]
pub struct LogInQuery {
    pub redirect_url: Option<String>,
    /// Set when the user was sent back here from a bad sign-in link.
    pub error: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let error_message = query.error.as_ref().map(|_| INVALID_LINK_ERROR_MSG);
    let log_in_form = log_in_form("", error_message, redirect_url.as_deref());
    let content = log_in_card("Sign in to your account", &log_in_form);

    base("Log In", &[], &content).into_response()
}

/// The state needed to send a sign-in link.
#[derive(Debug, Clone)]
pub struct LogInState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub mailer: Arc<dyn Mailer>,
    /// The public URL of the server, used to build the link in the email.
    pub base_url: String,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            mailer: state.mailer.clone(),
            base_url: state.base_url.clone(),
        }
    }
}

/// The data entered by the user in the log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInForm {
    pub email: String,

    /// Optional URL to redirect to after signing in.
    pub redirect_url: Option<String>,
}

fn send_sign_in_link(
    email: &str,
    redirect_url: Option<&str>,
    state: &LogInState,
) -> Result<(), Error> {
    let code = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let user = get_or_create_user(email, &connection)?;
        create_sign_in_code(user.id, redirect_url, OffsetDateTime::now_utc(), &connection)?
    };

    let link = format!(
        "{}{}?code={}",
        state.base_url.trim_end_matches('/'),
        endpoints::AUTH_CALLBACK,
        code
    );

    state.mailer.send_sign_in_link(email, &link)
}

/// Handler for log-in requests via the POST method.
///
/// A valid email address gets a sign-in link and the form is replaced with a
/// message telling the user to check their email. Otherwise, the form is
/// returned with an error message explaining the problem.
pub async fn post_log_in(State(state): State<LogInState>, Form(form): Form<LogInForm>) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let email = match parse_email(&form.email) {
        Ok(email) => email,
        Err(error) => {
            return log_in_form(&form.email, Some(&error.to_string()), redirect_url)
                .into_response();
        }
    };

    match send_sign_in_link(&email, redirect_url, &state) {
        Ok(()) => link_sent_view(&email).into_response(),
        Err(error) => {
            tracing::error!("Could not send sign-in link: {error}");
            log_in_form(&email, Some(INTERNAL_ERROR_MSG), redirect_url).into_response()
        }
    }
}
