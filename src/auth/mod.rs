//! Passwordless authentication.
//!
//! Users sign in by following a one-time link sent to their email address.
//! The session is then kept in an encrypted cookie that slides forward on
//! every authenticated request.

mod callback;
mod cookie;
mod log_in;
mod log_out;
mod mailer;
mod middleware;
mod redirect;
mod sign_in_code;
mod user;

pub use callback::get_auth_callback;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use mailer::{LogMailer, Mailer};
pub use middleware::{auth_guard, auth_guard_hx};
pub use sign_in_code::create_sign_in_code_table;
pub use user::{User, UserID, create_user_table, find_user_by_id, get_or_create_user};

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;

#[cfg(test)]
pub(crate) use cookie::{COOKIE_TOKEN, set_auth_cookie};
#[cfg(test)]
pub(crate) use mailer::test_mailer;
