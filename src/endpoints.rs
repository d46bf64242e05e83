//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/accounts/{account_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for listing and creating transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for listing and creating accounts.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The page for making transfers between accounts.
pub const TRANSFERS_VIEW: &str = "/transfers";
/// The page for setting and reviewing monthly budgets.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for seeding the default categories.
pub const SETUP_VIEW: &str = "/setup";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route that exchanges a sign-in code for a session.
pub const AUTH_CALLBACK: &str = "/auth/callback";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for requesting a sign-in link.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create an account.
pub const ACCOUNTS_API: &str = "/api/accounts";
/// The route to delete an account.
pub const DELETE_ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to download transactions as a CSV file.
pub const EXPORT_TRANSACTIONS: &str = "/api/transactions/export";
/// The route to create a transfer.
pub const TRANSFERS_API: &str = "/api/transfers";
/// The route to create or update a budget.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to seed the default categories.
pub const SETUP_API: &str = "/api/setup";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
