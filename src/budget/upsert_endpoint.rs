//! Defines the endpoint for setting a category's budget for a month.
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

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{BudgetInput, upsert_budget, validate_budget},
    category::CategoryId,
    database_id::deserialize_optional_id,
    endpoints,
};

/// The state needed to create or update a budget.
#[derive(Debug, Clone)]
pub struct UpsertBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The currency used when the form does not name one.
    pub budget_currency: String,
}

impl FromRef<AppState> for UpsertBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            budget_currency: state.budget_currency.clone(),
        }
    }
}

/// The form data for setting a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub category_id: Option<CategoryId>,
    pub limit: String,
    pub month: u8,
    pub year: i32,
    pub currency: Option<String>,
}

/// A route handler that creates or replaces a budget, redirects to the
/// budgets view for the same month on success.
pub async fn upsert_budget_endpoint(
    State(state): State<UpsertBudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let input = BudgetInput {
        category_id: form.category_id,
        limit: &form.limit,
        month: form.month,
        year: form.year,
        currency: form.currency.as_deref(),
    };

    let budget = match validate_budget(input, &state.budget_currency, user_id, &connection) {
        Ok(budget) => budget,
        Err(error) => {
            tracing::debug!("Rejected budget {form:?}: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = upsert_budget(user_id, &budget, &connection) {
        tracing::error!("could not save budget: {error}");
        return error.into_alert_response();
    }

    let redirect_url = format!(
        "{}?year={}&month={}",
        endpoints::BUDGETS_VIEW,
        budget.year,
        budget.month as u8
    );

    (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response()
}
