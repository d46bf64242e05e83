//! The setup page where a new user adds the default categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    category::{Category, get_categories, seed_default_categories},
    endpoints,
    html::{FORM_CONTAINER_STYLE, page, submit_button},
    navigation::NavBar,
    transaction::TransactionKind,
};

/// The state needed for the setup page and endpoint.
#[derive(Debug, Clone)]
pub struct SetupState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SetupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn category_list(title: &str, categories: &[&Category]) -> Markup {
    html! {
        section
        {
            h2 class="font-semibold" { (title) }

            @if categories.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "None yet." }
            } @else {
                ul class="list-disc list-inside text-sm"
                {
                    @for category in categories {
                        li { (category.name) }
                    }
                }
            }
        }
    }
}

fn setup_view(categories: &[Category]) -> Markup {
    let (income, expense): (Vec<&Category>, Vec<&Category>) = categories
        .iter()
        .partition(|category| category.kind == TransactionKind::Income);

    let body = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            p
            {
                "Add the default income and expense categories. "
                "Categories you already have are left as they are."
            }

            form
                hx-post=(endpoints::SETUP_API)
                hx-target-error="#alert-container"
                hx-swap="none"
            {
                (submit_button("Add default categories"))
            }
        }

        div class="grid gap-6 sm:grid-cols-2"
        {
            (category_list("Income categories", &income))
            (category_list("Expense categories", &expense))
        }
    };

    page(
        "Setup",
        NavBar::new(endpoints::SETUP_VIEW).into_html(),
        &[],
        &body,
    )
}

/// Renders the setup page with the user's current categories.
pub async fn get_setup_page(
    State(state): State<SetupState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, None, &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    Ok(setup_view(&categories).into_response())
}

/// Seeds the default categories and reports how many were added.
pub async fn seed_categories_endpoint(
    State(state): State<SetupState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match seed_default_categories(user_id, &connection) {
        Ok(0) => Alert::SuccessSimple {
            message: "You already have all of the default categories".to_owned(),
        }
        .into_response(),
        Ok(inserted) => {
            tracing::info!("Added {inserted} default categories for user {user_id}");
            Alert::Success {
                message: "Categories added".to_owned(),
                details: format!("Added {inserted} categories. Reload the page to see them."),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not seed categories for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::State,
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        category::{DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES, get_categories},
        endpoints,
        test_utils::{
            assert_hx_endpoint, assert_valid_html, get_test_connection, must_get_form,
            parse_html_document, parse_html_fragment,
        },
    };

    use super::{SetupState, get_setup_page, seed_categories_endpoint};

    #[tokio::test]
    async fn setup_page_has_seed_form() {
        let (conn, user) = get_test_connection();
        let state = SetupState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = get_setup_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::SETUP_API, "hx-post");
    }

    #[tokio::test]
    async fn seeding_reports_inserted_count_then_nothing_to_do() {
        let (conn, user) = get_test_connection();
        let state = SetupState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let total = DEFAULT_INCOME_CATEGORIES.len() + DEFAULT_EXPENSE_CATEGORIES.len();

        let response = seed_categories_endpoint(State(state.clone()), Extension(user.id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fragment = parse_html_fragment(response).await;
        let text = fragment
            .select(&Selector::parse("[role=alert]").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert!(text.contains(&format!("Added {total} categories")), "{text}");

        let response = seed_categories_endpoint(State(state.clone()), Extension(user.id)).await;
        let fragment = parse_html_fragment(response).await;
        let text = fragment.root_element().text().collect::<String>();
        assert!(text.contains("already have all"));

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_categories(user.id, None, &connection).unwrap().len(),
            total
        );
    }
}
