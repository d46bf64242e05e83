//! Alert fragments for reporting the outcome of htmx requests.
//!
//! Alerts are swapped out-of-band into the `#alert-container` element that
//! [base](crate::html::base) places on every page.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A success or error message shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    SuccessSimple { message: String },
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (is_success, message, details) = match self {
            Alert::Success { message, details } => (true, message, Some(details)),
            Alert::SuccessSimple { message } => (true, message, None),
            Alert::Error { message, details } => (false, message, Some(details)),
            Alert::ErrorSimple { message } => (false, message, None),
        };

        let style = if is_success {
            "p-4 mb-4 text-sm rounded-lg shadow text-green-800 bg-green-50 \
            dark:bg-gray-800 dark:text-green-400"
        } else {
            "p-4 mb-4 text-sm rounded-lg shadow text-red-800 bg-red-50 \
            dark:bg-gray-800 dark:text-red-400"
        };

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class=(style)
                    data-alert-kind=(if is_success { "success" } else { "error" })
                {
                    div class="flex items-start justify-between gap-4"
                    {
                        div
                        {
                            p class="font-semibold" { (message) }

                            @if let Some(details) = details.filter(|details| !details.is_empty()) {
                                p class="mt-1" { (details) }
                            }
                        }

                        button
                            type="button"
                            aria-label="Dismiss"
                            class="font-bold"
                            onclick="this.closest('[role=alert]').remove()"
                        {
                            "×"
                        }
                    }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_fragment};

    use super::Alert;

    #[tokio::test]
    async fn success_alert_renders_message() {
        let response = Alert::SuccessSimple {
            message: "Saved".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let alert = html
            .select(&Selector::parse("[role=alert]").unwrap())
            .next()
            .expect("alert missing");
        assert_eq!(alert.value().attr("data-alert-kind"), Some("success"));
        assert!(alert.text().any(|text| text.contains("Saved")));
    }

    #[tokio::test]
    async fn error_alert_renders_details() {
        let response = Alert::Error {
            message: "Nope".to_owned(),
            details: "Try again".to_owned(),
        }
        .into_response();

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let alert = html
            .select(&Selector::parse("[role=alert]").unwrap())
            .next()
            .expect("alert missing");
        assert_eq!(alert.value().attr("data-alert-kind"), Some("error"));
        let text = alert.text().collect::<String>();
        assert!(text.contains("Nope"));
        assert!(text.contains("Try again"));
    }
}
