//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{Method, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Bodies longer than this many bytes are truncated in `info` logs.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values must never reach the logs.
const REDACTED_FIELDS: [&str; 2] = ["email", "code"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = read_body(body).await;
    let body_text = String::from_utf8_lossy(&body).to_string();

    let is_form = parts.method == Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    let display_text = if is_form {
        REDACTED_FIELDS
            .iter()
            .fold(body_text, |text, field| redact_field(&text, field))
    } else {
        body_text
    };

    let uri = parts.uri.clone();
    log_body("Received request", &format!("{parts:#?}"), &display_text);

    let request = Request::from_parts(parts, Body::from(body));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body = read_body(body).await;
    let body_text = String::from_utf8_lossy(&body);
    log_body(
        &format!("Sending response for {uri}"),
        &format!("{parts:#?}"),
        &body_text,
    );

    Response::from_parts(parts, Body::from(body))
}

async fn read_body(body: Body) -> Bytes {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .inspect_err(|error| tracing::error!("could not read body for logging: {error}"))
        .unwrap_or_default()
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    let key = format!("{field_name}=");

    form_text
        .split('&')
        .map(|pair| {
            if pair.starts_with(&key) {
                format!("{key}********")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn log_body(label: &str, head: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        let cut = (0..=LOG_BODY_LENGTH_LIMIT)
            .rev()
            .find(|&index| body.is_char_boundary(index))
            .unwrap_or(0);
        tracing::info!("{label}: {head}\nbody: {}...", &body[..cut]);
        tracing::debug!("{label}, full body: {body:?}");
    } else {
        tracing::info!("{label}: {head}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::redact_field;

    #[test]
    fn redacts_email_field() {
        let redacted = redact_field("email=me%40example.com&redirect_url=%2F", "email");

        assert_eq!(redacted, "email=********&redirect_url=%2F");
    }

    #[test]
    fn leaves_other_fields_alone() {
        let redacted = redact_field("name=Savings&currency=PEN", "email");

        assert_eq!(redacted, "name=Savings&currency=PEN");
    }

    #[test]
    fn does_not_match_field_suffix() {
        let redacted = redact_field("backup_email=a&email=b", "email");

        assert_eq!(redacted, "backup_email=a&email=********");
    }
}
