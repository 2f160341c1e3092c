//! Turning handler outcomes into HTTP responses

use crate::error::TicketError;
use crate::handlers::{Method, Outcome};
use crate::messages::{MessageCatalog, RenderedMessage};
use axum::{
    Json,
    http::{
        HeaderValue, StatusCode,
        header::{ALLOW, LOCATION},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
struct RedirectBody<'a> {
    location: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    messages: Vec<RenderedMessage>,
}

#[derive(Debug, Serialize)]
struct MessagesBody {
    messages: Vec<RenderedMessage>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Map a handler result onto a response
///
/// Redirects after a form post use `303 See Other`; the login redirect
/// uses `302 Found`.
pub fn into_response(result: crate::Result<Outcome>, catalog: &MessageCatalog) -> Response {
    match result.and_then(|outcome| outcome_response(outcome, catalog)) {
        Ok(response) => response,
        Err(e) => internal_error(&e),
    }
}

fn outcome_response(outcome: Outcome, catalog: &MessageCatalog) -> crate::Result<Response> {
    let response = match outcome {
        Outcome::Render(view) => (StatusCode::OK, Json(view)).into_response(),
        Outcome::Redirect { location, messages } => {
            let messages = catalog.render_all(&messages)?;
            redirect(StatusCode::SEE_OTHER, &location, messages)
        },
        Outcome::LoginRequired { location } => redirect(StatusCode::FOUND, &location, Vec::new()),
        Outcome::NotFound { messages } => {
            let messages = catalog.render_all(&messages)?;
            (StatusCode::NOT_FOUND, Json(MessagesBody { messages })).into_response()
        },
        Outcome::MethodNotAllowed { allowed } => {
            let allow: Vec<&str> = allowed.iter().map(|m| Method::as_str(*m)).collect();
            let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
            if let Ok(value) = HeaderValue::from_str(&allow.join(", ")) {
                response.headers_mut().insert(ALLOW, value);
            }
            response
        },
    };
    Ok(response)
}

fn redirect(status: StatusCode, location: &str, messages: Vec<RenderedMessage>) -> Response {
    let mut response = (status, Json(RedirectBody { location, messages })).into_response();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(LOCATION, value);
            response
        },
        Err(_) => internal_error(&TicketError::storage(format!(
            "redirect target is not a valid header: {location}"
        ))),
    }
}

/// 500 with a generic message; details only go to the log
pub fn internal_error(e: &TicketError) -> Response {
    error!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: e.user_message(),
        }),
    )
        .into_response()
}
