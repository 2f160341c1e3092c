//! HTTP surface of the ticket pages
//!
//! # Routes
//!
//! - `GET /my/` - the caller's tickets (`?page=N`)
//! - `GET|POST /my/create/` - new ticket form
//! - `GET|POST /my/detail/{slug}-get{id}/` - ticket detail and replies
//! - `POST /close/{slug}-get{id}/` - mark closed
//! - `POST /resolved/{slug}-get{id}/` - mark resolved
//! - `POST /rate/{slug}-get{id}/` - rate the discussion
//!
//! Pages are returned as JSON view models; rendering HTML is left to the
//! front end.

mod form;
mod identity;
mod response;

pub use form::SubmittedForm;
pub use identity::{HeaderIdentity, IdentityProvider};
pub use response::{internal_error, into_response};

use crate::error::{Result, TicketError};
use crate::handlers::{
    self, CommentSubmission, HandlerContext, Method, Outcome, Request, TicketKey,
    TicketSubmission,
};
use crate::messages::MessageCatalog;
use crate::storage::Repository;
use axum::{
    Router,
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, header::REFERER},
    response::Response,
    routing::{any, get},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across all HTTP handlers
pub struct AppState<R> {
    pub ctx: Arc<HandlerContext<R>>,
    pub catalog: Arc<MessageCatalog>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            catalog: Arc::clone(&self.catalog),
            identity: Arc::clone(&self.identity),
        }
    }
}

impl<R: Repository + 'static> AppState<R> {
    pub fn new(ctx: HandlerContext<R>, identity: Arc<dyn IdentityProvider>) -> Result<Self> {
        Ok(Self {
            ctx: Arc::new(ctx),
            catalog: Arc::new(MessageCatalog::new()?),
            identity,
        })
    }

    fn request(&self, method: &axum::http::Method, uri: &OriginalUri, headers: &HeaderMap) -> Request {
        let path = uri
            .0
            .path_and_query()
            .map_or_else(|| uri.0.path().to_string(), ToString::to_string);
        Request {
            method: Method::parse(method.as_str()),
            user: self.identity.identify(headers),
            path,
            referer: headers
                .get(REFERER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    /// Run a handler off the async executor and render its outcome
    async fn run<F>(&self, f: F) -> Response
    where
        F: FnOnce(&HandlerContext<R>) -> Result<Outcome> + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        let result = tokio::task::spawn_blocking(move || f(&ctx))
            .await
            .unwrap_or_else(|e| Err(TicketError::storage(format!("handler task failed: {e}"))));
        into_response(result, &self.catalog)
    }
}

/// Build the router for the ticket pages
pub fn router<R: Repository + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .route("/my/", get(list_tickets::<R>))
        .route("/my/create/", get(create_ticket::<R>).post(create_ticket::<R>))
        .route("/my/detail/:key/", get(ticket_detail::<R>).post(ticket_detail::<R>))
        .route("/close/:key/", any(close_ticket::<R>))
        .route("/resolved/:key/", any(resolve_ticket::<R>))
        .route("/rate/:key/", any(rate_ticket::<R>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve<R: Repository + 'static>(state: AppState<R>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Support tickets listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Body errors only matter once the caller is known; anonymous requests
/// go on to the login redirect
fn accept_form(
    request: &Request,
    form: std::result::Result<SubmittedForm, Response>,
) -> std::result::Result<SubmittedForm, Response> {
    match form {
        Ok(form) => Ok(form),
        Err(_) if request.user.is_none() => Ok(SubmittedForm::default()),
        Err(rejection) => Err(rejection),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<String>,
}

async fn list_tickets<R: Repository + 'static>(
    State(state): State<AppState<R>>,
    method: axum::http::Method,
    uri: OriginalUri,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let request = state.request(&method, &uri, &headers);
    state
        .run(move |ctx| handlers::handle_list_my_tickets(ctx, &request, query.page.as_deref()))
        .await
}

async fn create_ticket<R: Repository + 'static>(
    State(state): State<AppState<R>>,
    method: axum::http::Method,
    uri: OriginalUri,
    headers: HeaderMap,
    form: std::result::Result<SubmittedForm, Response>,
) -> Response {
    let request = state.request(&method, &uri, &headers);
    let form = match accept_form(&request, form) {
        Ok(form) => form,
        Err(rejection) => return rejection,
    };
    let submission = (request.method == Method::Post).then(|| {
        let mut form = form;
        TicketSubmission {
            subject: form.text("subject"),
            description: form.text("description"),
            attachment: form.take_file("attachment"),
        }
    });
    state
        .run(move |ctx| handlers::handle_create_ticket(ctx, &request, submission))
        .await
}

async fn ticket_detail<R: Repository + 'static>(
    State(state): State<AppState<R>>,
    method: axum::http::Method,
    uri: OriginalUri,
    headers: HeaderMap,
    Path(key): Path<String>,
    form: std::result::Result<SubmittedForm, Response>,
) -> Response {
    let request = state.request(&method, &uri, &headers);
    let form = match accept_form(&request, form) {
        Ok(form) => form,
        Err(rejection) => return rejection,
    };
    let Ok(key) = key.parse::<TicketKey>() else {
        return into_response(Ok(Outcome::not_found()), &state.catalog);
    };
    let submission = (request.method == Method::Post).then(|| {
        let mut form = form;
        CommentSubmission {
            comment: form.text("comment"),
            attachment: form.take_file("attachment"),
        }
    });
    state
        .run(move |ctx| handlers::handle_ticket_detail(ctx, &request, &key, submission))
        .await
}

async fn close_ticket<R: Repository + 'static>(
    State(state): State<AppState<R>>,
    method: axum::http::Method,
    uri: OriginalUri,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Response {
    let request = state.request(&method, &uri, &headers);
    let Ok(key) = key.parse::<TicketKey>() else {
        return into_response(Ok(Outcome::not_found()), &state.catalog);
    };
    state
        .run(move |ctx| handlers::handle_mark_closed(ctx, &request, &key))
        .await
}

async fn resolve_ticket<R: Repository + 'static>(
    State(state): State<AppState<R>>,
    method: axum::http::Method,
    uri: OriginalUri,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Response {
    let request = state.request(&method, &uri, &headers);
    let Ok(key) = key.parse::<TicketKey>() else {
        return into_response(Ok(Outcome::not_found()), &state.catalog);
    };
    state
        .run(move |ctx| handlers::handle_mark_resolved(ctx, &request, &key))
        .await
}

async fn rate_ticket<R: Repository + 'static>(
    State(state): State<AppState<R>>,
    method: axum::http::Method,
    uri: OriginalUri,
    headers: HeaderMap,
    Path(key): Path<String>,
    form: std::result::Result<SubmittedForm, Response>,
) -> Response {
    let request = state.request(&method, &uri, &headers);
    let form = match accept_form(&request, form) {
        Ok(form) => form,
        Err(rejection) => return rejection,
    };
    let Ok(key) = key.parse::<TicketKey>() else {
        return into_response(Ok(Outcome::not_found()), &state.catalog);
    };
    let stars = form.field("rating_stars").map(str::to_string);
    state
        .run(move |ctx| handlers::handle_rate_ticket(ctx, &request, &key, stars.as_deref()))
        .await
}

/// Wire a repository into application state according to `settings`
pub fn app_state<R: Repository + 'static>(
    repo: R,
    settings: &crate::config::Settings,
) -> Result<AppState<R>> {
    let store = crate::store::TicketStore::new(repo).with_policy(settings.tickets.lifecycle);
    let attachments = Arc::new(crate::attachments::LocalAttachmentStore::new(
        &settings.attachments.root,
    ));
    let ctx = HandlerContext::new(store, attachments, settings.handler_settings());
    let identity = Arc::new(HeaderIdentity::from_name(&settings.auth.user_header));
    AppState::new(ctx, identity)
}
