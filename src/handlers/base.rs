//! Base handler utilities for common operations
//!
//! This module provides the request/outcome types and the checks shared by
//! every ticket page: login, POST-only, ownership-scoped loading and
//! redirecting back to the referring page.

use super::routes::{LIST_PATH, TicketKey};
use crate::attachments::{AttachmentKind, AttachmentStore, Upload};
use crate::core::{AttachmentRef, DEFAULT_PAGE_SIZE, Ticket, UserId};
use crate::error::{Result, TicketError};
use crate::messages::{Message, MessageKey};
use crate::storage::Repository;
use crate::store::TicketStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_LOGIN_URL: &str = "/accounts/login/";

/// Handler settings taken from the application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSettings {
    pub login_url: String,
    pub page_size: usize,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Context for handler operations
///
/// Encapsulates the store, the attachment store and settings shared by
/// every request.
pub struct HandlerContext<R> {
    pub store: TicketStore<R>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub settings: HandlerSettings,
}

impl<R: Repository> HandlerContext<R> {
    pub fn new(
        store: TicketStore<R>,
        attachments: Arc<dyn AttachmentStore>,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            store,
            attachments,
            settings,
        }
    }

    /// Fetch a ticket the user owns, or the "not found" outcome
    ///
    /// Wrong id, wrong slug, someone else's ticket and deleted tickets all
    /// look the same to the caller.
    pub fn load_ticket_or_not_found(
        &self,
        user: UserId,
        key: &TicketKey,
    ) -> Result<std::result::Result<Ticket, Outcome>> {
        match self.store.load_owned_ticket(user, key.id, &key.slug) {
            Ok(ticket) => Ok(Ok(ticket)),
            Err(e) if e.is_not_found() => {
                debug!("Ticket {} not available to user {}", key, user);
                Ok(Err(Outcome::not_found()))
            },
            Err(e) => Err(e),
        }
    }

    /// Store an optional upload
    pub fn store_upload(
        &self,
        kind: AttachmentKind,
        upload: Option<&Upload>,
    ) -> Result<Option<AttachmentRef>> {
        upload
            .map(|u| self.attachments.store(kind, &u.file_name, &u.bytes))
            .transpose()
    }

    /// Best-effort removal of an upload whose record was never saved
    pub fn discard_upload(&self, attachment: Option<&AttachmentRef>) {
        if let Some(reference) = attachment {
            if let Err(e) = self.attachments.remove(reference) {
                warn!("Failed to remove orphaned attachment {}: {}", reference, e);
            }
        }
    }
}

impl<R> fmt::Debug for HandlerContext<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("policy", &self.store.policy())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Other,
}

impl Method {
    pub fn parse(method: &str) -> Self {
        if method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD") {
            Self::Get
        } else if method.eq_ignore_ascii_case("POST") {
            Self::Post
        } else {
            Self::Other
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Other => "OTHER",
        }
    }
}

/// What a handler needs to know about the incoming request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub user: Option<UserId>,
    /// Path and query of the request itself
    pub path: String,
    /// Raw `Referer` header
    pub referer: Option<String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            user: None,
            path: path.into(),
            referer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub const fn user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

/// Result of handling one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Render(super::View),
    Redirect {
        location: String,
        messages: Vec<Message>,
    },
    NotFound {
        messages: Vec<Message>,
    },
    LoginRequired {
        location: String,
    },
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
}

impl Outcome {
    pub fn redirect(location: impl Into<String>, messages: Vec<Message>) -> Self {
        Self::Redirect {
            location: location.into(),
            messages,
        }
    }

    pub fn not_found() -> Self {
        Self::NotFound {
            messages: vec![Message::error(MessageKey::TicketNotFound)],
        }
    }

    /// Messages queued by this outcome
    pub fn messages(&self) -> &[Message] {
        match self {
            Self::Redirect { messages, .. } | Self::NotFound { messages } => messages,
            _ => &[],
        }
    }
}

/// The authenticated user, or the login redirect outcome
pub fn require_login(
    request: &Request,
    settings: &HandlerSettings,
) -> std::result::Result<UserId, Outcome> {
    request.user.ok_or_else(|| Outcome::LoginRequired {
        location: login_redirect(&settings.login_url, &request.path),
    })
}

/// `MethodNotAllowed` unless the request is a POST
pub fn require_post(request: &Request) -> std::result::Result<(), Outcome> {
    if request.method == Method::Post {
        Ok(())
    } else {
        Err(Outcome::MethodNotAllowed {
            allowed: vec![Method::Post],
        })
    }
}

/// `{login_url}?next={path}`, keeping any query the login URL already has
pub fn login_redirect(login_url: &str, next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{login_url}{separator}{query}")
}

/// Where "redirect back" goes: the referer's path and query, or the list
///
/// Only the path is kept so the redirect always stays on this site.
pub fn back_location(request: &Request) -> String {
    request
        .referer
        .as_deref()
        .and_then(local_path)
        .unwrap_or_else(|| LIST_PATH.to_string())
}

pub fn redirect_back(request: &Request, messages: Vec<Message>) -> Outcome {
    Outcome::redirect(back_location(request), messages)
}

fn local_path(referer: &str) -> Option<String> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(referer.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let mut location = url.path().to_string();
    if let Some(query) = url.query() {
        location.push('?');
        location.push_str(query);
    }
    Some(location)
}

/// Recover the errors a user can act on into an outcome
pub fn recover(result: Result<Outcome>, request: &Request) -> Result<Outcome> {
    match result {
        Err(TicketError::Validation(errors)) => Ok(redirect_back(
            request,
            Message::field_errors(&errors),
        )),
        Err(e @ TicketError::InvalidState { .. }) => {
            Ok(redirect_back(request, vec![Message::invalid_state(&e)]))
        },
        Err(TicketError::NotFound { .. }) => Ok(Outcome::not_found()),
        other => other,
    }
}
