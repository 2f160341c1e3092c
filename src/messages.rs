//! Flash messages and the catalog that renders them
//!
//! Handlers only decide *which* message to show; wording lives in the
//! catalog templates below.

use crate::error::{FieldErrors, Result, TicketError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tera::{Context, Tera, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// What a message says, independent of wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    TicketNotFound,
    TicketAlreadyClosed,
    TicketCommented,
    TicketCreated,
    TicketClosed,
    TicketResolved,
    TicketRated,
    FieldError,
    InvalidState,
}

impl MessageKey {
    pub const ALL: [Self; 9] = [
        Self::TicketNotFound,
        Self::TicketAlreadyClosed,
        Self::TicketCommented,
        Self::TicketCreated,
        Self::TicketClosed,
        Self::TicketResolved,
        Self::TicketRated,
        Self::FieldError,
        Self::InvalidState,
    ];

    /// Template name in the catalog
    #[must_use]
    pub const fn template_name(self) -> &'static str {
        match self {
            Self::TicketNotFound => "ticket_not_found",
            Self::TicketAlreadyClosed => "ticket_already_closed",
            Self::TicketCommented => "ticket_commented",
            Self::TicketCreated => "ticket_created",
            Self::TicketClosed => "ticket_closed",
            Self::TicketResolved => "ticket_resolved",
            Self::TicketRated => "ticket_rated",
            Self::FieldError => "field_error",
            Self::InvalidState => "invalid_state",
        }
    }
}

/// A message queued for the next page the user sees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub key: MessageKey,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl Message {
    pub const fn new(level: Level, key: MessageKey) -> Self {
        Self {
            level,
            key,
            params: BTreeMap::new(),
        }
    }

    pub const fn success(key: MessageKey) -> Self {
        Self::new(Level::Success, key)
    }

    pub const fn error(key: MessageKey) -> Self {
        Self::new(Level::Error, key)
    }

    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    /// One error message per rejected field
    pub fn field_errors(errors: &FieldErrors) -> Vec<Self> {
        errors
            .iter()
            .map(|e| {
                Self::error(MessageKey::FieldError)
                    .with_param("field", &e.field)
                    .with_param("message", &e.message)
            })
            .collect()
    }

    /// Error message for a refused status change
    pub fn invalid_state(error: &TicketError) -> Self {
        Self::error(MessageKey::InvalidState).with_param("message", error)
    }
}

/// Message after rendering, as sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub level: Level,
    pub text: String,
}

const TEMPLATES: [(&str, &str); 9] = [
    ("ticket_not_found", "Ticket not found!"),
    (
        "ticket_already_closed",
        "This ticket has been already closed or resolved!",
    ),
    ("ticket_commented", "Ticket commented successfully!"),
    (
        "ticket_created",
        "Ticket created successfully. Our help center will reach as soon as possible.",
    ),
    ("ticket_closed", "Ticket closed successfully!"),
    (
        "ticket_resolved",
        "Ticket #{{ id }} has been marked as resolved successfully!",
    ),
    (
        "ticket_rated",
        "Thank you for rating this discussion (Ticket #{{ id }})",
    ),
    ("field_error", "{{ field | field_label }}: {{ message }}"),
    ("invalid_state", "{{ message }}"),
];

/// `rating_stars` -> `Rating stars`
fn field_label(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = tera::try_get_value!("field_label", "value", String, value);
    let spaced = raw.replace('_', " ");
    let mut chars = spaced.chars();
    let label = chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    });
    Ok(Value::String(label))
}

/// English message templates
pub struct MessageCatalog {
    engine: Tera,
}

impl MessageCatalog {
    pub fn new() -> Result<Self> {
        let mut engine = Tera::default();
        engine.add_raw_templates(TEMPLATES)?;
        engine.register_filter("field_label", field_label);
        Ok(Self { engine })
    }

    pub fn render(&self, message: &Message) -> Result<String> {
        let context = Context::from_serialize(&message.params)?;
        self.engine
            .render(message.key.template_name(), &context)
            .map_err(TicketError::from)
    }

    pub fn render_all(&self, messages: &[Message]) -> Result<Vec<RenderedMessage>> {
        messages
            .iter()
            .map(|m| {
                Ok(RenderedMessage {
                    level: m.level,
                    text: self.render(m)?,
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for MessageCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCatalog")
            .field("templates", &TEMPLATES.len())
            .finish()
    }
}
