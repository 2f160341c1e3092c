//! URL layout of the ticket pages
//!
//! Ticket pages are addressed by a `{slug}-get{id}` segment. The slug
//! itself may contain `-get`, so the segment splits on the last one.

use crate::core::{Ticket, TicketId};
use std::fmt;
use std::str::FromStr;

pub const LIST_PATH: &str = "/my/";
pub const CREATE_PATH: &str = "/my/create/";

/// Slug and id of a ticket as they appear in a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketKey {
    pub slug: String,
    pub id: TicketId,
}

impl TicketKey {
    pub fn new(slug: impl Into<String>, id: TicketId) -> Self {
        Self {
            slug: slug.into(),
            id,
        }
    }

    pub fn of(ticket: &Ticket) -> Self {
        Self::new(ticket.slug.clone(), ticket.id)
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-get{}", self.slug, self.id)
    }
}

/// The segment does not name a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTicketKey;

impl fmt::Display for InvalidTicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected `{slug}-get{id}`")
    }
}

impl std::error::Error for InvalidTicketKey {}

impl FromStr for TicketKey {
    type Err = InvalidTicketKey;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        let (slug, id) = segment.rsplit_once("-get").ok_or(InvalidTicketKey)?;
        if slug.is_empty() || slug.contains('/') || id.is_empty() {
            return Err(InvalidTicketKey);
        }
        if !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTicketKey);
        }
        let id = id.parse().map_err(|_| InvalidTicketKey)?;
        Ok(Self::new(slug, id))
    }
}

pub fn detail_path(key: &TicketKey) -> String {
    format!("/my/detail/{key}/")
}

pub fn close_path(key: &TicketKey) -> String {
    format!("/close/{key}/")
}

pub fn resolve_path(key: &TicketKey) -> String {
    format!("/resolved/{key}/")
}

pub fn rate_path(key: &TicketKey) -> String {
    format!("/rate/{key}/")
}

/// Links shown next to a ticket
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TicketLinks {
    pub detail: String,
    pub close: String,
    pub resolve: String,
    pub rate: String,
}

impl TicketLinks {
    pub fn of(ticket: &Ticket) -> Self {
        let key = TicketKey::of(ticket);
        Self {
            detail: detail_path(&key),
            close: close_path(&key),
            resolve: resolve_path(&key),
            rate: rate_path(&key),
        }
    }
}
