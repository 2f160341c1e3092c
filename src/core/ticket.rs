use super::{AttachmentRef, Rating, Status, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Numeric primary key of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(i64);

impl TicketId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// A support request owned by its creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,

    /// Opaque identifier for external references
    pub uuid: Uuid,

    /// Derived from the subject once, at creation
    pub slug: String,

    pub creator: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,

    pub subject: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,

    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_stars: Option<Rating>,

    #[serde(default)]
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether `user` created this ticket
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.creator == user
    }

    /// Whether the ticket is visible to `user` under the given slug
    ///
    /// Id, slug, ownership and deletion all have to line up; a numeric id on
    /// its own is not enough to reach a ticket.
    #[must_use]
    pub fn matches(&self, user: UserId, id: TicketId, slug: &str) -> bool {
        self.id == id && self.slug == slug && self.is_owned_by(user) && !self.is_deleted
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :: {}", self.subject, self.id)
    }
}
