use super::{
    AttachmentRef, Comment, CommentId, Rating, Status, Ticket, TicketId, UserId, slugify,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Builder for creating Ticket instances
#[derive(Default)]
pub struct TicketBuilder {
    id: Option<TicketId>,
    uuid: Option<Uuid>,
    slug: Option<String>,
    creator: Option<UserId>,
    assignee: Option<UserId>,
    subject: Option<String>,
    description: Option<String>,
    attachment: Option<AttachmentRef>,
    status: Option<Status>,
    rating_stars: Option<Rating>,
    is_deleted: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TicketBuilder {
    /// Create a new ticket builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ticket ID
    #[must_use]
    pub const fn id(mut self, id: TicketId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the external UUID
    #[must_use]
    pub const fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    /// Set the slug explicitly instead of deriving it from the subject
    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set the creator
    #[must_use]
    pub const fn creator(mut self, creator: UserId) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Set the assignee
    #[must_use]
    pub const fn assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the attachment
    #[must_use]
    pub fn attachment(mut self, attachment: Option<AttachmentRef>) -> Self {
        self.attachment = attachment;
        self
    }

    /// Set the status
    #[must_use]
    pub const fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the rating
    #[must_use]
    pub const fn rating(mut self, rating: Rating) -> Self {
        self.rating_stars = Some(rating);
        self
    }

    /// Mark the ticket soft-deleted
    #[must_use]
    pub const fn deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = is_deleted;
        self
    }

    /// Set `created_at` timestamp
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Set `updated_at` timestamp
    #[must_use]
    pub const fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Build the ticket
    pub fn build(self) -> Ticket {
        let subject = self.subject.unwrap_or_default();
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Ticket {
            id: self.id.unwrap_or(TicketId::new(0)),
            uuid: self.uuid.unwrap_or_else(Uuid::new_v4),
            slug: self.slug.unwrap_or_else(|| slugify(&subject)),
            creator: self.creator.unwrap_or(UserId::new(0)),
            assignee: self.assignee,
            subject,
            description: self.description.unwrap_or_default(),
            attachment: self.attachment,
            status: self.status.unwrap_or_default(),
            rating_stars: self.rating_stars,
            is_deleted: self.is_deleted,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

/// Builder for creating Comment instances
#[derive(Default)]
pub struct CommentBuilder {
    id: Option<CommentId>,
    ticket_id: Option<TicketId>,
    author: Option<UserId>,
    comment: Option<String>,
    attachment: Option<AttachmentRef>,
    is_active: Option<bool>,
    is_deleted: bool,
    created_at: Option<DateTime<Utc>>,
}

impl CommentBuilder {
    /// Create a new comment builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the comment ID
    #[must_use]
    pub const fn id(mut self, id: CommentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the ticket this comment belongs to
    #[must_use]
    pub const fn ticket(mut self, ticket_id: TicketId) -> Self {
        self.ticket_id = Some(ticket_id);
        self
    }

    /// Set the author
    #[must_use]
    pub const fn author(mut self, author: UserId) -> Self {
        self.author = Some(author);
        self
    }

    /// Set the comment text
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the attachment
    #[must_use]
    pub fn attachment(mut self, attachment: Option<AttachmentRef>) -> Self {
        self.attachment = attachment;
        self
    }

    /// Set the active flag
    #[must_use]
    pub const fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Mark the comment soft-deleted
    #[must_use]
    pub const fn deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = is_deleted;
        self
    }

    /// Set `created_at` timestamp
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Build the comment
    pub fn build(self) -> Comment {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Comment {
            id: self.id.unwrap_or(CommentId::new(0)),
            ticket_id: self.ticket_id.unwrap_or(TicketId::new(0)),
            author: self.author.unwrap_or(UserId::new(0)),
            comment: self.comment.unwrap_or_default(),
            attachment: self.attachment,
            is_active: self.is_active.unwrap_or(true),
            is_deleted: self.is_deleted,
            created_at,
            updated_at: created_at,
        }
    }
}
