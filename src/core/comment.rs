use super::{AttachmentRef, TicketId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric primary key of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(i64);

impl CommentId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A threaded reply on a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub ticket_id: TicketId,
    pub author: UserId,
    pub comment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const fn default_active() -> bool {
    true
}

impl Comment {
    /// Active and not soft-deleted
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    /// Short label used by back-office listings
    #[must_use]
    pub fn label(&self, ticket_subject: &str) -> String {
        format!("Comment on {ticket_subject}")
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Most recent visible comment
///
/// Ties on `created_at` go to the comment with the higher id, i.e. the one
/// stored last.
pub fn latest_of<'a, I>(comments: I) -> Option<&'a Comment>
where
    I: IntoIterator<Item = &'a Comment>,
{
    comments
        .into_iter()
        .filter(|c| c.is_visible())
        .max_by_key(|c| (c.created_at, c.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommentBuilder;
    use chrono::Duration;

    fn comment_at(id: i64, author: i64, minutes: i64) -> Comment {
        let base = DateTime::parse_from_rfc3339("2026-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        CommentBuilder::new()
            .id(CommentId::new(id))
            .author(UserId::new(author))
            .comment(format!("comment {id}"))
            .created_at(base + Duration::minutes(minutes))
            .build()
    }

    #[test]
    fn test_latest_of_empty() {
        let comments: Vec<Comment> = Vec::new();
        assert!(latest_of(&comments).is_none());
    }

    #[test]
    fn test_latest_of_picks_newest_visible() {
        let hidden = CommentBuilder::new()
            .id(CommentId::new(3))
            .author(UserId::new(1))
            .created_at(comment_at(3, 1, 30).created_at)
            .active(false)
            .build();
        let deleted = CommentBuilder::new()
            .id(CommentId::new(4))
            .author(UserId::new(1))
            .created_at(comment_at(4, 1, 40).created_at)
            .deleted(true)
            .build();
        assert!(!hidden.is_visible());
        assert!(!deleted.is_visible());
        let comments = vec![comment_at(1, 1, 0), comment_at(2, 2, 10), hidden, deleted];

        let latest = latest_of(&comments).unwrap();
        assert_eq!(latest.id, CommentId::new(2));
    }

    #[test]
    fn test_latest_of_only_hidden_comments() {
        let mut hidden = comment_at(1, 1, 0);
        hidden.is_active = false;
        assert!(latest_of(&[hidden]).is_none());
    }

    #[test]
    fn test_latest_of_tie_goes_to_higher_id() {
        let comments = vec![comment_at(5, 1, 0), comment_at(6, 2, 0)];
        assert_eq!(latest_of(&comments).unwrap().id, CommentId::new(6));
    }

    #[test]
    fn test_label_names_the_ticket() {
        assert_eq!(comment_at(1, 1, 0).label("Login issue"), "Comment on Login issue");
    }

    #[test]
    fn test_fresh_comment_defaults_visible() {
        let yaml = "id: 1\nticket_id: 1\nauthor: 1\ncomment: hi\n\
                    created_at: 2026-01-01T10:00:00Z\nupdated_at: 2026-01-01T10:00:00Z\n";
        let comment: Comment = serde_yaml::from_str(yaml).unwrap();
        assert!(comment.is_active);
        assert!(!comment.is_deleted);
        assert!(comment.is_visible());
    }
}
