//! Ticket store: lifecycle rules for tickets and their comments
//!
//! The store knows nothing about who is calling. Ownership checks are done
//! by the request handlers, which go through [`TicketStore::load_owned_ticket`].

use crate::core::{
    AttachmentRef, Comment, CommentBuilder, LifecyclePolicy, Page, Paginator, Rating, Status,
    Ticket, TicketBuilder, TicketId, UserId, latest_of,
};
use crate::error::{Result, TicketError};
use crate::storage::Repository;
use crate::validation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

/// When and by whom a ticket was last commented on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestActivity {
    pub at: DateTime<Utc>,
    pub author: UserId,
}

/// Owns ticket and comment invariants on top of a repository
#[derive(Debug, Clone)]
pub struct TicketStore<R> {
    repo: R,
    policy: LifecyclePolicy,
}

impl<R> TicketStore<R> {
    pub const fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    pub const fn repository(&self) -> &R {
        &self.repo
    }
}

impl<R: Repository> TicketStore<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            policy: LifecyclePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Open a new ticket in status `New`
    pub fn create_ticket(
        &self,
        creator: UserId,
        subject: &str,
        description: &str,
        attachment: Option<AttachmentRef>,
    ) -> Result<Ticket> {
        let input = validation::validate_ticket(subject, description, attachment)?;
        let id = self.repo.next_ticket_id()?;

        let ticket = TicketBuilder::new()
            .id(id)
            .creator(creator)
            .subject(input.subject)
            .description(input.description)
            .attachment(input.attachment)
            .status(Status::New)
            .build();

        self.repo.save(&ticket)?;
        info!("Ticket created - {} ({}) by user {}", ticket.slug, ticket.id, creator);
        Ok(ticket)
    }

    /// Fetch a live ticket; id and slug must both match
    pub fn get_ticket(&self, id: TicketId, slug: &str) -> Result<Ticket> {
        let ticket = match self.repo.load(id) {
            Ok(ticket) => ticket,
            Err(e) if e.is_not_found() => return Err(TicketError::ticket_not_found(id)),
            Err(e) => return Err(e),
        };

        if ticket.is_deleted || ticket.slug != slug {
            debug!("Ticket {} hidden: deleted or slug mismatch", id);
            return Err(TicketError::ticket_not_found(id));
        }
        Ok(ticket)
    }

    /// Fetch a live ticket created by `owner`
    ///
    /// Every mismatch (id, slug, owner, deletion) is reported the same way,
    /// so callers cannot probe for other users' tickets.
    pub fn load_owned_ticket(&self, owner: UserId, id: TicketId, slug: &str) -> Result<Ticket> {
        let ticket = self.get_ticket(id, slug)?;
        if ticket.matches(owner, id, slug) {
            Ok(ticket)
        } else {
            debug!("Ticket {} hidden from user {}", id, owner);
            Err(TicketError::ticket_not_found(id))
        }
    }

    /// One page of the live tickets created by `user`, newest first
    pub fn list_tickets_for_user(
        &self,
        user: UserId,
        page: Option<&str>,
        page_size: usize,
    ) -> Result<Page<Ticket>> {
        let mut tickets = self.repo.find(|t| t.creator == user && !t.is_deleted)?;
        tickets.sort_by(listing_order);
        Ok(Paginator::new(page_size).page(tickets, page))
    }

    /// Add a reply to a ticket that is still New or Open
    pub fn add_comment(
        &self,
        ticket: &Ticket,
        author: UserId,
        comment: &str,
        attachment: Option<AttachmentRef>,
    ) -> Result<Comment> {
        if !ticket.status.accepts_comments() {
            return Err(TicketError::InvalidState {
                status: ticket.status,
                operation: "comment on",
            });
        }
        let input = validation::validate_comment(comment, attachment)?;
        let id = self.repo.next_comment_id()?;

        let comment = CommentBuilder::new()
            .id(id)
            .ticket(ticket.id)
            .author(author)
            .comment(input.comment)
            .attachment(input.attachment)
            .build();

        self.repo.save_comment(&comment)?;
        info!("Comment {} added to ticket {} by user {}", comment.id, ticket.id, author);
        Ok(comment)
    }

    /// Move a ticket to `status` if the lifecycle policy allows it
    pub fn set_status(&self, ticket: &mut Ticket, status: Status) -> Result<()> {
        if !ticket.status.can_transition_to(status, self.policy) {
            return Err(TicketError::InvalidState {
                status: ticket.status,
                operation: transition_verb(status),
            });
        }

        let previous = ticket.status;
        ticket.status = status;
        ticket.touch();
        self.repo.save(ticket)?;
        info!("Ticket {} status changed from {} to {}", ticket.id, previous, status);
        Ok(())
    }

    /// Record a rating; `None` means the default of five stars
    pub fn set_rating(&self, ticket: &mut Ticket, stars: Option<i64>) -> Result<Rating> {
        let rating = stars.map_or(Ok(Rating::DEFAULT), Rating::new)?;
        ticket.rating_stars = Some(rating);
        ticket.touch();
        self.repo.save(ticket)?;
        info!("Ticket {} rated {} stars", ticket.id, rating);
        Ok(rating)
    }

    /// Most recent active, non-deleted comment
    pub fn latest_comment(&self, ticket: &Ticket) -> Result<Option<Comment>> {
        let comments = self.repo.comments_for(ticket.id)?;
        Ok(latest_of(&comments).cloned())
    }

    /// Whether someone other than the creator had the last word
    pub fn is_answered(&self, ticket: &Ticket) -> Result<bool> {
        Ok(self
            .latest_comment(ticket)?
            .is_some_and(|latest| latest.author != ticket.creator))
    }

    /// Active, non-deleted comments, newest first
    pub fn active_comments(&self, ticket: &Ticket) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .repo
            .comments_for(ticket.id)?
            .into_iter()
            .filter(Comment::is_visible)
            .collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(comments)
    }

    pub fn latest_activity(&self, ticket: &Ticket) -> Result<Option<LatestActivity>> {
        Ok(self.latest_comment(ticket)?.map(|c| LatestActivity {
            at: c.created_at,
            author: c.author,
        }))
    }

    /// Hand a ticket to a staff member, or take it back with `None`
    pub fn assign(&self, ticket: &mut Ticket, assignee: Option<UserId>) -> Result<()> {
        ticket.assignee = assignee;
        ticket.touch();
        self.repo.save(ticket)?;
        match assignee {
            Some(user) => info!("Ticket {} assigned to user {}", ticket.id, user),
            None => info!("Ticket {} unassigned", ticket.id),
        }
        Ok(())
    }

    /// Change the subject; the slug keeps its original value
    pub fn update_subject(&self, ticket: &mut Ticket, subject: &str) -> Result<()> {
        ticket.subject = validation::validate_subject(subject)?;
        ticket.touch();
        self.repo.save(ticket)
    }

    /// Hide a ticket from every user-facing query
    pub fn soft_delete(&self, ticket: &mut Ticket) -> Result<()> {
        ticket.is_deleted = true;
        ticket.touch();
        self.repo.save(ticket)?;
        info!("Ticket {} soft-deleted", ticket.id);
        Ok(())
    }

    pub fn set_comment_active(&self, comment: &mut Comment, active: bool) -> Result<()> {
        comment.is_active = active;
        comment.touch();
        self.repo.save_comment(comment)
    }

    pub fn soft_delete_comment(&self, comment: &mut Comment) -> Result<()> {
        comment.is_deleted = true;
        comment.touch();
        self.repo.save_comment(comment)?;
        info!("Comment {} soft-deleted", comment.id);
        Ok(())
    }
}

/// Newest first, then subject, status and rating
fn listing_order(a: &Ticket, b: &Ticket) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.subject.cmp(&b.subject))
        .then_with(|| a.status.cmp(&b.status))
        .then_with(|| a.rating_stars.cmp(&b.rating_stars))
}

const fn transition_verb(target: Status) -> &'static str {
    match target {
        Status::New => "mark as new",
        Status::Open => "open",
        Status::Closed => "close",
        Status::Resolved => "resolve",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CommentBuilder, CommentId};
    use crate::storage::{CommentRepository, MemoryStorage, TicketRepository};
    use crate::test_utils::{TestProject, at_minute, fresh_store};

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    #[test]
    fn test_file_backed_store_enforces_lifecycle() {
        let project = TestProject::with_sample_tickets();
        let store = project.store();

        let page = store.list_tickets_for_user(ALICE, None, 10).unwrap();
        assert_eq!(page.count, 4);

        for (id, accepts) in [(1, true), (2, true), (3, false), (4, false)] {
            let ticket = store.repository().load(TicketId::new(id)).unwrap();
            let result = store.add_comment(&ticket, BOB, "Any update?", None);
            assert_eq!(result.is_ok(), accepts, "ticket {id} ({})", ticket.status);
        }
        assert_eq!(store.repository().comments_for(TicketId::new(2)).unwrap().len(), 1);
        assert!(store.repository().comments_for(TicketId::new(3)).unwrap().is_empty());
    }

    #[test]
    fn test_create_ticket_defaults() {
        let store = fresh_store();
        let ticket = store
            .create_ticket(ALICE, "Login issue", "Cannot log in", None)
            .unwrap();

        assert_eq!(ticket.id, TicketId::new(1));
        assert_eq!(ticket.status, Status::New);
        assert_eq!(ticket.slug, "login-issue");
        assert_eq!(ticket.creator, ALICE);
        assert!(ticket.assignee.is_none());
        assert!(ticket.rating_stars.is_none());
        assert!(!ticket.is_deleted);
        assert_eq!(store.repository().load(ticket.id).unwrap(), ticket);
    }

    #[test]
    fn test_create_ticket_rejects_blank_fields() {
        let store = fresh_store();
        let err = store.create_ticket(ALICE, " ", "", None).unwrap_err();
        match err {
            TicketError::Validation(errors) => {
                assert!(errors.contains("subject"));
                assert!(errors.contains("description"));
            },
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.repository().load_all().unwrap().is_empty());
    }

    #[test]
    fn test_create_ticket_records_attachment() {
        let store = fresh_store();
        let attachment = AttachmentRef::new("tickets/main/attachments/2026/10/screen.png");
        let ticket = store
            .create_ticket(ALICE, "Broken button", "See screenshot", Some(attachment.clone()))
            .unwrap();
        assert_eq!(ticket.attachment, Some(attachment));
    }

    #[test]
    fn test_identical_subjects_share_slug() {
        let store = fresh_store();
        let first = store.create_ticket(ALICE, "Login issue", "one", None).unwrap();
        let second = store.create_ticket(ALICE, "Login issue", "two", None).unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.uuid, second.uuid);
        assert_eq!(first.slug, second.slug);
    }

    #[test]
    fn test_get_ticket_requires_matching_slug() {
        let store = fresh_store();
        let ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();

        assert!(store.get_ticket(ticket.id, "login-issue").is_ok());
        assert!(store.get_ticket(ticket.id, "wrong").unwrap_err().is_not_found());
        assert!(
            store
                .get_ticket(TicketId::new(99), "login-issue")
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_get_ticket_hides_deleted() {
        let store = fresh_store();
        let mut ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        store.soft_delete(&mut ticket).unwrap();

        assert!(store.get_ticket(ticket.id, "login-issue").unwrap_err().is_not_found());
        // The record itself is still there.
        assert!(store.repository().exists(ticket.id).unwrap());
    }

    #[test]
    fn test_load_owned_ticket_rejects_other_users() {
        let store = fresh_store();
        let ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();

        assert!(store.load_owned_ticket(ALICE, ticket.id, "login-issue").is_ok());
        assert!(
            store
                .load_owned_ticket(BOB, ticket.id, "login-issue")
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_list_only_own_live_tickets() {
        let store = fresh_store();
        let mine = store.create_ticket(ALICE, "Mine", "x", None).unwrap();
        store.create_ticket(BOB, "Theirs", "x", None).unwrap();
        let mut gone = store.create_ticket(ALICE, "Gone", "x", None).unwrap();
        store.soft_delete(&mut gone).unwrap();

        let page = store.list_tickets_for_user(ALICE, None, 10).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.items[0].id, mine.id);
    }

    #[test]
    fn test_list_ordering() {
        let repo = MemoryStorage::new();
        let store = TicketStore::new(repo.clone());
        let tickets = [
            (1, "Old", 0, Status::New, None),
            (2, "Beta", 10, Status::Closed, None),
            (3, "Alpha", 10, Status::Resolved, None),
            (4, "Beta", 10, Status::New, Some(4)),
            (5, "Beta", 10, Status::New, None),
            (6, "Newest", 20, Status::New, None),
        ];
        for (id, subject, minute, status, stars) in tickets {
            let mut builder = TicketBuilder::new()
                .id(TicketId::new(id))
                .creator(ALICE)
                .subject(subject)
                .status(status)
                .created_at(at_minute(minute));
            if let Some(stars) = stars {
                builder = builder.rating(Rating::new(stars).unwrap());
            }
            repo.save(&builder.build()).unwrap();
        }

        let page = store.list_tickets_for_user(ALICE, None, 10).unwrap();
        let ids: Vec<i64> = page.items.iter().map(|t| t.id.get()).collect();
        assert_eq!(ids, vec![6, 3, 5, 4, 2, 1]);
    }

    #[test]
    fn test_list_pagination_is_soft() {
        let store = fresh_store();
        for i in 0..15 {
            store
                .create_ticket(ALICE, &format!("Ticket {i}"), "x", None)
                .unwrap();
        }

        let page = store.list_tickets_for_user(ALICE, Some("2"), 10).unwrap();
        assert_eq!(page.number, 2);
        assert_eq!(page.items.len(), 5);

        let page = store.list_tickets_for_user(ALICE, Some("abc"), 10).unwrap();
        assert_eq!(page.number, 1);

        let page = store.list_tickets_for_user(ALICE, Some("42"), 10).unwrap();
        assert_eq!(page.number, 2);
    }

    #[test]
    fn test_add_comment() {
        let store = fresh_store();
        let ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        let comment = store.add_comment(&ticket, BOB, " On it ", None).unwrap();

        assert_eq!(comment.ticket_id, ticket.id);
        assert_eq!(comment.author, BOB);
        assert_eq!(comment.comment, "On it");
        assert!(comment.is_active);
        assert!(!comment.is_deleted);
    }

    #[test]
    fn test_add_comment_rejected_on_finished_tickets() {
        let store = fresh_store();
        for status in [Status::Closed, Status::Resolved] {
            let mut ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
            store.set_status(&mut ticket, status).unwrap();
            let before = store.repository().load(ticket.id).unwrap();

            let err = store.add_comment(&ticket, ALICE, "hello?", None).unwrap_err();
            assert!(matches!(err, TicketError::InvalidState { .. }));
            assert_eq!(store.repository().load(ticket.id).unwrap(), before);
            assert!(store.repository().comments_for(ticket.id).unwrap().is_empty());
        }
    }

    #[test]
    fn test_add_comment_rejects_blank_text() {
        let store = fresh_store();
        let ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        let err = store.add_comment(&ticket, ALICE, "   ", None).unwrap_err();
        assert!(matches!(err, TicketError::Validation(_)));
    }

    #[test]
    fn test_set_status_strict() {
        let store = fresh_store();
        let mut ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        let created = ticket.updated_at;

        store.set_status(&mut ticket, Status::Closed).unwrap();
        assert_eq!(ticket.status, Status::Closed);
        assert!(ticket.updated_at >= created);

        // Same status again is fine.
        store.set_status(&mut ticket, Status::Closed).unwrap();

        let err = store.set_status(&mut ticket, Status::Resolved).unwrap_err();
        assert!(matches!(
            err,
            TicketError::InvalidState {
                status: Status::Closed,
                operation: "resolve"
            }
        ));
        assert_eq!(store.repository().load(ticket.id).unwrap().status, Status::Closed);
    }

    #[test]
    fn test_set_status_permissive_allows_closed_to_resolved() {
        // Known looseness of the original lifecycle, kept behind a policy switch.
        let store = fresh_store().with_policy(LifecyclePolicy::Permissive);
        let mut ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        store.set_status(&mut ticket, Status::Closed).unwrap();
        store.set_status(&mut ticket, Status::Resolved).unwrap();
        assert_eq!(ticket.status, Status::Resolved);
    }

    #[test]
    fn test_set_rating() {
        let store = fresh_store();
        let mut ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();

        for stars in 1..=5 {
            let rating = store.set_rating(&mut ticket, Some(stars)).unwrap();
            assert_eq!(i64::from(rating.get()), stars);
        }
        assert!(store.set_rating(&mut ticket, Some(0)).is_err());
        assert!(store.set_rating(&mut ticket, Some(6)).is_err());
        assert_eq!(ticket.rating_stars.map(Rating::get), Some(5));

        let mut other = store.create_ticket(ALICE, "Other", "x", None).unwrap();
        assert_eq!(store.set_rating(&mut other, None).unwrap().get(), 5);
    }

    #[test]
    fn test_rating_independent_of_status() {
        let store = fresh_store();
        let mut ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        store.set_status(&mut ticket, Status::Resolved).unwrap();
        store.set_rating(&mut ticket, Some(2)).unwrap();
        assert_eq!(ticket.status, Status::Resolved);
        assert_eq!(ticket.rating_stars.map(Rating::get), Some(2));
    }

    #[test]
    fn test_is_answered() {
        let store = fresh_store();
        let ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        assert!(!store.is_answered(&ticket).unwrap());
        assert!(store.latest_activity(&ticket).unwrap().is_none());

        store.add_comment(&ticket, ALICE, "Any news?", None).unwrap();
        assert!(!store.is_answered(&ticket).unwrap());

        store.add_comment(&ticket, BOB, "Fixed.", None).unwrap();
        assert!(store.is_answered(&ticket).unwrap());
        assert_eq!(store.latest_activity(&ticket).unwrap().unwrap().author, BOB);
    }

    #[test]
    fn test_hidden_comments_do_not_count() {
        let repo = MemoryStorage::new();
        let store = TicketStore::new(repo.clone());
        let ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();

        repo.save_comment(
            &CommentBuilder::new()
                .id(CommentId::new(1))
                .ticket(ticket.id)
                .author(ALICE)
                .comment("first")
                .created_at(at_minute(0))
                .build(),
        )
        .unwrap();
        let mut reply = CommentBuilder::new()
            .id(CommentId::new(2))
            .ticket(ticket.id)
            .author(BOB)
            .comment("reply")
            .created_at(at_minute(5))
            .build();
        repo.save_comment(&reply).unwrap();
        assert!(store.is_answered(&ticket).unwrap());

        store.set_comment_active(&mut reply, false).unwrap();
        assert!(!store.is_answered(&ticket).unwrap());
        assert_eq!(store.active_comments(&ticket).unwrap().len(), 1);

        store.set_comment_active(&mut reply, true).unwrap();
        store.soft_delete_comment(&mut reply).unwrap();
        assert_eq!(
            store.latest_comment(&ticket).unwrap().map(|c| c.id),
            Some(CommentId::new(1))
        );
    }

    #[test]
    fn test_active_comments_newest_first() {
        let store = fresh_store();
        let ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        let first = store.add_comment(&ticket, ALICE, "one", None).unwrap();
        let second = store.add_comment(&ticket, BOB, "two", None).unwrap();

        let ids: Vec<CommentId> = store
            .active_comments(&ticket)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_slug_stable_when_subject_changes() {
        let store = fresh_store();
        let mut ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        store.update_subject(&mut ticket, "Cannot sign in at all").unwrap();

        let stored = store.repository().load(ticket.id).unwrap();
        assert_eq!(stored.subject, "Cannot sign in at all");
        assert_eq!(stored.slug, "login-issue");
        assert!(store.update_subject(&mut ticket, "  ").is_err());
    }

    #[test]
    fn test_creator_never_changes() {
        let store = fresh_store();
        let mut ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        store.assign(&mut ticket, Some(BOB)).unwrap();
        store.set_status(&mut ticket, Status::Resolved).unwrap();
        store.set_rating(&mut ticket, Some(3)).unwrap();
        store.update_subject(&mut ticket, "Renamed").unwrap();

        let stored = store.repository().load(ticket.id).unwrap();
        assert_eq!(stored.creator, ALICE);
        assert_eq!(stored.assignee, Some(BOB));
        assert_eq!(stored.created_at, ticket.created_at);
    }

    #[test]
    fn test_unassign() {
        let store = fresh_store();
        let mut ticket = store.create_ticket(ALICE, "Login issue", "x", None).unwrap();
        store.assign(&mut ticket, Some(BOB)).unwrap();
        store.assign(&mut ticket, None).unwrap();
        assert!(store.repository().load(ticket.id).unwrap().assignee.is_none());
    }
}
