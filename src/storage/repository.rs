use crate::core::{Comment, CommentId, Ticket, TicketId};
use crate::error::Result;

/// Repository trait for ticket storage operations
///
/// This trait defines the interface for storing and retrieving tickets,
/// allowing for different storage implementations. Tickets are never
/// physically removed; soft deletion is a flag on the record.
pub trait TicketRepository: Send + Sync {
    /// Reserves the next unused ticket id
    fn next_ticket_id(&self) -> Result<TicketId>;

    /// Saves a ticket, replacing any record with the same id
    fn save(&self, ticket: &Ticket) -> Result<()>;

    /// Loads a ticket by ID, deleted or not
    fn load(&self, id: TicketId) -> Result<Ticket>;

    /// Loads all tickets
    fn load_all(&self) -> Result<Vec<Ticket>>;

    /// Checks if a ticket exists by ID
    fn exists(&self, id: TicketId) -> Result<bool>;

    /// Finds tickets matching a predicate
    fn find<F>(&self, predicate: F) -> Result<Vec<Ticket>>
    where
        F: Fn(&Ticket) -> bool,
    {
        Ok(self.load_all()?.into_iter().filter(predicate).collect())
    }

    /// Counts tickets matching a predicate
    fn count<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&Ticket) -> bool,
    {
        Ok(self.load_all()?.iter().filter(|t| predicate(t)).count())
    }
}

/// Repository trait for ticket comments
pub trait CommentRepository: Send + Sync {
    /// Reserves the next unused comment id
    fn next_comment_id(&self) -> Result<CommentId>;

    /// Saves a comment, replacing any record with the same id
    fn save_comment(&self, comment: &Comment) -> Result<()>;

    /// Loads a comment by ID
    fn load_comment(&self, id: CommentId) -> Result<Comment>;

    /// Loads every comment of a ticket, including hidden ones
    fn comments_for(&self, ticket_id: TicketId) -> Result<Vec<Comment>>;
}

/// Combined repository trait
pub trait Repository: TicketRepository + CommentRepository {}

/// Implementation of Repository for types that implement both traits
impl<T> Repository for T where T: TicketRepository + CommentRepository {}
