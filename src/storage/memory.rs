//! In-process storage backend
//!
//! Everything lives behind a single lock, so each record write is atomic
//! and id allocation is serialized. Contents are lost when the process
//! exits.

use super::repository::{CommentRepository, TicketRepository};
use crate::core::{Comment, CommentId, Ticket, TicketId};
use crate::error::{Result, TicketError};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct MemoryState {
    tickets: BTreeMap<TicketId, Ticket>,
    comments: BTreeMap<CommentId, Comment>,
    last_ticket_id: i64,
    last_comment_id: i64,
}

/// Storage backend keeping tickets and comments in memory
///
/// Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| TicketError::storage("memory storage lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| TicketError::storage("memory storage lock poisoned"))
    }
}

impl TicketRepository for MemoryStorage {
    fn next_ticket_id(&self) -> Result<TicketId> {
        let mut state = self.write()?;
        state.last_ticket_id += 1;
        Ok(TicketId::new(state.last_ticket_id))
    }

    fn save(&self, ticket: &Ticket) -> Result<()> {
        let mut state = self.write()?;
        // Keep the allocator ahead of ids assigned elsewhere.
        state.last_ticket_id = state.last_ticket_id.max(ticket.id.get());
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(())
    }

    fn load(&self, id: TicketId) -> Result<Ticket> {
        self.read()?
            .tickets
            .get(&id)
            .cloned()
            .ok_or_else(|| TicketError::ticket_not_found(id))
    }

    fn load_all(&self) -> Result<Vec<Ticket>> {
        Ok(self.read()?.tickets.values().cloned().collect())
    }

    fn exists(&self, id: TicketId) -> Result<bool> {
        Ok(self.read()?.tickets.contains_key(&id))
    }

    fn find<F>(&self, predicate: F) -> Result<Vec<Ticket>>
    where
        F: Fn(&Ticket) -> bool,
    {
        Ok(self
            .read()?
            .tickets
            .values()
            .filter(|t| predicate(t))
            .cloned()
            .collect())
    }
}

impl CommentRepository for MemoryStorage {
    fn next_comment_id(&self) -> Result<CommentId> {
        let mut state = self.write()?;
        state.last_comment_id += 1;
        Ok(CommentId::new(state.last_comment_id))
    }

    fn save_comment(&self, comment: &Comment) -> Result<()> {
        let mut state = self.write()?;
        state.last_comment_id = state.last_comment_id.max(comment.id.get());
        state.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    fn load_comment(&self, id: CommentId) -> Result<Comment> {
        self.read()?
            .comments
            .get(&id)
            .cloned()
            .ok_or_else(|| TicketError::comment_not_found(id))
    }

    fn comments_for(&self, ticket_id: TicketId) -> Result<Vec<Comment>> {
        Ok(self
            .read()?
            .comments
            .values()
            .filter(|c| c.ticket_id == ticket_id)
            .cloned()
            .collect())
    }
}
