//! Persistence backends for tickets and comments
//!
//! The ticket store only talks to the [`Repository`] traits; any backend
//! implementing them can be plugged in.

mod file;
mod memory;
mod repository;

pub use file::{FileStorage, StoreState};
pub use memory::MemoryStorage;
pub use repository::{CommentRepository, Repository, TicketRepository};
