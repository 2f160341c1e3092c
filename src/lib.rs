//! support-tickets - self-service support tickets for a web application
//!
//! Users open tickets, reply in a comment thread, close or resolve them and
//! rate the discussion. The crate is layered:
//!
//! - [`core`]: tickets, comments, statuses, ratings, slugs and pagination
//! - [`storage`]: repository traits with YAML file and in-memory backends
//! - [`store`]: lifecycle rules on top of a repository
//! - [`handlers`]: transport-agnostic page handlers with login and
//!   ownership checks
//! - `api`: the axum HTTP surface (feature `api`, on by default)
//!
//! # Example
//!
//! ```rust
//! use support_tickets::core::{Status, UserId};
//! use support_tickets::storage::MemoryStorage;
//! use support_tickets::store::TicketStore;
//!
//! let store = TicketStore::new(MemoryStorage::new());
//! let mut ticket = store
//!     .create_ticket(UserId::new(1), "Login issue", "Cannot log in", None)
//!     .unwrap();
//! assert_eq!(ticket.slug, "login-issue");
//!
//! store.set_status(&mut ticket, Status::Resolved).unwrap();
//! assert!(store.add_comment(&ticket, UserId::new(1), "Thanks", None).is_err());
//! ```

// Allow missing error documentation for internal implementations
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]

pub mod attachments;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod storage;
pub mod store;
pub mod validation;

#[cfg(feature = "api")]
pub mod api;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{Result, TicketError};
