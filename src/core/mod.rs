//! Core domain types: tickets, comments, their lifecycle and the helpers
//! that derive slugs and pages from them.

mod attachment;
mod builders;
mod comment;
mod pagination;
mod slug;
mod status;
mod ticket;
mod user;

pub use attachment::AttachmentRef;
pub use builders::{CommentBuilder, TicketBuilder};
pub use comment::{Comment, CommentId, latest_of};
pub use pagination::{DEFAULT_PAGE_SIZE, Page, Paginator};
pub use slug::slugify;
pub use status::{LifecyclePolicy, Rating, Status};
pub use ticket::{Ticket, TicketId};
pub use user::UserId;
