//! Request handlers for the ticket pages
//!
//! Handlers are transport-agnostic: they take a [`Request`] and return an
//! [`Outcome`]. Problems the user can fix become redirects with messages;
//! only infrastructure failures come back as `Err`.

pub mod base;
mod create;
mod detail;
mod list;
mod rate;
pub mod routes;
mod status;
mod views;

pub use base::{
    DEFAULT_LOGIN_URL, HandlerContext, HandlerSettings, Method, Outcome, Request, back_location,
    login_redirect,
};
pub use create::{TicketSubmission, handle_create_ticket};
pub use detail::{CommentSubmission, handle_ticket_detail};
pub use list::handle_list_my_tickets;
pub use rate::handle_rate_ticket;
pub use routes::TicketKey;
pub use status::{handle_mark_closed, handle_mark_resolved};
pub use views::{
    CreateTicketView, StatusChoice, TicketDetailView, TicketListView, TicketRow, View,
};
