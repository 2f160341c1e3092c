use super::base::{
    HandlerContext, Outcome, Request, recover, redirect_back, require_login, require_post,
};
use super::routes::TicketKey;
use crate::error::Result;
use crate::messages::{Message, MessageKey};
use crate::storage::Repository;
use crate::validation;

/// Handle `POST /rate/{slug}-get{id}/`
///
/// `stars` is the raw form value; missing or blank means five stars.
/// Ratings are accepted whatever the ticket's status.
pub fn handle_rate_ticket<R: Repository>(
    ctx: &HandlerContext<R>,
    request: &Request,
    key: &TicketKey,
    stars: Option<&str>,
) -> Result<Outcome> {
    let user = match require_login(request, &ctx.settings) {
        Ok(user) => user,
        Err(outcome) => return Ok(outcome),
    };
    if let Err(outcome) = require_post(request) {
        return Ok(outcome);
    }
    let mut ticket = match ctx.load_ticket_or_not_found(user, key)? {
        Ok(ticket) => ticket,
        Err(outcome) => return Ok(outcome),
    };

    let rated = validation::parse_rating(stars)
        .and_then(|rating| ctx.store.set_rating(&mut ticket, Some(rating.get().into())))
        .map(|_| {
            redirect_back(
                request,
                vec![Message::success(MessageKey::TicketRated).with_param("id", ticket.id)],
            )
        });
    recover(rated, request)
}
