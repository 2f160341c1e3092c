//! Close and resolve actions

use super::base::{
    HandlerContext, Outcome, Request, recover, redirect_back, require_login, require_post,
};
use super::routes::TicketKey;
use crate::core::Status;
use crate::error::Result;
use crate::messages::{Message, MessageKey};
use crate::storage::Repository;

/// Handle `POST /close/{slug}-get{id}/`
pub fn handle_mark_closed<R: Repository>(
    ctx: &HandlerContext<R>,
    request: &Request,
    key: &TicketKey,
) -> Result<Outcome> {
    change_status(ctx, request, key, Status::Closed)
}

/// Handle `POST /resolved/{slug}-get{id}/`
pub fn handle_mark_resolved<R: Repository>(
    ctx: &HandlerContext<R>,
    request: &Request,
    key: &TicketKey,
) -> Result<Outcome> {
    change_status(ctx, request, key, Status::Resolved)
}

fn change_status<R: Repository>(
    ctx: &HandlerContext<R>,
    request: &Request,
    key: &TicketKey,
    status: Status,
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

    let changed = ctx.store.set_status(&mut ticket, status).map(|()| {
        let message = match status {
            Status::Resolved => {
                Message::success(MessageKey::TicketResolved).with_param("id", ticket.id)
            },
            _ => Message::success(MessageKey::TicketClosed),
        };
        redirect_back(request, vec![message])
    });
    recover(changed, request)
}
