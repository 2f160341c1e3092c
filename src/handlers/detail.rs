use super::base::{HandlerContext, Outcome, Request, redirect_back, require_login};
use super::routes::{TicketKey, TicketLinks, detail_path};
use super::views::{TicketDetailView, View, rating_choices, status_choices};
use crate::attachments::{AttachmentKind, Upload};
use crate::core::Ticket;
use crate::error::{Result, TicketError};
use crate::messages::{Message, MessageKey};
use crate::storage::Repository;
use crate::validation;
use tracing::debug;

/// A reply posted from the detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentSubmission {
    pub comment: String,
    pub attachment: Option<Upload>,
}

/// Handle the ticket detail page and its comment form
pub fn handle_ticket_detail<R: Repository>(
    ctx: &HandlerContext<R>,
    request: &Request,
    key: &TicketKey,
    submission: Option<CommentSubmission>,
) -> Result<Outcome> {
    let user = match require_login(request, &ctx.settings) {
        Ok(user) => user,
        Err(outcome) => return Ok(outcome),
    };
    let ticket = match ctx.load_ticket_or_not_found(user, key)? {
        Ok(ticket) => ticket,
        Err(outcome) => return Ok(outcome),
    };

    let Some(submission) = submission else {
        return render_detail(ctx, ticket);
    };

    if !ticket.status.accepts_comments() {
        debug!("Comment refused on ticket {} ({})", ticket.id, ticket.status);
        return Ok(redirect_back(
            request,
            vec![Message::error(MessageKey::TicketAlreadyClosed)],
        ));
    }

    // Text first, so a rejected form never leaves a stored file behind.
    let input = match validation::validate_comment(&submission.comment, None) {
        Ok(input) => input,
        Err(TicketError::Validation(errors)) => {
            return Ok(Outcome::redirect(
                detail_path(key),
                Message::field_errors(&errors),
            ));
        },
        Err(e) => return Err(e),
    };
    let attachment = match ctx.store_upload(AttachmentKind::Comment, submission.attachment.as_ref()) {
        Ok(attachment) => attachment,
        Err(TicketError::Validation(errors)) => {
            return Ok(Outcome::redirect(
                detail_path(key),
                Message::field_errors(&errors),
            ));
        },
        Err(e) => return Err(e),
    };

    ctx.store
        .add_comment(&ticket, user, &input.comment, attachment.clone())
        .inspect_err(|_| ctx.discard_upload(attachment.as_ref()))?;
    Ok(redirect_back(
        request,
        vec![Message::success(MessageKey::TicketCommented)],
    ))
}

fn render_detail<R: Repository>(ctx: &HandlerContext<R>, ticket: Ticket) -> Result<Outcome> {
    let comments = ctx.store.active_comments(&ticket)?;
    let latest_comment = ctx.store.latest_comment(&ticket)?;
    let is_answered = ctx.store.is_answered(&ticket)?;

    Ok(Outcome::Render(View::TicketDetail(TicketDetailView {
        links: TicketLinks::of(&ticket),
        can_comment: ticket.status.accepts_comments(),
        rating_stars: ticket.rating_stars.map(|r| r.stars().collect()).unwrap_or_default(),
        rating_choices: rating_choices(),
        statuses: status_choices(),
        comments,
        latest_comment,
        is_answered,
        ticket,
    })))
}
