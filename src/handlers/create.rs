use super::base::{HandlerContext, Outcome, Request, require_login};
use super::routes::{CREATE_PATH, TicketKey, detail_path};
use super::views::{CreateTicketView, View};
use crate::attachments::{AttachmentKind, Upload};
use crate::error::{Result, TicketError};
use crate::messages::{Message, MessageKey};
use crate::storage::Repository;
use crate::validation;

/// Parameters for creating a ticket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketSubmission {
    pub subject: String,
    pub description: String,
    pub attachment: Option<Upload>,
}

/// Handle the "new ticket" form
///
/// Without a submission the empty form is rendered. A valid submission
/// creates the ticket in status New and redirects to its detail page.
pub fn handle_create_ticket<R: Repository>(
    ctx: &HandlerContext<R>,
    request: &Request,
    submission: Option<TicketSubmission>,
) -> Result<Outcome> {
    let user = match require_login(request, &ctx.settings) {
        Ok(user) => user,
        Err(outcome) => return Ok(outcome),
    };

    let Some(submission) = submission else {
        return Ok(Outcome::Render(View::CreateTicket(CreateTicketView::default())));
    };

    let created = validation::validate_ticket(&submission.subject, &submission.description, None)
        .and_then(|input| {
            let attachment =
                ctx.store_upload(AttachmentKind::Ticket, submission.attachment.as_ref())?;
            ctx.store
                .create_ticket(user, &input.subject, &input.description, attachment.clone())
                .inspect_err(|_| ctx.discard_upload(attachment.as_ref()))
        });

    match created {
        Ok(ticket) => Ok(Outcome::redirect(
            detail_path(&TicketKey::of(&ticket)),
            vec![Message::success(MessageKey::TicketCreated)],
        )),
        Err(TicketError::Validation(errors)) => Ok(Outcome::redirect(
            CREATE_PATH,
            Message::field_errors(&errors),
        )),
        Err(e) => Err(e),
    }
}
