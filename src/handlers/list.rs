use super::base::{HandlerContext, Outcome, Request, require_login};
use super::routes::CREATE_PATH;
use super::views::{TicketListView, TicketRow, View, status_choices};
use crate::error::Result;
use crate::storage::Repository;
use tracing::debug;

/// Handle the "my tickets" page
///
/// Always renders for a logged-in user; an empty list and out-of-range
/// page numbers are not errors.
pub fn handle_list_my_tickets<R: Repository>(
    ctx: &HandlerContext<R>,
    request: &Request,
    page: Option<&str>,
) -> Result<Outcome> {
    let user = match require_login(request, &ctx.settings) {
        Ok(user) => user,
        Err(outcome) => return Ok(outcome),
    };

    let tickets = ctx
        .store
        .list_tickets_for_user(user, page, ctx.settings.page_size)?
        .map(TicketRow::from);
    debug!(
        "Listing page {}/{} of tickets for user {}",
        tickets.number, tickets.num_pages, user
    );

    Ok(Outcome::Render(View::TicketList(TicketListView {
        tickets,
        create_url: CREATE_PATH.to_string(),
        statuses: status_choices(),
    })))
}
