//! View models handed to whatever renders the pages

use super::routes::{CREATE_PATH, TicketLinks};
use crate::core::{Comment, Page, Rating, Status, Ticket};
use crate::validation::SUBJECT_MAX_LENGTH;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    TicketList(TicketListView),
    TicketDetail(TicketDetailView),
    CreateTicket(CreateTicketView),
}

/// A status as templates compare against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChoice {
    pub value: Status,
    pub code: u8,
    pub label: String,
}

pub fn status_choices() -> Vec<StatusChoice> {
    Status::ALL
        .into_iter()
        .map(|status| StatusChoice {
            value: status,
            code: status.code(),
            label: status.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketRow {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub links: TicketLinks,
}

impl From<Ticket> for TicketRow {
    fn from(ticket: Ticket) -> Self {
        let links = TicketLinks::of(&ticket);
        Self { ticket, links }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketListView {
    pub tickets: Page<TicketRow>,
    pub create_url: String,
    pub statuses: Vec<StatusChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketDetailView {
    pub ticket: Ticket,
    pub links: TicketLinks,
    /// Active comments, newest first
    pub comments: Vec<Comment>,
    pub latest_comment: Option<Comment>,
    pub is_answered: bool,
    pub can_comment: bool,
    /// Filled star indices of the current rating
    pub rating_stars: Vec<u8>,
    /// Values the rating form offers
    pub rating_choices: Vec<u8>,
    pub statuses: Vec<StatusChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTicketView {
    pub action: String,
    pub subject_max_length: usize,
    pub statuses: Vec<StatusChoice>,
}

impl Default for CreateTicketView {
    fn default() -> Self {
        Self {
            action: CREATE_PATH.to_string(),
            subject_max_length: SUBJECT_MAX_LENGTH,
            statuses: status_choices(),
        }
    }
}

pub fn rating_choices() -> Vec<u8> {
    (Rating::MIN..=Rating::MAX).collect()
}
