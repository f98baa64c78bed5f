use serde::{Deserialize, Serialize};

/// Jira status transition codes. These are embedded verbatim in the stage
/// prompts so the model can pass the right code to `update_status`.
pub const TRANSITION_TO_DO: &str = "11";
pub const TRANSITION_IN_PROGRESS: &str = "21";
pub const TRANSITION_DONE: &str = "31";
pub const TRANSITION_BLOCKED: &str = "2";

pub const STATUS_TO_DO: &str = "To Do";
pub const STATUS_IN_PROGRESS: &str = "In Progress";

/// Snapshot of a tracked work item. Fetched once per selection-loop entry;
/// the authoritative copy lives in the ticket store and is not re-read
/// after tool mutations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommentAuthor {
    pub account_id: String,
    pub display_name: String,
    pub email_address: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub author: CommentAuthor,
    pub body: String,
    pub created: String,
    pub updated: Option<String>,
}

/// Listing order for the selection prompt: In Progress first, then To Do,
/// then anything else, with recently processed tickets moved to the very
/// end regardless of status. Ties keep their fetched order.
pub fn order_for_listing(tickets: &[Ticket], recently_processed: &[String]) -> Vec<Ticket> {
    let mut ordered: Vec<(usize, &Ticket)> = tickets.iter().enumerate().collect();
    ordered.sort_by_key(|(index, ticket)| {
        let recent = recently_processed.contains(&ticket.id);
        let rank = if recent {
            3
        } else {
            match ticket.status.as_deref() {
                Some(STATUS_IN_PROGRESS) => 0,
                Some(STATUS_TO_DO) => 1,
                _ => 2,
            }
        };
        (rank, *index)
    });
    ordered.into_iter().map(|(_, ticket)| ticket.clone()).collect()
}

pub fn find_ticket<'a>(tickets: &'a [Ticket], id: &str) -> Option<&'a Ticket> {
    tickets.iter().find(|ticket| ticket.id == id)
}
