use anyhow::Result;

use crate::ticket::{Comment, Ticket};

/// External ticket-tracking backend. At most one request is in flight at a
/// time; failures propagate as fatal errors (any retry policy belongs to
/// the implementation, not the callers).
pub trait TicketStore {
    fn list_open_tickets(&self, assignee: &str) -> Result<Vec<Ticket>>;
    fn get_ticket(&self, id: &str) -> Result<Ticket>;
    fn list_comments(&self, ticket_id: &str) -> Result<Vec<Comment>>;
    fn add_comment(&self, ticket_id: &str, text: &str) -> Result<()>;
    fn transition_status(&self, ticket_id: &str, transition_id: &str) -> Result<()>;
    fn set_dates(&self, ticket_id: &str, start_date: Option<&str>, due_date: Option<&str>)
        -> Result<()>;
}
