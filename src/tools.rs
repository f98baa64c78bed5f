use anyhow::Result;
use serde_json::{json, Value};

use crate::chat::{Message, ToolCall};
use crate::stage::{StagePhase, StageState};
use crate::store::TicketStore;
use crate::util::today_date;

/// The closed set of operations the model may request. Names and argument
/// shapes are part of the wire contract and must match the schemas below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    CurrentDate,
    FetchComments,
    AddComment,
    UpdateStatus,
    UpdateTicketDates,
}

impl ToolKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "current_date" => Some(Self::CurrentDate),
            "fetch_comments" => Some(Self::FetchComments),
            "add_comment" => Some(Self::AddComment),
            "update_status" => Some(Self::UpdateStatus),
            "update_ticket_dates" => Some(Self::UpdateTicketDates),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CurrentDate => "current_date",
            Self::FetchComments => "fetch_comments",
            Self::AddComment => "add_comment",
            Self::UpdateStatus => "update_status",
            Self::UpdateTicketDates => "update_ticket_dates",
        }
    }
}

/// Function schemas advertised to the model, chat-completions style.
pub fn tool_schemas() -> Vec<Value> {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": "current_date",
                "description": "Get the current date in YYYY-MM-DD format.",
                "parameters": {"type": "object", "properties": {}, "required": []}
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "fetch_comments",
                "description": "Fetch comments for a specific ticket.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "ticket_id": {"type": "string", "description": "Ticket id, e.g. APP-1"}
                    },
                    "required": ["ticket_id"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "add_comment",
                "description": "Add a comment to a ticket.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "ticket_id": {"type": "string", "description": "Ticket id, e.g. APP-1"},
                        "text": {"type": "string", "description": "Comment body"}
                    },
                    "required": ["ticket_id", "text"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "update_status",
                "description": "Update the status of a ticket using a transition ID.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "ticket_id": {"type": "string", "description": "Ticket id, e.g. APP-1"},
                        "transition_id": {"type": "string", "description": "Status transition ID"}
                    },
                    "required": ["ticket_id", "transition_id"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "update_ticket_dates",
                "description": "Update the start date and/or due date of a ticket. Dates in YYYY-MM-DD.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "ticket_id": {"type": "string", "description": "Ticket id, e.g. APP-1"},
                        "start_date": {"type": "string", "description": "Start date, YYYY-MM-DD"},
                        "end_date": {"type": "string", "description": "Due date, YYYY-MM-DD"}
                    },
                    "required": ["ticket_id"]
                }
            }
        }),
    ]
}

fn string_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Run one tool call against the store. Store failures propagate; a bad
/// argument produces error text the model can react to on its next turn.
fn execute(kind: ToolKind, args: &Value, store: &dyn TicketStore) -> Result<String> {
    match kind {
        ToolKind::CurrentDate => Ok(today_date()),
        ToolKind::FetchComments => {
            let Some(ticket_id) = string_arg(args, "ticket_id") else {
                return Ok("Error: fetch_comments requires 'ticket_id'.".to_string());
            };
            let comments = store.list_comments(&ticket_id)?;
            Ok(serde_json::to_string_pretty(&comments)?)
        }
        ToolKind::AddComment => {
            let (Some(ticket_id), Some(text)) =
                (string_arg(args, "ticket_id"), string_arg(args, "text"))
            else {
                return Ok("Error: add_comment requires 'ticket_id' and 'text'.".to_string());
            };
            store.add_comment(&ticket_id, &text)?;
            Ok("Comment added successfully.".to_string())
        }
        ToolKind::UpdateStatus => {
            let (Some(ticket_id), Some(transition_id)) = (
                string_arg(args, "ticket_id"),
                string_arg(args, "transition_id"),
            ) else {
                return Ok(
                    "Error: update_status requires 'ticket_id' and 'transition_id'.".to_string(),
                );
            };
            store.transition_status(&ticket_id, &transition_id)?;
            Ok("Status updated successfully.".to_string())
        }
        ToolKind::UpdateTicketDates => {
            let Some(ticket_id) = string_arg(args, "ticket_id") else {
                return Ok("Error: update_ticket_dates requires 'ticket_id'.".to_string());
            };
            let start_date = string_arg(args, "start_date");
            let end_date = string_arg(args, "end_date");
            if start_date.is_none() && end_date.is_none() {
                return Ok(
                    "Error: update_ticket_dates requires 'start_date' or 'end_date'.".to_string(),
                );
            }
            store.set_dates(&ticket_id, start_date.as_deref(), end_date.as_deref())?;
            Ok("Ticket dates updated successfully.".to_string())
        }
    }
}

fn dispatch_one(call: &ToolCall, store: &dyn TicketStore) -> Result<String> {
    match ToolKind::from_name(&call.name) {
        Some(kind) => execute(kind, &call.args, store),
        None => {
            eprintln!("Warning: model requested unknown tool '{}'", call.name);
            Ok(format!("Error: unknown tool '{}'.", call.name))
        }
    }
}

/// Execute every tool call pending on the stage's last assistant message,
/// in the order the model listed them, appending one correlated tool-result
/// message per call. The stage returns to `InProgress` so the next tick
/// re-invokes the model against the fresh results.
pub fn run_pending_tools(stage: &mut StageState, store: &dyn TicketStore) -> Result<()> {
    let calls = match stage.messages.last() {
        Some(Message::Assistant { tool_calls, .. }) => tool_calls.clone(),
        _ => Vec::new(),
    };

    for call in &calls {
        let content = dispatch_one(call, store)?;
        stage.messages.push(Message::Tool {
            content,
            tool_call_id: call.id.clone(),
        });
    }

    stage.phase = StagePhase::InProgress;
    Ok(())
}
