use serde::Deserialize;
use serde_json::Value;

use crate::stage::StageId;

/// A recognized machine directive the model emits instead of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemCommand {
    ProceedToNextStage { next_stage_id: StageId },
    EndConversation,
    TicketChosen { ticket_id: String },
    TicketProcessingDone,
}

/// Outcome of classifying one model turn's text. Malformed payloads and
/// unknown command names are recoverable: the caller treats them as plain
/// conversational text, never as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Command {
        command: SystemCommand,
        reply: Option<String>,
    },
    /// Structurally a command payload, but the `command` value (or its
    /// arguments) is not part of the protocol.
    Unrecognized { command: String },
    Text,
}

#[derive(Deserialize)]
struct CommandPayload {
    command: String,
    #[serde(default)]
    args: Option<Value>,
    #[serde(default)]
    reply: Option<String>,
}

/// Classify a model response. Any parse failure, non-mapping value, or
/// missing `command` key means "not a command"; the same input always
/// classifies the same way.
pub fn classify(text: &str) -> Classified {
    let payload: CommandPayload = match serde_json::from_str(text.trim()) {
        Ok(payload) => payload,
        Err(_) => return Classified::Text,
    };

    let command = match payload.command.as_str() {
        "proceed_to_next_stage" => {
            let next = payload
                .args
                .as_ref()
                .and_then(|args| args.get("next_stage_id"))
                .and_then(Value::as_str)
                .and_then(StageId::from_str);
            match next {
                Some(next_stage_id) => SystemCommand::ProceedToNextStage { next_stage_id },
                None => {
                    return Classified::Unrecognized {
                        command: payload.command,
                    }
                }
            }
        }
        "end_conversation" => SystemCommand::EndConversation,
        "ticket_chosen" => {
            let ticket_id = payload
                .args
                .as_ref()
                .and_then(|args| args.get("ticket_id"))
                .and_then(Value::as_str)
                .map(str::to_string);
            match ticket_id {
                Some(ticket_id) => SystemCommand::TicketChosen { ticket_id },
                None => {
                    return Classified::Unrecognized {
                        command: payload.command,
                    }
                }
            }
        }
        "ticket_processing_done" => SystemCommand::TicketProcessingDone,
        _ => {
            return Classified::Unrecognized {
                command: payload.command,
            }
        }
    };

    Classified::Command {
        command,
        reply: payload.reply.filter(|reply| !reply.trim().is_empty()),
    }
}
