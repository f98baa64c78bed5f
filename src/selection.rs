use anyhow::Result;

use crate::chat::{ChatModel, Message};
use crate::command::{classify, Classified, SystemCommand};
use crate::console::Console;
use crate::prompts::selection_prompt;
use crate::store::TicketStore;
use crate::ticket::{find_ticket, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    NotStarted,
    Restarted,
    InProgress,
    TicketChosen,
    EndConversation,
}

/// Outer ticket-selection loop: presents the open ticket list, converses
/// until the model signals a choice or the end of the session.
#[derive(Debug)]
pub struct SelectionLoop {
    pub phase: SelectionPhase,
    pub messages: Vec<Message>,
    pub tickets: Vec<Ticket>,
}

impl SelectionLoop {
    pub fn new() -> Self {
        Self {
            phase: SelectionPhase::NotStarted,
            messages: Vec::new(),
            tickets: Vec::new(),
        }
    }

    /// One tick of the loop. On (re)entry the ticket list is fetched fresh
    /// and the model produces the opening message without consuming user
    /// input; afterwards each tick is one user/model exchange. Returns the
    /// resolved ticket when the model emits `ticket_chosen`.
    pub fn tick(
        &mut self,
        assignee: &str,
        recently_processed: &[String],
        model: &dyn ChatModel,
        store: &dyn TicketStore,
        console: &mut dyn Console,
    ) -> Result<Option<Ticket>> {
        match self.phase {
            SelectionPhase::NotStarted | SelectionPhase::Restarted => {
                let restarted = self.phase == SelectionPhase::Restarted;
                self.tickets = store.list_open_tickets(assignee)?;
                if restarted {
                    self.messages.clear();
                }
                self.messages.push(Message::System(selection_prompt(
                    &self.tickets,
                    recently_processed,
                    restarted,
                )));
                let turn = model.invoke(&self.messages)?;
                if !turn.tool_calls.is_empty() {
                    eprintln!("Warning: ignoring tool call requested outside a ticket discussion");
                }
                console.show_agent(&turn.content);
                self.messages.push(Message::assistant(turn.content));
                self.phase = SelectionPhase::InProgress;
                Ok(None)
            }
            SelectionPhase::InProgress => {
                let input = console.read_line()?;
                self.messages.push(Message::User(input));
                let turn = model.invoke(&self.messages)?;
                // No tools run in this loop. A stray call is dropped before
                // the assistant message is stored: an assistant entry with
                // tool_calls but no tool results is an invalid wire history.
                if !turn.tool_calls.is_empty() {
                    eprintln!("Warning: ignoring tool call requested outside a ticket discussion");
                }
                let content = turn.content;
                self.messages.push(Message::assistant(content.clone()));

                match classify(&content) {
                    Classified::Command { command, reply } => {
                        if let Some(reply) = reply.as_deref() {
                            console.show_agent(reply);
                        }
                        match command {
                            SystemCommand::TicketChosen { ticket_id } => {
                                let chosen = find_ticket(&self.tickets, &ticket_id).cloned();
                                if chosen.is_none() {
                                    // Documented gap: the pipeline runs with
                                    // an empty ticket rather than re-asking.
                                    eprintln!(
                                        "Warning: chosen ticket '{ticket_id}' not in fetched list"
                                    );
                                }
                                self.phase = SelectionPhase::TicketChosen;
                                Ok(chosen)
                            }
                            SystemCommand::EndConversation => {
                                self.phase = SelectionPhase::EndConversation;
                                Ok(None)
                            }
                            SystemCommand::ProceedToNextStage { .. }
                            | SystemCommand::TicketProcessingDone => {
                                eprintln!(
                                    "Warning: ignoring pipeline command in the selection loop"
                                );
                                Ok(None)
                            }
                        }
                    }
                    Classified::Unrecognized { command } => {
                        eprintln!("Warning: unrecognized command '{command}', treating as text");
                        console.show_agent(&content);
                        Ok(None)
                    }
                    Classified::Text => {
                        console.show_agent(&content);
                        Ok(None)
                    }
                }
            }
            SelectionPhase::TicketChosen | SelectionPhase::EndConversation => Ok(None),
        }
    }
}

impl Default for SelectionLoop {
    fn default() -> Self {
        Self::new()
    }
}
