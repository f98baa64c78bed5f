use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::chat::ChatModel;
use crate::console::Console;
use crate::pipeline::{self, PipelineStatus};
use crate::selection::{SelectionLoop, SelectionPhase};
use crate::stage::StageTable;
use crate::store::TicketStore;
use crate::ticket::Ticket;
use crate::util::today;

/// Set by the ctrl-c handler; checked at every tick boundary and treated as
/// a cooperative end_conversation.
pub static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Everything the session mutates: the outer loop, the inner stage table,
/// the chosen ticket, and the ids of tickets already discussed. Created at
/// process start, discarded at exit.
pub struct RunState {
    pub selection: SelectionLoop,
    pub stages: StageTable,
    pub current_ticket: Option<Ticket>,
    pub recently_processed: Vec<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            selection: SelectionLoop::new(),
            stages: StageTable::new(),
            current_ticket: None,
            recently_processed: Vec::new(),
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level driver: routes between the selection loop and the stage
/// pipeline until either reaches its terminal state.
pub struct Driver<'a> {
    pub assignee: &'a str,
    pub model: &'a dyn ChatModel,
    pub store: &'a dyn TicketStore,
    pub console: &'a mut dyn Console,
}

impl Driver<'_> {
    pub fn run(&mut self, state: &mut RunState) -> Result<()> {
        loop {
            if INTERRUPTED.load(Ordering::SeqCst) {
                self.console.show_notice("Interrupted. Ending the standup.");
                return Ok(());
            }

            match state.selection.phase {
                SelectionPhase::EndConversation => return Ok(()),
                SelectionPhase::TicketChosen => {
                    let status = pipeline::tick(
                        &mut state.stages,
                        state.current_ticket.as_ref(),
                        self.model,
                        self.store,
                        self.console,
                        today(),
                    )?;
                    if status == PipelineStatus::Finished {
                        self.finish_ticket(state);
                    }
                }
                _ => {
                    let chosen = state.selection.tick(
                        self.assignee,
                        &state.recently_processed,
                        self.model,
                        self.store,
                        self.console,
                    )?;
                    if state.selection.phase == SelectionPhase::TicketChosen {
                        state.current_ticket = chosen;
                    }
                }
            }
        }
    }

    /// Pipeline exit node: fold the ticket into the recently-processed set,
    /// reset the stage table, and re-enter the selection loop fresh.
    fn finish_ticket(&mut self, state: &mut RunState) {
        if let Some(ticket) = state.current_ticket.take() {
            state.recently_processed.push(ticket.id);
        }
        state.stages.reset();
        state.selection.phase = SelectionPhase::Restarted;
    }
}
