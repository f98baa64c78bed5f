use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::chat::{ChatModel, Message, ModelTurn};
use crate::command::{classify, Classified, SystemCommand};
use crate::console::Console;
use crate::prompts::{base_prompt, stage_prompt};
use crate::stage::{StageId, StagePhase, StageTable};
use crate::store::TicketStore;
use crate::ticket::Ticket;
use crate::tools::run_pending_tools;

/// Result of one pipeline tick. `Finished` means the exit node was reached:
/// the driver folds the ticket into the recently-processed set and restarts
/// the selection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Running,
    Finished,
}

/// Advance the per-ticket stage pipeline by one tick. Exactly one
/// participant acts per tick; a stage transition consumes no turn.
pub fn tick(
    table: &mut StageTable,
    ticket: Option<&Ticket>,
    model: &dyn ChatModel,
    store: &dyn TicketStore,
    console: &mut dyn Console,
    today: NaiveDate,
) -> Result<PipelineStatus> {
    let current = table.current_id();

    match table.current().phase {
        StagePhase::ProceedToNextStage => {
            let Some(next) = table.current().next_stage else {
                bail!("Stage {} has no next stage to advance to", current);
            };
            table.advance_to(next);
            // Any table member is a legal transition target, including one
            // visited before; the entered stage always gets first-turn
            // behavior, never a phase left over from an earlier visit.
            let entered = table.current_mut();
            entered.phase = StagePhase::NotStarted;
            entered.next_stage = None;
            Ok(PipelineStatus::Running)
        }
        StagePhase::EndConversation | StagePhase::Completed => Ok(PipelineStatus::Finished),
        StagePhase::ToolsCall => {
            run_pending_tools(table.current_mut(), store)?;
            Ok(PipelineStatus::Running)
        }
        StagePhase::NotStarted if current == StageId::SummarizeConversation => {
            summarize(table, ticket, model, today)?;
            Ok(PipelineStatus::Running)
        }
        StagePhase::NotStarted => {
            let prompt = format!(
                "{}\n{}",
                base_prompt(ticket),
                stage_prompt(current, ticket, table, today)
            );
            let stage = table.current_mut();
            stage.messages.push(Message::System(prompt));
            let turn = model.invoke(&stage.messages)?;
            apply_turn(table, turn, console);
            Ok(PipelineStatus::Running)
        }
        StagePhase::InProgress => {
            let stage = table.current_mut();
            // A just-appended tool result must reach the model before the
            // user speaks again.
            if !stage.messages.last().is_some_and(Message::is_tool_result) {
                let input = console.read_line()?;
                stage.messages.push(Message::User(input));
            }
            let turn = model.invoke(&stage.messages)?;
            apply_turn(table, turn, console);
            Ok(PipelineStatus::Running)
        }
    }
}

/// The summarize stage has no user-facing turn: it condenses the prior
/// stages' histories into a summary via a single model call and hands off
/// to the confirmation stage unconditionally.
fn summarize(
    table: &mut StageTable,
    ticket: Option<&Ticket>,
    model: &dyn ChatModel,
    today: NaiveDate,
) -> Result<()> {
    let prompt = stage_prompt(StageId::SummarizeConversation, ticket, table, today);
    let turn = model.invoke(&[Message::System(prompt)])?;

    let stage = table.stage_mut(StageId::SummarizeConversation);
    stage.summary = turn.content.trim().to_string();
    stage.phase = StagePhase::ProceedToNextStage;
    stage.next_stage = Some(StageId::ConfirmSummary);
    Ok(())
}

/// Record the model's turn on the current stage and classify it: pending
/// tool calls take precedence, then the command protocol, else plain text.
fn apply_turn(table: &mut StageTable, turn: ModelTurn, console: &mut dyn Console) {
    let has_tools = !turn.tool_calls.is_empty();
    let content = turn.content.clone();
    let stage = table.current_mut();
    stage.messages.push(turn.into_message());

    if has_tools {
        stage.phase = StagePhase::ToolsCall;
        return;
    }

    match classify(&content) {
        Classified::Command { command, reply } => {
            if let Some(reply) = reply.as_deref() {
                console.show_agent(reply);
            }
            match command {
                SystemCommand::ProceedToNextStage { next_stage_id } => {
                    stage.phase = StagePhase::ProceedToNextStage;
                    stage.next_stage = Some(next_stage_id);
                }
                SystemCommand::EndConversation => {
                    stage.phase = StagePhase::EndConversation;
                }
                SystemCommand::TicketProcessingDone => {
                    stage.phase = StagePhase::Completed;
                }
                SystemCommand::TicketChosen { .. } => {
                    // Outer-loop command leaking into the pipeline: ignore it
                    // and keep the conversation going.
                    eprintln!("Warning: ignoring 'ticket_chosen' inside the stage pipeline");
                    stage.phase = StagePhase::InProgress;
                }
            }
        }
        Classified::Unrecognized { command } => {
            eprintln!("Warning: unrecognized command '{command}', treating as text");
            console.show_agent(&content);
            stage.phase = StagePhase::InProgress;
        }
        Classified::Text => {
            console.show_agent(&content);
            stage.phase = StagePhase::InProgress;
        }
    }
}
