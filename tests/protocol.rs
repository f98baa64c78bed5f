use chrono::NaiveDate;

use scrumbot::chat::Message;
use scrumbot::command::{classify, Classified, SystemCommand};
use scrumbot::prompts::{base_prompt, selection_prompt, stage_prompt};
use scrumbot::stage::{StageId, StageTable, STAGE_ORDER};
use scrumbot::ticket::{order_for_listing, Ticket};

fn ticket(id: &str, status: &str, due_date: Option<&str>) -> Ticket {
    Ticket {
        id: id.to_string(),
        title: format!("Ticket {id}"),
        description: "A ticket under discussion.".to_string(),
        status: Some(status.to_string()),
        priority: Some("High".to_string()),
        start_date: None,
        due_date: due_date.map(str::to_string),
    }
}

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

#[test]
fn classify_round_trips_proceed_command() {
    let payload =
        r#"{"command":"proceed_to_next_stage","args":{"next_stage_id":"plan_for_the_day"}}"#;
    let classified = classify(payload);
    assert_eq!(
        classified,
        Classified::Command {
            command: SystemCommand::ProceedToNextStage {
                next_stage_id: StageId::PlanForTheDay
            },
            reply: None,
        }
    );
}

#[test]
fn classify_is_idempotent() {
    for text in [
        r#"{"command":"end_conversation"}"#,
        r#"{"command":"mystery"}"#,
        "Sure, let's continue!",
    ] {
        assert_eq!(classify(text), classify(text));
    }
}

#[test]
fn classify_extracts_reply_field() {
    let payload = r#"{"reply":"Thanks, that's all I needed.","command":"end_conversation"}"#;
    match classify(payload) {
        Classified::Command { command, reply } => {
            assert_eq!(command, SystemCommand::EndConversation);
            assert_eq!(reply.as_deref(), Some("Thanks, that's all I needed."));
        }
        other => panic!("expected command, got {other:?}"),
    }
}

#[test]
fn classify_blank_reply_is_dropped() {
    let payload = r#"{"reply":"  ","command":"ticket_processing_done"}"#;
    match classify(payload) {
        Classified::Command { reply, .. } => assert_eq!(reply, None),
        other => panic!("expected command, got {other:?}"),
    }
}

#[test]
fn malformed_payloads_degrade_to_text() {
    for text in [
        "Sure, let's continue!",
        "",
        "[1, 2, 3]",
        "42",
        r#"{"args":{"next_stage_id":"plan_for_the_day"}}"#,
    ] {
        assert_eq!(classify(text), Classified::Text, "input: {text:?}");
    }
}

#[test]
fn unknown_command_value_is_unrecognized_not_text() {
    assert_eq!(
        classify(r#"{"command":"warp_to_stage"}"#),
        Classified::Unrecognized {
            command: "warp_to_stage".to_string()
        }
    );
}

#[test]
fn proceed_without_valid_target_is_unrecognized() {
    for payload in [
        r#"{"command":"proceed_to_next_stage"}"#,
        r#"{"command":"proceed_to_next_stage","args":{"next_stage_id":"warp_core"}}"#,
        r#"{"command":"proceed_to_next_stage","args":{"next_stage_id":7}}"#,
    ] {
        assert!(
            matches!(classify(payload), Classified::Unrecognized { .. }),
            "input: {payload:?}"
        );
    }
}

#[test]
fn ticket_chosen_requires_ticket_id() {
    assert!(matches!(
        classify(r#"{"command":"ticket_chosen","args":{}}"#),
        Classified::Unrecognized { .. }
    ));
    match classify(r#"{"command":"ticket_chosen","args":{"ticket_id":"APP-3"}}"#) {
        Classified::Command {
            command: SystemCommand::TicketChosen { ticket_id },
            ..
        } => assert_eq!(ticket_id, "APP-3"),
        other => panic!("expected ticket_chosen, got {other:?}"),
    }
}

#[test]
fn stage_ids_round_trip_their_names() {
    for stage in STAGE_ORDER {
        assert_eq!(StageId::from_str(stage.as_str()), Some(stage));
    }
    assert_eq!(StageId::from_str("retrospective"), None);
}

#[test]
fn listing_order_puts_recent_tickets_last() {
    let tickets = vec![
        ticket("APP-1", "To Do", None),
        ticket("APP-2", "In Progress", None),
        ticket("APP-3", "In Progress", None),
    ];
    let recent = vec!["APP-2".to_string()];

    let ordered = order_for_listing(&tickets, &recent);
    let ids: Vec<&str> = ordered.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["APP-3", "APP-1", "APP-2"]);
}

#[test]
fn listing_order_ignores_input_order() {
    let tickets = vec![
        ticket("APP-9", "To Do", None),
        ticket("APP-1", "To Do", None),
        ticket("APP-5", "In Progress", None),
    ];
    let ordered = order_for_listing(&tickets, &[]);
    let ids: Vec<&str> = ordered.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["APP-5", "APP-9", "APP-1"]);
}

#[test]
fn base_prompt_embeds_transition_codes_and_ticket() {
    let t = ticket("APP-1", "To Do", None);
    let prompt = base_prompt(Some(&t));
    assert!(prompt.contains(r#""To Do": "11""#));
    assert!(prompt.contains(r#""In Progress": "21""#));
    assert!(prompt.contains(r#""Done": "31""#));
    assert!(prompt.contains(r#""Blocked": "2""#));
    assert!(prompt.contains("APP-1"));
}

#[test]
fn base_prompt_renders_missing_ticket_as_null() {
    assert!(base_prompt(None).contains("null"));
}

#[test]
fn due_date_prompt_collects_missing_date() {
    let t = ticket("APP-1", "To Do", None);
    let table = StageTable::new();
    let prompt = stage_prompt(StageId::DueDateCheck, Some(&t), &table, day("2026-08-30"));
    assert!(prompt.contains("due date for this ticket is not set"));
    assert!(prompt.contains("update_ticket_dates"));
}

#[test]
fn due_date_prompt_flags_approaching_date() {
    let t = ticket("APP-1", "To Do", Some("2026-09-01"));
    let table = StageTable::new();
    let prompt = stage_prompt(StageId::DueDateCheck, Some(&t), &table, day("2026-08-30"));
    assert!(prompt.contains("approaching soon"));
    assert!(prompt.contains("2026-09-01"));
}

#[test]
fn due_date_prompt_skips_silently_when_far_off() {
    let t = ticket("APP-1", "To Do", Some("2026-10-15"));
    let table = StageTable::new();
    let prompt = stage_prompt(StageId::DueDateCheck, Some(&t), &table, day("2026-08-30"));
    assert!(prompt.contains(r#""next_stage_id": "summarize_conversation""#));
    assert!(!prompt.contains("reply"));
}

#[test]
fn summary_prompt_concatenates_prior_stage_histories() {
    let t = ticket("APP-1", "To Do", None);
    let mut table = StageTable::new();
    table
        .stage_mut(StageId::BasicInfo)
        .messages
        .extend([Message::assistant("Any questions?"), Message::User("No questions.".into())]);
    table
        .stage_mut(StageId::PlanForTheDay)
        .messages
        .push(Message::User("I'll finish the login fix.".into()));
    table
        .stage_mut(StageId::BlockerCheck)
        .messages
        .push(Message::User("No blockers.".into()));
    // System and tool messages must not leak into the transcript.
    table
        .stage_mut(StageId::BasicInfo)
        .messages
        .push(Message::System("hidden instruction".into()));

    let prompt = stage_prompt(
        StageId::SummarizeConversation,
        Some(&t),
        &table,
        day("2026-08-30"),
    );
    assert!(prompt.contains("AI: Any questions?"));
    assert!(prompt.contains("User: No questions."));
    assert!(prompt.contains("User: I'll finish the login fix."));
    assert!(prompt.contains("User: No blockers."));
    assert!(!prompt.contains("hidden instruction"));

    let ai_pos = prompt.find("AI: Any questions?").unwrap();
    let plan_pos = prompt.find("User: I'll finish the login fix.").unwrap();
    assert!(ai_pos < plan_pos, "stages must appear in pipeline order");
}

#[test]
fn confirm_prompt_embeds_stored_summary() {
    let t = ticket("APP-1", "To Do", None);
    let mut table = StageTable::new();
    table.stage_mut(StageId::SummarizeConversation).summary =
        "Discussed APP-1; no blockers; due date confirmed.".to_string();

    let prompt = stage_prompt(StageId::ConfirmSummary, Some(&t), &table, day("2026-08-30"));
    assert!(prompt.contains("Discussed APP-1; no blockers; due date confirmed."));
    assert!(prompt.contains("add_comment"));
    assert!(prompt.contains(r#""command": "end_conversation""#));
}

#[test]
fn selection_prompt_orders_tickets_and_notes_restart() {
    let tickets = vec![
        ticket("APP-1", "To Do", None),
        ticket("APP-2", "In Progress", None),
    ];
    let recent = vec!["APP-2".to_string()];

    let fresh = selection_prompt(&tickets, &[], false);
    assert!(fresh.contains("This is a new conversation"));
    assert!(fresh.find("APP-2").unwrap() < fresh.find("APP-1").unwrap());

    let restarted = selection_prompt(&tickets, &recent, true);
    assert!(restarted.contains("Recently processed tickets"));
    // The recently processed ticket drops to the end of the rendered list.
    let listing = &restarted[restarted.find("Tickets:").unwrap()..];
    assert!(listing.find("APP-1").unwrap() < listing.find("APP-2").unwrap());
}
