mod common;

use common::{MockChatProvider, create_test_agent, find_call_containing, user_content};
use deskbot::agent::TurnRequest;
use deskbot::providers::Message;

#[tokio::test]
async fn search_turn_renders_evidence_and_keeps_query_verbatim() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec!["Found it."]));
    std::fs::write(harness.tmp.path().join("Budget Report.xlsx"), "x").unwrap();

    let reply = harness
        .agent
        .handle_turn(TurnRequest::new("find budget report", Vec::new()))
        .await;
    assert_eq!(reply.reply, "Found it.");

    let user = user_content(&harness.calls, 0);
    assert!(user.starts_with("find budget report\n\n"));
    assert!(user.contains("[TOOL: file_search] Found 1 files matching 'budget report'"));
    assert!(user.contains("Budget Report.xlsx"));
}

#[tokio::test]
async fn search_miss_renders_explicit_not_found_block() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec!["Nothing there."]));

    harness
        .agent
        .handle_turn(TurnRequest::new("find quarterly forecast", Vec::new()))
        .await;

    let user = user_content(&harness.calls, 0);
    assert!(user.contains("No files found matching 'quarterly forecast'"));
}

#[tokio::test]
async fn conversational_turn_sends_bare_query() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec!["Hi!"]));

    harness
        .agent
        .handle_turn(TurnRequest::new("hello", Vec::new()))
        .await;

    assert_eq!(user_content(&harness.calls, 0), "hello");
}

#[tokio::test]
async fn organize_preview_never_moves_files() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec!["Here's the plan."]));
    let loose = harness.workspace_root.join("report.pdf");
    std::fs::write(&loose, "x").unwrap();

    harness
        .agent
        .handle_turn(TurnRequest::new("tidy the workspace", Vec::new()))
        .await;

    let user = user_content(&harness.calls, 0);
    assert!(user.contains("[TOOL: organize_preview]"));
    assert!(!user.contains("[TOOL: organize_execute]"));
    // Still in place
    assert!(loose.exists());
}

#[tokio::test]
async fn preview_then_confirmation_executes_against_previewed_path() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec![
        "Want me to proceed?",
        "Done.",
    ]));
    let loose = harness.workspace_root.join("report.pdf");
    std::fs::write(&loose, "x").unwrap();

    let session = Some("s1".to_string());
    harness
        .agent
        .handle_turn(TurnRequest {
            query: "tidy the workspace".to_string(),
            history: Vec::new(),
            session_id: session.clone(),
        })
        .await;

    let history = vec![
        Message::user("tidy the workspace"),
        Message::assistant("Want me to proceed?"),
    ];
    harness
        .agent
        .handle_turn(TurnRequest {
            query: "yes do it".to_string(),
            history,
            session_id: session,
        })
        .await;

    let executed = find_call_containing(&harness.calls, "[TOOL: organize_execute]");
    assert!(executed.is_some(), "no execute evidence in any model call");
    assert!(
        executed
            .unwrap()
            .contains("[TOOL: organize_execute] Successfully organized")
    );
    // The previewed file actually moved into its category folder
    assert!(!loose.exists());
    assert!(harness.workspace_root.join("Documents").join("report.pdf").exists());
}

#[tokio::test]
async fn model_failure_degrades_to_apologetic_reply() {
    let harness = create_test_agent(MockChatProvider::failing());

    let reply = harness
        .agent
        .handle_turn(TurnRequest::new("hello there friend", Vec::new()))
        .await;

    assert!(reply.reply.contains("I encountered an error"));
    assert!(reply.reply.contains("model backend unavailable"));
    assert_eq!(reply.duration_seconds, 0.0);
}

#[tokio::test]
async fn empty_query_short_circuits() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec![]));

    let reply = harness
        .agent
        .handle_turn(TurnRequest::new("   ", Vec::new()))
        .await;

    assert_eq!(reply.reply, "Please provide a query.");
    assert!(harness.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn history_is_windowed_to_twenty_turns() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec!["ok"]));
    let history: Vec<Message> = (0..30)
        .map(|i| Message::user(format!("turn {}", i)))
        .collect();

    harness
        .agent
        .handle_turn(TurnRequest::new("hello", history))
        .await;

    let calls = harness.calls.lock().unwrap();
    let messages = &calls[0];
    // system + 20 retained turns + current user turn
    assert_eq!(messages.len(), 22);
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[1].content, "turn 10");
    assert_eq!(messages[20].content, "turn 29");
}

#[tokio::test]
async fn learned_facts_appear_in_system_prompt() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec!["ok"]));
    harness
        .memory
        .append_fact("general", "User keeps invoices in the orders folder")
        .unwrap();

    harness
        .agent
        .handle_turn(TurnRequest::new("hello", Vec::new()))
        .await;

    let calls = harness.calls.lock().unwrap();
    let system = &calls[0][0];
    assert_eq!(system.role, "system");
    assert!(system.content.contains("- User keeps invoices in the orders folder"));
}

#[tokio::test]
async fn substantial_turn_extracts_and_stores_a_fact() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec![
        "Reply.",
        "User prefers sorting downloads by file type.",
    ]));

    harness
        .agent
        .handle_turn(TurnRequest::new(
            "please always sort my downloads by file type",
            Vec::new(),
        ))
        .await;

    // The extraction task is detached; poll for its completion
    let mut facts = Vec::new();
    for _ in 0..100 {
        facts = harness.memory.recent_facts(10).unwrap();
        if !facts.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].text, "User prefers sorting downloads by file type.");
}

#[tokio::test]
async fn short_turns_skip_fact_extraction() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec!["ok"]));

    harness
        .agent
        .handle_turn(TurnRequest::new("hello", Vec::new()))
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // Only the primary call happened, no extraction call for a 5-char query
    assert_eq!(harness.calls.lock().unwrap().len(), 1);
    assert!(harness.memory.recent_facts(10).unwrap().is_empty());
}

#[tokio::test]
async fn completed_turns_are_logged_for_recall() {
    let harness = create_test_agent(MockChatProvider::with_responses(vec![
        "The budget is in D:\\Reports.",
        "We discussed the budget report.",
    ]));

    harness
        .agent
        .handle_turn(TurnRequest::new("find budget report", Vec::new()))
        .await;

    harness
        .agent
        .handle_turn(TurnRequest::new(
            "what did we find about the budget last time",
            Vec::new(),
        ))
        .await;

    let recall = find_call_containing(&harness.calls, "[TOOL: memory_search]");
    assert!(recall.is_some(), "no memory_search evidence in any model call");
    assert!(
        recall
            .unwrap()
            .contains("[TOOL: memory_search] Historical data found")
    );
}
