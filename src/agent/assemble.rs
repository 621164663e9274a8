//! Prompt assembly: system turn, bounded history window, user turn with
//! appended tool evidence.

use crate::memory::Fact;
use crate::providers::Message;

/// System prompt template. `{learned_facts}` is replaced with the current
/// fact list per turn.
const SYSTEM_PROMPT: &str = "You are deskbot, a proactive assistant with direct access to the \
user's computer.

## CAPABILITIES
1. Full-disk search — find any file or folder by name or context.
2. Folder listing — inspect the contents of any directory.
3. Folder organization — preview and execute file cleanups, sorted by type.
4. Document reading — read and summarize file contents.
5. Conversation memory — recall earlier exchanges and learned preferences.

## RESPONSE RULES
- Never show raw tool output or [TOOL: ...] blocks; restate results naturally.
- Mention every file or folder with its full absolute path.
- If a search found nothing, say so plainly; never invent files.
- Before moving or renaming files, ask for confirmation and wait for a yes.
- No deletions ever. Only safe file operations.

## LEARNED KNOWLEDGE (personal to this user)
{learned_facts}";

/// Placeholder used when no facts have been learned yet.
const NO_FACTS_PLACEHOLDER: &str =
    "No specialized patterns learned yet. I will evolve as we interact.";

/// Render the system turn with the current fact list.
pub fn system_prompt(facts: &[Fact]) -> String {
    let knowledge = if facts.is_empty() {
        NO_FACTS_PLACEHOLDER.to_string()
    } else {
        facts
            .iter()
            .map(|f| format!("- {}", f.text))
            .collect::<Vec<_>>()
            .join("\n")
    };
    SYSTEM_PROMPT.replace("{learned_facts}", &knowledge)
}

/// Build the model payload: `[system, ...windowed history, user+evidence]`.
///
/// Only history is windowed (last `history_window` turns, oldest of the
/// retained window first); the evidence block is never truncated. The user's
/// literal query always appears verbatim, with evidence appended after a
/// blank line iff non-empty.
pub fn build_messages(
    facts: &[Fact],
    history: &[Message],
    query: &str,
    evidence: &str,
    history_window: usize,
) -> Vec<Message> {
    let mut messages = vec![Message::system(system_prompt(facts))];

    let start = history.len().saturating_sub(history_window);
    for turn in &history[start..] {
        messages.push(turn.clone());
    }

    let user_content = if evidence.is_empty() {
        query.to_string()
    } else {
        format!("{}\n\n{}", query, evidence)
    };
    messages.push(Message::user(user_content));

    messages
}
