//! Self-learning: condense each substantial exchange into at most one
//! durable fact.
//!
//! A secondary model call runs after the primary reply is already on its way
//! to the caller. It is dispatched as a detached task: its failure is
//! observed only via logging and never affects the returned reply.

use crate::memory::MemoryStore;
use crate::providers::{ChatProvider, Message};
use std::sync::Arc;
use tracing::{debug, warn};

/// Model answer meaning "nothing worth remembering". Compared
/// case-insensitively.
pub const NO_FACT_SENTINEL: &str = "NONE";

/// Category under which extracted facts are stored.
const FACT_CATEGORY: &str = "general";

/// Prompt for the secondary extraction call.
pub fn learning_prompt(query: &str) -> String {
    format!(
        "Analyze this user request and extract any general preference, rule, or fact \
         about their computer that I should remember.\n\n\
         User: {}\n\n\
         Return ONLY a single sentence fact (e.g. \"User prefers sorting by file type\" \
         or \"User's main project folder is D:/Projects/X\") or return \"{}\".",
        query, NO_FACT_SENTINEL
    )
}

/// Filter a raw extraction answer down to a storable fact.
///
/// Rejects the empty answer, the no-fact sentinel (case-insensitive), and
/// anything at or over `max_len`; long answers are degenerate model output,
/// not facts.
pub fn acceptable_fact(candidate: &str, max_len: usize) -> Option<String> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.eq_ignore_ascii_case(NO_FACT_SENTINEL) {
        return None;
    }
    if trimmed.len() >= max_len {
        return None;
    }
    Some(trimmed.to_string())
}

/// Run one extraction round: ask the model, filter, persist.
/// Errors bubble up to the spawned task below, where they are logged.
async fn extract_once(
    provider: &dyn ChatProvider,
    memory: &MemoryStore,
    query: &str,
    max_len: usize,
) -> anyhow::Result<()> {
    let answer = provider
        .chat(vec![Message::user(learning_prompt(query))])
        .await?;

    match acceptable_fact(&answer, max_len) {
        Some(fact) => {
            memory.append_fact(FACT_CATEGORY, &fact)?;
            debug!("learned fact: {}", fact);
        }
        None => debug!("no storable fact extracted"),
    }
    Ok(())
}

/// Dispatch fact extraction for a completed turn. Returns immediately; the
/// extraction runs in the background and is best-effort.
pub fn spawn_extraction(
    provider: Arc<dyn ChatProvider>,
    memory: Arc<MemoryStore>,
    query: String,
    max_len: usize,
) {
    tokio::spawn(async move {
        if let Err(e) = extract_once(provider.as_ref(), memory.as_ref(), &query, max_len).await {
            warn!("fact extraction failed: {}", e);
        }
    });
}
