//! Tool invocation and evidence-block rendering.
//!
//! For each fired intent the matching capability runs and its result, or its
//! explicit absence, is rendered into a textual block for the model. A
//! negative result always produces a block: the model must never silently
//! omit "nothing found". Tool failures render as `Status: error` lines and
//! the pipeline continues.

use crate::agent::gate::is_confirmation;
use crate::agent::intent::Intent;
use crate::agent::resolve::PathResolver;
use crate::config::Config;
use crate::memory::MemoryStore;
use crate::providers::Message;
use crate::tools::{FileTools, OpStatus};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Stop-words stripped before extracting a search term from an utterance.
/// Includes month/year tokens so "quotes from jan 2026" searches "quotes".
const STOP_WORDS: &[&str] = &[
    "find", "search", "look", "for", "check", "the", "my", "a", "an", "in", "on", "desktop",
    "downloads", "documents", "folder", "file", "files", "please", "can", "you", "show", "me",
    "read", "open", "analyze", "extract", "summarize", "where", "is", "are", "locate", "get",
    "with", "from", "about", "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct",
    "nov", "dec", "2023", "2024", "2025", "2026", "it", "this", "that",
];

const MAX_SEARCH_TERM_WORDS: usize = 3;

/// Extract the most likely search term: drop stop-words and short tokens,
/// keep the first few meaningful words. Empty when nothing remains; the
/// caller then fires no tool action.
pub fn extract_search_terms(query: &str) -> String {
    let lower = query.to_lowercase();
    let meaningful: Vec<&str> = lower
        .split_whitespace()
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w))
        .take(MAX_SEARCH_TERM_WORDS)
        .collect();
    meaningful.join(" ")
}

/// Result of evidence building for one turn.
pub struct TurnEvidence {
    /// Rendered blocks, joined for prompt injection. Empty when no tool ran.
    pub text: String,
    /// Set when an organize preview was rendered, so the caller can record a
    /// pending action for the session.
    pub organize_preview: Option<PathBuf>,
}

pub struct EvidenceBuilder {
    config: Arc<Config>,
    tools: Arc<dyn FileTools>,
    memory: Arc<MemoryStore>,
    resolver: PathResolver,
}

impl EvidenceBuilder {
    pub fn new(
        config: Arc<Config>,
        tools: Arc<dyn FileTools>,
        memory: Arc<MemoryStore>,
        resolver: PathResolver,
    ) -> Self {
        Self {
            config,
            tools,
            memory,
            resolver,
        }
    }

    /// Run every fired intent in render order and collect the blocks.
    ///
    /// `pending_organize` is the session's recorded preview target, if any;
    /// a confirmed organize prefers it over re-deriving the path from
    /// history.
    pub async fn build(
        &self,
        query: &str,
        history: &[Message],
        intents: &[Intent],
        pending_organize: Option<&Path>,
    ) -> TurnEvidence {
        let mut blocks: Vec<String> = Vec::new();
        let mut organize_preview = None;

        for intent in intents {
            match intent {
                Intent::Search => self.search_block(query, &mut blocks).await,
                Intent::List => self.list_block(query, history, &mut blocks).await,
                Intent::Organize => {
                    organize_preview = self
                        .organize_block(query, history, pending_organize, &mut blocks)
                        .await;
                }
                Intent::Read => self.read_block(query, &mut blocks).await,
                Intent::Recall => self.recall_block(query, &mut blocks),
                Intent::Transfer => blocks.push(
                    "[INSTRUCTION: The user wants to move or copy files. Ask them to \
                     confirm source and destination paths before executing.]"
                        .to_string(),
                ),
            }
        }

        TurnEvidence {
            text: blocks.join("\n\n"),
            organize_preview,
        }
    }

    async fn search_block(&self, query: &str, blocks: &mut Vec<String>) {
        let terms = extract_search_terms(query);
        if terms.is_empty() {
            // No extractable term: silently fire no tool action
            return;
        }

        let root = self.search_root(&query.to_lowercase()).await;
        match self
            .tools
            .search_files(&format!("*{}*", terms), root.as_deref())
            .await
        {
            Ok(results) if !results.is_empty() => {
                let capped = &results[..results.len().min(self.config.agent.max_search_results)];
                let rendered = serde_json::to_string_pretty(capped).unwrap_or_default();
                blocks.push(format!(
                    "[TOOL: file_search] Found {} files matching '{}':\n{}",
                    results.len(),
                    terms,
                    rendered
                ));
            }
            Ok(_) => blocks.push(format!(
                "[TOOL: file_search] Status: No files found matching '{}' on the computer.",
                terms
            )),
            Err(e) => {
                warn!("file search failed: {}", e);
                blocks.push(format!("[TOOL: file_search] Status: error: {}", e));
            }
        }
    }

    /// A well-known folder or drive mention narrows the search root.
    async fn search_root(&self, lower: &str) -> Option<PathBuf> {
        for folder in ["desktop", "downloads", "documents"] {
            if lower.contains(folder) {
                return Some(self.resolver.locate_well_known(folder).await);
            }
        }
        for (letter, root) in &self.config.workspace.drives {
            if lower.contains(&format!("{}:", letter)) || lower.contains(&format!("{} drive", letter))
            {
                return Some(PathBuf::from(root));
            }
        }
        None
    }

    async fn list_block(&self, query: &str, history: &[Message], blocks: &mut Vec<String>) {
        let resolved = self.resolver.resolve(query, history).await;
        match self.tools.list_directory(&resolved.path).await {
            Ok(listing) => {
                let rendered = serde_json::to_string_pretty(&listing).unwrap_or_default();
                blocks.push(format!(
                    "[TOOL: list_directory] Contents of {}:\n{}",
                    resolved.path.display(),
                    rendered
                ));
            }
            Err(e) => blocks.push(format!(
                "[TOOL: list_directory] Status: error: {}",
                e
            )),
        }
    }

    /// Organize is gated: a confirming utterance executes (against the
    /// pending path when one is recorded), anything else renders a preview.
    /// Returns the preview path so the caller can record the pending action.
    async fn organize_block(
        &self,
        query: &str,
        history: &[Message],
        pending: Option<&Path>,
        blocks: &mut Vec<String>,
    ) -> Option<PathBuf> {
        if is_confirmation(query) {
            let path = match pending {
                Some(p) => p.to_path_buf(),
                None => self.resolver.resolve(query, history).await.path,
            };
            match self.tools.organize_folder(&path, true).await {
                Ok(outcome) if outcome.status == OpStatus::Success => {
                    let moved = serde_json::to_string_pretty(&outcome.moved).unwrap_or_default();
                    blocks.push(format!(
                        "[TOOL: organize_execute] Successfully organized {}.\nMoved: {}",
                        path.display(),
                        moved
                    ));
                }
                Ok(outcome) => blocks.push(format!(
                    "[TOOL: organize_execute] Failed to organize {}: {}",
                    path.display(),
                    outcome.message
                )),
                Err(e) => {
                    warn!("organize failed: {}", e);
                    blocks.push(format!("[TOOL: organize_execute] Status: error: {}", e));
                }
            }
            return None;
        }

        let path = self.resolver.resolve(query, history).await.path;
        match self.tools.list_directory(&path).await {
            Ok(listing) => {
                let rendered = serde_json::to_string_pretty(&listing).unwrap_or_default();
                blocks.push(format!(
                    "[TOOL: organize_preview] Folder contents to organize in {}:\n{}",
                    path.display(),
                    rendered
                ));
                blocks.push(
                    "[INSTRUCTION: Show the user what you WOULD organize and ask for \
                     confirmation ('Yes/No') before executing.]"
                        .to_string(),
                );
                Some(path)
            }
            Err(e) => {
                blocks.push(format!("[TOOL: organize_preview] Status: error: {}", e));
                None
            }
        }
    }

    async fn read_block(&self, query: &str, blocks: &mut Vec<String>) {
        let terms = extract_search_terms(query);
        if terms.is_empty() {
            return;
        }

        let found = match self.tools.find_by_name(&terms).await {
            Ok(found) => found,
            Err(e) => {
                warn!("find_by_name failed: {}", e);
                blocks.push(format!("[TOOL: read_file] Status: error: {}", e));
                return;
            }
        };

        let Some(file) = found.into_iter().find(|p| p.is_file()) else {
            blocks.push(format!(
                "[TOOL: read_file] Status: File '{}' NOT FOUND on computer.",
                terms
            ));
            return;
        };

        match self.tools.read_file_content(&file).await {
            Ok(content) => blocks.push(format!(
                "[TOOL: read_file] Read '{}':\n{}",
                file.display(),
                content
            )),
            Err(e) => blocks.push(format!("[TOOL: read_file] Status: error: {}", e)),
        }
    }

    fn recall_block(&self, query: &str, blocks: &mut Vec<String>) {
        match self.memory.search_history(query, 10) {
            Ok(records) if !records.is_empty() => {
                let rendered = serde_json::to_string_pretty(&records).unwrap_or_default();
                blocks.push(format!(
                    "[TOOL: memory_search] Historical data found:\n{}",
                    rendered
                ));
            }
            Ok(_) => blocks.push(
                "[TOOL: memory_search] Status: No matching historical records found in memory."
                    .to_string(),
            ),
            Err(e) => {
                warn!("memory search failed: {}", e);
                blocks.push(
                    "[TOOL: memory_search] Status: Error searching memory database.".to_string(),
                );
            }
        }
    }
}
