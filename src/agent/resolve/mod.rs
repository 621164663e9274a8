//! Natural-language path resolution.
//!
//! Turns a reference like "the folder", "downloads", or "D: drive", plus
//! recent conversation history, into a concrete filesystem location. There
//! is no stored pointer to an earlier turn's target: referential utterances
//! are resolved by re-scanning raw history text most-recent-first, so the
//! scan order must be preserved exactly.

use crate::agent::gate::is_confirmation;
use crate::config::Config;
use crate::providers::Message;
use crate::tools::FileTools;
use regex::Regex;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Where a resolved path came from. Never persisted; recomputed per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    ExplicitKeyword,
    WellKnownFolder,
    HistoryBackreference,
    DefaultHome,
}

#[derive(Debug, Clone)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub provenance: Provenance,
}

/// Platform-standard user folders resolved by heuristic search.
const WELL_KNOWN_FOLDERS: &[&str] = &["desktop", "downloads", "documents"];

/// Pronouns and generic nouns that point at a previously discussed target.
const REFERENTIAL_MARKERS: &[&str] = &["it", "this", "that", "the folder", "the directory"];

/// Heuristic for "looks like a root-level folder": a path this short is
/// unlikely to be nested.
const SHORT_PATH_THRESHOLD: usize = 10;

/// Token marking a user-profile path on the filesystem-wide fallback search.
const USER_ROOT_TOKEN: &str = "Users";

/// Drive-letter absolute path, e.g. `D:\Projects\report.pdf`.
static DRIVE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]:\\[^ \n\r\t]+").unwrap());

pub struct PathResolver {
    config: Arc<Config>,
    tools: Arc<dyn FileTools>,
}

impl PathResolver {
    pub fn new(config: Arc<Config>, tools: Arc<dyn FileTools>) -> Self {
        Self { config, tools }
    }

    /// Resolve a target path for the utterance. First match wins:
    /// well-known folder in the utterance, explicit internal keyword or
    /// drive reference, history backreference (for referential or
    /// confirming utterances), then the home directory.
    pub async fn resolve(&self, utterance: &str, history: &[Message]) -> ResolvedPath {
        let lower = utterance.to_lowercase();

        // 1. Well-known folder named directly
        for folder in WELL_KNOWN_FOLDERS {
            if lower.contains(folder) {
                return ResolvedPath {
                    path: self.locate_well_known(folder).await,
                    provenance: Provenance::WellKnownFolder,
                };
            }
        }

        // 2. Internal workspace keywords and drive references
        if let Some(path) = self.explicit_keyword_path(&lower) {
            return ResolvedPath {
                path,
                provenance: Provenance::ExplicitKeyword,
            };
        }

        // 3. Referential or confirming utterance: scan history, newest first
        let referential = REFERENTIAL_MARKERS.iter().any(|m| lower.contains(m));
        if referential || (!history.is_empty() && is_confirmation(&lower)) {
            if let Some(path) = self.scan_history(history).await {
                return ResolvedPath {
                    path,
                    provenance: Provenance::HistoryBackreference,
                };
            }
        }

        // 4. Fallback
        ResolvedPath {
            path: home_dir(),
            provenance: Provenance::DefaultHome,
        }
    }

    fn explicit_keyword_path(&self, lower: &str) -> Option<PathBuf> {
        let ws = &self.config.workspace;
        if lower.contains("rfq") {
            return Some(ws.rfq_dir());
        }
        if lower.contains("inbox") {
            return Some(ws.inbox_dir());
        }
        if lower.contains("orders") {
            return Some(ws.orders_dir());
        }
        if lower.contains("workspace") {
            return Some(ws.root_path());
        }
        self.drive_reference(lower)
    }

    /// A bare drive mention ("d:", "d drive") resolved through the
    /// configured drive map.
    fn drive_reference(&self, lower: &str) -> Option<PathBuf> {
        for (letter, root) in &self.config.workspace.drives {
            if lower.contains(&format!("{}:", letter)) || lower.contains(&format!("{} drive", letter))
            {
                return Some(PathBuf::from(root));
            }
        }
        None
    }

    /// Walk history most-recent-first; the first turn yielding any match
    /// wins. Per turn: explicit drive-letter path, then a well-known folder
    /// mention, then a bare drive or workspace reference.
    async fn scan_history(&self, history: &[Message]) -> Option<PathBuf> {
        for msg in history.iter().rev() {
            if let Some(m) = DRIVE_PATH_RE.find(&msg.content) {
                debug!("history backreference: explicit path {}", m.as_str());
                return Some(PathBuf::from(m.as_str()));
            }

            let content_lower = msg.content.to_lowercase();
            for folder in WELL_KNOWN_FOLDERS {
                if content_lower.contains(folder) {
                    return Some(self.locate_well_known(folder).await);
                }
            }

            if let Some(path) = self.drive_reference(&content_lower) {
                return Some(path);
            }
            if content_lower.contains("workspace") {
                return Some(self.config.workspace.root_path());
            }
        }
        None
    }

    /// Locate a well-known user folder. Checks the profile path, then
    /// cloud-synced variants under any home sibling starting with the cloud
    /// prefix, then falls back to a filesystem-wide search for a directory
    /// with that exact name, preferring one whose path carries the user
    /// root token or is short enough to look root-level.
    pub async fn locate_well_known(&self, name: &str) -> PathBuf {
        let home = home_dir();
        let capitalized = capitalize(name);
        let cloud_prefix = &self.config.workspace.cloud_prefix;

        let mut candidates = vec![home.join(&capitalized)];
        if name != "downloads" {
            // Downloads is not cloud-synced; Desktop/Documents often are
            candidates.push(home.join(cloud_prefix).join(&capitalized));
        }
        for candidate in candidates {
            if candidate.exists() {
                return candidate;
            }
        }

        // Company-suffixed sync roots, e.g. "<prefix> - Acme"
        if name != "downloads" {
            if let Ok(entries) = std::fs::read_dir(&home) {
                for entry in entries.flatten() {
                    let dir_name = entry.file_name().to_string_lossy().to_string();
                    if dir_name.starts_with(cloud_prefix.as_str()) {
                        let synced = entry.path().join(&capitalized);
                        if synced.exists() {
                            return synced;
                        }
                    }
                }
            }
        }

        // Last resort: search everywhere for a directory with this exact name
        if let Ok(found) = self.tools.find_by_name(name).await {
            let dirs: Vec<PathBuf> = found.into_iter().filter(|p| p.is_dir()).collect();
            for dir in &dirs {
                let display = dir.display().to_string();
                if display.contains(USER_ROOT_TOKEN) || display.len() < SHORT_PATH_THRESHOLD {
                    return dir.clone();
                }
            }
            if let Some(first) = dirs.into_iter().next() {
                return first;
            }
        }

        home
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
