//! Trigger-phrase intent classification.
//!
//! Scans the lower-cased utterance for membership against six fixed keyword
//! sets, one per tool intent. Multiple intents may fire from one utterance;
//! each is handled independently and rendered into the evidence block in
//! [`Intent::ALL`] order. There is no negation handling: "don't search"
//! still fires `Search`. False positives are acceptable: the evidence block
//! is advisory context for the model, not a hard command.

/// A classified category of user request, mapped to one tool capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intent {
    Search,
    List,
    Organize,
    Read,
    Recall,
    Transfer,
}

impl Intent {
    /// Every intent, in evidence-block render order.
    pub const ALL: [Intent; 6] = [
        Intent::Search,
        Intent::List,
        Intent::Organize,
        Intent::Read,
        Intent::Recall,
        Intent::Transfer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Intent::Search => "search",
            Intent::List => "list",
            Intent::Organize => "organize",
            Intent::Read => "read",
            Intent::Recall => "recall",
            Intent::Transfer => "transfer",
        }
    }
}

/// Trigger table. Membership is substring containment on the lower-cased
/// utterance. Confirmation tokens ("yes", "proceed", "do it") sit in the
/// organize set so a bare confirmation re-fires the organize pipeline, which
/// then consults the confirmation gate and pending session state.
const TRIGGERS: &[(Intent, &[&str])] = &[
    (
        Intent::Search,
        &["find", "search", "look for", "locate", "where is", "check"],
    ),
    (
        Intent::List,
        &["list", "show folder", "what's in", "contents of", "show me"],
    ),
    (
        Intent::Organize,
        &[
            "organize", "sort", "arrange", "clean up", "tidy", "yes", "proceed", "do it",
        ],
    ),
    (
        Intent::Read,
        &["read", "open", "analyze", "extract", "summarize"],
    ),
    (
        Intent::Recall,
        &["history", "previous", "last time", "remember", "past"],
    ),
    (Intent::Transfer, &["move", "copy", "transfer"]),
];

/// Classify an utterance into the intents it triggers, in render order.
pub fn classify(utterance: &str) -> Vec<Intent> {
    let lower = utterance.to_lowercase();
    TRIGGERS
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(intent, _)| *intent)
        .collect()
}

/// Trigger phrases for one intent (exposed for tests and diagnostics).
pub fn triggers_for(intent: Intent) -> &'static [&'static str] {
    TRIGGERS
        .iter()
        .find(|(i, _)| *i == intent)
        .map_or(&[], |(_, phrases)| phrases)
}
