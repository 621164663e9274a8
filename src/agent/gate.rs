//! Confirmation gate for side-effecting operations.
//!
//! Organize execution and move/copy requests must not run unless the current
//! utterance itself confirms them; a prior turn's confirmation never carries
//! forward.

/// Affirmative tokens. Membership is substring containment on the
/// lower-cased utterance.
const CONFIRMATION_TOKENS: &[&str] = &["yes", "proceed", "do it", "confirm", "ok", "go ahead"];

/// True iff the utterance contains at least one affirmative token.
pub fn is_confirmation(utterance: &str) -> bool {
    let lower = utterance.to_lowercase();
    CONFIRMATION_TOKENS.iter().any(|t| lower.contains(t))
}
