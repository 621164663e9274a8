//! Short-lived per-session state for previewed side effects.
//!
//! An organize preview records the resolved target here; the confirming
//! utterance in a later turn consumes it, so execution targets the exact
//! path that was previewed instead of re-deriving it from raw history text.
//! Records age out after a fixed number of turns.

use crate::agent::intent::Intent;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct PendingAction {
    pub intent: Intent,
    pub path: PathBuf,
    pub remaining_turns: u32,
}

#[derive(Default)]
pub struct SessionState {
    pending: Mutex<HashMap<String, PendingAction>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a previewed action for the session, replacing any earlier one.
    pub fn record_preview(&self, session_id: &str, intent: Intent, path: PathBuf, ttl_turns: u32) {
        let mut pending = self.lock();
        pending.insert(
            session_id.to_string(),
            PendingAction {
                intent,
                path,
                remaining_turns: ttl_turns,
            },
        );
    }

    /// Consume the pending action for this session if it matches `intent`.
    /// Consumption is per-intent: a confirmation meant for an organize never
    /// triggers a pending transfer, and vice versa.
    pub fn take_matching(&self, session_id: &str, intent: Intent) -> Option<PendingAction> {
        let mut pending = self.lock();
        match pending.get(session_id) {
            Some(action) if action.intent == intent => pending.remove(session_id),
            _ => None,
        }
    }

    /// Age the session's pending action by one turn, dropping it at zero.
    pub fn tick(&self, session_id: &str) {
        let mut pending = self.lock();
        if let Some(action) = pending.get_mut(session_id) {
            action.remaining_turns = action.remaining_turns.saturating_sub(1);
            if action.remaining_turns == 0 {
                pending.remove(session_id);
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingAction>> {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_then_take_round_trip() {
        let state = SessionState::new();
        state.record_preview("s1", Intent::Organize, PathBuf::from("/d/download"), 3);

        let action = state.take_matching("s1", Intent::Organize).unwrap();
        assert_eq!(action.path, PathBuf::from("/d/download"));
        // Consumed
        assert!(state.take_matching("s1", Intent::Organize).is_none());
    }

    #[test]
    fn take_is_scoped_per_intent() {
        let state = SessionState::new();
        state.record_preview("s1", Intent::Organize, PathBuf::from("/x"), 3);
        assert!(state.take_matching("s1", Intent::Transfer).is_none());
        // Still there for the matching intent
        assert!(state.take_matching("s1", Intent::Organize).is_some());
    }

    #[test]
    fn sessions_are_independent() {
        let state = SessionState::new();
        state.record_preview("s1", Intent::Organize, PathBuf::from("/x"), 3);
        assert!(state.take_matching("s2", Intent::Organize).is_none());
    }

    #[test]
    fn pending_expires_after_ttl_turns() {
        let state = SessionState::new();
        state.record_preview("s1", Intent::Organize, PathBuf::from("/x"), 2);
        state.tick("s1");
        assert!(state.take_matching("s1", Intent::Organize).is_some());

        state.record_preview("s1", Intent::Organize, PathBuf::from("/x"), 2);
        state.tick("s1");
        state.tick("s1");
        assert!(state.take_matching("s1", Intent::Organize).is_none());
    }

    #[test]
    fn newer_preview_replaces_older() {
        let state = SessionState::new();
        state.record_preview("s1", Intent::Organize, PathBuf::from("/old"), 3);
        state.record_preview("s1", Intent::Organize, PathBuf::from("/new"), 3);
        let action = state.take_matching("s1", Intent::Organize).unwrap();
        assert_eq!(action.path, PathBuf::from("/new"));
    }
}
