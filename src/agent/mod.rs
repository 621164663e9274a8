pub mod assemble;
pub mod evidence;
pub mod facts;
pub mod gate;
pub mod intent;
pub mod resolve;
pub mod session;

use crate::config::Config;
use crate::memory::MemoryStore;
use crate::providers::{ChatProvider, Message};
use crate::tools::FileTools;
use self::evidence::EvidenceBuilder;
use self::intent::Intent;
use self::resolve::PathResolver;
use self::session::SessionState;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Session used when the caller supplies none.
const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub query: String,
    pub history: Vec<Message>,
    pub session_id: Option<String>,
}

impl TurnRequest {
    pub fn new(query: impl Into<String>, history: Vec<Message>) -> Self {
        Self {
            query: query.into(),
            history,
            session_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnReply {
    pub reply: String,
    pub duration_seconds: f64,
}

/// The intent-routing and tool-orchestration layer.
///
/// One `handle_turn` call runs the full sequential pipeline: classify →
/// resolve/gate → build evidence → assemble prompt → model call → detached
/// fact extraction. Concurrent turns are independent and share only the
/// append-only memory store.
pub struct Agent {
    config: Arc<Config>,
    provider: Arc<dyn ChatProvider>,
    memory: Arc<MemoryStore>,
    evidence: EvidenceBuilder,
    sessions: SessionState,
}

impl Agent {
    pub fn new(
        config: Arc<Config>,
        provider: Arc<dyn ChatProvider>,
        tools: Arc<dyn FileTools>,
        memory: Arc<MemoryStore>,
    ) -> Self {
        let resolver = PathResolver::new(config.clone(), tools.clone());
        let evidence = EvidenceBuilder::new(config.clone(), tools, memory.clone(), resolver);
        Self {
            config,
            provider,
            memory,
            evidence,
            sessions: SessionState::new(),
        }
    }

    /// Handle one conversational turn. Never returns an error: every failure
    /// degrades to a textual explanation in the reply.
    pub async fn handle_turn(&self, request: TurnRequest) -> TurnReply {
        let start = Instant::now();
        let query = request.query.trim();

        if query.is_empty() {
            return TurnReply {
                reply: "Please provide a query.".to_string(),
                duration_seconds: 0.0,
            };
        }

        let session_id = request
            .session_id
            .as_deref()
            .unwrap_or(DEFAULT_SESSION)
            .to_string();

        let intents = intent::classify(query);
        debug!(
            "turn: session={}, intents=[{}]",
            session_id,
            intents.iter().map(|i| i.name()).collect::<Vec<_>>().join(", ")
        );

        // A confirmed organize consumes the session's pending preview, if any
        let pending = if intents.contains(&Intent::Organize) && gate::is_confirmation(query) {
            self.sessions.take_matching(&session_id, Intent::Organize)
        } else {
            None
        };

        let evidence = self
            .evidence
            .build(query, &request.history, &intents, pending.as_ref().map(|p| p.path.as_path()))
            .await;

        if let Some(preview_path) = evidence.organize_preview.clone() {
            self.sessions.record_preview(
                &session_id,
                Intent::Organize,
                preview_path,
                self.config.agent.pending_ttl_turns,
            );
        } else if pending.is_none() {
            self.sessions.tick(&session_id);
        }

        let facts = self
            .memory
            .recent_facts(self.config.agent.fact_limit)
            .unwrap_or_else(|e| {
                warn!("failed to load facts: {}", e);
                Vec::new()
            });

        let messages = assemble::build_messages(
            &facts,
            &request.history,
            query,
            &evidence.text,
            self.config.agent.history_window,
        );

        match self.provider.chat(messages).await {
            Ok(reply) => {
                let duration_seconds = (start.elapsed().as_secs_f64() * 100.0).round() / 100.0;

                if let Err(e) = self.memory.log_turn(query, &reply) {
                    warn!("failed to log turn: {}", e);
                }

                if query.len() > self.config.agent.min_learn_len {
                    facts::spawn_extraction(
                        self.provider.clone(),
                        self.memory.clone(),
                        query.to_string(),
                        self.config.agent.max_fact_len,
                    );
                }

                TurnReply {
                    reply,
                    duration_seconds,
                }
            }
            Err(e) => {
                error!("chat error: {}", e);
                TurnReply {
                    reply: format!("I encountered an error: {}. Please try again.", e),
                    duration_seconds: 0.0,
                }
            }
        }
    }
}
