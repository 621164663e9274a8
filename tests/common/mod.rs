// Shared test helpers; not all items used by every test binary.
#![allow(unused)]

use async_trait::async_trait;
use deskbot::agent::Agent;
use deskbot::config::Config;
use deskbot::memory::MemoryStore;
use deskbot::providers::{ChatProvider, Message};
use deskbot::tools::{FileTools, LocalFileTools};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Scripted chat provider: returns queued responses in order and records
/// every call's message payload for inspection.
pub struct MockChatProvider {
    responses: Mutex<VecDeque<String>>,
    pub calls: Arc<Mutex<Vec<Vec<Message>>>>,
    pub fail: bool,
}

impl MockChatProvider {
    pub fn with_responses(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn chat(&self, messages: Vec<Message>) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(messages);
        if self.fail {
            anyhow::bail!("model backend unavailable");
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "Mock reply".to_string()))
    }

    fn default_model(&self) -> &str {
        "mock"
    }
}

pub struct TestHarness {
    pub tmp: TempDir,
    pub agent: Agent,
    pub memory: Arc<MemoryStore>,
    pub calls: Arc<Mutex<Vec<Vec<Message>>>>,
    pub workspace_root: std::path::PathBuf,
}

/// Agent over a tempdir workspace: the tempdir is both the search root and
/// the workspace root, so tests can place files and watch them move.
pub fn create_test_agent(provider: MockChatProvider) -> TestHarness {
    let tmp = TempDir::new().unwrap();
    let workspace_root = tmp.path().join("ws");

    let mut config = Config::default();
    config.workspace.root = workspace_root.display().to_string();
    config.workspace.search_roots = vec![tmp.path().display().to_string()];
    config.workspace.ensure_dirs().unwrap();
    let config = Arc::new(config);

    let memory = Arc::new(MemoryStore::new(config.workspace.memory_dir()).unwrap());
    let tools: Arc<dyn FileTools> =
        Arc::new(LocalFileTools::new(vec![tmp.path().to_path_buf()]));
    let calls = provider.calls.clone();
    let provider: Arc<dyn ChatProvider> = Arc::new(provider);

    let agent = Agent::new(config, provider, tools, memory.clone());

    TestHarness {
        tmp,
        agent,
        memory,
        calls,
        workspace_root,
    }
}

/// The user-turn content of the `call_index`-th recorded model call.
pub fn user_content(calls: &Arc<Mutex<Vec<Vec<Message>>>>, call_index: usize) -> String {
    let calls = calls.lock().unwrap();
    calls[call_index]
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

/// The user-turn content of the first recorded call containing `needle`.
/// Detached fact-extraction calls interleave with primary calls, so index
/// arithmetic is unreliable for multi-turn tests.
pub fn find_call_containing(
    calls: &Arc<Mutex<Vec<Vec<Message>>>>,
    needle: &str,
) -> Option<String> {
    let calls = calls.lock().unwrap();
    calls
        .iter()
        .filter_map(|messages| {
            messages
                .iter()
                .rev()
                .find(|m| m.role == "user")
                .map(|m| m.content.clone())
        })
        .find(|content| content.contains(needle))
}
