use super::*;
use crate::config::Config;
use crate::providers::ChatProvider;
use crate::tools::LocalFileTools;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use tempfile::TempDir;
use tower::ServiceExt;

struct EchoProvider;

#[async_trait]
impl ChatProvider for EchoProvider {
    async fn chat(&self, messages: Vec<Message>) -> anyhow::Result<String> {
        let user = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(format!("echo: {}", user))
    }

    fn default_model(&self) -> &str {
        "echo"
    }
}

fn test_state(tmp: &TempDir) -> AppState {
    let mut config = Config::default();
    config.workspace.root = tmp.path().join("ws").display().to_string();
    let config = Arc::new(config);
    let memory = Arc::new(MemoryStore::new(tmp.path().join("mem")).unwrap());
    let tools: Arc<dyn FileTools> = Arc::new(LocalFileTools::new(vec![tmp.path().to_path_buf()]));
    let provider: Arc<dyn ChatProvider> = Arc::new(EchoProvider);
    let agent = Arc::new(Agent::new(
        config,
        provider,
        tools.clone(),
        memory.clone(),
    ));
    AppState {
        agent,
        memory,
        tools,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_online() {
    let tmp = TempDir::new().unwrap();
    let router = build_router(test_state(&tmp));

    let response = router
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "online");
    assert_eq!(json["agent"], "deskbot");
}

#[tokio::test]
async fn chat_returns_reply_and_duration() {
    let tmp = TempDir::new().unwrap();
    let router = build_router(test_state(&tmp));

    let body = serde_json::json!({"query": "hello there"}).to_string();
    let response = router
        .oneshot(
            Request::post("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["reply"].as_str().unwrap().starts_with("echo:"));
    assert!(json["duration"].as_f64().is_some());
    // A session ID is minted for follow-up requests
    assert!(!json["session_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_chat_query_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let router = build_router(test_state(&tmp));

    let body =
        serde_json::json!({"query": "x".repeat(MAX_QUERY_SIZE + 1)}).to_string();
    let response = router
        .oneshot(
            Request::post("/api/chat")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn knowledge_lists_stored_facts() {
    let tmp = TempDir::new().unwrap();
    let state = test_state(&tmp);
    state.memory.append_fact("general", "User likes tidy folders").unwrap();
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/api/knowledge").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["facts"][0]["text"], "User likes tidy folders");
}

#[tokio::test]
async fn organize_endpoint_previews_by_default() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("loose");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("a.pdf"), "x").unwrap();

    let router = build_router(test_state(&tmp));
    let body = serde_json::json!({"path": target.display().to_string()}).to_string();
    let response = router
        .oneshot(
            Request::post("/api/organize")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    // Preview only; file untouched
    assert!(target.join("a.pdf").exists());
}

#[tokio::test]
async fn move_endpoint_moves_files() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("doc.txt");
    std::fs::write(&src, "content").unwrap();
    let dest = tmp.path().join("archive").join("doc.txt");

    let router = build_router(test_state(&tmp));
    let body = serde_json::json!({
        "src": src.display().to_string(),
        "dest": dest.display().to_string(),
    })
    .to_string();
    let response = router
        .oneshot(
            Request::post("/api/move")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert!(dest.exists());
    assert!(!src.exists());
}
