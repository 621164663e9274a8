use crate::config::ProviderConfig;
use crate::errors::DeskbotError;
use crate::providers::base::{ChatProvider, Message};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Chat-completions client for DeepSeek-style (OpenAI-compatible) endpoints.
pub struct DeepSeekProvider {
    api_key: String,
    api_base: String,
    default_model: String,
    max_tokens: u32,
    temperature: f32,
    client: Client,
}

impl DeepSeekProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            default_model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client: Client::builder()
                .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn parse_response(&self, json: Value) -> Result<String> {
        let content = json["choices"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|choice| choice["message"]["content"].as_str())
            .context("No message content in chat completion response")?;
        Ok(content.to_string())
    }
}

/// Map a non-success API response to a typed provider error.
/// 429 and 5xx are transient; everything else is not worth retrying.
fn api_error(status: u16, error_text: &str) -> DeskbotError {
    let retryable = status == 429 || status == 500 || status == 502 || status == 503;

    if let Ok(error_json) = serde_json::from_str::<Value>(error_text) {
        if let Some(err) = error_json.get("error") {
            let message = err
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error");
            return DeskbotError::Provider {
                message: format!("API error ({}): {}", status, message),
                retryable,
            };
        }
    }

    DeskbotError::Provider {
        message: format!("API error ({}): {}", status, error_text),
        retryable,
    }
}

#[async_trait]
impl ChatProvider for DeepSeekProvider {
    async fn chat(&self, messages: Vec<Message>) -> Result<String> {
        let payload = json!({
            "model": self.default_model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to chat API")?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &error_text).into());
        }

        let json: Value = resp
            .json()
            .await
            .context("Failed to parse chat API response as JSON")?;
        self.parse_response(json)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}
