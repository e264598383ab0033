//! Gemini text-model client.

use crate::error::{ReportError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-pro";

#[async_trait]
pub trait TextModel: Send + Sync {
    /// Free-form text completion for a prompt. An empty string is a valid
    /// completion; callers decide how to fall back.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Calling {} with {} prompt bytes", self.model, prompt.len());

        let body = serde_json::json!({
            "contents": [ { "parts": [ { "text": prompt } ] } ]
        });

        let client = reqwest::Client::new();
        let response = client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ReportError::Model(format!("model request failed: {}", e)))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ReportError::Model(format!("unreadable model response: {}", e)))?;

        if let Some(error) = payload.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown error");
            return Err(ReportError::Model(format!("model call rejected: {}", message)));
        }
        if !status.is_success() {
            return Err(ReportError::Model(format!(
                "model call failed with HTTP {}",
                status
            )));
        }

        // A response with no candidates is treated as an empty completion.
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("");
        Ok(text.to_string())
    }
}
