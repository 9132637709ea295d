//! Google Generative Language API client
//!
//! - Auth via `?key=API_KEY` query parameter
//! - System turns go to the top-level `system_instruction` field
//! - Roles are `"user"` / `"model"`; the prompt is the final `user` turn

use super::{ModelClient, ModelError};
use crate::chat::{Role, Turn};
use crate::config::ModelConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest slice of an error body kept in `ModelError::Api`.
const MAX_ERROR_BODY: usize = 500;

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a client from configuration.
    ///
    /// Returns `ModelError::MissingApiKey` if no key is configured.
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| ModelError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new_with_key(config, api_key)
    }

    pub fn new_with_key(config: &ModelConfig, api_key: String) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ModelError::Connection(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Build the JSON request body.
    ///
    /// History keeps its order. System turns are joined into
    /// `system_instruction`.
    fn build_request_body(&self, prompt: &str, history: &[Turn]) -> Value {
        let system: Vec<&str> = history
            .iter()
            .filter(|t| t.role == Role::System)
            .map(|t| t.text.as_str())
            .collect();

        let mut contents: Vec<Value> = history
            .iter()
            .filter_map(|t| {
                let role = match t.role {
                    Role::Human => "user",
                    Role::Assistant => "model",
                    Role::System => return None,
                };
                Some(serde_json::json!({
                    "role": role,
                    "parts": [{"text": t.text}],
                }))
            })
            .collect();
        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{"text": prompt}],
        }));

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.temperature,
                "topK": self.top_k,
                "topP": self.top_p,
                "maxOutputTokens": self.max_output_tokens,
            },
        });

        if !system.is_empty() {
            body["system_instruction"] = serde_json::json!({
                "parts": [{"text": system.join("\n\n")}]
            });
        }

        body
    }

    /// Concatenate the text parts of the first candidate.
    fn parse_response(body: &Value) -> Result<String, ModelError> {
        let candidate = body["candidates"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or(ModelError::EmptyResponse)?;

        let parts = candidate["content"]["parts"].as_array().ok_or_else(|| {
            ModelError::ParseError("missing 'parts' array in candidate content".to_string())
        })?;

        Ok(parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect())
    }

    fn map_http_error(status: reqwest::StatusCode, body_text: &str) -> ModelError {
        ModelError::Api {
            status: status.as_u16(),
            body: body_text.chars().take(MAX_ERROR_BODY).collect(),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str, history: &[Turn]) -> Result<String, ModelError> {
        let body = self.build_request_body(prompt, history);

        debug!(
            model = self.model.as_str(),
            prompt_len = prompt.len(),
            history_len = history.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Connection(e.without_url().to_string()))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| ModelError::Connection(e.without_url().to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "model API returned an error");
            return Err(Self::map_http_error(status, &body_text));
        }

        let json: Value = serde_json::from_str(&body_text)
            .map_err(|e| ModelError::ParseError(format!("invalid JSON in response: {}", e)))?;

        Self::parse_response(&json)
    }
}
