use serde_json::{json, Value};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::cons::provider_cons::ProviderKind;
use crate::llm::models::provider_base::{ProviderError, ProviderResult, TextProvider};
use crate::llm::utils::http_util::{build_client, parse_json, send_classified};

pub(crate) fn build_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{
            "parts": [{ "text": prompt }]
        }]
    })
}

/// Pulls the first candidate's first text part out of a generateContent
/// response. An `error` object in the body wins over any candidates.
pub(crate) fn extract_text(body: &Value) -> ProviderResult<String> {
    if let Some(err) = body.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        let status = err
            .get("code")
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok());
        return Err(match status {
            Some(status) => ProviderError::Api { status, body: message },
            None => ProviderError::ApiMessage(message),
        });
    }

    let text = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|t| t.as_str())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    pub base_url: String,
    pub model_name: String,
    pub timeout: Duration,
}

impl GeminiClient {
    pub fn new(base_url: String, model_name: String, timeout: Duration) -> Self {
        Self {
            base_url,
            model_name,
            timeout,
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(config.base_url.clone(), config.model.clone(), config.timeout())
    }

    // Key goes in the x-goog-api-key header, never in the URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model_name
        )
    }
}

impl TextProvider for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn invoke(&self, prompt: &str, credential: Option<&str>) -> ProviderResult<String> {
        let api_key = credential.ok_or(ProviderError::MissingCredential)?;

        let client = build_client(self.timeout)?;
        let request = client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&build_request_body(prompt));

        let body = send_classified(request).await?;
        let json: Value = parse_json(&body)?;
        extract_text(&json)
    }
}
