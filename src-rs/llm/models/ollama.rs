use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OllamaConfig;
use crate::cons::provider_cons::ProviderKind;
use crate::llm::models::provider_base::{ProviderError, ProviderResult, TextProvider};
use crate::llm::utils::http_util::{build_client, parse_json, send_classified};

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
}

pub(crate) fn extract_response(body: &[u8]) -> ProviderResult<String> {
    let parsed: GenerateResponse = parse_json(body)?;
    match parsed.response {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ProviderError::EmptyResponse),
    }
}

/// Client for a local Ollama server. Needs no credential.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    pub generate_url: String,
    pub model_name: String,
    pub timeout: Duration,
}

impl OllamaClient {
    pub fn from_config(config: &OllamaConfig) -> Self {
        Self {
            generate_url: config.generate_url(),
            model_name: config.model.clone(),
            timeout: config.timeout(),
        }
    }
}

impl TextProvider for OllamaClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn invoke(&self, prompt: &str, _credential: Option<&str>) -> ProviderResult<String> {
        let client = build_client(self.timeout)?;
        let request = client.post(&self.generate_url).json(&GenerateRequest {
            model: &self.model_name,
            prompt,
            stream: false,
        });

        let body = send_classified(request).await?;
        extract_response(&body)
    }
}
