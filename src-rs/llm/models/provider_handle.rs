use crate::config::AppConfig;
use crate::cons::provider_cons::ProviderKind;

use super::gemini::GeminiClient;
use super::huggingface::HuggingFaceClient;
use super::ollama::OllamaClient;
pub use super::provider_base::{ErrorKind, ProviderError, ProviderResult, TextProvider};

pub enum AnyTextProvider {
    Gemini(GeminiClient),
    HuggingFace(HuggingFaceClient),
    Ollama(OllamaClient),
}

impl TextProvider for AnyTextProvider {
    fn kind(&self) -> ProviderKind {
        match self {
            AnyTextProvider::Gemini(c) => c.kind(),
            AnyTextProvider::HuggingFace(c) => c.kind(),
            AnyTextProvider::Ollama(c) => c.kind(),
        }
    }

    async fn invoke(&self, prompt: &str, credential: Option<&str>) -> ProviderResult<String> {
        match self {
            AnyTextProvider::Gemini(c) => c.invoke(prompt, credential).await,
            AnyTextProvider::HuggingFace(c) => c.invoke(prompt, credential).await,
            AnyTextProvider::Ollama(c) => c.invoke(prompt, credential).await,
        }
    }
}

pub fn create_provider(kind: ProviderKind, config: &AppConfig) -> AnyTextProvider {
    match kind {
        ProviderKind::Gemini => AnyTextProvider::Gemini(GeminiClient::from_config(&config.gemini)),
        ProviderKind::HuggingFace => {
            AnyTextProvider::HuggingFace(HuggingFaceClient::from_config(&config.huggingface))
        }
        ProviderKind::Ollama => AnyTextProvider::Ollama(OllamaClient::from_config(&config.ollama)),
    }
}

/// Every text provider, in fallback priority order.
pub fn create_text_providers(config: &AppConfig) -> Vec<AnyTextProvider> {
    ProviderKind::PRIORITY
        .iter()
        .map(|kind| create_provider(*kind, config))
        .collect()
}
