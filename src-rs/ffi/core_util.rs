use napi::bindgen_prelude::*;

use crate::app::{App, ProviderStatus as RustProviderStatus};
use crate::config::AppConfig;
use crate::llm::dispatcher::DispatchError;
use crate::llm::models::huggingface::{Classification as RustClassification, Sentiment as RustSentiment};
use crate::llm::models::provider_base::ProviderError;
use crate::notes::{Note as RustNote, NoteMeta as RustNoteMeta};

/// Result of a fallback-dispatched operation. `ok == false` carries the
/// combined failure in `error`; `text` is never a failure message.
#[napi_derive::napi(object)]
pub struct AiOutcome {
    pub ok: bool,
    pub text: Option<String>,
    pub error: Option<String>,
    pub error_kind: Option<String>,
}

#[napi_derive::napi(object)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

#[napi_derive::napi(object)]
pub struct Sentiment {
    pub label: String,
    pub confidence: f64,
}

#[napi_derive::napi(object)]
pub struct ProviderStatus {
    pub gemini_configured: bool,
    pub huggingface_configured: bool,
    pub ollama_model: String,
    pub hf_text_model: String,
    pub hf_image_model: String,
    pub hf_whisper_model: String,
}

#[napi_derive::napi(object)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub icon: String,
    pub background_image: String,
    pub is_favorite: bool,
    pub updated_at_ms: i64,
}

#[napi_derive::napi(object)]
pub struct NoteMeta {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub is_favorite: bool,
}

pub fn open_app() -> Result<App> {
    let config = AppConfig::load().map_err(|e| Error::from_reason(format!("Failed to load config: {}", e)))?;
    App::open(config).map_err(|e| Error::from_reason(format!("Failed to open notes database: {}", e)))
}

pub fn to_outcome(result: std::result::Result<String, DispatchError>) -> AiOutcome {
    match result {
        Ok(text) => AiOutcome {
            ok: true,
            text: Some(text),
            error: None,
            error_kind: None,
        },
        Err(e) => AiOutcome {
            ok: false,
            text: None,
            error: Some(e.to_string()),
            error_kind: Some(e.kind().as_str().to_string()),
        },
    }
}

pub fn provider_error(e: ProviderError) -> Error {
    Error::from_reason(e.to_string())
}

pub fn storage_error(e: anyhow::Error) -> Error {
    Error::from_reason(format!("{:#}", e))
}

impl From<RustClassification> for Classification {
    fn from(c: RustClassification) -> Self {
        Self {
            labels: c.labels,
            scores: c.scores,
        }
    }
}

impl From<RustSentiment> for Sentiment {
    fn from(s: RustSentiment) -> Self {
        Self {
            label: s.label,
            confidence: s.confidence,
        }
    }
}

impl From<RustProviderStatus> for ProviderStatus {
    fn from(s: RustProviderStatus) -> Self {
        Self {
            gemini_configured: s.gemini_configured,
            huggingface_configured: s.huggingface_configured,
            ollama_model: s.ollama_model,
            hf_text_model: s.hf_text_model,
            hf_image_model: s.hf_image_model,
            hf_whisper_model: s.hf_whisper_model,
        }
    }
}

impl From<RustNote> for Note {
    fn from(n: RustNote) -> Self {
        Self {
            id: n.id,
            title: n.title,
            content: n.content,
            icon: n.icon,
            background_image: n.background_image,
            is_favorite: n.is_favorite,
            updated_at_ms: n.updated_at_ms,
        }
    }
}

impl From<RustNoteMeta> for NoteMeta {
    fn from(n: RustNoteMeta) -> Self {
        Self {
            id: n.id,
            title: n.title,
            icon: n.icon,
            is_favorite: n.is_favorite,
        }
    }
}

/// JS numbers are doubles; widen each component.
pub fn widen_embeddings(vectors: Vec<Vec<f32>>) -> Vec<Vec<f64>> {
    vectors
        .into_iter()
        .map(|v| v.into_iter().map(f64::from).collect())
        .collect()
}
