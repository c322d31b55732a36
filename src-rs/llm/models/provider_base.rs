use serde::Serialize;
use thiserror::Error;

use crate::cons::provider_cons::ProviderKind;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Flat tag of a [`ProviderError`], handed to the UI alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkFailure,
    RateLimited,
    TransientUnavailable,
    ProviderError,
    EmptyResponse,
    MalformedResponse,
    MissingCredential,
    InvalidInput,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::TransientUnavailable => "transient_unavailable",
            ErrorKind::ProviderError => "provider_error",
            ErrorKind::EmptyResponse => "empty_response",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::MissingCredential => "missing_credential",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Storage => "storage",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    NetworkFailure(String),

    #[error("rate limited")]
    RateLimited,

    #[error("model loading, try again")]
    TransientUnavailable,

    #[error("API error: status {status} - {body}")]
    Api { status: u16, body: String },

    #[error("API error: {0}")]
    ApiMessage(String),

    #[error("empty response")]
    EmptyResponse,

    #[error("parse error: {0}")]
    MalformedResponse(String),

    #[error("no API key configured")]
    MissingCredential,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::NetworkFailure(_) => ErrorKind::NetworkFailure,
            ProviderError::RateLimited => ErrorKind::RateLimited,
            ProviderError::TransientUnavailable => ErrorKind::TransientUnavailable,
            ProviderError::Api { .. } | ProviderError::ApiMessage(_) => ErrorKind::ProviderError,
            ProviderError::EmptyResponse => ErrorKind::EmptyResponse,
            ProviderError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ProviderError::MissingCredential => ErrorKind::MissingCredential,
            ProviderError::InvalidInput(_) => ErrorKind::InvalidInput,
            ProviderError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// One text-completion backend. Implementations make exactly one request per
/// call and never retry; fallback across providers belongs to the dispatcher.
#[allow(async_fn_in_trait)]
pub trait TextProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn invoke(&self, prompt: &str, credential: Option<&str>) -> ProviderResult<String>;
}
