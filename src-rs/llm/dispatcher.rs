//! Ordered multi-provider text generation.
//!
//! Providers are tried strictly one after another in priority order. The first
//! non-empty success ends the walk; a provider whose credential is missing is
//! skipped without any network call. When every provider has failed the
//! caller gets a [`DispatchError`] holding each attempt.

use crate::config::AppConfig;
use crate::cons::provider_cons::ProviderKind;
use crate::llm::credentials::CredentialResolver;
use crate::llm::models::provider_handle::{create_text_providers, AnyTextProvider};
use crate::llm::models::provider_base::{ErrorKind, ProviderError, TextProvider};
use crate::llm::prompts;
use crate::llm::utils::string_util::prompt_preview;

#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub provider: ProviderKind,
    pub error: ProviderError,
}

/// Every provider failed or was skipped. Attempts are in the order tried.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchError {
    pub attempts: Vec<Attempt>,
}

impl DispatchError {
    pub fn last(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    /// Kind of the final provider's failure.
    pub fn kind(&self) -> ErrorKind {
        self.last()
            .map(|a| a.error.kind())
            .unwrap_or(ErrorKind::MissingCredential)
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.last() {
            Some(a) => write!(f, "All AI providers failed. {}: {}", a.provider, a.error),
            None => write!(f, "All AI providers failed. no providers configured"),
        }
    }
}

impl std::error::Error for DispatchError {}

pub struct Dispatcher<P: TextProvider = AnyTextProvider> {
    providers: Vec<P>,
    credentials: CredentialResolver,
}

impl Dispatcher<AnyTextProvider> {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(create_text_providers(config), CredentialResolver::from_config(config))
    }
}

impl<P: TextProvider> Dispatcher<P> {
    pub fn new(providers: Vec<P>, credentials: CredentialResolver) -> Self {
        Self {
            providers,
            credentials,
        }
    }

    pub fn provider_order(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, DispatchError> {
        log::info!("Dispatching prompt: {}", prompt_preview(prompt));
        let mut attempts = Vec::new();

        for provider in &self.providers {
            let kind = provider.kind();

            let credential = if kind.requires_credential() {
                match self.credentials.resolve(kind) {
                    Some(c) => Some(c),
                    None => {
                        log::debug!("Skipping {}: no credential configured", kind);
                        attempts.push(Attempt {
                            provider: kind,
                            error: ProviderError::MissingCredential,
                        });
                        continue;
                    }
                }
            } else {
                None
            };

            log::info!("Trying provider {}", kind);
            match provider.invoke(prompt, credential.as_deref()).await {
                Ok(text) if !text.trim().is_empty() => {
                    log::info!("Provider {} succeeded ({} bytes)", kind, text.len());
                    return Ok(text);
                }
                Ok(_) => {
                    log::warn!("Provider {} returned blank text", kind);
                    attempts.push(Attempt {
                        provider: kind,
                        error: ProviderError::EmptyResponse,
                    });
                }
                Err(error) => {
                    log::warn!("Provider {} failed ({}): {}", kind, error.kind(), error);
                    attempts.push(Attempt { provider: kind, error });
                }
            }
        }

        let err = DispatchError { attempts };
        log::error!("{}", err);
        Err(err)
    }

    pub async fn answer(&self, question: &str, context: &str) -> Result<String, DispatchError> {
        self.generate(&prompts::answer_with_context(question, context)).await
    }

    pub async fn transform(&self, text: &str, instruction: &str) -> Result<String, DispatchError> {
        self.generate(&prompts::transform_with_instruction(text, instruction)).await
    }
}
