//! Application root held by the FFI class for the lifetime of the process.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::cons::provider_cons::ProviderKind;
use crate::llm::credentials::CredentialResolver;
use crate::llm::dispatcher::{DispatchError, Dispatcher};
use crate::llm::models::huggingface::{Classification, HuggingFaceClient, Sentiment};
use crate::llm::models::provider_base::{ProviderError, ProviderResult};
use crate::notes::images::file_url;
use crate::notes::{ImageStore, NoteStore};

/// Which providers can currently be used, resolved fresh on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub gemini_configured: bool,
    pub huggingface_configured: bool,
    pub ollama_model: String,
    pub hf_text_model: String,
    pub hf_image_model: String,
    pub hf_whisper_model: String,
}

pub struct App {
    config: AppConfig,
    credentials: CredentialResolver,
    dispatcher: Dispatcher,
    huggingface: HuggingFaceClient,
    notes: NoteStore,
    images: ImageStore,
}

impl App {
    pub fn open(config: AppConfig) -> Result<Self> {
        let notes = NoteStore::open(config.database_path())?;
        Ok(Self::with_store(config, notes))
    }

    pub fn with_store(config: AppConfig, notes: NoteStore) -> Self {
        log::info!(
            "Opening core: config dir {}, images {}",
            config.config_path().display(),
            config.images_path().display()
        );
        Self {
            credentials: CredentialResolver::from_config(&config),
            dispatcher: Dispatcher::from_config(&config),
            huggingface: HuggingFaceClient::from_config(&config.huggingface),
            images: ImageStore::new(config.images_path()),
            notes,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String, DispatchError> {
        self.dispatcher.generate(prompt).await
    }

    pub async fn ask_ai(&self, question: &str, context: &str) -> Result<String, DispatchError> {
        self.dispatcher.answer(question, context).await
    }

    pub async fn process_content(&self, content: &str, instruction: &str) -> Result<String, DispatchError> {
        self.dispatcher.transform(content, instruction).await
    }

    fn huggingface_key(&self) -> ProviderResult<String> {
        self.credentials
            .resolve(ProviderKind::HuggingFace)
            .ok_or(ProviderError::MissingCredential)
    }

    /// Generates a cover image and stores it as the note's `cover.png`.
    pub async fn generate_cover_image(&self, prompt: &str, note_id: &str) -> ProviderResult<String> {
        let dest = self
            .images
            .cover_path(note_id)
            .map_err(|e| ProviderError::InvalidInput(e.to_string()))?;
        let key = self.huggingface_key()?;
        let written = self.huggingface.generate_image(prompt, &key, &dest).await?;
        Ok(file_url(&written))
    }

    pub async fn transcribe_audio(&self, audio_base64: &str) -> ProviderResult<String> {
        let key = self.huggingface_key()?;
        self.huggingface.transcribe(audio_base64, &key).await
    }

    pub async fn get_embeddings(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let key = self.huggingface_key()?;
        self.huggingface.embeddings(texts, &key).await
    }

    pub async fn summarize_text(&self, text: &str) -> ProviderResult<String> {
        let key = self.huggingface_key()?;
        self.huggingface.summarize(text, &key).await
    }

    pub async fn classify_text(&self, text: &str, labels: &[String]) -> ProviderResult<Classification> {
        let key = self.huggingface_key()?;
        self.huggingface.classify(text, labels, &key).await
    }

    pub async fn analyze_sentiment(&self, text: &str) -> ProviderResult<Sentiment> {
        let key = self.huggingface_key()?;
        self.huggingface.sentiment(text, &key).await
    }

    pub fn set_gemini_api_key(&self, key: &str) -> Result<()> {
        self.credentials.persist(ProviderKind::Gemini, key)
    }

    pub fn set_hugging_face_api_key(&self, key: &str) -> Result<()> {
        self.credentials.persist(ProviderKind::HuggingFace, key)
    }

    pub fn provider_status(&self) -> ProviderStatus {
        ProviderStatus {
            gemini_configured: self.credentials.is_configured(ProviderKind::Gemini),
            huggingface_configured: self.credentials.is_configured(ProviderKind::HuggingFace),
            ollama_model: self.config.ollama.model.clone(),
            hf_text_model: self.config.huggingface.text_model.clone(),
            hf_image_model: self.config.huggingface.image_model.clone(),
            hf_whisper_model: self.config.huggingface.whisper_model.clone(),
        }
    }

    pub fn preset_backgrounds(&self) -> Vec<String> {
        self.config.preset_backgrounds.clone()
    }
}
