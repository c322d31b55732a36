use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::sync::Arc;

use crate::app::App;

use super::core_util::{
    self, AiOutcome, Classification, Note, NoteMeta, ProviderStatus, Sentiment,
};

#[napi]
pub struct NoteCore {
    inner: Arc<App>,
}

#[napi]
impl NoteCore {
    #[napi(factory)]
    pub fn open() -> Result<Self> {
        crate::init_logger();
        let app = core_util::open_app()?;
        Ok(Self { inner: Arc::new(app) })
    }

    #[napi]
    pub async fn generate_content(&self, prompt: String) -> Result<AiOutcome> {
        Ok(core_util::to_outcome(self.inner.generate_content(&prompt).await))
    }

    #[napi]
    pub async fn ask_ai(&self, question: String, context: String) -> Result<AiOutcome> {
        Ok(core_util::to_outcome(self.inner.ask_ai(&question, &context).await))
    }

    #[napi]
    pub async fn process_content(&self, content: String, instruction: String) -> Result<AiOutcome> {
        Ok(core_util::to_outcome(
            self.inner.process_content(&content, &instruction).await,
        ))
    }

    #[napi]
    pub async fn generate_cover_image(&self, prompt: String, note_id: String) -> Result<String> {
        self.inner
            .generate_cover_image(&prompt, &note_id)
            .await
            .map_err(core_util::provider_error)
    }

    #[napi]
    pub async fn transcribe_audio(&self, audio_base64: String) -> Result<String> {
        self.inner
            .transcribe_audio(&audio_base64)
            .await
            .map_err(core_util::provider_error)
    }

    #[napi]
    pub async fn get_embeddings(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        let vectors = self
            .inner
            .get_embeddings(&texts)
            .await
            .map_err(core_util::provider_error)?;
        Ok(core_util::widen_embeddings(vectors))
    }

    #[napi]
    pub async fn summarize_text(&self, text: String) -> Result<String> {
        self.inner
            .summarize_text(&text)
            .await
            .map_err(core_util::provider_error)
    }

    #[napi]
    pub async fn classify_text(&self, text: String, labels: Vec<String>) -> Result<Classification> {
        self.inner
            .classify_text(&text, &labels)
            .await
            .map(Classification::from)
            .map_err(core_util::provider_error)
    }

    #[napi]
    pub async fn analyze_sentiment(&self, text: String) -> Result<Sentiment> {
        self.inner
            .analyze_sentiment(&text)
            .await
            .map(Sentiment::from)
            .map_err(core_util::provider_error)
    }

    #[napi]
    pub fn set_gemini_api_key(&self, key: String) -> Result<()> {
        self.inner
            .set_gemini_api_key(&key)
            .map_err(core_util::storage_error)
    }

    #[napi]
    pub fn set_hugging_face_api_key(&self, key: String) -> Result<()> {
        self.inner
            .set_hugging_face_api_key(&key)
            .map_err(core_util::storage_error)
    }

    #[napi]
    pub fn get_ai_provider(&self) -> ProviderStatus {
        self.inner.provider_status().into()
    }

    #[napi]
    pub fn save_image(&self, note_id: String, base64_data: String, filename: String) -> Result<String> {
        self.inner
            .images()
            .save_base64(&note_id, &base64_data, &filename)
            .map_err(core_util::storage_error)
    }

    #[napi]
    pub fn get_preset_backgrounds(&self) -> Vec<String> {
        self.inner.preset_backgrounds()
    }

    #[napi]
    pub fn save_note(&self, id: String, title: String, content: String) -> Result<()> {
        self.inner
            .notes()
            .save_note(&id, &title, &content)
            .map_err(core_util::storage_error)
    }

    #[napi]
    pub fn load_note(&self, id: String) -> Result<Option<Note>> {
        let note = self.inner.notes().load_note(&id).map_err(core_util::storage_error)?;
        Ok(note.map(Note::from))
    }

    #[napi]
    pub fn list_notes(&self) -> Result<Vec<NoteMeta>> {
        let notes = self.inner.notes().list_notes().map_err(core_util::storage_error)?;
        Ok(notes.into_iter().map(NoteMeta::from).collect())
    }

    #[napi]
    pub fn set_note_background(&self, id: String, background_image: String) -> Result<()> {
        self.inner
            .notes()
            .set_background(&id, &background_image)
            .map_err(core_util::storage_error)
    }

    #[napi]
    pub fn set_note_icon(&self, id: String, icon: String) -> Result<()> {
        self.inner
            .notes()
            .set_icon(&id, &icon)
            .map_err(core_util::storage_error)
    }

    #[napi]
    pub fn toggle_favorite(&self, id: String) -> Result<()> {
        self.inner
            .notes()
            .toggle_favorite(&id)
            .map_err(core_util::storage_error)
    }

    #[napi]
    pub fn delete_note(&self, id: String) -> Result<()> {
        self.inner
            .notes()
            .delete_note(&id)
            .map_err(core_util::storage_error)
    }
}
