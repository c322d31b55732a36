use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::HuggingFaceConfig;
use crate::cons::provider_cons::ProviderKind;
use crate::llm::models::provider_base::{ProviderError, ProviderResult, TextProvider};
use crate::llm::utils::http_util::{build_client, parse_json, send_classified};
use crate::llm::utils::string_util::strip_data_uri_prefix;

/// Zero-shot result; `labels[i]` pairs with `scores[i]`, highest score first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

/// Top sentiment label only; lower-ranked labels are discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    inputs: &'a str,
    parameters: TextParams,
}

#[derive(Debug, Serialize)]
struct TextParams {
    max_new_tokens: u32,
    temperature: f64,
    return_full_text: bool,
}

#[derive(Debug, Serialize)]
struct InputsOnly<'a> {
    inputs: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    inputs: &'a [String],
    options: EmbeddingOptions,
}

#[derive(Debug, Serialize)]
struct EmbeddingOptions {
    wait_for_model: bool,
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    inputs: &'a str,
    parameters: SummarizeParams,
}

#[derive(Debug, Serialize)]
struct SummarizeParams {
    max_length: u32,
    min_length: u32,
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParams<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParams<'a> {
    candidate_labels: &'a [String],
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    #[serde(default)]
    generated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryText {
    #[serde(default)]
    summary_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Transcript {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    scores: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

// Sentiment pipelines answer `[[{label, score}, ...]]`; some deployments
// drop the outer list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SentimentResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

pub(crate) fn extract_generated_text(body: &[u8]) -> ProviderResult<String> {
    let parsed: Vec<GeneratedText> = parse_json(body)?;
    parsed
        .into_iter()
        .next()
        .and_then(|g| g.generated_text)
        .filter(|t| !t.is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

pub(crate) fn extract_summary(body: &[u8]) -> ProviderResult<String> {
    let parsed: Vec<SummaryText> = parse_json(body)?;
    parsed
        .into_iter()
        .next()
        .and_then(|s| s.summary_text)
        .filter(|t| !t.is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

pub(crate) fn extract_transcript(body: &[u8]) -> ProviderResult<String> {
    let parsed: Transcript = parse_json(body)?;
    parsed
        .text
        .filter(|t| !t.is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

/// Accepts plain base64 or a data URI and returns the raw audio bytes.
pub(crate) fn decode_audio(audio_base64: &str) -> ProviderResult<Vec<u8>> {
    let payload = strip_data_uri_prefix(audio_base64.trim());
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ProviderError::InvalidInput(format!("invalid audio data: {}", e)))?;
    if bytes.is_empty() {
        return Err(ProviderError::InvalidInput("audio data is empty".to_string()));
    }
    Ok(bytes)
}

/// One vector per input, in input order.
pub(crate) fn parse_embeddings(body: &[u8], expected: usize) -> ProviderResult<Vec<Vec<f32>>> {
    let vectors: Vec<Vec<f32>> = parse_json(body)?;
    if vectors.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    if vectors.len() != expected {
        return Err(ProviderError::MalformedResponse(format!(
            "expected {} embeddings, got {}",
            expected,
            vectors.len()
        )));
    }
    Ok(vectors)
}

pub(crate) fn parse_classification(body: &[u8]) -> ProviderResult<Classification> {
    let parsed: ZeroShotResponse = parse_json(body)?;
    if parsed.labels.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    if parsed.labels.len() != parsed.scores.len() {
        return Err(ProviderError::MalformedResponse(format!(
            "{} labels but {} scores",
            parsed.labels.len(),
            parsed.scores.len()
        )));
    }

    let mut pairs: Vec<(String, f64)> = parsed.labels.into_iter().zip(parsed.scores).collect();
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    let (labels, scores): (Vec<String>, Vec<f64>) = pairs.into_iter().unzip();
    Ok(Classification { labels, scores })
}

pub(crate) fn parse_sentiment(body: &[u8]) -> ProviderResult<Sentiment> {
    let candidates = match parse_json::<SentimentResponse>(body)? {
        SentimentResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
        SentimentResponse::Flat(flat) => flat,
    };

    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|top| Sentiment {
            label: top.label,
            confidence: top.score,
        })
        .ok_or(ProviderError::EmptyResponse)
}

/// Client for the Hugging Face inference API. Text generation takes part in
/// fallback; every other task is a single-provider operation.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    pub config: HuggingFaceConfig,
}

impl HuggingFaceClient {
    pub fn from_config(config: &HuggingFaceConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    async fn post_json<T: Serialize>(
        &self,
        model: &str,
        api_key: &str,
        timeout_secs: u64,
        payload: &T,
    ) -> ProviderResult<Vec<u8>> {
        let client = build_client(Duration::from_secs(timeout_secs))?;
        let request = client
            .post(self.config.model_url(model))
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(payload);
        send_classified(request).await
    }

    pub async fn generate_text(&self, prompt: &str, api_key: &str) -> ProviderResult<String> {
        let payload = TextRequest {
            inputs: prompt,
            parameters: TextParams {
                max_new_tokens: self.config.max_new_tokens,
                temperature: self.config.temperature,
                return_full_text: false,
            },
        };
        let body = self
            .post_json(&self.config.text_model, api_key, self.config.text_timeout_secs, &payload)
            .await?;
        extract_generated_text(&body)
    }

    /// Writes the generated image to `dest`, creating parent directories.
    pub async fn generate_image(&self, prompt: &str, api_key: &str, dest: &Path) -> ProviderResult<PathBuf> {
        let body = self
            .post_json(
                &self.config.image_model,
                api_key,
                self.config.image_timeout_secs,
                &InputsOnly { inputs: prompt },
            )
            .await?;
        if body.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ProviderError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(dest, &body)
            .await
            .map_err(|e| ProviderError::Storage(format!("{}: {}", dest.display(), e)))?;
        log::info!("Wrote generated image ({} bytes) to {}", body.len(), dest.display());
        Ok(dest.to_path_buf())
    }

    pub async fn transcribe(&self, audio_base64: &str, api_key: &str) -> ProviderResult<String> {
        let audio = decode_audio(audio_base64)?;
        let client = build_client(Duration::from_secs(self.config.audio_timeout_secs))?;
        let request = client
            .post(self.config.model_url(&self.config.whisper_model))
            .bearer_auth(api_key)
            .header("Content-Type", "audio/wav")
            .body(audio);
        let body = send_classified(request).await?;
        extract_transcript(&body)
    }

    pub async fn embeddings(&self, texts: &[String], api_key: &str) -> ProviderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let payload = EmbeddingRequest {
            inputs: texts,
            options: EmbeddingOptions { wait_for_model: true },
        };
        let body = self
            .post_json(
                &self.config.embedding_model,
                api_key,
                self.config.analysis_timeout_secs,
                &payload,
            )
            .await?;
        parse_embeddings(&body, texts.len())
    }

    pub async fn summarize(&self, text: &str, api_key: &str) -> ProviderResult<String> {
        let payload = SummarizeRequest {
            inputs: text,
            parameters: SummarizeParams {
                max_length: self.config.summary_max_length,
                min_length: self.config.summary_min_length,
            },
        };
        let body = self
            .post_json(
                &self.config.summarization_model,
                api_key,
                self.config.analysis_timeout_secs,
                &payload,
            )
            .await?;
        extract_summary(&body)
    }

    pub async fn classify(&self, text: &str, labels: &[String], api_key: &str) -> ProviderResult<Classification> {
        if labels.is_empty() {
            return Err(ProviderError::InvalidInput("no candidate labels given".to_string()));
        }
        let payload = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParams {
                candidate_labels: labels,
            },
        };
        let body = self
            .post_json(
                &self.config.zero_shot_model,
                api_key,
                self.config.analysis_timeout_secs,
                &payload,
            )
            .await?;
        parse_classification(&body)
    }

    pub async fn sentiment(&self, text: &str, api_key: &str) -> ProviderResult<Sentiment> {
        let body = self
            .post_json(
                &self.config.sentiment_model,
                api_key,
                self.config.analysis_timeout_secs,
                &InputsOnly { inputs: text },
            )
            .await?;
        parse_sentiment(&body)
    }
}

impl TextProvider for HuggingFaceClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    async fn invoke(&self, prompt: &str, credential: Option<&str>) -> ProviderResult<String> {
        let api_key = credential.ok_or(ProviderError::MissingCredential)?;
        self.generate_text(prompt, api_key).await
    }
}
