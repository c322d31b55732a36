use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::credentials::CredentialSource;

const USER_PATCH_FILE: &str = "apostrophe.json";

/// User override configuration (restricted fields)
#[derive(Debug, Default, Deserialize)]
pub struct UserOverrideConfig {
    pub gemini: Option<EndpointOverride>,
    #[serde(alias = "hf")]
    pub huggingface: Option<EndpointOverride>,
    pub ollama: Option<EndpointOverride>,
}

/// Endpoint fields a user may change. For Hugging Face `model` replaces the
/// text-generation model only.
#[derive(Debug, Default, Deserialize)]
pub struct EndpointOverride {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Cloud LLM (Gemini) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Versioned API root, without the `/models/...` suffix
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_gemini_env")]
    pub credential_env: String,
    #[serde(default = "default_gemini_file")]
    pub credential_file: String,
}

fn default_gemini_timeout() -> u64 {
    30
}

fn default_gemini_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_file() -> String {
    "gemini_key.txt".to_string()
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credential_source(&self) -> CredentialSource {
        CredentialSource::new(&self.credential_env, &self.credential_file)
    }
}

/// Inference API (Hugging Face) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    /// Model root; the model id is appended as a path
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub whisper_model: String,
    pub embedding_model: String,
    pub summarization_model: String,
    pub sentiment_model: String,
    pub zero_shot_model: String,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_summary_min")]
    pub summary_min_length: u32,
    #[serde(default = "default_summary_max")]
    pub summary_max_length: u32,

    #[serde(default = "default_hf_text_timeout")]
    pub text_timeout_secs: u64,
    #[serde(default = "default_hf_image_timeout")]
    pub image_timeout_secs: u64,
    #[serde(default = "default_hf_audio_timeout")]
    pub audio_timeout_secs: u64,
    #[serde(default = "default_hf_analysis_timeout")]
    pub analysis_timeout_secs: u64,

    #[serde(default = "default_hf_env")]
    pub credential_env: String,
    #[serde(default = "default_hf_file")]
    pub credential_file: String,
}

fn default_max_new_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

fn default_summary_min() -> u32 {
    30
}

fn default_summary_max() -> u32 {
    150
}

fn default_hf_text_timeout() -> u64 {
    60
}

fn default_hf_image_timeout() -> u64 {
    120
}

fn default_hf_audio_timeout() -> u64 {
    60
}

fn default_hf_analysis_timeout() -> u64 {
    30
}

fn default_hf_env() -> String {
    "HUGGINGFACE_API_KEY".to_string()
}

fn default_hf_file() -> String {
    "hf_key.txt".to_string()
}

impl HuggingFaceConfig {
    pub fn credential_source(&self) -> CredentialSource {
        CredentialSource::new(&self.credential_env, &self.credential_file)
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), model)
    }
}

/// Local model server (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_ollama_timeout")]
    pub timeout_secs: u64,
}

fn default_ollama_timeout() -> u64 {
    120
}

impl OllamaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

/// Global application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Home directory every relative path below is resolved against
    #[serde(skip)]
    pub home: PathBuf,

    /// Per-user configuration directory, relative to home
    #[serde(default = "default_config_dir")]
    pub config_dir: String,

    /// Root of stored note images, relative to home
    #[serde(default = "default_images_dir")]
    pub images_dir: String,

    /// SQLite database file, relative to home
    #[serde(default = "default_database_file")]
    pub database_file: String,

    #[serde(default)]
    pub preset_backgrounds: Vec<String>,

    pub gemini: GeminiConfig,
    pub huggingface: HuggingFaceConfig,
    pub ollama: OllamaConfig,
}

fn default_config_dir() -> String {
    ".apostrophe".to_string()
}

fn default_images_dir() -> String {
    "notes-images".to_string()
}

fn default_database_file() -> String {
    "notes.db".to_string()
}

impl AppConfig {
    /// Built-in defaults from the embedded Config.toml, rooted at `home`.
    pub fn defaults(home: &Path) -> Result<Self> {
        let default_str = include_str!("../Config.toml");
        let mut config: AppConfig =
            toml::from_str(default_str).context("Failed to parse embedded Config.toml")?;
        config.home = home.to_path_buf();
        Ok(config)
    }

    /// Load configuration with layered strategy:
    /// 1. Defaults (Embedded Config.toml)
    /// 2. User Config (~/.apostrophe/apostrophe.json) - endpoints, models and timeouts only
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("failed to determine home directory")?;
        Self::load_from(&home)
    }

    pub fn load_from(home: &Path) -> Result<Self> {
        let mut config = Self::defaults(home)?;
        let patch_path = config.config_path().join(USER_PATCH_FILE);
        Self::apply_patch(&mut config, patch_path);
        Ok(config)
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(&self.config_dir)
    }

    pub fn images_path(&self) -> PathBuf {
        self.home.join(&self.images_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.home.join(&self.database_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.config_path().join("logs").join("apostrophe.log")
    }

    pub(crate) fn apply_patch<P: AsRef<Path>>(config: &mut AppConfig, path: P) {
        let path = path.as_ref();
        if !path.exists() {
            return;
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read config patch at {}: {}", path.display(), e);
                return;
            }
        };

        let patch = match serde_json::from_str::<UserOverrideConfig>(&content) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Failed to parse config patch at {}: {}", path.display(), e);
                return;
            }
        };

        if let Some(o) = patch.gemini {
            apply_endpoint(&mut config.gemini.base_url, &mut config.gemini.model, &mut config.gemini.timeout_secs, o);
        }
        if let Some(o) = patch.huggingface {
            apply_endpoint(
                &mut config.huggingface.base_url,
                &mut config.huggingface.text_model,
                &mut config.huggingface.text_timeout_secs,
                o,
            );
        }
        if let Some(o) = patch.ollama {
            apply_endpoint(&mut config.ollama.base_url, &mut config.ollama.model, &mut config.ollama.timeout_secs, o);
        }
    }
}

fn apply_endpoint(base_url: &mut String, model: &mut String, timeout_secs: &mut u64, o: EndpointOverride) {
    if let Some(v) = non_blank(o.base_url) {
        *base_url = v;
    }
    if let Some(v) = non_blank(o.model) {
        *model = v;
    }
    if let Some(v) = o.timeout_secs.filter(|v| *v > 0) {
        *timeout_secs = v;
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
