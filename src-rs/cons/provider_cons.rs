use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    HuggingFace,
    Ollama,
}

impl ProviderKind {
    /// Fallback order used by the dispatcher: cloud LLM, inference API, local model.
    pub const PRIORITY: [ProviderKind; 3] = [
        ProviderKind::Gemini,
        ProviderKind::HuggingFace,
        ProviderKind::Ollama,
    ];

    /// Returns the identifier used in configuration and logs (e.g., "gemini", "ollama")
    pub fn provider_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Helper to parse from a string (handles aliases)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "huggingface" | "hugging_face" | "hf" => Some(ProviderKind::HuggingFace),
            "ollama" | "local" => Some(ProviderKind::Ollama),
            _ => None,
        }
    }

    /// The local model server is the only provider reachable without a secret.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

// Ensure Display trait matches provider_name for convenience
impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.provider_name())
    }
}
