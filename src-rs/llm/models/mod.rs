// Provider adapters and the shared provider contract

pub mod provider_handle;
pub mod provider_base;

pub mod gemini;
pub mod huggingface;
pub mod ollama;
