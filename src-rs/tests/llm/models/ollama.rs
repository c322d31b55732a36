use crate::config::OllamaConfig;
use crate::llm::models::ollama::{extract_response, OllamaClient};
use crate::llm::models::provider_base::{ProviderError, TextProvider};
use crate::tests::support::{closed_port_url, MockServer};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> OllamaClient {
        OllamaClient::from_config(&OllamaConfig {
            base_url: base_url.to_string(),
            model: "llama-test".to_string(),
            timeout_secs: 5,
        })
    }

    #[test]
    fn extract_response_field() {
        assert_eq!(extract_response(br#"{"response":"hi","done":true}"#).unwrap(), "hi");
        assert_eq!(extract_response(br#"{"response":""}"#), Err(ProviderError::EmptyResponse));
        assert_eq!(extract_response(br#"{"done":true}"#), Err(ProviderError::EmptyResponse));
        assert!(matches!(extract_response(b"not json"), Err(ProviderError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn invoke_posts_non_streaming_generate() {
        let server = MockServer::json(200, json!({"response": "local answer"})).await;
        let out = client(&format!("{}/", server.url)).invoke("prompt", None).await.unwrap();
        assert_eq!(out, "local answer");

        let request = &server.requests()[0];
        assert!(request.starts_with("POST /api/generate "));
        assert!(request.contains("\"model\":\"llama-test\""));
        assert!(request.contains("\"stream\":false"));
    }

    #[tokio::test]
    async fn closed_port_is_network_failure() {
        let err = client(&closed_port_url()).invoke("prompt", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::NetworkFailure(_)));
    }
}
