use crate::llm::models::gemini::{build_request_body, extract_text, GeminiClient};
use crate::llm::models::provider_base::{ErrorKind, ProviderError, TextProvider};
use crate::tests::support::{closed_port_url, MockServer};
use serde_json::json;
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_nests_prompt_in_parts() {
        let body = build_request_body("hi");
        assert_eq!(body.pointer("/contents/0/parts/0/text").and_then(|v| v.as_str()), Some("hi"));
    }

    #[test]
    fn extract_text_reads_first_candidate() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "first" }, { "text": "ignored" }] } },
                { "content": { "parts": [{ "text": "second" }] } }
            ]
        });
        assert_eq!(extract_text(&body).unwrap(), "first");
    }

    #[test]
    fn extract_text_without_candidates_is_empty() {
        assert_eq!(extract_text(&json!({"candidates": []})), Err(ProviderError::EmptyResponse));
        assert_eq!(extract_text(&json!({})), Err(ProviderError::EmptyResponse));
    }

    #[test]
    fn error_object_in_body_is_provider_error() {
        let body = json!({"error": {"code": 400, "message": "API key not valid"}});
        assert_eq!(
            extract_text(&body),
            Err(ProviderError::Api {
                status: 400,
                body: "API key not valid".to_string()
            })
        );
    }

    #[test]
    fn error_object_without_code_has_no_status() {
        let body = json!({"error": {"message": "quota exhausted"}});
        let err = extract_text(&body).unwrap_err();
        assert_eq!(err, ProviderError::ApiMessage("quota exhausted".to_string()));
        assert_eq!(err.kind(), ErrorKind::ProviderError);
        assert_eq!(err.to_string(), "API error: quota exhausted");
    }

    #[tokio::test]
    async fn unreachable_endpoint_error_omits_key() {
        let client = GeminiClient::new(closed_port_url(), "m".into(), Duration::from_secs(5));
        let err = client.invoke("hello", Some("SECRET-GEMINI-KEY")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert!(!err.to_string().contains("SECRET-GEMINI-KEY"));
        assert!(!err.to_string().contains("generateContent"));
    }

    #[tokio::test]
    async fn invoke_posts_to_generate_content_with_key() {
        let server = MockServer::json(
            200,
            json!({"candidates": [{"content": {"parts": [{"text": "hello back"}]}}]}),
        )
        .await;
        let client = GeminiClient::new(server.url.clone(), "gemini-test".into(), Duration::from_secs(5));

        let out = client.invoke("hello", Some("k123")).await.unwrap();
        assert_eq!(out, "hello back");

        let request = &server.requests()[0];
        assert!(request.starts_with("POST /models/gemini-test:generateContent "));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: k123"));
        assert!(request.contains("\"contents\""));
    }

    #[tokio::test]
    async fn invoke_without_key_never_hits_network() {
        let server = MockServer::json(200, json!({})).await;
        let client = GeminiClient::new(server.url.clone(), "m".into(), Duration::from_secs(5));
        assert_eq!(client.invoke("hello", None).await, Err(ProviderError::MissingCredential));
        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let server = MockServer::start(200, "text/html", "<html>oops</html>").await;
        let client = GeminiClient::new(server.url.clone(), "m".into(), Duration::from_secs(5));
        let err = client.invoke("hello", Some("k")).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
