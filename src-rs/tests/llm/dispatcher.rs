use crate::cons::provider_cons::ProviderKind;
use crate::llm::credentials::{CredentialResolver, CredentialSource};
use crate::llm::dispatcher::Dispatcher;
use crate::llm::models::provider_base::{ErrorKind, ProviderError, ProviderResult, TextProvider};
use crate::tests::support::{isolated_config, write_key_file, MockServer};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct ScriptedProvider {
    kind: ProviderKind,
    reply: ProviderResult<String>,
    calls: Arc<AtomicUsize>,
    seen_credential: Arc<std::sync::Mutex<Option<String>>>,
}

impl ScriptedProvider {
    fn new(kind: ProviderKind, reply: ProviderResult<String>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                kind,
                reply,
                calls: calls.clone(),
                seen_credential: Arc::new(std::sync::Mutex::new(None)),
            },
            calls,
        )
    }
}

impl TextProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn invoke(&self, _prompt: &str, credential: Option<&str>) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_credential.lock().unwrap() = credential.map(|c| c.to_string());
        self.reply.clone()
    }
}

fn resolver_with_keys(dir: &std::path::Path) -> CredentialResolver {
    std::fs::write(dir.join("g.txt"), "g-key").unwrap();
    std::fs::write(dir.join("h.txt"), "h-key").unwrap();
    CredentialResolver::new(dir)
        .with_source(ProviderKind::Gemini, CredentialSource::new("APOSTROPHE_UNSET_G", "g.txt"))
        .with_source(ProviderKind::HuggingFace, CredentialSource::new("APOSTROPHE_UNSET_H", "h.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_success_stops_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        let (gemini, gemini_calls) = ScriptedProvider::new(ProviderKind::Gemini, Ok("from gemini".into()));
        let (hf, hf_calls) = ScriptedProvider::new(ProviderKind::HuggingFace, Ok("from hf".into()));
        let (ollama, ollama_calls) = ScriptedProvider::new(ProviderKind::Ollama, Ok("from ollama".into()));
        let seen = gemini.seen_credential.clone();

        let dispatcher = Dispatcher::new(vec![gemini, hf, ollama], resolver_with_keys(dir.path()));
        let out = dispatcher.generate("hello").await.expect("should succeed");

        assert_eq!(out, "from gemini");
        assert_eq!(gemini_calls.load(Ordering::SeqCst), 1);
        assert_eq!(hf_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ollama_calls.load(Ordering::SeqCst), 0);
        assert_eq!(seen.lock().unwrap().as_deref(), Some("g-key"));
    }

    #[tokio::test]
    async fn missing_credential_skips_without_invoking() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CredentialResolver::new(dir.path())
            .with_source(ProviderKind::Gemini, CredentialSource::new("APOSTROPHE_UNSET_G2", "none.txt"));
        let (gemini, gemini_calls) = ScriptedProvider::new(ProviderKind::Gemini, Ok("never".into()));
        let (ollama, ollama_calls) = ScriptedProvider::new(ProviderKind::Ollama, Ok("local".into()));

        let dispatcher = Dispatcher::new(vec![gemini, ollama], resolver);
        assert_eq!(dispatcher.generate("hi").await.unwrap(), "local");
        assert_eq!(gemini_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ollama_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_text_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let (gemini, _) = ScriptedProvider::new(ProviderKind::Gemini, Ok("  \n".into()));
        let (ollama, _) = ScriptedProvider::new(ProviderKind::Ollama, Ok("real".into()));

        let dispatcher = Dispatcher::new(vec![gemini, ollama], resolver_with_keys(dir.path()));
        assert_eq!(dispatcher.generate("hi").await.unwrap(), "real");
    }

    #[tokio::test]
    async fn every_failure_is_recorded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (gemini, _) = ScriptedProvider::new(ProviderKind::Gemini, Err(ProviderError::RateLimited));
        let (hf, _) = ScriptedProvider::new(ProviderKind::HuggingFace, Err(ProviderError::TransientUnavailable));
        let (ollama, _) = ScriptedProvider::new(
            ProviderKind::Ollama,
            Err(ProviderError::NetworkFailure("connection refused".into())),
        );

        let dispatcher = Dispatcher::new(vec![gemini, hf, ollama], resolver_with_keys(dir.path()));
        let err = dispatcher.generate("hi").await.unwrap_err();

        let kinds: Vec<ErrorKind> = err.attempts.iter().map(|a| a.error.kind()).collect();
        assert_eq!(
            kinds,
            vec![ErrorKind::RateLimited, ErrorKind::TransientUnavailable, ErrorKind::NetworkFailure]
        );
        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert_eq!(
            err.to_string(),
            "All AI providers failed. ollama: network error: connection refused"
        );
    }

    #[tokio::test]
    async fn rate_limited_first_provider_is_not_retried() {
        let home = tempfile::tempdir().unwrap();
        let mut config = isolated_config(home.path());

        let gemini = MockServer::json(429, json!({"error": {"message": "quota"}})).await;
        let hf = MockServer::json(200, json!([{"generated_text": "from hf"}])).await;
        let ollama = MockServer::json(200, json!({"response": "from ollama"})).await;
        config.gemini.base_url = gemini.url.clone();
        config.huggingface.base_url = hf.url.clone();
        config.ollama.base_url = ollama.url.clone();
        write_key_file(&config, &config.gemini.credential_file, "g-key");
        write_key_file(&config, &config.huggingface.credential_file, "h-key");

        let dispatcher = Dispatcher::from_config(&config);
        let out = dispatcher.generate("hello").await.expect("second provider answers");

        assert_eq!(out, "from hf");
        assert_eq!(gemini.hits(), 1);
        assert_eq!(hf.hits(), 1);
        assert_eq!(ollama.hits(), 0);
        assert!(hf.requests()[0].contains("Bearer h-key"));
    }

    #[tokio::test]
    async fn local_model_answers_when_nothing_is_configured() {
        let home = tempfile::tempdir().unwrap();
        let mut config = isolated_config(home.path());
        // Output that merely looks like a failure is still a success.
        let ollama = MockServer::json(200, json!({"response": "Error: is just a word here"})).await;
        config.ollama.base_url = ollama.url.clone();

        let dispatcher = Dispatcher::from_config(&config);
        let out = dispatcher.generate("hello").await.expect("ollama answers");

        assert_eq!(out, "Error: is just a word here");
        assert_eq!(ollama.hits(), 1);
        assert!(ollama.requests()[0].contains("\"stream\":false"));
    }

    #[tokio::test]
    async fn unreachable_cloud_provider_falls_back_to_local() {
        let home = tempfile::tempdir().unwrap();
        let mut config = isolated_config(home.path());
        let ollama = MockServer::json(200, json!({"response": "local text"})).await;
        config.ollama.base_url = ollama.url.clone();
        write_key_file(&config, &config.gemini.credential_file, "g-key");

        let dispatcher = Dispatcher::from_config(&config);
        assert_eq!(dispatcher.generate("hello").await.unwrap(), "local text");
    }

    #[tokio::test]
    async fn unreachable_gemini_keeps_key_out_of_attempts() {
        let home = tempfile::tempdir().unwrap();
        let config = isolated_config(home.path());
        write_key_file(&config, &config.gemini.credential_file, "SECRET-GEMINI-KEY");

        let err = Dispatcher::from_config(&config).generate("hi").await.unwrap_err();
        assert_eq!(err.attempts[0].provider, ProviderKind::Gemini);
        assert_eq!(err.attempts[0].error.kind(), ErrorKind::NetworkFailure);
        for attempt in &err.attempts {
            assert!(!attempt.error.to_string().contains("SECRET-GEMINI-KEY"));
        }
        assert!(!err.to_string().contains("SECRET-GEMINI-KEY"));
    }

    #[tokio::test]
    async fn all_unreachable_reports_combined_failure() {
        let home = tempfile::tempdir().unwrap();
        let config = isolated_config(home.path());

        let dispatcher = Dispatcher::from_config(&config);
        let err = dispatcher.generate("hello").await.unwrap_err();

        assert!(err.to_string().starts_with("All AI providers failed."));
        let kinds: Vec<ErrorKind> = err.attempts.iter().map(|a| a.error.kind()).collect();
        assert_eq!(
            kinds,
            vec![ErrorKind::MissingCredential, ErrorKind::MissingCredential, ErrorKind::NetworkFailure]
        );
    }

    #[tokio::test]
    async fn answer_and_transform_wrap_the_prompt() {
        let home = tempfile::tempdir().unwrap();
        let mut config = isolated_config(home.path());
        let ollama = MockServer::json(200, json!({"response": "ok"})).await;
        config.ollama.base_url = ollama.url.clone();
        let dispatcher = Dispatcher::from_config(&config);

        dispatcher.answer("what color?", "the sky is blue").await.unwrap();
        dispatcher.transform("some text", "Make it shorter").await.unwrap();

        let requests = ollama.requests();
        assert!(requests[0].contains("Question: what color?"));
        assert!(requests[0].contains("the sky is blue"));
        assert!(requests[1].contains("Make it shorter\\n\\nContent:\\nsome text"));
    }

    #[test]
    fn provider_order_is_fixed() {
        let home = tempfile::tempdir().unwrap();
        let dispatcher = Dispatcher::from_config(&isolated_config(home.path()));
        assert_eq!(
            dispatcher.provider_order(),
            vec![ProviderKind::Gemini, ProviderKind::HuggingFace, ProviderKind::Ollama]
        );
    }
}
