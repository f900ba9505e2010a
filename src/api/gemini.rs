//! Secondary provider: Gemini-style `generateContent`.

use async_trait::async_trait;

use crate::config::SecondaryConfig;
use crate::error::{ApiError, ConfigError};
use crate::types::{
    default_safety_settings, ChatResponse, Content, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, Part,
};

use super::transport::{ensure_success, join_url};
use super::CompletionProvider;

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    http: reqwest::Client,
    config: SecondaryConfig,
}

impl GeminiProvider {
    pub fn new(http: reqwest::Client, config: SecondaryConfig) -> Self {
        Self { http, config }
    }

    /// Single-turn request; context is folded into the prompt text.
    pub fn build_request(&self, prompt: &str, context: Option<&str>) -> GenerateContentRequest {
        let text = match context.filter(|c| !c.trim().is_empty()) {
            Some(context) => format!("Context: {context}\n\nUser Request: {prompt}"),
            None => prompt.to_string(),
        };
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
            },
            safety_settings: default_safety_settings(),
        }
    }

    fn endpoint(&self) -> String {
        join_url(
            &self.config.base_url,
            &format!("models/{}:generateContent", self.config.model),
        )
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "secondary"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn check_config(&self) -> Result<(), ConfigError> {
        self.config.require()
    }

    async fn complete(&self, prompt: &str, context: Option<&str>) -> Result<ChatResponse, ApiError> {
        self.check_config()?;
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&self.build_request(prompt, context))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let parsed: GenerateContentResponse = response.json().await?;
        Ok(parsed.into_chat_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_http_client;
    use crate::testsupport::{MockHttpServer, MockResponse};
    use crate::types::NO_RESPONSE_TEXT;
    use std::time::Duration;

    const PATH: &str = "/models/gemini-2.0-flash:generateContent";

    fn provider_for(server: &MockHttpServer) -> GeminiProvider {
        GeminiProvider::new(
            build_http_client(Duration::from_secs(5)),
            SecondaryConfig {
                base_url: server.base_url().to_string(),
                api_key: "gem-key".into(),
                ..SecondaryConfig::default()
            },
        )
    }

    #[test]
    fn context_is_merged_into_prompt_text() {
        let provider = GeminiProvider::new(reqwest::Client::new(), SecondaryConfig::default());
        let request = provider.build_request("Draft it", Some("Tone: warm"));
        assert_eq!(
            request.contents[0].parts[0].text,
            "Context: Tone: warm\n\nUser Request: Draft it"
        );
        let request = provider.build_request("Draft it", None);
        assert_eq!(request.contents[0].parts[0].text, "Draft it");
        assert_eq!(request.generation_config.top_k, 1);
        assert_eq!(request.generation_config.max_output_tokens, 1000);
    }

    #[test]
    fn default_endpoint_targets_flash_model() {
        let provider = GeminiProvider::new(reqwest::Client::new(), SecondaryConfig::default());
        assert_eq!(
            provider.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn complete_sends_key_as_query_param() {
        let server = MockHttpServer::start().await;
        server.respond(
            "POST",
            PATH,
            MockResponse::json(200, r#"{"candidates":[{"content":{"parts":[{"text":"Yo"}]}}]}"#),
        );
        let resp = provider_for(&server).complete("hey", None).await.unwrap();
        assert_eq!(resp.first_content(), Some("Yo"));

        let request = &server.requests()[0];
        assert_eq!(request.query("key").as_deref(), Some("gem-key"));
        assert_eq!(request.header("authorization"), None);
        assert_eq!(request.json()["contents"][0]["parts"][0]["text"], "hey");
    }

    #[tokio::test]
    async fn missing_text_becomes_placeholder() {
        let server = MockHttpServer::start().await;
        server.respond("POST", PATH, MockResponse::json(200, r#"{"candidates":[]}"#));
        let resp = provider_for(&server).complete("hey", None).await.unwrap();
        assert_eq!(resp.first_content(), Some(NO_RESPONSE_TEXT));
    }

    // Verifies transport errors never echo the `?key=` query parameter.
    #[tokio::test]
    async fn network_error_omits_api_key() {
        let provider = GeminiProvider::new(
            build_http_client(Duration::from_secs(5)),
            SecondaryConfig {
                base_url: crate::testsupport::unreachable_url("/v1beta"),
                api_key: "SUPER-SECRET-KEY".into(),
                ..SecondaryConfig::default()
            },
        );
        let err = provider.complete("hey", None).await.unwrap_err();
        assert!(err.is_network(), "got: {err:?}");
        assert!(!err.to_string().contains("SUPER-SECRET-KEY"), "got: {err}");
        assert!(!format!("{err:?}").contains("SUPER-SECRET-KEY"), "got: {err:?}");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let provider = GeminiProvider::new(reqwest::Client::new(), SecondaryConfig::default());
        match provider.complete("x", None).await {
            Err(ApiError::Config(e)) => {
                assert_eq!(e.missing_vars(), ["ALCHEMAILYST_SECONDARY_API_KEY".to_string()])
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
