//! Primary provider: OpenAI-style `/chat/completions` behind a proxy path.

use async_trait::async_trait;

use crate::config::PrimaryConfig;
use crate::error::{ApiError, ConfigError};
use crate::types::{ChatRequest, ChatResponse, Message};

use super::transport::{ensure_success, join_url};
use super::CompletionProvider;

#[derive(Debug, Clone)]
pub struct ChatCompletionsProvider {
    http: reqwest::Client,
    config: PrimaryConfig,
}

impl ChatCompletionsProvider {
    pub fn new(http: reqwest::Client, config: PrimaryConfig) -> Self {
        Self { http, config }
    }

    /// Context (when non-empty) goes first as a system message.
    pub fn build_request(&self, prompt: &str, context: Option<&str>) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
            messages.push(Message::system(context));
        }
        messages.push(Message::user(prompt));
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        "primary"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn check_config(&self) -> Result<(), ConfigError> {
        self.config.require()
    }

    async fn complete(&self, prompt: &str, context: Option<&str>) -> Result<ChatResponse, ApiError> {
        self.check_config()?;
        let url = join_url(&self.config.base_url, &self.config.completions_path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.build_request(prompt, context))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let parsed: ChatResponse = response.json().await?;
        if parsed.first_content().is_none() {
            return Err(ApiError::InvalidResponse(
                "response did not include choices[0].message.content".to_string(),
            ));
        }
        Ok(parsed)
    }

    /// HEAD on the base URL with bearer auth.
    async fn probe(&self) -> Result<(), ApiError> {
        self.check_config()?;
        let response = self
            .http
            .head(&self.config.base_url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_http_client;
    use crate::testsupport::{MockHttpServer, MockResponse};
    use std::time::Duration;

    fn provider_for(server: &MockHttpServer) -> ChatCompletionsProvider {
        ChatCompletionsProvider::new(
            build_http_client(Duration::from_secs(5)),
            PrimaryConfig {
                base_url: server.base_url().to_string(),
                api_key: "sk-test".into(),
                ..PrimaryConfig::default()
            },
        )
    }

    #[test]
    fn context_becomes_leading_system_message() {
        let provider = ChatCompletionsProvider::new(reqwest::Client::new(), PrimaryConfig::default());
        let request = provider.build_request("write", Some("be brief"));
        assert_eq!(request.messages, vec![Message::system("be brief"), Message::user("write")]);
        assert_eq!(request.model, "alchemyst-ai/alchemyst-c1");
        assert_eq!(request.max_tokens, 1000);
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);

        let request = provider.build_request("write", Some("  "));
        assert_eq!(request.messages.len(), 1);
    }

    #[tokio::test]
    async fn complete_posts_to_proxy_path_with_bearer() {
        let server = MockHttpServer::start().await;
        server.respond(
            "POST",
            "/v1/proxy/default/chat/completions",
            MockResponse::json(200, r#"{"choices":[{"message":{"content":"Hi"}}]}"#),
        );
        let resp = provider_for(&server).complete("hello", None).await.unwrap();
        assert_eq!(resp.first_content(), Some("Hi"));

        let request = &server.requests()[0];
        assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
        let body = request.json();
        assert_eq!(body["model"], "alchemyst-ai/alchemyst-c1");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[tokio::test]
    async fn empty_choices_is_invalid_response() {
        let server = MockHttpServer::start().await;
        server.respond(
            "POST",
            "/v1/proxy/default/chat/completions",
            MockResponse::json(200, r#"{"choices":[]}"#),
        );
        let err = provider_for(&server).complete("x", None).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn unconfigured_provider_sends_nothing() {
        let provider = ChatCompletionsProvider::new(reqwest::Client::new(), PrimaryConfig::default());
        let err = provider.complete("x", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let provider = ChatCompletionsProvider::new(
            build_http_client(Duration::from_secs(5)),
            PrimaryConfig {
                base_url: crate::testsupport::unreachable_url("/"),
                api_key: "sk-test".into(),
                ..PrimaryConfig::default()
            },
        );
        let err = provider.complete("x", None).await.unwrap_err();
        assert!(err.is_network(), "got: {err:?}");
        assert_eq!(
            crate::error::Error::from(err).kind(),
            crate::error::ErrorKind::Network
        );
    }

    #[tokio::test]
    async fn probe_uses_head() {
        let server = MockHttpServer::start().await;
        server.respond("HEAD", "/", MockResponse::text(200, ""));
        provider_for(&server).probe().await.unwrap();
        assert_eq!(server.hits("HEAD", "/"), 1);
    }
}
