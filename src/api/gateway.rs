//! Primary-then-secondary completion gateway.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AiError, ApiError, ConfigError};
use crate::events::{EventSink, GatewayEvent, TracingSink};
use crate::types::ChatResponse;

use super::transport::build_http_client;
use super::{ChatCompletionsProvider, CompletionProvider, GeminiProvider};

/// Gateway readiness as reported to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigStatus {
    /// Primary provider has everything it needs.
    pub configured: bool,
    pub missing_vars: Vec<String>,
    /// A secondary provider key is present.
    pub has_fallback: bool,
}

/// Outcome of a connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionProbe {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionProbe {
    fn from_result(result: Result<(), ApiError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                error: None,
            },
            Err(err) => Self {
                success: false,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Sends each prompt to the primary provider and, on any failure, exactly
/// once to the secondary.
pub struct AiGateway {
    primary: Arc<dyn CompletionProvider>,
    secondary: Arc<dyn CompletionProvider>,
    events: Arc<dyn EventSink>,
}

impl AiGateway {
    pub fn new(
        primary: Arc<dyn CompletionProvider>,
        secondary: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            primary,
            secondary,
            events: Arc::new(TracingSink),
        }
    }

    /// Both providers share one HTTP client built from `network.timeout_secs`.
    pub fn from_config(config: &Config) -> Self {
        let http = build_http_client(Duration::from_secs(config.network.timeout_secs));
        Self::new(
            Arc::new(ChatCompletionsProvider::new(
                http.clone(),
                config.primary.clone(),
            )),
            Arc::new(GeminiProvider::new(http, config.secondary.clone())),
        )
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Generated text for `prompt`.
    pub async fn generate(&self, prompt: &str, context: Option<&str>) -> Result<String, AiError> {
        let response = self.generate_completion(prompt, context).await?;
        Ok(response.first_content().unwrap_or_default().to_string())
    }

    /// Normalized response for `prompt`.
    ///
    /// The primary failure is swallowed when the secondary succeeds. When
    /// neither provider is configured, fails with `AiError::Config` and sends
    /// nothing.
    pub async fn generate_completion(
        &self,
        prompt: &str,
        context: Option<&str>,
    ) -> Result<ChatResponse, AiError> {
        let primary_err = match self.try_primary(prompt, context).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if let Err(secondary_cfg) = self.secondary.check_config() {
            self.emit(GatewayEvent::FallbackSkipped {
                reason: secondary_cfg.to_string(),
            });
            if let ApiError::Config(primary_cfg) = primary_err {
                let mut vars = primary_cfg.missing_vars().to_vec();
                vars.extend_from_slice(secondary_cfg.missing_vars());
                return Err(AiError::Config(ConfigError::Missing(vars)));
            }
            return Err(AiError::Unavailable {
                primary: primary_err.to_string(),
                secondary: secondary_cfg.to_string(),
            });
        }

        self.emit(GatewayEvent::FallbackAttempt {
            model: self.secondary.model().to_string(),
        });
        match self.secondary.complete(prompt, context).await {
            Ok(response) => {
                self.emit(GatewayEvent::FallbackSucceeded);
                Ok(response)
            }
            Err(err) => {
                self.emit(GatewayEvent::FallbackFailed {
                    message: err.to_string(),
                });
                Err(AiError::Unavailable {
                    primary: primary_err.to_string(),
                    secondary: err.to_string(),
                })
            }
        }
    }

    async fn try_primary(
        &self,
        prompt: &str,
        context: Option<&str>,
    ) -> Result<ChatResponse, ApiError> {
        let result = match self.primary.check_config() {
            Err(err) => Err(ApiError::Config(err)),
            Ok(()) => {
                self.emit(GatewayEvent::PrimaryAttempt {
                    model: self.primary.model().to_string(),
                });
                self.primary.complete(prompt, context).await
            }
        };
        // Providers other than the built-in ones may return an empty shape.
        let result = result.and_then(|response| match response.first_content() {
            Some(_) => Ok(response),
            None => Err(ApiError::InvalidResponse(
                "response did not include choices[0].message.content".to_string(),
            )),
        });
        match &result {
            Ok(_) => self.emit(GatewayEvent::PrimarySucceeded),
            Err(err) => self.emit(GatewayEvent::PrimaryFailed {
                message: err.to_string(),
            }),
        }
        result
    }

    /// Which settings the primary is missing and whether a fallback exists.
    pub fn config_status(&self) -> ConfigStatus {
        let primary = self.primary.check_config();
        ConfigStatus {
            configured: primary.is_ok(),
            missing_vars: primary
                .err()
                .map(|e| e.missing_vars().to_vec())
                .unwrap_or_default(),
            has_fallback: self.secondary.check_config().is_ok(),
        }
    }

    /// Reachability of the primary provider.
    pub async fn test_connection(&self) -> ConnectionProbe {
        ConnectionProbe::from_result(self.primary.probe().await)
    }

    /// Reachability of the secondary provider. No request without a key.
    pub async fn test_fallback(&self) -> ConnectionProbe {
        ConnectionProbe::from_result(self.secondary.probe().await)
    }

    fn emit(&self, event: GatewayEvent) {
        self.events.emit(event.into());
    }
}
