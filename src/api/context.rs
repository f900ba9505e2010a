//! Context store on the primary API (`/v1/context/*`).

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::PrimaryConfig;
use crate::error::ApiError;

use super::transport::{build_http_client, ensure_success, join_url};

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.8;
const MINIMUM_SIMILARITY_THRESHOLD: f32 = 0.5;
const SEARCH_SCOPE: &str = "internal";

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    similarity_threshold: f32,
    minimum_similarity_threshold: f32,
    scope: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    source: &'a str,
    by_doc: bool,
    by_id: bool,
}

/// Thin client over the primary provider's context endpoints.
///
/// Responses are returned as raw JSON; an empty body becomes `Value::Null`.
#[derive(Debug, Clone)]
pub struct ContextClient {
    http: reqwest::Client,
    config: PrimaryConfig,
}

impl ContextClient {
    pub fn new(http: reqwest::Client, config: PrimaryConfig) -> Self {
        Self { http, config }
    }

    pub fn from_config(config: &PrimaryConfig, timeout: Duration) -> Self {
        Self::new(build_http_client(timeout), config.clone())
    }

    pub async fn add_context(&self, data: &Value) -> Result<Value, ApiError> {
        self.post("/v1/context/add", data).await
    }

    /// `threshold` defaults to [`DEFAULT_SIMILARITY_THRESHOLD`].
    pub async fn search_context(
        &self,
        query: &str,
        threshold: Option<f32>,
    ) -> Result<Value, ApiError> {
        let body = SearchBody {
            query,
            similarity_threshold: threshold.unwrap_or(DEFAULT_SIMILARITY_THRESHOLD),
            minimum_similarity_threshold: MINIMUM_SIMILARITY_THRESHOLD,
            scope: SEARCH_SCOPE,
        };
        self.post("/v1/context/search", &body).await
    }

    /// Delete every document added under `source`.
    pub async fn delete_context(&self, source: &str) -> Result<Value, ApiError> {
        let body = DeleteBody {
            source,
            by_doc: true,
            by_id: false,
        };
        self.post("/v1/context/delete", &body).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.config.require()?;
        let response = self
            .http
            .post(join_url(&self.config.base_url, path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;
        let text = ensure_success(response).await?.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
