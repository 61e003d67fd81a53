use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::endpoint::query_url;
use crate::api::QueryRequest;

pub const REQUEST_FAILED: &str = "Request failed";

/// A failed query. `Display` yields the text shown after `Error: `.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("{detail}")]
    Rejected {
        status: reqwest::StatusCode,
        detail: String,
    },

    #[error("{0}")]
    Decode(String),
}

#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn query(&self, prompt: &str) -> Result<String, QueryError>;
}

#[derive(Deserialize)]
struct SuccessBody {
    #[serde(default)]
    output: Value,
}

#[derive(Deserialize)]
struct FailureBody {
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn for_origin(page_origin: &str) -> Self {
        Self::new(query_url(page_origin))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn query(&self, prompt: &str) -> Result<String, QueryError> {
        let request = QueryRequest {
            prompt: prompt.to_string(),
        };

        debug!(url = %self.url, "sending query");
        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(QueryError::Rejected {
                status,
                detail: failure_detail(&body),
            });
        }

        let body = response.bytes().await?;
        let parsed: SuccessBody =
            serde_json::from_slice(&body).map_err(|e| QueryError::Decode(e.to_string()))?;
        Ok(render_output(parsed.output))
    }
}

fn render_output(output: Value) -> String {
    match output {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn failure_detail(body: &[u8]) -> String {
    serde_json::from_slice::<FailureBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail)
        .filter(|detail| !detail.is_empty())
        .unwrap_or_else(|| REQUEST_FAILED.to_string())
}
