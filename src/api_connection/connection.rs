use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::endpoints::ChatCompletionRequest;
use crate::errors::{NutriError, Result};
use crate::retry::AttemptOutcome;

const UNKNOWN_ERROR_BODY: &str = "unknown error";

/// Thin HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
/// One call is one attempt; retry lives in [`crate::retry`].
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ChatCompletionClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(NutriError::Configuration(
                "completion service API key is not configured".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            NutriError::Configuration(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub async fn send_once(&self, request: &ChatCompletionRequest) -> AttemptOutcome {
        let response = match self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return AttemptOutcome::TerminalFailure {
                    status: None,
                    body: e.to_string(),
                }
            }
        };

        let status = response.status();
        debug!(status = status.as_u16(), model = %request.model, "completion service responded");

        if status.is_success() {
            return match response.json::<Value>().await {
                Ok(body) => AttemptOutcome::Success(body),
                Err(e) => AttemptOutcome::TerminalFailure {
                    status: Some(status.as_u16()),
                    body: format!("invalid response body: {e}"),
                },
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return AttemptOutcome::RetryableFailure;
        }

        let body = error_body_or_unknown(response.text().await);
        AttemptOutcome::TerminalFailure {
            status: Some(status.as_u16()),
            body,
        }
    }
}

fn error_body_or_unknown<E>(body: std::result::Result<String, E>) -> String {
    body.unwrap_or_else(|_| UNKNOWN_ERROR_BODY.to_string())
}
