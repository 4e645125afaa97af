use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::api_connection::connection::ChatCompletionClient;
use crate::api_connection::endpoints::{ChatCompletionRequest, ChatMessage, CompletionOptions};
use crate::config::GatewaySettings;
use crate::errors::{NutriError, Result};
use crate::retry::{run_with_retry, RetryPolicy, Sleeper, TokioSleeper};

/// Delivers chat-completion requests with bounded backoff on rate limiting.
///
/// Stateless between calls: every `complete` is an independent transaction and
/// may run concurrently with others.
pub struct CompletionGateway {
    client: ChatCompletionClient,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    chat_model: String,
    analyzer_model: String,
}

impl CompletionGateway {
    /// Fails with [`NutriError::Configuration`] when no API key is configured.
    pub fn new(settings: &GatewaySettings) -> Result<Self> {
        Self::with_sleeper(settings, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(settings: &GatewaySettings, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        let api_key = settings.api_key.as_deref().ok_or_else(|| {
            NutriError::Configuration("completion service API key is not configured".to_string())
        })?;
        let client = ChatCompletionClient::new(&settings.base_url, api_key, settings.request_timeout)?;

        Ok(Self {
            client,
            policy: RetryPolicy::default(),
            sleeper,
            chat_model: settings.chat_model.clone(),
            analyzer_model: settings.analyzer_model.clone(),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn analyzer_model(&self) -> &str {
        &self.analyzer_model
    }

    /// Relays a conversation with the fixed relay parameters and returns the
    /// upstream body unmodified.
    pub async fn relay(&self, messages: Vec<ChatMessage>) -> Result<Value> {
        let options = CompletionOptions::relay(self.chat_model.clone());
        self.complete(messages, &options).await
    }

    #[instrument(skip_all, fields(model = %options.model, messages = messages.len()))]
    pub async fn complete(&self, messages: Vec<ChatMessage>, options: &CompletionOptions) -> Result<Value> {
        if messages.is_empty() {
            return Err(NutriError::InvalidInput(
                "at least one message is required".to_string(),
            ));
        }

        let request = ChatCompletionRequest::new(messages, options);
        let body = run_with_retry(&self.policy, self.sleeper.as_ref(), |_| {
            self.client.send_once(&request)
        })
        .await?;

        info!("completion request succeeded");
        Ok(body)
    }
}
