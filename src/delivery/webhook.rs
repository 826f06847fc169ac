//! Webhook delivery sink.
//!
//! Posts one JSON payload per group to a configured HTTP endpoint, e.g. a
//! chat service's incoming-webhook URL. The receiving side is responsible
//! for resolving participant ids to contactable identities.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DeliveryError, DeliverySink};
use crate::core::Group;

/// Webhook sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint receiving one POST per group
    pub url: String,

    /// Optional token sent as a Bearer header
    pub auth_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retry attempts per group on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("webhook URL cannot be empty".to_string());
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("webhook URL must start with http:// or https://".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Webhook delivery sink
pub struct WebhookSink {
    config: WebhookConfig,
    client: Client,
}

impl WebhookSink {
    /// Create a sink from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::InvalidConfig` for a bad configuration and
    /// `DeliveryError::Http` if the client cannot be built.
    pub fn new(config: WebhookConfig) -> Result<Self, DeliveryError> {
        config.validate().map_err(DeliveryError::InvalidConfig)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Create a sink with defaults from just a URL
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn from_url(url: impl Into<String>) -> Result<Self, DeliveryError> {
        Self::new(WebhookConfig::new(url))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn build_payload(group: &Group, message: &str) -> serde_json::Value {
        let members: Vec<&str> = group.members().iter().map(|m| m.as_str()).collect();
        serde_json::json!({
            "members": members,
            "text": message,
        })
    }

    async fn post_with_retry(&self, payload: &serde_json::Value) -> Result<(), DeliveryError> {
        let mut last_error: Option<DeliveryError> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = Duration::from_secs(2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                tracing::debug!(attempt, url = %self.config.url, "retrying webhook post");
            }

            let mut request = self.client.post(&self.config.url);
            if let Some(token) = &self.config.auth_token {
                request = request.bearer_auth(token);
            }

            match request.json(payload).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    last_error = Some(DeliveryError::Rejected {
                        status: status.as_u16(),
                        body,
                    });
                    // Client errors won't improve with retries
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(err) => last_error = Some(DeliveryError::Http(err)),
            }
        }

        Err(last_error.unwrap_or(DeliveryError::InvalidConfig("no attempts made".to_string())))
    }
}

#[async_trait]
impl DeliverySink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, group: &Group, message: &str) -> Result<(), DeliveryError> {
        let payload = Self::build_payload(group, message);
        self.post_with_retry(&payload).await
    }
}
