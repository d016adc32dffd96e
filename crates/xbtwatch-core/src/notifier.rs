//! Webhook delivery.
//!
//! Payloads follow the `value1`/`value2` convention of maker-style webhook
//! triggers. The trigger URL embeds the secret key, so it is only ever logged
//! through [`WebhookEndpoint::redacted`].

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::http_client::{HttpClient, HttpError, HttpRequest};
use crate::policy::Trigger;

/// Failure while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook transport error: {0}")]
    Transport(#[from] HttpError),
    #[error("could not encode webhook payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("notification sink unavailable: {0}")]
    Sink(String),
}

/// Two-field webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub value1: String,
    pub value2: String,
}

impl WebhookPayload {
    /// `value1` = `"<word> <threshold>"`, `value2` = `"<price>"`.
    pub fn from_trigger(trigger: &Trigger, currency_symbol: &str) -> Self {
        Self {
            value1: format!(
                "{} {}",
                trigger.direction.word(),
                trigger.threshold.format_with(currency_symbol)
            ),
            value2: trigger.price.format_with(currency_symbol),
        }
    }
}

/// `<base>/trigger/<event>/with/key/<secret>`.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookEndpoint {
    base_url: String,
    event: String,
    key: String,
}

impl WebhookEndpoint {
    pub fn new(
        base_url: impl Into<String>,
        event: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            event: event.into(),
            key: key.into(),
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}/trigger/{}/with/key/{}",
            self.base_url.trim_end_matches('/'),
            self.event,
            self.key
        )
    }

    pub fn redacted(&self) -> String {
        format!(
            "{}/trigger/{}/with/key/***",
            self.base_url.trim_end_matches('/'),
            self.event
        )
    }
}

impl std::fmt::Debug for WebhookEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookEndpoint")
            .field("url", &self.redacted())
            .finish()
    }
}

/// Outbound notification sink.
pub trait Notifier: Send + Sync {
    fn send<'a>(
        &'a self,
        payload: &'a WebhookPayload,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;
}

/// Posts payloads to a webhook trigger endpoint. No retries.
#[derive(Clone)]
pub struct WebhookNotifier {
    http_client: Arc<dyn HttpClient>,
    endpoint: WebhookEndpoint,
    timeout_ms: u64,
}

impl WebhookNotifier {
    pub fn new(http_client: Arc<dyn HttpClient>, endpoint: WebhookEndpoint) -> Self {
        Self {
            http_client,
            endpoint,
            timeout_ms: 3_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl Notifier for WebhookNotifier {
    fn send<'a>(
        &'a self,
        payload: &'a WebhookPayload,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        Box::pin(async move {
            let body = serde_json::to_string(payload)?;
            let request =
                HttpRequest::post_json(self.endpoint.url(), body).with_timeout_ms(self.timeout_ms);
            let response = self.http_client.execute(request).await?;

            // The trigger service's reply is not validated beyond transport success.
            if response.is_success() {
                info!(endpoint = %self.endpoint.redacted(), "webhook delivered");
            } else {
                warn!(
                    endpoint = %self.endpoint.redacted(),
                    status = response.status,
                    "webhook answered with non-success status"
                );
            }
            Ok(())
        })
    }
}

/// Collects payloads instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<WebhookPayload>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<WebhookPayload> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn send<'a>(
        &'a self,
        payload: &'a WebhookPayload,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>> {
        let recorded = self
            .sent
            .lock()
            .map(|mut guard| guard.push(payload.clone()))
            .map_err(|_| NotifyError::Sink(String::from("recording lock poisoned")));
        Box::pin(async move { recorded })
    }
}
