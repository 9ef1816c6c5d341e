//! Notification Channel Adapters
//!
//! Implements the `AlertChannel` port for the supported action kinds.
//! Email and Slack delivery go through the platform notification relay,
//! which picks payloads up from the log stream; the webhook channel posts
//! directly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{info, instrument};

use crate::domain::model::{AlertAction, AlertRule};
use crate::domain::ports::AlertChannel;
use crate::error::{Error, Result};

// =============================================================================
// Email
// =============================================================================

/// Email notification channel.
#[derive(Debug, Clone, Default)]
pub struct EmailChannel;

impl EmailChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, rule: &AlertRule) -> Result<()> {
        info!(
            alert_id = %rule.id,
            alert_name = %rule.name,
            severity = %rule.severity,
            "Email alert sent"
        );
        Ok(())
    }
}

// =============================================================================
// Slack
// =============================================================================

/// Slack notification channel.
#[derive(Debug, Clone, Default)]
pub struct SlackChannel;

impl SlackChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertChannel for SlackChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn notify(&self, rule: &AlertRule) -> Result<()> {
        info!(
            alert_id = %rule.id,
            alert_name = %rule.name,
            severity = %rule.severity,
            "Slack alert sent"
        );
        Ok(())
    }
}

// =============================================================================
// Webhook
// =============================================================================

/// Webhook notification channel. Posts the triggered rule as JSON to a
/// configured endpoint.
pub struct WebhookChannel {
    endpoint: String,
    client: Client,
}

impl WebhookChannel {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    #[instrument(skip(self, rule), fields(alert_id = %rule.id))]
    async fn notify(&self, rule: &AlertRule) -> Result<()> {
        let payload = json!({
            "alertId": rule.id,
            "alertName": rule.name,
            "severity": rule.severity,
            "condition": rule.condition,
            "threshold": rule.threshold,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Notification {
                channel: "webhook".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Error::Notification {
                channel: "webhook".to_string(),
                reason: format!("endpoint returned {}", response.status()),
            });
        }

        info!(alert_id = %rule.id, alert_name = %rule.name, "Webhook alert sent");
        Ok(())
    }
}

// =============================================================================
// Channel Registry
// =============================================================================

/// Registry mapping action kinds to their channels.
///
/// Unknown action identifiers never reach the registry; the alert engine
/// filters them out before dispatch.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: HashMap<AlertAction, Arc<dyn AlertChannel>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard email/slack/webhook channels.
    pub fn standard(webhook_endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::new()
            .with_channel(AlertAction::Email, Arc::new(EmailChannel::new()))
            .with_channel(AlertAction::Slack, Arc::new(SlackChannel::new()))
            .with_channel(
                AlertAction::Webhook,
                Arc::new(WebhookChannel::new(webhook_endpoint, timeout)?),
            ))
    }

    /// Add a channel for an action kind.
    pub fn with_channel(mut self, action: AlertAction, channel: Arc<dyn AlertChannel>) -> Self {
        self.channels.insert(action, channel);
        self
    }

    /// Look up the channel for an action kind.
    pub fn get(&self, action: AlertAction) -> Option<&Arc<dyn AlertChannel>> {
        self.channels.get(&action)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channel_count", &self.channels.len())
            .finish()
    }
}

// =============================================================================
// Test Support
// =============================================================================

/// Channel that records the rules it was asked to deliver. Useful for
/// asserting dispatch order and independence in tests.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    name: &'static str,
    delivered: parking_lot::RwLock<Vec<String>>,
    fail: parking_lot::RwLock<bool>,
}

impl RecordingChannel {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            delivered: parking_lot::RwLock::new(Vec::new()),
            fail: parking_lot::RwLock::new(false),
        }
    }

    /// Make subsequent deliveries fail.
    pub fn set_failing(&self, failing: bool) {
        *self.fail.write() = failing;
    }

    /// Rule ids delivered so far, in order.
    pub fn delivered(&self) -> Vec<String> {
        self.delivered.read().clone()
    }

    pub fn len(&self) -> usize {
        self.delivered.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delivered.read().is_empty()
    }
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn notify(&self, rule: &AlertRule) -> Result<()> {
        if *self.fail.read() {
            return Err(Error::Notification {
                channel: self.name.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        self.delivered.write().push(rule.id.clone());
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
