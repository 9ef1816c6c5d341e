//! Alert Engine
//!
//! Holds the active rule set and evaluates it against the latest
//! collected metrics. A breaching rule is persisted as an alert record
//! and dispatched to its configured notification channels; every channel
//! failure is independent, and a scheduling tick never propagates an
//! error.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::channels::ChannelRegistry;
use crate::domain::model::{Alert, AlertAction, AlertRule, MetricSample};
use crate::domain::ports::{QueryCondition, StorageGateway, TableNames};
use crate::telemetry;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the alert engine.
#[derive(Debug, Clone, Default)]
pub struct AlertEngineConfig {
    /// Suppress repeat notifications while a rule stays in breach.
    ///
    /// Off by default: every breaching evaluation cycle re-fires. With
    /// dedupe on, a rule notifies once and re-arms only after it
    /// evaluates to no-breach.
    pub dedupe: bool,
}

// =============================================================================
// Engine
// =============================================================================

/// Evaluates alert rules against collected samples and fires actions.
pub struct AlertEngine {
    store: Arc<dyn StorageGateway>,
    channels: ChannelRegistry,
    tables: TableNames,
    config: AlertEngineConfig,
    rules: RwLock<Vec<AlertRule>>,
    firing: DashMap<String, ()>,
}

impl AlertEngine {
    pub fn new(
        store: Arc<dyn StorageGateway>,
        channels: ChannelRegistry,
        tables: TableNames,
        config: AlertEngineConfig,
    ) -> Self {
        Self {
            store,
            channels,
            tables,
            config,
            rules: RwLock::new(Vec::new()),
            firing: DashMap::new(),
        }
    }

    /// Load enabled rules from the rule store, replacing the current set.
    ///
    /// On failure the engine falls back to an empty rule set: alerting
    /// degrades to a no-op instead of crashing the service. Reload is an
    /// explicit operation; rule changes do not propagate automatically.
    #[instrument(skip(self))]
    pub async fn load_rules(&self) {
        let condition = QueryCondition::new("enabled = :enabled").bind(":enabled", true);

        let rules = match self.store.query(&self.tables.alert_rules, condition).await {
            Ok(result) => result
                .items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<AlertRule>(item) {
                    Ok(rule) => Some(rule),
                    Err(e) => {
                        warn!("Skipping malformed alert rule: {}", e);
                        None
                    }
                })
                .collect(),
            Err(e) => {
                error!("Failed to load alert rules: {}", e);
                Vec::new()
            }
        };

        info!(rule_count = rules.len(), "Alert rules loaded");
        *self.rules.write() = rules;
    }

    /// Snapshot of the currently loaded rules.
    pub fn rules(&self) -> Vec<AlertRule> {
        self.rules.read().clone()
    }

    /// Whether the rule's condition breaches against the given samples.
    ///
    /// Matches the most recently collected sample whose name equals the
    /// rule condition; a missing condition never triggers, and the
    /// comparison is strictly greater-than, so a value exactly at the
    /// threshold does not breach.
    pub fn evaluate(&self, rule: &AlertRule, samples: &[MetricSample]) -> bool {
        let Some(sample) = samples.iter().rev().find(|s| s.name == rule.condition) else {
            return false;
        };
        sample.value > rule.threshold
    }

    /// Evaluate every loaded rule against the samples, triggering the
    /// ones in breach. Never propagates an error.
    #[instrument(skip(self, samples))]
    pub async fn check_alerts(&self, samples: &[MetricSample]) {
        let rules = self.rules();
        for rule in &rules {
            if self.evaluate(rule, samples) {
                if self.config.dedupe && self.firing.contains_key(&rule.id) {
                    debug!(rule_id = %rule.id, "Rule still in breach, notification suppressed");
                    continue;
                }
                self.trigger(rule).await;
                self.firing.insert(rule.id.clone(), ());
            } else {
                // Re-arm once the condition clears.
                self.firing.remove(&rule.id);
            }
        }
    }

    /// Persist an alert record and execute the rule's actions in order.
    /// Each action failure is caught and logged independently.
    #[instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub async fn trigger(&self, rule: &AlertRule) {
        warn!(
            alert_id = %rule.id,
            alert_name = %rule.name,
            severity = %rule.severity,
            "Alert triggered"
        );

        let alert = Alert {
            id: Uuid::new_v4().to_string(),
            alert_id: rule.id.clone(),
            alert_name: rule.name.clone(),
            severity: rule.severity,
            triggered_at: Utc::now(),
            status: "active".to_string(),
        };

        match serde_json::to_value(&alert) {
            Ok(record) => {
                if let Err(e) = self.store.put(&self.tables.alerts, record).await {
                    error!("Failed to store alert: {}", e);
                }
            }
            Err(e) => error!("Failed to encode alert: {}", e),
        }

        let severity = rule.severity.to_string();
        telemetry::ALERTS_FIRED
            .with_label_values(&[severity.as_str()])
            .inc();

        for action_id in &rule.actions {
            self.execute_action(action_id, rule).await;
        }
    }

    async fn execute_action(&self, action_id: &str, rule: &AlertRule) {
        let Some(action) = AlertAction::parse(action_id) else {
            warn!(action = %action_id, "Unknown alert action");
            return;
        };

        let Some(channel) = self.channels.get(action) else {
            warn!(action = %action, "No channel registered for action");
            return;
        };

        if let Err(e) = channel.notify(rule).await {
            error!(action = %action, "Failed to execute alert action: {}", e);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
