//! Domain Ports (Port/Adapter Pattern)
//!
//! This module defines the core abstractions (ports) that the monitoring
//! pipeline depends on. Infrastructure adapters implement these traits to
//! provide concrete implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Monitoring Pipeline                      │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                   Ports (Traits)                     │    │
//! │  │ StorageGateway │ AlertChannel │ Probes │ Inspector  │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                       │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                  Adapters (Impls)                    │    │
//! │  │ DocStoreGateway │ InMemoryStore │ Channels │ Probes │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::model::AlertRule;
use crate::error::Result;

// =============================================================================
// Storage Gateway Port
// =============================================================================

/// A key-condition filter for a table query.
///
/// `key_expression` is a conjunction of `field op :placeholder` clauses
/// joined with `AND`, the placeholders resolved through
/// `attribute_values`. This mirrors the expression grammar the rest of
/// the platform uses against its document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCondition {
    #[serde(rename = "keyExpression")]
    pub key_expression: String,
    #[serde(rename = "attributeValues")]
    pub attribute_values: HashMap<String, Value>,
}

impl QueryCondition {
    pub fn new(key_expression: impl Into<String>) -> Self {
        Self {
            key_expression: key_expression.into(),
            attribute_values: HashMap::new(),
        }
    }

    /// Bind a placeholder value. Placeholder names include the leading `:`.
    pub fn bind(mut self, placeholder: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attribute_values.insert(placeholder.into(), value.into());
        self
    }
}

/// Result of a table query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "Items")]
    pub items: Vec<Value>,
    #[serde(rename = "Count")]
    pub count: usize,
}

/// Port over the platform's key-value/document store.
///
/// All background writers in the pipeline go through this trait; query
/// API reads never do (they serve accumulated in-memory state).
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Persist one item into the named table.
    async fn put(&self, table: &str, item: Value) -> Result<()>;

    /// Query the named table with a key condition.
    async fn query(&self, table: &str, condition: QueryCondition) -> Result<QueryResult>;
}

// =============================================================================
// Table Names
// =============================================================================

/// Table names used by the pipeline, each overridable via environment
/// configuration with a documented default.
#[derive(Debug, Clone)]
pub struct TableNames {
    pub metrics: String,
    pub signals: String,
    pub proposals: String,
    pub decisions: String,
    pub outcomes: String,
    pub security_events: String,
    pub alert_rules: String,
    pub alerts: String,
    pub compliance_checks: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            metrics: "ai-investment-metrics".to_string(),
            signals: "ai-investment-signals".to_string(),
            proposals: "ai-investment-proposals".to_string(),
            decisions: "ai-investment-decisions".to_string(),
            outcomes: "ai-investment-outcomes".to_string(),
            security_events: "ai-investment-security-events".to_string(),
            alert_rules: "ai-investment-alert-rules".to_string(),
            alerts: "ai-investment-alerts".to_string(),
            compliance_checks: "ai-investment-compliance-checks".to_string(),
        }
    }
}

// =============================================================================
// Notification Channel Port
// =============================================================================

/// Port for delivering alert notifications.
///
/// One implementation per action kind; the alert engine dispatches to
/// channels through a registry keyed by [`crate::domain::model::AlertAction`].
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Channel name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Deliver a notification for a triggered rule.
    async fn notify(&self, rule: &AlertRule) -> Result<()>;
}

// =============================================================================
// Instrumentation Probe Ports
// =============================================================================

/// Network byte counters sampled by the system probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkIo {
    pub bytes_in: f64,
    pub bytes_out: f64,
}

/// Port for host-level readings (CPU, memory, disk, network).
#[async_trait]
pub trait SystemProbe: Send + Sync {
    async fn cpu_usage(&self) -> Result<f64>;
    async fn memory_usage(&self) -> Result<f64>;
    async fn disk_usage(&self) -> Result<f64>;
    async fn network_io(&self) -> Result<NetworkIo>;
}

/// Response time percentiles sampled by the performance probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseTimes {
    pub avg: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Port for request-path readings (latency, error rate, throughput).
#[async_trait]
pub trait PerformanceProbe: Send + Sync {
    async fn response_times(&self) -> Result<ResponseTimes>;
    async fn error_rate(&self) -> Result<f64>;
    async fn throughput(&self) -> Result<f64>;
}

// =============================================================================
// Compliance Inspector Port
// =============================================================================

/// Port for the boolean predicates behind the compliance categories.
///
/// Each method answers one governance question at check time; the monitor
/// turns the answers into pass/fail records synchronously. The encryption
/// predicate doubles as the security gatherer's binary encryption-status
/// metric.
#[async_trait]
pub trait ComplianceInspector: Send + Sync {
    // security
    async fn encryption_enabled(&self) -> Result<bool>;
    async fn access_controls_configured(&self) -> Result<bool>;
    async fn authentication_configured(&self) -> Result<bool>;

    // privacy
    async fn data_anonymized(&self) -> Result<bool>;
    async fn data_retention_configured(&self) -> Result<bool>;
    async fn consent_managed(&self) -> Result<bool>;

    // governance
    async fn audit_logging_configured(&self) -> Result<bool>;
    async fn change_management_configured(&self) -> Result<bool>;

    // operational
    async fn backups_configured(&self) -> Result<bool>;
    async fn monitoring_configured(&self) -> Result<bool>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_condition_builder() {
        let condition = QueryCondition::new("created_at > :timestamp")
            .bind(":timestamp", "2026-01-01T00:00:00Z");

        assert_eq!(condition.key_expression, "created_at > :timestamp");
        assert_eq!(
            condition.attribute_values.get(":timestamp"),
            Some(&Value::String("2026-01-01T00:00:00Z".to_string()))
        );
    }

    #[test]
    fn test_query_condition_wire_format() {
        let condition = QueryCondition::new("enabled = :enabled").bind(":enabled", true);
        let json = serde_json::to_string(&condition).unwrap();

        assert!(json.contains("\"keyExpression\":\"enabled = :enabled\""));
        assert!(json.contains("\":enabled\":true"));
    }

    #[test]
    fn test_query_result_wire_format() {
        let json = r#"{"Items":[{"id":"x"}],"Count":1}"#;
        let result: QueryResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.count, 1);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn test_table_names_defaults() {
        let tables = TableNames::default();

        assert_eq!(tables.metrics, "ai-investment-metrics");
        assert_eq!(tables.security_events, "ai-investment-security-events");
        assert_eq!(tables.alert_rules, "ai-investment-alert-rules");
        assert_eq!(tables.compliance_checks, "ai-investment-compliance-checks");
    }
}
