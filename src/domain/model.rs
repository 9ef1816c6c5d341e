//! Core Data Model
//!
//! Value types shared across the collection, alerting, and compliance
//! pipelines. All of these serialize to the wire/storage format used by
//! the rest of the platform, so the serde field names are part of the
//! contract.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Metric Samples
// =============================================================================

/// Unit of measure attached to a metric sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Percent,
    Bytes,
    Count,
    Milliseconds,
    #[serde(rename = "Count/Second")]
    CountPerSecond,
}

impl std::fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricUnit::Percent => write!(f, "Percent"),
            MetricUnit::Bytes => write!(f, "Bytes"),
            MetricUnit::Count => write!(f, "Count"),
            MetricUnit::Milliseconds => write!(f, "Milliseconds"),
            MetricUnit::CountPerSecond => write!(f, "Count/Second"),
        }
    }
}

/// A single metric observation.
///
/// Immutable once created. The namespace groups samples for downstream
/// routing; repeated names across collection cycles form a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub unit: MetricUnit,
    pub timestamp: DateTime<Utc>,
    pub dimensions: BTreeMap<String, String>,
    pub namespace: String,
}

impl MetricSample {
    /// Create a sample carrying only the standard `Service` dimension.
    pub fn new(
        name: impl Into<String>,
        value: f64,
        unit: MetricUnit,
        namespace: impl Into<String>,
        service: &str,
    ) -> Self {
        let mut dimensions = BTreeMap::new();
        dimensions.insert("Service".to_string(), service.to_string());
        Self {
            name: name.into(),
            value,
            unit,
            timestamp: Utc::now(),
            dimensions,
            namespace: namespace.into(),
        }
    }

    /// Add an extra dimension, keeping existing ones.
    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Log Records
// =============================================================================

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Debug => write!(f, "debug"),
        }
    }
}

/// A structured log record accumulated by the service and exposed
/// verbatim through the query API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub module: String,
    #[serde(rename = "costTokens", skip_serializing_if = "Option::is_none")]
    pub cost_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// =============================================================================
// Alerting
// =============================================================================

/// Alert rule severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "low"),
            AlertSeverity::Medium => write!(f, "medium"),
            AlertSeverity::High => write!(f, "high"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// A notification action kind.
///
/// Stored rules carry action identifiers as free-form strings; parsing
/// happens at dispatch time so an unrecognized identifier degrades to a
/// logged no-op instead of failing rule deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertAction {
    Email,
    Slack,
    Webhook,
}

impl AlertAction {
    /// Parse a stored action identifier. Returns `None` for unknown kinds.
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "email" => Some(AlertAction::Email),
            "slack" => Some(AlertAction::Slack),
            "webhook" => Some(AlertAction::Webhook),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertAction::Email => write!(f, "email"),
            AlertAction::Slack => write!(f, "slack"),
            AlertAction::Webhook => write!(f, "webhook"),
        }
    }
}

/// An alert rule as loaded from the rule store.
///
/// `condition` names the metric the rule watches; the rule breaches when
/// the latest sample with that name is strictly greater than `threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub condition: String,
    pub threshold: f64,
    pub severity: AlertSeverity,
    pub enabled: bool,
    pub actions: Vec<String>,
}

/// A persisted record of a triggered alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "alertId")]
    pub alert_id: String,
    #[serde(rename = "alertName")]
    pub alert_name: String,
    pub severity: AlertSeverity,
    #[serde(rename = "triggeredAt")]
    pub triggered_at: DateTime<Utc>,
    pub status: String,
}

// =============================================================================
// Compliance
// =============================================================================

/// Outcome of a single compliance predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Pass,
    Fail,
    Warning,
}

/// Category a compliance check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceCategory {
    Security,
    Privacy,
    Governance,
    Operational,
}

impl std::fmt::Display for ComplianceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceCategory::Security => write!(f, "security"),
            ComplianceCategory::Privacy => write!(f, "privacy"),
            ComplianceCategory::Governance => write!(f, "governance"),
            ComplianceCategory::Operational => write!(f, "operational"),
        }
    }
}

/// A single compliance check outcome.
///
/// Created fresh on every scheduled run; the id is per-run, not stable
/// across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub id: String,
    pub name: String,
    pub status: ComplianceStatus,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    pub category: ComplianceCategory,
}

impl ComplianceCheck {
    /// Build a pass/fail check from a boolean predicate outcome.
    pub fn from_predicate(
        name: &str,
        passed: bool,
        pass_details: &str,
        fail_details: &str,
        category: ComplianceCategory,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            status: if passed {
                ComplianceStatus::Pass
            } else {
                ComplianceStatus::Fail
            },
            details: if passed { pass_details } else { fail_details }.to_string(),
            timestamp: Utc::now(),
            category,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
