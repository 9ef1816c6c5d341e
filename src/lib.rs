//! Watchtower - Observability and Compliance Monitoring Service
//!
//! A long-running monitoring service for the AI Investment platform. It
//! periodically collects metric samples across four domains, persists
//! them through a document-store gateway, evaluates alert rules against
//! the latest samples, runs scheduled compliance checks, and serves the
//! accumulated state through a small JSON query API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Watchtower                               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐        │
//! │  │   Metric     │───▶│   Metric     │    │    Alert     │        │
//! │  │  Collector   │    │  Publisher   │    │   Engine     │        │
//! │  └──────────────┘    └──────────────┘    └──────────────┘        │
//! │  ┌──────────────┐    ┌──────────────────────────────────┐        │
//! │  │ Compliance   │    │  Observability Service (state,   │        │
//! │  │  Monitor     │───▶│  schedules, query accessors)     │        │
//! │  └──────────────┘    └──────────────────────────────────┘        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Three independent schedules drive the pipeline: metric collection
//! (every 5 minutes), alert checking (every minute), and compliance
//! monitoring (hourly). The query API reads only accumulated in-memory
//! state, so a transient storage outage degrades writes without taking
//! reads down.
//!
//! # Modules
//!
//! - [`adapters`] - Infrastructure adapters implementing domain ports
//! - [`alerts`] - Alert rule evaluation and notification dispatch
//! - [`collector`] - Metric collection across the four domains
//! - [`compliance`] - Scheduled compliance checks
//! - [`domain`] - Domain model and ports
//! - [`error`] - Error types
//! - [`publisher`] - Namespace-grouped metric persistence
//! - [`server`] - Query API router
//! - [`service`] - Composition root, schedules, accumulators
//! - [`telemetry`] - Self-telemetry counters and exposition

pub mod adapters;
pub mod alerts;
pub mod collector;
pub mod compliance;
pub mod domain;
pub mod error;
pub mod publisher;
pub mod server;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use alerts::{AlertEngine, AlertEngineConfig};
pub use collector::{CollectorConfig, MetricCollector, ReturnScale};
pub use compliance::ComplianceMonitor;
pub use domain::model::{
    Alert, AlertAction, AlertRule, AlertSeverity, ComplianceCategory, ComplianceCheck,
    ComplianceStatus, LogLevel, LogRecord, MetricSample, MetricUnit,
};
pub use domain::ports::{
    AlertChannel, ComplianceInspector, PerformanceProbe, QueryCondition, QueryResult,
    StorageGateway, SystemProbe, TableNames,
};
pub use error::{Error, Result};
pub use publisher::MetricPublisher;
pub use service::{ObservabilityService, ServiceConfig};
