//! Observability Service
//!
//! Composition root for the monitoring pipeline. Owns the in-memory
//! accumulators and the three recurring schedules (metric collection,
//! alert checking, compliance monitoring), and exposes synchronous read
//! accessors over the accumulated state for the query API.
//!
//! The schedules run as independent tokio tasks; a slow or failing tick
//! of one never delays the others. Accumulators are capacity-bounded
//! rings: the oldest entries are evicted instead of growing without
//! limit.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::time::interval;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::alerts::AlertEngine;
use crate::collector::MetricCollector;
use crate::compliance::ComplianceMonitor;
use crate::domain::model::{AlertRule, ComplianceCheck, LogLevel, LogRecord, MetricSample};
use crate::publisher::MetricPublisher;
use crate::telemetry;

// =============================================================================
// Bounded Ring
// =============================================================================

/// Capacity-bounded append-only buffer. Appending beyond capacity evicts
/// the oldest entries.
#[derive(Debug)]
pub struct RingBuffer<T> {
    entries: RwLock<VecDeque<T>>,
    capacity: usize,
}

impl<T: Clone> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn push(&self, entry: T) {
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn extend(&self, new_entries: impl IntoIterator<Item = T>) {
        let mut entries = self.entries.write();
        for entry in new_entries {
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    /// Snapshot of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// =============================================================================
// Log Buffer
// =============================================================================

/// Accumulates the service's own structured log records and mirrors them
/// to `tracing`.
#[derive(Debug)]
pub struct LogBuffer {
    records: RingBuffer<LogRecord>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RingBuffer::new(capacity),
        }
    }

    pub fn record(&self, level: LogLevel, module: &str, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => info!(module, "{}", message),
            LogLevel::Warn => warn!(module, "{}", message),
            LogLevel::Error => error!(module, "{}", message),
            LogLevel::Debug => debug!(module, "{}", message),
        }

        self.records.push(LogRecord {
            level,
            message,
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
            user_id: None,
            module: module.to_string(),
            cost_tokens: None,
            metadata: None,
        });
    }

    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.records.snapshot()
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the observability service schedules and buffers.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Metric collection interval
    pub collection_interval: Duration,

    /// Alert checking interval
    pub alert_interval: Duration,

    /// Compliance monitoring interval
    pub compliance_interval: Duration,

    /// Capacity of each in-memory accumulator
    pub buffer_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            collection_interval: Duration::from_secs(5 * 60),
            alert_interval: Duration::from_secs(60),
            compliance_interval: Duration::from_secs(60 * 60),
            buffer_capacity: 10_000,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Composition root owning the schedules and accumulated state.
pub struct ObservabilityService {
    collector: MetricCollector,
    publisher: MetricPublisher,
    alert_engine: AlertEngine,
    compliance_monitor: ComplianceMonitor,
    config: ServiceConfig,

    metrics: RingBuffer<MetricSample>,
    logs: LogBuffer,
    compliance_checks: RingBuffer<ComplianceCheck>,

    shutdown: tokio::sync::RwLock<bool>,
}

impl ObservabilityService {
    pub fn new(
        collector: MetricCollector,
        publisher: MetricPublisher,
        alert_engine: AlertEngine,
        compliance_monitor: ComplianceMonitor,
        config: ServiceConfig,
    ) -> Arc<Self> {
        let capacity = config.buffer_capacity;
        Arc::new(Self {
            collector,
            publisher,
            alert_engine,
            compliance_monitor,
            config,
            metrics: RingBuffer::new(capacity),
            logs: LogBuffer::new(capacity),
            compliance_checks: RingBuffer::new(capacity),
            shutdown: tokio::sync::RwLock::new(false),
        })
    }

    /// Load the alert rules and start the three schedules. Each schedule
    /// runs its operation once immediately and then on its interval.
    pub async fn start(self: Arc<Self>) {
        self.alert_engine.load_rules().await;

        let service = self.clone();
        tokio::spawn(async move {
            let mut tick = interval(service.config.collection_interval);
            loop {
                tick.tick().await;
                if *service.shutdown.read().await {
                    info!("Collection schedule shutting down");
                    break;
                }
                service.collect_once().await;
            }
        });

        let service = self.clone();
        tokio::spawn(async move {
            let mut tick = interval(service.config.alert_interval);
            loop {
                tick.tick().await;
                if *service.shutdown.read().await {
                    info!("Alert schedule shutting down");
                    break;
                }
                service.check_alerts_once().await;
            }
        });

        let service = self.clone();
        tokio::spawn(async move {
            let mut tick = interval(service.config.compliance_interval);
            loop {
                tick.tick().await;
                if *service.shutdown.read().await {
                    info!("Compliance schedule shutting down");
                    break;
                }
                service.run_compliance_once().await;
            }
        });

        info!(
            collection_interval = ?self.config.collection_interval,
            alert_interval = ?self.config.alert_interval,
            compliance_interval = ?self.config.compliance_interval,
            "Observability schedules started"
        );
    }

    /// Signal all schedules to stop at their next tick.
    pub async fn shutdown(&self) {
        *self.shutdown.write().await = true;
    }

    // =========================================================================
    // One-shot operations (also driven by the schedules)
    // =========================================================================

    /// Run one metric collection cycle: gather, accumulate, publish.
    #[instrument(skip(self))]
    pub async fn collect_once(&self) {
        let samples = self.collector.collect().await;
        if samples.is_empty() {
            self.logs
                .record(LogLevel::Warn, "collector", "Collection cycle produced no samples");
            return;
        }

        self.metrics.extend(samples.iter().cloned());
        let persisted = self.publisher.publish(&samples).await;
        telemetry::COLLECTION_CYCLES.inc();

        self.logs.record(
            LogLevel::Info,
            "collector",
            format!(
                "Collected {} samples, persisted {}",
                samples.len(),
                persisted
            ),
        );
    }

    /// Evaluate all loaded alert rules against the accumulated samples.
    #[instrument(skip(self))]
    pub async fn check_alerts_once(&self) {
        let samples = self.metrics.snapshot();
        self.alert_engine.check_alerts(&samples).await;
    }

    /// Run one compliance snapshot across all four categories.
    #[instrument(skip(self))]
    pub async fn run_compliance_once(&self) {
        let checks = self.compliance_monitor.run_checks().await;
        self.logs.record(
            LogLevel::Info,
            "compliance",
            format!("Compliance run produced {} checks", checks.len()),
        );
        self.compliance_checks.extend(checks);
    }

    /// Reload the alert rule set from the rule store.
    pub async fn reload_rules(&self) {
        self.alert_engine.load_rules().await;
    }

    // =========================================================================
    // Query accessors (side-effect-free reads of accumulated state)
    // =========================================================================

    pub fn metrics(&self) -> Vec<MetricSample> {
        self.metrics.snapshot()
    }

    pub fn logs(&self) -> Vec<LogRecord> {
        self.logs.snapshot()
    }

    pub fn alerts(&self) -> Vec<AlertRule> {
        self.alert_engine.rules()
    }

    pub fn compliance_checks(&self) -> Vec<ComplianceCheck> {
        self.compliance_checks.snapshot()
    }
}

// =============================================================================
// Tests
// =============================================================================
