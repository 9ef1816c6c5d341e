//! Watchtower
//!
//! Observability and compliance monitoring service for the AI Investment
//! platform.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Watchtower                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐       │
//! │  │  Collector   │───▶│  Publisher   │    │ AlertEngine  │       │
//! │  │  (samples)   │    │  (persist)   │    │  (evaluate)  │       │
//! │  └──────────────┘    └──────────────┘    └──────────────┘       │
//! │          ┌──────────────┐    ┌─────────────────────┐            │
//! │          │  Compliance  │    │  Query API (hyper)  │            │
//! │          └──────────────┘    └─────────────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use watchtower::adapters::channels::ChannelRegistry;
use watchtower::adapters::docstore::{DocStoreConfig, DocStoreGateway};
use watchtower::adapters::memory::InMemoryStore;
use watchtower::adapters::probes::{
    StaticInspector, SyntheticPerformanceProbe, SyntheticSystemProbe,
};
use watchtower::alerts::{AlertEngine, AlertEngineConfig};
use watchtower::collector::{CollectorConfig, MetricCollector, ReturnScale};
use watchtower::compliance::ComplianceMonitor;
use watchtower::domain::ports::{StorageGateway, TableNames};
use watchtower::error::Result;
use watchtower::publisher::MetricPublisher;
use watchtower::service::{ObservabilityService, ServiceConfig};
use watchtower::{server, telemetry};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Watchtower - Observability and compliance monitoring service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Document store base URL
    #[arg(
        long,
        env = "DOCSTORE_URL",
        default_value = "http://docstore.platform.svc.cluster.local:8000"
    )]
    docstore_url: String,

    /// Use an in-memory store instead of the document store (local runs)
    #[arg(long, env = "IN_MEMORY_STORE")]
    in_memory_store: bool,

    /// Document store request timeout in seconds
    #[arg(long, env = "DOCSTORE_TIMEOUT_SECONDS", default_value = "30")]
    docstore_timeout_seconds: u64,

    /// Service namespace prefix for collected metrics
    #[arg(long, env = "SERVICE_NAMESPACE", default_value = "AI-Investment")]
    service_namespace: String,

    /// Metrics table name
    #[arg(long, env = "METRICS_TABLE_NAME", default_value = "ai-investment-metrics")]
    metrics_table: String,

    /// Signals table name
    #[arg(long, env = "SIGNALS_TABLE_NAME", default_value = "ai-investment-signals")]
    signals_table: String,

    /// Proposals table name
    #[arg(
        long,
        env = "PROPOSALS_TABLE_NAME",
        default_value = "ai-investment-proposals"
    )]
    proposals_table: String,

    /// Decisions table name
    #[arg(
        long,
        env = "DECISIONS_TABLE_NAME",
        default_value = "ai-investment-decisions"
    )]
    decisions_table: String,

    /// Outcomes table name
    #[arg(long, env = "OUTCOMES_TABLE_NAME", default_value = "ai-investment-outcomes")]
    outcomes_table: String,

    /// Security events table name
    #[arg(
        long,
        env = "SECURITY_EVENTS_TABLE_NAME",
        default_value = "ai-investment-security-events"
    )]
    security_events_table: String,

    /// Alert rules table name
    #[arg(
        long,
        env = "ALERT_RULES_TABLE_NAME",
        default_value = "ai-investment-alert-rules"
    )]
    alert_rules_table: String,

    /// Alerts table name
    #[arg(long, env = "ALERTS_TABLE_NAME", default_value = "ai-investment-alerts")]
    alerts_table: String,

    /// Compliance checks table name
    #[arg(
        long,
        env = "COMPLIANCE_CHECKS_TABLE_NAME",
        default_value = "ai-investment-compliance-checks"
    )]
    compliance_checks_table: String,

    /// Metric collection interval in seconds
    #[arg(long, env = "COLLECTION_INTERVAL_SECONDS", default_value = "300")]
    collection_interval_seconds: u64,

    /// Alert checking interval in seconds
    #[arg(long, env = "ALERT_INTERVAL_SECONDS", default_value = "60")]
    alert_interval_seconds: u64,

    /// Compliance monitoring interval in seconds
    #[arg(long, env = "COMPLIANCE_INTERVAL_SECONDS", default_value = "3600")]
    compliance_interval_seconds: u64,

    /// Lookback window in hours for business and security store queries
    #[arg(long, env = "LOOKBACK_HOURS", default_value = "24")]
    lookback_hours: u64,

    /// Capacity of each in-memory accumulator
    #[arg(long, env = "BUFFER_CAPACITY", default_value = "10000")]
    buffer_capacity: usize,

    /// Suppress repeat notifications while a rule stays in breach
    #[arg(long, env = "DEDUPE_ALERTS")]
    dedupe_alerts: bool,

    /// Interpretation of stored return values (fraction or percent)
    #[arg(long, env = "RETURN_SCALE", default_value = "fraction")]
    return_scale: ReturnScale,

    /// Webhook endpoint for the webhook notification channel
    #[arg(
        long,
        env = "WEBHOOK_ENDPOINT",
        default_value = "http://alerts.platform.svc.cluster.local:9000/webhook"
    )]
    webhook_endpoint: String,

    /// Query API bind address
    #[arg(long, env = "QUERY_ADDR", default_value = "0.0.0.0:8080")]
    query_addr: String,

    /// Telemetry server bind address
    #[arg(long, env = "TELEMETRY_ADDR", default_value = "0.0.0.0:8081")]
    telemetry_addr: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn table_names(&self) -> TableNames {
        TableNames {
            metrics: self.metrics_table.clone(),
            signals: self.signals_table.clone(),
            proposals: self.proposals_table.clone(),
            decisions: self.decisions_table.clone(),
            outcomes: self.outcomes_table.clone(),
            security_events: self.security_events_table.clone(),
            alert_rules: self.alert_rules_table.clone(),
            alerts: self.alerts_table.clone(),
            compliance_checks: self.compliance_checks_table.clone(),
        }
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    info!("Starting Watchtower");
    info!("  Service namespace: {}", args.service_namespace);
    info!(
        "  Collection interval: {} seconds",
        args.collection_interval_seconds
    );
    info!("  Alert interval: {} seconds", args.alert_interval_seconds);
    info!(
        "  Compliance interval: {} seconds",
        args.compliance_interval_seconds
    );
    info!("  Alert dedupe: {}", args.dedupe_alerts);

    let tables = args.table_names();

    // Build the storage gateway
    let store: Arc<dyn StorageGateway> = if args.in_memory_store {
        info!("Using in-memory store");
        Arc::new(InMemoryStore::new())
    } else {
        let gateway = DocStoreGateway::new(DocStoreConfig {
            base_url: args.docstore_url.clone(),
            request_timeout: Duration::from_secs(args.docstore_timeout_seconds),
        })?;

        if let Err(e) = gateway.health_check().await {
            error!("Document store health check failed: {}", e);
            error!("Continuing anyway - persistence may not be available");
        } else {
            info!("Document store connection healthy");
        }

        gateway
    };

    // Wire the pipeline
    let inspector = Arc::new(StaticInspector::new());

    let collector = MetricCollector::new(
        store.clone(),
        Arc::new(SyntheticSystemProbe::new()),
        Arc::new(SyntheticPerformanceProbe::new()),
        inspector.clone(),
        tables.clone(),
        CollectorConfig {
            service: args.service_namespace.clone(),
            lookback: Duration::from_secs(args.lookback_hours * 60 * 60),
            return_scale: args.return_scale,
        },
    );

    let publisher = MetricPublisher::new(store.clone(), tables.metrics.clone());

    let channels = ChannelRegistry::standard(
        &args.webhook_endpoint,
        Duration::from_secs(args.docstore_timeout_seconds),
    )?;
    let alert_engine = AlertEngine::new(
        store.clone(),
        channels,
        tables.clone(),
        AlertEngineConfig {
            dedupe: args.dedupe_alerts,
        },
    );

    let compliance_monitor =
        ComplianceMonitor::new(store, inspector, tables.compliance_checks.clone());

    let service = ObservabilityService::new(
        collector,
        publisher,
        alert_engine,
        compliance_monitor,
        ServiceConfig {
            collection_interval: Duration::from_secs(args.collection_interval_seconds),
            alert_interval: Duration::from_secs(args.alert_interval_seconds),
            compliance_interval: Duration::from_secs(args.compliance_interval_seconds),
            buffer_capacity: args.buffer_capacity,
        },
    );

    // Start the schedules
    service.clone().start().await;

    // Start the telemetry server
    let telemetry_addr = args.telemetry_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = telemetry::run_telemetry_server(&telemetry_addr).await {
            error!("Telemetry server error: {}", e);
        }
    });

    // Run the query API
    info!("Starting query API");
    server::run_query_server(&args.query_addr, service).await?;

    info!("Service shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap())
        .add_directive("tower=warn".parse().unwrap());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
