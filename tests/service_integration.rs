//! Watchtower Integration Tests
//!
//! Exercises the monitoring pipeline end to end against the in-memory
//! store adapter:
//! - Metric collection and publishing across the four domains
//! - Alert rule evaluation, triggering, and notification dispatch
//! - Compliance monitoring
//! - Query API routing and envelopes

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use watchtower::adapters::channels::{ChannelRegistry, RecordingChannel};
use watchtower::adapters::memory::InMemoryStore;
use watchtower::adapters::probes::{
    StaticInspector, StaticPerformanceProbe, StaticSystemProbe,
};
use watchtower::alerts::{AlertEngine, AlertEngineConfig};
use watchtower::collector::{CollectorConfig, MetricCollector, ReturnScale};
use watchtower::compliance::ComplianceMonitor;
use watchtower::domain::model::AlertAction;
use watchtower::domain::ports::TableNames;
use watchtower::publisher::MetricPublisher;
use watchtower::server;
use watchtower::service::{ObservabilityService, ServiceConfig};

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    store: Arc<InMemoryStore>,
    tables: TableNames,
    email: Arc<RecordingChannel>,
    webhook: Arc<RecordingChannel>,
    service: Arc<ObservabilityService>,
}

fn harness() -> Harness {
    harness_with(
        StaticSystemProbe::new(),
        StaticPerformanceProbe::new(),
        StaticInspector::new(),
        ReturnScale::Fraction,
    )
}

fn harness_with(
    system_probe: StaticSystemProbe,
    performance_probe: StaticPerformanceProbe,
    inspector: StaticInspector,
    return_scale: ReturnScale,
) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let tables = TableNames::default();
    let inspector = Arc::new(inspector);

    let collector = MetricCollector::new(
        store.clone(),
        Arc::new(system_probe),
        Arc::new(performance_probe),
        inspector.clone(),
        tables.clone(),
        CollectorConfig {
            return_scale,
            ..CollectorConfig::default()
        },
    );
    let publisher = MetricPublisher::new(store.clone(), tables.metrics.clone());

    let email = Arc::new(RecordingChannel::new("email"));
    let webhook = Arc::new(RecordingChannel::new("webhook"));
    let channels = ChannelRegistry::new()
        .with_channel(AlertAction::Email, email.clone())
        .with_channel(AlertAction::Webhook, webhook.clone());

    let alert_engine = AlertEngine::new(
        store.clone(),
        channels,
        tables.clone(),
        AlertEngineConfig::default(),
    );
    let compliance_monitor =
        ComplianceMonitor::new(store.clone(), inspector, tables.compliance_checks.clone());

    let service = ObservabilityService::new(
        collector,
        publisher,
        alert_engine,
        compliance_monitor,
        ServiceConfig::default(),
    );

    Harness {
        store,
        tables,
        email,
        webhook,
        service,
    }
}

fn recent() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn alert_rule(condition: &str, threshold: f64, actions: Vec<&str>) -> serde_json::Value {
    json!({
        "id": format!("rule-{condition}"),
        "name": format!("{condition} breach"),
        "condition": condition,
        "threshold": threshold,
        "severity": "high",
        "enabled": true,
        "actions": actions,
    })
}

// =============================================================================
// Metric Collection
// =============================================================================

mod collection_tests {
    use super::*;

    #[tokio::test]
    async fn test_cycle_collects_all_four_domains() {
        let h = harness();

        h.service.collect_once().await;

        let metrics = h.service.metrics();
        assert_eq!(metrics.len(), 20);

        for domain in ["System", "Business", "Security", "Performance"] {
            let namespace = format!("AI-Investment/{domain}");
            assert!(
                metrics.iter().any(|m| m.namespace == namespace),
                "missing namespace {namespace}"
            );
        }

        // Every sample was persisted with a fresh id and timestamp.
        let persisted = h.store.items(&h.tables.metrics);
        assert_eq!(persisted.len(), 20);
        assert!(persisted.iter().all(|r| r["id"].is_string()));
        assert!(persisted.iter().all(|r| r["createdAt"].is_string()));
    }

    #[tokio::test]
    async fn test_failing_domain_is_isolated() {
        let h = harness_with(
            StaticSystemProbe::failing(),
            StaticPerformanceProbe::new(),
            StaticInspector::new(),
            ReturnScale::Fraction,
        );

        h.service.collect_once().await;

        let metrics = h.service.metrics();
        assert_eq!(metrics.len(), 15);
        assert!(metrics.iter().all(|m| m.namespace != "AI-Investment/System"));
    }

    #[tokio::test]
    async fn test_business_scenario_a_success_rate_and_average_return() {
        let h = harness();
        h.store.seed(
            &h.tables.outcomes,
            vec![
                json!({"return_pct": 5.0, "created_at": recent()}),
                json!({"return_pct": -2.0, "created_at": recent()}),
                json!({"return_pct": 10.0, "created_at": recent()}),
            ],
        );

        h.service.collect_once().await;

        let metrics = h.service.metrics();
        let success = metrics.iter().find(|m| m.name == "SuccessRate").unwrap();
        assert_eq!(success.value, 66.67);

        // Fraction mode: stored values are fractions, mean scaled by 100.
        let average = metrics.iter().find(|m| m.name == "AverageReturn").unwrap();
        assert_eq!(average.value, 433.33);

        let outcomes = metrics
            .iter()
            .find(|m| m.name == "OutcomesEvaluated")
            .unwrap();
        assert_eq!(outcomes.value, 3.0);
    }

    #[tokio::test]
    async fn test_business_percent_scale_reports_mean_as_is() {
        let h = harness_with(
            StaticSystemProbe::new(),
            StaticPerformanceProbe::new(),
            StaticInspector::new(),
            ReturnScale::Percent,
        );
        h.store.seed(
            &h.tables.outcomes,
            vec![
                json!({"return_pct": 5.0, "created_at": recent()}),
                json!({"return_pct": -2.0, "created_at": recent()}),
                json!({"return_pct": 10.0, "created_at": recent()}),
            ],
        );

        h.service.collect_once().await;

        let metrics = h.service.metrics();
        let average = metrics.iter().find(|m| m.name == "AverageReturn").unwrap();
        assert_eq!(average.value, 4.33);
    }

    #[tokio::test]
    async fn test_business_scenario_b_zero_outcomes() {
        let h = harness();

        h.service.collect_once().await;

        let metrics = h.service.metrics();
        let success = metrics.iter().find(|m| m.name == "SuccessRate").unwrap();
        let average = metrics.iter().find(|m| m.name == "AverageReturn").unwrap();

        assert_eq!(success.value, 0.0);
        assert_eq!(average.value, 0.0);
    }

    #[tokio::test]
    async fn test_accumulator_grows_across_cycles() {
        let h = harness();

        h.service.collect_once().await;
        h.service.collect_once().await;

        // Repeated names across cycles form a time series, not updates.
        assert_eq!(h.service.metrics().len(), 40);
    }
}

// =============================================================================
// Alerting
// =============================================================================

mod alert_tests {
    use super::*;

    #[tokio::test]
    async fn test_breach_triggers_persisted_alert_and_notifications() {
        let h = harness();
        // Static probe reports CPU at 25.0; threshold 20 breaches.
        h.store.seed(
            &h.tables.alert_rules,
            vec![alert_rule("CPUUsage", 20.0, vec!["webhook", "email"])],
        );

        h.service.reload_rules().await;
        h.service.collect_once().await;
        h.service.check_alerts_once().await;

        let alerts = h.store.items(&h.tables.alerts);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["alertId"], "rule-CPUUsage");
        assert_eq!(alerts[0]["status"], "active");

        assert_eq!(h.webhook.delivered(), vec!["rule-CPUUsage".to_string()]);
        assert_eq!(h.email.delivered(), vec!["rule-CPUUsage".to_string()]);
    }

    #[tokio::test]
    async fn test_threshold_boundary_is_strict() {
        let h = harness();
        // Exactly at the probe's CPU reading: no breach.
        h.store.seed(
            &h.tables.alert_rules,
            vec![alert_rule("CPUUsage", 25.0, vec!["email"])],
        );

        h.service.reload_rules().await;
        h.service.collect_once().await;
        h.service.check_alerts_once().await;

        assert!(h.store.is_empty(&h.tables.alerts));
        assert!(h.email.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_condition_never_triggers() {
        let h = harness();
        h.store.seed(
            &h.tables.alert_rules,
            vec![alert_rule("NoSuchMetric", 0.0, vec!["email"])],
        );

        h.service.reload_rules().await;
        h.service.collect_once().await;
        h.service.check_alerts_once().await;

        assert!(h.email.is_empty());
    }

    #[tokio::test]
    async fn test_failing_webhook_does_not_block_email() {
        let h = harness();
        h.store.seed(
            &h.tables.alert_rules,
            vec![alert_rule("CPUUsage", 20.0, vec!["webhook", "email"])],
        );
        h.webhook.set_failing(true);

        h.service.reload_rules().await;
        h.service.collect_once().await;
        h.service.check_alerts_once().await;

        assert!(h.webhook.is_empty());
        assert_eq!(h.email.len(), 1);
    }

    #[tokio::test]
    async fn test_rule_load_failure_degrades_to_no_alerts() {
        let h = harness();
        h.store.set_failing(&h.tables.alert_rules, true);

        h.service.reload_rules().await;
        h.service.collect_once().await;
        h.service.check_alerts_once().await;

        assert!(h.service.alerts().is_empty());
        assert!(h.store.is_empty(&h.tables.alerts));
    }
}

// =============================================================================
// Compliance
// =============================================================================

mod compliance_tests {
    use super::*;
    use watchtower::domain::model::{ComplianceCategory, ComplianceStatus};

    #[tokio::test]
    async fn test_run_persists_and_accumulates() {
        let h = harness();

        h.service.run_compliance_once().await;

        let checks = h.service.compliance_checks();
        assert_eq!(checks.len(), 10);
        assert!(checks.iter().all(|c| c.status == ComplianceStatus::Pass));
        assert_eq!(h.store.len(&h.tables.compliance_checks), 10);
    }

    #[tokio::test]
    async fn test_governance_failure_leaves_other_categories_present() {
        let h = harness_with(
            StaticSystemProbe::new(),
            StaticPerformanceProbe::new(),
            StaticInspector::new().with_failing_category(ComplianceCategory::Governance),
            ReturnScale::Fraction,
        );

        h.service.run_compliance_once().await;

        let checks = h.service.compliance_checks();
        assert_eq!(checks.len(), 8);
        for category in [
            ComplianceCategory::Security,
            ComplianceCategory::Privacy,
            ComplianceCategory::Operational,
        ] {
            assert!(
                checks.iter().any(|c| c.category == category),
                "missing category {category:?}"
            );
        }
        assert!(checks
            .iter()
            .all(|c| c.category != ComplianceCategory::Governance));
    }

    #[tokio::test]
    async fn test_each_run_is_a_fresh_snapshot() {
        let h = harness();

        h.service.run_compliance_once().await;
        h.service.run_compliance_once().await;

        let checks = h.service.compliance_checks();
        assert_eq!(checks.len(), 20);

        let (first, second) = checks.split_at(10);
        let first_ids: Vec<&str> = first.iter().map(|c| c.id.as_str()).collect();
        assert!(second.iter().all(|c| !first_ids.contains(&c.id.as_str())));
    }
}

// =============================================================================
// Query API
// =============================================================================

mod query_api_tests {
    use super::*;
    use hyper::StatusCode;

    #[tokio::test]
    async fn test_scenario_c_compliance_empty_accumulator() {
        let h = harness();

        let (status, body) = server::route("/compliance", &h.service);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"]["count"], 0);
        assert_eq!(body["data"]["complianceChecks"], json!([]));
    }

    #[tokio::test]
    async fn test_scenario_d_unknown_path() {
        let h = harness();

        let (status, body) = server::route("/unknown", &h.service);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("Invalid endpoint"));
    }

    #[tokio::test]
    async fn test_metrics_endpoint_after_collection() {
        let h = harness();
        h.service.collect_once().await;

        let (status, body) = server::route("/observability/metrics", &h.service);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 20);

        let metrics = body["data"]["metrics"].as_array().unwrap();
        assert!(metrics.iter().any(|m| m["name"] == "CPUUsage"));
        assert!(metrics
            .iter()
            .any(|m| m["namespace"] == "AI-Investment/Performance"));
    }

    #[tokio::test]
    async fn test_alerts_endpoint_returns_loaded_rules() {
        let h = harness();
        h.store.seed(
            &h.tables.alert_rules,
            vec![alert_rule("ErrorRate", 5.0, vec!["slack"])],
        );
        h.service.reload_rules().await;

        let (status, body) = server::route("/alerts", &h.service);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["alerts"][0]["condition"], "ErrorRate");
    }

    #[tokio::test]
    async fn test_reads_survive_storage_outage() {
        let h = harness();
        h.service.collect_once().await;
        h.service.run_compliance_once().await;

        // Every table goes dark; queries still serve accumulated state.
        for table in [
            h.tables.metrics.as_str(),
            h.tables.compliance_checks.as_str(),
            h.tables.alert_rules.as_str(),
        ] {
            h.store.set_failing(table, true);
        }

        let (status, body) = server::route("/metrics", &h.service);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 20);

        let (status, body) = server::route("/compliance", &h.service);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 10);
    }
}

// =============================================================================
// Scheduling
// =============================================================================

mod scheduling_tests {
    use super::*;

    #[tokio::test]
    async fn test_service_runs_with_short_intervals() {
        let store = Arc::new(InMemoryStore::new());
        let tables = TableNames::default();
        let inspector = Arc::new(StaticInspector::new());

        let collector = MetricCollector::new(
            store.clone(),
            Arc::new(StaticSystemProbe::new()),
            Arc::new(StaticPerformanceProbe::new()),
            inspector.clone(),
            tables.clone(),
            CollectorConfig::default(),
        );
        let publisher = MetricPublisher::new(store.clone(), tables.metrics.clone());
        let alert_engine = AlertEngine::new(
            store.clone(),
            ChannelRegistry::new(),
            tables.clone(),
            AlertEngineConfig::default(),
        );
        let compliance_monitor =
            ComplianceMonitor::new(store.clone(), inspector, tables.compliance_checks.clone());

        let service = ObservabilityService::new(
            collector,
            publisher,
            alert_engine,
            compliance_monitor,
            ServiceConfig {
                collection_interval: Duration::from_millis(20),
                alert_interval: Duration::from_millis(20),
                compliance_interval: Duration::from_millis(20),
                buffer_capacity: 1_000,
            },
        );

        service.clone().start().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        service.shutdown().await;

        // Multiple collection cycles and compliance runs happened.
        assert!(service.metrics().len() >= 40);
        assert!(service.compliance_checks().len() >= 20);
        assert!(!store.is_empty(&tables.metrics));
    }
}
