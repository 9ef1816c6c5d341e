//! Security domain gatherer: security-event counts by type plus the
//! binary encryption-status indicator.

use chrono::Utc;

use crate::collector::CollectorConfig;
use crate::domain::model::{MetricSample, MetricUnit};
use crate::domain::ports::{ComplianceInspector, QueryCondition, StorageGateway, TableNames};
use crate::error::Result;

/// Gather the four security samples: three event counts and the
/// encryption status.
pub async fn gather(
    store: &dyn StorageGateway,
    inspector: &dyn ComplianceInspector,
    tables: &TableNames,
    config: &CollectorConfig,
) -> Result<Vec<MetricSample>> {
    let namespace = config.namespace("Security");
    let since = (Utc::now() - config.lookback).to_rfc3339();

    let failed_auth = count_events(store, &tables.security_events, "failed_auth", &since).await?;
    let rate_limit =
        count_events(store, &tables.security_events, "rate_limit_violation", &since).await?;
    let data_access =
        count_events(store, &tables.security_events, "data_access_violation", &since).await?;

    let encryption = if inspector.encryption_enabled().await? {
        1.0
    } else {
        0.0
    };

    Ok(vec![
        MetricSample::new(
            "FailedAuthAttempts",
            failed_auth as f64,
            MetricUnit::Count,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "RateLimitViolations",
            rate_limit as f64,
            MetricUnit::Count,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "DataAccessViolations",
            data_access as f64,
            MetricUnit::Count,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "EncryptionStatus",
            encryption,
            MetricUnit::Count,
            &namespace,
            &config.service,
        ),
    ])
}

async fn count_events(
    store: &dyn StorageGateway,
    table: &str,
    event_type: &str,
    since: &str,
) -> Result<usize> {
    let result = store
        .query(
            table,
            QueryCondition::new("event_type = :event_type AND created_at > :timestamp")
                .bind(":event_type", event_type)
                .bind(":timestamp", since),
        )
        .await?;
    Ok(result.count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::probes::StaticInspector;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_gathers_four_samples_with_counts_by_type() {
        let store = Arc::new(InMemoryStore::new());
        let tables = TableNames::default();
        let now = Utc::now().to_rfc3339();
        store.seed(
            &tables.security_events,
            vec![
                json!({"event_type": "failed_auth", "created_at": now}),
                json!({"event_type": "failed_auth", "created_at": now}),
                json!({"event_type": "rate_limit_violation", "created_at": now}),
            ],
        );

        let samples = gather(
            store.as_ref(),
            &StaticInspector::new(),
            &tables,
            &CollectorConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(samples.len(), 4);

        let failed = samples.iter().find(|s| s.name == "FailedAuthAttempts").unwrap();
        assert_eq!(failed.value, 2.0);

        let rate = samples.iter().find(|s| s.name == "RateLimitViolations").unwrap();
        assert_eq!(rate.value, 1.0);

        let access = samples
            .iter()
            .find(|s| s.name == "DataAccessViolations")
            .unwrap();
        assert_eq!(access.value, 0.0);
    }

    #[tokio::test]
    async fn test_encryption_indicator_binary() {
        let store = Arc::new(InMemoryStore::new());
        let tables = TableNames::default();

        let mut inspector = StaticInspector::new();
        inspector.encryption = false;

        let samples = gather(
            store.as_ref(),
            &inspector,
            &tables,
            &CollectorConfig::default(),
        )
        .await
        .unwrap();

        let encryption = samples.iter().find(|s| s.name == "EncryptionStatus").unwrap();
        assert_eq!(encryption.value, 0.0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(InMemoryStore::new());
        let tables = TableNames::default();
        store.set_failing(&tables.security_events, true);

        assert!(gather(
            store.as_ref(),
            &StaticInspector::new(),
            &tables,
            &CollectorConfig::default(),
        )
        .await
        .is_err());
    }
}
