//! Metric Publisher
//!
//! Routes collected samples to durable storage, grouped by namespace.
//! Persistence is best-effort: metrics are diagnostic, not transactional,
//! so a failed record is logged and the rest of the batch still goes out.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::model::MetricSample;
use crate::domain::ports::StorageGateway;
use crate::telemetry;

/// Persists metric samples through the storage gateway.
pub struct MetricPublisher {
    store: Arc<dyn StorageGateway>,
    metrics_table: String,
}

impl MetricPublisher {
    pub fn new(store: Arc<dyn StorageGateway>, metrics_table: impl Into<String>) -> Self {
        Self {
            store,
            metrics_table: metrics_table.into(),
        }
    }

    /// Publish a cycle's samples. Groups by namespace (insertion order
    /// within a namespace preserved, no sample ever dropped) and persists
    /// every sample as an individual record tagged with a fresh id and
    /// creation timestamp. Returns the number of records persisted.
    #[instrument(skip(self, samples), fields(sample_count = samples.len()))]
    pub async fn publish(&self, samples: &[MetricSample]) -> usize {
        if samples.is_empty() {
            return 0;
        }

        let mut persisted = 0;
        for (namespace, group) in group_by_namespace(samples) {
            debug!(namespace = %namespace, metric_count = group.len(), "Publishing namespace group");
            persisted += self.persist_group(&group).await;
        }

        telemetry::SAMPLES_PUBLISHED.inc_by(persisted as f64);
        info!(persisted, "Metrics published");
        persisted
    }

    async fn persist_group(&self, group: &[&MetricSample]) -> usize {
        let mut persisted = 0;
        for sample in group {
            match self.store.put(&self.metrics_table, to_record(sample)).await {
                Ok(()) => persisted += 1,
                Err(e) => {
                    error!(metric = %sample.name, "Failed to store metric: {}", e);
                }
            }
        }
        persisted
    }
}

/// Group a flat sample sequence into namespace groups. First-seen
/// namespace order, insertion order within each group.
pub fn group_by_namespace(samples: &[MetricSample]) -> Vec<(String, Vec<&MetricSample>)> {
    let mut groups: Vec<(String, Vec<&MetricSample>)> = Vec::new();
    for sample in samples {
        match groups.iter_mut().find(|(ns, _)| *ns == sample.namespace) {
            Some((_, group)) => group.push(sample),
            None => groups.push((sample.namespace.clone(), vec![sample])),
        }
    }
    groups
}

fn to_record(sample: &MetricSample) -> Value {
    let mut record = serde_json::to_value(sample).unwrap_or_else(|_| json!({}));
    if let Value::Object(ref mut map) = record {
        map.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
        map.insert("createdAt".to_string(), json!(Utc::now().to_rfc3339()));
    }
    record
}

// =============================================================================
// Tests
// =============================================================================
