//! Business domain gatherer: pipeline activity counts and outcome-derived
//! rates, all read through the storage gateway with a time lower-bound.

use chrono::Utc;
use serde_json::Value;

use crate::collector::{CollectorConfig, ReturnScale};
use crate::domain::model::{MetricSample, MetricUnit};
use crate::domain::ports::{QueryCondition, StorageGateway, TableNames};
use crate::error::Result;

/// Gather the six business samples: four pipeline-stage counts plus the
/// derived success rate and average return.
pub async fn gather(
    store: &dyn StorageGateway,
    tables: &TableNames,
    config: &CollectorConfig,
) -> Result<Vec<MetricSample>> {
    let namespace = config.namespace("Business");
    let since = (Utc::now() - config.lookback).to_rfc3339();

    let signals = count_since(store, &tables.signals, &since).await?;
    let proposals = count_since(store, &tables.proposals, &since).await?;
    let decisions = count_since(store, &tables.decisions, &since).await?;

    let outcomes = store
        .query(
            &tables.outcomes,
            QueryCondition::new("created_at > :timestamp").bind(":timestamp", since.as_str()),
        )
        .await?;

    Ok(vec![
        MetricSample::new(
            "SignalsProcessed",
            signals as f64,
            MetricUnit::Count,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "ProposalsGenerated",
            proposals as f64,
            MetricUnit::Count,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "DecisionsMade",
            decisions as f64,
            MetricUnit::Count,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "OutcomesEvaluated",
            outcomes.count as f64,
            MetricUnit::Count,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "SuccessRate",
            success_rate(&outcomes.items),
            MetricUnit::Percent,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "AverageReturn",
            average_return(&outcomes.items, config.return_scale),
            MetricUnit::Percent,
            &namespace,
            &config.service,
        ),
    ])
}

async fn count_since(store: &dyn StorageGateway, table: &str, since: &str) -> Result<usize> {
    let result = store
        .query(
            table,
            QueryCondition::new("created_at > :timestamp").bind(":timestamp", since),
        )
        .await?;
    Ok(result.count)
}

/// Percentage of outcomes with a positive return. Zero outcomes yield 0.
pub fn success_rate(outcomes: &[Value]) -> f64 {
    if outcomes.is_empty() {
        return 0.0;
    }
    let successful = outcomes.iter().filter(|o| return_pct(o) > 0.0).count();
    round2(successful as f64 / outcomes.len() as f64 * 100.0)
}

/// Mean of the outcome returns, scaled per [`ReturnScale`]. Zero outcomes
/// yield 0.
pub fn average_return(outcomes: &[Value], scale: ReturnScale) -> f64 {
    if outcomes.is_empty() {
        return 0.0;
    }
    let total: f64 = outcomes.iter().map(return_pct).sum();
    let mean = total / outcomes.len() as f64;
    round2(match scale {
        ReturnScale::Fraction => mean * 100.0,
        ReturnScale::Percent => mean,
    })
}

fn return_pct(outcome: &Value) -> f64 {
    outcome
        .get("return_pct")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
