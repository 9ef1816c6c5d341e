//! Performance domain gatherer: latency percentiles, error rate, and
//! throughput from the performance probe.

use crate::collector::CollectorConfig;
use crate::domain::model::{MetricSample, MetricUnit};
use crate::domain::ports::PerformanceProbe;
use crate::error::Result;

/// Gather the five performance samples: three `ResponseTime` percentiles
/// differentiated by a `Type` dimension, the aggregate error rate, and
/// throughput.
pub async fn gather(
    probe: &dyn PerformanceProbe,
    config: &CollectorConfig,
) -> Result<Vec<MetricSample>> {
    let namespace = config.namespace("Performance");

    let times = probe.response_times().await?;
    let error_rate = probe.error_rate().await?;
    let throughput = probe.throughput().await?;

    Ok(vec![
        MetricSample::new(
            "ResponseTime",
            times.avg,
            MetricUnit::Milliseconds,
            &namespace,
            &config.service,
        )
        .with_dimension("Type", "Average"),
        MetricSample::new(
            "ResponseTime",
            times.p95,
            MetricUnit::Milliseconds,
            &namespace,
            &config.service,
        )
        .with_dimension("Type", "P95"),
        MetricSample::new(
            "ResponseTime",
            times.p99,
            MetricUnit::Milliseconds,
            &namespace,
            &config.service,
        )
        .with_dimension("Type", "P99"),
        MetricSample::new(
            "ErrorRate",
            error_rate,
            MetricUnit::Percent,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "Throughput",
            throughput,
            MetricUnit::CountPerSecond,
            &namespace,
            &config.service,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::probes::StaticPerformanceProbe;

    #[tokio::test]
    async fn test_gathers_five_samples() {
        let probe = StaticPerformanceProbe::new();
        let samples = gather(&probe, &CollectorConfig::default()).await.unwrap();

        assert_eq!(samples.len(), 5);
        assert!(samples
            .iter()
            .all(|s| s.namespace == "AI-Investment/Performance"));
    }

    #[tokio::test]
    async fn test_response_time_percentiles_differentiated_by_dimension() {
        let probe = StaticPerformanceProbe::new();
        let samples = gather(&probe, &CollectorConfig::default()).await.unwrap();

        let response_times: Vec<_> =
            samples.iter().filter(|s| s.name == "ResponseTime").collect();
        assert_eq!(response_times.len(), 3);

        let types: Vec<&str> = response_times
            .iter()
            .map(|s| s.dimensions.get("Type").unwrap().as_str())
            .collect();
        assert_eq!(types, vec!["Average", "P95", "P99"]);

        let p95 = response_times
            .iter()
            .find(|s| s.dimensions.get("Type").map(String::as_str) == Some("P95"))
            .unwrap();
        assert_eq!(p95.value, 450.0);
        assert_eq!(p95.unit, MetricUnit::Milliseconds);
    }

    #[tokio::test]
    async fn test_throughput_unit() {
        let probe = StaticPerformanceProbe::new();
        let samples = gather(&probe, &CollectorConfig::default()).await.unwrap();

        let throughput = samples.iter().find(|s| s.name == "Throughput").unwrap();
        assert_eq!(throughput.unit, MetricUnit::CountPerSecond);
        assert_eq!(throughput.value, 42.0);
    }

    #[tokio::test]
    async fn test_probe_failure_propagates() {
        let probe = StaticPerformanceProbe::failing();
        assert!(gather(&probe, &CollectorConfig::default()).await.is_err());
    }
}
