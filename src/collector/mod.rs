//! Metric Collector
//!
//! Produces the current cycle's full set of metric samples across four
//! domains: system, business, security, and performance. The four domain
//! gatherers run concurrently and fail independently; a failure in one
//! domain never aborts collection of the other three.

pub mod business;
pub mod performance;
pub mod security;
pub mod system;

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument};

use crate::domain::model::MetricSample;
use crate::domain::ports::{
    ComplianceInspector, PerformanceProbe, StorageGateway, SystemProbe, TableNames,
};
use crate::error::Result;

// =============================================================================
// Configuration
// =============================================================================

/// Interpretation of the stored `return_pct` values when deriving the
/// `AverageReturn` metric.
///
/// The platform's historical pipeline treated them as fractions and
/// scaled the mean by 100; some producers already write percentages. The
/// disambiguating check against live data: store an outcome known to be
/// +5% and see whether `AverageReturn` reads 5 or 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnScale {
    /// Stored values are fractions; the published mean is scaled by 100.
    #[default]
    Fraction,
    /// Stored values are already percentages; the mean is published as is.
    Percent,
}

impl FromStr for ReturnScale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fraction" => Ok(ReturnScale::Fraction),
            "percent" => Ok(ReturnScale::Percent),
            other => Err(format!("unknown return scale: {other}")),
        }
    }
}

/// Configuration for the metric collector.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Service name used for namespaces and the `Service` dimension
    pub service: String,

    /// Time lower-bound window for the business and security store queries
    pub lookback: Duration,

    /// How to scale the derived average-return metric
    pub return_scale: ReturnScale,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            service: "AI-Investment".to_string(),
            lookback: Duration::from_secs(24 * 60 * 60),
            return_scale: ReturnScale::default(),
        }
    }
}

impl CollectorConfig {
    /// Namespace for one metric domain, e.g. `AI-Investment/System`.
    pub fn namespace(&self, domain: &str) -> String {
        format!("{}/{}", self.service, domain)
    }
}

// =============================================================================
// Collector
// =============================================================================

/// Gathers typed metric samples across the four domains each cycle.
pub struct MetricCollector {
    store: Arc<dyn StorageGateway>,
    system_probe: Arc<dyn SystemProbe>,
    performance_probe: Arc<dyn PerformanceProbe>,
    inspector: Arc<dyn ComplianceInspector>,
    tables: TableNames,
    config: CollectorConfig,
}

impl MetricCollector {
    pub fn new(
        store: Arc<dyn StorageGateway>,
        system_probe: Arc<dyn SystemProbe>,
        performance_probe: Arc<dyn PerformanceProbe>,
        inspector: Arc<dyn ComplianceInspector>,
        tables: TableNames,
        config: CollectorConfig,
    ) -> Self {
        Self {
            store,
            system_probe,
            performance_probe,
            inspector,
            tables,
            config,
        }
    }

    /// Collect the current cycle's samples from all four domains.
    ///
    /// The gatherers run concurrently; each one's failure is logged and
    /// contributes zero samples without disturbing the others. The
    /// returned sequence is domain-grouped in a fixed order.
    #[instrument(skip(self))]
    pub async fn collect(&self) -> Vec<MetricSample> {
        info!("Collecting metrics");

        let (system, business, security, performance) = futures::join!(
            guard("system", system::gather(self.system_probe.as_ref(), &self.config)),
            guard(
                "business",
                business::gather(self.store.as_ref(), &self.tables, &self.config),
            ),
            guard(
                "security",
                security::gather(
                    self.store.as_ref(),
                    self.inspector.as_ref(),
                    &self.tables,
                    &self.config,
                ),
            ),
            guard(
                "performance",
                performance::gather(self.performance_probe.as_ref(), &self.config),
            ),
        );

        let mut samples = system;
        samples.extend(business);
        samples.extend(security);
        samples.extend(performance);

        info!(sample_count = samples.len(), "Metrics collection completed");
        samples
    }
}

/// Run one domain gatherer, logging and absorbing its failure.
async fn guard<F>(domain: &'static str, gather: F) -> Vec<MetricSample>
where
    F: Future<Output = Result<Vec<MetricSample>>>,
{
    match gather.await {
        Ok(samples) => samples,
        Err(e) => {
            error!(domain, "Failed to collect {} metrics: {}", domain, e);
            Vec::new()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
