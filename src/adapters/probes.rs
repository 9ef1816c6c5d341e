//! Instrumentation Probe Adapters
//!
//! Implements the `SystemProbe`, `PerformanceProbe`, and
//! `ComplianceInspector` ports. Real host/request instrumentation lives
//! outside this service; the synthetic probes stand in for it with
//! plausible readings, and the static variants give tests deterministic
//! values and injectable failures.

use std::collections::HashSet;

use async_trait::async_trait;
use rand::Rng;

use crate::domain::model::ComplianceCategory;
use crate::domain::ports::{
    ComplianceInspector, NetworkIo, PerformanceProbe, ResponseTimes, SystemProbe,
};
use crate::error::{Error, Result};

// =============================================================================
// Synthetic Probes
// =============================================================================

/// System probe producing random-but-plausible host readings.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSystemProbe;

impl SyntheticSystemProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SystemProbe for SyntheticSystemProbe {
    async fn cpu_usage(&self) -> Result<f64> {
        Ok(rand::thread_rng().gen_range(0.0..100.0))
    }

    async fn memory_usage(&self) -> Result<f64> {
        Ok(rand::thread_rng().gen_range(0.0..100.0))
    }

    async fn disk_usage(&self) -> Result<f64> {
        Ok(rand::thread_rng().gen_range(0.0..100.0))
    }

    async fn network_io(&self) -> Result<NetworkIo> {
        let mut rng = rand::thread_rng();
        Ok(NetworkIo {
            bytes_in: rng.gen_range(0.0..1_000_000.0),
            bytes_out: rng.gen_range(0.0..500_000.0),
        })
    }
}

/// Performance probe producing random-but-plausible request-path readings.
#[derive(Debug, Clone, Default)]
pub struct SyntheticPerformanceProbe;

impl SyntheticPerformanceProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PerformanceProbe for SyntheticPerformanceProbe {
    async fn response_times(&self) -> Result<ResponseTimes> {
        let mut rng = rand::thread_rng();
        Ok(ResponseTimes {
            avg: rng.gen_range(0.0..500.0),
            p95: rng.gen_range(0.0..1_000.0),
            p99: rng.gen_range(0.0..2_000.0),
        })
    }

    async fn error_rate(&self) -> Result<f64> {
        Ok(rand::thread_rng().gen_range(0.0..5.0))
    }

    async fn throughput(&self) -> Result<f64> {
        Ok(rand::thread_rng().gen_range(0.0..100.0))
    }
}

// =============================================================================
// Static Probes (deterministic; failure-injectable)
// =============================================================================

/// System probe returning fixed readings, optionally failing.
#[derive(Debug, Clone)]
pub struct StaticSystemProbe {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub network: NetworkIo,
    pub failing: bool,
}

impl Default for StaticSystemProbe {
    fn default() -> Self {
        Self {
            cpu: 25.0,
            memory: 40.0,
            disk: 55.0,
            network: NetworkIo {
                bytes_in: 1_024.0,
                bytes_out: 512.0,
            },
            failing: false,
        }
    }
}

impl StaticSystemProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe whose every reading errors.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(Error::Collection {
                domain: "system".to_string(),
                reason: "probe unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SystemProbe for StaticSystemProbe {
    async fn cpu_usage(&self) -> Result<f64> {
        self.check()?;
        Ok(self.cpu)
    }

    async fn memory_usage(&self) -> Result<f64> {
        self.check()?;
        Ok(self.memory)
    }

    async fn disk_usage(&self) -> Result<f64> {
        self.check()?;
        Ok(self.disk)
    }

    async fn network_io(&self) -> Result<NetworkIo> {
        self.check()?;
        Ok(self.network)
    }
}

/// Performance probe returning fixed readings, optionally failing.
#[derive(Debug, Clone)]
pub struct StaticPerformanceProbe {
    pub times: ResponseTimes,
    pub error_rate: f64,
    pub throughput: f64,
    pub failing: bool,
}

impl Default for StaticPerformanceProbe {
    fn default() -> Self {
        Self {
            times: ResponseTimes {
                avg: 120.0,
                p95: 450.0,
                p99: 900.0,
            },
            error_rate: 1.5,
            throughput: 42.0,
            failing: false,
        }
    }
}

impl StaticPerformanceProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(Error::Collection {
                domain: "performance".to_string(),
                reason: "probe unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PerformanceProbe for StaticPerformanceProbe {
    async fn response_times(&self) -> Result<ResponseTimes> {
        self.check()?;
        Ok(self.times)
    }

    async fn error_rate(&self) -> Result<f64> {
        self.check()?;
        Ok(self.error_rate)
    }

    async fn throughput(&self) -> Result<f64> {
        self.check()?;
        Ok(self.throughput)
    }
}

// =============================================================================
// Static Compliance Inspector
// =============================================================================

/// Compliance inspector with configurable predicate answers.
///
/// The platform's control-plane checks are not wired in yet; production
/// runs use the defaults (everything configured), and tests flip
/// individual predicates or fail whole categories.
#[derive(Debug, Clone)]
pub struct StaticInspector {
    pub encryption: bool,
    pub access_controls: bool,
    pub authentication: bool,
    pub anonymization: bool,
    pub retention: bool,
    pub consent: bool,
    pub audit_logging: bool,
    pub change_management: bool,
    pub backups: bool,
    pub monitoring: bool,
    failing_categories: HashSet<ComplianceCategory>,
}

impl Default for StaticInspector {
    fn default() -> Self {
        Self {
            encryption: true,
            access_controls: true,
            authentication: true,
            anonymization: true,
            retention: true,
            consent: true,
            audit_logging: true,
            change_management: true,
            backups: true,
            monitoring: true,
            failing_categories: HashSet::new(),
        }
    }
}

impl StaticInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every predicate of a category return an error.
    pub fn with_failing_category(mut self, category: ComplianceCategory) -> Self {
        self.failing_categories.insert(category);
        self
    }

    fn answer(&self, category: ComplianceCategory, value: bool) -> Result<bool> {
        if self.failing_categories.contains(&category) {
            return Err(Error::Inspection(format!(
                "{} inspection unavailable",
                category
            )));
        }
        Ok(value)
    }
}

#[async_trait]
impl ComplianceInspector for StaticInspector {
    async fn encryption_enabled(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Security, self.encryption)
    }

    async fn access_controls_configured(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Security, self.access_controls)
    }

    async fn authentication_configured(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Security, self.authentication)
    }

    async fn data_anonymized(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Privacy, self.anonymization)
    }

    async fn data_retention_configured(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Privacy, self.retention)
    }

    async fn consent_managed(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Privacy, self.consent)
    }

    async fn audit_logging_configured(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Governance, self.audit_logging)
    }

    async fn change_management_configured(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Governance, self.change_management)
    }

    async fn backups_configured(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Operational, self.backups)
    }

    async fn monitoring_configured(&self) -> Result<bool> {
        self.answer(ComplianceCategory::Operational, self.monitoring)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_synthetic_system_probe_in_range() {
        let probe = SyntheticSystemProbe::new();

        for _ in 0..32 {
            let cpu = probe.cpu_usage().await.unwrap();
            assert!((0.0..100.0).contains(&cpu));
        }

        let io = probe.network_io().await.unwrap();
        assert!(io.bytes_in >= 0.0);
        assert!(io.bytes_out >= 0.0);
    }

    #[tokio::test]
    async fn test_synthetic_performance_probe_in_range() {
        let probe = SyntheticPerformanceProbe::new();
        let times = probe.response_times().await.unwrap();
        assert!((0.0..500.0).contains(&times.avg));
        assert!((0.0..2_000.0).contains(&times.p99));
    }

    #[tokio::test]
    async fn test_static_probe_failure_injection() {
        let probe = StaticSystemProbe::failing();
        assert!(probe.cpu_usage().await.is_err());
        assert!(probe.network_io().await.is_err());

        let probe = StaticSystemProbe::new();
        assert_eq!(probe.cpu_usage().await.unwrap(), 25.0);
    }

    #[tokio::test]
    async fn test_static_inspector_defaults_pass() {
        let inspector = StaticInspector::new();
        assert!(inspector.encryption_enabled().await.unwrap());
        assert!(inspector.consent_managed().await.unwrap());
        assert!(inspector.monitoring_configured().await.unwrap());
    }

    #[tokio::test]
    async fn test_static_inspector_category_failure_is_scoped() {
        let inspector =
            StaticInspector::new().with_failing_category(ComplianceCategory::Governance);

        assert!(inspector.audit_logging_configured().await.is_err());
        assert!(inspector.change_management_configured().await.is_err());
        // Other categories unaffected
        assert!(inspector.encryption_enabled().await.is_ok());
        assert!(inspector.backups_configured().await.is_ok());
    }
}
