//! System domain gatherer: host-level readings from the system probe.

use crate::collector::CollectorConfig;
use crate::domain::model::{MetricSample, MetricUnit};
use crate::domain::ports::SystemProbe;
use crate::error::Result;

/// Gather the five system samples: CPU, memory, disk, and network I/O.
pub async fn gather(
    probe: &dyn SystemProbe,
    config: &CollectorConfig,
) -> Result<Vec<MetricSample>> {
    let namespace = config.namespace("System");

    let cpu = probe.cpu_usage().await?;
    let memory = probe.memory_usage().await?;
    let disk = probe.disk_usage().await?;
    let network = probe.network_io().await?;

    Ok(vec![
        MetricSample::new("CPUUsage", cpu, MetricUnit::Percent, &namespace, &config.service),
        MetricSample::new(
            "MemoryUsage",
            memory,
            MetricUnit::Percent,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "DiskUsage",
            disk,
            MetricUnit::Percent,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "NetworkBytesIn",
            network.bytes_in,
            MetricUnit::Bytes,
            &namespace,
            &config.service,
        ),
        MetricSample::new(
            "NetworkBytesOut",
            network.bytes_out,
            MetricUnit::Bytes,
            &namespace,
            &config.service,
        ),
    ])
}
