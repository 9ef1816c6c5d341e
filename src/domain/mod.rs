//! Domain layer
//!
//! Value types for the monitoring pipeline and the ports its components
//! depend on.

pub mod model;
pub mod ports;

pub use model::{
    Alert, AlertAction, AlertRule, AlertSeverity, ComplianceCategory, ComplianceCheck,
    ComplianceStatus, LogLevel, LogRecord, MetricSample, MetricUnit,
};
pub use ports::{
    AlertChannel, ComplianceInspector, NetworkIo, PerformanceProbe, QueryCondition, QueryResult,
    ResponseTimes, StorageGateway, SystemProbe, TableNames,
};
