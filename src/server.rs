//! Query API Server
//!
//! Thin request router over the observability service's read accessors.
//! Paths are matched by substring (`/metrics`, `/logs`, `/alerts`,
//! `/compliance`); every response is a JSON envelope with a permissive
//! cross-origin header. Any failure, including an unrecognized path,
//! surfaces as a 500 envelope, never a raw error.

use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tracing::{error, info, instrument};

use crate::error::{self, Error, Result};
use crate::service::ObservabilityService;

/// Dispatch a request path to the matching query operation.
///
/// Returns the success envelope body, or the error that the caller maps
/// onto the failure envelope.
pub fn dispatch(path: &str, service: &ObservabilityService) -> Result<Value> {
    if path.contains("/metrics") {
        let metrics = service.metrics();
        Ok(json!({ "ok": true, "data": { "metrics": metrics, "count": metrics.len() } }))
    } else if path.contains("/logs") {
        let logs = service.logs();
        Ok(json!({ "ok": true, "data": { "logs": logs, "count": logs.len() } }))
    } else if path.contains("/alerts") {
        let alerts = service.alerts();
        Ok(json!({ "ok": true, "data": { "alerts": alerts, "count": alerts.len() } }))
    } else if path.contains("/compliance") {
        let checks = service.compliance_checks();
        Ok(json!({
            "ok": true,
            "data": { "complianceChecks": checks, "count": checks.len() }
        }))
    } else {
        Err(Error::InvalidEndpoint(path.to_string()))
    }
}

/// Route a request path to a full response: status code plus envelope.
#[instrument(skip(service))]
pub fn route(path: &str, service: &ObservabilityService) -> (StatusCode, Value) {
    info!(path, "Observability request received");

    match dispatch(path, service) {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(path, "Observability request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "ok": false,
                    "error": "Observability request failed",
                    "details": e.to_string(),
                }),
            )
        }
    }
}

fn to_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Serve the query API.
pub async fn run_query_server(addr: &str, service: Arc<ObservabilityService>) -> Result<()> {
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| error::Error::Internal(format!("Invalid query server address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| error::Error::Internal(format!("Failed to bind query server: {}", e)))?;

    info!("Query server listening on {}", addr);

    loop {
        let (stream, _) = listener
            .accept()
            .await
            .map_err(|e| error::Error::Internal(format!("Query server accept error: {}", e)))?;

        let io = TokioIo::new(stream);
        let service = service.clone();

        tokio::spawn(async move {
            let handler = service_fn(move |req: Request<hyper::body::Incoming>| {
                let service = service.clone();
                async move {
                    let (status, body) = route(req.uri().path(), &service);
                    Ok::<_, std::convert::Infallible>(to_response(status, &body))
                }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, handler).await {
                tracing::error!("Query server connection error: {}", e);
            }
        });
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::channels::ChannelRegistry;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::probes::{StaticInspector, StaticPerformanceProbe, StaticSystemProbe};
    use crate::alerts::{AlertEngine, AlertEngineConfig};
    use crate::collector::{CollectorConfig, MetricCollector};
    use crate::compliance::ComplianceMonitor;
    use crate::domain::ports::TableNames;
    use crate::publisher::MetricPublisher;
    use crate::service::ServiceConfig;

    fn build_service() -> Arc<ObservabilityService> {
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
            ComplianceMonitor::new(store, inspector, tables.compliance_checks.clone());

        ObservabilityService::new(
            collector,
            publisher,
            alert_engine,
            compliance_monitor,
            ServiceConfig::default(),
        )
    }

    #[test]
    fn test_compliance_route_empty_accumulator_is_ok() {
        let service = build_service();

        let (status, body) = route("/compliance", &service);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"]["count"], 0);
        assert!(body["data"]["complianceChecks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_path_is_500_invalid_endpoint() {
        let service = build_service();

        let (status, body) = route("/unknown", &service);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("Invalid endpoint"));
    }

    #[tokio::test]
    async fn test_metrics_route_reflects_accumulator() {
        let service = build_service();
        service.collect_once().await;

        let (status, body) = route("/observability/metrics", &service);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 20);
        assert_eq!(
            body["data"]["metrics"].as_array().unwrap().len(),
            20
        );
    }

    #[tokio::test]
    async fn test_logs_route() {
        let service = build_service();
        service.collect_once().await;

        let (status, body) = route("/logs", &service);

        assert_eq!(status, StatusCode::OK);
        let logs = body["data"]["logs"].as_array().unwrap();
        assert!(!logs.is_empty());
        assert!(logs[0]["requestId"].is_string());
    }

    #[test]
    fn test_alerts_route_empty_rule_set() {
        let service = build_service();

        let (status, body) = route("/alerts", &service);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 0);
    }

    #[test]
    fn test_response_headers() {
        let service = build_service();
        let (status, body) = route("/metrics", &service);
        let response = to_response(status, &body);

        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }
}
