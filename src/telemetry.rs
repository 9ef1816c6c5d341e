//! Self-telemetry
//!
//! Prometheus counters for the service's own activity, exposed on a
//! dedicated port alongside liveness/readiness endpoints.

use once_cell::sync::Lazy;
use prometheus::{register_counter, register_counter_vec, Counter, CounterVec, Encoder, TextEncoder};
use tracing::info;

use crate::error::{self, Result};

pub static COLLECTION_CYCLES: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "watchtower_collection_cycles_total",
        "Total number of metric collection cycles"
    )
    .expect("counter registration")
});

pub static SAMPLES_PUBLISHED: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "watchtower_samples_published_total",
        "Total number of metric samples persisted"
    )
    .expect("counter registration")
});

pub static ALERTS_FIRED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "watchtower_alerts_fired_total",
        "Total number of alerts fired",
        &["severity"]
    )
    .expect("counter registration")
});

pub static COMPLIANCE_RUNS: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "watchtower_compliance_runs_total",
        "Total number of compliance check runs"
    )
    .expect("counter registration")
});

/// Serve the Prometheus exposition endpoint plus health probes.
pub async fn run_telemetry_server(addr: &str) -> Result<()> {
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn telemetry_handler(
        req: Request<hyper::body::Incoming>,
    ) -> std::result::Result<Response<Full<Bytes>>, std::convert::Infallible> {
        let response = match req.uri().path() {
            "/metrics" => {
                let encoder = TextEncoder::new();
                let metric_families = prometheus::gather();
                let mut buffer = Vec::new();
                encoder.encode(&metric_families, &mut buffer).unwrap();

                Response::builder()
                    .status(StatusCode::OK)
                    .header("Content-Type", encoder.format_type())
                    .body(Full::new(Bytes::from(buffer)))
                    .unwrap()
            }
            "/healthz" | "/livez" | "/readyz" => Response::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::from("ok")))
                .unwrap(),
            _ => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Full::new(Bytes::from("not found")))
                .unwrap(),
        };
        Ok(response)
    }

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| error::Error::Internal(format!("Invalid telemetry server address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| error::Error::Internal(format!("Failed to bind telemetry server: {}", e)))?;

    info!("Telemetry server listening on {}", addr);

    loop {
        let (stream, _) = listener
            .accept()
            .await
            .map_err(|e| error::Error::Internal(format!("Telemetry server accept error: {}", e)))?;

        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .serve_connection(io, service_fn(telemetry_handler))
                .await
            {
                tracing::error!("Telemetry server connection error: {}", e);
            }
        });
    }
}
