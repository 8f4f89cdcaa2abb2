//! Prometheus metrics for the exporter.
//!
//! Exposes:
//! - `page_inbox_export_graph_requests_total` (counter by endpoint and status)
//! - `page_inbox_export_graph_request_duration_seconds` (histogram)
//! - `page_inbox_export_transcripts_written_total` (counter)
//! - `page_inbox_export_run_duration_seconds` (histogram)
//! - `page_inbox_export_runs_total` (counter with status)
//! - process metrics via `process` collector

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram, register_histogram_vec, register_int_counter,
    register_int_counter_vec, Encoder, Histogram, HistogramVec, IntCounter, IntCounterVec,
    TextEncoder,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Failed to register process collector: {}", err);
    }
});

pub(crate) static GRAPH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "page_inbox_export_graph_requests_total",
        "Graph API requests by endpoint kind and outcome",
        &["endpoint", "status"]
    )
    .expect("failed to register graph request counter")
});

static GRAPH_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    // Exponential buckets from 25ms up to ~50 seconds.
    let buckets =
        prometheus::exponential_buckets(0.025, 2.0, 12).expect("failed to create histogram buckets");
    register_histogram_vec!(
        "page_inbox_export_graph_request_duration_seconds",
        "Graph API request duration in seconds",
        &["endpoint"],
        buckets
    )
    .expect("failed to register graph request histogram")
});

static TRANSCRIPTS_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "page_inbox_export_transcripts_written_total",
        "Transcript files written"
    )
    .expect("failed to register transcript counter")
});

static RUN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    let buckets =
        prometheus::exponential_buckets(0.5, 2.0, 12).expect("failed to create histogram buckets");
    register_histogram!(
        "page_inbox_export_run_duration_seconds",
        "Export run duration in seconds",
        buckets
    )
    .expect("failed to register run duration histogram")
});

static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "page_inbox_export_runs_total",
        "Export runs by status",
        &["status"]
    )
    .expect("failed to register run counter")
});

/// Ensure collectors are registered.
fn init_collectors() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&GRAPH_REQUESTS);
    Lazy::force(&GRAPH_REQUEST_DURATION);
    Lazy::force(&TRANSCRIPTS_WRITTEN);
    Lazy::force(&RUN_DURATION);
    Lazy::force(&RUNS_TOTAL);
}

/// Record one Graph API call.
pub fn record_graph_request(endpoint: &'static str, status: &'static str, duration: Duration) {
    GRAPH_REQUESTS.with_label_values(&[endpoint, status]).inc();
    GRAPH_REQUEST_DURATION
        .with_label_values(&[endpoint])
        .observe(duration.as_secs_f64());
}

pub fn record_transcript_written() {
    TRANSCRIPTS_WRITTEN.inc();
}

/// Record export completion with duration and status.
pub fn record_run_result(duration: Duration, success: bool) {
    init_collectors();
    RUN_DURATION.observe(duration.as_secs_f64());
    RUNS_TOTAL
        .with_label_values(&[if success { "ok" } else { "error" }])
        .inc();
}

fn plain_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
}

async fn metrics_response() -> Result<Response<Full<Bytes>>, Infallible> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", err);
        return Ok(plain_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "encode error",
        ));
    }

    let mut response = plain_response(StatusCode::OK, buffer);
    if let Ok(content_type) = encoder.format_type().parse() {
        response
            .headers_mut()
            .insert(hyper::header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    match req.uri().path() {
        "/metrics" => metrics_response().await,
        _ => Ok(plain_response(StatusCode::NOT_FOUND, Bytes::new())),
    }
}

async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Prometheus metrics endpoint started");

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = service_fn(handle_request);
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(?peer, "Metrics connection error: {}", err);
            }
        });
    }
}

/// Spawn the metrics HTTP endpoint on the given address.
pub fn spawn_metrics_server(addr: SocketAddr) {
    init_collectors();
    tokio::spawn(async move {
        if let Err(err) = serve(addr).await {
            error!(%addr, "Metrics server failed: {}", err);
        }
    });
}
