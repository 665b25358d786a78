//! Prometheus metrics exporter.

use std::net::SocketAddr;
use std::sync::Arc;

use prometheus::{CounterVec, Gauge, Opts, Registry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::collector::IoSample;
use crate::config::LiveConfig;
use crate::error::ExporterError;

/// Prometheus metrics for the monitoring agent.
pub struct Metrics {
    /// Registry for all metrics.
    registry: Registry,
    /// Cumulative bytes read across monitored processes.
    pub io_read_bytes: Gauge,
    /// Cumulative bytes written across monitored processes.
    pub io_write_bytes: Gauge,
    /// Cumulative cancelled write bytes across monitored processes.
    pub io_cancelled_write_bytes: Gauge,
    /// Number of processes in the last sample.
    pub monitored_processes: Gauge,
    /// Config reload attempts by outcome.
    pub config_reloads_total: CounterVec,
}

impl Metrics {
    /// Creates a new metrics instance with all gauges registered.
    pub fn new() -> Result<Self, ExporterError> {
        let registry = Registry::new();

        let io_read_bytes = Gauge::new(
            "diskmon_io_read_bytes",
            "Cumulative bytes read across monitored processes",
        )
        .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;

        let io_write_bytes = Gauge::new(
            "diskmon_io_write_bytes",
            "Cumulative bytes written across monitored processes",
        )
        .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;

        let io_cancelled_write_bytes = Gauge::new(
            "diskmon_io_cancelled_write_bytes",
            "Cumulative cancelled write bytes across monitored processes",
        )
        .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;

        let monitored_processes = Gauge::new(
            "diskmon_monitored_processes",
            "Number of processes contributing to the last sample",
        )
        .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;

        let config_reloads_total = CounterVec::new(
            Opts::new(
                "diskmon_config_reloads_total",
                "Configuration reload attempts by outcome",
            ),
            &["outcome"],
        )
        .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;

        registry
            .register(Box::new(io_read_bytes.clone()))
            .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;
        registry
            .register(Box::new(io_write_bytes.clone()))
            .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;
        registry
            .register(Box::new(io_cancelled_write_bytes.clone()))
            .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;
        registry
            .register(Box::new(monitored_processes.clone()))
            .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;
        registry
            .register(Box::new(config_reloads_total.clone()))
            .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;

        Ok(Self {
            registry,
            io_read_bytes,
            io_write_bytes,
            io_cancelled_write_bytes,
            monitored_processes,
            config_reloads_total,
        })
    }

    /// Counts a reload that published a new document.
    pub fn record_reload_success(&self) {
        self.config_reloads_total
            .with_label_values(&["success"])
            .inc();
    }

    /// Counts a reload attempt that was discarded.
    pub fn record_reload_failure(&self) {
        self.config_reloads_total
            .with_label_values(&["failure"])
            .inc();
    }

    /// Records the counters from one collection pass.
    pub fn record_sample(&self, sample: &IoSample) {
        self.io_read_bytes.set(sample.read_bytes as f64);
        self.io_write_bytes.set(sample.write_bytes as f64);
        self.io_cancelled_write_bytes
            .set(sample.cancelled_write_bytes as f64);
        self.monitored_processes.set(sample.processes as f64);
    }

    /// Returns the metrics in Prometheus text format.
    pub fn gather(&self) -> Result<String, ExporterError> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| ExporterError::PrometheusFailed(e.to_string()))
    }
}

/// HTTP server exposing the metrics endpoint.
pub struct MetricsServer {
    metrics: Arc<Metrics>,
    config: LiveConfig,
}

impl MetricsServer {
    /// Creates a new metrics server.
    pub fn new(metrics: Arc<Metrics>, config: LiveConfig) -> Self {
        Self { metrics, config }
    }

    /// Serves the endpoint until `cancel` fires.
    ///
    /// The port is fixed at startup; the endpoint path is re-read from the
    /// live configuration on every request.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ExporterError> {
        use http_body_util::Full;
        use hyper::body::{Bytes, Incoming};
        use hyper::server::conn::http1;
        use hyper::service::service_fn;
        use hyper::{Request, Response};
        use hyper_util::rt::TokioIo;

        let port = self.config.current().prometheus.port;
        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?;

        info!(port, "prometheus metrics server started");

        loop {
            let (stream, _) = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("prometheus metrics server stopped");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    accepted.map_err(|e| ExporterError::PrometheusFailed(e.to_string()))?
                }
            };

            let io = TokioIo::new(stream);
            let metrics = self.metrics.clone();
            let config = self.config.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let metrics = metrics.clone();
                    let config = config.clone();
                    async move {
                        let endpoint = config.current().prometheus.endpoint.clone();
                        if req.uri().path() == endpoint {
                            let body = metrics.gather().unwrap_or_default();
                            Ok::<_, hyper::Error>(Response::new(Full::new(Bytes::from(body))))
                        } else {
                            Ok(Response::builder()
                                .status(404)
                                .body(Full::new(Bytes::from("Not Found")))
                                .unwrap())
                        }
                    }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    error!(error = %e, "metrics connection error");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_sample_shows_up_in_the_text_exposition() {
        let metrics = Metrics::new().unwrap();
        metrics.record_sample(&IoSample {
            read_bytes: 1234,
            write_bytes: 5678,
            cancelled_write_bytes: 9,
            processes: 3,
        });

        let text = metrics.gather().unwrap();
        assert!(text.contains("diskmon_io_read_bytes 1234"));
        assert!(text.contains("diskmon_io_write_bytes 5678"));
        assert!(text.contains("diskmon_monitored_processes 3"));
    }

    #[test]
    fn reload_outcomes_are_counted_per_label() {
        let metrics = Metrics::new().unwrap();
        metrics.record_reload_success();
        metrics.record_reload_success();
        metrics.record_reload_failure();

        let text = metrics.gather().unwrap();
        assert!(text.contains(r#"diskmon_config_reloads_total{outcome="success"} 2"#));
        assert!(text.contains(r#"diskmon_config_reloads_total{outcome="failure"} 1"#));
    }
}
