//! Threshold evaluation and alert dispatch.
//!
//! Only `alerting.iops_threshold` is evaluated today, and against the
//! aggregate byte rate between samples: `/proc/<pid>/io` exposes byte
//! counters, not operation counts or latencies.
//! `alerting.disk_latency_threshold_ms` is parsed and carried so configs
//! stay forward-compatible, but nothing trips it yet.
//! TODO: evaluate disk_latency_threshold_ms once the ebpf probes report
//! per-request latency.

pub mod email;
pub mod slack;

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::collector::IoSample;
use crate::config::model::AlertingConfig;
use crate::config::LiveConfig;

pub use email::EmailNotifier;
pub use slack::SlackNotifier;

/// A threshold violation ready for dispatch.
#[derive(Debug, Clone)]
pub struct Alert {
    /// Short machine-friendly kind, e.g. "write_throughput".
    pub kind: &'static str,
    /// Human-readable description.
    pub message: String,
    /// The observed value that tripped the threshold.
    pub observed: u64,
    /// The configured threshold.
    pub threshold: u64,
    /// When the violation was observed.
    pub at: DateTime<Utc>,
}

/// Evaluates samples against the alerting thresholds and fans alerts out to
/// the transports named in `notify_methods`.
///
/// Holds a [`LiveConfig`] clone and re-reads thresholds and transport
/// settings per sample, so alerting changes apply without a restart.
pub struct AlertDispatcher {
    config: LiveConfig,
    last_sample: Option<IoSample>,
}

impl AlertDispatcher {
    /// Creates a dispatcher reading thresholds from `config`.
    pub fn new(config: LiveConfig) -> Self {
        Self {
            config,
            last_sample: None,
        }
    }

    /// Evaluates one sample, dispatching any violations.
    pub async fn handle_sample(&mut self, sample: IoSample) {
        let snapshot = self.config.current();
        let alerting = &snapshot.alerting;
        let interval = snapshot.monitoring.interval_seconds.max(1);

        if let Some(alert) = Self::evaluate(alerting, self.last_sample.as_ref(), &sample, interval)
        {
            self.dispatch(alerting, &alert).await;
        }
        self.last_sample = Some(sample);
    }

    /// Compares the write throughput since the previous sample against the
    /// configured IOPS threshold. Counters are cumulative, so the first
    /// sample only establishes a baseline.
    fn evaluate(
        alerting: &AlertingConfig,
        previous: Option<&IoSample>,
        current: &IoSample,
        interval_seconds: u64,
    ) -> Option<Alert> {
        if alerting.iops_threshold == 0 {
            return None;
        }
        let previous = previous?;

        let delta = current
            .write_bytes
            .saturating_sub(previous.write_bytes)
            .saturating_add(current.read_bytes.saturating_sub(previous.read_bytes));
        let per_second = delta / interval_seconds;

        if per_second <= alerting.iops_threshold {
            return None;
        }

        Some(Alert {
            kind: "io_throughput",
            message: format!(
                "process I/O throughput {per_second} bytes/s exceeded the configured threshold"
            ),
            observed: per_second,
            threshold: alerting.iops_threshold,
            at: Utc::now(),
        })
    }

    /// Sends the alert through every configured transport.
    async fn dispatch(&self, alerting: &AlertingConfig, alert: &Alert) {
        for method in &alerting.notify_methods {
            match method.as_str() {
                "slack" => match &alerting.slack {
                    Some(slack_config) => {
                        let notifier = SlackNotifier::new(slack_config);
                        if let Err(e) = notifier.send(alert).await {
                            error!(error = %e, "slack alert dispatch failed");
                        }
                    }
                    None => warn!("slack listed in notify_methods but not configured"),
                },
                "email" => match &alerting.email {
                    Some(email_config) => {
                        let notifier = EmailNotifier::new(email_config);
                        if let Err(e) = notifier.send(alert).await {
                            error!(error = %e, "email alert dispatch failed");
                        }
                    }
                    None => warn!("email listed in notify_methods but not configured"),
                },
                other => warn!(method = %other, "unknown notify method"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(iops: u64) -> AlertingConfig {
        AlertingConfig {
            iops_threshold: iops,
            ..AlertingConfig::default()
        }
    }

    fn sample(read: u64, write: u64) -> IoSample {
        IoSample {
            read_bytes: read,
            write_bytes: write,
            cancelled_write_bytes: 0,
            processes: 1,
        }
    }

    #[test]
    fn first_sample_only_sets_the_baseline() {
        let alert = AlertDispatcher::evaluate(&thresholds(10), None, &sample(0, 1_000_000), 5);
        assert!(alert.is_none());
    }

    #[test]
    fn throughput_above_threshold_alerts() {
        let previous = sample(0, 0);
        let current = sample(500, 1000);

        let alert =
            AlertDispatcher::evaluate(&thresholds(100), Some(&previous), &current, 5).unwrap();
        assert_eq!(alert.kind, "io_throughput");
        assert_eq!(alert.observed, 300);
        assert_eq!(alert.threshold, 100);
    }

    #[test]
    fn throughput_at_or_below_threshold_stays_quiet() {
        let previous = sample(0, 0);
        let current = sample(0, 500);

        let alert = AlertDispatcher::evaluate(&thresholds(100), Some(&previous), &current, 5);
        assert!(alert.is_none());
    }

    #[test]
    fn zero_threshold_disables_alerting() {
        let previous = sample(0, 0);
        let current = sample(u64::MAX, 0);

        let alert = AlertDispatcher::evaluate(&thresholds(0), Some(&previous), &current, 5);
        assert!(alert.is_none());
    }
}
