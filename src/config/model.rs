//! Configuration data structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure containing all agent settings.
///
/// A parsed document is immutable: readers only ever see whole documents,
/// replaced wholesale by the config watcher on reload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AgentConfig {
    /// Common application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Process statistics collection settings.
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// eBPF program settings.
    #[serde(default)]
    pub ebpf: EbpfConfig,

    /// Control groups settings.
    #[serde(default)]
    pub cgroups: CgroupsConfig,

    /// Alert notification settings.
    #[serde(default)]
    pub alerting: AlertingConfig,

    /// Prometheus metrics export settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

/// Common application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Port for the REST API server.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Port for the gRPC server.
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,
}

/// Process statistics collection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringConfig {
    /// Interval in seconds between collection passes.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Path to the proc filesystem (overridable for testing).
    #[serde(default = "default_proc_path")]
    pub proc_path: PathBuf,
}

impl MonitoringConfig {
    /// Returns the collection interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// eBPF monitoring settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EbpfConfig {
    /// Whether eBPF monitoring is enabled.
    #[serde(default)]
    pub enabled: bool,

    /// Programs to load when enabled.
    #[serde(default)]
    pub programs: Vec<EbpfProgram>,
}

/// A single eBPF program to attach.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EbpfProgram {
    /// Identifies the program.
    pub name: String,

    /// Attachment type.
    pub probe_type: ProbeType,

    /// System call or tracepoint to monitor.
    pub target: String,
}

/// Supported eBPF attachment types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeType {
    /// Kernel function entry probe.
    Kprobe,
    /// Static kernel tracepoint.
    Tracepoint,
}

impl std::fmt::Display for ProbeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kprobe => write!(f, "kprobe"),
            Self::Tracepoint => write!(f, "tracepoint"),
        }
    }
}

/// Control groups settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CgroupsConfig {
    /// Path to the cgroups v2 filesystem.
    #[serde(default = "default_cgroups_path")]
    pub base_path: PathBuf,

    /// Default I/O weight (1-100).
    #[serde(default = "default_weight")]
    pub default_weight: u32,
}

/// Alert notification settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AlertingConfig {
    /// Disk latency alert threshold in milliseconds.
    #[serde(default)]
    pub disk_latency_threshold_ms: u64,

    /// Maximum I/O operations per second before alerting.
    #[serde(default)]
    pub iops_threshold: u64,

    /// Enabled notification methods ("slack", "email").
    #[serde(default)]
    pub notify_methods: Vec<String>,

    /// Slack webhook settings.
    #[serde(default)]
    pub slack: Option<SlackConfig>,

    /// Email notification settings.
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

/// Slack webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlackConfig {
    /// Incoming webhook URL.
    pub webhook_url: String,

    /// Target channel for alerts.
    #[serde(default)]
    pub channel: String,
}

/// SMTP notification settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailConfig {
    /// SMTP server address.
    pub smtp_server: String,

    /// Sender address.
    pub from: String,

    /// Recipient address.
    pub to: String,
}

/// Prometheus metrics export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrometheusConfig {
    /// Whether to serve the metrics endpoint.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// HTTP path of the metrics endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Port for the metrics HTTP server.
    #[serde(default = "default_prometheus_port")]
    pub port: u16,
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_grpc_port() -> u16 {
    50051
}

fn default_interval() -> u64 {
    5
}

fn default_proc_path() -> PathBuf {
    PathBuf::from("/proc")
}

fn default_cgroups_path() -> PathBuf {
    PathBuf::from("/sys/fs/cgroup")
}

fn default_weight() -> u32 {
    100
}

fn default_endpoint() -> String {
    "/metrics".to_string()
}

fn default_prometheus_port() -> u16 {
    9090
}

fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            http_port: default_http_port(),
            grpc_port: default_grpc_port(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            proc_path: default_proc_path(),
        }
    }
}

impl Default for CgroupsConfig {
    fn default() -> Self {
        Self {
            base_path: default_cgroups_path(),
            default_weight: default_weight(),
        }
    }
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_endpoint(),
            port: default_prometheus_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_fills_defaults() {
        let config: AgentConfig = serde_yaml::from_str("general:\n  http_port: 8080\n").unwrap();

        assert_eq!(config.general.http_port, 8080);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.monitoring.interval_seconds, 5);
        assert_eq!(config.monitoring.proc_path, PathBuf::from("/proc"));
        assert!(config.prometheus.enabled);
        assert_eq!(config.prometheus.port, 9090);
        assert!(config.alerting.slack.is_none());
    }

    #[test]
    fn serialized_document_reloads_identically() {
        let config: AgentConfig = serde_yaml::from_str(
            r##"
general:
  log_level: debug
  http_port: 8081
  grpc_port: 50052
monitoring:
  interval_seconds: 10
  proc_path: /proc
ebpf:
  enabled: true
  programs:
    - name: io_uring_enter
      probe_type: kprobe
      target: sys_io_uring_enter
alerting:
  disk_latency_threshold_ms: 200
  iops_threshold: 10000
  notify_methods: [slack, email]
  slack:
    webhook_url: https://hooks.slack.com/services/T000/B000/XXX
    channel: "#alerts"
  email:
    smtp_server: smtp.example.com:587
    from: diskmon@example.com
    to: ops@example.com
prometheus:
  enabled: true
  endpoint: /metrics
  port: 9100
"##,
        )
        .unwrap();

        let yaml = serde_yaml::to_string(&config).unwrap();
        let reloaded: AgentConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, reloaded);
    }

    #[test]
    fn unknown_probe_type_is_rejected() {
        let result: Result<AgentConfig, _> = serde_yaml::from_str(
            "ebpf:\n  enabled: true\n  programs:\n    - name: x\n      probe_type: uprobe\n      target: y\n",
        );
        assert!(result.is_err());
    }
}
