//! Slack webhook alert transport.

use serde::Serialize;
use tracing::info;

use crate::config::model::SlackConfig;
use crate::error::AlertError;

use super::Alert;

/// Sends alerts to Slack via an incoming webhook.
pub struct SlackNotifier {
    webhook_url: String,
    channel: String,
    client: reqwest::Client,
}

/// Payload for the Slack incoming-webhook API.
#[derive(Serialize)]
struct SlackMessage<'a> {
    text: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    channel: &'a str,
}

impl SlackNotifier {
    /// Creates a notifier from config.
    pub fn new(config: &SlackConfig) -> Self {
        Self {
            webhook_url: config.webhook_url.clone(),
            channel: config.channel.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Posts the alert to the webhook.
    pub async fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        let message = SlackMessage {
            text: format!(
                ":rotating_light: *{}*: {} (observed {}, threshold {}) at {}",
                alert.kind, alert.message, alert.observed, alert.threshold, alert.at
            ),
            channel: &self.channel,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AlertError::SlackFailed(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        info!(kind = %alert.kind, "slack alert sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn alert() -> Alert {
        Alert {
            kind: "io_throughput",
            message: "write rate exceeded".to_string(),
            observed: 300,
            threshold: 100,
            at: Utc::now(),
        }
    }

    #[test]
    fn payload_carries_text_and_channel() {
        let alert = alert();
        let message = SlackMessage {
            text: format!("*{}*: {}", alert.kind, alert.message),
            channel: "#alerts",
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["channel"], "#alerts");
        assert!(value["text"].as_str().unwrap().contains("io_throughput"));
    }

    #[test]
    fn empty_channel_is_omitted_from_the_payload() {
        let message = SlackMessage {
            text: "alert".to_string(),
            channel: "",
        };

        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("channel").is_none());
        assert_eq!(value["text"], "alert");
    }
}

