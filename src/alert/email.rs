//! Email alert transport.
//!
//! Placeholder: composes the message and logs it instead of speaking SMTP.
//! TODO: wire up an actual SMTP client once the mail relay is provisioned.

use tracing::info;

use crate::config::model::EmailConfig;
use crate::error::AlertError;

use super::Alert;

/// Composes alert emails for the configured recipient.
pub struct EmailNotifier {
    smtp_server: String,
    from: String,
    to: String,
}

impl EmailNotifier {
    /// Creates a notifier from config.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            smtp_server: config.smtp_server.clone(),
            from: config.from.clone(),
            to: config.to.clone(),
        }
    }

    /// Logs the composed message in place of delivery.
    pub async fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        let subject = format!("[diskmon] {}", alert.kind);
        let body = format!(
            "{}\nobserved: {}\nthreshold: {}\ntime: {}",
            alert.message, alert.observed, alert.threshold, alert.at
        );

        info!(
            smtp_server = %self.smtp_server,
            from = %self.from,
            to = %self.to,
            subject = %subject,
            body = %body,
            "email alert composed (delivery not yet implemented)"
        );
        Ok(())
    }
}
