//! Audit logging for delivery and notification lifecycle events
//!
//! All events are logged as structured tracing events with configurable PII
//! redaction.
//!
//! ## Audit Events
//!
//! - `DeliveryOutcome`: Local delivery completed, successfully or not
//! - `NotificationSent`: A disposition or failure notification went out
//! - `NotificationFailed`: A notification was produced but never sent
//!
//! ## PII Redaction
//!
//! Addresses in audit events can be redacted based on the [`AuditConfig`]
//! to comply with privacy regulations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging for delivery and notification events
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Redact the notification's own sender address (PII protection)
    #[serde(default)]
    pub redact_sender: bool,

    /// Redact the notified party's address (PII protection)
    #[serde(default)]
    pub redact_recipients: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_sender: false,
            redact_recipients: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Global audit configuration (thread-safe)
static AUDIT_CONFIG: std::sync::OnceLock<Arc<AuditConfig>> = std::sync::OnceLock::new();

/// Initialize audit logging with configuration
pub fn init(config: AuditConfig) {
    AUDIT_CONFIG.get_or_init(|| Arc::new(config));
}

/// Get the current audit configuration
#[must_use]
pub fn config() -> Arc<AuditConfig> {
    AUDIT_CONFIG
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::new(AuditConfig::default()))
}

/// Redact email address if redaction is enabled
#[must_use]
pub fn redact_email(email: &str, redact: bool) -> String {
    if redact {
        // Keep domain but redact local part
        if let Some((_, domain)) = email.split_once('@') {
            format!("[REDACTED]@{domain}")
        } else {
            "[REDACTED]".to_string()
        }
    } else {
        email.to_string()
    }
}

/// Log the outcome of one local delivery
///
/// # Fields
/// - `message_id`: Identifier of the delivered message, when it carried one
/// - `sender`: Effective sender (redacted if configured)
/// - `recipient_count`: Number of envelope recipients
/// - `outcome`: `delivered` or `failed`
pub fn log_delivery_outcome(
    message_id: Option<&str>,
    sender: &str,
    recipient_count: usize,
    outcome: &str,
) {
    let config = config();
    if !config.enabled {
        return;
    }

    let sender = redact_email(sender, config.redact_sender);

    tracing::event!(
        tracing::Level::INFO,
        event = "DeliveryOutcome",
        message_id = %message_id.unwrap_or(""),
        sender = %sender,
        recipient_count = recipient_count,
        outcome = %outcome,
        "Audit: Local delivery outcome"
    );
}

/// Log a notification send
///
/// # Fields
/// - `notification_id`: Message id assigned to the notification
/// - `kind`: `dispatched` or `failed`
/// - `from`: Address the notification claims to be from (redacted if configured)
/// - `to`: Notified party (redacted if configured)
/// - `original_message_id`: Identifier of the message being reported on
/// - `disposition`: Disposition field extracted from the notification body
pub fn log_notification_sent(
    notification_id: &str,
    kind: &str,
    from: &str,
    to: &str,
    original_message_id: Option<&str>,
    disposition: Option<&str>,
) {
    let config = config();
    if !config.enabled {
        return;
    }

    let from = redact_email(from, config.redact_sender);
    let to = redact_email(to, config.redact_recipients);

    tracing::event!(
        tracing::Level::INFO,
        event = "NotificationSent",
        notification_id = %notification_id,
        kind = %kind,
        from = %from,
        to = %to,
        original_message_id = %original_message_id.unwrap_or(""),
        disposition = %disposition.unwrap_or(""),
        "Audit: Notification sent"
    );
}

/// Log a notification that was produced but never made it out
///
/// # Fields
/// - `kind`: `dispatched` or `failed`
/// - `original_message_id`: Identifier of the message being reported on
/// - `error`: Why the notification was dropped
pub fn log_notification_failed(kind: &str, original_message_id: Option<&str>, error: &str) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::WARN,
        event = "NotificationFailed",
        kind = %kind,
        original_message_id = %original_message_id.unwrap_or(""),
        error = %error,
        "Audit: Notification failed"
    );
}
