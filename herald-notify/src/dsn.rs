//! Failure notification (DSN) generation per RFC 3464.
//!
//! When local delivery fails, the sender is told so with a bounce message.
//!
//! # DSN Structure
//! ```text
//! multipart/report; report-type="delivery-status"
//! ├── Part 1: text/plain (human-readable explanation)
//! ├── Part 2: message/delivery-status (machine-readable status)
//! └── Part 3: text/rfc822-headers (original message headers)
//! ```

use std::fmt::Write as _;

use herald_common::{
    address::{Address, AddressList},
    message::MailMessage,
    transaction::TransactionRecord,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::NotifyError,
    notification::{NotificationKind, NotificationMessage, report_boundary},
};

/// Configuration for failure notification generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsnConfig {
    /// Enable/disable failure notification generation globally
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Hostname for the Reporting-MTA field (FQDN of this gateway)
    #[serde(default = "default_reporting_mta")]
    pub reporting_mta: String,

    /// Mailbox failure notifications are sent from
    #[serde(default = "default_postmaster")]
    pub postmaster: String,
}

impl Default for DsnConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reporting_mta: default_reporting_mta(),
            postmaster: default_postmaster(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}

fn default_reporting_mta() -> String {
    "localhost".to_string()
}

fn default_postmaster() -> String {
    "postmaster@localhost".to_string()
}

/// Check if a failure notification should be generated for this transaction
///
/// Notifications are NOT generated for:
/// - Messages with a null or absent reverse-path (prevents bounce loops)
/// - Gateways with generation disabled outright
#[must_use]
pub fn should_notify_failure(config: &DsnConfig, record: &TransactionRecord) -> bool {
    if !config.enabled {
        return false;
    }

    !record.has_null_sender()
}

/// Producer of failure (delivery-status) notifications.
///
/// Resolved once at startup; hosts may install their own implementation to
/// change the report format or routing.
pub trait FailureNotificationProducer: Send + Sync {
    /// Whether a notification should be generated for this transaction.
    fn should_notify(&self, _record: &TransactionRecord) -> bool {
        true
    }

    /// Build the failure notification for this transaction.
    ///
    /// `permanent` selects the reported status class: `5.0.0` for permanent
    /// failures, `4.0.0` for transient ones that still ended delivery.
    ///
    /// # Errors
    /// Implementations fail when the transaction lacks what the report
    /// format needs, typically a sender to address it to.
    fn create(
        &self,
        record: &TransactionRecord,
        recipients: &AddressList,
        permanent: bool,
    ) -> Result<NotificationMessage, NotifyError>;
}

/// Stock RFC 3464 failure notification producer.
#[derive(Debug, Clone, Default)]
pub struct DeliveryFailureProducer {
    config: DsnConfig,
}

impl DeliveryFailureProducer {
    #[must_use]
    pub const fn new(config: DsnConfig) -> Self {
        Self { config }
    }
}

impl FailureNotificationProducer for DeliveryFailureProducer {
    fn should_notify(&self, record: &TransactionRecord) -> bool {
        should_notify_failure(&self.config, record)
    }

    fn create(
        &self,
        record: &TransactionRecord,
        recipients: &AddressList,
        permanent: bool,
    ) -> Result<NotificationMessage, NotifyError> {
        info!(
            original_message_id = %record.message_id.as_deref().unwrap_or(""),
            "Generating failure notification"
        );

        let sender = record.sender.as_ref().ok_or(NotifyError::MissingSender)?;

        let boundary = report_boundary();
        let human_readable = build_human_readable_part(&self.config, sender, recipients, record);
        let machine_readable = build_machine_readable_part(&self.config, recipients, permanent);
        let original_headers = build_original_headers_part(sender, recipients, record);

        let body = format!(
            "Content-Type: multipart/report; report-type=\"delivery-status\"; boundary=\"{boundary}\"\r\n\
            MIME-Version: 1.0\r\n\
            From: Mail Delivery System <{postmaster}>\r\n\
            To: {sender}\r\n\
            Subject: Delivery Status Notification (Failure)\r\n\
            Auto-Submitted: auto-replied\r\n\
            \r\n\
            This is a multi-part message in MIME format.\r\n\
            \r\n\
            --{boundary}\r\n\
            Content-Type: text/plain; charset=utf-8\r\n\
            Content-Transfer-Encoding: 7bit\r\n\
            \r\n\
            {human_readable}\r\n\
            --{boundary}\r\n\
            Content-Type: message/delivery-status\r\n\
            Content-Transfer-Encoding: 7bit\r\n\
            \r\n\
            {machine_readable}\r\n\
            --{boundary}\r\n\
            Content-Type: text/rfc822-headers\r\n\
            Content-Transfer-Encoding: 7bit\r\n\
            \r\n\
            {original_headers}\r\n\
            --{boundary}--\r\n",
            boundary = boundary,
            postmaster = self.config.postmaster,
            sender = sender,
            human_readable = human_readable,
            machine_readable = machine_readable,
            original_headers = original_headers,
        );

        let message = MailMessage::parse(body.as_bytes())?;
        Ok(NotificationMessage::new(NotificationKind::Failed, message))
    }
}

/// Build the human-readable text part (Part 1)
fn build_human_readable_part(
    config: &DsnConfig,
    sender: &Address,
    recipients: &AddressList,
    record: &TransactionRecord,
) -> String {
    let recipient_list = recipients
        .iter()
        .map(Address::address)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "This is the mail system at host {mta}.\n\
        \n\
        I'm sorry to have to inform you that your message could not\n\
        be delivered to one or more recipients.\n\
        \n\
        Message details:\n\
        - Original sender: {sender}\n\
        - Failed recipient(s): {recipient_list}\n\
        - Subject: {subject}\n",
        mta = config.reporting_mta,
        sender = sender,
        recipient_list = recipient_list,
        subject = record.subject.as_deref().unwrap_or("(no subject)"),
    )
}

/// Build the machine-readable delivery status part (Part 2)
fn build_machine_readable_part(
    config: &DsnConfig,
    recipients: &AddressList,
    permanent: bool,
) -> String {
    let (status_code, action) = if permanent {
        ("5.0.0", "failed")
    } else {
        ("4.0.0", "failed") // Transient failure that still ended delivery
    };

    // Per-message fields (mandatory: Reporting-MTA)
    let mut dsn = format!("Reporting-MTA: dns; {}\r\n", config.reporting_mta);
    let _ = write!(dsn, "Arrival-Date: {}\r\n", chrono::Utc::now().to_rfc2822());

    // Per-recipient fields (one group per recipient)
    for recipient in recipients.iter() {
        dsn.push_str("\r\n"); // Blank line separates per-recipient groups

        let _ = write!(dsn, "Final-Recipient: rfc822; {}\r\n", recipient.address());
        let _ = write!(dsn, "Action: {action}\r\n");
        let _ = write!(dsn, "Status: {status_code}\r\n");
        let _ = write!(dsn, "Diagnostic-Code: smtp; local delivery failed\r\n");
    }

    dsn
}

/// Build the original message headers part (Part 3), reconstructed from the
/// identity snapshot since the message itself is gone by the time a report
/// is generated
fn build_original_headers_part(
    sender: &Address,
    recipients: &AddressList,
    record: &TransactionRecord,
) -> String {
    let mut headers = String::new();
    if let Some(message_id) = &record.message_id {
        let _ = write!(headers, "Message-ID: {message_id}\r\n");
    }
    let _ = write!(headers, "From: {sender}\r\n");
    let _ = write!(headers, "To: {recipients}\r\n");
    if let Some(subject) = &record.subject {
        let _ = write!(headers, "Subject: {subject}\r\n");
    }

    headers
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use herald_common::transaction::MessageKind;
    use mailparse::MailAddr;
    use pretty_assertions::assert_eq;

    use super::*;

    fn record() -> TransactionRecord {
        TransactionRecord {
            kind: MessageKind::Interpersonal,
            reliable_and_timely: false,
            message_id: Some("<original-1@origin.example>".to_string()),
            subject: Some("Lab results".to_string()),
            sender: Some(Address::parse("alice@origin.example").unwrap()),
            recipients: None,
        }
    }

    fn recipients() -> AddressList {
        AddressList::parse("bob@dest.example").unwrap()
    }

    #[test]
    fn test_should_notify_ordinary_failure() {
        assert!(should_notify_failure(&DsnConfig::default(), &record()));
    }

    #[test]
    fn test_should_not_notify_null_sender() {
        let mut record = record();
        // Null sender (this message is itself a bounce)
        record.sender = Some(Address(MailAddr::Single(mailparse::SingleInfo {
            display_name: None,
            addr: String::new(),
        })));
        assert!(!should_notify_failure(&DsnConfig::default(), &record));

        record.sender = None;
        assert!(!should_notify_failure(&DsnConfig::default(), &record));
    }

    #[test]
    fn test_should_not_notify_when_disabled() {
        let config = DsnConfig {
            enabled: false,
            ..DsnConfig::default()
        };
        assert!(!should_notify_failure(&config, &record()));
    }

    #[test]
    fn test_create_builds_valid_report() {
        let producer = DeliveryFailureProducer::default();
        let notification = producer.create(&record(), &recipients(), false).unwrap();

        assert_eq!(notification.kind(), NotificationKind::Failed);

        let message = notification.message();
        assert!(message.header("From").unwrap().contains("postmaster@localhost"));
        assert!(message.header("To").unwrap().contains("alice@origin.example"));
        assert_eq!(
            message.subject(),
            Some("Delivery Status Notification (Failure)")
        );

        let body = String::from_utf8(message.to_bytes()).unwrap();
        assert!(body.contains("multipart/report"));
        assert!(body.contains("delivery-status"));
        assert!(body.contains("Reporting-MTA: dns; localhost"));
        assert!(body.contains("Final-Recipient: rfc822; bob@dest.example"));
        assert!(body.contains("Action: failed"));
        assert!(body.contains("Status: 4.0.0"));
        assert!(body.contains("text/rfc822-headers"));
        assert!(body.contains("Message-ID: <original-1@origin.example>"));
        assert!(body.contains("Subject: Lab results"));
    }

    #[test]
    fn test_create_permanent_reports_five_class_status() {
        let producer = DeliveryFailureProducer::default();
        let notification = producer.create(&record(), &recipients(), true).unwrap();

        let body = String::from_utf8(notification.message().to_bytes()).unwrap();
        assert!(body.contains("Status: 5.0.0"));
    }

    #[test]
    fn test_create_without_sender_fails() {
        let mut record = record();
        record.sender = None;

        let producer = DeliveryFailureProducer::default();
        let error = producer.create(&record, &recipients(), false).unwrap_err();
        assert!(error.is_missing_sender());
    }

    #[test]
    fn test_created_notification_classifies_as_dsn() {
        let producer = DeliveryFailureProducer::default();
        let notification = producer.create(&record(), &recipients(), false).unwrap();

        assert_eq!(
            MessageKind::classify(notification.message()),
            MessageKind::Dsn
        );
    }

    #[test]
    fn test_per_recipient_groups() {
        let producer = DeliveryFailureProducer::default();
        let recipients = AddressList::parse("bob@dest.example, carol@dest.example").unwrap();
        let notification = producer.create(&record(), &recipients, false).unwrap();

        let body = String::from_utf8(notification.message().to_bytes()).unwrap();
        assert_eq!(body.matches("Final-Recipient: rfc822;").count(), 2);
        assert_eq!(body.matches("Action: failed").count(), 2);
    }
}
