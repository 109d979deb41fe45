//! Positive disposition notification ("dispatched" MDN) generation per RFC 8098.
//!
//! # MDN Structure
//! ```text
//! multipart/report; report-type="disposition-notification"
//! ├── Part 1: text/plain (human-readable confirmation)
//! └── Part 2: message/disposition-notification (machine-readable fields)
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
    disposition::Disposition,
    error::NotifyError,
    notification::{NotificationKind, NotificationMessage, report_boundary},
};

/// Presentation settings for positive disposition notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Product name reported in `Reporting-UA` and the text part.
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Body text of the human-readable part.
    #[serde(default = "default_dispatched_text")]
    pub dispatched_text: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            dispatched_text: default_dispatched_text(),
        }
    }
}

fn default_agent_name() -> String {
    "Herald Local Delivery Agent".to_string()
}

fn default_dispatched_text() -> String {
    "Your message was successfully dispatched.".to_string()
}

/// Produces "dispatched" MDNs confirming final-destination delivery.
///
/// One notification is generated per delivered recipient, addressed from
/// that recipient back to the captured sender. A transaction without a
/// sender produces nothing; there is nobody to notify.
#[derive(Debug, Clone, Default)]
pub struct DispositionProducer {
    settings: NotificationSettings,
}

impl DispositionProducer {
    #[must_use]
    pub const fn new(settings: NotificationSettings) -> Self {
        Self { settings }
    }

    /// Build one notification per recipient.
    ///
    /// # Errors
    /// Fails only if an assembled notification does not parse back as a
    /// message, which indicates malformed captured headers.
    pub fn produce(
        &self,
        record: &TransactionRecord,
        recipients: &AddressList,
    ) -> Result<Vec<NotificationMessage>, NotifyError> {
        let Some(notify_target) = record.sender.as_ref() else {
            info!("Transaction has no sender, nothing to notify");
            return Ok(Vec::new());
        };

        info!(
            original_message_id = %record.message_id.as_deref().unwrap_or(""),
            recipient_count = recipients.len(),
            "Generating dispatched notifications"
        );

        recipients
            .iter()
            .map(|recipient| self.single(record, notify_target, recipient))
            .collect()
    }

    fn single(
        &self,
        record: &TransactionRecord,
        notify_target: &Address,
        recipient: &Address,
    ) -> Result<NotificationMessage, NotifyError> {
        let boundary = report_boundary();
        let subject = record.subject.as_deref().unwrap_or("");
        let original_message_id = record.message_id.as_deref().unwrap_or("");

        let human_readable = format!(
            "{}\r\n\
            \r\n\
            Final Recipient: {}",
            self.settings.dispatched_text,
            recipient.address(),
        );

        let mut machine_readable = format!(
            "Reporting-UA: {}; {}\r\n",
            recipient.domain().unwrap_or("localhost"),
            self.settings.agent_name,
        );
        let _ = write!(
            machine_readable,
            "Final-Recipient: rfc822; {}\r\n",
            recipient.address()
        );
        if !original_message_id.is_empty() {
            let _ = write!(machine_readable, "Original-Message-ID: {original_message_id}\r\n");
        }
        let _ = write!(machine_readable, "Disposition: {}", Disposition::dispatched());

        let body = format!(
            "Content-Type: multipart/report; report-type=\"disposition-notification\"; boundary=\"{boundary}\"\r\n\
            MIME-Version: 1.0\r\n\
            From: {from}\r\n\
            To: {to}\r\n\
            Subject: Dispatched: {subject}\r\n\
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
            Content-Type: message/disposition-notification\r\n\
            Content-Transfer-Encoding: 7bit\r\n\
            \r\n\
            {machine_readable}\r\n\
            --{boundary}--\r\n",
            boundary = boundary,
            from = recipient,
            to = notify_target,
            subject = subject,
            human_readable = human_readable,
            machine_readable = machine_readable,
        );

        let message = MailMessage::parse(body.as_bytes())?;
        Ok(NotificationMessage::new(
            NotificationKind::Dispatched,
            message,
        ))
    }
}
