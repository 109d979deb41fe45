use mailparse::parse_content_type;

use crate::{
    address::{Address, AddressList},
    envelope::Envelope,
    message::MailMessage,
};

/// Option token a sender places in `Disposition-Notification-Options` to
/// request confirmation of final-destination delivery.
pub const FINAL_DELIVERY_OPTION: &str = "X-DIRECT-FINAL-DESTINATION-DELIVERY";

/// Coarse classification of a message moving through the gateway.
///
/// Only interpersonal messages take part in disposition notification; the
/// report kinds are recognised so the gateway never notifies about a
/// notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A person-to-person message (plain IMF content).
    Interpersonal,
    /// A message disposition notification report.
    Mdn,
    /// A delivery status notification report.
    Dsn,
    /// A report of a kind the gateway does not recognise.
    Unknown,
}

impl MessageKind {
    /// Classify from the message's top-level `Content-Type`.
    #[must_use]
    pub fn classify(message: &MailMessage) -> Self {
        let Some(content_type) = message.header("Content-Type") else {
            return Self::Interpersonal;
        };

        let parsed = parse_content_type(content_type);
        if parsed.mimetype != "multipart/report" {
            return Self::Interpersonal;
        }

        match parsed
            .params
            .get("report-type")
            .map(|report_type| report_type.to_ascii_lowercase())
            .as_deref()
        {
            Some("disposition-notification") => Self::Mdn,
            Some("delivery-status") => Self::Dsn,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn is_interpersonal(self) -> bool {
        matches!(self, Self::Interpersonal)
    }
}

/// Whether the message requests reliable-and-timely delivery semantics.
///
/// The request rides on a `Disposition-Notification-Options` parameter:
///
/// ```text
/// Disposition-Notification-Options: X-DIRECT-FINAL-DESTINATION-DELIVERY=optional,true
/// ```
///
/// The parameter value is an importance tag followed by the requested
/// setting; only a final `true` constitutes a request.
#[must_use]
pub fn requests_reliable_delivery(message: &MailMessage) -> bool {
    let Some(options) = message.header("Disposition-Notification-Options") else {
        return false;
    };

    options.split(';').any(|parameter| {
        let Some((attribute, values)) = parameter.split_once('=') else {
            return false;
        };

        attribute.trim().eq_ignore_ascii_case(FINAL_DELIVERY_OPTION)
            && values
                .rsplit(',')
                .next()
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    })
}

/// Per-message snapshot driving the notification branch decisions.
///
/// Captured from the inbound message before any other component can mutate
/// it, and discarded once the message has been dealt with.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub kind: MessageKind,
    pub reliable_and_timely: bool,
    pub message_id: Option<String>,
    pub subject: Option<String>,
    pub sender: Option<Address>,
    pub recipients: Option<AddressList>,
}

impl TransactionRecord {
    /// Build the record for an inbound message.
    #[must_use]
    pub fn classify(envelope: &Envelope, message: &MailMessage) -> Self {
        Self {
            kind: MessageKind::classify(message),
            reliable_and_timely: requests_reliable_delivery(message),
            message_id: message.message_id().map(str::to_string),
            subject: message.subject().map(str::to_string),
            sender: envelope.effective_sender(message),
            recipients: envelope.effective_recipients(message),
        }
    }

    /// A null or absent reverse-path, as carried by bounce messages.
    #[must_use]
    pub fn has_null_sender(&self) -> bool {
        self.sender.as_ref().is_none_or(Address::is_null)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn message_with(headers: &str) -> MailMessage {
        let raw = format!("{headers}\r\n\r\nbody\r\n");
        MailMessage::parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_classify_plain_text_as_interpersonal() {
        let message = message_with("From: a@b.example\r\nContent-Type: text/plain");
        assert_eq!(MessageKind::classify(&message), MessageKind::Interpersonal);
        assert!(MessageKind::classify(&message).is_interpersonal());
    }

    #[test]
    fn test_classify_missing_content_type_as_interpersonal() {
        let message = message_with("From: a@b.example");
        assert_eq!(MessageKind::classify(&message), MessageKind::Interpersonal);
    }

    #[test]
    fn test_classify_disposition_report_as_mdn() {
        let message = message_with(
            "Content-Type: multipart/report; \
             report-type=\"disposition-notification\"; boundary=\"b\"",
        );
        assert_eq!(MessageKind::classify(&message), MessageKind::Mdn);
    }

    #[test]
    fn test_classify_delivery_status_as_dsn() {
        let message =
            message_with("Content-Type: multipart/report; report-type=delivery-status; boundary=b");
        assert_eq!(MessageKind::classify(&message), MessageKind::Dsn);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let message = message_with(
            "Content-Type: Multipart/Report; report-type=\"Disposition-Notification\"; boundary=b",
        );
        assert_eq!(MessageKind::classify(&message), MessageKind::Mdn);
    }

    #[test]
    fn test_classify_unrecognised_report_as_unknown() {
        let message =
            message_with("Content-Type: multipart/report; report-type=feedback-report; boundary=b");
        assert_eq!(MessageKind::classify(&message), MessageKind::Unknown);
    }

    #[test]
    fn test_reliable_delivery_requested() {
        let message = message_with(
            "Disposition-Notification-Options: X-DIRECT-FINAL-DESTINATION-DELIVERY=optional,true",
        );
        assert!(requests_reliable_delivery(&message));
    }

    #[test]
    fn test_reliable_delivery_not_requested_when_false() {
        let message = message_with(
            "Disposition-Notification-Options: X-DIRECT-FINAL-DESTINATION-DELIVERY=optional,false",
        );
        assert!(!requests_reliable_delivery(&message));
    }

    #[test]
    fn test_reliable_delivery_absent_header() {
        let message = message_with("From: a@b.example");
        assert!(!requests_reliable_delivery(&message));
    }

    #[test]
    fn test_reliable_delivery_other_option_ignored() {
        let message = message_with("Disposition-Notification-Options: X-SOMETHING-ELSE=optional,true");
        assert!(!requests_reliable_delivery(&message));
    }

    #[test]
    fn test_reliable_delivery_found_among_multiple_parameters() {
        let message = message_with(
            "Disposition-Notification-Options: X-OTHER=required,1; \
             X-DIRECT-FINAL-DESTINATION-DELIVERY=optional,true",
        );
        assert!(requests_reliable_delivery(&message));
    }

    #[test]
    fn test_record_captures_identity() {
        let message = message_with(
            "From: Sender <sender@example.com>\r\n\
             To: one@example.org, two@example.org\r\n\
             Subject: Results\r\n\
             Message-ID: <id-1@example.com>",
        );
        let record = TransactionRecord::classify(&Envelope::default(), &message);

        assert_eq!(record.kind, MessageKind::Interpersonal);
        assert!(!record.reliable_and_timely);
        assert_eq!(record.message_id.as_deref(), Some("<id-1@example.com>"));
        assert_eq!(record.subject.as_deref(), Some("Results"));
        assert_eq!(record.sender.unwrap().address(), "sender@example.com");
        assert_eq!(record.recipients.unwrap().len(), 2);
    }

    #[test]
    fn test_null_sender_detection() {
        let message = message_with("Subject: no sender here");
        let record = TransactionRecord::classify(&Envelope::default(), &message);
        assert!(record.has_null_sender());

        let message = message_with("From: someone@example.com");
        let record = TransactionRecord::classify(&Envelope::default(), &message);
        assert!(!record.has_null_sender());
    }
}
