use herald_common::message::MailMessage;

/// What a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Positive disposition: the message reached its final destination.
    Dispatched,
    /// Negative disposition: local delivery failed.
    Failed,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dispatched => "dispatched",
            Self::Failed => "failed",
        }
    }
}

/// A fully formed notification awaiting finalisation and hand-off to a
/// transport.
///
/// Producers build these; the orchestration step owns one until it has been
/// sent, and nothing touches it afterwards.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    kind: NotificationKind,
    message: MailMessage,
}

impl NotificationMessage {
    #[must_use]
    pub const fn new(kind: NotificationKind, message: MailMessage) -> Self {
        Self { kind, message }
    }

    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    #[must_use]
    pub const fn message(&self) -> &MailMessage {
        &self.message
    }

    /// Assign send-time headers; returns the notification's message id.
    pub fn finalize(&mut self, domain: &str) -> String {
        self.message.finalize(domain)
    }
}

/// Unique MIME boundary for a multipart/report body.
pub(crate) fn report_boundary() -> String {
    format!(
        "----=_Part_{}_{}",
        ulid::Ulid::new(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros()
    )
}
