use herald_notify::NotifyError;

/// Errors raised while assembling the gateway at startup
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    /// The configured delegate name matches no registered factory
    #[error("unknown delivery delegate '{name}' (known: {known})")]
    UnknownDelegate { name: String, known: String },

    /// A delegate factory refused the host resources it was given
    #[error("delegate '{name}' failed to initialize: {reason}")]
    DelegateInit { name: String, reason: String },

    /// The orchestrator builder was finalized without a required component
    #[error("missing required component: {0}")]
    MissingComponent(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

/// Errors a delivery delegate reports for a failed transaction
#[derive(thiserror::Error, Debug)]
pub enum DelegateError {
    /// No mailbox exists for the recipient
    #[error("unknown recipient: {0}")]
    UnknownRecipient(String),

    /// The backing store is temporarily unable to accept the message
    #[error("delivery target unavailable: {0}")]
    Unavailable(String),

    /// The message was refused outright
    #[error("delivery rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DelegateError {
    /// Whether retrying this delivery later could plausibly succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

/// Errors raised while handing a finished notification to the transport
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// The transport refused the notification
    #[error("notification rejected: {0}")]
    Rejected(String),

    /// The transport is temporarily unreachable
    #[error("notification transport unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors covering the full lifecycle of a single notification
#[derive(thiserror::Error, Debug)]
pub enum NotificationError {
    #[error(transparent)]
    Produce(#[from] NotifyError),

    #[error(transparent)]
    Send(#[from] TransportError),
}

impl NotificationError {
    /// Whether the notification was built but failed in transport
    #[must_use]
    pub const fn is_send(&self) -> bool {
        matches!(self, Self::Send(_))
    }
}
