use thiserror::Error;

/// Errors from notification production.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The transaction has no sender to address the notification to.
    #[error("No sender available to notify")]
    MissingSender,

    /// A disposition field did not parse.
    #[error("Invalid disposition: {0}")]
    InvalidDisposition(String),

    /// An assembled notification failed to parse back as a message.
    #[error("Malformed notification: {0}")]
    Malformed(#[from] herald_common::error::MessageError),
}

impl NotifyError {
    /// Returns `true` if production failed for lack of a notify target.
    #[must_use]
    pub const fn is_missing_sender(&self) -> bool {
        matches!(self, Self::MissingSender)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            NotifyError::MissingSender.to_string(),
            "No sender available to notify"
        );
        assert_eq!(
            NotifyError::InvalidDisposition("nope".to_string()).to_string(),
            "Invalid disposition: nope"
        );
    }

    #[test]
    fn test_missing_sender_classification() {
        assert!(NotifyError::MissingSender.is_missing_sender());
        assert!(!NotifyError::InvalidDisposition(String::new()).is_missing_sender());
    }
}
