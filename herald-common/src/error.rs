//! Error types for the herald-common crate.

use thiserror::Error;

/// Errors from parsing mailbox addresses.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The input is not a valid address form.
    #[error("Failed to parse address: {0}")]
    Parse(#[from] mailparse::MailParseError),

    /// The input parsed but contained no address.
    #[error("No address found in {0:?}")]
    Empty(String),
}

/// Errors from parsing or handling a wire message.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The header block is malformed.
    #[error("Failed to parse message: {0}")]
    Parse(#[from] mailparse::MailParseError),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_address_error_display() {
        let error = AddressError::Empty("   ".to_string());
        assert_eq!(error.to_string(), "No address found in \"   \"");
    }
}
