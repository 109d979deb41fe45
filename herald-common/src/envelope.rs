use crate::{
    address::{Address, AddressList},
    message::MailMessage,
};

/// Transport envelope for a message moving through the gateway.
///
/// Submission may provide an explicit reverse-path and forward-path, or
/// leave either unset, in which case the `From:` and `To:` headers stand in.
#[derive(Default, Debug, Clone)]
pub struct Envelope {
    sender: Option<Address>,
    recipients: Option<AddressList>,
}

impl Envelope {
    #[must_use]
    pub const fn new(sender: Option<Address>, recipients: Option<AddressList>) -> Self {
        Self { sender, recipients }
    }

    /// Returns a reference to the envelope sender for this message
    #[inline]
    pub const fn sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    /// Returns a reference to the envelope recipients for this message
    #[inline]
    pub const fn recipients(&self) -> Option<&AddressList> {
        self.recipients.as_ref()
    }

    /// The sender to report against: the envelope sender when present,
    /// otherwise the message's `From:` header.
    #[must_use]
    pub fn effective_sender(&self, message: &MailMessage) -> Option<Address> {
        if let Some(sender) = &self.sender {
            return Some(sender.clone());
        }

        message
            .header("From")
            .and_then(|raw| Address::parse(raw).ok())
    }

    /// The recipients to report against: the envelope recipients when
    /// present, otherwise the message's `To:` header.
    #[must_use]
    pub fn effective_recipients(&self, message: &MailMessage) -> Option<AddressList> {
        if let Some(recipients) = &self.recipients {
            return Some(recipients.clone());
        }

        message
            .header("To")
            .and_then(|raw| AddressList::parse(raw).ok())
    }
}
