//! Stock maildir delivery delegate.
//!
//! One maildir per recipient local part under a configured root. Writes
//! land in `tmp/` and are renamed into `new/` so readers never observe a
//! partially written message.

use std::fs;
use std::path::PathBuf;

use herald_common::{address::Address, envelope::Envelope, message::MailMessage};
use tracing::debug;
use ulid::Ulid;

use crate::{
    delegate::{DeliveryDelegate, HostResources},
    error::{DelegateError, InitError},
};

pub struct MaildirDelegate {
    mailbox_root: PathBuf,
}

impl MaildirDelegate {
    pub const NAME: &'static str = "maildir";

    #[must_use]
    pub const fn new(mailbox_root: PathBuf) -> Self {
        Self { mailbox_root }
    }

    /// Registry factory. Requires `mailbox_root` in the host resources.
    ///
    /// # Errors
    /// [`InitError::DelegateInit`] when no mailbox root is configured.
    pub fn factory(resources: &HostResources) -> Result<Box<dyn DeliveryDelegate>, InitError> {
        let Some(root) = resources.mailbox_root.clone() else {
            return Err(InitError::DelegateInit {
                name: Self::NAME.to_string(),
                reason: "mailbox_root is required".to_string(),
            });
        };

        Ok(Box::new(Self::new(root)))
    }

    fn write_message(
        &self,
        recipient: &Address,
        message: &MailMessage,
    ) -> Result<(), DelegateError> {
        let address = recipient.address();
        let local = address.split_once('@').map_or(address, |(local, _)| local);

        // Local parts become directory names, so reject anything unsafe
        if local.is_empty() || local.contains(['/', '\\']) || local.starts_with('.') {
            return Err(DelegateError::UnknownRecipient(address.to_string()));
        }

        let maildir = self.mailbox_root.join(local);
        for subdir in ["tmp", "new", "cur"] {
            fs::create_dir_all(maildir.join(subdir))?;
        }

        let filename = Ulid::new().to_string();
        let staged = maildir.join("tmp").join(&filename);
        let delivered = maildir.join("new").join(&filename);

        fs::write(&staged, message.to_bytes())?;
        fs::rename(&staged, &delivered)?;

        debug!(recipient = %address, path = %delivered.display(), "Delivered to maildir");

        Ok(())
    }
}

impl DeliveryDelegate for MaildirDelegate {
    fn deliver(
        &self,
        envelope: &Envelope,
        message: &mut MailMessage,
    ) -> Result<(), DelegateError> {
        let Some(recipients) = envelope.effective_recipients(message) else {
            return Err(DelegateError::Rejected(
                "message has no recipients".to_string(),
            ));
        };

        for recipient in recipients.iter() {
            message.set_header("Delivered-To", recipient.address());
            self.write_message(recipient, message)?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use herald_common::address::AddressList;
    use pretty_assertions::assert_eq;

    use super::*;

    fn message() -> MailMessage {
        MailMessage::parse(
            b"From: alice@origin.example\r\n\
            To: bob@dest.example\r\n\
            Subject: Lab results\r\n\
            \r\n\
            Attached.\r\n",
        )
        .unwrap()
    }

    #[test]
    fn test_deliver_writes_one_file_per_recipient() {
        let root = tempfile::tempdir().unwrap();
        let delegate = MaildirDelegate::new(root.path().to_path_buf());

        let envelope = Envelope::new(
            None,
            Some(AddressList::parse("bob@dest.example, carol@dest.example").unwrap()),
        );
        let mut message = message();
        delegate.deliver(&envelope, &mut message).unwrap();

        for local in ["bob", "carol"] {
            let new = root.path().join(local).join("new");
            assert_eq!(fs::read_dir(&new).unwrap().count(), 1);

            let entry = fs::read_dir(&new).unwrap().next().unwrap().unwrap();
            let contents = fs::read_to_string(entry.path()).unwrap();
            assert!(contents.contains(&format!("Delivered-To: {local}@dest.example")));
            assert!(contents.contains("Subject: Lab results"));
        }
    }

    #[test]
    fn test_deliver_falls_back_to_header_recipients() {
        let root = tempfile::tempdir().unwrap();
        let delegate = MaildirDelegate::new(root.path().to_path_buf());

        let envelope = Envelope::new(None, None);
        let mut message = message();
        delegate.deliver(&envelope, &mut message).unwrap();

        assert!(root.path().join("bob").join("new").exists());
    }

    #[test]
    fn test_deliver_without_recipients_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let delegate = MaildirDelegate::new(root.path().to_path_buf());

        let envelope = Envelope::new(None, None);
        let mut message = MailMessage::parse(b"Subject: stray\r\n\r\nBody\r\n").unwrap();
        let error = delegate.deliver(&envelope, &mut message).unwrap_err();

        assert!(matches!(error, DelegateError::Rejected(_)));
    }

    #[test]
    fn test_unsafe_local_part_is_unknown() {
        let root = tempfile::tempdir().unwrap();
        let delegate = MaildirDelegate::new(root.path().to_path_buf());

        let envelope = Envelope::new(
            None,
            Some(AddressList::parse(".hidden@dest.example").unwrap()),
        );
        let mut message = message();
        let error = delegate.deliver(&envelope, &mut message).unwrap_err();

        assert!(matches!(error, DelegateError::UnknownRecipient(_)));
    }

    #[test]
    fn test_factory_requires_mailbox_root() {
        let error = MaildirDelegate::factory(&HostResources::default()).err().unwrap();
        assert!(matches!(error, InitError::DelegateInit { .. }));

        let resources = HostResources {
            mailbox_root: Some(PathBuf::from("/tmp/mail")),
            ..HostResources::default()
        };
        assert!(MaildirDelegate::factory(&resources).is_ok());
    }
}
