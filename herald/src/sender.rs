//! Outbound notification transport.
//!
//! Finished notifications leave the gateway through a [`NotificationSender`].
//! The stock implementation drops them into an outbound spool directory for
//! the site's MTA to pick up; hosts may install an SMTP client instead.

use std::fs;
use std::path::PathBuf;

use herald_notify::NotificationMessage;
use tracing::info;
use ulid::Ulid;

use crate::error::TransportError;

pub trait NotificationSender: Send + Sync {
    /// Hand one finalized notification to the transport.
    ///
    /// # Errors
    /// [`TransportError`] when the transport cannot accept it. The caller
    /// treats this as terminal for the notification, never for the
    /// transaction it reports on.
    fn send(&self, notification: &NotificationMessage) -> Result<(), TransportError>;
}

/// Writes notifications into a spool directory, atomically.
///
/// Files appear under their final name only once fully written: content
/// goes to a `.tmp_` prefixed sibling first, then is renamed into place.
pub struct SpoolSender {
    path: PathBuf,
}

impl SpoolSender {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl NotificationSender for SpoolSender {
    fn send(&self, notification: &NotificationMessage) -> Result<(), TransportError> {
        fs::create_dir_all(&self.path)?;

        let filename = format!("{}.eml", Ulid::new());
        let staged = self.path.join(format!(".tmp_{filename}"));
        let delivered = self.path.join(&filename);

        fs::write(&staged, notification.message().to_bytes())?;
        fs::rename(&staged, &delivered)?;

        info!(
            kind = notification.kind().as_str(),
            path = %delivered.display(),
            "Notification spooled"
        );

        Ok(())
    }
}
