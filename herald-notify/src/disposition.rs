//! RFC 8098 disposition values and extraction.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use herald_common::message::MailMessage;
use mailparse::parse_mail;

use crate::error::NotifyError;

/// How the disposition action was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    Automatic,
    Manual,
}

impl Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic-action"),
            Self::Manual => write!(f, "manual-action"),
        }
    }
}

impl FromStr for ActionMode {
    type Err = NotifyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(match input.to_ascii_lowercase().as_str() {
            "automatic-action" => Self::Automatic,
            "manual-action" => Self::Manual,
            _ => return Err(NotifyError::InvalidDisposition(input.to_string())),
        })
    }
}

/// How the notification itself was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendingMode {
    Automatic,
    Manual,
}

impl Display for SendingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => write!(f, "MDN-sent-automatically"),
            Self::Manual => write!(f, "MDN-sent-manually"),
        }
    }
}

impl FromStr for SendingMode {
    type Err = NotifyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(match input.to_ascii_lowercase().as_str() {
            "mdn-sent-automatically" => Self::Automatic,
            "mdn-sent-manually" => Self::Manual,
            _ => return Err(NotifyError::InvalidDisposition(input.to_string())),
        })
    }
}

/// The reported handling of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispositionType {
    /// Delivered to the recipient's final destination.
    Dispatched,
    /// Processed without display.
    Processed,
    /// Displayed to the recipient.
    Displayed,
    /// Deleted without display.
    Deleted,
}

impl Display for DispositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatched => write!(f, "dispatched"),
            Self::Processed => write!(f, "processed"),
            Self::Displayed => write!(f, "displayed"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

impl FromStr for DispositionType {
    type Err = NotifyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Ok(match input.to_ascii_lowercase().as_str() {
            "dispatched" => Self::Dispatched,
            "processed" => Self::Processed,
            "displayed" => Self::Displayed,
            "deleted" => Self::Deleted,
            _ => return Err(NotifyError::InvalidDisposition(input.to_string())),
        })
    }
}

/// The disposition field of an MDN: `action-mode/sending-mode;type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disposition {
    pub action_mode: ActionMode,
    pub sending_mode: SendingMode,
    pub disposition_type: DispositionType,
}

impl Disposition {
    /// The disposition confirming final-destination delivery.
    #[must_use]
    pub const fn dispatched() -> Self {
        Self {
            action_mode: ActionMode::Automatic,
            sending_mode: SendingMode::Automatic,
            disposition_type: DispositionType::Dispatched,
        }
    }
}

impl Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{};{}",
            self.action_mode, self.sending_mode, self.disposition_type
        )
    }
}

impl FromStr for Disposition {
    type Err = NotifyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (modes, disposition_type) = input
            .split_once(';')
            .ok_or_else(|| NotifyError::InvalidDisposition(input.to_string()))?;
        let (action_mode, sending_mode) = modes
            .split_once('/')
            .ok_or_else(|| NotifyError::InvalidDisposition(input.to_string()))?;

        Ok(Self {
            action_mode: action_mode.trim().parse()?,
            sending_mode: sending_mode.trim().parse()?,
            disposition_type: disposition_type.trim().parse()?,
        })
    }
}

/// Find the disposition field inside a notification body.
///
/// Walks the report's parts for the `message/disposition-notification`
/// part, reads that part as a header block, and returns the first field
/// carrying the `Disposition` token, rendered as `Name: value`. Missing or
/// malformed structure yields `None`; callers treat the field as optional.
#[must_use]
pub fn find_disposition(message: &MailMessage) -> Option<String> {
    let raw = message.to_bytes();
    let parsed = parse_mail(&raw).ok()?;

    let report = parsed
        .subparts
        .iter()
        .find(|part| part.ctype.mimetype == "message/disposition-notification")?;

    let body = report.get_body_raw().ok()?;
    let (fields, _) = mailparse::parse_headers(&body).ok()?;

    fields.iter().find_map(|field| {
        let line = format!("{}: {}", field.get_key(), field.get_value());
        line.contains("Disposition").then_some(line)
    })
}
