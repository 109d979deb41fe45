use std::fmt::Write as _;

use mailparse::parse_headers;
use ulid::Ulid;

use crate::error::MessageError;

/// One message header, name and unfolded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// An owned RFC 5322 style message: the parsed header block plus the raw
/// body bytes.
///
/// Gateway components rewrite headers in place (trace fields, identifiers)
/// and serialise the message back out with [`MailMessage::to_bytes`], so the
/// header order observed on parse is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailMessage {
    headers: Vec<Header>,
    body: Vec<u8>,
}

impl MailMessage {
    /// Parse a raw message into its header block and body.
    ///
    /// # Errors
    /// Fails when the header block is malformed.
    pub fn parse(raw: &[u8]) -> Result<Self, MessageError> {
        let (parsed, body_offset) = parse_headers(raw)?;

        let headers = parsed
            .iter()
            .map(|header| Header {
                name: header.get_key(),
                value: header.get_value(),
            })
            .collect();

        Ok(Self {
            headers,
            body: raw[body_offset..].to_vec(),
        })
    }

    /// Case-insensitive lookup of the first header with this name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// The full header block, in wire order.
    #[must_use]
    pub fn header_block(&self) -> &[Header] {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.header("Message-ID")
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.header("Subject")
    }

    /// Replace the first header with this name, or append it if absent.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(header) = self
            .headers
            .iter_mut()
            .find(|header| header.name.eq_ignore_ascii_case(name))
        {
            header.value = value;
        } else {
            self.headers.push(Header {
                name: name.to_string(),
                value,
            });
        }
    }

    /// Append a header without touching existing ones of the same name.
    pub fn push_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.push(Header {
            name: name.to_string(),
            value: value.into(),
        });
    }

    /// Assign the headers a message needs before it can be sent: a
    /// `Message-ID` scoped to `domain` and a `Date`, each only if absent.
    ///
    /// Returns the message id now on the message.
    pub fn finalize(&mut self, domain: &str) -> String {
        if self.header("Message-ID").is_none() {
            self.set_header("Message-ID", format!("<{}@{domain}>", Ulid::new()));
        }
        if self.header("Date").is_none() {
            self.set_header("Date", chrono::Utc::now().to_rfc2822());
        }

        self.header("Message-ID")
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Serialise back to wire form: headers, a blank line, then the body.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        for header in &self.headers {
            let _ = write!(out, "{}: {}\r\n", header.name, header.value);
        }
        out.push_str("\r\n");

        let mut bytes = out.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}
