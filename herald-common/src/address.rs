use std::{
    fmt::{self, Debug, Display},
    ops::{Deref, DerefMut},
};

use mailparse::{MailAddr, addrparse};

use crate::error::AddressError;

/// A single mailbox address, display name included when one was given.
#[derive(Clone, Debug, PartialEq)]
pub struct Address(pub MailAddr);

impl Address {
    /// Parse one address from its written form.
    ///
    /// # Errors
    /// Fails when the input is not an address, or contains none.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let mut parsed = addrparse(raw)?;
        if parsed.is_empty() {
            return Err(AddressError::Empty(raw.to_string()));
        }

        Ok(Self(parsed.remove(0)))
    }

    /// The bare `user@domain` form, without any display name.
    #[must_use]
    pub fn address(&self) -> &str {
        match &self.0 {
            MailAddr::Single(info) => &info.addr,
            MailAddr::Group(group) => &group.group_name,
        }
    }

    /// The domain portion, when the address has one.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.address().rsplit_once('@').map(|(_, domain)| domain)
    }

    /// A null reverse-path, as carried by bounce messages.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.address().is_empty()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            MailAddr::Single(single) => Display::fmt(single, f),
            MailAddr::Group(group) => Display::fmt(group, f),
        }
    }
}

impl From<MailAddr> for Address {
    fn from(value: MailAddr) -> Self {
        Self(value)
    }
}

impl Deref for Address {
    type Target = MailAddr;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Address {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// An ordered list of addresses, as found in a `To:` header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddressList(pub Vec<Address>);

impl AddressList {
    /// Parse a comma-separated address list.
    ///
    /// # Errors
    /// Fails when the input is not a valid address list.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let parsed = addrparse(raw)?;
        Ok(Self(parsed.iter().cloned().map(Address).collect()))
    }
}

impl Display for AddressList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, addr) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            Display::fmt(addr, f)?;
        }
        Ok(())
    }
}

impl From<Vec<Address>> for AddressList {
    fn from(value: Vec<Address>) -> Self {
        Self(value)
    }
}

impl Deref for AddressList {
    type Target = Vec<Address>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for AddressList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
