//! Delivery delegates.
//!
//! A delegate performs the actual local delivery for a transaction. The
//! gateway resolves one by name at startup from the registry and holds it
//! for its lifetime; per-message resolution is deliberately not supported.

use std::collections::HashMap;
use std::path::PathBuf;

use herald_common::{envelope::Envelope, message::MailMessage};
use serde::{Deserialize, Serialize};

use crate::error::{DelegateError, InitError};

/// Host-provided resources a delegate may draw on during initialization.
///
/// Every field is optional; each delegate checks for what it needs and
/// fails initialization with a clear message when something is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostResources {
    /// Root directory for recipient mailboxes
    #[serde(default)]
    pub mailbox_root: Option<PathBuf>,

    /// Path to the local user table
    #[serde(default)]
    pub users_file: Option<PathBuf>,

    /// Domains considered local to this gateway
    #[serde(default)]
    pub local_domains: Option<Vec<String>>,

    /// Path to the recipient rewrite rule table
    #[serde(default)]
    pub rewrite_rules: Option<PathBuf>,

    /// Root directory delegates may use for scratch storage
    #[serde(default)]
    pub filesystem_root: Option<PathBuf>,
}

/// A local delivery backend.
///
/// `deliver` takes the message mutably: delegates are allowed to rewrite
/// headers (trace fields, recipient rewrites) as part of delivery. The
/// orchestrator snapshots everything it needs before calling in, so such
/// rewrites never leak into notifications.
pub trait DeliveryDelegate: Send + Sync {
    /// Deliver the message to every envelope recipient.
    ///
    /// # Errors
    /// Any [`DelegateError`] marks the whole transaction as failed.
    fn deliver(
        &self,
        envelope: &Envelope,
        message: &mut MailMessage,
    ) -> Result<(), DelegateError>;
}

/// Constructor for a delegate, given the host resources from configuration.
pub type DelegateFactory = fn(&HostResources) -> Result<Box<dyn DeliveryDelegate>, InitError>;

/// Name-to-factory table consulted once at startup.
#[derive(Default)]
pub struct DelegateRegistry {
    factories: HashMap<&'static str, DelegateFactory>,
}

impl DelegateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, factory: DelegateFactory) {
        self.factories.insert(name, factory);
    }

    /// Construct the delegate registered under `name`.
    ///
    /// # Errors
    /// [`InitError::UnknownDelegate`] when no factory carries that name, or
    /// whatever the factory itself raises.
    pub fn resolve(
        &self,
        name: &str,
        resources: &HostResources,
    ) -> Result<Box<dyn DeliveryDelegate>, InitError> {
        let Some(factory) = self.factories.get(name) else {
            return Err(InitError::UnknownDelegate {
                name: name.to_string(),
                known: self.names().join(", "),
            });
        };

        factory(resources)
    }

    /// Registered delegate names, sorted for stable error messages
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = self.factories.keys().copied().collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}
