//! Delivery outcome notification gateway.
//!
//! Herald sits at the final hop of a store-and-forward messaging path. It
//! hands each inbound message to a pluggable local delivery delegate, then
//! closes the loop with the sender: a dispatched disposition notification
//! when delivery succeeds for messages that asked for one, a delivery
//! status notification when delivery fails.

pub mod config;
pub mod delegate;
pub mod error;
pub mod maildir;
pub mod orchestrator;
pub mod sender;

pub use config::GatewayConfig;
pub use delegate::{DelegateRegistry, DeliveryDelegate, HostResources};
pub use error::{DelegateError, InitError, NotificationError, TransportError};
pub use maildir::MaildirDelegate;
pub use orchestrator::{DeliveryOrchestrator, DeliveryOutcome};
pub use sender::{NotificationSender, SpoolSender};

/// Registry preloaded with the stock delegates.
#[must_use]
pub fn default_registry() -> DelegateRegistry {
    let mut registry = DelegateRegistry::new();
    registry.register(MaildirDelegate::NAME, MaildirDelegate::factory);
    registry
}
