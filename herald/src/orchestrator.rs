//! Delivery outcome notification orchestration.
//!
//! [`DeliveryOrchestrator::handle`] wraps one local delivery: it classifies
//! the message, snapshots its identity, delegates delivery, then generates
//! whatever notifications the outcome calls for. Notification trouble stays
//! contained; the delivery outcome reported to the caller never changes
//! because a notification could not be produced or sent.

use std::thread;
use std::time::Duration;

use herald_common::{
    audit,
    envelope::Envelope,
    message::MailMessage,
    transaction::TransactionRecord,
};
use herald_notify::{
    DeliveryFailureProducer, DispositionProducer, FailureNotificationProducer, NotificationKind,
    NotificationMessage, disposition,
};
use tracing::{info, warn};

use crate::{
    config::GatewayConfig,
    delegate::{DelegateRegistry, DeliveryDelegate},
    error::{InitError, NotificationError},
    sender::NotificationSender,
};

/// Terminal outcome of one local delivery
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

/// The gateway's per-transaction driver. Built once at startup, then handed
/// every inbound transaction.
pub struct DeliveryOrchestrator {
    delegate: Box<dyn DeliveryDelegate>,
    producer: DispositionProducer,
    failure_producer: Box<dyn FailureNotificationProducer>,
    sender: Box<dyn NotificationSender>,
    dispatched_delay: Duration,
    reporting_domain: String,
}

#[derive(Default)]
pub struct DeliveryOrchestratorBuilder {
    delegate: Option<Box<dyn DeliveryDelegate>>,
    producer: Option<DispositionProducer>,
    failure_producer: Option<Box<dyn FailureNotificationProducer>>,
    sender: Option<Box<dyn NotificationSender>>,
    dispatched_delay: Duration,
    reporting_domain: Option<String>,
}

impl DeliveryOrchestratorBuilder {
    #[must_use]
    pub fn delegate(mut self, delegate: Box<dyn DeliveryDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    #[must_use]
    pub fn producer(mut self, producer: DispositionProducer) -> Self {
        self.producer = Some(producer);
        self
    }

    #[must_use]
    pub fn failure_producer(mut self, producer: Box<dyn FailureNotificationProducer>) -> Self {
        self.failure_producer = Some(producer);
        self
    }

    #[must_use]
    pub fn sender(mut self, sender: Box<dyn NotificationSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    #[must_use]
    pub const fn dispatched_delay(mut self, delay: Duration) -> Self {
        self.dispatched_delay = delay;
        self
    }

    #[must_use]
    pub fn reporting_domain(mut self, domain: impl Into<String>) -> Self {
        self.reporting_domain = Some(domain.into());
        self
    }

    /// Finalize the orchestrator.
    ///
    /// # Errors
    /// [`InitError::MissingComponent`] without a delegate or a sender; the
    /// producers and the reporting domain have stock fallbacks.
    pub fn build(self) -> Result<DeliveryOrchestrator, InitError> {
        let delegate = self
            .delegate
            .ok_or(InitError::MissingComponent("delivery delegate"))?;
        let sender = self
            .sender
            .ok_or(InitError::MissingComponent("notification sender"))?;

        Ok(DeliveryOrchestrator {
            delegate,
            producer: self.producer.unwrap_or_default(),
            failure_producer: self
                .failure_producer
                .unwrap_or_else(|| Box::new(DeliveryFailureProducer::default())),
            sender,
            dispatched_delay: self.dispatched_delay,
            reporting_domain: self
                .reporting_domain
                .unwrap_or_else(|| "localhost".to_string()),
        })
    }
}

impl DeliveryOrchestrator {
    #[must_use]
    pub fn builder() -> DeliveryOrchestratorBuilder {
        DeliveryOrchestratorBuilder::default()
    }

    /// Assemble an orchestrator from loaded configuration.
    ///
    /// # Errors
    /// [`InitError`] when the configured delegate is unknown or refuses its
    /// resources.
    pub fn from_config(
        config: &GatewayConfig,
        registry: &DelegateRegistry,
        sender: Box<dyn NotificationSender>,
    ) -> Result<Self, InitError> {
        let delegate = registry.resolve(&config.delegate, &config.resources)?;

        Self::builder()
            .delegate(delegate)
            .producer(DispositionProducer::new(config.notification.clone()))
            .failure_producer(Box::new(DeliveryFailureProducer::new(config.dsn.clone())))
            .sender(sender)
            .dispatched_delay(config.effective_dispatched_delay())
            .reporting_domain(config.dsn.reporting_mta.clone())
            .build()
    }

    /// Run one transaction through delivery and outcome notification.
    ///
    /// The transaction's identity is snapshotted before the delegate runs,
    /// so notifications always describe the message as submitted even when
    /// the delegate rewrites it during delivery.
    pub fn handle(&self, envelope: &Envelope, message: &mut MailMessage) -> DeliveryOutcome {
        let record = TransactionRecord::classify(envelope, message);

        let outcome = match self.delegate.deliver(envelope, message) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(error) => {
                warn!(error = %error, "Local delivery failed");
                DeliveryOutcome::Failed
            }
        };

        audit::log_delivery_outcome(
            record.message_id.as_deref(),
            &record
                .sender
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            record.recipients.as_ref().map_or(0, |list| list.len()),
            outcome.as_str(),
        );

        match outcome {
            DeliveryOutcome::Delivered => {
                if record.reliable_and_timely && record.kind.is_interpersonal() {
                    self.notify_dispatched(&record);
                }
            }
            DeliveryOutcome::Failed => {
                if record.kind.is_interpersonal() {
                    self.notify_failed(&record);
                }
            }
        }

        outcome
    }

    /// Generate and send one dispatched notification per recipient.
    ///
    /// Failures here are logged and dropped; one recipient's notification
    /// never blocks another's, and none of them affect the delivery outcome.
    fn notify_dispatched(&self, record: &TransactionRecord) {
        let Some(recipients) = &record.recipients else {
            info!("No recipients to generate dispatched notifications for");
            return;
        };

        let notifications = match self.producer.produce(record, recipients) {
            Ok(notifications) => notifications,
            Err(error) => {
                warn!(error = %error, "Dispatched notification production failed");
                audit::log_notification_failed(
                    NotificationKind::Dispatched.as_str(),
                    record.message_id.as_deref(),
                    &error.to_string(),
                );
                return;
            }
        };

        for mut notification in notifications {
            if let Err(error) = self.release(&mut notification, record) {
                warn!(error = %error, "Dispatched notification dropped");
                audit::log_notification_failed(
                    NotificationKind::Dispatched.as_str(),
                    record.message_id.as_deref(),
                    &error.to_string(),
                );
            }
        }
    }

    /// Generate and send the failure notification for a failed delivery.
    fn notify_failed(&self, record: &TransactionRecord) {
        if !self.failure_producer.should_notify(record) {
            info!("Failure notification suppressed for this transaction");
            return;
        }

        let recipients = record.recipients.clone().unwrap_or_default();
        let result = self
            .failure_producer
            .create(record, &recipients, false)
            .map_err(NotificationError::from)
            .and_then(|mut notification| self.release(&mut notification, record));

        if let Err(error) = result {
            warn!(error = %error, "Failure notification dropped");
            audit::log_notification_failed(
                NotificationKind::Failed.as_str(),
                record.message_id.as_deref(),
                &error.to_string(),
            );
        }
    }

    /// Finalize one notification and hand it to the transport.
    fn release(
        &self,
        notification: &mut NotificationMessage,
        record: &TransactionRecord,
    ) -> Result<(), NotificationError> {
        let notification_id = notification.finalize(&self.reporting_domain);

        if !self.dispatched_delay.is_zero()
            && notification.kind() == NotificationKind::Dispatched
        {
            thread::sleep(self.dispatched_delay);
        }

        self.sender.send(notification)?;

        let disposition = disposition::find_disposition(notification.message());
        audit::log_notification_sent(
            &notification_id,
            notification.kind().as_str(),
            notification.message().header("From").unwrap_or(""),
            notification.message().header("To").unwrap_or(""),
            record.message_id.as_deref(),
            disposition.as_deref(),
        );

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::{DelegateError, TransportError};

    use super::*;

    struct DiscardSender;

    impl NotificationSender for DiscardSender {
        fn send(&self, _notification: &NotificationMessage) -> Result<(), TransportError> {
            Ok(())
        }
    }

    struct AcceptAllDelegate;

    impl DeliveryDelegate for AcceptAllDelegate {
        fn deliver(
            &self,
            _envelope: &Envelope,
            _message: &mut MailMessage,
        ) -> Result<(), DelegateError> {
            Ok(())
        }
    }

    #[test]
    fn test_build_requires_delegate_and_sender() {
        let error = DeliveryOrchestrator::builder().build().err().unwrap();
        assert_eq!(error.to_string(), "missing required component: delivery delegate");

        let error = DeliveryOrchestrator::builder()
            .delegate(Box::new(AcceptAllDelegate))
            .build()
            .err()
            .unwrap();
        assert_eq!(error.to_string(), "missing required component: notification sender");
    }

    #[test]
    fn test_from_config_rejects_unknown_delegate() {
        let config = GatewayConfig {
            delegate: "lmtp".to_string(),
            ..GatewayConfig::default()
        };
        let registry = DelegateRegistry::new();

        let error =
            DeliveryOrchestrator::from_config(&config, &registry, Box::new(DiscardSender))
                .err()
                .unwrap();
        assert!(matches!(error, InitError::UnknownDelegate { .. }));
    }

    #[test]
    fn test_outcome_strings() {
        assert_eq!(DeliveryOutcome::Delivered.as_str(), "delivered");
        assert_eq!(DeliveryOutcome::Failed.as_str(), "failed");
    }
}
