//! Scripted doubles for gateway integration tests.
//!
//! The delegate and sender here let tests pin down orchestration behavior
//! without touching the filesystem: deliveries succeed, fail, or rewrite
//! the message on command, and every notification handed to the transport
//! is recorded for inspection.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use herald::{DelegateError, DeliveryDelegate, NotificationSender, TransportError};
use herald_common::{envelope::Envelope, message::MailMessage};
use herald_notify::NotificationMessage;

enum Script {
    Deliver,
    Fail(String),
    Rewrite,
}

/// Delegate that follows a fixed script for every transaction.
pub struct ScriptedDelegate {
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedDelegate {
    pub fn delivering() -> Self {
        Self {
            script: Script::Deliver,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            script: Script::Fail(reason.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Succeeds, but rewrites the message's identity headers first, the way
    /// a delegate applying recipient rewrites or trace headers might.
    pub fn rewriting() -> Self {
        Self {
            script: Script::Rewrite,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl DeliveryDelegate for ScriptedDelegate {
    fn deliver(
        &self,
        _envelope: &Envelope,
        message: &mut MailMessage,
    ) -> Result<(), DelegateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.script {
            Script::Deliver => Ok(()),
            Script::Fail(reason) => Err(DelegateError::Unavailable(reason.clone())),
            Script::Rewrite => {
                message.set_header("From", "rewritten@elsewhere.example");
                message.set_header("To", "rewritten-rcpt@elsewhere.example");
                message.set_header("Subject", "rewritten");
                message.set_header("Message-ID", "<rewritten@elsewhere.example>");
                Ok(())
            }
        }
    }
}

/// Sender that records everything it is handed, optionally failing on
/// chosen call indices.
#[derive(Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<NotificationMessage>>>,
    fail_on: Arc<Vec<usize>>,
    calls: Arc<AtomicUsize>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender that rejects the calls at the given zero-based indices.
    pub fn failing_on(indices: &[usize]) -> Self {
        Self {
            fail_on: Arc::new(indices.to_vec()),
            ..Self::default()
        }
    }

    /// Everything successfully sent so far, in order.
    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.sent.lock().expect("sender lock poisoned").clone()
    }

    /// Send attempts, including rejected ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NotificationSender for RecordingSender {
    fn send(&self, notification: &NotificationMessage) -> Result<(), TransportError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&index) {
            return Err(TransportError::Unavailable(
                "scripted transport failure".to_string(),
            ));
        }

        self.sent
            .lock()
            .expect("sender lock poisoned")
            .push(notification.clone());
        Ok(())
    }
}
