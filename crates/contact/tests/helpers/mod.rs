use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use folio_contact::{Transport, TransportError};
use folio_shared::Submission;
use tokio::sync::Notify;

/// Records every transmission and answers with a scripted outcome.
#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<Submission>>,
    failing: AtomicBool,
    gate: Option<Arc<Notify>>,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn delivering() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let transport = Self::default();
        transport.failing.store(true, Ordering::SeqCst);

        Arc::new(transport)
    }

    /// Holds every transmission until the returned `Notify` is signalled.
    pub fn gated() -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let transport = Self {
            gate: Some(gate.clone()),
            ..Default::default()
        };

        (Arc::new(transport), gate)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Submission> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn transmit(&self, submission: &Submission) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(submission.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Rejected);
        }

        Ok(())
    }
}
