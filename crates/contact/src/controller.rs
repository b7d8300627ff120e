use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use folio_shared::Submission;
use tokio::{
    sync::watch,
    time::{Instant, sleep_until},
};
use tracing::{info, warn};

use crate::{EMAIL_FORMAT_PROMPT, Entry, Status, Step, Transport, Variant};

/// Result of one `submit` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Input was empty after trimming, nothing changed.
    Ignored,
    /// Not collecting right now (sending, or showing a terminal state).
    Busy,
    /// Moved on to the given sub-step.
    Advanced(Step),
    /// Input failed the sub-step format check, still on that sub-step.
    Rejected(Step),
    Delivered,
    Failed,
}

#[derive(Clone, Copy, Debug)]
struct Settings {
    variant: Variant,
    sent_reset: Duration,
    error_reset: Option<Duration>,
}

#[derive(Default)]
struct Fields {
    message: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

impl Fields {
    fn fill(&mut self, step: Step, value: String) {
        match step {
            Step::Message => self.message = Some(value),
            Step::Email => self.email = Some(value),
            Step::Name => self.name = Some(value),
        }
    }

    fn to_submission(&self) -> Submission {
        Submission {
            message: self.message.clone().unwrap_or_default(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Default)]
struct Inner {
    status: Status,
    step: usize,
    input: String,
    fields: Fields,
    history: Vec<Entry>,
    attempt: u64,
}

/// Drives the multi-step contact prompt and the transmission status.
///
/// Cloning yields another handle to the same form. State sits behind a mutex
/// that is never held across an await, and input is only accepted while
/// collecting, so at most one request is in flight per form.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Mutex<Inner>>,
    status: Arc<watch::Sender<Status>>,
    transport: Arc<dyn Transport>,
    settings: Settings,
}

impl Controller {
    pub fn new(variant: Variant, transport: Arc<dyn Transport>) -> Self {
        Self::with_delays(
            variant,
            transport,
            variant.sent_reset(),
            variant.error_reset(),
        )
    }

    pub fn with_delays(
        variant: Variant,
        transport: Arc<dyn Transport>,
        sent_reset: Duration,
        error_reset: Option<Duration>,
    ) -> Self {
        let (status, _) = watch::channel(Status::Collecting);

        Self {
            inner: Arc::default(),
            status: Arc::new(status),
            transport,
            settings: Settings {
                variant,
                sent_reset,
                error_reset,
            },
        }
    }

    fn state(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn variant(&self) -> Variant {
        self.settings.variant
    }

    pub fn status(&self) -> Status {
        self.state().status
    }

    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    pub fn step(&self) -> Step {
        self.settings.variant.steps()[self.state().step]
    }

    /// Question for the current sub-step.
    pub fn prompt(&self) -> &'static str {
        self.settings.variant.prompt(self.step())
    }

    pub fn history(&self) -> Vec<Entry> {
        self.state().history.clone()
    }

    pub fn input(&self) -> String {
        self.state().input.clone()
    }

    /// Replace the input buffer. Ignored outside `collecting`, the same way a
    /// disabled input control would be.
    pub fn set_input(&self, text: impl Into<String>) {
        let mut inner = self.state();
        if inner.status.accepts_input() {
            inner.input = text.into();
        }
    }

    /// Submit the input buffer for the current sub-step.
    ///
    /// On the final sub-step this issues exactly one transmission and resolves
    /// once the endpoint has answered.
    pub async fn submit(&self) -> Outcome {
        let steps = self.settings.variant.steps();

        let (submission, attempt) = {
            let mut inner = self.state();
            if !inner.status.accepts_input() {
                return Outcome::Busy;
            }

            let text = inner.input.trim().to_owned();
            if text.is_empty() {
                return Outcome::Ignored;
            }

            let step = steps[inner.step];
            // Only the `@` is checked here, the endpoint validates the full address
            if step == Step::Email && !text.contains('@') {
                inner.history.push(Entry::question(EMAIL_FORMAT_PROMPT));
                return Outcome::Rejected(step);
            }

            inner.history.push(Entry::answer(text.as_str()));
            inner.fields.fill(step, text);

            if inner.step + 1 < steps.len() {
                inner.step += 1;
                inner.input.clear();
                let next = steps[inner.step];
                inner
                    .history
                    .push(Entry::question(self.settings.variant.prompt(next)));

                return Outcome::Advanced(next);
            }

            inner.attempt += 1;
            inner.status = Status::Sending;
            (inner.fields.to_submission(), inner.attempt)
        };

        self.status.send_replace(Status::Sending);

        match self.transport.transmit(&submission).await {
            Ok(()) => {
                info!(attempt, "Contact transmission delivered");
                self.finish(attempt, Status::Sent, Some(self.settings.sent_reset));

                Outcome::Delivered
            }
            Err(e) => {
                warn!(error = %e, attempt, "Contact transmission failed");
                self.finish(attempt, Status::Error, self.settings.error_reset);

                Outcome::Failed
            }
        }
    }

    fn finish(&self, attempt: u64, status: Status, reset_after: Option<Duration>) {
        {
            let mut inner = self.state();
            inner.status = status;
            // Published under the lock so a reset task cannot overtake it
            self.status.send_replace(status);
        }

        let Some(delay) = reset_after else {
            return;
        };

        let deadline = Instant::now() + delay;
        let controller = self.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            controller.reset(attempt);
        });
    }

    /// Return to `collecting` at the first sub-step after a terminal state.
    /// A delivered attempt wipes the form. A failed one keeps the fields and
    /// puts the message back in the input buffer so it can be resent.
    fn reset(&self, attempt: u64) {
        let mut inner = self.state();
        if inner.attempt != attempt {
            return;
        }

        let current = inner.status;
        match current {
            Status::Sent => {
                *inner = Inner {
                    attempt,
                    ..Default::default()
                }
            }
            Status::Error => {
                inner.status = Status::Collecting;
                if inner.step != 0 {
                    inner.step = 0;
                    inner.input = inner.fields.message.clone().unwrap_or_default();
                    let first = self.settings.variant.steps()[0];
                    inner
                        .history
                        .push(Entry::question(self.settings.variant.prompt(first)));
                }
            }
            Status::Collecting | Status::Sending => return,
        }

        self.status.send_replace(inner.status);
    }
}
