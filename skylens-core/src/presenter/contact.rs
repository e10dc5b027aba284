use async_trait::async_trait;
use parking_lot::Mutex;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tokio::sync::watch;

use crate::{
    config::DEFAULT_SUBMISSION_DELAY_MS,
    contact::{Contact, ValidationError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Submitted,
}

/// Delivers a validated contact message somewhere.
#[async_trait]
pub trait ContactSubmitter: Send + Sync + Debug {
    async fn submit(&self, contact: &Contact);
}

/// Stand-in backend: waits a fixed delay, then reports success.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    delay: Duration,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SUBMISSION_DELAY_MS))
    }
}

#[async_trait]
impl ContactSubmitter for SimulatedSubmitter {
    async fn submit(&self, _contact: &Contact) {
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "simulating contact submission");
        tokio::time::sleep(self.delay).await;
        tracing::info!("contact message submitted");
    }
}

#[derive(Debug, Default)]
struct Form {
    contact: Contact,
    errors: Vec<ValidationError>,
}

#[derive(Debug)]
pub struct ContactPresenter {
    submitter: Arc<dyn ContactSubmitter>,
    form: Mutex<Form>,
    status: watch::Sender<SubmissionStatus>,
}

impl ContactPresenter {
    pub fn new(submitter: Arc<dyn ContactSubmitter>) -> Self {
        let (status, _) = watch::channel(SubmissionStatus::Idle);
        Self { submitter, form: Mutex::new(Form::default()), status }
    }

    pub fn contact(&self) -> Contact {
        self.form.lock().contact.clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut Contact)) {
        f(&mut self.form.lock().contact);
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.form.lock().contact.name = name.into();
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.form.lock().contact.email = email.into();
    }

    pub fn set_phone(&self, phone: impl Into<String>) {
        self.form.lock().contact.phone = phone.into();
    }

    /// Errors from the last submit attempt.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        self.form.lock().errors.clone()
    }

    pub fn status(&self) -> SubmissionStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    pub fn is_submitting(&self) -> bool {
        self.status() == SubmissionStatus::Submitting
    }

    pub fn show_success(&self) -> bool {
        self.status() == SubmissionStatus::Submitted
    }

    /// Validate and, when clean, submit the form.
    ///
    /// Returns `true` once the message was delivered and the form cleared.
    /// Invalid input leaves the presenter idle with the errors recorded; a
    /// call while a submission is in flight is ignored.
    pub async fn submit_form(&self) -> bool {
        let contact = {
            let mut form = self.form.lock();
            if self.is_submitting() {
                tracing::debug!("submission already in progress");
                return false;
            }

            form.errors = form.contact.validate();
            if !form.errors.is_empty() {
                tracing::debug!(errors = ?form.errors, "contact form rejected");
                self.status.send_replace(SubmissionStatus::Idle);
                return false;
            }

            self.status.send_replace(SubmissionStatus::Submitting);
            form.contact.clone()
        };

        self.submitter.submit(&contact).await;

        self.form.lock().contact = Contact::default();
        self.status.send_replace(SubmissionStatus::Submitted);
        true
    }

    /// Clear the form and any errors, back to idle.
    ///
    /// A submission already in flight keeps the status at `Submitting` until
    /// it completes, so resetting never lets a second one start alongside it.
    pub fn reset_form(&self) {
        let mut form = self.form.lock();
        *form = Form::default();
        self.status.send_if_modified(|status| {
            let finished = *status == SubmissionStatus::Submitted;
            if finished {
                *status = SubmissionStatus::Idle;
            }
            finished
        });
    }
}
