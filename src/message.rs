//! User-facing notices raised while handling a request.

use serde::Serialize;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

pub trait MessageSink {
    fn add(&self, severity: Severity, text: String);

    fn info(&self, text: String) {
        self.add(Severity::Info, text);
    }

    fn warning(&self, text: String) {
        self.add(Severity::Warning, text);
    }
}

/// Collects messages for one request so the caller can show them afterwards.
#[derive(Debug, Default)]
pub struct Messages {
    queue: RefCell<Vec<Message>>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything collected so far.
    pub fn take(&self) -> Vec<Message> {
        self.queue.take()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl MessageSink for Messages {
    fn add(&self, severity: Severity, text: String) {
        tracing::info!(?severity, "{}", text);
        self.queue.borrow_mut().push(Message { severity, text });
    }
}
