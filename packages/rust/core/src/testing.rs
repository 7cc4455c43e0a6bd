//! In-memory store and notifier doubles that log every call in order.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jobwatch_notify::Notifier;
use jobwatch_shared::{JobRecord, JobWatchError, Result};
use jobwatch_storage::NoveltyStore;

/// One observed collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exists(String),
    Send { destination: String, message: String },
    /// A send that the notifier rejected.
    FailedSend { destination: String, message: String },
    Record(String),
}

/// Ordered call log shared by the doubles.
pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub struct FakeStore {
    seen: Mutex<HashSet<String>>,
    calls: CallLog,
    fail_exists_for: Option<String>,
    fail_record: bool,
}

impl FakeStore {
    pub fn new(calls: CallLog) -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            calls,
            fail_exists_for: None,
            fail_record: false,
        }
    }

    pub fn with_seen(self, link: &str) -> Self {
        self.seen.lock().unwrap().insert(link.to_string());
        self
    }

    /// Make `exists` fail for this one link.
    pub fn failing_exists_for(mut self, link: &str) -> Self {
        self.fail_exists_for = Some(link.to_string());
        self
    }

    /// Make every `record` fail.
    pub fn failing_record(mut self) -> Self {
        self.fail_record = true;
        self
    }

    pub fn contains(&self, link: &str) -> bool {
        self.seen.lock().unwrap().contains(link)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl NoveltyStore for FakeStore {
    async fn exists(&self, link: &str) -> Result<bool> {
        self.calls.lock().unwrap().push(Call::Exists(link.to_string()));
        if self.fail_exists_for.as_deref() == Some(link) {
            return Err(JobWatchError::Storage("database is locked".into()));
        }
        Ok(self.contains(link))
    }

    async fn record(&self, job: &JobRecord) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Record(job.document_link.clone()));
        if self.fail_record {
            return Err(JobWatchError::Storage("disk I/O error".into()));
        }
        let inserted = self.seen.lock().unwrap().insert(job.document_link.clone());
        if !inserted {
            return Err(JobWatchError::Storage("UNIQUE constraint failed".into()));
        }
        Ok(())
    }
}

pub struct FakeNotifier {
    calls: CallLog,
    fail: Mutex<bool>,
    fail_when_contains: Option<String>,
}

impl FakeNotifier {
    pub fn new(calls: CallLog) -> Self {
        Self {
            calls,
            fail: Mutex::new(false),
            fail_when_contains: None,
        }
    }

    /// Fail every send.
    pub fn failing(self) -> Self {
        *self.fail.lock().unwrap() = true;
        self
    }

    /// Fail sends whose text contains `needle`.
    pub fn failing_when_contains(mut self, needle: &str) -> Self {
        self.fail_when_contains = Some(needle.to_string());
        self
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, destination: &str, message: &str) -> Result<()> {
        let should_fail = *self.fail.lock().unwrap()
            || self
                .fail_when_contains
                .as_deref()
                .is_some_and(|needle| message.contains(needle));
        if should_fail {
            self.calls.lock().unwrap().push(Call::FailedSend {
                destination: destination.to_string(),
                message: message.to_string(),
            });
            return Err(JobWatchError::Delivery("Bad Request: chat not found".into()));
        }
        self.calls.lock().unwrap().push(Call::Send {
            destination: destination.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Messages successfully sent, in order.
pub fn sent(calls: &CallLog) -> Vec<String> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|c| match c {
            Call::Send { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Messages the notifier rejected, in order.
pub fn failed_sends(calls: &CallLog) -> Vec<String> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|c| match c {
            Call::FailedSend { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Links passed to `record`, in order.
pub fn recorded(calls: &CallLog) -> Vec<String> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|c| match c {
            Call::Record(link) => Some(link.clone()),
            _ => None,
        })
        .collect()
}
