//! Typed progress channel carrying job status events from background
//! workers to the single consuming thread.

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Outcome or progress update for one job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum EventPayload {
    /// Fraction of the job complete, 0..=100.
    Progress(u8),
    /// Terminal: the assembled document text.
    Result(String),
    /// Terminal: human-readable failure message.
    Error(String),
    /// Terminal: user-initiated stop, distinct from a fault.
    Cancelled(String),
}

impl EventPayload {
    /// True for `Result`, `Error` and `Cancelled`, the events that end a job.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventPayload::Progress(_))
    }
}

/// Progress event for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvent {
    /// Unique job identifier.
    pub job_id: String,
    /// Original filename being processed.
    pub filename: String,
    /// Timestamp of this event.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub payload: EventPayload,
}

impl JobEvent {
    pub fn new(job_id: &str, filename: &str, payload: EventPayload) -> Self {
        Self {
            job_id: job_id.to_string(),
            filename: filename.to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Creates the multi-producer/single-consumer channel for one batch.
///
/// Unbounded so producers never block on a slow consumer; events from one
/// producer arrive in emission order.
pub fn event_channel() -> (Sender<JobEvent>, Receiver<JobEvent>) {
    unbounded()
}

/// Per-job handle that stamps events with the job's identity before
/// sending them down the batch channel.
#[derive(Clone)]
pub struct JobEmitter {
    job_id: String,
    filename: String,
    sender: Sender<JobEvent>,
}

impl JobEmitter {
    pub fn new(job_id: &str, filename: &str, sender: Sender<JobEvent>) -> Self {
        Self {
            job_id: job_id.to_string(),
            filename: filename.to_string(),
            sender,
        }
    }

    fn send(&self, payload: EventPayload) {
        // A dropped receiver means the consumer stopped listening; nothing
        // useful to do with the event in that case.
        let _ = self
            .sender
            .send(JobEvent::new(&self.job_id, &self.filename, payload));
    }

    pub fn progress(&self, percent: u8) {
        self.send(EventPayload::Progress(percent.min(100)));
    }

    pub fn result(&self, text: String) {
        self.send(EventPayload::Result(text));
    }

    pub fn error(&self, message: String) {
        self.send(EventPayload::Error(message));
    }

    pub fn cancelled(&self, message: &str) {
        self.send(EventPayload::Cancelled(message.to_string()));
    }
}
