//! Event logs emitted by contract code.

use parking_lot::Mutex;
use score_core::{Address, ScoreResult, TypedValue};
use serde::Serialize;

/// An event log emitted during an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventLog {
    /// The contract that emitted the log.
    pub score_address: Address,

    /// Event signature followed by the indexed arguments.
    pub indexed: Vec<TypedValue>,

    /// Non-indexed arguments.
    pub data: Vec<TypedValue>,
}

impl EventLog {
    /// Gets the event signature, the first indexed item.
    pub fn signature(&self) -> Option<&str> {
        self.indexed.first().and_then(TypedValue::as_str)
    }
}

/// Receives event logs.
pub trait EventLogSink: Send + Sync {
    /// Records an event log.
    fn emit(&self, event: EventLog) -> ScoreResult<()>;
}

/// Sink that keeps every log in memory.
#[derive(Default)]
pub struct MemoryEventLogSink {
    logs: Mutex<Vec<EventLog>>,
}

impl MemoryEventLogSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a copy of the recorded logs.
    pub fn logs(&self) -> Vec<EventLog> {
        self.logs.lock().clone()
    }

    /// Removes and returns the recorded logs.
    pub fn take(&self) -> Vec<EventLog> {
        std::mem::take(&mut *self.logs.lock())
    }
}

impl EventLogSink for MemoryEventLogSink {
    fn emit(&self, event: EventLog) -> ScoreResult<()> {
        self.logs.lock().push(event);
        Ok(())
    }
}
