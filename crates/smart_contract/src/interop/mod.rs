//! Host collaborators.
//!
//! This module provides the interfaces through which the engine reaches the
//! contract registry, persistent state, event logs and other contracts.

pub mod contract;
pub mod runtime;
pub mod storage;

pub use contract::{InternalCall, InternalCallRequest, InternalCallResult, UnsupportedInternalCall};
pub use runtime::{EventLog, EventLogSink, MemoryEventLogSink};
pub use storage::{ContextDatabase, MemoryStateFactory, StateDatabaseFactory};

use crate::score_mapper::ContractResolver;
use std::sync::Arc;

/// Collaborators wired into the engine when it is opened.
#[derive(Clone)]
pub struct EngineProxy {
    pub resolver: Arc<dyn ContractResolver>,
    pub state_factory: Arc<dyn StateDatabaseFactory>,
    pub event_sink: Arc<dyn EventLogSink>,
    pub internal_call: Arc<dyn InternalCall>,
}

impl EngineProxy {
    /// Creates a proxy with in-memory state and event logs and no
    /// cross-contract calls.
    pub fn in_memory(resolver: Arc<dyn ContractResolver>) -> Self {
        Self {
            resolver,
            state_factory: Arc::new(MemoryStateFactory::new()),
            event_sink: Arc::new(MemoryEventLogSink::new()),
            internal_call: Arc::new(UnsupportedInternalCall),
        }
    }

    /// Replaces the state backend.
    pub fn with_state_factory(mut self, state_factory: Arc<dyn StateDatabaseFactory>) -> Self {
        self.state_factory = state_factory;
        self
    }

    /// Replaces the event-log sink.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventLogSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    /// Replaces the cross-contract call handler.
    pub fn with_internal_call(mut self, internal_call: Arc<dyn InternalCall>) -> Self {
        self.internal_call = internal_call;
        self
    }
}

impl std::fmt::Debug for EngineProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineProxy")
            .field("resolver", &"<ContractResolver>")
            .field("state_factory", &"<StateDatabaseFactory>")
            .field("event_sink", &"<EventLogSink>")
            .field("internal_call", &"<InternalCall>")
            .finish()
    }
}
