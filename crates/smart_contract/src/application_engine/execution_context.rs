//! Per-invocation execution state.
//!
//! An [`ExecutionContext`] is created for one call request and lives until
//! the call returns. Contract code reaches persistent state, event logs and
//! other contracts through it, and every such access is charged against the
//! context's step counter.

use super::step::{StepCounter, StepOperations};
use crate::interop::{ContextDatabase, EngineProxy, EventLog, InternalCallRequest};
use crate::manifest::{EventLogDescriptor, FuncType};
use score_config::StepType;
use score_core::{Address, RawValue, ScoreError, ScoreResult, TypedValue};
use std::cell::{Cell, RefCell};
use tracing::debug;

const TAG: &str = "ExecutionContext";

/// An incoming call request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Target contract.
    pub to: Address,
    /// Identifier of the contract code deployed at `to`.
    pub code: String,
    pub method: String,
    pub params: RawValue,
    /// Caller, if known.
    pub from: Option<Address>,
}

impl InvocationRequest {
    pub fn new(
        to: Address,
        code: impl Into<String>,
        method: impl Into<String>,
        params: RawValue,
    ) -> Self {
        Self {
            to,
            code: code.into(),
            method: method.into(),
            params,
            from: None,
        }
    }

    /// Sets the caller.
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}

/// Mutable state of one invocation.
pub struct ExecutionContext {
    request: InvocationRequest,
    step_counter: StepCounter,
    func_type: Cell<Option<FuncType>>,
    proxy: EngineProxy,
    db: RefCell<Option<Box<dyn ContextDatabase>>>,
}

impl ExecutionContext {
    /// Creates a new context.
    pub fn new(request: InvocationRequest, step_counter: StepCounter, proxy: EngineProxy) -> Self {
        Self {
            request,
            step_counter,
            func_type: Cell::new(None),
            proxy,
            db: RefCell::new(None),
        }
    }

    pub fn request(&self) -> &InvocationRequest {
        &self.request
    }

    /// Gets the address of the contract being executed.
    pub fn address(&self) -> &Address {
        &self.request.to
    }

    pub fn method(&self) -> &str {
        &self.request.method
    }

    /// Gets the caller, if known.
    pub fn caller(&self) -> Option<&Address> {
        self.request.from.as_ref()
    }

    pub fn step_counter(&self) -> &StepCounter {
        &self.step_counter
    }

    /// Gets the func type of the target method, once resolved.
    pub fn func_type(&self) -> Option<FuncType> {
        self.func_type.get()
    }

    /// Records the func type of the target method.
    pub fn set_func_type(&self, func_type: FuncType) {
        self.func_type.set(Some(func_type));
    }

    /// Whether the context refuses writes.
    pub fn is_read_only(&self) -> bool {
        self.func_type.get() == Some(FuncType::Readonly)
    }

    fn ensure_writable(&self, what: &str) -> ScoreResult<()> {
        if self.is_read_only() {
            return Err(ScoreError::access_denied(format!(
                "{} is not allowed in readonly method {}",
                what, self.request.method
            )));
        }
        Ok(())
    }

    fn with_db<R>(&self, f: impl FnOnce(&dyn ContextDatabase) -> ScoreResult<R>) -> ScoreResult<R> {
        let mut slot = self.db.borrow_mut();
        if slot.is_none() {
            *slot = Some(self.proxy.state_factory.open(&self.request.to)?);
        }
        match slot.as_deref() {
            Some(db) => f(db),
            None => Err(ScoreError::internal("State database is not available")),
        }
    }

    /// Reads a state value.
    pub fn get(&self, key: &[u8]) -> ScoreResult<Option<Vec<u8>>> {
        let value = self.with_db(|db| db.get(key))?;
        let size = value.as_ref().map_or(0, Vec::len);
        self.step_counter.apply_step(StepType::Get, size.max(1) as u64)?;
        Ok(value)
    }

    /// Writes a state value.
    pub fn set(&self, key: &[u8], value: &[u8]) -> ScoreResult<()> {
        self.ensure_writable("State write")?;
        let replacing = self.with_db(|db| db.get(key))?.is_some();
        let step_type = if replacing {
            StepType::Replace
        } else {
            StepType::Set
        };
        self.step_counter
            .apply_step(step_type, value.len().max(1) as u64)?;
        self.with_db(|db| db.put(key, value))
    }

    /// Deletes a state value.
    pub fn delete(&self, key: &[u8]) -> ScoreResult<()> {
        self.ensure_writable("State delete")?;
        self.step_counter.apply_step(StepType::Delete, 1)?;
        self.with_db(|db| db.delete(key))
    }

    /// Emits a raw event log. The first indexed item is the event signature.
    pub fn emit_event_log(&self, indexed: Vec<TypedValue>, data: Vec<TypedValue>) -> ScoreResult<()> {
        self.ensure_writable("Event log")?;
        if indexed.is_empty() {
            return Err(ScoreError::invalid_params("Event log needs a signature"));
        }
        let items = (indexed.len() + data.len()) as u64;
        self.step_counter.apply_step(StepType::EventLog, items)?;

        let event = EventLog {
            score_address: self.request.to.clone(),
            indexed,
            data,
        };
        debug!(target: TAG, "event log {:?} from {}", event.signature(), event.score_address);
        self.proxy.event_sink.emit(event)
    }

    /// Emits an event declared by `descriptor`, splitting `args` into indexed
    /// and data items.
    pub fn emit_event(&self, descriptor: &EventLogDescriptor, args: Vec<TypedValue>) -> ScoreResult<()> {
        if args.len() != descriptor.inputs.len() {
            return Err(ScoreError::invalid_params(format!(
                "{} expects {} arguments, got {}",
                descriptor.name,
                descriptor.inputs.len(),
                args.len()
            )));
        }

        let mut indexed = vec![TypedValue::Str(descriptor.signature())];
        let mut data = Vec::new();
        for (param, arg) in descriptor.inputs.iter().zip(args) {
            if param.indexed {
                indexed.push(arg);
            } else {
                data.push(arg);
            }
        }
        self.emit_event_log(indexed, data)
    }

    /// Calls a method of another contract. The callee may spend whatever is
    /// left of this context's budget; its usage is charged here.
    pub fn call(&self, to: Address, method: &str, params: RawValue) -> ScoreResult<TypedValue> {
        let request = InternalCallRequest {
            from: self.request.to.clone(),
            to,
            method: method.to_string(),
            params,
            step_limit: self.step_counter.remaining(),
        };
        let outcome = self.proxy.internal_call.call(request);
        self.step_counter.consume_steps(outcome.step_used)?;
        outcome.result
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("request", &self.request)
            .field("step_counter", &self.step_counter)
            .field("func_type", &self.func_type.get())
            .finish()
    }
}
