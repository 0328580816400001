//! Contract capability trait and helpers.

use crate::application_engine::ExecutionContext;
use crate::manifest::ScoreApi;
use indexmap::IndexMap;
use score_core::{RawValue, ScoreError, ScoreResult, TypedValue};
use std::collections::HashMap;

/// Normalised arguments of one call.
///
/// Exactly one form is produced per request: keyword arguments converted to
/// their declared types, or positional arguments passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arguments {
    Keyword(IndexMap<String, TypedValue>),
    Positional(Vec<RawValue>),
}

impl Arguments {
    /// Gets a keyword argument.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        match self {
            Arguments::Keyword(kw) => kw.get(name),
            Arguments::Positional(_) => None,
        }
    }

    /// Gets a keyword argument or fails with an invalid-parameter error.
    pub fn require(&self, name: &str) -> ScoreResult<&TypedValue> {
        self.get(name)
            .ok_or_else(|| ScoreError::invalid_params(format!("Missing argument: {}", name)))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        match self {
            Arguments::Keyword(kw) => kw.len(),
            Arguments::Positional(args) => args.len(),
        }
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A deployed contract.
pub trait Contract: Send + Sync {
    /// Gets the method surface of the contract.
    fn api(&self) -> &ScoreApi;

    /// Invokes a method by name.
    fn invoke(
        &self,
        context: &ExecutionContext,
        method: &str,
        args: Arguments,
    ) -> ScoreResult<TypedValue>;
}

/// Handler of one contract method.
pub type MethodHandler<C> = fn(&C, &ExecutionContext, Arguments) -> ScoreResult<TypedValue>;

/// Name to handler lookup table for a contract type.
pub struct MethodTable<C> {
    handlers: HashMap<String, MethodHandler<C>>,
}

impl<C> MethodTable<C> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler.
    pub fn with(mut self, name: impl Into<String>, handler: MethodHandler<C>) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Whether a handler is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Dispatches a call to the handler registered for `method`.
    pub fn dispatch(
        &self,
        contract: &C,
        context: &ExecutionContext,
        method: &str,
        args: Arguments,
    ) -> ScoreResult<TypedValue> {
        let handler = self
            .handlers
            .get(method)
            .ok_or_else(|| ScoreError::method_not_found(format!("Method not found: {}", method)))?;
        handler(contract, context, args)
    }
}

impl<C> Default for MethodTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
