//! Cross-contract calls.

use score_core::{Address, RawValue, ScoreError, ScoreResult, TypedValue};

/// A call from one contract into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalCallRequest {
    pub from: Address,
    pub to: Address,
    pub method: String,
    pub params: RawValue,
    /// Steps the callee may spend.
    pub step_limit: u64,
}

/// Outcome of a cross-contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalCallResult {
    pub step_used: u64,
    pub result: ScoreResult<TypedValue>,
}

/// Carries cross-contract calls to their target.
pub trait InternalCall: Send + Sync {
    /// Performs the call.
    fn call(&self, request: InternalCallRequest) -> InternalCallResult;
}

/// Rejects every cross-contract call.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedInternalCall;

impl InternalCall for UnsupportedInternalCall {
    fn call(&self, request: InternalCallRequest) -> InternalCallResult {
        InternalCallResult {
            step_used: 0,
            result: Err(ScoreError::internal(format!(
                "Internal call to {}.{} is not supported",
                request.to, request.method
            ))),
        }
    }
}
