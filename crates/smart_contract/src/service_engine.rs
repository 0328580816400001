//! Invocation dispatch.
//!
//! [`ServiceEngine::invoke`] turns a call request into a validated, metered
//! call into contract code. Each invocation runs these steps in order:
//!
//! 1. push the context on the thread-local context stack
//! 2. reject params nested deeper than the configured limit, then resolve
//!    the target contract
//! 3. look up the method and record its func type on the context
//! 4. normalise the params: a mapping is decoded and converted to the
//!    declared types, a sequence passes through as positional arguments
//! 5. charge the contract-call step cost
//! 6. invoke the method
//! 7. classify any fault raised by steps 2 to 6
//! 8. pop the context
//! 9. read the step counter
//!
//! No fault escapes `invoke`, and charges are never rolled back.

use crate::application_engine::{
    ContextContainer, ExecutionContext, InvocationRequest, StepCounter, StepOperations,
};
use crate::contract::{Arguments, Contract};
use crate::error_classifier::{classify, Failure, Severity};
use crate::interop::EngineProxy;
use crate::manifest::ScoreApi;
use crate::type_converter::{convert_params, decode_params};
use score_config::{ConfigResult, ServiceConfig, StepType};
use score_core::{int_to_hex, Address, RawValue, ScoreError, ScoreResult, TypedValue};
use serde_json::{json, Value};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{error, info, warn};

const TAG: &str = "ServiceEngine";

/// Outcome status of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success = 0,
    Failure = 1,
}

/// Response body of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseEnvelope {
    Success(TypedValue),
    Failure(Failure),
}

impl ResponseEnvelope {
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success(_))
    }

    /// Gets the success value.
    pub fn value(&self) -> Option<&TypedValue> {
        match self {
            ResponseEnvelope::Success(value) => Some(value),
            ResponseEnvelope::Failure(_) => None,
        }
    }

    /// Gets the failure.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ResponseEnvelope::Success(_) => None,
            ResponseEnvelope::Failure(failure) => Some(failure),
        }
    }

    /// Converts the envelope to JSON. Failures become
    /// `{"error": {"code": .., "message": ..}}`.
    pub fn to_json(&self) -> Value {
        match self {
            ResponseEnvelope::Success(value) => value.to_json(),
            ResponseEnvelope::Failure(failure) => json!({
                "error": {
                    "code": failure.code,
                    "message": failure.message,
                }
            }),
        }
    }
}

/// Result of [`ServiceEngine::invoke`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeResult {
    pub status: Status,
    /// Final reading of the step counter.
    pub step_used: u64,
    pub result: ResponseEnvelope,
}

impl InvokeResult {
    pub fn to_json(&self) -> Value {
        json!({
            "status": self.status as i32,
            "stepUsed": int_to_hex(&self.step_used.into()),
            "result": self.result.to_json(),
        })
    }
}

/// Dispatches call requests into contract code.
///
/// The engine is opened once with its collaborators and then shared by
/// reference. Invocations on different threads are independent.
#[derive(Debug)]
pub struct ServiceEngine {
    config: ServiceConfig,
    proxy: EngineProxy,
}

impl ServiceEngine {
    /// Opens the engine.
    pub fn open(config: ServiceConfig, proxy: EngineProxy) -> ConfigResult<Self> {
        config.validate()?;
        info!(
            target: TAG,
            "service engine opened, step_limit={} contract_call={}",
            config.step_limit,
            config.step_costs.contract_call
        );
        Ok(Self { config, proxy })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn proxy(&self) -> &EngineProxy {
        &self.proxy
    }

    /// Creates a context for `request` with the configured step limit.
    pub fn new_context(&self, request: InvocationRequest) -> ExecutionContext {
        self.new_context_with_step_limit(request, self.config.step_limit)
    }

    /// Creates a context for `request` with its own step limit.
    pub fn new_context_with_step_limit(
        &self,
        request: InvocationRequest,
        step_limit: u64,
    ) -> ExecutionContext {
        let counter = StepCounter::new(self.config.step_costs.clone(), step_limit);
        ExecutionContext::new(request, counter, self.proxy.clone())
    }

    /// Invokes the method named by the context's request.
    pub fn invoke(&self, context: ExecutionContext) -> InvokeResult {
        let context = Rc::new(context);
        {
            let request = context.request();
            info!(
                target: TAG,
                "invoke: to={} method={}",
                request.to,
                request.method
            );
        }

        let result = {
            let _guard = ContextContainer::push(Rc::clone(&context));
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.handle_invoke(&context)))
                .unwrap_or_else(|payload| Err(ScoreError::internal(panic_message(payload))));
            match outcome {
                Ok(value) => ResponseEnvelope::Success(value),
                Err(fault) => ResponseEnvelope::Failure(failure_of(&fault)),
            }
        };

        let status = if result.is_success() {
            Status::Success
        } else {
            Status::Failure
        };
        let step_used = context.step_counter().step_used();
        info!(
            target: TAG,
            "invoke result: status={:?} step_used={} result={}",
            status,
            step_used,
            result.to_json()
        );

        InvokeResult {
            status,
            step_used,
            result,
        }
    }

    fn handle_invoke(&self, context: &ExecutionContext) -> ScoreResult<TypedValue> {
        let request = context.request();
        // Conversion, cloning and logging of params all recurse.
        let depth = request.params.depth();
        if depth > self.config.max_param_depth {
            return Err(ScoreError::invalid_params(format!(
                "Params nested too deeply: {} levels, limit {}",
                depth, self.config.max_param_depth
            )));
        }
        info!(target: TAG, "params: {:?}", request.params);

        let contract = self.resolve(&request.to, &request.code)?;

        let function = contract.api().function(&request.method).ok_or_else(|| {
            ScoreError::method_not_found(format!(
                "Method not found: {}.{}",
                request.code, request.method
            ))
        })?;
        context.set_func_type(function.func_type());

        let args = match &request.params {
            RawValue::Map(_) => {
                let kw_params = convert_params(function, decode_params(&request.params)?)?;
                info!(target: TAG, "kw_params: {:?}", kw_params);
                Arguments::Keyword(kw_params)
            }
            RawValue::List(items) => {
                info!(target: TAG, "arg_params: {:?}", items);
                Arguments::Positional(items.clone())
            }
            other => {
                return Err(ScoreError::invalid_params(format!(
                    "Unknown params type: {}",
                    other.type_name()
                )))
            }
        };

        context
            .step_counter()
            .apply_step(StepType::ContractCall, 1)?;
        contract.invoke(context, &request.method, args)
    }

    fn resolve(&self, address: &Address, code: &str) -> ScoreResult<Arc<dyn Contract>> {
        self.proxy
            .resolver
            .resolve(address, code)?
            .ok_or_else(|| ScoreError::contract_not_found(format!("SCORE not found: {}", address)))
    }

    /// Gets the API of the contract code `code`.
    ///
    /// No context is pushed and no steps are charged.
    pub fn get_score_api(&self, code: &str) -> ScoreResult<ScoreApi> {
        let contract = self.resolve(&Address::getapi_dummy(), code)?;
        Ok(contract.api().clone())
    }
}

fn failure_of(fault: &ScoreError) -> Failure {
    let classification = classify(fault);
    match classification.severity {
        Severity::Warning => warn!(target: TAG, "{}", classification.failure.message),
        Severity::Error => error!(target: TAG, "invoke failed: {:?}", fault),
    }
    classification.failure
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "contract panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_json() {
        let envelope = ResponseEnvelope::Failure(Failure {
            code: 32,
            message: "insufficient balance".to_string(),
        });
        assert_eq!(
            envelope.to_json(),
            json!({"error": {"code": 32, "message": "insufficient balance"}})
        );
        assert!(envelope.value().is_none());
    }

    #[test]
    fn test_invoke_result_json() {
        let result = InvokeResult {
            status: Status::Success,
            step_used: 25_000,
            result: ResponseEnvelope::Success(TypedValue::Bool(true)),
        };
        assert_eq!(
            result.to_json(),
            json!({"status": 0, "stepUsed": "0x61a8", "result": "0x1"})
        );
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("x".to_string())), "x");
        assert_eq!(panic_message(Box::new(5)), "contract panicked");
    }
}
