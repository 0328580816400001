//! # Score Engine
//!
//! The invocation dispatch boundary of the score execution host.
//!
//! A call request names a target contract, a method and loosely typed
//! parameters. The [`ServiceEngine`] resolves the contract, converts the
//! parameters to the method's declared types, charges the call against the
//! step budget, runs the method and reports the outcome as a uniform
//! [`InvokeResult`]. Faults never escape the boundary.
//!
//! ## Example
//!
//! ```rust
//! use score_config::ServiceConfig;
//! use score_core::{RawValue, ScoreResult, TypedValue};
//! use score_engine::{
//!     Arguments, Contract, EngineProxy, ExecutionContext, FunctionDescriptor,
//!     InvocationRequest, ScoreApi, ScoreMapper, ServiceEngine, Status,
//! };
//! use std::sync::Arc;
//!
//! struct Hello {
//!     api: ScoreApi,
//! }
//!
//! impl Contract for Hello {
//!     fn api(&self) -> &ScoreApi {
//!         &self.api
//!     }
//!
//!     fn invoke(&self, _: &ExecutionContext, _: &str, _: Arguments) -> ScoreResult<TypedValue> {
//!         Ok(TypedValue::Str("hello".to_string()))
//!     }
//! }
//!
//! let mapper = Arc::new(ScoreMapper::new());
//! mapper.register_instance(
//!     "hello",
//!     Arc::new(Hello {
//!         api: ScoreApi::new().with_function(FunctionDescriptor::readonly("hello")),
//!     }),
//! );
//!
//! let engine = ServiceEngine::open(ServiceConfig::default(), EngineProxy::in_memory(mapper)).unwrap();
//! let request = InvocationRequest::new(
//!     "cx01".parse().unwrap(),
//!     "hello",
//!     "hello",
//!     RawValue::list(Vec::<RawValue>::new()),
//! );
//! let result = engine.invoke(engine.new_context(request));
//! assert_eq!(result.status, Status::Success);
//! ```

pub mod application_engine;
pub mod contract;
pub mod error_classifier;
pub mod interop;
pub mod manifest;
pub mod score_mapper;
pub mod service_engine;
pub mod type_converter;

pub use application_engine::{
    ContextContainer, ContextGuard, ExecutionContext, InvocationRequest, StepCounter,
    StepOperations,
};
pub use contract::{Arguments, Contract, MethodHandler, MethodTable};
pub use error_classifier::{classify, Classification, Failure, Severity};
pub use interop::{
    ContextDatabase, EngineProxy, EventLog, EventLogSink, InternalCall, InternalCallRequest,
    InternalCallResult, MemoryEventLogSink, MemoryStateFactory, StateDatabaseFactory,
};
pub use manifest::{EventLogDescriptor, EventParam, FuncType, FunctionDescriptor, ParamDescriptor, ScoreApi};
pub use score_mapper::{ContractFactory, ContractResolver, ScoreMapper};
pub use service_engine::{InvokeResult, ResponseEnvelope, ServiceEngine, Status};
pub use type_converter::{convert_params, convert_value, decode_params};
