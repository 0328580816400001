//! Invocation state: step accounting, execution contexts and the
//! thread-local context stack.

pub mod context_container;
pub mod execution_context;
pub mod step;

pub use context_container::{ContextContainer, ContextGuard};
pub use execution_context::{ExecutionContext, InvocationRequest};
pub use step::{StepCounter, StepOperations};
