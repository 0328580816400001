//! Contract API module.
//!
//! This module provides the schema a contract publishes for its callable
//! methods and event logs.

pub mod score_api;

pub use score_api::{
    EventLogDescriptor, EventParam, FuncType, FunctionDescriptor, ParamDescriptor, ScoreApi,
};
