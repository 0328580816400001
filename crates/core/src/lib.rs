//! # Score Core
//!
//! Core types shared by the contract execution host.
//!
//! ## Features
//!
//! - **Addresses**: `hx` account and `cx` contract addresses
//! - **Status Codes**: the stable integer codes reported for failed invocations
//! - **Fault Taxonomy**: the closed [`ScoreError`] enum every fault is mapped into
//! - **Values**: loosely typed [`RawValue`] input and converted [`TypedValue`] output
//! - **Declared Types**: the [`DeclaredType`] vocabulary of method signatures
//!
//! ## Example
//!
//! ```rust
//! use score_core::{Address, ScoreError};
//!
//! let to: Address = "hx1234".parse().unwrap();
//! assert_eq!(to.to_string(), "hx1234");
//!
//! let err = ScoreError::revert("insufficient balance", 0);
//! assert_eq!(err.code(), 32);
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

/// Account and contract addresses
pub mod address;
/// Declared parameter types
pub mod declared_type;
/// Fault taxonomy
pub mod error;
/// Status codes
pub mod exception_code;
/// Raw and typed values
pub mod value;

pub use address::{Address, AddressKind};
pub use declared_type::{DeclaredType, StructField};
pub use error::{ScoreError, ScoreResult};
pub use exception_code::ExceptionCode;
pub use value::{int_to_hex, RawValue, TypedValue};
