//! Fault taxonomy of the contract execution host.

use crate::ExceptionCode;
use thiserror::Error;

/// Result type for host and contract operations.
pub type ScoreResult<T> = Result<T, ScoreError>;

/// Every fault that can be raised between context push and context pop.
///
/// All variants except [`ScoreError::Internal`] are domain faults with a
/// stable code. `Internal` covers host bugs and collaborator failures and is
/// always reported with the generic server-error code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// No contract is deployed at the requested address.
    #[error("{0}")]
    ContractNotFound(String),

    /// The contract exists but does not expose the requested method.
    #[error("{0}")]
    MethodNotFound(String),

    /// Parameters have the wrong shape or cannot be converted.
    #[error("{0}")]
    InvalidParameter(String),

    /// The call tried something its func type does not permit.
    #[error("{0}")]
    AccessDenied(String),

    /// The step budget of the invocation is exhausted.
    #[error("{0}")]
    OutOfStep(String),

    /// Business error raised by the contract itself.
    #[error("{message}")]
    Reverted { code: i32, message: String },

    /// Any other modelled fault with an explicit code.
    #[error("{message}")]
    Domain {
        code: ExceptionCode,
        message: String,
    },

    /// Unrecognised fault.
    #[error("{0}")]
    Internal(String),
}

impl ScoreError {
    /// Helper for creating a contract-not-found error.
    pub fn contract_not_found(message: impl Into<String>) -> Self {
        Self::ContractNotFound(message.into())
    }

    /// Helper for creating a method-not-found error.
    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::MethodNotFound(message.into())
    }

    /// Helper for creating an invalid-parameter error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Helper for creating an access-denied error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(message.into())
    }

    /// Helper for creating an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Raises a contract business error. `user_code` is added to
    /// [`ExceptionCode::Reverted`].
    pub fn revert(message: impl Into<String>, user_code: i32) -> Self {
        Self::Reverted {
            code: ExceptionCode::Reverted.as_i32().saturating_add(user_code.max(0)),
            message: message.into(),
        }
    }

    /// Gets the integer status code of the fault.
    pub fn code(&self) -> i32 {
        match self {
            Self::ContractNotFound(_) => ExceptionCode::ContractNotFound.as_i32(),
            Self::MethodNotFound(_) => ExceptionCode::MethodNotFound.as_i32(),
            Self::InvalidParameter(_) => ExceptionCode::InvalidParameter.as_i32(),
            Self::AccessDenied(_) => ExceptionCode::AccessDenied.as_i32(),
            Self::OutOfStep(_) => ExceptionCode::OutOfStep.as_i32(),
            Self::Reverted { code, .. } => *code,
            Self::Domain { code, .. } => code.as_i32(),
            Self::Internal(_) => ExceptionCode::SERVER_ERROR.as_i32(),
        }
    }

    /// Whether the fault belongs to the modelled taxonomy.
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Whether the contract itself raised the fault.
    pub fn is_contract_fault(&self) -> bool {
        match self {
            Self::Reverted { .. } => true,
            Self::Domain { code, .. } => *code == ExceptionCode::SCORE_ERROR,
            _ => false,
        }
    }
}
