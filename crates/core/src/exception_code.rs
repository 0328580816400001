//! Stable status codes reported across the dispatch boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code of a failed invocation.
///
/// The numeric values are part of the external contract of the host and must
/// never be renumbered. Contract-raised reverts use [`ExceptionCode::Reverted`]
/// plus a contract-defined offset.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExceptionCode {
    Ok = 0,
    UnknownFailure = 1,
    ContractNotFound = 2,
    MethodNotFound = 3,
    MethodNotPayable = 4,
    IllegalFormat = 5,
    InvalidParameter = 6,
    InvalidInstance = 7,
    InvalidContainerAccess = 8,
    AccessDenied = 9,
    OutOfStep = 10,
    OutOfBalance = 11,
    TimeoutError = 12,
    StackOverflow = 13,
    SkipTx = 14,
    Reverted = 32,
}

impl ExceptionCode {
    /// Generic code for faults outside the recognised taxonomy.
    pub const SERVER_ERROR: Self = Self::UnknownFailure;

    /// Code of a business error raised by contract logic.
    pub const SCORE_ERROR: Self = Self::Reverted;

    /// Gets the integer form emitted in response envelopes.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Converts an integer back into a known code.
    ///
    /// Codes above [`ExceptionCode::Reverted`] are contract-defined revert codes
    /// and map to `Reverted`.
    pub fn from_i32(value: i32) -> Option<Self> {
        let code = match value {
            0 => Self::Ok,
            1 => Self::UnknownFailure,
            2 => Self::ContractNotFound,
            3 => Self::MethodNotFound,
            4 => Self::MethodNotPayable,
            5 => Self::IllegalFormat,
            6 => Self::InvalidParameter,
            7 => Self::InvalidInstance,
            8 => Self::InvalidContainerAccess,
            9 => Self::AccessDenied,
            10 => Self::OutOfStep,
            11 => Self::OutOfBalance,
            12 => Self::TimeoutError,
            13 => Self::StackOverflow,
            14 => Self::SkipTx,
            v if v >= Self::Reverted as i32 => Self::Reverted,
            _ => return None,
        };
        Some(code)
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.as_i32())
    }
}

impl From<ExceptionCode> for i32 {
    fn from(code: ExceptionCode) -> Self {
        code.as_i32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ExceptionCode::Ok.as_i32(), 0);
        assert_eq!(ExceptionCode::SERVER_ERROR.as_i32(), 1);
        assert_eq!(ExceptionCode::ContractNotFound.as_i32(), 2);
        assert_eq!(ExceptionCode::InvalidParameter.as_i32(), 6);
        assert_eq!(ExceptionCode::OutOfStep.as_i32(), 10);
        assert_eq!(ExceptionCode::SCORE_ERROR.as_i32(), 32);
    }

    #[test]
    fn test_from_i32() {
        assert_eq!(ExceptionCode::from_i32(9), Some(ExceptionCode::AccessDenied));
        assert_eq!(ExceptionCode::from_i32(45), Some(ExceptionCode::Reverted));
        assert_eq!(ExceptionCode::from_i32(20), None);
        assert_eq!(ExceptionCode::from_i32(-1), None);
    }
}
