//! Maps faults to the failure envelope and a log severity.

use score_core::ScoreError;
use serde::Serialize;

/// How loudly a fault is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Expected business outcome raised by contract code.
    Warning,
    Error,
}

/// The `{code, message}` pair carried by a failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub code: i32,
    pub message: String,
}

/// Outcome of classifying a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub failure: Failure,
    pub severity: Severity,
}

/// Classifies a fault.
///
/// Domain faults keep their own code and message. Anything else is reported
/// as a server error carrying the fault's string form.
pub fn classify(fault: &ScoreError) -> Classification {
    let severity = if fault.is_contract_fault() {
        Severity::Warning
    } else {
        Severity::Error
    };
    Classification {
        failure: Failure {
            code: fault.code(),
            message: fault.to_string(),
        },
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use score_core::ExceptionCode;

    #[test]
    fn test_business_fault_is_warning() {
        let classification = classify(&ScoreError::revert("insufficient balance", 0));
        assert_eq!(classification.severity, Severity::Warning);
        assert_eq!(classification.failure.code, 32);
        assert_eq!(classification.failure.message, "insufficient balance");

        let classification = classify(&ScoreError::Domain {
            code: ExceptionCode::SCORE_ERROR,
            message: "nope".to_string(),
        });
        assert_eq!(classification.severity, Severity::Warning);
    }

    #[test]
    fn test_other_faults_are_errors() {
        for fault in [
            ScoreError::contract_not_found("missing"),
            ScoreError::invalid_params("bad"),
            ScoreError::OutOfStep("Out of step".to_string()),
        ] {
            let classification = classify(&fault);
            assert_eq!(classification.severity, Severity::Error);
            assert_eq!(classification.failure.code, fault.code());
        }
    }

    #[test]
    fn test_internal_is_server_error() {
        let classification = classify(&ScoreError::internal("index out of range"));
        assert_eq!(classification.severity, Severity::Error);
        assert_eq!(classification.failure.code, ExceptionCode::SERVER_ERROR.as_i32());
        assert_eq!(classification.failure.message, "index out of range");
    }

    #[test]
    fn test_failure_serializes_as_pair() {
        let failure = Failure {
            code: 2,
            message: "missing".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            serde_json::json!({"code": 2, "message": "missing"})
        );
    }
}
