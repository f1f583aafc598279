//! Error types for the form core

use thiserror::Error;

/// Problems with a form definition (the "markup contract")
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("form declares no steps")]
    NoSteps,

    #[error("step at position {position} declares index {found}, expected {expected}")]
    StepOutOfSequence {
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("step {0} declares no fields")]
    EmptyStep(usize),

    #[error("field in step {0} has an empty name")]
    UnnamedField(usize),

    #[error("field name '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("failed to parse form definition: {0}")]
    Parse(String),
}

/// Transport-level submission failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server responded with HTTP {0}")]
    Status(u16),
}

/// Reasons a submit command is refused before any request is made
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("submission is only possible from the final step")]
    NotOnFinalStep,

    #[error("required fields are missing or invalid")]
    Invalid,

    #[error("a submission is already in flight")]
    InFlight,

    #[error("the form has already been submitted")]
    AlreadySucceeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::StepOutOfSequence {
            position: 2,
            expected: 2,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "step at position 2 declares index 3, expected 2"
        );
        assert_eq!(
            SchemaError::DuplicateField("email".into()).to_string(),
            "field name 'email' is declared more than once"
        );
    }

    #[test]
    fn test_submit_error_display() {
        assert_eq!(
            SubmitError::Status(500).to_string(),
            "server responded with HTTP 500"
        );
        assert_eq!(
            SubmitError::Network("connection refused".into()).to_string(),
            "network error: connection refused"
        );
    }
}
