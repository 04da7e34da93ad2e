//! Error types for the neuron core and its trace harness
//!
//! Stepping the neuron never fails. Errors only come from configuration
//! validation and from reading, writing or replaying traces.

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, LifError>;

/// Errors that can occur around the neuron core
#[derive(Error, Debug)]
pub enum LifError {
    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Trace content is structurally invalid
    #[error("Invalid trace: {reason}")]
    InvalidTrace {
        /// Reason the trace was rejected
        reason: String,
    },

    /// Replayed output diverged from the recorded trace
    #[error("Trace mismatch at cycle {cycle}: {field} expected {expected}, found {found}")]
    TraceMismatch {
        /// Cycle index of the first divergence
        cycle: u64,
        /// Output field that diverged
        field: &'static str,
        /// Value recorded in the trace
        expected: String,
        /// Value produced by the model
        found: String,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        /// Source I/O error
        source: std::io::Error,
    },

    /// Encoding or decoding a trace failed
    #[error("Serialization error: {reason}")]
    Serialization {
        /// Reason for the failure
        reason: String,
    },
}

impl LifError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an invalid trace error
    pub fn invalid_trace(reason: impl Into<String>) -> Self {
        Self::InvalidTrace {
            reason: reason.into(),
        }
    }

    /// Create a trace mismatch error
    pub fn trace_mismatch(
        cycle: u64,
        field: &'static str,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        Self::TraceMismatch {
            cycle,
            field,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Create a serialization error
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LifError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<bincode::Error> for LifError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
