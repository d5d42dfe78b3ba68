use thiserror::Error;

/// Failures of a scheme backend, grouped by what the caller has to fix.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// Invalid, insecure or unsupported parameters.
    #[error("invalid parameter {parameter}: {reason}")]
    Parameter {
        parameter: &'static str,
        reason: String,
    },

    /// Noise budget or modulus chain exhausted, or a scale/level mismatch.
    #[error("precision failure: {reason}")]
    Precision { reason: String },

    /// Operand or decoded lengths disagree.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    Shape {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// The requested variant is not compiled into this build.
    #[error("backend {scheme} unavailable: {capability}")]
    BackendUnavailable {
        scheme: String,
        capability: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn parameter(parameter: &'static str, reason: impl Into<String>) -> Self {
        Error::Parameter {
            parameter,
            reason: reason.into(),
        }
    }

    pub fn precision(reason: impl Into<String>) -> Self {
        Error::Precision {
            reason: reason.into(),
        }
    }

    pub fn shape(what: &'static str, expected: usize, found: usize) -> Self {
        Error::Shape {
            what,
            expected,
            found,
        }
    }
}
