use crate::pipeline::State;
use crate::timing::{Phase, Timings};
use std::path::PathBuf;
use thiserror::Error;

/// A run aborted by a backend failure. Carries the timings captured up to
/// and including the failing phase.
#[derive(Debug, Error)]
#[error("{phase} failed after reaching {state}: {source}")]
pub struct PipelineError {
    pub phase: Phase,
    pub state: State,
    pub source: schemes::Error,
    pub timings: Timings,
}

impl PipelineError {
    /// A failure found while validating the configuration, before any phase ran.
    pub fn before_setup(source: schemes::Error) -> Self {
        Self {
            phase: Phase::ParameterGeneration,
            state: State::Uninitialized,
            source,
            timings: Timings::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}
