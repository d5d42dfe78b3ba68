use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, span::EnteredSpan};

/// The five timed phases of a run, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ParameterGeneration,
    KeyGeneration,
    Encryption,
    Evaluation,
    Decryption,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::ParameterGeneration,
        Phase::KeyGeneration,
        Phase::Encryption,
        Phase::Evaluation,
        Phase::Decryption,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::ParameterGeneration => "parameter_generation",
            Phase::KeyGeneration => "key_generation",
            Phase::Encryption => "encryption",
            Phase::Evaluation => "evaluation",
            Phase::Decryption => "decryption",
        }
    }

    /// Label of the console report.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::ParameterGeneration => "Parameter Generation",
            Phase::KeyGeneration => "Key Generation",
            Phase::Encryption => "Encryption",
            Phase::Evaluation => "Evaluation (v_i + at)",
            Phase::Decryption => "Decryption",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PhaseTiming {
    pub phase: Phase,
    pub elapsed: Duration,
}

impl PhaseTiming {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Append-only record of the phases of one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Timings(Vec<PhaseTiming>);

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        self.0.push(PhaseTiming { phase, elapsed });
    }

    pub fn get(&self, phase: Phase) -> Option<&PhaseTiming> {
        self.0.iter().find(|t| t.phase == phase)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhaseTiming> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[PhaseTiming] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> Duration {
        self.0.iter().map(|t| t.elapsed).sum()
    }
}

/// Measures a phase from creation to drop on the monotonic clock, and
/// keeps a tracing span named after the phase entered meanwhile. The
/// timing is recorded even when the phase body returns early.
pub struct PhaseTimer<'a> {
    timings: &'a mut Timings,
    phase: Phase,
    start: Instant,
    _span: EnteredSpan,
}

impl<'a> PhaseTimer<'a> {
    pub fn scope(timings: &'a mut Timings, phase: Phase) -> Self {
        let span: EnteredSpan = tracing::info_span!("phase", name = phase.name()).entered();
        Self {
            timings,
            phase,
            start: Instant::now(),
            _span: span,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        let elapsed: Duration = self.start.elapsed();
        self.timings.record(self.phase, elapsed);
        debug!(phase = %self.phase, seconds = elapsed.as_secs_f64(), "phase done");
    }
}
