use crate::config::ValueBounds;
use crate::error::PipelineError;
use crate::generator::{Inputs, Sample, VectorGenerator};
use crate::timing::{Phase, PhaseTimer, Timings};
use sampling::source::Source;
use schemes::{Capabilities, Ciphertext, KeyMaterial, Parameters, Plaintext, Scheme, SchemeKind};
use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

/// Progress of a run. Each phase moves the pipeline one state forward; a
/// failure leaves it where it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Uninitialized,
    ContextReady,
    KeysReady,
    Encrypted,
    Evaluated,
    Decrypted,
    Terminal,
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::Uninitialized => "uninitialized",
            State::ContextReady => "context_ready",
            State::KeysReady => "keys_ready",
            State::Encrypted => "encrypted",
            State::Evaluated => "evaluated",
            State::Decrypted => "decrypted",
            State::Terminal => "terminal",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Phase {
    /// State reached when the phase completes.
    fn target(&self) -> State {
        match self {
            Phase::ParameterGeneration => State::ContextReady,
            Phase::KeyGeneration => State::KeysReady,
            Phase::Encryption => State::Encrypted,
            Phase::Evaluation => State::Evaluated,
            Phase::Decryption => State::Decrypted,
        }
    }
}

/// Where the input vectors come from.
#[derive(Clone, Debug)]
pub enum Workload<V> {
    Fixed(Inputs<V>),
    /// Uniform values below the bounds; element_count defaults to the slot count.
    Generated {
        element_count: Option<usize>,
        bounds: ValueBounds,
    },
}

impl<V: Sample> Workload<V> {
    /// Number of elements the ring must hold.
    fn element_count(&self) -> usize {
        match self {
            Workload::Fixed(inputs) => inputs.max_len(),
            Workload::Generated { element_count, .. } => element_count.unwrap_or(1),
        }
    }
}

/// Agreement of the decrypted values with the plaintext evaluation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Verification {
    pub checked: usize,
    pub mismatches: usize,
    pub first_mismatch: Option<usize>,
    pub max_error: f64,
}

impl Verification {
    pub fn compare<V: Sample>(got: &[V], want: &[V]) -> Self {
        let mut verification: Verification = Verification {
            checked: want.len(),
            mismatches: if got.len() == want.len() { 0 } else { want.len().max(got.len()) },
            first_mismatch: None,
            max_error: 0.0,
        };
        got.iter().zip(want.iter()).enumerate().for_each(|(i, (g, w))| {
            verification.max_error = verification.max_error.max(V::distance(*g, *w));
            if !V::matches(*g, *w) {
                verification.mismatches += 1;
                verification.first_mismatch.get_or_insert(i);
            }
        });
        verification
    }

    pub fn passed(&self) -> bool {
        self.mismatches == 0
    }

    /// Merges the counts of another comparison.
    pub fn merge(&mut self, other: &Verification) {
        if self.first_mismatch.is_none() {
            self.first_mismatch = other.first_mismatch;
        }
        self.checked += other.checked;
        self.mismatches += other.mismatches;
        self.max_error = self.max_error.max(other.max_error);
    }
}

/// A result vector rotated left by steps within each row.
#[derive(Clone, Debug, PartialEq)]
pub struct Rotated<V> {
    pub steps: i64,
    pub values: Vec<V>,
}

/// Everything a completed run produced.
#[derive(Clone, Debug)]
pub struct Outcome<V> {
    pub scheme: SchemeKind,
    pub capabilities: Capabilities,
    pub inputs: Inputs<V>,
    pub output: Vec<V>,
    pub reference: Vec<V>,
    pub rotated: Vec<Rotated<V>>,
    pub verification: Verification,
    pub timings: Timings,
}

/// Drives one backend through the phases of a run. Owns the randomness and
/// the timings; the backend context, keys and ciphertexts live only for the
/// duration of run.
pub struct Pipeline {
    params: Parameters,
    generator: VectorGenerator,
    /// Key generation and encryption randomness, branched off the generator.
    source: Source,
    state: State,
    timings: Timings,
}

impl Pipeline {
    pub fn new(params: Parameters, mut generator: VectorGenerator) -> Self {
        let source: Source = generator.branch();
        Self {
            params,
            generator,
            source,
            state: State::Uninitialized,
            timings: Timings::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Times body as phase. On success the pipeline moves to the phase's
    /// target state; on failure it stays and the error keeps the timings.
    fn phase<T>(
        &mut self,
        phase: Phase,
        body: impl FnOnce(&mut Source) -> schemes::Result<T>,
    ) -> Result<T, PipelineError> {
        debug_assert!(
            self.state < phase.target(),
            "phase {} entered in state {}",
            phase,
            self.state
        );
        let result: schemes::Result<T> = {
            let _timer: PhaseTimer<'_> = PhaseTimer::scope(&mut self.timings, phase);
            body(&mut self.source)
        };
        match result {
            Ok(value) => {
                self.state = phase.target();
                Ok(value)
            }
            Err(source) => {
                error!(%phase, state = %self.state, %source, "run aborted");
                Err(PipelineError {
                    phase,
                    state: self.state,
                    source,
                    timings: self.timings.clone(),
                })
            }
        }
    }

    /// Runs every phase once and verifies the result. Backend failures abort
    /// the run and are never retried.
    pub fn run<S: Scheme>(&mut self, workload: &Workload<S::Value>) -> Result<Outcome<S::Value>, PipelineError>
    where
        S::Value: Sample,
    {
        self.state = State::Uninitialized;
        self.timings = Timings::new();
        let mut params: Parameters = self.params.clone();
        params.element_count = workload.element_count();

        let scheme: S = self.phase(Phase::ParameterGeneration, |_| {
            params.scheme.ensure_available()?;
            let scheme: S = S::setup(&params)?;
            let slots: usize = scheme.capabilities().slot_count;
            if params.element_count > slots {
                return Err(schemes::Error::parameter(
                    "element_count",
                    format!("{} elements exceed {} slots", params.element_count, slots),
                ));
            }
            Ok(scheme)
        })?;
        let capabilities: Capabilities = scheme.capabilities();
        info!(
            scheme = %params.scheme,
            n = capabilities.ring_degree,
            slots = capabilities.slot_count,
            log_q = capabilities.log_q,
            "context ready"
        );

        let keys: KeyMaterial = self.phase(Phase::KeyGeneration, |source| scheme.keygen(source))?;

        let inputs: Inputs<S::Value> = match workload {
            Workload::Fixed(inputs) => inputs.clone(),
            Workload::Generated {
                element_count,
                bounds,
            } => {
                let len: usize = element_count.unwrap_or(capabilities.slot_count);
                if let Some(t) = capabilities.plain_modulus {
                    if bounds.max_result() >= t as u128 {
                        warn!(t, max = %bounds.max_result(), "results wrap modulo the plaintext modulus");
                    }
                }
                self.generator.inputs(len, bounds)
            }
        };
        if let (Workload::Fixed(_), Some(t)) = (workload, capabilities.plain_modulus) {
            if inputs.max_result() >= t as f64 {
                warn!(t, max = inputs.max_result(), "results wrap modulo the plaintext modulus");
            }
        }

        let [ct_a, ct_v, ct_t] = self.phase(Phase::Encryption, |source| {
            inputs.check_shape()?;
            let encrypt = |values: &[S::Value], source: &mut Source| -> schemes::Result<Ciphertext> {
                let pt: Plaintext = scheme.encode(values)?;
                scheme.encrypt(&keys.public, &pt, source)
            };
            Ok([
                encrypt(&inputs.acceleration, source)?,
                encrypt(&inputs.initial_velocity, source)?,
                encrypt(&inputs.time, source)?,
            ])
        })?;

        let rotations: Vec<i64> = params.rotations.clone();
        let (result, rotated) = self.phase(Phase::Evaluation, |_| {
            let product: Ciphertext = scheme.multiply(&keys.evaluation, &ct_a, &ct_t)?;
            let (product, velocity) = scheme.align(product, ct_v)?;
            let result: Ciphertext = scheme.add(&product, &velocity)?;
            let rotated: Vec<(i64, Ciphertext)> = rotations
                .iter()
                .map(|steps| Ok((*steps, scheme.rotate(&keys.evaluation, &result, *steps)?)))
                .collect::<schemes::Result<Vec<(i64, Ciphertext)>>>()?;
            Ok((result, rotated))
        })?;

        let len: usize = inputs.len();
        let (output, rotated) = self.phase(Phase::Decryption, |_| {
            let decrypt = |ct: &Ciphertext| -> schemes::Result<Vec<S::Value>> {
                let values: Vec<S::Value> = scheme.decode(&scheme.decrypt(&keys, ct)?)?;
                if values.len() != len {
                    return Err(schemes::Error::shape("decode", len, values.len()));
                }
                Ok(values)
            };
            let output: Vec<S::Value> = decrypt(&result)?;
            let rotated: Vec<Rotated<S::Value>> = rotated
                .iter()
                .map(|(steps, ct)| {
                    Ok(Rotated {
                        steps: *steps,
                        values: decrypt(ct)?,
                    })
                })
                .collect::<schemes::Result<Vec<Rotated<S::Value>>>>()?;
            Ok((output, rotated))
        })?;

        let reference: Vec<S::Value> = inputs.reference(capabilities.plain_modulus);
        let mut verification: Verification = Verification::compare(&output, &reference);
        rotated.iter().for_each(|r| {
            let want: Vec<S::Value> = rotate_reference(&reference, r.steps, &capabilities);
            verification.merge(&Verification::compare(&r.values, &want));
        });
        self.state = State::Terminal;

        if verification.passed() {
            info!(checked = verification.checked, max_error = verification.max_error, "verified");
        } else {
            warn!(
                mismatches = verification.mismatches,
                first = ?verification.first_mismatch,
                "decrypted values differ from the plaintext evaluation"
            );
        }

        Ok(Outcome {
            scheme: params.scheme,
            capabilities,
            inputs,
            output,
            reference,
            rotated,
            verification,
            timings: self.timings.clone(),
        })
    }
}

/// Rotates the first values of the slot layout left by steps within each
/// row of row_len slots. Unused slots hold zero.
fn rotate_reference<V: Sample>(values: &[V], steps: i64, capabilities: &Capabilities) -> Vec<V> {
    let row: usize = capabilities.row_len();
    let zero: V = V::zero();
    (0..values.len())
        .map(|i| {
            let (r, c) = (i / row, i % row);
            let j: usize = r * row + (c as i64 + steps).rem_euclid(row as i64) as usize;
            values.get(j).copied().unwrap_or(zero)
        })
        .collect()
}
