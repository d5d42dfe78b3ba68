use crate::error::ConfigError;
use schemes::{Parameters, SchemeKind, SecurityLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_HEAD_COUNT: usize = 20;
pub const DEFAULT_TAIL_COUNT: usize = 2;

/// Exclusive upper bounds of the generated inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueBounds {
    pub acceleration: u64,
    pub velocity: u64,
    pub time: u64,
}

impl ValueBounds {
    pub const fn new(acceleration: u64, velocity: u64, time: u64) -> Self {
        Self {
            acceleration,
            velocity,
            time,
        }
    }

    /// Largest value of v + a*t the inputs can produce.
    pub fn max_result(&self) -> u128 {
        let dec = |b: u64| b.saturating_sub(1) as u128;
        dec(self.velocity) + dec(self.acceleration) * dec(self.time)
    }
}

/// Everything a run is parameterized by.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scheme: SchemeKind,
    /// Number of generated elements; the full slot count when absent.
    pub element_count: Option<usize>,
    pub value_bounds: ValueBounds,
    pub security_level: SecurityLevel,
    pub multiplicative_depth: usize,
    pub batching_enabled: bool,
    /// Forces the ring degree instead of the smallest admissible one.
    pub ring_degree: Option<usize>,
    /// Seeds the generator and the encryption randomness; OS entropy when absent.
    pub seed: Option<u64>,
    /// Rotation steps applied to the result and checked against the reference.
    pub rotations: Vec<i64>,
    pub head_count: usize,
    pub tail_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config::exact_batched()
    }
}

impl Config {
    /// Batched BFV over N = 8192 slots with inputs below 250, 500 and 300.
    pub fn exact_batched() -> Self {
        Self {
            scheme: SchemeKind::ExactBatched,
            element_count: Some(8192),
            value_bounds: ValueBounds::new(250, 500, 300),
            security_level: SecurityLevel::Classic128,
            multiplicative_depth: 1,
            batching_enabled: true,
            ring_degree: None,
            seed: None,
            rotations: Vec::new(),
            head_count: DEFAULT_HEAD_COUNT,
            tail_count: DEFAULT_TAIL_COUNT,
        }
    }

    /// CKKS over 2760 reals below 25, 50 and 30.
    pub fn approximate_real() -> Self {
        Self {
            scheme: SchemeKind::ApproximateReal,
            element_count: Some(2760),
            value_bounds: ValueBounds::new(25, 50, 30),
            ..Self::exact_batched()
        }
    }

    /// BGV over every slot with inputs below 25, 50 and 30.
    pub fn modulus_chain() -> Self {
        Self {
            scheme: SchemeKind::ModulusChain,
            element_count: None,
            value_bounds: ValueBounds::new(25, 50, 30),
            ..Self::exact_batched()
        }
    }

    /// Returns the preset of scheme.
    pub fn preset(scheme: SchemeKind) -> Self {
        match scheme {
            SchemeKind::ExactBatched => Self::exact_batched(),
            SchemeKind::ModulusChain => Self::modulus_chain(),
            SchemeKind::ApproximateReal => Self::approximate_real(),
            SchemeKind::ApproximateRealExtended => Self {
                scheme,
                ..Self::approximate_real()
            },
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json: String = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json(&self) -> String {
        // plain data with string keys only
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Scheme parameters for element_count values. The count decides the
    /// smallest ring degree that holds the inputs.
    pub fn parameters(&self, element_count: usize) -> Parameters {
        let params: Parameters = Parameters::new(self.scheme)
            .with_security(self.security_level)
            .with_depth(self.multiplicative_depth)
            .with_batching(self.batching_enabled)
            .with_element_count(element_count)
            .with_rotations(self.rotations.clone());
        match self.ring_degree {
            Some(n) => params.with_ring_degree(n),
            None => params,
        }
    }

    /// Rejects bounds that cannot be sampled from.
    pub fn validate(&self) -> schemes::Result<()> {
        let b: &ValueBounds = &self.value_bounds;
        if b.acceleration == 0 || b.velocity == 0 || b.time == 0 {
            return Err(schemes::Error::parameter(
                "value_bounds",
                format!(
                    "bounds must be positive, got acceleration={} velocity={} time={}",
                    b.acceleration, b.velocity, b.time
                ),
            ));
        }
        if self.element_count == Some(0) {
            return Err(schemes::Error::parameter(
                "element_count",
                "at least one element is required",
            ));
        }
        Ok(())
    }
}
