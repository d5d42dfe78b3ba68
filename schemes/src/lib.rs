pub mod bfv;
pub mod bgv;
pub mod ciphertext;
pub mod ckks;
pub mod context;
pub mod decryptor;
pub mod encoding;
pub mod encryptor;
pub mod error;
pub mod evaluator;
pub mod key_generator;
pub mod key_switching;
pub mod keys;
pub mod parameters;
pub mod plaintext;
pub mod security;

pub use bfv::Bfv;
pub use bgv::Bgv;
pub use ciphertext::Ciphertext;
pub use ckks::Ckks;
pub use error::{Error, Result};
pub use keys::{EvaluationKeys, KeyMaterial, PublicKey};
pub use parameters::{ParameterSet, Parameters};
pub use plaintext::Plaintext;
pub use security::SecurityLevel;

use sampling::source::Source;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The scheme variants a run can select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    /// BFV: exact integer arithmetic modulo t with SIMD batching.
    ExactBatched,
    /// BGV: exact integer arithmetic with a modulus chain.
    ModulusChain,
    /// CKKS: approximate fixed-point arithmetic on reals.
    ApproximateReal,
    /// CKKS with multi-precision encoding and decoding.
    ApproximateRealExtended,
}

impl SchemeKind {
    pub const ALL: [SchemeKind; 4] = [
        SchemeKind::ExactBatched,
        SchemeKind::ModulusChain,
        SchemeKind::ApproximateReal,
        SchemeKind::ApproximateRealExtended,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SchemeKind::ExactBatched => "exact_batched",
            SchemeKind::ModulusChain => "modulus_chain",
            SchemeKind::ApproximateReal => "approximate_real",
            SchemeKind::ApproximateRealExtended => "approximate_real_extended",
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, SchemeKind::ExactBatched | SchemeKind::ModulusChain)
    }

    /// Returns false for variants whose cargo feature is not enabled.
    pub fn is_available(&self) -> bool {
        match self {
            SchemeKind::ApproximateRealExtended => cfg!(feature = "extended-precision"),
            _ => true,
        }
    }

    /// Fails with BackendUnavailable unless the variant is compiled in.
    pub fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            return Ok(());
        }
        Err(Error::BackendUnavailable {
            scheme: self.name().to_string(),
            capability: "multi-precision encoding requires the `extended-precision` feature"
                .to_string(),
        })
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s.to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "exact_batched" | "bfv" => Ok(SchemeKind::ExactBatched),
            "modulus_chain" | "bgv" => Ok(SchemeKind::ModulusChain),
            "approximate_real" | "ckks" => Ok(SchemeKind::ApproximateReal),
            "approximate_real_extended" | "ckks_extended" => {
                Ok(SchemeKind::ApproximateRealExtended)
            }
            _ => Err(Error::parameter(
                "scheme",
                format!(
                    "unknown scheme {:?}, expected one of {}",
                    s,
                    SchemeKind::ALL.map(|k| k.name()).join(", ")
                ),
            )),
        }
    }
}

/// Scheme differences exposed as plain values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Capabilities {
    pub exact: bool,
    pub has_scale: bool,
    pub supports_rotation: bool,
    /// Multiplications a fresh ciphertext can go through.
    pub modulus_chain_depth: usize,
    pub slot_count: usize,
    pub ring_degree: usize,
    pub plain_modulus: Option<u64>,
    pub log_q: usize,
}

impl Capabilities {
    /// Length of the cyclic group a rotation acts on: two rows of N/2 for
    /// the integer schemes, all N/2 slots for CKKS.
    pub fn row_len(&self) -> usize {
        if self.exact && self.slot_count > 1 {
            self.slot_count / 2
        } else {
            self.slot_count
        }
    }
}

/// The operations every backend offers. The backend value is the context:
/// it owns the resolved parameters and rings, and all randomness comes in
/// through an explicit Source.
pub trait Scheme: Sized {
    type Value: Copy + fmt::Debug + PartialEq;

    fn setup(params: &Parameters) -> Result<Self>;

    fn capabilities(&self) -> Capabilities;

    fn keygen(&self, source: &mut Source) -> Result<KeyMaterial>;

    fn encode(&self, values: &[Self::Value]) -> Result<Plaintext>;

    fn encrypt(&self, pk: &PublicKey, pt: &Plaintext, source: &mut Source) -> Result<Ciphertext>;

    fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext>;

    /// Multiplies and applies the scheme's post-step: relinearization, then
    /// rescaling (CKKS) or modulus switching (BGV).
    fn multiply(&self, keys: &EvaluationKeys, a: &Ciphertext, b: &Ciphertext)
    -> Result<Ciphertext>;

    /// Brings both operands to a common level and scale.
    fn align(&self, a: Ciphertext, b: Ciphertext) -> Result<(Ciphertext, Ciphertext)>;

    /// Rotates the slots left by steps within each row.
    fn rotate(&self, keys: &EvaluationKeys, ct: &Ciphertext, steps: i64) -> Result<Ciphertext>;

    fn decrypt(&self, keys: &KeyMaterial, ct: &Ciphertext) -> Result<Plaintext>;

    fn decode(&self, pt: &Plaintext) -> Result<Vec<Self::Value>>;
}
