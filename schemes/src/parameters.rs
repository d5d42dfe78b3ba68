use crate::SchemeKind;
use crate::error::{Error, Result};
use crate::security::{MAX_RING_DEGREE, MIN_RING_DEGREE, SecurityLevel};
use num_bigint::BigInt;
use rns::modulus::prime::NTTFriendlyPrimesGenerator;
use tracing::debug;

/// Standard deviation of the Gaussian error.
pub const SIGMA: f64 = 3.2;
/// Error samples are rejected beyond this bound.
pub const SIGMA_BOUND: f64 = 6.0 * SIGMA;
/// Gadget decomposition base 2^GADGET_BASE_LOG inside each RNS prime.
pub const GADGET_BASE_LOG: usize = 20;
/// Bit size of the ciphertext primes of BFV and BGV and of the CKKS base prime.
pub const CIPHERTEXT_PRIME_BITS: u64 = 60;
/// Bit size of the CKKS scaling primes.
pub const CKKS_SCALE_BITS: u64 = 40;
pub const BFV_PLAIN_MODULUS_BITS: u64 = 20;
pub const BGV_PLAIN_MODULUS_BITS: u64 = 17;
pub const MAX_DEPTH: usize = 16;

/// What a run asks for. Resolved into a ParameterSet by setup.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub scheme: SchemeKind,
    pub security: SecurityLevel,
    /// Number of sequential multiplications to support.
    pub depth: usize,
    /// Forces the ring degree instead of choosing the smallest secure one.
    pub ring_degree: Option<usize>,
    /// When false, values are encoded one per plaintext in the constant coefficient.
    pub batching: bool,
    /// Number of values per vector; the ring must hold that many slots.
    pub element_count: usize,
    /// Rotation steps to generate galois keys for.
    pub rotations: Vec<i64>,
}

impl Parameters {
    pub fn new(scheme: SchemeKind) -> Self {
        Self {
            scheme,
            security: SecurityLevel::default(),
            depth: 1,
            ring_degree: None,
            batching: true,
            element_count: 1,
            rotations: Vec::new(),
        }
    }

    pub fn with_security(mut self, security: SecurityLevel) -> Self {
        self.security = security;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_ring_degree(mut self, n: usize) -> Self {
        self.ring_degree = Some(n);
        self
    }

    pub fn with_batching(mut self, batching: bool) -> Self {
        self.batching = batching;
        self
    }

    pub fn with_element_count(mut self, element_count: usize) -> Self {
        self.element_count = element_count;
        self
    }

    pub fn with_rotations(mut self, rotations: Vec<i64>) -> Self {
        self.rotations = rotations;
        self
    }
}

/// Concrete parameters of one backend instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    pub scheme: SchemeKind,
    pub security: SecurityLevel,
    pub n: usize,
    /// Ciphertext primes, base prime first.
    pub moduli: Vec<u64>,
    /// Auxiliary primes for the BFV tensor product, empty otherwise.
    pub extension: Vec<u64>,
    /// Prime P of the key switching keys, which live modulo Q*P.
    pub special: u64,
    pub plain_modulus: Option<u64>,
    /// Encoding scale of CKKS, equal to the last prime.
    pub scale: Option<f64>,
    pub log_q: usize,
    /// Bit size of Q*P, the largest modulus a public sample lives under.
    pub log_qp: usize,
    pub depth: usize,
    pub batching: bool,
    pub slot_count: usize,
    pub sigma: f64,
    pub base_log: usize,
    pub rotations: Vec<i64>,
}

struct Moduli {
    moduli: Vec<u64>,
    extension: Vec<u64>,
    special: u64,
    plain_modulus: Option<u64>,
}

impl ParameterSet {
    /// Picks the ring degree and the primes for the requested scheme. Tries
    /// the configured degree only, or every degree from 2^10 to 2^15 until
    /// the slot count holds the elements and log2(Q*P) meets the security level.
    pub fn resolve(params: &Parameters) -> Result<ParameterSet> {
        params.scheme.ensure_available()?;

        if params.depth == 0 || params.depth > MAX_DEPTH {
            return Err(Error::parameter(
                "depth",
                format!("depth={} must be in [1, {}]", params.depth, MAX_DEPTH),
            ));
        }

        if params.element_count == 0 {
            return Err(Error::parameter("element_count", "at least one element is required"));
        }

        if !params.batching && params.element_count > 1 {
            return Err(Error::parameter(
                "batching",
                format!(
                    "batching is disabled, so only one element fits a plaintext, got {}",
                    params.element_count
                ),
            ));
        }

        if !params.batching && !params.rotations.is_empty() {
            return Err(Error::parameter("rotations", "rotations require batching"));
        }

        let candidates: Vec<usize> = match params.ring_degree {
            Some(n) => vec![n],
            None => (MIN_RING_DEGREE.trailing_zeros()..=MAX_RING_DEGREE.trailing_zeros())
                .map(|log_n| 1 << log_n)
                .collect(),
        };
        let fixed: bool = params.ring_degree.is_some();

        for n in candidates {
            if !n.is_power_of_two() || n < params.security.min_ring_degree() || n > MAX_RING_DEGREE
            {
                // Let the security check phrase the error.
                params.security.check(n, 0)?;
            }

            let slot_count: usize = if params.batching {
                slots(params.scheme, n)
            } else {
                1
            };

            if params.element_count > slot_count {
                if fixed {
                    return Err(Error::parameter(
                        "element_count",
                        format!(
                            "{} elements exceed the {} slots of N={}",
                            params.element_count, slot_count, n
                        ),
                    ));
                }
                continue;
            }

            let primes: Moduli = generate_moduli(params.scheme, n, params.depth)?;
            let log_q: usize = log_modulus(&primes.moduli);
            let log_qp: usize = log_modulus(&[primes.moduli.as_slice(), &[primes.special]].concat());

            if let Err(err) = params.security.check(n, log_qp) {
                if fixed {
                    return Err(err);
                }
                continue;
            }

            let scale: Option<f64> = match params.scheme {
                SchemeKind::ApproximateReal | SchemeKind::ApproximateRealExtended => {
                    primes.moduli.last().map(|q| *q as f64)
                }
                _ => None,
            };

            debug!(
                scheme = %params.scheme,
                n,
                log_q,
                log_qp,
                slot_count,
                plain_modulus = ?primes.plain_modulus,
                "resolved parameters"
            );

            return Ok(ParameterSet {
                scheme: params.scheme,
                security: params.security,
                n,
                moduli: primes.moduli,
                extension: primes.extension,
                special: primes.special,
                plain_modulus: primes.plain_modulus,
                scale,
                log_q,
                log_qp,
                depth: params.depth,
                batching: params.batching,
                slot_count,
                sigma: SIGMA,
                base_log: GADGET_BASE_LOG,
                rotations: params.rotations.clone(),
            });
        }

        Err(Error::parameter(
            "ring_degree",
            format!(
                "no ring degree up to {} holds {} elements at depth {} with {}",
                MAX_RING_DEGREE, params.element_count, params.depth, params.security
            ),
        ))
    }
}

/// Number of batching slots of a ring of degree n.
pub fn slots(scheme: SchemeKind, n: usize) -> usize {
    if scheme.is_exact() { n } else { n >> 1 }
}

/// Returns the bit size of the product of the moduli.
pub fn log_modulus(moduli: &[u64]) -> usize {
    moduli
        .iter()
        .fold(BigInt::from(1), |acc, q| acc * BigInt::from(*q))
        .bits() as usize
}

fn generate_moduli(scheme: SchemeKind, n: usize, depth: usize) -> Result<Moduli> {
    let two_n: u64 = (n as u64) << 1;
    let exhausted = |what: &str| {
        Error::parameter(
            "moduli",
            format!("not enough NTT-friendly {} for N={} at depth {}", what, n, depth),
        )
    };

    match scheme {
        SchemeKind::ExactBatched => {
            let t: u64 = NTTFriendlyPrimesGenerator::<u64>::smallest(BFV_PLAIN_MODULUS_BITS, two_n)
                .ok_or_else(|| exhausted("plaintext primes"))?;
            // depth+1 ciphertext primes, then P, then one more extension prime than Q
            let mut primes: Vec<u64> =
                NTTFriendlyPrimesGenerator::<u64>::new(CIPHERTEXT_PRIME_BITS, two_n)
                    .next_alternating_primes(2 * depth + 4)
                    .ok_or_else(|| exhausted("ciphertext primes"))?;
            let extension: Vec<u64> = primes.split_off(depth + 2);
            let special: u64 = primes.pop().ok_or_else(|| exhausted("special primes"))?;
            Ok(Moduli {
                moduli: primes,
                extension,
                special,
                plain_modulus: Some(t),
            })
        }
        SchemeKind::ModulusChain => {
            let t: u64 = NTTFriendlyPrimesGenerator::<u64>::smallest(BGV_PLAIN_MODULUS_BITS, two_n)
                .ok_or_else(|| exhausted("plaintext primes"))?;
            // q = 1 mod t keeps the plaintext unchanged by modulus switching
            let mut moduli: Vec<u64> =
                NTTFriendlyPrimesGenerator::<u64>::new(CIPHERTEXT_PRIME_BITS, two_n * t)
                    .next_alternating_primes(depth + 2)
                    .ok_or_else(|| exhausted("ciphertext primes"))?;
            let special: u64 = moduli.pop().ok_or_else(|| exhausted("special primes"))?;
            Ok(Moduli {
                moduli,
                extension: Vec::new(),
                special,
                plain_modulus: Some(t),
            })
        }
        SchemeKind::ApproximateReal | SchemeKind::ApproximateRealExtended => {
            let mut moduli: Vec<u64> =
                NTTFriendlyPrimesGenerator::<u64>::new(CIPHERTEXT_PRIME_BITS, two_n)
                    .next_alternating_primes(2)
                    .ok_or_else(|| exhausted("base primes"))?;
            let special: u64 = moduli.pop().ok_or_else(|| exhausted("special primes"))?;
            moduli.extend(
                NTTFriendlyPrimesGenerator::<u64>::new(CKKS_SCALE_BITS, two_n)
                    .next_alternating_primes(depth)
                    .ok_or_else(|| exhausted("scaling primes"))?,
            );
            Ok(Moduli {
                moduli,
                extension: Vec::new(),
                special,
                plain_modulus: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_degrees() {
        let bfv: ParameterSet =
            ParameterSet::resolve(&Parameters::new(SchemeKind::ExactBatched).with_element_count(8))
                .expect("bfv");
        assert_eq!(bfv.n, 8192);
        assert_eq!(bfv.moduli.len(), 2);
        assert_eq!(bfv.extension.len(), 3);
        assert!(bfv.log_qp <= 218);
        assert!(!bfv.moduli.contains(&bfv.special));
        assert!(!bfv.extension.contains(&bfv.special));
        let t: u64 = bfv.plain_modulus.expect("plaintext modulus");
        assert_eq!(t % (2 * 8192), 1);
        assert_eq!(64 - t.leading_zeros(), 20);

        let bgv: ParameterSet =
            ParameterSet::resolve(&Parameters::new(SchemeKind::ModulusChain)).expect("bgv");
        assert_eq!(bgv.n, 8192);
        assert_eq!(bgv.plain_modulus, Some(65537));
        bgv.moduli
            .iter()
            .chain([&bgv.special])
            .for_each(|q| assert_eq!(q % (2 * 8192 * 65537), 1));
        assert!(!bgv.moduli.contains(&bgv.special));

        let ckks: ParameterSet = ParameterSet::resolve(
            &Parameters::new(SchemeKind::ApproximateReal).with_element_count(2760),
        )
        .expect("ckks");
        assert_eq!(ckks.n, 8192);
        assert_eq!(ckks.slot_count, 4096);
        assert_eq!(ckks.scale, Some(ckks.moduli[1] as f64));
    }

    #[test]
    fn special_prime_counts_towards_security() {
        let ckks: ParameterSet =
            ParameterSet::resolve(&Parameters::new(SchemeKind::ApproximateReal)).expect("ckks");
        // Q alone fits N=4096, Q*P does not
        assert!(ckks.log_q <= 109);
        assert!(ckks.log_qp > 109);
        assert_eq!(ckks.n, 8192);
        assert_eq!(64 - ckks.special.leading_zeros(), 60);
        assert_ne!(ckks.special, ckks.moduli[0]);
    }

    #[test]
    fn invalid_requests() {
        let p: Parameters = Parameters::new(SchemeKind::ExactBatched);

        assert!(matches!(
            ParameterSet::resolve(&p.clone().with_depth(0)),
            Err(Error::Parameter {
                parameter: "depth",
                ..
            })
        ));
        assert!(matches!(
            ParameterSet::resolve(&p.clone().with_ring_degree(1024)),
            Err(Error::Parameter {
                parameter: "security_level",
                ..
            })
        ));
        assert!(matches!(
            ParameterSet::resolve(&p.clone().with_ring_degree(3000)),
            Err(Error::Parameter {
                parameter: "ring_degree",
                ..
            })
        ));
        assert!(matches!(
            ParameterSet::resolve(&p.clone().with_batching(false).with_element_count(2)),
            Err(Error::Parameter {
                parameter: "batching",
                ..
            })
        ));
        assert!(matches!(
            ParameterSet::resolve(
                &p.clone()
                    .with_security(SecurityLevel::NotSet)
                    .with_ring_degree(16)
                    .with_element_count(17)
            ),
            Err(Error::Parameter {
                parameter: "element_count",
                ..
            })
        ));
    }

    #[test]
    fn insecure_small_rings() {
        let p: ParameterSet = ParameterSet::resolve(
            &Parameters::new(SchemeKind::ModulusChain)
                .with_security(SecurityLevel::NotSet)
                .with_ring_degree(32)
                .with_depth(2),
        )
        .expect("bgv");
        assert_eq!(p.n, 32);
        assert_eq!(p.moduli.len(), 3);
        assert_eq!(p.slot_count, 32);
    }
}
