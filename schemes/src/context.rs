use crate::error::{Error, Result};
use crate::parameters::{ParameterSet, SIGMA_BOUND};
use rns::modulus::{ONCE, WordOps};
use rns::poly::PolyRNS;
use rns::ring::RingRNS;
use sampling::source::Source;

/// The RLWE machinery shared by all schemes: the ciphertext ring, the key
/// ring Q*P and the noise parameters. Key generation, encryption, decryption
/// and key switching are implemented on it in their own modules.
pub struct Context {
    pub ring: RingRNS<u64>,
    /// The single prime P.
    pub special: RingRNS<u64>,
    /// Ciphertext primes followed by P.
    pub key_ring: RingRNS<u64>,
    pub sigma: f64,
    pub bound: f64,
    pub base_log: usize,
    /// Multiplier of every fresh error term: t for BGV, 1 otherwise.
    pub error_scale: u64,
}

impl Context {
    pub fn new(params: &ParameterSet, error_scale: u64) -> Self {
        let ring: RingRNS<u64> = RingRNS::new(params.n, &params.moduli);
        let special: RingRNS<u64> = RingRNS::new(params.n, &[params.special]);
        Self {
            key_ring: ring.extend(&special),
            ring,
            special,
            sigma: params.sigma,
            bound: SIGMA_BOUND.max(params.sigma),
            base_log: params.base_log,
            error_scale,
        }
    }

    pub fn n(&self) -> usize {
        self.ring.n()
    }

    pub fn max_level(&self) -> usize {
        self.ring.max_level()
    }

    /// Number of base 2^base_log digits of a residue modulo q.
    pub fn digits(&self, q: u64) -> usize {
        q.log2().div_ceil(self.base_log)
    }

    /// Fills e with a bounded Gaussian error times error_scale, in the
    /// coefficient domain.
    pub(crate) fn fill_error(
        &self,
        ring: &RingRNS<u64>,
        source: &mut Source,
        e: &mut PolyRNS<u64>,
    ) -> Result<()> {
        ring.fill_normal(source, self.sigma, self.bound, e)
            .map_err(|err| Error::parameter("sigma", err.to_string()))?;
        if self.error_scale != 1 {
            ring.a_mul_b_scalar_into_a::<ONCE>(&self.error_scale, e);
        }
        Ok(())
    }

    /// Divides a, given modulo q_0..q_l*P in the coefficient domain, by P and
    /// drops the last residue. Rounds to the nearest integer, or to the
    /// nearest value congruent to 0 modulo error_scale when it exceeds one so
    /// that the result stays a multiple of t plus the plaintext.
    pub(crate) fn div_by_special(&self, ring_lp: &RingRNS<u64>, a: &mut PolyRNS<u64>) {
        if self.error_scale == 1 {
            ring_lp.div_by_last_modulus_inplace::<true>(a);
        } else {
            ring_lp.div_by_last_modulus_mod_t_inplace(self.error_scale, a);
        }
    }
}
