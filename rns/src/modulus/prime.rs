use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::MontgomeryPrecomp;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prime<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    /// distinct prime factors of q-1
    pub factors: Vec<O>,
    pub montgomery: MontgomeryPrecomp<O>,
    pub barrett: BarrettPrecomp<O>,
    pub phi: O,
}

/// Enumerates primes q = 1 mod step around 2^bit_size, alternating
/// between candidates above and below, without crossing into the
/// neighbouring half bit-size.
pub struct NTTFriendlyPrimesGenerator<O> {
    pub size: f64,
    pub step: O,
    pub next_prime: O,
    pub prev_prime: O,
    pub check_next_prime: bool,
    pub check_prev_prime: bool,
}
