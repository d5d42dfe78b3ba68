use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};

impl Ring<u64> {
    /// b <- a(X^gal_el) in the coefficient domain. gal_el must be odd.
    pub fn a_apply_automorphism_into_b(&self, a: &Poly<u64>, gal_el: usize, b: &mut Poly<u64>) {
        debug_assert!(gal_el & 1 == 1, "invalid gal_el={}: must be odd", gal_el);
        debug_assert!(a.n() == self.n() && b.n() == self.n());
        let q: u64 = self.modulus.q;
        let mask: usize = self.cyclotomic_order() - 1;
        let log_n: usize = self.log_n();
        let n_mask: usize = self.n() - 1;
        a.0.iter().enumerate().for_each(|(i, ai)| {
            let i_pow: usize = (i * gal_el) & mask;
            let j: usize = i_pow & n_mask;
            // X^(n+j) = -X^j
            if (i_pow >> log_n) & 1 == 1 && *ai != 0 {
                b.0[j] = q - *ai;
            } else {
                b.0[j] = *ai;
            }
        });
    }
}

impl RingRNS<u64> {
    pub fn a_apply_automorphism_into_b(&self, a: &PolyRNS<u64>, gal_el: usize, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.a_apply_automorphism_into_b(a.at(i), gal_el, b.at_mut(i))
        });
    }
}

/// Returns g^k mod 2n for a generator g of the cyclic rotation group,
/// with negative k rotating the other way in a group of order n/2.
pub fn galois_element(generator: usize, k: i64, n: usize) -> usize {
    let order: i64 = (n >> 1) as i64;
    let mask: usize = (n << 1) - 1;
    let mut exponent: i64 = k.rem_euclid(order);
    let mut g: usize = 1;
    let mut base: usize = generator & mask;
    while exponent > 0 {
        if exponent & 1 == 1 {
            g = (g * base) & mask;
        }
        base = (base * base) & mask;
        exponent >>= 1;
    }
    g
}
