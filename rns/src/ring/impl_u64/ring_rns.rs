use crate::modulus::montgomery::Montgomery;
use crate::modulus::REDUCEMOD;
use crate::poly::PolyRNS;
use crate::ring::{Ring, RingRNS};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use std::rc::Rc;

impl RingRNS<u64> {
    /// Returns Z_Q[X]/(X^n+1) for Q the product of the given NTT-friendly primes.
    pub fn new(n: usize, moduli: &[u64]) -> Self {
        assert!(!moduli.is_empty(), "moduli cannot be empty");
        RingRNS(
            moduli
                .iter()
                .map(|q| Rc::new(Ring::new(n, *q)))
                .collect(),
        )
    }

    /// Returns a ring over self's primes followed by other's primes.
    pub fn extend(&self, other: &RingRNS<u64>) -> Self {
        RingRNS(self.0.iter().chain(other.0.iter()).cloned().collect())
    }

    pub fn moduli(&self) -> Vec<u64> {
        self.0.iter().map(|r| r.modulus.q).collect()
    }

    /// Returns Q = q_0 * ... * q_level.
    pub fn modulus(&self) -> BigInt {
        self.0
            .iter()
            .fold(BigInt::from(1), |acc, r| acc * BigInt::from(r.modulus.q))
    }

    /// Returns log2(Q) rounded up.
    pub fn log_modulus(&self) -> usize {
        self.modulus().bits() as usize
    }

    /// Maps the integers coeffs (reduced mod Q) to a, placing coeffs[j] at index j*step.
    pub fn from_bigint_inplace(&self, coeffs: &[BigInt], step: usize, a: &mut PolyRNS<u64>) {
        let level: usize = self.level();
        assert!(
            level <= a.level(),
            "invalid level: level={} > a.level()={}",
            level,
            a.level()
        );
        assert!(step >= 1, "invalid step: step=0");
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let q_big: BigInt = BigInt::from(ring.modulus.q);
            let poly: &mut [u64] = &mut a.at_mut(i).0;
            poly.iter_mut().for_each(|x| *x = 0);
            coeffs.iter().enumerate().for_each(|(j, c)| {
                poly[j * step] = c.mod_floor(&q_big).to_u64().unwrap_or(0);
            });
        });
    }

    /// Reconstructs the coefficients at indices j*step of a as integers in [-Q/2, Q/2].
    pub fn to_bigint_inplace(&self, a: &PolyRNS<u64>, step: usize, coeffs: &mut [BigInt]) {
        assert!(step >= 1 && step <= a.n(), "invalid step: step={} > a.n()={}", step, a.n());
        assert!(
            coeffs.len() <= a.n() / step,
            "invalid coeffs: coeffs.len()={} > a.n()/step={}",
            coeffs.len(),
            a.n() / step
        );
        assert!(
            self.level() <= a.level(),
            "invalid level: self.level()={} > a.level()={}",
            self.level(),
            a.level()
        );

        let q_big: BigInt = self.modulus();
        let q_big_half: BigInt = &q_big >> 1;

        let inv_crt: Vec<BigInt> = self
            .0
            .iter()
            .map(|ring| {
                let qi_big: BigInt = BigInt::from(ring.modulus.q);
                let q_hat: BigInt = &q_big / &qi_big;
                let q_hat_inv: BigInt = BigInt::from(
                    ring.modulus
                        .inv((&q_hat % &qi_big).to_u64().unwrap_or(0)),
                );
                q_hat * q_hat_inv
            })
            .collect();

        coeffs.iter_mut().enumerate().for_each(|(j, c)| {
            let idx: usize = j * step;
            let mut acc: BigInt = BigInt::zero();
            inv_crt.iter().enumerate().for_each(|(k, crt)| {
                acc += crt * a.at(k).0[idx];
            });
            acc %= &q_big;
            if acc > q_big_half {
                acc -= &q_big;
            }
            *c = acc;
        });
    }

    /// Maps signed 128-bit coefficients to a.
    pub fn from_signed_inplace(&self, coeffs: &[i128], a: &mut PolyRNS<u64>) {
        assert!(
            coeffs.len() <= a.n(),
            "invalid coeffs: coeffs.len()={} > a.n()={}",
            coeffs.len(),
            a.n()
        );
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let poly: &mut [u64] = &mut a.at_mut(i).0;
            poly.iter_mut().for_each(|x| *x = 0);
            coeffs
                .iter()
                .zip(poly.iter_mut())
                .for_each(|(c, x)| *x = ring.modulus.reduce_i128(*c));
        });
    }

    /// Copies a polynomial given modulo a single prime q (centered in (-q/2, q/2]) to every residue of b.
    pub fn from_centered_poly(&self, q: u64, a: &[u64], b: &mut PolyRNS<u64>) {
        let q_half: u64 = q >> 1;
        self.0.iter().enumerate().for_each(|(i, ring)| {
            b.at_mut(i)
                .0
                .iter_mut()
                .zip(a.iter())
                .for_each(|(b, &a)| {
                    *b = if a > q_half {
                        ring.modulus.reduce_signed(-((q - a) as i64))
                    } else {
                        ring.modulus.reduce(a)
                    }
                });
        });
    }
}

impl RingRNS<u64> {
    pub fn ntt_inplace<const LAZY: bool>(&self, a: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.ntt_inplace::<LAZY>(a.at_mut(i)));
    }

    pub fn intt_inplace<const LAZY: bool>(&self, a: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.intt_inplace::<LAZY>(a.at_mut(i)));
    }

    pub fn ntt<const LAZY: bool>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.ntt::<LAZY>(a.at(i), b.at_mut(i)));
    }

    pub fn intt<const LAZY: bool>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.intt::<LAZY>(a.at(i), b.at_mut(i)));
    }
}

impl RingRNS<u64> {
    #[inline(always)]
    pub fn a_add_b_into_b<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_add_b_into_b::<REDUCE>(a.at(i), b.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_add_b_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_add_b_into_c::<REDUCE>(a.at(i), b.at(i), c.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_sub_b_into_a<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &PolyRNS<u64>,
        a: &mut PolyRNS<u64>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_sub_b_into_a::<BRANGE, REDUCE>(b.at(i), a.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_sub_b_into_c<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.a_sub_b_into_c::<BRANGE, REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    #[inline(always)]
    pub fn a_neg_into_a<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_neg_into_a::<ARANGE, REDUCE>(a.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_prepare_montgomery_into_a<const REDUCE: REDUCEMOD>(
        &self,
        a: &mut PolyRNS<Montgomery<u64>>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_prepare_montgomery_into_a::<REDUCE>(a.at_mut(i)));
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &PolyRNS<Montgomery<u64>>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.a_mul_b_montgomery_into_c::<REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_add_c_into_c<const REDUCE1: REDUCEMOD, const REDUCE2: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &PolyRNS<Montgomery<u64>>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.a_mul_b_montgomery_add_c_into_c::<REDUCE1, REDUCE2>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_into_a<const REDUCE: REDUCEMOD>(
        &self,
        b: &PolyRNS<Montgomery<u64>>,
        a: &mut PolyRNS<u64>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_mul_b_montgomery_into_a::<REDUCE>(b.at(i), a.at_mut(i)));
    }

    /// a <- a * b for a scalar b given as an integer (reduced modulo each prime).
    #[inline(always)]
    pub fn a_mul_b_scalar_into_a<const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_mul_b_scalar_into_a::<REDUCE>(b, a.at_mut(i)));
    }

    /// a <- a * b for a scalar b given by its residues b[i] mod q_i.
    #[inline(always)]
    pub fn a_mul_b_scalar_rns_into_a<const REDUCE: REDUCEMOD>(
        &self,
        b: &[u64],
        a: &mut PolyRNS<u64>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.len() > self.level(), "b.len()={} <= self.level()={}", b.len(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.a_mul_b_scalar_into_a::<REDUCE>(&b[i], a.at_mut(i)));
    }

    /// Returns the residues of the integer b modulo each prime.
    pub fn bigint_to_rns(&self, b: &BigInt) -> Vec<u64> {
        self.0
            .iter()
            .map(|ring| {
                b.mod_floor(&BigInt::from(ring.modulus.q))
                    .to_u64()
                    .unwrap_or(0)
            })
            .collect()
    }
}
