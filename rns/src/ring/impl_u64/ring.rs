use crate::dft::ntt::Table;
use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::{BARRETT, REDUCEMOD};
use crate::modulus::{ScalarOperations, VectorOperations};
use crate::poly::Poly;
use crate::ring::Ring;
use itertools::izip;

impl Ring<u64> {
    /// Returns Z_q[X]/(X^n+1). Panics if q is not a prime equal to 1 mod 2n.
    pub fn new(n: usize, q: u64) -> Self {
        assert!(n.is_power_of_two(), "invalid argument: n={} is not a power of two", n);
        let prime: Prime<u64> = Prime::<u64>::new(q);
        Self {
            n,
            modulus: prime.clone(),
            dft: Box::new(Table::<u64>::new(prime, (2 * n) as u64)),
        }
    }

    pub fn q(&self) -> u64 {
        self.modulus.q
    }
}

impl Ring<u64> {
    pub fn ntt_inplace<const LAZY: bool>(&self, a: &mut Poly<u64>) {
        if LAZY {
            self.dft.forward_inplace_lazy(&mut a.0)
        } else {
            self.dft.forward_inplace(&mut a.0)
        }
    }

    pub fn intt_inplace<const LAZY: bool>(&self, a: &mut Poly<u64>) {
        if LAZY {
            self.dft.backward_inplace_lazy(&mut a.0)
        } else {
            self.dft.backward_inplace(&mut a.0)
        }
    }

    pub fn ntt<const LAZY: bool>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        b.copy_from(a);
        self.ntt_inplace::<LAZY>(b);
    }

    pub fn intt<const LAZY: bool>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        b.copy_from(a);
        self.intt_inplace::<LAZY>(b);
    }
}

impl Ring<u64> {
    #[inline(always)]
    pub fn a_add_b_into_b<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_add_vb_into_vb::<REDUCE>(&a.0, &mut b.0);
    }

    #[inline(always)]
    pub fn a_add_b_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_add_vb_into_vc::<REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_add_b_scalar_into_a<const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut Poly<u64>) {
        debug_assert!(*b < self.modulus.q, "b={} >= q={}", b, self.modulus.q);
        self.modulus.va_add_sb_into_va::<REDUCE>(b, &mut a.0);
    }

    #[inline(always)]
    pub fn a_sub_b_into_a<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &Poly<u64>,
        a: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .va_sub_vb_into_va::<BRANGE, REDUCE>(&b.0, &mut a.0);
    }

    #[inline(always)]
    pub fn a_sub_b_into_c<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_sub_vb_into_vc::<BRANGE, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_neg_into_a<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.va_neg_into_va::<ARANGE, REDUCE>(&mut a.0);
    }

    #[inline(always)]
    pub fn a_prepare_montgomery_into_a<const REDUCE: REDUCEMOD>(
        &self,
        a: &mut Poly<Montgomery<u64>>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus
            .va_prepare_montgomery_into_va::<REDUCE>(&mut a.0);
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Poly<Montgomery<u64>>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_mul_vb_montgomery_into_vc::<REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_add_c_into_c<const REDUCE1: REDUCEMOD, const REDUCE2: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Poly<Montgomery<u64>>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_mul_vb_montgomery_add_vc_into_vc::<REDUCE1, REDUCE2>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn a_mul_b_montgomery_into_a<const REDUCE: REDUCEMOD>(
        &self,
        b: &Poly<Montgomery<u64>>,
        a: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .va_mul_vb_montgomery_into_va::<REDUCE>(&b.0, &mut a.0);
    }

    /// a <- a * b mod q for an arbitrary u64 scalar b.
    #[inline(always)]
    pub fn a_mul_b_scalar_into_a<const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        let b_barrett: Barrett<u64> = self.modulus.barrett.prepare(self.modulus.reduce(*b));
        self.modulus
            .va_mul_sb_barrett_into_va::<REDUCE>(&b_barrett, &mut a.0);
    }

    /// c <- a * b mod q for an arbitrary u64 scalar b.
    #[inline(always)]
    pub fn a_mul_b_scalar_into_c<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &u64,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        let b_barrett: Barrett<u64> = self.modulus.barrett.prepare(self.modulus.reduce(*b));
        self.modulus
            .va_mul_sb_barrett_into_vc::<REDUCE>(&a.0, &b_barrett, &mut c.0);
    }

    /// a <- a mod q for coefficients given modulo another (larger or smaller) modulus.
    #[inline(always)]
    pub fn a_reduce_into_a(&self, a: &mut Poly<u64>) {
        self.modulus.va_reduce_into_va::<BARRETT>(&mut a.0);
    }

    /// c <- i-th base 2^base_log digit of a.
    #[inline(always)]
    pub fn a_ith_digit_unsigned_base_scalar_b_into_c(
        &self,
        i: usize,
        a: &Poly<u64>,
        base_log: &usize,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(*base_log < 64, "invalid base_log: {} >= 64", base_log);
        let shift: usize = i * base_log;
        let mask: u64 = (1 << base_log) - 1;
        if shift >= 64 {
            c.zero();
            return;
        }
        izip!(&a.0, &mut c.0).for_each(|(a, c)| *c = (a >> shift) & mask);
    }

    /// a <- a mod q for signed integer coefficients.
    pub fn from_signed(&self, coeffs: &[i64], a: &mut Poly<u64>) {
        debug_assert!(coeffs.len() <= a.n(), "coeffs.len()={} > a.n()={}", coeffs.len(), a.n());
        a.zero();
        izip!(coeffs, &mut a.0).for_each(|(c, a)| *a = self.modulus.reduce_signed(*c));
    }

    /// Returns the coefficients of a in (-q/2, q/2].
    pub fn to_signed(&self, a: &Poly<u64>) -> Vec<i64> {
        let q: u64 = self.modulus.q;
        let q_half: u64 = q >> 1;
        a.0.iter()
            .map(|&a| if a > q_half { a as i64 - q as i64 } else { a as i64 })
            .collect()
    }
}
