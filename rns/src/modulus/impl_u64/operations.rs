use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::{BARRETT, NONE, REDUCEMOD};
use crate::modulus::{ScalarOperations, VectorOperations};
use itertools::izip;

impl ScalarOperations<u64> for Prime<u64> {
    #[inline(always)]
    fn sa_reduce_into_sa<const REDUCE: REDUCEMOD>(&self, a: &mut u64) {
        self.montgomery.reduce_assign::<REDUCE>(a);
    }

    #[inline(always)]
    fn sa_add_sb_into_sc<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &u64, c: &mut u64) {
        *c = a + b;
        self.sa_reduce_into_sa::<REDUCE>(c);
    }

    #[inline(always)]
    fn sa_add_sb_into_sb<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &mut u64) {
        *b += a;
        self.sa_reduce_into_sa::<REDUCE>(b);
    }

    #[inline(always)]
    fn sa_sub_sb_into_sc<const SBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &u64,
        c: &mut u64,
    ) {
        *c = a + (SBRANGE as u64) * self.q - b;
        self.sa_reduce_into_sa::<REDUCE>(c);
    }

    #[inline(always)]
    fn sa_sub_sb_into_sa<const SBRANGE: u8, const REDUCE: REDUCEMOD>(&self, b: &u64, a: &mut u64) {
        *a += (SBRANGE as u64) * self.q - b;
        self.sa_reduce_into_sa::<REDUCE>(a);
    }

    #[inline(always)]
    fn sa_neg_into_sa<const SARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut u64) {
        *a = (SARANGE as u64) * self.q - *a;
        self.sa_reduce_into_sa::<REDUCE>(a);
    }

    #[inline(always)]
    fn sa_prepare_montgomery_into_sa<const REDUCE: REDUCEMOD>(&self, a: &mut Montgomery<u64>) {
        let x: u64 = *a;
        self.montgomery.prepare_assign::<REDUCE>(x, a);
    }

    #[inline(always)]
    fn sa_mul_sb_montgomery_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &Montgomery<u64>,
        c: &mut u64,
    ) {
        *c = self.montgomery.mul_external::<REDUCE>(*b, *a);
    }

    #[inline(always)]
    fn sa_mul_sb_montgomery_add_sc_into_sc<const REDUCE1: REDUCEMOD, const REDUCE2: REDUCEMOD>(
        &self,
        a: &u64,
        b: &Montgomery<u64>,
        c: &mut u64,
    ) {
        *c += self.montgomery.mul_external::<REDUCE1>(*b, *a);
        self.sa_reduce_into_sa::<REDUCE2>(c);
    }

    #[inline(always)]
    fn sa_mul_sb_montgomery_into_sa<const REDUCE: REDUCEMOD>(
        &self,
        b: &Montgomery<u64>,
        a: &mut u64,
    ) {
        self.montgomery.mul_external_assign::<REDUCE>(*b, a);
    }

    #[inline(always)]
    fn sa_mul_sb_barrett_into_sc<const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &Barrett<u64>,
        c: &mut u64,
    ) {
        *c = self.barrett.mul_external::<REDUCE>(b, a);
    }

    #[inline(always)]
    fn sa_mul_sb_barrett_into_sa<const REDUCE: REDUCEMOD>(&self, b: &Barrett<u64>, a: &mut u64) {
        self.barrett.mul_external_assign::<REDUCE>(b, a);
    }

    #[inline(always)]
    fn sa_sub_sb_mul_sc_barrett_into_sa<const SBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &u64,
        c: &Barrett<u64>,
        a: &mut u64,
    ) {
        self.sa_sub_sb_into_sa::<SBRANGE, NONE>(b, a);
        self.barrett.mul_external_assign::<REDUCE>(c, a);
    }
}

impl VectorOperations<u64> for Prime<u64> {
    #[inline(always)]
    fn va_reduce_into_va<const REDUCE: REDUCEMOD>(&self, va: &mut [u64]) {
        va.iter_mut()
            .for_each(|a| self.sa_reduce_into_sa::<REDUCE>(a));
    }

    #[inline(always)]
    fn va_add_vb_into_vc<const REDUCE: REDUCEMOD>(&self, va: &[u64], vb: &[u64], vc: &mut [u64]) {
        izip!(va, vb, vc).for_each(|(a, b, c)| self.sa_add_sb_into_sc::<REDUCE>(a, b, c));
    }

    #[inline(always)]
    fn va_add_vb_into_vb<const REDUCE: REDUCEMOD>(&self, va: &[u64], vb: &mut [u64]) {
        izip!(va, vb).for_each(|(a, b)| self.sa_add_sb_into_sb::<REDUCE>(a, b));
    }

    #[inline(always)]
    fn va_add_sb_into_va<const REDUCE: REDUCEMOD>(&self, sb: &u64, va: &mut [u64]) {
        va.iter_mut()
            .for_each(|a| self.sa_add_sb_into_sb::<REDUCE>(sb, a));
    }

    #[inline(always)]
    fn va_sub_vb_into_vc<const VBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        va: &[u64],
        vb: &[u64],
        vc: &mut [u64],
    ) {
        izip!(va, vb, vc).for_each(|(a, b, c)| self.sa_sub_sb_into_sc::<VBRANGE, REDUCE>(a, b, c));
    }

    #[inline(always)]
    fn va_sub_vb_into_va<const VBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        vb: &[u64],
        va: &mut [u64],
    ) {
        izip!(vb, va).for_each(|(b, a)| self.sa_sub_sb_into_sa::<VBRANGE, REDUCE>(b, a));
    }

    #[inline(always)]
    fn va_neg_into_va<const VARANGE: u8, const REDUCE: REDUCEMOD>(&self, va: &mut [u64]) {
        va.iter_mut()
            .for_each(|a| self.sa_neg_into_sa::<VARANGE, REDUCE>(a));
    }

    #[inline(always)]
    fn va_prepare_montgomery_into_va<const REDUCE: REDUCEMOD>(
        &self,
        va: &mut [Montgomery<u64>],
    ) {
        va.iter_mut()
            .for_each(|a| self.sa_prepare_montgomery_into_sa::<REDUCE>(a));
    }

    #[inline(always)]
    fn va_mul_vb_montgomery_into_vc<const REDUCE: REDUCEMOD>(
        &self,
        va: &[u64],
        vb: &[Montgomery<u64>],
        vc: &mut [u64],
    ) {
        izip!(va, vb, vc).for_each(|(a, b, c)| self.sa_mul_sb_montgomery_into_sc::<REDUCE>(a, b, c));
    }

    #[inline(always)]
    fn va_mul_vb_montgomery_add_vc_into_vc<const REDUCE1: REDUCEMOD, const REDUCE2: REDUCEMOD>(
        &self,
        va: &[u64],
        vb: &[Montgomery<u64>],
        vc: &mut [u64],
    ) {
        izip!(va, vb, vc).for_each(|(a, b, c)| {
            self.sa_mul_sb_montgomery_add_sc_into_sc::<REDUCE1, REDUCE2>(a, b, c)
        });
    }

    #[inline(always)]
    fn va_mul_vb_montgomery_into_va<const REDUCE: REDUCEMOD>(
        &self,
        vb: &[Montgomery<u64>],
        va: &mut [u64],
    ) {
        izip!(vb, va).for_each(|(b, a)| self.sa_mul_sb_montgomery_into_sa::<REDUCE>(b, a));
    }

    #[inline(always)]
    fn va_mul_sb_barrett_into_vc<const REDUCE: REDUCEMOD>(
        &self,
        va: &[u64],
        sb: &Barrett<u64>,
        vc: &mut [u64],
    ) {
        izip!(va, vc).for_each(|(a, c)| self.sa_mul_sb_barrett_into_sc::<REDUCE>(a, sb, c));
    }

    #[inline(always)]
    fn va_mul_sb_barrett_into_va<const REDUCE: REDUCEMOD>(&self, sb: &Barrett<u64>, va: &mut [u64]) {
        va.iter_mut()
            .for_each(|a| self.sa_mul_sb_barrett_into_sa::<REDUCE>(sb, a));
    }

    #[inline(always)]
    fn va_sub_vb_mul_sc_barrett_into_va<const VBRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        vb: &[u64],
        sc: &Barrett<u64>,
        va: &mut [u64],
    ) {
        izip!(vb, va).for_each(|(b, a)| {
            self.sa_sub_sb_mul_sc_barrett_into_sa::<VBRANGE, REDUCE>(b, sc, a)
        });
    }
}

impl Prime<u64> {
    /// Returns a mod q for an arbitrary u64 a.
    #[inline(always)]
    pub fn reduce(&self, a: u64) -> u64 {
        self.barrett.reduce::<BARRETT>(&a)
    }

    /// Returns a mod q for a signed a.
    #[inline(always)]
    pub fn reduce_signed(&self, a: i64) -> u64 {
        let r: u64 = self.reduce(a.unsigned_abs());
        if a < 0 && r != 0 { self.q - r } else { r }
    }

    /// Returns a mod q for a signed 128-bit a.
    #[inline(always)]
    pub fn reduce_i128(&self, a: i128) -> u64 {
        a.rem_euclid(self.q as i128) as u64
    }
}
