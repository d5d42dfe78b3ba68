use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use rand_distr::{Distribution, Normal, NormalError};
use sampling::source::Source;

/// Rounds a sample to the nearest integer and maps it to [0, q).
#[inline(always)]
fn signed_to_mod(x: f64, q: u64) -> u64 {
    let r: i64 = x.round() as i64;
    if r < 0 {
        q - (r.unsigned_abs() % q)
    } else {
        r as u64 % q
    }
}

#[inline(always)]
fn sample_bounded<T: Distribution<f64>>(source: &mut Source, dist: &T, bound: f64) -> f64 {
    let mut x: f64 = dist.sample(source);
    while x.abs() > bound {
        x = dist.sample(source)
    }
    x
}

#[inline(always)]
fn sample_ternary(source: &mut Source) -> i64 {
    source.next_u64n(3, 0x3) as i64 - 1
}

impl Ring<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut Poly<u64>) {
        let max: u64 = self.modulus.q;
        let mask: u64 = max.mask();
        a.0.iter_mut()
            .for_each(|a| *a = source.next_u64n(max, mask));
    }

    pub fn fill_dist_f64<T: Distribution<f64>>(
        &self,
        source: &mut Source,
        dist: T,
        bound: f64,
        a: &mut Poly<u64>,
    ) {
        let q: u64 = self.modulus.q;
        a.0.iter_mut()
            .for_each(|a| *a = signed_to_mod(sample_bounded(source, &dist, bound), q));
    }

    pub fn fill_normal(
        &self,
        source: &mut Source,
        sigma: f64,
        bound: f64,
        a: &mut Poly<u64>,
    ) -> Result<(), NormalError> {
        self.fill_dist_f64(source, Normal::new(0.0, sigma)?, bound, a);
        Ok(())
    }

    /// Fills a with coefficients uniform in {-1, 0, 1}.
    pub fn fill_ternary(&self, source: &mut Source, a: &mut Poly<u64>) {
        let q: u64 = self.modulus.q;
        a.0.iter_mut()
            .for_each(|a| *a = signed_to_mod(sample_ternary(source) as f64, q));
    }
}

impl RingRNS<u64> {
    /// Fills each residue independently, which is uniform modulo Q.
    pub fn fill_uniform(&self, source: &mut Source, a: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, r)| r.fill_uniform(source, a.at_mut(i)));
    }

    /// Fills a with one bounded sample per coefficient, consistent across residues.
    pub fn fill_dist_f64<T: Distribution<f64>>(
        &self,
        source: &mut Source,
        dist: T,
        bound: f64,
        a: &mut PolyRNS<u64>,
    ) {
        (0..a.n()).for_each(|j| {
            let x: f64 = sample_bounded(source, &dist, bound);
            self.0.iter().enumerate().for_each(|(i, r)| {
                a.at_mut(i).0[j] = signed_to_mod(x, r.modulus.q);
            })
        })
    }

    pub fn fill_normal(
        &self,
        source: &mut Source,
        sigma: f64,
        bound: f64,
        a: &mut PolyRNS<u64>,
    ) -> Result<(), NormalError> {
        self.fill_dist_f64(source, Normal::new(0.0, sigma)?, bound, a);
        Ok(())
    }

    /// Fills a with coefficients uniform in {-1, 0, 1}, consistent across residues.
    pub fn fill_ternary(&self, source: &mut Source, a: &mut PolyRNS<u64>) {
        (0..a.n()).for_each(|j| {
            let x: f64 = sample_ternary(source) as f64;
            self.0.iter().enumerate().for_each(|(i, r)| {
                a.at_mut(i).0[j] = signed_to_mod(x, r.modulus.q);
            })
        })
    }
}
