use num::complex::Complex64;
use std::f64::consts::PI;

/// Canonical embedding of R[X]/(X^N+1) into C^(N/2). Slot j holds the
/// evaluation at zeta^(5^j) for zeta = exp(i*pi/N), so that X -> X^5
/// rotates the slots left by one. Real inputs give real polynomials.
pub struct CanonicalEncoder {
    n: usize,
    rot_group: Vec<usize>,
    ksi_pows: Vec<Complex64>,
}

impl CanonicalEncoder {
    pub fn new(n: usize) -> Self {
        assert!(n.is_power_of_two() && n >= 4, "invalid n={}", n);
        let m: usize = n << 1;
        let half: usize = n >> 1;

        let mut rot_group: Vec<usize> = Vec::with_capacity(half);
        let mut pos: usize = 1;
        (0..half).for_each(|_| {
            rot_group.push(pos);
            pos = (pos * 5) & (m - 1);
        });

        let ksi_pows: Vec<Complex64> = (0..=m)
            .map(|k| {
                let angle: f64 = 2.0 * PI * k as f64 / m as f64;
                Complex64::new(angle.cos(), angle.sin())
            })
            .collect();

        Self {
            n,
            rot_group,
            ksi_pows,
        }
    }

    pub fn slots(&self) -> usize {
        self.n >> 1
    }

    /// Returns the N real coefficients m with m(zeta^(5^j)) = values[j],
    /// missing values being zero.
    pub fn embed_inv(&self, values: &[f64]) -> Vec<f64> {
        debug_assert!(values.len() <= self.slots(), "values.len()={} > slots={}", values.len(), self.slots());
        let half: usize = self.slots();
        let mut vals: Vec<Complex64> = vec![Complex64::new(0.0, 0.0); half];
        vals.iter_mut()
            .zip(values.iter())
            .for_each(|(z, v)| *z = Complex64::new(*v, 0.0));

        self.fft_special_inv(&mut vals);

        let mut coeffs: Vec<f64> = vec![0.0; self.n];
        vals.iter().enumerate().for_each(|(i, z)| {
            coeffs[i] = z.re;
            coeffs[half + i] = z.im;
        });
        coeffs
    }

    /// Returns the real parts of the slots of the polynomial with the given
    /// N coefficients.
    pub fn embed(&self, coeffs: &[f64]) -> Vec<f64> {
        debug_assert!(coeffs.len() == self.n, "coeffs.len()={} != n={}", coeffs.len(), self.n);
        let half: usize = self.slots();
        let mut vals: Vec<Complex64> = (0..half)
            .map(|i| Complex64::new(coeffs[i], coeffs[half + i]))
            .collect();
        self.fft_special(&mut vals);
        vals.iter().map(|z| z.re).collect()
    }

    /// vals[j] <- sum_i vals[i] * zeta^(5^j * i).
    fn fft_special(&self, vals: &mut [Complex64]) {
        let size: usize = vals.len();
        let m: usize = self.n << 1;
        bit_reverse(vals);
        let mut len: usize = 2;
        while len <= size {
            let lenh: usize = len >> 1;
            let lenq: usize = len << 2;
            (0..size).step_by(len).for_each(|i| {
                (0..lenh).for_each(|j| {
                    let idx: usize = (self.rot_group[j] % lenq) * (m / lenq);
                    let u: Complex64 = vals[i + j];
                    let v: Complex64 = vals[i + j + lenh] * self.ksi_pows[idx];
                    vals[i + j] = u + v;
                    vals[i + j + lenh] = u - v;
                })
            });
            len <<= 1;
        }
    }

    /// Inverse of fft_special.
    fn fft_special_inv(&self, vals: &mut [Complex64]) {
        let size: usize = vals.len();
        let m: usize = self.n << 1;
        let mut len: usize = size;
        while len >= 2 {
            let lenh: usize = len >> 1;
            let lenq: usize = len << 2;
            (0..size).step_by(len).for_each(|i| {
                (0..lenh).for_each(|j| {
                    let idx: usize = (lenq - (self.rot_group[j] % lenq)) * (m / lenq);
                    let u: Complex64 = vals[i + j] + vals[i + j + lenh];
                    let v: Complex64 = (vals[i + j] - vals[i + j + lenh]) * self.ksi_pows[idx];
                    vals[i + j] = u;
                    vals[i + j + lenh] = v;
                })
            });
            len >>= 1;
        }
        bit_reverse(vals);
        let size_inv: f64 = 1.0 / size as f64;
        vals.iter_mut().for_each(|z| *z *= size_inv);
    }
}

fn bit_reverse(vals: &mut [Complex64]) {
    let size: usize = vals.len();
    let mut j: usize = 0;
    (1..size).for_each(|i| {
        let mut bit: usize = size >> 1;
        while j >= bit {
            j -= bit;
            bit >>= 1;
        }
        j += bit;
        if i < j {
            vals.swap(i, j);
        }
    });
}
