use crate::error::{Error, Result};
use rns::modulus::WordOps;
use rns::poly::Poly;
use rns::ring::Ring;

/// Packs integers modulo t into the evaluations of a plaintext polynomial
/// of Z_t[X]/(X^N+1). The N slots form a 2 x N/2 matrix: slot c of the
/// first row is the evaluation at psi^(3^c), slot c of the second row the
/// evaluation at psi^(-3^c), so that X -> X^3 rotates both rows by one.
pub struct BatchEncoder {
    ring: Ring<u64>,
    index_map: Vec<usize>,
    batching: bool,
}

impl BatchEncoder {
    pub fn new(n: usize, t: u64, batching: bool) -> Self {
        let ring: Ring<u64> = Ring::new(n, t);
        let log_n: u32 = n.log2() as u32;
        let m: usize = n << 1;
        let half: usize = n >> 1;

        // the NTT stores the evaluation at psi^e at index brv((e-1)/2)
        let ntt_index = |e: usize| ((e - 1) >> 1).reverse_bits_msb(log_n);

        let mut index_map: Vec<usize> = vec![0; n];
        let mut pos: usize = 1;
        (0..half).for_each(|c| {
            index_map[c] = ntt_index(pos);
            index_map[half + c] = ntt_index(m - pos);
            pos = (pos * 3) & (m - 1);
        });

        Self {
            ring,
            index_map,
            batching,
        }
    }

    pub fn slot_count(&self) -> usize {
        if self.batching { self.ring.n() } else { 1 }
    }

    pub fn plain_modulus(&self) -> u64 {
        self.ring.q()
    }

    pub fn ring(&self) -> &Ring<u64> {
        &self.ring
    }

    /// Returns the plaintext polynomial of values, reduced modulo t. Unused
    /// slots are zero.
    pub fn encode(&self, values: &[u64]) -> Result<Poly<u64>> {
        if values.len() > self.slot_count() {
            return Err(Error::shape("encode", self.slot_count(), values.len()));
        }
        let modulus = &self.ring.modulus;
        let mut poly: Poly<u64> = self.ring.new_poly();
        if !self.batching {
            if let Some(v) = values.first() {
                poly.0[0] = modulus.reduce(*v);
            }
            return Ok(poly);
        }
        values
            .iter()
            .zip(self.index_map.iter())
            .for_each(|(v, idx)| poly.0[*idx] = modulus.reduce(*v));
        self.ring.intt_inplace::<false>(&mut poly);
        Ok(poly)
    }

    /// Returns the first len slots of poly.
    pub fn decode(&self, poly: &Poly<u64>, len: usize) -> Result<Vec<u64>> {
        if len > self.slot_count() {
            return Err(Error::shape("decode", self.slot_count(), len));
        }
        if !self.batching {
            return Ok(poly.0.iter().take(len).copied().collect());
        }
        let mut evaluations: Poly<u64> = self.ring.new_poly();
        self.ring.ntt::<false>(poly, &mut evaluations);
        Ok(self.index_map[..len]
            .iter()
            .map(|idx| evaluations.0[*idx])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rns::modulus::ONCE;
    use rns::ring::impl_u64::automorphism::galois_element;

    const N: usize = 32;
    const T: u64 = 65537;

    #[test]
    fn round_trip_and_reduction() {
        let encoder: BatchEncoder = BatchEncoder::new(N, T, true);
        let values: Vec<u64> = (0..20).map(|i| i * 1000 + 7).chain([T + 5]).collect();
        let poly: Poly<u64> = encoder.encode(&values).expect("encode");
        let decoded: Vec<u64> = encoder.decode(&poly, values.len()).expect("decode");
        let expected: Vec<u64> = values.iter().map(|v| v % T).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn products_are_slot_wise() {
        let encoder: BatchEncoder = BatchEncoder::new(N, T, true);
        let ring: &Ring<u64> = encoder.ring();
        let a: Vec<u64> = (0..N as u64).map(|i| i + 1).collect();
        let b: Vec<u64> = (0..N as u64).map(|i| 3 * i + 2).collect();
        let pa: Poly<u64> = encoder.encode(&a).expect("encode");
        let pb: Poly<u64> = encoder.encode(&b).expect("encode");

        let mut pa_ntt: Poly<u64> = ring.new_poly();
        let mut pb_ntt: Poly<u64> = ring.new_poly();
        ring.ntt::<false>(&pa, &mut pa_ntt);
        ring.ntt::<false>(&pb, &mut pb_ntt);
        ring.a_prepare_montgomery_into_a::<ONCE>(&mut pb_ntt);
        let mut pc: Poly<u64> = ring.new_poly();
        ring.a_mul_b_montgomery_into_c::<ONCE>(&pa_ntt, &pb_ntt, &mut pc);
        ring.intt_inplace::<false>(&mut pc);

        let decoded: Vec<u64> = encoder.decode(&pc, N).expect("decode");
        let expected: Vec<u64> = a.iter().zip(b.iter()).map(|(x, y)| x * y % T).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn automorphism_rotates_rows() {
        let encoder: BatchEncoder = BatchEncoder::new(N, T, true);
        let values: Vec<u64> = (0..N as u64).collect();
        let poly: Poly<u64> = encoder.encode(&values).expect("encode");

        let steps: usize = 3;
        let mut rotated: Poly<u64> = encoder.ring().new_poly();
        encoder.ring().a_apply_automorphism_into_b(
            &poly,
            galois_element(3, steps as i64, N),
            &mut rotated,
        );
        let decoded: Vec<u64> = encoder.decode(&rotated, N).expect("decode");

        let half: usize = N / 2;
        (0..N).for_each(|slot| {
            let (row, col) = (slot / half, slot % half);
            assert_eq!(decoded[slot], values[row * half + (col + steps) % half]);
        });
    }

    #[test]
    fn scalar_encoding() {
        let encoder: BatchEncoder = BatchEncoder::new(N, T, false);
        assert_eq!(encoder.slot_count(), 1);
        let poly: Poly<u64> = encoder.encode(&[42]).expect("encode");
        assert_eq!(poly.0[0], 42);
        assert!(poly.0[1..].iter().all(|x| *x == 0));
        assert_eq!(encoder.decode(&poly, 1).expect("decode"), vec![42]);
        assert!(matches!(
            encoder.encode(&[1, 2]),
            Err(Error::Shape {
                expected: 1,
                found: 2,
                ..
            })
        ));
    }
}
