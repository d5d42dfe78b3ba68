use crate::ciphertext::Ciphertext;
use crate::error::{Error, Result};
use rns::modulus::ONCE;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;

/// Returns the degree-2 product (a0*b0, a0*b1 + a1*b0, a1*b1) of two
/// degree-1 ciphertexts over ring, in the coefficient domain. The product
/// is reduced modulo the ring's modulus.
pub fn tensor(ring: &RingRNS<u64>, a: &[PolyRNS<u64>], b: &[PolyRNS<u64>]) -> [PolyRNS<u64>; 3] {
    debug_assert!(a.len() == 2 && b.len() == 2, "tensor expects degree 1 ciphertexts");

    let to_ntt = |p: &PolyRNS<u64>| {
        let mut out: PolyRNS<u64> = ring.new_polyrns();
        ring.ntt::<false>(p, &mut out);
        out
    };

    let a0: PolyRNS<u64> = to_ntt(&a[0]);
    let a1: PolyRNS<u64> = to_ntt(&a[1]);
    let mut b0: PolyRNS<u64> = to_ntt(&b[0]);
    let mut b1: PolyRNS<u64> = to_ntt(&b[1]);
    ring.a_prepare_montgomery_into_a::<ONCE>(&mut b0);
    ring.a_prepare_montgomery_into_a::<ONCE>(&mut b1);

    let mut d0: PolyRNS<u64> = ring.new_polyrns();
    let mut d1: PolyRNS<u64> = ring.new_polyrns();
    let mut d2: PolyRNS<u64> = ring.new_polyrns();
    ring.a_mul_b_montgomery_into_c::<ONCE>(&a0, &b0, &mut d0);
    ring.a_mul_b_montgomery_into_c::<ONCE>(&a0, &b1, &mut d1);
    ring.a_mul_b_montgomery_add_c_into_c::<ONCE, ONCE>(&a1, &b0, &mut d1);
    ring.a_mul_b_montgomery_into_c::<ONCE>(&a1, &b1, &mut d2);

    ring.intt_inplace::<false>(&mut d0);
    ring.intt_inplace::<false>(&mut d1);
    ring.intt_inplace::<false>(&mut d2);
    [d0, d1, d2]
}

/// Returns the part-wise sum of two ciphertexts of equal level over ring.
pub fn add_parts(ring: &RingRNS<u64>, a: &[PolyRNS<u64>], b: &[PolyRNS<u64>]) -> Vec<PolyRNS<u64>> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    long.iter()
        .enumerate()
        .map(|(i, p)| {
            let mut out: PolyRNS<u64> = p.clone();
            if let Some(q) = short.get(i) {
                ring.a_add_b_into_b::<ONCE>(q, &mut out);
            }
            out
        })
        .collect()
}

/// Checks that two operands can be combined slot-wise.
pub fn check_binary(what: &'static str, a: &Ciphertext, b: &Ciphertext) -> Result<()> {
    if a.len != b.len {
        return Err(Error::shape(what, a.len, b.len));
    }
    if a.level() != b.level() {
        return Err(Error::precision(format!(
            "{}: operands at levels {} and {}, align them first",
            what,
            a.level(),
            b.level()
        )));
    }
    Ok(())
}

/// Checks that a ciphertext went through relinearization.
pub fn check_degree_one(what: &'static str, a: &Ciphertext) -> Result<()> {
    if a.degree() != 1 {
        return Err(Error::precision(format!(
            "{}: expected a relinearized ciphertext, found degree {}",
            what,
            a.degree()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampling::source::Source;

    #[test]
    fn tensor_of_plain_polynomials() {
        // (a0 + a1 s)(b0 + b1 s) at s = 1 equals the product of the sums
        let ring: RingRNS<u64> = RingRNS::new(16, &[0x1fffffffffe00001, 0x1fffffffffc80001]);
        let mut source: Source = Source::new([0u8; 32]);
        let mut parts: Vec<PolyRNS<u64>> = (0..4).map(|_| ring.new_polyrns()).collect();
        parts.iter_mut().for_each(|p| ring.fill_uniform(&mut source, p));

        let [d0, d1, d2] = tensor(&ring, &parts[0..2], &parts[2..4]);
        let lhs: Vec<PolyRNS<u64>> = add_parts(&ring, &add_parts(&ring, &[d0], &[d1]), &[d2]);

        let a: Vec<PolyRNS<u64>> = add_parts(&ring, &parts[0..1], &parts[1..2]);
        let b: Vec<PolyRNS<u64>> = add_parts(&ring, &parts[2..3], &parts[3..4]);
        let [rhs, zero, _] = tensor(
            &ring,
            &[a[0].clone(), ring.new_polyrns()],
            &[b[0].clone(), ring.new_polyrns()],
        );

        assert_eq!(lhs[0], rhs);
        assert_eq!(zero, ring.new_polyrns());
    }
}
