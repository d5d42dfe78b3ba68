use crate::context::Context;
use crate::keys::SecretKey;
use rns::modulus::ONCE;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;

impl Context {
    /// Returns c0 + c1*s + c2*s^2 + ... in the coefficient domain, at the
    /// level of the parts.
    pub fn decrypt_parts(&self, sk: &SecretKey, parts: &[PolyRNS<u64>]) -> PolyRNS<u64> {
        debug_assert!(!parts.is_empty(), "empty ciphertext");
        let ring: RingRNS<u64> = self.ring.at_level(parts[0].level());
        let last: usize = parts.len() - 1;

        // Horner evaluation in s
        let mut acc: PolyRNS<u64> = ring.new_polyrns();
        ring.ntt::<false>(&parts[last], &mut acc);
        let mut buf: PolyRNS<u64> = ring.new_polyrns();
        parts[..last].iter().rev().for_each(|part| {
            ring.a_mul_b_montgomery_into_a::<ONCE>(&sk.ntt, &mut acc);
            ring.ntt::<false>(part, &mut buf);
            ring.a_add_b_into_b::<ONCE>(&buf, &mut acc);
        });
        ring.intt_inplace::<false>(&mut acc);
        acc
    }
}
