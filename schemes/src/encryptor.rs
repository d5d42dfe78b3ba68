use crate::context::Context;
use crate::error::Result;
use crate::keys::PublicKey;
use rns::modulus::ONCE;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;
use sampling::source::Source;

impl Context {
    /// Returns a fresh public-key encryption of zero (c0, c1) at the top
    /// level, in the coefficient domain:
    /// c0 = b*u + e0, c1 = a*u + e1 for a ternary u.
    pub fn encrypt_zero(&self, pk: &PublicKey, source: &mut Source) -> Result<[PolyRNS<u64>; 2]> {
        let ring: &RingRNS<u64> = &self.ring;
        let mut xu_source: Source = source.branch();
        let mut xe_source: Source = source.branch();

        let mut u: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_ternary(&mut xu_source, &mut u);
        ring.ntt_inplace::<false>(&mut u);

        let mut c0: PolyRNS<u64> = ring.new_polyrns();
        let mut c1: PolyRNS<u64> = ring.new_polyrns();
        ring.a_mul_b_montgomery_into_c::<ONCE>(&u, &pk.b, &mut c0);
        ring.a_mul_b_montgomery_into_c::<ONCE>(&u, &pk.a, &mut c1);
        ring.intt_inplace::<false>(&mut c0);
        ring.intt_inplace::<false>(&mut c1);

        let mut e: PolyRNS<u64> = ring.new_polyrns();
        self.fill_error(ring, &mut xe_source, &mut e)?;
        ring.a_add_b_into_b::<ONCE>(&e, &mut c0);
        self.fill_error(ring, &mut xe_source, &mut e)?;
        ring.a_add_b_into_b::<ONCE>(&e, &mut c1);

        Ok([c0, c1])
    }
}
