use crate::context::Context;
use crate::keys::SwitchingKey;
use rns::modulus::ONCE;
use rns::poly::{Poly, PolyRNS};
use rns::ring::RingRNS;

impl Context {
    /// Returns (k0, k1) with k0 + k1*s_to = d*s_from + e for the key
    /// switching s_from to s_to. d is in the coefficient domain at any level
    /// up to the key's; the output is at the same level. The products are
    /// accumulated modulo q_0..q_l*P and divided by P, which leaves e at the
    /// size of the rounding error.
    pub fn switch_key(&self, d: &PolyRNS<u64>, key: &SwitchingKey) -> [PolyRNS<u64>; 2] {
        let level: usize = d.level();
        let special: usize = self.max_level() + 1;
        let ring_lp: RingRNS<u64> = self.ring.at_level(level).extend(&self.special);

        let mut acc0: PolyRNS<u64> = ring_lp.new_polyrns();
        let mut acc1: PolyRNS<u64> = ring_lp.new_polyrns();
        let mut digit: Poly<u64> = ring_lp.new_poly();
        let mut digit_ntt: Poly<u64> = ring_lp.new_poly();

        self.ring.0[..=level].iter().enumerate().for_each(|(i, r_i)| {
            key.rows[i].iter().enumerate().for_each(|(j, [b, a])| {
                r_i.a_ith_digit_unsigned_base_scalar_b_into_c(
                    j,
                    d.at(i),
                    &self.base_log,
                    &mut digit,
                );
                // digits are below every prime, so they lift as is
                ring_lp.0.iter().enumerate().for_each(|(k, r_k)| {
                    let key_k: usize = if k <= level { k } else { special };
                    r_k.ntt::<false>(&digit, &mut digit_ntt);
                    r_k.a_mul_b_montgomery_add_c_into_c::<ONCE, ONCE>(
                        &digit_ntt,
                        b.at(key_k),
                        acc0.at_mut(k),
                    );
                    r_k.a_mul_b_montgomery_add_c_into_c::<ONCE, ONCE>(
                        &digit_ntt,
                        a.at(key_k),
                        acc1.at_mut(k),
                    );
                });
            });
        });

        ring_lp.intt_inplace::<false>(&mut acc0);
        ring_lp.intt_inplace::<false>(&mut acc1);
        self.div_by_special(&ring_lp, &mut acc0);
        self.div_by_special(&ring_lp, &mut acc1);
        [acc0, acc1]
    }

    /// Folds the s^2 term of a degree-2 ciphertext back onto (c0, c1).
    pub fn relinearize(&self, parts: [PolyRNS<u64>; 3], rlk: &SwitchingKey) -> Vec<PolyRNS<u64>> {
        let [mut c0, mut c1, c2] = parts;
        let ring: RingRNS<u64> = self.ring.at_level(c0.level());
        let [k0, k1] = self.switch_key(&c2, rlk);
        ring.a_add_b_into_b::<ONCE>(&k0, &mut c0);
        ring.a_add_b_into_b::<ONCE>(&k1, &mut c1);
        vec![c0, c1]
    }

    /// Applies X -> X^gal_el to (c0, c1) and switches the result back to s.
    pub fn apply_galois(
        &self,
        parts: &[PolyRNS<u64>],
        gal_el: usize,
        key: &SwitchingKey,
    ) -> Vec<PolyRNS<u64>> {
        debug_assert!(parts.len() == 2, "galois on a degree {} ciphertext", parts.len() - 1);
        let ring: RingRNS<u64> = self.ring.at_level(parts[0].level());

        let mut c0: PolyRNS<u64> = ring.new_polyrns();
        let mut c1: PolyRNS<u64> = ring.new_polyrns();
        ring.a_apply_automorphism_into_b(&parts[0], gal_el, &mut c0);
        ring.a_apply_automorphism_into_b(&parts[1], gal_el, &mut c1);

        let [k0, k1] = self.switch_key(&c1, key);
        ring.a_add_b_into_b::<ONCE>(&k0, &mut c0);
        vec![c0, k1]
    }
}
