use crate::context::Context;
use crate::error::Result;
use crate::keys::{EvaluationKeys, KeyMaterial, PublicKey, SecretKey, SwitchingKey};
use rns::modulus::ONCE;
use rns::poly::{Poly, PolyRNS};
use rns::ring::RingRNS;
use rns::ring::impl_u64::automorphism::galois_element;
use sampling::source::Source;
use tracing::debug;
use utils::map::Map;

impl Context {
    /// Samples a ternary secret over the key ring Q*P.
    pub fn gen_secret_key(&self, source: &mut Source) -> SecretKey {
        let ring: &RingRNS<u64> = &self.key_ring;
        let mut coeffs: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_ternary(source, &mut coeffs);
        let mut ntt: PolyRNS<u64> = ring.new_polyrns();
        ring.ntt::<false>(&coeffs, &mut ntt);
        ring.a_prepare_montgomery_into_a::<ONCE>(&mut ntt);
        SecretKey { coeffs, ntt }
    }

    pub fn gen_public_key(&self, sk: &SecretKey, source: &mut Source) -> Result<PublicKey> {
        let mut xa_source: Source = source.branch();
        let mut xe_source: Source = source.branch();
        let (mut b, mut a) =
            self.gen_encryption_of_zero(&self.ring, sk, &mut xa_source, &mut xe_source)?;
        self.ring.a_prepare_montgomery_into_a::<ONCE>(&mut b);
        self.ring.a_prepare_montgomery_into_a::<ONCE>(&mut a);
        Ok(PublicKey { b, a })
    }

    /// Returns (b, a) over ring with b = -a*s + e, both in the NTT domain.
    fn gen_encryption_of_zero(
        &self,
        ring: &RingRNS<u64>,
        sk: &SecretKey,
        xa_source: &mut Source,
        xe_source: &mut Source,
    ) -> Result<(PolyRNS<u64>, PolyRNS<u64>)> {
        // uniform in the coefficient domain is uniform in the NTT domain
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_uniform(xa_source, &mut a);

        let mut b: PolyRNS<u64> = ring.new_polyrns();
        self.fill_error(ring, xe_source, &mut b)?;
        ring.ntt_inplace::<false>(&mut b);

        let mut a_s: PolyRNS<u64> = ring.new_polyrns();
        ring.a_mul_b_montgomery_into_c::<ONCE>(&a, &sk.ntt, &mut a_s);
        ring.a_sub_b_into_a::<1, ONCE>(&a_s, &mut b);

        Ok((b, a))
    }

    /// Returns a key switching s_from to sk. s_from is given modulo Q in the
    /// NTT domain, outside the Montgomery form. Row (i, j) encrypts
    /// P * 2^(j*base_log) * s_from on prime q_i only, modulo Q*P.
    pub fn gen_switching_key(
        &self,
        s_from: &PolyRNS<u64>,
        sk: &SecretKey,
        source: &mut Source,
    ) -> Result<SwitchingKey> {
        let mut xa_source: Source = source.branch();
        let mut xe_source: Source = source.branch();
        let mut buf: Poly<u64> = self.ring.new_poly();
        let p: u64 = self.special.0[0].modulus.q;

        let rows: Vec<Vec<[PolyRNS<u64>; 2]>> = self
            .ring
            .0
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let q: u128 = r.modulus.q as u128;
                let p_mod_q: u128 = r.modulus.reduce(p) as u128;
                (0..self.digits(r.modulus.q))
                    .map(|j| {
                        let (mut b, mut a) = self.gen_encryption_of_zero(
                            &self.key_ring,
                            sk,
                            &mut xa_source,
                            &mut xe_source,
                        )?;
                        let gadget: u64 = (p_mod_q * (1u128 << (j * self.base_log)) % q) as u64;
                        r.a_mul_b_scalar_into_c::<ONCE>(s_from.at(i), &gadget, &mut buf);
                        r.a_add_b_into_b::<ONCE>(&buf, b.at_mut(i));
                        self.key_ring.a_prepare_montgomery_into_a::<ONCE>(&mut b);
                        self.key_ring.a_prepare_montgomery_into_a::<ONCE>(&mut a);
                        Ok([b, a])
                    })
                    .collect::<Result<Vec<[PolyRNS<u64>; 2]>>>()
            })
            .collect::<Result<Vec<Vec<[PolyRNS<u64>; 2]>>>>()?;

        Ok(SwitchingKey { rows })
    }

    /// Returns the key switching s^2 to s.
    pub fn gen_relinearization_key(
        &self,
        sk: &SecretKey,
        source: &mut Source,
    ) -> Result<SwitchingKey> {
        let mut s_ntt: PolyRNS<u64> = self.ring.new_polyrns();
        self.ring.ntt::<false>(&sk.coeffs, &mut s_ntt);
        let mut s2_ntt: PolyRNS<u64> = self.ring.new_polyrns();
        self.ring
            .a_mul_b_montgomery_into_c::<ONCE>(&s_ntt, &sk.ntt, &mut s2_ntt);
        self.gen_switching_key(&s2_ntt, sk, source)
    }

    /// Returns the key switching s(X^gal_el) to s.
    pub fn gen_galois_key(
        &self,
        sk: &SecretKey,
        gal_el: usize,
        source: &mut Source,
    ) -> Result<SwitchingKey> {
        let mut s_gal: PolyRNS<u64> = self.ring.new_polyrns();
        self.ring
            .a_apply_automorphism_into_b(&sk.coeffs, gal_el, &mut s_gal);
        self.ring.ntt_inplace::<false>(&mut s_gal);
        self.gen_switching_key(&s_gal, sk, source)
    }

    /// Generates the secret, public, relinearization and galois keys for
    /// the given rotation steps of the group generated by generator.
    pub fn gen_key_material(
        &self,
        generator: usize,
        rotations: &[i64],
        source: &mut Source,
    ) -> Result<KeyMaterial> {
        let sk: SecretKey = self.gen_secret_key(&mut source.branch());
        let public: PublicKey = self.gen_public_key(&sk, &mut source.branch())?;
        let relinearization: SwitchingKey =
            self.gen_relinearization_key(&sk, &mut source.branch())?;

        let mut galois: Map<usize, SwitchingKey> = Map::new();
        for steps in rotations {
            let gal_el: usize = galois_element(generator, *steps, self.n());
            if gal_el == 1 || galois.contains_key(&gal_el) {
                continue;
            }
            galois.insert(gal_el, self.gen_galois_key(&sk, gal_el, &mut source.branch())?);
            debug!(steps, gal_el, "generated galois key");
        }

        Ok(KeyMaterial::new(
            public,
            sk,
            EvaluationKeys {
                relinearization,
                galois,
            },
        ))
    }
}
