use crate::bfv::ROTATION_GENERATOR;
use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::encoding::batch::BatchEncoder;
use crate::error::{Error, Result};
use crate::evaluator::{add_parts, check_binary, check_degree_one, tensor};
use crate::keys::{EvaluationKeys, KeyMaterial, PublicKey, SwitchingKey};
use crate::parameters::{ParameterSet, Parameters};
use crate::plaintext::Plaintext;
use crate::{Capabilities, Scheme, SchemeKind};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use rns::modulus::ONCE;
use rns::poly::{Poly, PolyRNS};
use rns::ring::RingRNS;
use rns::ring::impl_u64::automorphism::galois_element;
use sampling::source::Source;
use std::fmt;
use tracing::{debug, instrument, trace};

/// Batched integer arithmetic modulo t with the message in the low bits:
/// c0 + c1*s = m + t*e. Every error term is a multiple of t and every
/// ciphertext prime is 1 mod t, so dropping a prime after a multiplication
/// keeps m intact while dividing the noise.
pub struct Bgv {
    params: ParameterSet,
    context: Context,
    encoder: BatchEncoder,
    t: u64,
}

impl Bgv {
    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// Switches ct down to level, one prime at a time.
    fn mod_switch_to(&self, mut ct: Ciphertext, level: usize) -> Ciphertext {
        while ct.level() > level {
            let ring: RingRNS<u64> = self.context.ring.at_level(ct.level());
            ct.parts
                .iter_mut()
                .for_each(|p| ring.div_by_last_modulus_mod_t_inplace(self.t, p));
        }
        ct
    }
}

impl Scheme for Bgv {
    type Value = u64;

    #[instrument(name = "bgv_setup", skip_all, fields(depth = params.depth))]
    fn setup(params: &Parameters) -> Result<Self> {
        if params.scheme != SchemeKind::ModulusChain {
            return Err(Error::parameter(
                "scheme",
                format!("{} parameters given to the modulus_chain backend", params.scheme),
            ));
        }

        let params: ParameterSet = ParameterSet::resolve(params)?;
        let t: u64 = params
            .plain_modulus
            .ok_or_else(|| Error::parameter("plain_modulus", "missing plaintext modulus"))?;
        if let Some(q) = params.moduli.iter().find(|q| *q % t != 1) {
            return Err(Error::parameter(
                "moduli",
                format!("prime {} is not 1 mod t={}", q, t),
            ));
        }

        let context: Context = Context::new(&params, t);
        let encoder: BatchEncoder = BatchEncoder::new(params.n, t, params.batching);

        debug!(n = params.n, t, levels = params.moduli.len(), "bgv context ready");

        Ok(Self {
            params,
            context,
            encoder,
            t,
        })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            exact: true,
            has_scale: false,
            supports_rotation: self.params.batching,
            modulus_chain_depth: self.context.max_level(),
            slot_count: self.params.slot_count,
            ring_degree: self.params.n,
            plain_modulus: Some(self.t),
            log_q: self.params.log_q,
        }
    }

    fn keygen(&self, source: &mut Source) -> Result<KeyMaterial> {
        self.context
            .gen_key_material(ROTATION_GENERATOR, &self.params.rotations, source)
    }

    fn encode(&self, values: &[u64]) -> Result<Plaintext> {
        let poly: Poly<u64> = self.encoder.encode(values)?;
        Ok(Plaintext::new(PolyRNS(vec![poly]), 1.0, values.len()))
    }

    fn encrypt(&self, pk: &PublicKey, pt: &Plaintext, source: &mut Source) -> Result<Ciphertext> {
        if pt.poly.n() != self.context.n() {
            return Err(Error::shape("plaintext degree", self.context.n(), pt.poly.n()));
        }
        let ring: &RingRNS<u64> = &self.context.ring;
        let [mut c0, c1] = self.context.encrypt_zero(pk, source)?;

        let mut m: PolyRNS<u64> = ring.new_polyrns();
        ring.from_centered_poly(self.t, &pt.poly.at(0).0, &mut m);
        ring.a_add_b_into_b::<ONCE>(&m, &mut c0);

        Ok(Ciphertext {
            parts: vec![c0, c1],
            scale: 1.0,
            depth: 0,
            len: pt.len,
        })
    }

    fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        check_binary("add", a, b)?;
        let ring: RingRNS<u64> = self.context.ring.at_level(a.level());
        Ok(Ciphertext {
            parts: add_parts(&ring, &a.parts, &b.parts),
            scale: 1.0,
            depth: a.depth.max(b.depth),
            len: a.len,
        })
    }

    fn multiply(&self, keys: &EvaluationKeys, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        check_binary("multiply", a, b)?;
        check_degree_one("multiply", a)?;
        check_degree_one("multiply", b)?;

        let level: usize = a.level();
        if level == 0 {
            return Err(Error::precision(
                "modulus chain exhausted: no prime left to switch after multiplication",
            ));
        }

        let ring: RingRNS<u64> = self.context.ring.at_level(level);
        let rlk: &SwitchingKey = &keys.relinearization;
        let mut parts: Vec<PolyRNS<u64>> = self
            .context
            .relinearize(tensor(&ring, &a.parts, &b.parts), rlk);
        parts
            .iter_mut()
            .for_each(|p| ring.div_by_last_modulus_mod_t_inplace(self.t, p));
        trace!(level = level - 1, "switched modulus");

        Ok(Ciphertext {
            parts,
            scale: 1.0,
            depth: a.depth.max(b.depth) + 1,
            len: a.len,
        })
    }

    fn align(&self, a: Ciphertext, b: Ciphertext) -> Result<(Ciphertext, Ciphertext)> {
        let level: usize = a.level().min(b.level());
        Ok((self.mod_switch_to(a, level), self.mod_switch_to(b, level)))
    }

    fn rotate(&self, keys: &EvaluationKeys, ct: &Ciphertext, steps: i64) -> Result<Ciphertext> {
        if !self.params.batching {
            return Err(Error::parameter("batching", "rotations require batching"));
        }
        check_degree_one("rotate", ct)?;
        let gal_el: usize = galois_element(ROTATION_GENERATOR, steps, self.context.n());
        if gal_el == 1 {
            return Ok(ct.clone());
        }
        let key: &SwitchingKey = keys.galois.get(&gal_el).ok_or_else(|| {
            Error::parameter("rotations", format!("no galois key for {} steps", steps))
        })?;
        Ok(Ciphertext {
            parts: self.context.apply_galois(&ct.parts, gal_el, key),
            ..ct.clone()
        })
    }

    fn decrypt(&self, keys: &KeyMaterial, ct: &Ciphertext) -> Result<Plaintext> {
        let phase: PolyRNS<u64> = self.context.decrypt_parts(keys.secret(), &ct.parts);
        let ring: RingRNS<u64> = self.context.ring.at_level(ct.level());
        let t: BigInt = BigInt::from(self.t);

        let mut coeffs: Vec<BigInt> = vec![BigInt::zero(); self.context.n()];
        ring.to_bigint_inplace(&phase, 1, &mut coeffs);
        let m: Vec<u64> = coeffs
            .iter()
            .map(|c| c.mod_floor(&t).to_u64().unwrap_or(0))
            .collect();

        Ok(Plaintext::new(PolyRNS(vec![Poly(m)]), 1.0, ct.len))
    }

    fn decode(&self, pt: &Plaintext) -> Result<Vec<u64>> {
        self.encoder.decode(pt.poly.at(0), pt.len)
    }
}

impl fmt::Debug for Bgv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bgv")
            .field("n", &self.params.n)
            .field("t", &self.t)
            .field("levels", &self.params.moduli.len())
            .finish()
    }
}
