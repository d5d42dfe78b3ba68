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
use rns::num_bigint::Div;
use rns::poly::{Poly, PolyRNS};
use rns::ring::RingRNS;
use rns::ring::impl_u64::automorphism::galois_element;
use sampling::source::Source;
use std::fmt;
use tracing::{debug, instrument};

/// Generator of the rotation group of the integer slot matrix.
pub const ROTATION_GENERATOR: usize = 3;

/// Scale-invariant batched integer arithmetic modulo t. The message sits
/// in the top bits of the ciphertext modulus as floor(Q/t) * m, and the
/// tensor product is computed exactly over an extended basis QP before
/// being scaled back by t/Q.
pub struct Bfv {
    params: ParameterSet,
    context: Context,
    ring_qp: RingRNS<u64>,
    encoder: BatchEncoder,
    t: u64,
    q: BigInt,
    /// floor(Q/t) modulo each ciphertext prime.
    delta: Vec<u64>,
}

impl Bfv {
    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// Copies a from Q to QP, through the centered integer representative.
    fn extend_basis(&self, a: &PolyRNS<u64>) -> PolyRNS<u64> {
        let mut coeffs: Vec<BigInt> = vec![BigInt::zero(); self.context.n()];
        self.context.ring.to_bigint_inplace(a, 1, &mut coeffs);
        let mut out: PolyRNS<u64> = self.ring_qp.new_polyrns();
        self.ring_qp.from_bigint_inplace(&coeffs, 1, &mut out);
        out
    }

    /// Returns round(t/Q * a) modulo Q for a polynomial a over QP.
    fn scale_down(&self, a: &PolyRNS<u64>) -> PolyRNS<u64> {
        let mut coeffs: Vec<BigInt> = vec![BigInt::zero(); self.context.n()];
        self.ring_qp.to_bigint_inplace(a, 1, &mut coeffs);
        let t: BigInt = BigInt::from(self.t);
        coeffs
            .iter_mut()
            .for_each(|c| *c = (&*c * &t).div_round(&self.q));
        let mut out: PolyRNS<u64> = self.context.ring.new_polyrns();
        self.context.ring.from_bigint_inplace(&coeffs, 1, &mut out);
        out
    }
}

impl Scheme for Bfv {
    type Value = u64;

    #[instrument(name = "bfv_setup", skip_all, fields(depth = params.depth))]
    fn setup(params: &Parameters) -> Result<Self> {
        if params.scheme != SchemeKind::ExactBatched {
            return Err(Error::parameter(
                "scheme",
                format!("{} parameters given to the exact_batched backend", params.scheme),
            ));
        }

        let params: ParameterSet = ParameterSet::resolve(params)?;
        let t: u64 = params
            .plain_modulus
            .ok_or_else(|| Error::parameter("plain_modulus", "missing plaintext modulus"))?;

        let context: Context = Context::new(&params, 1);
        let ring_qp: RingRNS<u64> = context
            .ring
            .extend(&RingRNS::new(params.n, &params.extension));
        let q: BigInt = context.ring.modulus();
        let delta: Vec<u64> = context.ring.bigint_to_rns(&Integer::div_floor(&q, &BigInt::from(t)));
        let encoder: BatchEncoder = BatchEncoder::new(params.n, t, params.batching);

        debug!(n = params.n, t, log_q = params.log_q, "bfv context ready");

        Ok(Self {
            params,
            context,
            ring_qp,
            encoder,
            t,
            q,
            delta,
        })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            exact: true,
            has_scale: false,
            supports_rotation: self.params.batching,
            modulus_chain_depth: self.params.depth,
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
        ring.a_mul_b_scalar_rns_into_a::<ONCE>(&self.delta, &mut m);
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
        Ok(Ciphertext {
            parts: add_parts(&self.context.ring, &a.parts, &b.parts),
            scale: 1.0,
            depth: a.depth.max(b.depth),
            len: a.len,
        })
    }

    fn multiply(&self, keys: &EvaluationKeys, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        check_binary("multiply", a, b)?;
        check_degree_one("multiply", a)?;
        check_degree_one("multiply", b)?;

        let depth: usize = a.depth.max(b.depth) + 1;
        if depth > self.params.depth {
            return Err(Error::precision(format!(
                "noise budget exhausted: multiplication {} exceeds the configured depth {}",
                depth, self.params.depth
            )));
        }

        let a_qp: Vec<PolyRNS<u64>> = a.parts.iter().map(|p| self.extend_basis(p)).collect();
        let b_qp: Vec<PolyRNS<u64>> = b.parts.iter().map(|p| self.extend_basis(p)).collect();
        let [d0, d1, d2] = tensor(&self.ring_qp, &a_qp, &b_qp);

        let rlk: &SwitchingKey = &keys.relinearization;
        let parts: Vec<PolyRNS<u64>> = self.context.relinearize(
            [self.scale_down(&d0), self.scale_down(&d1), self.scale_down(&d2)],
            rlk,
        );

        Ok(Ciphertext {
            parts,
            scale: 1.0,
            depth,
            len: a.len,
        })
    }

    fn align(&self, a: Ciphertext, b: Ciphertext) -> Result<(Ciphertext, Ciphertext)> {
        // every ciphertext stays at the top level
        Ok((a, b))
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
        let q: BigInt = ring.modulus();
        let t: BigInt = BigInt::from(self.t);

        let mut coeffs: Vec<BigInt> = vec![BigInt::zero(); self.context.n()];
        ring.to_bigint_inplace(&phase, 1, &mut coeffs);
        let m: Vec<u64> = coeffs
            .iter()
            .map(|c| {
                (c * &t)
                    .div_round(&q)
                    .mod_floor(&t)
                    .to_u64()
                    .unwrap_or(0)
            })
            .collect();

        Ok(Plaintext::new(PolyRNS(vec![Poly(m)]), 1.0, ct.len))
    }

    fn decode(&self, pt: &Plaintext) -> Result<Vec<u64>> {
        self.encoder.decode(pt.poly.at(0), pt.len)
    }
}

impl fmt::Debug for Bfv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bfv")
            .field("n", &self.params.n)
            .field("t", &self.t)
            .field("log_q", &self.params.log_q)
            .field("depth", &self.params.depth)
            .finish()
    }
}
