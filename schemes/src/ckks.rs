use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::encoding::canonical::CanonicalEncoder;
use crate::error::{Error, Result};
use crate::evaluator::{add_parts, check_binary, check_degree_one, tensor};
use crate::keys::{EvaluationKeys, KeyMaterial, PublicKey, SwitchingKey};
use crate::parameters::{ParameterSet, Parameters};
use crate::plaintext::Plaintext;
use crate::{Capabilities, Scheme, SchemeKind};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use rns::modulus::ONCE;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;
use rns::ring::impl_u64::automorphism::galois_element;
use sampling::source::Source;
use std::fmt;
use tracing::{debug, instrument, trace};

/// Generator of the rotation group of the complex slots.
pub const ROTATION_GENERATOR: usize = 5;

/// Relative difference below which two scales are the same.
const SCALE_TOLERANCE: f64 = 1e-9;

/// Approximate arithmetic on real vectors. Values are embedded through the
/// canonical embedding and multiplied by the scale, which is the last prime
/// of the chain, so a rescaled product and a fresh ciphertext one level
/// lower carry the same scale.
pub struct Ckks {
    params: ParameterSet,
    context: Context,
    encoder: CanonicalEncoder,
    scale: f64,
    /// Encode and decode through multi-precision floats.
    extended: bool,
}

impl Ckks {
    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn check_scales(what: &str, a: &Ciphertext, b: &Ciphertext) -> Result<()> {
        if (a.scale / b.scale - 1.0).abs() > SCALE_TOLERANCE {
            return Err(Error::precision(format!(
                "{}: scales 2^{:.4} and 2^{:.4} differ",
                what,
                a.scale.log2(),
                b.scale.log2()
            )));
        }
        Ok(())
    }

    /// Maps the real coefficients to the ring at the top level, scaled and
    /// rounded.
    fn lift(&self, coeffs: &[f64]) -> Result<PolyRNS<u64>> {
        let ring: &RingRNS<u64> = &self.context.ring;
        let q0_half: f64 = (ring.moduli()[0] >> 1) as f64;
        if let Some(c) = coeffs
            .iter()
            .find(|c| !c.is_finite() || c.abs() * self.scale >= q0_half)
        {
            return Err(Error::precision(format!(
                "value {} does not fit the base prime at scale 2^{:.1}",
                c,
                self.scale.log2()
            )));
        }

        let mut poly: PolyRNS<u64> = ring.new_polyrns();
        if self.extended {
            ring.from_bigint_inplace(&self.scale_up_extended(coeffs)?, 1, &mut poly);
        } else {
            let scaled: Vec<i128> = coeffs
                .iter()
                .map(|c| (c * self.scale).round() as i128)
                .collect();
            ring.from_signed_inplace(&scaled, &mut poly);
        }
        Ok(poly)
    }

    #[cfg(feature = "extended-precision")]
    fn scale_up_extended(&self, coeffs: &[f64]) -> Result<Vec<BigInt>> {
        coeffs
            .iter()
            .map(|c| {
                crate::encoding::extended::scale_to_integer(*c, self.scale)
                    .ok_or_else(|| Error::precision(format!("value {} is not finite", c)))
            })
            .collect()
    }

    #[cfg(not(feature = "extended-precision"))]
    fn scale_up_extended(&self, _coeffs: &[f64]) -> Result<Vec<BigInt>> {
        SchemeKind::ApproximateRealExtended
            .ensure_available()
            .map(|_| Vec::new())
    }

    #[cfg(feature = "extended-precision")]
    fn scale_down(&self, c: &BigInt, scale: f64) -> f64 {
        if self.extended {
            crate::encoding::extended::bigint_to_scaled_f64(c, scale)
        } else {
            c.to_f64().unwrap_or(f64::NAN) / scale
        }
    }

    #[cfg(not(feature = "extended-precision"))]
    fn scale_down(&self, c: &BigInt, scale: f64) -> f64 {
        c.to_f64().unwrap_or(f64::NAN) / scale
    }
}

impl Scheme for Ckks {
    type Value = f64;

    #[instrument(name = "ckks_setup", skip_all, fields(scheme = %params.scheme, depth = params.depth))]
    fn setup(params: &Parameters) -> Result<Self> {
        let extended: bool = match params.scheme {
            SchemeKind::ApproximateReal => false,
            SchemeKind::ApproximateRealExtended => true,
            other => {
                return Err(Error::parameter(
                    "scheme",
                    format!("{} parameters given to the approximate_real backend", other),
                ));
            }
        };

        let params: ParameterSet = ParameterSet::resolve(params)?;
        let scale: f64 = params
            .scale
            .ok_or_else(|| Error::parameter("scale", "missing encoding scale"))?;
        let context: Context = Context::new(&params, 1);
        let encoder: CanonicalEncoder = CanonicalEncoder::new(params.n);

        debug!(
            n = params.n,
            log_q = params.log_q,
            log_scale = scale.log2(),
            extended,
            "ckks context ready"
        );

        Ok(Self {
            params,
            context,
            encoder,
            scale,
            extended,
        })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            exact: false,
            has_scale: true,
            supports_rotation: self.params.batching,
            modulus_chain_depth: self.context.max_level(),
            slot_count: self.params.slot_count,
            ring_degree: self.params.n,
            plain_modulus: None,
            log_q: self.params.log_q,
        }
    }

    fn keygen(&self, source: &mut Source) -> Result<KeyMaterial> {
        self.context
            .gen_key_material(ROTATION_GENERATOR, &self.params.rotations, source)
    }

    fn encode(&self, values: &[f64]) -> Result<Plaintext> {
        if values.len() > self.params.slot_count {
            return Err(Error::shape("encode", self.params.slot_count, values.len()));
        }
        let coeffs: Vec<f64> = if self.params.batching {
            self.encoder.embed_inv(values)
        } else {
            let mut coeffs: Vec<f64> = vec![0.0; self.context.n()];
            if let Some(v) = values.first() {
                coeffs[0] = *v;
            }
            coeffs
        };
        Ok(Plaintext::new(self.lift(&coeffs)?, self.scale, values.len()))
    }

    fn encrypt(&self, pk: &PublicKey, pt: &Plaintext, source: &mut Source) -> Result<Ciphertext> {
        if pt.level() != self.context.max_level() {
            return Err(Error::precision(format!(
                "plaintext at level {}, expected the top level {}",
                pt.level(),
                self.context.max_level()
            )));
        }
        let [mut c0, c1] = self.context.encrypt_zero(pk, source)?;
        self.context
            .ring
            .a_add_b_into_b::<ONCE>(&pt.poly, &mut c0);

        Ok(Ciphertext {
            parts: vec![c0, c1],
            scale: pt.scale,
            depth: 0,
            len: pt.len,
        })
    }

    fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        check_binary("add", a, b)?;
        Self::check_scales("add", a, b)?;
        let ring: RingRNS<u64> = self.context.ring.at_level(a.level());
        Ok(Ciphertext {
            parts: add_parts(&ring, &a.parts, &b.parts),
            scale: a.scale,
            depth: a.depth.max(b.depth),
            len: a.len,
        })
    }

    fn multiply(&self, keys: &EvaluationKeys, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        check_binary("multiply", a, b)?;
        Self::check_scales("multiply", a, b)?;
        check_degree_one("multiply", a)?;
        check_degree_one("multiply", b)?;

        let level: usize = a.level();
        if level == 0 {
            return Err(Error::precision(
                "modulus chain exhausted: no prime left to rescale after multiplication",
            ));
        }

        let ring: RingRNS<u64> = self.context.ring.at_level(level);
        let rlk: &SwitchingKey = &keys.relinearization;
        let mut parts: Vec<PolyRNS<u64>> = self
            .context
            .relinearize(tensor(&ring, &a.parts, &b.parts), rlk);
        parts
            .iter_mut()
            .for_each(|p| ring.div_by_last_modulus_inplace::<true>(p));

        let q_last: f64 = ring.moduli()[level] as f64;
        // divide first so that scale^2 / q_last is exact when q_last == scale
        let scale: f64 = a.scale / q_last * b.scale;
        trace!(level = level - 1, log_scale = scale.log2(), "rescaled");

        Ok(Ciphertext {
            parts,
            scale,
            depth: a.depth.max(b.depth) + 1,
            len: a.len,
        })
    }

    fn align(&self, mut a: Ciphertext, mut b: Ciphertext) -> Result<(Ciphertext, Ciphertext)> {
        let level: usize = a.level().min(b.level());
        a.drop_to_level(level);
        b.drop_to_level(level);
        Self::check_scales("align", &a, &b)?;
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
        Ok(Plaintext::new(phase, ct.scale, ct.len))
    }

    fn decode(&self, pt: &Plaintext) -> Result<Vec<f64>> {
        if pt.len > self.params.slot_count {
            return Err(Error::shape("decode", self.params.slot_count, pt.len));
        }
        let ring: RingRNS<u64> = self.context.ring.at_level(pt.level());
        let mut coeffs: Vec<BigInt> = vec![BigInt::zero(); self.context.n()];
        ring.to_bigint_inplace(&pt.poly, 1, &mut coeffs);
        let reals: Vec<f64> = coeffs
            .iter()
            .map(|c| self.scale_down(c, pt.scale))
            .collect();

        let mut values: Vec<f64> = if self.params.batching {
            self.encoder.embed(&reals)
        } else {
            reals
        };
        values.truncate(pt.len);
        Ok(values)
    }
}

impl fmt::Debug for Ckks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ckks")
            .field("n", &self.params.n)
            .field("levels", &self.params.moduli.len())
            .field("log_scale", &self.scale.log2())
            .field("extended", &self.extended)
            .finish()
    }
}
