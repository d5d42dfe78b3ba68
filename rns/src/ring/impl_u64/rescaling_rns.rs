use crate::modulus::barrett::Barrett;
use crate::modulus::{ONCE, VectorOperations};
use crate::poly::{Poly, PolyRNS};
use crate::ring::RingRNS;

impl RingRNS<u64> {
    /// Returns q_level^-1 mod q_i for i < level.
    pub fn rescaling_constant(&self) -> Vec<Barrett<u64>> {
        let level: usize = self.level();
        let q_scale: u64 = self.0[level].modulus.q;
        (0..level)
            .map(|i| {
                let modulus = &self.0[i].modulus;
                modulus
                    .barrett
                    .prepare(modulus.inv(modulus.reduce(q_scale)))
            })
            .collect()
    }

    /// Updates c to floor(a / q_level), or round(a / q_level) if ROUND.
    /// Expects a in the coefficient domain at level self.level() and c at
    /// level self.level()-1.
    pub fn div_by_last_modulus<const ROUND: bool>(&self, a: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        let level: usize = self.level();
        assert!(level >= 1, "invalid level: cannot divide by the last modulus at level 0");
        assert!(
            a.level() >= level,
            "invalid input a: a.level()={} < self.level()={}",
            a.level(),
            level
        );
        assert!(
            c.level() >= level - 1,
            "invalid input c: c.level()={} < level-1={}",
            c.level(),
            level - 1
        );

        let r_last = &self.0[level];
        let q_last: u64 = r_last.modulus.q;
        let q_last_half: u64 = q_last >> 1;
        let rescaling_constants: Vec<Barrett<u64>> = self.rescaling_constant();

        let mut last: Poly<u64> = a.at(level).clone();
        if ROUND {
            r_last.a_add_b_scalar_into_a::<ONCE>(&q_last_half, &mut last);
        }

        let mut buf: Poly<u64> = r_last.new_poly();
        self.0[..level].iter().enumerate().for_each(|(i, r)| {
            buf.copy_from(&last);
            r.a_reduce_into_a(&mut buf);
            let c_i: &mut Poly<u64> = c.at_mut(i);
            c_i.copy_from(a.at(i));
            if ROUND {
                r.a_add_b_scalar_into_a::<ONCE>(&r.modulus.reduce(q_last_half), c_i);
            }
            r.modulus.va_sub_vb_mul_sc_barrett_into_va::<1, ONCE>(
                &buf.0,
                &rescaling_constants[i],
                &mut c_i.0,
            );
        });
    }

    /// Updates a to floor(a / q_level), or round(a / q_level) if ROUND,
    /// dropping the last residue of a.
    pub fn div_by_last_modulus_inplace<const ROUND: bool>(&self, a: &mut PolyRNS<u64>) {
        let level: usize = self.level();
        let input: PolyRNS<u64> = a.at_level(level);
        self.div_by_last_modulus::<ROUND>(&input, a);
        a.resize(level - 1);
    }

    /// Updates c to a / (q_level * ... * q_(level-nb_moduli+1)), dividing one
    /// modulus at a time.
    pub fn div_by_last_moduli<const ROUND: bool>(
        &self,
        nb_moduli: usize,
        a: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        assert!(
            nb_moduli <= self.level(),
            "invalid argument nb_moduli: nb_moduli={} > self.level()={}",
            nb_moduli,
            self.level()
        );
        c.copy(&a.at_level(self.level()));
        self.div_by_last_moduli_inplace::<ROUND>(nb_moduli, c);
    }

    pub fn div_by_last_moduli_inplace<const ROUND: bool>(&self, nb_moduli: usize, a: &mut PolyRNS<u64>) {
        assert!(
            nb_moduli <= self.level(),
            "invalid argument nb_moduli: nb_moduli={} > self.level()={}",
            nb_moduli,
            self.level()
        );
        (0..nb_moduli).for_each(|i| {
            self.at_level(self.level() - i)
                .div_by_last_modulus_inplace::<ROUND>(a)
        });
    }

    /// Updates a to (a - delta) / q_level, where delta = a mod q_level and
    /// delta = 0 mod t, dropping the last residue of a. The result encodes
    /// the same value modulo t up to the factor q_level^-1 mod t.
    pub fn div_by_last_modulus_mod_t_inplace(&self, t: u64, a: &mut PolyRNS<u64>) {
        let level: usize = self.level();
        assert!(level >= 1, "invalid level: cannot switch modulus at level 0");
        assert!(
            a.level() >= level,
            "invalid input a: a.level()={} < self.level()={}",
            a.level(),
            level
        );

        let r_last = &self.0[level];
        let q_last: u64 = r_last.modulus.q;
        let q_last_half: u64 = q_last >> 1;
        let t_inv: Barrett<u64> = r_last
            .modulus
            .barrett
            .prepare(r_last.modulus.inv(r_last.modulus.reduce(t)));
        let rescaling_constants: Vec<Barrett<u64>> = self.rescaling_constant();

        // delta = t * [a_last * t^-1]_q_last, centered
        let delta: Vec<i128> = a
            .at(level)
            .0
            .iter()
            .map(|x| {
                let u: u64 = r_last.modulus.barrett.mul_external::<ONCE>(&t_inv, x);
                let u_centered: i128 = if u > q_last_half {
                    u as i128 - q_last as i128
                } else {
                    u as i128
                };
                u_centered * t as i128
            })
            .collect();

        let mut buf: Poly<u64> = r_last.new_poly();
        self.0[..level].iter().enumerate().for_each(|(i, r)| {
            buf.0
                .iter_mut()
                .zip(delta.iter())
                .for_each(|(b, d)| *b = r.modulus.reduce_i128(*d));
            r.modulus.va_sub_vb_mul_sc_barrett_into_va::<1, ONCE>(
                &buf.0,
                &rescaling_constants[i],
                &mut a.at_mut(i).0,
            );
        });
        a.resize(level - 1);
    }
}
