use crate::modulus::barrett::BarrettPrecomp;

/// Montgomery is an element in the Montgomery domain, i.e. x * 2^64 mod q.
pub type Montgomery<O> = O;

/// MontgomeryPrecomp stores the precomputations for Montgomery arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MontgomeryPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub barrett: BarrettPrecomp<O>,
    pub q_inv: O,
    pub one: Montgomery<O>,
    pub minus_one: Montgomery<O>,
}
