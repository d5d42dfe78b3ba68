use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;

pub trait Div {
    /// Returns floor(self / other).
    fn div_floor(&self, other: &Self) -> Self;
    /// Returns self / other rounded to the nearest integer, ties away from zero.
    fn div_round(&self, other: &Self) -> Self;
}

impl Div for BigInt {
    fn div_floor(&self, other: &Self) -> Self {
        Integer::div_floor(self, other)
    }

    fn div_round(&self, other: &Self) -> Self {
        let (quo, rem) = self.div_rem(other);
        let rem_twice: BigInt = rem.abs() << 1;
        if rem_twice >= other.abs() {
            if self.is_negative() == other.is_negative() {
                quo + 1
            } else {
                quo - 1
            }
        } else {
            quo
        }
    }
}
