//! Multi-precision conversions between reals and scaled integers.

use num_bigint::{BigInt, Sign};
use rug::integer::Order;
use rug::{Float, Integer};

/// Working precision in bits of the intermediate floats.
pub const PRECISION: u32 = 256;

pub fn to_integer(x: &BigInt) -> Integer {
    let (sign, digits) = x.to_u64_digits();
    let abs: Integer = Integer::from_digits(&digits, Order::Lsf);
    if sign == Sign::Minus { -abs } else { abs }
}

pub fn to_bigint(x: &Integer) -> BigInt {
    let digits: Vec<u32> = x.to_digits::<u32>(Order::Lsf);
    let sign: Sign = if x.is_negative() {
        Sign::Minus
    } else {
        Sign::Plus
    };
    BigInt::new(sign, digits)
}

/// Returns round(x * scale), or None if x is not finite.
pub fn scale_to_integer(x: f64, scale: f64) -> Option<BigInt> {
    let scaled: Float = Float::with_val(PRECISION, x) * scale;
    scaled.round().to_integer().map(|i| to_bigint(&i))
}

/// Returns x / scale rounded to the nearest double.
pub fn bigint_to_scaled_f64(x: &BigInt, scale: f64) -> f64 {
    let value: Float = Float::with_val(PRECISION, &to_integer(x)) / scale;
    value.to_f64()
}
