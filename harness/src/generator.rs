use crate::config::ValueBounds;
use sampling::source::{Source, new_seed};
use std::fmt::Debug;
use tracing::debug;

/// Element type of the input vectors: exact integers or reals.
pub trait Sample: Copy + Debug + PartialEq {
    /// Draws a uniform value in [0, bound).
    fn sample(source: &mut Source, bound: u64) -> Self;

    /// Returns v + a*t, reduced modulo plain_modulus when given.
    fn affine(v: Self, a: Self, t: Self, plain_modulus: Option<u64>) -> Self;

    /// Whether got is an acceptable decryption of want.
    fn matches(got: Self, want: Self) -> bool;

    fn distance(got: Self, want: Self) -> f64;

    fn to_f64(self) -> f64;

    fn zero() -> Self;
}

impl Sample for u64 {
    fn sample(source: &mut Source, bound: u64) -> Self {
        source.next_u64n(bound, u64::MAX >> bound.leading_zeros())
    }

    fn affine(v: Self, a: Self, t: Self, plain_modulus: Option<u64>) -> Self {
        let x: u128 = v as u128 + a as u128 * t as u128;
        match plain_modulus {
            Some(m) => (x % m as u128) as u64,
            None => x as u64,
        }
    }

    fn matches(got: Self, want: Self) -> bool {
        got == want
    }

    fn distance(got: Self, want: Self) -> f64 {
        got.abs_diff(want) as f64
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn zero() -> Self {
        0
    }
}

/// Relative tolerance of approximate results, with an absolute floor of 1.
pub const TOLERANCE: f64 = 1e-4;

impl Sample for f64 {
    fn sample(source: &mut Source, bound: u64) -> Self {
        source.next_f64(0.0, bound as f64)
    }

    fn affine(v: Self, a: Self, t: Self, _plain_modulus: Option<u64>) -> Self {
        v + a * t
    }

    fn matches(got: Self, want: Self) -> bool {
        (got - want).abs() < TOLERANCE * want.abs().max(1.0)
    }

    fn distance(got: Self, want: Self) -> f64 {
        (got - want).abs()
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn zero() -> Self {
        0.0
    }
}

/// The three operand vectors of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Inputs<V> {
    pub acceleration: Vec<V>,
    pub initial_velocity: Vec<V>,
    pub time: Vec<V>,
}

impl<V> Inputs<V> {
    /// Length of the acceleration vector, which the others must match.
    pub fn len(&self) -> usize {
        self.acceleration.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acceleration.is_empty()
    }

    /// Length of the longest vector.
    pub fn max_len(&self) -> usize {
        self.acceleration
            .len()
            .max(self.initial_velocity.len())
            .max(self.time.len())
    }
}

impl<V: Sample> Inputs<V> {
    pub fn new(acceleration: Vec<V>, initial_velocity: Vec<V>, time: Vec<V>) -> Self {
        Self {
            acceleration,
            initial_velocity,
            time,
        }
    }

    pub fn generate(len: usize, bounds: &ValueBounds, source: &mut Source) -> Self {
        let mut draw = |bound: u64| (0..len).map(|_| V::sample(source, bound)).collect::<Vec<V>>();
        let acceleration: Vec<V> = draw(bounds.acceleration);
        let initial_velocity: Vec<V> = draw(bounds.velocity);
        let time: Vec<V> = draw(bounds.time);
        Self::new(acceleration, initial_velocity, time)
    }

    pub fn check_shape(&self) -> schemes::Result<()> {
        let expected: usize = self.len();
        if self.initial_velocity.len() != expected {
            return Err(schemes::Error::shape(
                "initial_velocity",
                expected,
                self.initial_velocity.len(),
            ));
        }
        if self.time.len() != expected {
            return Err(schemes::Error::shape("time", expected, self.time.len()));
        }
        Ok(())
    }

    /// Plaintext evaluation of v + a*t.
    pub fn reference(&self, plain_modulus: Option<u64>) -> Vec<V> {
        self.initial_velocity
            .iter()
            .zip(self.acceleration.iter().zip(self.time.iter()))
            .map(|(v, (a, t))| V::affine(*v, *a, *t, plain_modulus))
            .collect()
    }

    /// Largest unreduced result, as a float.
    pub fn max_result(&self) -> f64 {
        self.initial_velocity
            .iter()
            .zip(self.acceleration.iter().zip(self.time.iter()))
            .map(|(v, (a, t))| v.to_f64() + a.to_f64() * t.to_f64())
            .fold(0.0, f64::max)
    }
}

/// Seeded source of input vectors. One generator serves one run.
pub struct VectorGenerator {
    source: Source,
}

impl VectorGenerator {
    /// Seeds from seed, or from OS entropy when absent.
    pub fn new(seed: Option<u64>) -> Self {
        let source: Source = match seed {
            Some(seed) => Source::from_u64(seed),
            None => Source::new(new_seed()),
        };
        Self { source }
    }

    pub fn inputs<V: Sample>(&mut self, len: usize, bounds: &ValueBounds) -> Inputs<V> {
        debug!(len, ?bounds, "generating inputs");
        Inputs::generate(len, bounds, &mut self.source)
    }

    /// Returns an independent source for the encryption randomness.
    pub fn branch(&mut self) -> Source {
        self.source.branch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_values_respect_bounds() {
        let bounds: ValueBounds = ValueBounds::new(25, 50, 30);
        let mut generator: VectorGenerator = VectorGenerator::new(Some(42));
        let exact: Inputs<u64> = generator.inputs(1000, &bounds);
        assert_eq!(exact.len(), 1000);
        assert!(exact.check_shape().is_ok());
        assert!(exact.acceleration.iter().all(|x| *x < 25));
        assert!(exact.initial_velocity.iter().all(|x| *x < 50));
        assert!(exact.time.iter().all(|x| *x < 30));
        assert!(exact.time.iter().any(|x| *x == 29));

        let reals: Inputs<f64> = generator.inputs(1000, &bounds);
        assert!(reals.acceleration.iter().all(|x| (0.0..25.0).contains(x)));
        assert!(reals.time.iter().all(|x| (0.0..30.0).contains(x)));
    }

    #[test]
    fn seeds_are_reproducible() {
        let bounds: ValueBounds = ValueBounds::new(250, 500, 300);
        let a: Inputs<u64> = VectorGenerator::new(Some(1)).inputs(64, &bounds);
        let b: Inputs<u64> = VectorGenerator::new(Some(1)).inputs(64, &bounds);
        let c: Inputs<u64> = VectorGenerator::new(Some(2)).inputs(64, &bounds);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn shape_and_reference() {
        let inputs: Inputs<u64> = Inputs::new(vec![1, 2, 3], vec![4, 5, 6], vec![7, 8]);
        assert_eq!(inputs.max_len(), 3);
        assert_eq!(
            inputs.check_shape(),
            Err(schemes::Error::shape("time", 3, 2))
        );

        let inputs: Inputs<u64> = Inputs::new(vec![3, 200], vec![4, 10], vec![24, 100]);
        assert_eq!(inputs.reference(None), vec![76, 20010]);
        assert_eq!(inputs.reference(Some(17)), vec![76 % 17, 20010 % 17]);
        assert_eq!(inputs.max_result(), 20010.0);

        assert!(f64::matches(100.005, 100.0));
        assert!(!f64::matches(100.02, 100.0));
        assert!(f64::matches(0.00005, 0.0));
    }
}
