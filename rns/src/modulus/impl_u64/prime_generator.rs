use crate::modulus::prime::NTTFriendlyPrimesGenerator;
use primality_test::is_prime;

impl NTTFriendlyPrimesGenerator<u64> {
    /// Returns a generator of primes q = 1 mod step with log2(q) within
    /// half a bit of bit_size. step is typically 2N, or 2N*t when the
    /// primes must also be 1 mod a plaintext modulus t.
    pub fn new(bit_size: u64, step: u64) -> Self {
        assert!(bit_size < 62, "invalid argument: bit_size={} >= 62", bit_size);
        assert!(step >= 2, "invalid argument: step={} < 2", step);
        let base: u64 = ((1u64 << bit_size) / step) * step;
        let next_prime: u64 = base + 1;
        let check_prev_prime: bool = next_prime > step;
        let prev_prime: u64 = if check_prev_prime {
            next_prime - step
        } else {
            next_prime
        };
        Self {
            size: bit_size as f64,
            step,
            next_prime,
            prev_prime,
            check_next_prime: true,
            check_prev_prime,
        }
    }

    pub fn next_upstream_primes(&mut self, k: usize) -> Option<Vec<u64>> {
        (0..k).map(|_| self.next_upstream_prime()).collect()
    }

    pub fn next_downstream_primes(&mut self, k: usize) -> Option<Vec<u64>> {
        (0..k).map(|_| self.next_downstream_prime()).collect()
    }

    pub fn next_alternating_primes(&mut self, k: usize) -> Option<Vec<u64>> {
        (0..k).map(|_| self.next_alternating_prime()).collect()
    }

    /// Returns the next prime above 2^bit_size, or None once the
    /// candidates reach 2^(bit_size+0.5).
    pub fn next_upstream_prime(&mut self) -> Option<u64> {
        while self.check_next_prime {
            if let Some(prime) = self.step_upstream() {
                return Some(prime);
            }
        }
        None
    }

    /// Returns the next prime below 2^bit_size, or None once the
    /// candidates reach 2^(bit_size-0.5).
    pub fn next_downstream_prime(&mut self) -> Option<u64> {
        while self.check_prev_prime {
            if let Some(prime) = self.step_downstream() {
                return Some(prime);
            }
        }
        None
    }

    /// Returns the next prime, testing candidates on both sides of
    /// 2^bit_size in turn.
    pub fn next_alternating_prime(&mut self) -> Option<u64> {
        while self.check_next_prime || self.check_prev_prime {
            if self.check_next_prime {
                if let Some(prime) = self.step_upstream() {
                    return Some(prime);
                }
            }
            if self.check_prev_prime {
                if let Some(prime) = self.step_downstream() {
                    return Some(prime);
                }
            }
        }
        None
    }

    /// Returns the smallest prime q = 1 mod step with exactly bit_size bits,
    /// the usual choice for a batching plaintext modulus.
    pub fn smallest(bit_size: u64, step: u64) -> Option<u64> {
        assert!(
            (2..63).contains(&bit_size),
            "invalid argument: bit_size={} not in [2, 62]",
            bit_size
        );
        let lo: u64 = 1 << (bit_size - 1);
        let hi: u64 = 1 << bit_size;
        let mut candidate: u64 = lo.div_ceil(step) * step + 1;
        while candidate < hi {
            if is_prime(candidate) {
                return Some(candidate);
            }
            candidate += step;
        }
        None
    }

    fn step_upstream(&mut self) -> Option<u64> {
        if (self.next_prime as f64).log2() - self.size >= 0.5
            || self.next_prime > u64::MAX - self.step
        {
            self.check_next_prime = false;
            return None;
        }
        let candidate: u64 = self.next_prime;
        self.next_prime += self.step;
        is_prime(candidate).then_some(candidate)
    }

    fn step_downstream(&mut self) -> Option<u64> {
        if self.size - (self.prev_prime as f64).log2() >= 0.5 || self.prev_prime <= self.step {
            self.check_prev_prime = false;
            return None;
        }
        let candidate: u64 = self.prev_prime;
        self.prev_prime -= self.step;
        is_prime(candidate).then_some(candidate)
    }
}
