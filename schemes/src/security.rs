use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_RING_DEGREE: usize = 1 << 10;
pub const MAX_RING_DEGREE: usize = 1 << 15;
pub const MIN_RING_DEGREE_INSECURE: usize = 1 << 4;

/// Maximum log2(Q) for a ternary secret, indexed by log2(N) - 10, from
/// the HE standard tables at 128, 192 and 256 bits of classical security.
const MAX_LOG_Q: [[usize; 3]; 6] = [
    [27, 19, 14],
    [54, 37, 29],
    [109, 75, 58],
    [218, 152, 118],
    [438, 305, 237],
    [881, 611, 476],
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// No bound is enforced. Only meant for demonstrations and tests.
    NotSet,
    #[default]
    Classic128,
    Classic192,
    Classic256,
}

impl SecurityLevel {
    /// Returns the largest admissible log2(Q) for ring degree n, None when
    /// n is outside the table. NotSet admits any modulus.
    pub fn max_log_q(&self, n: usize) -> Option<usize> {
        let column: usize = match self {
            SecurityLevel::NotSet => return Some(usize::MAX),
            SecurityLevel::Classic128 => 0,
            SecurityLevel::Classic192 => 1,
            SecurityLevel::Classic256 => 2,
        };
        if !n.is_power_of_two() || !(MIN_RING_DEGREE..=MAX_RING_DEGREE).contains(&n) {
            return None;
        }
        let row: usize = n.trailing_zeros() as usize - MIN_RING_DEGREE.trailing_zeros() as usize;
        Some(MAX_LOG_Q[row][column])
    }

    pub fn min_ring_degree(&self) -> usize {
        match self {
            SecurityLevel::NotSet => MIN_RING_DEGREE_INSECURE,
            _ => MIN_RING_DEGREE,
        }
    }

    /// Fails unless a ring of degree n with a log_q-bit modulus meets the level.
    pub fn check(&self, n: usize, log_q: usize) -> Result<()> {
        if !n.is_power_of_two() || n < self.min_ring_degree() || n > MAX_RING_DEGREE {
            return Err(Error::parameter(
                "ring_degree",
                format!(
                    "N={} must be a power of two in [{}, {}] at {}",
                    n,
                    self.min_ring_degree(),
                    MAX_RING_DEGREE,
                    self
                ),
            ));
        }
        match self.max_log_q(n) {
            Some(max) if log_q <= max => Ok(()),
            Some(max) => Err(Error::parameter(
                "security_level",
                format!(
                    "log2(Q)={} exceeds {} bits admissible for N={} at {}",
                    log_q, max, n, self
                ),
            )),
            None => Err(Error::parameter(
                "ring_degree",
                format!("no bound for N={} at {}", n, self),
            )),
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityLevel::NotSet => write!(f, "no security"),
            SecurityLevel::Classic128 => write!(f, "128-bit security"),
            SecurityLevel::Classic192 => write!(f, "192-bit security"),
            SecurityLevel::Classic256 => write!(f, "256-bit security"),
        }
    }
}

impl FromStr for SecurityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "not_set" | "notset" => Ok(SecurityLevel::NotSet),
            "128" | "classic128" => Ok(SecurityLevel::Classic128),
            "192" | "classic192" => Ok(SecurityLevel::Classic192),
            "256" | "classic256" => Ok(SecurityLevel::Classic256),
            _ => Err(Error::parameter(
                "security_level",
                format!("unknown level {:?}, expected one of none, 128, 192, 256", s),
            )),
        }
    }
}
