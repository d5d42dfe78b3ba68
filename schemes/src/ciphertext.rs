use rns::poly::PolyRNS;
use std::fmt;

/// An RLWE ciphertext c0 + c1*s (+ c2*s^2) in the coefficient domain. Its
/// level is the number of live primes minus one.
#[derive(Clone)]
pub struct Ciphertext {
    pub parts: Vec<PolyRNS<u64>>,
    /// CKKS scale, 1 for the integer schemes.
    pub scale: f64,
    /// Number of multiplications that produced this ciphertext.
    pub depth: usize,
    pub len: usize,
}

impl Ciphertext {
    pub fn level(&self) -> usize {
        self.parts[0].level()
    }

    pub fn degree(&self) -> usize {
        self.parts.len() - 1
    }

    /// Drops the residues above level.
    pub fn drop_to_level(&mut self, level: usize) {
        self.parts.iter_mut().for_each(|p| p.resize(level));
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ciphertext")
            .field("degree", &self.degree())
            .field("level", &self.level())
            .field("scale", &self.scale)
            .field("depth", &self.depth)
            .field("len", &self.len)
            .finish()
    }
}
