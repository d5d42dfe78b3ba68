use rns::poly::PolyRNS;
use std::fmt;

/// An encoded vector. For the integer schemes the polynomial has a single
/// residue modulo t; for CKKS it lives in the ciphertext ring and carries
/// the encoding scale.
#[derive(Clone)]
pub struct Plaintext {
    pub poly: PolyRNS<u64>,
    pub scale: f64,
    /// Number of user values; decoding returns exactly that many.
    pub len: usize,
}

impl Plaintext {
    pub fn new(poly: PolyRNS<u64>, scale: f64, len: usize) -> Self {
        Self { poly, scale, len }
    }

    pub fn level(&self) -> usize {
        self.poly.level()
    }
}

impl fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plaintext")
            .field("n", &self.poly.n())
            .field("level", &self.level())
            .field("scale", &self.scale)
            .field("len", &self.len)
            .finish()
    }
}
