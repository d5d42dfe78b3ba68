use rns::poly::PolyRNS;
use std::fmt;
use utils::map::Map;

/// Ternary secret. Never printed.
pub struct SecretKey {
    /// Coefficient domain, top level.
    pub(crate) coeffs: PolyRNS<u64>,
    /// NTT domain, Montgomery form, top level.
    pub(crate) ntt: PolyRNS<u64>,
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// RLWE encryption of zero (b, a) with b = -a*s + e, in NTT Montgomery form.
pub struct PublicKey {
    pub(crate) b: PolyRNS<u64>,
    pub(crate) a: PolyRNS<u64>,
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("n", &self.a.n())
            .field("level", &self.a.level())
            .finish()
    }
}

/// Gadget encryptions of s_from under s_to, one row per RNS prime and one
/// entry per base 2^w digit of that prime. Each entry is [b, a] in NTT
/// Montgomery form at the top level.
pub struct SwitchingKey {
    pub(crate) rows: Vec<Vec<[PolyRNS<u64>; 2]>>,
}

impl SwitchingKey {
    /// Total number of gadget entries.
    pub fn size(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }
}

impl fmt::Debug for SwitchingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchingKey")
            .field("primes", &self.rows.len())
            .field("size", &self.size())
            .finish()
    }
}

pub struct EvaluationKeys {
    /// Switches s^2 to s.
    pub relinearization: SwitchingKey,
    /// Switches s(X^g) to s, indexed by the galois element g.
    pub galois: Map<usize, SwitchingKey>,
}

impl fmt::Debug for EvaluationKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut galois: Vec<&usize> = self.galois.keys().collect();
        galois.sort();
        f.debug_struct("EvaluationKeys")
            .field("relinearization", &self.relinearization)
            .field("galois", &galois)
            .finish()
    }
}

pub struct KeyMaterial {
    pub public: PublicKey,
    secret: SecretKey,
    pub evaluation: EvaluationKeys,
}

impl KeyMaterial {
    pub fn new(public: PublicKey, secret: SecretKey, evaluation: EvaluationKeys) -> Self {
        Self {
            public,
            secret,
            evaluation,
        }
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public", &self.public)
            .field("secret", &self.secret)
            .field("evaluation", &self.evaluation)
            .finish()
    }
}
