use crate::result::Error;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use std::fmt;

/// A 256-bit run seed
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    /// The 256-bit seed
    inner: [u8; 32],
}

impl Seed {
    /// Generate a new random 256-bit seed
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        Self { inner: seed }
    }

    /// Create from hex string (with or without 0x prefix)
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        if hex.len() != 64 {
            return Err(Error::InvalidSeedLength(hex.len()));
        }

        let bytes = hex::decode(hex).map_err(|_| Error::InvalidSeedHex)?;
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes);
        Ok(Self { inner: seed })
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.inner))
    }

    /// Create a deterministic RNG for numeric validation sampling
    ///
    /// Derived under a different domain tag than [`Seed::solver_seed`].
    pub fn create_deterministic_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.derive_u64(b"UMBRA_NUMERIC_VALIDATION"))
    }

    /// Seed value passed to the SMT solver's `random_seed` parameter
    pub fn solver_seed(&self) -> u32 {
        self.derive_u64(b"UMBRA_SOLVER_SEED") as u32
    }

    fn derive_u64(&self, domain: &[u8]) -> u64 {
        let mut hasher = Sha3_256::new();
        hasher.update(domain);
        hasher.update(self.inner);
        let seed_hash = hasher.finalize();

        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&seed_hash[..8]);
        u64::from_le_bytes(seed_bytes)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Seed").field(&self.to_hex()).finish()
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Seed::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}
