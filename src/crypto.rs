//! Password hashing and token generation.

use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use password_hash::{PasswordHash, PasswordHasher as ArgonPasswordHasher, SaltString};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::CompanyError;

/// Default length of API and invitation tokens, in characters.
pub const DEFAULT_TOKEN_LENGTH: usize = 40;

/// Pluggable password hashing, used by registration, password updates and
/// every action that asks the user to confirm their password.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CompanyError>;

    /// Returns `Ok(false)` for a wrong password and an error only when the
    /// stored hash is malformed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CompanyError>;
}

/// Argon2id hasher.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    #[must_use]
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Cheap parameters for tests and local development.
    #[must_use]
    pub fn fast() -> Self {
        Self::new(1024, 1, 1)
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, CompanyError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| CompanyError::PasswordHashError)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| CompanyError::PasswordHashError)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CompanyError> {
        let parsed = PasswordHash::new(hash).map_err(|_| CompanyError::PasswordHashError)?;

        // params come from the encoded hash
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Random alphanumeric token of `length` characters.
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

/// SHA-256 hex digest used to store API and invitation tokens.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
