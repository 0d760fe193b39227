//! Password hashing using Argon2id.
//!
//! Implements NIST SP 800-63B password recommendations:
//! - Argon2id for memory-hard hashing
//! - Secure random salt generation
//! - Constant-time comparison on verification

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Password hashing cost configuration.
#[derive(Debug, Clone)]
pub struct HashingPolicy {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
    /// Output hash length in bytes.
    pub hash_length: u32,
}

impl Default for HashingPolicy {
    fn default() -> Self {
        // OWASP recommended settings for Argon2id
        Self {
            memory_cost: 19 * 1024, // 19 MiB
            time_cost: 2,
            parallelism: 1,
            hash_length: 32,
        }
    }
}

impl HashingPolicy {
    fn build_params(&self) -> Result<Params, argon2::Error> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.hash_length as usize),
        )
    }
}

/// Argon2id implementation of the `PasswordHasher` port.
pub struct Argon2PasswordHasher {
    policy: HashingPolicy,
}

impl Argon2PasswordHasher {
    /// Create a hasher with the given cost policy.
    pub fn new(policy: HashingPolicy) -> Self {
        Self { policy }
    }

    /// Create a hasher with the default (OWASP) policy.
    pub fn with_defaults() -> Self {
        Self::new(HashingPolicy::default())
    }

    /// Verify a plaintext password against a stored PHC hash.
    ///
    /// Uses constant-time comparison. Returns `Ok(false)` on mismatch and an
    /// error only when the stored hash itself is malformed.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| PasswordHashError::new(err.to_string()))?;

        // Argon2::default() can verify any Argon2 variant.
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::new(err.to_string())),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);

        let params = self
            .policy
            .build_params()
            .map_err(|err| PasswordHashError::new(err.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::new(err.to_string()))?;

        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap parameters so the test suite stays fast.
    fn test_hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new(HashingPolicy {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            hash_length: 32,
        })
    }

    #[test]
    fn hash_and_verify() {
        let hasher = test_hasher();
        let password = "correct horse battery staple";

        let hash = hasher.hash(password).expect("hashing should succeed");

        // Hash should be PHC formatted and never the plaintext.
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, password);

        assert_eq!(hasher.verify(password, &hash), Ok(true));
        assert_eq!(hasher.verify("wrong password", &hash), Ok(false));
    }

    #[test]
    fn different_passwords_produce_different_hashes() {
        let hasher = test_hasher();

        let hash1 = hasher.hash("password1").expect("hashing should succeed");
        let hash2 = hasher.hash("password2").expect("hashing should succeed");
        let hash3 = hasher.hash("password1").expect("hashing should succeed");

        assert_ne!(hash1, hash2);

        // Same password produces different hashes (different salts).
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let hasher = test_hasher();
        assert!(hasher.verify("password", "not-a-phc-string").is_err());
    }
}
