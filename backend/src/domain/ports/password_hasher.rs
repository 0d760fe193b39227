//! Port abstraction for credential hashing.
//!
//! A synchronous interface is intentional: hashing is CPU-only and must not
//! perform I/O, so adapters stay trivially testable.

/// Failure raised by a hashing adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

impl PasswordHashError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Port for one-way, salted credential hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing storable string.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError>;
}
