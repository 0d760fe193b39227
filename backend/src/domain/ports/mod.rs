//! Domain ports and supporting types for the hexagonal boundary.

mod password_hasher;
mod registration_notifier;
mod user_repository;

pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use registration_notifier::RegistrationNotifier;
pub use user_repository::{InMemoryUserRepository, UniqueField, UserRepository, UserRepositoryError};
