//! Port abstraction for user persistence adapters and their errors.

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::{EmailAddress, NewUser, User, Username};

/// Column whose uniqueness constraint rejected an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    /// The `username` column.
    Username,
    /// The `email` column.
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => f.write_str("username"),
            Self::Email => f.write_str("email address"),
        }
    }
}

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The storage-level uniqueness constraint rejected the insert.
    #[error("{field} is already taken")]
    Duplicate {
        /// Which unique column collided.
        field: UniqueField,
    },
}

impl UserRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a duplicate error for the given unique column.
    pub fn duplicate(field: UniqueField) -> Self {
        Self::Duplicate { field }
    }
}

/// Port for user persistence.
///
/// `username_exists`/`email_exists` back the validator's uniqueness
/// pre-check; `insert` must still enforce the storage-level constraint and
/// report collisions as [`UserRepositoryError::Duplicate`] so the
/// check-then-act race degrades to a validation failure.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Whether a user already holds this username.
    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError>;

    /// Whether a user already holds this email address.
    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserRepositoryError>;

    /// Insert a new user record, minting its identity and timestamps.
    async fn insert(&self, new_user: NewUser) -> Result<User, UserRepositoryError>;
}

/// In-memory [`UserRepository`] used by tests and database-less startup.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored users, in insertion order.
    pub fn users(&self) -> Vec<User> {
        self.users
            .lock()
            .map(|users| users.clone())
            .unwrap_or_default()
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Vec<User>>, UserRepositoryError> {
        self.users
            .lock()
            .map_err(|_| UserRepositoryError::query("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        let users = self.guard()?;
        Ok(users.iter().any(|user| &user.username == username))
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserRepositoryError> {
        let users = self.guard()?;
        Ok(users.iter().any(|user| &user.email == email))
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, UserRepositoryError> {
        let mut users = self.guard()?;
        // Mirror the UNIQUE indexes a real store declares.
        if users.iter().any(|user| user.username == new_user.username) {
            return Err(UserRepositoryError::duplicate(UniqueField::Username));
        }
        if users.iter().any(|user| user.email == new_user.email) {
            return Err(UserRepositoryError::duplicate(UniqueField::Email));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            password_hash: new_user.password_hash,
            contact: new_user.contact,
            role: new_user.role,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}
