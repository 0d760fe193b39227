//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! This adapter only translates between Diesel models and domain types. The
//! UNIQUE indexes on `username` and `email` are the second uniqueness layer
//! behind the validator's pre-check; a violated index surfaces as
//! [`UserRepositoryError::Duplicate`] so the caller can report it as an
//! ordinary validation failure.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UniqueField, UserRepository, UserRepositoryError};
use crate::domain::user::{ContactDetails, EmailAddress, NewUser, Role, User, Username};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const USERNAME_UNIQUE_CONSTRAINT: &str = "users_username_key";
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match info.constraint_name() {
                Some(USERNAME_UNIQUE_CONSTRAINT) => {
                    UserRepositoryError::duplicate(UniqueField::Username)
                }
                Some(EMAIL_UNIQUE_CONSTRAINT) => UserRepositoryError::duplicate(UniqueField::Email),
                _ => UserRepositoryError::query("unexpected unique violation"),
            }
        }
        DieselError::NotFound => UserRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => UserRepositoryError::query("database error"),
        _ => UserRepositoryError::query("database error"),
    }
}

/// Convert a database row to a domain [`User`].
///
/// Stored rows were validated on the way in; a row that no longer satisfies
/// the domain invariants indicates out-of-band tampering and maps to a
/// query error.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let username = Username::new(row.username)
        .map_err(|err| UserRepositoryError::query(format!("stored username invalid: {err}")))?;
    let email = EmailAddress::new(row.email)
        .map_err(|err| UserRepositoryError::query(format!("stored email invalid: {err}")))?;
    let role = Role::parse(&row.role)
        .ok_or_else(|| UserRepositoryError::query(format!("unknown role: {}", row.role)))?;

    Ok(User {
        id: row.id,
        username,
        email,
        first_name: row.first_name,
        last_name: row.last_name,
        password_hash: row.password_hash,
        contact: ContactDetails {
            phone_number: row.phone_number,
            address: row.address,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
        },
        role,
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(username.as_ref())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email.as_ref())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserRow {
            id: Uuid::new_v4(),
            username: new_user.username.as_ref(),
            email: new_user.email.as_ref(),
            first_name: &new_user.first_name,
            last_name: &new_user.last_name,
            password_hash: &new_user.password_hash,
            phone_number: new_user.contact.phone_number.as_deref(),
            address: new_user.contact.address.as_deref(),
            city: new_user.contact.city.as_deref(),
            state: new_user.contact.state.as_deref(),
            zip_code: new_user.contact.zip_code.as_deref(),
            role: new_user.role.as_str(),
        };

        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(inserted)
    }
}
