//! Registration use-case.
//!
//! Orchestrates validation, uniqueness pre-checks, name splitting, password
//! hashing, record creation and event emission behind injected ports. No
//! user state is persisted unless every check passed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::ports::{
    PasswordHasher, RegistrationNotifier, UniqueField, UserRepository, UserRepositoryError,
};
use crate::domain::signup::{SignupForm, ValidationErrors, fields, messages};
use crate::domain::user::{EmailAddress, NewUser, PersonName, Role, User, Username};

/// Immutable notification emitted once a user record has been created.
///
/// Consumed out-of-band by the notification pipeline (e.g. to send a
/// verification email); the registration flow never observes the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationEvent {
    /// Identifier of the newly created user.
    pub user_id: Uuid,
    /// Handle the user registered with.
    pub username: Username,
    /// Address the verification message should go to.
    pub email: EmailAddress,
    /// When the registration completed.
    pub occurred_at: DateTime<Utc>,
}

impl From<&User> for RegistrationEvent {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            occurred_at: Utc::now(),
        }
    }
}

/// Failure modes of [`RegistrationService::register`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    /// The submission failed validation; nothing was persisted.
    #[error("registration failed validation: {0}")]
    Validation(ValidationErrors),
    /// A collaborator failed; surfaced unretried to the generic handler.
    #[error(transparent)]
    Infrastructure(#[from] Error),
}

/// Registration handler over injected collaborator ports.
#[derive(Clone)]
pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    notifier: Arc<dyn RegistrationNotifier>,
}

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => Error::service_unavailable(message),
        UserRepositoryError::Query { message } => Error::internal(message),
        // Exists-queries never collide; a Duplicate here is an adapter bug.
        UserRepositoryError::Duplicate { field } => {
            Error::internal(format!("unexpected duplicate report for {field}"))
        }
    }
}

fn taken_message(field: UniqueField) -> (&'static str, &'static str) {
    match field {
        UniqueField::Username => (fields::USERNAME, messages::USERNAME_TAKEN),
        UniqueField::Email => (fields::EMAIL, messages::EMAIL_TAKEN),
    }
}

impl RegistrationService {
    /// Create a new service over the given collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        notifier: Arc<dyn RegistrationNotifier>,
    ) -> Self {
        Self {
            users,
            hasher,
            notifier,
        }
    }

    /// Register a new user from a raw signup submission.
    ///
    /// Any validation failure aborts before any mutation; the returned error
    /// carries every failing field, uniqueness included. A storage-level
    /// unique violation (the pre-check race losing) is reported as the same
    /// validation failure rather than an infrastructure error.
    pub async fn register(&self, form: SignupForm) -> Result<User, RegistrationError> {
        let validated = match form.validate() {
            Ok(validated) => {
                let unique = self
                    .uniqueness_errors(Some(&validated.username), Some(&validated.email))
                    .await?;
                if !unique.is_empty() {
                    return Err(RegistrationError::Validation(unique));
                }
                validated
            }
            Err(mut errors) => {
                // Fields that passed their local rules still get uniqueness
                // feedback in the same response.
                let username = (!errors.contains(fields::USERNAME))
                    .then(|| form.username.as_deref().and_then(|raw| Username::new(raw).ok()))
                    .flatten();
                let email = (!errors.contains(fields::EMAIL))
                    .then(|| form.email.as_deref().and_then(|raw| EmailAddress::new(raw).ok()))
                    .flatten();
                let unique = self
                    .uniqueness_errors(username.as_ref(), email.as_ref())
                    .await?;
                errors.merge(unique);
                return Err(RegistrationError::Validation(errors));
            }
        };

        let name = PersonName::from_full_name(&validated.full_name);
        let password_hash = self
            .hasher
            .hash(&validated.password)
            .map_err(|err| Error::internal(err.to_string()))?;

        let new_user = NewUser {
            username: validated.username,
            email: validated.email,
            first_name: name.first,
            last_name: name.last,
            password_hash,
            contact: validated.contact,
            role: Role::User,
        };

        let user = match self.users.insert(new_user).await {
            Ok(user) => user,
            Err(UserRepositoryError::Duplicate { field }) => {
                let mut errors = ValidationErrors::new();
                let (field_name, message) = taken_message(field);
                errors.push(field_name, message);
                return Err(RegistrationError::Validation(errors));
            }
            Err(err) => return Err(map_repository_error(err).into()),
        };

        self.notifier.notify(RegistrationEvent::from(&user));
        Ok(user)
    }

    async fn uniqueness_errors(
        &self,
        username: Option<&Username>,
        email: Option<&EmailAddress>,
    ) -> Result<ValidationErrors, Error> {
        let mut errors = ValidationErrors::new();

        if let Some(username) = username {
            let taken = self
                .users
                .username_exists(username)
                .await
                .map_err(map_repository_error)?;
            if taken {
                errors.push(fields::USERNAME, messages::USERNAME_TAKEN);
            }
        }

        if let Some(email) = email {
            let taken = self
                .users
                .email_exists(email)
                .await
                .map_err(map_repository_error)?;
            if taken {
                errors.push(fields::EMAIL, messages::EMAIL_TAKEN);
            }
        }

        Ok(errors)
    }
}
