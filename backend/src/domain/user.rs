//! User data model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

/// Validation errors returned by the user field constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The username was empty or whitespace-only.
    EmptyUsername,
    /// The username was shorter than [`Username::MIN`] characters.
    UsernameTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// The username exceeded [`Username::MAX`] characters.
    UsernameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The username contained something other than letters and digits.
    UsernameInvalidCharacters,
    /// The email address was empty or whitespace-only.
    EmptyEmail,
    /// The email address exceeded [`EmailAddress::MAX`] characters.
    EmailTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The email address did not look like `local@domain`.
    EmailInvalidSyntax,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => {
                write!(f, "username may only contain letters and numbers")
            }
            Self::EmptyEmail => write!(f, "email address must not be empty"),
            Self::EmailTooLong { max } => {
                write!(f, "email address must be at most {max} characters")
            }
            Self::EmailInvalidSyntax => write!(f, "email address must be valid"),
        }
    }
}

impl std::error::Error for UserValidationError {}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = "^[a-zA-Z0-9]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Deliberately loose: one local part, one domain with a dot, no spaces.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unique account handle, alphanumeric only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Minimum allowed length.
    pub const MIN: usize = 7;
    /// Maximum allowed length.
    pub const MAX: usize = 100;

    /// Validate and construct a [`Username`] from owned input.
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(username.into())
    }

    /// Whether the raw value contains only letters and digits.
    pub fn charset_ok(raw: &str) -> bool {
        username_regex().is_match(raw)
    }

    fn from_owned(username: String) -> Result<Self, UserValidationError> {
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }

        let length = username.chars().count();
        if length < Self::MIN {
            return Err(UserValidationError::UsernameTooShort { min: Self::MIN });
        }
        if length > Self::MAX {
            return Err(UserValidationError::UsernameTooLong { max: Self::MAX });
        }

        if !Self::charset_ok(&username) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }

        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Lowercase-normalised email address.
///
/// Construction lowercases the raw input before checking syntax, so two
/// addresses differing only in case compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Maximum allowed length.
    pub const MAX: usize = 255;

    /// Validate, lowercase and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    /// Whether the raw value has `local@domain` shape.
    pub fn syntax_ok(raw: &str) -> bool {
        email_regex().is_match(raw)
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }

        let normalised = email.to_lowercase();
        if normalised.chars().count() > Self::MAX {
            return Err(UserValidationError::EmailTooLong { max: Self::MAX });
        }
        if !Self::syntax_ok(&normalised) {
            return Err(UserValidationError::EmailInvalidSyntax);
        }

        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Account role, fixed to [`Role::User`] at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Standard account created through the public signup flow.
    User,
    /// Elevated account, never minted by this service.
    Admin,
}

impl Role {
    /// Stable string form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse the stored string form back into a [`Role`].
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First/last name pair derived from a submitted full name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    /// Everything before the first space.
    pub first: String,
    /// Everything after the first space; empty when no space exists.
    pub last: String,
}

impl PersonName {
    /// Split a full name at the first space boundary.
    pub fn from_full_name(full_name: &str) -> Self {
        match full_name.split_once(' ') {
            Some((first, last)) => Self {
                first: first.to_owned(),
                last: last.to_owned(),
            },
            None => Self {
                first: full_name.to_owned(),
                last: String::new(),
            },
        }
    }
}

/// Optional postal/contact details captured at signup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    /// Phone number, max 20 characters.
    pub phone_number: Option<String>,
    /// Street address, max 255 characters.
    pub address: Option<String>,
    /// City, max 100 characters.
    pub city: Option<String>,
    /// State or region, max 100 characters.
    pub state: Option<String>,
    /// Postal code, max 20 characters.
    pub zip_code: Option<String>,
}

/// Field set for a user record about to be inserted.
///
/// Identity and audit timestamps are owned by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique account handle.
    pub username: Username,
    /// Unique, lowercase-normalised address.
    pub email: EmailAddress,
    /// Given name derived from the submitted full name.
    pub first_name: String,
    /// Family name; empty when the full name had no space.
    pub last_name: String,
    /// PHC-formatted password hash; never the plaintext.
    pub password_hash: String,
    /// Optional contact fields.
    pub contact: ContactDetails,
    /// Role assigned at creation.
    pub role: Role,
}

/// Persisted application user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable identifier minted by the persistence layer.
    pub id: Uuid,
    /// Unique account handle.
    pub username: Username,
    /// Unique, lowercase-normalised address.
    pub email: EmailAddress,
    /// Given name.
    pub first_name: String,
    /// Family name, possibly empty.
    pub last_name: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Optional contact fields.
    pub contact: ContactDetails,
    /// Account role.
    pub role: Role,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("janedoe1")]
    #[case("ABC1234")]
    #[case("a234567")]
    fn accepts_valid_usernames(#[case] raw: &str) {
        let username = Username::new(raw).expect("username should validate");
        assert_eq!(username.as_ref(), raw);
    }

    #[rstest]
    #[case("short1", UserValidationError::UsernameTooShort { min: Username::MIN })]
    #[case("jane doe", UserValidationError::UsernameInvalidCharacters)]
    #[case("jane_doe", UserValidationError::UsernameInvalidCharacters)]
    fn rejects_invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(Username::new(raw), Err(expected));
    }

    #[test]
    fn rejects_overlong_username() {
        let raw = "a".repeat(Username::MAX + 1);
        assert_eq!(
            Username::new(raw),
            Err(UserValidationError::UsernameTooLong { max: Username::MAX })
        );
    }

    #[test]
    fn lowercases_email_on_construction() {
        let email = EmailAddress::new("Jane@Example.COM").expect("email should validate");
        assert_eq!(email.as_ref(), "jane@example.com");
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("two@at@signs.com")]
    #[case("no-domain@")]
    #[case("spaces in@example.com")]
    fn rejects_invalid_email_syntax(#[case] raw: &str) {
        assert_eq!(
            EmailAddress::new(raw),
            Err(UserValidationError::EmailInvalidSyntax)
        );
    }

    #[rstest]
    #[case("Jane Doe", "Jane", "Doe")]
    #[case("Jane Anne Doe", "Jane", "Anne Doe")]
    #[case("Madonna", "Madonna", "")]
    fn splits_full_name_at_first_space(
        #[case] full_name: &str,
        #[case] first: &str,
        #[case] last: &str,
    ) {
        let name = PersonName::from_full_name(full_name);
        assert_eq!(name.first, first);
        assert_eq!(name.last, last);
    }

    #[test]
    fn role_string_round_trip() {
        assert_eq!(Role::parse(Role::User.as_str()), Some(Role::User));
        assert_eq!(Role::parse(Role::Admin.as_str()), Some(Role::Admin));
        assert_eq!(Role::parse("superuser"), None);
    }
}
