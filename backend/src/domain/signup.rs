//! Signup form validation.
//!
//! Re-expresses the registration rule set as an explicit validation function
//! returning a structured field → messages mapping, decoupled from any
//! transport. Uniqueness against existing users is not checked here; the
//! registration service layers it on top using the same error shape.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use zeroize::Zeroizing;

use crate::domain::user::{ContactDetails, EmailAddress, Username};

/// Form field identifiers shared by the validator and the HTTP adapter.
pub mod fields {
    /// Submitted full name, split into first/last on success.
    pub const FULL_NAME: &str = "full_name";
    /// Requested account handle.
    pub const USERNAME: &str = "username";
    /// Requested email address.
    pub const EMAIL: &str = "email";
    /// Must equal `email` on the raw values.
    pub const EMAIL_CONFIRMATION: &str = "email_confirmation";
    /// Plaintext password, never persisted.
    pub const PASSWORD: &str = "password";
    /// Must equal `password`.
    pub const PASSWORD_CONFIRMATION: &str = "password_confirmation";
    /// Terms-of-service acceptance token.
    pub const TERMS: &str = "terms";
    /// Optional contact fields.
    pub const PHONE_NUMBER: &str = "phone_number";
    /// Optional street address.
    pub const ADDRESS: &str = "address";
    /// Optional city.
    pub const CITY: &str = "city";
    /// Optional state or region.
    pub const STATE: &str = "state";
    /// Optional postal code.
    pub const ZIP_CODE: &str = "zip_code";
}

/// Human-readable messages attached to failing fields.
pub mod messages {
    /// Username charset rule.
    pub const USERNAME_CHARSET: &str = "The username must contain only letters and numbers.";
    /// Username minimum length rule.
    pub const USERNAME_MIN: &str = "The username must be at least 7 characters.";
    /// Username uniqueness rule.
    pub const USERNAME_TAKEN: &str = "This username has already been taken.";
    /// Email uniqueness rule.
    pub const EMAIL_TAKEN: &str = "This email address is already registered.";
    /// Email confirmation rule.
    pub const EMAIL_CONFIRMATION: &str = "The email confirmation does not match.";
    /// Password confirmation rule.
    pub const PASSWORD_CONFIRMATION: &str = "The password confirmation does not match.";
    /// Terms acceptance rule.
    pub const TERMS_REQUIRED: &str = "You must agree to the Terms of Service to register.";

    pub(super) const FULL_NAME_REQUIRED: &str = "The full name field is required.";
    pub(super) const FULL_NAME_MAX: &str = "The full name must not exceed 255 characters.";
    pub(super) const USERNAME_REQUIRED: &str = "The username field is required.";
    pub(super) const USERNAME_MAX: &str = "The username must not exceed 100 characters.";
    pub(super) const EMAIL_REQUIRED: &str = "The email field is required.";
    pub(super) const EMAIL_INVALID: &str = "The email must be a valid email address.";
    pub(super) const EMAIL_MAX: &str = "The email must not exceed 255 characters.";
    pub(super) const PASSWORD_REQUIRED: &str = "The password field is required.";
    pub(super) const PASSWORD_MIN: &str = "The password must be at least 8 characters.";
    pub(super) const PHONE_NUMBER_MAX: &str = "The phone number must not exceed 20 characters.";
    pub(super) const ADDRESS_MAX: &str = "The address must not exceed 255 characters.";
    pub(super) const CITY_MAX: &str = "The city must not exceed 100 characters.";
    pub(super) const STATE_MAX: &str = "The state must not exceed 100 characters.";
    pub(super) const ZIP_CODE_MAX: &str = "The zip code must not exceed 20 characters.";
}

const FULL_NAME_MAX_LEN: usize = 255;
const PASSWORD_MIN_LEN: usize = 8;
const PHONE_NUMBER_MAX_LEN: usize = 20;
const ADDRESS_MAX_LEN: usize = 255;
const CITY_MAX_LEN: usize = 100;
const STATE_MAX_LEN: usize = 100;
const ZIP_CODE_MAX_LEN: usize = 20;

/// Field-scoped validation failures, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a field, preserving insertion order per field.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    /// Fold another error set into this one.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Whether any field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the given field failed.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded against a field, empty when the field passed.
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Borrow the underlying field → messages map.
    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// Consume into the underlying field → messages map.
    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Raw signup submission as received from the form.
///
/// Missing and blank fields are both treated as absent.
#[derive(Clone, Default)]
pub struct SignupForm {
    /// Submitted full name.
    pub full_name: Option<String>,
    /// Requested account handle.
    pub username: Option<String>,
    /// Requested email address, raw case preserved.
    pub email: Option<String>,
    /// Parallel email confirmation, raw case preserved.
    pub email_confirmation: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
    /// Parallel password confirmation.
    pub password_confirmation: Option<String>,
    /// Terms acceptance token; the form sends a fixed `accept` value.
    pub terms: Option<String>,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Optional street address.
    pub address: Option<String>,
    /// Optional city.
    pub city: Option<String>,
    /// Optional state or region.
    pub state: Option<String>,
    /// Optional postal code.
    pub zip_code: Option<String>,
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("full_name", &self.full_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("email_confirmation", &self.email_confirmation)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "password_confirmation",
                &self.password_confirmation.as_ref().map(|_| "<redacted>"),
            )
            .field("terms", &self.terms)
            .field("phone_number", &self.phone_number)
            .field("address", &self.address)
            .field("city", &self.city)
            .field("state", &self.state)
            .field("zip_code", &self.zip_code)
            .finish()
    }
}

/// Normalised field set produced by a fully clean local validation pass.
#[derive(Debug, Clone)]
pub struct ValidatedSignup {
    /// Full name as submitted, within length bounds.
    pub full_name: String,
    /// Validated account handle.
    pub username: Username,
    /// Lowercase-normalised address.
    pub email: EmailAddress,
    /// Plaintext password, wiped on drop.
    pub password: Zeroizing<String>,
    /// Optional contact fields within their length bounds.
    pub contact: ContactDetails,
}

fn provided(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|raw| !raw.trim().is_empty())
}

fn check_full_name(form: &SignupForm, errors: &mut ValidationErrors) -> Option<String> {
    let Some(raw) = provided(form.full_name.as_ref()) else {
        errors.push(fields::FULL_NAME, messages::FULL_NAME_REQUIRED);
        return None;
    };
    if raw.chars().count() > FULL_NAME_MAX_LEN {
        errors.push(fields::FULL_NAME, messages::FULL_NAME_MAX);
        return None;
    }
    Some(raw.to_owned())
}

fn check_username(form: &SignupForm, errors: &mut ValidationErrors) -> Option<Username> {
    let Some(raw) = provided(form.username.as_ref()) else {
        errors.push(fields::USERNAME, messages::USERNAME_REQUIRED);
        return None;
    };

    let mut ok = true;
    let length = raw.chars().count();
    if length < Username::MIN {
        errors.push(fields::USERNAME, messages::USERNAME_MIN);
        ok = false;
    }
    if length > Username::MAX {
        errors.push(fields::USERNAME, messages::USERNAME_MAX);
        ok = false;
    }
    if !Username::charset_ok(raw) {
        errors.push(fields::USERNAME, messages::USERNAME_CHARSET);
        ok = false;
    }

    if ok { Username::new(raw).ok() } else { None }
}

fn check_email(form: &SignupForm, errors: &mut ValidationErrors) -> Option<EmailAddress> {
    let Some(raw) = provided(form.email.as_ref()) else {
        errors.push(fields::EMAIL, messages::EMAIL_REQUIRED);
        return None;
    };

    let mut ok = true;
    // Confirmation equality is checked on the raw values, before lowercasing.
    if form.email.as_deref() != form.email_confirmation.as_deref() {
        errors.push(fields::EMAIL, messages::EMAIL_CONFIRMATION);
        ok = false;
    }
    if raw.chars().count() > EmailAddress::MAX {
        errors.push(fields::EMAIL, messages::EMAIL_MAX);
        ok = false;
    }
    if !EmailAddress::syntax_ok(&raw.to_lowercase()) {
        errors.push(fields::EMAIL, messages::EMAIL_INVALID);
        ok = false;
    }

    if ok { EmailAddress::new(raw).ok() } else { None }
}

fn check_password(form: &SignupForm, errors: &mut ValidationErrors) -> Option<Zeroizing<String>> {
    let Some(raw) = provided(form.password.as_ref()) else {
        errors.push(fields::PASSWORD, messages::PASSWORD_REQUIRED);
        return None;
    };

    let mut ok = true;
    if form.password.as_deref() != form.password_confirmation.as_deref() {
        errors.push(fields::PASSWORD, messages::PASSWORD_CONFIRMATION);
        ok = false;
    }
    if raw.chars().count() < PASSWORD_MIN_LEN {
        errors.push(fields::PASSWORD, messages::PASSWORD_MIN);
        ok = false;
    }

    ok.then(|| Zeroizing::new(raw.to_owned()))
}

fn check_terms(form: &SignupForm, errors: &mut ValidationErrors) {
    if provided(form.terms.as_ref()).is_none() {
        errors.push(fields::TERMS, messages::TERMS_REQUIRED);
    }
}

fn check_optional(
    value: Option<&String>,
    field: &str,
    max: usize,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let raw = provided(value)?;
    if raw.chars().count() > max {
        errors.push(field, message);
        return None;
    }
    Some(raw.to_owned())
}

impl SignupForm {
    /// Apply the local rule set.
    ///
    /// Returns the normalised field set when every rule passes, otherwise the
    /// full set of field-scoped messages collected in one pass. Uniqueness
    /// against existing users is the registration service's concern.
    pub fn validate(&self) -> Result<ValidatedSignup, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let full_name = check_full_name(self, &mut errors);
        let username = check_username(self, &mut errors);
        let email = check_email(self, &mut errors);
        let password = check_password(self, &mut errors);
        check_terms(self, &mut errors);

        let contact = ContactDetails {
            phone_number: check_optional(
                self.phone_number.as_ref(),
                fields::PHONE_NUMBER,
                PHONE_NUMBER_MAX_LEN,
                messages::PHONE_NUMBER_MAX,
                &mut errors,
            ),
            address: check_optional(
                self.address.as_ref(),
                fields::ADDRESS,
                ADDRESS_MAX_LEN,
                messages::ADDRESS_MAX,
                &mut errors,
            ),
            city: check_optional(
                self.city.as_ref(),
                fields::CITY,
                CITY_MAX_LEN,
                messages::CITY_MAX,
                &mut errors,
            ),
            state: check_optional(
                self.state.as_ref(),
                fields::STATE,
                STATE_MAX_LEN,
                messages::STATE_MAX,
                &mut errors,
            ),
            zip_code: check_optional(
                self.zip_code.as_ref(),
                fields::ZIP_CODE,
                ZIP_CODE_MAX_LEN,
                messages::ZIP_CODE_MAX,
                &mut errors,
            ),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        match (full_name, username, email, password) {
            (Some(full_name), Some(username), Some(email), Some(password)) => Ok(ValidatedSignup {
                full_name,
                username,
                email,
                password,
                contact,
            }),
            // Checks above record an error for every None; this arm is
            // unreachable once errors.is_empty() held.
            _ => Err(errors),
        }
    }
}
