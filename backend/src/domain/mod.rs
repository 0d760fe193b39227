//! Domain primitives and the registration use-case.
//!
//! Purpose: keep signup semantics transport agnostic. Inbound adapters map
//! these types to HTTP; outbound adapters implement the ports over real
//! infrastructure. Types are immutable and document their invariants in
//! each type's Rustdoc.

pub mod error;
pub mod ports;
pub mod registration;
pub mod signup;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::registration::{RegistrationError, RegistrationEvent, RegistrationService};
pub use self::signup::{SignupForm, ValidatedSignup, ValidationErrors};
pub use self::user::{
    ContactDetails, EmailAddress, NewUser, PersonName, Role, User, UserValidationError, Username,
};
