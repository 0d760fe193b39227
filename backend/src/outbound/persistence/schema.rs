//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// Registered user accounts.
    ///
    /// `username` and `email` carry UNIQUE indexes; the validator pre-check
    /// is advisory and the indexes are the authority.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique account handle (max 100 characters).
        username -> Varchar,
        /// Unique lowercase email address (max 255 characters).
        email -> Varchar,
        /// Given name derived from the submitted full name.
        first_name -> Varchar,
        /// Family name; empty string when the full name had no space.
        last_name -> Varchar,
        /// PHC-formatted password hash.
        password_hash -> Text,
        /// Optional phone number (max 20 characters).
        phone_number -> Nullable<Varchar>,
        /// Optional street address (max 255 characters).
        address -> Nullable<Varchar>,
        /// Optional city (max 100 characters).
        city -> Nullable<Varchar>,
        /// Optional state or region (max 100 characters).
        state -> Nullable<Varchar>,
        /// Optional postal code (max 20 characters).
        zip_code -> Nullable<Varchar>,
        /// Account role string, `user` for signups.
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}
