//! Account signup backend.
//!
//! A single registration surface: validate the submitted form, create the
//! user with a salted Argon2id hash, publish a registration event for the
//! notification pipeline, and redirect back to the form with one-time flash
//! values. Laid out hexagonally: `domain` holds the use-case and ports,
//! `inbound` the HTTP adapter, `outbound` the infrastructure adapters.

pub mod domain;
pub mod inbound;
pub mod outbound;
