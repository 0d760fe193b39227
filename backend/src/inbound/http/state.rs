//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain use-case and remain testable without I/O.

use std::sync::Arc;

use crate::domain::RegistrationService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration use-case over injected collaborator ports.
    pub registration: Arc<RegistrationService>,
}

impl HttpState {
    /// Construct state around a registration service.
    pub fn new(registration: Arc<RegistrationService>) -> Self {
        Self { registration }
    }
}
