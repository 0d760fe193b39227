//! Port abstraction for publishing registration events.

use crate::domain::registration::RegistrationEvent;

/// Port for the downstream notification pipeline.
///
/// Publishing is fire-and-forget: the handler observes no result and must
/// never block on delivery. Adapters own buffering and retry policy.
pub trait RegistrationNotifier: Send + Sync {
    /// Hand a registration event to the notification pipeline.
    fn notify(&self, event: RegistrationEvent);
}
