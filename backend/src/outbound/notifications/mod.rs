//! Fire-and-forget registration event publishing.
//!
//! Implements the `RegistrationNotifier` port over an unbounded Tokio
//! channel: the handler's send never blocks or fails the request, and a
//! consumer task drains events out-of-band. The consumer here stops at
//! structured logging; real verification-email delivery sits behind it.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::ports::RegistrationNotifier;
use crate::domain::registration::RegistrationEvent;

/// Channel-backed implementation of the `RegistrationNotifier` port.
#[derive(Clone)]
pub struct ChannelRegistrationNotifier {
    events: mpsc::UnboundedSender<RegistrationEvent>,
}

impl ChannelRegistrationNotifier {
    /// Create a notifier and hand back the receiving end for a consumer.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RegistrationEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { events }, receiver)
    }

    /// Create a notifier with the logging consumer already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn() -> Self {
        let (notifier, receiver) = Self::new();
        drop(spawn_logging_consumer(receiver));
        notifier
    }
}

impl RegistrationNotifier for ChannelRegistrationNotifier {
    fn notify(&self, event: RegistrationEvent) {
        if self.events.send(event).is_err() {
            // The consumer is gone; registration itself already succeeded.
            warn!("registration event dropped: notification consumer is no longer running");
        }
    }
}

/// Drain registration events, logging each dispatch.
pub fn spawn_logging_consumer(
    mut receiver: mpsc::UnboundedReceiver<RegistrationEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            info!(
                user_id = %event.user_id,
                username = %event.username,
                email = %event.email,
                "dispatching verification email for new registration"
            );
        }
    })
}
