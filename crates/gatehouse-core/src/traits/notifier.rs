//! Notification dispatch trait.

use async_trait::async_trait;

/// Best-effort broadcast notification channel.
///
/// Implementations must swallow and log delivery failures; `broadcast`
/// never returns an error and callers never wait on delivery. Lifecycle
/// operations stay unaffected when the channel is unavailable.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Broadcasts a message to all connected consumers.
    async fn broadcast(&self, message: &str);
}
