//! In-process broadcast notification dispatcher.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use gatehouse_core::traits::NotificationDispatcher;

/// Default channel capacity before slow consumers start lagging.
const DEFAULT_CAPACITY: usize = 256;

/// Fans lifecycle announcements out to all subscribed consumers over a
/// tokio broadcast channel.
///
/// Delivery is best-effort: a send with no subscribers, or to lagged
/// subscribers, is logged and dropped. Callers never observe a failure.
#[derive(Debug, Clone)]
pub struct ChannelNotificationDispatcher {
    /// Broadcast channel sender.
    sender: broadcast::Sender<String>,
}

impl ChannelNotificationDispatcher {
    /// Creates a dispatcher with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a dispatcher with an explicit channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes a new consumer to the notification stream.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }
}

impl Default for ChannelNotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationDispatcher for ChannelNotificationDispatcher {
    async fn broadcast(&self, message: &str) {
        match self.sender.send(message.to_string()) {
            Ok(receivers) => {
                debug!(receivers, message, "Notification broadcast");
            }
            Err(_) => {
                // No connected consumers; the message is dropped.
                debug!(message, "Notification dropped: no subscribers");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_broadcast() {
        let dispatcher = ChannelNotificationDispatcher::new();
        let mut rx = dispatcher.subscribe();

        dispatcher.broadcast("New user 'alice' has been created.").await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received, "New user 'alice' has been created.");
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_is_swallowed() {
        let dispatcher = ChannelNotificationDispatcher::new();
        // Must not panic or error with nobody listening.
        dispatcher.broadcast("User 'bob' has been deleted.").await;
    }
}
