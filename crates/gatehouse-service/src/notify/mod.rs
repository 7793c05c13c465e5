//! Notification dispatch implementations.

pub mod broadcast;

pub use broadcast::ChannelNotificationDispatcher;
