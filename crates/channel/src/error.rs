//! Channel error types.

use thiserror::Error;

/// Errors that can occur when publishing or consuming lifecycle events.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Publishing an event to the channel failed.
    #[error("publish failed: {0}")]
    Publish(String),

    /// A consumer failed to process an event.
    ///
    /// The runner logs this and acknowledges the event anyway; it never
    /// triggers redelivery.
    #[error("consumer '{consumer}' failed: {message}")]
    Consumer {
        consumer: &'static str,
        message: String,
    },
}

impl ChannelError {
    /// Builds the error a consumer reports when event handling fails.
    pub fn consumer(consumer: &'static str, message: impl Into<String>) -> Self {
        ChannelError::Consumer {
            consumer,
            message: message.into(),
        }
    }
}

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
