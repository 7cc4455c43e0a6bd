//! Operator notifications.
//!
//! This crate provides:
//! - [`Notifier`]: "send a text message to a destination", the only channel
//!   operation the pipeline uses
//! - [`TelegramNotifier`]: Bot API implementation
//! - [`format_alert`] / [`format_failure`]: message templates

mod message;
mod telegram;

use async_trait::async_trait;
use jobwatch_shared::Result;

pub use message::{format_alert, format_failure};
pub use telegram::TelegramNotifier;

/// Delivers text messages to a chat destination.
///
/// One successful call is one message seen by the operator. Implementations
/// do not retry or queue.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `message` to `destination`. Failures are `Delivery` errors.
    async fn send(&self, destination: &str, message: &str) -> Result<()>;
}
