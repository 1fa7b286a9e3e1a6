//! A notifier that writes messages to the log instead of sending them.

use std::convert::Infallible;

use datareq_core::notify::{Message, Notifier};

/// Logs recipient and subject at `info`, the body at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  type Error = Infallible;

  async fn send(&self, message: Message) -> Result<(), Infallible> {
    tracing::info!(to = %message.to, subject = %message.subject, "mail (not sent)");
    tracing::debug!(body = %message.html, "mail body");
    Ok(())
  }
}
