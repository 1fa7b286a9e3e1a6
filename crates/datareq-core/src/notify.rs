//! The `Notifier` trait and fire-and-forget dispatch.
//!
//! Notifications are best-effort: by the time one is dispatched, the change it
//! describes has already been committed, so a failed send is logged and
//! otherwise ignored.

use std::{convert::Infallible, future::Future, sync::Arc};

use tokio::{sync::mpsc, task::JoinHandle};

/// A rendered notification addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub to:      String,
  pub subject: String,
  /// HTML body.
  pub html:    String,
}

/// A transport capable of delivering a [`Message`].
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send(
    &self,
    message: Message,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Send `message` on a background task.
///
/// Failures are logged; the returned handle only exists so that callers that
/// care (tests, shutdown) can wait for the attempt to finish.
pub fn dispatch<N>(notifier: Arc<N>, message: Message) -> JoinHandle<()>
where
  N: Notifier + 'static,
{
  tokio::spawn(async move {
    let to = message.to.clone();
    let subject = message.subject.clone();
    match notifier.send(message).await {
      Ok(()) => tracing::debug!(%to, %subject, "notification sent"),
      Err(e) => tracing::warn!(%to, %subject, error = %e, "notification failed"),
    }
  })
}

// ─── Channel notifier ────────────────────────────────────────────────────────

/// Forwards every message into an unbounded channel.
///
/// Useful in tests and when embedding the workflow in a process that delivers
/// mail some other way. Once every clone of the notifier is dropped, the
/// receiver observes the channel closing.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  tx: mpsc::UnboundedSender<Message>,
}

impl ChannelNotifier {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }
}

impl Notifier for ChannelNotifier {
  type Error = Infallible;

  async fn send(&self, message: Message) -> Result<(), Infallible> {
    // A dropped receiver just means nobody is listening any more.
    let _ = self.tx.send(message);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("mailbox unavailable")]
  struct Unavailable;

  struct FailingNotifier;

  impl Notifier for FailingNotifier {
    type Error = Unavailable;

    async fn send(&self, _message: Message) -> Result<(), Unavailable> {
      Err(Unavailable)
    }
  }

  fn message() -> Message {
    Message {
      to:      "ops@example.com".into(),
      subject: "hello".into(),
      html:    "<p>hi</p>".into(),
    }
  }

  #[tokio::test]
  async fn dispatch_delivers_through_channel() {
    let (notifier, mut rx) = ChannelNotifier::new();
    dispatch(Arc::new(notifier), message()).await.unwrap();
    assert_eq!(rx.recv().await, Some(message()));
    assert!(rx.recv().await.is_none());
  }

  #[tokio::test]
  async fn dispatch_swallows_send_failures() {
    let handle = dispatch(Arc::new(FailingNotifier), message());
    // The task itself completes normally; the error is only logged.
    assert!(handle.await.is_ok());
  }
}
