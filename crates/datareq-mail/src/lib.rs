//! Mail delivery for datareq notifications.
//!
//! [`SmtpNotifier`] delivers over SMTP via [`lettre`]; [`LogNotifier`] only
//! writes messages to the log and is used when no SMTP relay is configured.
//! [`Mailer`] picks between the two at startup.

mod console;
mod smtp;

pub mod error;

pub use error::{Error, Result};
pub use console::LogNotifier;
pub use smtp::{SmtpConfig, SmtpNotifier};

use datareq_core::notify::{Message, Notifier};

/// The notifier selected from configuration.
#[derive(Clone)]
pub enum Mailer {
  Smtp(SmtpNotifier),
  Log(LogNotifier),
}

impl Mailer {
  /// SMTP when `smtp` is present, log-only otherwise.
  pub fn from_config(smtp: Option<SmtpConfig>) -> Result<Self> {
    match smtp {
      Some(cfg) => Ok(Self::Smtp(SmtpNotifier::new(cfg)?)),
      None => {
        tracing::warn!("no SMTP relay configured; notifications will only be logged");
        Ok(Self::Log(LogNotifier))
      }
    }
  }
}

impl Notifier for Mailer {
  type Error = Error;

  async fn send(&self, message: Message) -> Result<()> {
    match self {
      Self::Smtp(n) => n.send(message).await,
      Self::Log(n) => n.send(message).await.map_err(|never| match never {}),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn missing_smtp_config_falls_back_to_log() {
    let mailer = Mailer::from_config(None).unwrap();
    assert!(matches!(mailer, Mailer::Log(_)));

    let sent = mailer
      .send(Message {
        to:      "it@example.com".into(),
        subject: "New Data Request Submitted".into(),
        html:    "<p>hi</p>".into(),
      })
      .await;
    assert!(sent.is_ok());
  }
}
