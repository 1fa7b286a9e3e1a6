//! SMTP delivery using [`lettre`].

use datareq_core::notify::{Message, Notifier};
use lettre::{
  Address, SmtpTransport, Transport,
  message::{Mailbox, header::ContentType},
  transport::smtp::authentication::Credentials,
};

use crate::{Error, Result};

/// Relay and sender settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
  /// Relay host, e.g. `smtp.gmail.com`. The connection uses implicit TLS
  /// negotiation as chosen by [`SmtpTransport::relay`].
  pub host:         String,
  pub port:         u16,
  pub username:     Option<String>,
  pub password:     Option<String>,
  /// Display name of the sender, e.g. `MMC Wellness IT`.
  pub from_name:    String,
  pub from_address: String,
}

/// Sends each [`Message`] as a `text/html` e-mail.
///
/// The blocking lettre transport runs on tokio's blocking pool.
#[derive(Clone)]
pub struct SmtpNotifier {
  transport: SmtpTransport,
  from:      Mailbox,
}

impl SmtpNotifier {
  pub fn new(config: SmtpConfig) -> Result<Self> {
    let from = Mailbox::new(
      Some(config.from_name),
      parse_address(&config.from_address)?,
    );

    let mut builder = SmtpTransport::relay(&config.host)?.port(config.port);
    if let Some(username) = config.username {
      builder = builder
        .credentials(Credentials::new(username, config.password.unwrap_or_default()));
    }

    tracing::info!(host = %config.host, port = config.port, from = %from, "smtp relay configured");
    Ok(Self { transport: builder.build(), from })
  }

  /// Build the lettre message for `message`, without sending it.
  pub fn build(&self, message: Message) -> Result<lettre::Message> {
    let to = Mailbox::new(None, parse_address(&message.to)?);
    Ok(
      lettre::Message::builder()
        .from(self.from.clone())
        .to(to)
        .subject(message.subject)
        .header(ContentType::TEXT_HTML)
        .body(message.html)?,
    )
  }
}

impl Notifier for SmtpNotifier {
  type Error = Error;

  async fn send(&self, message: Message) -> Result<()> {
    let email = self.build(message)?;
    let transport = self.transport.clone();

    tokio::task::spawn_blocking(move || transport.send(&email))
      .await??;
    Ok(())
  }
}

fn parse_address(address: &str) -> Result<Address> {
  address.trim().parse().map_err(|source| Error::Address {
    address: address.to_owned(),
    source,
  })
}
