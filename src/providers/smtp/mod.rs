//! Direct SMTP provider over implicit TLS.
//!
//! One call runs one complete SMTP session against one recipient:
//!
//! ```text
//! dial (TLS) → greeting → EHLO + AUTH PLAIN → MAIL FROM → RCPT TO
//!            → DATA → payload → "." → QUIT
//! ```
//!
//! Each step that fails aborts the session and returns
//! [`MailError::Smtp`] tagged with its [`SmtpStage`]. QUIT is only sent after
//! the server accepted the message; if anything before that fails the
//! connection is simply dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use courier::providers::SmtpSender;
//! use std::time::Duration;
//!
//! let sender = SmtpSender::new().timeout(Duration::from_secs(30));
//! ```
//!
//! # Security
//!
//! [`TlsDialer`] does not verify the server certificate. Use a custom
//! [`Dialer`] when that matters.

mod client;
mod tls;

pub use client::{DataWriter, Reply, SmtpClient};
pub use tls::{Dialer, TlsDialer};

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{MailError, SmtpStage};
use crate::message::Message;
use crate::params::Params;
use crate::sender::{require_recipient, DeliveryResult, Sender};

const DEFAULT_HELLO_NAME: &str = "localhost";

/// SMTP email provider.
pub struct SmtpSender<D = TlsDialer> {
    dialer: D,
    hello_name: String,
    timeout: Option<Duration>,
}

impl SmtpSender<TlsDialer> {
    /// Create an SMTP sender that dials with implicit TLS.
    pub fn new() -> Self {
        Self::with_dialer(TlsDialer)
    }
}

impl Default for SmtpSender<TlsDialer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dialer> SmtpSender<D> {
    /// Create an SMTP sender with a custom transport.
    pub fn with_dialer(dialer: D) -> Self {
        Self {
            dialer,
            hello_name: DEFAULT_HELLO_NAME.to_string(),
            timeout: None,
        }
    }

    /// Name announced in EHLO/HELO (default: `localhost`).
    pub fn hello_name(mut self, name: impl Into<String>) -> Self {
        self.hello_name = name.into();
        self
    }

    /// Bound the whole session (connect, handshake, every command).
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    async fn session(
        &self,
        message: &Message,
        to: &str,
        payload: &str,
        params: &Params,
    ) -> Result<DeliveryResult, MailError> {
        let host = split_host(&params.server);
        debug!(server = %params.server, host, "Opening SMTP session");

        let stream = self
            .dialer
            .dial(&params.server, host)
            .await
            .map_err(|e| MailError::smtp(SmtpStage::Dial, e))?;

        let mut client = SmtpClient::new(stream, host, &self.hello_name)
            .await
            .map_err(|e| MailError::smtp(SmtpStage::Greeting, e))?;

        client
            .auth_plain(&params.id, &params.password)
            .await
            .map_err(|e| MailError::smtp(SmtpStage::Auth, e))?;

        client
            .mail(&message.from)
            .await
            .map_err(|e| MailError::smtp(SmtpStage::Mail, e))?;

        client
            .rcpt(to)
            .await
            .map_err(|e| MailError::smtp(SmtpStage::Rcpt, e))?;

        let mut writer = client
            .data()
            .await
            .map_err(|e| MailError::smtp(SmtpStage::Data, e))?;

        writer
            .write(payload.as_bytes())
            .await
            .map_err(|e| MailError::smtp(SmtpStage::Write, e))?;

        let reply = writer
            .close()
            .await
            .map_err(|e| MailError::smtp(SmtpStage::Close, e))?;

        // The message is already accepted at this point.
        if let Err(e) = client.quit().await {
            debug!(error = %e, "QUIT failed");
        }

        let message_id = match reply.text() {
            text if text.is_empty() => uuid::Uuid::new_v4().to_string(),
            text => text,
        };
        Ok(DeliveryResult::new(message_id))
    }
}

#[async_trait]
impl<D: Dialer + 'static> Sender for SmtpSender<D> {
    async fn send(&self, message: &Message, params: &Params) -> Result<DeliveryResult, MailError> {
        let to = require_recipient(message)?;
        let payload = render_payload(message)?;

        let session = self.session(message, to, &payload, params);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, session)
                .await
                .map_err(|_| MailError::Timeout(limit))?,
            None => session.await,
        }
    }

    fn provider_name(&self) -> &'static str {
        "smtp"
    }
}

/// Render the wire payload: `From`, `To` (first recipient) and `Subject`
/// headers, a blank line, then the body verbatim.
pub fn render_payload(message: &Message) -> Result<String, MailError> {
    let to = require_recipient(message)?;
    let headers = [
        ("From", message.from.as_str()),
        ("To", to),
        ("Subject", message.subject.as_str()),
    ];

    let mut payload = String::with_capacity(message.body.len() + 128);
    for (name, value) in headers {
        payload.push_str(name);
        payload.push_str(": ");
        payload.push_str(value);
        payload.push_str("\r\n");
    }
    payload.push_str("\r\n");
    payload.push_str(&message.body);
    Ok(payload)
}

/// Bare host of a `host:port` server address.
///
/// Bracketed IPv6 literals (`[::1]:465`) are unwrapped. Anything that is not
/// a valid `host:port` pair yields an empty host instead of an error; the
/// dial step reports the real problem.
pub fn split_host(server: &str) -> &str {
    if let Some(rest) = server.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((host, tail)) if tail.starts_with(':') && !tail[1..].contains(':') => host,
            _ => "",
        };
    }

    match server.rsplit_once(':') {
        Some((host, _)) if !host.contains(':') && !host.contains('[') => host,
        _ => "",
    }
}
