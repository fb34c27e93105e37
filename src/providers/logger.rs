//! Logger provider that only logs messages.
//!
//! Useful when debugging configuration: it shows what would be sent without
//! opening any connection. Never selected unless asked for by tag.

use async_trait::async_trait;

use crate::error::MailError;
use crate::message::Message;
use crate::params::Params;
use crate::sender::{require_recipient, DeliveryResult, Sender};

/// Logger provider that emits tracing events for messages.
pub struct LoggerSender {
    /// If true, log full message details. If false, just log recipient summary.
    log_full: bool,
}

impl LoggerSender {
    /// Create a logger with brief output (just recipient and subject).
    pub fn new() -> Self {
        Self { log_full: false }
    }

    /// Create a logger with full message details.
    pub fn full() -> Self {
        Self { log_full: true }
    }

    /// Set whether to log full message details.
    pub fn log_full(mut self, full: bool) -> Self {
        self.log_full = full;
        self
    }
}

impl Default for LoggerSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sender for LoggerSender {
    async fn send(&self, message: &Message, _params: &Params) -> Result<DeliveryResult, MailError> {
        let to = require_recipient(message)?;
        let message_id = uuid::Uuid::new_v4().to_string();

        if self.log_full {
            tracing::info!(
                message_id = %message_id,
                from = %message.from,
                to = %to,
                cc = ?message.cc,
                bcc = ?message.bcc,
                subject = %message.subject,
                html = message.html,
                "Message logged (full)"
            );
            tracing::debug!(body = %message.body, "Body");
        } else {
            tracing::info!(
                message_id = %message_id,
                to = %to,
                subject = %message.subject,
                "Message logged"
            );
        }

        Ok(DeliveryResult::new(message_id))
    }

    fn provider_name(&self) -> &'static str {
        "logger"
    }
}
