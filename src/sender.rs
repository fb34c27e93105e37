//! Sender trait and delivery result types.
//!
//! # Why `async_trait`?
//!
//! The dispatcher stores every provider as an `Arc<dyn Sender>` and picks one
//! at call time from [`Params::provider`](crate::Params). Native async trait
//! methods are not object-safe, so the trait goes through `#[async_trait]`,
//! which boxes the future once per call. Sending mail is dominated by network
//! round-trips, so the allocation does not show up.
//!
//! Callers who know their provider statically can call
//! [`Sender::send`] on the concrete type directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;
use crate::message::Message;
use crate::params::Params;

/// Result of a successful delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// Message ID or result token assigned by the provider
    pub message_id: String,
    /// Optional provider-specific response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_response: Option<serde_json::Value>,
}

impl DeliveryResult {
    /// Create a new delivery result with just a message ID.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            provider_response: None,
        }
    }

    /// Create a delivery result with provider response.
    pub fn with_response(message_id: impl Into<String>, response: serde_json::Value) -> Self {
        Self {
            message_id: message_id.into(),
            provider_response: Some(response),
        }
    }
}

/// A delivery provider.
///
/// Each call is a single-shot operation over its inputs: implementations
/// must not keep connections or session state between calls.
///
/// # Example
///
/// ```ignore
/// use courier::{Message, Params, Sender};
/// use courier::providers::SmtpSender;
///
/// let message = Message::new()
///     .from("sender@example.com")
///     .to("recipient@example.com")
///     .subject("Hello")
///     .body("World");
/// let params = Params::new()
///     .credentials("user", "pass")
///     .server("mail.example.com:465");
///
/// let result = SmtpSender::new().send(&message, &params).await?;
/// println!("Sent with ID: {}", result.message_id);
/// ```
#[async_trait]
pub trait Sender: Send + Sync {
    /// Send a single message.
    ///
    /// `message.to` must hold at least one address; only the first is used.
    async fn send(&self, message: &Message, params: &Params) -> Result<DeliveryResult, MailError>;

    /// Get the provider name (for logging/debugging).
    fn provider_name(&self) -> &'static str {
        "unknown"
    }
}

/// Fetch the delivery recipient or fail with `MissingField("to")`.
pub(crate) fn require_recipient(message: &Message) -> Result<&str, MailError> {
    message.recipient().ok_or(MailError::MissingField("to"))
}
