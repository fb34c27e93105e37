//! Message struct with builder pattern.

use serde::{Deserialize, Serialize};

/// An email message.
///
/// Use the builder pattern to construct messages:
///
/// ```
/// use courier::Message;
///
/// let message = Message::new()
///     .from("sender@example.com")
///     .to("recipient@example.com")
///     .subject("Hello!")
///     .body("Plain text content");
/// ```
///
/// ## Fields
///
/// - `from` - Sender address
/// - `to` - Recipients. Only the first one is used as the delivery recipient
///   and it must be present before sending.
/// - `cc`, `bcc` - Carried along but never transmitted by the providers
/// - `subject`, `body` - Content; `body` is placed verbatim after the headers
/// - `html` - Ask API providers to send `body` as HTML as well
/// - `error` - Diagnostic from a previous attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    /// Sender address
    #[serde(skip_serializing_if = "String::is_empty")]
    pub from: String,
    /// Primary recipients
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    /// Carbon copy recipients
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    /// Blind carbon copy recipients
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    /// Subject line
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    /// Raw body text
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    /// Send the body as HTML (API providers only)
    pub html: bool,
    /// Error carried over from a prior attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Message {
    /// Create a new empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender address.
    pub fn from(mut self, addr: impl Into<String>) -> Self {
        self.from = addr.into();
        self
    }

    /// Add a recipient.
    ///
    /// Can be called multiple times, but only the first recipient is used
    /// for delivery.
    pub fn to(mut self, addr: impl Into<String>) -> Self {
        self.to.push(addr.into());
        self
    }

    /// Replace all recipients.
    pub fn put_to(mut self, addrs: Vec<String>) -> Self {
        self.to = addrs;
        self
    }

    /// Add a CC recipient.
    pub fn cc(mut self, addr: impl Into<String>) -> Self {
        self.cc.push(addr.into());
        self
    }

    /// Add a BCC recipient.
    pub fn bcc(mut self, addr: impl Into<String>) -> Self {
        self.bcc.push(addr.into());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Mark the body as HTML.
    pub fn html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    /// Attach a diagnostic from a previous attempt.
    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The delivery recipient: the first `to` address.
    pub fn recipient(&self) -> Option<&str> {
        self.to.first().map(String::as_str)
    }
}
