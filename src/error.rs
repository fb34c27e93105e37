//! Error types for courier.
//!
//! Every failure carries the stage it happened in. SMTP failures are tagged
//! with an [`SmtpStage`], collaborator failures with the provider name, and
//! the dispatcher adds one more layer naming the selected provider.
//! [`MailError::kind`] looks through that outer layer so callers can branch
//! on what actually went wrong.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when sending emails.
#[derive(Debug, Error)]
pub enum MailError {
    /// The provider selector did not match any recognized tag.
    #[error("No email provider was selected (got {0:?})")]
    NoProviderSelected(String),

    /// The selected provider is a stub.
    #[error("{0} not implemented yet")]
    NotImplemented(&'static str),

    /// A step of the SMTP session failed.
    #[error("{stage} | {source}")]
    Smtp {
        stage: SmtpStage,
        #[source]
        source: SmtpError,
    },

    /// Failure surfaced from an external sending API.
    #[error("{provider} | {source}")]
    Delegate {
        provider: &'static str,
        #[source]
        source: Box<MailError>,
    },

    /// Dispatch-layer wrap around whatever the selected provider returned.
    #[error("switch provider {provider:?} | {source}")]
    Dispatch {
        provider: String,
        #[source]
        source: Box<MailError>,
    },

    /// The whole transaction did not finish within the configured deadline.
    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration error (missing env var, invalid value, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing required field (e.g., recipient address).
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Provider-specific error with details.
    #[error("Provider error ({provider}): {message}")]
    ProviderError {
        provider: &'static str,
        message: String,
        /// Optional HTTP status code
        status: Option<u16>,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Coarse classification of a [`MailError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoProviderSelected,
    NotImplemented,
    /// TLS dial / connect failure.
    Transport,
    /// Server greeting missing or rejected.
    ProtocolClient,
    Auth,
    /// Sender or recipient rejected.
    Envelope,
    /// DATA open, write or close failure.
    Data,
    Delegate,
    Timeout,
    Configuration,
    InvalidMessage,
}

impl MailError {
    /// Create a provider-specific error.
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider,
            message: message.into(),
            status: None,
        }
    }

    /// Create a provider error with HTTP status.
    pub fn provider_with_status(
        provider: &'static str,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        Self::ProviderError {
            provider,
            message: message.into(),
            status: Some(status),
        }
    }

    /// Tag an SMTP failure with the stage it happened in.
    pub fn smtp(stage: SmtpStage, source: impl Into<SmtpError>) -> Self {
        Self::Smtp {
            stage,
            source: source.into(),
        }
    }

    /// Wrap a collaborator failure.
    pub fn delegate(provider: &'static str, source: MailError) -> Self {
        Self::Delegate {
            provider,
            source: Box::new(source),
        }
    }

    /// Wrap a provider failure at the dispatch layer.
    pub fn dispatch(provider: impl Into<String>, source: MailError) -> Self {
        Self::Dispatch {
            provider: provider.into(),
            source: Box::new(source),
        }
    }

    /// The SMTP stage that failed, if this is an SMTP session error.
    pub fn stage(&self) -> Option<SmtpStage> {
        match self.root() {
            Self::Smtp { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error with the dispatch wrap removed.
    pub fn root(&self) -> &MailError {
        match self {
            Self::Dispatch { source, .. } => source.root(),
            other => other,
        }
    }

    /// Classify the error, looking through the dispatch wrap.
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            Self::NoProviderSelected(_) => ErrorKind::NoProviderSelected,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::Smtp { stage, .. } => stage.kind(),
            Self::Delegate { .. } => ErrorKind::Delegate,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::MissingField(_) => ErrorKind::InvalidMessage,
            Self::ProviderError { .. } | Self::HttpError(_) | Self::JsonError(_) => {
                ErrorKind::Delegate
            }
            Self::Dispatch { source, .. } => source.kind(),
        }
    }
}

#[cfg(feature = "_http")]
impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

/// Steps of an SMTP session, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmtpStage {
    /// TCP connect + TLS handshake.
    Dial,
    /// Reading the server greeting.
    Greeting,
    /// EHLO and AUTH PLAIN.
    Auth,
    /// MAIL FROM.
    Mail,
    /// RCPT TO.
    Rcpt,
    /// DATA command.
    Data,
    /// Streaming the payload.
    Write,
    /// Terminating the payload and reading the final reply.
    Close,
}

impl SmtpStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dial => "tls dial",
            Self::Greeting => "smtp greeting",
            Self::Auth => "auth",
            Self::Mail => "mail from",
            Self::Rcpt => "rcpt to",
            Self::Data => "data",
            Self::Write => "data write",
            Self::Close => "data close",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Dial => ErrorKind::Transport,
            Self::Greeting => ErrorKind::ProtocolClient,
            Self::Auth => ErrorKind::Auth,
            Self::Mail | Self::Rcpt => ErrorKind::Envelope,
            Self::Data | Self::Write | Self::Close => ErrorKind::Data,
        }
    }
}

impl fmt::Display for SmtpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of an SMTP stage failure.
#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    /// The server answered with an unexpected code.
    #[error("{code} {message}")]
    Reply { code: u16, message: String },

    #[error("Malformed reply line: {0:?}")]
    MalformedReply(String),

    #[error("Connection closed by server")]
    ConnectionClosed,

    /// A command argument would have broken the line framing.
    #[error("Line contains CR or LF: {0:?}")]
    InvalidLine(String),
}
