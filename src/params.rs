//! Delivery parameters and provider selection.
//!
//! [`Params`] says *how* to send: which provider, which credentials and, for
//! the SMTP family, which server. The provider is kept as a plain string so a
//! misconfigured selector still deserializes and is reported at send time.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MailError;

/// Recognized delivery providers.
///
/// The empty tag selects [`Provider::Smtp`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Direct SMTP over implicit TLS.
    #[default]
    Smtp,
    /// AWS-style SMTP relay. Not implemented.
    AwsSmtp,
    /// Amazon SES sending API.
    AwsSes,
    /// Log the message instead of sending it.
    Logger,
}

impl Provider {
    /// Every recognized provider.
    pub const ALL: [Provider; 4] = [
        Provider::Smtp,
        Provider::AwsSmtp,
        Provider::AwsSes,
        Provider::Logger,
    ];

    /// The configured tag for this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smtp => "smtp",
            Self::AwsSmtp => "aws_smtp",
            Self::AwsSes => "aws_ses",
            Self::Logger => "logger",
        }
    }

    /// Whether the provider talks to an SMTP server and needs `server`.
    pub fn is_smtp_family(&self) -> bool {
        matches!(self, Self::Smtp | Self::AwsSmtp)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = MailError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_lowercase().as_str() {
            "" | "smtp" => Ok(Self::Smtp),
            "aws_smtp" => Ok(Self::AwsSmtp),
            "aws_ses" | "amazon_ses" => Ok(Self::AwsSes),
            "logger" => Ok(Self::Logger),
            _ => Err(MailError::NoProviderSelected(tag.to_string())),
        }
    }
}

/// How to send a message.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Provider tag; empty means direct SMTP.
    pub provider: String,
    /// Username or access key.
    pub id: String,
    /// Password or secret key.
    pub password: String,
    /// `host:port` of the SMTP endpoint (endpoint URL override for SES).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub server: String,
}

impl Params {
    /// Create empty params (direct SMTP, no credentials).
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a provider.
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = provider.as_str().to_string();
        self
    }

    /// Set the provider tag verbatim.
    pub fn provider_tag(mut self, tag: impl Into<String>) -> Self {
        self.provider = tag.into();
        self
    }

    /// Set username/access key and password/secret.
    pub fn credentials(mut self, id: impl Into<String>, password: impl Into<String>) -> Self {
        self.id = id.into();
        self.password = password.into();
        self
    }

    /// Set the server address (`host:port`).
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Resolve the provider tag.
    pub fn selected_provider(&self) -> Result<Provider, MailError> {
        self.provider.parse()
    }

    /// Load params from environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `EMAIL_PROVIDER` | `provider` (default: direct SMTP) |
    /// | `EMAIL_USERNAME` | `id` |
    /// | `EMAIL_PASSWORD` | `password` |
    /// | `EMAIL_SERVER` | `server`, required for SMTP providers |
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load params through a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MailError> {
        let params = Self {
            provider: lookup("EMAIL_PROVIDER").unwrap_or_default(),
            id: lookup("EMAIL_USERNAME").unwrap_or_default(),
            password: lookup("EMAIL_PASSWORD").unwrap_or_default(),
            server: lookup("EMAIL_SERVER").unwrap_or_default(),
        };

        let provider = params.selected_provider().map_err(|_| {
            MailError::Configuration(format!(
                "Unknown EMAIL_PROVIDER: {}. Valid providers are: {}",
                params.provider,
                Provider::ALL.map(|p| p.as_str()).join(", ")
            ))
        })?;

        if provider.is_smtp_family() && params.server.is_empty() {
            return Err(MailError::Configuration(format!(
                "EMAIL_SERVER not set (required for {provider})"
            )));
        }

        tracing::debug!(provider = %provider, "Loaded email params from environment");
        Ok(params)
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Params")
            .field("provider", &self.provider)
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .field("server", &self.server)
            .finish()
    }
}
