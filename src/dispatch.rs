//! Provider selection.
//!
//! A [`Dispatcher`] holds one [`Sender`] per [`Provider`] and routes each
//! call by the provider tag in [`Params`]. Selection happens per call; the
//! dispatcher itself keeps no state between sends.
//!
//! ```rust,ignore
//! use courier::{Dispatcher, Message, Params};
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.send(&message, &Params::from_env()?).await?;
//! ```

use std::sync::Arc;

use tracing::Instrument;

#[cfg(feature = "metrics")]
use std::time::Instant;

use crate::error::MailError;
use crate::message::Message;
use crate::params::{Params, Provider};
use crate::providers::{AwsSmtpSender, LoggerSender};
use crate::sender::{DeliveryResult, Sender};

/// Routes messages to the provider named in [`Params::provider`].
///
/// Every failure is wrapped in [`MailError::Dispatch`] so the caller can
/// tell which selector was in effect; success passes through unchanged.
#[derive(Clone)]
pub struct Dispatcher {
    smtp: Arc<dyn Sender>,
    aws_smtp: Arc<dyn Sender>,
    aws_ses: Arc<dyn Sender>,
    logger: Arc<dyn Sender>,
}

impl Dispatcher {
    /// Dispatcher with the built-in providers.
    pub fn new() -> Self {
        Self {
            smtp: default_smtp(),
            aws_smtp: Arc::new(AwsSmtpSender::new()),
            aws_ses: default_aws_ses(),
            logger: Arc::new(LoggerSender::new()),
        }
    }

    /// Replace the direct SMTP provider.
    pub fn smtp(mut self, sender: impl Sender + 'static) -> Self {
        self.smtp = Arc::new(sender);
        self
    }

    /// Replace the SMTP relay provider.
    pub fn aws_smtp(mut self, sender: impl Sender + 'static) -> Self {
        self.aws_smtp = Arc::new(sender);
        self
    }

    /// Replace the SES provider.
    pub fn aws_ses(mut self, sender: impl Sender + 'static) -> Self {
        self.aws_ses = Arc::new(sender);
        self
    }

    /// Replace the logger provider.
    pub fn logger(mut self, sender: impl Sender + 'static) -> Self {
        self.logger = Arc::new(sender);
        self
    }

    /// The sender registered for `provider`.
    pub fn sender_for(&self, provider: Provider) -> &Arc<dyn Sender> {
        match provider {
            Provider::Smtp => &self.smtp,
            Provider::AwsSmtp => &self.aws_smtp,
            Provider::AwsSes => &self.aws_ses,
            Provider::Logger => &self.logger,
        }
    }

    /// Send one message through the provider selected by `params`.
    ///
    /// An unrecognized provider tag fails with a wrapped
    /// [`MailError::NoProviderSelected`] before any I/O.
    pub async fn send(&self, message: &Message, params: &Params) -> Result<DeliveryResult, MailError> {
        let provider = params
            .selected_provider()
            .map_err(|e| MailError::dispatch(&params.provider, e))?;
        let sender = self.sender_for(provider);

        let span = tracing::info_span!(
            "courier.send",
            provider = provider.as_str(),
            to = message.recipient().unwrap_or_default(),
            subject = %message.subject,
        );

        async move {
            tracing::debug!("Sending message");

            #[cfg(feature = "metrics")]
            let start = Instant::now();

            let result = sender.send(message, params).await;

            #[cfg(feature = "metrics")]
            {
                let duration = start.elapsed().as_secs_f64();
                let status = if result.is_ok() { "success" } else { "error" };
                metrics::counter!("courier_emails_total", "provider" => provider.as_str(), "status" => status)
                    .increment(1);
                metrics::histogram!("courier_delivery_duration_seconds", "provider" => provider.as_str())
                    .record(duration);
            }

            match &result {
                Ok(r) => tracing::info!(message_id = %r.message_id, "Message sent"),
                Err(e) => tracing::error!(error = %e, "Message delivery failed"),
            }

            result.map_err(|e| MailError::dispatch(&params.provider, e))
        }
        .instrument(span)
        .await
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("smtp", &self.smtp.provider_name())
            .field("aws_smtp", &self.aws_smtp.provider_name())
            .field("aws_ses", &self.aws_ses.provider_name())
            .field("logger", &self.logger.provider_name())
            .finish()
    }
}

#[cfg(feature = "smtp")]
fn default_smtp() -> Arc<dyn Sender> {
    Arc::new(crate::providers::SmtpSender::new())
}

#[cfg(not(feature = "smtp"))]
fn default_smtp() -> Arc<dyn Sender> {
    Arc::new(FeatureDisabled {
        provider: "smtp",
        feature: "smtp",
    })
}

#[cfg(feature = "amazon_ses")]
fn default_aws_ses() -> Arc<dyn Sender> {
    Arc::new(crate::providers::AmazonSesSender::new())
}

#[cfg(not(feature = "amazon_ses"))]
fn default_aws_ses() -> Arc<dyn Sender> {
    Arc::new(FeatureDisabled {
        provider: "aws_ses",
        feature: "amazon_ses",
    })
}

/// Stands in for a provider whose cargo feature is off.
#[cfg(any(not(feature = "smtp"), not(feature = "amazon_ses")))]
struct FeatureDisabled {
    provider: &'static str,
    feature: &'static str,
}

#[cfg(any(not(feature = "smtp"), not(feature = "amazon_ses")))]
#[async_trait::async_trait]
impl Sender for FeatureDisabled {
    async fn send(&self, _message: &Message, _params: &Params) -> Result<DeliveryResult, MailError> {
        Err(MailError::Configuration(format!(
            "EMAIL_PROVIDER={} but '{}' feature is not enabled. \
            Add `features = [\"{}\"]` to Cargo.toml",
            self.provider, self.feature, self.feature
        )))
    }

    fn provider_name(&self) -> &'static str {
        self.provider
    }
}
