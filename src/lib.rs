//! # Courier
//!
//! Send a single email through an interchangeable delivery provider.
//!
//! ## Quick Start
//!
//! Set environment variables:
//! ```bash
//! EMAIL_PROVIDER=smtp
//! EMAIL_SERVER=mail.example.com:465
//! EMAIL_USERNAME=user
//! EMAIL_PASSWORD=secret
//! ```
//!
//! Send:
//! ```rust,ignore
//! use courier::{send, Message, Params};
//!
//! let message = Message::new()
//!     .from("noreply@example.com")
//!     .to("user@example.com")
//!     .subject("Welcome!")
//!     .body("Hello");
//!
//! send(&message, &Params::from_env()?).await?;
//! ```
//!
//! ## Custom Providers
//!
//! ```rust,ignore
//! use courier::{send_with, Dispatcher};
//! use courier::providers::SmtpSender;
//! use std::time::Duration;
//!
//! let dispatcher = Dispatcher::new().smtp(SmtpSender::new().timeout(Duration::from_secs(30)));
//! send_with(&dispatcher, &message, &params).await?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `EMAIL_PROVIDER` | `smtp` (default), `aws_smtp`, `aws_ses`, `logger` |
//! | `EMAIL_SERVER` | SMTP server as `host:port` (required for SMTP providers) |
//! | `EMAIL_USERNAME` | SMTP username / SES access key ID |
//! | `EMAIL_PASSWORD` | SMTP password / SES secret key |
//! | `AWS_SES_ENDPOINT` | SES endpoint when credentials come from the environment |
//! | `AWS_ACCESS_KEY_ID` | SES access key fallback |
//! | `AWS_SECRET_ACCESS_KEY` | SES secret fallback (`AWS_SECRET_KEY` also accepted) |
//! | `AWS_SESSION_TOKEN` | SES session token fallback |
//!
//! ## Feature Flags
//!
//! - `smtp` - Direct SMTP over implicit TLS (default)
//! - `amazon_ses` - Amazon SES API provider (default)
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//!
//! ## Metrics
//!
//! Enable `features = ["metrics"]` to emit Prometheus-style metrics:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `courier_emails_total` | Counter | provider, status | Total emails sent |
//! | `courier_delivery_duration_seconds` | Histogram | provider | Delivery duration |
//!
//! Install a recorder (e.g., `metrics-exporter-prometheus`) in your app to collect them.

/// The version of the courier crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod dispatch;
mod error;
mod message;
mod params;
mod sender;

pub mod providers;

// Re-exports
pub use dispatch::Dispatcher;
pub use error::{ErrorKind, MailError, SmtpError, SmtpStage};
pub use message::Message;
pub use params::{Params, Provider};
pub use sender::{DeliveryResult, Sender};

/// Send a message through the built-in providers.
///
/// The provider is chosen by `params.provider`; see [`Dispatcher::send`].
pub async fn send(message: &Message, params: &Params) -> Result<DeliveryResult, MailError> {
    Dispatcher::new().send(message, params).await
}

/// Send a message through a caller-configured [`Dispatcher`].
pub async fn send_with(
    dispatcher: &Dispatcher,
    message: &Message,
    params: &Params,
) -> Result<DeliveryResult, MailError> {
    dispatcher.send(message, params).await
}

/// Check whether the environment names a usable provider.
///
/// Returns `false` (and logs why) when `EMAIL_PROVIDER` is unknown, when an
/// SMTP provider has no `EMAIL_SERVER`, or when the provider's feature flag is
/// off.
pub fn is_configured() -> bool {
    let params = match Params::from_env() {
        Ok(params) => params,
        Err(e) => {
            tracing::debug!(error = %e, "Email not configured");
            return false;
        }
    };

    match params.selected_provider() {
        #[cfg(not(feature = "smtp"))]
        Ok(Provider::Smtp) => {
            tracing::warn!(
                "EMAIL_PROVIDER=smtp but 'smtp' feature is not enabled. \
                Add `features = [\"smtp\"]` to Cargo.toml"
            );
            false
        }
        #[cfg(not(feature = "amazon_ses"))]
        Ok(Provider::AwsSes) => {
            tracing::warn!(
                "EMAIL_PROVIDER=aws_ses but 'amazon_ses' feature is not enabled. \
                Add `features = [\"amazon_ses\"]` to Cargo.toml"
            );
            false
        }
        Ok(_) => true,
        Err(_) => false,
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{send, send_with, DeliveryResult, Dispatcher, MailError, Message, Params, Provider, Sender};
}
