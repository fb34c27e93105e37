//! Delivery provider implementations.
//!
//! Each provider implements the [`Sender`](crate::Sender) trait.
//!
//! ## Available Providers
//!
//! | Provider | Tag | Feature Flag | Description |
//! |----------|-----|-------------|-------------|
//! | [`SmtpSender`] | `smtp` (or empty) | `smtp` | Direct SMTP over implicit TLS |
//! | [`AwsSmtpSender`] | `aws_smtp` | (none) | SMTP relay, not implemented |
//! | [`AmazonSesSender`] | `aws_ses` | `amazon_ses` | Amazon SES API |
//! | [`LoggerSender`] | `logger` | (none) | Logs messages without sending |

#[cfg(feature = "smtp")]
mod smtp;
#[cfg(feature = "smtp")]
pub use smtp::{render_payload, split_host, DataWriter, Dialer, Reply, SmtpClient, SmtpSender, TlsDialer};

#[cfg(feature = "amazon_ses")]
mod amazon_ses;
#[cfg(feature = "amazon_ses")]
pub use amazon_ses::{AmazonSesClient, AmazonSesSender, CloudMailer, SesConfig, DEFAULT_ENDPOINT};

mod aws_smtp;
pub use aws_smtp::AwsSmtpSender;

mod logger;
pub use logger::LoggerSender;
