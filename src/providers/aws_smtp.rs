//! AWS-style SMTP relay. Not implemented.
//!
//! Selecting this provider always fails with [`MailError::NotImplemented`],
//! whatever the message or params contain.

use async_trait::async_trait;

use crate::error::MailError;
use crate::message::Message;
use crate::params::Params;
use crate::sender::{DeliveryResult, Sender};

/// Placeholder for an SMTP relay provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsSmtpSender;

impl AwsSmtpSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sender for AwsSmtpSender {
    async fn send(&self, _message: &Message, _params: &Params) -> Result<DeliveryResult, MailError> {
        Err(MailError::NotImplemented("AWS SMTP"))
    }

    fn provider_name(&self) -> &'static str {
        "aws_smtp"
    }
}
