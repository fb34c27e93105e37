//! SMTP relay stub tests.

use courier::providers::AwsSmtpSender;
use courier::{Dispatcher, ErrorKind, MailError, Message, Params, Provider, Sender};

#[tokio::test]
async fn relay_is_not_implemented() {
    let message = Message::new().from("a@x.com").to("b@y.com").subject("Hi").body("hello");
    let params = Params::new()
        .provider(Provider::AwsSmtp)
        .credentials("user", "pass")
        .server("email-smtp.us-east-1.amazonaws.com:465");

    let err = AwsSmtpSender::new().send(&message, &params).await.unwrap_err();
    assert!(matches!(err, MailError::NotImplemented(_)));
    assert_eq!(err.to_string(), "AWS SMTP not implemented yet");
}

#[tokio::test]
async fn relay_through_dispatcher_is_wrapped() {
    let params = Params::new().provider(Provider::AwsSmtp);

    let err = Dispatcher::new()
        .send(&Message::new(), &params)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplemented);
    assert_eq!(
        err.to_string(),
        "switch provider \"aws_smtp\" | AWS SMTP not implemented yet"
    );
}
