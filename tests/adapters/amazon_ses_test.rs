//! Amazon SES adapter tests.
//!
//! Note: AWS Signature v4 generates different signatures each time based on
//! the current timestamp, so we can't verify exact request bodies. Instead,
//! we verify the request path, method, form fields, and response parsing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use courier::providers::{AmazonSesClient, AmazonSesSender, CloudMailer, SesConfig};
use courier::{Dispatcher, ErrorKind, MailError, Message, Params, Provider, Sender};
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn valid_message() -> Message {
    Message::new()
        .from("guybrush.threepwood@pirates.grog")
        .to("elaine.marley@triisland.gov")
        .subject("Mighty Pirate Newsletter")
        .body("Hello")
}

fn params(server: &MockServer) -> Params {
    Params::new()
        .provider(Provider::AwsSes)
        .credentials("test_access", "test_secret")
        .server(server.uri())
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn success_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(
        r#"<SendEmailResponse xmlns="http://ses.amazonaws.com/doc/2010-12-01/">
            <SendEmailResult>
                <MessageId>messageId</MessageId>
            </SendEmailResult>
            <ResponseMetadata>
                <RequestId>requestId</RequestId>
            </ResponseMetadata>
        </SendEmailResponse>"#,
    )
}

fn error_response() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_string(
        r#"<ErrorResponse>
            <Error>
                <Type>Sender</Type>
                <Code>MessageRejected</Code>
                <Message>Email address is not verified.</Message>
            </Error>
            <RequestId>a97266f7-b062-11e7-b126-6b0f7a9b3379</RequestId>
        </ErrorResponse>"#,
    )
}

/// Records which sending method the adapter picked.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
    configs: Arc<Mutex<Vec<SesConfig>>>,
}

#[async_trait]
impl CloudMailer for Recorder {
    async fn send_email(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, MailError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("text {from} {to} {subject} {body}"));
        Ok("text-token".to_string())
    }

    async fn send_email_html(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<String, MailError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("html {from} {to} {subject} {text} {html}"));
        Ok("html-token".to_string())
    }
}

fn recording_sender(recorder: &Recorder) -> AmazonSesSender {
    let recorder = recorder.clone();
    AmazonSesSender::new()
        .with_env_lookup(no_env)
        .with_client_factory(move |config| {
            recorder.configs.lock().unwrap().push(config);
            Box::new(recorder.clone())
        })
}

// ============================================================================
// Basic Delivery Tests
// ============================================================================

#[tokio::test]
async fn successful_delivery_returns_ok() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("Action=SendEmail"))
        .and(body_string_contains("Version=2010-12-01"))
        .and(body_string_contains("Source=guybrush.threepwood%40pirates.grog"))
        .and(body_string_contains(
            "Destination.ToAddresses.member.1=elaine.marley%40triisland.gov",
        ))
        .and(body_string_contains("Message.Subject.Data=Mighty%20Pirate%20Newsletter"))
        .and(body_string_contains("Message.Body.Text.Data=Hello"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let delivery = AmazonSesSender::new()
        .with_env_lookup(no_env)
        .send(&valid_message(), &params(&server))
        .await
        .unwrap();
    assert_eq!(delivery.message_id, "messageId");
}

#[tokio::test]
async fn html_delivery_sends_body_as_both_parts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("Message.Body.Text.Data=%3Ch1%3EHello%3C%2Fh1%3E"))
        .and(body_string_contains("Message.Body.Html.Data=%3Ch1%3EHello%3C%2Fh1%3E"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let message = valid_message().body("<h1>Hello</h1>").html(true);
    let delivery = AmazonSesSender::new()
        .with_env_lookup(no_env)
        .send(&message, &params(&server))
        .await
        .unwrap();
    assert_eq!(delivery.message_id, "messageId");
}

#[tokio::test]
async fn delivery_through_dispatcher() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new().aws_ses(AmazonSesSender::new().with_env_lookup(no_env));
    let delivery = dispatcher
        .send(&valid_message(), &params(&server).provider_tag("amazon_ses"))
        .await
        .unwrap();
    assert_eq!(delivery.message_id, "messageId");
}

// ============================================================================
// Credential Resolution Tests
// ============================================================================

#[tokio::test]
async fn missing_credentials_fall_back_to_environment() {
    let server = MockServer::start().await;
    let endpoint = server.uri();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-security-token", "temporary-session-token"))
        .respond_with(success_response())
        .expect(1)
        .mount(&server)
        .await;

    let sender = AmazonSesSender::new().with_env_lookup(move |key| match key {
        "AWS_SES_ENDPOINT" => Some(endpoint.clone()),
        "AWS_ACCESS_KEY_ID" => Some("env_access".to_string()),
        "AWS_SECRET_ACCESS_KEY" => Some("env_secret".to_string()),
        "AWS_SESSION_TOKEN" => Some("temporary-session-token".to_string()),
        _ => None,
    });

    let delivery = sender
        .send(&valid_message(), &Params::new().provider(Provider::AwsSes))
        .await
        .unwrap();
    assert_eq!(delivery.message_id, "messageId");
}

#[tokio::test]
async fn explicit_credentials_win_over_environment() {
    let recorder = Recorder::default();
    let sender = recording_sender(&recorder).with_env_lookup(|key| match key {
        "AWS_ACCESS_KEY_ID" => Some("env_access".to_string()),
        "AWS_SECRET_ACCESS_KEY" => Some("env_secret".to_string()),
        _ => None,
    });

    sender
        .send(&valid_message(), &Params::new().credentials("id", "secret"))
        .await
        .unwrap();

    let configs = recorder.configs.lock().unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].access_key_id, "id");
    assert_eq!(configs[0].secret_access_key, "secret");
}

#[tokio::test]
async fn missing_configuration_is_reported_before_any_request() {
    let recorder = Recorder::default();

    let err = recording_sender(&recorder)
        .send(&valid_message(), &Params::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(recorder.configs.lock().unwrap().is_empty());
    assert!(recorder.calls.lock().unwrap().is_empty());
}

// ============================================================================
// Method Selection Tests
// ============================================================================

#[tokio::test]
async fn plain_message_uses_text_method() {
    let recorder = Recorder::default();

    let delivery = recording_sender(&recorder)
        .send(&Message::new().from("a@x.com").to("b@y.com").subject("Hi").body("hello"), &Params::new().credentials("id", "secret"))
        .await
        .unwrap();

    assert_eq!(delivery.message_id, "text-token");
    assert_eq!(*recorder.calls.lock().unwrap(), vec!["text a@x.com b@y.com Hi hello"]);
}

#[tokio::test]
async fn html_message_uses_html_method_with_body_twice() {
    let recorder = Recorder::default();
    let message = Message::new()
        .from("a@x.com")
        .to("b@y.com")
        .to("c@y.com")
        .subject("Hi")
        .body("<p>x</p>")
        .html(true);

    let delivery = recording_sender(&recorder)
        .send(&message, &Params::new().credentials("id", "secret"))
        .await
        .unwrap();

    assert_eq!(delivery.message_id, "html-token");
    assert_eq!(
        *recorder.calls.lock().unwrap(),
        vec!["html a@x.com b@y.com Hi <p>x</p> <p>x</p>"]
    );
}

// ============================================================================
// Error Response Tests
// ============================================================================

#[tokio::test]
async fn api_error_is_wrapped_as_delegate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(error_response())
        .expect(1)
        .mount(&server)
        .await;

    let err = AmazonSesSender::new()
        .with_env_lookup(no_env)
        .send(&valid_message(), &params(&server))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Delegate);
    assert!(err.to_string().starts_with("aws_ses | "));
    assert!(err.to_string().contains("MessageRejected"));
    assert!(err.to_string().contains("Email address is not verified."));
    match err {
        MailError::Delegate { source, .. } => {
            assert!(matches!(*source, MailError::ProviderError { status: Some(400), .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn success_without_message_id_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<SendEmailResponse/>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AmazonSesClient::new(SesConfig::new(server.uri(), "key", "secret"));
    let err = client
        .send_email("a@x.com", "b@y.com", "Hi", "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, MailError::ProviderError { provider: "aws_ses", .. }));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
async fn send_without_to_returns_error() {
    let recorder = Recorder::default();
    let message = Message::new().from("a@x.com").subject("Hello!").body("Hi");

    let err = recording_sender(&recorder)
        .send(&message, &Params::new().credentials("id", "secret"))
        .await
        .unwrap_err();
    assert!(matches!(err, MailError::MissingField("to")));
    assert!(recorder.calls.lock().unwrap().is_empty());
}

#[test]
fn provider_name_returns_aws_ses() {
    assert_eq!(AmazonSesSender::new().provider_name(), "aws_ses");
}
