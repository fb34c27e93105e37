//! Transport establishment for the SMTP driver.
//!
//! The driver never opens sockets itself; it asks a [`Dialer`] for a ready
//! stream. [`TlsDialer`] performs implicit TLS (port 465 semantics: the
//! handshake happens before the first SMTP byte).

use std::sync::Arc;

use async_trait::async_trait;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::ring::default_provider;
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

use crate::error::SmtpError;

/// Opens a secured stream to an SMTP server.
#[async_trait]
pub trait Dialer: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Connect to `server` (`host:port`). `host` is the bare host name used
    /// for TLS server-name indication and may be empty.
    async fn dial(&self, server: &str, host: &str) -> Result<Self::Stream, SmtpError>;
}

/// Implicit-TLS dialer.
///
/// Server certificates are **not** verified. The expected server name is
/// still sent (SNI) when `host` is non-empty, but any certificate the server
/// presents is accepted. Handshake signatures are still checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlsDialer;

#[async_trait]
impl Dialer for TlsDialer {
    type Stream = TlsStream<TcpStream>;

    async fn dial(&self, server: &str, host: &str) -> Result<Self::Stream, SmtpError> {
        let connector = TlsConnector::from(Arc::new(insecure_client_config()?));

        let tcp = TcpStream::connect(server).await?;
        let server_name = if host.is_empty() {
            // No SNI for IP server names.
            ServerName::IpAddress(tcp.peer_addr()?.ip().into())
        } else {
            ServerName::try_from(host.to_string())
                .map_err(|e| SmtpError::Tls(format!("Invalid server name {:?}: {}", host, e)))?
        };

        tracing::warn!(server, "TLS certificate verification disabled");
        let stream = connector.connect(server_name, tcp).await?;
        Ok(stream)
    }
}

fn insecure_client_config() -> Result<ClientConfig, SmtpError> {
    let provider = Arc::new(default_provider());
    let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()
        .map_err(|e| SmtpError::Tls(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(NoCertVerifier { provider }))
        .with_no_client_auth();
    Ok(config)
}

/// Accepts any server certificate.
#[derive(Debug)]
struct NoCertVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for NoCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
