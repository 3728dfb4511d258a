//! TLS client configuration

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, WebPkiSupportedAlgorithms};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::error::{BridgeError, Result};
use crate::transport::TlsMode;

/// Wrap a connected TCP stream in TLS
///
/// # Errors
/// Returns `Tls` if the configuration cannot be built, the host is not a valid
/// server name, or the handshake fails
pub(super) async fn wrap(
    mode: TlsMode,
    host: &str,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>> {
    let config = client_config(mode)?;
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| BridgeError::tls(format!("Invalid server name '{host}': {e}")))?;

    TlsConnector::from(Arc::new(config))
        .connect(server_name, stream)
        .await
        .map_err(|e| BridgeError::tls(format!("TLS handshake with {host} failed: {e}")))
}

fn client_config(mode: TlsMode) -> Result<ClientConfig> {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| BridgeError::tls(format!("Unsupported TLS configuration: {e}")))?;

    let config = match mode {
        TlsMode::TrustAll => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(TrustAllVerifier::new(&provider)))
            .with_no_client_auth(),
        TlsMode::Verify | TlsMode::None => {
            let roots = RootCertStore {
                roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
            };
            builder.with_root_certificates(roots).with_no_client_auth()
        }
    };
    Ok(config)
}

/// Accepts any certificate chain but still checks handshake signatures
#[derive(Debug)]
struct TrustAllVerifier {
    algorithms: WebPkiSupportedAlgorithms,
}

impl TrustAllVerifier {
    fn new(provider: &CryptoProvider) -> Self {
        Self {
            algorithms: provider.signature_verification_algorithms,
        }
    }
}

impl ServerCertVerifier for TrustAllVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}
