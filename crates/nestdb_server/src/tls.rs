//! Self-signed certificates for HTTPS mode.

use crate::error::{ServerError, ServerResult};
use axum_server::tls_rustls::RustlsConfig;

/// PEM-encoded certificate and private key.
#[derive(Clone)]
pub struct SelfSignedCert {
    /// Certificate in PEM form.
    pub cert_pem: String,
    /// PKCS#8 private key in PEM form.
    pub key_pem: String,
}

impl std::fmt::Debug for SelfSignedCert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelfSignedCert")
            .field("cert_pem", &self.cert_pem)
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

/// Generates a fresh self-signed certificate valid for `host`.
///
/// `localhost` and `127.0.0.1` are always included as subject names.
pub fn generate_self_signed(host: &str) -> ServerResult<SelfSignedCert> {
    let mut names = vec!["localhost".to_string(), "127.0.0.1".to_string()];
    if !host.is_empty() && !names.iter().any(|n| n == host) {
        names.push(host.to_string());
    }

    let certified = rcgen::generate_simple_self_signed(names)
        .map_err(|e| ServerError::Tls(e.to_string()))?;

    Ok(SelfSignedCert {
        cert_pem: certified.cert.pem(),
        key_pem: certified.key_pair.serialize_pem(),
    })
}

/// Builds the rustls acceptor configuration for `cert`.
pub async fn rustls_config(cert: &SelfSignedCert) -> ServerResult<RustlsConfig> {
    RustlsConfig::from_pem(
        cert.cert_pem.clone().into_bytes(),
        cert.key_pem.clone().into_bytes(),
    )
    .await
    .map_err(|e| ServerError::Tls(e.to_string()))
}
