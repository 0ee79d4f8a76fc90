//! Pooled PostgreSQL-wire connections with optional TLS.
//!
//! Redshift and the destination both speak the PostgreSQL protocol, so one
//! pool builder serves both sides.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::{verify_server_cert_signed_by_trust_anchor, WebPkiServerVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::server::ParsedCertificate;
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use serde::{Deserialize, Serialize};
use tokio_postgres::{Config as PgConfig, NoTls};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{DupError, Result};

/// Which end of the copy a connection serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    /// Wrap a query error into the matching [`DupError`] variant.
    pub fn query_error(self, err: tokio_postgres::Error) -> DupError {
        match self {
            Side::Source => DupError::Source(err),
            Side::Destination => DupError::Destination(err),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Destination => f.write_str("destination"),
        }
    }
}

/// `sslmode` values, as PostgreSQL spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SslMode {
    Disable,
    /// Encrypt without verifying the server certificate.
    ///
    /// Redshift clusters use Amazon-issued certificates that are commonly not
    /// in the client's trust store, so this is the default.
    #[default]
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }
}

impl FromStr for SslMode {
    type Err = DupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "require" | "" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            other => Err(DupError::Config(format!(
                "Invalid ssl_mode '{}'. Valid values: disable, require, verify-ca, verify-full",
                other
            ))),
        }
    }
}

impl TryFrom<String> for SslMode {
    type Error = DupError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SslMode> for String {
    fn from(mode: SslMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Builds the rustls connector for an [`SslMode`].
pub struct TlsBuilder {
    ssl_mode: SslMode,
}

impl TlsBuilder {
    pub fn new(ssl_mode: SslMode) -> Self {
        Self { ssl_mode }
    }

    /// Connector for deadpool-postgres, `None` when TLS is disabled.
    ///
    /// `verify-ca` checks the certificate chain against the webpki roots but
    /// not the host name; `verify-full` checks both.
    pub fn build(&self) -> Result<Option<MakeRustlsConnect>> {
        let config = match self.ssl_mode {
            SslMode::Disable => return Ok(None),
            SslMode::VerifyFull => ClientConfig::builder()
                .with_root_certificates(webpki_root_store())
                .with_no_client_auth(),
            SslMode::VerifyCa => ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(VerifyChainOnly::new(
                    webpki_root_store(),
                )?))
                .with_no_client_auth(),
            SslMode::Require => {
                warn!(
                    "ssl_mode=require encrypts the connection but does not verify the server \
                     certificate; use verify-full where the cluster certificate is trusted"
                );
                ClientConfig::builder()
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
                    .with_no_client_auth()
            }
        };
        Ok(Some(MakeRustlsConnect::new(config)))
    }
}

fn webpki_root_store() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    roots
}

/// Open a pool and check it with `SELECT 1`.
pub async fn connect(config: &ConnectionConfig, max_size: usize, side: Side) -> Result<Pool> {
    let mut pg_config = PgConfig::new();
    pg_config.host(&config.host);
    pg_config.port(config.port);
    pg_config.dbname(&config.database);
    pg_config.user(&config.user);
    pg_config.password(&config.password);
    pg_config.application_name("redshift-dup");

    let mgr_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = match TlsBuilder::new(config.ssl_mode).build()? {
        Some(tls) => Manager::from_config(pg_config, tls, mgr_config),
        None => Manager::from_config(pg_config, NoTls, mgr_config),
    };

    let pool = Pool::builder(mgr)
        .max_size(max_size)
        .build()
        .map_err(|e| DupError::pool(e, format!("creating {} pool", side)))?;

    ping(&pool, side).await?;

    info!(
        "Connected to {}: {}:{}/{} (ssl_mode={})",
        side,
        config.host,
        config.port,
        config.database,
        config.ssl_mode.as_str()
    );
    Ok(pool)
}

/// Run `SELECT 1` on a pooled connection.
pub async fn ping(pool: &Pool, side: Side) -> Result<()> {
    let client = pool
        .get()
        .await
        .map_err(|e| DupError::pool(e, format!("getting {} connection", side)))?;
    client
        .simple_query("SELECT 1")
        .await
        .map_err(|e| side.query_error(e))?;
    debug!("{} connection healthy", side);
    Ok(())
}

/// Verifier for `ssl_mode=verify-ca`: the chain must lead to a trusted root,
/// the server name is not checked.
#[derive(Debug)]
struct VerifyChainOnly {
    roots: Arc<RootCertStore>,
    provider: Arc<CryptoProvider>,
    webpki: Arc<WebPkiServerVerifier>,
}

impl VerifyChainOnly {
    fn new(roots: RootCertStore) -> Result<Self> {
        let roots = Arc::new(roots);
        let provider = CryptoProvider::get_default()
            .cloned()
            .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()));
        let webpki = WebPkiServerVerifier::builder_with_provider(roots.clone(), provider.clone())
            .build()
            .map_err(|e| DupError::pool(e, "building verify-ca certificate verifier"))?;
        Ok(Self {
            roots,
            provider,
            webpki,
        })
    }
}

impl ServerCertVerifier for VerifyChainOnly {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let cert = ParsedCertificate::try_from(end_entity)?;
        verify_server_cert_signed_by_trust_anchor(
            &cert,
            &self.roots,
            intermediates,
            now,
            self.provider.signature_verification_algorithms.all,
        )?;
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.webpki.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.webpki.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.webpki.supported_verify_schemes()
    }
}

/// Verifier that accepts any server certificate, for `ssl_mode=require`.
#[derive(Debug)]
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
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
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        use SignatureScheme::*;
        vec![
            RSA_PKCS1_SHA256,
            RSA_PKCS1_SHA384,
            RSA_PKCS1_SHA512,
            ECDSA_NISTP256_SHA256,
            ECDSA_NISTP384_SHA384,
            RSA_PSS_SHA256,
            RSA_PSS_SHA384,
            RSA_PSS_SHA512,
            ED25519,
        ]
    }
}
