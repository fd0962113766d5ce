//! TLS prober backed by rustls and the platform trust store

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tokio_rustls::TlsConnector;

use crate::endpoint::Endpoint;
use crate::expiry::format_not_after;
use crate::probe::{FailureKind, ProbeFailure, ProbeOutcome, Prober};

/// Performs one TLS handshake per probe and reports the leaf certificate's
/// not-after. Validation (chain, issuer, hostname) is whatever rustls
/// enforces against the configured roots.
pub struct TlsProber {
    connector: TlsConnector,
    trust_anchors: usize,
}

impl std::fmt::Debug for TlsProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsProber")
            .field("trust_anchors", &self.trust_anchors)
            .finish()
    }
}

impl TlsProber {
    /// Build a prober trusting the platform's native root certificates
    pub fn new() -> crate::Result<Self> {
        let native = rustls_native_certs::load_native_certs();
        for e in &native.errors {
            tracing::warn!("Skipping unreadable platform certificate source: {}", e);
        }

        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(native.certs);
        tracing::debug!(
            "Loaded {} platform trust anchors ({} unparsable)",
            added,
            ignored
        );
        if added == 0 {
            tracing::warn!(
                "No platform trust anchors found; every handshake will fail certificate validation"
            );
        }

        Self::with_roots(roots)
    }

    /// Build a prober trusting only the given roots
    pub fn with_roots(roots: RootCertStore) -> crate::Result<Self> {
        let trust_anchors = roots.len();
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| {
                crate::CertwatchError::Tls(format!("Failed to set protocol versions: {}", e))
            })?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            trust_anchors,
        })
    }

    async fn fetch_not_after(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<String, ProbeFailure> {
        let deadline = Instant::now() + timeout;
        let timed_out = |phase: &str| {
            ProbeFailure::new(
                FailureKind::Timeout,
                format!("{} for {} timed out after {:?}", phase, endpoint, timeout),
            )
        };

        let addrs: Vec<SocketAddr> = timeout_at(
            deadline,
            tokio::net::lookup_host((endpoint.hostname.as_str(), endpoint.port)),
        )
        .await
        .map_err(|_| timed_out("DNS lookup"))?
        .map_err(|e| {
            ProbeFailure::new(
                FailureKind::DnsError,
                format!("DNS resolution failed for {}: {}", endpoint.hostname, e),
            )
        })?
        .collect();

        if addrs.is_empty() {
            return Err(ProbeFailure::new(
                FailureKind::DnsError,
                format!("No addresses found for {}", endpoint.hostname),
            ));
        }
        tracing::debug!("{} resolved to {:?}", endpoint, addrs);

        let stream = timeout_at(deadline, TcpStream::connect(addrs.as_slice()))
            .await
            .map_err(|_| timed_out("Connection"))?
            .map_err(|e| {
                ProbeFailure::new(
                    FailureKind::Unknown,
                    format!("Connection to {} failed: {}", endpoint, e),
                )
            })?;

        let server_name = ServerName::try_from(endpoint.hostname.clone()).map_err(|e| {
            ProbeFailure::new(
                FailureKind::TlsError,
                format!("Invalid server name {:?}: {}", endpoint.hostname, e),
            )
        })?;

        let tls_stream = timeout_at(deadline, self.connector.connect(server_name, stream))
            .await
            .map_err(|_| timed_out("TLS handshake"))?
            .map_err(|e| {
                ProbeFailure::new(
                    classify_handshake_error(&e),
                    format!("TLS handshake with {} failed: {}", endpoint, e),
                )
            })?;

        let (_, session) = tls_stream.get_ref();
        let leaf = session
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| {
                ProbeFailure::new(
                    FailureKind::ParseError,
                    format!("{} presented no certificate", endpoint),
                )
            })?;

        leaf_not_after(leaf.as_ref()).map_err(|reason| {
            ProbeFailure::new(
                FailureKind::ParseError,
                format!("Certificate from {}: {}", endpoint, reason),
            )
        })
    }
}

#[async_trait]
impl Prober for TlsProber {
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        tracing::debug!("Probing {} (timeout {:?})", endpoint, timeout);
        match self.fetch_not_after(endpoint, timeout).await {
            Ok(not_after_raw) => ProbeOutcome::Certificate { not_after_raw },
            Err(failure) => ProbeOutcome::Failure(failure),
        }
    }
}

/// Decode a DER certificate and render its not-after
pub fn leaf_not_after(der: &[u8]) -> Result<String, String> {
    let (_, cert) =
        x509_parser::parse_x509_certificate(der).map_err(|e| format!("undecodable: {}", e))?;
    let seconds = cert.validity().not_after.timestamp();
    let not_after = DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| format!("not-after {} is out of range", seconds))?;
    Ok(format_not_after(not_after))
}

/// rustls reports protocol and validation failures as `InvalidData`; a peer
/// hanging up mid-handshake surfaces as `UnexpectedEof`.
fn classify_handshake_error(e: &io::Error) -> FailureKind {
    let is_rustls = e
        .get_ref()
        .is_some_and(|inner| inner.is::<rustls::Error>());
    if is_rustls || matches!(e.kind(), io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof) {
        FailureKind::TlsError
    } else {
        FailureKind::Unknown
    }
}
