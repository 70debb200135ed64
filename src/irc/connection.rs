use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::config::SessionConfig;
use crate::error::SessionError;

/// A bidirectional byte stream to the chat server.
///
/// Must be `Sync` for session futures to be `Send`.
pub trait Transport: AsyncRead + AsyncWrite + Send + Sync + Unpin {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Send + Sync + Unpin {}

pub type BoxedTransport = Box<dyn Transport>;

/// Dial `config.server`, wrapping the stream in TLS when `config.tls` is set.
pub async fn dial(config: &SessionConfig) -> Result<BoxedTransport, SessionError> {
    let tcp = TcpStream::connect(&config.server)
        .await
        .map_err(|source| SessionError::Connect {
            server: config.server.clone(),
            source,
        })?;
    if let Err(e) = tcp.set_nodelay(true) {
        tracing::debug!(server = %config.server, error = %e, "failed to set TCP_NODELAY");
    }

    if !config.tls {
        tracing::debug!(server = %config.server, "plain TCP connection established");
        return Ok(Box::new(tcp));
    }

    let server_name = ServerName::try_from(config.host().to_string())
        .map_err(|_| SessionError::InvalidServerName(config.host().to_string()))?;
    let connector = TlsConnector::from(Arc::new(tls_config()));
    let tls = connector
        .connect(server_name, tcp)
        .await
        .map_err(|source| SessionError::Tls {
            server: config.server.clone(),
            source,
        })?;

    tracing::debug!(server = %config.server, "TLS connection established");
    Ok(Box::new(tls))
}

fn tls_config() -> ClientConfig {
    let root_store = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}
