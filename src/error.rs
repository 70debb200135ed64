//! Error types for the session and codec layers.
//!
//! [`SessionError`] covers everything that can go wrong while a session is
//! dialing, authenticating, listening or sending. [`ChannelError`] tags one of
//! those with the session that produced it so a supervisor juggling several
//! sessions can tell them apart.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::irc::session::SessionId;

/// Failures while framing or parsing IRC lines.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("line exceeds max length of {max} bytes")]
    LineTooLong { max: usize },

    #[error("line has no command: {line:?}")]
    MissingCommand { line: String },

    #[error("parameter {param:?} cannot be sent as a middle parameter")]
    InvalidParam { param: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors surfaced by a [`Session`](crate::irc::session::Session).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to {server}: {source}")]
    Connect {
        server: String,
        #[source]
        source: io::Error,
    },

    #[error("TLS handshake with {server} failed: {source}")]
    Tls {
        server: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid TLS server name {0:?}")]
    InvalidServerName(String),

    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    #[error("no frame received within {0:?}")]
    IdleTimeout(Duration),

    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("handshake failed while sending {command}: {source}")]
    Handshake {
        command: String,
        #[source]
        source: Box<SessionError>,
    },

    #[error("session is not connected")]
    NotConnected,
}

/// A [`SessionError`] tagged with the session and channel it came from.
#[derive(Debug, Error)]
#[error("session {session} (#{channel}): {source}")]
pub struct ChannelError {
    pub session: SessionId,
    pub channel: String,
    #[source]
    pub source: SessionError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_error_display() {
        let err = ChannelError {
            session: 3,
            channel: "test".into(),
            source: SessionError::ConnectionClosed,
        };
        assert_eq!(
            err.to_string(),
            "session 3 (#test): connection closed by server"
        );
    }

    #[test]
    fn test_handshake_error_keeps_cause() {
        let err = SessionError::Handshake {
            command: "NICK".into(),
            source: Box::new(SessionError::NotConnected),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("session is not connected"));
    }
}
