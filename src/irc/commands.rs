//! Twitch IRC verbs and the fixed frames the session sends on its own.
//!
//! The handshake is always `PASS`, `NICK`, `JOIN`, then one `CAP REQ` per
//! configured capability. Keep-alive replies carry a prefix built from the
//! configured username and Twitch's service host as payload.

use crate::config::model::{SessionConfig, DEFAULT_TWITCH_URI};
use crate::irc::codec::{Frame, Prefix};

pub const PASS: &str = "PASS";
pub const NICK: &str = "NICK";
pub const JOIN: &str = "JOIN";
pub const CAP: &str = "CAP";
pub const PING: &str = "PING";
pub const PONG: &str = "PONG";
pub const PRIVMSG: &str = "PRIVMSG";
/// Sent by Twitch ahead of restarting the server the client is on.
pub const RECONNECT: &str = "RECONNECT";

/// Payload Twitch expects in a PONG.
pub const TWITCH_SERVICE_HOST: &str = "tmi.twitch.tv";

/// How the receive loop treats an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    KeepAlive,
    Reconnect,
    UserFacing,
}

impl FrameKind {
    pub fn classify(frame: &Frame) -> Self {
        match frame.command.as_str() {
            PING => Self::KeepAlive,
            RECONNECT => Self::Reconnect,
            _ => Self::UserFacing,
        }
    }
}

/// The handshake frames for `config`, in send order.
pub fn handshake(config: &SessionConfig) -> Vec<Frame> {
    let mut frames = vec![
        Frame::new(PASS).with_params([format!("oauth:{}", config.token)]),
        Frame::new(NICK).with_params([config.username.clone()]),
        Frame::new(JOIN).with_params([config.channel_target()]),
    ];
    frames.extend(config.capabilities.iter().map(|capability| {
        Frame::new(CAP)
            .with_params(["REQ"])
            .with_trailing(capability.clone())
    }));
    frames
}

/// Reply to a provider PING.
pub fn pong(config: &SessionConfig) -> Frame {
    Frame::new(PONG)
        .with_prefix(Prefix {
            name: config.username.clone(),
            user: config.username.clone(),
            host: DEFAULT_TWITCH_URI.to_string(),
        })
        .with_trailing(TWITCH_SERVICE_HOST)
}

/// A PRIVMSG to the configured channel.
pub fn privmsg(config: &SessionConfig, content: &str) -> Frame {
    Frame::new(PRIVMSG)
        .with_prefix(Prefix {
            name: config.username.clone(),
            user: config.username.clone(),
            host: String::new(),
        })
        .with_params([config.channel_target()])
        .with_trailing(content)
}
