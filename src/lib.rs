//! Twitch chat over IRC.
//!
//! A [`Session`] connects to one channel, answers keep-alives, follows the
//! server's reconnect requests, and hands every chat message to the
//! registered [`Handler`]s.

pub mod config;
pub mod error;
pub mod irc;
pub mod logging;

pub use config::SessionConfig;
pub use error::{ChannelError, CodecError, SessionError};
pub use irc::handler::{ChannelWriter, Handler};
pub use irc::message::Message;
pub use irc::session::{DisconnectHandle, Session, SessionId, SessionWriter};
pub use logging::ChatLogger;
