//! Callbacks invoked for inbound chat messages.
//!
//! Every registered [`Handler`] gets its own task per message. Invocations for
//! successive messages, and across handlers, run concurrently and in no
//! particular order, so a handler must synchronize any state it shares.

use async_trait::async_trait;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::irc::message::Message;

/// The send-only view of a session handed to handlers.
#[async_trait]
pub trait ChannelWriter: Send + Sync {
    /// Send `content` as a PRIVMSG to the session's channel.
    async fn send(&self, content: &str) -> Result<(), SessionError>;

    /// Encode and send `message` as-is.
    async fn send_message(&self, message: &Message) -> Result<(), SessionError>;

    /// Send a raw command with middle params and trailing content.
    async fn send_command(
        &self,
        command: &str,
        params: &[String],
        content: &str,
    ) -> Result<(), SessionError>;

    fn config(&self) -> &SessionConfig;
}

/// Reacts to inbound user-facing messages.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn digest(&self, message: Message, writer: &dyn ChannelWriter);
}
