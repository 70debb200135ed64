//! Protocol-agnostic chat message and its mapping onto wire frames.

use chrono::{DateTime, Local};

use crate::irc::codec::{Frame, Prefix};

/// One inbound or outbound chat event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Sender display name.
    pub name: String,
    /// Sender identity.
    pub username: String,
    pub content: String,
    pub command: String,
    pub params: Vec<String>,
    /// Originating host, empty when unknown.
    pub host: String,
    /// When the frame was decoded. Always `None` on outbound messages.
    pub received_at: Option<DateTime<Local>>,
}

impl Message {
    /// Build a message from a decoded frame, stamped with the current time.
    ///
    /// Sender fields stay empty when the frame carries no prefix.
    pub fn received(frame: Frame) -> Self {
        let mut message = Self::from(frame);
        message.received_at = Some(Local::now());
        message
    }

    /// Convert into a wire frame.
    ///
    /// A prefix is attached only if at least one of name, username or host is
    /// set, and only the non-empty parts are written.
    pub fn to_frame(&self) -> Frame {
        let prefix = (!self.name.is_empty() || !self.username.is_empty() || !self.host.is_empty())
            .then(|| Prefix {
                name: self.name.clone(),
                user: self.username.clone(),
                host: self.host.clone(),
            });
        Frame {
            prefix,
            command: self.command.clone(),
            params: self.params.clone(),
            trailing: self.content.clone(),
        }
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        let Prefix { name, user, host } = frame.prefix.unwrap_or_default();
        Self {
            name,
            username: user,
            content: frame.trailing,
            command: frame.command,
            params: frame.params,
            host,
            received_at: None,
        }
    }
}

impl From<&Message> for Frame {
    fn from(message: &Message) -> Self {
        message.to_frame()
    }
}
