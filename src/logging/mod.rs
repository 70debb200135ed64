//! Chat message logging.
//!
//! [`ChatLogger`] is a ready-made [`Handler`] that writes every user message
//! to a stream, one `<time> <username>: <content>` line each. Messages without
//! a sender or without content (server notices, membership changes) are
//! skipped.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Local;

use crate::config::model::DEFAULT_TIMESTAMP_FORMAT;
use crate::config::LoggingConfig;
use crate::irc::handler::{ChannelWriter, Handler};
use crate::irc::message::Message;

/// Writes user chat lines to any `io::Write` sink.
///
/// The sink sits behind a mutex so concurrent invocations write whole lines.
pub struct ChatLogger {
    sink: Mutex<Box<dyn Write + Send>>,
    timestamp_format: String,
}

impl ChatLogger {
    pub fn new(sink: impl Write + Send + 'static, config: &LoggingConfig) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
            timestamp_format: config.timestamp_format.clone(),
        }
    }

    /// Logger writing to standard output.
    pub fn stdout(config: &LoggingConfig) -> Self {
        Self::new(io::stdout(), config)
    }

    /// Render the log line for `message`, or `None` if it should be skipped.
    ///
    /// An unusable timestamp format falls back to [`DEFAULT_TIMESTAMP_FORMAT`].
    pub fn format_line(&self, message: &Message) -> Option<String> {
        if message.username.is_empty() || message.content.is_empty() {
            return None;
        }
        let time = message.received_at.unwrap_or_else(Local::now);
        let mut stamp = String::new();
        if write!(stamp, "{}", time.format(&self.timestamp_format)).is_err() {
            stamp = time.format(DEFAULT_TIMESTAMP_FORMAT).to_string();
        }
        Some(format!("{} {}: {}", stamp, message.username, message.content))
    }
}

#[async_trait]
impl Handler for ChatLogger {
    async fn digest(&self, message: Message, _writer: &dyn ChannelWriter) {
        let Some(line) = self.format_line(&message) else {
            return;
        };
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(sink, "{}", line).and_then(|_| sink.flush()) {
            tracing::warn!(error = %e, "failed to write chat line");
        }
    }
}
