//! The connection session: one Twitch channel over one transport.
//!
//! A [`Session`] starts disconnected. [`Session::connect`] dials and binds the
//! frame codec, [`Session::authenticate`] sends the handshake, and
//! [`Session::listen`] runs the receive loop until the provider goes quiet,
//! the stream fails, or a [`DisconnectHandle`] asks it to stop.
//!
//! The loop is the only reader. Writes go through [`SessionWriter`], which
//! serializes every frame behind an async mutex, so the loop's own PONG
//! replies and any number of handler tasks can send at the same time without
//! interleaving bytes on the wire.
//!
//! Dispatch is fire-and-forget: each user-facing message spawns one task per
//! handler and the loop moves straight on to the next frame. Nothing bounds
//! the number of in-flight handler tasks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::sync::{mpsc, Mutex};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{ChannelError, SessionError};
use crate::irc::codec::{Frame, FrameCodec};
use crate::irc::commands::{self, FrameKind};
use crate::irc::connection::{self, BoxedTransport};
use crate::irc::handler::{ChannelWriter, Handler};
use crate::irc::message::Message;

pub type SessionId = usize;

static NEXT_SESSION_ID: AtomicUsize = AtomicUsize::new(1);

type FrameReader = FramedRead<ReadHalf<BoxedTransport>, FrameCodec>;
type FrameSink = FramedWrite<WriteHalf<BoxedTransport>, FrameCodec>;

/// Shared write side of a session.
///
/// Clones all point at the same slot, so a writer taken before a reconnect
/// sends on the new transport afterwards. Once the receive loop exits the slot
/// is empty and every send fails with [`SessionError::NotConnected`].
#[derive(Clone)]
pub struct SessionWriter {
    config: Arc<SessionConfig>,
    sink: Arc<Mutex<Option<FrameSink>>>,
}

impl SessionWriter {
    fn new(config: Arc<SessionConfig>) -> Self {
        Self {
            config,
            sink: Arc::new(Mutex::new(None)),
        }
    }

    /// Encode and flush one frame while holding the write lock.
    pub async fn send_frame(&self, frame: Frame) -> Result<(), SessionError> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(SessionError::NotConnected)?;
        sink.send(frame).await?;
        Ok(())
    }

    async fn bind(&self, sink: FrameSink) {
        *self.sink.lock().await = Some(sink);
    }

    async fn close(&self) -> Result<(), SessionError> {
        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink {
            sink.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelWriter for SessionWriter {
    async fn send(&self, content: &str) -> Result<(), SessionError> {
        self.send_frame(commands::privmsg(&self.config, content)).await
    }

    async fn send_message(&self, message: &Message) -> Result<(), SessionError> {
        self.send_frame(message.to_frame()).await
    }

    async fn send_command(
        &self,
        command: &str,
        params: &[String],
        content: &str,
    ) -> Result<(), SessionError> {
        let frame = Frame::new(command)
            .with_params(params.iter().cloned())
            .with_trailing(content);
        self.send_frame(frame).await
    }

    fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Asks a running receive loop to stop.
#[derive(Clone)]
pub struct DisconnectHandle {
    tx: mpsc::Sender<()>,
}

impl DisconnectHandle {
    /// Hand the stop signal to the loop.
    ///
    /// Waits only until the single signal slot takes it, not until the loop
    /// has exited; the loop notices at its next iteration boundary, after the
    /// decode in progress completes or times out.
    pub async fn disconnect(&self) {
        let _ = self.tx.send(()).await;
    }
}

pub struct Session {
    id: SessionId,
    config: Arc<SessionConfig>,
    handlers: Vec<Arc<dyn Handler>>,
    reader: Option<FrameReader>,
    writer: SessionWriter,
    done_tx: mpsc::Sender<()>,
    done_rx: mpsc::Receiver<()>,
}

impl Session {
    /// Create a disconnected session. No transport is opened until
    /// [`connect`](Self::connect).
    pub fn new(config: SessionConfig, handlers: Vec<Arc<dyn Handler>>) -> Self {
        let config = Arc::new(config);
        let (done_tx, done_rx) = mpsc::channel(1);
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            writer: SessionWriter::new(Arc::clone(&config)),
            config,
            handlers,
            reader: None,
            done_tx,
            done_rx,
        }
    }

    /// Session against Twitch's default server.
    pub fn twitch(
        channel: &str,
        username: &str,
        token: &str,
        tls: bool,
        handlers: Vec<Arc<dyn Handler>>,
    ) -> Self {
        Self::new(SessionConfig::twitch(channel, username, token, tls), handlers)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    pub fn is_connected(&self) -> bool {
        self.reader.is_some()
    }

    /// A send handle usable from outside the receive loop.
    pub fn writer(&self) -> SessionWriter {
        self.writer.clone()
    }

    pub fn disconnect_handle(&self) -> DisconnectHandle {
        DisconnectHandle {
            tx: self.done_tx.clone(),
        }
    }

    /// Dial the server and bind the codec, replacing any previous transport.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        let transport = connection::dial(&self.config).await?;
        let (read, write) = tokio::io::split(transport);
        self.reader = Some(FramedRead::new(read, FrameCodec::new()));
        self.writer
            .bind(FramedWrite::new(write, FrameCodec::new()))
            .await;
        info!(session = self.id, server = %self.config.server, tls = self.config.tls, "connected");
        Ok(())
    }

    /// Send PASS, NICK, JOIN and the capability requests, in that order.
    ///
    /// Stops at the first frame that fails. Nothing already sent is undone, so
    /// the session must be connected and authenticated again from scratch.
    pub async fn authenticate(&self) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        for frame in commands::handshake(&self.config) {
            let command = frame.command.clone();
            self.writer
                .send_frame(frame)
                .await
                .map_err(|source| SessionError::Handshake {
                    command,
                    source: Box::new(source),
                })?;
        }
        info!(session = self.id, channel = %self.config.channel_target(), "joined");
        Ok(())
    }

    /// Connect and authenticate again with the same config and handlers.
    pub async fn reconnect(&mut self) -> Result<(), SessionError> {
        self.connect().await?;
        self.authenticate().await
    }

    /// Run the receive loop until it stops, then close the transport.
    ///
    /// Returns `Ok(())` only when stopped through a [`DisconnectHandle`].
    pub async fn listen(&mut self) -> Result<(), SessionError> {
        let result = self.receive().await;
        self.shutdown().await;
        match &result {
            Ok(()) => info!(session = self.id, "disconnected"),
            Err(e) => warn!(session = self.id, error = %e, "receive loop ended"),
        }
        result
    }

    /// Connect, authenticate and listen, tagging any failure with this session.
    pub async fn run(mut self) -> Result<(), ChannelError> {
        let result = async {
            self.connect().await?;
            self.authenticate().await?;
            self.listen().await
        }
        .await;
        result.map_err(|source| ChannelError {
            session: self.id,
            channel: self.config.channel.clone(),
            source,
        })
    }

    async fn receive(&mut self) -> Result<(), SessionError> {
        let idle_timeout = self.config.idle_timeout;
        loop {
            if self.done_rx.try_recv().is_ok() {
                return Ok(());
            }

            let reader = self.reader.as_mut().ok_or(SessionError::NotConnected)?;
            let next = tokio::time::timeout(idle_timeout, reader.next()).await;

            // A stop requested while parked in decode wins over a quiet or closed stream.
            let frame = match next {
                Err(_) | Ok(None) if self.done_rx.try_recv().is_ok() => return Ok(()),
                Err(_) => return Err(SessionError::IdleTimeout(idle_timeout)),
                Ok(None) => return Err(SessionError::ConnectionClosed),
                Ok(Some(frame)) => frame?,
            };

            match FrameKind::classify(&frame) {
                FrameKind::KeepAlive => {
                    debug!(session = self.id, "PING");
                    self.writer.send_frame(commands::pong(&self.config)).await?;
                }
                FrameKind::Reconnect => {
                    warn!(session = self.id, "server requested reconnect");
                    self.reconnect().await?;
                }
                FrameKind::UserFacing => self.dispatch(Message::received(frame)),
            }
        }
    }

    fn dispatch(&self, message: Message) {
        for handler in &self.handlers {
            let handler = Arc::clone(handler);
            let writer = self.writer.clone();
            let message = message.clone();
            tokio::spawn(async move {
                handler.digest(message, &writer).await;
            });
        }
    }

    async fn shutdown(&mut self) {
        self.reader = None;
        if let Err(e) = self.writer.close().await {
            debug!(session = self.id, error = %e, "error closing transport");
        }
    }
}
