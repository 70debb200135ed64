//! IRC protocol layer: line codec, Twitch commands, transport, and the session loop.

pub mod codec;
pub mod commands;
pub mod connection;
pub mod handler;
pub mod message;
pub mod session;
