//! IRC line framing.
//!
//! [`FrameCodec`] splits the inbound byte stream on `\n`, tolerates a trailing
//! `\r`, and parses each line into a [`Frame`]. Outbound frames are written as
//! one `\r\n`-terminated line. IRCv3 tag sections on inbound lines are skipped.

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::CodecError;

/// Longest inbound line accepted, terminator included.
pub const MAX_LINE_LENGTH: usize = 8191;

/// The `name!user@host` routing prefix of a frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefix {
    pub name: String,
    pub user: String,
    pub host: String,
}

impl Prefix {
    pub fn parse(raw: &str) -> Self {
        let (rest, host) = raw.split_once('@').unwrap_or((raw, ""));
        let (name, user) = rest.split_once('!').unwrap_or((rest, ""));
        Self {
            name: name.to_string(),
            user: user.to_string(),
            host: host.to_string(),
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.user.is_empty() {
            write!(f, "!{}", self.user)?;
        }
        if !self.host.is_empty() {
            write!(f, "@{}", self.host)?;
        }
        Ok(())
    }
}

/// One IRC line: optional prefix, command, middle params and trailing text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub prefix: Option<Prefix>,
    pub command: String,
    pub params: Vec<String>,
    pub trailing: String,
}

impl Frame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = trailing.into();
        self
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Parse a single line, without its terminator.
    pub fn parse(line: &str) -> Result<Self, CodecError> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        // Tags are not interpreted, only skipped.
        if rest.starts_with('@') {
            rest = rest.split_once(' ').map_or("", |(_, r)| r);
        }
        rest = rest.trim_start_matches(' ');

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => {
                let (raw, remainder) = stripped.split_once(' ').unwrap_or((stripped, ""));
                rest = remainder.trim_start_matches(' ');
                Some(Prefix::parse(raw))
            }
            None => None,
        };

        let (head, trailing) = match rest.strip_prefix(':') {
            Some(t) => ("", t),
            None => rest.split_once(" :").unwrap_or((rest, "")),
        };

        let mut words = head.split(' ').filter(|w| !w.is_empty());
        let command = words
            .next()
            .ok_or_else(|| CodecError::MissingCommand {
                line: line.to_string(),
            })?
            .to_string();

        Ok(Self {
            prefix,
            command,
            params: words.map(str::to_string).collect(),
            trailing: trailing.to_string(),
        })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        f.write_str(&self.command)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        if !self.trailing.is_empty() {
            write!(f, " :{}", self.trailing)?;
        }
        Ok(())
    }
}

/// Whether `param` survives the wire as a single middle parameter.
fn is_middle_param(param: &str) -> bool {
    !param.is_empty()
        && !param.starts_with(':')
        && !param.contains([' ', '\r', '\n'])
}

/// Line codec producing and consuming [`Frame`]s.
#[derive(Debug, Default)]
pub struct FrameCodec {
    // Index already scanned for a newline, so partial reads are not rescanned.
    next_index: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, CodecError> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > MAX_LINE_LENGTH {
                    return Err(CodecError::LineTooLong {
                        max: MAX_LINE_LENGTH,
                    });
                }
                self.next_index = src.len();
                return Ok(None);
            };

            let end = self.next_index + offset;
            self.next_index = 0;
            if end + 1 > MAX_LINE_LENGTH {
                return Err(CodecError::LineTooLong {
                    max: MAX_LINE_LENGTH,
                });
            }

            let raw = src.split_to(end + 1);
            let line = String::from_utf8_lossy(&raw);
            if line.trim().is_empty() {
                continue;
            }
            return Frame::parse(&line).map(Some);
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, CodecError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        self.next_index = 0;
        let line = String::from_utf8_lossy(&src[..]).into_owned();
        src.advance(src.len());
        if line.trim().is_empty() {
            return Ok(None);
        }
        Frame::parse(&line).map(Some)
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), CodecError> {
        if let Some(param) = frame.params.iter().find(|p| !is_middle_param(p)) {
            return Err(CodecError::InvalidParam {
                param: param.clone(),
            });
        }

        // A stray line break inside a field would split the frame in two.
        let line = frame.to_string().replace(['\r', '\n'], " ");
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
