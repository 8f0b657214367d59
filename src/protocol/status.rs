//! Status byte carried at the front of every backend reply.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Leading byte of a backend reply.
///
/// The same values are reused by both services; the Transform Service
/// overloads `Unauthorized` for store lookup failures unless the extended
/// status profile is enabled.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Unauthorized = 0,
    Ok = 1,
    InternalFailure = 2,
}

impl Status {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Status::Unauthorized),
            1 => Some(Status::Ok),
            2 => Some(Status::InternalFailure),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Label used for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unauthorized => "unauthorized",
            Status::Ok => "ok",
            Status::InternalFailure => "internal_failure",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reply frame that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReply {
    #[error("empty reply")]
    Empty,

    #[error("unknown status byte {0}")]
    UnknownStatus(u8),
}

/// A decoded backend reply: status plus whatever followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    pub body: Bytes,
}

impl Reply {
    /// Bare status reply with no body.
    pub fn status(status: Status) -> Self {
        Self {
            status,
            body: Bytes::new(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: Status::Ok,
            body: body.into(),
        }
    }

    /// Encode as `[status] + body`.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(1 + self.body.len());
        buf.put_u8(self.status.as_byte());
        buf.put_slice(&self.body);
        buf.freeze()
    }

    /// Split a frame into status and body.
    pub fn decode(mut frame: Bytes) -> Result<Self, MalformedReply> {
        let Some(&first) = frame.first() else {
            return Err(MalformedReply::Empty);
        };
        let status = Status::from_byte(first).ok_or(MalformedReply::UnknownStatus(first))?;
        let body = frame.split_off(1);
        Ok(Self { status, body })
    }
}
