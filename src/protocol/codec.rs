//! Length-delimited framing for the backend protocols.
//!
//! Each logical request or reply is one frame: a 4-byte big-endian length
//! followed by the frame body.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Frame body limit used when none is configured (1 MiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// Build the frame codec with the given body size limit.
pub fn frame_codec(max_frame_length: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(max_frame_length)
        .new_codec()
}

/// Wrap an I/O object in the frame codec.
pub fn framed<T>(io: T, max_frame_length: usize) -> Framed<T, LengthDelimitedCodec>
where
    T: AsyncRead + AsyncWrite,
{
    Framed::new(io, frame_codec(max_frame_length))
}
