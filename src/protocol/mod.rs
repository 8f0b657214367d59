//! Backend wire protocol.
//!
//! # Wire Format
//! ```text
//! frame   = u32 length (big endian) ++ body
//!
//! auth request       = credential (4 bytes) ++ ignored
//! auth reply         = status ++ token (36 ASCII bytes, only when status = OK)
//! transform request  = token (36 bytes) ++ UTF-8 payload
//! transform reply    = status ++ upper-cased payload (only when status = OK)
//!
//! status: 0 = unauthorized, 1 = ok, 2 = internal failure
//! ```

pub mod codec;
pub mod status;
pub mod token;

pub use codec::{frame_codec, framed, DEFAULT_MAX_FRAME_LENGTH};
pub use status::{MalformedReply, Reply, Status};
pub use token::{Credential, SessionToken, CREDENTIAL_LEN, TOKEN_LEN};
