//! Credential and session token types.

use uuid::Uuid;

/// Length of the shared secret in bytes.
pub const CREDENTIAL_LEN: usize = 4;

/// Length of a session token on the wire (hyphenated UUID).
pub const TOKEN_LEN: usize = 36;

/// Fixed 4-byte shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential([u8; CREDENTIAL_LEN]);

impl Credential {
    pub const DEFAULT: Credential = Credential([1, 2, 3, 4]);

    pub const fn new(bytes: [u8; CREDENTIAL_LEN]) -> Self {
        Self(bytes)
    }

    /// Build from a slice of exactly [`CREDENTIAL_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; CREDENTIAL_LEN]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True when the first [`CREDENTIAL_LEN`] bytes of `request` equal the secret.
    /// Trailing bytes are ignored.
    pub fn matches(&self, request: &[u8]) -> bool {
        request.len() >= CREDENTIAL_LEN && request[..CREDENTIAL_LEN] == self.0
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Opaque bearer token minted per successful authentication.
///
/// Tokens never expire and are not bound to a connection; any holder can
/// redeem one at the Transform Service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Mint a fresh token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Interpret wire bytes as a token. Must be exactly [`TOKEN_LEN`] ASCII bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != TOKEN_LEN || !bytes.is_ascii() {
            return None;
        }
        std::str::from_utf8(bytes).ok().map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
