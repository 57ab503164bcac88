//! Framing and decode errors (distinct from [`crate::error::DatabaseError`],
//! which carries a server's `ErrorResponse`).
use std::str::Utf8Error;

/// An error while decoding a backend frame.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("expected message type {expect:?}, found {found:?}")]
    Unexpected { expect: Option<u8>, found: u8 },
    #[error("message body was not valid UTF-8: {0}")]
    NonUtf8(#[source] Utf8Error),
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },
}

impl ProtocolError {
    pub(crate) fn unknown(found: u8) -> ProtocolError {
        ProtocolError::Unexpected { expect: None, found }
    }

    pub(crate) fn unexpected(expect: u8, found: u8) -> ProtocolError {
        ProtocolError::Unexpected { expect: Some(expect), found }
    }
}

impl From<Utf8Error> for ProtocolError {
    fn from(err: Utf8Error) -> Self {
        ProtocolError::NonUtf8(err)
    }
}
