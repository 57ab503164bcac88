//! Library error model.
//!
//! Mirrors the split the teacher crate uses: a top-level [`Error`] enum
//! wrapping an I/O failure, a framing/[`ProtocolError`], or a parsed
//! [`DatabaseError`]. `last_error` on [`crate::Connection`] stores the same
//! [`DatabaseError`] shape so synthetic errors (timeouts, auth failures)
//! and server-sent ones are interchangeable to callers.
use std::io;

use crate::message::ProtocolError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error returned by connection and query operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `opening an already-open connection.
    #[error("connection is not closed")]
    NotClosed,
    /// DNS resolution or TCP connect failed.
    #[error("invalid host: {0}")]
    InvalidHost(#[source] io::Error),
    /// Write failed before or during `StartupMessage`.
    #[error("cannot send startup message: {0}")]
    CannotSendStartup(#[source] io::Error),
    /// Server requested a password and none was available; caller must
    /// supply one and re-invoke `authenticate`.
    #[error("a password is required to authenticate")]
    AuthenticationNeeded,
    /// Server rejected credentials, or closed the stream during auth.
    #[error("authentication failed")]
    AuthenticationFailed(#[source] Box<DatabaseError>),
    /// A frame arrived that is not valid for the current protocol state.
    #[error("unrecognized server message: {0:?}")]
    UnrecognizedServerMessage(u8),
    /// Server sent `ErrorResponse`.
    #[error("{0}")]
    ServerError(#[from] DatabaseError),
    /// Socket read/write failed, or a per-frame timeout elapsed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Malformed frame body (short read, bad length, non-UTF8 string, ...).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// A `Query` was issued against a connection that is not `Open`.
    #[error("connection is not open")]
    NotOpen,
}

impl Error {
    pub(crate) fn io_timeout() -> Error {
        Error::Io(io::Error::new(io::ErrorKind::TimedOut, "frame read timed out"))
    }
}

/// SQLSTATE used for synthetic I/O failures (§7).
pub const SQLSTATE_IO_ERROR: &str = "58030";
/// SQLSTATE used for synthetic authentication failures (§7).
pub const SQLSTATE_AUTH_FAILED: &str = "28P01";

/// A structured server error, decoded from `ErrorResponse`'s
/// `(field_code, value)` records (§4.1), or synthesized by the core for
/// I/O and authentication failures (§7).
#[derive(Debug, Clone, Default)]
pub struct DatabaseError {
    pub severity: Option<String>,
    pub sqlstate: Option<String>,
    pub message: Option<String>,
    pub detail: Option<String>,
    pub hint: Option<String>,
    pub position: Option<String>,
    pub internal_position: Option<String>,
    pub internal_query: Option<String>,
    pub where_: Option<String>,
    pub file: Option<String>,
    pub line: Option<String>,
    pub routine: Option<String>,
}

impl DatabaseError {
    pub(crate) fn set_field(&mut self, code: u8, value: String) {
        match code {
            b'S' => self.severity = Some(value),
            b'C' => self.sqlstate = Some(value),
            b'M' => self.message = Some(value),
            b'D' => self.detail = Some(value),
            b'H' => self.hint = Some(value),
            b'P' => self.position = Some(value),
            b'p' => self.internal_position = Some(value),
            b'q' => self.internal_query = Some(value),
            b'W' => self.where_ = Some(value),
            b'F' => self.file = Some(value),
            b'L' => self.line = Some(value),
            b'R' => self.routine = Some(value),
            _ => {} // unknown field codes are ignored per §4.1
        }
    }

    pub(crate) fn io_error(err: &io::Error) -> DatabaseError {
        DatabaseError {
            severity: Some("ERROR".into()),
            sqlstate: Some(SQLSTATE_IO_ERROR.into()),
            message: Some(err.to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn auth_failed(message: impl Into<String>) -> DatabaseError {
        DatabaseError {
            severity: Some("FATAL".into()),
            sqlstate: Some(SQLSTATE_AUTH_FAILED.into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.severity.as_deref().unwrap_or("ERROR"),
            self.message.as_deref().unwrap_or("unknown server error"),
        )?;
        if let Some(sqlstate) = &self.sqlstate {
            write!(f, " ({sqlstate})")?;
        }
        Ok(())
    }
}

impl std::error::Error for DatabaseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_field_codes_are_ignored() {
        let mut err = DatabaseError::default();
        err.set_field(b'Z', "should be dropped".into());
        assert!(err.message.is_none());
        assert!(err.severity.is_none());
    }

    #[test]
    fn io_error_uses_58030_sqlstate() {
        let io_err = io::Error::new(io::ErrorKind::TimedOut, "boom");
        let db = DatabaseError::io_error(&io_err);
        assert_eq!(db.sqlstate.as_deref(), Some(SQLSTATE_IO_ERROR));
    }

    #[test]
    fn auth_failed_uses_28p01_sqlstate() {
        let db = DatabaseError::auth_failed("bad password");
        assert_eq!(db.sqlstate.as_deref(), Some(SQLSTATE_AUTH_FAILED));
    }
}
