//! Frontend and backend message encoding/decoding.
//!
//! All integers on the wire are big-endian. Every frame but the initial
//! `StartupMessage` has shape `[type: u8][length: i32 BE][body]`; the
//! length counts itself but not the type byte. `StartupMessage` omits the
//! type byte entirely.
//!
//! <https://www.postgresql.org/docs/current/protocol-message-formats.html>

pub mod backend;
pub mod error;
pub mod frontend;

pub use backend::{BackendMessage, BackendProtocol};
pub use error::ProtocolError;
pub use frontend::FrontendProtocol;
