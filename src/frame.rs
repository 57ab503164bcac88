//! The blocking frame reader: turns a [`TcpStream`] into a stream of
//! decoded [`BackendMessage`]s, with millisecond-granularity per-frame
//! timeouts and transparent drop-and-continue of unrecognized frame types.
use std::io::{self, Read};
use std::net::TcpStream;
use std::time::Duration;

use bytes::Bytes;

use crate::message::{BackendMessage, BackendProtocol, ProtocolError};

const HEADER_LEN: usize = 5;

/// Block for up to `timeout_ms` milliseconds (`-1` ⇒ forever) for the
/// socket to have readable bytes, without consuming any.
pub fn poll(stream: &TcpStream, timeout_ms: i64) -> io::Result<bool> {
    stream.set_read_timeout(if timeout_ms < 0 {
        None
    } else {
        Some(Duration::from_millis(timeout_ms as u64))
    })?;

    let mut byte = [0u8; 1];
    match stream.peek(&mut byte) {
        Ok(n) => Ok(n > 0),
        Err(err) if err.kind() == io::ErrorKind::WouldBlock || err.kind() == io::ErrorKind::TimedOut => {
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Read exactly one frame's header and body, blocking until both are
/// available. A short read (the connection closing mid-frame) is a fatal
/// I/O error for that frame.
fn read_one(stream: &mut TcpStream) -> io::Result<(u8, Bytes)> {
    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header)?;

    let msgtype = header[0];
    let len = i32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    let body_len = (len - 4).max(0) as usize;

    let mut body = vec![0u8; body_len];
    stream.read_exact(&mut body)?;

    Ok((msgtype, Bytes::from(body)))
}

/// Read frames until one decodes to a recognized [`BackendMessage`],
/// logging and discarding any unrecognized frame type along the way
/// without tearing down the connection.
pub fn read_message(stream: &mut TcpStream, timeout_ms: i64) -> crate::Result<BackendMessage> {
    loop {
        if !poll(stream, timeout_ms)? {
            return Err(crate::Error::io_timeout());
        }

        let (msgtype, body) = read_one(stream)?;

        crate::trace!("(B) type={:?} len={}", msgtype as char, body.len());

        match BackendMessage::decode(msgtype, body) {
            Ok(message) => return Ok(message),
            Err(ProtocolError::Unexpected { expect: None, found }) => {
                crate::warn!("dropping unrecognized backend message type {found:?}");
                continue;
            }
            Err(other) => return Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn poll_returns_false_on_timeout_with_no_data() {
        let (client, _server) = pair();
        assert!(!poll(&client, 20).unwrap());
    }

    #[test]
    fn poll_returns_true_once_data_arrives() {
        use std::io::Write;
        let (client, mut server) = pair();
        server.write_all(b"Z\0\0\0\x05I").unwrap();
        assert!(poll(&client, 1000).unwrap());
    }

    #[test]
    fn read_message_decodes_ready_for_query() {
        use std::io::Write;
        let (mut client, mut server) = pair();
        server.write_all(b"Z\0\0\0\x05I").unwrap();
        let msg = read_message(&mut client, 1000).unwrap();
        assert!(matches!(msg, BackendMessage::ReadyForQuery(_)));
    }

    #[test]
    fn read_message_skips_unknown_type_and_keeps_reading() {
        use std::io::Write;
        let (mut client, mut server) = pair();
        // unknown type '~' with empty body, then a real ReadyForQuery
        server.write_all(b"~\0\0\0\x04").unwrap();
        server.write_all(b"Z\0\0\0\x05I").unwrap();
        let msg = read_message(&mut client, 1000).unwrap();
        assert!(matches!(msg, BackendMessage::ReadyForQuery(_)));
    }
}
