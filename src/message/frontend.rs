//! Frontend (client-to-server) message types.
use bytes::{BufMut, BytesMut};

use crate::ext::{BufMutExt, StrExt, UsizeExt};

/// Write a frontend message to `buf`, filling in the type byte and the
/// self-inclusive length prefix.
pub fn write<F: FrontendProtocol>(msg: F, buf: &mut BytesMut) {
    const PREFIX: usize = 1 + 4;

    let size_hint = msg.size_hint();
    buf.reserve(PREFIX + size_hint as usize);

    let offset = buf.len();
    buf.put_u8(F::MSGTYPE);
    buf.put_u32(4 + size_hint);

    msg.encode(&mut *buf);

    debug_assert_eq!(
        buf.len() - offset,
        PREFIX + size_hint as usize,
        "frontend message body size did not match its size hint"
    );
}

/// A type that can be encoded as a frontend message body.
pub trait FrontendProtocol {
    /// The one-byte message type.
    const MSGTYPE: u8;

    /// Size of the body, not counting the type byte or length prefix.
    fn size_hint(&self) -> u32;

    /// Write the body. Must write exactly [`size_hint`][Self::size_hint] bytes.
    fn encode(self, buf: impl BufMut);
}

/// The startup message. Has no type byte, so it does not implement
/// [`FrontendProtocol`] — use [`Startup::write`] directly.
#[derive(Debug)]
pub struct Startup<'a> {
    /// The database user name to connect as. Required.
    pub user: &'a str,
    /// The database to connect to. Defaults to the user name.
    pub database: Option<&'a str>,
    /// Reported to the server for diagnostics; defaults to `"libpx"`.
    pub application_name: Option<&'a str>,
}

impl Startup<'_> {
    pub fn write(self, buf: &mut BytesMut) {
        let offset = buf.len();

        buf.put_u32(0);
        buf.put_u32(0x0003_0000);

        buf.put_nul_string("user");
        buf.put_nul_string(self.user);

        if let Some(db) = self.database {
            buf.put_nul_string("database");
            buf.put_nul_string(db);
        }

        buf.put_nul_string("application_name");
        buf.put_nul_string(self.application_name.unwrap_or("libpx"));

        buf.put_u8(b'\0');

        let mut written = &mut buf[offset..];
        written.put_u32(written.len().to_u32());
    }
}

/// A password response, sent in cleartext or as the `md5...` challenge
/// payload — the caller is responsible for computing the latter.
pub struct PasswordMessage<'a> {
    pub password: &'a str,
}

impl FrontendProtocol for PasswordMessage<'_> {
    const MSGTYPE: u8 = b'p';

    fn size_hint(&self) -> u32 {
        self.password.nul_string_len() as u32
    }

    fn encode(self, mut buf: impl BufMut) {
        buf.put_nul_string(self.password);
    }
}

/// A simple-query request: a single NUL-terminated SQL string, possibly
/// containing several `;`-separated statements.
pub struct Query<'a> {
    pub sql: &'a str,
}

impl FrontendProtocol for Query<'_> {
    const MSGTYPE: u8 = b'Q';

    fn size_hint(&self) -> u32 {
        self.sql.nul_string_len() as u32
    }

    fn encode(self, mut buf: impl BufMut) {
        buf.put_nul_string(self.sql);
    }
}

/// Parse step of the extended pipeline: creates an (anonymous) prepared
/// statement from a command string plus a list of parameter type OIDs.
pub struct Parse<'a> {
    pub sql: &'a str,
    pub param_oids: &'a [u32],
}

impl FrontendProtocol for Parse<'_> {
    const MSGTYPE: u8 = b'P';

    fn size_hint(&self) -> u32 {
        // empty statement name
        1 + self.sql.nul_string_len() as u32 + 2 + 4 * self.param_oids.len().to_u32()
    }

    fn encode(self, mut buf: impl BufMut) {
        buf.put_u8(0); // empty statement name, NUL only
        buf.put_nul_string(self.sql);
        buf.put_u16(self.param_oids.len().to_u16());
        for oid in self.param_oids {
            buf.put_u32(*oid);
        }
    }
}

/// A single bound parameter's wire representation: `None` encodes SQL
/// NULL (`length = -1`, no bytes).
pub type BindParam<'a> = Option<&'a [u8]>;

/// Bind step: creates an anonymous portal from the anonymous statement,
/// supplying text-format values for its parameters.
///
/// Field order on the wire is portal name, statement name,
/// parameter-format-count (always 0: all-default/text), parameter count,
/// then `{length, bytes}` per parameter, then a trailing
/// result-format-count (always 0: all-default/text).
pub struct Bind<'a> {
    pub params: &'a [BindParam<'a>],
}

impl FrontendProtocol for Bind<'_> {
    const MSGTYPE: u8 = b'B';

    fn size_hint(&self) -> u32 {
        let params_size: u32 = self
            .params
            .iter()
            .map(|p| 4 + p.map_or(0, |bytes| bytes.len().to_u32()))
            .sum();
        1 + 1 + 2 + 2 + params_size + 2
    }

    fn encode(self, mut buf: impl BufMut) {
        buf.put_u8(0); // empty portal name
        buf.put_u8(0); // empty statement name
        buf.put_u16(0); // parameter-format-count: all text
        buf.put_u16(self.params.len().to_u16());
        for param in self.params {
            match param {
                Some(bytes) => {
                    buf.put_u32(bytes.len().to_u32());
                    buf.put(*bytes);
                }
                None => buf.put_i32(-1),
            }
        }
        buf.put_u16(0); // result-format-count: all text
    }
}

/// Describe step, restricted to the anonymous portal (`'P'`) — this core
/// never describes named statements.
pub struct DescribePortal;

impl FrontendProtocol for DescribePortal {
    const MSGTYPE: u8 = b'D';

    fn size_hint(&self) -> u32 {
        1 + 1 // 'P' + empty NUL name
    }

    fn encode(self, mut buf: impl BufMut) {
        buf.put_u8(b'P');
        buf.put_u8(0);
    }
}

/// Execute step against the anonymous portal, with no row limit.
pub struct Execute;

impl FrontendProtocol for Execute {
    const MSGTYPE: u8 = b'E';

    fn size_hint(&self) -> u32 {
        1 + 4 // empty NUL name + max_row
    }

    fn encode(self, mut buf: impl BufMut) {
        buf.put_u8(0);
        buf.put_u32(0);
    }
}

/// Close a portal (`'P'`) or statement (`'S'`), always the anonymous one.
pub struct Close {
    pub variant: u8,
}

impl FrontendProtocol for Close {
    const MSGTYPE: u8 = b'C';

    fn size_hint(&self) -> u32 {
        1 + 1
    }

    fn encode(self, mut buf: impl BufMut) {
        buf.put_u8(self.variant);
        buf.put_u8(0);
    }
}

/// Flush the extended pipeline and request `ReadyForQuery`.
pub struct Sync;

impl FrontendProtocol for Sync {
    const MSGTYPE: u8 = b'S';

    fn size_hint(&self) -> u32 {
        0
    }

    fn encode(self, _: impl BufMut) {}
}

/// Politely end the session.
pub struct Terminate;

impl FrontendProtocol for Terminate {
    const MSGTYPE: u8 = b'X';

    fn size_hint(&self) -> u32 {
        0
    }

    fn encode(self, _: impl BufMut) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_matches_literal_scenario_bytes() {
        let mut buf = BytesMut::new();
        Startup {
            user: "alice",
            database: Some("db"),
            application_name: None,
        }
        .write(&mut buf);

        let mut expected = BytesMut::new();
        expected.extend_from_slice(&[0x00, 0x03, 0x00, 0x00]);
        expected.extend_from_slice(b"user\0alice\0");
        expected.extend_from_slice(b"database\0db\0");
        expected.extend_from_slice(b"application_name\0libpx\0");
        expected.put_u8(0);

        let len = (buf.len() as u32).to_be_bytes();
        assert_eq!(&buf[0..4], &len);
        assert_eq!(&buf[4..], &expected[..]);
    }

    #[test]
    fn query_size_hint_matches_encoded_len() {
        let mut buf = BytesMut::new();
        write(Query { sql: "select 1" }, &mut buf);
        assert_eq!(buf.len(), 5 + "select 1".len() + 1);
    }

    #[test]
    fn bind_encodes_null_as_minus_one_length() {
        let mut buf = BytesMut::new();
        write(Bind { params: &[None] }, &mut buf);
        // type + length + portal NUL + stmt NUL + fmt count + param count + (len i32)
        let tail = &buf[buf.len() - 4..];
        assert_eq!(tail, &(-1i32).to_be_bytes());
    }

    #[test]
    fn bind_format_counts_are_zero() {
        let mut buf = BytesMut::new();
        write(
            Bind {
                params: &[Some(b"hi")],
            },
            &mut buf,
        );
        // after type(1)+len(4)+portal(1)+stmt(1) comes the param-format-count u16
        assert_eq!(&buf[7..9], &0u16.to_be_bytes());
    }
}
