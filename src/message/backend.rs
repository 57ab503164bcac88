//! Backend (server-to-client) message types.
use bytes::{Buf, Bytes};

use super::error::ProtocolError;
use crate::error::DatabaseError;
use crate::ext::BytesExt;

/// A type that can be decoded from a backend frame's `(type, body)` pair.
pub trait BackendProtocol: Sized {
    fn decode(msgtype: u8, body: Bytes) -> Result<Self, ProtocolError>;
}

/// Any backend message recognized by this core. Frame types outside this
/// set are logged and dropped by the frame reader, never reaching here.
#[derive(Debug)]
pub enum BackendMessage {
    Authentication(Authentication),
    BackendKeyData(BackendKeyData),
    BindComplete(BindComplete),
    CloseComplete(CloseComplete),
    CommandComplete(CommandComplete),
    DataRow(DataRow),
    ErrorResponse(ErrorResponse),
    NoticeResponse(NoticeResponse),
    ParameterStatus(ParameterStatus),
    ParseComplete(ParseComplete),
    ReadyForQuery(ReadyForQuery),
    RowDescription(RowDescription),
}

macro_rules! match_backend {
    ($($name:ident,)*) => {
        impl BackendMessage {
            pub fn msgtype(&self) -> u8 {
                match self {
                    $(Self::$name(_) => $name::MSGTYPE,)*
                }
            }
        }
        impl BackendProtocol for BackendMessage {
            fn decode(msgtype: u8, body: Bytes) -> Result<Self, ProtocolError> {
                let message = match msgtype {
                    $($name::MSGTYPE => Self::$name(<$name as BackendProtocol>::decode(msgtype, body)?),)*
                    found => return Err(ProtocolError::unknown(found)),
                };
                Ok(message)
            }
        }
    };
}

match_backend! {
    Authentication,
    BackendKeyData,
    BindComplete,
    CloseComplete,
    CommandComplete,
    DataRow,
    ErrorResponse,
    NoticeResponse,
    ParameterStatus,
    ParseComplete,
    ReadyForQuery,
    RowDescription,
}

macro_rules! assert_msgtype {
    ($name:ident, $found:ident) => {
        if $name::MSGTYPE != $found {
            return Err(ProtocolError::unexpected($name::MSGTYPE, $found));
        }
    };
}

/// `R`: an authentication request or acceptance.
#[derive(Debug)]
pub enum Authentication {
    Ok,
    /// Salted MD5 challenge; the 4 raw salt bytes follow the subcode.
    MD5Password { salt: [u8; 4] },
    /// Any subcode this core does not implement (GSSAPI, SASL, ...).
    Unsupported(i32),
}

impl Authentication {
    pub const MSGTYPE: u8 = b'R';
}

impl BackendProtocol for Authentication {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(Authentication, msgtype);
        Ok(match body.get_i32() {
            0 => Authentication::Ok,
            5 => {
                let salt = body.get_u32().to_be_bytes();
                Authentication::MD5Password { salt }
            }
            other => Authentication::Unsupported(other),
        })
    }
}

/// `K`: cancel-request material. Stored but never acted on by this core.
#[derive(Debug)]
pub struct BackendKeyData {
    pub process_id: i32,
    pub secret_key: i32,
}

impl BackendKeyData {
    pub const MSGTYPE: u8 = b'K';
}

impl BackendProtocol for BackendKeyData {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(BackendKeyData, msgtype);
        Ok(Self {
            process_id: body.get_i32(),
            secret_key: body.get_i32(),
        })
    }
}

/// `S`: a single run-time parameter update. `Connection` upserts these
/// into its parameter table, last value wins.
#[derive(Debug)]
pub struct ParameterStatus {
    pub name: String,
    pub value: String,
}

impl ParameterStatus {
    pub const MSGTYPE: u8 = b'S';
}

impl BackendProtocol for ParameterStatus {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(ParameterStatus, msgtype);
        Ok(Self {
            name: body.get_nul_string()?,
            value: body.get_nul_string()?,
        })
    }
}

/// `N`: a warning the server wants displayed; does not end the request.
#[derive(Debug)]
pub struct NoticeResponse {
    pub body: Bytes,
}

impl NoticeResponse {
    pub const MSGTYPE: u8 = b'N';
}

impl BackendProtocol for NoticeResponse {
    fn decode(msgtype: u8, body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(NoticeResponse, msgtype);
        Ok(Self { body })
    }
}

/// `E`: a fatal-to-the-request error. The raw field records are parsed
/// lazily via [`Self::into_db_error`] since this core has no use for the
/// byte layout once it becomes a [`DatabaseError`].
#[derive(Debug)]
pub struct ErrorResponse {
    pub body: Bytes,
}

impl ErrorResponse {
    pub const MSGTYPE: u8 = b'E';

    pub fn into_db_error(self) -> DatabaseError {
        parse_error_fields(self.body)
    }
}

impl BackendProtocol for ErrorResponse {
    fn decode(msgtype: u8, body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(ErrorResponse, msgtype);
        Ok(Self { body })
    }
}

/// Shared by `ErrorResponse` and `NoticeResponse`: a run of
/// `(field_code: u8, value: NUL-string)` pairs terminated by a `0` byte.
pub(crate) fn parse_error_fields(mut body: Bytes) -> DatabaseError {
    let mut error = DatabaseError::default();
    loop {
        let code = body.get_u8();
        if code == 0 {
            break;
        }
        match body.get_nul_string() {
            Ok(value) => error.set_field(code, value),
            Err(_) => break,
        }
    }
    error
}

/// One column descriptor within a [`RowDescription`].
#[derive(Debug)]
pub struct FieldDescription {
    pub field_name: String,
    pub table_oid: u32,
    pub column_id: u16,
    pub data_type: u32,
    pub data_type_size: i16,
    pub type_modifier: i32,
    pub format_code: i16,
}

impl FieldDescription {
    fn decode(body: &mut Bytes) -> Result<Self, ProtocolError> {
        Ok(Self {
            field_name: body.get_nul_string()?,
            table_oid: body.get_u32(),
            column_id: body.get_u16(),
            data_type: body.get_u32(),
            data_type_size: body.get_i16(),
            type_modifier: body.get_i32(),
            format_code: body.get_i16(),
        })
    }
}

/// `T`: describes the column layout of the rows about to follow.
#[derive(Debug)]
pub struct RowDescription {
    pub fields: Vec<FieldDescription>,
}

impl RowDescription {
    pub const MSGTYPE: u8 = b'T';
}

impl BackendProtocol for RowDescription {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(RowDescription, msgtype);
        let count = body.get_u16();
        let mut fields = Vec::with_capacity(count as usize);
        for _ in 0..count {
            fields.push(FieldDescription::decode(&mut body)?);
        }
        Ok(Self { fields })
    }
}

/// One cell within a [`DataRow`]: `None` is SQL NULL, `Some` carries the
/// text-format value bytes verbatim.
pub type Cell = Option<Bytes>;

/// `D`: one row of a query's result. Cell byte ranges alias the decoded
/// body buffer; callers that outlive it must copy.
#[derive(Debug)]
pub struct DataRow {
    pub cells: Vec<Cell>,
}

impl DataRow {
    pub const MSGTYPE: u8 = b'D';
}

impl BackendProtocol for DataRow {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(DataRow, msgtype);
        let count = body.get_u16();
        let mut cells = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = body.get_i32();
            if len < 0 {
                cells.push(None);
            } else {
                cells.push(Some(body.split_to(len as usize)));
            }
        }
        Ok(Self { cells })
    }
}

/// `C`: a command finished; `tag` is parsed by [`crate::result`] into a
/// [`crate::result::CommandType`] and an affected-row count.
#[derive(Debug)]
pub struct CommandComplete {
    pub tag: String,
}

impl CommandComplete {
    pub const MSGTYPE: u8 = b'C';
}

impl BackendProtocol for CommandComplete {
    fn decode(msgtype: u8, mut body: Bytes) -> Result<Self, ProtocolError> {
        assert_msgtype!(CommandComplete, msgtype);
        Ok(Self {
            tag: body.get_nul_string()?,
        })
    }
}

macro_rules! unit_msg {
    ($(
        $(#[$doc:meta])* struct $name:ident, $ty:literal;
    )*) => {$(
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name;

        impl $name {
            pub const MSGTYPE: u8 = $ty;
        }

        impl BackendProtocol for $name {
            fn decode(msgtype: u8, _: Bytes) -> Result<Self, ProtocolError> {
                assert_msgtype!($name, msgtype);
                Ok(Self)
            }
        }
    )*};
}

unit_msg! {
    /// `1`: the prior `Parse` succeeded.
    struct ParseComplete, b'1';

    /// `2`: the prior `Bind` succeeded.
    struct BindComplete, b'2';

    /// `3`: the prior `Close` succeeded.
    struct CloseComplete, b'3';

    /// `Z`: the server is idle and awaiting the next request. Body is a
    /// single transaction-status byte (`I`/`T`/`E`), read in [`ReadyForQuery::decode`].
    struct ReadyForQuery, b'Z';
}

impl ReadyForQuery {
    /// Transaction status byte: `'I'` idle, `'T'` in transaction, `'E'` failed.
    pub fn status(body: &Bytes) -> u8 {
        body.first().copied().unwrap_or(b'I')
    }
}
