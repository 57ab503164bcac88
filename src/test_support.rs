//! Byte-level builders for canned backend replies, shared by the
//! loopback-driven tests in `connection`/`frame`/`query`. Test-only.
#![cfg(test)]

/// Frame a message body: `[type][length: body.len()+4][body]`.
pub(crate) fn frame(msgtype: u8, body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + body.len());
    out.push(msgtype);
    out.extend_from_slice(&((body.len() + 4) as u32).to_be_bytes());
    out.extend_from_slice(&body);
    out
}

/// One `RowDescription` field descriptor: name + the fixed 18-byte tail
/// (table_oid, column_id, datatype_oid, datatype_size, type_modifier,
/// format_code). `table_oid`/`column_id` are zeroed; `format_code` is 0
/// (text) as this core always reports it.
pub(crate) fn field(name: &str, datatype_oid: u32, type_modifier: i32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out.extend_from_slice(&0u32.to_be_bytes()); // table_oid
    out.extend_from_slice(&0u16.to_be_bytes()); // column_id
    out.extend_from_slice(&datatype_oid.to_be_bytes());
    out.extend_from_slice(&0i16.to_be_bytes()); // datatype_size
    out.extend_from_slice(&type_modifier.to_be_bytes());
    out.extend_from_slice(&0i16.to_be_bytes()); // format_code
    out
}

/// A `RowDescription` body: field count plus the concatenated field
/// descriptors built by [`field`].
pub(crate) fn row_description(fields: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(fields.len() as u16).to_be_bytes());
    for f in fields {
        out.extend_from_slice(f);
    }
    out
}

/// A `DataRow` body: cell count plus `{length, bytes}` per cell, `None`
/// encoded as length `-1` with no bytes.
pub(crate) fn data_row(cells: &[Option<&[u8]>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(cells.len() as u16).to_be_bytes());
    for cell in cells {
        match cell {
            Some(bytes) => {
                out.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
                out.extend_from_slice(bytes);
            }
            None => out.extend_from_slice(&(-1i32).to_be_bytes()),
        }
    }
    out
}

/// A `CommandComplete` body: the NUL-terminated tag.
pub(crate) fn command_complete(tag: &str) -> Vec<u8> {
    let mut out = tag.as_bytes().to_vec();
    out.push(0);
    out
}

/// A `ReadyForQuery` body: the single transaction-status byte.
pub(crate) fn ready_for_query(status: u8) -> Vec<u8> {
    vec![status]
}

/// An `ErrorResponse`/`NoticeResponse` body: `(code, NUL-string)` records
/// terminated by a `0` byte.
pub(crate) fn error_response(fields: &[(u8, &str)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (code, value) in fields {
        out.push(*code);
        out.extend_from_slice(value.as_bytes());
        out.push(0);
    }
    out.push(0);
    out
}

/// The `AuthenticationOk` body: subcode `0`.
pub(crate) fn authentication_ok() -> Vec<u8> {
    0i32.to_be_bytes().to_vec()
}

/// The `AuthenticationMD5Password` body: subcode `5` plus 4 salt bytes.
pub(crate) fn authentication_md5(salt: [u8; 4]) -> Vec<u8> {
    let mut out = 5i32.to_be_bytes().to_vec();
    out.extend_from_slice(&salt);
    out
}

/// The `BackendKeyData` body: process id + secret key.
pub(crate) fn backend_key_data(process_id: i32, secret_key: i32) -> Vec<u8> {
    let mut out = process_id.to_be_bytes().to_vec();
    out.extend_from_slice(&secret_key.to_be_bytes());
    out
}

/// A `ParameterStatus` body: two NUL-terminated strings.
pub(crate) fn parameter_status(name: &str, value: &str) -> Vec<u8> {
    let mut out = name.as_bytes().to_vec();
    out.push(0);
    out.extend_from_slice(value.as_bytes());
    out.push(0);
    out
}
