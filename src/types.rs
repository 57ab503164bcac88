//! OID-to-name rendering and cell-value stringification (§4.4).
//!
//! Two independent tables, mirroring the two original C functions they are
//! grounded on: column *type names* (`px_result_get_fixed_datatype_as_string`,
//! extended with additional named OIDs from `data_type.h` not present in
//! the distilled spec's abbreviated list) and *cell value* rendering
//! (`px_result_copy_cell_value_as_string`), which has its own, narrower
//! whitelist of directly-copyable types — anything else renders as the
//! `#<oid> (<len>) "<raw>"` placeholder, bytes or no.

pub mod oid {
    pub const BOOL: u32 = 16;
    pub const BYTE: u32 = 17;
    pub const CHAR: u32 = 18;
    pub const NAME: u32 = 19;
    pub const INT8: u32 = 20;
    pub const INT2: u32 = 21;
    pub const INT2VECTOR: u32 = 22;
    pub const INT4: u32 = 23;
    pub const REGPROC: u32 = 24;
    pub const TEXT: u32 = 25;
    pub const OID: u32 = 26;
    pub const TID: u32 = 27;
    pub const XID: u32 = 28;
    pub const CID: u32 = 29;
    pub const OIDVECTOR: u32 = 30;
    pub const POINT: u32 = 600;
    pub const LSEG: u32 = 601;
    pub const BOX: u32 = 603;
    pub const POLYGON: u32 = 604;
    pub const LINE: u32 = 628;
    pub const FLOAT4: u32 = 700;
    pub const FLOAT8: u32 = 701;
    pub const ABSTIME: u32 = 702;
    pub const RELTIME: u32 = 703;
    pub const TINTERVAL: u32 = 704;
    pub const CIRCLE: u32 = 718;
    pub const MONEY: u32 = 790;
    pub const MACADDR: u32 = 829;
    pub const INET: u32 = 869;
    pub const CIDR: u32 = 650;
    pub const INT2_ARRAY: u32 = 1005;
    pub const INT4_ARRAY: u32 = 1007;
    pub const TEXT_ARRAY: u32 = 1009;
    pub const FLOAT4_ARRAY: u32 = 1021;
    pub const OID_ARRAY: u32 = 1028;
    pub const ACLITEM: u32 = 1033;
    pub const ACLITEM_ARRAY: u32 = 1034;
    pub const CSTRING: u32 = 1263;
    pub const BPCHAR: u32 = 1042;
    pub const VARCHAR: u32 = 1043;
    pub const DATE: u32 = 1082;
    pub const TIME: u32 = 1083;
    pub const TIMESTAMP: u32 = 1114;
    pub const TIMESTAMPTZ: u32 = 1184;
    pub const INTERVAL: u32 = 1186;
    pub const TIMETZ: u32 = 1266;
    pub const BIT: u32 = 1560;
    pub const VARBIT: u32 = 1562;
    pub const NUMERIC: u32 = 1700;
    pub const REFCURSOR: u32 = 2202;
    pub const REGOPER: u32 = 2203;
    pub const REGOPERATOR: u32 = 2204;
    pub const REGCLASS: u32 = 2205;
    pub const REGTYPE: u32 = 2206;
    pub const REGTYPE_ARRAY: u32 = 2211;
    pub const UUID: u32 = 2950;
}

/// Column type name, e.g. for a `\d`-style description. `VARCHAR(n)` uses
/// `datatype_size` as `n`; unnamed OIDs render as `#<oid>`.
pub fn column_type_name(datatype_oid: u32, datatype_size: i16) -> String {
    if datatype_oid == oid::VARCHAR {
        return format!("varchar({datatype_size})");
    }

    match fixed_type_name(datatype_oid) {
        Some(name) => name.to_string(),
        None => format!("#{datatype_oid}"),
    }
}

fn fixed_type_name(datatype_oid: u32) -> Option<&'static str> {
    Some(match datatype_oid {
        oid::CHAR => "char",
        oid::BOOL => "boolean",
        oid::INT2 => "smallint",
        oid::INT4 => "integer",
        oid::INT8 => "bigint",
        oid::FLOAT4 => "real",
        oid::FLOAT8 => "double precision",
        oid::OID => "oid",
        oid::CID => "cid",
        oid::XID => "xid",
        oid::TID => "tid",
        oid::NAME => "name",
        oid::INET => "inet",
        oid::TEXT => "text",
        oid::TIMESTAMP => "timestamp",
        oid::TIMESTAMPTZ => "timestamp with time zone",
        oid::UUID => "uuid",
        oid::ACLITEM => "acl",
        oid::TEXT_ARRAY => "text[]",
        oid::ACLITEM_ARRAY => "acl[]",
        oid::OID_ARRAY => "oid[]",
        oid::INT2_ARRAY => "smallint[]",
        oid::MONEY => "money",
        oid::POINT => "point",
        oid::BOX => "box",
        oid::POLYGON => "polygon",
        oid::CIRCLE => "circle",
        oid::MACADDR => "macaddr",
        oid::NUMERIC => "numeric",
        oid::REGCLASS => "regclass",
        oid::REFCURSOR => "refcursor",
        oid::INTERVAL => "interval",
        oid::DATE => "date",
        oid::TIME => "time",
        oid::TIMETZ => "time with time zone",
        oid::BPCHAR => "char(n)",
        _ => return None,
    })
}

/// True if this OID is copied verbatim as its text-format bytes when
/// rendering a cell value (excluding `bool`, which gets `true`/`false`).
fn is_direct_copy(datatype_oid: u32) -> bool {
    matches!(
        datatype_oid,
        oid::INT2
            | oid::INT4
            | oid::INT8
            | oid::FLOAT4
            | oid::FLOAT8
            | oid::CHAR
            | oid::TEXT
            | oid::VARCHAR
            | oid::UUID
            | oid::OID
            | oid::TID
            | oid::XID
            | oid::CID
            | oid::NAME
            | oid::INET
            | oid::TIMESTAMP
            | oid::TIMESTAMPTZ
            | oid::INT2_ARRAY
            | oid::INT2VECTOR
            | oid::INT4_ARRAY
            | oid::OIDVECTOR
            | oid::OID_ARRAY
    )
}

/// Render one cell's value the way a terminal client would display it:
/// `"NULL"` for SQL NULL, `"true"`/`"false"` for `bool`, the raw
/// text-format bytes for well-known OIDs, or a `#<oid> (<len>) "<raw>"`
/// placeholder for anything else.
pub fn render_cell(datatype_oid: u32, value: Option<&[u8]>) -> String {
    let Some(bytes) = value else {
        return "NULL".to_string();
    };

    if datatype_oid == oid::BOOL {
        return if bytes.first() == Some(&b't') {
            "true".to_string()
        } else {
            "false".to_string()
        };
    }

    if is_direct_copy(datatype_oid) {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    format!(
        "#{datatype_oid} ({}) \"{}\"",
        bytes.len(),
        String::from_utf8_lossy(bytes)
    )
}
