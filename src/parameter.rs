//! A single bound query parameter (§3).
use bytes::Bytes;

/// Well-known text OIDs used by the constructors below.
mod oid {
    pub const TEXT: u32 = 25;
    pub const VARCHAR: u32 = 1043;
}

/// A tagged scalar bound into a [`crate::Query`]. `length == -1` encodes
/// SQL NULL; `length >= 0` is a text-format value of that many bytes.
///
/// Parameter OIDs must match the text representation actually sent (§9
/// open question): this core only ever transmits parameters in text
/// format, so the bound OID should be one the server accepts as text,
/// e.g. `25` (text) or `1043` (varchar).
#[derive(Debug, Clone)]
pub struct Parameter {
    pub type_oid: u32,
    pub length: i32,
    pub value: Option<Bytes>,
}

impl Parameter {
    /// A text-format parameter with an explicit type OID.
    pub fn new(type_oid: u32, value: impl Into<Bytes>) -> Self {
        let value = value.into();
        Self {
            type_oid,
            length: value.len() as i32,
            value: Some(value),
        }
    }

    /// SQL NULL of the given type.
    pub fn new_null(type_oid: u32) -> Self {
        Self {
            type_oid,
            length: -1,
            value: None,
        }
    }

    /// A `text` (OID 25) parameter.
    pub fn new_string(value: impl Into<String>) -> Self {
        Self::new(oid::TEXT, value.into().into_bytes())
    }

    /// A `varchar` (OID 1043) parameter.
    pub fn new_varchar(value: impl Into<String>) -> Self {
        Self::new(oid::VARCHAR, value.into().into_bytes())
    }

    pub fn is_null(&self) -> bool {
        self.length < 0
    }

    pub(crate) fn as_bind_param(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_string_uses_text_oid() {
        let p = Parameter::new_string("hi");
        assert_eq!(p.type_oid, oid::TEXT);
        assert_eq!(p.length, 2);
        assert!(!p.is_null());
    }

    #[test]
    fn null_parameter_has_negative_length_and_no_value() {
        let p = Parameter::new_null(oid::VARCHAR);
        assert_eq!(p.length, -1);
        assert!(p.value.is_none());
        assert!(p.is_null());
    }
}
