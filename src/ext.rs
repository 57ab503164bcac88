//! Small buffer extension traits shared by the codec.
use bytes::{Buf, BufMut, Bytes};

/// Integer narrowing helpers. The wire format uses `u16`/`i32` where Rust
/// collections hand back `usize`; these panic on overflow instead of
/// silently wrapping, matching the protocol's hard size ceilings.
pub trait UsizeExt {
    fn to_u16(self) -> u16;
    fn to_i32(self) -> i32;
    fn to_u32(self) -> u32;
}

impl UsizeExt for usize {
    fn to_u16(self) -> u16 {
        self.try_into().expect("message size too large for protocol")
    }

    fn to_i32(self) -> i32 {
        self.try_into().expect("message size too large for protocol")
    }

    fn to_u32(self) -> u32 {
        self.try_into().expect("message size too large for protocol")
    }
}

pub trait StrExt {
    /// length of `self` encoded as a NUL-terminated string
    fn nul_string_len(&self) -> i32;
}

impl StrExt for str {
    fn nul_string_len(&self) -> i32 {
        self.len().to_i32() + 1
    }
}

pub trait BufMutExt {
    fn put_nul_string(&mut self, string: &str);
}

impl<B: BufMut> BufMutExt for B {
    fn put_nul_string(&mut self, string: &str) {
        self.put(string.as_bytes());
        self.put_u8(b'\0');
    }
}

pub trait BytesExt {
    /// Split off the bytes up to (not including) the next NUL, advancing
    /// past the terminator.
    fn get_nul_bytes(&mut self) -> Bytes;

    /// Same as [`get_nul_bytes`][Self::get_nul_bytes] but decoded as UTF-8.
    fn get_nul_string(&mut self) -> Result<String, std::str::Utf8Error>;
}

impl BytesExt for Bytes {
    fn get_nul_bytes(&mut self) -> Bytes {
        let end = self
            .iter()
            .position(|&b| b == 0)
            .expect("postgres string was not NUL terminated");
        let head = self.split_to(end);
        self.advance(1);
        head
    }

    fn get_nul_string(&mut self) -> Result<String, std::str::Utf8Error> {
        let bytes = self.get_nul_bytes();
        std::str::from_utf8(&bytes)?;
        Ok(String::from_utf8(bytes.to_vec()).expect("validated utf8 above"))
    }
}
