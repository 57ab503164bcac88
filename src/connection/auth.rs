//! Salted MD5 challenge/response (§4.2.1).
use md5::{Digest, Md5};

fn md5_hex(input: &[u8]) -> String {
    let digest = Md5::digest(input);
    let mut out = String::with_capacity(32);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Compute the `PasswordMessage` payload for an `AuthenticationMD5Password`
/// challenge: `"md5" || hex(md5(hex(md5(password || username)) || salt))`.
/// Always 35 ASCII bytes (`"md5"` + 32 hex chars).
pub fn md5_challenge(password: &str, username: &str, salt: [u8; 4]) -> String {
    let inner = md5_hex(format!("{password}{username}").as_bytes());

    let mut outer_input = Vec::with_capacity(inner.len() + 4);
    outer_input.extend_from_slice(inner.as_bytes());
    outer_input.extend_from_slice(&salt);

    format!("md5{}", md5_hex(&outer_input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_is_35_bytes_and_starts_with_md5() {
        let payload = md5_challenge("secret", "alice", [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(payload.len(), 35);
        assert!(payload.starts_with("md5"));
    }

    #[test]
    fn challenge_is_pure_function_of_its_inputs() {
        let a = md5_challenge("secret", "alice", [1, 2, 3, 4]);
        let b = md5_challenge("secret", "alice", [1, 2, 3, 4]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_salts_produce_different_challenges() {
        let a = md5_challenge("secret", "alice", [1, 2, 3, 4]);
        let b = md5_challenge("secret", "alice", [5, 6, 7, 8]);
        assert_ne!(a, b);
    }

    #[test]
    fn matches_known_vector() {
        // inner = md5("secretalice")
        let inner = md5_hex(b"secretalice");
        let mut outer_input = inner.clone().into_bytes();
        outer_input.extend_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        let expected = format!("md5{}", md5_hex(&outer_input));
        assert_eq!(md5_challenge("secret", "alice", [1, 2, 3, 4]), expected);
    }
}
