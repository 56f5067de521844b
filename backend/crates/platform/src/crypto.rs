//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Encode bytes as standard base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s.trim())
}

/// Encode bytes as URL-safe base64 without padding (token segments)
pub fn to_base64_url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64 without padding
pub fn from_base64_url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

/// Constant-time comparison
///
/// Length is not secret; only the content comparison is constant time.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        assert!(bytes.iter().any(|&b| b != 0));
        assert_ne!(random_bytes(32), bytes);
    }

    #[test]
    fn test_base64_roundtrip() {
        let data = b"skillswap secret";
        assert_eq!(from_base64(&to_base64(data)).unwrap(), data);
        assert_eq!(from_base64_url(&to_base64_url(data)).unwrap(), data);
        assert!(!to_base64_url(&[0xfb, 0xff]).contains('='));
    }

    #[test]
    fn test_from_base64_tolerates_trailing_newline() {
        let encoded = format!("{}\n", to_base64(b"abc"));
        assert_eq!(from_base64(&encoded).unwrap(), b"abc");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"demo-key", b"demo-key"));
        assert!(!constant_time_eq(b"demo-key", b"demo-kex"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }
}
