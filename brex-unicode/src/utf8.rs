//! UTF-8 decoding into codepoint sequences.

use crate::{ascii::find_non_ascii_byte, CodePoint};

/// Decodes a UTF-8 byte string into a codepoint sequence.
///
/// On invalid UTF-8, returns the byte offset of the first invalid byte.
///
/// ```
/// use brex_unicode::utf8::decode_utf8;
///
/// assert_eq!(decode_utf8("a🌵".as_bytes()), Ok(vec![0x61, 0x1F335]));
/// assert_eq!(decode_utf8(b"a\xff"), Err(1));
/// ```
pub fn decode_utf8(bytes: &[u8]) -> Result<Vec<CodePoint>, usize> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.chars().map(|c| c as CodePoint).collect()),
        Err(e) => Err(e.valid_up_to()),
    }
}

/// Decodes an ASCII byte string into a codepoint sequence.
///
/// On a byte `>= 0x80`, returns its offset.
pub fn decode_ascii(bytes: &[u8]) -> Result<Vec<CodePoint>, usize> {
    match find_non_ascii_byte(bytes) {
        None => Ok(bytes.iter().map(|&b| b as CodePoint).collect()),
        Some(i) => Err(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_rejects_high_bytes() {
        assert_eq!(decode_ascii(b"abc"), Ok(vec![0x61, 0x62, 0x63]));
        assert_eq!(decode_ascii("🌵".as_bytes()), Err(0));
        assert_eq!(decode_ascii(b""), Ok(vec![]));
    }
}
