//! Password encoding for transmission.
//!
//! The password is URI-component percent-encoded and then base64 encoded, so
//! raw bytes never travel as plain text inside the job payload. This is an
//! encoding, not encryption: anyone holding the payload can reverse it.
//! Confidentiality is the transport's job.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters a URI component keeps literal: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encodes a password for the login job.
pub fn encode_password(raw: &str) -> String {
    let escaped = utf8_percent_encode(raw, URI_COMPONENT).to_string();
    STANDARD.encode(escaped)
}

/// Reverses [`encode_password`].
///
/// # Errors
/// Returns an error if the input is not valid base64 or does not decode to UTF-8.
pub fn decode_password(encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded)
        .context("Encoded password is not valid base64")?;
    let escaped = String::from_utf8(bytes).context("Encoded password is not ASCII")?;
    let raw = percent_decode_str(&escaped)
        .decode_utf8()
        .context("Encoded password is not valid UTF-8")?;
    Ok(raw.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ascii_is_just_base64() {
        assert_eq!(encode_password("secret"), "c2VjcmV0");
    }

    #[test]
    fn test_space_is_percent_escaped_first() {
        // "a%20b"
        assert_eq!(encode_password("a b"), "YSUyMGI=");
    }

    #[test]
    fn test_unreserved_marks_stay_literal() {
        let encoded = encode_password("-_.!~*'()");
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"-_.!~*'()");
    }

    #[test]
    fn test_non_ascii_is_utf8_escaped() {
        let encoded = encode_password("pässwörd");
        assert_eq!(
            STANDARD.decode(&encoded).unwrap(),
            b"p%C3%A4ssw%C3%B6rd"
        );
        assert_eq!(decode_password(&encoded).unwrap(), "pässwörd");
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        let encoded = encode_password("a+b/c?d&e=f#g");
        assert_eq!(
            STANDARD.decode(&encoded).unwrap(),
            b"a%2Bb%2Fc%3Fd%26e%3Df%23g"
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_password("***").is_err());
    }
}
