//! Binary text encodings: base64url (`b`) and hex (`x`)

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use super::errors::{FormatError, FormatResult};

/// Encodes bytes as unpadded base64url
pub fn b2s_base64url(bytes: &[u8]) -> FormatResult<String> {
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Decodes base64url text, with or without trailing padding
pub fn s2b_base64url(text: &str) -> FormatResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(text.trim_end_matches('='))
        .map_err(|e| FormatError::invalid(format!("invalid base64url: {}", e)))
}

/// Encodes bytes as lowercase hex
pub fn b2s_hex(bytes: &[u8]) -> FormatResult<String> {
    Ok(hex::encode(bytes))
}

/// Decodes hex text in either case
pub fn s2b_hex(text: &str) -> FormatResult<Vec<u8>> {
    hex::decode(text).map_err(|e| FormatError::invalid(format!("invalid hex: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64url_unpadded_output() {
        assert_eq!(b2s_base64url(b"ab").unwrap(), "YWI");
        assert_eq!(b2s_base64url(&[0xfb, 0xff]).unwrap(), "-_8");
    }

    #[test]
    fn test_base64url_padding_tolerant() {
        assert_eq!(s2b_base64url("YWI").unwrap(), b"ab");
        assert_eq!(s2b_base64url("YWI=").unwrap(), b"ab");
        assert_eq!(s2b_base64url("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_base64url_rejects_standard_alphabet() {
        assert!(s2b_base64url("+/8").is_err());
        assert!(s2b_base64url("not base64!").is_err());
    }

    #[test]
    fn test_hex_case() {
        assert_eq!(b2s_hex(&[0xab, 0x01]).unwrap(), "ab01");
        assert_eq!(s2b_hex("AB01").unwrap(), vec![0xab, 0x01]);
        assert_eq!(s2b_hex("ab01").unwrap(), vec![0xab, 0x01]);
    }

    #[test]
    fn test_hex_rejects_odd_length() {
        let err = s2b_hex("abc").unwrap_err();
        assert!(err.to_string().starts_with("invalid hex"));
    }
}
