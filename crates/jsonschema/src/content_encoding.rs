//! Decoders for the well-known `contentEncoding` values.
use ahash::AHashMap;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use once_cell::sync::Lazy;

/// A function that checks whether a string is valid for a given content encoding.
pub(crate) type ContentEncodingCheckType = fn(&str) -> bool;
/// A function that decodes a string encoded with a given content encoding.
///
/// Returns `Ok(None)` if the value does not conform to the encoding, `Err(())` if decoding
/// succeeded but the result is not valid UTF-8, and `Ok(Some(decoded))` otherwise.
pub(crate) type ContentEncodingConverterType = fn(&str) -> Result<Option<String>, ()>;

fn is_base64(value: &str) -> bool {
    BASE64_STANDARD.decode(value).is_ok()
}

fn from_base64(value: &str) -> Result<Option<String>, ()> {
    match BASE64_STANDARD.decode(value) {
        Ok(decoded) => String::from_utf8(decoded).map(Some).map_err(|_| ()),
        Err(_) => Ok(None),
    }
}

fn decode_base16(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(value.len() / 2);
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let hi = (bytes[i] as char).to_digit(16)?;
        let lo = (bytes[i + 1] as char).to_digit(16)?;
        out.push(((hi << 4) | lo) as u8);
        i += 2;
    }
    Some(out)
}

fn is_base16(value: &str) -> bool {
    decode_base16(value).is_some()
}

fn from_base16(value: &str) -> Result<Option<String>, ()> {
    match decode_base16(value) {
        Some(decoded) => String::from_utf8(decoded).map(Some).map_err(|_| ()),
        None => Ok(None),
    }
}

const BASE32_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

fn decode_base32(value: &str) -> Option<Vec<u8>> {
    let trimmed = value.trim_end_matches('=');
    if trimmed.is_empty() && !value.is_empty() {
        return Some(Vec::new());
    }
    let mut bits: u64 = 0;
    let mut bit_count: u32 = 0;
    let mut out = Vec::with_capacity(trimmed.len() * 5 / 8);
    for ch in trimmed.bytes() {
        let value = BASE32_ALPHABET
            .iter()
            .position(|&c| c == ch.to_ascii_uppercase())?;
        bits = (bits << 5) | value as u64;
        bit_count += 5;
        if bit_count >= 8 {
            bit_count -= 8;
            out.push(((bits >> bit_count) & 0xFF) as u8);
        }
    }
    Some(out)
}

fn is_base32(value: &str) -> bool {
    decode_base32(value).is_some()
}

fn from_base32(value: &str) -> Result<Option<String>, ()> {
    match decode_base32(value) {
        Some(decoded) => String::from_utf8(decoded).map(Some).map_err(|_| ()),
        None => Ok(None),
    }
}

fn decode_quoted_printable(value: &str) -> Option<Vec<u8>> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'=' => {
                if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                    i += 2;
                } else if i + 2 < bytes.len() && bytes[i + 1] == b'\r' && bytes[i + 2] == b'\n' {
                    i += 3;
                } else if i + 2 < bytes.len() {
                    let hi = (bytes[i + 1] as char).to_digit(16)?;
                    let lo = (bytes[i + 2] as char).to_digit(16)?;
                    out.push(((hi << 4) | lo) as u8);
                    i += 3;
                } else {
                    return None;
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    Some(out)
}

fn is_quoted_printable(value: &str) -> bool {
    decode_quoted_printable(value).is_some()
}

fn from_quoted_printable(value: &str) -> Result<Option<String>, ()> {
    match decode_quoted_printable(value) {
        Some(decoded) => String::from_utf8(decoded).map(Some).map_err(|_| ()),
        None => Ok(None),
    }
}

pub(crate) static DEFAULT_CONTENT_ENCODING_CHECKS_AND_CONVERTERS: Lazy<
    AHashMap<&'static str, (ContentEncodingCheckType, ContentEncodingConverterType)>,
> = Lazy::new(|| {
    let mut map: AHashMap<&'static str, (ContentEncodingCheckType, ContentEncodingConverterType)> =
        AHashMap::new();
    map.insert("base64", (is_base64, from_base64));
    map.insert("base16", (is_base16, from_base16));
    map.insert("base32", (is_base32, from_base32));
    map.insert("quoted-printable", (is_quoted_printable, from_quoted_printable));
    map
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_roundtrip() {
        assert!(is_base64("aGVsbG8="));
        assert_eq!(from_base64("aGVsbG8=").unwrap(), Some("hello".to_string()));
        assert!(!is_base64("!!!not base64!!!"));
    }

    #[test]
    fn base16_roundtrip() {
        assert!(is_base16("68656c6c6f"));
        assert_eq!(from_base16("68656c6c6f").unwrap(), Some("hello".to_string()));
        assert!(!is_base16("zz"));
    }

    #[test]
    fn base32_roundtrip() {
        assert!(is_base32("NBSWY3DP"));
        assert_eq!(from_base32("NBSWY3DP").unwrap(), Some("hello".to_string()));
    }

    #[test]
    fn quoted_printable_roundtrip() {
        assert!(is_quoted_printable("hello=20world"));
        assert_eq!(
            from_quoted_printable("hello=20world").unwrap(),
            Some("hello world".to_string())
        );
    }
}
