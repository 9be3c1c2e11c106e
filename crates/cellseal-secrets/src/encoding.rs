//! Scheme-prefixed key values: `hex:`, `base64:`, `raw:`.
//!
//! Unprefixed values are taken as raw bytes, which is how keys were read
//! before prefixes existed.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::Zeroizing;

pub fn decode_key_value(value: &str) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = if let Some(rest) = value.strip_prefix("hex:") {
        hex::decode(rest.trim()).context("decoding hex key value")?
    } else if let Some(rest) = value.strip_prefix("base64:") {
        STANDARD
            .decode(rest.trim())
            .context("decoding base64 key value")?
    } else if let Some(rest) = value.strip_prefix("raw:") {
        rest.as_bytes().to_vec()
    } else {
        value.as_bytes().to_vec()
    };
    Ok(Zeroizing::new(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(&*decode_key_value("hex:00ff10").unwrap(), &[0x00, 0xff, 0x10]);
        assert!(decode_key_value("hex:zz").is_err());
    }

    #[test]
    fn test_base64() {
        assert_eq!(&*decode_key_value("base64:AAEC").unwrap(), &[0, 1, 2]);
        assert!(decode_key_value("base64:!!").is_err());
    }

    #[test]
    fn test_raw_and_unprefixed() {
        assert_eq!(&*decode_key_value("raw:hex:literal").unwrap(), b"hex:literal");
        assert_eq!(&*decode_key_value("plain-secret").unwrap(), b"plain-secret");
    }
}
