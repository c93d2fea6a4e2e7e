use crate::error::SchemaError;
use alloy_primitives::{FixedBytes, U256};

pub use alloy_primitives::{Address, Bloom, Bytes, B256, B64};

/// 32-byte hash (`FH32`).
pub type Hash32 = B256;
/// 8-byte proof-of-work nonce (`FH8`).
pub type Nonce = B64;

/// Strip the mandatory `0x` prefix of a document hex string.
fn strip_prefix<'a>(field: &str, raw: &'a str) -> Result<&'a str, SchemaError> {
    raw.strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| SchemaError::InvalidHex {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "missing 0x prefix".to_string(),
        })
}

/// Parse a fixed-width hex field. The value must carry exactly `N` bytes.
pub fn parse_fixed<const N: usize>(field: &str, raw: &str) -> Result<FixedBytes<N>, SchemaError> {
    let bytes = parse_bytes(field, raw)?;
    if bytes.len() != N {
        return Err(SchemaError::WrongLength {
            field: field.to_string(),
            expected: N,
            found: bytes.len(),
        });
    }
    Ok(FixedBytes::from_slice(&bytes))
}

/// Parse a variable-length hex byte string. `0x` is the empty string.
pub fn parse_bytes(field: &str, raw: &str) -> Result<Bytes, SchemaError> {
    let digits = strip_prefix(field, raw)?;
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| SchemaError::InvalidHex {
            field: field.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a hex-encoded unsigned integer (`VALUE`) of at most 256 bits.
///
/// Leading zeros and odd digit counts are accepted, `0x` alone is not.
pub fn parse_value(field: &str, raw: &str) -> Result<U256, SchemaError> {
    let digits = strip_prefix(field, raw)?;
    if digits.is_empty() {
        return Err(SchemaError::InvalidHex {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "empty value".to_string(),
        });
    }
    U256::from_str_radix(digits, 16).map_err(|e| SchemaError::InvalidHex {
        field: field.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Lowercase `0x`-prefixed hex of raw bytes.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Minimal byte-aligned hex of an integer, `0x00` for zero.
pub fn value_to_hex(value: &U256) -> String {
    let bytes = value.to_be_bytes::<32>();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    bytes_to_hex(&bytes[start..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0x00", "0x00")]
    #[case("0x0", "0x00")]
    #[case("0x20000", "0x020000")]
    #[case("0x0000ff", "0xff")]
    #[case("0x2fefd8", "0x2fefd8")]
    fn value_hex_is_minimal_and_byte_aligned(#[case] input: &str, #[case] expected: &str) {
        let value = parse_value("difficulty", input).unwrap();
        assert_eq!(value_to_hex(&value), expected);
    }

    #[test]
    fn value_rejects_missing_prefix_and_empty() {
        assert!(matches!(
            parse_value("number", "12"),
            Err(SchemaError::InvalidHex { .. })
        ));
        assert!(matches!(
            parse_value("number", "0x"),
            Err(SchemaError::InvalidHex { .. })
        ));
    }

    #[test]
    fn value_rejects_more_than_256_bits() {
        let too_wide = format!("0x1{}", "0".repeat(64));
        assert!(parse_value("gasLimit", &too_wide).is_err());
    }

    #[test]
    fn fixed_width_is_enforced() {
        let err = parse_fixed::<20>("coinbase", "0x8888f1f195afa192cfee860698584c030f4c9d").unwrap_err();
        assert_eq!(
            err,
            SchemaError::WrongLength {
                field: "coinbase".to_string(),
                expected: 20,
                found: 19,
            }
        );
        assert!(parse_fixed::<8>("nonce", "0x0102030405060708").is_ok());
    }

    #[test]
    fn empty_bytes() {
        let bytes = parse_bytes("extraData", "0x").unwrap();
        assert!(bytes.is_empty());
        assert_eq!(bytes_to_hex(&bytes), "0x");
    }
}
