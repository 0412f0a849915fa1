//! Dex header decoding.
//!
//! See <https://source.android.com/docs/core/runtime/dex-format#header-item>.
//! Only `field_ids_size` and `method_ids_size` are read; both are
//! little-endian `uint`s at fixed offsets.

use crate::error::{DexcountError, DexcountResult};
use crate::totals::OwnCounts;

const FIELD_IDS_SIZE_OFFSET: usize = 80;
const METHOD_IDS_SIZE_OFFSET: usize = 88;

/// Shortest input that contains both counts.
pub const DEX_HEADER_MIN_LEN: usize = METHOD_IDS_SIZE_OFFSET + 4;

fn read_u32_le(bytes: &[u8], offset: usize) -> Option<u32> {
    let word: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(word))
}

/// Reads the field and method counts from the start of a dex file.
pub fn decode_dex_header(bytes: &[u8]) -> DexcountResult<OwnCounts> {
    match (
        read_u32_le(bytes, FIELD_IDS_SIZE_OFFSET),
        read_u32_le(bytes, METHOD_IDS_SIZE_OFFSET),
    ) {
        (Some(fields), Some(methods)) => Ok(OwnCounts {
            methods: u64::from(methods),
            fields: u64::from(fields),
        }),
        _ => Err(DexcountError::tool(
            "dx",
            format!(
                "dex output too short: {} bytes, need at least {}",
                bytes.len(),
                DEX_HEADER_MIN_LEN
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with(fields: [u8; 4], methods: [u8; 4]) -> Vec<u8> {
        let mut bytes = vec![0u8; 112];
        bytes[..4].copy_from_slice(b"dex\n");
        bytes[80..84].copy_from_slice(&fields);
        bytes[88..92].copy_from_slice(&methods);
        bytes
    }

    #[test]
    fn test_decode_single_unit_counts() {
        let bytes = header_with([1, 0, 0, 0], [1, 0, 0, 0]);
        let counts = decode_dex_header(&bytes).unwrap();
        assert_eq!(counts, OwnCounts { methods: 1, fields: 1 });
    }

    #[test]
    fn test_decode_little_endian() {
        let bytes = header_with([0x34, 0x12, 0, 0], [0xff, 0xff, 0, 0]);
        let counts = decode_dex_header(&bytes).unwrap();
        assert_eq!(counts.fields, 0x1234);
        assert_eq!(counts.methods, 65535);
    }

    #[test]
    fn test_decode_exact_minimum_length() {
        let mut bytes = header_with([7, 0, 0, 0], [9, 0, 0, 0]);
        bytes.truncate(DEX_HEADER_MIN_LEN);
        let counts = decode_dex_header(&bytes).unwrap();
        assert_eq!(counts, OwnCounts { methods: 9, fields: 7 });
    }

    #[test]
    fn test_decode_short_input_is_error() {
        let err = decode_dex_header(&[0u8; 90]).unwrap_err();
        assert!(matches!(err, DexcountError::Tool { .. }));
        assert!(decode_dex_header(&[]).is_err());
    }
}
