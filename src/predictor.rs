//! Deterministic CREATE contract-address prediction.
//!
//! Purpose:
//!     Predict the address a sender account will receive for a contract
//!     created at a future nonce, without executing anything: RLP-encode the
//!     `[sender, nonce]` pair, keccak256 it, and keep the low 20 bytes of
//!     the digest. This is the same derivation rule the chain itself applies,
//!     so predicted addresses can be pre-registered with confidence.
//!
//! Notes:
//!     - The encoding is hand-rolled rather than pulled from an RLP crate:
//!       the payload is a fixed two-item list (20-byte string + minimal
//!       big-endian integer) and never exceeds the 55-byte short-form limit.
//!     - Nonce 0 encodes as the empty byte string (0x80), NOT as a zero
//!       byte. Getting this wrong silently produces wrong addresses.

use alloy::primitives::{keccak256, Address};

use crate::error::MonitorError;
use crate::types::parse_address;

/// Predict the CREATE address for `sender` at `nonce`. Pure, no I/O.
pub fn predict_create_address(sender: Address, nonce: u64) -> Address {
    // List payload: 0x94 (20-byte string header) + address + nonce item.
    // Max payload = 21 + 9 = 30 bytes, always short-form.
    let mut payload = Vec::with_capacity(30);
    payload.push(0x80 + 20);
    payload.extend_from_slice(sender.as_slice());
    append_rlp_u64(&mut payload, nonce);

    let mut encoded = Vec::with_capacity(payload.len() + 1);
    encoded.push(0xc0 + payload.len() as u8);
    encoded.extend_from_slice(&payload);

    let digest = keccak256(&encoded);
    // Discard the first 12 bytes of the 32-byte hash
    Address::from_slice(&digest[12..])
}

/// Caller-facing wrapper: parses a textual sender address (any casing) and
/// renders the prediction in EIP-55 checksummed form.
pub fn predict(sender: &str, nonce: u64) -> Result<String, MonitorError> {
    let parsed = parse_address(sender)?;
    Ok(predict_create_address(parsed, nonce).to_checksum(None))
}

/// Append the canonical RLP item for an unsigned integer: minimal big-endian
/// bytes, empty string for zero.
fn append_rlp_u64(out: &mut Vec<u8>, value: u64) {
    if value == 0 {
        out.push(0x80);
    } else if value <= 0x7f {
        out.push(value as u8);
    } else {
        let bytes = value.to_be_bytes();
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(7);
        let minimal = &bytes[first..];
        out.push(0x80 + minimal.len() as u8);
        out.extend_from_slice(minimal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const SENDER: &str = "0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0";

    fn addr(s: &str) -> Address {
        Address::from_str(s).unwrap()
    }

    #[test]
    fn test_known_create_vectors() {
        // Canonical vectors from the yellow-paper CREATE derivation rule
        let cases = [
            (0u64, "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d"),
            (1, "0x343c43a37d37dff08ae8c4a11544c718abb4fcf8"),
            (2, "0xf778b86fa74e846c4f0a1fbd1335fe81c00a0c91"),
            (3, "0xfffd933a0bc612844eaf0c6fe3e5b8e9b6c1d19c"),
        ];
        for (nonce, expected) in cases {
            assert_eq!(
                predict_create_address(addr(SENDER), nonce),
                addr(expected),
                "nonce {}",
                nonce
            );
        }
    }

    #[test]
    fn test_deterministic_and_checksummed() {
        for nonce in [0u64, 1, 127, 128, u64::MAX] {
            let first = predict(SENDER, nonce).unwrap();
            let second = predict(SENDER, nonce).unwrap();
            assert_eq!(first, second);
            // Must round-trip through strict EIP-55 parsing
            Address::parse_checksummed(&first, None)
                .unwrap_or_else(|_| panic!("bad checksum for nonce {}: {}", nonce, first));
        }
    }

    #[test]
    fn test_distinct_nonces_distinct_addresses() {
        let a = predict(SENDER, 127).unwrap();
        let b = predict(SENDER, 128).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_input_casing_is_insignificant() {
        let upper = SENDER.to_uppercase().replace("0X", "0x");
        assert_eq!(predict(SENDER, 5).unwrap(), predict(&upper, 5).unwrap());
    }

    #[test]
    fn test_rejects_malformed_address() {
        assert!(matches!(
            predict("0x1234", 0),
            Err(MonitorError::InvalidAddress(_))
        ));
        assert!(matches!(
            predict("not-an-address", 0),
            Err(MonitorError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_nonce_rlp_minimal_encoding() {
        let mut zero = Vec::new();
        append_rlp_u64(&mut zero, 0);
        assert_eq!(zero, [0x80], "zero must be the empty string, not 0x00");

        let mut small = Vec::new();
        append_rlp_u64(&mut small, 0x7f);
        assert_eq!(small, [0x7f]);

        let mut medium = Vec::new();
        append_rlp_u64(&mut medium, 0x80);
        assert_eq!(medium, [0x81, 0x80]);

        let mut max = Vec::new();
        append_rlp_u64(&mut max, u64::MAX);
        assert_eq!(
            max,
            [0x88, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }
}
