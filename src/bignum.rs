//! Minimal big-endian integer transcoding
//!
//! Unbounded ABI integers are written with the fewest bytes that
//! unambiguously represent the value: zero is the empty buffer, unsigned
//! magnitudes carry no leading `0x00`, and signed values are minimal
//! two's-complement, retaining one extra `0x00`/`0xFF` byte only when
//! required to disambiguate the sign. Fixed-width integers are written as
//! exactly `width` bytes, sign-extended as needed.
//!
//! All functions here are pure byte/arithmetic helpers over the
//! `num-bigint` types; range errors are reported by the caller, which knows
//! the descriptor name.

use num_bigint::{BigInt, BigUint, Sign};

/// Encodes an unsigned magnitude with no leading zero bytes; zero encodes
/// to the empty buffer.
#[must_use]
pub fn biguint_to_min_be(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

/// Decodes a minimal unsigned big-endian buffer; the empty buffer decodes
/// to zero.
#[must_use]
pub fn biguint_from_min_be(bytes: &[u8]) -> BigUint {
    if bytes.is_empty() {
        BigUint::default()
    } else {
        BigUint::from_bytes_be(bytes)
    }
}

/// Encodes a signed value as minimal two's-complement; zero encodes to the
/// empty buffer.
#[must_use]
pub fn bigint_to_min_be(value: &BigInt) -> Vec<u8> {
    if value.bits() == 0 {
        Vec::new()
    } else {
        value.to_signed_bytes_be()
    }
}

/// Decodes a minimal two's-complement big-endian buffer; the empty buffer
/// decodes to zero.
#[must_use]
pub fn bigint_from_min_be(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        BigInt::default()
    } else {
        BigInt::from_signed_bytes_be(bytes)
    }
}

/// Encodes an integer as exactly `width` big-endian bytes, two's-complement
/// when `signed`.
///
/// Returns `None` when the value does not fit the width, or when an
/// unsigned encoding is requested for a negative value.
#[must_use]
pub fn int_to_fixed_be(value: &BigInt, signed: bool, width: usize) -> Option<Vec<u8>> {
    let (raw, fill) = if signed {
        let raw = value.to_signed_bytes_be();
        let fill = match value.sign() {
            Sign::Minus => 0xffu8,
            _ => 0x00u8,
        };
        (raw, fill)
    } else {
        if value.sign() == Sign::Minus {
            return None;
        }
        (value.magnitude().to_bytes_be(), 0x00u8)
    };
    // `to_bytes_be` renders zero as a single 0x00 byte, which the
    // minimality check below must tolerate.
    if raw.len() > width && !(raw.len() == 1 && raw[0] == 0) {
        return None;
    }
    let mut out = vec![fill; width.saturating_sub(raw.len())];
    if raw.len() <= width {
        out.extend_from_slice(&raw);
    }
    Some(out)
}

/// Decodes exactly-`bytes.len()`-wide big-endian integer bytes.
#[must_use]
pub fn int_from_fixed_be(bytes: &[u8], signed: bool) -> BigInt {
    if signed {
        BigInt::from_signed_bytes_be(bytes)
    } else {
        BigInt::from_biguint(Sign::Plus, BigUint::from_bytes_be(bytes))
    }
}
