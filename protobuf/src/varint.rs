//! Varint, zigzag and fixed-width primitives.
//!
//! Pure functions over caller-supplied buffers: nothing here allocates or
//! retains a reference past the call.

use crate::error::{CodecError, CodecResult};

/// Maximum number of bytes a varint-encoded `u64` can occupy.
pub const MAX_VARINT_BYTES: usize = 10;

/// Number of bytes `encode_varint` would write for `value`.
pub fn varint_size(value: u64) -> usize {
    // Every 7 bits of payload needs one more byte; at least one byte is
    // always written, even for zero.
    let bits = 64 - value.leading_zeros() as usize;
    let bits = bits.max(1);
    (bits + 6) / 7
}

/// Appends the varint encoding of `value` to `out`.
pub fn encode_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        } else {
            out.push(byte | 0x80);
        }
    }
}

/// Decodes a varint from the front of `buf`, returning the value and the
/// number of bytes consumed.
pub fn decode_varint(buf: &[u8]) -> CodecResult<(u64, usize)> {
    let mut result: u64 = 0;
    for i in 0..MAX_VARINT_BYTES {
        let byte = *buf.get(i).ok_or(CodecError::EndOfStream)?;
        let payload = (byte & 0x7f) as u64;
        if i == MAX_VARINT_BYTES - 1 && payload > 0x01 {
            return Err(CodecError::Overflow);
        }
        result |= payload << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }
    Err(CodecError::Overflow)
}

/// Appends `value` to `out` as 4 little-endian bytes.
pub fn encode_fixed32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Appends `value` to `out` as 8 little-endian bytes.
pub fn encode_fixed64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Reads 4 little-endian bytes from the front of `buf`.
pub fn decode_fixed32(buf: &[u8]) -> CodecResult<u32> {
    let bytes: [u8; 4] = buf.get(0..4).ok_or(CodecError::EndOfStream)?.try_into().unwrap();
    Ok(u32::from_le_bytes(bytes))
}

/// Reads 8 little-endian bytes from the front of `buf`.
pub fn decode_fixed64(buf: &[u8]) -> CodecResult<u64> {
    let bytes: [u8; 8] = buf.get(0..8).ok_or(CodecError::EndOfStream)?.try_into().unwrap();
    Ok(u64::from_le_bytes(bytes))
}

/// ZigZag-encodes a signed 32-bit integer for `sint32` fields.
pub fn zigzag_encode_32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

/// Inverse of [`zigzag_encode_32`].
pub fn zigzag_decode_32(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

/// ZigZag-encodes a signed 64-bit integer for `sint64` fields.
pub fn zigzag_encode_64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

/// Inverse of [`zigzag_encode_64`].
pub fn zigzag_decode_64(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_150() {
        // S1: field 1, value 150, under an implicit proto3 int32 field.
        let mut out = Vec::new();
        encode_varint(&mut out, 150);
        assert_eq!(out, vec![0x96, 0x01]);
        assert_eq!(varint_size(150), 2);
        assert_eq!(decode_varint(&out).unwrap(), (150, 2));
    }

    #[test]
    fn varint_round_trip_sweep() {
        // Property 1, exercised at every power-of-two boundary and its
        // neighbors rather than via a generative fuzzer (see SPEC_FULL.md).
        let mut candidates: Vec<u64> = vec![0, 1, u64::MAX];
        for shift in 0..64 {
            let base: u64 = 1u64 << shift;
            candidates.push(base);
            candidates.push(base.wrapping_sub(1));
            candidates.push(base.wrapping_add(1));
        }
        for n in candidates {
            let mut out = Vec::new();
            encode_varint(&mut out, n);
            assert_eq!(out.len(), varint_size(n), "size mismatch for {}", n);
            let (decoded, consumed) = decode_varint(&out).unwrap();
            assert_eq!(decoded, n);
            assert_eq!(consumed, out.len());
        }
    }

    #[test]
    fn varint_overflow_on_11th_byte() {
        let bytes = [0xffu8; 11];
        assert_eq!(decode_varint(&bytes), Err(CodecError::Overflow));
    }

    #[test]
    fn varint_overflow_on_10th_byte_high_bits() {
        let mut bytes = [0xffu8; 10];
        bytes[9] = 0x02;
        assert_eq!(decode_varint(&bytes), Err(CodecError::Overflow));
    }

    #[test]
    fn varint_end_of_stream() {
        assert_eq!(decode_varint(&[0x80]), Err(CodecError::EndOfStream));
        assert_eq!(decode_varint(&[]), Err(CodecError::EndOfStream));
    }

    #[test]
    fn zigzag_round_trip_32() {
        for v in [0i32, 1, -1, 2, -2, i32::MAX, i32::MIN] {
            assert_eq!(zigzag_decode_32(zigzag_encode_32(v)), v);
        }
        assert_eq!(zigzag_encode_32(0), 0);
        assert_eq!(zigzag_encode_32(-1), 1);
        assert_eq!(zigzag_encode_32(1), 2);
    }

    #[test]
    fn zigzag_round_trip_64() {
        for v in [0i64, 1, -1, 2, -2, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode_64(zigzag_encode_64(v)), v);
        }
    }

    #[test]
    fn fixed32_round_trip() {
        let mut out = Vec::new();
        encode_fixed32(&mut out, 0x01020304);
        assert_eq!(out, vec![0x04, 0x03, 0x02, 0x01]);
        assert_eq!(decode_fixed32(&out).unwrap(), 0x01020304);
    }

    #[test]
    fn fixed64_round_trip() {
        let mut out = Vec::new();
        encode_fixed64(&mut out, 0x0102030405060708);
        assert_eq!(decode_fixed64(&out).unwrap(), 0x0102030405060708);
    }
}
