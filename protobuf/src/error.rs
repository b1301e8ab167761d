use std::fmt;

/// Errors produced by the wire codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input ended before a value could be fully read.
    EndOfStream,
    /// A varint used more than 10 bytes, or its 10th byte had bits set
    /// above the single bit that fits in a 64-bit value.
    Overflow,
    /// Wire type 6 or 7, which protobuf never assigns meaning to.
    InvalidWireType(u8),
    /// Field number 0, or a field number that does not fit in 29 bits.
    InvalidFieldNumber(u64),
    /// A packed field's payload length did not equal the sum of the
    /// element sizes actually consumed.
    PackedLengthMismatch,
    /// A group's `SGROUP` tag was never matched by the corresponding
    /// `EGROUP` before the input ended.
    UnterminatedGroup,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::EndOfStream => write!(f, "unexpected end of stream"),
            CodecError::Overflow => write!(f, "varint is too long"),
            CodecError::InvalidWireType(w) => write!(f, "invalid wire type: {}", w),
            CodecError::InvalidFieldNumber(n) => write!(f, "invalid field number: {}", n),
            CodecError::PackedLengthMismatch => {
                write!(f, "packed field length does not match its elements")
            }
            CodecError::UnterminatedGroup => write!(f, "group was never closed"),
        }
    }
}

impl std::error::Error for CodecError {}

pub type CodecResult<T> = Result<T, CodecError>;
