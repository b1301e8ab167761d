//! The trait generated message types implement.

use crate::error::CodecResult;
use crate::unknown::UnknownFields;
use crate::wire;

/// A message whose wire shape is fixed at compile time by generated code,
/// as opposed to [`crate::reflect::DynamicMessage`].
pub trait Message: Sized {
    /// Writes this message's known fields in ascending field-number order,
    /// followed by its preserved unknown fields.
    fn encode(&self, out: &mut Vec<u8>);

    /// Byte-exact preimage of [`Message::encode`]; parent messages use this
    /// to size a sub-message's LEN prefix before writing it.
    fn calc_size(&self) -> usize;

    /// Parses `bytes` tag-by-tag; unrecognized tags are preserved verbatim
    /// rather than rejected.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;

    fn unknown_fields(&self) -> &UnknownFields;

    fn mut_unknown_fields(&mut self) -> &mut UnknownFields;

    /// Convenience wrapper for callers that just want the encoded bytes.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.calc_size());
        self.encode(&mut out);
        out
    }

    /// Writes this message framed as a LEN-delimited field value: a varint
    /// length prefix followed by its encoding. Used when embedding one
    /// message inside another.
    fn encode_length_delimited_to(&self, out: &mut Vec<u8>) {
        wire::encode_len(out, &self.encode_to_vec());
    }
}
