//! Tag-level field iteration, group handling and size helpers.

use crate::error::{CodecError, CodecResult};
use crate::varint;

/// One of the six wire types the protobuf wire format assigns meaning to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    I64 = 1,
    Len = 2,
    SGroup = 3,
    EGroup = 4,
    I32 = 5,
}

impl WireType {
    fn from_u8(b: u8) -> CodecResult<WireType> {
        match b {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::SGroup),
            4 => Ok(WireType::EGroup),
            5 => Ok(WireType::I32),
            other => Err(CodecError::InvalidWireType(other)),
        }
    }
}

/// An unpacked `(field_number, wire_type)` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub field_number: u32,
    pub wire_type: WireType,
}

const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

fn check_field_number(n: u64) -> CodecResult<u32> {
    if n == 0 || n > MAX_FIELD_NUMBER as u64 {
        return Err(CodecError::InvalidFieldNumber(n));
    }
    Ok(n as u32)
}

/// Writes `varint((field_number << 3) | wire_type)`.
pub fn encode_tag(out: &mut Vec<u8>, tag: Tag) {
    let v = ((tag.field_number as u64) << 3) | (tag.wire_type as u64);
    varint::encode_varint(out, v);
}

/// Writes `varint(len)` followed by `bytes`.
pub fn encode_len(out: &mut Vec<u8>, bytes: &[u8]) {
    varint::encode_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// Wire-level size of an embedded varint-keyed field, header excluded.
pub fn varint_field_size(field_number: u32, value: u64) -> usize {
    tag_size(field_number) + varint::varint_size(value)
}

/// Wire-level size of a fixed32-keyed field.
pub fn i32_field_size(field_number: u32) -> usize {
    tag_size(field_number) + 4
}

/// Wire-level size of a fixed64-keyed field.
pub fn i64_field_size(field_number: u32) -> usize {
    tag_size(field_number) + 8
}

/// Wire-level size of a length-delimited field given its payload length.
pub fn len_field_size(field_number: u32, data_len: usize) -> usize {
    tag_size(field_number) + varint::varint_size(data_len as u64) + data_len
}

fn tag_size(field_number: u32) -> usize {
    varint::varint_size(((field_number as u64) << 3) | 0b111)
}

/// One decoded field value, borrowed (zero-copy) from the input slice where
/// the wire type permits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Varint(u64),
    I64(u64),
    Len(&'a [u8]),
    I32(u32),
    /// A `SGROUP`..`EGROUP` span, with the raw bytes between the tags
    /// (exclusive of both tags) borrowed from the input.
    Group(&'a [u8]),
}

/// Walks a byte slice yielding one `{field_number, value}` pair per call,
/// in the order fields appear on the wire (not sorted by number).
pub struct FieldIterator<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldIterator<'a> {
    pub fn new(buf: &'a [u8]) -> FieldIterator<'a> {
        FieldIterator { buf, pos: 0 }
    }

    /// Byte offset of the next unread tag.
    pub fn pos(&self) -> usize {
        self.pos
    }

    fn read_varint(&mut self) -> CodecResult<u64> {
        let (v, n) = varint::decode_varint(&self.buf[self.pos..])?;
        self.pos += n;
        Ok(v)
    }

    fn read_tag(&mut self) -> CodecResult<Tag> {
        let v = self.read_varint()?;
        let wire_type = WireType::from_u8((v & 0x7) as u8)?;
        let field_number = check_field_number(v >> 3)?;
        Ok(Tag { field_number, wire_type })
    }

    /// Returns the next field, or `Ok(None)` at end of input.
    pub fn next(&mut self) -> CodecResult<Option<(u32, FieldValue<'a>)>> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }
        let tag = self.read_tag()?;
        let value = match tag.wire_type {
            WireType::Varint => FieldValue::Varint(self.read_varint()?),
            WireType::I64 => {
                let v = varint::decode_fixed64(&self.buf[self.pos..])?;
                self.pos += 8;
                FieldValue::I64(v)
            }
            WireType::I32 => {
                let v = varint::decode_fixed32(&self.buf[self.pos..])?;
                self.pos += 4;
                FieldValue::I32(v)
            }
            WireType::Len => {
                let len = self.read_varint()? as usize;
                let start = self.pos;
                let end = start
                    .checked_add(len)
                    .filter(|&e| e <= self.buf.len())
                    .ok_or(CodecError::EndOfStream)?;
                self.pos = end;
                FieldValue::Len(&self.buf[start..end])
            }
            WireType::SGroup => {
                let start = self.pos;
                skip_group(self.buf, &mut self.pos, tag.field_number)?;
                // `self.pos` now sits just past the matching EGROUP tag;
                // the group body excludes both delimiting tags.
                let body_end = self.pos - egroup_tag_size(tag.field_number);
                FieldValue::Group(&self.buf[start..body_end])
            }
            WireType::EGroup => {
                // An EGROUP with no open SGROUP at this level is a no-op;
                // treat it as a zero-length value so callers still see one
                // iterator item per wire entry, matching `skip_field`'s
                // contract below.
                FieldValue::Len(&self.buf[self.pos..self.pos])
            }
        };
        Ok(Some((tag.field_number, value)))
    }
}

fn egroup_tag_size(field_number: u32) -> usize {
    varint::varint_size(((field_number as u64) << 3) | (WireType::EGroup as u64))
}

/// Advances `pos` past one field value of the given wire type, without
/// materializing it. An `EGROUP` at this level is a no-op (the caller's
/// enclosing `skip_group` consumes it); `SGROUP` delegates to
/// [`skip_group`].
pub fn skip_field(buf: &[u8], pos: &mut usize, wire_type: WireType, field_number: u32) -> CodecResult<()> {
    match wire_type {
        WireType::Varint => {
            let (_, n) = varint::decode_varint(&buf[*pos..])?;
            *pos += n;
        }
        WireType::I64 => {
            varint::decode_fixed64(&buf[*pos..])?;
            *pos += 8;
        }
        WireType::I32 => {
            varint::decode_fixed32(&buf[*pos..])?;
            *pos += 4;
        }
        WireType::Len => {
            let (len, n) = varint::decode_varint(&buf[*pos..])?;
            *pos += n;
            let end = pos
                .checked_add(len as usize)
                .filter(|&e| e <= buf.len())
                .ok_or(CodecError::EndOfStream)?;
            *pos = end;
        }
        WireType::SGroup => skip_group(buf, pos, field_number)?,
        WireType::EGroup => {}
    }
    Ok(())
}

/// Consumes bytes starting at `*pos` (which must sit just past an `SGROUP`
/// tag for `field_number`) until the matching `EGROUP` tag, recursing into
/// any nested `SGROUP`. A mismatched `EGROUP` (wrong field number) is
/// tolerated and skipped.
pub fn skip_group(buf: &[u8], pos: &mut usize, field_number: u32) -> CodecResult<()> {
    loop {
        if *pos >= buf.len() {
            return Err(CodecError::UnterminatedGroup);
        }
        let (raw_tag, n) = varint::decode_varint(&buf[*pos..])?;
        *pos += n;
        let wire_type = WireType::from_u8((raw_tag & 0x7) as u8)?;
        let this_field = check_field_number(raw_tag >> 3)?;
        match wire_type {
            WireType::EGroup => {
                // Tolerate a mismatched EGROUP field number; it still
                // closes this group level.
                let _ = this_field == field_number;
                return Ok(());
            }
            other => skip_field(buf, pos, other, this_field)?,
        }
    }
}

/// Iterates a packed-varint payload (the body of a `LEN`-wire field).
pub struct PackedVarintIterator<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PackedVarintIterator<'a> {
    pub fn new(buf: &'a [u8]) -> PackedVarintIterator<'a> {
        PackedVarintIterator { buf, pos: 0 }
    }
}

impl<'a> Iterator for PackedVarintIterator<'a> {
    type Item = CodecResult<u64>;

    fn next(&mut self) -> Option<CodecResult<u64>> {
        if self.pos >= self.buf.len() {
            return None;
        }
        match varint::decode_varint(&self.buf[self.pos..]) {
            Ok((v, n)) => {
                self.pos += n;
                Some(Ok(v))
            }
            Err(e) => {
                self.pos = self.buf.len();
                Some(Err(e))
            }
        }
    }
}

/// Iterates a packed-fixed32 payload.
pub struct PackedFixed32Iterator<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PackedFixed32Iterator<'a> {
    pub fn new(buf: &'a [u8]) -> CodecResult<PackedFixed32Iterator<'a>> {
        if buf.len() % 4 != 0 {
            return Err(CodecError::PackedLengthMismatch);
        }
        Ok(PackedFixed32Iterator { buf, pos: 0 })
    }
}

impl<'a> Iterator for PackedFixed32Iterator<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.pos >= self.buf.len() {
            return None;
        }
        let v = varint::decode_fixed32(&self.buf[self.pos..]).unwrap();
        self.pos += 4;
        Some(v)
    }
}

/// Iterates a packed-fixed64 payload.
pub struct PackedFixed64Iterator<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PackedFixed64Iterator<'a> {
    pub fn new(buf: &'a [u8]) -> CodecResult<PackedFixed64Iterator<'a>> {
        if buf.len() % 8 != 0 {
            return Err(CodecError::PackedLengthMismatch);
        }
        Ok(PackedFixed64Iterator { buf, pos: 0 })
    }
}

impl<'a> Iterator for PackedFixed64Iterator<'a> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.pos >= self.buf.len() {
            return None;
        }
        let v = varint::decode_fixed64(&self.buf[self.pos..]).unwrap();
        self.pos += 8;
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_one_varint_field(field_number: u32, value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        encode_tag(
            &mut out,
            Tag { field_number, wire_type: WireType::Varint },
        );
        varint::encode_varint(&mut out, value);
        out
    }

    #[test]
    fn field_round_trip_varint() {
        // Property 3 / S1.
        let bytes = encode_one_varint_field(1, 150);
        assert_eq!(bytes, vec![0x08, 0x96, 0x01]);
        let mut it = FieldIterator::new(&bytes);
        let (num, val) = it.next().unwrap().unwrap();
        assert_eq!(num, 1);
        assert_eq!(val, FieldValue::Varint(150));
        assert_eq!(it.next().unwrap(), None);
    }

    #[test]
    fn field_round_trip_len() {
        let mut out = Vec::new();
        encode_tag(&mut out, Tag { field_number: 5, wire_type: WireType::Len });
        encode_len(&mut out, b"hello");
        let mut it = FieldIterator::new(&out);
        let (num, val) = it.next().unwrap().unwrap();
        assert_eq!(num, 5);
        assert_eq!(val, FieldValue::Len(b"hello"));
        assert_eq!(it.next().unwrap(), None);
    }

    #[test]
    fn invalid_wire_type_6_and_7() {
        let bytes = [0x06u8]; // field 0, wire type 6
        let mut it = FieldIterator::new(&bytes);
        assert_eq!(it.next(), Err(CodecError::InvalidWireType(6)));
    }

    #[test]
    fn invalid_field_number_zero() {
        let bytes = [0x00u8]; // field 0, wire type 0 (varint)
        let mut it = FieldIterator::new(&bytes);
        assert_eq!(it.next(), Err(CodecError::InvalidFieldNumber(0)));
    }

    #[test]
    fn group_skip_nested() {
        // field 1 SGROUP { field 2 varint=5, field 3 SGROUP { } EGROUP } EGROUP
        let mut out = Vec::new();
        encode_tag(&mut out, Tag { field_number: 1, wire_type: WireType::SGroup });
        out.extend(encode_one_varint_field(2, 5));
        encode_tag(&mut out, Tag { field_number: 3, wire_type: WireType::SGroup });
        encode_tag(&mut out, Tag { field_number: 3, wire_type: WireType::EGroup });
        encode_tag(&mut out, Tag { field_number: 1, wire_type: WireType::EGroup });
        // trailing field after the group
        out.extend(encode_one_varint_field(9, 1));

        let mut it = FieldIterator::new(&out);
        let (num, val) = it.next().unwrap().unwrap();
        assert_eq!(num, 1);
        match val {
            FieldValue::Group(_) => {}
            other => panic!("expected group, got {:?}", other),
        }
        let (num, val) = it.next().unwrap().unwrap();
        assert_eq!(num, 9);
        assert_eq!(val, FieldValue::Varint(1));
        assert_eq!(it.next().unwrap(), None);
    }

    #[test]
    fn mismatched_egroup_is_tolerated() {
        let mut buf = Vec::new();
        let mut pos = 0usize;
        encode_tag(&mut buf, Tag { field_number: 7, wire_type: WireType::EGroup });
        skip_group(&buf, &mut pos, 1).unwrap();
        assert_eq!(pos, buf.len());
    }

    #[test]
    fn packed_varint_matches_repeated_enum_scenario() {
        // S2: repeated enum field packed as LEN(3, [1,2,3]).
        let payload = [0x01u8, 0x02, 0x03];
        let values: Vec<u64> = PackedVarintIterator::new(&payload)
            .collect::<CodecResult<Vec<_>>>()
            .unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn packed_fixed32_round_trip() {
        let mut out = Vec::new();
        varint::encode_fixed32(&mut out, 1);
        varint::encode_fixed32(&mut out, 2);
        let values: Vec<u32> = PackedFixed32Iterator::new(&out).unwrap().collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn packed_fixed32_length_mismatch() {
        assert_eq!(
            PackedFixed32Iterator::new(&[0u8; 3]).err(),
            Some(CodecError::PackedLengthMismatch)
        );
    }

    #[test]
    fn size_helpers_match_encoded_len() {
        for value in [0u64, 1, 127, 128, 300, u32::MAX as u64] {
            let mut out = Vec::new();
            encode_tag(&mut out, Tag { field_number: 3, wire_type: WireType::Varint });
            varint::encode_varint(&mut out, value);
            assert_eq!(out.len(), varint_field_size(3, value));
        }
        for data in [&b""[..], b"x", b"hello world"] {
            let mut out = Vec::new();
            encode_tag(&mut out, Tag { field_number: 4, wire_type: WireType::Len });
            encode_len(&mut out, data);
            assert_eq!(out.len(), len_field_size(4, data.len()));
        }
    }
}
