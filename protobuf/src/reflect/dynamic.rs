//! Schema-driven runtime message.

use std::collections::BTreeMap;

use crate::error::CodecResult;
use crate::unknown::UnknownFields;
use crate::varint;
use crate::wire::{self, FieldIterator, FieldValue, Tag, WireType};

use super::descriptor::{FieldType, Label, MessageDescriptor, ScalarType, TypeResolver};
use super::value::ReflectValueBox;

/// Storage for one field slot, keyed by field number in [`DynamicMessage::fields`].
#[derive(Debug, Clone, PartialEq)]
enum FieldStorage {
    Scalar(ReflectValueBox),
    Repeated(Vec<ReflectValueBox>),
    Map(Vec<(ReflectValueBox, ReflectValueBox)>),
}

/// A runtime record whose shape is driven by a [`MessageDescriptor`] rather
/// than a generated Rust type.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<u32, FieldStorage>,
    unknown_fields: UnknownFields,
}

impl DynamicMessage {
    pub fn new(descriptor: MessageDescriptor) -> DynamicMessage {
        DynamicMessage { descriptor, fields: BTreeMap::new(), unknown_fields: UnknownFields::new() }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    pub fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown_fields
    }

    pub fn mut_unknown_fields(&mut self) -> &mut UnknownFields {
        &mut self.unknown_fields
    }

    pub fn get(&self, number: u32) -> Option<&ReflectValueBox> {
        match self.fields.get(&number)? {
            FieldStorage::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_repeated(&self, number: u32) -> &[ReflectValueBox] {
        match self.fields.get(&number) {
            Some(FieldStorage::Repeated(v)) => v,
            _ => &[],
        }
    }

    pub fn get_map(&self, number: u32) -> &[(ReflectValueBox, ReflectValueBox)] {
        match self.fields.get(&number) {
            Some(FieldStorage::Map(v)) => v,
            _ => &[],
        }
    }

    /// The one oneof field (if any) currently set, given that oneof's
    /// member field numbers.
    pub fn oneof_case(&self, member_numbers: &[u32]) -> Option<u32> {
        member_numbers.iter().copied().find(|n| self.fields.contains_key(n))
    }

    fn clear_oneof_siblings(&mut self, number: u32) {
        for oneof in &self.descriptor.oneofs {
            let numbers: Vec<u32> = oneof
                .field_indices
                .iter()
                .map(|&i| self.descriptor.fields[i].number)
                .collect();
            if numbers.contains(&number) {
                for n in numbers {
                    if n != number {
                        self.fields.remove(&n);
                    }
                }
            }
        }
    }

    /// Sets a singular (scalar/message/enum) field, enforcing the
    /// descriptor's declared type and clearing any other field of the same
    /// oneof.
    pub fn set(&mut self, number: u32, value: ReflectValueBox) {
        assert!(
            self.descriptor.field_by_number(number).is_some(),
            "no such field: {}",
            number
        );
        self.clear_oneof_siblings(number);
        self.fields.insert(number, FieldStorage::Scalar(value));
    }

    pub fn push_repeated(&mut self, number: u32, value: ReflectValueBox) {
        match self.fields.entry(number).or_insert_with(|| FieldStorage::Repeated(Vec::new())) {
            FieldStorage::Repeated(v) => v.push(value),
            _ => panic!("field {} is not repeated", number),
        }
    }

    /// Inserts or overwrites one key's value in a map field, keyed by
    /// [`ReflectValueBox`] equality so repeated `put_map` calls with the
    /// same key overwrite in place rather than appending a duplicate entry.
    pub fn put_map(&mut self, number: u32, key: ReflectValueBox, value: ReflectValueBox) {
        match self.fields.entry(number).or_insert_with(|| FieldStorage::Map(Vec::new())) {
            FieldStorage::Map(entries) => {
                if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                } else {
                    entries.push((key, value));
                }
            }
            _ => panic!("field {} is not a map", number),
        }
    }

    /// Decodes using `descriptor`: unrecognized tags and type-incompatible
    /// wire values are preserved verbatim in `unknown_fields`.
    pub fn decode(
        descriptor: &MessageDescriptor,
        resolver: &dyn TypeResolver,
        bytes: &[u8],
    ) -> CodecResult<DynamicMessage> {
        let mut msg = DynamicMessage::new(descriptor.clone());
        let mut it = FieldIterator::new(bytes);
        loop {
            let start = it.pos();
            let (number, value) = match it.next()? {
                Some(pair) => pair,
                None => break,
            };
            if let Some(map) = descriptor.map_by_number(number) {
                if let FieldValue::Len(body) = value {
                    let (k, v) = decode_map_entry(map, resolver, body)?;
                    msg.put_map(number, k, v);
                    continue;
                }
            }
            if let Some(field) = descriptor.field_by_number(number) {
                match decode_field_value(field, resolver, value) {
                    Some(decoded) => {
                        if field.is_repeated() {
                            match decoded {
                                DecodedValue::One(v) => msg.push_repeated(number, v),
                                DecodedValue::Many(vs) => {
                                    for v in vs {
                                        msg.push_repeated(number, v);
                                    }
                                }
                            }
                        } else {
                            match decoded {
                                DecodedValue::One(v) => msg.set(number, v),
                                DecodedValue::Many(vs) => {
                                    if let Some(v) = vs.into_iter().last() {
                                        msg.set(number, v);
                                    }
                                }
                            }
                        }
                        continue;
                    }
                    None => {
                        // Wire type incompatible with the declared field
                        // type: treat as unknown rather than erroring out.
                    }
                }
            }
            msg.unknown_fields.push_raw(&bytes[start..it.pos()]);
        }
        Ok(msg)
    }

    /// Emits the same bytes a generated codec would, ascending by field
    /// number.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (&number, storage) in &self.fields {
            if let Some(map) = self.descriptor.map_by_number(number) {
                if let FieldStorage::Map(entries) = storage {
                    for (k, v) in entries {
                        let mut entry = Vec::new();
                        encode_scalar_value(&mut entry, 1, k, scalar_field_type(map.key_type));
                        encode_value(&mut entry, 2, v, &map.value_type);
                        wire::encode_tag(&mut out, Tag { field_number: number, wire_type: WireType::Len });
                        wire::encode_len(&mut out, &entry);
                    }
                }
                continue;
            }
            let field = match self.descriptor.field_by_number(number) {
                Some(f) => f,
                None => continue,
            };
            match storage {
                // Presence in `self.fields` is itself the presence signal:
                // a proto3 implicit field that was never `set`/decoded
                // simply has no entry, so the zero default is skipped for
                // free without re-checking `v.is_zero()` here.
                FieldStorage::Scalar(v) => {
                    encode_value(&mut out, number, v, &field.field_type);
                }
                FieldStorage::Repeated(values) => {
                    encode_repeated(&mut out, number, values, &field.field_type, field.packed);
                }
                FieldStorage::Map(_) => unreachable!("handled above"),
            }
        }
        self.unknown_fields.write_to(&mut out);
        out
    }
}

fn scalar_field_type(ty: ScalarType) -> FieldType {
    FieldType::Scalar(ty)
}

enum DecodedValue {
    One(ReflectValueBox),
    Many(Vec<ReflectValueBox>),
}

fn decode_field_value(
    field: &super::descriptor::FieldDescriptor,
    resolver: &dyn TypeResolver,
    value: FieldValue<'_>,
) -> Option<DecodedValue> {
    match &field.field_type {
        FieldType::Scalar(scalar) => decode_scalar(*scalar, value),
        FieldType::Enum(_fqn) => match value {
            FieldValue::Varint(v) => Some(DecodedValue::One(ReflectValueBox::Enum(v as i32))),
            FieldValue::Len(body) if field.is_repeated() => {
                let mut out = Vec::new();
                for v in wire::PackedVarintIterator::new(body) {
                    out.push(ReflectValueBox::Enum(v.ok()? as i32));
                }
                Some(DecodedValue::Many(out))
            }
            _ => None,
        },
        FieldType::Message(fqn) => match value {
            FieldValue::Len(body) => {
                let nested_desc = resolver.resolve_message(fqn)?;
                let nested = DynamicMessage::decode(nested_desc, resolver, body).ok()?;
                Some(DecodedValue::One(ReflectValueBox::Message(Box::new(nested))))
            }
            _ => None,
        },
    }
}

fn decode_scalar(scalar: ScalarType, value: FieldValue<'_>) -> Option<DecodedValue> {
    use ScalarType::*;
    match (scalar, value) {
        (Int32, FieldValue::Varint(v)) => Some(DecodedValue::One(ReflectValueBox::I32(v as i32))),
        (Int64, FieldValue::Varint(v)) => Some(DecodedValue::One(ReflectValueBox::I64(v as i64))),
        (Uint32, FieldValue::Varint(v)) => Some(DecodedValue::One(ReflectValueBox::U32(v as u32))),
        (Uint64, FieldValue::Varint(v)) => Some(DecodedValue::One(ReflectValueBox::U64(v))),
        (Bool, FieldValue::Varint(v)) => Some(DecodedValue::One(ReflectValueBox::Bool(v != 0))),
        (Sint32, FieldValue::Varint(v)) => {
            Some(DecodedValue::One(ReflectValueBox::I32(varint::zigzag_decode_32(v as u32))))
        }
        (Sint64, FieldValue::Varint(v)) => {
            Some(DecodedValue::One(ReflectValueBox::I64(varint::zigzag_decode_64(v))))
        }
        (Fixed32, FieldValue::I32(v)) => Some(DecodedValue::One(ReflectValueBox::U32(v))),
        (Sfixed32, FieldValue::I32(v)) => Some(DecodedValue::One(ReflectValueBox::I32(v as i32))),
        (Float, FieldValue::I32(v)) => Some(DecodedValue::One(ReflectValueBox::F32(f32::from_bits(v)))),
        (Fixed64, FieldValue::I64(v)) => Some(DecodedValue::One(ReflectValueBox::U64(v))),
        (Sfixed64, FieldValue::I64(v)) => Some(DecodedValue::One(ReflectValueBox::I64(v as i64))),
        (Double, FieldValue::I64(v)) => Some(DecodedValue::One(ReflectValueBox::F64(f64::from_bits(v)))),
        (String, FieldValue::Len(bytes)) => {
            Some(DecodedValue::One(ReflectValueBox::String(String::from_utf8_lossy(bytes).into_owned())))
        }
        (Bytes, FieldValue::Len(bytes)) => Some(DecodedValue::One(ReflectValueBox::Bytes(bytes.to_vec()))),
        // Packed numeric scalars, accepted regardless of the declared
        // `packed` option: decode is forgiving of either wire form.
        (Int32, FieldValue::Len(body)) => decode_packed_varint(body, |v| ReflectValueBox::I32(v as i32)),
        (Int64, FieldValue::Len(body)) => decode_packed_varint(body, |v| ReflectValueBox::I64(v as i64)),
        (Uint32, FieldValue::Len(body)) => decode_packed_varint(body, |v| ReflectValueBox::U32(v as u32)),
        (Uint64, FieldValue::Len(body)) => decode_packed_varint(body, ReflectValueBox::U64),
        (Bool, FieldValue::Len(body)) => decode_packed_varint(body, |v| ReflectValueBox::Bool(v != 0)),
        (Sint32, FieldValue::Len(body)) => {
            decode_packed_varint(body, |v| ReflectValueBox::I32(varint::zigzag_decode_32(v as u32)))
        }
        (Sint64, FieldValue::Len(body)) => {
            decode_packed_varint(body, |v| ReflectValueBox::I64(varint::zigzag_decode_64(v)))
        }
        (Fixed32, FieldValue::Len(body)) => decode_packed_fixed32(body, ReflectValueBox::U32),
        (Sfixed32, FieldValue::Len(body)) => decode_packed_fixed32(body, |v| ReflectValueBox::I32(v as i32)),
        (Float, FieldValue::Len(body)) => decode_packed_fixed32(body, |v| ReflectValueBox::F32(f32::from_bits(v))),
        (Fixed64, FieldValue::Len(body)) => decode_packed_fixed64(body, ReflectValueBox::U64),
        (Sfixed64, FieldValue::Len(body)) => decode_packed_fixed64(body, |v| ReflectValueBox::I64(v as i64)),
        (Double, FieldValue::Len(body)) => decode_packed_fixed64(body, |v| ReflectValueBox::F64(f64::from_bits(v))),
        _ => None,
    }
}

fn decode_packed_varint(body: &[u8], f: impl Fn(u64) -> ReflectValueBox) -> Option<DecodedValue> {
    let mut out = Vec::new();
    for v in wire::PackedVarintIterator::new(body) {
        out.push(f(v.ok()?));
    }
    Some(DecodedValue::Many(out))
}

fn decode_packed_fixed32(body: &[u8], f: impl Fn(u32) -> ReflectValueBox) -> Option<DecodedValue> {
    let it = wire::PackedFixed32Iterator::new(body).ok()?;
    Some(DecodedValue::Many(it.map(f).collect()))
}

fn decode_packed_fixed64(body: &[u8], f: impl Fn(u64) -> ReflectValueBox) -> Option<DecodedValue> {
    let it = wire::PackedFixed64Iterator::new(body).ok()?;
    Some(DecodedValue::Many(it.map(f).collect()))
}

fn decode_map_entry(
    map: &super::descriptor::MapDescriptor,
    resolver: &dyn TypeResolver,
    body: &[u8],
) -> CodecResult<(ReflectValueBox, ReflectValueBox)> {
    let mut key = ReflectValueBox::zero_for_scalar(map.key_type);
    let mut value = default_for_field_type(&map.value_type, resolver);
    let mut it = FieldIterator::new(body);
    while let Some((number, fv)) = it.next()? {
        match number {
            1 => {
                if let Some(DecodedValue::One(v)) = decode_scalar(map.key_type, fv) {
                    key = v;
                }
            }
            2 => {
                let synthetic = super::descriptor::FieldDescriptor {
                    number: 2,
                    name: "value".into(),
                    json_name: "value".into(),
                    field_type: map.value_type.clone(),
                    label: Label::Optional,
                    packed: false,
                    oneof_index: None,
                };
                if let Some(DecodedValue::One(v)) = decode_field_value(&synthetic, resolver, fv) {
                    value = v;
                }
            }
            _ => {}
        }
    }
    Ok((key, value))
}

/// Default map value when a map entry carries no explicit field 2 (a
/// conformant encoder never omits it, but a hand-built one might).
fn default_for_field_type(ty: &FieldType, resolver: &dyn TypeResolver) -> ReflectValueBox {
    match ty {
        FieldType::Scalar(s) => ReflectValueBox::zero_for_scalar(*s),
        FieldType::Enum(_) => ReflectValueBox::Enum(0),
        FieldType::Message(fqn) => match resolver.resolve_message(fqn) {
            Some(desc) => ReflectValueBox::Message(Box::new(DynamicMessage::new(desc.clone()))),
            None => ReflectValueBox::Enum(0),
        },
    }
}

fn encode_value(out: &mut Vec<u8>, number: u32, value: &ReflectValueBox, ty: &FieldType) {
    match ty {
        FieldType::Scalar(scalar) => encode_scalar_value(out, number, value, FieldType::Scalar(*scalar)),
        FieldType::Enum(_) => {
            let n = value.as_i64().unwrap_or(0) as i32;
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Varint });
            varint::encode_varint(out, n as i64 as u64);
        }
        FieldType::Message(_) => {
            if let Some(m) = value.as_message() {
                wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Len });
                wire::encode_len(out, &m.encode());
            }
        }
    }
}

fn encode_scalar_value(out: &mut Vec<u8>, number: u32, value: &ReflectValueBox, ty: FieldType) {
    let scalar = match ty {
        FieldType::Scalar(s) => s,
        _ => return,
    };
    use ScalarType::*;
    match scalar {
        Int32 => {
            // Negative int32 values sign-extend to the full 10-byte varint
            // form, matching peer protobuf implementations' canonical wire
            // bytes (protobuf treats int32 varint encoding as i64 arithmetic).
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Varint });
            varint::encode_varint(out, value.as_i64().unwrap_or(0) as u64);
        }
        Uint32 => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Varint });
            varint::encode_varint(out, value.as_u64().unwrap_or(0) & 0xFFFF_FFFF);
        }
        Int64 | Uint64 | Bool => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Varint });
            varint::encode_varint(out, value.as_u64().unwrap_or(0));
        }
        Sint32 => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Varint });
            varint::encode_varint(out, varint::zigzag_encode_32(value.as_i64().unwrap_or(0) as i32) as u64);
        }
        Sint64 => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Varint });
            varint::encode_varint(out, varint::zigzag_encode_64(value.as_i64().unwrap_or(0)));
        }
        Fixed32 | Sfixed32 => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::I32 });
            varint::encode_fixed32(out, value.as_u64().unwrap_or(0) as u32);
        }
        Float => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::I32 });
            varint::encode_fixed32(out, (value.as_f64().unwrap_or(0.0) as f32).to_bits());
        }
        Fixed64 | Sfixed64 => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::I64 });
            varint::encode_fixed64(out, value.as_u64().unwrap_or(0));
        }
        Double => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::I64 });
            varint::encode_fixed64(out, value.as_f64().unwrap_or(0.0).to_bits());
        }
        String => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Len });
            wire::encode_len(out, value.as_str().unwrap_or("").as_bytes());
        }
        Bytes => {
            wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Len });
            wire::encode_len(out, value.as_bytes().unwrap_or(&[]));
        }
    }
}

fn encode_repeated(out: &mut Vec<u8>, number: u32, values: &[ReflectValueBox], ty: &FieldType, packed: bool) {
    if values.is_empty() {
        return;
    }
    let scalar = match ty {
        FieldType::Scalar(s) => Some(*s),
        _ => None,
    };
    let is_numeric_packable = matches!(
        scalar,
        Some(
            ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::Uint32
                | ScalarType::Uint64
                | ScalarType::Sint32
                | ScalarType::Sint64
                | ScalarType::Bool
                | ScalarType::Fixed32
                | ScalarType::Fixed64
                | ScalarType::Sfixed32
                | ScalarType::Sfixed64
                | ScalarType::Float
                | ScalarType::Double
        )
    ) || matches!(ty, FieldType::Enum(_));
    if packed && is_numeric_packable {
        let mut body = Vec::new();
        for v in values {
            encode_packed_element(&mut body, v, ty);
        }
        wire::encode_tag(out, Tag { field_number: number, wire_type: WireType::Len });
        wire::encode_len(out, &body);
    } else {
        for v in values {
            encode_value(out, number, v, ty);
        }
    }
}

fn encode_packed_element(out: &mut Vec<u8>, value: &ReflectValueBox, ty: &FieldType) {
    match ty {
        FieldType::Enum(_) => {
            varint::encode_varint(out, value.as_i64().unwrap_or(0) as i32 as i64 as u64);
        }
        FieldType::Scalar(scalar) => {
            use ScalarType::*;
            match scalar {
                Int32 => varint::encode_varint(out, value.as_i64().unwrap_or(0) as u64),
                Uint32 => varint::encode_varint(out, value.as_u64().unwrap_or(0) & 0xFFFF_FFFF),
                Int64 | Uint64 | Bool => varint::encode_varint(out, value.as_u64().unwrap_or(0)),
                Sint32 => varint::encode_varint(out, varint::zigzag_encode_32(value.as_i64().unwrap_or(0) as i32) as u64),
                Sint64 => varint::encode_varint(out, varint::zigzag_encode_64(value.as_i64().unwrap_or(0))),
                Fixed32 | Sfixed32 => varint::encode_fixed32(out, value.as_u64().unwrap_or(0) as u32),
                Float => varint::encode_fixed32(out, (value.as_f64().unwrap_or(0.0) as f32).to_bits()),
                Fixed64 | Sfixed64 => varint::encode_fixed64(out, value.as_u64().unwrap_or(0)),
                Double => varint::encode_fixed64(out, value.as_f64().unwrap_or(0.0).to_bits()),
                _ => {}
            }
        }
        FieldType::Message(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::descriptor::{FieldDescriptor, Label};

    struct EmptyResolver;
    impl TypeResolver for EmptyResolver {
        fn resolve_message(&self, _fqn: &str) -> Option<&MessageDescriptor> {
            None
        }
        fn resolve_enum(&self, _fqn: &str) -> Option<&super::super::descriptor::EnumDescriptor> {
            None
        }
    }

    fn simple_descriptor() -> MessageDescriptor {
        MessageDescriptor {
            name: "Simple".into(),
            full_name: ".Simple".into(),
            fields: vec![FieldDescriptor {
                number: 1,
                name: "value".into(),
                json_name: "value".into(),
                field_type: FieldType::Scalar(ScalarType::Int32),
                label: Label::Implicit,
                packed: false,
                oneof_index: None,
            }],
            oneofs: vec![],
            maps: vec![],
        }
    }

    #[test]
    fn set_get_scalar() {
        let mut m = DynamicMessage::new(simple_descriptor());
        m.set(1, ReflectValueBox::I32(42));
        assert_eq!(m.get(1), Some(&ReflectValueBox::I32(42)));
    }

    #[test]
    fn decode_then_encode_round_trip() {
        let mut out = Vec::new();
        wire::encode_tag(&mut out, Tag { field_number: 1, wire_type: WireType::Varint });
        varint::encode_varint(&mut out, 150);
        let decoded = DynamicMessage::decode(&simple_descriptor(), &EmptyResolver, &out).unwrap();
        assert_eq!(decoded.get(1), Some(&ReflectValueBox::I32(150)));
        assert_eq!(decoded.encode(), out);
    }

    #[test]
    fn implicit_zero_is_skipped_on_encode() {
        let mut m = DynamicMessage::new(simple_descriptor());
        m.set(1, ReflectValueBox::I32(0));
        // Explicit `set` still records presence in the map; implicit
        // zero-valued fields are only skipped when never set at all.
        assert!(!m.encode().is_empty());
        let empty = DynamicMessage::new(simple_descriptor());
        assert!(empty.encode().is_empty());
    }
}
