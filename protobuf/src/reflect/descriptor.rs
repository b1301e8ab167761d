//! Runtime descriptor model. Hand-built as plain data rather than
//! bootstrapped from `descriptor.proto` — there is nothing here beyond what
//! the dynamic message and JSON/text printers need for reflection.

use std::fmt;

/// The 15 scalar field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    /// Whether this scalar type is a valid map key: every integral/bool/
    /// string scalar except float, double and bytes.
    pub fn is_valid_map_key(self) -> bool {
        !matches!(self, ScalarType::Float | ScalarType::Double | ScalarType::Bytes)
    }

    /// Whether the JSON mapping renders this scalar as a quoted string
    /// (the 64-bit integer types, since JSON numbers lose precision above
    /// 2^53).
    pub fn is_json_string_type(self) -> bool {
        matches!(
            self,
            ScalarType::Int64
                | ScalarType::Uint64
                | ScalarType::Sint64
                | ScalarType::Fixed64
                | ScalarType::Sfixed64
        )
    }
}

/// A field's declared type: a scalar kind, or a reference (by FQN) to a
/// message or enum resolved by the linker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Message(String),
    Enum(String),
}

/// A field's cardinality and presence tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// proto3 default: presence indistinguishable from the zero value.
    Implicit,
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub number: u32,
    pub name: String,
    pub json_name: String,
    pub field_type: FieldType,
    pub label: Label,
    pub packed: bool,
    pub oneof_index: Option<usize>,
}

impl FieldDescriptor {
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneofDescriptor {
    pub name: String,
    /// Indices into the owning `MessageDescriptor::fields`.
    pub field_indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDescriptor {
    pub name: String,
    pub number: u32,
    pub key_type: ScalarType,
    pub value_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: String,
    pub full_name: String,
    pub values: Vec<EnumValueDescriptor>,
    /// proto3 enums are open (unknown numeric values survive decode);
    /// proto2 enums are closed.
    pub is_open: bool,
}

impl EnumDescriptor {
    pub fn name_for_number(&self, number: i32) -> Option<&str> {
        self.values.iter().find(|v| v.number == number).map(|v| v.name.as_str())
    }

    pub fn number_for_name(&self, name: &str) -> Option<i32> {
        self.values.iter().find(|v| v.name == name).map(|v| v.number)
    }
}

impl fmt::Display for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub name: String,
    pub full_name: String,
    pub fields: Vec<FieldDescriptor>,
    pub oneofs: Vec<OneofDescriptor>,
    pub maps: Vec<MapDescriptor>,
}

impl MessageDescriptor {
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.number == number)
    }

    pub fn map_by_number(&self, number: u32) -> Option<&MapDescriptor> {
        self.maps.iter().find(|m| m.number == number)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name)
    }
}

/// Syntax a `File` was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Proto2,
    Proto3,
}

/// The `_file_descriptor` a generated file module exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub package: Option<String>,
    pub syntax: Syntax,
    pub messages: Vec<MessageDescriptor>,
    pub enums: Vec<EnumDescriptor>,
}

/// Resolves a named type reference (`FieldType::Message`/`Enum` carry only
/// the FQN string) to its descriptor. Implemented by a linked file set
/// (`protobuf-parser`) and, in tests, by a simple registry built by hand.
pub trait TypeResolver {
    fn resolve_message(&self, fqn: &str) -> Option<&MessageDescriptor>;
    fn resolve_enum(&self, fqn: &str) -> Option<&EnumDescriptor>;
}

/// Tries `first`, falling back to `second`. Generated code uses one of
/// these per file to resolve a cross-file reference (an imported message
/// or enum) without carrying the whole multi-file linker around at run
/// time — each imported file contributes its own small resolver, chained
/// onto the importing file's.
pub struct ChainedResolver<'a> {
    pub first: &'a dyn TypeResolver,
    pub second: &'a dyn TypeResolver,
}

impl<'a> TypeResolver for ChainedResolver<'a> {
    fn resolve_message(&self, fqn: &str) -> Option<&MessageDescriptor> {
        self.first.resolve_message(fqn).or_else(|| self.second.resolve_message(fqn))
    }

    fn resolve_enum(&self, fqn: &str) -> Option<&EnumDescriptor> {
        self.first.resolve_enum(fqn).or_else(|| self.second.resolve_enum(fqn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_key_type_validity() {
        assert!(ScalarType::Int32.is_valid_map_key());
        assert!(ScalarType::String.is_valid_map_key());
        assert!(ScalarType::Bool.is_valid_map_key());
        assert!(!ScalarType::Float.is_valid_map_key());
        assert!(!ScalarType::Double.is_valid_map_key());
        assert!(!ScalarType::Bytes.is_valid_map_key());
    }

    #[test]
    fn json_string_types_are_64_bit_integers() {
        assert!(ScalarType::Int64.is_json_string_type());
        assert!(ScalarType::Uint64.is_json_string_type());
        assert!(!ScalarType::Int32.is_json_string_type());
        assert!(!ScalarType::Fixed32.is_json_string_type());
    }

    #[test]
    fn enum_lookup_both_directions() {
        let e = EnumDescriptor {
            name: "Color".into(),
            full_name: ".Color".into(),
            values: vec![
                EnumValueDescriptor { name: "UNSPECIFIED".into(), number: 0 },
                EnumValueDescriptor { name: "RED".into(), number: 1 },
            ],
            is_open: true,
        };
        assert_eq!(e.name_for_number(1), Some("RED"));
        assert_eq!(e.number_for_name("RED"), Some(1));
        assert_eq!(e.name_for_number(99), None);
    }
}
