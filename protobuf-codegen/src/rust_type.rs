//! Maps descriptor-level types to Rust type expressions and to the
//! Rust names generated structs/enums use.

use protobuf::reflect::{FieldDescriptor, FieldType, Label, ScalarType};

pub fn scalar_rust_type(s: ScalarType) -> &'static str {
    match s {
        ScalarType::Double => "f64",
        ScalarType::Float => "f32",
        ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32 => "i32",
        ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64 => "i64",
        ScalarType::Uint32 | ScalarType::Fixed32 => "u32",
        ScalarType::Uint64 | ScalarType::Fixed64 => "u64",
        ScalarType::Bool => "bool",
        ScalarType::String => "String",
        ScalarType::Bytes => "Vec<u8>",
    }
}

pub fn scalar_default_expr(s: ScalarType) -> &'static str {
    match s {
        ScalarType::Double | ScalarType::Float => "0.0",
        ScalarType::Bool => "false",
        ScalarType::String => "String::new()",
        ScalarType::Bytes => "Vec::new()",
        _ => "0",
    }
}

/// Strips `package.` off a fully-qualified descriptor name and joins the
/// remaining nested-message path with `_`, giving the flat Rust item name
/// this generator uses (every message/enum in a file becomes one top-level
/// Rust item, nested or not).
pub fn rust_item_name(full_name: &str, package: Option<&str>) -> String {
    let stripped = full_name.strip_prefix('.').unwrap_or(full_name);
    let relative = match package {
        Some(p) if !p.is_empty() => stripped.strip_prefix(p).and_then(|s| s.strip_prefix('.')).unwrap_or(stripped),
        _ => stripped,
    };
    relative.replace('.', "_")
}

/// The Rust type of a singular (non-repeated, non-map) field's value, not
/// accounting for the `Option`/`Box` wrapping a message reference needs —
/// callers apply that themselves since it differs for oneof members.
pub fn bare_field_rust_type(field_type: &FieldType, package: Option<&str>) -> String {
    match field_type {
        FieldType::Scalar(s) => scalar_rust_type(*s).to_string(),
        FieldType::Message(fqn) => rust_item_name(fqn, package),
        FieldType::Enum(fqn) => rust_item_name(fqn, package),
    }
}

/// The full Rust type a struct field declaration uses, given its label.
pub fn field_rust_type(field_type: &FieldType, label: Label, package: Option<&str>) -> String {
    let bare = bare_field_rust_type(field_type, package);
    match (label, field_type) {
        (Label::Repeated, _) => format!("Vec<{}>", bare),
        (_, FieldType::Message(_)) => format!("::std::option::Option<Box<{}>>", bare),
        _ => bare,
    }
}

/// The Rust type of one oneof-member's payload (never `Vec`/`Option`-wrapped
/// — the wrapping lives on the surrounding oneof enum variant and on the
/// `Option<OneofEnum>` field the parent struct holds instead).
pub fn oneof_member_rust_type(field_type: &FieldType, package: Option<&str>) -> String {
    match field_type {
        FieldType::Scalar(s) => scalar_rust_type(*s).to_string(),
        FieldType::Message(fqn) => format!("Box<{}>", rust_item_name(fqn, package)),
        FieldType::Enum(fqn) => format!("protobuf::EnumOrUnknown<{}>", rust_item_name(fqn, package)),
    }
}

/// The Rust type of a non-repeated, non-map struct field, given its label.
/// Message fields are always `Option<Box<_>>` — `None` already signals
/// "not yet set" for a `required` field without inventing a sentinel
/// value. Enum fields use [`protobuf::EnumOrUnknown`] so a wire number with
/// no matching variant survives decode→encode, applied uniformly to
/// proto2 enums too — see DESIGN.md.
pub fn struct_field_rust_type(field: &FieldDescriptor, package: Option<&str>) -> String {
    if field.is_repeated() {
        let bare = match &field.field_type {
            FieldType::Scalar(s) => scalar_rust_type(*s).to_string(),
            FieldType::Message(fqn) => rust_item_name(fqn, package),
            FieldType::Enum(fqn) => format!("protobuf::EnumOrUnknown<{}>", rust_item_name(fqn, package)),
        };
        return format!("Vec<{}>", bare);
    }
    match &field.field_type {
        FieldType::Message(fqn) => format!("::std::option::Option<Box<{}>>", rust_item_name(fqn, package)),
        FieldType::Enum(fqn) => {
            let bare = format!("protobuf::EnumOrUnknown<{}>", rust_item_name(fqn, package));
            if field.label == Label::Optional {
                format!("::std::option::Option<{}>", bare)
            } else {
                bare
            }
        }
        FieldType::Scalar(s) => {
            let bare = scalar_rust_type(*s).to_string();
            if field.label == Label::Optional {
                format!("::std::option::Option<{}>", bare)
            } else {
                bare
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_package_and_joins_nested_path() {
        assert_eq!(rust_item_name(".demo.Outer.Inner", Some("demo")), "Outer_Inner");
        assert_eq!(rust_item_name(".Outer", None), "Outer");
    }

    #[test]
    fn message_fields_are_boxed_options() {
        let t = field_rust_type(&FieldType::Message(".demo.Inner".to_string()), Label::Optional, Some("demo"));
        assert_eq!(t, "::std::option::Option<Box<Inner>>");
    }

    #[test]
    fn repeated_scalar_is_a_vec() {
        let t = field_rust_type(&FieldType::Scalar(ScalarType::Int32), Label::Repeated, None);
        assert_eq!(t, "Vec<i32>");
    }
}
