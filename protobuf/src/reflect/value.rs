//! Generic runtime values, used by [`crate::reflect::dynamic::DynamicMessage`]
//! and by the JSON/text printers when they need to hold a value whose type
//! isn't known until run time.

use std::fmt;

use super::descriptor::ScalarType;

/// An owned, dynamically-typed protobuf value.
#[derive(Debug, Clone, PartialEq)]
pub enum ReflectValueBox {
    U32(u32),
    U64(u64),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Enum(i32),
    Message(Box<super::dynamic::DynamicMessage>),
}

impl fmt::Display for ReflectValueBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectValueBox::U32(v) => write!(f, "{}", v),
            ReflectValueBox::U64(v) => write!(f, "{}", v),
            ReflectValueBox::I32(v) => write!(f, "{}", v),
            ReflectValueBox::I64(v) => write!(f, "{}", v),
            ReflectValueBox::F32(v) => write!(f, "{}", v),
            ReflectValueBox::F64(v) => write!(f, "{}", v),
            ReflectValueBox::Bool(v) => write!(f, "{}", v),
            ReflectValueBox::String(v) => write!(f, "{}", v),
            ReflectValueBox::Bytes(v) => write!(f, "{} bytes", v.len()),
            ReflectValueBox::Enum(v) => write!(f, "{}", v),
            ReflectValueBox::Message(v) => write!(f, "{}", v.descriptor()),
        }
    }
}

impl ReflectValueBox {
    /// The zero/default value for a scalar type, per proto3's implicit-
    /// presence defaulting rule.
    pub fn zero_for_scalar(ty: ScalarType) -> ReflectValueBox {
        match ty {
            ScalarType::Double => ReflectValueBox::F64(0.0),
            ScalarType::Float => ReflectValueBox::F32(0.0),
            ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32 => ReflectValueBox::I32(0),
            ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64 => ReflectValueBox::I64(0),
            ScalarType::Uint32 | ScalarType::Fixed32 => ReflectValueBox::U32(0),
            ScalarType::Uint64 | ScalarType::Fixed64 => ReflectValueBox::U64(0),
            ScalarType::Bool => ReflectValueBox::Bool(false),
            ScalarType::String => ReflectValueBox::String(String::new()),
            ScalarType::Bytes => ReflectValueBox::Bytes(Vec::new()),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            ReflectValueBox::U32(v) => *v == 0,
            ReflectValueBox::U64(v) => *v == 0,
            ReflectValueBox::I32(v) => *v == 0,
            ReflectValueBox::I64(v) => *v == 0,
            ReflectValueBox::F32(v) => *v == 0.0,
            ReflectValueBox::F64(v) => *v == 0.0,
            ReflectValueBox::Bool(v) => !*v,
            ReflectValueBox::String(v) => v.is_empty(),
            ReflectValueBox::Bytes(v) => v.is_empty(),
            ReflectValueBox::Enum(v) => *v == 0,
            ReflectValueBox::Message(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReflectValueBox::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ReflectValueBox::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            ReflectValueBox::U32(v) => Some(v as u64),
            ReflectValueBox::U64(v) => Some(v),
            ReflectValueBox::I32(v) => Some(v as u32 as u64),
            ReflectValueBox::I64(v) => Some(v as u64),
            ReflectValueBox::Bool(v) => Some(v as u64),
            ReflectValueBox::Enum(v) => Some(v as i64 as u64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ReflectValueBox::I32(v) => Some(v as i64),
            ReflectValueBox::I64(v) => Some(v),
            ReflectValueBox::U32(v) => Some(v as i64),
            ReflectValueBox::U64(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ReflectValueBox::F32(v) => Some(v as f64),
            ReflectValueBox::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ReflectValueBox::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// The raw wire number of an `Enum` value, for generated code building
    /// an [`crate::EnumOrUnknown`] from a dynamic field.
    pub fn as_enum_number(&self) -> Option<i32> {
        match *self {
            ReflectValueBox::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&super::dynamic::DynamicMessage> {
        match self {
            ReflectValueBox::Message(m) => Some(m),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_match_scalar_kind() {
        assert_eq!(ReflectValueBox::zero_for_scalar(ScalarType::Int32), ReflectValueBox::I32(0));
        assert_eq!(
            ReflectValueBox::zero_for_scalar(ScalarType::String),
            ReflectValueBox::String(String::new())
        );
        assert!(ReflectValueBox::zero_for_scalar(ScalarType::Bytes).is_zero());
    }

    #[test]
    fn is_zero_detects_non_defaults() {
        assert!(!ReflectValueBox::I32(1).is_zero());
        assert!(!ReflectValueBox::String("x".into()).is_zero());
        assert!(ReflectValueBox::Bool(false).is_zero());
    }

    #[test]
    fn enum_number_only_readable_from_enum_variant() {
        assert_eq!(ReflectValueBox::Enum(7).as_enum_number(), Some(7));
        assert_eq!(ReflectValueBox::I32(7).as_enum_number(), None);
    }
}
