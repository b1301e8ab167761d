//! Runtime support for generated protobuf code: the wire codec, the
//! reflection/dynamic-message model, and the JSON and text-format mappings.

pub mod enum_or_unknown;
pub mod error;
pub mod json;
pub mod message;
pub mod ordered_map;
pub mod reflect;
pub mod text;
pub mod unknown;
pub mod varint;
pub mod wire;

pub use enum_or_unknown::{EnumOrUnknown, ProtobufEnum};
pub use error::{CodecError, CodecResult};
pub use message::Message;
pub use ordered_map::OrderedMap;
pub use reflect::{DynamicMessage, ReflectValueBox};
pub use unknown::UnknownFields;
