//! Reflection and schema-driven runtime types.

pub mod descriptor;
pub mod dynamic;
pub mod value;

pub use descriptor::{
    ChainedResolver, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldType,
    FileDescriptor, Label, MapDescriptor, MessageDescriptor, OneofDescriptor, ScalarType, Syntax,
    TypeResolver,
};
pub use dynamic::DynamicMessage;
pub use value::ReflectValueBox;
