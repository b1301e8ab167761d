//! Plain immutable `.proto` AST records, covering what the linker and code
//! generator here actually consume.

use crate::diagnostics::Loc;
use protobuf::reflect::ScalarType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Proto2,
    Proto3,
}

impl Default for Syntax {
    fn default() -> Syntax {
        Syntax::Proto2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Implicit,
    Optional,
    Required,
    Repeated,
}

/// A field's declared type before linking: a scalar kind, or a name that
/// the linker resolves into a message or enum reference.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Scalar(ScalarType),
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Ident(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Option_ {
    pub name: String,
    pub value: OptionValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub loc: Loc,
    pub name: String,
    pub label: Label,
    pub type_ref: TypeRef,
    pub number: i32,
    pub options: Vec<Option_>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapField {
    pub loc: Loc,
    pub name: String,
    pub number: i32,
    pub key_type: ScalarType,
    pub value_type: TypeRef,
    pub options: Vec<Option_>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneOf {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNumberRange {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldOrOneOf {
    Field(Field),
    OneOf(OneOf),
    Map(MapField),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub loc: Option<Loc>,
    pub name: String,
    pub fields: Vec<FieldOrOneOf>,
    pub reserved_nums: Vec<FieldNumberRange>,
    pub reserved_names: Vec<String>,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
    pub options: Vec<Option_>,
}

impl Message {
    pub fn regular_fields(&self) -> Vec<&Field> {
        self.fields
            .iter()
            .flat_map(|fo| match fo {
                FieldOrOneOf::Field(f) => vec![f],
                FieldOrOneOf::OneOf(o) => o.fields.iter().collect(),
                FieldOrOneOf::Map(_) => vec![],
            })
            .collect()
    }

    pub fn maps(&self) -> Vec<&MapField> {
        self.fields
            .iter()
            .filter_map(|fo| match fo {
                FieldOrOneOf::Map(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn oneofs(&self) -> Vec<&OneOf> {
        self.fields
            .iter()
            .filter_map(|fo| match fo {
                FieldOrOneOf::OneOf(o) => Some(o),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub loc: Loc,
    pub name: String,
    pub number: i32,
    pub options: Vec<Option_>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enum {
    pub name: String,
    pub values: Vec<EnumValue>,
    pub options: Vec<Option_>,
}

impl Enum {
    pub fn allow_alias(&self) -> bool {
        self.options
            .iter()
            .any(|o| o.name == "allow_alias" && matches!(o.value, OptionValue::Bool(true)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub loc: Loc,
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportVis {
    Default,
    Public,
    Weak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub loc: Loc,
    pub path: String,
    pub vis: ImportVis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extend {
    pub loc: Loc,
    pub extendee: String,
    pub fields: Vec<Field>,
}

/// A whole parsed `.proto` file, before linking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct File {
    pub syntax: Syntax,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
    pub services: Vec<Service>,
    pub extends: Vec<Extend>,
    pub options: Vec<Option_>,
}
