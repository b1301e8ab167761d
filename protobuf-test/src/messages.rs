//! Hand-authored stand-ins for what `protobuf-codegen` would emit from a
//! `demo.proto` declaring these same messages, used to exercise the wire
//! codec, JSON/text mapping and dynamic<->generated interop end to end
//! without running the generator itself.

#![allow(dead_code)]

fn _file_messages() -> Vec<protobuf::reflect::MessageDescriptor> {
    vec![
        Point::descriptor(),
        ColorList::descriptor(),
        SubMessage::descriptor(),
        OneofMessage::descriptor(),
        MapMessage::descriptor(),
        EdgeMessage::descriptor(),
    ]
}

fn _file_enums() -> Vec<protobuf::reflect::EnumDescriptor> {
    vec![protobuf::reflect::EnumDescriptor {
        name: "Color".to_string(),
        full_name: ".demo.Color".to_string(),
        values: vec![
            protobuf::reflect::EnumValueDescriptor { name: "UNSPECIFIED".to_string(), number: 0 },
            protobuf::reflect::EnumValueDescriptor { name: "RED".to_string(), number: 1 },
            protobuf::reflect::EnumValueDescriptor { name: "GREEN".to_string(), number: 2 },
            protobuf::reflect::EnumValueDescriptor { name: "BLUE".to_string(), number: 3 },
        ],
        is_open: true,
    }]
}

struct _FileResolver {
    messages: Vec<protobuf::reflect::MessageDescriptor>,
    enums: Vec<protobuf::reflect::EnumDescriptor>,
}

impl protobuf::reflect::TypeResolver for _FileResolver {
    fn resolve_message(&self, fqn: &str) -> ::std::option::Option<&protobuf::reflect::MessageDescriptor> {
        self.messages.iter().find(|m| m.full_name == fqn)
    }

    fn resolve_enum(&self, fqn: &str) -> ::std::option::Option<&protobuf::reflect::EnumDescriptor> {
        self.enums.iter().find(|e| e.full_name == fqn)
    }
}

fn _file_resolver() -> _FileResolver {
    _FileResolver { messages: _file_messages(), enums: _file_enums() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Unspecified = 0,
    Red = 1,
    Green = 2,
    Blue = 3,
}

impl Color {
    pub fn value(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(v: i32) -> ::std::option::Option<Self> {
        match v {
            0 => Some(Color::Unspecified),
            1 => Some(Color::Red),
            2 => Some(Color::Green),
            3 => Some(Color::Blue),
            _ => None,
        }
    }

    pub fn json_name(&self) -> &'static str {
        match self {
            Color::Unspecified => "UNSPECIFIED",
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Blue => "BLUE",
        }
    }
}

impl protobuf::ProtobufEnum for Color {
    fn value(&self) -> i32 {
        Color::value(self)
    }

    fn from_i32(v: i32) -> ::std::option::Option<Self> {
        Color::from_i32(v)
    }
}

impl ::std::default::Default for Color {
    fn default() -> Self {
        Color::Unspecified
    }
}

/// Field 1: `int32 x = 1`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    pub x: i32,
    pub unknown_fields: protobuf::UnknownFields,
}

impl Point {
    pub fn descriptor() -> protobuf::reflect::MessageDescriptor {
        protobuf::reflect::MessageDescriptor {
            name: "Point".to_string(),
            full_name: ".demo.Point".to_string(),
            fields: vec![protobuf::reflect::FieldDescriptor {
                number: 1,
                name: "x".to_string(),
                json_name: "x".to_string(),
                field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::Int32),
                label: protobuf::reflect::Label::Implicit,
                packed: false,
                oneof_index: None,
            }],
            oneofs: vec![],
            maps: vec![],
        }
    }

    pub fn to_dynamic(&self) -> protobuf::DynamicMessage {
        let mut d = protobuf::DynamicMessage::new(Self::descriptor());
        if self.x != 0 {
            d.set(1, protobuf::ReflectValueBox::I32(self.x));
        }
        *d.mut_unknown_fields() = self.unknown_fields.clone();
        d
    }

    pub fn from_dynamic(d: protobuf::DynamicMessage) -> Self {
        let mut out = Point::default();
        out.x = d.get(1).map(|v| v.as_i64().unwrap_or(0) as i32).unwrap_or_default();
        out.unknown_fields = d.unknown_fields().clone();
        out
    }

    pub fn to_json(&self) -> String {
        protobuf::json::to_json(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_json(s: &str) -> protobuf::json::JsonResult<Self> {
        let d = protobuf::json::from_json(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }

    pub fn to_text(&self) -> String {
        protobuf::text::format::to_text(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_text(s: &str) -> protobuf::text::format::TextFormatResult<Self> {
        let d = protobuf::text::format::from_text(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }
}

impl protobuf::Message for Point {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.to_dynamic().encode());
    }

    fn calc_size(&self) -> usize {
        self.to_dynamic().encode().len()
    }

    fn decode(bytes: &[u8]) -> protobuf::CodecResult<Self> {
        let resolver = _file_resolver();
        let d = protobuf::DynamicMessage::decode(&Self::descriptor(), &resolver, bytes)?;
        Ok(Self::from_dynamic(d))
    }

    fn unknown_fields(&self) -> &protobuf::UnknownFields {
        &self.unknown_fields
    }

    fn mut_unknown_fields(&mut self) -> &mut protobuf::UnknownFields {
        &mut self.unknown_fields
    }
}

/// Field 1: `repeated Color colors = 1` — packed per proto3 default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorList {
    pub colors: Vec<protobuf::EnumOrUnknown<Color>>,
    pub unknown_fields: protobuf::UnknownFields,
}

impl ColorList {
    pub fn descriptor() -> protobuf::reflect::MessageDescriptor {
        protobuf::reflect::MessageDescriptor {
            name: "ColorList".to_string(),
            full_name: ".demo.ColorList".to_string(),
            fields: vec![protobuf::reflect::FieldDescriptor {
                number: 1,
                name: "colors".to_string(),
                json_name: "colors".to_string(),
                field_type: protobuf::reflect::FieldType::Enum(".demo.Color".to_string()),
                label: protobuf::reflect::Label::Repeated,
                packed: true,
                oneof_index: None,
            }],
            oneofs: vec![],
            maps: vec![],
        }
    }

    pub fn to_dynamic(&self) -> protobuf::DynamicMessage {
        let mut d = protobuf::DynamicMessage::new(Self::descriptor());
        for v in &self.colors {
            d.push_repeated(1, protobuf::ReflectValueBox::Enum(v.value()));
        }
        *d.mut_unknown_fields() = self.unknown_fields.clone();
        d
    }

    pub fn from_dynamic(d: protobuf::DynamicMessage) -> Self {
        let mut out = ColorList::default();
        out.colors = d
            .get_repeated(1)
            .iter()
            .map(|v| protobuf::EnumOrUnknown::from_i32(v.as_enum_number().unwrap_or(0)))
            .collect();
        out.unknown_fields = d.unknown_fields().clone();
        out
    }

    pub fn to_json(&self) -> String {
        protobuf::json::to_json(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_json(s: &str) -> protobuf::json::JsonResult<Self> {
        let d = protobuf::json::from_json(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }

    pub fn to_text(&self) -> String {
        protobuf::text::format::to_text(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_text(s: &str) -> protobuf::text::format::TextFormatResult<Self> {
        let d = protobuf::text::format::from_text(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }
}

impl protobuf::Message for ColorList {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.to_dynamic().encode());
    }

    fn calc_size(&self) -> usize {
        self.to_dynamic().encode().len()
    }

    fn decode(bytes: &[u8]) -> protobuf::CodecResult<Self> {
        let resolver = _file_resolver();
        let d = protobuf::DynamicMessage::decode(&Self::descriptor(), &resolver, bytes)?;
        Ok(Self::from_dynamic(d))
    }

    fn unknown_fields(&self) -> &protobuf::UnknownFields {
        &self.unknown_fields
    }

    fn mut_unknown_fields(&mut self) -> &mut protobuf::UnknownFields {
        &mut self.unknown_fields
    }
}

/// Field 1: `int32 id = 1`; field 2: `string text = 2`. The `msg_val`
/// member of `OneofMessage`'s oneof.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubMessage {
    pub id: i32,
    pub text: String,
    pub unknown_fields: protobuf::UnknownFields,
}

impl SubMessage {
    pub fn descriptor() -> protobuf::reflect::MessageDescriptor {
        protobuf::reflect::MessageDescriptor {
            name: "SubMessage".to_string(),
            full_name: ".demo.SubMessage".to_string(),
            fields: vec![
                protobuf::reflect::FieldDescriptor {
                    number: 1,
                    name: "id".to_string(),
                    json_name: "id".to_string(),
                    field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::Int32),
                    label: protobuf::reflect::Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
                protobuf::reflect::FieldDescriptor {
                    number: 2,
                    name: "text".to_string(),
                    json_name: "text".to_string(),
                    field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::String),
                    label: protobuf::reflect::Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
            ],
            oneofs: vec![],
            maps: vec![],
        }
    }

    pub fn to_dynamic(&self) -> protobuf::DynamicMessage {
        let mut d = protobuf::DynamicMessage::new(Self::descriptor());
        if self.id != 0 {
            d.set(1, protobuf::ReflectValueBox::I32(self.id));
        }
        if !self.text.is_empty() {
            d.set(2, protobuf::ReflectValueBox::String(self.text.clone()));
        }
        *d.mut_unknown_fields() = self.unknown_fields.clone();
        d
    }

    pub fn from_dynamic(d: protobuf::DynamicMessage) -> Self {
        let mut out = SubMessage::default();
        out.id = d.get(1).map(|v| v.as_i64().unwrap_or(0) as i32).unwrap_or_default();
        out.text = d.get(2).map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_default()).unwrap_or_default();
        out.unknown_fields = d.unknown_fields().clone();
        out
    }

    pub fn to_json(&self) -> String {
        protobuf::json::to_json(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_json(s: &str) -> protobuf::json::JsonResult<Self> {
        let d = protobuf::json::from_json(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }

    pub fn to_text(&self) -> String {
        protobuf::text::format::to_text(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_text(s: &str) -> protobuf::text::format::TextFormatResult<Self> {
        let d = protobuf::text::format::from_text(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }
}

impl protobuf::Message for SubMessage {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.to_dynamic().encode());
    }

    fn calc_size(&self) -> usize {
        self.to_dynamic().encode().len()
    }

    fn decode(bytes: &[u8]) -> protobuf::CodecResult<Self> {
        let resolver = _file_resolver();
        let d = protobuf::DynamicMessage::decode(&Self::descriptor(), &resolver, bytes)?;
        Ok(Self::from_dynamic(d))
    }

    fn unknown_fields(&self) -> &protobuf::UnknownFields {
        &self.unknown_fields
    }

    fn mut_unknown_fields(&mut self) -> &mut protobuf::UnknownFields {
        &mut self.unknown_fields
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OneofMessage_Value {
    MsgVal(Box<SubMessage>),
    NumVal(i32),
}

/// Field 1: `string name = 1`; oneof `value` with members `msg_val`
/// (field 2, `SubMessage`) and `num_val` (field 3, `int32`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OneofMessage {
    pub name: String,
    pub value: ::std::option::Option<OneofMessage_Value>,
    pub unknown_fields: protobuf::UnknownFields,
}

impl OneofMessage {
    pub fn descriptor() -> protobuf::reflect::MessageDescriptor {
        protobuf::reflect::MessageDescriptor {
            name: "OneofMessage".to_string(),
            full_name: ".demo.OneofMessage".to_string(),
            fields: vec![
                protobuf::reflect::FieldDescriptor {
                    number: 1,
                    name: "name".to_string(),
                    json_name: "name".to_string(),
                    field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::String),
                    label: protobuf::reflect::Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
                protobuf::reflect::FieldDescriptor {
                    number: 2,
                    name: "msg_val".to_string(),
                    json_name: "msgVal".to_string(),
                    field_type: protobuf::reflect::FieldType::Message(".demo.SubMessage".to_string()),
                    label: protobuf::reflect::Label::Optional,
                    packed: false,
                    oneof_index: Some(0),
                },
                protobuf::reflect::FieldDescriptor {
                    number: 3,
                    name: "num_val".to_string(),
                    json_name: "numVal".to_string(),
                    field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::Int32),
                    label: protobuf::reflect::Label::Optional,
                    packed: false,
                    oneof_index: Some(0),
                },
            ],
            oneofs: vec![protobuf::reflect::OneofDescriptor { name: "value".to_string(), field_indices: vec![1, 2] }],
            maps: vec![],
        }
    }

    pub fn to_dynamic(&self) -> protobuf::DynamicMessage {
        let mut d = protobuf::DynamicMessage::new(Self::descriptor());
        if !self.name.is_empty() {
            d.set(1, protobuf::ReflectValueBox::String(self.name.clone()));
        }
        match &self.value {
            Some(OneofMessage_Value::MsgVal(v)) => {
                d.set(2, protobuf::ReflectValueBox::Message(Box::new(v.to_dynamic())));
            }
            Some(OneofMessage_Value::NumVal(v)) => {
                d.set(3, protobuf::ReflectValueBox::I32(*v));
            }
            None => {}
        }
        *d.mut_unknown_fields() = self.unknown_fields.clone();
        d
    }

    pub fn from_dynamic(d: protobuf::DynamicMessage) -> Self {
        let mut out = OneofMessage::default();
        out.name = d.get(1).map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_default()).unwrap_or_default();
        out.value = match d.oneof_case(&[2, 3]) {
            Some(2) => Some(OneofMessage_Value::MsgVal(
                d.get(2)
                    .and_then(|v| v.as_message())
                    .cloned()
                    .map(|m| Box::new(SubMessage::from_dynamic(m)))
                    .unwrap_or_default(),
            )),
            Some(3) => Some(OneofMessage_Value::NumVal(
                d.get(3).map(|v| v.as_i64().unwrap_or(0) as i32).unwrap_or_default(),
            )),
            _ => None,
        };
        out.unknown_fields = d.unknown_fields().clone();
        out
    }

    pub fn to_json(&self) -> String {
        protobuf::json::to_json(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_json(s: &str) -> protobuf::json::JsonResult<Self> {
        let d = protobuf::json::from_json(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }

    pub fn to_text(&self) -> String {
        protobuf::text::format::to_text(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_text(s: &str) -> protobuf::text::format::TextFormatResult<Self> {
        let d = protobuf::text::format::from_text(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }
}

impl protobuf::Message for OneofMessage {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.to_dynamic().encode());
    }

    fn calc_size(&self) -> usize {
        self.to_dynamic().encode().len()
    }

    fn decode(bytes: &[u8]) -> protobuf::CodecResult<Self> {
        let resolver = _file_resolver();
        let d = protobuf::DynamicMessage::decode(&Self::descriptor(), &resolver, bytes)?;
        Ok(Self::from_dynamic(d))
    }

    fn unknown_fields(&self) -> &protobuf::UnknownFields {
        &self.unknown_fields
    }

    fn mut_unknown_fields(&mut self) -> &mut protobuf::UnknownFields {
        &mut self.unknown_fields
    }
}

/// Field 1: `map<string, string> str_str = 1`; field 2:
/// `map<int32, string> int_str = 2`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapMessage {
    pub str_str: protobuf::OrderedMap<String, String>,
    pub int_str: protobuf::OrderedMap<i32, String>,
    pub unknown_fields: protobuf::UnknownFields,
}

impl MapMessage {
    pub fn descriptor() -> protobuf::reflect::MessageDescriptor {
        protobuf::reflect::MessageDescriptor {
            name: "MapMessage".to_string(),
            full_name: ".demo.MapMessage".to_string(),
            fields: vec![],
            oneofs: vec![],
            maps: vec![
                protobuf::reflect::MapDescriptor {
                    name: "str_str".to_string(),
                    number: 1,
                    key_type: protobuf::reflect::ScalarType::String,
                    value_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::String),
                },
                protobuf::reflect::MapDescriptor {
                    name: "int_str".to_string(),
                    number: 2,
                    key_type: protobuf::reflect::ScalarType::Int32,
                    value_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::String),
                },
            ],
        }
    }

    pub fn to_dynamic(&self) -> protobuf::DynamicMessage {
        let mut d = protobuf::DynamicMessage::new(Self::descriptor());
        for (k, v) in self.str_str.iter() {
            d.put_map(1, protobuf::ReflectValueBox::String(k.clone()), protobuf::ReflectValueBox::String(v.clone()));
        }
        for (k, v) in self.int_str.iter() {
            d.put_map(2, protobuf::ReflectValueBox::I32(*k), protobuf::ReflectValueBox::String(v.clone()));
        }
        *d.mut_unknown_fields() = self.unknown_fields.clone();
        d
    }

    pub fn from_dynamic(d: protobuf::DynamicMessage) -> Self {
        let mut out = MapMessage::default();
        out.str_str = d
            .get_map(1)
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().map(|s| s.to_string()).unwrap_or_default(),
                    v.as_str().map(|s| s.to_string()).unwrap_or_default(),
                )
            })
            .collect();
        out.int_str = d
            .get_map(2)
            .iter()
            .map(|(k, v)| (k.as_i64().unwrap_or(0) as i32, v.as_str().map(|s| s.to_string()).unwrap_or_default()))
            .collect();
        out.unknown_fields = d.unknown_fields().clone();
        out
    }

    pub fn to_json(&self) -> String {
        protobuf::json::to_json(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_json(s: &str) -> protobuf::json::JsonResult<Self> {
        let d = protobuf::json::from_json(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }

    pub fn to_text(&self) -> String {
        protobuf::text::format::to_text(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_text(s: &str) -> protobuf::text::format::TextFormatResult<Self> {
        let d = protobuf::text::format::from_text(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }
}

impl protobuf::Message for MapMessage {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.to_dynamic().encode());
    }

    fn calc_size(&self) -> usize {
        self.to_dynamic().encode().len()
    }

    fn decode(bytes: &[u8]) -> protobuf::CodecResult<Self> {
        let resolver = _file_resolver();
        let d = protobuf::DynamicMessage::decode(&Self::descriptor(), &resolver, bytes)?;
        Ok(Self::from_dynamic(d))
    }

    fn unknown_fields(&self) -> &protobuf::UnknownFields {
        &self.unknown_fields
    }

    fn mut_unknown_fields(&mut self) -> &mut protobuf::UnknownFields {
        &mut self.unknown_fields
    }
}

/// Three `double` fields used to pin down NaN/infinity round-tripping,
/// which a naive `!= 0.0` zero check (true for both) still serializes
/// correctly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeMessage {
    pub f_nan: f64,
    pub f_pos_inf: f64,
    pub f_neg_inf: f64,
    pub unknown_fields: protobuf::UnknownFields,
}

impl EdgeMessage {
    pub fn descriptor() -> protobuf::reflect::MessageDescriptor {
        protobuf::reflect::MessageDescriptor {
            name: "EdgeMessage".to_string(),
            full_name: ".demo.EdgeMessage".to_string(),
            fields: vec![
                protobuf::reflect::FieldDescriptor {
                    number: 1,
                    name: "f_nan".to_string(),
                    json_name: "fNan".to_string(),
                    field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::Double),
                    label: protobuf::reflect::Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
                protobuf::reflect::FieldDescriptor {
                    number: 2,
                    name: "f_pos_inf".to_string(),
                    json_name: "fPosInf".to_string(),
                    field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::Double),
                    label: protobuf::reflect::Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
                protobuf::reflect::FieldDescriptor {
                    number: 3,
                    name: "f_neg_inf".to_string(),
                    json_name: "fNegInf".to_string(),
                    field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::Double),
                    label: protobuf::reflect::Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
            ],
            oneofs: vec![],
            maps: vec![],
        }
    }

    pub fn to_dynamic(&self) -> protobuf::DynamicMessage {
        let mut d = protobuf::DynamicMessage::new(Self::descriptor());
        if self.f_nan != 0.0 {
            d.set(1, protobuf::ReflectValueBox::F64(self.f_nan));
        }
        if self.f_pos_inf != 0.0 {
            d.set(2, protobuf::ReflectValueBox::F64(self.f_pos_inf));
        }
        if self.f_neg_inf != 0.0 {
            d.set(3, protobuf::ReflectValueBox::F64(self.f_neg_inf));
        }
        *d.mut_unknown_fields() = self.unknown_fields.clone();
        d
    }

    pub fn from_dynamic(d: protobuf::DynamicMessage) -> Self {
        let mut out = EdgeMessage::default();
        out.f_nan = d.get(1).map(|v| v.as_f64().unwrap_or(0.0)).unwrap_or_default();
        out.f_pos_inf = d.get(2).map(|v| v.as_f64().unwrap_or(0.0)).unwrap_or_default();
        out.f_neg_inf = d.get(3).map(|v| v.as_f64().unwrap_or(0.0)).unwrap_or_default();
        out.unknown_fields = d.unknown_fields().clone();
        out
    }

    pub fn to_json(&self) -> String {
        protobuf::json::to_json(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_json(s: &str) -> protobuf::json::JsonResult<Self> {
        let d = protobuf::json::from_json(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }

    pub fn to_text(&self) -> String {
        protobuf::text::format::to_text(&self.to_dynamic(), &_file_resolver())
    }

    pub fn from_text(s: &str) -> protobuf::text::format::TextFormatResult<Self> {
        let d = protobuf::text::format::from_text(&Self::descriptor(), s, &_file_resolver())?;
        Ok(Self::from_dynamic(d))
    }
}

impl protobuf::Message for EdgeMessage {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.to_dynamic().encode());
    }

    fn calc_size(&self) -> usize {
        self.to_dynamic().encode().len()
    }

    fn decode(bytes: &[u8]) -> protobuf::CodecResult<Self> {
        let resolver = _file_resolver();
        let d = protobuf::DynamicMessage::decode(&Self::descriptor(), &resolver, bytes)?;
        Ok(Self::from_dynamic(d))
    }

    fn unknown_fields(&self) -> &protobuf::UnknownFields {
        &self.unknown_fields
    }

    fn mut_unknown_fields(&mut self) -> &mut protobuf::UnknownFields {
        &mut self.unknown_fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protobuf::Message;

    /// S1: field 1 `int32 = 150` under an implicit proto3 field encodes to
    /// the textbook three-byte varint, and decodes back to the same value.
    #[test]
    fn varint_150_matches_the_canonical_wire_bytes() {
        let p = Point { x: 150, ..Default::default() };
        assert_eq!(p.encode_to_vec(), vec![0x08, 0x96, 0x01]);
        assert_eq!(Point::decode(&p.encode_to_vec()).unwrap(), p);
    }

    /// S2: repeated enum encodes packed, and decode accepts both packed and
    /// unpacked wire representations of the same field.
    #[test]
    fn repeated_enum_encodes_packed_and_decodes_either_form() {
        let list = ColorList {
            colors: vec![
                protobuf::EnumOrUnknown::new(Color::Red),
                protobuf::EnumOrUnknown::new(Color::Green),
                protobuf::EnumOrUnknown::new(Color::Blue),
            ],
            ..Default::default()
        };
        let packed = list.encode_to_vec();
        assert_eq!(packed, vec![0x0A, 0x03, 0x01, 0x02, 0x03]);
        assert_eq!(ColorList::decode(&packed).unwrap(), list);

        // unpacked: three separate varint-wire tag/value pairs for field 1.
        let unpacked = vec![0x08, 0x01, 0x08, 0x02, 0x08, 0x03];
        assert_eq!(ColorList::decode(&unpacked).unwrap(), list);
    }

    /// S3: a oneof round-trips through wire and JSON, and setting a second
    /// variant after the first emits only the newer one.
    #[test]
    fn oneof_round_trips_and_keeps_only_the_latest_variant() {
        let msg = OneofMessage {
            name: "test".to_string(),
            value: Some(OneofMessage_Value::MsgVal(Box::new(SubMessage {
                id: 1,
                text: "sub".to_string(),
                ..Default::default()
            }))),
            ..Default::default()
        };
        let bytes = msg.encode_to_vec();
        assert_eq!(OneofMessage::decode(&bytes).unwrap(), msg);

        let json = msg.to_json();
        assert_eq!(OneofMessage::from_json(&json).unwrap(), msg);

        // setting the sibling variant on the same dynamic record replaces
        // the first one rather than encoding both.
        let mut d = msg.to_dynamic();
        d.set(3, protobuf::ReflectValueBox::I32(9));
        assert_eq!(d.oneof_case(&[2, 3]), Some(3));
        assert!(d.get(2).is_none());
        let replaced = OneofMessage::from_dynamic(d);
        assert_eq!(replaced.value, Some(OneofMessage_Value::NumVal(9)));
    }

    /// S4: string-keyed and int-keyed maps round-trip by lookup.
    #[test]
    fn maps_round_trip_by_key_lookup() {
        let mut msg = MapMessage::default();
        msg.str_str.insert("a".to_string(), "1".to_string());
        msg.str_str.insert("b".to_string(), "2".to_string());
        msg.int_str.insert(1, "one".to_string());
        msg.int_str.insert(2, "two".to_string());

        let decoded = MapMessage::decode(&msg.encode_to_vec()).unwrap();
        assert_eq!(decoded.str_str.get(&"a".to_string()), Some(&"1".to_string()));
        assert_eq!(decoded.str_str.get(&"b".to_string()), Some(&"2".to_string()));
        assert_eq!(decoded.int_str.get(&1), Some(&"one".to_string()));
        assert_eq!(decoded.int_str.get(&2), Some(&"two".to_string()));
    }

    /// S5: NaN and both infinities survive a wire round-trip.
    #[test]
    fn edge_floats_preserve_nan_and_both_infinities() {
        let msg = EdgeMessage { f_nan: f64::NAN, f_pos_inf: f64::INFINITY, f_neg_inf: f64::NEG_INFINITY, ..Default::default() };
        let decoded = EdgeMessage::decode(&msg.encode_to_vec()).unwrap();
        assert!(decoded.f_nan.is_nan());
        assert!(decoded.f_pos_inf.is_infinite() && decoded.f_pos_inf.is_sign_positive());
        assert!(decoded.f_neg_inf.is_infinite() && decoded.f_neg_inf.is_sign_negative());
    }

    /// Property: unknown fields survive a decode/encode round-trip verbatim.
    #[test]
    fn unknown_fields_survive_a_round_trip() {
        // field 7, varint wire type, value 42 — not in Point's schema.
        let mut bytes = Point { x: 150, ..Default::default() }.encode_to_vec();
        bytes.extend_from_slice(&[0x38, 0x2A]);

        let decoded = Point::decode(&bytes).unwrap();
        assert!(!decoded.unknown_fields().is_empty());
        assert_eq!(decoded.encode_to_vec(), bytes);
    }

    /// Property: text-format round-trips the same as JSON and wire.
    #[test]
    fn text_format_round_trips() {
        let msg = SubMessage { id: 7, text: "hi".to_string(), ..Default::default() };
        let text = msg.to_text();
        assert_eq!(SubMessage::from_text(&text).unwrap(), msg);
    }

    /// Property: dynamic<->generated interop — a `DynamicMessage` built
    /// directly agrees with the generated struct's own `to_dynamic`.
    #[test]
    fn dynamic_and_generated_agree_on_wire_bytes() {
        let mut d = protobuf::DynamicMessage::new(Point::descriptor());
        d.set(1, protobuf::ReflectValueBox::I32(150));
        assert_eq!(d.encode(), Point { x: 150, ..Default::default() }.encode_to_vec());
    }
}
