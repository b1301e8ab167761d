//! JSON mapping (`to_json`/`from_json`).
//!
//! Generated messages get their own hand-written `to_json`/`from_json`
//! methods (one per message, per the code generator's contract) but both
//! those and [`crate::reflect::DynamicMessage`]'s JSON support build on the
//! primitives here: string escaping, base64, and the float/integer
//! formatting rules of the proto3 canonical mapping.

pub mod base64;
pub mod float;

use std::fmt;

use crate::reflect::descriptor::{FieldType, MessageDescriptor, ScalarType, TypeResolver};
use crate::reflect::dynamic::DynamicMessage;
use crate::reflect::value::ReflectValueBox;
use crate::text::lexer::ParserLanguage;
use crate::text::loc::Loc;
use crate::text::tokenizer::{Tokenizer, TokenizerError};

#[derive(Debug, Clone, PartialEq)]
pub enum JsonErrorKind {
    Tokenizer(TokenizerError),
    UnknownField(String),
    UnknownEnumValue(String),
    ExpectingNumber,
    ExpectingString,
    ExpectingBool,
    ExpectingObject,
    ExpectingArray,
    InvalidBase64(base64::Base64Error),
    InvalidNumber(String),
}

impl fmt::Display for JsonErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonErrorKind::Tokenizer(e) => write!(f, "{}", e),
            JsonErrorKind::UnknownField(n) => write!(f, "unknown field: {}", n),
            JsonErrorKind::UnknownEnumValue(n) => write!(f, "unknown enum value: {}", n),
            JsonErrorKind::ExpectingNumber => write!(f, "expecting a number"),
            JsonErrorKind::ExpectingString => write!(f, "expecting a string"),
            JsonErrorKind::ExpectingBool => write!(f, "expecting true or false"),
            JsonErrorKind::ExpectingObject => write!(f, "expecting an object"),
            JsonErrorKind::ExpectingArray => write!(f, "expecting an array"),
            JsonErrorKind::InvalidBase64(e) => write!(f, "{}", e),
            JsonErrorKind::InvalidNumber(s) => write!(f, "invalid number: {}", s),
        }
    }
}

impl From<TokenizerError> for JsonErrorKind {
    fn from(e: TokenizerError) -> Self {
        JsonErrorKind::Tokenizer(e)
    }
}

impl From<base64::Base64Error> for JsonErrorKind {
    fn from(e: base64::Base64Error) -> Self {
        JsonErrorKind::InvalidBase64(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonError {
    pub kind: JsonErrorKind,
    pub loc: Loc,
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.loc)
    }
}

impl std::error::Error for JsonError {}

pub type JsonResult<T> = Result<T, JsonError>;

/// Escapes `s` for embedding in a JSON string literal (minimal set: quote,
/// backslash, control characters).
pub fn escape_str(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn json_field_name(descriptor_name: &str, json_name: &str) -> String {
    if json_name.is_empty() {
        to_lower_camel_case(descriptor_name)
    } else {
        json_name.to_owned()
    }
}

/// lowerCamelCase conversion used when a field has no explicit `json_name`.
pub fn to_lower_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn write_scalar(v: &ReflectValueBox, ty: ScalarType, out: &mut String) {
    match (ty, v) {
        (ScalarType::Bool, ReflectValueBox::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
        (ScalarType::Float, ReflectValueBox::F32(f)) => out.push_str(&float::format_f32(*f)),
        (ScalarType::Double, ReflectValueBox::F64(f)) => out.push_str(&float::format_f64(*f)),
        (ScalarType::String, ReflectValueBox::String(s)) => escape_str(s, out),
        (ScalarType::Bytes, ReflectValueBox::Bytes(b)) => escape_str(&base64::encode(b), out),
        (ty, v) if ty.is_json_string_type() => {
            out.push('"');
            out.push_str(&v.to_string());
            out.push('"');
        }
        (_, v) => out.push_str(&v.to_string()),
    }
}

fn write_value(v: &ReflectValueBox, ty: &FieldType, resolver: &dyn TypeResolver, out: &mut String) {
    match ty {
        FieldType::Scalar(s) => write_scalar(v, *s, out),
        FieldType::Enum(fqn) => {
            let number = v.as_i64().unwrap_or(0) as i32;
            match resolver.resolve_enum(fqn).and_then(|e| e.name_for_number(number)) {
                Some(name) => escape_str(name, out),
                None => out.push_str(&number.to_string()),
            }
        }
        FieldType::Message(_) => {
            if let Some(m) = v.as_message() {
                to_json_into(m, resolver, out);
            } else {
                out.push_str("null");
            }
        }
    }
}

fn map_key_string(v: &ReflectValueBox) -> String {
    match v {
        ReflectValueBox::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Writes the proto3-canonical JSON rendering of `msg` into `out`.
pub fn to_json_into(msg: &DynamicMessage, resolver: &dyn TypeResolver, out: &mut String) {
    out.push('{');
    let mut first = true;
    let descriptor = msg.descriptor();
    let mut push_comma = |out: &mut String, first: &mut bool| {
        if !*first {
            out.push(',');
        }
        *first = false;
    };
    for field in &descriptor.fields {
        if let Some(v) = msg.get(field.number) {
            push_comma(out, &mut first);
            escape_str(&json_field_name(&field.name, &field.json_name), out);
            out.push(':');
            write_value(v, &field.field_type, resolver, out);
        }
        if field.is_repeated() {
            let values = msg.get_repeated(field.number);
            if !values.is_empty() {
                push_comma(out, &mut first);
                escape_str(&json_field_name(&field.name, &field.json_name), out);
                out.push(':');
                out.push('[');
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_value(v, &field.field_type, resolver, out);
                }
                out.push(']');
            }
        }
    }
    for map in &descriptor.maps {
        let entries = msg.get_map(map.number);
        if !entries.is_empty() {
            push_comma(out, &mut first);
            escape_str(&map.name, out);
            out.push(':');
            out.push('{');
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                escape_str(&map_key_string(k), out);
                out.push(':');
                write_value(v, &map.value_type, resolver, out);
            }
            out.push('}');
        }
    }
    out.push('}');
}

pub fn to_json(msg: &DynamicMessage, resolver: &dyn TypeResolver) -> String {
    let mut out = String::new();
    to_json_into(msg, resolver, &mut out);
    out
}

struct Reader<'a> {
    tokenizer: Tokenizer<'a>,
}

impl<'a> Reader<'a> {
    fn err(&self, kind: JsonErrorKind) -> JsonError {
        JsonError { kind, loc: self.tokenizer.loc() }
    }

    fn read_string(&mut self) -> JsonResult<String> {
        self.tokenizer.next_str_lit().map_err(|e| JsonError { kind: e.into(), loc: self.tokenizer.loc() })
    }

    fn read_bool(&mut self) -> JsonResult<bool> {
        if self.tokenizer.next_ident_if_eq("true").map_err(|e| self.wrap(e))? {
            Ok(true)
        } else if self.tokenizer.next_ident_if_eq("false").map_err(|e| self.wrap(e))? {
            Ok(false)
        } else {
            Err(self.err(JsonErrorKind::ExpectingBool))
        }
    }

    fn wrap(&self, e: TokenizerError) -> JsonError {
        JsonError { kind: e.into(), loc: self.tokenizer.loc() }
    }

    fn read_number_text(&mut self) -> JsonResult<String> {
        if self.tokenizer.lookahead_is_number().map_err(|e| self.wrap(e))? {
            self.tokenizer.next_number_lit().map_err(|e| self.wrap(e))
        } else if self.tokenizer.lookahead_is_str_lit().map_err(|e| self.wrap(e))? {
            self.read_string()
        } else {
            Err(self.err(JsonErrorKind::ExpectingNumber))
        }
    }

    fn read_scalar(&mut self, ty: ScalarType) -> JsonResult<ReflectValueBox> {
        use ScalarType::*;
        Ok(match ty {
            Bool => ReflectValueBox::Bool(self.read_bool()?),
            String => ReflectValueBox::String(self.read_string()?),
            Bytes => {
                let s = self.read_string()?;
                ReflectValueBox::Bytes(base64::decode(&s).map_err(|e| self.err(e.into()))?)
            }
            Float => {
                let s = self.read_number_text()?;
                let v = float::parse_f32(&s).ok_or_else(|| self.err(JsonErrorKind::InvalidNumber(s.clone())))?;
                ReflectValueBox::F32(v)
            }
            Double => {
                let s = self.read_number_text()?;
                let v = float::parse_f64(&s).ok_or_else(|| self.err(JsonErrorKind::InvalidNumber(s.clone())))?;
                ReflectValueBox::F64(v)
            }
            Int32 | Sint32 | Sfixed32 => {
                let s = self.read_number_text()?;
                s.parse::<i32>().map(ReflectValueBox::I32).map_err(|_| self.err(JsonErrorKind::InvalidNumber(s)))?
            }
            Uint32 | Fixed32 => {
                let s = self.read_number_text()?;
                s.parse::<u32>().map(ReflectValueBox::U32).map_err(|_| self.err(JsonErrorKind::InvalidNumber(s)))?
            }
            Int64 | Sint64 | Sfixed64 => {
                let s = self.read_number_text()?;
                s.parse::<i64>().map(ReflectValueBox::I64).map_err(|_| self.err(JsonErrorKind::InvalidNumber(s)))?
            }
            Uint64 | Fixed64 => {
                let s = self.read_number_text()?;
                s.parse::<u64>().map(ReflectValueBox::U64).map_err(|_| self.err(JsonErrorKind::InvalidNumber(s)))?
            }
        })
    }

    fn read_value(&mut self, ty: &FieldType, descriptor: &MessageDescriptor, resolver: &dyn TypeResolver) -> JsonResult<ReflectValueBox> {
        let _ = descriptor;
        match ty {
            FieldType::Scalar(s) => self.read_scalar(*s),
            FieldType::Enum(fqn) => {
                if self.tokenizer.lookahead_is_str_lit().map_err(|e| self.wrap(e))? {
                    let name = self.read_string()?;
                    let number = resolver
                        .resolve_enum(fqn)
                        .and_then(|e| e.number_for_name(&name))
                        .ok_or_else(|| self.err(JsonErrorKind::UnknownEnumValue(name)))?;
                    Ok(ReflectValueBox::Enum(number))
                } else {
                    let s = self.read_number_text()?;
                    let n: i32 = s.parse().map_err(|_| self.err(JsonErrorKind::InvalidNumber(s)))?;
                    Ok(ReflectValueBox::Enum(n))
                }
            }
            FieldType::Message(fqn) => {
                let nested_desc = resolver
                    .resolve_message(fqn)
                    .ok_or_else(|| self.err(JsonErrorKind::UnknownField(fqn.clone())))?;
                let nested = self.read_message(nested_desc, resolver)?;
                Ok(ReflectValueBox::Message(Box::new(nested)))
            }
        }
    }

    fn read_message(&mut self, descriptor: &MessageDescriptor, resolver: &dyn TypeResolver) -> JsonResult<DynamicMessage> {
        let mut msg = DynamicMessage::new(descriptor.clone());
        self.tokenizer.next_symbol_expect_eq('{').map_err(|e| self.wrap(e))?;
        let mut first = true;
        while !self.tokenizer.next_symbol_if_eq('}').map_err(|e| self.wrap(e))? {
            if !first {
                self.tokenizer.next_symbol_expect_eq(',').map_err(|e| self.wrap(e))?;
            }
            first = false;
            let name = self.read_string()?;
            self.tokenizer.next_symbol_expect_eq(':').map_err(|e| self.wrap(e))?;
            if let Some(field) = descriptor
                .fields
                .iter()
                .find(|f| f.name == name || f.json_name == name || to_lower_camel_case(&f.name) == name)
            {
                if field.is_repeated() {
                    self.tokenizer.next_symbol_expect_eq('[').map_err(|e| self.wrap(e))?;
                    let mut arr_first = true;
                    while !self.tokenizer.next_symbol_if_eq(']').map_err(|e| self.wrap(e))? {
                        if !arr_first {
                            self.tokenizer.next_symbol_expect_eq(',').map_err(|e| self.wrap(e))?;
                        }
                        arr_first = false;
                        let v = self.read_value(&field.field_type, descriptor, resolver)?;
                        msg.push_repeated(field.number, v);
                    }
                } else {
                    let v = self.read_value(&field.field_type, descriptor, resolver)?;
                    msg.set(field.number, v);
                }
            } else if let Some(map) = descriptor.maps.iter().find(|m| m.name == name) {
                self.tokenizer.next_symbol_expect_eq('{').map_err(|e| self.wrap(e))?;
                let mut entry_first = true;
                while !self.tokenizer.next_symbol_if_eq('}').map_err(|e| self.wrap(e))? {
                    if !entry_first {
                        self.tokenizer.next_symbol_expect_eq(',').map_err(|e| self.wrap(e))?;
                    }
                    entry_first = false;
                    let key_text = self.read_string()?;
                    self.tokenizer.next_symbol_expect_eq(':').map_err(|e| self.wrap(e))?;
                    let key = parse_map_key(map.key_type, &key_text)
                        .ok_or_else(|| self.err(JsonErrorKind::InvalidNumber(key_text.clone())))?;
                    let value = self.read_value(&map.value_type, descriptor, resolver)?;
                    msg.put_map(map.number, key, value);
                }
            } else {
                return Err(self.err(JsonErrorKind::UnknownField(name)));
            }
        }
        Ok(msg)
    }
}

fn parse_map_key(ty: ScalarType, text: &str) -> Option<ReflectValueBox> {
    use ScalarType::*;
    Some(match ty {
        String => ReflectValueBox::String(text.to_owned()),
        Bool => ReflectValueBox::Bool(text.parse().ok()?),
        Int32 | Sint32 | Sfixed32 => ReflectValueBox::I32(text.parse().ok()?),
        Uint32 | Fixed32 => ReflectValueBox::U32(text.parse().ok()?),
        Int64 | Sint64 | Sfixed64 => ReflectValueBox::I64(text.parse().ok()?),
        Uint64 | Fixed64 => ReflectValueBox::U64(text.parse().ok()?),
        Float | Double | Bytes => return None,
    })
}

pub fn from_json(descriptor: &MessageDescriptor, json: &str, resolver: &dyn TypeResolver) -> JsonResult<DynamicMessage> {
    let mut reader = Reader { tokenizer: Tokenizer::new(json, ParserLanguage::Json) };
    reader.read_message(descriptor, resolver)
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
        fn resolve_enum(&self, _fqn: &str) -> Option<&crate::reflect::descriptor::EnumDescriptor> {
            None
        }
    }

    fn descriptor() -> MessageDescriptor {
        MessageDescriptor {
            name: "M".into(),
            full_name: ".M".into(),
            fields: vec![
                FieldDescriptor {
                    number: 1,
                    name: "big_id".into(),
                    json_name: "".into(),
                    field_type: FieldType::Scalar(ScalarType::Int64),
                    label: Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
                FieldDescriptor {
                    number: 2,
                    name: "name".into(),
                    json_name: "".into(),
                    field_type: FieldType::Scalar(ScalarType::String),
                    label: Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
            ],
            oneofs: vec![],
            maps: vec![],
        }
    }

    #[test]
    fn int64_renders_as_json_string() {
        let mut m = DynamicMessage::new(descriptor());
        m.set(1, ReflectValueBox::I64(9007199254740993));
        let json = to_json(&m, &EmptyResolver);
        assert!(json.contains("\"bigId\":\"9007199254740993\"") || json.contains("\"big_id\":\"9007199254740993\""));
    }

    #[test]
    fn round_trips_string_field() {
        let mut m = DynamicMessage::new(descriptor());
        m.set(2, ReflectValueBox::String("hello".into()));
        let json = to_json(&m, &EmptyResolver);
        let back = from_json(&descriptor(), &json, &EmptyResolver).unwrap();
        assert_eq!(back.get(2), Some(&ReflectValueBox::String("hello".into())));
    }

    #[test]
    fn special_floats_round_trip() {
        assert_eq!(float::format_f64(f64::INFINITY), "\"Infinity\"");
        assert_eq!(float::parse_f64("Infinity"), Some(f64::INFINITY));
    }
}
