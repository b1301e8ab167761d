//! Google text-format mapping (`to_text`/`from_text`).

use std::fmt;

use crate::reflect::descriptor::{FieldType, MessageDescriptor, ScalarType, TypeResolver};
use crate::reflect::dynamic::DynamicMessage;
use crate::reflect::value::ReflectValueBox;

use super::lexer::ParserLanguage;
use super::loc::Loc;
use super::tokenizer::{Tokenizer, TokenizerError};

#[derive(Debug, Clone, PartialEq)]
pub struct TextFormatError {
    pub message: String,
    pub loc: Loc,
}

impl fmt::Display for TextFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.loc)
    }
}

impl std::error::Error for TextFormatError {}

pub type TextFormatResult<T> = Result<T, TextFormatError>;

fn escape_text_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_float(v: f64, out: &mut String) {
    if v.is_nan() {
        out.push_str("nan");
    } else if v.is_infinite() {
        out.push_str(if v > 0.0 { "inf" } else { "-inf" });
    } else {
        out.push_str(&v.to_string());
    }
}

fn write_scalar(v: &ReflectValueBox, ty: ScalarType, out: &mut String) {
    match (ty, v) {
        (ScalarType::String, ReflectValueBox::String(s)) => escape_text_string(s, out),
        (ScalarType::Bytes, ReflectValueBox::Bytes(b)) => {
            let s: String = b.iter().map(|&byte| byte as char).collect();
            escape_text_string(&s, out);
        }
        (ScalarType::Float, ReflectValueBox::F32(f)) => write_float(*f as f64, out),
        (ScalarType::Double, ReflectValueBox::F64(f)) => write_float(*f, out),
        (_, v) => out.push_str(&v.to_string()),
    }
}

fn write_value(indent: usize, v: &ReflectValueBox, ty: &FieldType, resolver: &dyn TypeResolver, out: &mut String) {
    match ty {
        FieldType::Scalar(s) => write_scalar(v, *s, out),
        FieldType::Enum(fqn) => {
            let number = v.as_i64().unwrap_or(0) as i32;
            match resolver.resolve_enum(fqn).and_then(|e| e.name_for_number(number)) {
                Some(name) => out.push_str(name),
                None => out.push_str(&number.to_string()),
            }
        }
        FieldType::Message(_) => {
            out.push_str("{\n");
            if let Some(m) = v.as_message() {
                write_message(indent + 1, m, resolver, out);
            }
            push_indent(indent, out);
            out.push('}');
        }
    }
}

fn push_indent(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn write_message(indent: usize, msg: &DynamicMessage, resolver: &dyn TypeResolver, out: &mut String) {
    let descriptor = msg.descriptor();
    for field in &descriptor.fields {
        if let Some(v) = msg.get(field.number) {
            push_indent(indent, out);
            out.push_str(&field.name);
            out.push_str(": ");
            write_value(indent, v, &field.field_type, resolver, out);
            out.push('\n');
        }
        for v in msg.get_repeated(field.number) {
            push_indent(indent, out);
            out.push_str(&field.name);
            out.push_str(": ");
            write_value(indent, v, &field.field_type, resolver, out);
            out.push('\n');
        }
    }
    for map in &descriptor.maps {
        for (k, v) in msg.get_map(map.number) {
            push_indent(indent, out);
            out.push_str(&map.name);
            out.push_str(": {\n");
            push_indent(indent + 1, out);
            out.push_str("key: ");
            write_scalar(k, map.key_type, out);
            out.push('\n');
            push_indent(indent + 1, out);
            out.push_str("value: ");
            write_value(indent + 1, v, &map.value_type, resolver, out);
            out.push('\n');
            push_indent(indent, out);
            out.push_str("}\n");
        }
    }
}

pub fn to_text(msg: &DynamicMessage, resolver: &dyn TypeResolver) -> String {
    let mut out = String::new();
    write_message(0, msg, resolver, &mut out);
    out
}

struct Reader<'a> {
    tokenizer: Tokenizer<'a>,
}

impl<'a> Reader<'a> {
    fn err(&self, message: impl Into<String>) -> TextFormatError {
        TextFormatError { message: message.into(), loc: self.tokenizer.loc() }
    }

    fn wrap(&self, e: TokenizerError) -> TextFormatError {
        self.err(e.to_string())
    }

    fn read_scalar(&mut self, ty: ScalarType) -> TextFormatResult<ReflectValueBox> {
        use ScalarType::*;
        Ok(match ty {
            String => {
                let s = self.tokenizer.next_str_lit().map_err(|e| self.wrap(e))?;
                ReflectValueBox::String(s)
            }
            Bytes => {
                let s = self.tokenizer.next_str_lit().map_err(|e| self.wrap(e))?;
                ReflectValueBox::Bytes(s.bytes().collect())
            }
            Bool => {
                if self.tokenizer.next_ident_if_eq("true").map_err(|e| self.wrap(e))? {
                    ReflectValueBox::Bool(true)
                } else if self.tokenizer.next_ident_if_eq("false").map_err(|e| self.wrap(e))? {
                    ReflectValueBox::Bool(false)
                } else {
                    return Err(self.err("expecting true or false"));
                }
            }
            Float | Double => {
                let v = self.read_float_text()?;
                if ty == Float {
                    ReflectValueBox::F32(v as f32)
                } else {
                    ReflectValueBox::F64(v)
                }
            }
            Int32 | Sint32 | Sfixed32 => {
                let n = self.tokenizer.next_number_lit().map_err(|e| self.wrap(e))?;
                ReflectValueBox::I32(n.parse().map_err(|_| self.err("invalid integer"))?)
            }
            Uint32 | Fixed32 => {
                let n = self.tokenizer.next_number_lit().map_err(|e| self.wrap(e))?;
                ReflectValueBox::U32(n.parse().map_err(|_| self.err("invalid integer"))?)
            }
            Int64 | Sint64 | Sfixed64 => {
                let n = self.tokenizer.next_number_lit().map_err(|e| self.wrap(e))?;
                ReflectValueBox::I64(n.parse().map_err(|_| self.err("invalid integer"))?)
            }
            Uint64 | Fixed64 => {
                let n = self.tokenizer.next_number_lit().map_err(|e| self.wrap(e))?;
                ReflectValueBox::U64(n.parse().map_err(|_| self.err("invalid integer"))?)
            }
        })
    }

    fn read_float_text(&mut self) -> TextFormatResult<f64> {
        if self.tokenizer.next_ident_if_eq("inf").map_err(|e| self.wrap(e))? {
            return Ok(f64::INFINITY);
        }
        if self.tokenizer.next_ident_if_eq("nan").map_err(|e| self.wrap(e))? {
            return Ok(f64::NAN);
        }
        if self.tokenizer.next_symbol_if_eq('-').map_err(|e| self.wrap(e))?
            && self.tokenizer.next_ident_if_eq("inf").map_err(|e| self.wrap(e))?
        {
            return Ok(f64::NEG_INFINITY);
        }
        let n = self.tokenizer.next_number_lit().map_err(|e| self.wrap(e))?;
        n.parse().map_err(|_| self.err("invalid float"))
    }

    fn read_value(&mut self, ty: &FieldType, resolver: &dyn TypeResolver) -> TextFormatResult<ReflectValueBox> {
        match ty {
            FieldType::Scalar(s) => self.read_scalar(*s),
            FieldType::Enum(fqn) => {
                let name = self.tokenizer.next_ident().map_err(|e| self.wrap(e))?;
                let number = resolver
                    .resolve_enum(fqn)
                    .and_then(|e| e.number_for_name(&name))
                    .ok_or_else(|| self.err(format!("unknown enum value: {}", name)))?;
                Ok(ReflectValueBox::Enum(number))
            }
            FieldType::Message(fqn) => {
                let nested_desc = resolver
                    .resolve_message(fqn)
                    .ok_or_else(|| self.err(format!("unknown message type: {}", fqn)))?;
                self.tokenizer.next_symbol_expect_eq('{').map_err(|e| self.wrap(e))?;
                let nested = self.read_message(nested_desc, resolver)?;
                self.tokenizer.next_symbol_expect_eq('}').map_err(|e| self.wrap(e))?;
                Ok(ReflectValueBox::Message(Box::new(nested)))
            }
        }
    }

    fn read_message(&mut self, descriptor: &MessageDescriptor, resolver: &dyn TypeResolver) -> TextFormatResult<DynamicMessage> {
        let mut msg = DynamicMessage::new(descriptor.clone());
        loop {
            if self.tokenizer.lookahead_is_symbol('}').map_err(|e| self.wrap(e))? {
                break;
            }
            if self.tokenizer.is_eof().map_err(|e| self.wrap(e))? {
                break;
            }
            let name = self.tokenizer.next_ident().map_err(|e| self.wrap(e))?;
            self.tokenizer.next_symbol_expect_eq(':').map_err(|e| self.wrap(e))?;
            if let Some(field) = descriptor.field_by_name(&name) {
                let v = self.read_value(&field.field_type, resolver)?;
                if field.is_repeated() {
                    msg.push_repeated(field.number, v);
                } else {
                    msg.set(field.number, v);
                }
            } else if let Some(map) = descriptor.maps.iter().find(|m| m.name == name) {
                self.tokenizer.next_symbol_expect_eq('{').map_err(|e| self.wrap(e))?;
                self.tokenizer.next_ident_expect_eq("key").map_err(|e| self.wrap(e))?;
                self.tokenizer.next_symbol_expect_eq(':').map_err(|e| self.wrap(e))?;
                let key = self.read_scalar(map.key_type)?;
                self.tokenizer.next_ident_expect_eq("value").map_err(|e| self.wrap(e))?;
                self.tokenizer.next_symbol_expect_eq(':').map_err(|e| self.wrap(e))?;
                let value = self.read_value(&map.value_type, resolver)?;
                self.tokenizer.next_symbol_expect_eq('}').map_err(|e| self.wrap(e))?;
                msg.put_map(map.number, key, value);
            } else {
                return Err(self.err(format!("unknown field: {}", name)));
            }
        }
        Ok(msg)
    }
}

pub fn from_text(descriptor: &MessageDescriptor, text: &str, resolver: &dyn TypeResolver) -> TextFormatResult<DynamicMessage> {
    let mut reader = Reader { tokenizer: Tokenizer::new(text, ParserLanguage::TextFormat) };
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
            fields: vec![FieldDescriptor {
                number: 1,
                name: "name".into(),
                json_name: "name".into(),
                field_type: FieldType::Scalar(ScalarType::String),
                label: Label::Implicit,
                packed: false,
                oneof_index: None,
            }],
            oneofs: vec![],
            maps: vec![],
        }
    }

    #[test]
    fn round_trips_a_string_field() {
        let mut m = DynamicMessage::new(descriptor());
        m.set(1, ReflectValueBox::String("hi there".into()));
        let text = to_text(&m, &EmptyResolver);
        assert_eq!(text, "name: \"hi there\"\n");
        let back = from_text(&descriptor(), &text, &EmptyResolver).unwrap();
        assert_eq!(back.get(1), Some(&ReflectValueBox::String("hi there".into())));
    }

    #[test]
    fn special_floats_use_inf_nan_tokens() {
        let mut out = String::new();
        write_float(f64::INFINITY, &mut out);
        assert_eq!(out, "inf");
        out.clear();
        write_float(f64::NAN, &mut out);
        assert_eq!(out, "nan");
    }

    #[test]
    fn comments_are_skipped_on_parse() {
        let text = "# a comment\nname: \"x\" # trailing\n";
        let back = from_text(&descriptor(), text, &EmptyResolver).unwrap();
        assert_eq!(back.get(1), Some(&ReflectValueBox::String("x".into())));
    }
}
