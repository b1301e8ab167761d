//! Generates a Rust struct for one `MessageDescriptor`, including its
//! oneof sibling enums and `impl protobuf::Message`.
//!
//! The wire codec itself is not re-derived per message: `encode`/`decode`
//! bridge through [`protobuf::DynamicMessage`] (already exhaustively tested
//! against the wire format), converting field-by-field between the typed
//! struct and its dynamic shape. This is also what makes dynamic<->generated
//! interop hold by construction rather than by a second hand-written codec
//! that has to agree with the first one.

use protobuf::reflect::{FieldDescriptor, FieldType, Label, MapDescriptor, MessageDescriptor, ScalarType};

use crate::case_convert::{escape_ident, pascal_case};
use crate::code_writer::CodeWriter;
use crate::customize::Customize;
use crate::rust_type::{oneof_member_rust_type, rust_item_name, struct_field_rust_type};

fn field_type_literal(ft: &FieldType) -> String {
    match ft {
        FieldType::Scalar(s) => format!("protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::{:?})", s),
        FieldType::Message(fqn) => format!("protobuf::reflect::FieldType::Message({:?}.to_string())", fqn),
        FieldType::Enum(fqn) => format!("protobuf::reflect::FieldType::Enum({:?}.to_string())", fqn),
    }
}

fn field_descriptor_literal(f: &FieldDescriptor) -> String {
    let oneof_index = match f.oneof_index {
        Some(i) => format!("Some({})", i),
        None => "None".to_string(),
    };
    format!(
        "protobuf::reflect::FieldDescriptor {{ number: {}, name: {:?}.to_string(), json_name: {:?}.to_string(), field_type: {}, label: protobuf::reflect::Label::{:?}, packed: {}, oneof_index: {} }}",
        f.number,
        f.name,
        f.json_name,
        field_type_literal(&f.field_type),
        f.label,
        f.packed,
        oneof_index,
    )
}

fn map_descriptor_literal(m: &MapDescriptor) -> String {
    format!(
        "protobuf::reflect::MapDescriptor {{ name: {:?}.to_string(), number: {}, key_type: protobuf::reflect::ScalarType::{:?}, value_type: {} }}",
        m.name,
        m.number,
        m.key_type,
        field_type_literal(&m.value_type),
    )
}

/// Rust source text constructing this message's descriptor as a value, for
/// embedding inside a generated `_*_descriptor()` function body.
pub fn message_descriptor_literal(msg: &MessageDescriptor) -> String {
    let mut fields = String::new();
    for f in &msg.fields {
        fields.push_str(&field_descriptor_literal(f));
        fields.push_str(", ");
    }
    let mut oneofs = String::new();
    for o in &msg.oneofs {
        let indices: Vec<String> = o.field_indices.iter().map(|i| i.to_string()).collect();
        oneofs.push_str(&format!(
            "protobuf::reflect::OneofDescriptor {{ name: {:?}.to_string(), field_indices: vec![{}] }}, ",
            o.name,
            indices.join(", ")
        ));
    }
    let mut maps = String::new();
    for m in &msg.maps {
        maps.push_str(&map_descriptor_literal(m));
        maps.push_str(", ");
    }
    format!(
        "protobuf::reflect::MessageDescriptor {{ name: {:?}.to_string(), full_name: {:?}.to_string(), fields: vec![{}], oneofs: vec![{}], maps: vec![{}] }}",
        msg.name, msg.full_name, fields, oneofs, maps,
    )
}

fn scalar_nonzero_cond(s: ScalarType, value_expr: &str) -> String {
    use ScalarType::*;
    match s {
        Double | Float => format!("{} != 0.0", value_expr),
        Bool => value_expr.to_string(),
        String => format!("!{}.is_empty()", value_expr),
        Bytes => format!("!{}.is_empty()", value_expr),
        _ => format!("{} != 0", value_expr),
    }
}

/// `value_expr` is a reference (`&T`); Copy scalars get dereferenced,
/// `String`/`Vec<u8>` get cloned.
fn scalar_to_reflect_ref(s: ScalarType, ref_expr: &str) -> String {
    use ScalarType::*;
    match s {
        Double => format!("protobuf::ReflectValueBox::F64(*{})", ref_expr),
        Float => format!("protobuf::ReflectValueBox::F32(*{})", ref_expr),
        Int32 | Sint32 | Sfixed32 => format!("protobuf::ReflectValueBox::I32(*{})", ref_expr),
        Int64 | Sint64 | Sfixed64 => format!("protobuf::ReflectValueBox::I64(*{})", ref_expr),
        Uint32 | Fixed32 => format!("protobuf::ReflectValueBox::U32(*{})", ref_expr),
        Uint64 | Fixed64 => format!("protobuf::ReflectValueBox::U64(*{})", ref_expr),
        Bool => format!("protobuf::ReflectValueBox::Bool(*{})", ref_expr),
        String => format!("protobuf::ReflectValueBox::String({}.clone())", ref_expr),
        Bytes => format!("protobuf::ReflectValueBox::Bytes({}.clone())", ref_expr),
    }
}

/// `owned_expr` is an owned place (`self.field`), used where no reference
/// has already been taken (the singular Implicit/Required paths).
fn scalar_to_reflect_owned(s: ScalarType, owned_expr: &str) -> String {
    use ScalarType::*;
    match s {
        Double => format!("protobuf::ReflectValueBox::F64({})", owned_expr),
        Float => format!("protobuf::ReflectValueBox::F32({})", owned_expr),
        Int32 | Sint32 | Sfixed32 => format!("protobuf::ReflectValueBox::I32({})", owned_expr),
        Int64 | Sint64 | Sfixed64 => format!("protobuf::ReflectValueBox::I64({})", owned_expr),
        Uint32 | Fixed32 => format!("protobuf::ReflectValueBox::U32({})", owned_expr),
        Uint64 | Fixed64 => format!("protobuf::ReflectValueBox::U64({})", owned_expr),
        Bool => format!("protobuf::ReflectValueBox::Bool({})", owned_expr),
        String => format!("protobuf::ReflectValueBox::String({}.clone())", owned_expr),
        Bytes => format!("protobuf::ReflectValueBox::Bytes({}.clone())", owned_expr),
    }
}

/// `expr` evaluates to `&ReflectValueBox` directly (not wrapped in `Option`).
fn scalar_from_reflect_direct(s: ScalarType, expr: &str) -> String {
    use ScalarType::*;
    match s {
        Double => format!("{}.as_f64().unwrap_or(0.0)", expr),
        Float => format!("{}.as_f64().unwrap_or(0.0) as f32", expr),
        Int32 | Sint32 | Sfixed32 => format!("{}.as_i64().unwrap_or(0) as i32", expr),
        Int64 | Sint64 | Sfixed64 => format!("{}.as_i64().unwrap_or(0)", expr),
        Uint32 | Fixed32 => format!("{}.as_u64().unwrap_or(0) as u32", expr),
        Uint64 | Fixed64 => format!("{}.as_u64().unwrap_or(0)", expr),
        Bool => format!("{}.as_bool().unwrap_or(false)", expr),
        String => format!("{}.as_str().map(|s| s.to_string()).unwrap_or_default()", expr),
        Bytes => format!("{}.as_bytes().map(|b| b.to_vec()).unwrap_or_default()", expr),
    }
}

/// `opt_expr` evaluates to `Option<&ReflectValueBox>` (e.g. `d.get(N)`).
fn scalar_from_reflect_opt(s: ScalarType, opt_expr: &str) -> String {
    format!("{}.map(|v| {}).unwrap_or_default()", opt_expr, scalar_from_reflect_direct(s, "v"))
}

fn value_to_reflect_ref(ft: &FieldType, ref_expr: &str) -> String {
    match ft {
        FieldType::Scalar(s) => scalar_to_reflect_ref(*s, ref_expr),
        FieldType::Enum(_) => format!("protobuf::ReflectValueBox::Enum({}.value())", ref_expr),
        FieldType::Message(_) => format!("protobuf::ReflectValueBox::Message(Box::new({}.to_dynamic()))", ref_expr),
    }
}

/// `expr` evaluates to `&ReflectValueBox` directly.
fn value_from_reflect_direct(ft: &FieldType, package: Option<&str>, expr: &str) -> String {
    match ft {
        FieldType::Scalar(s) => scalar_from_reflect_direct(*s, expr),
        FieldType::Enum(_) => format!(
            "protobuf::EnumOrUnknown::from_i32({}.as_enum_number().unwrap_or(0))",
            expr
        ),
        FieldType::Message(fqn) => format!(
            "{}.as_message().cloned().map(|m| {}::from_dynamic(m)).unwrap_or_default()",
            expr,
            rust_item_name(fqn, package)
        ),
    }
}

fn oneof_enum_name(msg_name: &str, oneof_name: &str) -> String {
    format!("{}_{}", msg_name, pascal_case(oneof_name))
}

struct OneofMember<'a> {
    field: &'a FieldDescriptor,
    variant: String,
}

fn oneof_members<'a>(msg: &'a MessageDescriptor, oneof_index: usize) -> Vec<OneofMember<'a>> {
    msg.oneofs[oneof_index]
        .field_indices
        .iter()
        .map(|&i| {
            let field = &msg.fields[i];
            OneofMember { field, variant: pascal_case(&field.name) }
        })
        .collect()
}

pub fn generate_message(w: &mut CodeWriter, msg: &MessageDescriptor, package: Option<&str>, customize: &Customize) {
    let name = rust_item_name(&msg.full_name, package);

    for (oneof_idx, oneof) in msg.oneofs.iter().enumerate() {
        let enum_name = oneof_enum_name(&name, &oneof.name);
        if customize.derive_debug {
            w.write_line("#[derive(Debug, Clone, PartialEq)]");
        } else {
            w.write_line("#[derive(Clone, PartialEq)]");
        }
        w.block(&format!("pub enum {}", enum_name), |w| {
            for member in oneof_members(msg, oneof_idx) {
                w.write_line(&format!(
                    "{}({}),",
                    member.variant,
                    oneof_member_rust_type(&member.field.field_type, package)
                ));
            }
        });
        w.write_line("");
    }

    if customize.derive_debug {
        w.write_line("#[derive(Debug, Clone, PartialEq, Default)]");
    } else {
        w.write_line("#[derive(Clone, PartialEq, Default)]");
    }
    w.block(&format!("pub struct {}", name), |w| {
        for field in &msg.fields {
            if field.oneof_index.is_some() {
                continue;
            }
            w.write_line(&format!(
                "pub {}: {},",
                escape_ident(&field.name),
                struct_field_rust_type(field, package)
            ));
        }
        for map in &msg.maps {
            let key_ty = crate::rust_type::scalar_rust_type(map.key_type);
            let value_ty = oneof_member_rust_type(&map.value_type, package);
            w.write_line(&format!(
                "pub {}: protobuf::OrderedMap<{}, {}>,",
                escape_ident(&map.name),
                key_ty,
                value_ty
            ));
        }
        for oneof in &msg.oneofs {
            w.write_line(&format!(
                "pub {}: ::std::option::Option<{}>,",
                escape_ident(&oneof.name),
                oneof_enum_name(&name, &oneof.name)
            ));
        }
        w.write_line("pub unknown_fields: protobuf::UnknownFields,");
    });
    w.write_line("");

    w.block(&format!("impl {}", name), |w| {
        w.doc_comment("Runtime descriptor mirroring this struct's shape.");
        w.pub_fn("descriptor() -> protobuf::reflect::MessageDescriptor", |w| {
            w.write_line(&message_descriptor_literal(msg));
        });
        w.write_line("");

        w.doc_comment("Converts to the schema-driven runtime representation; used by `encode`/`to_json`/`to_text` so they agree with `DynamicMessage` by construction.");
        w.pub_fn("to_dynamic(&self) -> protobuf::DynamicMessage", |w| {
            w.write_line("let mut d = protobuf::DynamicMessage::new(Self::descriptor());");
            for field in &msg.fields {
                if field.oneof_index.is_some() {
                    continue;
                }
                write_field_to_dynamic(w, field, package);
            }
            for map in &msg.maps {
                w.write_line(&format!("for (k, v) in self.{}.iter() {{", escape_ident(&map.name)));
                w.indented(|w| {
                    w.write_line(&format!(
                        "d.put_map({}, {}, {});",
                        map.number,
                        scalar_to_reflect_ref(map.key_type, "k"),
                        value_to_reflect_ref(&map.value_type, "v")
                    ));
                });
                w.write_line("}");
            }
            for (oneof_idx, oneof) in msg.oneofs.iter().enumerate() {
                let enum_name = oneof_enum_name(&name, &oneof.name);
                w.write_line(&format!("match &self.{} {{", escape_ident(&oneof.name)));
                w.indented(|w| {
                    for member in oneof_members(msg, oneof_idx) {
                        let set_expr = value_to_reflect_ref(&member.field.field_type, "v");
                        w.write_line(&format!(
                            "Some({}::{}(v)) => {{ d.set({}, {}); }}",
                            enum_name, member.variant, member.field.number, set_expr
                        ));
                    }
                    w.write_line("None => {}");
                });
                w.write_line("}");
            }
            w.write_line("*d.mut_unknown_fields() = self.unknown_fields.clone();");
            w.write_line("d");
        });
        w.write_line("");

        w.doc_comment("Rebuilds this struct from its dynamic representation.");
        w.pub_fn("from_dynamic(d: protobuf::DynamicMessage) -> Self", |w| {
            w.write_line(&format!("let mut out = {}::default();", name));
            for field in &msg.fields {
                if field.oneof_index.is_some() {
                    continue;
                }
                write_field_from_dynamic(w, field, package);
            }
            for map in &msg.maps {
                w.write_line(&format!(
                    "out.{} = d.get_map({}).iter().map(|(k, v)| ({}, {})).collect();",
                    escape_ident(&map.name),
                    map.number,
                    scalar_from_reflect_direct(map.key_type, "k"),
                    value_from_reflect_direct(&map.value_type, package, "v")
                ));
            }
            for (oneof_idx, oneof) in msg.oneofs.iter().enumerate() {
                let enum_name = oneof_enum_name(&name, &oneof.name);
                let members = oneof_members(msg, oneof_idx);
                let numbers: Vec<String> = members.iter().map(|m| m.field.number.to_string()).collect();
                w.write_line(&format!(
                    "out.{} = match d.oneof_case(&[{}]) {{",
                    escape_ident(&oneof.name),
                    numbers.join(", ")
                ));
                w.indented(|w| {
                    for member in &members {
                        let n = member.field.number;
                        let conv = match &member.field.field_type {
                            FieldType::Message(fqn) => format!(
                                "d.get({}).and_then(|v| v.as_message()).cloned().map(|m| Box::new({}::from_dynamic(m))).unwrap_or_default()",
                                n,
                                rust_item_name(fqn, package)
                            ),
                            FieldType::Enum(_) => format!(
                                "protobuf::EnumOrUnknown::from_i32(d.get({}).and_then(|v| v.as_enum_number()).unwrap_or(0))",
                                n
                            ),
                            FieldType::Scalar(s) => scalar_from_reflect_opt(*s, &format!("d.get({})", n)),
                        };
                        w.write_line(&format!("Some({}) => Some({}::{}({})),", n, enum_name, member.variant, conv));
                    }
                    w.write_line("_ => None,");
                });
                w.write_line("};");
            }
            w.write_line("out.unknown_fields = d.unknown_fields().clone();");
            w.write_line("out");
        });
        w.write_line("");

        w.pub_fn("to_json(&self) -> String", |w| {
            w.write_line("protobuf::json::to_json(&self.to_dynamic(), &_file_resolver())");
        });
        w.write_line("");
        w.pub_fn(
            "from_json(s: &str) -> protobuf::json::JsonResult<Self>",
            |w| {
                w.write_line("let d = protobuf::json::from_json(&Self::descriptor(), s, &_file_resolver())?;");
                w.write_line("Ok(Self::from_dynamic(d))");
            },
        );
        w.write_line("");
        w.pub_fn("to_text(&self) -> String", |w| {
            w.write_line("protobuf::text::format::to_text(&self.to_dynamic(), &_file_resolver())");
        });
        w.write_line("");
        w.pub_fn(
            "from_text(s: &str) -> protobuf::text::format::TextFormatResult<Self>",
            |w| {
                w.write_line("let d = protobuf::text::format::from_text(&Self::descriptor(), s, &_file_resolver())?;");
                w.write_line("Ok(Self::from_dynamic(d))");
            },
        );
    });
    w.write_line("");

    w.block(&format!("impl protobuf::Message for {}", name), |w| {
        w.pub_fn("encode(&self, out: &mut Vec<u8>)", |w| {
            w.write_line("out.extend(self.to_dynamic().encode());");
        });
        w.write_line("");
        w.pub_fn("calc_size(&self) -> usize", |w| {
            w.write_line("self.to_dynamic().encode().len()");
        });
        w.write_line("");
        w.pub_fn("decode(bytes: &[u8]) -> protobuf::CodecResult<Self>", |w| {
            w.write_line("let resolver = _file_resolver();");
            w.write_line("let d = protobuf::DynamicMessage::decode(&Self::descriptor(), &resolver, bytes)?;");
            w.write_line("Ok(Self::from_dynamic(d))");
        });
        w.write_line("");
        w.pub_fn("unknown_fields(&self) -> &protobuf::UnknownFields", |w| {
            w.write_line("&self.unknown_fields");
        });
        w.write_line("");
        w.pub_fn("mut_unknown_fields(&mut self) -> &mut protobuf::UnknownFields", |w| {
            w.write_line("&mut self.unknown_fields");
        });
    });
    w.write_line("");
}

fn write_field_to_dynamic(w: &mut CodeWriter, field: &FieldDescriptor, package: Option<&str>) {
    let fname = escape_ident(&field.name);
    let n = field.number;
    if field.is_repeated() {
        match &field.field_type {
            FieldType::Message(_) => {
                w.write_line(&format!(
                    "for v in &self.{} {{ d.push_repeated({}, protobuf::ReflectValueBox::Message(Box::new(v.to_dynamic()))); }}",
                    fname, n
                ));
            }
            FieldType::Enum(_) => {
                w.write_line(&format!(
                    "for v in &self.{} {{ d.push_repeated({}, protobuf::ReflectValueBox::Enum(v.value())); }}",
                    fname, n
                ));
            }
            FieldType::Scalar(s) => {
                w.write_line(&format!(
                    "for v in &self.{} {{ d.push_repeated({}, {}); }}",
                    fname,
                    n,
                    scalar_to_reflect_ref(*s, "v")
                ));
            }
        }
        return;
    }
    match (&field.field_type, field.label) {
        (FieldType::Message(_), _) => {
            w.write_line(&format!(
                "if let Some(v) = &self.{} {{ d.set({}, protobuf::ReflectValueBox::Message(Box::new(v.to_dynamic()))); }}",
                fname, n
            ));
        }
        (FieldType::Enum(_), Label::Optional) => {
            w.write_line(&format!(
                "if let Some(v) = &self.{} {{ d.set({}, protobuf::ReflectValueBox::Enum(v.value())); }}",
                fname, n
            ));
        }
        (FieldType::Enum(_), Label::Implicit) => {
            w.write_line(&format!(
                "if self.{}.value() != 0 {{ d.set({}, protobuf::ReflectValueBox::Enum(self.{}.value())); }}",
                fname, n, fname
            ));
        }
        (FieldType::Enum(_), _) => {
            w.write_line(&format!("d.set({}, protobuf::ReflectValueBox::Enum(self.{}.value()));", n, fname));
        }
        (FieldType::Scalar(s), Label::Optional) => {
            w.write_line(&format!(
                "if let Some(v) = &self.{} {{ d.set({}, {}); }}",
                fname,
                n,
                scalar_to_reflect_ref(*s, "v")
            ));
        }
        (FieldType::Scalar(s), Label::Implicit) => {
            w.write_line(&format!(
                "if {} {{ d.set({}, {}); }}",
                scalar_nonzero_cond(*s, &format!("self.{}", fname)),
                n,
                scalar_to_reflect_owned(*s, &format!("self.{}", fname))
            ));
        }
        (FieldType::Scalar(s), _) => {
            w.write_line(&format!(
                "d.set({}, {});",
                n,
                scalar_to_reflect_owned(*s, &format!("self.{}", fname))
            ));
        }
    }
    let _ = package;
}

fn write_field_from_dynamic(w: &mut CodeWriter, field: &FieldDescriptor, package: Option<&str>) {
    let fname = escape_ident(&field.name);
    let n = field.number;
    if field.is_repeated() {
        let expr = match &field.field_type {
            FieldType::Message(fqn) => format!(
                "d.get_repeated({}).iter().filter_map(|v| v.as_message()).cloned().map(|m| {}::from_dynamic(m)).collect()",
                n,
                rust_item_name(fqn, package)
            ),
            FieldType::Enum(_) => format!(
                "d.get_repeated({}).iter().map(|v| protobuf::EnumOrUnknown::from_i32(v.as_enum_number().unwrap_or(0))).collect()",
                n
            ),
            FieldType::Scalar(s) => format!(
                "d.get_repeated({}).iter().map(|v| {}).collect()",
                n,
                scalar_from_reflect_direct(*s, "v")
            ),
        };
        w.write_line(&format!("out.{} = {};", fname, expr));
        return;
    }
    match (&field.field_type, field.label) {
        (FieldType::Message(fqn), _) => {
            w.write_line(&format!(
                "out.{} = d.get({}).and_then(|v| v.as_message()).cloned().map(|m| Box::new({}::from_dynamic(m)));",
                fname,
                n,
                rust_item_name(fqn, package)
            ));
        }
        (FieldType::Enum(_), Label::Optional) => {
            w.write_line(&format!(
                "out.{} = d.get({}).map(|v| protobuf::EnumOrUnknown::from_i32(v.as_enum_number().unwrap_or(0)));",
                fname, n
            ));
        }
        (FieldType::Enum(_), _) => {
            w.write_line(&format!(
                "out.{} = protobuf::EnumOrUnknown::from_i32(d.get({}).and_then(|v| v.as_enum_number()).unwrap_or(0));",
                fname, n
            ));
        }
        (FieldType::Scalar(s), Label::Optional) => {
            w.write_line(&format!(
                "out.{} = d.get({}).map(|v| {});",
                fname,
                n,
                scalar_from_reflect_direct(*s, "v")
            ));
        }
        (FieldType::Scalar(s), _) => {
            w.write_line(&format!(
                "out.{} = {};",
                fname,
                scalar_from_reflect_opt(*s, &format!("d.get({})", n))
            ));
        }
    }
}

/// Emits the per-file type registry every generated message's `decode`,
/// `from_json` and `from_text` call: a [`protobuf::reflect::TypeResolver`]
/// that knows every message/enum declared in *this* file. Imported
/// types from other files are out of scope for this resolver — a file that
/// needs them composes its own resolver with [`protobuf::reflect::ChainedResolver`]
/// in front of the imported file's own `_file_resolver()`.
pub fn generate_file_resolver(w: &mut CodeWriter, messages: &[MessageDescriptor], enums: &[protobuf::reflect::EnumDescriptor]) {
    w.fn_block("_file_messages() -> Vec<protobuf::reflect::MessageDescriptor>", |w| {
        w.write_line("vec![");
        w.indented(|w| {
            for m in messages {
                w.write_line(&format!("{},", message_descriptor_literal(m)));
            }
        });
        w.write_line("]");
    });
    w.write_line("");
    w.fn_block("_file_enums() -> Vec<protobuf::reflect::EnumDescriptor>", |w| {
        w.write_line("vec![");
        w.indented(|w| {
            for e in enums {
                w.write_line(&format!("{},", crate::gen_enum::enum_descriptor_literal(e)));
            }
        });
        w.write_line("]");
    });
    w.write_line("");
    w.block("struct _FileResolver", |w| {
        w.write_line("messages: Vec<protobuf::reflect::MessageDescriptor>,");
        w.write_line("enums: Vec<protobuf::reflect::EnumDescriptor>,");
    });
    w.write_line("");
    w.block("impl protobuf::reflect::TypeResolver for _FileResolver", |w| {
        w.pub_fn(
            "resolve_message(&self, fqn: &str) -> ::std::option::Option<&protobuf::reflect::MessageDescriptor>",
            |w| {
                w.write_line("self.messages.iter().find(|m| m.full_name == fqn)");
            },
        );
        w.write_line("");
        w.pub_fn(
            "resolve_enum(&self, fqn: &str) -> ::std::option::Option<&protobuf::reflect::EnumDescriptor>",
            |w| {
                w.write_line("self.enums.iter().find(|e| e.full_name == fqn)");
            },
        );
    });
    w.write_line("");
    w.fn_block("_file_resolver() -> _FileResolver", |w| {
        w.write_line("_FileResolver { messages: _file_messages(), enums: _file_enums() }");
    });
    w.write_line("");
}

#[cfg(test)]
mod tests {
    use super::*;
    use protobuf::reflect::{Label, OneofDescriptor};

    fn simple_message() -> MessageDescriptor {
        MessageDescriptor {
            name: "Point".to_string(),
            full_name: ".demo.Point".to_string(),
            fields: vec![
                FieldDescriptor {
                    number: 1,
                    name: "x".to_string(),
                    json_name: "x".to_string(),
                    field_type: FieldType::Scalar(ScalarType::Int32),
                    label: Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
                FieldDescriptor {
                    number: 2,
                    name: "tags".to_string(),
                    json_name: "tags".to_string(),
                    field_type: FieldType::Scalar(ScalarType::String),
                    label: Label::Repeated,
                    packed: false,
                    oneof_index: None,
                },
            ],
            oneofs: vec![],
            maps: vec![],
        }
    }

    #[test]
    fn generates_struct_with_unknown_fields_tail() {
        let msg = simple_message();
        let mut w = CodeWriter::new();
        generate_message(&mut w, &msg, Some("demo"), &Customize::default());
        let src = w.into_string();
        assert!(src.contains("pub struct Point"));
        assert!(src.contains("pub x: i32,"));
        assert!(src.contains("pub tags: Vec<String>,"));
        assert!(src.contains("pub unknown_fields: protobuf::UnknownFields,"));
        assert!(src.contains("impl protobuf::Message for Point"));
        assert!(src.contains("fn to_dynamic(&self) -> protobuf::DynamicMessage"));
        assert!(src.contains("fn from_dynamic(d: protobuf::DynamicMessage) -> Self"));
    }

    #[test]
    fn implicit_scalar_skips_zero_on_encode() {
        let msg = simple_message();
        let mut w = CodeWriter::new();
        generate_message(&mut w, &msg, Some("demo"), &Customize::default());
        let src = w.into_string();
        assert!(src.contains("if self.x != 0 { d.set(1, protobuf::ReflectValueBox::I32(self.x)); }"));
    }

    #[test]
    fn oneof_generates_sibling_enum_and_match_arms() {
        let mut msg = simple_message();
        msg.fields.push(FieldDescriptor {
            number: 3,
            name: "name".to_string(),
            json_name: "name".to_string(),
            field_type: FieldType::Scalar(ScalarType::String),
            label: Label::Optional,
            packed: false,
            oneof_index: Some(0),
        });
        msg.oneofs.push(OneofDescriptor { name: "kind".to_string(), field_indices: vec![2] });
        let mut w = CodeWriter::new();
        generate_message(&mut w, &msg, Some("demo"), &Customize::default());
        let src = w.into_string();
        assert!(src.contains("pub enum Point_Kind"));
        assert!(src.contains("Name(String),"));
        assert!(src.contains("pub kind: ::std::option::Option<Point_Kind>,"));
        assert!(src.contains("match d.oneof_case(&[3])"));
    }

    #[test]
    fn file_resolver_looks_up_by_full_name() {
        let msg = simple_message();
        let mut w = CodeWriter::new();
        generate_file_resolver(&mut w, &[msg], &[]);
        let src = w.into_string();
        assert!(src.contains("struct _FileResolver"));
        assert!(src.contains("impl protobuf::reflect::TypeResolver for _FileResolver"));
        assert!(src.contains(".demo.Point"));
    }
}
