//! Generates a Rust enum for one `EnumDescriptor`.

use protobuf::reflect::EnumDescriptor;

use crate::code_writer::CodeWriter;
use crate::customize::Customize;
use crate::rust_type::rust_item_name;

pub fn generate_enum(w: &mut CodeWriter, e: &EnumDescriptor, package: Option<&str>, customize: &Customize) {
    let name = rust_item_name(&e.full_name, package);
    if customize.derive_debug {
        w.write_line("#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
    }
    w.block(&format!("pub enum {}", name), |w| {
        for v in &e.values {
            w.write_line(&format!("{} = {},", v.name, v.number));
        }
    });
    w.write_line("");

    w.block(&format!("impl {}", name), |w| {
        w.pub_fn("value(&self) -> i32", |w| {
            w.write_line("*self as i32");
        });
        w.write_line("");
        w.pub_fn("from_i32(v: i32) -> ::std::option::Option<Self>", |w| {
            w.block("match v", |w| {
                for v in &e.values {
                    w.write_line(&format!("{} => Some({}::{}),", v.number, name, v.name));
                }
                w.write_line("_ => None,");
            });
        });
        w.write_line("");
        w.doc_comment("Symbolic name for the proto3-JSON/text-format mapping; `None` for a value this enum has no variant for (only reachable through an `EnumOrUnknown`, since this type itself never holds one).");
        w.pub_fn("json_name(&self) -> &'static str", |w| {
            w.block("match self", |w| {
                for v in &e.values {
                    w.write_line(&format!("{}::{} => \"{}\",", name, v.name, v.name));
                }
            });
        });
    });
    w.write_line("");

    w.block(&format!("impl protobuf::ProtobufEnum for {}", name), |w| {
        w.pub_fn("value(&self) -> i32", |w| {
            w.write_line(&format!("{}::value(self)", name));
        });
        w.write_line("");
        w.pub_fn("from_i32(v: i32) -> ::std::option::Option<Self>", |w| {
            w.write_line(&format!("{}::from_i32(v)", name));
        });
    });
    w.write_line("");

    if let Some(first) = e.values.first() {
        w.block(&format!("impl ::std::default::Default for {}", name), |w| {
            w.pub_fn("default() -> Self", |w| {
                w.write_line(&format!("{}::{}", name, first.name));
            });
        });
        w.write_line("");
    }
}

/// Rust source text constructing this enum's descriptor as a value, for
/// embedding inside a generated `_*_descriptor()` function body.
pub fn enum_descriptor_literal(e: &EnumDescriptor) -> String {
    let mut values = String::new();
    for v in &e.values {
        values.push_str(&format!(
            "protobuf::reflect::EnumValueDescriptor {{ name: {:?}.to_string(), number: {} }}, ",
            v.name, v.number
        ));
    }
    format!(
        "protobuf::reflect::EnumDescriptor {{ name: {:?}.to_string(), full_name: {:?}.to_string(), values: vec![{}], is_open: {} }}",
        e.name, e.full_name, values, e.is_open
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use protobuf::reflect::EnumValueDescriptor;

    #[test]
    fn generates_variants_with_explicit_discriminants() {
        let e = EnumDescriptor {
            name: "Color".to_string(),
            full_name: ".demo.Color".to_string(),
            values: vec![
                EnumValueDescriptor { name: "UNSPECIFIED".to_string(), number: 0 },
                EnumValueDescriptor { name: "RED".to_string(), number: 1 },
            ],
            is_open: true,
        };
        let mut w = CodeWriter::new();
        generate_enum(&mut w, &e, Some("demo"), &Customize::default());
        let src = w.into_string();
        assert!(src.contains("pub enum Color"));
        assert!(src.contains("UNSPECIFIED = 0,"));
        assert!(src.contains("RED = 1,"));
        assert!(src.contains("fn from_i32"));
    }
}
