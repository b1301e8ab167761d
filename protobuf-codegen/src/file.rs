//! Assembles one generated Rust module per linked `.proto` file: the
//! file-scoped type resolver, then every enum, message and service it
//! declares, in source order.

use protobuf_parser::ResolvedFile;

use crate::code_writer::CodeWriter;
use crate::customize::Customize;
use crate::gen_enum::generate_enum;
use crate::gen_message::{generate_file_resolver, generate_message};
use crate::gen_service::generate_service;

/// Generates the full Rust source text for one linked `.proto` file.
///
/// A pure function of `resolved` (plus `customize`): same input always
/// produces the same output string, with no filesystem or network access —
/// writing it to a `.rs` file on disk is the caller's job.
pub fn generate_file(resolved: &ResolvedFile<'_>, customize: &Customize) -> String {
    let package = resolved.descriptor.package.as_deref();
    let mut w = CodeWriter::new();

    w.doc_comment(&format!("Generated from `{}`. DO NOT EDIT.", resolved.descriptor.name));
    w.write_line("#![allow(dead_code, non_camel_case_types)]");
    w.write_line("use protobuf::Message;");
    w.write_line("");

    generate_file_resolver(&mut w, &resolved.descriptor.messages, &resolved.descriptor.enums);

    for e in &resolved.descriptor.enums {
        generate_enum(&mut w, e, package, customize);
    }
    for m in &resolved.descriptor.messages {
        generate_message(&mut w, m, package, customize);
    }
    for svc in resolved.services {
        generate_service(&mut w, svc, package, customize);
    }

    w.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn link_source(src: &str) -> protobuf_parser::LinkedFileSet {
        let mut files = HashMap::new();
        files.insert("main.proto".to_string(), src.to_string());
        let mut loader = protobuf_parser::MapLoader(files);
        let (linked, diags) = protobuf_parser::link("main.proto", &mut loader);
        assert!(!protobuf_parser::has_errors(&diags), "{:?}", diags);
        linked
    }

    #[test]
    fn generates_resolver_messages_and_services_in_one_module() {
        let linked = link_source(
            r#"
            syntax = "proto3";
            package demo;
            message Req { string query = 1; }
            message Resp { string result = 1; }
            service Lookup {
                rpc Find(Req) returns (Resp);
            }
            "#,
        );
        let resolved = linked.resolved_files();
        let src = generate_file(&resolved[0], &Customize::default());
        assert!(src.contains("struct _FileResolver"));
        assert!(src.contains("pub struct Req"));
        assert!(src.contains("pub struct Resp"));
        assert!(src.contains("pub struct LookupClient<T: protobuf_rpc::Transport>"));
        assert!(src.contains("use protobuf::Message;"));
    }
}
