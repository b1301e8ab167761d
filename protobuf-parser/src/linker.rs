//! Multi-file linker: loads a file and its transitive imports,
//! registers every message/enum by fully-qualified name, resolves field
//! type references against that registry, and runs the semantic checks
//! that only make sense once every name is known.

use std::collections::{HashMap, HashSet};

use protobuf::reflect::{
    EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldType, FileDescriptor, Label,
    MapDescriptor, MessageDescriptor, OneofDescriptor, Syntax as RSyntax, TypeResolver,
};

use crate::ast::{self, OptionValue, TypeRef};
use crate::diagnostics::{Diagnostic, Loc};
use crate::parser::parse_file;

/// Something that can turn an import path into `.proto` source text. The
/// in-memory `HashMap`-backed loader in this module's tests stands in for
/// a real filesystem (or module-registry) implementation at call sites.
pub trait FileLoader {
    fn load(&mut self, path: &str) -> Result<String, String>;
}

impl<F: FnMut(&str) -> Result<String, String>> FileLoader for F {
    fn load(&mut self, path: &str) -> Result<String, String> {
        self(path)
    }
}

/// An in-memory loader for tests and embedded schema sets: every file the
/// linker needs must already be present in the map.
pub struct MapLoader(pub HashMap<String, String>);

impl FileLoader for MapLoader {
    fn load(&mut self, path: &str) -> Result<String, String> {
        self.0.get(path).cloned().ok_or_else(|| "not found".to_string())
    }
}

/// Which node is currently a `TypeRef::Named` resolved to, before the
/// `MessageDescriptor`/`EnumDescriptor` tables are built.
#[derive(Clone)]
enum RawType {
    Message(ast::Message, String),
    Enum(ast::Enum, String),
}

/// The result of phase 1+2: every file loaded, plus a global FQN registry.
struct Loaded {
    files: HashMap<String, ast::File>,
    order: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

fn load_transitive(entry: &str, loader: &mut dyn FileLoader) -> Loaded {
    let mut loaded = Loaded { files: HashMap::new(), order: Vec::new(), diagnostics: Vec::new() };
    let mut stack = Vec::new();
    load_rec(entry, loader, &mut loaded, &mut stack);
    loaded
}

fn load_rec(path: &str, loader: &mut dyn FileLoader, loaded: &mut Loaded, stack: &mut Vec<String>) {
    if loaded.files.contains_key(path) {
        return;
    }
    if stack.iter().any(|p| p == path) {
        loaded.diagnostics.push(Diagnostic::error(Loc::default(), format!("circular import: {}", path)));
        return;
    }
    let source = match loader.load(path) {
        Ok(s) => s,
        Err(e) => {
            loaded.diagnostics.push(Diagnostic::error(Loc::default(), format!("import not found: {} ({})", path, e)));
            return;
        }
    };
    stack.push(path.to_string());
    let (file, diags) = parse_file(&source);
    loaded.diagnostics.extend(diags);
    for imp in &file.imports {
        load_rec(&imp.path, loader, loaded, stack);
    }
    stack.pop();
    loaded.order.push(path.to_string());
    loaded.files.insert(path.to_string(), file);
}

/// Walks a message tree, collecting every nested message/enum under its
/// fully-qualified name (`.package.Outer.Inner`).
fn collect_types(prefix: &str, messages: &[ast::Message], enums: &[ast::Enum], out: &mut HashMap<String, RawType>) {
    for m in messages {
        let fqn = format!("{}.{}", prefix, m.name);
        collect_types(&fqn, &m.messages, &m.enums, out);
        out.insert(fqn.clone(), RawType::Message(m.clone(), fqn));
    }
    for e in enums {
        let fqn = format!("{}.{}", prefix, e.name);
        out.insert(fqn.clone(), RawType::Enum(e.clone(), fqn));
    }
}

/// Resolves `name` (as it appears in a `.proto` field type) to a registered
/// FQN, by trying the scope chain from `scope` (most specific first), then
/// the file's package root, then the absolute root. A leading `.` in `name`
/// means "absolute": looked up directly with no scope walk.
fn resolve_name<'a>(name: &str, scope: &str, registry: &'a HashMap<String, RawType>) -> Option<&'a str> {
    if let Some(rest) = name.strip_prefix('.') {
        let fqn = format!(".{}", rest);
        return registry.get_key_value(&fqn).map(|(k, _)| k.as_str());
    }
    let mut scope_parts: Vec<&str> = scope.split('.').filter(|s| !s.is_empty()).collect();
    loop {
        let candidate = if scope_parts.is_empty() {
            format!(".{}", name)
        } else {
            format!(".{}.{}", scope_parts.join("."), name)
        };
        if registry.contains_key(&candidate) {
            return registry.get_key_value(&candidate).map(|(k, _)| k.as_str());
        }
        if scope_parts.is_empty() {
            break;
        }
        scope_parts.pop();
    }
    None
}

fn field_type_ref(type_ref: &TypeRef, scope: &str, loc: Loc, registry: &HashMap<String, RawType>, diags: &mut Vec<Diagnostic>) -> FieldType {
    match type_ref {
        TypeRef::Scalar(s) => FieldType::Scalar(*s),
        TypeRef::Named(name) => match resolve_name(name, scope, registry) {
            Some(fqn) => match registry.get(fqn) {
                Some(RawType::Message(_, full)) => FieldType::Message(full.clone()),
                Some(RawType::Enum(_, full)) => FieldType::Enum(full.clone()),
                None => unreachable!(),
            },
            None => {
                diags.push(Diagnostic::error(loc, format!("unresolved type: {}", name)));
                FieldType::Message(name.clone())
            }
        },
    }
}

fn option_str(options: &[ast::Option_], name: &str) -> Option<String> {
    options.iter().find(|o| o.name == name).and_then(|o| match &o.value {
        OptionValue::Str(v) => Some(v.clone()),
        OptionValue::Ident(v) => Some(v.clone()),
        _ => None,
    })
}

fn option_bool(options: &[ast::Option_], name: &str) -> Option<bool> {
    options.iter().find(|o| o.name == name).and_then(|o| match &o.value {
        OptionValue::Bool(v) => Some(*v),
        _ => None,
    })
}

fn lower_camel(name: &str) -> String {
    let mut out = String::new();
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

fn build_message(m: &ast::Message, fqn: &str, scope: &str, syntax: ast::Syntax, registry: &HashMap<String, RawType>, diags: &mut Vec<Diagnostic>) -> MessageDescriptor {
    let mut fields = Vec::new();
    let mut oneofs = Vec::new();
    let mut maps = Vec::new();
    let mut seen_numbers: HashSet<i32> = HashSet::new();
    let mut seen_names: HashSet<&str> = HashSet::new();

    let mut check_number = |number: i32, name: &str, loc: Loc, diags: &mut Vec<Diagnostic>| {
        if !seen_numbers.insert(number) {
            diags.push(Diagnostic::error(loc, format!("duplicate field number {} in {}", number, fqn)));
        }
        if !seen_names.insert(name) {
            diags.push(Diagnostic::error(loc, format!("duplicate field name {} in {}", name, fqn)));
        }
        for r in &m.reserved_nums {
            if number >= r.from && number <= r.to {
                diags.push(Diagnostic::error(loc, format!("field number {} is reserved in {}", number, fqn)));
            }
        }
        if m.reserved_names.iter().any(|n| n == name) {
            diags.push(Diagnostic::error(loc, format!("field name {} is reserved in {}", name, fqn)));
        }
    };

    for fo in &m.fields {
        match fo {
            ast::FieldOrOneOf::Field(f) => {
                check_number(f.number, &f.name, f.loc, diags);
                if syntax == ast::Syntax::Proto2 && f.label == ast::Label::Implicit {
                    diags.push(Diagnostic::error(f.loc, format!("field {}.{} must declare optional or required in proto2", fqn, f.name)));
                }
                let field_type = field_type_ref(&f.type_ref, scope, f.loc, registry, diags);
                let label = match f.label {
                    ast::Label::Implicit => Label::Implicit,
                    ast::Label::Optional => Label::Optional,
                    ast::Label::Required => Label::Required,
                    ast::Label::Repeated => Label::Repeated,
                };
                let json_name = option_str(&f.options, "json_name").unwrap_or_else(|| lower_camel(&f.name));
                let packed = option_bool(&f.options, "packed").unwrap_or(false);
                fields.push(FieldDescriptor {
                    number: f.number as u32,
                    name: f.name.clone(),
                    json_name,
                    field_type,
                    label,
                    packed,
                    oneof_index: None,
                });
            }
            ast::FieldOrOneOf::Map(map_field) => {
                check_number(map_field.number, &map_field.name, map_field.loc, diags);
                if !map_field.key_type.is_valid_map_key() {
                    diags.push(Diagnostic::error(map_field.loc, format!("invalid map key type in {}.{}", fqn, map_field.name)));
                }
                let value_type = field_type_ref(&map_field.value_type, scope, map_field.loc, registry, diags);
                maps.push(MapDescriptor {
                    name: map_field.name.clone(),
                    number: map_field.number as u32,
                    key_type: map_field.key_type,
                    value_type,
                });
            }
            ast::FieldOrOneOf::OneOf(oneof) => {
                let mut indices = Vec::new();
                for f in &oneof.fields {
                    check_number(f.number, &f.name, f.loc, diags);
                    if f.label == ast::Label::Repeated {
                        diags.push(Diagnostic::error(f.loc, format!("oneof {} cannot contain repeated field {}", oneof.name, f.name)));
                    }
                    let field_type = field_type_ref(&f.type_ref, scope, f.loc, registry, diags);
                    let json_name = option_str(&f.options, "json_name").unwrap_or_else(|| lower_camel(&f.name));
                    indices.push(fields.len());
                    fields.push(FieldDescriptor {
                        number: f.number as u32,
                        name: f.name.clone(),
                        json_name,
                        field_type,
                        label: Label::Optional,
                        packed: false,
                        oneof_index: None,
                    });
                }
                let oneof_index = oneofs.len();
                for &i in &indices {
                    fields[i].oneof_index = Some(oneof_index);
                }
                oneofs.push(OneofDescriptor { name: oneof.name.clone(), field_indices: indices });
            }
        }
    }

    MessageDescriptor { name: m.name.clone(), full_name: fqn.to_string(), fields, oneofs, maps }
}

fn build_enum(e: &ast::Enum, fqn: &str, syntax: ast::Syntax, diags: &mut Vec<Diagnostic>) -> EnumDescriptor {
    let mut values = Vec::new();
    let mut seen_numbers: HashSet<i32> = HashSet::new();
    for (i, v) in e.values.iter().enumerate() {
        if syntax == ast::Syntax::Proto3 && i == 0 && v.number != 0 {
            diags.push(Diagnostic::error(v.loc, format!("the first value of proto3 enum {} must be zero", fqn)));
        }
        if !seen_numbers.insert(v.number) && !e.allow_alias() {
            diags.push(Diagnostic::error(v.loc, format!("duplicate enum value {} in {} (set allow_alias to permit this)", v.number, fqn)));
        }
        values.push(EnumValueDescriptor { name: v.name.clone(), number: v.number });
    }
    EnumDescriptor { name: e.name.clone(), full_name: fqn.to_string(), values, is_open: syntax == ast::Syntax::Proto3 }
}

/// A linked `rpc` method: `input_type`/`output_type` are resolved FQNs
/// rather than the raw names `.proto` source wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMethod {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

/// A linked `service`. `full_name` is the package-qualified name with no
/// leading dot (`"myapp.services.v1.PackagedService"`), matching the
/// literal `full_path` an RPC method is dispatched by
/// (`"/" + service.full_name + "/" + method.name"`, package included but no
/// leading `.` — unlike `MessageDescriptor::full_name`, which always has
/// one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedService {
    pub name: String,
    pub full_name: String,
    pub methods: Vec<ResolvedMethod>,
}

/// A fully linked multi-file schema: every `FileDescriptor`, plus a flat
/// FQN registry implementing [`TypeResolver`] so dynamic messages, JSON and
/// text-format code can resolve message/enum references directly.
pub struct LinkedFileSet {
    pub files: Vec<FileDescriptor>,
    /// Parallel to `files`: each file's linked services, kept out of
    /// `FileDescriptor` itself since that type only models what the
    /// dynamic-message/JSON/text runtime needs.
    pub services: Vec<Vec<ResolvedService>>,
    messages: HashMap<String, MessageDescriptor>,
    enums: HashMap<String, EnumDescriptor>,
}

impl TypeResolver for LinkedFileSet {
    fn resolve_message(&self, fqn: &str) -> Option<&MessageDescriptor> {
        self.messages.get(fqn)
    }

    fn resolve_enum(&self, fqn: &str) -> Option<&EnumDescriptor> {
        self.enums.get(fqn)
    }
}

impl LinkedFileSet {
    /// One entry per linked file, each pairing its descriptor with a
    /// resolver over the *whole* set so cross-file references (imported
    /// message/enum types) resolve during code generation.
    pub fn resolved_files(&self) -> Vec<ResolvedFile<'_>> {
        self.files
            .iter()
            .zip(&self.services)
            .map(|(descriptor, services)| ResolvedFile { descriptor, services, file_set: self })
            .collect()
    }
}

/// One linked file plus a handle to the file set it was linked against, the
/// unit `protobuf-codegen::generate_file` consumes.
pub struct ResolvedFile<'a> {
    pub descriptor: &'a FileDescriptor,
    pub services: &'a [ResolvedService],
    pub file_set: &'a LinkedFileSet,
}

/// Runs the full pipeline: load `entry` and its transitive imports via
/// `loader`, register every type, resolve references and validate. Callers
/// must check [`crate::diagnostics::has_errors`] on the returned diagnostics
/// before trusting the file set.
pub fn link(entry: &str, loader: &mut dyn FileLoader) -> (LinkedFileSet, Vec<Diagnostic>) {
    let loaded = load_transitive(entry, loader);
    let mut diagnostics = loaded.diagnostics;

    let mut registry: HashMap<String, RawType> = HashMap::new();
    for path in &loaded.order {
        let file = &loaded.files[path];
        let prefix = file.package.as_deref().map(|p| format!(".{}", p)).unwrap_or_default();
        collect_types(&prefix, &file.messages, &file.enums, &mut registry);
    }

    let mut messages = HashMap::new();
    let mut enums = HashMap::new();
    let mut files = Vec::new();
    let mut services = Vec::new();

    for path in &loaded.order {
        let file = &loaded.files[path];
        let package_scope = file.package.clone().unwrap_or_default();
        let mut file_messages = Vec::new();
        let mut file_enums = Vec::new();
        link_messages(&file.messages, &package_scope, file.syntax, &registry, &mut diagnostics, &mut messages, &mut file_messages);
        link_enums(&file.enums, &package_scope, file.syntax, &mut diagnostics, &mut enums, &mut file_enums);
        services.push(link_services(&file.services, &package_scope, &registry, &mut diagnostics));

        let syntax = match file.syntax {
            ast::Syntax::Proto2 => RSyntax::Proto2,
            ast::Syntax::Proto3 => RSyntax::Proto3,
        };
        files.push(FileDescriptor {
            name: path.clone(),
            package: file.package.clone(),
            syntax,
            messages: file_messages,
            enums: file_enums,
        });
    }

    (LinkedFileSet { files, services, messages, enums }, diagnostics)
}

fn link_services(
    svcs: &[ast::Service],
    package_scope: &str,
    registry: &HashMap<String, RawType>,
    diags: &mut Vec<Diagnostic>,
) -> Vec<ResolvedService> {
    svcs.iter()
        .map(|svc| {
            let full_name = if package_scope.is_empty() {
                svc.name.clone()
            } else {
                format!("{}.{}", package_scope, svc.name)
            };
            let methods = svc
                .methods
                .iter()
                .map(|m| ResolvedMethod {
                    name: m.name.clone(),
                    input_type: resolve_service_type(&m.input_type, package_scope, m.loc, registry, diags),
                    output_type: resolve_service_type(&m.output_type, package_scope, m.loc, registry, diags),
                    client_streaming: m.client_streaming,
                    server_streaming: m.server_streaming,
                })
                .collect();
            ResolvedService { name: svc.name.clone(), full_name, methods }
        })
        .collect()
}

fn resolve_service_type(name: &str, scope: &str, loc: Loc, registry: &HashMap<String, RawType>, diags: &mut Vec<Diagnostic>) -> String {
    match resolve_name(name, scope, registry) {
        Some(fqn) => fqn.to_string(),
        None => {
            diags.push(Diagnostic::error(loc, format!("unresolved type: {}", name)));
            name.to_string()
        }
    }
}

fn link_messages(
    msgs: &[ast::Message],
    scope: &str,
    syntax: ast::Syntax,
    registry: &HashMap<String, RawType>,
    diags: &mut Vec<Diagnostic>,
    out_by_fqn: &mut HashMap<String, MessageDescriptor>,
    out_flat: &mut Vec<MessageDescriptor>,
) {
    for m in msgs {
        let fqn = normalize_fqn(scope, &m.name);
        let self_scope = fqn.trim_start_matches('.');
        let descriptor = build_message(m, &fqn, self_scope, syntax, registry, diags);
        out_by_fqn.insert(fqn.clone(), descriptor.clone());
        out_flat.push(descriptor);
        let nested_scope = if scope.is_empty() { m.name.clone() } else { format!("{}.{}", scope, m.name) };
        link_messages(&m.messages, &nested_scope, syntax, registry, diags, out_by_fqn, out_flat);
    }
}

fn link_enums(
    enums: &[ast::Enum],
    scope: &str,
    syntax: ast::Syntax,
    diags: &mut Vec<Diagnostic>,
    out_by_fqn: &mut HashMap<String, EnumDescriptor>,
    out_flat: &mut Vec<EnumDescriptor>,
) {
    for e in enums {
        let fqn = normalize_fqn(scope, &e.name);
        let descriptor = build_enum(e, &fqn, syntax, diags);
        out_by_fqn.insert(fqn, descriptor.clone());
        out_flat.push(descriptor);
    }
}

fn normalize_fqn(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        format!(".{}", name)
    } else {
        format!(".{}.{}", scope, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_source(source: &str) -> (LinkedFileSet, Vec<Diagnostic>) {
        let mut loader = MapLoader(HashMap::from([("entry.proto".to_string(), source.to_string())]));
        link("entry.proto", &mut loader)
    }

    #[test]
    fn resolves_a_message_reference_in_the_same_package() {
        let (linked, diags) = link_source(
            r#"
            syntax = "proto3";
            package demo;
            message Inner { int32 value = 1; }
            message Outer { Inner inner = 1; }
            "#,
        );
        assert!(!crate::diagnostics::has_errors(&diags), "{:?}", diags);
        let outer = linked.resolve_message(".demo.Outer").expect("Outer registered");
        let field = outer.field_by_name("inner").unwrap();
        assert_eq!(field.field_type, FieldType::Message(".demo.Inner".to_string()));
    }

    #[test]
    fn reports_circular_imports_without_infinite_recursion() {
        let mut loader = MapLoader(HashMap::from([
            ("a.proto".to_string(), r#"import "b.proto"; message A { int32 x = 1; }"#.to_string()),
            ("b.proto".to_string(), r#"import "a.proto"; message B { int32 y = 1; }"#.to_string()),
        ]));
        let (_linked, diags) = link("a.proto", &mut loader);
        let circular = diags.iter().filter(|d| d.message.contains("circular import")).count();
        assert_eq!(circular, 1);
    }

    #[test]
    fn duplicate_field_numbers_and_reserved_conflicts_are_reported() {
        let (_linked, diags) = link_source(
            r#"
            syntax = "proto3";
            message M {
                reserved 5;
                int32 a = 1;
                int32 b = 1;
                int32 c = 5;
            }
            "#,
        );
        assert!(diags.iter().any(|d| d.message.contains("duplicate field number")));
        assert!(diags.iter().any(|d| d.message.contains("is reserved")));
    }

    #[test]
    fn proto3_enum_must_start_at_zero() {
        let (_linked, diags) = link_source(
            r#"
            syntax = "proto3";
            enum Bad { FIRST = 1; }
            "#,
        );
        assert!(diags.iter().any(|d| d.message.contains("must be zero")));
    }

    #[test]
    fn oneof_rejects_repeated_fields() {
        let (_linked, diags) = link_source(
            r#"
            syntax = "proto3";
            message M {
                oneof kind { repeated string names = 1; }
            }
            "#,
        );
        assert!(diags.iter().any(|d| d.message.contains("cannot contain repeated field")));
    }

    #[test]
    fn unresolved_type_reference_is_reported() {
        let (_linked, diags) = link_source(
            r#"
            syntax = "proto3";
            message M { Missing m = 1; }
            "#,
        );
        assert!(diags.iter().any(|d| d.message.contains("unresolved type")));
    }

    #[test]
    fn service_full_name_is_package_qualified_without_leading_dot() {
        let (linked, diags) = link_source(
            r#"
            syntax = "proto3";
            package myapp.services.v1;
            message Req { string query = 1; }
            message Resp { string result = 1; }
            service PackagedService {
                rpc Lookup(Req) returns (Resp);
            }
            "#,
        );
        assert!(!crate::diagnostics::has_errors(&diags), "{:?}", diags);
        let resolved = linked.resolved_files();
        let svc = &resolved[0].services[0];
        assert_eq!(svc.full_name, "myapp.services.v1.PackagedService");
        assert_eq!(svc.methods[0].input_type, ".myapp.services.v1.Req");
        assert_eq!(svc.methods[0].output_type, ".myapp.services.v1.Resp");
        assert!(!svc.methods[0].client_streaming);
        assert!(!svc.methods[0].server_streaming);
    }

    #[test]
    fn unpackaged_service_full_name_has_no_package_prefix() {
        let (linked, diags) = link_source(
            r#"
            syntax = "proto3";
            message Req { string query = 1; }
            message Resp { string result = 1; }
            service UnaryService {
                rpc Ping(Req) returns (Resp);
                rpc A(Req) returns (Resp);
                rpc B(Req) returns (Resp);
                rpc C(Req) returns (Resp);
            }
            "#,
        );
        assert!(!crate::diagnostics::has_errors(&diags), "{:?}", diags);
        let resolved = linked.resolved_files();
        let svc = &resolved[0].services[0];
        assert_eq!(svc.full_name, "UnaryService");
        assert_eq!(svc.methods.len(), 4);
        assert_eq!(svc.methods[0].name, "Ping");
    }
}
