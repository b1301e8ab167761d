//! Lexer, recursive-descent parser and linker for `.proto` files.
//!
//! [`parse_file`] turns one `.proto` source string into an AST plus any
//! diagnostics found along the way. [`link`] loads a file and its transitive
//! imports through a caller-supplied [`linker::FileLoader`], resolves every
//! field type reference and runs the semantic checks that need the whole
//! file set. The result implements `protobuf::reflect::TypeResolver`
//! directly, so a linked schema can be handed straight to `DynamicMessage`,
//! JSON or text-format code with no further conversion.

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod linker;
pub mod parser;

pub use diagnostics::{has_errors, Diagnostic, Loc, Severity};
pub use linker::{link, FileLoader, LinkedFileSet, MapLoader, ResolvedFile, ResolvedMethod, ResolvedService};
pub use parser::parse_file;
