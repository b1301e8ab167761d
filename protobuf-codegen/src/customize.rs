//! Code generation options.

/// Tunables for [`crate::file::generate_file`]. There is no
/// `rustproto`-option overlay here — every field is set once by the caller
/// and applies uniformly to the whole generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customize {
    /// `#[derive(Debug, Clone, PartialEq)]` on generated structs and enums.
    pub derive_debug: bool,
    /// Crate path generated code uses to reach the runtime (`protobuf` by
    /// default; overridable for a vendored/renamed dependency).
    pub protobuf_crate: String,
}

impl Default for Customize {
    fn default() -> Customize {
        Customize { derive_debug: true, protobuf_crate: "protobuf".to_string() }
    }
}
