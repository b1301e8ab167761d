//! Generates Rust source from a linked `.proto` file.
//!
//! [`generate_file`] is the single library entry point; everything else is
//! an implementation detail a CLI or build-script wrapper would not need
//! to call directly.

pub mod case_convert;
pub mod code_writer;
pub mod customize;
pub mod file;
pub mod gen_enum;
pub mod gen_message;
pub mod gen_service;
pub mod rust_type;

pub use customize::Customize;
pub use file::generate_file;
