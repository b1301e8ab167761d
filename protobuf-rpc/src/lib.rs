//! Runtime support for generated RPC service code: the frame codec, the
//! stream abstractions, and the transport seam.
//!
//! `protobuf-codegen`'s `gen_service` module is the only caller outside this
//! crate's own tests that's expected to name these types directly; a
//! generated `{Service}Client`/`{Service}Server` pair wires them together
//! per method.

pub mod descriptor;
pub mod error;
pub mod frame;
pub mod stream;
pub mod transport;

pub use descriptor::{MethodDescriptor, ServiceDescriptor};
pub use error::{RpcError, RpcResult};
pub use frame::{encode_frame, parse_frame, read_frame, write_frame, Frame};
pub use stream::{BidiCall, ClientStreamingCall, RecvStream, SendStream};
pub use transport::Transport;
