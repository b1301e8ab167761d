//! End-to-end fixtures for the wire codec, reflection and RPC framing,
//! standing in for what `protobuf-codegen` would emit from a `.proto` file
//! so the generated-code contract gets exercised without running the
//! generator itself.

pub mod messages;
pub mod rpc_demo;
