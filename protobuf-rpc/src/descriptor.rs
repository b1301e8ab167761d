//! Runtime service descriptor, the RPC counterpart to
//! `protobuf::reflect::MessageDescriptor`/`EnumDescriptor`.

/// One `rpc` declared inside a `service` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// `PascalCase`, as written in the `.proto` source.
    pub name: String,
    /// `"/" + service.name + "/" + method.name"`, package-qualified when the
    /// service is.
    pub full_path: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

/// A `service` block's shape, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// FQN-qualified when the service's file has a `package`.
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}
