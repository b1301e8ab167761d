//! Hand-authored stand-in for what `protobuf-codegen`'s `gen_service`
//! module would emit for a `StreamingService` with one server-streaming
//! RPC, driven over an in-memory duplex pipe instead of a real socket.

use protobuf::Message;

/// `Vec<u8>`-backed duplex pipe connecting a client and server in the same
/// process, for driving generated `Client`/`Server` pairs without a real
/// socket.
pub mod transport {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io::{self, Read, Write};
    use std::rc::Rc;

    #[derive(Default)]
    struct Pipe {
        bytes: VecDeque<u8>,
    }

    /// One end of a duplex pipe: reads what the other end wrote.
    pub struct DuplexEnd {
        read_from: Rc<RefCell<Pipe>>,
        write_to: Rc<RefCell<Pipe>>,
    }

    impl Read for DuplexEnd {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut pipe = self.read_from.borrow_mut();
            let n = buf.len().min(pipe.bytes.len());
            for slot in buf.iter_mut().take(n) {
                *slot = pipe.bytes.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    impl Write for DuplexEnd {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.write_to.borrow_mut().bytes.extend(buf.iter().copied());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// A connected pair of ends: bytes written to one are read from the
    /// other.
    pub fn duplex_pair() -> (DuplexEnd, DuplexEnd) {
        let a = Rc::new(RefCell::new(Pipe::default()));
        let b = Rc::new(RefCell::new(Pipe::default()));
        (DuplexEnd { read_from: a.clone(), write_to: b.clone() }, DuplexEnd { read_from: b, write_to: a })
    }
}

fn _file_messages() -> Vec<protobuf::reflect::MessageDescriptor> {
    vec![Query::descriptor(), QueryResult::descriptor()]
}

struct _FileResolver {
    messages: Vec<protobuf::reflect::MessageDescriptor>,
}

impl protobuf::reflect::TypeResolver for _FileResolver {
    fn resolve_message(&self, fqn: &str) -> ::std::option::Option<&protobuf::reflect::MessageDescriptor> {
        self.messages.iter().find(|m| m.full_name == fqn)
    }

    fn resolve_enum(&self, _fqn: &str) -> ::std::option::Option<&protobuf::reflect::EnumDescriptor> {
        None
    }
}

fn _file_resolver() -> _FileResolver {
    _FileResolver { messages: _file_messages() }
}

/// Field 1: `string query = 1`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub query: String,
    pub unknown_fields: protobuf::UnknownFields,
}

impl Query {
    pub fn descriptor() -> protobuf::reflect::MessageDescriptor {
        protobuf::reflect::MessageDescriptor {
            name: "Query".to_string(),
            full_name: ".demo.Query".to_string(),
            fields: vec![protobuf::reflect::FieldDescriptor {
                number: 1,
                name: "query".to_string(),
                json_name: "query".to_string(),
                field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::String),
                label: protobuf::reflect::Label::Implicit,
                packed: false,
                oneof_index: None,
            }],
            oneofs: vec![],
            maps: vec![],
        }
    }

    pub fn to_dynamic(&self) -> protobuf::DynamicMessage {
        let mut d = protobuf::DynamicMessage::new(Self::descriptor());
        if !self.query.is_empty() {
            d.set(1, protobuf::ReflectValueBox::String(self.query.clone()));
        }
        *d.mut_unknown_fields() = self.unknown_fields.clone();
        d
    }

    pub fn from_dynamic(d: protobuf::DynamicMessage) -> Self {
        let mut out = Query::default();
        out.query = d.get(1).map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_default()).unwrap_or_default();
        out.unknown_fields = d.unknown_fields().clone();
        out
    }
}

impl protobuf::Message for Query {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.to_dynamic().encode());
    }

    fn calc_size(&self) -> usize {
        self.to_dynamic().encode().len()
    }

    fn decode(bytes: &[u8]) -> protobuf::CodecResult<Self> {
        let resolver = _file_resolver();
        let d = protobuf::DynamicMessage::decode(&Self::descriptor(), &resolver, bytes)?;
        Ok(Self::from_dynamic(d))
    }

    fn unknown_fields(&self) -> &protobuf::UnknownFields {
        &self.unknown_fields
    }

    fn mut_unknown_fields(&mut self) -> &mut protobuf::UnknownFields {
        &mut self.unknown_fields
    }
}

/// Field 1: `string result = 1`; field 2: `int32 index = 2`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub result: String,
    pub index: i32,
    pub unknown_fields: protobuf::UnknownFields,
}

impl QueryResult {
    pub fn descriptor() -> protobuf::reflect::MessageDescriptor {
        protobuf::reflect::MessageDescriptor {
            name: "QueryResult".to_string(),
            full_name: ".demo.QueryResult".to_string(),
            fields: vec![
                protobuf::reflect::FieldDescriptor {
                    number: 1,
                    name: "result".to_string(),
                    json_name: "result".to_string(),
                    field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::String),
                    label: protobuf::reflect::Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
                protobuf::reflect::FieldDescriptor {
                    number: 2,
                    name: "index".to_string(),
                    json_name: "index".to_string(),
                    field_type: protobuf::reflect::FieldType::Scalar(protobuf::reflect::ScalarType::Int32),
                    label: protobuf::reflect::Label::Implicit,
                    packed: false,
                    oneof_index: None,
                },
            ],
            oneofs: vec![],
            maps: vec![],
        }
    }

    pub fn to_dynamic(&self) -> protobuf::DynamicMessage {
        let mut d = protobuf::DynamicMessage::new(Self::descriptor());
        if !self.result.is_empty() {
            d.set(1, protobuf::ReflectValueBox::String(self.result.clone()));
        }
        if self.index != 0 {
            d.set(2, protobuf::ReflectValueBox::I32(self.index));
        }
        *d.mut_unknown_fields() = self.unknown_fields.clone();
        d
    }

    pub fn from_dynamic(d: protobuf::DynamicMessage) -> Self {
        let mut out = QueryResult::default();
        out.result = d.get(1).map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_default()).unwrap_or_default();
        out.index = d.get(2).map(|v| v.as_i64().unwrap_or(0) as i32).unwrap_or_default();
        out.unknown_fields = d.unknown_fields().clone();
        out
    }
}

impl protobuf::Message for QueryResult {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.to_dynamic().encode());
    }

    fn calc_size(&self) -> usize {
        self.to_dynamic().encode().len()
    }

    fn decode(bytes: &[u8]) -> protobuf::CodecResult<Self> {
        let resolver = _file_resolver();
        let d = protobuf::DynamicMessage::decode(&Self::descriptor(), &resolver, bytes)?;
        Ok(Self::from_dynamic(d))
    }

    fn unknown_fields(&self) -> &protobuf::UnknownFields {
        &self.unknown_fields
    }

    fn mut_unknown_fields(&mut self) -> &mut protobuf::UnknownFields {
        &mut self.unknown_fields
    }
}

/// Runtime descriptor for the `StreamingService` service.
pub fn streaming_service_descriptor() -> protobuf_rpc::ServiceDescriptor {
    protobuf_rpc::ServiceDescriptor {
        name: "demo.StreamingService".to_string(),
        methods: vec![protobuf_rpc::MethodDescriptor {
            name: "ServerSide".to_string(),
            full_path: "/demo.StreamingService/ServerSide".to_string(),
            input_type: ".demo.Query".to_string(),
            output_type: ".demo.QueryResult".to_string(),
            client_streaming: false,
            server_streaming: true,
        }],
    }
}

#[derive(Debug)]
pub struct StreamingServiceClient<T: protobuf_rpc::Transport> {
    transport: T,
}

impl<T: protobuf_rpc::Transport> StreamingServiceClient<T> {
    pub fn new(transport: T) -> Self {
        StreamingServiceClient { transport }
    }

    pub fn server_side(&mut self, req: &Query) -> protobuf_rpc::RpcResult<protobuf_rpc::RecvStream<'_, T, QueryResult>> {
        self.transport.write_frame(&protobuf_rpc::Frame::Call {
            method: "/demo.StreamingService/ServerSide".to_string(),
            request: req.encode_to_vec(),
        })?;
        Ok(protobuf_rpc::RecvStream::new(&mut self.transport))
    }
}

/// Server-side implementation a `StreamingServiceServer` dispatches decoded
/// requests to.
pub trait StreamingServiceHandler {
    fn server_side<T: protobuf_rpc::Transport>(
        &mut self,
        req: Query,
        out: &mut protobuf_rpc::SendStream<T, QueryResult>,
    ) -> protobuf_rpc::RpcResult<()>;
}

#[derive(Debug)]
pub struct StreamingServiceServer<H: StreamingServiceHandler> {
    pub handler: H,
}

impl<H: StreamingServiceHandler> StreamingServiceServer<H> {
    pub fn new(handler: H) -> Self {
        StreamingServiceServer { handler }
    }

    /// Reads and dispatches one CALL at a time until SHUTDOWN or the
    /// transport closes.
    pub fn serve<T: protobuf_rpc::Transport>(&mut self, transport: &mut T) -> protobuf_rpc::RpcResult<()> {
        loop {
            match transport.read_frame()? {
                protobuf_rpc::Frame::Shutdown => return Ok(()),
                protobuf_rpc::Frame::Call { method, request } => match method.as_str() {
                    "/demo.StreamingService/ServerSide" => match Query::decode(&request) {
                        Ok(req) => {
                            let mut out = protobuf_rpc::SendStream::new(transport);
                            match self.handler.server_side(req, &mut out) {
                                Ok(()) => {
                                    transport.write_frame(&protobuf_rpc::Frame::StreamEnd)?;
                                }
                                Err(e) => {
                                    transport.write_frame(&protobuf_rpc::Frame::Error {
                                        kind: e.kind().to_string(),
                                        message: e.to_string(),
                                    })?;
                                }
                            }
                        }
                        Err(e) => {
                            transport.write_frame(&protobuf_rpc::Frame::Error {
                                kind: "malformed_frame".to_string(),
                                message: e.to_string(),
                            })?;
                        }
                    },
                    other => {
                        transport.write_frame(&protobuf_rpc::Frame::Error {
                            kind: "unknown_method".to_string(),
                            message: other.to_string(),
                        })?;
                    }
                },
                _ => return Err(protobuf_rpc::RpcError::UnexpectedFrameType),
            }
        }
    }
}

/// Splits the query into three indexed results.
pub struct SplitQueryHandler;

impl StreamingServiceHandler for SplitQueryHandler {
    fn server_side<T: protobuf_rpc::Transport>(
        &mut self,
        req: Query,
        out: &mut protobuf_rpc::SendStream<T, QueryResult>,
    ) -> protobuf_rpc::RpcResult<()> {
        for i in 0..3 {
            out.send(&QueryResult { result: format!("{}_{}", req.query, i), index: i, ..Default::default() })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S6: the service descriptor's method carries the package-qualified
    /// full path and the right streaming flags.
    #[test]
    fn service_descriptor_matches_the_declared_rpc_shape() {
        let d = streaming_service_descriptor();
        assert_eq!(d.name, "demo.StreamingService");
        assert_eq!(d.methods.len(), 1);
        assert_eq!(d.methods[0].full_path, "/demo.StreamingService/ServerSide");
        assert!(!d.methods[0].client_streaming);
        assert!(d.methods[0].server_streaming);
    }

    /// S7: a server-streaming call over a duplex pipe yields three
    /// `STREAM_MSG` frames followed by `STREAM_END`.
    #[test]
    fn server_streaming_call_yields_three_indexed_results() {
        let (client_end, mut server_end) = transport::duplex_pair();
        let mut client = StreamingServiceClient::new(client_end);
        let mut server = StreamingServiceServer::new(SplitQueryHandler);

        let mut stream = client.server_side(&Query { query: "q".to_string(), ..Default::default() }).unwrap();

        // one call handled, then the server's next read sees nothing more
        // from this client and reports the connection closed.
        assert_eq!(server.serve(&mut server_end).unwrap_err(), protobuf_rpc::RpcError::ConnectionClosed);

        let mut results = Vec::new();
        while let Some(r) = stream.recv().unwrap() {
            results.push(r);
        }
        assert_eq!(
            results,
            vec![
                QueryResult { result: "q_0".to_string(), index: 0, ..Default::default() },
                QueryResult { result: "q_1".to_string(), index: 1, ..Default::default() },
                QueryResult { result: "q_2".to_string(), index: 2, ..Default::default() },
            ]
        );
    }

    /// An unrecognized method name gets an `unknown_method` `ERROR` frame
    /// rather than terminating the server loop.
    #[test]
    fn unknown_method_gets_an_error_frame_not_a_crash() {
        let (mut client_end, mut server_end) = transport::duplex_pair();
        protobuf_rpc::write_frame(
            &mut client_end,
            &protobuf_rpc::Frame::Call { method: "/demo.StreamingService/Nope".to_string(), request: vec![] },
        )
        .unwrap();

        let mut server = StreamingServiceServer::new(SplitQueryHandler);
        assert_eq!(server.serve(&mut server_end).unwrap_err(), protobuf_rpc::RpcError::ConnectionClosed);

        match protobuf_rpc::read_frame(&mut client_end).unwrap() {
            protobuf_rpc::Frame::Error { kind, message } => {
                assert_eq!(kind, "unknown_method");
                assert_eq!(message, "/demo.StreamingService/Nope");
            }
            other => panic!("expected an Error frame, got {:?}", other),
        }
    }
}
