use std::fmt;

/// Errors surfaced by the frame codec, the stream abstractions and generated
/// `Client`/`Server` dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The transport was closed (EOF, or the other side hung up) while a
    /// send or receive was in flight.
    ConnectionClosed,
    /// An `ERROR` frame from the peer, carrying its short kind and message.
    Status { kind: String, message: String },
    /// A `CALL` frame named a method this service's dispatch table doesn't
    /// have a thunk for.
    UnknownMethod(String),
    /// A frame arrived that the receiving stream/call shape can't make
    /// sense of (e.g. a `RESPONSE` where a `STREAM_MSG` was expected).
    UnexpectedFrameType,
    /// The frame header or a `CALL` payload's length prefix didn't add up;
    /// this terminates the read loop rather than being retried.
    Malformed(String),
    /// The underlying transport reported an I/O failure.
    Io(String),
    /// A message failed to decode off a frame payload.
    Codec(protobuf::CodecError),
}

impl RpcError {
    /// The short `kind` string used in outgoing `ERROR` frame payloads and
    /// in [`Status`](RpcError::Status) round-trips.
    pub fn kind(&self) -> &str {
        match self {
            RpcError::ConnectionClosed => "connection_closed",
            RpcError::Status { kind, .. } => kind,
            RpcError::UnknownMethod(_) => "unknown_method",
            RpcError::UnexpectedFrameType => "unexpected_frame_type",
            RpcError::Malformed(_) => "malformed_frame",
            RpcError::Io(_) => "io_error",
            RpcError::Codec(_) => "codec_error",
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::ConnectionClosed => write!(f, "connection closed"),
            RpcError::Status { kind, message } => write!(f, "{}: {}", kind, message),
            RpcError::UnknownMethod(m) => write!(f, "unknown method: {}", m),
            RpcError::UnexpectedFrameType => write!(f, "unexpected frame type"),
            RpcError::Malformed(m) => write!(f, "malformed frame: {}", m),
            RpcError::Io(m) => write!(f, "io error: {}", m),
            RpcError::Codec(e) => write!(f, "codec error: {}", e),
        }
    }
}

impl std::error::Error for RpcError {}

impl From<protobuf::CodecError> for RpcError {
    fn from(e: protobuf::CodecError) -> RpcError {
        RpcError::Codec(e)
    }
}

pub type RpcResult<T> = Result<T, RpcError>;
