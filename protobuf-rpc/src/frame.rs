//! The RPC frame codec: `[1-byte type][4-byte BE payload length][payload]`
//! over a symmetric duplex byte stream.

use std::io::{Read, Write};

use crate::error::{RpcError, RpcResult};

const CALL: u8 = 0x01;
const RESPONSE: u8 = 0x02;
const STREAM_MSG: u8 = 0x03;
const STREAM_END: u8 = 0x04;
const ERROR: u8 = 0x05;
const SHUTDOWN: u8 = 0x06;

/// One frame of the RPC wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Call { method: String, request: Vec<u8> },
    Response(Vec<u8>),
    StreamMsg(Vec<u8>),
    StreamEnd,
    Error { kind: String, message: String },
    Shutdown,
}

/// Serializes a frame to its wire bytes (header + payload).
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let (tag, payload) = match frame {
        Frame::Call { method, request } => {
            let mut payload = Vec::with_capacity(4 + method.len() + request.len());
            payload.extend_from_slice(&(method.len() as u32).to_be_bytes());
            payload.extend_from_slice(method.as_bytes());
            payload.extend_from_slice(request);
            (CALL, payload)
        }
        Frame::Response(bytes) => (RESPONSE, bytes.clone()),
        Frame::StreamMsg(bytes) => (STREAM_MSG, bytes.clone()),
        Frame::StreamEnd => (STREAM_END, Vec::new()),
        Frame::Error { kind, message } => (ERROR, format!("{}: {}", kind, message).into_bytes()),
        Frame::Shutdown => (SHUTDOWN, Vec::new()),
    };
    let mut out = Vec::with_capacity(5 + payload.len());
    out.push(tag);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Parses one complete frame (header + payload already in hand) out of
/// `bytes`. Used by [`read_frame`]; exposed directly for the round-trip
/// property test.
pub fn parse_frame(bytes: &[u8]) -> RpcResult<Frame> {
    if bytes.len() < 5 {
        return Err(RpcError::Malformed("frame shorter than its 5-byte header".to_string()));
    }
    let tag = bytes[0];
    let len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
    let payload = bytes
        .get(5..5 + len)
        .ok_or_else(|| RpcError::Malformed("payload length exceeds frame buffer".to_string()))?;
    match tag {
        CALL => parse_call_payload(payload),
        RESPONSE => Ok(Frame::Response(payload.to_vec())),
        STREAM_MSG => Ok(Frame::StreamMsg(payload.to_vec())),
        STREAM_END => Ok(Frame::StreamEnd),
        ERROR => Ok(parse_error_payload(payload)),
        SHUTDOWN => Ok(Frame::Shutdown),
        other => Err(RpcError::Malformed(format!("unknown frame type byte 0x{:02x}", other))),
    }
}

fn parse_call_payload(payload: &[u8]) -> RpcResult<Frame> {
    if payload.len() < 4 {
        return Err(RpcError::Malformed("CALL payload shorter than its method-length prefix".to_string()));
    }
    let method_len = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
    let rest = &payload[4..];
    if rest.len() < method_len {
        return Err(RpcError::Malformed("CALL method length exceeds payload".to_string()));
    }
    let method = String::from_utf8(rest[..method_len].to_vec())
        .map_err(|_| RpcError::Malformed("CALL method name is not valid UTF-8".to_string()))?;
    let request = rest[method_len..].to_vec();
    Ok(Frame::Call { method, request })
}

fn parse_error_payload(payload: &[u8]) -> Frame {
    let text = String::from_utf8_lossy(payload);
    match text.split_once(": ") {
        Some((kind, message)) => Frame::Error { kind: kind.to_string(), message: message.to_string() },
        None => Frame::Error { kind: String::new(), message: text.into_owned() },
    }
}

/// Reads exactly one frame off `r`, blocking until its header and payload
/// have both arrived. An EOF on the header read means the peer closed the
/// connection cleanly between frames.
pub fn read_frame<R: Read>(r: &mut R) -> RpcResult<Frame> {
    let mut header = [0u8; 5];
    match r.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(RpcError::ConnectionClosed),
        Err(e) => return Err(RpcError::Io(e.to_string())),
    }
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload).map_err(|e| RpcError::Io(e.to_string()))?;
    let mut full = Vec::with_capacity(5 + len);
    full.push(header[0]);
    full.extend_from_slice(&header[1..5]);
    full.extend_from_slice(&payload);
    parse_frame(&full)
}

/// Writes one frame to `w` and flushes it so the peer sees it immediately.
pub fn write_frame<W: Write>(w: &mut W, frame: &Frame) -> RpcResult<()> {
    w.write_all(&encode_frame(frame)).map_err(|e| RpcError::Io(e.to_string()))?;
    w.flush().map_err(|e| RpcError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frames() -> Vec<Frame> {
        vec![
            Frame::Call { method: "/Svc/Method".to_string(), request: vec![1, 2, 3] },
            Frame::Call { method: String::new(), request: Vec::new() },
            Frame::Response(vec![9, 9]),
            Frame::StreamMsg(vec![]),
            Frame::StreamEnd,
            Frame::Error { kind: "status_error".to_string(), message: "bad query".to_string() },
            Frame::Shutdown,
        ]
    }

    #[test]
    fn round_trips_every_frame_kind() {
        for f in sample_frames() {
            let bytes = encode_frame(&f);
            assert_eq!(parse_frame(&bytes).unwrap(), f);
        }
    }

    #[test]
    fn read_frame_reads_from_a_cursor() {
        let f = Frame::Call { method: "/Svc/Method".to_string(), request: vec![7, 8] };
        let bytes = encode_frame(&f);
        let mut cursor = std::io::Cursor::new(bytes);
        assert_eq!(read_frame(&mut cursor).unwrap(), f);
    }

    #[test]
    fn read_frame_on_empty_stream_is_connection_closed() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        assert_eq!(read_frame(&mut cursor).unwrap_err(), RpcError::ConnectionClosed);
    }

    #[test]
    fn truncated_frame_is_malformed_not_panicking() {
        assert!(matches!(parse_frame(&[CALL, 0, 0, 0]), Err(RpcError::Malformed(_))));
        assert!(matches!(parse_frame(&[CALL, 0, 0, 0, 10]), Err(RpcError::Malformed(_))));
    }

    #[test]
    fn unknown_tag_byte_is_malformed() {
        assert!(matches!(parse_frame(&[0x7f, 0, 0, 0, 0]), Err(RpcError::Malformed(_))));
    }

    #[test]
    fn error_payload_round_trips_kind_and_message() {
        let f = Frame::Error { kind: "unknown_method".to_string(), message: "/Svc/Nope".to_string() };
        assert_eq!(parse_frame(&encode_frame(&f)).unwrap(), f);
    }

    #[test]
    fn call_frame_header_is_big_endian() {
        let f = Frame::Call { method: "m".to_string(), request: vec![] };
        let bytes = encode_frame(&f);
        // tag(1) + len(4) + method_len(4) + "m"(1) == 10
        assert_eq!(bytes[0], CALL);
        assert_eq!(&bytes[1..5], &5u32.to_be_bytes());
    }
}
