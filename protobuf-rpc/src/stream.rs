//! Stream abstractions over one borrowed [`Transport`].
//!
//! Each of these wraps a single `&mut T` exclusively, so a caller can hold
//! at most one read-side and one write-side view of a connection at a time
//! without the borrow checker seeing them as aliasing — that's why bidi
//! calls get their own combined type instead of a `(SendStream, RecvStream)`
//! pair, which would need two simultaneous `&mut` borrows of the same
//! transport.

use std::marker::PhantomData;

use protobuf::Message;

use crate::error::{RpcError, RpcResult};
use crate::frame::Frame;
use crate::transport::Transport;

/// The write side of a stream of `M` messages.
pub struct SendStream<'a, T: Transport + ?Sized, M: Message> {
    transport: &'a mut T,
    closed: bool,
    _marker: PhantomData<M>,
}

impl<'a, T: Transport + ?Sized, M: Message> SendStream<'a, T, M> {
    pub fn new(transport: &'a mut T) -> Self {
        SendStream { transport, closed: false, _marker: PhantomData }
    }

    /// Encodes `msg` and writes it as one `STREAM_MSG` frame.
    pub fn send(&mut self, msg: &M) -> RpcResult<()> {
        if self.closed {
            return Err(RpcError::ConnectionClosed);
        }
        self.transport.write_frame(&Frame::StreamMsg(msg.encode_to_vec()))
    }

    /// Writes a `STREAM_END`, marking this direction finished.
    pub fn close(mut self) -> RpcResult<()> {
        self.closed = true;
        self.transport.write_frame(&Frame::StreamEnd)
    }
}

/// The read side of a stream of `M` messages.
pub struct RecvStream<'a, T: Transport + ?Sized, M: Message> {
    transport: &'a mut T,
    done: bool,
    _marker: PhantomData<M>,
}

impl<'a, T: Transport + ?Sized, M: Message> RecvStream<'a, T, M> {
    pub fn new(transport: &'a mut T) -> Self {
        RecvStream { transport, done: false, _marker: PhantomData }
    }

    /// Returns the next streamed message, or `None` once `STREAM_END` has
    /// been seen. Errors on an `ERROR` frame or any other unexpected type.
    pub fn recv(&mut self) -> RpcResult<Option<M>> {
        if self.done {
            return Ok(None);
        }
        match self.transport.read_frame()? {
            Frame::StreamMsg(bytes) => Ok(Some(M::decode(&bytes)?)),
            Frame::StreamEnd => {
                self.done = true;
                Ok(None)
            }
            Frame::Error { kind, message } => {
                self.done = true;
                Err(RpcError::Status { kind, message })
            }
            _ => Err(RpcError::UnexpectedFrameType),
        }
    }
}

/// A client-streaming call in progress: the client sends zero or more
/// requests, then [`finish`](Self::finish) closes the stream and awaits the
/// single response. This composite type is what a synchronous runtime
/// returns in place of a future the caller would otherwise await.
pub struct ClientStreamingCall<'a, T: Transport + ?Sized, Req: Message, Resp: Message> {
    transport: &'a mut T,
    _req: PhantomData<Req>,
    _resp: PhantomData<Resp>,
}

impl<'a, T: Transport + ?Sized, Req: Message, Resp: Message> ClientStreamingCall<'a, T, Req, Resp> {
    pub fn new(transport: &'a mut T) -> Self {
        ClientStreamingCall { transport, _req: PhantomData, _resp: PhantomData }
    }

    pub fn send(&mut self, msg: &Req) -> RpcResult<()> {
        self.transport.write_frame(&Frame::StreamMsg(msg.encode_to_vec()))
    }

    /// Writes `STREAM_END` and blocks for the server's single `RESPONSE`.
    pub fn finish(self) -> RpcResult<Resp> {
        self.transport.write_frame(&Frame::StreamEnd)?;
        match self.transport.read_frame()? {
            Frame::Response(bytes) => Ok(Resp::decode(&bytes)?),
            Frame::Error { kind, message } => Err(RpcError::Status { kind, message }),
            _ => Err(RpcError::UnexpectedFrameType),
        }
    }
}

/// A bidirectional-streaming call: both directions share the one
/// transport, so sends and receives must be interleaved explicitly by the
/// caller rather than driven from two independent handles.
pub struct BidiCall<'a, T: Transport + ?Sized, Req: Message, Resp: Message> {
    transport: &'a mut T,
    recv_done: bool,
    _req: PhantomData<Req>,
    _resp: PhantomData<Resp>,
}

impl<'a, T: Transport + ?Sized, Req: Message, Resp: Message> BidiCall<'a, T, Req, Resp> {
    pub fn new(transport: &'a mut T) -> Self {
        BidiCall { transport, recv_done: false, _req: PhantomData, _resp: PhantomData }
    }

    pub fn send(&mut self, msg: &Req) -> RpcResult<()> {
        self.transport.write_frame(&Frame::StreamMsg(msg.encode_to_vec()))
    }

    pub fn close_send(&mut self) -> RpcResult<()> {
        self.transport.write_frame(&Frame::StreamEnd)
    }

    pub fn recv(&mut self) -> RpcResult<Option<Resp>> {
        if self.recv_done {
            return Ok(None);
        }
        match self.transport.read_frame()? {
            Frame::StreamMsg(bytes) => Ok(Some(Resp::decode(&bytes)?)),
            Frame::StreamEnd => {
                self.recv_done = true;
                Ok(None)
            }
            Frame::Error { kind, message } => {
                self.recv_done = true;
                Err(RpcError::Status { kind, message })
            }
            _ => Err(RpcError::UnexpectedFrameType),
        }
    }
}
