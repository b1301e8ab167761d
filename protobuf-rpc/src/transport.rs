//! The transport seam: nothing in this crate mentions a concrete socket or
//! pipe type, only this trait over `Read + Write`. A TCP stream, Unix
//! socket, or in-process pipe all satisfy it with no adapter code.

use std::io::{Read, Write};

use crate::error::RpcResult;
use crate::frame::Frame;

/// A byte-stream connection frames are read from and written to.
///
/// Blanket-implemented for every `Read + Write` type, so callers never need
/// to write an impl block by hand — only to construct the underlying stream.
pub trait Transport: Read + Write {
    fn read_frame(&mut self) -> RpcResult<Frame> {
        crate::frame::read_frame(self)
    }

    fn write_frame(&mut self, frame: &Frame) -> RpcResult<()> {
        crate::frame::write_frame(self, frame)
    }

    fn flush_transport(&mut self) -> RpcResult<()> {
        Write::flush(self).map_err(|e| crate::error::RpcError::Io(e.to_string()))
    }
}

impl<T: Read + Write + ?Sized> Transport for T {}
