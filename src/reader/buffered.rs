//! Buffered XML Reader
//!
//! Reads XML from any source implementing Read, pushing fixed-size chunks
//! through a ChunkedScanner so the whole document is never held in memory.

use super::chunked::ChunkedScanner;
use crate::core::encoding::{to_utf8, XmlEncoding};
use crate::core::unified_scanner::scan_into;
use crate::error::MapError;
use crate::sax::SaxHandler;
use std::io::{ErrorKind, Read};

/// Buffer size for reading chunks
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Buffered XML reader for streaming input
pub struct BufferedReader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: Read> BufferedReader<R> {
    /// Create a new buffered reader
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    /// Create a new buffered reader with specified buffer capacity
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        BufferedReader {
            reader,
            buffer: vec![0u8; capacity.max(16)],
        }
    }

    /// Read the source to the end, dispatching events as chunks arrive
    pub fn scan<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), MapError> {
        let mut scanner = ChunkedScanner::with_capacity(self.buffer.len());
        let mut first = true;

        loop {
            let read = match self.reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if first {
                first = false;
                if XmlEncoding::detect(&self.buffer[..read]).is_utf16() {
                    return self.scan_utf16(read, handler);
                }
            }
            scanner.feed(&self.buffer[..read], handler)?;
        }

        scanner.finish(handler)
    }

    /// UTF-16 cannot be split on byte boundaries; read it whole and convert
    fn scan_utf16<H: SaxHandler + ?Sized>(&mut self, read: usize, handler: &mut H) -> Result<(), MapError> {
        log::warn!("UTF-16 input detected; buffering the whole document before mapping");

        let mut whole = self.buffer[..read].to_vec();
        self.reader.read_to_end(&mut whole)?;
        let utf8 = to_utf8(&whole)?;
        scan_into(&utf8, handler)
    }
}
