//! Chunked XML Scanner
//!
//! Stateful scanner that accepts a document in arbitrary chunks with
//! bounded memory. Each feed dispatches events up to the last safe
//! boundary (the end of a complete markup construct) and keeps the
//! unfinished tail for the next chunk.

use crate::core::encoding::{strip_utf8_bom, XmlEncoding};
use crate::core::unified_scanner::UnifiedScanner;
use crate::error::MapError;
use crate::sax::SaxHandler;
use memchr::{memchr, memmem};

/// Push-style scanner over a chunked document
#[derive(Debug, Default)]
pub struct ChunkedScanner {
    /// Accumulated bytes not yet dispatched
    buffer: Vec<u8>,
    /// Bytes already dispatched (document offset of `buffer[0]`)
    consumed: usize,
    /// Whether the first chunk (and its BOM) has been seen
    started: bool,
}

impl ChunkedScanner {
    pub fn new() -> Self {
        Self::with_capacity(8192)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ChunkedScanner {
            buffer: Vec::with_capacity(capacity),
            consumed: 0,
            started: false,
        }
    }

    /// Feed a chunk of data, dispatching every complete construct
    pub fn feed<H: SaxHandler + ?Sized>(&mut self, chunk: &[u8], handler: &mut H) -> Result<(), MapError> {
        if !self.started {
            if self.buffer.len() + chunk.len() < 3 {
                // Not enough bytes to rule out a BOM yet
                self.buffer.extend_from_slice(chunk);
                return Ok(());
            }
            self.started = true;
            self.buffer.extend_from_slice(chunk);
            if XmlEncoding::detect(&self.buffer).is_utf16() {
                return Err(MapError::UnsupportedEncoding(
                    "UTF-16 documents must be supplied as a whole buffer".to_string(),
                ));
            }
            let bom = self.buffer.len() - strip_utf8_bom(&self.buffer).len();
            self.buffer.drain(..bom);
            self.consumed += bom;
        } else {
            self.buffer.extend_from_slice(chunk);
        }

        let boundary = find_safe_boundary(&self.buffer);
        if boundary == 0 {
            return Ok(()); // Not enough data
        }

        UnifiedScanner::with_offset(&self.buffer[..boundary], self.consumed).scan(handler)?;

        // Remove processed bytes (moves the tail to the front, no reallocation)
        self.buffer.drain(..boundary);
        self.consumed += boundary;
        Ok(())
    }

    /// Dispatch whatever remains (trailing text, unterminated constructs)
    pub fn finish<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), MapError> {
        if !self.started && XmlEncoding::detect(&self.buffer).is_utf16() {
            return Err(MapError::UnsupportedEncoding(
                "UTF-16 documents must be supplied as a whole buffer".to_string(),
            ));
        }
        self.started = true;

        let remaining = std::mem::take(&mut self.buffer);
        let input = strip_utf8_bom(&remaining);
        let bom = remaining.len() - input.len();
        UnifiedScanner::with_offset(input, self.consumed + bom).scan(handler)?;
        self.consumed += remaining.len();
        Ok(())
    }

    /// Bytes buffered but not yet dispatched
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes the buffer can hold before it reallocates
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Check if there's unprocessed data
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Total bytes dispatched so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

/// Find the end of the last complete markup construct in `buf`
///
/// `buf` must start outside any markup. Text after the returned boundary is
/// held back so a text run is never split at a chunk edge.
pub fn find_safe_boundary(buf: &[u8]) -> usize {
    let mut safe = 0;
    let mut pos = 0;

    while pos < buf.len() {
        // Text: jump to the next '<'
        let lt = match memchr(b'<', &buf[pos..]) {
            Some(offset) => pos + offset,
            None => break,
        };
        let rest = &buf[lt..];

        let end = if rest.starts_with(b"<!--") {
            memmem::find(&rest[4..], b"-->").map(|i| lt + 4 + i + 3)
        } else if rest.starts_with(b"<![CDATA[") {
            memmem::find(&rest[9..], b"]]>").map(|i| lt + 9 + i + 3)
        } else if rest.starts_with(b"<?") {
            memmem::find(&rest[2..], b"?>").map(|i| lt + 2 + i + 2)
        } else if rest.starts_with(b"<!") {
            find_declaration_end(rest).map(|i| lt + i + 1)
        } else {
            find_tag_end(rest).map(|i| lt + i + 1)
        };

        match end {
            Some(end) => {
                safe = end;
                pos = end;
            }
            None => break,
        }
    }

    safe
}

/// Position of the '>' closing a tag, ignoring '>' inside quoted values
fn find_tag_end(tag: &[u8]) -> Option<usize> {
    let mut in_single = false;
    let mut in_double = false;

    for (i, &b) in tag.iter().enumerate() {
        match b {
            b'"' if !in_single => in_double = !in_double,
            b'\'' if !in_double => in_single = !in_single,
            b'>' if !in_single && !in_double => return Some(i),
            _ => {}
        }
    }
    None
}

/// Position of the '>' closing a `<!...>` declaration with an optional internal subset
fn find_declaration_end(decl: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;

    for (i, &b) in decl.iter().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'[') => depth += 1,
            (None, b']') => depth = depth.saturating_sub(1),
            (None, b'>') if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}
