//! Byte cursor for markup scanning
//!
//! Every search for the next delimiter goes through memchr / memmem, so a
//! long text run or comment is crossed in one SIMD pass. Consuming methods
//! hand back the byte range they crossed; callers turn ranges into `&str`
//! so encoding errors carry document offsets.

use memchr::{memchr, memmem};
use std::ops::Range;

/// Forward-only cursor over one buffer
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Cursor { input, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn bytes(&self, range: Range<usize>) -> &'a [u8] {
        &self.input[range]
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    #[inline]
    pub fn bump(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Consume `prefix` if the input continues with it
    #[inline]
    pub fn eat(&mut self, prefix: &[u8]) -> bool {
        let found = self.input[self.pos..].starts_with(prefix);
        if found {
            self.pos += prefix.len();
        }
        found
    }

    #[inline]
    pub fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Consume character data up to (not including) the next `<`
    #[inline]
    pub fn text_run(&mut self) -> Range<usize> {
        let start = self.pos;
        self.pos = memchr(b'<', &self.input[start..]).map_or(self.input.len(), |i| start + i);
        start..self.pos
    }

    /// Consume up to and including `delim`; the range excludes it
    ///
    /// Without a delimiter the rest of the input is consumed.
    #[inline]
    pub fn take_until(&mut self, delim: u8) -> Range<usize> {
        let start = self.pos;
        match memchr(delim, &self.input[start..]) {
            Some(i) => {
                self.pos = start + i + 1;
                start..start + i
            }
            None => {
                self.pos = self.input.len();
                start..self.pos
            }
        }
    }

    /// Like `take_until` for a multi-byte terminator such as `]]>`
    pub fn take_until_seq(&mut self, terminator: &[u8]) -> Range<usize> {
        let start = self.pos;
        match memmem::find(&self.input[start..], terminator) {
            Some(i) => {
                self.pos = start + i + terminator.len();
                start..start + i
            }
            None => {
                self.pos = self.input.len();
                start..self.pos
            }
        }
    }

    /// Consume an XML name, leaving the cursor untouched if none starts here
    pub fn take_name(&mut self) -> Option<Range<usize>> {
        let start = self.pos;
        if !self.peek().is_some_and(is_name_start_char) {
            return None;
        }
        let len = self.input[start + 1..]
            .iter()
            .position(|&b| !is_name_char(b))
            .map_or(self.input.len() - start, |n| n + 1);
        self.pos = start + len;
        Some(start..self.pos)
    }

    /// Consume through the `>` closing the current tag, skipping quoted `>`
    pub fn skip_tag_rest(&mut self) {
        let mut quote = None;
        while let Some(c) = self.peek() {
            self.pos += 1;
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == b'"' || c == b'\'' => quote = Some(c),
                None if c == b'>' => return,
                None => {}
            }
        }
    }
}

/// XML name start byte; any non-ASCII byte is accepted (UTF-8 continuation)
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

#[inline]
pub fn is_name_char(b: u8) -> bool {
    is_name_start_char(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}
