//! Unified Scanner dispatching into a SaxHandler
//!
//! Tokenizes a complete UTF-8 buffer and delivers decoded start/text/end
//! events. Comments, processing instructions, the XML declaration and
//! DOCTYPE are consumed silently; CDATA content is delivered as text.

use super::entities::decode_text;
use super::scanner::{is_name_start_char, Cursor};
use crate::error::MapError;
use crate::sax::{Attribute, SaxHandler};
use std::borrow::Cow;
use std::ops::Range;

/// Tokenizer over one buffer
pub struct UnifiedScanner<'a> {
    cursor: Cursor<'a>,
    /// Offset of this buffer within the whole document (for error positions)
    base: usize,
    /// Attribute buffer reused across start tags
    attrs: Vec<Attribute<'a>>,
}

impl<'a> UnifiedScanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_offset(input, 0)
    }

    /// Scanner for a slice that starts `base` bytes into the document
    pub fn with_offset(input: &'a [u8], base: usize) -> Self {
        Self {
            cursor: Cursor::new(input),
            base,
            attrs: Vec::with_capacity(8),
        }
    }

    /// Scan the entire buffer, stopping at the first handler error
    pub fn scan<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), MapError> {
        while let Some(c) = self.cursor.peek() {
            if c == b'<' {
                self.markup(handler)?;
            } else {
                let run = self.cursor.text_run();
                let raw = self.str_at(run)?;
                handler.text(&decode_text(raw))?;
            }
        }
        Ok(())
    }

    fn markup<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), MapError> {
        let lt = self.cursor.position();
        self.cursor.bump(1);

        if self.cursor.eat(b"/") {
            return self.end_tag(handler);
        }
        if self.cursor.eat(b"!--") {
            self.cursor.take_until_seq(b"-->");
            return Ok(());
        }
        if self.cursor.eat(b"![CDATA[") {
            let content = self.cursor.take_until_seq(b"]]>");
            if content.is_empty() {
                return Ok(());
            }
            let text = self.str_at(content)?;
            return handler.text(text);
        }
        if self.cursor.eat(b"!") {
            self.skip_declaration();
            return Ok(());
        }
        if self.cursor.eat(b"?") {
            self.cursor.take_until_seq(b"?>");
            return Ok(());
        }
        match self.cursor.peek() {
            Some(c) if is_name_start_char(c) => self.start_tag(handler),
            // stray '<' as in "a < b" is literal text
            _ => handler.text(self.str_at(lt..lt + 1)?),
        }
    }

    fn start_tag<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), MapError> {
        let Some(name) = self.cursor.take_name() else {
            return Ok(());
        };
        let name = self.str_at(name)?;
        self.attrs.clear();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                None => return Ok(()),
                Some(b'>') => {
                    self.cursor.bump(1);
                    return handler.start_element(name, &self.attrs);
                }
                Some(b'/') if self.cursor.peek_at(1) == Some(b'>') => {
                    self.cursor.bump(2);
                    handler.start_element(name, &self.attrs)?;
                    return handler.end_element(name);
                }
                Some(c) if is_name_start_char(c) => {
                    if let Some(attr) = self.attribute()? {
                        self.attrs.push(attr);
                    }
                }
                Some(_) => self.cursor.bump(1),
            }
        }
    }

    /// `name="value"`; an attribute without a quoted value is dropped
    fn attribute(&mut self) -> Result<Option<Attribute<'a>>, MapError> {
        let Some(name) = self.cursor.take_name() else {
            return Ok(None);
        };
        self.cursor.skip_whitespace();
        if !self.cursor.eat(b"=") {
            return Ok(None);
        }
        self.cursor.skip_whitespace();

        let quote = match self.cursor.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Ok(None),
        };
        self.cursor.bump(1);
        let value = self.cursor.take_until(quote);

        Ok(Some(Attribute {
            name: Cow::Borrowed(self.str_at(name)?),
            value: decode_text(self.str_at(value)?),
        }))
    }

    fn end_tag<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), MapError> {
        let name = self.cursor.take_name();
        self.cursor.skip_tag_rest();
        match name {
            Some(name) => handler.end_element(self.str_at(name)?),
            None => Ok(()),
        }
    }

    /// Skip DOCTYPE and other `<!` declarations, honouring an internal subset
    fn skip_declaration(&mut self) {
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        while let Some(c) = self.cursor.peek() {
            self.cursor.bump(1);
            match (quote, c) {
                (Some(q), _) if c == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(c),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'>') if depth == 0 => return,
                _ => {}
            }
        }
    }

    /// Borrow a range of the input as UTF-8
    fn str_at(&self, range: Range<usize>) -> Result<&'a str, MapError> {
        let start = range.start;
        std::str::from_utf8(self.cursor.bytes(range)).map_err(|e| MapError::Encoding {
            position: self.base + start + e.valid_up_to(),
        })
    }
}

/// Scan a complete UTF-8 buffer into a handler
pub fn scan_into<H: SaxHandler + ?Sized>(input: &[u8], handler: &mut H) -> Result<(), MapError> {
    UnifiedScanner::new(input).scan(handler)
}
