//! Mapping Engine
//!
//! Drives SAX events from any of the crate's input strategies into a
//! `HandlerStack`:
//! - `parse_str` / `parse_bytes`: whole documents already in memory
//! - `parse_reader`: any `std::io::Read`, read through a fixed buffer
//! - `feed` / `finish`: push-style chunks
//! - `parse_events`: pre-tokenized `SaxEvent`s

pub mod element_stack;
pub mod handler_stack;
pub mod matcher;

pub use handler_stack::HandlerStack;
pub use matcher::{PathMatcher, RelationMatch, DEFAULT_CACHE_CAPACITY};

use crate::collector::Collector;
use crate::core::encoding::to_utf8;
use crate::core::unified_scanner::scan_into;
use crate::error::{DeclarationError, MapError};
use crate::mapping::Mapping;
use crate::reader::{BufferedReader, ChunkedScanner, DEFAULT_BUFFER_SIZE};
use crate::sax::{replay, SaxEvent};
use std::io::Read;

/// Per-parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Trim surrounding whitespace from element text before it is stored
    pub trim_text: bool,
    /// Entries in the (spec, path) match cache; 0 disables the cache
    pub match_cache_capacity: usize,
    /// Buffer size used by `parse_reader`
    pub read_buffer_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            trim_text: false,
            match_cache_capacity: DEFAULT_CACHE_CAPACITY,
            read_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Counters accumulated over the parser's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub objects_built: u64,
    pub objects_collected: u64,
    /// Deepest object nesting seen
    pub max_depth: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// Streaming mapper from XML to objects
///
/// One parser handles one document at a time; it may be reused for further
/// documents after a parse completes or fails.
pub struct MappingParser<'m, C: Collector> {
    handler: HandlerStack<'m, C>,
    chunked: ChunkedScanner,
}

impl<'m, C: Collector> MappingParser<'m, C> {
    /// Parser opening top-level objects for the `roots` types
    pub fn new(mapping: &'m Mapping, roots: &[&str], collector: C) -> Result<Self, DeclarationError> {
        let roots = mapping.resolve_roots(roots)?;
        let options = ParseOptions::default();
        Ok(MappingParser {
            chunked: ChunkedScanner::with_capacity(options.read_buffer_size),
            handler: HandlerStack::new(mapping, roots, collector, options),
        })
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.chunked = ChunkedScanner::with_capacity(options.read_buffer_size);
        self.handler.set_options(options);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        self.handler.options()
    }

    /// Map a complete document held in a string
    pub fn parse_str(&mut self, xml: &str) -> Result<(), MapError> {
        self.parse_bytes(xml.as_bytes())
    }

    /// Map a complete document; UTF-16 input is converted first
    pub fn parse_bytes(&mut self, xml: &[u8]) -> Result<(), MapError> {
        let result = to_utf8(xml).and_then(|utf8| scan_into(&utf8, &mut self.handler));
        self.complete(result)
    }

    /// Map a document read incrementally from `reader`
    pub fn parse_reader<R: Read>(&mut self, reader: R) -> Result<(), MapError> {
        let capacity = self.handler.options().read_buffer_size;
        let result = BufferedReader::with_capacity(reader, capacity).scan(&mut self.handler);
        self.complete(result)
    }

    /// Map a pre-tokenized event stream
    pub fn parse_events<'e, I>(&mut self, events: I) -> Result<(), MapError>
    where
        I: IntoIterator<Item = &'e SaxEvent>,
    {
        let result = replay(events, &mut self.handler);
        self.complete(result)
    }

    /// Push the next chunk of a document
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), MapError> {
        let result = self.chunked.feed(chunk, &mut self.handler);
        if result.is_err() {
            self.abort();
        }
        result
    }

    /// Flush the pushed document and finish it
    pub fn finish(&mut self) -> Result<(), MapError> {
        let result = self.chunked.finish(&mut self.handler);
        self.chunked = ChunkedScanner::with_capacity(self.handler.options().read_buffer_size);
        self.complete(result)
    }

    pub fn stats(&self) -> EngineStats {
        self.handler.stats()
    }

    pub fn collector(&self) -> &C {
        self.handler.collector()
    }

    pub fn collector_mut(&mut self) -> &mut C {
        self.handler.collector_mut()
    }

    pub fn into_collector(self) -> C {
        self.handler.into_collector()
    }

    fn complete(&mut self, result: Result<(), MapError>) -> Result<(), MapError> {
        match result {
            Ok(()) => {
                self.handler.finish();
                Ok(())
            }
            Err(err) => {
                self.abort();
                Err(err)
            }
        }
    }

    fn abort(&mut self) {
        self.handler.reset();
        self.chunked = ChunkedScanner::with_capacity(self.handler.options().read_buffer_size);
    }
}
