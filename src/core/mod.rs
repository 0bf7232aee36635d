//! Core XML scanning primitives
//!
//! The building blocks the event source is made of:
//! - Cursor: memchr-backed delimiter search over a byte buffer
//! - Entities: entity decoding with Cow (zero-copy when possible) and escaping
//! - Encoding: BOM handling, UTF-16 detection and conversion to UTF-8
//! - UnifiedScanner: tokenizer dispatching into a SaxHandler

pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod unified_scanner;
