//! XML Reader Module
//!
//! Incremental input strategies:
//! - ChunkedScanner: push-style scanner for documents arriving in pieces
//! - BufferedReader: pull from any `std::io::Read` through a fixed buffer

pub mod buffered;
pub mod chunked;

pub use buffered::{BufferedReader, DEFAULT_BUFFER_SIZE};
pub use chunked::ChunkedScanner;
