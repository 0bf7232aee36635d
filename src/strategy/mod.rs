//! Mapping Strategy Module
//!
//! Ways to drive the engine beyond a single parser:
//! - Parallel: many independent documents on the Rayon pool

pub mod parallel;

pub use parallel::{map_documents, DocumentResult};
