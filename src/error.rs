//! Error types for mapping declaration and parsing
//!
//! Two families:
//! - `DeclarationError`: raised while a `Mapping` is being built, before any
//!   document is read.
//! - `MapError`: raised while a document is being mapped. Every variant is
//!   fatal; the engine stops requesting events once one is returned.

use thiserror::Error;

/// A malformed mapping declaration, detected at registration time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("node type '{0}' is registered more than once")]
    DuplicateType(String),

    #[error("node type '{child}' extends unknown type '{parent}'")]
    UnknownParent { child: String, parent: String },

    #[error("inheritance cycle through node type '{0}'")]
    InheritanceCycle(String),

    #[error("relation '{relation}' on '{owner}' refers to unknown type '{target}'")]
    UnknownRelatedType {
        owner: String,
        relation: String,
        target: String,
    },

    #[error("relation '{relation}' on '{owner}' declares no related types")]
    EmptyRelatedTypes { owner: String, relation: String },

    #[error("root type '{0}' is not registered")]
    UnknownRoot(String),

    #[error("root type '{0}' declares no node name and can never match an element")]
    RootWithoutNode(String),

    #[error("invalid path '{path}' on '{owner}': {reason}")]
    InvalidPath {
        owner: String,
        path: String,
        reason: &'static str,
    },
}

/// A fatal error raised while mapping a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("relation '{relation}' on <{node_name}> ({parent_type}, element #{element_index}) matched more than once")]
    AmbiguousRelation {
        parent_type: String,
        node_name: String,
        /// Ordinal of the parent's start tag in the document (0-based)
        element_index: u64,
        relation: String,
    },

    #[error("cannot convert '{raw}' at '{path}': {message}")]
    Conversion {
        path: String,
        raw: String,
        message: String,
    },

    #[error("cannot format field '{key}' of <{node_name}>: converter has no textual form for {value}")]
    Format {
        node_name: String,
        key: String,
        value: String,
    },

    #[error("invalid UTF-8 in document at byte {position}")]
    Encoding { position: usize },

    #[error("unsupported document encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("I/O error while reading document: {0}")]
    Io(String),

    #[error(transparent)]
    Declaration(#[from] DeclarationError),
}

impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        MapError::Io(err.to_string())
    }
}

/// Failure reported by a value converter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ConversionError(pub String);

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        ConversionError(message.into())
    }
}
