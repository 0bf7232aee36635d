//! Mapping Declarations
//!
//! The declarative side of the engine:
//! - `path`: path pattern grammar and matching primitives
//! - `value`: field values and the ordered attribute bag
//! - `converter`: pluggable raw-text converters
//! - `spec`: per node-type specifications and their builder
//! - `registry`: resolution of specs into an immutable `Mapping`

pub mod converter;
pub mod path;
pub mod registry;
pub mod spec;
pub mod value;

pub use converter::{BooleanConverter, Converter, DecimalConverter, FnConverter, IntegerConverter, SharedConverter};
pub use path::{PathPattern, Segment, Specificity};
pub use registry::{Mapping, MappingBuilder};
pub use spec::{
    AssignFn, Cardinality, FieldOptions, FieldRule, MapAll, NodePattern, NodeSpec, NodeSpecBuilder, ReadFn,
    RelationOptions, RelationRule,
};
pub use value::{AttributeBag, Value};
