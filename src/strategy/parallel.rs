//! Parallel Document Mapping
//!
//! Uses Rayon to map many independent documents at once. Each document gets
//! its own engine; the `Mapping` is shared read-only across workers.

use crate::collector::NaiveCollector;
use crate::engine::{MappingParser, ParseOptions};
use crate::error::{DeclarationError, MapError};
use crate::mapping::Mapping;
use crate::object::MappedObject;
use rayon::prelude::*;

/// Per-document outcome, in input order
pub type DocumentResult = Result<Vec<MappedObject>, MapError>;

/// Map every document in parallel
///
/// Root types are checked once up front; a failure in one document does
/// not affect the others.
pub fn map_documents<D>(
    mapping: &Mapping,
    roots: &[&str],
    docs: &[D],
    options: &ParseOptions,
) -> Result<Vec<DocumentResult>, DeclarationError>
where
    D: AsRef<[u8]> + Sync,
{
    mapping.resolve_roots(roots)?;

    Ok(docs
        .par_iter()
        .map(|doc| map_one(mapping, roots, doc.as_ref(), options))
        .collect())
}

fn map_one(mapping: &Mapping, roots: &[&str], doc: &[u8], options: &ParseOptions) -> DocumentResult {
    let mut parser = MappingParser::new(mapping, roots, NaiveCollector::new())?.with_options(options.clone());
    parser.parse_bytes(doc)?;
    Ok(parser.into_collector().into_objects())
}
