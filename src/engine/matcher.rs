//! Path Matcher
//!
//! Finds the best rule of a spec for a path relative to the object boundary.
//! Ranking: all-literal paths, then attribute-conditioned paths, then
//! wildcard paths; ties go to declaration order.
//!
//! The structural part of a match depends only on (spec, path), so the
//! ranked candidate list is kept in an LRU cache. Attribute conditions
//! depend on the document and are checked on every lookup.

use crate::mapping::{Mapping, NodePattern, NodeSpec, RelationRule};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default number of cached (spec, path) entries
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// A relation rule matched at an element boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationMatch {
    /// Index into the spec's relation rules
    pub rule: usize,
    /// Index of the pattern that matched
    pub pattern: usize,
    /// Concrete related type chosen for the element
    pub type_id: usize,
}

/// Ranked rules whose paths match structurally
#[derive(Debug, Default)]
struct Candidates {
    fields: Vec<usize>,
    /// (rule index, pattern index)
    relations: Vec<(usize, usize)>,
}

/// Rule lookup with a per-parse candidate cache
pub struct PathMatcher {
    cache: Option<LruCache<(usize, String), Arc<Candidates>>>,
    hits: u64,
    misses: u64,
}

impl PathMatcher {
    /// `capacity` of zero disables caching
    pub fn new(capacity: usize) -> Self {
        PathMatcher {
            cache: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
        }
    }

    /// Best field rule for an element's text (`attribute` = None) or one of its attributes
    pub fn match_field<F>(
        &mut self,
        spec: &NodeSpec,
        tags: &[&str],
        attribute: Option<&str>,
        mut attr_equals: F,
    ) -> Option<usize>
    where
        F: FnMut(usize, &str, &str) -> bool,
    {
        let candidates = self.candidates(spec, tags, attribute);
        candidates
            .fields
            .iter()
            .copied()
            .find(|&idx| spec.fields()[idx].path.conditions_hold(&mut attr_equals))
    }

    /// Best relation rule for an element that just opened, with its concrete type
    pub fn match_relation<F>(
        &mut self,
        mapping: &Mapping,
        spec: &NodeSpec,
        tags: &[&str],
        mut attr_equals: F,
    ) -> Option<RelationMatch>
    where
        F: FnMut(usize, &str, &str) -> bool,
    {
        let tag = tags.last()?;
        let candidates = self.candidates(spec, tags, None);
        candidates.relations.iter().find_map(|&(rule, pattern)| {
            let relation = &spec.relations()[rule];
            if !relation.paths[pattern].conditions_hold(&mut attr_equals) {
                return None;
            }
            select_type(mapping, relation, tag).map(|type_id| RelationMatch {
                rule,
                pattern,
                type_id,
            })
        })
    }

    pub fn cache_hits(&self) -> u64 {
        self.hits
    }

    pub fn cache_misses(&self) -> u64 {
        self.misses
    }

    fn candidates(&mut self, spec: &NodeSpec, tags: &[&str], attribute: Option<&str>) -> Arc<Candidates> {
        let Some(cache) = self.cache.as_mut() else {
            self.misses += 1;
            return Arc::new(rank(spec, tags, attribute));
        };

        let key = (spec.id(), path_key(tags, attribute));
        if let Some(found) = cache.get(&key) {
            self.hits += 1;
            return Arc::clone(found);
        }

        self.misses += 1;
        let ranked = Arc::new(rank(spec, tags, attribute));
        cache.put(key, Arc::clone(&ranked));
        ranked
    }
}

/// Pick the related type whose node pattern accepts `tag`: literal names
/// first, then wildcard types, each in declaration order
pub fn select_type(mapping: &Mapping, relation: &RelationRule, tag: &str) -> Option<usize> {
    let literal = relation.type_ids.iter().copied().find(|&id| {
        matches!(mapping.spec(id).node(), Some(NodePattern::Literal(name)) if name == tag)
    });
    literal.or_else(|| {
        relation
            .type_ids
            .iter()
            .copied()
            .find(|&id| matches!(mapping.spec(id).node(), Some(NodePattern::Any)))
    })
}

fn rank(spec: &NodeSpec, tags: &[&str], attribute: Option<&str>) -> Candidates {
    let mut fields: Vec<usize> = spec
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| f.path.matches_structure(tags, attribute))
        .map(|(idx, _)| idx)
        .collect();
    // stable: declaration order breaks ties
    fields.sort_by_key(|&idx| spec.fields()[idx].path.specificity());

    let mut relations = Vec::new();
    if attribute.is_none() && !tags.is_empty() {
        for (rule, relation) in spec.relations().iter().enumerate() {
            for (pattern, path) in relation.paths.iter().enumerate() {
                if path.matches_structure(tags, None) {
                    relations.push((rule, pattern));
                }
            }
        }
        relations.sort_by_key(|&(rule, pattern)| spec.relations()[rule].paths[pattern].specificity());
    }

    Candidates { fields, relations }
}

fn path_key(tags: &[&str], attribute: Option<&str>) -> String {
    let mut key = tags.join("/");
    if let Some(attr) = attribute {
        key.push_str("/@");
        key.push_str(attr);
    }
    key
}
