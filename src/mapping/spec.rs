//! Node specifications
//!
//! A `NodeSpec` is the declarative table for one node type: which element
//! opens it, which sub-paths fill which attributes, which sub-paths spawn
//! related objects. Specs are assembled with `NodeSpec::builder` and
//! resolved together by `Mapping::builder`.

use super::converter::{Converter, SharedConverter};
use super::path::PathPattern;
use super::value::{AttributeBag, Value};
use crate::error::DeclarationError;
use std::fmt;
use std::sync::Arc;

/// Custom write used instead of storing the value under the field key
pub type AssignFn = fn(&mut AttributeBag, Value);

/// Custom read used by the writer instead of looking up the field key
pub type ReadFn = fn(&AttributeBag) -> Option<Value>;

/// Which element names open an object of this type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePattern {
    Literal(String),
    /// `*`: any element
    Any,
}

impl NodePattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == "*" {
            NodePattern::Any
        } else {
            NodePattern::Literal(pattern.to_string())
        }
    }

    #[inline]
    pub fn accepts(&self, tag: &str) -> bool {
        match self {
            NodePattern::Literal(name) => name == tag,
            NodePattern::Any => true,
        }
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, NodePattern::Literal(_))
    }
}

/// Optional behaviour attached to a field
#[derive(Clone, Default)]
pub struct FieldOptions {
    converter: Option<SharedConverter>,
    cdata: bool,
    assign: Option<AssignFn>,
    read: Option<ReadFn>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert raw text with `converter` before storing it
    pub fn converter<C: Converter + 'static>(mut self, converter: C) -> Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    pub fn shared_converter(mut self, converter: SharedConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Serialize the value inside a CDATA section
    pub fn cdata(mut self) -> Self {
        self.cdata = true;
        self
    }

    /// Store the value through `assign` rather than under the field key
    pub fn assign(mut self, assign: AssignFn) -> Self {
        self.assign = Some(assign);
        self
    }

    /// Read the value back through `read` when serializing
    pub fn read(mut self, read: ReadFn) -> Self {
        self.read = Some(read);
        self
    }
}

/// Maps a path to one attribute of the owning object
#[derive(Clone)]
pub struct FieldRule {
    pub key: String,
    pub path: PathPattern,
    pub converter: Option<SharedConverter>,
    pub cdata: bool,
    pub assign: Option<AssignFn>,
    pub read: Option<ReadFn>,
}

impl FieldRule {
    /// Current value of this field on `attributes`, honouring a read hook
    pub fn value_in(&self, attributes: &AttributeBag) -> Option<Value> {
        match self.read {
            Some(read) => read(attributes),
            None => attributes.get(&self.key).cloned(),
        }
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("key", &self.key)
            .field("path", &self.path.as_str())
            .field("converter", &self.converter.is_some())
            .field("cdata", &self.cdata)
            .finish()
    }
}

/// Singular relations hold at most one object, array relations a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// Extra relation flags
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationOptions {
    parent_collects: bool,
}

impl RelationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Related objects are kept by the parent only, never collected on their own
    pub fn parent_collects(mut self, parent_collects: bool) -> Self {
        self.parent_collects = parent_collects;
        self
    }
}

/// Maps one or more paths to related objects
#[derive(Debug, Clone)]
pub struct RelationRule {
    pub key: String,
    /// Declared patterns; a relation declared without paths holds `*`
    pub paths: Vec<PathPattern>,
    /// False when the relation was declared without paths
    pub explicit_paths: bool,
    pub type_names: Vec<String>,
    /// Resolved ids, parallel to `type_names` (filled by `Mapping::builder`)
    pub type_ids: Vec<usize>,
    pub cardinality: Cardinality,
    pub parent_collects: bool,
}

/// Fallback capture of unmapped content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapAll {
    pub recursive: bool,
}

/// Immutable declaration of one node type
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub(crate) id: usize,
    pub(crate) type_name: String,
    pub(crate) node: Option<NodePattern>,
    pub(crate) collect: bool,
    pub(crate) parent: Option<String>,
    pub(crate) fields: Vec<FieldRule>,
    pub(crate) relations: Vec<RelationRule>,
    pub(crate) groups: Vec<(String, Vec<String>)>,
    pub(crate) map_all: Option<MapAll>,
}

impl NodeSpec {
    pub fn builder(type_name: impl Into<String>) -> NodeSpecBuilder {
        NodeSpecBuilder::new(type_name.into())
    }

    /// Id assigned when the spec was registered in a `Mapping`
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn node(&self) -> Option<&NodePattern> {
        self.node.as_ref()
    }

    /// Whether this type opens an object for `tag`
    pub fn accepts_node(&self, tag: &str) -> bool {
        self.node.as_ref().is_some_and(|n| n.accepts(tag))
    }

    pub fn collects(&self) -> bool {
        self.collect
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn relations(&self) -> &[RelationRule] {
        &self.relations
    }

    pub fn relation(&self, key: &str) -> Option<&RelationRule> {
        self.relations.iter().find(|r| r.key == key)
    }

    /// Field keys declared under `group`
    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, keys)| keys.as_slice())
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn map_all(&self) -> Option<MapAll> {
        self.map_all
    }
}

/// Fluent builder for `NodeSpec`
///
/// Paths are parsed as they are declared; the first malformed one is
/// reported by `build`.
#[derive(Debug)]
pub struct NodeSpecBuilder {
    spec: NodeSpec,
    current_group: Option<String>,
    error: Option<DeclarationError>,
}

impl NodeSpecBuilder {
    fn new(type_name: String) -> Self {
        NodeSpecBuilder {
            spec: NodeSpec {
                id: 0,
                type_name,
                node: None,
                collect: true,
                parent: None,
                fields: Vec::new(),
                relations: Vec::new(),
                groups: Vec::new(),
                map_all: None,
            },
            current_group: None,
            error: None,
        }
    }

    /// Element name (or `*`) that opens an object of this type
    pub fn node(mut self, pattern: &str) -> Self {
        self.spec.node = Some(NodePattern::parse(pattern));
        self
    }

    /// Whether finished objects are handed to the collector (default true)
    pub fn collect(mut self, collect: bool) -> Self {
        self.spec.collect = collect;
        self
    }

    /// Inherit fields, relations and groups from another registered type
    pub fn extends(mut self, parent: &str) -> Self {
        self.spec.parent = Some(parent.to_string());
        self
    }

    pub fn map(self, key: &str, path: &str) -> Self {
        self.map_with(key, path, FieldOptions::default())
    }

    pub fn map_with(mut self, key: &str, path: &str, options: FieldOptions) -> Self {
        let Some(path) = self.parse_path(path, false) else {
            return self;
        };

        let rule = FieldRule {
            key: key.to_string(),
            path,
            converter: options.converter,
            cdata: options.cdata,
            assign: options.assign,
            read: options.read,
        };
        insert_field(&mut self.spec.fields, rule);

        if let Some(group) = self.current_group.clone() {
            add_to_group(&mut self.spec.groups, &group, key);
        }
        self
    }

    /// Declare fields inside a named attribute group
    pub fn group<F>(mut self, name: &str, declare: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if self.spec.group(name).is_none() {
            self.spec.groups.push((name.to_string(), Vec::new()));
        }
        let outer = self.current_group.replace(name.to_string());
        let mut builder = declare(self);
        builder.current_group = outer;
        builder
    }

    /// Singular relation to `type_name`
    pub fn relate_one(self, key: &str, paths: &[&str], type_name: &str) -> Self {
        self.relate(key, paths, &[type_name], Cardinality::One, RelationOptions::default())
    }

    /// Array relation to any of `type_names`
    pub fn relate_many(self, key: &str, paths: &[&str], type_names: &[&str]) -> Self {
        self.relate(key, paths, type_names, Cardinality::Many, RelationOptions::default())
    }

    pub fn relate_one_with(self, key: &str, paths: &[&str], type_name: &str, options: RelationOptions) -> Self {
        self.relate(key, paths, &[type_name], Cardinality::One, options)
    }

    pub fn relate_many_with(self, key: &str, paths: &[&str], type_names: &[&str], options: RelationOptions) -> Self {
        self.relate(key, paths, type_names, Cardinality::Many, options)
    }

    fn relate(
        mut self,
        key: &str,
        paths: &[&str],
        type_names: &[&str],
        cardinality: Cardinality,
        options: RelationOptions,
    ) -> Self {
        let mut patterns = Vec::with_capacity(paths.len().max(1));
        for raw in paths {
            match self.parse_path(raw, true) {
                Some(pattern) => patterns.push(pattern),
                None => return self,
            }
        }
        let explicit_paths = !patterns.is_empty();
        if !explicit_paths {
            patterns.push(PathPattern::any_child());
        }

        let rule = RelationRule {
            key: key.to_string(),
            paths: patterns,
            explicit_paths,
            type_names: type_names.iter().map(|t| t.to_string()).collect(),
            type_ids: Vec::new(),
            cardinality,
            parent_collects: options.parent_collects,
        };
        match self.spec.relations.iter_mut().find(|r| r.key == rule.key) {
            Some(existing) => *existing = rule,
            None => self.spec.relations.push(rule),
        }
        self
    }

    /// Capture unmapped attributes of the object element under their raw names
    pub fn map_all(mut self) -> Self {
        self.spec.map_all = Some(MapAll { recursive: false });
        self
    }

    /// Capture all unmapped content, nesting unmapped elements as bags
    pub fn map_all_recursive(mut self) -> Self {
        self.spec.map_all = Some(MapAll { recursive: true });
        self
    }

    pub fn build(self) -> Result<NodeSpec, DeclarationError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.spec),
        }
    }

    fn parse_path(&mut self, raw: &str, relation: bool) -> Option<PathPattern> {
        let reason = match PathPattern::parse(raw) {
            Ok(path) if relation && path.attribute().is_some() => {
                "relation paths cannot reference attributes"
            }
            Ok(path) if relation && path.is_empty() => "relation paths cannot be empty",
            Ok(path) if !relation && path.has_wildcard() => "wildcards are only allowed in relation paths",
            Ok(path) => return Some(path),
            Err(reason) => reason,
        };
        if self.error.is_none() {
            self.error = Some(DeclarationError::InvalidPath {
                owner: self.spec.type_name.clone(),
                path: raw.to_string(),
                reason,
            });
        }
        None
    }
}

/// Fields are unique by path; a later declaration replaces an earlier one in place
pub(crate) fn insert_field(fields: &mut Vec<FieldRule>, rule: FieldRule) {
    match fields.iter_mut().find(|f| f.path == rule.path) {
        Some(existing) => *existing = rule,
        None => fields.push(rule),
    }
}

pub(crate) fn add_to_group(groups: &mut Vec<(String, Vec<String>)>, group: &str, key: &str) {
    let idx = match groups.iter().position(|(name, _)| name == group) {
        Some(idx) => idx,
        None => {
            groups.push((group.to_string(), Vec::new()));
            groups.len() - 1
        }
    };
    let keys = &mut groups[idx].1;
    if !keys.iter().any(|k| k == key) {
        keys.push(key.to_string());
    }
}
