//! Mapped objects
//!
//! The unit the engine produces for each matched node: an ordered attribute
//! bag, one slot per declared relation, the concrete element name, and a
//! handle on the spec that built it.

use crate::mapping::{AttributeBag, Cardinality, NodeSpec, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Contents of a relation slot
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    One(Option<Box<MappedObject>>),
    Many(Vec<MappedObject>),
}

impl Relation {
    fn empty(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::One => Relation::One(None),
            Cardinality::Many => Relation::Many(Vec::new()),
        }
    }

    /// The singular object, if this is a filled singular slot
    pub fn one(&self) -> Option<&MappedObject> {
        match self {
            Relation::One(object) => object.as_deref(),
            Relation::Many(_) => None,
        }
    }

    /// The related objects in document order (zero or one for singular slots)
    pub fn objects(&self) -> &[MappedObject] {
        match self {
            Relation::One(Some(object)) => std::slice::from_ref(&**object),
            Relation::One(None) => &[],
            Relation::Many(objects) => objects,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

/// An object built from one matched element
#[derive(Clone)]
pub struct MappedObject {
    spec: Arc<NodeSpec>,
    node_name: String,
    attributes: AttributeBag,
    /// Slots in relation-rule order, so rule index == slot index
    relations: IndexMap<String, Relation>,
}

impl MappedObject {
    /// Empty object with one empty slot per declared relation
    pub fn new(spec: Arc<NodeSpec>, node_name: impl Into<String>) -> Self {
        let relations = spec
            .relations()
            .iter()
            .map(|rule| (rule.key.clone(), Relation::empty(rule.cardinality)))
            .collect();
        MappedObject {
            spec,
            node_name: node_name.into(),
            attributes: AttributeBag::new(),
            relations,
        }
    }

    /// The element name this object was built from
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn type_name(&self) -> &str {
        self.spec.type_name()
    }

    pub fn spec(&self) -> &Arc<NodeSpec> {
        &self.spec
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key, value);
    }

    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeBag {
        &mut self.attributes
    }

    pub fn relation(&self, key: &str) -> Option<&Relation> {
        self.relations.get(key)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.relations.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// Projection of the attribute bag onto a declared group
    ///
    /// Returns `None` when the spec declares no such group; fields of the
    /// group that were never set are left out.
    pub fn group_attributes(&self, group: &str) -> Option<AttributeBag> {
        let keys = self.spec.group(group)?;
        Some(
            keys.iter()
                .filter_map(|key| self.attributes.get(key).map(|v| (key.clone(), v.clone())))
                .collect(),
        )
    }

    /// Fill a singular slot, replacing any previous occupant
    pub fn set_relation_one(&mut self, key: &str, object: MappedObject) {
        *self.slot(key, Cardinality::One) = Relation::One(Some(Box::new(object)));
    }

    /// Replace the contents of an array slot
    pub fn set_relation_many(&mut self, key: &str, objects: Vec<MappedObject>) {
        *self.slot(key, Cardinality::Many) = Relation::Many(objects);
    }

    /// Append to an array slot (or fill a singular one)
    pub fn push_relation(&mut self, key: &str, object: MappedObject) {
        match self.slot(key, Cardinality::Many) {
            Relation::Many(objects) => objects.push(object),
            Relation::One(existing) => *existing = Some(Box::new(object)),
        }
    }

    /// Attach into the slot at `index`, used by the engine
    pub(crate) fn attach_at(&mut self, index: usize, object: MappedObject) {
        if let Some((_, slot)) = self.relations.get_index_mut(index) {
            match slot {
                Relation::Many(objects) => objects.push(object),
                Relation::One(existing) => *existing = Some(Box::new(object)),
            }
        }
    }

    fn slot(&mut self, key: &str, cardinality: Cardinality) -> &mut Relation {
        self.relations
            .entry(key.to_string())
            .or_insert_with(|| Relation::empty(cardinality))
    }
}

/// Objects are equal when type, element name, attributes and relations agree
impl PartialEq for MappedObject {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name()
            && self.node_name == other.node_name
            && self.attributes == other.attributes
            && self.relations == other.relations
    }
}

impl fmt::Debug for MappedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedObject")
            .field("type", &self.type_name())
            .field("node_name", &self.node_name)
            .field("attributes", &self.attributes)
            .field("relations", &self.relations)
            .finish()
    }
}
