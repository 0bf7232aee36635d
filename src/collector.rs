//! Object Collectors
//!
//! Sinks for finished top-level objects. The engine calls `accept`
//! synchronously, in document order, once per collected object; a slow
//! collector therefore throttles the parse.

use crate::object::MappedObject;

/// Receives finished objects whose type collects
pub trait Collector {
    /// `declared_type` is the type name of the spec that built `object`
    fn accept(&mut self, object: MappedObject, declared_type: &str);
}

/// Keeps every object in memory, in the order received
#[derive(Debug, Default, Clone)]
pub struct NaiveCollector {
    objects: Vec<MappedObject>,
}

impl NaiveCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mapped_objects(&self) -> &[MappedObject] {
        &self.objects
    }

    /// Objects of one declared type, in document order
    pub fn for_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a MappedObject> + 'a {
        self.objects.iter().filter(move |o| o.type_name() == type_name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn into_objects(self) -> Vec<MappedObject> {
        self.objects
    }
}

impl Collector for NaiveCollector {
    fn accept(&mut self, object: MappedObject, _declared_type: &str) {
        self.objects.push(object);
    }
}

impl Collector for Vec<MappedObject> {
    fn accept(&mut self, object: MappedObject, _declared_type: &str) {
        self.push(object);
    }
}

/// Any `FnMut(MappedObject, &str)` closure is a collector
impl<F> Collector for F
where
    F: FnMut(MappedObject, &str),
{
    fn accept(&mut self, object: MappedObject, declared_type: &str) {
        self(object, declared_type)
    }
}
