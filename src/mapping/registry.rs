//! Mapping registry
//!
//! Resolves a set of node specs once, before any parsing: type names become
//! ids, inheritance is flattened into each spec, related types are checked.
//! The resulting `Mapping` is immutable and can be shared across threads.

use super::spec::{add_to_group, insert_field, NodeSpec};
use crate::error::DeclarationError;
use crate::object::MappedObject;
use std::collections::HashMap;
use std::sync::Arc;

/// A resolved, immutable set of node specs
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    specs: Vec<Arc<NodeSpec>>,
    by_name: HashMap<String, usize>,
}

impl Mapping {
    pub fn builder() -> MappingBuilder {
        MappingBuilder::default()
    }

    /// Look up a spec by type name
    pub fn get(&self, type_name: &str) -> Option<&Arc<NodeSpec>> {
        self.by_name.get(type_name).map(|&id| &self.specs[id])
    }

    /// Spec by id
    #[inline]
    pub fn spec(&self, id: usize) -> &Arc<NodeSpec> {
        &self.specs[id]
    }

    pub fn id_of(&self, type_name: &str) -> Option<usize> {
        self.by_name.get(type_name).copied()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<NodeSpec>> {
        self.specs.iter()
    }

    /// Resolve the types that may open a top-level object
    pub fn resolve_roots(&self, roots: &[&str]) -> Result<Vec<usize>, DeclarationError> {
        roots
            .iter()
            .map(|name| {
                let id = self
                    .id_of(name)
                    .ok_or_else(|| DeclarationError::UnknownRoot(name.to_string()))?;
                if self.specs[id].node().is_none() {
                    return Err(DeclarationError::RootWithoutNode(name.to_string()));
                }
                Ok(id)
            })
            .collect()
    }

    /// Empty object of `type_name`, for building objects by hand
    pub fn new_object(&self, type_name: &str, node_name: &str) -> Option<MappedObject> {
        self.get(type_name)
            .map(|spec| MappedObject::new(Arc::clone(spec), node_name))
    }
}

/// Collects specs for resolution
#[derive(Debug, Default)]
pub struct MappingBuilder {
    specs: Vec<NodeSpec>,
}

impl MappingBuilder {
    pub fn register(mut self, spec: NodeSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn build(self) -> Result<Mapping, DeclarationError> {
        let mut by_name = HashMap::with_capacity(self.specs.len());
        for (id, spec) in self.specs.iter().enumerate() {
            if by_name.insert(spec.type_name.clone(), id).is_some() {
                return Err(DeclarationError::DuplicateType(spec.type_name.clone()));
            }
        }

        let mut resolved: Vec<Option<NodeSpec>> = vec![None; self.specs.len()];
        for id in 0..self.specs.len() {
            let mut visiting = Vec::new();
            flatten(id, &self.specs, &by_name, &mut resolved, &mut visiting)?;
        }

        let mut specs = Vec::with_capacity(resolved.len());
        for (id, spec) in resolved.into_iter().enumerate() {
            let Some(mut spec) = spec else {
                continue;
            };
            spec.id = id;
            let owner = spec.type_name.clone();
            for relation in &mut spec.relations {
                if relation.type_names.is_empty() {
                    return Err(DeclarationError::EmptyRelatedTypes {
                        owner,
                        relation: relation.key.clone(),
                    });
                }
                let mut type_ids = Vec::with_capacity(relation.type_names.len());
                for target in &relation.type_names {
                    let id = by_name.get(target).copied().ok_or_else(|| DeclarationError::UnknownRelatedType {
                        owner: owner.clone(),
                        relation: relation.key.clone(),
                        target: target.clone(),
                    })?;
                    type_ids.push(id);
                }
                relation.type_ids = type_ids;
            }
            log::trace!(
                "registered node type {} ({} fields, {} relations)",
                spec.type_name,
                spec.fields.len(),
                spec.relations.len()
            );
            specs.push(Arc::new(spec));
        }

        Ok(Mapping { specs, by_name })
    }
}

/// Overlay `id` on its flattened parent: parent rules first, own rules win
fn flatten(
    id: usize,
    declared: &[NodeSpec],
    by_name: &HashMap<String, usize>,
    resolved: &mut Vec<Option<NodeSpec>>,
    visiting: &mut Vec<usize>,
) -> Result<(), DeclarationError> {
    if resolved[id].is_some() {
        return Ok(());
    }
    let own = &declared[id];
    if visiting.contains(&id) {
        return Err(DeclarationError::InheritanceCycle(own.type_name.clone()));
    }

    let Some(parent_name) = own.parent.as_deref() else {
        resolved[id] = Some(own.clone());
        return Ok(());
    };
    let parent_id = *by_name.get(parent_name).ok_or_else(|| DeclarationError::UnknownParent {
        child: own.type_name.clone(),
        parent: parent_name.to_string(),
    })?;

    visiting.push(id);
    flatten(parent_id, declared, by_name, resolved, visiting)?;
    visiting.pop();

    let Some(base) = resolved[parent_id].as_ref() else {
        return Err(DeclarationError::InheritanceCycle(own.type_name.clone()));
    };
    let mut merged = own.clone();

    merged.fields = base.fields.clone();
    for field in &own.fields {
        insert_field(&mut merged.fields, field.clone());
    }

    merged.relations = base.relations.clone();
    for relation in &own.relations {
        match merged.relations.iter_mut().find(|r| r.key == relation.key) {
            Some(existing) => *existing = relation.clone(),
            None => merged.relations.push(relation.clone()),
        }
    }

    merged.groups = base.groups.clone();
    for (group, keys) in &own.groups {
        if keys.is_empty() {
            add_group_name(&mut merged.groups, group);
        }
        for key in keys {
            add_to_group(&mut merged.groups, group, key);
        }
    }

    if merged.map_all.is_none() {
        merged.map_all = base.map_all;
    }

    resolved[id] = Some(merged);
    Ok(())
}

fn add_group_name(groups: &mut Vec<(String, Vec<String>)>, group: &str) {
    if !groups.iter().any(|(name, _)| name == group) {
        groups.push((group.to_string(), Vec::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::spec::FieldOptions;
    use crate::mapping::DecimalConverter;

    fn property_specs() -> MappingBuilder {
        Mapping::builder()
            .register(
                NodeSpec::builder("PropertyBase")
                    .map_with("modified_at", "@modTime", FieldOptions::new().converter(DecimalConverter))
                    .map("agent_id", "agentID")
                    .build()
                    .unwrap(),
            )
            .register(
                NodeSpec::builder("Business")
                    .node("business")
                    .extends("PropertyBase")
                    .map("office_name", "officeDetails/officeName")
                    .map("modified_at", "@modTime")
                    .build()
                    .unwrap(),
            )
    }

    #[test]
    fn test_inheritance_overlay() {
        let mapping = property_specs().build().unwrap();
        let business = mapping.get("Business").unwrap();

        let keys: Vec<_> = business.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["modified_at", "agent_id", "office_name"]);
        // child redeclared @modTime without a converter
        assert!(business.fields()[0].converter.is_none());
        assert_eq!(business.parent(), Some("PropertyBase"));
        assert_eq!(mapping.id_of("Business"), Some(1));
        assert_eq!(business.id(), 1);
    }

    #[test]
    fn test_duplicate_type() {
        let spec = NodeSpec::builder("A").node("a").build().unwrap();
        let err = Mapping::builder()
            .register(spec.clone())
            .register(spec)
            .build()
            .unwrap_err();
        assert_eq!(err, DeclarationError::DuplicateType("A".to_string()));
    }

    #[test]
    fn test_unknown_parent_and_cycle() {
        let err = Mapping::builder()
            .register(NodeSpec::builder("A").extends("Nope").build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownParent { .. }));

        let err = Mapping::builder()
            .register(NodeSpec::builder("A").extends("B").build().unwrap())
            .register(NodeSpec::builder("B").extends("A").build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::InheritanceCycle(_)));
    }

    #[test]
    fn test_related_types_resolved() {
        let mapping = Mapping::builder()
            .register(
                NodeSpec::builder("List")
                    .node("list")
                    .relate_many("items", &["item"], &["Item"])
                    .build()
                    .unwrap(),
            )
            .register(NodeSpec::builder("Item").node("item").build().unwrap())
            .build()
            .unwrap();
        assert_eq!(mapping.get("List").unwrap().relations()[0].type_ids, vec![1]);

        let err = Mapping::builder()
            .register(
                NodeSpec::builder("List")
                    .relate_one("item", &["item"], "Missing")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownRelatedType { ref target, .. } if target == "Missing"));

        let err = Mapping::builder()
            .register(NodeSpec::builder("List").relate_many("items", &[], &[]).build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::EmptyRelatedTypes { .. }));
    }

    #[test]
    fn test_resolve_roots() {
        let mapping = property_specs().build().unwrap();
        assert_eq!(mapping.resolve_roots(&["Business"]).unwrap(), vec![1]);
        assert_eq!(
            mapping.resolve_roots(&["PropertyBase"]),
            Err(DeclarationError::RootWithoutNode("PropertyBase".to_string()))
        );
        assert_eq!(
            mapping.resolve_roots(&["Nope"]),
            Err(DeclarationError::UnknownRoot("Nope".to_string()))
        );
    }

    #[test]
    fn test_group_memberships_merged() {
        let mapping = Mapping::builder()
            .register(
                NodeSpec::builder("Base")
                    .group("ids", |g| g.map("id", "@id"))
                    .build()
                    .unwrap(),
            )
            .register(
                NodeSpec::builder("Child")
                    .node("child")
                    .extends("Base")
                    .group("ids", |g| g.map("ref", "@ref"))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let child = mapping.get("Child").unwrap();
        assert_eq!(child.group("ids").unwrap(), &["id".to_string(), "ref".to_string()]);
    }
}
