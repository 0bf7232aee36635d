//! Handler Stack
//!
//! The event-driven core. Every event mutates the top frame or pushes/pops
//! it:
//! - start: open an element under the top frame; if a relation of the top
//!   spec matches the extended path, the element becomes the boundary of a
//!   new frame
//! - text: append to the innermost open element
//! - end: evaluate field rules for the closing element (its text path and
//!   one `@name` candidate per attribute); closing a boundary finalizes the
//!   frame's object into its parent slot and/or the collector
//!
//! Only the open ancestor chain is held. A finished object is attached to
//! its parent only when the parent itself will be observed (collected, or
//! attached to an observed ancestor); otherwise it is released as soon as it
//! has been forwarded.

use super::element_stack::{ElementFrame, ElementStack};
use super::matcher::PathMatcher;
use super::{EngineStats, ParseOptions};
use crate::collector::Collector;
use crate::error::MapError;
use crate::mapping::{Cardinality, FieldRule, Mapping, NodePattern, NodeSpec, Value};
use crate::object::MappedObject;
use crate::sax::{Attribute, SaxHandler};
use std::collections::HashSet;
use std::sync::Arc;

/// Construction frame for one in-progress object
struct HandlerFrame {
    object: MappedObject,
    spec: Arc<NodeSpec>,
    /// Slot in the parent's object this frame fills
    relation: Option<usize>,
    /// Will be attached to the parent when finished
    attached: bool,
    /// Will be handed to the collector when finished
    forwarded: bool,
    elements: ElementStack,
    /// Ordinal of the boundary start tag in the document
    element_index: u64,
    /// Singular relation slots already claimed
    filled: Vec<bool>,
    /// Keys written by explicit field rules
    explicit: HashSet<String>,
}

impl HandlerFrame {
    fn new(spec: Arc<NodeSpec>, boundary: ElementFrame, element_index: u64) -> Self {
        let object = MappedObject::new(Arc::clone(&spec), boundary.tag.as_str());
        let filled = vec![false; spec.relations().len()];
        HandlerFrame {
            object,
            spec,
            relation: None,
            attached: false,
            forwarded: false,
            elements: ElementStack::with_boundary(boundary),
            element_index,
            filled,
            explicit: HashSet::new(),
        }
    }

    /// Keys map-all capture must leave alone
    #[inline]
    fn owns_key(&self, key: &str) -> bool {
        self.explicit.contains(key) || self.spec.field(key).is_some()
    }

    #[inline]
    fn observable(&self) -> bool {
        self.attached || self.forwarded
    }
}

/// SaxHandler that maps events onto objects
pub struct HandlerStack<'m, C: Collector> {
    mapping: &'m Mapping,
    roots: Vec<usize>,
    collector: C,
    options: ParseOptions,
    matcher: PathMatcher,
    frames: Vec<HandlerFrame>,
    /// Elements open outside any object frame
    outside_depth: usize,
    element_count: u64,
    stats: EngineStats,
}

impl<'m, C: Collector> HandlerStack<'m, C> {
    pub fn new(mapping: &'m Mapping, roots: Vec<usize>, collector: C, options: ParseOptions) -> Self {
        HandlerStack {
            mapping,
            roots,
            collector,
            matcher: PathMatcher::new(options.match_cache_capacity),
            options,
            frames: Vec::with_capacity(16),
            outside_depth: 0,
            element_count: 0,
            stats: EngineStats::default(),
        }
    }

    pub fn set_options(&mut self, options: ParseOptions) {
        self.matcher = PathMatcher::new(options.match_cache_capacity);
        self.options = options;
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cache_hits: self.matcher.cache_hits(),
            cache_misses: self.matcher.cache_misses(),
            ..self.stats
        }
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut C {
        &mut self.collector
    }

    pub fn into_collector(self) -> C {
        self.collector
    }

    /// Number of open object frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// End of document: report and reset per-document state
    pub fn finish(&mut self) {
        if !self.frames.is_empty() {
            log::warn!(
                "document ended with {} unfinished object(s); discarding them",
                self.frames.len()
            );
        }
        let stats = self.stats();
        log::debug!(
            "mapped document: {} objects built, {} collected, max depth {}, match cache {}/{} hits",
            stats.objects_built,
            stats.objects_collected,
            stats.max_depth,
            stats.cache_hits,
            stats.cache_hits + stats.cache_misses
        );
        self.reset();
    }

    /// Drop any partial state left by an aborted parse
    pub fn reset(&mut self) {
        self.frames.clear();
        self.outside_depth = 0;
        self.element_count = 0;
    }

    /// Root type opened by `tag`: literal node names first, then wildcards
    fn match_root(&self, tag: &str) -> Option<usize> {
        let literal = self.roots.iter().copied().find(|&id| {
            matches!(self.mapping.spec(id).node(), Some(NodePattern::Literal(name)) if name == tag)
        });
        literal.or_else(|| {
            self.roots
                .iter()
                .copied()
                .find(|&id| matches!(self.mapping.spec(id).node(), Some(NodePattern::Any)))
        })
    }

    fn push_frame(&mut self, frame: HandlerFrame) {
        log::trace!(
            "open {} <{}> at depth {}",
            frame.spec.type_name(),
            frame.object.node_name(),
            self.frames.len()
        );
        self.frames.push(frame);
        self.stats.max_depth = self.stats.max_depth.max(self.frames.len());
    }

    /// Open a child frame if a relation of the top spec matches the new element
    fn open_relation(&mut self, element_index: u64) -> Result<(), MapError> {
        let Some(top) = self.frames.last_mut() else {
            return Ok(());
        };

        let found = {
            let elements = &top.elements;
            let tags = elements.path();
            self.matcher
                .match_relation(self.mapping, &top.spec, &tags, |depth, attr, value| {
                    elements.attribute_equals(depth, attr, value)
                })
        };
        let Some(found) = found else {
            return Ok(());
        };

        let rule = &top.spec.relations()[found.rule];
        if rule.cardinality == Cardinality::One {
            if top.filled[found.rule] {
                return Err(MapError::AmbiguousRelation {
                    parent_type: top.spec.type_name().to_string(),
                    node_name: top.object.node_name().to_string(),
                    element_index: top.element_index,
                    relation: rule.key.clone(),
                });
            }
            top.filled[found.rule] = true;
        }

        let parent_collects = rule.parent_collects;
        let attached = top.observable();
        let Some(boundary) = top.elements.pop() else {
            return Ok(());
        };
        top.elements.mark_mapped();

        let spec = Arc::clone(self.mapping.spec(found.type_id));
        let mut frame = HandlerFrame::new(spec, boundary, element_index);
        frame.relation = Some(found.rule);
        frame.attached = attached;
        frame.forwarded = !parent_collects && frame.spec.collects();
        self.push_frame(frame);
        Ok(())
    }

    /// Close the top frame's object and hand it on
    fn finalize(&mut self) -> Result<(), MapError> {
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        self.stats.objects_built += 1;
        log::trace!(
            "close {} <{}> at depth {}",
            frame.spec.type_name(),
            frame.object.node_name(),
            self.frames.len()
        );

        let HandlerFrame {
            object,
            spec,
            relation,
            attached,
            forwarded,
            ..
        } = frame;

        if let (true, Some(slot), Some(parent)) = (attached, relation, self.frames.last_mut()) {
            if !forwarded {
                parent.object.attach_at(slot, object);
                return Ok(());
            }
            parent.object.attach_at(slot, object.clone());
        }

        if forwarded {
            log::debug!("collected {} <{}>", spec.type_name(), object.node_name());
            self.stats.objects_collected += 1;
            self.collector.accept(object, spec.type_name());
        }
        Ok(())
    }
}

/// Evaluate field rules for the innermost open element of `frame` and pop it
fn close_element(matcher: &mut PathMatcher, options: &ParseOptions, frame: &mut HandlerFrame) -> Result<(), MapError> {
    let spec = Arc::clone(&frame.spec);
    let map_all = spec.map_all();

    let mut mapped_here = false;
    let mut text_mapped = false;
    let mut unmapped = Vec::new();
    {
        let elements = &frame.elements;
        let Some(element) = elements.top() else {
            return Ok(());
        };
        let tags = elements.path();
        let conditions = |depth: usize, attr: &str, value: &str| elements.attribute_equals(depth, attr, value);

        if element.saw_text {
            if let Some(idx) = matcher.match_field(&spec, &tags, None, conditions) {
                let text = if options.trim_text {
                    element.text.trim()
                } else {
                    element.text.as_str()
                };
                assign_field(&mut frame.object, &mut frame.explicit, &spec.fields()[idx], text, &tags, None)?;
                text_mapped = true;
            }
        }

        for (name, value) in &element.attributes {
            match matcher.match_field(&spec, &tags, Some(name.as_str()), conditions) {
                Some(idx) => {
                    assign_field(
                        &mut frame.object,
                        &mut frame.explicit,
                        &spec.fields()[idx],
                        value,
                        &tags,
                        Some(name.as_str()),
                    )?;
                    mapped_here = true;
                }
                None if map_all.is_some() => unmapped.push((name.clone(), value.clone())),
                None => {}
            }
        }
        mapped_here |= text_mapped;
    }

    let Some(mut element) = frame.elements.pop() else {
        return Ok(());
    };
    if mapped_here {
        frame.elements.mark_mapped();
    }

    let Some(map_all) = map_all else {
        return Ok(());
    };

    if frame.elements.is_empty() {
        // boundary: unmapped attributes land on the object itself
        for (name, value) in unmapped {
            if !frame.owns_key(&name) {
                frame.object.set(name, value);
            }
        }
        return Ok(());
    }
    if !map_all.recursive {
        return Ok(());
    }

    for (name, value) in unmapped {
        element.capture.insert(name, value);
    }
    let text = if options.trim_text {
        element.text.trim().to_string()
    } else {
        std::mem::take(&mut element.text)
    };
    let has_text = !text_mapped && !text.trim().is_empty();

    let captured = if has_text || !element.capture.is_empty() {
        if has_text {
            element.capture.insert("#text", text);
        }
        Some(Value::Bag(element.capture))
    } else if !element.mapped && !mapped_here {
        Some(Value::Bag(Default::default()))
    } else {
        None
    };

    if let Some(captured) = captured {
        if frame.elements.len() == 1 {
            if !frame.owns_key(&element.tag) {
                frame.object.attributes_mut().insert(element.tag, captured);
            }
        } else if let Some(parent) = frame.elements.top_mut() {
            parent.capture.insert(element.tag, captured);
        }
    }
    Ok(())
}

/// Convert and store one field value
fn assign_field(
    object: &mut MappedObject,
    explicit: &mut HashSet<String>,
    rule: &FieldRule,
    raw: &str,
    tags: &[&str],
    attribute: Option<&str>,
) -> Result<(), MapError> {
    let value = match &rule.converter {
        Some(converter) => converter.parse(raw).map_err(|e| MapError::Conversion {
            path: display_path(object.node_name(), tags, attribute),
            raw: raw.to_string(),
            message: e.0,
        })?,
        None => Value::Text(raw.to_string()),
    };

    match rule.assign {
        Some(assign) => {
            // keys a hook adds are appended, so they follow the old length
            let before = object.attributes().len();
            assign(object.attributes_mut(), value);
            explicit.extend(object.attributes().keys().skip(before).map(str::to_string));
        }
        None => object.set(rule.key.as_str(), value),
    }
    explicit.insert(rule.key.clone());
    Ok(())
}

fn display_path(node_name: &str, tags: &[&str], attribute: Option<&str>) -> String {
    let mut path = node_name.to_string();
    for tag in tags {
        path.push('/');
        path.push_str(tag);
    }
    if let Some(attr) = attribute {
        path.push_str("/@");
        path.push_str(attr);
    }
    path
}

impl<C: Collector> SaxHandler for HandlerStack<'_, C> {
    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> Result<(), MapError> {
        let index = self.element_count;
        self.element_count += 1;

        if self.frames.is_empty() {
            match self.match_root(name) {
                Some(type_id) => {
                    let spec = Arc::clone(self.mapping.spec(type_id));
                    let mut frame = HandlerFrame::new(spec, ElementFrame::new(name, attributes), index);
                    frame.forwarded = frame.spec.collects();
                    self.push_frame(frame);
                }
                None => self.outside_depth += 1,
            }
            return Ok(());
        }

        if let Some(top) = self.frames.last_mut() {
            top.elements.push(ElementFrame::new(name, attributes));
        }
        self.open_relation(index)
    }

    fn text(&mut self, text: &str) -> Result<(), MapError> {
        if let Some(top) = self.frames.last_mut() {
            top.elements.append_text(text);
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), MapError> {
        if self.frames.is_empty() {
            if self.outside_depth == 0 {
                log::warn!("ignoring unmatched end tag </{}>", name);
            } else {
                self.outside_depth -= 1;
            }
            return Ok(());
        }
        let Some(top) = self.frames.last_mut() else {
            return Ok(());
        };

        close_element(&mut self.matcher, &self.options, top)?;
        if top.elements.is_empty() {
            self.finalize()?;
        }
        Ok(())
    }
}
