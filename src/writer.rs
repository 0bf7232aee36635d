//! Object Writer
//!
//! Rebuilds markup from a mapped object using the same spec that parsed
//! it. Field paths become nested elements or attributes (shared prefixes
//! are merged), relations follow the fields in rule order under their path
//! prefix, map-all captures are written back last.
//!
//! Output: XML declaration, two-space indentation, self-closing empty
//! elements, trailing newline.

use crate::core::entities::{encode_attribute, encode_text};
use crate::error::MapError;
use crate::mapping::{AttributeBag, FieldRule, PathPattern, Segment, Value};
use crate::object::MappedObject;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Element under construction
#[derive(Debug, Default)]
struct XmlNode {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    cdata: bool,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(tag: &str) -> Self {
        XmlNode {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Child for one path step, reusing the most recent matching child
    fn descend(&mut self, segment: &Segment) -> &mut XmlNode {
        let existing = self.children.iter().rposition(|child| match segment {
            Segment::Conditioned { tag, attr, value } => {
                child.tag == *tag && child.attributes.iter().any(|(n, v)| n == attr && v == value)
            }
            other => other.tag() == Some(child.tag.as_str()),
        });

        let idx = match existing {
            Some(idx) => idx,
            None => {
                let mut child = XmlNode::new(segment.tag().unwrap_or_default());
                if let Segment::Conditioned { attr, value, .. } = segment {
                    child.attributes.push((attr.clone(), value.clone()));
                }
                self.children.push(child);
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    fn descend_path(&mut self, segments: &[Segment]) -> &mut XmlNode {
        segments
            .iter()
            .filter(|s| s.tag().is_some())
            .fold(self, |node, segment| node.descend(segment))
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.as_deref().is_none_or(str::is_empty)
    }
}

/// Serialize an object as a standalone document
pub fn to_xml(object: &MappedObject) -> Result<String, MapError> {
    let mut out = String::with_capacity(1024);
    out.push_str(XML_DECLARATION);
    write_fragment(object, &mut out, 0)?;
    Ok(out)
}

/// Serialize an object as an element indented `depth` levels
pub fn write_fragment(object: &MappedObject, out: &mut String, depth: usize) -> Result<(), MapError> {
    let node = build(object)?;
    render(&node, out, depth);
    Ok(())
}

fn build(object: &MappedObject) -> Result<XmlNode, MapError> {
    let spec = object.spec();
    let mut node = XmlNode::new(object.node_name());

    for field in spec.fields() {
        let Some(value) = field.value_in(object.attributes()) else {
            continue;
        };
        let raw = format_field(object, field, &value)?;
        place(&mut node, &field.path, raw, field.cdata);
    }

    for relation in spec.relations() {
        let Some(slot) = object.relation(&relation.key) else {
            continue;
        };
        for child in slot.objects() {
            let pattern = relation
                .paths
                .iter()
                .find(|p| p.segments().last().is_some_and(|s| s.accepts_tag(child.node_name())))
                .or_else(|| relation.paths.first());
            let prefix: &[Segment] = match pattern {
                Some(p) => &p.segments()[..p.segments().len().saturating_sub(1)],
                None => &[],
            };
            let child_node = build(child)?;
            node.descend_path(prefix).children.push(child_node);
        }
    }

    if spec.map_all().is_some() {
        for (key, value) in object.attributes().iter() {
            if spec.fields().iter().any(|f| f.key == key) {
                continue;
            }
            write_capture(&mut node, key, value);
        }
    }

    Ok(node)
}

fn format_field(object: &MappedObject, field: &FieldRule, value: &Value) -> Result<String, MapError> {
    let formatted = match (&field.converter, value) {
        (Some(converter), _) => converter.format(value),
        (None, Value::Bag(_)) => None,
        (None, other) => Some(other.to_string()),
    };
    formatted.ok_or_else(|| MapError::Format {
        node_name: object.node_name().to_string(),
        key: field.key.clone(),
        value: value.to_string(),
    })
}

fn place(node: &mut XmlNode, path: &PathPattern, raw: String, cdata: bool) {
    let target = node.descend_path(path.element_segments());
    match path.attribute() {
        Some(attr) => target.set_attribute(attr, raw),
        None => {
            target.text = Some(raw);
            target.cdata = cdata;
        }
    }
}

/// Scalars become attributes, bags become child elements
fn write_capture(node: &mut XmlNode, key: &str, value: &Value) {
    match value {
        Value::Bag(bag) => node.children.push(bag_node(key, bag)),
        scalar if key == "#text" => node.text = Some(scalar.to_string()),
        scalar => node.set_attribute(key, scalar.to_string()),
    }
}

fn bag_node(tag: &str, bag: &AttributeBag) -> XmlNode {
    let mut node = XmlNode::new(tag);
    for (key, value) in bag.iter() {
        write_capture(&mut node, key, value);
    }
    node
}

/// Iterative render to keep deep trees off the call stack
fn render(root: &XmlNode, out: &mut String, depth: usize) {
    enum StackEntry<'n> {
        Enter(&'n XmlNode, usize),
        Close(&'n XmlNode, usize),
    }

    let mut stack = Vec::with_capacity(64);
    stack.push(StackEntry::Enter(root, depth));

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Close(node, depth) => {
                indent(out, depth);
                close_tag(out, &node.tag);
            }
            StackEntry::Enter(node, depth) => {
                indent(out, depth);
                out.push('<');
                out.push_str(&node.tag);
                for (name, value) in &node.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&encode_attribute(value));
                    out.push('"');
                }

                if node.is_empty() {
                    out.push_str("/>\n");
                    continue;
                }
                out.push('>');

                if node.children.is_empty() {
                    push_text(out, node);
                    close_tag(out, &node.tag);
                    continue;
                }

                out.push('\n');
                if node.text.as_deref().is_some_and(|t| !t.is_empty()) {
                    indent(out, depth + 1);
                    push_text(out, node);
                    out.push('\n');
                }
                stack.push(StackEntry::Close(node, depth));
                for child in node.children.iter().rev() {
                    stack.push(StackEntry::Enter(child, depth + 1));
                }
            }
        }
    }
}

#[inline]
fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[inline]
fn close_tag(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn push_text(out: &mut String, node: &XmlNode) {
    let Some(text) = node.text.as_deref() else {
        return;
    };
    if node.cdata {
        out.push_str("<![CDATA[");
        out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
        out.push_str("]]>");
    } else {
        out.push_str(&encode_text(text));
    }
}
