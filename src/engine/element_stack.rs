//! Element Stack
//!
//! Open elements since the innermost mapped-object boundary. Frame zero is
//! the boundary element itself; the path of a nested element is the tags
//! of frames `1..=depth`, so the boundary has the empty path.

use crate::mapping::AttributeBag;
use crate::sax::Attribute;

/// One open element
#[derive(Debug, Default)]
pub struct ElementFrame {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    /// Whether any text event arrived while this element was innermost
    pub saw_text: bool,
    /// Recursive map-all capture of unmapped children
    pub capture: AttributeBag,
    /// Whether an explicit rule consumed anything inside this element
    pub mapped: bool,
}

impl ElementFrame {
    pub fn new(tag: &str, attributes: &[Attribute<'_>]) -> Self {
        ElementFrame {
            tag: tag.to_string(),
            attributes: attributes
                .iter()
                .map(|a| (a.name.to_string(), a.value.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Stack of open elements under one handler frame
#[derive(Debug, Default)]
pub struct ElementStack {
    frames: Vec<ElementFrame>,
}

impl ElementStack {
    /// Stack opened by a boundary element
    pub fn with_boundary(boundary: ElementFrame) -> Self {
        let mut frames = Vec::with_capacity(8);
        frames.push(boundary);
        ElementStack { frames }
    }

    #[inline]
    pub fn push(&mut self, frame: ElementFrame) {
        self.frames.push(frame);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<ElementFrame> {
        self.frames.pop()
    }

    /// Number of open elements, boundary included
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top(&self) -> Option<&ElementFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut ElementFrame> {
        self.frames.last_mut()
    }

    /// Append character data to the innermost element
    pub fn append_text(&mut self, text: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.text.push_str(text);
            frame.saw_text = true;
        }
    }

    /// Tags relative to the boundary (empty while only the boundary is open)
    pub fn path(&self) -> Vec<&str> {
        self.frames.iter().skip(1).map(|f| f.tag.as_str()).collect()
    }

    /// Whether the element at path step `depth` has `attr` equal to `value`
    pub fn attribute_equals(&self, depth: usize, attr: &str, value: &str) -> bool {
        self.frames
            .get(depth + 1)
            .and_then(|f| f.attribute(attr))
            .is_some_and(|v| v == value)
    }

    /// Mark every open element as having mapped content
    pub fn mark_mapped(&mut self) {
        for frame in &mut self.frames {
            frame.mapped = true;
        }
    }
}
