//! Path patterns
//!
//! A path is written relative to the element that opens a mapped object:
//!
//! - `""`                       immediate text of the object element
//! - `name` / `a/b/c`           text of a descendant element
//! - `@id` / `name/@confirmed`  an attribute (always the last segment)
//! - `extra/eField[name=geo]`   an element selected by one of its attributes
//! - `features/*`               any child at this position (relations only)

use std::fmt;

/// One step of a path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal element tag
    Tag(String),
    /// `*`: any element tag
    Wildcard,
    /// `@name`: attribute of the preceding element
    Attribute(String),
    /// `tag[attr=value]`: element whose attribute equals a value
    Conditioned { tag: String, attr: String, value: String },
}

impl Segment {
    /// Whether this element segment accepts the tag, ignoring conditions
    #[inline]
    pub fn accepts_tag(&self, tag: &str) -> bool {
        match self {
            Segment::Tag(t) | Segment::Conditioned { tag: t, .. } => t == tag,
            Segment::Wildcard => true,
            Segment::Attribute(_) => false,
        }
    }

    /// Tag written out when serializing, `None` for wildcard/attribute segments
    pub fn tag(&self) -> Option<&str> {
        match self {
            Segment::Tag(t) | Segment::Conditioned { tag: t, .. } => Some(t),
            _ => None,
        }
    }
}

/// How specific a pattern is; lower sorts first when ranking matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    Literal,
    Conditioned,
    Wildcard,
}

/// A parsed path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a path, returning a short reason when it is malformed
    pub fn parse(raw: &str) -> Result<Self, &'static str> {
        let mut segments = Vec::new();

        if !raw.is_empty() {
            for part in split_segments(raw)? {
                segments.push(parse_segment(part)?);
            }
        }

        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            match segment {
                Segment::Attribute(_) if !last => {
                    return Err("attribute reference must be the last segment")
                }
                Segment::Wildcard if !last => return Err("wildcard must be the last segment"),
                _ => {}
            }
        }

        Ok(PathPattern {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Pattern matching any immediate child (`*`)
    pub fn any_child() -> Self {
        PathPattern {
            raw: "*".to_string(),
            segments: vec![Segment::Wildcard],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True for the empty path (immediate text)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Trailing attribute name, if the path targets an attribute
    pub fn attribute(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::Attribute(name)) => Some(name),
            _ => None,
        }
    }

    /// The element steps, without a trailing attribute reference
    pub fn element_segments(&self) -> &[Segment] {
        match self.segments.last() {
            Some(Segment::Attribute(_)) => &self.segments[..self.segments.len() - 1],
            _ => &self.segments,
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Wildcard))
    }

    pub fn has_conditions(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Conditioned { .. }))
    }

    pub fn specificity(&self) -> Specificity {
        if self.has_wildcard() {
            Specificity::Wildcard
        } else if self.has_conditions() {
            Specificity::Conditioned
        } else {
            Specificity::Literal
        }
    }

    /// Structural match against element tags plus an optional attribute name
    ///
    /// Attribute conditions are not checked here; see `conditions_hold`.
    pub fn matches_structure(&self, tags: &[&str], attribute: Option<&str>) -> bool {
        if self.attribute() != attribute {
            return false;
        }
        let elements = self.element_segments();
        elements.len() == tags.len()
            && elements
                .iter()
                .zip(tags)
                .all(|(segment, tag)| segment.accepts_tag(tag))
    }

    /// Check every conditioned segment through `attr_equals(depth, attr, value)`
    ///
    /// `depth` indexes the element steps of the path, starting at zero.
    pub fn conditions_hold<F>(&self, mut attr_equals: F) -> bool
    where
        F: FnMut(usize, &str, &str) -> bool,
    {
        self.element_segments()
            .iter()
            .enumerate()
            .all(|(depth, segment)| match segment {
                Segment::Conditioned { attr, value, .. } => attr_equals(depth, attr, value),
                _ => true,
            })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split on '/' outside condition brackets
fn split_segments(raw: &str) -> Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, b) in raw.bytes().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or("unbalanced condition brackets")?;
            }
            b'/' if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced condition brackets");
    }
    parts.push(&raw[start..]);
    Ok(parts)
}

fn parse_segment(part: &str) -> Result<Segment, &'static str> {
    let part = part.trim();
    if part.is_empty() {
        return Err("empty path segment");
    }
    if part == "*" {
        return Ok(Segment::Wildcard);
    }
    if let Some(name) = part.strip_prefix('@') {
        if !is_name(name) {
            return Err("invalid attribute name");
        }
        return Ok(Segment::Attribute(name.to_string()));
    }

    match part.find('[') {
        None => {
            if !is_name(part) {
                return Err("invalid element name");
            }
            Ok(Segment::Tag(part.to_string()))
        }
        Some(open) => {
            let tag = &part[..open];
            let condition = part[open + 1..]
                .strip_suffix(']')
                .ok_or("condition must close the segment")?;
            let (attr, value) = condition
                .split_once('=')
                .ok_or("condition must have the form attr=value")?;
            let attr = attr.trim().trim_start_matches('@');
            if !is_name(tag) || !is_name(attr) {
                return Err("invalid name in condition");
            }
            Ok(Segment::Conditioned {
                tag: tag.to_string(),
                attr: attr.to_string(),
                value: unquote(value.trim()).to_string(),
            })
        }
    }
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && !s
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '[' | ']' | '@' | '=' | '*' | '"' | '\''))
}
