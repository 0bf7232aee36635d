//! SAX Event Types
//!
//! The three events the mapping engine consumes, in borrowed form for
//! dispatch (`Attribute`) and owned form for storage and replay (`SaxEvent`).

use super::handler::SaxHandler;
use crate::error::MapError;
use std::borrow::Cow;

/// A parsed XML attribute with its value entity-decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name (may include namespace prefix)
    pub name: Cow<'a, str>,
    /// Attribute value (entities decoded)
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn into_owned(self) -> Attribute<'static> {
        Attribute {
            name: Cow::Owned(self.name.into_owned()),
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

/// An owned SAX event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    /// Start of an element (self-closing tags produce a start and an end)
    StartElement {
        name: String,
        attributes: Vec<Attribute<'static>>,
    },
    /// Character data, CDATA content included
    Text(String),
    /// End of an element
    EndElement { name: String },
}

impl SaxEvent {
    /// Build a start event from borrowed name/value pairs
    pub fn start(name: &str, attributes: &[(&str, &str)]) -> Self {
        SaxEvent::StartElement {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(n, v)| Attribute::new(n.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn text(text: &str) -> Self {
        SaxEvent::Text(text.to_string())
    }

    pub fn end(name: &str) -> Self {
        SaxEvent::EndElement {
            name: name.to_string(),
        }
    }

    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, SaxEvent::StartElement { .. })
    }

    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, SaxEvent::EndElement { .. })
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, SaxEvent::Text(_))
    }

    /// Get the element name if this is a start or end element
    pub fn element_name(&self) -> Option<&str> {
        match self {
            SaxEvent::StartElement { name, .. } | SaxEvent::EndElement { name } => Some(name),
            SaxEvent::Text(_) => None,
        }
    }

    /// Deliver this event to a handler
    pub fn dispatch<H: SaxHandler + ?Sized>(&self, handler: &mut H) -> Result<(), MapError> {
        match self {
            SaxEvent::StartElement { name, attributes } => handler.start_element(name, attributes),
            SaxEvent::Text(text) => handler.text(text),
            SaxEvent::EndElement { name } => handler.end_element(name),
        }
    }
}

/// Feed a sequence of owned events into a handler, stopping at the first error
pub fn replay<'e, I, H>(events: I, handler: &mut H) -> Result<(), MapError>
where
    I: IntoIterator<Item = &'e SaxEvent>,
    H: SaxHandler + ?Sized,
{
    for event in events {
        event.dispatch(handler)?;
    }
    Ok(())
}
