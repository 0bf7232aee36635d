//! SAX Handler Trait
//!
//! Implement this trait to receive XML parsing events. Scanners call these
//! methods as they tokenize the input; names and text are already decoded.
//! Returning an error stops the scan: no further events are delivered.

use super::events::{Attribute, SaxEvent};
use crate::error::MapError;

/// Receiver of start/text/end events
pub trait SaxHandler {
    /// Called when an element starts
    ///
    /// # Arguments
    /// * `name` - Element name, including any namespace prefix
    /// * `attributes` - Attributes in document order
    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> Result<(), MapError>;

    /// Called for character data; a run of text may arrive in several calls
    fn text(&mut self, text: &str) -> Result<(), MapError>;

    /// Called when an element ends
    fn end_element(&mut self, name: &str) -> Result<(), MapError>;
}

impl<H: SaxHandler + ?Sized> SaxHandler for &mut H {
    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> Result<(), MapError> {
        (**self).start_element(name, attributes)
    }

    fn text(&mut self, text: &str) -> Result<(), MapError> {
        (**self).text(text)
    }

    fn end_element(&mut self, name: &str) -> Result<(), MapError> {
        (**self).end_element(name)
    }
}

/// Handler that records every event it receives
///
/// Useful for capturing a tokenized document once and replaying it.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<SaxEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded events as a slice
    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    /// Take the recorded events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl SaxHandler for EventRecorder {
    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> Result<(), MapError> {
        self.events.push(SaxEvent::StartElement {
            name: name.to_string(),
            attributes: attributes.iter().cloned().map(Attribute::into_owned).collect(),
        });
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), MapError> {
        // Merge adjacent runs so recordings compare equal regardless of chunking
        match self.events.last_mut() {
            Some(SaxEvent::Text(prev)) => prev.push_str(text),
            _ => self.events.push(SaxEvent::Text(text.to_string())),
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), MapError> {
        self.events.push(SaxEvent::EndElement {
            name: name.to_string(),
        });
        Ok(())
    }
}
