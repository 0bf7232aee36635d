//! SAX (Simple API for XML) Module
//!
//! The event contract between scanners and the mapping engine.
//!
//! ## Architecture
//!
//! ```text
//! UnifiedScanner / ChunkedScanner / replay(SaxEvent[]) ---> SaxHandler
//!                                                              |
//!                                                              v
//!                                                     HandlerStack (engine)
//! ```
//!
//! ## Event Types
//!
//! - `StartElement` - Element opening tag with name and attributes
//! - `Text` - Character data, entity-decoded; CDATA arrives as text
//! - `EndElement` - Element closing tag

pub mod events;
pub mod handler;

pub use events::{replay, Attribute, SaxEvent};
pub use handler::{EventRecorder, SaxHandler};
