//! saxmap - Streaming XML to object mapping
//!
//! Declarative node specs describe how elements become objects: which
//! sub-paths fill which attributes and which sub-paths spawn related
//! objects. The engine consumes SAX events and builds, finalizes and
//! releases objects as the stream advances, so documents never need to be
//! held as a tree.
//!
//! Layers:
//! - core / reader / sax: the event source (memchr scanner, chunked and
//!   buffered readers, SaxHandler)
//! - mapping: node specs, paths, converters, the resolved `Mapping`
//! - engine: path matcher, element and handler stacks, `MappingParser`
//! - writer: objects back to markup
//! - strategy: parallel mapping of many documents
//!
//! ```
//! use saxmap::{Mapping, MappingParser, NaiveCollector, NodeSpec};
//!
//! let mapping = Mapping::builder()
//!     .register(NodeSpec::builder("Product").node("product").map("id", "@id").map("name", "name").build()?)
//!     .build()?;
//!
//! let mut parser = MappingParser::new(&mapping, &["Product"], NaiveCollector::new())?;
//! parser.parse_str("<product id=\"123\"><name>iPhone 5G</name></product>")?;
//!
//! let products = parser.into_collector();
//! assert_eq!(products.mapped_objects()[0].get("name").unwrap().to_string(), "iPhone 5G");
//! # Ok::<(), saxmap::MapError>(())
//! ```

pub mod collector;
pub mod core;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod object;
pub mod reader;
pub mod sax;
pub mod strategy;
pub mod writer;

pub use collector::{Collector, NaiveCollector};
pub use engine::{EngineStats, MappingParser, ParseOptions};
pub use error::{ConversionError, DeclarationError, MapError};
pub use mapping::{
    AttributeBag, BooleanConverter, Converter, DecimalConverter, FieldOptions, FnConverter, IntegerConverter, Mapping,
    NodeSpec, RelationOptions, Value,
};
pub use object::{MappedObject, Relation};
pub use writer::{to_xml, write_fragment};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                PEAK_ALLOCATED.fetch_max(current, Ordering::Relaxed);
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Memory Accounting
// ============================================================================

/// Heap accounting, live only with the `memory_tracking` feature
pub mod memory {
    #[cfg(feature = "memory_tracking")]
    use std::sync::atomic::Ordering;

    /// Bytes currently allocated
    #[cfg(feature = "memory_tracking")]
    pub fn allocated() -> usize {
        super::tracking::ALLOCATED.load(Ordering::SeqCst)
    }

    /// Highest allocation level since start or the last `reset_peak`
    #[cfg(feature = "memory_tracking")]
    pub fn peak() -> usize {
        super::tracking::PEAK_ALLOCATED.load(Ordering::SeqCst)
    }

    /// Reset the peak to the current level, returning `(current, old_peak)`
    #[cfg(feature = "memory_tracking")]
    pub fn reset_peak() -> (usize, usize) {
        let current = super::tracking::ALLOCATED.load(Ordering::SeqCst);
        let peak = super::tracking::PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
        (current, peak)
    }

    #[cfg(not(feature = "memory_tracking"))]
    pub fn allocated() -> usize {
        0
    }

    #[cfg(not(feature = "memory_tracking"))]
    pub fn peak() -> usize {
        0
    }

    #[cfg(not(feature = "memory_tracking"))]
    pub fn reset_peak() -> (usize, usize) {
        (0, 0)
    }

}
