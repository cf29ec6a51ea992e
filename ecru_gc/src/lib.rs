//! Ecru Garbage Collector
//!
//! A real-time garbage collector over a simulated word-addressable heap,
//! implementing Henry G. Baker's treadmill algorithm.
//!
//! # Architecture
//!
//! The crate is built in layers, leaves first:
//!
//! - **Heap**: a fixed-size array of words with raw bounds-checked get/put.
//!   Addresses are plain indices into the array; there is no paging or
//!   virtual-memory model.
//!
//! - **Object framework**: managed objects lay their fields out as typed,
//!   offset-addressed properties that are marshalled to and from the heap
//!   at the object's bound address. Reference-valued properties keep both a
//!   stored heap address and a transient live link to the referent, so the
//!   collector can walk the live object graph without paging through raw
//!   words.
//!
//! - **BasicAllocator**: a first-fit free-list space manager that grants and
//!   reclaims address ranges sized to a managed object's footprint.
//!
//! - **TreadmillAllocator**: the collector proper. Every managed payload is
//!   represented by a node on a single circular doubly-linked ring,
//!   partitioned into four color arcs. Allocation takes a white node and
//!   blackens it; incremental scan work rescues reachable condemned nodes;
//!   a flip reclaims whatever stayed condemned.
//!
//! # Usage
//!
//! ```ignore
//! use ecru_gc::{Allocator, TreadmillAllocator, TreadmillConfig};
//!
//! let root = IndirectObject::new();
//! let mut gc = TreadmillAllocator::new(TreadmillConfig::default(), vec![root.clone()])?;
//!
//! let cell = IntObject::new();
//! gc.allocate(cell.clone())?;
//! root.set_target(Some(cell.clone()))?;
//! cell.set_value(42)?;
//! ```
//!
//! # Contract
//!
//! The collector is single-threaded, synchronous and cooperative. "Real
//! time" means bounded work per call — at most one unit of scan work per
//! `scan_frequency` allocations, with a full sweep only inside a flip — not
//! concurrent execution. The heap, free list and ring are shared mutable
//! state owned by one `TreadmillAllocator`; the `Rc<RefCell<_>>` sharing
//! model makes the types deliberately `!Send`/`!Sync`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alloc;
pub mod collector;
pub mod config;
pub mod heap;
pub mod node;
pub mod object;
pub mod trace;

mod stats;

// Re-exports for convenient access
pub use alloc::{AllocError, Allocator, BasicAllocator, FreeRegion};
pub use collector::TreadmillAllocator;
pub use config::{ConfigError, TreadmillConfig};
pub use heap::{Heap, HeapRef, Word};
pub use node::{GcNode, NodeId};
pub use object::{Managed, Marshal, ObjectCore, Property, PropertyError, RefProperty};
pub use stats::GcStats;
pub use trace::{Collectable, NodeSlot, PayloadRef};

/// Node color for the four-color treadmill scheme.
///
/// The ring is partitioned into four contiguous arcs, one per color, in the
/// fixed cyclic order grey, black, white, ecru. A node's color encodes what
/// the collector currently believes about its payload.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Known live, not yet scanned (pending work).
    Grey = 0,
    /// Known live, fully scanned this cycle (safe to skip).
    Black = 1,
    /// Free, available for new allocations.
    White = 2,
    /// Presumed garbage, condemned pending the next flip but still
    /// rescuable if found reachable before then.
    Ecru = 3,
}

impl Color {
    /// Number of colors (size of the front-pointer table).
    pub(crate) const COUNT: usize = 4;
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Color::Grey => "GREY",
            Color::Black => "BLACK",
            Color::White => "WHITE",
            Color::Ecru => "ECRU",
        };
        f.write_str(name)
    }
}
