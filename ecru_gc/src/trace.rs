//! The capability payload objects expose to the collector.
//!
//! The collector depends on payload types only through [`Collectable`]:
//! given a live payload, produce the ordered sequence of its
//! reference-valued fields so live edges can be followed without knowledge
//! of the payload's concrete schema. Payload business semantics stay
//! entirely outside this crate.

use crate::node::NodeId;
use crate::object::{Managed, RefProperty};

use smallvec::SmallVec;
use std::cell::Cell;
use std::rc::Rc;

/// Shared handle to a collectable payload object.
pub type PayloadRef = Rc<dyn Collectable>;

/// A managed payload the treadmill collector can trace.
pub trait Collectable: Managed {
    /// The reference-valued fields of this payload, in layout order.
    ///
    /// The returned sequence is a snapshot at call time; it may be empty
    /// and is always finite. The collector follows each linked referent and
    /// rescues it from condemnation if necessary.
    fn reachable_references(&self) -> SmallVec<[&RefProperty; 4]>;

    /// Back-link to the ring node currently representing this payload.
    fn node_slot(&self) -> &NodeSlot;
}

/// A payload's link to its treadmill node.
///
/// Transient bookkeeping, not part of the payload's heap layout: the slot
/// is set when the collector binds the payload to a node and cleared when
/// the payload is freed or reclaimed.
pub struct NodeSlot(Cell<Option<NodeId>>);

impl NodeSlot {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self(Cell::new(None))
    }

    /// The node currently representing the payload, if any.
    #[inline]
    pub fn get(&self) -> Option<NodeId> {
        self.0.get()
    }

    /// Bind the payload to `node`.
    #[inline]
    pub fn set(&self, node: NodeId) {
        self.0.set(Some(node));
    }

    /// Detach the payload from its node.
    #[inline]
    pub fn clear(&self) {
        self.0.set(None);
    }
}

impl Default for NodeSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// True if two payload handles refer to the same live instance.
pub(crate) fn same_payload(a: &PayloadRef, b: &PayloadRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
