//! Indirection cells.

use ecru_gc::{
    Collectable, Managed, NodeSlot, ObjectCore, PayloadRef, PropertyError, RefProperty,
};

use smallvec::SmallVec;
use std::rc::Rc;

/// A managed cell holding a single reference to another payload.
///
/// Chains of indirections are the simplest object graphs the collector has
/// to keep alive — or reclaim, once the chain's head is cut.
pub struct IndirectObject {
    core: ObjectCore,
    slot: NodeSlot,
    value: RefProperty,
}

impl IndirectObject {
    /// Create an unbound indirection cell with no target.
    pub fn new() -> Rc<Self> {
        let cell = Self {
            core: ObjectCore::new(),
            slot: NodeSlot::new(),
            value: RefProperty::new(),
        };
        cell.core.add_reference(&cell.value);
        Rc::new(cell)
    }

    /// The live instance this cell points at, if any.
    pub fn target(&self) -> Option<PayloadRef> {
        self.value.instance(&self.core)
    }

    /// Point this cell at `target` (or clear it with `None`).
    pub fn set_target(&self, target: Option<PayloadRef>) -> Result<(), PropertyError> {
        self.value.set_instance(&self.core, target)
    }

    /// The stored address of the target.
    pub fn target_address(&self) -> Result<Option<usize>, PropertyError> {
        self.value.address(&self.core)
    }
}

impl Managed for IndirectObject {
    fn core(&self) -> &ObjectCore {
        &self.core
    }
}

impl Collectable for IndirectObject {
    fn reachable_references(&self) -> SmallVec<[&RefProperty; 4]> {
        let mut references = SmallVec::new();
        references.push(&self.value);
        references
    }

    fn node_slot(&self) -> &NodeSlot {
        &self.slot
    }
}
