//! Boolean cells.

use ecru_gc::{Collectable, Managed, NodeSlot, ObjectCore, Property, PropertyError, RefProperty};

use smallvec::SmallVec;
use std::rc::Rc;

/// A managed cell holding a single boolean.
pub struct BoolObject {
    core: ObjectCore,
    slot: NodeSlot,
    value: Property<bool>,
}

impl BoolObject {
    /// Create an unbound boolean cell.
    pub fn new() -> Rc<Self> {
        let cell = Self {
            core: ObjectCore::new(),
            slot: NodeSlot::new(),
            value: Property::new(),
        };
        cell.core.add_property(&cell.value);
        Rc::new(cell)
    }

    /// The cell's value.
    pub fn value(&self) -> Result<bool, PropertyError> {
        self.value.get(&self.core)
    }

    /// Set the cell's value.
    pub fn set_value(&self, value: bool) -> Result<(), PropertyError> {
        self.value.set(&self.core, value)
    }
}

impl Managed for BoolObject {
    fn core(&self) -> &ObjectCore {
        &self.core
    }
}

impl Collectable for BoolObject {
    fn reachable_references(&self) -> SmallVec<[&RefProperty; 4]> {
        SmallVec::new()
    }

    fn node_slot(&self) -> &NodeSlot {
        &self.slot
    }
}
