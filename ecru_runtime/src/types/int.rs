//! Integer cells.

use ecru_gc::{Collectable, Managed, NodeSlot, ObjectCore, Property, PropertyError, RefProperty};

use smallvec::SmallVec;
use std::rc::Rc;

/// A managed cell holding a single integer.
pub struct IntObject {
    core: ObjectCore,
    slot: NodeSlot,
    value: Property<i64>,
}

impl IntObject {
    /// Create an unbound integer cell.
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
    pub fn value(&self) -> Result<i64, PropertyError> {
        self.value.get(&self.core)
    }

    /// Set the cell's value.
    pub fn set_value(&self, value: i64) -> Result<(), PropertyError> {
        self.value.set(&self.core, value)
    }
}

impl Managed for IntObject {
    fn core(&self) -> &ObjectCore {
        &self.core
    }
}

impl Collectable for IntObject {
    fn reachable_references(&self) -> SmallVec<[&RefProperty; 4]> {
        SmallVec::new()
    }

    fn node_slot(&self) -> &NodeSlot {
        &self.slot
    }
}
