//! Floating-point cells.

use ecru_gc::{Collectable, Managed, NodeSlot, ObjectCore, Property, PropertyError, RefProperty};

use smallvec::SmallVec;
use std::rc::Rc;

/// A managed cell holding a single double-precision float, stored as its
/// IEEE bit pattern.
pub struct FloatObject {
    core: ObjectCore,
    slot: NodeSlot,
    value: Property<f64>,
}

impl FloatObject {
    /// Create an unbound float cell.
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
    pub fn value(&self) -> Result<f64, PropertyError> {
        self.value.get(&self.core)
    }

    /// Set the cell's value.
    pub fn set_value(&self, value: f64) -> Result<(), PropertyError> {
        self.value.set(&self.core, value)
    }
}

impl Managed for FloatObject {
    fn core(&self) -> &ObjectCore {
        &self.core
    }
}

impl Collectable for FloatObject {
    fn reachable_references(&self) -> SmallVec<[&RefProperty; 4]> {
        SmallVec::new()
    }

    fn node_slot(&self) -> &NodeSlot {
        &self.slot
    }
}
