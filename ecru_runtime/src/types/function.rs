//! Function objects.
//!
//! A function payload holds an arity word plus one reference per
//! parameter. The arity is constant metadata, marshalled by the
//! `on_allocate` hook the moment the object is bound.

use ecru_gc::{
    Collectable, Managed, NodeSlot, ObjectCore, PayloadRef, Property, PropertyError, RefProperty,
};

use smallvec::SmallVec;
use std::rc::Rc;

/// A managed function object with a fixed number of parameter references.
pub struct FunctionObject {
    core: ObjectCore,
    slot: NodeSlot,
    arity: Property<i64>,
    params: Vec<RefProperty>,
}

impl FunctionObject {
    /// Create an unbound function object with `arity` parameter slots.
    pub fn new(arity: usize) -> Rc<Self> {
        let function = Self {
            core: ObjectCore::new(),
            slot: NodeSlot::new(),
            arity: Property::new(),
            params: (0..arity).map(|_| RefProperty::new()).collect(),
        };
        function.core.add_property(&function.arity);
        for param in &function.params {
            function.core.add_reference(param);
        }
        Rc::new(function)
    }

    /// The function's arity, as marshalled on the heap.
    pub fn arity(&self) -> Result<usize, PropertyError> {
        Ok(self.arity.get(&self.core)? as usize)
    }

    /// The reference property for parameter `index`.
    pub fn param(&self, index: usize) -> &RefProperty {
        &self.params[index]
    }

    /// Bind parameter `index` to `target` (or clear it with `None`).
    pub fn set_param(&self, index: usize, target: Option<PayloadRef>) -> Result<(), PropertyError> {
        self.params[index].set_instance(&self.core, target)
    }

    /// The live instance bound to parameter `index`, if any.
    pub fn param_instance(&self, index: usize) -> Option<PayloadRef> {
        self.params[index].instance(&self.core)
    }
}

impl Managed for FunctionObject {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn on_allocate(&self) -> Result<(), PropertyError> {
        self.arity.set(&self.core, self.params.len() as i64)
    }
}

impl Collectable for FunctionObject {
    fn reachable_references(&self) -> SmallVec<[&RefProperty; 4]> {
        self.params.iter().collect()
    }

    fn node_slot(&self) -> &NodeSlot {
        &self.slot
    }
}
