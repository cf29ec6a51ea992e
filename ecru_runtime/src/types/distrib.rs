//! Distribution objects.
//!
//! A distribution payload holds an element-count word plus one reference
//! per element, written by the `on_allocate` hook like a function's arity.

use ecru_gc::{
    Collectable, Managed, NodeSlot, ObjectCore, PayloadRef, Property, PropertyError, RefProperty,
};

use smallvec::SmallVec;
use std::rc::Rc;

/// A managed distribution object over a fixed number of element
/// references.
pub struct DistribObject {
    core: ObjectCore,
    slot: NodeSlot,
    element_count: Property<i64>,
    elements: Vec<RefProperty>,
}

impl DistribObject {
    /// Create an unbound distribution with `elements` element slots.
    pub fn new(elements: usize) -> Rc<Self> {
        let distrib = Self {
            core: ObjectCore::new(),
            slot: NodeSlot::new(),
            element_count: Property::new(),
            elements: (0..elements).map(|_| RefProperty::new()).collect(),
        };
        distrib.core.add_property(&distrib.element_count);
        for element in &distrib.elements {
            distrib.core.add_reference(element);
        }
        Rc::new(distrib)
    }

    /// The number of elements, as marshalled on the heap.
    pub fn element_count(&self) -> Result<usize, PropertyError> {
        Ok(self.element_count.get(&self.core)? as usize)
    }

    /// The reference property for element `index`.
    pub fn element(&self, index: usize) -> &RefProperty {
        &self.elements[index]
    }

    /// Bind element `index` to `target` (or clear it with `None`).
    pub fn set_element(
        &self,
        index: usize,
        target: Option<PayloadRef>,
    ) -> Result<(), PropertyError> {
        self.elements[index].set_instance(&self.core, target)
    }

    /// The live instance bound to element `index`, if any.
    pub fn element_instance(&self, index: usize) -> Option<PayloadRef> {
        self.elements[index].instance(&self.core)
    }
}

impl Managed for DistribObject {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn on_allocate(&self) -> Result<(), PropertyError> {
        self.element_count.set(&self.core, self.elements.len() as i64)
    }
}

impl Collectable for DistribObject {
    fn reachable_references(&self) -> SmallVec<[&RefProperty; 4]> {
        self.elements.iter().collect()
    }

    fn node_slot(&self) -> &NodeSlot {
        &self.slot
    }
}
