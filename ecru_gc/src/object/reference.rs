//! Reference-valued properties.
//!
//! A reference property stores the address of a referent as its on-heap
//! value, and separately keeps a transient, non-owning link to the
//! referent's live instance for traversal without address resolution.
//!
//! The two representations are kept in sync:
//!
//! - reading the live instance rebinds the referent to the parent's current
//!   heap, so the instance always reflects where its owning graph lives;
//! - reading the stored address resynchronizes it from the live instance
//!   when they disagree (the instance has authority);
//! - writing the stored address pushes the new address into the live
//!   instance (the written value has authority).
//!
//! The live link is used only for traversal; lifetimes are controlled
//! solely by the allocator and collector.

use crate::object::{Managed, ObjectCore, Property, PropertyError};
use crate::trace::PayloadRef;

use std::cell::RefCell;
use std::rc::Rc;

/// An address-valued property with a transient live link to its referent.
pub struct RefProperty {
    /// The on-heap representation: the referent's address, nil when unset.
    address: Property<Option<usize>>,
    /// Non-owning link to the referent's live instance.
    referent: RefCell<Option<PayloadRef>>,
}

impl RefProperty {
    /// Create a reference property with no referent.
    pub fn new() -> Self {
        Self {
            address: Property::new(),
            referent: RefCell::new(None),
        }
    }

    /// Create a reference property that already links `instance`.
    ///
    /// Only the transient link is populated; the stored address is
    /// synchronized on first access once the parent object is bound.
    pub fn with_instance(instance: PayloadRef) -> Self {
        Self {
            address: Property::new(),
            referent: RefCell::new(Some(instance)),
        }
    }

    /// The underlying address property, for registration with a parent
    /// core.
    pub(crate) fn address_cell(&self) -> &Property<Option<usize>> {
        &self.address
    }

    /// True if a live instance is currently linked.
    pub fn has_instance(&self) -> bool {
        self.referent.borrow().is_some()
    }

    /// The referent's live instance, if any.
    ///
    /// Reading the link synchronizes the referent's heap binding to the
    /// parent's current heap.
    pub fn instance(&self, core: &ObjectCore) -> Option<PayloadRef> {
        let referent = self.referent.borrow();
        let instance = referent.as_ref()?;
        instance.core().set_heap(core.heap());
        Some(Rc::clone(instance))
    }

    /// Replace the live instance and store its current address.
    pub fn set_instance(
        &self,
        core: &ObjectCore,
        instance: Option<PayloadRef>,
    ) -> Result<(), PropertyError> {
        let address = instance.as_ref().and_then(|i| i.core().address());
        *self.referent.borrow_mut() = instance;
        self.address.set(core, address)
    }

    /// The stored referent address, resynchronized from the live instance
    /// when the two disagree.
    pub fn address(&self, core: &ObjectCore) -> Result<Option<usize>, PropertyError> {
        let stored = self.address.get(core)?;
        if let Some(instance) = self.referent.borrow().as_ref() {
            let live = instance.core().address();
            if live != stored {
                self.address.set(core, live)?;
                return Ok(live);
            }
        }
        Ok(stored)
    }

    /// Store a referent address, relocating the live instance to it.
    pub fn set_address(
        &self,
        core: &ObjectCore,
        address: Option<usize>,
    ) -> Result<(), PropertyError> {
        if let Some(instance) = self.referent.borrow().as_ref() {
            instance.core().set_address(address);
        }
        self.address.set(core, address)
    }
}

impl Default for RefProperty {
    fn default() -> Self {
        Self::new()
    }
}
