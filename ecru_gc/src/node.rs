//! Treadmill ring nodes.
//!
//! A [`GcNode`] is a managed object itself — heap-allocated through the
//! same property machinery as any payload — forming one link of the
//! treadmill ring: a color word, `prev`/`next` ring links, and a `data`
//! reference to the payload it currently represents.
//!
//! Nodes live in an arena owned by the collector and are addressed by
//! [`NodeId`]. A node is created once and never deallocated; it is
//! recolored and recycled indefinitely. Ring links are dual-tracked like
//! any reference: an on-heap address word plus a transient arena index used
//! for traversal.

use crate::object::{Managed, ObjectCore, Property, PropertyError, RefProperty};
use crate::trace::PayloadRef;
use crate::Color;

use std::cell::Cell;

/// Index of a node in the collector's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// The arena index this id addresses.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One ring link: the neighbour's address on the heap plus the transient
/// arena index the collector actually traverses.
struct NodeLink {
    address: Property<Option<usize>>,
    node: Cell<Option<NodeId>>,
}

impl NodeLink {
    fn new() -> Self {
        Self {
            address: Property::new(),
            node: Cell::new(None),
        }
    }
}

/// A single link of the treadmill ring.
pub struct GcNode {
    core: ObjectCore,
    color: Property<Color>,
    prev: NodeLink,
    next: NodeLink,
    data: RefProperty,
}

impl GcNode {
    /// Create an unbound node, optionally linking a payload instance.
    ///
    /// Only the transient data link is populated; the on-heap words are
    /// written once the node is allocated.
    pub(crate) fn new(data: Option<PayloadRef>) -> Self {
        let node = Self {
            core: ObjectCore::new(),
            color: Property::new(),
            prev: NodeLink::new(),
            next: NodeLink::new(),
            data: match data {
                Some(instance) => RefProperty::with_instance(instance),
                None => RefProperty::new(),
            },
        };
        node.core.add_property(&node.color);
        node.core.add_property(&node.prev.address);
        node.core.add_property(&node.next.address);
        node.core.add_reference(&node.data);
        node
    }

    /// The node's current color.
    pub fn color(&self) -> Result<Color, PropertyError> {
        self.color.get(&self.core)
    }

    pub(crate) fn set_color(&self, color: Color) -> Result<(), PropertyError> {
        self.color.set(&self.core, color)
    }

    /// Transient link to the previous node in the ring.
    pub fn prev(&self) -> Option<NodeId> {
        self.prev.node.get()
    }

    /// Transient link to the next node in the ring.
    pub fn next(&self) -> Option<NodeId> {
        self.next.node.get()
    }

    /// Stored heap address of the previous node.
    pub fn prev_address(&self) -> Result<Option<usize>, PropertyError> {
        self.prev.address.get(&self.core)
    }

    /// Stored heap address of the next node.
    pub fn next_address(&self) -> Result<Option<usize>, PropertyError> {
        self.next.address.get(&self.core)
    }

    pub(crate) fn set_prev(
        &self,
        node: Option<NodeId>,
        address: Option<usize>,
    ) -> Result<(), PropertyError> {
        self.prev.node.set(node);
        self.prev.address.set(&self.core, address)
    }

    pub(crate) fn set_next(
        &self,
        node: Option<NodeId>,
        address: Option<usize>,
    ) -> Result<(), PropertyError> {
        self.next.node.set(node);
        self.next.address.set(&self.core, address)
    }

    /// The payload this node currently represents, if any.
    pub fn data_instance(&self) -> Option<PayloadRef> {
        self.data.instance(&self.core)
    }

    /// Stored heap address of the payload.
    pub fn data_address(&self) -> Result<Option<usize>, PropertyError> {
        self.data.address(&self.core)
    }

    pub(crate) fn set_data(&self, instance: Option<PayloadRef>) -> Result<(), PropertyError> {
        self.data.set_instance(&self.core, instance)
    }
}

impl Managed for GcNode {
    fn core(&self) -> &ObjectCore {
        &self.core
    }
}
