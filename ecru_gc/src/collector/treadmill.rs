//! Henry G. Baker's real-time treadmill collector.
//!
//! Every payload object is represented by a [`GcNode`] on a single circular
//! doubly-linked ring, partitioned into four contiguous arcs in fixed
//! cyclic order:
//!
//! ```text
//! top  <-> ... grey nodes ...  <-> scan
//! scan <-> ... black nodes ... <-> free
//! free <-> ... white nodes ... <-> bottom
//! bottom <-> ... ecru nodes ... <-> top
//! ```
//!
//! `top`, `scan`, `free` and `bottom` are the four color fronts: each is
//! the first node of its color when the ring is walked from itself, and is
//! unset exactly when no node of that color exists.
//!
//! Collection is incremental: every `scan_frequency` allocations one grey
//! node is scanned, rescuing any condemned (ecru) referents back to grey.
//! Only when allocation would otherwise fail does a flip run the cycle to
//! completion — reclaiming whatever stayed condemned, condemning this
//! cycle's survivors, and re-marking the roots. Pause time per call is
//! bounded by the work a single flip can do, never by the heap as a whole.
//!
//! See "The Treadmill: Real-Time Garbage Collection Without Motion
//! Sickness" (Baker, 1992).

use crate::alloc::{AllocError, Allocator, BasicAllocator};
use crate::config::TreadmillConfig;
use crate::node::{GcNode, NodeId};
use crate::object::{Managed, PropertyError};
use crate::stats::GcStats;
use crate::trace::{same_payload, Collectable, PayloadRef};
use crate::Color;

use std::rc::Rc;

/// A real-time treadmill collector over a free-list-backed heap.
///
/// The collector owns the heap (through its [`BasicAllocator`]), the node
/// arena and the ring; all mutation goes through `&mut self`, which is what
/// makes ring surgery atomic with respect to any observation of ring state.
pub struct TreadmillAllocator {
    /// Allocations between forced scan steps.
    scan_frequency: usize,
    /// Allocations since the last forced scan.
    current_scan: usize,
    /// Node arena. Nodes are created once and never destroyed; the ring
    /// links them by arena index.
    nodes: Vec<GcNode>,
    /// Distinguished roots: never freeable, re-marked grey by every flip.
    roots: Vec<PayloadRef>,
    /// The underlying space manager.
    space: BasicAllocator,
    /// The four color fronts, indexed by color.
    fronts: [Option<NodeId>; Color::COUNT],
    /// Activity counters.
    stats: GcStats,
}

impl TreadmillAllocator {
    /// Create a collector with the given configuration and root set.
    ///
    /// Every root (and its node) is allocated immediately and marked grey.
    /// Duplicate root handles are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails validation.
    pub fn new(config: TreadmillConfig, roots: Vec<PayloadRef>) -> Result<Self, AllocError> {
        config.validate().expect("invalid treadmill configuration");
        let mut collector = Self {
            scan_frequency: config.scan_frequency,
            current_scan: 0,
            nodes: Vec::new(),
            roots: Vec::new(),
            space: BasicAllocator::new(config.heap_size),
            fronts: [None; Color::COUNT],
            stats: GcStats::new(),
        };
        collector.init_ring(roots)?;
        Ok(collector)
    }

    /// Create a collector with the default configuration.
    pub fn with_roots(roots: Vec<PayloadRef>) -> Result<Self, AllocError> {
        Self::new(TreadmillConfig::default(), roots)
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// Scan one grey node, if any exists.
    ///
    /// Every reachable reference of the node's payload is followed; a
    /// referent whose node is currently condemned (ecru) is rescued back to
    /// grey. The scanned node itself turns black. References whose live
    /// instance has no current node (an explicitly freed object) are
    /// skipped.
    ///
    /// Driven automatically by [`allocate`]; calling it directly performs
    /// the same single unit of work.
    ///
    /// [`allocate`]: Allocator::allocate
    pub fn scan(&mut self) -> Result<(), AllocError> {
        let Some(to_scan) = self.front(Color::Grey) else {
            return Ok(());
        };
        if let Some(payload) = self.node(to_scan).data_instance() {
            for reference in payload.reachable_references() {
                let Some(referent) = reference.instance(payload.core()) else {
                    continue;
                };
                let Some(referent_node) = referent.node_slot().get() else {
                    continue;
                };
                if self.color_of(referent_node)? == Color::Ecru {
                    self.make(referent_node, Color::Grey)?;
                }
            }
        }
        self.make(to_scan, Color::Black)?;
        self.stats.record_scan();
        Ok(())
    }

    /// Complete the current collection cycle and start the next one.
    ///
    /// Scans until no grey node remains, then: every ecru node has its
    /// payload's space freed and turns white; one new white node is added
    /// to the ring; every black node — this cycle's survivors — is
    /// condemned to ecru; and all roots are re-marked grey, seeding the
    /// next cycle.
    ///
    /// Driven automatically when allocation finds no white node.
    pub fn flip(&mut self) -> Result<(), AllocError> {
        // finish the in-flight cycle
        while self.any_of(Color::Grey) {
            self.scan()?;
        }

        // reclaim every condemned node, releasing its payload's space
        let mut cursor = self.front(Color::Ecru);
        while let Some(id) = cursor {
            if self.color_of(id)? != Color::Ecru {
                break;
            }
            let next = self.next_of(id);
            if let Some(payload) = self.node(id).data_instance() {
                payload.node_slot().clear();
                self.node(id).set_data(None)?;
                self.space.free(&*payload)?;
                self.stats.record_reclaimed();
            }
            self.make(id, Color::White)?;
            cursor = next;
        }

        // grow the ring by one free node
        self.add_free_node()?;

        // condemn this cycle's survivors
        let mut cursor = self.front(Color::Black);
        while let Some(id) = cursor {
            if self.color_of(id)? != Color::Black {
                break;
            }
            let next = self.next_of(id);
            self.make(id, Color::Ecru)?;
            cursor = next;
        }

        self.mark_roots()?;
        self.stats.record_flip();
        Ok(())
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Total heap size in words.
    pub fn heap_size(&self) -> usize {
        self.space.heap_size()
    }

    /// Total free space in words.
    pub fn free_space(&self) -> usize {
        self.space.free_space()
    }

    /// Number of free regions in the underlying space manager.
    pub fn free_regions(&self) -> usize {
        self.space.free_regions()
    }

    /// Number of currently allocated objects, ring nodes included.
    pub fn allocated_objects(&self) -> usize {
        self.space.allocated_objects()
    }

    /// Total number of ring nodes ever created.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Activity counters.
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Number of ring nodes that are not white — that is, nodes currently
    /// standing for a live or condemned payload.
    pub fn non_white_nodes(&self) -> Result<usize, PropertyError> {
        let mut count = 0;
        for node in &self.nodes {
            if node.color()? != Color::White {
                count += 1;
            }
        }
        Ok(count)
    }

    /// The colors of the ring's nodes in ring order, starting from the
    /// first available front. Observational only.
    pub fn ring_colors(&self) -> Result<Vec<Color>, PropertyError> {
        self.walk_ring()
            .into_iter()
            .map(|id| self.color_of(id))
            .collect()
    }

    /// A textual dump of the ring for debugging.
    ///
    /// Each node is rendered as `[<fronts> <color> <payload address>]`,
    /// where `<fronts>` marks the node's front roles (`T`op, `S`can,
    /// `F`ree, `B`ottom).
    pub fn dump_ring(&self) -> String {
        let ring = self.walk_ring();
        if ring.is_empty() {
            return String::from("no nodes");
        }
        let rendered: Vec<String> = ring.into_iter().map(|id| self.dump_node(id)).collect();
        rendered.join(" <=> ")
    }

    // =========================================================================
    // Allocation internals
    // =========================================================================

    fn init_ring(&mut self, roots: Vec<PayloadRef>) -> Result<(), AllocError> {
        let mut first: Option<NodeId> = None;
        for root in roots {
            if self.is_root(&root) {
                continue;
            }
            let id = self.allocate_root(Rc::clone(&root))?;
            self.roots.push(root);
            match first {
                None => {
                    first = Some(id);
                    self.link_next(id, Some(id))?;
                    self.link_prev(id, Some(id))?;
                }
                Some(first_id) => {
                    // splice before the first node: the ring append
                    let last = self
                        .prev_of(first_id)
                        .expect("ring corrupted: first node has no prev link");
                    self.link_next(last, Some(id))?;
                    self.link_prev(id, Some(last))?;
                    self.link_next(id, Some(first_id))?;
                    self.link_prev(first_id, Some(id))?;
                }
            }
        }
        if first.is_some() {
            self.set_front(Color::Grey, first);
        }
        Ok(())
    }

    /// Allocate a root payload and the node that represents it. Root nodes
    /// start grey; the caller links them into the initial ring.
    fn allocate_root(&mut self, root: PayloadRef) -> Result<NodeId, AllocError> {
        self.space.allocate(&root)?;
        let node = GcNode::new(Some(Rc::clone(&root)));
        self.space.allocate(&node)?;
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        self.stats.record_node();
        root.node_slot().set(id);
        self.node(id).set_color(Color::Grey)?;
        self.node(id).set_data(Some(root))?;
        Ok(id)
    }

    /// Allocate and add a new white node to the ring.
    fn add_free_node(&mut self) -> Result<(), AllocError> {
        let node = GcNode::new(None);
        self.space.allocate(&node)?;
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        self.stats.record_node();
        self.node(id).set_color(Color::White)?;
        self.make(id, Color::White)?;
        Ok(())
    }

    /// Mark all roots grey.
    fn mark_roots(&mut self) -> Result<(), AllocError> {
        for index in 0..self.roots.len() {
            let root = Rc::clone(&self.roots[index]);
            let Some(node) = root.node_slot().get() else {
                continue;
            };
            if self.color_of(node)? != Color::Grey {
                self.make(node, Color::Grey)?;
            }
        }
        Ok(())
    }

    /// True if no white node is available for a new allocation.
    fn exhausted(&self) -> Result<bool, PropertyError> {
        match self.front(Color::White) {
            None => Ok(true),
            Some(front) => Ok(self.color_of(front)? != Color::White),
        }
    }

    /// Bind `object` into heap space and the white front node, blackening
    /// the node. A freshly allocated object starts out assumed live and
    /// already scanned: it was just created and no unscanned edge can point
    /// at it yet.
    fn allocate_into_free(&mut self, object: PayloadRef) -> Result<(), AllocError> {
        self.space.allocate(&object)?;
        let Some(free_node) = self.front(Color::White) else {
            return Err(AllocError::OutOfMemory {
                requested: object.core().size(),
            });
        };
        object.node_slot().set(free_node);
        self.node(free_node).set_data(Some(Rc::clone(&object)))?;
        self.make(free_node, Color::Black)?;
        self.stats.record_allocation();
        Ok(())
    }

    fn is_root(&self, object: &PayloadRef) -> bool {
        self.roots.iter().any(|root| same_payload(root, object))
    }

    // =========================================================================
    // Ring surgery
    // =========================================================================

    fn node(&self, id: NodeId) -> &GcNode {
        &self.nodes[id.index()]
    }

    fn front(&self, color: Color) -> Option<NodeId> {
        self.fronts[color as usize]
    }

    fn set_front(&mut self, color: Color, node: Option<NodeId>) {
        self.fronts[color as usize] = node;
    }

    /// True if any node of this color exists.
    fn any_of(&self, color: Color) -> bool {
        self.front(color).is_some()
    }

    fn color_of(&self, id: NodeId) -> Result<Color, PropertyError> {
        self.node(id).color()
    }

    fn next_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next()
    }

    fn prev_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev()
    }

    /// Relink `from.next` to `to`, keeping the on-heap address word in
    /// sync with the transient arena link.
    fn link_next(&self, from: NodeId, to: Option<NodeId>) -> Result<(), PropertyError> {
        let address = to.and_then(|id| self.node(id).core().address());
        self.node(from).set_next(to, address)
    }

    /// Relink `from.prev` to `to`, keeping the on-heap address word in
    /// sync with the transient arena link.
    fn link_prev(&self, from: NodeId, to: Option<NodeId>) -> Result<(), PropertyError> {
        let address = to.and_then(|id| self.node(id).core().address());
        self.node(from).set_prev(to, address)
    }

    /// The node a newly colored node must be inserted immediately before,
    /// so that the four-arc cyclic order is preserved.
    ///
    /// Per target color, the checks fall through in a fixed priority
    /// order. When the target color already has a front, the insertion
    /// point is the node after that front — the new node lands just behind
    /// the front, inside the arc. The fallbacks insert just before the
    /// front of the arc that cyclically follows the target color, which is
    /// the same position when the target arc is empty. Reordering any of
    /// these cascades changes which arc a node lands in.
    fn insertion_point(&self, color: Color) -> Option<NodeId> {
        match color {
            Color::Ecru => {
                if let Some(front) = self.front(Color::Ecru) {
                    return self.next_of(front);
                }
                if let Some(top) = self.front(Color::Grey) {
                    return Some(top);
                }
                if let Some(scan) = self.front(Color::Black) {
                    return Some(scan);
                }
                if let Some(free) = self.front(Color::White) {
                    return Some(free);
                }
            }
            Color::Grey => {
                if let Some(front) = self.front(Color::Grey) {
                    return self.next_of(front);
                }
                if let Some(scan) = self.front(Color::Black) {
                    return Some(scan);
                }
                if let Some(free) = self.front(Color::White) {
                    return Some(free);
                }
                if let Some(bottom) = self.front(Color::Ecru) {
                    return Some(bottom);
                }
            }
            Color::Black => {
                if let Some(front) = self.front(Color::Black) {
                    return self.next_of(front);
                }
                if let Some(free) = self.front(Color::White) {
                    return Some(free);
                }
                if let Some(bottom) = self.front(Color::Ecru) {
                    return Some(bottom);
                }
                if let Some(top) = self.front(Color::Grey) {
                    return Some(top);
                }
            }
            Color::White => {
                if let Some(front) = self.front(Color::White) {
                    return self.next_of(front);
                }
                if let Some(bottom) = self.front(Color::Ecru) {
                    return Some(bottom);
                }
                if let Some(scan) = self.front(Color::Black) {
                    return Some(scan);
                }
                if let Some(top) = self.front(Color::Grey) {
                    return Some(top);
                }
            }
        }
        self.front(Color::Grey)
    }

    /// Recolor `node` and move it into the correct place in the ring,
    /// respecting the existing color fronts.
    fn make(&mut self, node: NodeId, color: Color) -> Result<(), PropertyError> {
        let at = self.insertion_point(color);
        self.insert_prev(at, node)?;
        self.node(node).set_color(color)?;
        self.reassign_fronts(node)
    }

    /// Insert `new_prev` immediately before `at`, unlinking it from its
    /// current position. A self-insertion leaves the node physically in
    /// place (it is already where it belongs); an absent insertion point
    /// means the ring is empty and the node becomes the whole ring.
    fn insert_prev(&mut self, at: Option<NodeId>, new_prev: NodeId) -> Result<(), PropertyError> {
        let Some(at) = at else {
            self.unset_fronts(new_prev)?;
            self.link_next(new_prev, Some(new_prev))?;
            self.link_prev(new_prev, Some(new_prev))?;
            return Ok(());
        };
        if at == new_prev {
            self.unset_fronts(new_prev)?;
            return Ok(());
        }
        self.unlink(new_prev)?;
        let last_prev = self.prev_of(at);
        // the surrounding nodes adopt the inserted one
        if let Some(last_prev) = last_prev {
            self.link_next(last_prev, Some(new_prev))?;
        }
        self.link_prev(at, Some(new_prev))?;
        // and the inserted node points back at them
        self.link_prev(new_prev, last_prev)?;
        self.link_next(new_prev, Some(at))?;
        Ok(())
    }

    /// Unlink `node` from the ring, splicing its neighbours together. A
    /// singleton ring is left as it is. Front roles held by the node are
    /// handed off first.
    fn unlink(&mut self, node: NodeId) -> Result<(), PropertyError> {
        self.unset_fronts(node)?;
        if self.next_of(node) == Some(node) || self.prev_of(node) == Some(node) {
            return Ok(());
        }
        let prev = self.prev_of(node);
        let next = self.next_of(node);
        self.link_next(node, None)?;
        self.link_prev(node, None)?;
        if let Some(prev) = prev {
            self.link_next(prev, next)?;
        }
        if let Some(next) = next {
            self.link_prev(next, prev)?;
        }
        Ok(())
    }

    /// Strip `node` of any front role it holds for its current color; a
    /// same-colored neighbour inherits the role.
    fn unset_fronts(&mut self, node: NodeId) -> Result<(), PropertyError> {
        let color = self.color_of(node)?;
        if self.front(color) == Some(node) {
            self.set_front(color, None);
        }
        if self.front(color).is_none() {
            if let Some(prev) = self.prev_of(node) {
                if self.color_of(prev)? == color {
                    self.set_front(color, Some(prev));
                    return Ok(());
                }
            }
            if let Some(next) = self.next_of(node) {
                if self.color_of(next)? == color {
                    self.set_front(color, Some(next));
                }
            }
        }
        Ok(())
    }

    /// After `node` was inserted and recolored, take over the color's
    /// front role if the front is missing or stale (pointing at a node
    /// that has since changed color).
    fn reassign_fronts(&mut self, node: NodeId) -> Result<(), PropertyError> {
        let color = self.color_of(node)?;
        if self.next_of(node) == Some(node) {
            // sole node in the ring
            if self.front(color).is_none() {
                self.set_front(color, Some(node));
            }
            return Ok(());
        }
        let stale = match self.front(color) {
            None => true,
            Some(front) => self.color_of(front)? != color,
        };
        if stale {
            self.set_front(color, Some(node));
        }
        Ok(())
    }

    // =========================================================================
    // Ring walking
    // =========================================================================

    /// The first front in bottom, top, scan, free order — the ring's entry
    /// point for walks and dumps.
    fn first_front(&self) -> Option<NodeId> {
        self.front(Color::Ecru)
            .or_else(|| self.front(Color::Grey))
            .or_else(|| self.front(Color::Black))
            .or_else(|| self.front(Color::White))
    }

    /// Walk the ring once from the first front, in `next` order.
    fn walk_ring(&self) -> Vec<NodeId> {
        let Some(start) = self.first_front() else {
            return Vec::new();
        };
        let mut ring = vec![start];
        let mut cursor = self.next_of(start);
        while let Some(id) = cursor {
            if id == start || ring.len() > self.nodes.len() {
                break;
            }
            ring.push(id);
            cursor = self.next_of(id);
        }
        ring
    }

    fn dump_node(&self, id: NodeId) -> String {
        let mut fronts = String::from("/");
        if self.front(Color::Grey) == Some(id) {
            fronts.push_str("T/");
        }
        if self.front(Color::Black) == Some(id) {
            fronts.push_str("S/");
        }
        if self.front(Color::White) == Some(id) {
            fronts.push_str("F/");
        }
        if self.front(Color::Ecru) == Some(id) {
            fronts.push_str("B/");
        }
        let color = match self.node(id).color() {
            Ok(color) => color.to_string(),
            Err(error) => format!("ERROR: {error}"),
        };
        let data = match self.node(id).data_instance() {
            Some(payload) => match payload.core().address() {
                Some(address) => format!("@{address}"),
                None => String::from("unbound"),
            },
            None => String::from("nil"),
        };
        format!("[{fronts} {color} {data}]")
    }
}

impl Allocator<PayloadRef> for TreadmillAllocator {
    /// Allocate `object`, performing throttled scan work and flipping if
    /// the ring has run out of white nodes. Heap exhaustion that survives a
    /// flip is fatal to this call only.
    fn allocate(&mut self, object: PayloadRef) -> Result<(), AllocError> {
        self.current_scan += 1;
        if self.current_scan >= self.scan_frequency {
            self.scan()?;
            self.current_scan = 0;
        }
        if self.exhausted()? {
            self.flip()?;
            if self.exhausted()? {
                return Err(AllocError::OutOfMemory {
                    requested: object.core().size(),
                });
            }
        }
        self.allocate_into_free(object)
    }

    /// Explicitly free `object`: detach it from its node, release its heap
    /// space, and recolor the node white for immediate reuse. An explicit
    /// free bypasses the condemn-then-collect path.
    ///
    /// Fails if `object` is not currently bound to a node of this
    /// collector, or is a distinguished root.
    fn free(&mut self, object: PayloadRef) -> Result<(), AllocError> {
        let node = object.node_slot().get().ok_or(AllocError::NotAllocated)?;
        if node.index() >= self.nodes.len() || self.node(node).core().address().is_none() {
            return Err(AllocError::NotAllocated);
        }
        let represents = self
            .node(node)
            .data_instance()
            .is_some_and(|data| same_payload(&data, &object));
        if !represents {
            return Err(AllocError::NotAllocated);
        }
        if self.is_root(&object) {
            return Err(AllocError::FreedRoot);
        }
        self.node(node).set_data(None)?;
        object.node_slot().clear();
        self.space.free(&*object)?;
        self.make(node, Color::White)?;
        self.stats.record_free();
        Ok(())
    }
}

/// Concrete payload handles are unsized into [`PayloadRef`] on the way in,
/// so callers can pass an `Rc<IntObject>` directly.
impl<T: Collectable + 'static> Allocator<Rc<T>> for TreadmillAllocator {
    fn allocate(&mut self, object: Rc<T>) -> Result<(), AllocError> {
        <Self as Allocator<PayloadRef>>::allocate(self, object)
    }

    fn free(&mut self, object: Rc<T>) -> Result<(), AllocError> {
        <Self as Allocator<PayloadRef>>::free(self, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectCore, Property, RefProperty};
    use crate::trace::{Collectable, NodeSlot};
    use smallvec::SmallVec;

    struct TestCell {
        core: ObjectCore,
        slot: NodeSlot,
        value: Property<i64>,
    }

    impl TestCell {
        fn new() -> Rc<Self> {
            let cell = Self {
                core: ObjectCore::new(),
                slot: NodeSlot::new(),
                value: Property::new(),
            };
            cell.core.add_property(&cell.value);
            Rc::new(cell)
        }

        fn value(&self) -> Result<i64, PropertyError> {
            self.value.get(&self.core)
        }

        fn set_value(&self, value: i64) -> Result<(), PropertyError> {
            self.value.set(&self.core, value)
        }
    }

    impl Managed for TestCell {
        fn core(&self) -> &ObjectCore {
            &self.core
        }
    }

    impl Collectable for TestCell {
        fn reachable_references(&self) -> SmallVec<[&RefProperty; 4]> {
            SmallVec::new()
        }

        fn node_slot(&self) -> &NodeSlot {
            &self.slot
        }
    }

    struct TestLink {
        core: ObjectCore,
        slot: NodeSlot,
        target: RefProperty,
    }

    impl TestLink {
        fn new() -> Rc<Self> {
            let link = Self {
                core: ObjectCore::new(),
                slot: NodeSlot::new(),
                target: RefProperty::new(),
            };
            link.core.add_reference(&link.target);
            Rc::new(link)
        }

        fn set_target(&self, target: Option<PayloadRef>) -> Result<(), PropertyError> {
            self.target.set_instance(&self.core, target)
        }
    }

    impl Managed for TestLink {
        fn core(&self) -> &ObjectCore {
            &self.core
        }
    }

    impl Collectable for TestLink {
        fn reachable_references(&self) -> SmallVec<[&RefProperty; 4]> {
            let mut references = SmallVec::new();
            references.push(&self.target);
            references
        }

        fn node_slot(&self) -> &NodeSlot {
            &self.slot
        }
    }

    fn collector_with_roots(roots: Vec<PayloadRef>) -> TreadmillAllocator {
        TreadmillAllocator::new(TreadmillConfig::small(), roots).unwrap()
    }

    /// Walking the ring once must visit the four color arcs contiguously
    /// in cyclic grey, black, white, ecru order.
    fn assert_arc_order(collector: &TreadmillAllocator) {
        let colors = collector.ring_colors().unwrap();
        let count = colors.len();
        if count <= 1 {
            return;
        }
        // rotate the walk to start at an arc boundary; a uniform ring is
        // trivially in order
        let Some(start) = (0..count).find(|&i| colors[i] != colors[(i + count - 1) % count])
        else {
            return;
        };
        // collapse the rotated walk into its sequence of arcs
        let mut arcs: Vec<Color> = Vec::new();
        for offset in 0..count {
            let color = colors[(start + offset) % count];
            if arcs.last() != Some(&color) {
                arcs.push(color);
            }
        }
        // contiguity: each color forms at most one arc
        for &color in &arcs {
            assert_eq!(
                arcs.iter().filter(|&&arc| arc == color).count(),
                1,
                "interleaved {color} arcs in {colors:?}"
            );
        }
        // cyclic order: stepping arc to arc (wrapping back to the first)
        // must advance through grey, black, white, ecru exactly once
        let rank = |color: Color| color as usize;
        let mut steps = 0;
        for index in 0..arcs.len() {
            let here = rank(arcs[index]);
            let there = rank(arcs[(index + 1) % arcs.len()]);
            steps += (there + Color::COUNT - here) % Color::COUNT;
        }
        assert_eq!(steps, Color::COUNT, "arcs out of cyclic order: {colors:?}");
    }

    #[test]
    fn test_new_collector_marks_roots_grey() {
        let root = TestLink::new();
        let collector = collector_with_roots(vec![root.clone()]);
        assert_eq!(collector.non_white_nodes().unwrap(), 1);
        assert_eq!(collector.ring_colors().unwrap(), vec![Color::Grey]);
        // the root and its node are both heap-allocated
        assert_eq!(collector.allocated_objects(), 2);
        assert!(root.core.is_bound());
    }

    #[test]
    fn test_multiple_roots_form_a_ring() {
        let roots: Vec<PayloadRef> = (0..3).map(|_| -> PayloadRef { TestLink::new() }).collect();
        let collector = collector_with_roots(roots);
        assert_eq!(collector.non_white_nodes().unwrap(), 3);
        assert_eq!(collector.ring_colors().unwrap().len(), 3);
        assert_arc_order(&collector);
    }

    #[test]
    fn test_collector_without_roots_allocates() {
        let mut collector = collector_with_roots(Vec::new());
        let cell = TestCell::new();
        collector.allocate(cell.clone()).unwrap();
        cell.set_value(5).unwrap();
        assert_eq!(cell.value(), Ok(5));
        assert_eq!(collector.non_white_nodes().unwrap(), 1);
    }

    #[test]
    fn test_allocation_blackens_a_node() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root.clone()]);
        let cell = TestCell::new();
        collector.allocate(cell.clone()).unwrap();
        let node = cell.slot.get().unwrap();
        assert_eq!(collector.color_of(node).unwrap(), Color::Black);
        assert_eq!(collector.non_white_nodes().unwrap(), 2);
        assert_arc_order(&collector);
    }

    #[test]
    fn test_free_recolors_white_and_unbinds() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root]);
        let cell = TestCell::new();
        collector.allocate(cell.clone()).unwrap();
        cell.set_value(11).unwrap();
        let node = cell.slot.get().unwrap();
        let free_before = collector.free_space();

        collector.free(cell.clone()).unwrap();
        assert_eq!(collector.color_of(node).unwrap(), Color::White);
        assert_eq!(cell.value(), Err(PropertyError::Unbound));
        assert_eq!(collector.free_space(), free_before + 1);
        assert_arc_order(&collector);

        // the second free has nothing to detach
        assert_eq!(collector.free(cell), Err(AllocError::NotAllocated));
    }

    #[test]
    fn test_free_of_unallocated_object_fails() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root]);
        let stray = TestCell::new();
        assert_eq!(collector.free(stray), Err(AllocError::NotAllocated));
    }

    #[test]
    fn test_free_of_root_fails() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root.clone()]);
        assert_eq!(collector.free(root.clone()), Err(AllocError::FreedRoot));
        // and the root is untouched
        assert!(root.core.is_bound());
        assert_eq!(collector.non_white_nodes().unwrap(), 1);
    }

    #[test]
    fn test_flip_condemns_then_reclaims_unreachable() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root]);
        let orphan = TestCell::new();
        collector.allocate(orphan.clone()).unwrap();

        // first flip: the orphan survives as condemned, still bound
        collector.flip().unwrap();
        let node = orphan.slot.get().unwrap();
        assert_eq!(collector.color_of(node).unwrap(), Color::Ecru);
        assert!(orphan.core.is_bound());

        // second flip: nothing rescued it, so it is reclaimed
        collector.flip().unwrap();
        assert!(!orphan.core.is_bound());
        assert_eq!(orphan.slot.get(), None);
        assert_eq!(collector.non_white_nodes().unwrap(), 1);
    }

    #[test]
    fn test_scan_rescues_reachable_objects() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root.clone()]);
        let cell = TestCell::new();
        collector.allocate(cell.clone()).unwrap();
        root.set_target(Some(cell.clone())).unwrap();
        cell.set_value(7).unwrap();

        // reachable through the root: survives any number of flips
        for _ in 0..4 {
            collector.flip().unwrap();
            assert!(cell.core.is_bound());
            assert_eq!(cell.value(), Ok(7));
        }

        // drop the edge: two flips later the cell is gone
        root.set_target(None).unwrap();
        collector.flip().unwrap();
        collector.flip().unwrap();
        assert!(!cell.core.is_bound());
        assert_eq!(collector.non_white_nodes().unwrap(), 1);
    }

    #[test]
    fn test_flip_grows_the_ring_by_one() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root]);
        let nodes_before = collector.node_count();
        collector.flip().unwrap();
        assert_eq!(collector.node_count(), nodes_before + 1);
        collector.flip().unwrap();
        assert_eq!(collector.node_count(), nodes_before + 2);
    }

    #[test]
    fn test_arc_order_through_a_workload() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root.clone()]);
        let mut cells = Vec::new();
        for index in 0..8 {
            let cell = TestCell::new();
            collector.allocate(cell.clone()).unwrap();
            assert_arc_order(&collector);
            if index == 0 {
                root.set_target(Some(cell.clone())).unwrap();
            }
            cells.push(cell);
        }
        for cell in cells.drain(2..) {
            collector.free(cell).unwrap();
            assert_arc_order(&collector);
        }
        collector.flip().unwrap();
        assert_arc_order(&collector);
        collector.flip().unwrap();
        assert_arc_order(&collector);
    }

    #[test]
    fn test_scan_throttling() {
        let root = TestLink::new();
        let config = TreadmillConfig {
            scan_frequency: 4,
            ..TreadmillConfig::small()
        };
        let mut collector = TreadmillAllocator::new(config, vec![root]).unwrap();
        for _ in 0..12 {
            collector.allocate(TestCell::new()).unwrap();
        }
        let stats = collector.stats();
        // at most one throttled scan per four allocations; each flip may
        // drain at most the one grey root on top of that
        assert!(stats.scans <= 12 / 4 + stats.flips);
    }

    #[test]
    fn test_out_of_memory_is_recoverable() {
        // a heap just big enough for a handful of cells and their nodes
        let config = TreadmillConfig {
            heap_size: 48,
            scan_frequency: 1,
        };
        let root = TestLink::new();
        let mut collector = TreadmillAllocator::new(config, vec![root.clone()]).unwrap();

        // keep every allocation reachable so nothing can be reclaimed
        let mut last: Rc<TestLink> = root;
        let mut kept = Vec::new();
        let error = loop {
            let link = TestLink::new();
            match collector.allocate(link.clone()) {
                Ok(()) => {
                    last.set_target(Some(link.clone())).unwrap();
                    kept.push(link.clone());
                    last = link;
                }
                Err(error) => break error,
            }
        };
        assert!(error.is_out_of_memory());

        // the failed call corrupted nothing: freeing makes room again
        let victim = kept.pop().unwrap();
        collector.free(victim).unwrap();
        collector.allocate(TestCell::new()).unwrap();
        assert_arc_order(&collector);
    }

    #[test]
    fn test_space_conservation_through_collection() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root.clone()]);
        let node_words = GcNode::new(None).core().size();

        let conserved = |collector: &TreadmillAllocator, payload_words: usize| {
            collector.free_space() + payload_words + node_words * collector.node_count()
                == collector.heap_size()
        };

        let mut payload_words = root.core.size();
        assert!(conserved(&collector, payload_words));

        let mut cells = Vec::new();
        for _ in 0..6 {
            let cell = TestCell::new();
            collector.allocate(cell.clone()).unwrap();
            payload_words += cell.core.size();
            assert!(conserved(&collector, payload_words));
            cells.push(cell);
        }
        for cell in cells {
            let words = cell.core.size();
            collector.free(cell).unwrap();
            payload_words -= words;
            assert!(conserved(&collector, payload_words));
        }
    }

    #[test]
    fn test_dump_ring_labels_fronts() {
        let root = TestLink::new();
        let mut collector = collector_with_roots(vec![root]);
        collector.allocate(TestCell::new()).unwrap();
        let dump = collector.dump_ring();
        assert!(dump.contains("GREY"));
        assert!(dump.contains("BLACK"));
        assert!(dump.contains("/T/"));
        assert!(dump.contains("/S/"));
    }

    #[test]
    #[should_panic(expected = "invalid treadmill configuration")]
    fn test_zero_scan_frequency_fails_fast() {
        let config = TreadmillConfig {
            scan_frequency: 0,
            ..Default::default()
        };
        let _ = TreadmillAllocator::new(config, Vec::new());
    }
}
