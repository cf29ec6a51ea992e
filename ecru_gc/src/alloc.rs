//! Space management: the allocator contract, allocation errors, and the
//! first-fit free-list allocator.
//!
//! `BasicAllocator` is the underlying space manager: it owns the heap,
//! carves address ranges out of a free-region list, and binds managed
//! objects to the heap at the granted address. The treadmill collector sits
//! on top of it and reuses it for every grant and reclaim.
//!
//! Adjacent free regions are never coalesced. This is a known limitation
//! carried deliberately: freeing always pushes a fresh region, so heavily
//! fragmented workloads can fail an allocation that a coalescing allocator
//! would satisfy.

use crate::config::DEFAULT_HEAP_SIZE;
use crate::heap::{Heap, HeapRef};
use crate::object::{Managed, PropertyError};

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Errors raised by allocate/free operations.
///
/// Every variant leaves the allocator's internal state consistent; callers
/// can always recover and continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// Neither the free list nor the ring can satisfy the request.
    /// Expected steady-state condition, fatal only to the failing call.
    OutOfMemory {
        /// Size of the request that could not be satisfied, in words.
        requested: usize,
    },
    /// A property access failed while allocating or freeing; wraps the
    /// underlying cause.
    Property(PropertyError),
    /// The target of a `free` is not currently allocated here.
    NotAllocated,
    /// The target of a `free` is a distinguished root object.
    FreedRoot,
}

impl AllocError {
    /// True if this error is the out-of-memory condition.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, AllocError::OutOfMemory { .. })
    }
}

impl std::fmt::Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocError::OutOfMemory { requested } => {
                write!(f, "out of memory: no space for {requested} words")
            }
            AllocError::Property(cause) => write!(f, "property access failed: {cause}"),
            AllocError::NotAllocated => {
                write!(f, "cannot free an object that is not allocated here")
            }
            AllocError::FreedRoot => write!(f, "cannot free a distinguished root object"),
        }
    }
}

impl std::error::Error for AllocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AllocError::Property(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<PropertyError> for AllocError {
    fn from(cause: PropertyError) -> Self {
        AllocError::Property(cause)
    }
}

/// The allocation contract implemented by every space manager.
///
/// `allocate` leaves the object bound to a heap, its properties safely
/// accessible; `free` unbinds it, making further property access fail with
/// the unbound-access error.
pub trait Allocator<T> {
    /// Grant space for `object` and bind it.
    fn allocate(&mut self, object: T) -> Result<(), AllocError>;

    /// Reclaim `object`'s space and unbind it.
    fn free(&mut self, object: T) -> Result<(), AllocError>;
}

/// A contiguous run of free heap words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRegion {
    /// First word of the region.
    pub address: usize,
    /// Extent of the region in words.
    pub size: usize,
}

/// First-fit free-list space manager over a [`Heap`].
///
/// Invariant: the union of the free regions' extents plus the allocated
/// objects' extents exactly covers `[0, heap_size)`, without gaps or
/// overlaps.
pub struct BasicAllocator {
    heap: HeapRef,
    /// Free regions, scanned front to back; freed extents are pushed to
    /// the front (LIFO).
    free_list: VecDeque<FreeRegion>,
    /// Allocated extents, address to size.
    allocated: FxHashMap<usize, usize>,
}

impl BasicAllocator {
    /// Create an allocator over a fresh heap of `heap_size` words.
    pub fn new(heap_size: usize) -> Self {
        let mut free_list = VecDeque::new();
        free_list.push_front(FreeRegion {
            address: 0,
            size: heap_size,
        });
        Self {
            heap: Heap::shared(heap_size),
            free_list,
            allocated: FxHashMap::default(),
        }
    }

    /// Handle to the managed heap.
    pub fn heap(&self) -> HeapRef {
        self.heap.clone()
    }

    /// Total heap size in words.
    pub fn heap_size(&self) -> usize {
        self.heap.borrow().capacity()
    }

    /// Total free space in words, summed over all free regions.
    pub fn free_space(&self) -> usize {
        self.free_list.iter().map(|region| region.size).sum()
    }

    /// Number of free regions.
    pub fn free_regions(&self) -> usize {
        self.free_list.len()
    }

    /// Number of currently allocated objects.
    pub fn allocated_objects(&self) -> usize {
        self.allocated.len()
    }
}

impl Default for BasicAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_HEAP_SIZE)
    }
}

impl<'a, T: Managed + ?Sized> Allocator<&'a T> for BasicAllocator {
    /// First-fit search: the first region at least as large as the object
    /// is used. An exact fit unlinks the region; a larger region shrinks in
    /// place, its base advancing past the granted extent.
    fn allocate(&mut self, object: &T) -> Result<(), AllocError> {
        let size = object.core().size();
        assert!(size > 0, "cannot allocate a zero-sized object");
        let position = self
            .free_list
            .iter()
            .position(|region| region.size >= size)
            .ok_or(AllocError::OutOfMemory { requested: size })?;

        let address = self.free_list[position].address;
        if self.free_list[position].size == size {
            let _ = self.free_list.remove(position);
        } else {
            let region = &mut self.free_list[position];
            region.address += size;
            region.size -= size;
        }

        self.allocated.insert(address, size);
        object.core().bind(self.heap.clone(), address);
        object.on_allocate()?;
        Ok(())
    }

    /// Push the object's extent back onto the free list (LIFO, without
    /// coalescing) and unbind the object.
    fn free(&mut self, object: &T) -> Result<(), AllocError> {
        let address = object.core().address().ok_or(AllocError::NotAllocated)?;
        let size = self
            .allocated
            .remove(&address)
            .ok_or(AllocError::NotAllocated)?;
        self.free_list.push_front(FreeRegion { address, size });
        object.core().unbind();
        Ok(())
    }
}
