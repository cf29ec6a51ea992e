//! End-to-end tests driving the treadmill collector through realistic
//! object graphs.
//!
//! Coverage:
//! - reachability preservation and collection of cut-off chains
//! - function objects keeping their arguments alive through parameters
//! - root immunity and error recovery
//! - space accounting across allocate/free cycles

use ecru_gc::{AllocError, Allocator, Managed, TreadmillAllocator, TreadmillConfig};
use ecru_runtime::{FunctionObject, IndirectObject, IntObject};

use std::rc::Rc;

fn small_collector(roots: Vec<ecru_gc::PayloadRef>) -> TreadmillAllocator {
    TreadmillAllocator::new(TreadmillConfig::small(), roots).unwrap()
}

// =============================================================================
// Function Argument Scenario
// =============================================================================

/// A four-parameter function keeps four indirections and, through them,
/// four integer cells alive. Freeing the indirections makes all eight
/// collectible.
#[test]
fn test_function_arguments_collected_after_indirections_freed() {
    let function = FunctionObject::new(4);
    let mut gc = small_collector(vec![function.clone()]);

    // allocate the indirections and bind them as parameters immediately,
    // otherwise they would be condemned as unreachable
    let args: Vec<Rc<IndirectObject>> = (0..4).map(|_| IndirectObject::new()).collect();
    let used_before = gc.non_white_nodes().unwrap();
    for (index, arg) in args.iter().enumerate() {
        gc.allocate(arg.clone()).unwrap();
        function.set_param(index, Some(arg.clone())).unwrap();
    }
    assert_eq!(gc.non_white_nodes().unwrap(), used_before + 4);

    // allocate the values and point the indirections at them
    let values: Vec<Rc<IntObject>> = (0..4).map(|_| IntObject::new()).collect();
    for (arg, value) in args.iter().zip(&values) {
        gc.allocate(value.clone()).unwrap();
        arg.set_target(Some(value.clone())).unwrap();
        value.set_value(10).unwrap();
    }
    let used = gc.non_white_nodes().unwrap();
    assert_eq!(used, used_before + 8);

    // cut the indirections loose; the values lose their only path from
    // the root
    for arg in &args {
        gc.free(arg.clone()).unwrap();
    }

    // two flips: the first condemns the surviving value cells, the second
    // reclaims them
    gc.flip().unwrap();
    gc.flip().unwrap();
    assert_eq!(gc.non_white_nodes().unwrap(), used - 8);
    for value in &values {
        assert!(!value.core().is_bound());
    }
    // the function itself is a root and stays allocated
    assert!(function.core().is_bound());
}

// =============================================================================
// Chain Collection
// =============================================================================

/// A chain of indirections hanging off a root survives collection while
/// intact, and collapses entirely once its head is explicitly freed.
#[test]
fn test_chain_collapses_after_head_is_freed() {
    let root = IndirectObject::new();
    let mut gc = small_collector(vec![root.clone()]);

    let mut chain: Vec<Rc<IndirectObject>> = Vec::new();
    let mut last = root.clone();
    for _ in 0..12 {
        let next = IndirectObject::new();
        gc.allocate(next.clone()).unwrap();
        last.set_target(Some(next.clone())).unwrap();
        chain.push(next.clone());
        last = next;
    }

    // fully reachable: any number of flips rescues every link
    gc.flip().unwrap();
    gc.flip().unwrap();
    for link in &chain {
        assert!(link.core().is_bound());
    }
    assert_eq!(gc.non_white_nodes().unwrap(), 1 + chain.len());

    // cut the head: everything behind it becomes garbage
    gc.free(chain[0].clone()).unwrap();
    gc.flip().unwrap();
    gc.flip().unwrap();
    assert_eq!(gc.non_white_nodes().unwrap(), 1);
    for link in &chain {
        assert!(!link.core().is_bound());
    }
    assert!(root.core().is_bound());
}

// =============================================================================
// Root Immunity
// =============================================================================

#[test]
fn test_roots_are_never_freeable() {
    let function = FunctionObject::new(2);
    let anchor = IndirectObject::new();
    let mut gc = small_collector(vec![function.clone(), anchor.clone()]);

    assert_eq!(gc.free(function.clone()), Err(AllocError::FreedRoot));
    assert_eq!(gc.free(anchor.clone()), Err(AllocError::FreedRoot));

    // still immune after collection activity
    gc.allocate(IntObject::new()).unwrap();
    gc.flip().unwrap();
    assert_eq!(gc.free(function.clone()), Err(AllocError::FreedRoot));
    assert!(function.core().is_bound());
    assert!(anchor.core().is_bound());
}

#[test]
fn test_failed_free_leaves_collector_usable() {
    let root = IndirectObject::new();
    let mut gc = small_collector(vec![root.clone()]);

    let stray = IntObject::new();
    assert_eq!(gc.free(stray), Err(AllocError::NotAllocated));

    // the collector keeps working after the failed call
    let cell = IntObject::new();
    gc.allocate(cell.clone()).unwrap();
    cell.set_value(1).unwrap();
    assert_eq!(cell.value(), Ok(1));
}

// =============================================================================
// Space Accounting
// =============================================================================

/// Once a white node is in circulation, allocate/free cycles return the
/// heap to the same free-space watermark.
#[test]
fn test_free_space_returns_to_baseline() {
    let root = IndirectObject::new();
    let mut gc = small_collector(vec![root]);

    // prime the ring so later allocations reuse the freed white node
    let primer = IntObject::new();
    gc.allocate(primer.clone()).unwrap();
    gc.free(primer).unwrap();

    let baseline = gc.free_space();
    for _ in 0..5 {
        let cell = IntObject::new();
        gc.allocate(cell.clone()).unwrap();
        assert_eq!(gc.free_space(), baseline - cell.core().size());
        gc.free(cell).unwrap();
        assert_eq!(gc.free_space(), baseline);
    }
}

/// Explicitly freed objects raise the unbound-access error forever after.
#[test]
fn test_freed_objects_stay_inaccessible() {
    let root = IndirectObject::new();
    let mut gc = small_collector(vec![root]);

    let cell = IntObject::new();
    gc.allocate(cell.clone()).unwrap();
    cell.set_value(9).unwrap();
    gc.free(cell.clone()).unwrap();

    assert!(cell.value().is_err());
    assert!(cell.set_value(1).is_err());
    // and the collector refuses to free it twice
    assert_eq!(gc.free(cell), Err(AllocError::NotAllocated));
}
