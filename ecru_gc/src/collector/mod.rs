//! The garbage collector.

mod treadmill;

pub use treadmill::TreadmillAllocator;
