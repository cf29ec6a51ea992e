//! Ecru Runtime Objects
//!
//! Example managed-object schemas for the ecru treadmill collector: leaf
//! value cells, indirection cells, and composite function/distribution
//! objects. Each type lays its fields out through the property framework
//! and exposes its reference-valued fields to the collector through the
//! [`Collectable`] capability.
//!
//! These schemas carry no business semantics of their own; they exist to
//! exercise the collector with realistic object graphs.
//!
//! [`Collectable`]: ecru_gc::Collectable

#![warn(clippy::all)]

pub mod types;

pub use types::{
    BoolObject, DistribObject, FloatObject, FunctionObject, IndirectObject, IntObject,
};
