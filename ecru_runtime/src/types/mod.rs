//! Managed payload types.

mod bool_cell;
mod distrib;
mod float;
mod function;
mod indirect;
mod int;

pub use bool_cell::BoolObject;
pub use distrib::DistribObject;
pub use float::FloatObject;
pub use function::FunctionObject;
pub use indirect::IndirectObject;
pub use int::IntObject;
