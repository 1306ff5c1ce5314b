//! Graph model over [`Unit`](crate::unit::Unit) nodes.
//!
//! A graph is a set of nodes plus a set of typed edges, both keyed by value
//! identity. Cycles are legal and every traversal in this module tolerates
//! them.

mod operations;
pub mod traversal;
mod types;
mod views;

pub use traversal::{closure, closure_all};
pub use types::{Edge, EdgeKind, GraphKind, UnitGraph};
