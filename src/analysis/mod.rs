//! Path-based analyses over a finished call graph.

pub mod call_depth;

pub use call_depth::{call_depths, CallDepths};
