//! Testing infrastructure shared by unit and integration tests.
//!
//! - [`ClassFileAssembler`] writes minimal but well-formed class-file images
//!   so the decoder can be exercised without a JVM toolchain.
//! - [`helpers`] builds small graphs and coverage sessions by name.

mod class_file;
pub mod helpers;

pub use class_file::{ClassFileAssembler, Invoke};
