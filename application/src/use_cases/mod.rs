//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod consensus;
pub mod discussion;
pub mod execution;
pub mod orchestrate;
pub(crate) mod shared;
