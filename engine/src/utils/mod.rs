//! Small helpers shared across the engine

pub mod paths;

pub use paths::{relative_to, to_slash};
