//! Core traits for superclass backends.

mod classifier;

pub use classifier::*;
