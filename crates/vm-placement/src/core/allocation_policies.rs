//! Concrete allocation policy implementations.

pub mod single_threshold;
