//! Unified-diff parsing and generation.

pub mod parser;
pub mod unified;
