//! CLI command implementations

pub mod compare;
pub mod evaluate;
pub mod train;
