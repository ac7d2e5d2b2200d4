//! Corridor pursuit world - a small deterministic simulation adapter
//!
//! Gives the CLI and integration tests a concrete [`Environment`] with
//! the shape the learning core expects: pellets to collect for score and
//! a pursuer that ends the episode on contact.
//!
//! [`Environment`]: crate::ports::Environment

pub mod corridor;

pub use corridor::{CorridorExtractor, CorridorWorld, Pursuer};
