//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the learning core and the
//! simulation/observation infrastructure. The game engine, feature
//! extraction, and experiment observation are adapters behind these traits.

pub mod environment;
pub mod learner;
pub mod observer;

pub use environment::{Action, Environment, FeatureExtractor, OpponentPolicy};
pub use learner::Learner;
pub use observer::Observer;
