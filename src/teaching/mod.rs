//! Advice-injection protocol
//!
//! This module decides *when* advice is solicited, *whether* it is given,
//! and *how* it reaches the student:
//! - [`TeachingStrategy`] variants decide whether advice is given this
//!   step, against a consumable budget
//! - [`AttentionStrategy`] variants gate whether the student requests the
//!   teacher's attention at all, against an independent budget
//! - [`AdvisedLearner`] composes student, teacher, and strategies into the
//!   per-step control flow

pub mod advised;
pub mod attention;
pub mod strategies;

pub use advised::{AdvisedLearner, AttentionMode, Initiator};
pub use attention::{AttentionStrategy, TeacherCertaintyAttention};
pub use strategies::{
    AdviseImportantStates, AdviseRandom, CorrectImportantMistakes, CorrectMistakesRandomly,
    PercentileUncertainMistakes, TeachingStrategy, UncertainMistakes, UncertainStates,
};
