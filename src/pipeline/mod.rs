//! Experiment pipeline - learning curves and statistical comparison
//!
//! A training run produces one learning curve per repeat: alternating
//! blocks of training episodes and frozen evaluation episodes, with the
//! mean evaluation score recorded at each curve point. Runs are compared
//! by a two-sample t-test over the areas under their curves.

pub mod comparison;
pub mod curve;
pub mod observers;
pub mod training;

pub use comparison::{TTestResult, compare_curve_areas, welch_t_test};
pub use curve::LearningCurve;
pub use observers::{MetricsObserver, ProgressObserver};
pub use training::{CurveConfig, CurveRunner, SarsaLearner};
