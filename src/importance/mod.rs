//! Online state-importance classification
//!
//! Some attention variants gate advice solicitation on a *prediction* of
//! whether a state is advice-worthy instead of measuring value spreads.
//! The classifier keeps a bounded log of labeled feature vectors and
//! retrains a margin model from the full log at episode boundaries.

pub mod perceptron;

use std::collections::VecDeque;

use crate::{Result, features::FeatureVector};

pub use perceptron::Perceptron;

/// Most examples retained; the oldest are discarded beyond this.
pub const EXAMPLE_LOG_CAP: usize = 10_000;

/// New examples required since the last training before retraining.
const RETRAIN_THRESHOLD: usize = 10;

/// Decision value above which a state is predicted important.
const PREDICT_THRESHOLD: f64 = -1.0;

/// A trainable binary margin model over feature vectors.
///
/// Labels are `+1.0` (important) and `-1.0` (not). The decision value is
/// a signed margin; the classifier applies the threshold.
pub trait MarginModel: Send {
    /// Fit the model to the full example set, discarding previous fit.
    fn train(&mut self, examples: &[(FeatureVector, f64)]) -> Result<()>;

    /// Signed decision value for a single state.
    fn decision(&self, features: &FeatureVector) -> Result<f64>;
}

/// Bounded example log plus a periodically retrained margin model.
pub struct ImportanceClassifier {
    log: VecDeque<(FeatureVector, f64)>,
    total_recorded: usize,
    recorded_at_last_training: usize,
    model: Box<dyn MarginModel>,
    trained: bool,
}

impl ImportanceClassifier {
    pub fn new(model: Box<dyn MarginModel>) -> Self {
        Self {
            log: VecDeque::new(),
            total_recorded: 0,
            recorded_at_last_training: 0,
            model,
            trained: false,
        }
    }

    /// Classifier backed by the default perceptron margin model.
    pub fn with_perceptron(seed: Option<u64>) -> Self {
        Self::new(Box::new(Perceptron::new(seed)))
    }

    /// Append one labeled example, discarding the oldest at the cap.
    pub fn record(&mut self, features: FeatureVector, important: bool) {
        let label = if important { 1.0 } else { -1.0 };
        self.log.push_back((features, label));
        if self.log.len() > EXAMPLE_LOG_CAP {
            self.log.pop_front();
        }
        self.total_recorded += 1;
    }

    /// Retrain from the full log if due: at least 10 examples accumulated
    /// since the previous training and advice has ever been given.
    ///
    /// Returns whether a training pass ran.
    pub fn maybe_retrain(&mut self, total_advice: u32) -> Result<bool> {
        let new_examples = self.total_recorded - self.recorded_at_last_training;
        if total_advice == 0 || new_examples < RETRAIN_THRESHOLD {
            return Ok(false);
        }
        self.recorded_at_last_training = self.total_recorded;
        self.model.train(self.log.make_contiguous())?;
        self.trained = true;
        Ok(true)
    }

    /// Whether at least one training pass has completed.
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Predict whether a state is advice-worthy. Always negative before
    /// the first training pass.
    pub fn predict(&self, features: &FeatureVector) -> Result<bool> {
        if !self.trained {
            return Ok(false);
        }
        Ok(self.model.decision(features)? > PREDICT_THRESHOLD)
    }

    pub fn example_count(&self) -> usize {
        self.log.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    /// Model that counts training passes and classifies by first feature.
    struct CountingModel {
        trainings: Arc<AtomicUsize>,
    }

    impl MarginModel for CountingModel {
        fn train(&mut self, _examples: &[(FeatureVector, f64)]) -> Result<()> {
            self.trainings.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn decision(&self, features: &FeatureVector) -> Result<f64> {
            Ok(features.get(0))
        }
    }

    fn counting_classifier() -> (ImportanceClassifier, Arc<AtomicUsize>) {
        let trainings = Arc::new(AtomicUsize::new(0));
        let classifier = ImportanceClassifier::new(Box::new(CountingModel {
            trainings: Arc::clone(&trainings),
        }));
        (classifier, trainings)
    }

    fn example(value: f64) -> FeatureVector {
        FeatureVector::new(vec![value])
    }

    #[test]
    fn retrains_only_with_enough_new_examples_and_any_advice() {
        let (mut classifier, trainings) = counting_classifier();

        for i in 0..9 {
            classifier.record(example(i as f64), false);
        }
        // Nine new examples: not due.
        assert!(!classifier.maybe_retrain(5).unwrap());

        classifier.record(example(9.0), true);
        // Ten new examples but no advice ever given: not due.
        assert!(!classifier.maybe_retrain(0).unwrap());
        // Both conditions hold.
        assert!(classifier.maybe_retrain(5).unwrap());
        assert_eq!(trainings.load(Ordering::SeqCst), 1);

        // The counter resets; the same examples do not retrigger.
        assert!(!classifier.maybe_retrain(5).unwrap());
    }

    #[test]
    fn predicts_negative_until_trained_then_thresholds_at_minus_one() {
        let (mut classifier, _) = counting_classifier();
        assert!(!classifier.predict(&example(5.0)).unwrap());

        for i in 0..10 {
            classifier.record(example(i as f64), i % 2 == 0);
        }
        assert!(classifier.maybe_retrain(1).unwrap());

        // Decision is the first feature; the cut is strictly above -1.
        assert!(classifier.predict(&example(0.0)).unwrap());
        assert!(classifier.predict(&example(-0.5)).unwrap());
        assert!(!classifier.predict(&example(-1.0)).unwrap());
        assert!(!classifier.predict(&example(-3.0)).unwrap());
    }

    #[test]
    fn log_discards_oldest_at_cap() {
        let (mut classifier, _) = counting_classifier();
        for i in 0..(EXAMPLE_LOG_CAP + 7) {
            classifier.record(example(i as f64), false);
        }
        assert_eq!(classifier.example_count(), EXAMPLE_LOG_CAP);
    }
}
