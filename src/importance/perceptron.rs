//! Linear perceptron margin model
//!
//! Mistake-driven training over shuffled passes of the example log. Good
//! enough for the importance signal, which only needs a coarse margin.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    Error, Result,
    features::FeatureVector,
    importance::MarginModel,
};

const DEFAULT_EPOCHS: usize = 20;

pub struct Perceptron {
    weights: Vec<f64>,
    bias: f64,
    epochs: usize,
    rng: StdRng,
}

impl Perceptron {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            epochs: DEFAULT_EPOCHS,
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            },
        }
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    fn margin(&self, features: &FeatureVector) -> f64 {
        self.weights
            .iter()
            .zip(features.values())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }
}

impl MarginModel for Perceptron {
    fn train(&mut self, examples: &[(FeatureVector, f64)]) -> Result<()> {
        let Some((first, _)) = examples.first() else {
            return Ok(());
        };
        let len = first.len();
        for (features, _) in examples {
            if features.len() != len {
                return Err(Error::FeatureLengthMismatch {
                    expected: len,
                    got: features.len(),
                });
            }
        }

        self.weights = vec![0.0; len];
        self.bias = 0.0;
        let mut order: Vec<usize> = (0..examples.len()).collect();
        for _ in 0..self.epochs {
            order.shuffle(&mut self.rng);
            for &i in &order {
                let (features, label) = &examples[i];
                if label * self.margin(features) <= 0.0 {
                    for (w, x) in self.weights.iter_mut().zip(features.values()) {
                        *w += label * x;
                    }
                    self.bias += label;
                }
            }
        }
        Ok(())
    }

    fn decision(&self, features: &FeatureVector) -> Result<f64> {
        if features.len() != self.weights.len() {
            return Err(Error::FeatureLengthMismatch {
                expected: self.weights.len(),
                got: features.len(),
            });
        }
        Ok(self.margin(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(values: Vec<f64>, label: f64) -> (FeatureVector, f64) {
        (FeatureVector::new(values), label)
    }

    #[test]
    fn separates_a_linearly_separable_set() {
        let examples = vec![
            labeled(vec![2.0, 0.1], 1.0),
            labeled(vec![1.5, -0.2], 1.0),
            labeled(vec![3.0, 0.4], 1.0),
            labeled(vec![-2.0, 0.2], -1.0),
            labeled(vec![-1.2, -0.1], -1.0),
            labeled(vec![-3.5, 0.3], -1.0),
        ];

        let mut model = Perceptron::new(Some(42));
        model.train(&examples).unwrap();
        for (features, label) in &examples {
            assert!(
                label * model.decision(features).unwrap() > 0.0,
                "misclassified {:?}",
                features
            );
        }
    }

    #[test]
    fn retraining_discards_the_previous_fit() {
        let mut model = Perceptron::new(Some(7));
        model
            .train(&[labeled(vec![1.0], 1.0), labeled(vec![-1.0], -1.0)])
            .unwrap();
        assert!(model.decision(&FeatureVector::new(vec![1.0])).unwrap() > 0.0);

        // Flip the labels; the fit must flip with them.
        model
            .train(&[labeled(vec![1.0], -1.0), labeled(vec![-1.0], 1.0)])
            .unwrap();
        assert!(model.decision(&FeatureVector::new(vec![1.0])).unwrap() <= 0.0);
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let mut model = Perceptron::new(Some(0));
        model.train(&[labeled(vec![1.0, 2.0], 1.0)]).unwrap();
        assert!(matches!(
            model.decision(&FeatureVector::new(vec![1.0])),
            Err(Error::FeatureLengthMismatch {
                expected: 2,
                got: 1
            })
        ));
    }
}
