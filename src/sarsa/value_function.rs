//! Linear Q-value function with eligibility traces

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Error, Result, features::FeatureVector};

/// A linear function of the feature values.
///
/// Owns a weight vector and scalar bias, plus a parallel eligibility-trace
/// vector used by the SARSA(λ) backup. Traces are re-initialized to zero
/// at the start of every episode.
#[derive(Debug, Clone)]
pub struct LinearValueFunction {
    weights: Vec<f64>,
    bias: f64,
    eligibility: Vec<f64>,
    eligibility_bias: f64,
}

impl LinearValueFunction {
    /// Start with everything at zero.
    pub fn new(feature_len: usize) -> Self {
        Self {
            weights: vec![0.0; feature_len],
            bias: 0.0,
            eligibility: vec![0.0; feature_len],
            eligibility_bias: 0.0,
        }
    }

    /// Load initial settings from a weight file.
    ///
    /// The format is newline-delimited decimal text: first line bias,
    /// then one weight per feature in feature order.
    pub fn load<P: AsRef<Path>>(feature_len: usize, path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open weight file '{}'", path.display()),
            source,
        })?;
        let mut lines = BufReader::new(file).lines();

        let mut next_value = |what: &str| -> Result<f64> {
            let line = lines
                .next()
                .ok_or_else(|| Error::InvalidWeightFile {
                    path: path.display().to_string(),
                    reason: format!("missing {what}"),
                })?
                .map_err(|source| Error::Io {
                    operation: format!("read weight file '{}'", path.display()),
                    source,
                })?;
            line.trim()
                .parse::<f64>()
                .map_err(|e| Error::InvalidWeightFile {
                    path: path.display().to_string(),
                    reason: format!("unparsable {what} '{}': {e}", line.trim()),
                })
        };

        let bias = next_value("bias")?;
        let mut weights = Vec::with_capacity(feature_len);
        for i in 0..feature_len {
            weights.push(next_value(&format!("weight {i}"))?);
        }

        Ok(Self {
            weights,
            bias,
            eligibility: vec![0.0; feature_len],
            eligibility_bias: 0.0,
        })
    }

    /// Save to a weight file (same format as [`LinearValueFunction::load`]).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create weight file '{}'", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        let write_err = |source| Error::Io {
            operation: format!("write weight file '{}'", path.display()),
            source,
        };
        writeln!(writer, "{}", self.bias).map_err(write_err)?;
        for w in &self.weights {
            writeln!(writer, "{w}").map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Mismatched feature length is a broken configuration, not a runtime
    /// condition.
    fn check_len(&self, features: &FeatureVector) -> Result<()> {
        if features.len() != self.weights.len() {
            return Err(Error::FeatureLengthMismatch {
                expected: self.weights.len(),
                got: features.len(),
            });
        }
        Ok(())
    }

    /// Estimate the Q-value given the features for an action.
    pub fn evaluate(&self, features: &FeatureVector) -> Result<f64> {
        self.check_len(features)?;
        let mut sum = self.bias;
        for (w, x) in self.weights.iter().zip(features.values()) {
            sum += w * x;
        }
        Ok(sum)
    }

    /// Gradient-descent weight update - without eligibility traces.
    ///
    /// Immediate step along the given features.
    pub fn update_weights_for(&mut self, delta: f64, features: &FeatureVector) -> Result<()> {
        self.check_len(features)?;
        for (w, x) in self.weights.iter_mut().zip(features.values()) {
            *w += delta * x;
        }
        self.bias += delta;
        Ok(())
    }

    /// Gradient-descent weight update - with eligibility traces.
    pub fn update_weights(&mut self, delta: f64) {
        for (w, e) in self.weights.iter_mut().zip(&self.eligibility) {
            *w += delta * e;
        }
        self.bias += delta * self.eligibility_bias;
    }

    /// Zero out the eligibility traces. Called once per episode start.
    pub fn clear_traces(&mut self) {
        self.eligibility.fill(0.0);
        self.eligibility_bias = 0.0;
    }

    /// Decrease the eligibility traces by `factor` (usually γλ).
    pub fn decay_traces(&mut self, factor: f64) {
        for e in &mut self.eligibility {
            *e *= factor;
        }
        self.eligibility_bias *= factor;
    }

    /// Increase the eligibility traces (accumulating, not replacing).
    pub fn add_traces(&mut self, features: &FeatureVector) -> Result<()> {
        self.check_len(features)?;
        for (e, x) in self.eligibility.iter_mut().zip(features.values()) {
            *e += x;
        }
        self.eligibility_bias += 1.0;
        Ok(())
    }

    /// Perceptron-style correction pushing the advised action's estimate
    /// toward the best competing alternative's.
    ///
    /// For each weight `i` the applied increment is
    /// `rate · Σ_{j≠i} (alt[j]−adv[j]) · (alt[i]−adv[i])`. The diagonal
    /// term is excluded.
    pub fn nudge_advised(
        &mut self,
        advised: &FeatureVector,
        alternative: &FeatureVector,
        rate: f64,
    ) -> Result<()> {
        self.check_len(advised)?;
        self.check_len(alternative)?;
        let n = self.weights.len();
        let diff: Vec<f64> = (0..n)
            .map(|i| alternative.get(i) - advised.get(i))
            .collect();
        let total: f64 = diff.iter().sum();
        for i in 0..n {
            // Σ_{j≠i} d_j = total − d_i
            self.weights[i] += rate * diff[i] * (total - diff[i]);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn set_weights_for_test(&mut self, weights: Vec<f64>, bias: f64) {
        assert_eq!(weights.len(), self.weights.len());
        self.weights = weights;
        self.bias = bias;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(values: &[f64]) -> FeatureVector {
        FeatureVector::new(values.to_vec())
    }

    #[test]
    fn zero_function_evaluates_to_bias() {
        let q = LinearValueFunction::new(3);
        assert_eq!(q.evaluate(&fv(&[5.0, -2.0, 100.0])).unwrap(), 0.0);

        let mut q = LinearValueFunction::new(3);
        q.update_weights_for(0.0, &fv(&[0.0, 0.0, 0.0])).unwrap();
        assert_eq!(q.evaluate(&fv(&[1.0, 2.0, 3.0])).unwrap(), q.bias());
    }

    #[test]
    fn immediate_update_raises_value_by_delta_times_norm_plus_one() {
        let mut q = LinearValueFunction::new(2);
        let features = fv(&[3.0, 4.0]);
        let before = q.evaluate(&features).unwrap();
        let delta = 0.5;
        q.update_weights_for(delta, &features).unwrap();
        let after = q.evaluate(&features).unwrap();
        // ‖features‖² + 1 = 9 + 16 + 1 = 26
        assert!((after - before - delta * 26.0).abs() < 1e-12);
    }

    #[test]
    fn cleared_traces_make_trace_update_a_noop() {
        let mut q = LinearValueFunction::new(2);
        q.add_traces(&fv(&[1.0, 2.0])).unwrap();
        q.clear_traces();
        let before = q.evaluate(&fv(&[1.0, 2.0])).unwrap();
        q.update_weights(10.0);
        let after = q.evaluate(&fv(&[1.0, 2.0])).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn decay_scales_traces_exactly() {
        let mut q = LinearValueFunction::new(2);
        q.add_traces(&fv(&[2.0, -4.0])).unwrap();
        q.decay_traces(0.5);
        // After decay, a unit trace update moves weights by the scaled traces.
        let before = q.evaluate(&fv(&[1.0, 0.0])).unwrap();
        q.update_weights(1.0);
        let after = q.evaluate(&fv(&[1.0, 0.0])).unwrap();
        // weight[0] += 1.0 · (2.0 · 0.5), bias += 1.0 · (1.0 · 0.5)
        assert!((after - before - (1.0 + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn decay_at_one_is_idempotent() {
        let mut a = LinearValueFunction::new(2);
        a.add_traces(&fv(&[1.5, 2.5])).unwrap();
        let mut b = a.clone();
        b.decay_traces(1.0);
        a.update_weights(0.3);
        b.update_weights(0.3);
        let probe = fv(&[1.0, 1.0]);
        assert_eq!(a.evaluate(&probe).unwrap(), b.evaluate(&probe).unwrap());
    }

    #[test]
    fn accumulating_traces_stack() {
        let mut q = LinearValueFunction::new(1);
        q.add_traces(&fv(&[1.0])).unwrap();
        q.add_traces(&fv(&[1.0])).unwrap();
        q.update_weights(1.0);
        // weight[0] = 2, bias = 2
        assert_eq!(q.evaluate(&fv(&[1.0])).unwrap(), 4.0);
    }

    #[test]
    fn mismatched_length_is_fatal() {
        let q = LinearValueFunction::new(3);
        let err = q.evaluate(&fv(&[1.0, 2.0])).unwrap_err();
        assert!(matches!(
            err,
            Error::FeatureLengthMismatch {
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn nudge_monotonically_raises_advised_value() {
        // advised dominated by the alternative under the initial weights
        let mut q = LinearValueFunction::new(2);
        q.set_weights_for_test(vec![-1.0, 0.0], -1.0);
        let advised = fv(&[2.0, 1.0]);
        let alternative = fv(&[1.0, 0.0]);
        assert!(q.evaluate(&advised).unwrap() < q.evaluate(&alternative).unwrap());

        let mut last = q.evaluate(&advised).unwrap();
        for _ in 0..20 {
            q.nudge_advised(&advised, &alternative, 0.1).unwrap();
            let now = q.evaluate(&advised).unwrap();
            assert!(now > last, "advised value must increase monotonically");
            last = now;
        }
        assert!(q.evaluate(&advised).unwrap() >= q.evaluate(&alternative).unwrap());
    }

    #[test]
    fn weight_file_round_trip() {
        let mut q = LinearValueFunction::new(3);
        q.update_weights_for(0.125, &fv(&[1.0, -2.0, 3.5])).unwrap();
        q.update_weights_for(-0.25, &fv(&[0.5, 0.0, 1.0])).unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        q.save(file.path()).unwrap();
        let loaded = LinearValueFunction::load(3, file.path()).unwrap();

        for probe in [fv(&[1.0, 1.0, 1.0]), fv(&[-2.0, 0.5, 9.0])] {
            assert_eq!(
                q.evaluate(&probe).unwrap(),
                loaded.evaluate(&probe).unwrap()
            );
        }
    }

    #[test]
    fn loading_short_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "1.0\n2.0\n").unwrap();
        let err = LinearValueFunction::load(3, file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidWeightFile { .. }));
    }
}
