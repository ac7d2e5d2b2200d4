//! Statistical comparison of training runs
//!
//! Two runs are compared by the areas under their per-repeat learning
//! curves, with a Welch two-sample t-test deciding whether the difference
//! in mean area is significant.

use statrs::distribution::{ContinuousCDF, StudentsT};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, pipeline::curve::LearningCurve};

/// Result of a Welch two-sample t-test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TTestResult {
    /// Mean of the first sample
    pub mean_a: f64,

    /// Mean of the second sample
    pub mean_b: f64,

    /// Test statistic
    pub t: f64,

    /// Welch-Satterthwaite degrees of freedom
    pub dof: f64,

    /// Two-sided p-value
    pub p_value: f64,
}

impl TTestResult {
    /// Whether the difference is significant at the given level.
    pub fn significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

fn mean(sample: &[f64]) -> f64 {
    sample.iter().sum::<f64>() / sample.len() as f64
}

fn variance(sample: &[f64], mean: f64) -> f64 {
    sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (sample.len() - 1) as f64
}

/// Welch two-sample t-test with unequal variances.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<TTestResult> {
    let smallest = a.len().min(b.len());
    if smallest < 2 {
        return Err(Error::NotEnoughSamples { got: smallest });
    }

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (mean_a, mean_b) = (mean(a), mean(b));
    let (ra, rb) = (variance(a, mean_a) / na, variance(b, mean_b) / nb);

    let se = (ra + rb).sqrt();
    if se == 0.0 {
        return Err(Error::InvalidConfiguration {
            message: String::from("both samples have zero variance; t-test is undefined"),
        });
    }

    let t = (mean_a - mean_b) / se;
    let dof = (ra + rb).powi(2) / (ra.powi(2) / (na - 1.0) + rb.powi(2) / (nb - 1.0));

    let distribution =
        StudentsT::new(0.0, 1.0, dof).map_err(|e| Error::InvalidConfiguration {
            message: format!("invalid t-distribution parameters (dof = {dof}): {e}"),
        })?;
    let p_value = 2.0 * (1.0 - distribution.cdf(t.abs()));

    Ok(TTestResult {
        mean_a,
        mean_b,
        t,
        dof,
        p_value,
    })
}

/// Compare two runs by the areas under their per-repeat curves.
pub fn compare_curve_areas(a: &[LearningCurve], b: &[LearningCurve]) -> Result<TTestResult> {
    let areas_a = a.iter().map(LearningCurve::area).collect::<Result<Vec<_>>>()?;
    let areas_b = b.iter().map(LearningCurve::area).collect::<Result<Vec<_>>>()?;
    welch_t_test(&areas_a, &areas_b)
}
