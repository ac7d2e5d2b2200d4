//! Learning curves and their persistence

use std::path::Path;

use crate::{Error, Result};

/// One x-axis point of a learning curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurvePoint {
    /// Mean score over the point's evaluation episodes.
    pub score: f64,
    /// Summed per-episode telemetry over the point's training episodes.
    pub data: Vec<f64>,
}

/// A learning curve: evaluation scores sampled between training blocks.
///
/// The x axis counts training episodes, so point `i` sits at
/// `i * train_per_point`. Point 0 is the untrained baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningCurve {
    train_per_point: usize,
    points: Vec<CurvePoint>,
}

impl LearningCurve {
    /// An all-zero curve with `len` points.
    pub fn new(len: usize, train_per_point: usize) -> Self {
        Self {
            train_per_point,
            points: vec![CurvePoint::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn train_per_point(&self) -> usize {
        self.train_per_point
    }

    /// Training episodes completed before point `index` was evaluated.
    pub fn x_of(&self, index: usize) -> usize {
        index * self.train_per_point
    }

    pub fn score(&self, index: usize) -> f64 {
        self.points[index].score
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Fill in one curve point.
    pub fn set(&mut self, index: usize, score: f64, data: Vec<f64>) -> Result<()> {
        let len = self.points.len();
        let point = self
            .points
            .get_mut(index)
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!("curve point {index} out of range for a curve of {len} points"),
            })?;
        point.score = score;
        point.data = data;
        Ok(())
    }

    /// Area under the score curve, by the trapezoid rule over the episode
    /// axis.
    pub fn area(&self) -> Result<f64> {
        if self.points.len() < 2 {
            return Err(Error::EmptyCurve);
        }
        let spacing = self.train_per_point as f64;
        let mut area = 0.0;
        for pair in self.points.windows(2) {
            area += spacing * (pair[0].score + pair[1].score) / 2.0;
        }
        Ok(area)
    }

    /// Pointwise average of several curves of equal shape.
    pub fn average(curves: &[LearningCurve]) -> Result<LearningCurve> {
        let first = curves.first().ok_or(Error::EmptyCurve)?;
        for curve in curves {
            if curve.len() != first.len() || curve.train_per_point != first.train_per_point {
                return Err(Error::InvalidConfiguration {
                    message: format!(
                        "cannot average curves of different shapes ({} points vs {})",
                        curve.len(),
                        first.len()
                    ),
                });
            }
        }

        let n = curves.len() as f64;
        let mut avg = LearningCurve::new(first.len(), first.train_per_point);
        for i in 0..first.len() {
            let score = curves.iter().map(|c| c.points[i].score).sum::<f64>() / n;
            let data_len = curves.iter().map(|c| c.points[i].data.len()).min().unwrap_or(0);
            let data = (0..data_len)
                .map(|d| curves.iter().map(|c| c.points[i].data[d]).sum::<f64>() / n)
                .collect();
            avg.points[i] = CurvePoint { score, data };
        }
        Ok(avg)
    }

    /// Save as tab-delimited rows: episodes, score, telemetry columns.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        for (i, point) in self.points.iter().enumerate() {
            let mut record = vec![self.x_of(i).to_string(), point.score.to_string()];
            record.extend(point.data.iter().map(f64::to_string));
            writer.write_record(&record)?;
        }
        writer.flush().map_err(|source| Error::Io {
            operation: String::from("flush curve file"),
            source,
        })?;
        Ok(())
    }

    /// Load a curve saved by [`LearningCurve::save`].
    pub fn load<P: AsRef<Path>>(path: P, train_per_point: usize) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let parse = |field: &str, what: &str| -> Result<f64> {
            field
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::InvalidConfiguration {
                    message: format!(
                        "unparsable {what} '{}' in curve file '{}': {e}",
                        field.trim(),
                        path.display()
                    ),
                })
        };

        let mut points = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.len() < 2 {
                return Err(Error::InvalidConfiguration {
                    message: format!(
                        "curve file '{}' row {} has fewer than two columns",
                        path.display(),
                        points.len()
                    ),
                });
            }
            let score = parse(&record[1], "score")?;
            let data = record
                .iter()
                .skip(2)
                .map(|field| parse(field, "telemetry value"))
                .collect::<Result<Vec<_>>>()?;
            points.push(CurvePoint { score, data });
        }

        Ok(Self {
            train_per_point,
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_with_scores(scores: &[f64], train_per_point: usize) -> LearningCurve {
        let mut curve = LearningCurve::new(scores.len(), train_per_point);
        for (i, &s) in scores.iter().enumerate() {
            curve.set(i, s, vec![i as f64, 1.0]).unwrap();
        }
        curve
    }

    #[test]
    fn area_is_trapezoidal_over_the_episode_axis() {
        // Scores 0, 10, 20 at x = 0, 10, 20: area = 10·5 + 10·15 = 200.
        let curve = curve_with_scores(&[0.0, 10.0, 20.0], 10);
        assert!((curve.area().unwrap() - 200.0).abs() < 1e-12);
    }

    #[test]
    fn area_of_single_point_curve_is_an_error() {
        let curve = curve_with_scores(&[5.0], 10);
        assert!(matches!(curve.area(), Err(Error::EmptyCurve)));
    }

    #[test]
    fn averaging_is_pointwise() {
        let a = curve_with_scores(&[0.0, 2.0], 10);
        let b = curve_with_scores(&[4.0, 6.0], 10);
        let avg = LearningCurve::average(&[a, b]).unwrap();
        assert_eq!(avg.score(0), 2.0);
        assert_eq!(avg.score(1), 4.0);
        // Telemetry averages too.
        assert_eq!(avg.points()[1].data, vec![1.0, 1.0]);
    }

    #[test]
    fn averaging_nothing_is_an_error() {
        assert!(matches!(
            LearningCurve::average(&[]),
            Err(Error::EmptyCurve)
        ));
    }

    #[test]
    fn mismatched_shapes_do_not_average() {
        let a = curve_with_scores(&[0.0, 2.0], 10);
        let b = curve_with_scores(&[4.0], 10);
        assert!(matches!(
            LearningCurve::average(&[a, b]),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn save_load_round_trip() {
        let curve = curve_with_scores(&[1.5, -2.0, 3.25], 10);
        let file = tempfile::NamedTempFile::new().unwrap();
        curve.save(file.path()).unwrap();
        let loaded = LearningCurve::load(file.path(), 10).unwrap();
        assert_eq!(curve, loaded);
    }
}
