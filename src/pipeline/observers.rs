//! Observer implementations for curve generation

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Result, ports::observer::Observer};

/// Progress bar observer - shows curve generation progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    episodes: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            episodes: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_curve_start(&mut self, total_points: usize) -> Result<()> {
        let pb = ProgressBar::new(total_points as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} points ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        self.episodes = 0;
        Ok(())
    }

    fn on_episode_end(&mut self, _point: usize, _episode: usize, _length: usize) -> Result<()> {
        self.episodes += 1;
        Ok(())
    }

    fn on_point_end(&mut self, point: usize, score: f64) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(point as u64 + 1);
            pb.set_message(format!("score: {score:.1}, episodes: {}", self.episodes));
        }
        Ok(())
    }

    fn on_curve_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish();
        }
        Ok(())
    }
}

/// Metrics observer - tracks scores and episode lengths in memory
pub struct MetricsObserver {
    scores: Vec<f64>,
    episode_lengths: Vec<usize>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self {
            scores: Vec::new(),
            episode_lengths: Vec::new(),
        }
    }

    /// Scores recorded per curve point, in order.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Get average training episode length
    pub fn avg_episode_length(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.episode_lengths.iter().sum::<usize>() as f64 / self.episode_lengths.len() as f64
        }
    }

    /// Score of the final curve point, if any.
    pub fn final_score(&self) -> Option<f64> {
        self.scores.last().copied()
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, _point: usize, _episode: usize, length: usize) -> Result<()> {
        self.episode_lengths.push(length);
        Ok(())
    }

    fn on_point_end(&mut self, _point: usize, score: f64) -> Result<()> {
        self.scores.push(score);
        Ok(())
    }
}
