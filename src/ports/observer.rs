//! Observer port - abstraction for curve observation and data collection
//!
//! Observers can be composed to collect different kinds of data while a
//! learning curve is generated, without coupling the runner to specific
//! output formats.

use crate::Result;

/// Observer trait for monitoring curve generation.
///
/// # Event sequence
///
/// 1. `on_curve_start(total_points)` - once per curve
/// 2. For each curve point:
///    - `on_episode_end(point, episode, length)` per training episode
///    - `on_point_end(point, score)` after the evaluation block
/// 3. `on_curve_end()` - once at the end
pub trait Observer: Send {
    /// Called when curve generation starts.
    fn on_curve_start(&mut self, _total_points: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each training episode within a point.
    fn on_episode_end(&mut self, _point: usize, _episode: usize, _length: usize) -> Result<()> {
        Ok(())
    }

    /// Called after the evaluation block of a curve point completes.
    fn on_point_end(&mut self, _point: usize, _score: f64) -> Result<()> {
        Ok(())
    }

    /// Called when the curve is finished.
    fn on_curve_end(&mut self) -> Result<()> {
        Ok(())
    }
}
