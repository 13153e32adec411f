//! Streaming statistics over the trajectories of a dataset.
//!
//! The engine keeps running sums, sums of squares and extrema for five
//! per-trajectory metrics (point count, length, duration, average speed and
//! average sampling rate) plus the spatial-temporal coverage of every point.
//! Each trajectory is folded in one locked step, so the engine can be shared
//! by reference between worker threads.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::delta;
use crate::distance::{self, PointDistance};
use crate::grammar::CoordinateSystem;

/// Fractional digits kept in the textual report.
pub const REPORT_DECIMALS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatisticsError {
    /// A trajectory without points
    EmptyTrajectory,
    /// X, Y and Time sequences of different lengths
    LengthMismatch { x: usize, y: usize, t: usize },
}

impl fmt::Display for StatisticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatisticsError::EmptyTrajectory => {
                write!(f, "Values for statistics computation must not be empty")
            }
            StatisticsError::LengthMismatch { x, y, t } => write!(
                f,
                "X, Y and Time values must be of same size (got {}, {} and {})",
                x, y, t
            ),
        }
    }
}

impl std::error::Error for StatisticsError {}

/// Running moments and extrema of one scalar metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningAggregate {
    sum: f64,
    sum_squares: f64,
    min: f64,
    max: f64,
    count: u64,
}

impl Default for RunningAggregate {
    fn default() -> Self {
        RunningAggregate {
            sum: 0.0,
            sum_squares: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }
}

impl RunningAggregate {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.sum_squares += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Population variance. The absolute value absorbs round-off that would
    /// otherwise turn a zero variance slightly negative.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        (self.sum_squares - self.sum * self.sum / n).abs() / n
    }

    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn summary(&self) -> MetricSummary {
        if self.count == 0 {
            return MetricSummary::default();
        }
        MetricSummary {
            min: self.min,
            max: self.max,
            mean: self.mean(),
            std: self.std(),
        }
    }
}

/// Bounding extrema of every observed point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub min_x: f64,
    pub min_y: f64,
    pub min_t: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_t: f64,
}

impl Default for Coverage {
    fn default() -> Self {
        Coverage {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            min_t: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            max_t: f64::NEG_INFINITY,
        }
    }
}

impl Coverage {
    fn add_point(&mut self, x: f64, y: f64, t: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.min_t = self.min_t.min(t);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.max_t = self.max_t.max(t);
    }

    fn merge(&mut self, other: &Coverage) {
        self.add_point(other.min_x, other.min_y, other.min_t);
        self.add_point(other.max_x, other.max_y, other.max_t);
    }
}

/// Min, max, mean and standard deviation of a metric.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Default)]
struct Aggregates {
    trajectories: u64,
    points: u64,
    num_points: RunningAggregate,
    length: RunningAggregate,
    duration: RunningAggregate,
    speed: RunningAggregate,
    sampling_rate: RunningAggregate,
    coverage: Coverage,
}

/// Absolute X, Y and Time values of one trajectory, checked and ready to be
/// folded into a [`StatisticsEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySample {
    xs: Vec<f64>,
    ys: Vec<f64>,
    ts: Vec<f64>,
}

impl TrajectorySample {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, ts: Vec<f64>) -> Result<Self, StatisticsError> {
        if xs.is_empty() || ys.is_empty() || ts.is_empty() {
            return Err(StatisticsError::EmptyTrajectory);
        }
        if xs.len() != ys.len() || xs.len() != ts.len() {
            return Err(StatisticsError::LengthMismatch {
                x: xs.len(),
                y: ys.len(),
                t: ts.len(),
            });
        }
        Ok(TrajectorySample { xs, ys, ts })
    }

    /// Builds a sample from sequences that may be delta-encoded, decoding the
    /// flagged ones.
    pub fn from_delta_encoded(
        (xs, delta_x): (&[f64], bool),
        (ys, delta_y): (&[f64], bool),
        (ts, delta_t): (&[f64], bool),
    ) -> Result<Self, StatisticsError> {
        let absolute = |values: &[f64], is_delta: bool| {
            if is_delta {
                delta::decode(values)
            } else {
                values.to_vec()
            }
        };
        Self::new(
            absolute(xs, delta_x),
            absolute(ys, delta_y),
            absolute(ts, delta_t),
        )
    }

    pub fn points(&self) -> usize {
        self.xs.len()
    }
}

/// Metrics of a single trajectory, computed before taking the lock.
struct TrajectoryMetrics {
    points: usize,
    length: f64,
    duration: f64,
    speed: f64,
    sampling_rate: f64,
    coverage: Coverage,
}

/// Dataset-wide statistics, fed one trajectory at a time.
pub struct StatisticsEngine {
    distance: Box<dyn PointDistance>,
    state: Mutex<Aggregates>,
}

impl StatisticsEngine {
    pub fn new(distance: Box<dyn PointDistance>) -> Self {
        StatisticsEngine {
            distance,
            state: Mutex::new(Aggregates::default()),
        }
    }

    pub fn for_coordinate_system(system: CoordinateSystem) -> Self {
        Self::new(distance::for_coordinate_system(system))
    }

    /// Name of the distance function in use.
    pub fn distance_name(&self) -> &'static str {
        self.distance.name()
    }

    /// Folds one trajectory given by absolute X, Y and Time values.
    pub fn add_trajectory(&self, xs: &[f64], ys: &[f64], ts: &[f64]) -> Result<(), StatisticsError> {
        let sample = TrajectorySample::new(xs.to_vec(), ys.to_vec(), ts.to_vec())?;
        self.add_sample(&sample);
        Ok(())
    }

    /// Folds one trajectory whose sequences may be delta-encoded.
    pub fn add_delta_encoded(
        &self,
        xs: (&[f64], bool),
        ys: (&[f64], bool),
        ts: (&[f64], bool),
    ) -> Result<(), StatisticsError> {
        self.add_sample(&TrajectorySample::from_delta_encoded(xs, ys, ts)?);
        Ok(())
    }

    pub fn add_sample(&self, sample: &TrajectorySample) {
        self.add_samples(std::slice::from_ref(sample));
    }

    /// Folds every sample in one locked step.
    pub fn add_samples(&self, samples: &[TrajectorySample]) {
        let metrics: Vec<TrajectoryMetrics> = samples.iter().map(|s| self.measure(s)).collect();
        let mut state = self.lock();
        for m in metrics {
            state.trajectories += 1;
            state.points += m.points as u64;
            state.num_points.add(m.points as f64);
            state.length.add(m.length);
            state.duration.add(m.duration);
            state.speed.add(m.speed);
            state.sampling_rate.add(m.sampling_rate);
            state.coverage.merge(&m.coverage);
        }
    }

    fn measure(&self, sample: &TrajectorySample) -> TrajectoryMetrics {
        let TrajectorySample { xs, ys, ts } = sample;
        let n = xs.len();
        let mut length = 0.0;
        let mut duration = 0.0;
        let mut coverage = Coverage::default();
        for i in 0..n {
            coverage.add_point(xs[i], ys[i], ts[i]);
            if i + 1 < n {
                length += self.distance.distance(xs[i], ys[i], xs[i + 1], ys[i + 1]);
                duration += ts[i + 1] - ts[i];
            }
        }

        let speed = if duration == 0.0 { 0.0 } else { length / duration };
        let sampling_rate = if n < 2 { 0.0 } else { duration / (n - 1) as f64 };

        TrajectoryMetrics {
            points: n,
            length,
            duration,
            speed,
            sampling_rate,
            coverage,
        }
    }

    pub fn trajectories_count(&self) -> u64 {
        self.lock().trajectories
    }

    pub fn points_count(&self) -> u64 {
        self.lock().points
    }

    /// Current statistics. All zero before the first trajectory.
    pub fn snapshot(&self) -> StatisticsReport {
        let state = self.lock();
        let coverage = if state.trajectories == 0 {
            Coverage {
                min_x: 0.0,
                min_y: 0.0,
                min_t: 0.0,
                max_x: 0.0,
                max_y: 0.0,
                max_t: 0.0,
            }
        } else {
            state.coverage
        };
        StatisticsReport {
            trajectories: state.trajectories,
            points: state.points,
            points_per_trajectory: state.num_points.summary(),
            length: state.length.summary(),
            duration: state.duration.summary(),
            speed: state.speed.summary(),
            sampling_rate: state.sampling_rate.summary(),
            coverage,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Aggregates> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for StatisticsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatisticsEngine")
            .field("distance", &self.distance.name())
            .field("trajectories", &self.trajectories_count())
            .finish()
    }
}

/// A point-in-time copy of the engine's statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsReport {
    pub trajectories: u64,
    pub points: u64,
    pub points_per_trajectory: MetricSummary,
    pub length: MetricSummary,
    pub duration: MetricSummary,
    pub speed: MetricSummary,
    pub sampling_rate: MetricSummary,
    pub coverage: Coverage,
}

impl StatisticsReport {
    /// Report lines as `(key, value)` pairs, in report order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            ("NUM_TRAJECTORIES", self.trajectories.to_string()),
            ("NUM_POINTS", self.points.to_string()),
        ];
        let metrics: [(&MetricSummary, [&'static str; 4]); 5] = [
            (
                &self.points_per_trajectory,
                [
                    "MIN_PTS_PER_TRAJECTORY",
                    "MAX_PTS_PER_TRAJECTORY",
                    "AVG_PTS_PER_TRAJECTORY",
                    "STD_PTS_PER_TRAJECTORY",
                ],
            ),
            (
                &self.length,
                [
                    "MIN_TRAJECTORY_LENGTH",
                    "MAX_TRAJECTORY_LENGTH",
                    "AVG_TRAJECTORY_LENGTH",
                    "STD_TRAJECTORY_LENGTH",
                ],
            ),
            (
                &self.duration,
                [
                    "MIN_TRAJECTORY_DURATION",
                    "MAX_TRAJECTORY_DURATION",
                    "AVG_TRAJECTORY_DURATION",
                    "STD_TRAJECTORY_DURATION",
                ],
            ),
            (
                &self.speed,
                [
                    "MIN_TRAJECTORY_SPEED",
                    "MAX_TRAJECTORY_SPEED",
                    "AVG_TRAJECTORY_SPEED",
                    "STD_TRAJECTORY_SPEED",
                ],
            ),
            (
                &self.sampling_rate,
                [
                    "MIN_SAMPLING_RATE",
                    "MAX_SAMPLING_RATE",
                    "AVG_SAMPLING_RATE",
                    "STD_SAMPLING_RATE",
                ],
            ),
        ];
        for (summary, [min, max, avg, std]) in metrics {
            entries.push((min, format_number(summary.min)));
            entries.push((max, format_number(summary.max)));
            entries.push((avg, format_number(summary.mean)));
            entries.push((std, format_number(summary.std)));
        }
        let c = &self.coverage;
        entries.extend([
            ("MIN_X", format_number(c.min_x)),
            ("MIN_Y", format_number(c.min_y)),
            ("MIN_T", format_number(c.min_t)),
            ("MAX_X", format_number(c.max_x)),
            ("MAX_Y", format_number(c.max_y)),
            ("MAX_T", format_number(c.max_t)),
        ]);
        entries
    }
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}\t{}", key, value)?;
        }
        Ok(())
    }
}

/// Formats a statistic with at most [`REPORT_DECIMALS`] fractional digits,
/// rounding half to even.
///
/// # Examples
/// ```text
/// 11.313708498984761  ->  11.31371
/// 2.5                 ->  2.5
/// 4.0                 ->  4
/// ```
pub fn format_number(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(d) => d
            .round_dp_with_strategy(REPORT_DECIMALS, RoundingStrategy::MidpointNearestEven)
            .normalize()
            .to_string(),
        None => value.to_string(),
    }
}
