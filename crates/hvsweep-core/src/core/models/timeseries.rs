use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimeSeriesError {
    #[error("Sample interval must be positive and finite (got {0})")]
    InvalidSampleInterval(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrimError {
    #[error("Cannot trim an empty time series")]
    Empty,
    #[error("Trim window is inverted: start {start} s is after end {end} s")]
    Inverted { start: f64, end: f64 },
    #[error(
        "Trim window [{start}, {end}] s falls outside the record [0, {record_end}] s"
    )]
    OutOfRange {
        start: f64,
        end: f64,
        record_end: f64,
    },
    #[error("Requested duration must be positive and finite (got {0} s)")]
    InvalidDuration(f64),
}

/// A uniformly sampled amplitude record.
///
/// The time axis is implicit: sample `i` sits at `i * dt` seconds, so a
/// trimmed series always restarts at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    dt: f64,
    amplitude: Vec<f64>,
}

impl TimeSeries {
    pub fn new(dt: f64, amplitude: Vec<f64>) -> Result<Self, TimeSeriesError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(TimeSeriesError::InvalidSampleInterval(dt));
        }
        Ok(Self { dt, amplitude })
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[inline]
    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    #[inline]
    pub fn amplitude_mut(&mut self) -> &mut [f64] {
        &mut self.amplitude
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.amplitude.len()
    }

    /// Time of the last sample in seconds, or `0.0` for an empty series.
    pub fn end_time(&self) -> f64 {
        self.amplitude.len().saturating_sub(1) as f64 * self.dt
    }

    /// Keeps the samples between `start` and `end` (inclusive, snapped to the
    /// nearest sample).
    ///
    /// Bounds may overshoot the record by at most half a sample; anything
    /// further is rejected rather than silently clamped.
    pub fn trim(&mut self, start: f64, end: f64) -> Result<(), TrimError> {
        if self.amplitude.is_empty() {
            return Err(TrimError::Empty);
        }
        if start.is_nan() || end.is_nan() || start > end {
            return Err(TrimError::Inverted { start, end });
        }

        let tolerance = self.dt / 2.0;
        let record_end = self.end_time();
        if start < -tolerance || end > record_end + tolerance {
            return Err(TrimError::OutOfRange {
                start,
                end,
                record_end,
            });
        }

        let start_index = self.nearest_index(start);
        let end_index = self.nearest_index(end);
        self.amplitude.truncate(end_index + 1);
        self.amplitude.drain(..start_index);
        Ok(())
    }

    fn nearest_index(&self, time: f64) -> usize {
        let last = self.amplitude.len() - 1;
        ((time / self.dt).round().max(0.0) as usize).min(last)
    }
}
