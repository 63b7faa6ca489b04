//! Running windspeed statistics
//!
//! Samples are accumulated with Welford's online algorithm so a wind
//! directory can be streamed file-by-file without holding every sample.
//! Standard deviation is the sample (n-1) form.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single wind observation.
#[derive(Debug, Clone, PartialEq)]
pub struct WindSample {
    pub time: DateTime<Utc>,
    pub speed_mps: f64,
    pub direction_deg: Option<f64>,
    /// Altitude the sample was taken at; files for single-altitude
    /// products usually omit it.
    pub altitude_m: Option<u32>,
}

/// Online mean/variance accumulator.
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample standard deviation. Zero for a single sample.
    pub fn std_dev(&self) -> Option<f64> {
        match self.count {
            0 => None,
            1 => Some(0.0),
            n => Some((self.m2 / (n - 1) as f64).sqrt()),
        }
    }

    pub fn finish(&self) -> Option<WindStats> {
        Some(WindStats {
            mean_mps: self.mean()?,
            std_dev_mps: self.std_dev()?,
            count: self.count,
        })
    }
}

/// Aggregated windspeed statistics for one wind type and altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindStats {
    pub mean_mps: f64,
    pub std_dev_mps: f64,
    pub count: u64,
}

/// Compute windspeed statistics for the samples relevant to a plume.
///
/// A sample is relevant when it falls within `window_seconds` centered
/// on `observed_at` and either carries no altitude or matches
/// `altitude_m`. Returns `None` when no sample qualifies; the caller
/// substitutes the fill value.
pub fn compute_wind_stats(
    samples: &[WindSample],
    observed_at: DateTime<Utc>,
    altitude_m: u32,
    window_seconds: u64,
) -> Option<WindStats> {
    let half = Duration::seconds(window_seconds as i64 / 2);
    let start = observed_at - half;
    let end = observed_at + half;

    let mut stats = RunningStats::new();
    for sample in samples {
        if sample.time < start || sample.time > end {
            continue;
        }
        if let Some(alt) = sample.altitude_m {
            if alt != altitude_m {
                continue;
            }
        }
        stats.push(sample.speed_mps);
    }
    stats.finish()
}
