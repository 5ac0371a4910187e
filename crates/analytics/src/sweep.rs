use crate::engine::ForecastEngine;
use crate::error::AnalyticsError;
use core_types::{CampaignInputs, InputField, MetricsSnapshot};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of points a single sweep may generate.
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// A linear range of values for one input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl SweepRange {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// The slider range of the field.
    pub fn from_field(field: InputField) -> Self {
        let range = field.range();
        Self::new(range.min, range.max, range.step)
    }

    /// Number of points from `start` to `end` inclusive.
    fn point_count(&self, field: InputField) -> Result<usize, AnalyticsError> {
        let invalid = |reason: String| AnalyticsError::InvalidSweep {
            field: field.key().to_string(),
            reason,
        };

        if !(self.start.is_finite() && self.end.is_finite() && self.step.is_finite()) {
            return Err(invalid("bounds and step must be finite".to_string()));
        }
        if self.step <= 0.0 {
            return Err(invalid(format!("step must be positive, got {}", self.step)));
        }
        if self.start > self.end {
            return Err(invalid(format!(
                "start {} is greater than end {}",
                self.start, self.end
            )));
        }

        // The epsilon keeps `end` itself when (end - start) is an exact multiple
        // of step that floating point lands just short of.
        let intervals = ((self.end - self.start) / self.step + 1e-9).floor();
        if intervals >= MAX_SWEEP_POINTS as f64 {
            return Err(invalid(format!(
                "range would produce more than {MAX_SWEEP_POINTS} points"
            )));
        }
        Ok(intervals as usize + 1)
    }
}

/// One row of a sweep: the swept value and the snapshot it produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: f64,
    pub metrics: MetricsSnapshot,
}

/// Walks `field` across `range` while holding every other input of `base` fixed.
pub fn sweep(
    base: &CampaignInputs,
    field: InputField,
    range: SweepRange,
) -> Result<Vec<SweepPoint>, AnalyticsError> {
    let count = range.point_count(field)?;
    let engine = ForecastEngine::new();

    tracing::debug!(%field, count, "Sweeping campaign input.");

    let points = (0..count)
        .map(|i| {
            let value = (range.start + i as f64 * range.step).min(range.end);
            SweepPoint {
                value,
                metrics: engine.derive(&base.with(field, value)),
            }
        })
        .collect();

    Ok(points)
}
