use crate::engine::{percent_change, ForecastEngine};
use crate::report::ForecastReport;
use core_types::{CampaignInputs, InputField, MetricsSnapshot, OutputMetric};

/// The live state of one forecasting session.
///
/// Holds the current inputs, the snapshot derived from them, and the snapshot
/// from the step before. Every transition consumes the state and returns the
/// next one, so the current/previous pair is always replaced together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastState {
    engine: ForecastEngine,
    inputs: CampaignInputs,
    current: MetricsSnapshot,
    previous: Option<MetricsSnapshot>,
}

impl ForecastState {
    /// Starts a session. The first snapshot has nothing to compare against.
    pub fn new(inputs: CampaignInputs) -> Self {
        let engine = ForecastEngine::new();
        let current = engine.derive(&inputs);
        Self {
            engine,
            inputs,
            current,
            previous: None,
        }
    }

    /// Recomputes from a whole new input tuple.
    pub fn apply(self, inputs: CampaignInputs) -> Self {
        let current = self.engine.derive(&inputs);
        tracing::debug!(?inputs, "Recomputed forecast snapshot.");
        Self {
            engine: self.engine,
            inputs,
            current,
            previous: Some(self.current),
        }
    }

    /// Text-entry update: the value is taken as typed, even out of range.
    pub fn set(self, field: InputField, value: f64) -> Self {
        if !field.range().contains(value) {
            tracing::warn!(%field, value, "Input is outside the slider range.");
        }
        let inputs = self.inputs.with(field, value);
        self.apply(inputs)
    }

    /// Slider update: the value is clamped and snapped to the field's step.
    pub fn slide(self, field: InputField, value: f64) -> Self {
        let snapped = field.range().snap(value);
        let inputs = self.inputs.with(field, snapped);
        self.apply(inputs)
    }

    /// Returns to the given starting tuple; counts as a change.
    pub fn reset(self, defaults: CampaignInputs) -> Self {
        self.apply(defaults)
    }

    pub fn inputs(&self) -> &CampaignInputs {
        &self.inputs
    }

    pub fn current(&self) -> &MetricsSnapshot {
        &self.current
    }

    pub fn previous(&self) -> Option<&MetricsSnapshot> {
        self.previous.as_ref()
    }

    pub fn delta(&self, metric: OutputMetric) -> Option<f64> {
        percent_change(
            self.current.get(metric),
            self.previous.map(|p| p.get(metric)),
        )
    }

    pub fn report(&self) -> ForecastReport {
        ForecastReport::new(self.inputs, self.current, self.previous.as_ref())
    }
}

impl Default for ForecastState {
    fn default() -> Self {
        Self::new(CampaignInputs::default())
    }
}
