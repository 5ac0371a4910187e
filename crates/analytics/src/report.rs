use crate::engine::percent_change;
use core_types::{CampaignInputs, MetricsSnapshot, OutputMetric};
use serde::{Deserialize, Serialize};

/// Per-metric percentage change against the previous snapshot.
///
/// `None` means no delta should be shown for that metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDeltas {
    pub total_impressions: Option<f64>,
    pub daily_budget: Option<f64>,
    pub clicks_to_vsl: Option<f64>,
    pub cost_per_click: Option<f64>,
    pub clicks_to_order: Option<f64>,
    pub gross_orders: Option<f64>,
    pub gross_revenue: Option<f64>,
    pub roas: Option<f64>,
    pub cpa: Option<f64>,
    pub promo_conversion_rate: Option<f64>,
}

impl MetricDeltas {
    /// Compares every metric of `current` against `previous`.
    pub fn between(current: &MetricsSnapshot, previous: Option<&MetricsSnapshot>) -> Self {
        let change = |metric: OutputMetric| {
            percent_change(current.get(metric), previous.map(|p| p.get(metric)))
        };
        Self {
            total_impressions: change(OutputMetric::TotalImpressions),
            daily_budget: change(OutputMetric::DailyBudget),
            clicks_to_vsl: change(OutputMetric::ClicksToVsl),
            cost_per_click: change(OutputMetric::CostPerClick),
            clicks_to_order: change(OutputMetric::ClicksToOrder),
            gross_orders: change(OutputMetric::GrossOrders),
            gross_revenue: change(OutputMetric::GrossRevenue),
            roas: change(OutputMetric::Roas),
            cpa: change(OutputMetric::Cpa),
            promo_conversion_rate: change(OutputMetric::PromoConversionRate),
        }
    }

    pub fn get(&self, metric: OutputMetric) -> Option<f64> {
        match metric {
            OutputMetric::TotalImpressions => self.total_impressions,
            OutputMetric::DailyBudget => self.daily_budget,
            OutputMetric::ClicksToVsl => self.clicks_to_vsl,
            OutputMetric::CostPerClick => self.cost_per_click,
            OutputMetric::ClicksToOrder => self.clicks_to_order,
            OutputMetric::GrossOrders => self.gross_orders,
            OutputMetric::GrossRevenue => self.gross_revenue,
            OutputMetric::Roas => self.roas,
            OutputMetric::Cpa => self.cpa,
            OutputMetric::PromoConversionRate => self.promo_conversion_rate,
        }
    }
}

/// A complete, serializable view of one forecast.
///
/// This is the data transfer object handed to renderers and emitted as JSON.
/// Non-finite metric values serialize as `null`; `non_finite` names them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    pub inputs: CampaignInputs,
    pub metrics: MetricsSnapshot,
    pub deltas: MetricDeltas,
    pub non_finite: Vec<OutputMetric>,
}

impl ForecastReport {
    pub fn new(
        inputs: CampaignInputs,
        metrics: MetricsSnapshot,
        previous: Option<&MetricsSnapshot>,
    ) -> Self {
        Self {
            inputs,
            deltas: MetricDeltas::between(&metrics, previous),
            non_finite: metrics.non_finite(),
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ForecastEngine;
    use core_types::InputField;

    #[test]
    fn no_previous_means_no_deltas() {
        let metrics = ForecastEngine::new().derive(&CampaignInputs::default());
        let report = ForecastReport::new(CampaignInputs::default(), metrics, None);

        assert_eq!(report.deltas, MetricDeltas::default());
        assert!(report.non_finite.is_empty());
    }

    #[test]
    fn deltas_follow_the_changed_input() {
        let engine = ForecastEngine::new();
        let before = engine.derive(&CampaignInputs::default());
        let inputs = CampaignInputs::default().with(InputField::Aov, 408.84);
        let after = engine.derive(&inputs);

        let deltas = MetricDeltas::between(&after, Some(&before));
        assert_eq!(deltas.get(OutputMetric::GrossOrders), Some(0.0));
        let revenue = deltas.get(OutputMetric::GrossRevenue).unwrap();
        assert!((revenue - 100.0).abs() < 1e-9);
        let roas = deltas.get(OutputMetric::Roas).unwrap();
        assert!((roas - 100.0).abs() < 1e-9);
    }

    #[test]
    fn report_json_uses_camel_case_and_flags_degenerate_metrics() {
        let inputs = CampaignInputs::default().with(InputField::AdCtr, 0.0);
        let metrics = ForecastEngine::new().derive(&inputs);
        let report = ForecastReport::new(inputs, metrics, None);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["inputs"]["adCtr"], 0.0);
        assert!(json["metrics"]["costPerClick"].is_null());
        assert_eq!(
            json["nonFinite"],
            serde_json::json!(["costPerClick", "cpa", "promoConversionRate"])
        );
    }
}
