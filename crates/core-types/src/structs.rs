use crate::enums::{InputField, OutputMetric};
use serde::{Deserialize, Serialize};

/// Inclusive bounds and step of an input's slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl InputRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamps into `[min, max]`. `NaN` is left untouched.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Clamps, then moves to the nearest slider stop counted from `min`.
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = self.clamp(value);
        if !clamped.is_finite() || self.step <= 0.0 {
            return clamped;
        }
        let stops = ((clamped - self.min) / self.step).round();
        let snapped = self.min + stops * self.step;
        round_to_decimals(snapped, self.step_decimals()).clamp(self.min, self.max)
    }

    /// Number of decimals in the step, so `0.1 * 3` lands on `0.3`.
    fn step_decimals(&self) -> i32 {
        let mut decimals = 0;
        let mut scaled = self.step;
        while decimals < 10 && (scaled - scaled.round()).abs() > 1e-9 {
            scaled *= 10.0;
            decimals += 1;
        }
        decimals
    }
}

fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// The full input tuple of a forecast.
///
/// Values are plain numbers with no cross-validation; nothing here clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInputs {
    /// Campaign length in days.
    pub campaign_duration: f64,
    /// Total budget in USD.
    pub total_ad_spend: f64,
    /// USD per 1000 impressions.
    pub cpm: f64,
    /// Percent of impressions that click through to the VSL.
    pub ad_ctr: f64,
    /// Percent of VSL visitors that reach the order form.
    pub vsl_to_of_ctr: f64,
    /// Percent of order form visitors that purchase.
    pub order_form_conversion: f64,
    /// Average order value in USD.
    pub aov: f64,
}

impl CampaignInputs {
    /// The seed tuple every session starts from.
    pub const DEFAULT: CampaignInputs = CampaignInputs {
        campaign_duration: 30.0,
        total_ad_spend: 200_000.0,
        cpm: 40.0,
        ad_ctr: 2.0,
        vsl_to_of_ctr: 5.0,
        order_form_conversion: 20.0,
        aov: 204.42,
    };

    pub fn get(&self, field: InputField) -> f64 {
        match field {
            InputField::CampaignDuration => self.campaign_duration,
            InputField::TotalAdSpend => self.total_ad_spend,
            InputField::Cpm => self.cpm,
            InputField::AdCtr => self.ad_ctr,
            InputField::VslToOfCtr => self.vsl_to_of_ctr,
            InputField::OrderFormConversion => self.order_form_conversion,
            InputField::Aov => self.aov,
        }
    }

    pub fn set(&mut self, field: InputField, value: f64) {
        let slot = match field {
            InputField::CampaignDuration => &mut self.campaign_duration,
            InputField::TotalAdSpend => &mut self.total_ad_spend,
            InputField::Cpm => &mut self.cpm,
            InputField::AdCtr => &mut self.ad_ctr,
            InputField::VslToOfCtr => &mut self.vsl_to_of_ctr,
            InputField::OrderFormConversion => &mut self.order_form_conversion,
            InputField::Aov => &mut self.aov,
        };
        *slot = value;
    }

    /// Returns a copy with one field replaced.
    pub fn with(mut self, field: InputField, value: f64) -> Self {
        self.set(field, value);
        self
    }

    /// Fields whose value lies outside the slider range.
    pub fn out_of_range(&self) -> Vec<InputField> {
        InputField::ALL
            .into_iter()
            .filter(|field| !field.range().contains(self.get(*field)))
            .collect()
    }
}

impl Default for CampaignInputs {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One complete set of derived metrics.
///
/// Produced whole by the engine; never updated field by field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_impressions: f64,
    pub daily_budget: f64,
    pub clicks_to_vsl: f64,
    pub cost_per_click: f64,
    pub clicks_to_order: f64,
    pub gross_orders: f64,
    pub gross_revenue: f64,
    /// Percent.
    pub roas: f64,
    pub cpa: f64,
    /// Percent.
    pub promo_conversion_rate: f64,
}

impl MetricsSnapshot {
    pub fn get(&self, metric: OutputMetric) -> f64 {
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

    /// Metrics holding `±Infinity` or `NaN`, in derivation order.
    pub fn non_finite(&self) -> Vec<OutputMetric> {
        OutputMetric::ALL
            .into_iter()
            .filter(|metric| !self.get(*metric).is_finite())
            .collect()
    }

    pub fn is_finite(&self) -> bool {
        self.non_finite().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_lands_on_slider_stops() {
        let ctr = InputField::AdCtr.range();
        assert_eq!(ctr.snap(2.34), 2.3);
        assert_eq!(ctr.snap(0.0), 0.1);
        assert_eq!(ctr.snap(12.0), 10.0);

        let spend = InputField::TotalAdSpend.range();
        assert_eq!(spend.snap(123_456.0), 123_000.0);

        let cpm = InputField::Cpm.range();
        assert_eq!(cpm.snap(40.3), 40.5);
    }

    #[test]
    fn clamp_keeps_in_range_values() {
        let aov = InputField::Aov.range();
        assert_eq!(aov.clamp(204.42), 204.42);
        assert_eq!(aov.clamp(-5.0), 1.0);
        assert!(aov.contains(1.0) && aov.contains(1000.0));
        assert!(!aov.contains(1000.01));
    }

    #[test]
    fn default_tuple_is_in_range() {
        assert!(CampaignInputs::default().out_of_range().is_empty());
        let inputs = CampaignInputs::default().with(InputField::AdCtr, 0.0);
        assert_eq!(inputs.out_of_range(), vec![InputField::AdCtr]);
    }

    #[test]
    fn get_and_set_address_the_same_slot() {
        let mut inputs = CampaignInputs::default();
        for (i, field) in InputField::ALL.into_iter().enumerate() {
            inputs.set(field, i as f64 + 0.5);
            assert_eq!(inputs.get(field), i as f64 + 0.5);
        }
    }

    #[test]
    fn inputs_serialize_with_camel_case_keys() {
        let value = serde_json::to_value(CampaignInputs::default()).unwrap();
        assert_eq!(value["totalAdSpend"], 200_000.0);
        assert_eq!(value["vslToOfCtr"], 5.0);
    }
}
