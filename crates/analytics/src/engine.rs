use core_types::{CampaignInputs, MetricsSnapshot};

/// A stateless calculator for deriving funnel metrics from campaign inputs.
///
/// The calculation is total over IEEE-754 doubles. Inputs that zero out a
/// divisor (no clicks, no orders, zero spend) yield `Infinity` or `NaN` in the
/// dependent metrics instead of an error; callers can inspect them through
/// [`MetricsSnapshot::non_finite`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ForecastEngine {}

impl ForecastEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the full metrics snapshot from one input tuple.
    ///
    /// Each formula only reads raw inputs or metrics computed above it.
    /// No rounding is applied here.
    pub fn derive(&self, inputs: &CampaignInputs) -> MetricsSnapshot {
        let spend = inputs.total_ad_spend;

        let total_impressions = spend / inputs.cpm * 1000.0;
        let daily_budget = spend / inputs.campaign_duration;
        let clicks_to_vsl = total_impressions * (inputs.ad_ctr / 100.0);
        let cost_per_click = spend / clicks_to_vsl;
        let clicks_to_order = clicks_to_vsl * (inputs.vsl_to_of_ctr / 100.0);
        let gross_orders = clicks_to_order * (inputs.order_form_conversion / 100.0);
        let gross_revenue = gross_orders * inputs.aov;
        let roas = (gross_revenue / spend) * 100.0;
        let cpa = spend / gross_orders;
        let promo_conversion_rate = (gross_orders / clicks_to_vsl) * 100.0;

        let snapshot = MetricsSnapshot {
            total_impressions,
            daily_budget,
            clicks_to_vsl,
            cost_per_click,
            clicks_to_order,
            gross_orders,
            gross_revenue,
            roas,
            cpa,
            promo_conversion_rate,
        };

        let non_finite = snapshot.non_finite();
        if !non_finite.is_empty() {
            tracing::warn!(metrics = ?non_finite, ?inputs, "Forecast produced non-finite metrics.");
        }

        snapshot
    }
}

/// Percentage change of `current` against `previous`.
///
/// Returns `None` when there is nothing to compare against: no previous value,
/// or a previous value of `0` or `NaN`.
pub fn percent_change(current: f64, previous: Option<f64>) -> Option<f64> {
    let previous = previous.filter(|p| *p != 0.0 && !p.is_nan())?;
    Some((current - previous) / previous * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{InputField, OutputMetric};

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_tuple_matches_reference_forecast() {
        let m = ForecastEngine::new().derive(&CampaignInputs::default());

        assert_close(m.total_impressions, 5_000_000.0);
        assert_close(m.daily_budget, 200_000.0 / 30.0);
        assert_close(m.clicks_to_vsl, 100_000.0);
        assert_close(m.cost_per_click, 2.0);
        assert_close(m.clicks_to_order, 5_000.0);
        assert_close(m.gross_orders, 1_000.0);
        assert_close(m.gross_revenue, 204_420.0);
        assert_close(m.roas, 102.21);
        assert_close(m.cpa, 200.0);
        assert_close(m.promo_conversion_rate, 1.0);
        assert!(m.is_finite());
    }

    #[test]
    fn lowest_conversion_still_yields_orders() {
        let inputs = CampaignInputs::default().with(InputField::OrderFormConversion, 0.1);
        let m = ForecastEngine::new().derive(&inputs);

        assert!(m.gross_orders > 0.0);
        assert_close(m.gross_orders, 5.0);
        assert!(m.is_finite());
    }

    #[test]
    fn zero_ctr_is_non_finite_not_a_panic() {
        let inputs = CampaignInputs::default().with(InputField::AdCtr, 0.0);
        let m = ForecastEngine::new().derive(&inputs);

        assert_eq!(m.clicks_to_vsl, 0.0);
        assert_eq!(m.cost_per_click, f64::INFINITY);
        assert!(m.promo_conversion_rate.is_nan());
        assert_eq!(m.cpa, f64::INFINITY);
        assert_eq!(
            m.non_finite(),
            vec![
                OutputMetric::CostPerClick,
                OutputMetric::Cpa,
                OutputMetric::PromoConversionRate
            ]
        );
    }

    #[test]
    fn percent_change_needs_a_usable_previous() {
        assert_eq!(percent_change(10.0, None), None);
        assert_eq!(percent_change(10.0, Some(0.0)), None);
        assert_eq!(percent_change(10.0, Some(f64::NAN)), None);
        assert_eq!(percent_change(10.0, Some(10.0)), Some(0.0));
        assert_eq!(percent_change(15.0, Some(10.0)), Some(50.0));
        assert_eq!(percent_change(5.0, Some(10.0)), Some(-50.0));
    }
}
