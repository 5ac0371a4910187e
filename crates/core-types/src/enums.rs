use crate::error::CoreError;
use crate::structs::InputRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven user-adjustable campaign inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputField {
    CampaignDuration,
    TotalAdSpend,
    Cpm,
    AdCtr,
    VslToOfCtr,
    OrderFormConversion,
    Aov,
}

impl InputField {
    /// Every input, in the order the calculator presents them.
    pub const ALL: [InputField; 7] = [
        InputField::CampaignDuration,
        InputField::TotalAdSpend,
        InputField::Cpm,
        InputField::AdCtr,
        InputField::VslToOfCtr,
        InputField::OrderFormConversion,
        InputField::Aov,
    ];

    /// The camelCase key used in JSON and TOML.
    pub fn key(&self) -> &'static str {
        match self {
            InputField::CampaignDuration => "campaignDuration",
            InputField::TotalAdSpend => "totalAdSpend",
            InputField::Cpm => "cpm",
            InputField::AdCtr => "adCtr",
            InputField::VslToOfCtr => "vslToOfCtr",
            InputField::OrderFormConversion => "orderFormConversion",
            InputField::Aov => "aov",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InputField::CampaignDuration => "Campaign Duration",
            InputField::TotalAdSpend => "Total Ad Spend",
            InputField::Cpm => "CPM (Cost Per 1000 Impressions)",
            InputField::AdCtr => "Ad CTR",
            InputField::VslToOfCtr => "VSL to OF CTR",
            InputField::OrderFormConversion => "Order Form Conversion",
            InputField::Aov => "Average Order Value",
        }
    }

    pub fn help_text(&self) -> &'static str {
        match self {
            InputField::CampaignDuration => "How long do you want to run your campaign?",
            InputField::TotalAdSpend => "What's your total budget for this campaign?",
            InputField::Cpm => "Average cost to reach 1000 people with your ad",
            InputField::AdCtr => "What percentage of people click your ad?",
            InputField::VslToOfCtr => {
                "What percentage of VSL viewers click through to the order form?"
            }
            InputField::OrderFormConversion => {
                "What percentage of order form visitors make a purchase?"
            }
            InputField::Aov => "What's the average amount spent per customer?",
        }
    }

    /// The slider bounds and step for this input.
    pub fn range(&self) -> InputRange {
        match self {
            InputField::CampaignDuration => InputRange::new(1.0, 90.0, 1.0),
            InputField::TotalAdSpend => InputRange::new(1_000.0, 500_000.0, 1_000.0),
            InputField::Cpm => InputRange::new(1.0, 100.0, 0.5),
            InputField::AdCtr => InputRange::new(0.1, 10.0, 0.1),
            InputField::VslToOfCtr => InputRange::new(0.1, 20.0, 0.1),
            InputField::OrderFormConversion => InputRange::new(0.1, 40.0, 0.1),
            InputField::Aov => InputRange::new(1.0, 1_000.0, 1.0),
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            InputField::TotalAdSpend | InputField::Cpm | InputField::Aov => "$",
            _ => "",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            InputField::CampaignDuration => " days",
            InputField::AdCtr | InputField::VslToOfCtr | InputField::OrderFormConversion => "%",
            _ => "",
        }
    }

    /// The outputs this input ripples into, in funnel order.
    ///
    /// Only the funnel rates and the order value carry an impact list; duration,
    /// spend and CPM affect nearly everything and are left unannotated.
    pub fn impacts(&self) -> &'static [OutputMetric] {
        use OutputMetric::*;
        match self {
            InputField::AdCtr => &[
                ClicksToVsl,
                CostPerClick,
                ClicksToOrder,
                GrossOrders,
                GrossRevenue,
                Roas,
                PromoConversionRate,
            ],
            InputField::VslToOfCtr => &[ClicksToOrder, GrossOrders, GrossRevenue, Roas],
            InputField::OrderFormConversion => &[GrossOrders, GrossRevenue, Roas],
            InputField::Aov => &[GrossRevenue, Roas],
            _ => &[],
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            InputField::CampaignDuration => &["duration", "days"],
            InputField::TotalAdSpend => &["spend", "budget"],
            InputField::Cpm => &[],
            InputField::AdCtr => &["ctr"],
            InputField::VslToOfCtr => &["vslctr", "ofctr"],
            InputField::OrderFormConversion => &["conversion", "cvr"],
            InputField::Aov => &["orderValue"],
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Lowercases and drops `_`/`-` so camelCase, snake_case and kebab-case
/// spellings compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for InputField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s.trim());
        InputField::ALL
            .into_iter()
            .find(|field| {
                normalize(field.key()) == wanted
                    || field.aliases().iter().any(|alias| normalize(alias) == wanted)
            })
            .ok_or_else(|| CoreError::UnknownField(s.trim().to_string()))
    }
}

/// How a derived metric is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFormat {
    /// Whole number with thousands separators.
    Integer,
    /// US dollars with two decimals.
    Currency,
    /// Percentage with the given number of decimals.
    Percent(u32),
}

/// The ten derived campaign metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputMetric {
    TotalImpressions,
    DailyBudget,
    ClicksToVsl,
    CostPerClick,
    ClicksToOrder,
    GrossOrders,
    GrossRevenue,
    Roas,
    Cpa,
    PromoConversionRate,
}

impl OutputMetric {
    /// Every metric, in derivation order.
    pub const ALL: [OutputMetric; 10] = [
        OutputMetric::TotalImpressions,
        OutputMetric::DailyBudget,
        OutputMetric::ClicksToVsl,
        OutputMetric::CostPerClick,
        OutputMetric::ClicksToOrder,
        OutputMetric::GrossOrders,
        OutputMetric::GrossRevenue,
        OutputMetric::Roas,
        OutputMetric::Cpa,
        OutputMetric::PromoConversionRate,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            OutputMetric::TotalImpressions => "totalImpressions",
            OutputMetric::DailyBudget => "dailyBudget",
            OutputMetric::ClicksToVsl => "clicksToVsl",
            OutputMetric::CostPerClick => "costPerClick",
            OutputMetric::ClicksToOrder => "clicksToOrder",
            OutputMetric::GrossOrders => "grossOrders",
            OutputMetric::GrossRevenue => "grossRevenue",
            OutputMetric::Roas => "roas",
            OutputMetric::Cpa => "cpa",
            OutputMetric::PromoConversionRate => "promoConversionRate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputMetric::TotalImpressions => "Total Impressions",
            OutputMetric::DailyBudget => "Daily Budget",
            OutputMetric::ClicksToVsl => "Clicks to VSL",
            OutputMetric::CostPerClick => "Cost Per Click",
            OutputMetric::ClicksToOrder => "Clicks to Order",
            OutputMetric::GrossOrders => "Gross Orders",
            OutputMetric::GrossRevenue => "Gross Revenue",
            OutputMetric::Roas => "ROAS",
            OutputMetric::Cpa => "CAC/CPA",
            OutputMetric::PromoConversionRate => "Promo Conversion",
        }
    }

    pub fn help_text(&self) -> &'static str {
        match self {
            OutputMetric::TotalImpressions => "Times your ad is shown",
            OutputMetric::DailyBudget => "Spend per campaign day",
            OutputMetric::ClicksToVsl => "Total visitors to your VSL page",
            OutputMetric::CostPerClick => "Average cost per visitor",
            OutputMetric::ClicksToOrder => "People who reach your order form",
            OutputMetric::GrossOrders => "Total purchases",
            OutputMetric::GrossRevenue => "Total revenue before costs",
            OutputMetric::Roas => "Return on ad spend",
            OutputMetric::Cpa => "Cost to acquire each customer",
            OutputMetric::PromoConversionRate => "VSL to purchase rate",
        }
    }

    pub fn display_format(&self) -> DisplayFormat {
        match self {
            OutputMetric::TotalImpressions
            | OutputMetric::ClicksToVsl
            | OutputMetric::ClicksToOrder
            | OutputMetric::GrossOrders => DisplayFormat::Integer,
            OutputMetric::DailyBudget
            | OutputMetric::CostPerClick
            | OutputMetric::GrossRevenue
            | OutputMetric::Cpa => DisplayFormat::Currency,
            OutputMetric::Roas => DisplayFormat::Percent(1),
            OutputMetric::PromoConversionRate => DisplayFormat::Percent(2),
        }
    }
}

impl fmt::Display for OutputMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for OutputMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s.trim());
        OutputMetric::ALL
            .into_iter()
            .find(|metric| normalize(metric.key()) == wanted)
            .ok_or_else(|| CoreError::UnknownField(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_spelling_of_a_field() {
        for name in ["vslToOfCtr", "vsl_to_of_ctr", "vsl-to-of-ctr", "VSLTOOFCTR", "ofctr"] {
            assert_eq!(name.parse::<InputField>(), Ok(InputField::VslToOfCtr), "{name}");
        }
        assert_eq!("spend".parse::<InputField>(), Ok(InputField::TotalAdSpend));
    }

    #[test]
    fn rejects_unknown_field() {
        assert_eq!(
            "clicks".parse::<InputField>(),
            Err(CoreError::UnknownField("clicks".to_string()))
        );
    }

    #[test]
    fn keys_round_trip_through_from_str() {
        for field in InputField::ALL {
            assert_eq!(field.key().parse::<InputField>(), Ok(field));
        }
        for metric in OutputMetric::ALL {
            assert_eq!(metric.key().parse::<OutputMetric>(), Ok(metric));
        }
    }

    #[test]
    fn only_funnel_inputs_carry_impacts() {
        assert_eq!(InputField::Aov.impacts(), &[OutputMetric::GrossRevenue, OutputMetric::Roas]);
        assert_eq!(InputField::AdCtr.impacts().len(), 7);
        assert!(InputField::CampaignDuration.impacts().is_empty());
        assert!(InputField::TotalAdSpend.impacts().is_empty());
        assert!(InputField::Cpm.impacts().is_empty());
    }

    #[test]
    fn serde_keys_match_display_keys() {
        let json = serde_json::to_string(&InputField::OrderFormConversion).unwrap();
        assert_eq!(json, "\"orderFormConversion\"");
        let json = serde_json::to_string(&OutputMetric::PromoConversionRate).unwrap();
        assert_eq!(json, "\"promoConversionRate\"");
    }
}
