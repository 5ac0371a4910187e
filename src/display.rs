//! Number formatting for the terminal front end.
//!
//! Values are rounded half away from zero with `rust_decimal` and grouped with
//! `,` every three digits. Non-finite values print as `∞`, `-∞` or `NaN`.

use core_types::{DisplayFormat, InputField, OutputMetric};
use rust_decimal::prelude::*;
use std::fmt;

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("∞")
    } else if value == f64::NEG_INFINITY {
        Some("-∞")
    } else {
        None
    }
}

/// Inserts `,` between groups of three integer digits of a plain decimal string.
fn group_thousands(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Fixed `decimals`, thousands separators.
pub fn format_number(value: f64, decimals: u32) -> String {
    if let Some(text) = non_finite(value) {
        return text.to_string();
    }

    let plain = match Decimal::from_f64(value) {
        Some(decimal) => {
            let mut rounded =
                decimal.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
            if rounded.is_zero() {
                rounded.set_sign_positive(true);
            }
            format!("{:.*}", decimals as usize, rounded)
        }
        // Beyond Decimal's range; f64 formatting is exact enough at that scale.
        None => format!("{:.*}", decimals as usize, value),
    };

    group_thousands(&plain)
}

/// US dollars with two decimals, e.g. `$204,420.00` or `-$3.50`.
pub fn format_currency(value: f64) -> String {
    let number = format_number(value, 2);
    match number.strip_prefix('-') {
        Some(magnitude) => format!("-${magnitude}"),
        None => format!("${number}"),
    }
}

pub fn format_percent(value: f64, decimals: u32) -> String {
    format!("{}%", format_number(value, decimals))
}

pub fn format_metric(metric: OutputMetric, value: f64) -> String {
    match metric.display_format() {
        DisplayFormat::Integer => format_number(value, 0),
        DisplayFormat::Currency => format_currency(value),
        DisplayFormat::Percent(decimals) => format_percent(value, decimals),
    }
}

/// An input as the user typed it, with the field's prefix and suffix.
pub fn format_input(field: InputField, value: f64) -> String {
    let number = match non_finite(value) {
        Some(text) => text.to_string(),
        None => group_thousands(&value.to_string()),
    };
    format!("{}{}{}", field.prefix(), number, field.suffix())
}

/// Direction and size of a visible change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeltaIndicator {
    Up(f64),
    Down(f64),
}

impl DeltaIndicator {
    /// Decides whether a change is worth showing.
    ///
    /// Nothing is shown without a change, for a zero or `NaN` change, or when
    /// the absolute change is below `threshold` percent.
    pub fn from_change(change: Option<f64>, threshold: f64) -> Option<Self> {
        let change = change.filter(|c| *c != 0.0 && !c.is_nan())?;
        let magnitude = change.abs();
        if magnitude < threshold {
            return None;
        }
        if change > 0.0 {
            Some(DeltaIndicator::Up(magnitude))
        } else {
            Some(DeltaIndicator::Down(magnitude))
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, DeltaIndicator::Up(_))
    }
}

impl fmt::Display for DeltaIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (arrow, magnitude) = match self {
            DeltaIndicator::Up(m) => ('▲', *m),
            DeltaIndicator::Down(m) => ('▼', *m),
        };
        if magnitude.is_finite() {
            write!(f, "{arrow} {magnitude:.1}%")
        } else {
            write!(f, "{arrow} ∞%")
        }
    }
}
