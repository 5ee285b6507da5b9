//! Formatter bank: value -> text for axis ticks, tooltips, and legends.
//!
//! Every function is total. Non-finite input renders as [`NON_FINITE`].
//! Rounding is half away from zero (`f64::round`), matching how dashboard users read
//! `1,234.5 -> 1,235`; Rust's `{:.N}` alone would round ties to even.

use crate::catalog::Unit;
use chrono::NaiveDateTime;
use num_format::{Locale, ToFormattedString};

/// Sentinel for NaN / infinite values.
pub const NON_FINITE: &str = "NA";

const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;
// 2^128, the first value a u128 cannot hold
const U128_LIMIT: f64 = 340_282_366_920_938_463_463_374_607_431_768_211_456.0;

/// What the formatted string is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatPurpose {
    AxisTick,
    Tooltip,
    Legend,
}

/// Map a user-provided locale tag to a `num_format::Locale`.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> &'static Locale {
    match tag.to_lowercase().replace('-', "_").as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        _ => &Locale::en,
    }
}

// -0.0 prints as "-0.0"; adding +0.0 normalizes it
fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round() / f + 0.0
}

fn grouped_integer(x: f64, locale: &Locale) -> String {
    let abs = x.abs().round();
    if abs < U128_LIMIT {
        return (abs as u128).to_formatted_string(locale);
    }
    // beyond u128, group the exact decimal expansion in threes
    let digits = format!("{abs:.0}");
    let mut out = String::with_capacity(digits.len() * 2);
    for (i, d) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(locale.separator());
        }
        out.push(d);
    }
    out
}

/// Whole-dollar currency with locale grouping: `1234.9 -> "$1,235"`, `-50.2 -> "-$50"`.
pub fn format_currency(value: f64) -> String {
    format_currency_locale(value, &Locale::en)
}

pub fn format_currency_locale(value: f64, locale: &Locale) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    let rounded = value.round();
    let body = grouped_integer(rounded, locale);
    if rounded < 0.0 {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// Abbreviate by absolute value, then restore the sign:
/// `-2_400_000 -> "-2M"`, `1_500 -> "2K"`, `950 -> "950.0"`.
pub fn format_magnitude(value: f64) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    let abs = value.abs();
    let (body, is_zero) = if abs >= MILLION {
        let m = (abs / MILLION).round();
        (format!("{m}M"), m == 0.0)
    } else if abs >= THOUSAND {
        let k = (abs / THOUSAND).round();
        (format!("{k}K"), k == 0.0)
    } else {
        let r = round_to(abs, 1);
        (format!("{r:.1}"), r == 0.0)
    };
    if value < 0.0 && !is_zero {
        format!("-{body}")
    } else {
        body
    }
}

/// Percentage points: one decimal below 1,000, `k%` from 1,000, `M%` (one decimal) from 1,000,000.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    let abs = value.abs();
    if abs >= MILLION {
        format!("{:.1}M%", round_to(value / MILLION, 1))
    } else if abs >= THOUSAND {
        format!("{}k%", round_to(value / THOUSAND, 0))
    } else {
        format!("{:.1}%", round_to(value, 1))
    }
}

/// Full-precision tooltip number: two decimals, locale grouping (`1,234.57`).
pub fn format_tooltip_number(value: f64) -> String {
    format_tooltip_number_locale(value, &Locale::en)
}

pub fn format_tooltip_number_locale(value: f64, locale: &Locale) -> String {
    if !value.is_finite() {
        return NON_FINITE.to_string();
    }
    let abs = value.abs();
    // from 2^52 on every f64 is whole; scaling by 100 could overflow
    let (whole, frac, cents) = if abs >= 4_503_599_627_370_496.0 {
        (abs, 0, abs)
    } else {
        let cents = (abs * 100.0).round();
        let whole = (cents / 100.0).trunc();
        (whole, (cents - whole * 100.0) as u64, cents)
    };
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    format!(
        "{sign}{}{}{frac:02}",
        grouped_integer(whole, locale),
        locale.decimal()
    )
}

/// X-axis tick label, e.g. `Jan 5`.
pub fn format_axis_date(ts: &NaiveDateTime) -> String {
    ts.format("%b %-d").to_string()
}

/// Tooltip heading, e.g. `Date: 1/5/2024`.
pub fn format_tooltip_date(ts: &NaiveDateTime) -> String {
    format!("Date: {}", ts.format("%-m/%-d/%Y"))
}

/// Dispatch on the static unit tag of a series.
pub fn format_value(unit: Unit, purpose: FormatPurpose, value: f64) -> String {
    format_value_locale(unit, purpose, value, &Locale::en)
}

pub fn format_value_locale(
    unit: Unit,
    purpose: FormatPurpose,
    value: f64,
    locale: &Locale,
) -> String {
    match (purpose, unit) {
        (FormatPurpose::AxisTick, Unit::Percent) => format_percentage(value),
        (FormatPurpose::AxisTick, _) => format_magnitude(value),
        (FormatPurpose::Tooltip, Unit::Currency) => format_currency_locale(value, locale),
        (FormatPurpose::Tooltip, Unit::Percent) => {
            let n = format_tooltip_number_locale(value, locale);
            if value.is_finite() { format!("{n}%") } else { n }
        }
        (FormatPurpose::Tooltip, Unit::Raw) => format_tooltip_number_locale(value, locale),
        (FormatPurpose::Legend, Unit::Currency) => {
            let m = format_magnitude(value);
            match m.strip_prefix('-') {
                Some(rest) => format!("-${rest}"),
                None if value.is_finite() => format!("${m}"),
                None => m,
            }
        }
        (FormatPurpose::Legend, Unit::Percent) => format_percentage(value),
        (FormatPurpose::Legend, Unit::Raw) => format_magnitude(value),
    }
}
