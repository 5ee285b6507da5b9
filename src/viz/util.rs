//! Utility functions for visualization: colors, axis label sizing, time coordinates.

use chrono::{DateTime, NaiveDateTime};
use plotters::prelude::*;

use super::text::estimate_text_width_px;
use crate::domain::AxisDomain;

/// Microsoft Office (2013+) chart series palette, used when a catalog color does not parse.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Legend swatch and label tint for a hidden series.
pub const INACTIVE_GREY: RGBColor = RGBColor(170, 170, 170);

const SECONDS_PER_DAY: f64 = 86_400.0;

#[inline]
pub fn office_color(idx: usize) -> RGBColor {
    OFFICE10[idx % OFFICE10.len()]
}

/// Parse `#rrggbb` or `#rgb`.
pub fn parse_hex_color(s: &str) -> Option<RGBColor> {
    let hex = s.trim().strip_prefix('#')?;
    let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        6 => Some(RGBColor(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
        3 => {
            let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
            Some(RGBColor(r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}

/// Catalog color for series number `idx`, falling back to the palette.
pub fn series_color(hex: &str, idx: usize) -> RGBColor {
    parse_hex_color(hex).unwrap_or_else(|| {
        log::warn!("unparseable series color {hex:?}, using palette entry {idx}");
        office_color(idx)
    })
}

/// Timestamp as fractional days since the Unix epoch (the x coordinate).
pub fn to_day_coord(ts: &NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64 / SECONDS_PER_DAY
}

pub fn from_day_coord(x: f64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp((x * SECONDS_PER_DAY).round() as i64, 0).map(|d| d.naive_utc())
}

/// Smallest positive gap between consecutive x coordinates, 1 day when there is none.
pub fn min_spacing_days(xs: &[f64]) -> f64 {
    xs.windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.min(d))))
        .unwrap_or(1.0)
}

/// Width for a vertical axis label area (in pixels), based on the formatted tick labels
/// that will appear there.
///
/// `fmt` must be the same formatter given to the mesh. The result is clamped to 48..140.
pub fn compute_label_area_px(
    domain: AxisDomain,
    ticks: usize,
    font_px: u32,
    fmt: impl Fn(f64) -> String,
) -> u32 {
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let s = fmt(domain.min + domain.span() * t);
        max_px = max_px.max(estimate_text_width_px(&s, font_px));
    }
    // tick marks plus a little air
    max_px.saturating_add(18).clamp(48, 140)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_colors() {
        assert_eq!(parse_hex_color("#8884d8"), Some(RGBColor(0x88, 0x84, 0xd8)));
        assert_eq!(parse_hex_color("#fff"), Some(RGBColor(255, 255, 255)));
        assert_eq!(parse_hex_color("8884d8"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn day_coord_round_trips() {
        let ts = crate::normalize::parse_date("2024-03-05").unwrap();
        let x = to_day_coord(&ts);
        assert_eq!(from_day_coord(x), Some(ts));
    }

    #[test]
    fn spacing_ignores_duplicates() {
        assert_eq!(min_spacing_days(&[1.0, 1.0, 3.0, 4.0]), 1.0);
        assert_eq!(min_spacing_days(&[5.0]), 1.0);
    }
}
