//! Axis domain calculator.
//!
//! Domains are derived from the normalized records and the current visibility on every call.
//! Hidden series never contribute; an axis with nothing visible gets `[0, 1]`.
//!
//! Padding policy (one policy for every axis):
//! - lower bound moves 10% away from the data (`min * 0.9` for a non-negative minimum,
//!   `min * 1.1` for a negative one), upper bound likewise (`max * 1.1` / `max * 0.9`);
//! - magnitude axes then floor/ceil to whole units, percentage axes keep fractions.

use crate::catalog::{Axis, ResolvedSeries, SeriesKind};
use crate::models::NormalizedRecord;
use crate::visibility::VisibilityMap;
use serde::Serialize;

const PAD_IN: f64 = 0.9;
const PAD_OUT: f64 = 1.1;

/// Absolute tolerance (relative to magnitude) under which a padded bound is treated as an
/// exact integer before floor/ceil. `200 * 1.1` is `220.00000000000003` in binary.
const INTEGER_SNAP: f64 = 1e-9;

/// Numeric range of one Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisDomain {
    pub min: f64,
    pub max: f64,
}

impl AxisDomain {
    /// Used whenever an axis has no visible series.
    pub const FALLBACK: AxisDomain = AxisDomain { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// How padded bounds are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AxisScale {
    /// Currency / counts: floor/ceil to integers.
    Magnitude,
    /// Percentage points: keep fractional precision.
    Percent,
}

impl AxisScale {
    pub fn for_axis(axis: Axis) -> Self {
        match axis {
            Axis::Left => AxisScale::Magnitude,
            Axis::Right => AxisScale::Percent,
        }
    }
}

/// A group of series whose extent is computed together before merging into an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFamily {
    /// Field keys in encounter (stacking) order.
    pub keys: Vec<String>,
    /// Values are summed per record in key order; the running totals count toward the extent.
    pub stacked: bool,
}

/// Raw `(min, max)` over every visible key and every record, skipping non-finite values.
pub fn raw_extent(
    records: &[NormalizedRecord],
    keys: &[&str],
    visibility: &VisibilityMap,
) -> Option<(f64, f64)> {
    let visible: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|k| visibility.is_visible(k))
        .collect();
    if visible.is_empty() {
        return None;
    }
    fold_extent(
        records
            .iter()
            .flat_map(|r| visible.iter().filter_map(move |k| r.value(k))),
    )
}

/// Extent of a stacked family: individual values plus running totals in key order.
fn stacked_extent(
    records: &[NormalizedRecord],
    keys: &[&str],
    visibility: &VisibilityMap,
) -> Option<(f64, f64)> {
    let visible: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|k| visibility.is_visible(k))
        .collect();
    if visible.is_empty() {
        return None;
    }
    let mut points: Vec<f64> = Vec::new();
    for r in records {
        let mut running = 0.0;
        for k in &visible {
            if let Some(v) = r.value(k).filter(|v| v.is_finite()) {
                points.push(v);
                running += v;
                points.push(running);
            }
        }
    }
    fold_extent(points.into_iter())
}

fn fold_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn snap(x: f64) -> f64 {
    let r = x.round();
    if (x - r).abs() <= INTEGER_SNAP * x.abs().max(1.0) {
        r
    } else {
        x
    }
}

/// Apply the padding policy to a raw extent.
pub fn pad(raw_min: f64, raw_max: f64, scale: AxisScale) -> AxisDomain {
    let lower = if raw_min >= 0.0 { raw_min * PAD_IN } else { raw_min * PAD_OUT };
    let upper = if raw_max >= 0.0 { raw_max * PAD_OUT } else { raw_max * PAD_IN };
    let (mut lower, mut upper) = match scale {
        AxisScale::Magnitude => (snap(lower).floor(), snap(upper).ceil()),
        AxisScale::Percent => (lower, upper),
    };
    if upper <= lower {
        // flat data (all zeros) would give an empty range
        lower -= 1.0;
        upper += 1.0;
    }
    AxisDomain::new(lower, upper)
}

/// Domain of one set of independent series keys: `[0, 1]` when none is visible.
pub fn domain(
    records: &[NormalizedRecord],
    keys: &[&str],
    visibility: &VisibilityMap,
    scale: AxisScale,
) -> AxisDomain {
    match raw_extent(records, keys, visibility) {
        Some((lo, hi)) => pad(lo, hi, scale),
        None => AxisDomain::FALLBACK,
    }
}

/// Padded domain of one family, or `None` when the family has nothing visible.
pub fn family_domain(
    records: &[NormalizedRecord],
    family: &SeriesFamily,
    visibility: &VisibilityMap,
    scale: AxisScale,
) -> Option<AxisDomain> {
    let keys: Vec<&str> = family.keys.iter().map(String::as_str).collect();
    let extent = if family.stacked {
        stacked_extent(records, &keys, visibility)
    } else {
        raw_extent(records, &keys, visibility)
    };
    extent.map(|(lo, hi)| pad(lo, hi, scale))
}

/// Elementwise min of lower bounds and max of upper bounds.
pub fn merge<I>(domains: I) -> Option<AxisDomain>
where
    I: IntoIterator<Item = AxisDomain>,
{
    domains.into_iter().reduce(|a, b| AxisDomain {
        min: a.min.min(b.min),
        max: a.max.max(b.max),
    })
}

/// Domain of an axis shared by several families; `[0, 1]` if no family has a visible series.
pub fn axis_domain(
    records: &[NormalizedRecord],
    families: &[SeriesFamily],
    visibility: &VisibilityMap,
    scale: AxisScale,
) -> AxisDomain {
    merge(
        families
            .iter()
            .filter_map(|f| family_domain(records, f, visibility, scale)),
    )
    .unwrap_or(AxisDomain::FALLBACK)
}

/// Group the series on `axis` into families: one per stack group (keys in catalog order),
/// one per unstacked series.
pub fn families_for_axis(series: &[ResolvedSeries], axis: Axis) -> Vec<SeriesFamily> {
    let mut out: Vec<SeriesFamily> = Vec::new();
    let mut stack_index: Vec<(String, usize)> = Vec::new();
    for s in series.iter().filter(|s| s.def.axis == axis) {
        match (&s.def.stack_group, s.def.kind) {
            (Some(group), SeriesKind::Bar) => {
                if let Some((_, idx)) = stack_index.iter().find(|(g, _)| g == group) {
                    out[*idx].keys.push(s.field.clone());
                } else {
                    stack_index.push((group.clone(), out.len()));
                    out.push(SeriesFamily {
                        keys: vec![s.field.clone()],
                        stacked: true,
                    });
                }
            }
            _ => out.push(SeriesFamily {
                keys: vec![s.field.clone()],
                stacked: false,
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_widens_negative_extremes() {
        let d = pad(-100.0, -10.0, AxisScale::Magnitude);
        assert_eq!(d, AxisDomain::new(-110.0, -9.0));
        assert!(d.contains(-100.0) && d.contains(-10.0));
    }

    #[test]
    fn percent_padding_keeps_fractions() {
        let d = pad(0.5, 2.5, AxisScale::Percent);
        assert!((d.min - 0.45).abs() < 1e-12);
        assert!((d.max - 2.75).abs() < 1e-12);
    }

    #[test]
    fn flat_zero_series_gets_a_usable_range() {
        assert_eq!(pad(0.0, 0.0, AxisScale::Magnitude), AxisDomain::new(-1.0, 1.0));
    }

    #[test]
    fn merge_of_nothing_is_none() {
        assert_eq!(merge(Vec::<AxisDomain>::new()), None);
    }
}
