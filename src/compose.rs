//! Composer: turns normalized records + active series + visibility into a [`ChartFrame`],
//! the complete per-render description a renderer or host UI draws from.
//!
//! A frame is pure output. Nothing here caches; every call recomputes projection, domains,
//! geometry, and legend from the current inputs.

use crate::catalog::{Axis, AxisTitles, ResolvedSeries, SeriesCatalog, SeriesKind, Unit};
use crate::domain::{AxisDomain, AxisScale, axis_domain, families_for_axis};
use crate::error::ChartResult;
use crate::format::{FormatPurpose, format_tooltip_date, format_value, format_value_locale};
use crate::models::{ChartInput, NormalizedRecord, Record};
use crate::normalize::normalize;
use crate::visibility::VisibilityMap;
use chrono::NaiveDateTime;
use num_format::Locale;
use serde::Serialize;
use std::collections::BTreeMap;

/// One record restricted to the visible series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRecord {
    pub date: String,
    pub timestamp: NaiveDateTime,
    pub values: BTreeMap<String, f64>,
}

/// One stacked bar piece at one x position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarSegment {
    pub x: NaiveDateTime,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Geometry {
    Bars(Vec<BarSegment>),
    Line(Vec<(NaiveDateTime, f64)>),
}

/// A visible series with its resolved geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnSeries {
    pub key: String,
    pub display_name: String,
    pub color: String,
    pub axis: Axis,
    pub unit: Unit,
    pub stack_group: Option<String>,
    pub geometry: Geometry,
}

/// Legend model entry. Clicking it toggles `key`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub key: String,
    pub display_name: String,
    pub color: String,
    pub active: bool,
    /// Latest finite value, legend-formatted.
    pub latest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipRow {
    pub name: String,
    pub value: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub label: String,
    pub rows: Vec<TooltipRow>,
}

/// Everything needed to draw one chart at the current visibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub title: String,
    pub axis_titles: AxisTitles,
    pub records: Vec<ProjectedRecord>,
    pub left: AxisDomain,
    pub right: AxisDomain,
    pub series: Vec<DrawnSeries>,
    pub legend: Vec<LegendEntry>,
}

impl ChartFrame {
    pub fn domain(&self, axis: Axis) -> AxisDomain {
        match axis {
            Axis::Left => self.left,
            Axis::Right => self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Visible projection: date plus only the visible series fields.
pub fn project(
    records: &[NormalizedRecord],
    series: &[ResolvedSeries],
    visibility: &VisibilityMap,
) -> Vec<ProjectedRecord> {
    let visible: Vec<&str> = series
        .iter()
        .map(|s| s.field.as_str())
        .filter(|k| visibility.is_visible(k))
        .collect();
    records
        .iter()
        .map(|r| ProjectedRecord {
            date: r.date.clone(),
            timestamp: r.timestamp,
            values: visible
                .iter()
                .filter_map(|k| r.value(k).map(|v| (k.to_string(), v)))
                .collect(),
        })
        .collect()
}

/// Geometry for every visible series, in catalog order.
///
/// Bars sharing an axis and a stack group are stacked per record in encounter order; a bar with no stack
/// group rises from zero. Lines are independent of any stack.
pub fn build_geometry(
    records: &[ProjectedRecord],
    series: &[ResolvedSeries],
    visibility: &VisibilityMap,
) -> Vec<DrawnSeries> {
    // running stack top per (axis, group), one slot per record; stacks never cross axes
    let mut stack_tops: BTreeMap<(Axis, &str), Vec<f64>> = BTreeMap::new();
    let mut out = Vec::new();

    for s in series.iter().filter(|s| visibility.is_visible(&s.field)) {
        let geometry = match s.def.kind {
            SeriesKind::Bar => {
                let mut segments = Vec::with_capacity(records.len());
                let mut tops = s
                    .def
                    .stack_group
                    .as_deref()
                    .map(|g| {
                        stack_tops
                            .entry((s.def.axis, g))
                            .or_insert_with(|| vec![0.0; records.len()])
                    });
                for (i, r) in records.iter().enumerate() {
                    let Some(v) = r.values.get(&s.field).copied().filter(|v| v.is_finite()) else {
                        continue;
                    };
                    let base = match tops.as_deref() {
                        Some(t) => t[i],
                        None => 0.0,
                    };
                    if let Some(t) = tops.as_deref_mut() {
                        t[i] = base + v;
                    }
                    segments.push(BarSegment {
                        x: r.timestamp,
                        y0: base,
                        y1: base + v,
                    });
                }
                Geometry::Bars(segments)
            }
            SeriesKind::Line => Geometry::Line(
                records
                    .iter()
                    .filter_map(|r| {
                        r.values
                            .get(&s.field)
                            .copied()
                            .filter(|v| v.is_finite())
                            .map(|v| (r.timestamp, v))
                    })
                    .collect(),
            ),
        };
        out.push(DrawnSeries {
            key: s.field.clone(),
            display_name: s.def.display_name.clone(),
            color: s.def.color.clone(),
            axis: s.def.axis,
            unit: s.def.unit,
            stack_group: s.def.stack_group.clone(),
            geometry,
        });
    }
    out
}

/// Legend entries for every active series, visible or not.
pub fn legend_model(
    records: &[NormalizedRecord],
    series: &[ResolvedSeries],
    visibility: &VisibilityMap,
) -> Vec<LegendEntry> {
    series
        .iter()
        .map(|s| {
            let latest = records
                .iter()
                .rev()
                .find_map(|r| r.value(&s.field).filter(|v| v.is_finite()))
                .map(|v| format_value(s.def.unit, FormatPurpose::Legend, v));
            LegendEntry {
                key: s.field.clone(),
                display_name: s.def.display_name.clone(),
                color: s.def.color.clone(),
                active: visibility.is_visible(&s.field),
                latest,
            }
        })
        .collect()
}

/// Compose one frame.
pub fn compose(
    title: &str,
    records: &[NormalizedRecord],
    series: &[ResolvedSeries],
    visibility: &VisibilityMap,
    axis_titles: &AxisTitles,
) -> ChartFrame {
    let projected = project(records, series, visibility);
    let left = axis_domain(
        records,
        &families_for_axis(series, Axis::Left),
        visibility,
        AxisScale::for_axis(Axis::Left),
    );
    let right = axis_domain(
        records,
        &families_for_axis(series, Axis::Right),
        visibility,
        AxisScale::for_axis(Axis::Right),
    );
    let drawn = build_geometry(&projected, series, visibility);
    ChartFrame {
        title: title.to_string(),
        axis_titles: axis_titles.clone(),
        records: projected,
        left,
        right,
        series: drawn,
        legend: legend_model(records, series, visibility),
    }
}

/// One mounted chart: normalized records plus the visibility map it owns.
#[derive(Debug, Clone)]
pub struct ChartInstance {
    label: String,
    catalog: SeriesCatalog,
    records: Vec<NormalizedRecord>,
    visibility: VisibilityMap,
}

impl ChartInstance {
    /// Normalize `raw` once and start with every series visible.
    pub fn mount(label: &str, raw: &[Record], catalog: SeriesCatalog) -> Self {
        let records = normalize(raw, &catalog.ratio_fields());
        let visibility = VisibilityMap::new(catalog.all_keys());
        log::info!(
            "mounted chart {:?}: {} records, {} series",
            label,
            records.len(),
            catalog.series.len()
        );
        Self {
            label: label.to_string(),
            catalog,
            records,
            visibility,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn catalog(&self) -> &SeriesCatalog {
        &self.catalog
    }

    pub fn visibility(&self) -> &VisibilityMap {
        &self.visibility
    }

    /// Replace the map, e.g. with the result of [`VisibilityMap::toggle`].
    pub fn set_visibility(&mut self, visibility: VisibilityMap) {
        self.visibility = visibility;
    }

    pub fn title(&self, adjusted: bool) -> String {
        if adjusted {
            format!("{} (WETH Price Adjusted)", self.label)
        } else {
            self.label.clone()
        }
    }

    pub fn frame(&self, adjusted: bool) -> ChartFrame {
        compose(
            &self.title(adjusted),
            &self.records,
            &self.catalog.resolve(adjusted),
            &self.visibility,
            &self.catalog.axis_titles,
        )
    }

    /// Legend callback: flip one series. Returns its new visibility.
    pub fn on_legend_click(&mut self, key: &str) -> ChartResult<bool> {
        let shown = self.visibility.toggle_in_place(key)?;
        log::debug!("chart {:?}: series {key} now {}", self.label, if shown { "shown" } else { "hidden" });
        Ok(shown)
    }

    /// Tooltip for the record at `index`: date heading plus every visible series value.
    pub fn tooltip(&self, index: usize, adjusted: bool) -> Option<Tooltip> {
        self.tooltip_locale(index, adjusted, &Locale::en)
    }

    pub fn tooltip_locale(
        &self,
        index: usize,
        adjusted: bool,
        locale: &Locale,
    ) -> Option<Tooltip> {
        let record = self.records.get(index)?;
        let rows = self
            .catalog
            .resolve(adjusted)
            .into_iter()
            .filter(|s| self.visibility.is_visible(&s.field))
            .filter_map(|s| {
                record.value(&s.field).map(|v| TooltipRow {
                    name: s.def.display_name.clone(),
                    value: format_value_locale(s.def.unit, FormatPurpose::Tooltip, v, locale),
                    color: s.def.color.clone(),
                })
            })
            .collect();
        Some(Tooltip {
            label: format_tooltip_date(&record.timestamp),
            rows,
        })
    }

    /// Index of the record closest in time to `ts`.
    pub fn nearest_index(&self, ts: NaiveDateTime) -> Option<usize> {
        self.records
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| (r.timestamp - ts).num_seconds().abs())
            .map(|(i, _)| i)
    }
}

/// One independent chart per group label.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    charts: Vec<ChartInstance>,
}

impl Dashboard {
    pub fn mount(input: &ChartInput, catalog: &SeriesCatalog) -> Self {
        Self {
            charts: input
                .iter()
                .map(|(label, records)| ChartInstance::mount(label, records, catalog.clone()))
                .collect(),
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.charts.iter().map(|c| c.label()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&ChartInstance> {
        self.charts.iter().find(|c| c.label() == label)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut ChartInstance> {
        self.charts.iter_mut().find(|c| c.label() == label)
    }

    pub fn charts(&self) -> &[ChartInstance] {
        &self.charts
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
