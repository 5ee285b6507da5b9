//! Series catalog: which record field each chart series reads and how it is drawn.
//!
//! A catalog is declarative data. The only logic here is the adjusted-mode resolution step,
//! which swaps in the `adjusted_*` field name for definitions that have one while keeping
//! axis, kind, name, and color untouched.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Which of the two Y axes a series is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Left,
    Right,
}

/// Drawing primitive for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// Additive bar; bars sharing a stack group are summed vertically.
    Bar,
    Line,
}

/// Semantic unit tag; the only input formatters use to pick a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Currency,
    Percent,
    Raw,
}

/// Immutable descriptor of one chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDefinition {
    pub key: String,
    /// Field read instead of `key` while adjusted mode is on.
    #[serde(default)]
    pub adjusted_key: Option<String>,
    pub axis: Axis,
    pub kind: SeriesKind,
    #[serde(default)]
    pub stack_group: Option<String>,
    pub display_name: String,
    /// `#RRGGBB`
    pub color: String,
    pub unit: Unit,
    /// Field holds a fraction of one that the normalizer rescales to percentage points.
    /// The built-in catalogs leave ROI unscaled; a JSON catalog can set `"ratio": true` on it.
    #[serde(default)]
    pub ratio: bool,
}

impl SeriesDefinition {
    fn bar(key: &str, adjusted_key: Option<&str>, name: &str, color: &str, unit: Unit) -> Self {
        Self {
            key: key.to_string(),
            adjusted_key: adjusted_key.map(str::to_string),
            axis: Axis::Left,
            kind: SeriesKind::Bar,
            stack_group: Some("a".to_string()),
            display_name: name.to_string(),
            color: color.to_string(),
            unit,
            ratio: false,
        }
    }

    fn line(key: &str, adjusted_key: Option<&str>, name: &str, color: &str) -> Self {
        Self {
            key: key.to_string(),
            adjusted_key: adjusted_key.map(str::to_string),
            axis: Axis::Right,
            kind: SeriesKind::Line,
            stack_group: None,
            display_name: name.to_string(),
            color: color.to_string(),
            unit: Unit::Percent,
            ratio: true,
        }
    }

    /// Every field name this definition may read, base first.
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.adjusted_key.as_deref())
    }
}

/// Pick the field a definition reads under the given adjusted flag.
pub fn resolve_field_key(def: &SeriesDefinition, adjusted: bool) -> &str {
    match (&def.adjusted_key, adjusted) {
        (Some(k), true) => k.as_str(),
        _ => def.key.as_str(),
    }
}

/// A definition bound to the field key it reads for the current mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub field: String,
    pub def: SeriesDefinition,
}

/// Axis titles shown next to each Y axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTitles {
    pub left: String,
    pub right: String,
}

impl Default for AxisTitles {
    fn default() -> Self {
        Self {
            left: "TVL + Incentives ($)".to_string(),
            right: "TVL + WETH Change (%)".to_string(),
        }
    }
}

/// Ordered list of series definitions for one chart layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesCatalog {
    pub series: Vec<SeriesDefinition>,
    #[serde(default)]
    pub axis_titles: AxisTitles,
}

impl SeriesCatalog {
    /// Full dashboard: stacked TVL / change / incentives / ROI bars on the left axis and the two
    /// percentage-change lines on the right, with WETH-adjusted variants.
    pub fn aggregate() -> Self {
        Self {
            series: vec![
                SeriesDefinition::bar(
                    "token_usd_amount",
                    Some("adjusted_token_usd_amount"),
                    "Pool TVL",
                    "#e8dab2",
                    Unit::Currency,
                ),
                SeriesDefinition::bar(
                    "raw_change_in_usd",
                    Some("adjusted_raw_change_in_usd"),
                    "Pool Change Since Start",
                    "#82ca9d",
                    Unit::Currency,
                ),
                SeriesDefinition::bar(
                    "incentives_per_day_usd",
                    None,
                    "OP Incentives per Day",
                    "#e24343",
                    Unit::Currency,
                ),
                SeriesDefinition::bar(
                    "tvl_to_incentive_roi_percentage",
                    Some("adjusted_tvl_to_incentive_roi_percentage"),
                    "TVL Change per USD Incentivized",
                    "#4CAF50",
                    Unit::Currency,
                ),
                SeriesDefinition::line(
                    "percentage_change_in_usd",
                    Some("adjusted_percentage_change_in_usd"),
                    "TVL Change Since Start",
                    "#F7931A",
                ),
                SeriesDefinition::line(
                    "weth_change_in_price_percentage",
                    None,
                    "WETH Price Change Since Start",
                    "#945bd6",
                ),
            ],
            axis_titles: AxisTitles::default(),
        }
    }

    /// Compact layout: three stacked USD bars and the WETH price-change line.
    pub fn combo() -> Self {
        Self {
            series: vec![
                SeriesDefinition::bar("token_usd_amount", None, "Pool TVL", "#8884d8", Unit::Currency),
                SeriesDefinition::bar(
                    "raw_change_in_usd",
                    None,
                    "Pool Change in USD",
                    "#82ca9d",
                    Unit::Currency,
                ),
                SeriesDefinition::bar(
                    "incentives_per_day_usd",
                    None,
                    "Incentives per Day USD",
                    "#ffc658",
                    Unit::Currency,
                ),
                SeriesDefinition::line(
                    "weth_change_in_price_percentage",
                    None,
                    "WETH Price Change %",
                    "#ff7300",
                ),
            ],
            axis_titles: AxisTitles {
                left: "USD (Millions)".to_string(),
                right: "WETH Price Change (%)".to_string(),
            },
        }
    }

    /// Resolve a built-in name (`aggregate`, `combo`) or load a JSON catalog file.
    pub fn from_name_or_path(name_or_path: &str) -> Result<Self> {
        match name_or_path.to_ascii_lowercase().as_str() {
            "aggregate" => Ok(Self::aggregate()),
            "combo" => Ok(Self::combo()),
            _ => Self::from_json_file(name_or_path),
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse catalog {}", path.display()))
    }

    /// Active series for the given mode, in catalog order.
    pub fn resolve(&self, adjusted: bool) -> Vec<ResolvedSeries> {
        self.series
            .iter()
            .map(|def| ResolvedSeries {
                field: resolve_field_key(def, adjusted).to_string(),
                def: def.clone(),
            })
            .collect()
    }

    /// Every key a legend toggle can name, across both modes.
    pub fn all_keys(&self) -> BTreeSet<String> {
        self.series
            .iter()
            .flat_map(|d| d.field_keys().map(str::to_string))
            .collect()
    }

    /// Fields the normalizer must rescale, base and adjusted variants alike,
    /// so flipping adjusted mode never needs a second normalization pass.
    pub fn ratio_fields(&self) -> BTreeSet<String> {
        self.series
            .iter()
            .filter(|d| d.ratio)
            .flat_map(|d| d.field_keys().map(str::to_string))
            .collect()
    }
}
