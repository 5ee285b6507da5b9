//! poolcharts
//!
//! Render-ready chart frames for liquidity-pool incentive dashboards: one dual-axis
//! bar + line chart per token group, with per-series visibility toggled from the legend.
//! Pairs with the `poolcharts` CLI and the `poolcharts-gui` viewer.
//!
//! ### Features
//! - Series catalogs (aggregate and combo dashboards, or a JSON file)
//! - Date normalization with ratio fields rescaled to percentage points
//! - Padded, visibility-aware axis domains with stacked-bar totals
//! - Currency / magnitude / percentage formatters for ticks, tooltips and legends
//! - SVG/PNG output and RGB buffers for on-screen display
//!
//! ### Example
//! ```no_run
//! use poolcharts::{Dashboard, SeriesCatalog};
//! use poolcharts::viz::{RenderOptions, render_frame};
//!
//! let input = poolcharts::input::load("pools.json")?;
//! let mut dashboard = Dashboard::mount(&input, &SeriesCatalog::aggregate());
//! if let Some(chart) = dashboard.get_mut("USDC") {
//!     chart.on_legend_click("raw_change_in_usd")?;
//!     render_frame(&chart.frame(false), "usdc.svg", &RenderOptions::default())?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod catalog;
pub mod compose;
pub mod domain;
pub mod error;
pub mod format;
pub mod input;
pub mod models;
pub mod normalize;
pub mod visibility;
pub mod viz;

pub use catalog::{Axis, SeriesCatalog, SeriesDefinition, SeriesKind, Unit};
pub use compose::{ChartFrame, ChartInstance, Dashboard};
pub use error::{ChartError, ChartResult};
pub use models::{ChartInput, NormalizedRecord, Record};
pub use visibility::VisibilityMap;
