//! Public types and constants for the visualization module.

/// Legend placement options. The legend always lives in its own panel so that hidden
/// series stay listed (greyed out) next to the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendMode {
    /// Separate, non-overlapping legend panel on the right side.
    Right,
    /// Separate, non-overlapping legend band at the top.
    Top,
    /// Separate, non-overlapping legend band at the bottom.
    Bottom,
}

/// Horizontal legend below the chart, where a dashboard reader finishes scanning the x axis.
pub const DEFAULT_LEGEND_MODE: LegendMode = LegendMode::Bottom;

/// Canvas and presentation settings for one render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub legend: LegendMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            legend: DEFAULT_LEGEND_MODE,
        }
    }
}
