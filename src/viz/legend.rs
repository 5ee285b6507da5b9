//! Legend layout and drawing for the external legend panel.
//!
//! Every active series is listed. Hidden series stay in place with a grey swatch and a
//! struck-through label so the reader can see what was toggled off.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, wrap_text_to_width};
use super::types::LegendMode;
use super::util::INACTIVE_GREY;
use crate::error::ChartError;

/// One legend row as drawn.
#[derive(Debug, Clone)]
pub struct LegendItem {
    pub label: String,
    pub color: RGBColor,
    pub active: bool,
}

/// Shared layout constants. The estimator and the painter must agree on these.
struct Layout {
    font_px: u32,
    line_h: i32,
    row_gap: i32,
    pad_band: i32,
    swatch: i32,
    swatch_gap: i32,
    trailing_gap: i32,
}

const LAYOUT: Layout = Layout {
    font_px: 14,
    line_h: 16,
    row_gap: 4,
    pad_band: 8,
    swatch: 10,
    swatch_gap: 8,
    trailing_gap: 16,
};

impl Layout {
    fn chrome(&self) -> i32 {
        self.swatch + self.swatch_gap + self.trailing_gap
    }

    /// Text cap for one Top/Bottom item: at most 35% of the band, never under 140 px.
    fn item_cap(&self, start_x: i32, band_w: i32) -> i32 {
        (((band_w - start_x) as f32) * 0.35).max(140.0) as i32
    }

    fn block(&self, label: &str, cap: i32) -> (i32, Vec<String>) {
        let lines = wrap_text_to_width(label, self.font_px, cap.max(40) as u32);
        let w = lines
            .iter()
            .map(|l| estimate_text_width_px(l, self.font_px) as i32)
            .max()
            .unwrap_or(0);
        (self.chrome() + w, lines)
    }

    /// Greedy flow into rows: (x offset, wrapped lines) per item, grouped by row.
    fn flow<'a>(
        &self,
        labels: impl IntoIterator<Item = &'a str>,
        start_x: i32,
        band_w: i32,
    ) -> Vec<Vec<(i32, Vec<String>)>> {
        let cap = self.item_cap(start_x, band_w);
        let mut rows: Vec<Vec<(i32, Vec<String>)>> = Vec::new();
        let mut cur = Vec::new();
        let mut x = start_x;
        for label in labels {
            let (w, lines) = self.block(label, cap.min(band_w - start_x - self.chrome()));
            if x + w > band_w && !cur.is_empty() {
                rows.push(std::mem::take(&mut cur));
                x = start_x;
            }
            cur.push((x, lines));
            x += w;
        }
        if !cur.is_empty() {
            rows.push(cur);
        }
        rows
    }

    fn row_height(&self, row: &[(i32, Vec<String>)]) -> i32 {
        row.iter()
            .map(|(_, lines)| lines.len().max(1) as i32 * self.line_h)
            .max()
            .unwrap_or(self.line_h)
    }
}

/// Height in pixels a Top/Bottom legend band needs for `labels` on a canvas `total_w` wide.
pub fn estimate_top_bottom_legend_height_px(labels: &[String], start_x: i32, total_w: i32) -> i32 {
    let l = &LAYOUT;
    let rows = l.flow(labels.iter().map(String::as_str), start_x, total_w - l.pad_band);
    let body: i32 = rows.iter().map(|r| l.row_height(r)).sum::<i32>()
        + l.row_gap * (rows.len().saturating_sub(1) as i32);
    body + 2 * l.pad_band
}

/// Width in pixels of a Right legend panel for `labels`.
pub fn estimate_right_legend_width_px(labels: &[String], max_w: i32) -> i32 {
    let l = &LAYOUT;
    let widest = labels
        .iter()
        .map(|s| estimate_text_width_px(s, l.font_px) as i32)
        .max()
        .unwrap_or(0);
    (widest + l.chrome() + 2 * l.pad_band).clamp(120, max_w.max(120))
}

fn draw_item<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    item: &LegendItem,
    lines: &[String],
    x: i32,
    y_top: i32,
) -> Result<()> {
    let l = &LAYOUT;
    let err = |e: DrawingAreaErrorKind<DB::ErrorType>| ChartError::Render(format!("{e:?}"));
    let (swatch_color, text_color) = if item.active {
        (item.color, BLACK)
    } else {
        (INACTIVE_GREY, INACTIVE_GREY)
    };
    let style = TextStyle::from((FontFamily::SansSerif, l.font_px))
        .color(&text_color)
        .pos(Pos::new(HPos::Left, VPos::Center));

    let sy = y_top + l.line_h / 2 - l.swatch / 2;
    area.draw(&Rectangle::new(
        [(x, sy), (x + l.swatch, sy + l.swatch)],
        swatch_color.filled(),
    ))
    .map_err(err)?;

    let text_x = x + l.swatch + l.swatch_gap;
    for (i, line) in lines.iter().enumerate() {
        let cy = y_top + i as i32 * l.line_h + l.line_h / 2;
        area.draw(&Text::new(line.as_str(), (text_x, cy), style.clone()))
            .map_err(err)?;
        if !item.active {
            let w = estimate_text_width_px(line, l.font_px) as i32;
            area.draw(&PathElement::new(
                vec![(text_x, cy), (text_x + w, cy)],
                INACTIVE_GREY.stroke_width(1),
            ))
            .map_err(err)?;
        }
    }
    Ok(())
}

/// Draw the legend panel: Right is a single column, Top/Bottom flow left to right in rows
/// starting at the plot's x-axis origin.
pub fn draw_legend_panel<DB: DrawingBackend>(
    legend_area: &DrawingArea<DB, Shift>,
    items: &[LegendItem],
    placement: LegendMode,
    axis_x_start_px: i32,
) -> Result<()> {
    legend_area
        .fill(&WHITE)
        .map_err(|e| ChartError::Render(format!("{e:?}")))?;
    let l = &LAYOUT;
    let (w, _) = legend_area.dim_in_pixel();
    let w = w as i32;

    match placement {
        LegendMode::Right => {
            let x = l.pad_band;
            let cap = w - x - l.chrome();
            let mut y = l.pad_band;
            for item in items {
                let (_, lines) = l.block(&item.label, cap);
                draw_item(legend_area, item, &lines, x, y)?;
                y += lines.len().max(1) as i32 * l.line_h + l.row_gap;
            }
        }
        LegendMode::Top | LegendMode::Bottom => {
            let rows = l.flow(
                items.iter().map(|i| i.label.as_str()),
                axis_x_start_px,
                w - l.pad_band,
            );
            let mut y = l.pad_band;
            let mut it = items.iter();
            for row in &rows {
                for (x, lines) in row {
                    let Some(item) = it.next() else { break };
                    draw_item(legend_area, item, lines, *x, y)?;
                }
                y += l.row_height(row) + l.row_gap;
            }
        }
    }
    Ok(())
}
