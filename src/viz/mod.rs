//! Rendering a [`ChartFrame`] to **SVG**, **PNG**, or an in-memory RGB buffer.
//!
//! - Dual y axes: magnitude ticks on the left, percentage ticks on the right
//! - Stacked bars and lines drawn from the frame's precomputed geometry
//! - External legend panel listing hidden series greyed out

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use types::{DEFAULT_LEGEND_MODE, LegendMode, RenderOptions};

use crate::catalog::{Axis, SeriesKind};
use crate::compose::{ChartFrame, DrawnSeries, Geometry};
use crate::domain::{AxisDomain, AxisScale};
use crate::error::ChartError;
use crate::format::{format_axis_date, format_magnitude, format_percentage};
use anyhow::Result;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use legend::{
    LegendItem, draw_legend_panel, estimate_right_legend_width_px,
    estimate_top_bottom_legend_height_px,
};
use util::{compute_label_area_px, from_day_coord, min_spacing_days, series_color, to_day_coord};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        // from `src/viz/mod.rs` -> project root -> `assets/DejaVuSans.ttf`
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

const MARGIN: i32 = 16;
const TICK_FONT_PX: u32 = 12;
const Y_LABELS: usize = 8;
/// Fraction of the smallest date spacing one bar cluster may occupy.
const BAR_FILL: f64 = 0.8;

fn plot_err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    ChartError::Render(format!("{e:?}")).into()
}

/// Tick label for a y axis of the given scale.
pub fn tick_label(scale: AxisScale, v: f64) -> String {
    match scale {
        AxisScale::Magnitude => format_magnitude(v),
        AxisScale::Percent => format_percentage(v),
    }
}

/// Write `frame` to `out_path`; `.svg` selects the SVG backend, anything else PNG.
pub fn render_frame<P: AsRef<Path>>(
    frame: &ChartFrame,
    out_path: P,
    options: &RenderOptions,
) -> Result<()> {
    if frame.is_empty() {
        return Err(ChartError::EmptyFrame(frame.title.clone()).into());
    }
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let size = (options.width, options.height);
    log::info!(
        "rendering {:?} ({} series) to {}",
        frame.title,
        frame.series.len(),
        out_path.display()
    );

    let is_svg = out_path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_frame(root, frame, options)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_frame(root, frame, options)
    }
}

/// Render into a packed RGB buffer (`width * height * 3` bytes) for on-screen display.
pub fn render_frame_rgb(frame: &ChartFrame, options: &RenderOptions) -> Result<Vec<u8>> {
    if frame.is_empty() {
        return Err(ChartError::EmptyFrame(frame.title.clone()).into());
    }
    let mut buf = vec![0u8; options.width as usize * options.height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (options.width, options.height))
            .into_drawing_area();
        draw_frame(root, frame, options)?;
    }
    Ok(buf)
}

/// Horizontal slot of each bar series: series sharing a stack group share a slot,
/// ungrouped bars each get their own. Returns (slot index, slot count) per drawn series.
fn bar_slots(series: &[DrawnSeries]) -> (Vec<Option<usize>>, usize) {
    let mut names: Vec<(Axis, &str)> = Vec::new();
    let mut slots = Vec::with_capacity(series.len());
    for s in series {
        if !matches!(s.geometry, Geometry::Bars(_)) {
            slots.push(None);
            continue;
        }
        let name = (s.axis, s.stack_group.as_deref().unwrap_or(s.key.as_str()));
        let idx = match names.iter().position(|n| *n == name) {
            Some(i) => i,
            None => {
                names.push(name);
                names.len() - 1
            }
        };
        slots.push(Some(idx));
    }
    (slots, names.len().max(1))
}

fn draw_frame<DB>(
    root: DrawingArea<DB, Shift>,
    frame: &ChartFrame,
    options: &RenderOptions,
) -> Result<()>
where
    DB: DrawingBackend,
{
    ensure_fonts_registered();

    // x coordinates and bar width
    let xs: Vec<f64> = frame.records.iter().map(|r| to_day_coord(&r.timestamp)).collect();
    let (Some(&first_x), Some(&last_x)) = (xs.first(), xs.last()) else {
        return Err(ChartError::EmptyFrame(frame.title.clone()).into());
    };
    let cluster_w = min_spacing_days(&xs) * BAR_FILL;
    let (x_min, x_max) = (first_x - cluster_w, last_x + cluster_w);

    let left_scale = AxisScale::for_axis(Axis::Left);
    let right_scale = AxisScale::for_axis(Axis::Right);
    let left_fmt = |v: &f64| tick_label(left_scale, *v);
    let right_fmt = |v: &f64| tick_label(right_scale, *v);
    let x_fmt = |x: &f64| from_day_coord(*x).map(|ts| format_axis_date(&ts)).unwrap_or_default();

    // gutters
    let left_label_px = compute_label_area_px(frame.left, Y_LABELS, TICK_FONT_PX, |v| {
        tick_label(left_scale, v)
    });
    let right_label_px = compute_label_area_px(frame.right, Y_LABELS, TICK_FONT_PX, |v| {
        tick_label(right_scale, v)
    });
    let axis_x_start_px = MARGIN + left_label_px as i32;

    let legend_items: Vec<LegendItem> = frame
        .legend
        .iter()
        .enumerate()
        .map(|(i, e)| LegendItem {
            label: match &e.latest {
                Some(v) => format!("{} ({v})", e.display_name),
                None => e.display_name.clone(),
            },
            color: series_color(&e.color, i),
            active: e.active,
        })
        .collect();
    let legend_labels: Vec<String> = legend_items.iter().map(|i| i.label.clone()).collect();

    let (root_w, root_h) = root.dim_in_pixel();
    let (root_w, root_h) = (root_w as i32, root_h as i32);
    root.fill(&WHITE).map_err(plot_err)?;

    let (plot_area, legend_area) = match options.legend {
        LegendMode::Right => {
            let w = estimate_right_legend_width_px(&legend_labels, root_w / 3);
            root.split_horizontally((root_w - w).max(40))
        }
        LegendMode::Top => {
            let h = estimate_top_bottom_legend_height_px(&legend_labels, axis_x_start_px, root_w)
                .max(40);
            let (legend, plot) = root.split_vertically(h);
            (plot, legend)
        }
        LegendMode::Bottom => {
            let h = estimate_top_bottom_legend_height_px(&legend_labels, axis_x_start_px, root_w)
                .max(40);
            root.split_vertically((root_h - h).max(40))
        }
    };

    let AxisDomain { min: l_min, max: l_max } = frame.left;
    let AxisDomain { min: r_min, max: r_max } = frame.right;

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN as u32)
        .caption(frame.title.as_str(), (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_label_px)
        .set_label_area_size(LabelAreaPosition::Right, right_label_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_min..x_max, l_min..l_max)
        .map_err(plot_err)?
        .set_secondary_coord(x_min..x_max, r_min..r_max);

    chart
        .configure_mesh()
        .y_desc(frame.axis_titles.left.as_str())
        .x_labels(xs.len().clamp(2, 10))
        .y_labels(Y_LABELS)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&left_fmt)
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(plot_err)?;

    chart
        .configure_secondary_axes()
        .y_desc(frame.axis_titles.right.as_str())
        .y_labels(Y_LABELS)
        .y_label_formatter(&right_fmt)
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(plot_err)?;

    let (slots, n_slots) = bar_slots(&frame.series);
    let slot_w = cluster_w / n_slots as f64;

    // bars first so lines stay on top
    for kind in [SeriesKind::Bar, SeriesKind::Line] {
        for (idx, s) in frame.series.iter().enumerate() {
            let palette_idx = frame.legend.iter().position(|e| e.key == s.key).unwrap_or(idx);
            let color = series_color(&s.color, palette_idx);
            match (&s.geometry, kind) {
                (Geometry::Bars(segments), SeriesKind::Bar) => {
                    let slot = slots[idx].unwrap_or(0) as f64;
                    let left_edge = -cluster_w / 2.0 + slot * slot_w;
                    let rects: Vec<Rectangle<(f64, f64)>> = segments
                        .iter()
                        .map(|seg| {
                            let x = to_day_coord(&seg.x) + left_edge;
                            Rectangle::new([(x, seg.y0), (x + slot_w, seg.y1)], color.filled())
                        })
                        .collect();
                    match s.axis {
                        Axis::Left => chart.draw_series(rects),
                        Axis::Right => chart.draw_secondary_series(rects),
                    }
                    .map_err(plot_err)?;
                }
                (Geometry::Line(points), SeriesKind::Line) => {
                    let style = ShapeStyle {
                        color: color.to_rgba(),
                        filled: false,
                        stroke_width: 3,
                    };
                    let pts: Vec<(f64, f64)> =
                        points.iter().map(|(ts, v)| (to_day_coord(ts), *v)).collect();
                    match s.axis {
                        Axis::Left => chart.draw_series(LineSeries::new(pts, style)),
                        Axis::Right => chart.draw_secondary_series(LineSeries::new(pts, style)),
                    }
                    .map_err(plot_err)?;
                }
                _ => {}
            }
        }
    }

    draw_legend_panel(&legend_area, &legend_items, options.legend, axis_x_start_px)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_follow_axis_scale() {
        assert_eq!(tick_label(AxisScale::Magnitude, 2_400_000.0), "2M");
        assert_eq!(tick_label(AxisScale::Percent, 12.34), "12.3%");
    }
}
