use poolcharts::compose::ChartInstance;
use poolcharts::models::Record;
use poolcharts::viz::{self, LegendMode, RenderOptions};
use poolcharts::{ChartError, SeriesCatalog};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn sample_chart() -> ChartInstance {
    let raw: Vec<Record> = [
        ("2024-01-01", 1_000_000.0, 0.0, 0.0, 0.0),
        ("2024-01-02", 1_200_000.0, 200_000.0, 0.2, 0.05),
        ("2024-01-03", 900_000.0, -100_000.0, -0.1, -0.02),
    ]
    .into_iter()
    .map(|(d, tvl, change, pct, weth)| {
        Record::new(d)
            .with("token_usd_amount", tvl)
            .with("raw_change_in_usd", change)
            .with("incentives_per_day_usd", 5_000.0)
            .with("tvl_to_incentive_roi_percentage", change / 5_000.0)
            .with("percentage_change_in_usd", pct)
            .with("weth_change_in_price_percentage", weth)
    })
    .collect();
    ChartInstance::mount("USDC", &raw, SeriesCatalog::aggregate())
}

fn write_and_check<F: Fn(&PathBuf)>(maker: F, name: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    maker(&path);
    let meta = fs::metadata(&path).expect("file created");
    assert!(meta.len() > 0, "{name} has content");
}

#[test]
fn every_legend_placement_renders_svg() {
    let frame = sample_chart().frame(false);
    for (mode, name) in [
        (LegendMode::Bottom, "bottom.svg"),
        (LegendMode::Right, "right.svg"),
        (LegendMode::Top, "top.svg"),
    ] {
        let options = RenderOptions {
            legend: mode,
            ..RenderOptions::default()
        };
        write_and_check(
            |p| viz::render_frame(&frame, p, &options).expect("render"),
            name,
        );
    }
}

#[test]
fn svg_lists_hidden_series_in_legend() {
    let mut chart = sample_chart();
    chart.on_legend_click("raw_change_in_usd").unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("hidden.svg");
    viz::render_frame(&chart.frame(false), &path, &RenderOptions::default()).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("Pool Change Since Start"));
    assert!(svg.contains("USDC"));
}

#[test]
fn adjusted_frame_renders_png() {
    let chart = sample_chart();
    write_and_check(
        |p| viz::render_frame(&chart.frame(true), p, &RenderOptions::default()).expect("render"),
        "adjusted.png",
    );
}

#[test]
fn rgb_buffer_matches_canvas() {
    let options = RenderOptions {
        width: 640,
        height: 360,
        ..RenderOptions::default()
    };
    let buf = viz::render_frame_rgb(&sample_chart().frame(false), &options).unwrap();
    assert_eq!(buf.len(), 640 * 360 * 3);
    // white background, not an all-black buffer
    assert!(buf.iter().any(|b| *b == 255));
}

#[test]
fn all_hidden_chart_still_renders() {
    let mut chart = sample_chart();
    for key in SeriesCatalog::aggregate().series.iter().map(|s| s.key.clone()) {
        chart.on_legend_click(&key).unwrap();
    }
    write_and_check(
        |p| viz::render_frame(&chart.frame(false), p, &RenderOptions::default()).expect("render"),
        "empty_axes.svg",
    );
}

#[test]
fn empty_frame_is_an_error() {
    let chart = ChartInstance::mount(
        "NONE",
        &[Record::new("not-a-date").with("token_usd_amount", 1.0)],
        SeriesCatalog::aggregate(),
    );
    let dir = tempdir().unwrap();
    let out = dir.path().join("x.svg");
    let err = viz::render_frame(&chart.frame(false), &out, &RenderOptions::default()).unwrap_err();
    assert!(!out.exists());
    assert_eq!(
        err.downcast_ref::<ChartError>(),
        Some(&ChartError::EmptyFrame("NONE".to_string()))
    );
}
