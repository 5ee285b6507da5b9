use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use poolcharts::compose::{ChartInstance, LegendEntry, Tooltip};
use poolcharts::domain::AxisDomain;
use poolcharts::format::map_locale;
use poolcharts::viz::{self, LegendMode, RenderOptions};
use poolcharts::{Dashboard, SeriesCatalog, input};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "poolcharts",
    version,
    about = "Render & inspect liquidity-pool incentive charts"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one chart per group to SVG or PNG.
    Render(RenderArgs),
    /// Print domains, legend, and the latest tooltip per group.
    Inspect(InspectArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LegendArg {
    Bottom,
    Right,
    Top,
}

impl From<LegendArg> for LegendMode {
    fn from(v: LegendArg) -> Self {
        match v {
            LegendArg::Bottom => LegendMode::Bottom,
            LegendArg::Right => LegendMode::Right,
            LegendArg::Top => LegendMode::Top,
        }
    }
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Input file: JSON `{group: [records]}` or CSV with `group` and `date` columns.
    #[arg(short, long)]
    input: PathBuf,
    /// Only this group (e.g., USDC). Default: every group in the file.
    #[arg(short, long)]
    group: Option<String>,
    /// Use the WETH-price-adjusted variant of each series.
    #[arg(long, default_value_t = false)]
    adjusted: bool,
    /// Field key to hide before drawing (repeatable), as if clicked in the legend.
    #[arg(long = "hide", value_name = "KEY")]
    hide: Vec<String>,
    /// Series catalog: `aggregate`, `combo`, or a path to a JSON catalog.
    #[arg(long, default_value = "aggregate")]
    catalog: String,
    /// Locale for tooltip numbers (en, de, fr, ...).
    #[arg(long, default_value = "en")]
    locale: String,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    chart: ChartArgs,
    /// Output path (.svg or .png). With several groups, the group label is appended to the stem.
    #[arg(short, long)]
    out: PathBuf,
    /// Legend placement.
    #[arg(long, value_enum, default_value_t = LegendArg::Bottom)]
    legend: LegendArg,
    /// Width of the chart (default 1200).
    #[arg(long, default_value_t = 1200)]
    width: u32,
    /// Height of the chart (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    chart: ChartArgs,
    /// Print JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct GroupSummary<'a> {
    group: &'a str,
    title: String,
    records: usize,
    left: AxisDomain,
    right: AxisDomain,
    legend: Vec<LegendEntry>,
    latest: Option<Tooltip>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

/// Load, validate, mount, and apply `--hide` toggles. Returns the selected charts.
fn mount(args: &ChartArgs) -> Result<Vec<ChartInstance>> {
    let catalog = SeriesCatalog::from_name_or_path(&args.catalog)?;
    let data = input::load(&args.input)?;
    input::check_schema(&data).with_context(|| format!("validate {}", args.input.display()))?;

    let fields: Vec<String> = catalog
        .resolve(args.adjusted)
        .into_iter()
        .map(|s| s.field)
        .collect();
    for (group, records) in &data {
        let missing = input::missing_fields(records, fields.iter().map(String::as_str));
        if !missing.is_empty() {
            log::warn!("group {group}: no data for {}", missing.join(", "));
        }
    }

    let dashboard = Dashboard::mount(&data, &catalog);
    let mut charts: Vec<ChartInstance> = match &args.group {
        Some(g) => vec![
            dashboard
                .get(g)
                .cloned()
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "group {g:?} not in input (have: {})",
                        dashboard.labels().join(", ")
                    )
                })?,
        ],
        None => dashboard.charts().to_vec(),
    };
    for chart in &mut charts {
        for key in &args.hide {
            chart.on_legend_click(key)?;
        }
    }
    Ok(charts)
}

fn file_safe(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn out_path_for(base: &Path, label: &str, many: bool) -> PathBuf {
    if !many {
        return base.to_path_buf();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("chart");
    let name = match base.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-{}.{ext}", file_safe(label)),
        None => format!("{stem}-{}", file_safe(label)),
    };
    base.with_file_name(name)
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let charts = mount(&args.chart)?;
    let options = RenderOptions {
        width: args.width,
        height: args.height,
        legend: args.legend.into(),
    };
    let many = charts.len() > 1;
    for chart in &charts {
        let path = out_path_for(&args.out, chart.label(), many);
        viz::render_frame(&chart.frame(args.chart.adjusted), &path, &options)
            .with_context(|| format!("render group {}", chart.label()))?;
        eprintln!("Wrote chart to {}", path.display());
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let charts = mount(&args.chart)?;
    let locale = map_locale(&args.chart.locale);
    let adjusted = args.chart.adjusted;

    let summaries: Vec<GroupSummary> = charts
        .iter()
        .map(|chart| {
            let frame = chart.frame(adjusted);
            let latest = chart
                .records()
                .len()
                .checked_sub(1)
                .and_then(|i| chart.tooltip_locale(i, adjusted, locale));
            GroupSummary {
                group: chart.label(),
                title: frame.title,
                records: frame.records.len(),
                left: frame.left,
                right: frame.right,
                legend: frame.legend,
                latest,
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    for s in &summaries {
        println!("{}  records={}", s.title, s.records);
        println!("  left  [{}, {}]", s.left.min, s.left.max);
        println!("  right [{}, {}]", s.right.min, s.right.max);
        for e in &s.legend {
            println!(
                "  {} {:<40} {:<48} {}",
                if e.active { "[x]" } else { "[ ]" },
                e.display_name,
                e.key,
                e.latest.as_deref().unwrap_or("NA")
            );
        }
        if let Some(t) = &s.latest {
            println!("  {}", t.label);
            for row in &t.rows {
                println!("    {}: {}", row.name, row.value);
            }
        }
    }
    Ok(())
}
