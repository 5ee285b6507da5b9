/*!
 * Desktop viewer for poolcharts
 *
 * - Open a JSON or CSV pool export and pick a token group
 * - Toggle series from the legend, switch WETH-adjusted mode
 * - Inspect per-date tooltips and save the chart as PNG or SVG
 */

use anyhow::Result;
use eframe::egui;
use poolcharts::compose::ChartFrame;
use poolcharts::viz::util::parse_hex_color;
use poolcharts::viz::{self, LegendMode, RenderOptions};
use poolcharts::{Dashboard, SeriesCatalog, input};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

const VIEW_WIDTH: u32 = 1000;
const VIEW_HEIGHT: u32 = 520;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1060.0, 860.0])
            .with_min_inner_size([700.0, 500.0])
            .with_title("Pool Charts"),
        ..Default::default()
    };

    eframe::run_native(
        "Pool Charts",
        options,
        Box::new(|_cc| Ok(Box::new(PoolChartsApp::new()))),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CatalogChoice {
    Aggregate,
    Combo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlotFormat {
    Png,
    Svg,
}

#[derive(Debug)]
enum OperationResult {
    Loaded(Dashboard, String),
    Saved(String),
    Error(String),
}

struct PoolChartsApp {
    input_path: String,
    catalog: CatalogChoice,
    dashboard: Option<Dashboard>,
    group: String,
    adjusted: bool,
    legend_mode: LegendMode,
    record_index: usize,

    output_dir: String,
    plot_format: PlotFormat,

    texture: Option<egui::TextureHandle>,
    needs_redraw: bool,

    is_loading: bool,
    status_message: String,
    error_message: String,
    operation_receiver: Option<mpsc::Receiver<OperationResult>>,
}

impl PoolChartsApp {
    fn new() -> Self {
        let home_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .to_string_lossy()
            .to_string();
        Self {
            input_path: String::new(),
            catalog: CatalogChoice::Aggregate,
            dashboard: None,
            group: String::new(),
            adjusted: false,
            legend_mode: LegendMode::Bottom,
            record_index: 0,
            output_dir: home_dir,
            plot_format: PlotFormat::Png,
            texture: None,
            needs_redraw: false,
            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            operation_receiver: None,
        }
    }

    fn start_load(&mut self) {
        if self.input_path.trim().is_empty() {
            self.error_message = "Please choose an input file".to_string();
            return;
        }
        self.is_loading = true;
        self.error_message.clear();
        self.status_message = "Loading...".to_string();

        let (sender, receiver) = mpsc::channel();
        self.operation_receiver = Some(receiver);
        let path = PathBuf::from(self.input_path.trim());
        let catalog = match self.catalog {
            CatalogChoice::Aggregate => SeriesCatalog::aggregate(),
            CatalogChoice::Combo => SeriesCatalog::combo(),
        };

        thread::spawn(move || {
            let result = match load_dashboard(&path, &catalog) {
                Ok(d) => {
                    let msg = format!("Loaded {} group(s) from {}", d.len(), path.display());
                    OperationResult::Loaded(d, msg)
                }
                Err(err) => OperationResult::Error(format!("Failed to load: {err:#}")),
            };
            let _ = sender.send(result);
        });
    }

    fn start_save(&mut self) {
        let Some(frame) = self.current_frame() else {
            self.error_message = "Nothing to save".to_string();
            return;
        };
        let ext = match self.plot_format {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        };
        let path = Path::new(&self.output_dir).join(format!("{}.{ext}", file_safe(&self.group)));
        let options = self.render_options();

        self.is_loading = true;
        self.error_message.clear();
        let (sender, receiver) = mpsc::channel();
        self.operation_receiver = Some(receiver);
        thread::spawn(move || {
            let result = match viz::render_frame(&frame, &path, &options) {
                Ok(()) => OperationResult::Saved(format!("Saved {}", path.display())),
                Err(err) => OperationResult::Error(format!("Failed to save chart: {err:#}")),
            };
            let _ = sender.send(result);
        });
    }

    fn check_operation_result(&mut self) {
        if let Some(receiver) = &self.operation_receiver
            && let Ok(result) = receiver.try_recv()
        {
            self.is_loading = false;
            self.operation_receiver = None;

            match result {
                OperationResult::Loaded(dashboard, message) => {
                    self.group = dashboard
                        .labels()
                        .first()
                        .map(|s| s.to_string())
                        .unwrap_or_default();
                    self.dashboard = Some(dashboard);
                    self.record_index = usize::MAX;
                    self.needs_redraw = true;
                    self.status_message = message;
                }
                OperationResult::Saved(message) => {
                    self.status_message = message;
                }
                OperationResult::Error(error) => {
                    self.error_message = error;
                    self.status_message.clear();
                }
            }
        }
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: VIEW_WIDTH,
            height: VIEW_HEIGHT,
            legend: self.legend_mode,
        }
    }

    fn current_frame(&self) -> Option<ChartFrame> {
        let chart = self.dashboard.as_ref()?.get(&self.group)?;
        Some(chart.frame(self.adjusted))
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if !self.needs_redraw {
            return;
        }
        self.needs_redraw = false;
        let Some(frame) = self.current_frame() else {
            self.texture = None;
            return;
        };
        match viz::render_frame_rgb(&frame, &self.render_options()) {
            Ok(buf) => {
                let image = egui::ColorImage::from_rgb(
                    [VIEW_WIDTH as usize, VIEW_HEIGHT as usize],
                    &buf,
                );
                self.texture = Some(ctx.load_texture("chart", image, egui::TextureOptions::LINEAR));
            }
            Err(err) => {
                self.texture = None;
                self.error_message = format!("{err:#}");
            }
        }
    }

    fn legend_ui(&mut self, ui: &mut egui::Ui) {
        let Some(frame) = self.current_frame() else {
            return;
        };
        let mut clicked: Option<String> = None;
        ui.horizontal_wrapped(|ui| {
            for entry in &frame.legend {
                let color = parse_hex_color(&entry.color)
                    .map(|c| egui::Color32::from_rgb(c.0, c.1, c.2))
                    .unwrap_or(egui::Color32::GRAY);
                let mut text = egui::RichText::new(format!("■ {}", entry.display_name));
                text = if entry.active {
                    text.color(color)
                } else {
                    text.color(egui::Color32::GRAY).strikethrough()
                };
                let hover = entry.latest.as_deref().unwrap_or("no data");
                if ui.button(text).on_hover_text(hover).clicked() {
                    clicked = Some(entry.key.clone());
                }
            }
        });
        if let Some(key) = clicked
            && let Some(chart) = self.dashboard.as_mut().and_then(|d| d.get_mut(&self.group))
        {
            match chart.on_legend_click(&key) {
                Ok(_) => self.needs_redraw = true,
                Err(err) => self.error_message = err.to_string(),
            }
        }
    }

    fn tooltip_ui(&mut self, ui: &mut egui::Ui) {
        let Some(chart) = self.dashboard.as_ref().and_then(|d| d.get(&self.group)) else {
            return;
        };
        let n = chart.records().len();
        if n == 0 {
            ui.label("No dated records in this group");
            return;
        }
        if self.record_index >= n {
            self.record_index = n - 1;
        }
        ui.add(egui::Slider::new(&mut self.record_index, 0..=n - 1).text("record"));
        if let Some(tip) = chart.tooltip(self.record_index, self.adjusted) {
            ui.label(egui::RichText::new(tip.label).strong());
            for row in tip.rows {
                ui.label(format!("{}: {}", row.name, row.value));
            }
        }
    }
}

impl eframe::App for PoolChartsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_operation_result();
        if self.is_loading {
            ctx.request_repaint();
        }
        self.refresh_texture(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Pool Incentive Charts");
                ui.add_space(10.0);

                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        ui.label("Input:");
                        ui.text_edit_singleline(&mut self.input_path);
                        if ui.button("Browse").clicked()
                            && let Some(path) = rfd::FileDialog::new()
                                .add_filter("pool data", &["json", "csv"])
                                .pick_file()
                        {
                            self.input_path = path.to_string_lossy().to_string();
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.label("Layout:");
                        ui.radio_value(&mut self.catalog, CatalogChoice::Aggregate, "Aggregate");
                        ui.radio_value(&mut self.catalog, CatalogChoice::Combo, "Combo");
                        if ui
                            .add_enabled(!self.is_loading, egui::Button::new("Load"))
                            .clicked()
                        {
                            self.start_load();
                        }
                        if self.is_loading {
                            ui.spinner();
                        }
                    });
                });

                if let Some(dashboard) = &self.dashboard {
                    let labels: Vec<String> =
                        dashboard.labels().iter().map(|s| s.to_string()).collect();
                    let (group_before, adjusted_before, legend_before) =
                        (self.group.clone(), self.adjusted, self.legend_mode);

                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        egui::ComboBox::from_label("Group")
                            .selected_text(&self.group)
                            .show_ui(ui, |ui| {
                                for label in &labels {
                                    ui.selectable_value(&mut self.group, label.clone(), label);
                                }
                            });
                        ui.checkbox(&mut self.adjusted, "WETH price adjusted");
                        egui::ComboBox::from_label("Legend")
                            .selected_text(format!("{:?}", self.legend_mode))
                            .show_ui(ui, |ui| {
                                for (mode, name) in [
                                    (LegendMode::Bottom, "Bottom"),
                                    (LegendMode::Right, "Right"),
                                    (LegendMode::Top, "Top"),
                                ] {
                                    ui.selectable_value(&mut self.legend_mode, mode, name);
                                }
                            });
                    });
                    if group_before != self.group
                        || adjusted_before != self.adjusted
                        || legend_before != self.legend_mode
                    {
                        self.needs_redraw = true;
                        ctx.request_repaint();
                    }

                    ui.add_space(6.0);
                    self.legend_ui(ui);
                    if self.needs_redraw {
                        ctx.request_repaint();
                    }

                    if let Some(tex) = &self.texture {
                        ui.image((tex.id(), tex.size_vec2()));
                    }

                    ui.add_space(6.0);
                    ui.collapsing("Tooltip", |ui| self.tooltip_ui(ui));

                    ui.add_space(6.0);
                    ui.group(|ui| {
                        ui.horizontal(|ui| {
                            ui.label("Save to:");
                            ui.text_edit_singleline(&mut self.output_dir);
                            if ui.button("Browse").clicked()
                                && let Some(path) = rfd::FileDialog::new().pick_folder()
                            {
                                self.output_dir = path.to_string_lossy().to_string();
                            }
                            ui.radio_value(&mut self.plot_format, PlotFormat::Png, "PNG");
                            ui.radio_value(&mut self.plot_format, PlotFormat::Svg, "SVG");
                            if ui
                                .add_enabled(!self.is_loading, egui::Button::new("Save chart"))
                                .clicked()
                            {
                                self.start_save();
                            }
                        });
                    });
                }

                ui.add_space(10.0);
                if !self.status_message.is_empty() {
                    ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
                }
                if !self.error_message.is_empty() {
                    ui.colored_label(egui::Color32::RED, &self.error_message);
                }
            });
        });
    }
}

fn load_dashboard(path: &Path, catalog: &SeriesCatalog) -> Result<Dashboard> {
    let data = input::load(path)?;
    input::check_schema(&data)?;
    Ok(Dashboard::mount(&data, catalog))
}

fn file_safe(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
