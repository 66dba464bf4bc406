use crate::config::{ConfigError, ForestConfig};
use crate::control::ControlPanel;
use crate::debug;
use crate::forest::Forest;
use crate::species::{Rgb, SpeciesPolicy};
use crate::stats::StatsMode;
use crate::ticker::TickDriver;
use egui::{Color32, Pos2, Rect, Shape, Stroke, Vec2};

/// Height of the statistics graph in points
const STATS_HEIGHT: f32 = 160.0;
/// Never run more than this many ticks in one frame
const MAX_TICKS_PER_FRAME: u32 = 64;

/// Main application state
pub struct ForestApp {
    pub forest: Forest,
    pub panel: ControlPanel,
    pub ticker: TickDriver,
    pub paused: bool,
    pub show_events: bool,
    pub last_error: Option<String>,
}

impl ForestApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: ForestConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::with_forest(Forest::new(config)?))
    }

    pub fn with_forest(forest: Forest) -> Self {
        let panel = ControlPanel::from_config(forest.config());
        let ticker = TickDriver::new(panel.tick_period_ms(), MAX_TICKS_PER_FRAME);
        Self {
            forest,
            panel,
            ticker,
            paused: false,
            show_events: false,
            last_error: None,
        }
    }

    fn apply_panel(&mut self) {
        self.ticker.set_period_ms(self.panel.tick_period_ms());
        match self.panel.apply(&mut self.forest) {
            Ok(()) => self.last_error = None,
            Err(err) => {
                tracing::warn!(%err, "control change rejected");
                self.last_error = Some(err.to_string());
                self.panel = ControlPanel {
                    update_slider: self.panel.update_slider,
                    ..ControlPanel::from_config(self.forest.config())
                };
            }
        }
    }
}

fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

impl eframe::App for ForestApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Continuously repaint
        ctx.request_repaint();

        // Run however many ticks are due since the last frame
        if !self.paused {
            let elapsed_ms = ctx.input(|i| i.unstable_dt) as f64 * 1000.0;
            for _ in 0..self.ticker.advance(elapsed_ms) {
                self.forest.tick();
            }
        }

        // Top panel with run controls
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Forest");

                ui.separator();

                if ui
                    .button(if self.paused { "▶ Play" } else { "⏸ Pause" })
                    .clicked()
                {
                    self.paused = !self.paused;
                }

                if ui.button("Step").clicked() {
                    self.forest.tick();
                }

                if ui.button("Reset").clicked() {
                    self.forest.reset();
                    debug::reset_stats();
                }

                ui.separator();

                ui.label(format!("Ticks: {}", self.forest.total_ticks));
                ui.label(format!("Trees: {}", self.forest.population()));
            });
        });

        // Left panel with forest controls
        egui::SidePanel::left("controls_panel")
            .min_width(250.0)
            .show(ctx, |ui| {
                ui.heading("Controls");
                ui.separator();

                let mut changed = false;
                changed |= ui
                    .add(egui::Slider::new(&mut self.panel.birth_slider, 0.0..=6.0).text("Birth rate"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut self.panel.death_slider, 0.0..=6.0).text("Death rate"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut self.panel.update_slider, 0.0..=6.0).text("Speed"))
                    .changed();
                changed |= ui
                    .checkbox(&mut self.panel.parent_weighting, "Seeds follow neighbours")
                    .changed();
                changed |= ui.checkbox(&mut self.panel.disasters, "Disasters").changed();

                ui.add_space(10.0);
                ui.label("Number of species (resets the forest):");
                changed |= ui
                    .add(egui::Slider::new(&mut self.panel.number_species, 1..=6))
                    .changed();

                ui.add_space(10.0);
                ui.separator();
                ui.heading("Species Policy");
                for policy in SpeciesPolicy::all() {
                    changed |= ui
                        .radio_value(&mut self.panel.policy, policy, policy.name())
                        .changed();
                }

                if changed {
                    self.apply_panel();
                }

                if let Some(err) = &self.last_error {
                    ui.colored_label(Color32::RED, err.as_str());
                }

                ui.add_space(10.0);
                ui.separator();
                ui.heading("Statistics");
                ui.label(format!("Seeds: {}", self.forest.total_seeds));
                ui.label(format!("Births: {}", self.forest.total_births));
                ui.label(format!("Deaths: {}", self.forest.total_deaths));
                ui.label(format!("Clearings: {}", self.forest.total_clearings));

                ui.add_space(10.0);
                let latest = self.forest.stats().latest().unwrap_or(&[]).to_vec();
                for (species, value) in latest.iter().enumerate() {
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(Vec2::splat(12.0), egui::Sense::hover());
                        ui.painter()
                            .rect_filled(rect, 2.0, color(self.forest.series_color(species)));
                        match self.forest.stats().mode() {
                            StatsMode::AreaProportion => {
                                ui.label(format!("{:.1}% of canvas", value * 100.0))
                            }
                            StatsMode::MeanGrowthRate => {
                                ui.label(format!("mean growth {:.3}", value))
                            }
                        };
                    });
                }

                ui.add_space(10.0);
                ui.checkbox(&mut self.show_events, "Show event log");
                if self.show_events {
                    for event in debug::get_recent_events(12) {
                        ui.small(event);
                    }
                }
            });

        // Bottom panel with the statistics graph
        egui::TopBottomPanel::bottom("stats_panel")
            .exact_height(STATS_HEIGHT)
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::hover());
                let rect = response.rect;
                painter.rect_filled(rect, 0.0, Color32::WHITE);

                let stats = self.forest.stats();
                let samples = stats.len().max(2);
                let step = rect.width() / (samples - 1) as f32;
                let n = stats.number_species() as f32;
                let height = rect.height();

                for species in 0..stats.number_species() {
                    let points: Vec<Pos2> = stats
                        .species_series(species)
                        .enumerate()
                        .map(|(t, value)| {
                            let y = match stats.mode() {
                                // scale so a few percent of coverage is visible
                                StatsMode::AreaProportion => {
                                    (height - 200.0 * n * value as f32).max(1.0)
                                }
                                StatsMode::MeanGrowthRate => (1.0 - value as f32) * height,
                            };
                            Pos2::new(rect.left() + t as f32 * step, rect.top() + y)
                        })
                        .collect();
                    painter.add(Shape::line(
                        points,
                        Stroke::new(2.0, color(self.forest.series_color(species))),
                    ));
                }
            });

        // Central panel with the forest canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            let available_size = ui.available_size();
            let config = self.forest.config();
            let (width, height) = (config.width as f32, config.height as f32);
            let scale = (available_size.x / width)
                .min(available_size.y / height)
                .max(0.1);

            let (response, painter) = ui.allocate_painter(
                Vec2::new(width * scale, height * scale),
                egui::Sense::click(),
            );
            let origin = response.rect.min;
            painter.rect_filled(
                Rect::from_min_size(origin, response.rect.size()),
                0.0,
                Color32::WHITE,
            );

            for tree in self.forest.trees.iter().filter(|t| t.alive) {
                let center = origin + Vec2::new(tree.x as f32, tree.y as f32) * scale;
                painter.circle(
                    center,
                    tree.r as f32 * scale,
                    color(self.forest.color_of(tree)),
                    Stroke::new(1.0, Color32::BLACK),
                );
            }

            // Clicking clears a patch of forest
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let local = (pos - origin) / scale;
                    self.forest.clear_area(local.x as f64, local.y as f64);
                }
            }
        });
    }
}
