use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::ViewModel;
use super::super::virtualize::PerformanceMode;

const SEARCH_RESULT_LIMIT: usize = 12;

impl ViewModel {
    pub(in crate::app) fn draw_controls(
        &mut self,
        ui: &mut Ui,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        ui.heading("Family tree");
        ui.add_space(4.0);
        ui.label(format!(
            "{} persons, {} relationship edges",
            self.graph.person_count(),
            self.graph.edge_count
        ));

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!is_reloading, egui::Button::new("Reload"))
                .clicked()
            {
                *reload_requested = true;
            }
            if is_reloading {
                ui.spinner();
            }
        });

        ui.separator();
        ui.label(RichText::new("Search").strong());
        ui.text_edit_singleline(&mut self.search);
        self.draw_search_results(ui);

        ui.separator();
        ui.label(RichText::new("View").strong());

        let mut mode = self.performance_mode;
        egui::ComboBox::from_label("performance mode")
            .selected_text(mode.label())
            .show_ui(ui, |ui| {
                for candidate in PerformanceMode::ALL {
                    ui.selectable_value(&mut mode, candidate, candidate.label());
                }
            });
        self.set_performance_mode(mode);
        if let Some(virtualizer) = &self.virtualizer {
            ui.small(format!("cull buffer {:.0} scaled units", virtualizer.buffer()));
        }

        let mut scale_factor = self.scale_factor;
        ui.add(
            egui::Slider::new(&mut scale_factor, 0.5..=2.0)
                .text("scale factor")
                .fixed_decimals(2),
        );
        self.set_scale_factor(scale_factor);

        ui.horizontal(|ui| {
            ui.label(format!("zoom {:.2}", self.zoom));
            if ui.button("Reset view").clicked() {
                self.zoom = self.scale_limits.clamp_scale(1.0);
                self.pan = egui::Vec2::ZERO;
            }
        });

        ui.checkbox(&mut self.show_grid_overlay, "show spatial grid");
        if let Some(spatial) = &self.spatial {
            ui.small(format!(
                "{} persons indexed in {} grid cells",
                spatial.node_count(),
                spatial.cell_count()
            ));
        }

        ui.separator();
        ui.label(RichText::new("Layout cache").strong());
        ui.label(format!("{} cached layouts", self.layout_cache.len()));
        if ui
            .add_enabled(
                !self.layout_cache.is_empty(),
                egui::Button::new("Clear cache"),
            )
            .on_hover_text("Drops all memoized layouts; the next frame recomputes.")
            .clicked()
        {
            self.layout_cache.clear();
            self.view_dirty = true;
        }

        ui.separator();
        ui.checkbox(&mut self.show_fps_bar, "fps bar");
        if self.show_fps_bar {
            ui.indent("fps_options", |ui| {
                ui.checkbox(&mut self.fps_show_current, "current");
                ui.checkbox(&mut self.fps_show_average, "average");
                ui.checkbox(&mut self.fps_show_frame_time, "frame time");
            });
        }

        ui.checkbox(&mut self.show_perf_panel, "timings");
        if self.show_perf_panel {
            self.draw_perf_report(ui);
        }
    }

    fn draw_search_results(&mut self, ui: &mut Ui) {
        let query = self.search.trim().to_owned();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut matches = self
            .graph
            .persons
            .values()
            .filter_map(|person| {
                matcher
                    .fuzzy_match(&person.name, &query)
                    .or_else(|| matcher.fuzzy_match(&person.id, &query))
                    .map(|score| (score, person.id.clone(), person.name.clone()))
            })
            .collect::<Vec<_>>();

        matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        matches.truncate(SEARCH_RESULT_LIMIT);

        if matches.is_empty() {
            ui.small("no matches");
            return;
        }

        for (_score, id, name) in matches {
            ui.horizontal(|ui| {
                if ui.link(&name).on_hover_text(id.as_str()).clicked() {
                    self.set_selected(Some(id.clone()));
                }
                if ui
                    .small_button("root")
                    .on_hover_text("Re-root the tree at this person")
                    .clicked()
                {
                    self.set_root(id.clone());
                    self.set_selected(Some(id.clone()));
                }
            });
        }
    }

    fn draw_perf_report(&mut self, ui: &mut Ui) {
        let report = self.perf.report();
        if report.metrics.is_empty() {
            ui.small("no measurements yet");
            return;
        }

        ui.small(format!(
            "{} samples, report at {:.0} ms",
            self.perf.len(),
            report.timestamp_ms
        ));
        if let Some(last) = self.perf.iter().last() {
            let annotation = last
                .metadata
                .as_deref()
                .map(|metadata| format!(" ({metadata})"))
                .unwrap_or_default();
            ui.small(format!(
                "last: {} {:.2} ms{annotation}",
                last.name, last.duration_ms
            ));
        }

        let mut names = report.metrics.keys().cloned().collect::<Vec<_>>();
        names.sort_unstable();

        egui::Grid::new("perf_report_grid")
            .striped(true)
            .min_col_width(48.0)
            .show(ui, |ui| {
                ui.small("op");
                ui.small("n");
                ui.small("avg");
                ui.small("min");
                ui.small("max");
                ui.small("p95");
                ui.end_row();

                for name in names {
                    let stats = &report.metrics[&name];
                    ui.small(name.as_str());
                    ui.small(stats.count.to_string());
                    ui.small(format!("{:.2}", stats.average));
                    ui.small(format!("{:.2}", stats.min));
                    ui.small(format!("{:.2}", stats.max));
                    ui.small(format!("{:.2}", stats.p95));
                    ui.end_row();
                }
            });

        if ui.small_button("clear timings").clicked() {
            self.perf.clear();
        }
    }
}
