use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::family::FamilyGraph;

use super::super::cache::LayoutCache;
use super::super::gesture::ScaleLimits;
use super::super::perf::PerformanceMonitor;
use super::super::virtualize::PerformanceMode;
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(graph: FamilyGraph) -> Self {
        let root_id = graph.root_id.clone();

        Self {
            graph,
            root_id,
            layout_cache: LayoutCache::new(),
            layout: None,
            layout_error: None,
            spatial: None,
            virtualizer: None,
            view_dirty: true,
            scale_factor: 1.0,
            performance_mode: PerformanceMode::Balanced,
            scale_limits: ScaleLimits::default(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            canvas_offset: Vec2::ZERO,
            perf: PerformanceMonitor::new(),
            search: String::new(),
            selected: None,
            show_grid_overlay: false,
            show_perf_panel: false,
            show_fps_bar: true,
            fps_show_current: true,
            fps_show_average: true,
            fps_show_frame_time: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
            visible_node_count: 0,
            visible_connector_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.update_fps_counter(ctx);

        egui::SidePanel::left("controls_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_controls(ui, reload_requested, is_reloading);
                    ui.separator();
                    self.draw_details(ui);
                });
            });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                if let Some(fps_text) = self.fps_display_text() {
                    ui.label(fps_text);
                    ui.separator();
                }
                if let Some(tree_text) = self.visible_tree_text() {
                    ui.label(tree_text);
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_graph(ui);
            });
    }
}
