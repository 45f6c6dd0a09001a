use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use crate::family::{FamilyGraph, FamilySource, collect_family_graph};
use crate::layout::LayoutResult;

mod cache;
mod gesture;
mod graph;
mod perf;
mod render_utils;
mod spatial;
mod ui;
mod viewport;
mod virtualize;

use cache::LayoutCache;
use gesture::ScaleLimits;
use perf::PerformanceMonitor;
use spatial::SpatialIndex;
use virtualize::{PerformanceMode, VirtualizationEngine};

pub struct KindredApp {
    source: FamilySource,
    state: AppState,
    reload_rx: Option<Receiver<Result<FamilyGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<FamilyGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: FamilyGraph,
    root_id: String,

    layout_cache: LayoutCache,
    layout: Option<Arc<LayoutResult>>,
    layout_error: Option<String>,
    spatial: Option<SpatialIndex>,
    virtualizer: Option<VirtualizationEngine>,
    // Set when node set, root or scale factor changes; the stale index and
    // virtualizer are discarded and rebuilt once, at the start of the next
    // frame, before any query runs.
    view_dirty: bool,

    scale_factor: f32,
    performance_mode: PerformanceMode,
    scale_limits: ScaleLimits,
    pan: Vec2,
    zoom: f32,
    canvas_offset: Vec2,

    perf: PerformanceMonitor,

    search: String,
    selected: Option<String>,
    show_grid_overlay: bool,
    show_perf_panel: bool,

    show_fps_bar: bool,
    fps_show_current: bool,
    fps_show_average: bool,
    fps_show_frame_time: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,

    visible_node_count: usize,
    visible_connector_count: usize,
}

impl ViewModel {
    fn set_selected(&mut self, selected: Option<String>) {
        self.selected = selected;
    }

    fn set_root(&mut self, root_id: String) {
        if self.root_id != root_id {
            self.root_id = root_id;
            self.view_dirty = true;
        }
    }

    fn set_scale_factor(&mut self, scale_factor: f32) {
        if (self.scale_factor - scale_factor).abs() > f32::EPSILON {
            self.scale_factor = scale_factor;
            self.view_dirty = true;
        }
    }

    fn set_performance_mode(&mut self, mode: PerformanceMode) {
        if self.performance_mode != mode {
            self.performance_mode = mode;
            self.view_dirty = true;
        }
    }
}

impl KindredApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: FamilySource) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: FamilySource) -> Receiver<Result<FamilyGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = collect_family_graph(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: FamilySource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }
}

impl eframe::App for KindredApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading family tree...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load family tree");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
