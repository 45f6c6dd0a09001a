use eframe::egui::{self, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::layout::{ConnectorKind, NODE_HEIGHT, NODE_WIDTH, layout_tree};
use crate::util::given_name;

use super::super::render_utils::{
    blend_color, dim_color, draw_background, generation_color, polyline_visible, world_to_screen,
};
use super::super::spatial::{DEFAULT_CELL_SIZE, SpatialIndex};
use super::super::viewport::ViewportBounds;
use super::super::virtualize::VirtualizationEngine;
use super::super::ViewModel;

const LABEL_BUDGET: usize = 60;

impl ViewModel {
    /// Coalesced rebuild: at most once per frame, and always before any query
    /// touches the spatial index or the virtualization engine.
    pub(in crate::app) fn ensure_view(&mut self) {
        if !self.view_dirty {
            return;
        }

        self.layout = None;
        self.layout_error = None;
        self.spatial = None;
        self.virtualizer = None;
        self.view_dirty = false;

        let cache = &mut self.layout_cache;
        let graph = &self.graph;
        let root_id = self.root_id.as_str();
        let result = self
            .perf
            .measure_fallible("layout", || cache.get(graph, root_id, layout_tree));

        let layout = match result {
            Ok(layout) => layout,
            Err(error) => {
                log::warn!("layout failed for root {root_id:?}: {error:#}");
                self.layout_error = Some(format!("{error:#}"));
                return;
            }
        };

        let scale_factor = self.scale_factor;
        let mode = self.performance_mode;
        self.spatial = Some(
            self.perf
                .measure("spatial-index-build", || SpatialIndex::new(&layout.nodes, scale_factor)),
        );
        self.virtualizer = Some(self.perf.measure("virtualizer-build", || {
            VirtualizationEngine::new(&layout.nodes, scale_factor, mode)
        }));

        self.canvas_offset = vec2(layout.canvas.width, layout.canvas.height) * scale_factor * 0.5;
        self.layout = Some(layout);
    }

    fn scaled_to_screen(&self, rect: Rect, scaled: eframe::egui::Vec2) -> Pos2 {
        world_to_screen(rect, self.pan, self.zoom, scaled - self.canvas_offset)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        self.ensure_view();

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(rect, &response);

        if let Some(error) = &self.layout_error {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                format!("Layout failed: {error}"),
                FontId::proportional(14.0),
                Color32::from_rgb(235, 140, 140),
            );
            self.visible_node_count = 0;
            self.visible_connector_count = 0;
            return;
        }

        let Some(layout) = self.layout.clone() else {
            self.visible_node_count = 0;
            self.visible_connector_count = 0;
            return;
        };
        let Some(virtualizer) = self.virtualizer.as_ref() else {
            return;
        };

        // Per-frame viewport derivation; the only work on the 16 ms path
        // besides the linear cull itself.
        let viewport =
            ViewportBounds::from_screen(rect, self.pan, self.zoom).translated(self.canvas_offset);
        log::trace!(
            "viewport {:.0}x{:.0} scaled units at zoom {:.2}",
            viewport.width(),
            viewport.height(),
            self.zoom
        );

        let cull_start = std::time::Instant::now();
        let visible = virtualizer.visible_nodes(&viewport);
        self.perf.record(
            "visible-cull",
            cull_start.elapsed().as_secs_f64() * 1000.0,
            Some(format!("{} visible", visible.len())),
            false,
        );
        self.visible_node_count = visible.len();

        let scale_factor = self.scale_factor;
        let zoom = self.zoom;

        // Connectors are culled in screen space with a small padding.
        let mut visible_connector_count = 0usize;
        let mut screen_points = Vec::new();
        for connector in &layout.connectors {
            screen_points.clear();
            screen_points.extend(
                connector
                    .points
                    .iter()
                    .map(|point| self.scaled_to_screen(rect, *point * scale_factor)),
            );

            if !polyline_visible(rect, &screen_points, 4.0) {
                continue;
            }

            let stroke = match connector.kind {
                ConnectorKind::ParentChild => Stroke::new(
                    (1.4 * zoom.sqrt()).clamp(0.6, 3.0),
                    Color32::from_rgba_unmultiplied(150, 158, 170, 180),
                ),
                ConnectorKind::Spouse => Stroke::new(
                    (2.0 * zoom.sqrt()).clamp(0.8, 3.6),
                    Color32::from_rgba_unmultiplied(196, 160, 110, 190),
                ),
            };

            for segment in screen_points.windows(2) {
                painter.line_segment([segment[0], segment[1]], stroke);
            }
            visible_connector_count += 1;
        }
        self.visible_connector_count = visible_connector_count;

        if self.show_grid_overlay {
            self.draw_grid_overlay(&painter, rect, &viewport);
        }

        let hovered = self.hovered_node(ui, rect, &layout.nodes);

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let search_query = self.search.trim().to_owned();
        let matcher = (!search_query.is_empty()).then(SkimMatcherV2::default);

        // Nearest-first ordering decides which visible nodes get labels when
        // the visible set is large.
        let focus = viewport.center();
        let ordered = virtualizer.prioritize(&visible, focus.x, focus.y);

        let node_size = vec2(NODE_WIDTH, NODE_HEIGHT) * scale_factor * zoom;
        for (rank, &index) in ordered.iter().enumerate() {
            let node = &layout.nodes[index];
            let top_left =
                self.scaled_to_screen(rect, vec2(node.left, node.top) * scale_factor);
            let node_rect = Rect::from_min_size(top_left, node_size);

            let is_selected = self.selected.as_deref() == Some(node.id.as_str());
            let is_hovered = hovered == Some(index);

            let person_name = self
                .graph
                .persons
                .get(&node.id)
                .map(|person| person.name.as_str())
                .unwrap_or(node.id.as_str());

            let search_hit = matcher.as_ref().is_some_and(|matcher| {
                matcher.fuzzy_match(person_name, &search_query).is_some()
            });

            let base = generation_color(node.generation);
            let mut fill = if is_hovered {
                blend_color(base, Color32::from_rgb(255, 176, 110), 0.45)
            } else if search_hit {
                blend_color(base, Color32::from_rgb(110, 200, 255), 0.55)
            } else if matcher.is_some() {
                dim_color(base, 0.40)
            } else {
                base
            };
            if is_selected {
                fill = blend_color(fill, Color32::from_rgb(245, 206, 93), 0.65);
            }

            painter.rect_filled(node_rect, CornerRadius::same(4), fill);
            painter.rect_stroke(
                node_rect,
                CornerRadius::same(4),
                Stroke::new(
                    if is_selected { 2.2 } else { 1.0 },
                    Color32::from_rgba_unmultiplied(14, 14, 16, 200),
                ),
                egui::StrokeKind::Outside,
            );

            if node.has_sub_tree {
                let marker = Pos2::new(node_rect.center_bottom().x, node_rect.bottom() - 4.0);
                painter.circle_filled(marker, (2.4 * zoom).clamp(1.5, 4.0), Color32::from_gray(235));
            }

            let labels_on = zoom > 0.8 || is_selected || is_hovered || search_hit;
            if labels_on || rank < LABEL_BUDGET {
                let font = FontId::proportional((12.0 * zoom).clamp(9.0, 16.0));
                painter.text(
                    node_rect.center(),
                    Align2::CENTER_CENTER,
                    given_name(person_name),
                    font,
                    Color32::from_gray(240),
                );
            }
        }

        if let Some(hovered_index) = hovered
            && let Some(node) = layout.nodes.get(hovered_index)
            && let Some(person) = self.graph.persons.get(&node.id)
        {
            let panel_text = format!(
                "{}  |  generation {}  |  {} relations",
                person.name,
                node.generation,
                person.relation_count()
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.double_clicked_by(egui::PointerButton::Primary) {
            // Double-tap snaps to the nearest node even when the tap misses.
            if let Some(pointer) = ui.input(|input| input.pointer.hover_pos())
                && let Some(index) = self.tapped_node(rect, pointer)
            {
                let id = layout.nodes.get(index).map(|node| node.id.clone());
                self.set_selected(id);
            }
        } else if response.clicked_by(egui::PointerButton::Primary) {
            let selected = hovered.and_then(|index| {
                layout.nodes.get(index).map(|node| node.id.clone())
            });
            self.set_selected(selected);
        }
    }

    fn draw_grid_overlay(&self, painter: &egui::Painter, rect: Rect, viewport: &ViewportBounds) {
        let stroke = Stroke::new(0.8, Color32::from_rgba_unmultiplied(106, 198, 255, 80));

        let start_x = (viewport.min_x / DEFAULT_CELL_SIZE).floor() as i32;
        let end_x = (viewport.max_x / DEFAULT_CELL_SIZE).ceil() as i32;
        for cell_x in start_x..=end_x {
            let x = cell_x as f32 * DEFAULT_CELL_SIZE;
            let top = self.scaled_to_screen(rect, vec2(x, viewport.min_y));
            let bottom = self.scaled_to_screen(rect, vec2(x, viewport.max_y));
            painter.line_segment([top, bottom], stroke);
        }

        let start_y = (viewport.min_y / DEFAULT_CELL_SIZE).floor() as i32;
        let end_y = (viewport.max_y / DEFAULT_CELL_SIZE).ceil() as i32;
        for cell_y in start_y..=end_y {
            let y = cell_y as f32 * DEFAULT_CELL_SIZE;
            let left = self.scaled_to_screen(rect, vec2(viewport.min_x, y));
            let right = self.scaled_to_screen(rect, vec2(viewport.max_x, y));
            painter.line_segment([left, right], stroke);
        }
    }
}
