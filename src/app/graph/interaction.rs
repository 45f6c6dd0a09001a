use eframe::egui::{self, Pos2, Rect, Ui, pos2, vec2};

use crate::layout::{NODE_HEIGHT, NODE_WIDTH, PositionedNode};

use super::super::ViewModel;
use super::super::gesture::{focal_point, limit_translation};
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = self.scale_limits.clamp_scale(self.zoom * zoom_factor);

        // Keep the content point under the pointer stationary across the
        // scale change; the focal offset is that point re-projected at the
        // new scale.
        let focal = focal_point(
            world_before.x + rect.width() * 0.5,
            world_before.y + rect.height() * 0.5,
            self.zoom,
            rect.width(),
            rect.height(),
        );
        self.pan = (pointer - rect.center()) - focal;
        self.clamp_pan(rect);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, rect: Rect, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }

        // Translation limits apply at gesture end, not per-delta.
        if response.drag_stopped() {
            self.clamp_pan(rect);
        }
    }

    pub(in crate::app) fn clamp_pan(&mut self, rect: Rect) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };

        self.pan = limit_translation(
            self.pan,
            self.zoom,
            layout.canvas.width * self.scale_factor,
            layout.canvas.height * self.scale_factor,
            rect.width(),
            rect.height(),
        );
    }

    /// Exact hover hit-test: a bounds query for every node whose footprint
    /// could contain the pointer, then a containment check.
    pub(in crate::app) fn hovered_node(
        &self,
        ui: &Ui,
        rect: Rect,
        nodes: &[PositionedNode],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }

        let world = screen_to_world(rect, self.pan, self.zoom, pointer) + self.canvas_offset;
        let spatial = self.spatial.as_ref()?;
        let scale = self.scale_factor;

        // A node contains the pointer only if its scaled top-left is within
        // one footprint above/left of it.
        let candidates = spatial.nodes_in_bounds(
            world.x - NODE_WIDTH * scale,
            world.y - NODE_HEIGHT * scale,
            world.x,
            world.y,
        );

        let pointer_world = Pos2::new(world.x, world.y);
        candidates.into_iter().find(|&index| {
            nodes.get(index).is_some_and(|node| {
                Rect::from_min_size(
                    pos2(node.left * scale, node.top * scale),
                    vec2(NODE_WIDTH * scale, NODE_HEIGHT * scale),
                )
                .contains(pointer_world)
            })
        })
    }

    /// Tap snap: the bounded nearest-node search around the tapped point. May
    /// answer nothing when the tap lands more than three grid rings from any
    /// node; that is the intended trade-off.
    pub(in crate::app) fn tapped_node(&self, rect: Rect, pointer: Pos2) -> Option<usize> {
        let world = screen_to_world(rect, self.pan, self.zoom, pointer) + self.canvas_offset;
        self.spatial.as_ref()?.nearest_node(world.x, world.y)
    }
}
