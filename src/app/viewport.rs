use eframe::egui::{Rect, Vec2};

use super::render_utils::screen_to_world;

/// Visible region in scaled layout space. Recomputed every frame from the
/// current pan/zoom; never persisted. Well-formed by construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl ViewportBounds {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: max_x.max(min_x),
            min_y: min_y.min(max_y),
            max_y: max_y.max(min_y),
        }
    }

    /// Maps the screen rect under the current pan/zoom back into scaled layout
    /// space. Pan and zoom apply on top of the scale factor, so the result is
    /// directly comparable to scaled node positions.
    pub fn from_screen(rect: Rect, pan: Vec2, zoom: f32) -> Self {
        let top_left = screen_to_world(rect, pan, zoom, rect.left_top());
        let bottom_right = screen_to_world(rect, pan, zoom, rect.right_bottom());
        Self::new(top_left.x, bottom_right.x, top_left.y, bottom_right.y)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(
            self.min_x + offset.x,
            self.max_x + offset.x,
            self.min_y + offset.y,
            self.max_y + offset.y,
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.min_x - margin,
            self.max_x + margin,
            self.min_y - margin,
            self.max_y + margin,
        )
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn constructor_never_emits_inverted_bounds() {
        let bounds = ViewportBounds::new(10.0, -10.0, 5.0, -5.0);
        assert!(bounds.min_x <= bounds.max_x);
        assert!(bounds.min_y <= bounds.max_y);
    }

    #[test]
    fn identity_view_maps_rect_around_its_center() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 200.0));
        let bounds = ViewportBounds::from_screen(rect, Vec2::ZERO, 1.0);
        assert_eq!(bounds.min_x, -200.0);
        assert_eq!(bounds.max_x, 200.0);
        assert_eq!(bounds.min_y, -100.0);
        assert_eq!(bounds.max_y, 100.0);
    }

    #[test]
    fn zooming_in_shrinks_the_world_window() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 200.0));
        let wide = ViewportBounds::from_screen(rect, Vec2::ZERO, 0.5);
        let tight = ViewportBounds::from_screen(rect, Vec2::ZERO, 2.0);
        assert!(wide.width() > tight.width());
        assert!(wide.height() > tight.height());
    }

    #[test]
    fn expansion_grows_all_sides() {
        let bounds = ViewportBounds::new(0.0, 100.0, 0.0, 50.0).expanded(25.0);
        assert_eq!(bounds.min_x, -25.0);
        assert_eq!(bounds.max_x, 125.0);
        assert_eq!(bounds.min_y, -25.0);
        assert_eq!(bounds.max_y, 75.0);
    }
}
