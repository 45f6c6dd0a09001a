use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(21, 24, 30));

    let step = (64.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 66, 78, 60)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 66, 78, 60)),
        );
        y += step;
    }
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn polyline_visible(rect: Rect, points: &[Pos2], padding: f32) -> bool {
    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        max_x = max_x.max(point.x);
        min_y = min_y.min(point.y);
        max_y = max_y.max(point.y);
    }

    !(max_x + padding < rect.left()
        || min_x - padding > rect.right()
        || max_y + padding < rect.top()
        || min_y - padding > rect.bottom())
}

const GENERATION_PALETTE: [Color32; 6] = [
    Color32::from_rgb(86, 140, 204),
    Color32::from_rgb(96, 174, 128),
    Color32::from_rgb(196, 150, 84),
    Color32::from_rgb(176, 112, 176),
    Color32::from_rgb(104, 170, 186),
    Color32::from_rgb(188, 120, 104),
];

pub(super) fn generation_color(generation: usize) -> Color32 {
    GENERATION_PALETTE[generation % GENERATION_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn world_and_screen_transforms_round_trip() {
        let rect = Rect::from_min_size(pos2(10.0, 20.0), vec2(800.0, 600.0));
        let pan = vec2(33.0, -17.0);
        let zoom = 1.7;
        let world = vec2(123.0, -456.0);

        let screen = world_to_screen(rect, pan, zoom, world);
        let back = screen_to_world(rect, pan, zoom, screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn polyline_visibility_respects_padding() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        let outside = [pos2(110.0, 10.0), pos2(130.0, 50.0)];
        assert!(!polyline_visible(rect, &outside, 2.0));
        assert!(polyline_visible(rect, &outside, 15.0));

        let crossing = [pos2(-50.0, 50.0), pos2(150.0, 50.0)];
        assert!(polyline_visible(rect, &crossing, 0.0));
    }
}
