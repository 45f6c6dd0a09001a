use eframe::egui::{Vec2, vec2};

/// Pure gesture math: the clamps and focal-point offsets that turn raw
/// pinch/pan deltas into valid scale/translation state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self { min: 0.3, max: 2.0 }
    }
}

impl ScaleLimits {
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min, self.max)
    }
}

/// Offset that keeps the pinch focal point visually stationary while the scale
/// changes.
pub fn focal_point(
    center_x: f32,
    center_y: f32,
    scale: f32,
    viewport_width: f32,
    viewport_height: f32,
) -> Vec2 {
    vec2(
        (center_x - viewport_width * 0.5) * scale,
        (center_y - viewport_height * 0.5) * scale,
    )
}

/// Clamps a pan translation so scaled content never drags fully off screen.
/// On an axis where the scaled content fits inside the viewport, the clamp
/// collapses to zero and the content stays centered.
pub fn limit_translation(
    translation: Vec2,
    scale: f32,
    content_width: f32,
    content_height: f32,
    viewport_width: f32,
    viewport_height: f32,
) -> Vec2 {
    let max_translate_x = ((content_width * scale - viewport_width) * 0.5).max(0.0);
    let max_translate_y = ((content_height * scale - viewport_height) * 0.5).max(0.0);

    vec2(
        translation.x.clamp(-max_translate_x, max_translate_x),
        translation.y.clamp(-max_translate_y, max_translate_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_scale_is_idempotent() {
        let limits = ScaleLimits::default();
        for scale in [-3.0, 0.0, 0.2999, 0.3, 1.0, 1.999, 2.0, 2.0001, 50.0, f32::MAX] {
            let once = limits.clamp_scale(scale);
            assert_eq!(limits.clamp_scale(once), once, "scale {scale}");
            assert!((limits.min..=limits.max).contains(&once));
        }
    }

    #[test]
    fn default_limits_match_the_session_bounds() {
        let limits = ScaleLimits::default();
        assert_eq!(limits.min, 0.3);
        assert_eq!(limits.max, 2.0);
    }

    #[test]
    fn focal_point_is_zero_at_the_viewport_center() {
        let offset = focal_point(187.5, 406.0, 1.5, 375.0, 812.0);
        assert_eq!(offset, Vec2::ZERO);
    }

    #[test]
    fn focal_point_scales_the_center_offset() {
        let offset = focal_point(300.0, 500.0, 2.0, 400.0, 800.0);
        assert_eq!(offset, vec2(200.0, 200.0));

        let half = focal_point(300.0, 500.0, 0.5, 400.0, 800.0);
        assert_eq!(half, vec2(50.0, 50.0));
    }

    #[test]
    fn translation_collapses_to_origin_when_content_fits() {
        // 800x600 content at 0.4 scale is smaller than a 375x812 viewport.
        let clamped = limit_translation(vec2(500.0, -700.0), 0.4, 800.0, 600.0, 375.0, 812.0);
        assert_eq!(clamped, Vec2::ZERO);
    }

    #[test]
    fn translation_clamps_per_axis() {
        // At scale 1, content overflows x by 625 and fits y.
        let clamped = limit_translation(vec2(9999.0, 9999.0), 1.0, 1000.0, 600.0, 375.0, 812.0);
        assert_eq!(clamped, vec2(312.5, 0.0));

        let negative = limit_translation(vec2(-9999.0, -10.0), 1.0, 1000.0, 600.0, 375.0, 812.0);
        assert_eq!(negative, vec2(-312.5, 0.0));
    }

    #[test]
    fn in_range_translation_passes_through() {
        let pass = limit_translation(vec2(100.0, -40.0), 1.0, 2000.0, 2000.0, 375.0, 812.0);
        assert_eq!(pass, vec2(100.0, -40.0));
    }
}
