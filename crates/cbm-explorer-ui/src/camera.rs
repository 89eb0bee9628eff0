//! Camera2D - pan/zoom over graph world coordinates
//!
//! Call `update(dt)` at the start of a frame, then use the transforms for
//! painting and hit-testing. Targets are eased towards exponentially so a
//! fit after a search glides instead of jumping.

use cbm_explorer::Bounds;
use egui::{Pos2, Rect, Vec2};

/// Fraction of the remaining distance covered per second of easing.
const EASE_RATE: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct Camera2D {
    center: Pos2,
    zoom: f32,
    target_center: Pos2,
    target_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            center: Pos2::ZERO,
            zoom: 1.0,
            target_center: Pos2::ZERO,
            target_zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
        }
    }
}

impl Camera2D {
    pub fn center(&self) -> Pos2 {
        self.center
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    // =========================================================================
    // ANIMATION
    // =========================================================================

    pub fn update(&mut self, dt: f32) {
        let t = 1.0 - (-EASE_RATE * dt).exp();
        self.center = self.center + (self.target_center - self.center) * t;
        self.zoom += (self.target_zoom - self.zoom) * t;
    }

    pub fn snap_to_target(&mut self) {
        self.center = self.target_center;
        self.zoom = self.target_zoom;
    }

    pub fn is_animating(&self) -> bool {
        (self.target_center - self.center).length() > 0.1 || (self.target_zoom - self.zoom).abs() > 0.001
    }

    // =========================================================================
    // CONTROLS
    // =========================================================================

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, screen_delta: Vec2) {
        let world_delta = screen_delta / self.zoom;
        self.center -= world_delta;
        self.target_center -= world_delta;
    }

    /// Centre on `bounds` and zoom so it fills `screen_rect` minus `padding`.
    pub fn fit_to_bounds(&mut self, bounds: &Bounds, screen_rect: Rect, padding: f32) {
        let c = bounds.center();
        self.target_center = Pos2::new(c.x, c.y);

        let padded_w = (screen_rect.width() - 2.0 * padding).max(1.0);
        let padded_h = (screen_rect.height() - 2.0 * padding).max(1.0);
        let zoom_x = padded_w / bounds.width().max(1.0);
        let zoom_y = padded_h / bounds.height().max(1.0);
        self.target_zoom = zoom_x.min(zoom_y).clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom by `factor`, keeping the world point under `screen_pos` fixed.
    pub fn zoom_at(&mut self, factor: f32, screen_pos: Pos2, screen_rect: Rect) {
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - old_zoom).abs() <= 0.001 {
            return;
        }
        let offset = screen_pos - screen_rect.center();
        let shift = offset / old_zoom - offset / new_zoom;
        self.center += shift;
        self.zoom = new_zoom;
        self.target_center = self.center;
        self.target_zoom = new_zoom;
    }

    // =========================================================================
    // TRANSFORMS
    // =========================================================================

    pub fn world_to_screen(&self, world: Pos2, screen_rect: Rect) -> Pos2 {
        screen_rect.center() + (world - self.center) * self.zoom
    }

    pub fn screen_to_world(&self, screen: Pos2, screen_rect: Rect) -> Pos2 {
        self.center + (screen - screen_rect.center()) / self.zoom
    }
}
