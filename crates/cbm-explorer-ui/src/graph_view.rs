//! Graph canvas painter
//!
//! Paints a `GraphCanvas` with egui's painter and turns clicks into
//! `TapNode` / `TapEdge` events. Hidden nodes and edges are skipped both when
//! painting and when hit-testing, so a filtered-out element can't be tapped.

use cbm_explorer::{Bounds, GraphCanvas, Rgb};
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2};

use crate::camera::Camera2D;

const NODE_RADIUS: f32 = 18.0;
const ARROW_SIZE: f32 = 8.0;
const EDGE_WIDTH: f32 = 1.5;
/// Screen-space tolerance for clicking an edge.
const EDGE_HIT_DISTANCE: f32 = 6.0;
/// Labels are dropped below this zoom to keep dense graphs legible.
const LABEL_MIN_ZOOM: f32 = 0.35;

/// A click that landed on a graph element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphAction {
    TapNode(String),
    TapEdge(String),
}

#[derive(Debug, Default)]
pub struct GraphView {
    camera: Camera2D,
    /// Viewport the camera was last fitted to.
    fitted: Option<Bounds>,
    fit_requested: bool,
}

pub fn to_color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

impl GraphView {
    /// Refit to the canvas viewport on the next frame even if it is unchanged.
    pub fn request_fit(&mut self) {
        self.fit_requested = true;
    }

    pub fn ui(&mut self, ui: &mut Ui, canvas: &GraphCanvas) -> Option<GraphAction> {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;

        let first_fit = self.fitted.is_none() && canvas.viewport().is_some();
        if self.fit_requested || canvas.viewport() != self.fitted {
            if let Some(bounds) = canvas.viewport() {
                self.camera.fit_to_bounds(&bounds, rect, 0.0);
                if first_fit {
                    self.camera.snap_to_target();
                }
            }
            self.fitted = canvas.viewport();
            self.fit_requested = false;
        }

        let dt = ui.input(|i| i.stable_dt).min(0.1);
        self.camera.update(dt);

        if response.dragged() {
            self.camera.pan(response.drag_delta());
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                if let Some(pos) = response.hover_pos() {
                    self.camera.zoom_at(1.0 + scroll * 0.001, pos, rect);
                }
            }
        }

        painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);
        if canvas.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No elements to show",
                FontId::proportional(14.0),
                ui.visuals().weak_text_color(),
            );
            return None;
        }

        let zoom = self.camera.zoom();
        let radius = (NODE_RADIUS * zoom).max(3.0);
        let edge_color = to_color(cbm_explorer::canvas::EDGE_COLOR);

        // Edges first so nodes sit on top.
        for edge in canvas.visible_edges() {
            let (Some(from), Some(to)) = (
                self.screen_pos(canvas, &edge.source, rect),
                self.screen_pos(canvas, &edge.target, rect),
            ) else {
                continue;
            };
            let dir = to - from;
            if dir.length() <= radius * 2.0 {
                continue;
            }
            let dir = dir.normalized();
            let start = from + dir * radius;
            let tip = to - dir * radius;
            painter.line_segment([start, tip], Stroke::new(EDGE_WIDTH, edge_color));
            draw_arrow_head(&painter, tip, dir, zoom, edge_color);
        }

        let label_color = ui.visuals().text_color();
        for node in canvas.visible_nodes() {
            let Some(center) = self.screen_pos(canvas, &node.id, rect) else {
                continue;
            };
            let style = canvas.node_style(node);
            painter.circle_filled(center, radius, to_color(style.fill));
            if let Some(border) = style.border {
                painter.circle_stroke(center, radius, Stroke::new(style.border_width, to_color(border)));
            }
            if zoom >= LABEL_MIN_ZOOM {
                painter.text(
                    center + Vec2::new(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    &node.label,
                    FontId::proportional(11.0),
                    label_color,
                );
            }
        }

        if self.camera.is_animating() {
            ui.ctx().request_repaint();
        }

        if !response.clicked() {
            return None;
        }
        let pos = response.interact_pointer_pos()?;
        self.hit_node(canvas, pos, rect, radius)
            .map(GraphAction::TapNode)
            .or_else(|| self.hit_edge(canvas, pos, rect).map(GraphAction::TapEdge))
    }

    fn screen_pos(&self, canvas: &GraphCanvas, id: &str, rect: Rect) -> Option<Pos2> {
        let p = canvas.position(id)?;
        Some(self.camera.world_to_screen(Pos2::new(p.x, p.y), rect))
    }

    fn hit_node(&self, canvas: &GraphCanvas, pos: Pos2, rect: Rect, radius: f32) -> Option<String> {
        canvas
            .visible_nodes()
            .filter_map(|n| self.screen_pos(canvas, &n.id, rect).map(|c| (n, c.distance(pos))))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(n, _)| n.id.clone())
    }

    fn hit_edge(&self, canvas: &GraphCanvas, pos: Pos2, rect: Rect) -> Option<String> {
        canvas
            .visible_edges()
            .filter_map(|e| {
                let a = self.screen_pos(canvas, &e.source, rect)?;
                let b = self.screen_pos(canvas, &e.target, rect)?;
                Some((e, distance_to_segment(pos, a, b)))
            })
            .filter(|(_, d)| *d <= EDGE_HIT_DISTANCE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e.id.clone())
    }
}

fn draw_arrow_head(painter: &egui::Painter, tip: Pos2, dir: Vec2, zoom: f32, color: Color32) {
    let size = (ARROW_SIZE * zoom).max(3.0);
    let perp = Vec2::new(-dir.y, dir.x);
    let points = vec![
        tip,
        tip - dir * size + perp * size * 0.5,
        tip - dir * size - perp * size * 0.5,
    ];
    painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_segment() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Pos2::new(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Pos2::new(2.0, 2.0), a, a), 8f32.sqrt());
    }

    #[test]
    fn test_to_color() {
        assert_eq!(to_color(Rgb::hex(0xfb8500)), Color32::from_rgb(0xfb, 0x85, 0x00));
    }
}
