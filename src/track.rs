use glam::Vec2;
use serde::Serialize;

use crate::config::*;

pub const LANE_COUNT: usize = 3;

/// Axis-aligned rectangle in screen space (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect of size `w`×`h` horizontally centered on `center_x` whose bottom edge sits at `bottom`.
    pub fn from_bottom_center(center_x: f32, bottom: f32, w: f32, h: f32) -> Self {
        Self::new(center_x - w / 2.0, bottom - h, w, h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Open-interval overlap: rects that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.x, self.right()), p.y.clamp(self.y, self.bottom()))
    }

    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        center.distance_squared(self.closest_point(center)) < radius * radius
    }
}

/// Track bounds derived from the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrackGeometry {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl TrackGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        // Degenerate viewports still have to produce left < right and top < bottom
        let width = width.max(1.0);
        let height = height.max(1.0);
        let scale = (width.min(height) / LAYOUT_REFERENCE).clamp(SCALE_MIN, SCALE_MAX);

        let top = (height * 0.14).round();
        let bottom = (height * 0.92).round().max(top + 1.0);
        let left = (width * 0.24).round();
        let right = (width * 0.76).round().max(left + 1.0);

        Self {
            width,
            height,
            scale,
            top,
            bottom,
            left,
            right,
        }
    }

    /// Horizontal center of a lane, clamped to the valid lane range.
    pub fn lane_x(&self, lane: usize) -> f32 {
        let lane = lane.min(LANE_COUNT - 1);
        let t = (1 + lane * 2) as f32 / (LANE_COUNT * 2) as f32;
        self.left + (self.right - self.left) * t
    }

    /// Ground line the player's feet rest on.
    pub fn ground(&self) -> f32 {
        self.bottom
    }

    pub fn obstacle_spawn_y(&self) -> f32 {
        self.top - OBSTACLE_SPAWN_OFFSET * self.scale
    }

    pub fn coin_spawn_y(&self) -> f32 {
        self.top - COIN_SPAWN_OFFSET * self.scale
    }

    pub fn obstacle_exit_y(&self) -> f32 {
        self.height + OBSTACLE_EXIT_MARGIN * self.scale
    }

    pub fn coin_exit_y(&self) -> f32 {
        self.height + COIN_EXIT_MARGIN * self.scale
    }
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_for_reference_viewport() {
        let g = TrackGeometry::new(1280.0, 720.0);
        assert_eq!(g.scale, 1.0);
        assert_eq!(g.top, 101.0);
        assert_eq!(g.bottom, 662.0);
        assert_eq!(g.left, 307.0);
        assert_eq!(g.right, 973.0);
        assert_eq!(g.lane_x(1), 640.0);
        assert!(g.lane_x(0) < g.lane_x(1) && g.lane_x(1) < g.lane_x(2));
    }

    #[test]
    fn scale_is_clamped() {
        assert_eq!(TrackGeometry::new(200.0, 300.0).scale, SCALE_MIN);
        assert_eq!(TrackGeometry::new(4000.0, 3000.0).scale, SCALE_MAX);
        let tiny = TrackGeometry::new(0.0, 0.0);
        assert!(tiny.left < tiny.right);
        assert!(tiny.top < tiny.bottom);
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&a));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
        assert!(a.overlaps(&Rect::new(9.9, 9.9, 10.0, 10.0)));
    }

    #[test]
    fn circle_test_uses_closest_point() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.intersects_circle(Vec2::new(5.0, 5.0), 1.0));
        assert!(r.intersects_circle(Vec2::new(13.0, 5.0), 4.0));
        assert!(!r.intersects_circle(Vec2::new(14.0, 14.0), 5.0));
    }
}
