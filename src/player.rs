use std::f64::consts::PI;

use crate::scene::Scene;
use crate::vector::Vec2;

/// Default horizontal field of view (radians).
pub const FOV: f64 = PI * 0.5;
/// Distance from the viewer to the projection plane.
pub const NEAR_CLIPPING_PLANE: f64 = 1.0;

/// The viewer: a position in cell units and a heading in radians.
///
/// Heading 0 looks along +x; with y growing downward on screen, positive
/// turns rotate clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub dir: f64,
}

impl Player {
    pub fn new(pos: Vec2, dir: f64) -> Self {
        Self { pos, dir }
    }

    /// Places the player at `fraction` of the scene size on both axes.
    pub fn spawn(scene: &Scene, fraction: f64, dir: f64) -> Self {
        Self::new(scene.size().mul_elem(Vec2::new(fraction, fraction)), dir)
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.dir)
    }

    /// The two ends of the view plane segment at distance `near`.
    ///
    /// Returned left edge first (in screen space), so lerping from the first
    /// to the second sweeps the view left to right.
    pub fn fov_range(&self, fov: f64, near: f64) -> (Vec2, Vec2) {
        let half_width = (fov * 0.5).tan() * near;
        let p = self.pos + self.forward() * near;
        let side = (p - self.pos).rotate90().normalize() * half_width;
        (p - side, p + side)
    }

    pub fn fov_range_default(&self) -> (Vec2, Vec2) {
        self.fov_range(FOV, NEAR_CLIPPING_PLANE)
    }

    pub fn step_forward(&mut self, len: f64) {
        self.pos = self.pos + self.forward() * len;
    }

    pub fn step_backward(&mut self, len: f64) {
        self.pos = self.pos - self.forward() * len;
    }

    pub fn turn(&mut self, delta: f64) {
        self.dir += delta;
    }
}
