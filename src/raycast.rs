//! Grid-aligned ray marching.
//!
//! A ray is advanced from one grid-line crossing to the next until it enters
//! an occupied cell or leaves the scene. Points that sit exactly on a grid
//! line are resolved with a small bias in the direction of travel, which
//! keeps every step moving strictly forward.

use crate::scene::Scene;
use crate::vector::Vec2;

/// Bias applied toward the direction of travel when snapping or flooring.
pub const EPS: f64 = 1e-6;

/// Result of marching a single ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayTrace {
    /// Where the ray stopped: the entry point of the blocking cell, or the
    /// first point outside the scene.
    pub point: Vec2,
    /// The cell entered at `point`. May lie outside the scene.
    pub cell: (i64, i64),
    /// Number of [`ray_step`] calls made.
    pub steps: usize,
}

/// Next grid-line coordinate from `x` when moving by `dx` along that axis.
#[inline]
pub fn snap(x: f64, dx: f64) -> f64 {
    if dx > 0.0 {
        (x + EPS).ceil()
    } else if dx < 0.0 {
        (x - EPS).floor()
    } else {
        x
    }
}

/// Nearest grid-line crossing past `p2` on the line through `p1 -> p2`.
pub fn ray_step(p1: Vec2, p2: Vec2) -> Vec2 {
    let d = p2 - p1;
    if d.x == 0.0 {
        return Vec2::new(p2.x, snap(p2.y, d.y));
    }

    let k = d.y / d.x;
    let c = p1.y - k * p1.x;

    let x3 = snap(p2.x, d.x);
    let mut next = Vec2::new(x3, k * x3 + c);

    if k != 0.0 {
        let y3 = snap(p2.y, d.y);
        let candidate = Vec2::new((y3 - c) / k, y3);
        if p2.distance_to(candidate) < p2.distance_to(next) {
            next = candidate;
        }
    }
    next
}

/// Cell the ray enters at `p2`, travelling from `p1`.
#[inline]
pub fn hitting_cell(p1: Vec2, p2: Vec2) -> (i64, i64) {
    let d = p2 - p1;
    let x = (p2.x + sign(d.x) * EPS).floor();
    let y = (p2.y + sign(d.y) * EPS).floor();
    (x as i64, y as i64)
}

/// Marches from `origin` toward `target` and returns where the ray stops.
pub fn cast_ray(scene: &Scene, origin: Vec2, target: Vec2) -> Vec2 {
    trace(scene, origin, target).point
}

/// Like [`cast_ray`] but also reports the stopping cell and the step count.
///
/// `target` only gives the direction; the march starts in the origin's own
/// cell, so nothing between the origin and the target is skipped. A zero
/// length or non-finite ray never steps and stops at `origin`.
pub fn trace(scene: &Scene, origin: Vec2, target: Vec2) -> RayTrace {
    if target == origin || !origin.is_finite() || !target.is_finite() {
        let cell = (origin.x.floor() as i64, origin.y.floor() as i64);
        return RayTrace {
            point: origin,
            cell,
            steps: 0,
        };
    }

    // Seed a previous sample behind the origin on the same line.
    let mut p1 = origin - (target - origin);
    let mut p2 = origin;
    let mut steps = 0;

    loop {
        let cell = hitting_cell(p1, p2);
        if !cell_in_scene(scene, cell) || scene.is_blocked(cell.0, cell.1) {
            return RayTrace {
                point: p2,
                cell,
                steps,
            };
        }
        let p3 = ray_step(p1, p2);
        steps += 1;
        p1 = p2;
        p2 = p3;
    }
}

#[inline]
fn cell_in_scene(scene: &Scene, (x, y): (i64, i64)) -> bool {
    scene.contains(Vec2::new(x as f64, y as f64))
}

#[inline]
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::scene::BLUE_BLOCK;

    fn grid(width: usize, height: usize, occupied: &[(usize, usize)]) -> Scene {
        let mut rows = vec![vec![None; width]; height];
        for &(x, y) in occupied {
            rows[y][x] = Some(BLUE_BLOCK);
        }
        Scene::new(rows)
    }

    #[test]
    fn snap_moves_past_the_current_line() {
        for x in [-3.0, -0.5, 0.0, 0.25, 1.0, 1.9999999, 7.5] {
            assert!(snap(x, 1.0) > x, "snap({x}, +) did not advance");
            assert!(snap(x, -0.1) < x, "snap({x}, -) did not advance");
            assert_eq!(snap(x, 0.0), x);
        }
        assert_eq!(snap(2.0, 1.0), 3.0);
        assert_eq!(snap(2.0, -1.0), 1.0);
        assert_eq!(snap(2.3, 1.0), 3.0);
        assert_eq!(snap(2.3, -1.0), 2.0);
    }

    #[test]
    fn vertical_ray_keeps_x() {
        let p = ray_step(Vec2::new(0.5, 0.5), Vec2::new(0.5, 0.2));
        assert_eq!(p, Vec2::new(0.5, 0.0));
        let p = ray_step(Vec2::new(0.5, 0.5), Vec2::new(0.5, 1.0));
        assert_eq!(p, Vec2::new(0.5, 2.0));
    }

    #[test]
    fn horizontal_ray_only_crosses_vertical_lines() {
        let p = ray_step(Vec2::new(0.5, 0.5), Vec2::new(0.7, 0.5));
        assert_eq!(p, Vec2::new(1.0, 0.5));
        let p = ray_step(Vec2::new(0.7, 0.5), Vec2::new(0.5, 0.5));
        assert_eq!(p, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn diagonal_step_picks_nearest_crossing() {
        // slope 2: the horizontal line y = 1 comes before x = 1
        let p = ray_step(Vec2::new(0.1, 0.1), Vec2::new(0.2, 0.3));
        assert_abs_diff_eq!(p.y, 1.0);
        assert_abs_diff_eq!(p.x, 0.55, epsilon = 1e-12);
        // slope 0.5: the vertical line x = 1 comes first
        let p = ray_step(Vec2::new(0.1, 0.1), Vec2::new(0.3, 0.2));
        assert_abs_diff_eq!(p.x, 1.0);
        assert_abs_diff_eq!(p.y, 0.55, epsilon = 1e-12);
    }

    #[test]
    fn ray_step_always_advances() {
        let origins = [0.0, 0.5, 1.0, 2.25, 3.0];
        let dirs = [
            (1.0, 0.0),
            (-1.0, 0.0),
            (0.0, 1.0),
            (0.0, -1.0),
            (1.0, 1.0),
            (-1.0, 1.0),
            (0.3, -0.9),
            (-0.7, -0.2),
            (1e-9, 1.0),
            (1.0, 1e-9),
        ];
        for &ox in &origins {
            for &oy in &origins {
                for &(dx, dy) in &dirs {
                    let p1 = Vec2::new(ox, oy);
                    let p2 = p1 + Vec2::new(dx, dy) * 0.37;
                    let p3 = ray_step(p1, p2);
                    assert!(
                        p2.distance_to(p3) > 0.0,
                        "stalled at {p2:?} heading ({dx}, {dy})"
                    );
                }
            }
        }
    }

    #[test]
    fn hitting_cell_attributes_boundary_to_entered_cell() {
        let on_line = Vec2::new(1.0, 0.5);
        assert_eq!(hitting_cell(Vec2::new(0.5, 0.5), on_line), (1, 0));
        assert_eq!(hitting_cell(Vec2::new(1.5, 0.5), on_line), (0, 0));
        let corner = Vec2::new(2.0, 2.0);
        assert_eq!(hitting_cell(Vec2::new(1.0, 1.0), corner), (2, 2));
        assert_eq!(hitting_cell(Vec2::new(3.0, 3.0), corner), (1, 1));
        assert_eq!(hitting_cell(Vec2::new(3.0, 1.0), corner), (1, 2));
    }

    #[test]
    fn stops_at_entry_of_occupied_cell() {
        let scene = grid(3, 3, &[(1, 1)]);
        let hit = trace(&scene, Vec2::new(0.5, 1.5), Vec2::new(0.9, 1.5));
        assert_eq!(hit.cell, (1, 1));
        assert!(hit.point.x >= 1.0 && hit.point.x <= 1.000002);
        assert_eq!(hit.point.y, 1.5);
    }

    #[test]
    fn leaves_through_the_top_on_a_vertical_ray() {
        let scene = grid(3, 3, &[(1, 1)]);
        let hit = trace(&scene, Vec2::new(0.5, 0.5), Vec2::new(0.5, -5.0));
        assert_eq!(hit.point, Vec2::new(0.5, 0.0));
        assert_eq!(hit.cell, (0, -1));
        assert_eq!(hit.steps, 1);
    }

    #[test]
    fn ray_starting_inside_a_block_stops_immediately() {
        let scene = grid(3, 3, &[(1, 1)]);
        let origin = Vec2::new(1.5, 1.5);
        let hit = trace(&scene, origin, Vec2::new(2.5, 2.0));
        assert_eq!(hit.point, origin);
        assert_eq!(hit.steps, 0);
    }

    #[test]
    fn degenerate_ray_returns_origin() {
        let scene = grid(3, 3, &[]);
        let origin = Vec2::new(1.2, 1.7);
        assert_eq!(cast_ray(&scene, origin, origin), origin);
    }

    #[test]
    fn non_finite_ray_returns_without_stepping() {
        let scene = grid(6, 6, &[]);
        let origin = Vec2::new(2.5, 2.5);
        for target in [
            Vec2::new(f64::NAN, f64::NAN),
            Vec2::new(3.0, f64::INFINITY),
            Vec2::new(f64::NEG_INFINITY, 1.0),
        ] {
            let hit = trace(&scene, origin, target);
            assert_eq!(hit.point, origin);
            assert_eq!(hit.steps, 0);
        }
        let hit = trace(&scene, Vec2::new(f64::NAN, 1.0), origin);
        assert_eq!(hit.steps, 0);
    }

    #[test]
    fn march_is_bounded_by_width_plus_height() {
        let scene = grid(5, 4, &[]);
        let bound = scene.width() + scene.height();
        for i in 0..64 {
            let theta = i as f64 / 64.0 * std::f64::consts::TAU;
            for origin in [Vec2::new(0.5, 0.5), Vec2::new(2.0, 2.0), Vec2::new(4.9, 3.1)] {
                let hit = trace(&scene, origin, origin + Vec2::from_angle(theta));
                assert!(hit.steps <= bound, "{} steps at theta {theta}", hit.steps);
                assert!(!scene.contains(Vec2::new(hit.cell.0 as f64, hit.cell.1 as f64)));
            }
        }
    }

    #[test]
    fn target_beyond_wall_still_hits_wall() {
        let scene = grid(6, 1, &[(3, 0)]);
        let hit = trace(&scene, Vec2::new(0.5, 0.5), Vec2::new(5.5, 0.5));
        assert_eq!(hit.cell, (3, 0));
        assert_eq!(hit.point, Vec2::new(3.0, 0.5));
    }
}
