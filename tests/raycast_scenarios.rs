use std::f64::consts::{FRAC_PI_2, PI, TAU};

use approx::{assert_abs_diff_eq, assert_relative_eq};

use grid_raycaster::scene::{BLUE_BLOCK, default_palette};
use grid_raycaster::{
    Player, Scene, Vec2, cast_ray, hitting_cell, inside_scene, ray_step, scene_size, snap, trace,
};

fn three_by_three_center_block() -> Scene {
    let q = Some(BLUE_BLOCK);
    Scene::new(vec![
        vec![None, None, None],
        vec![None, q, None],
        vec![None, None, None],
    ])
}

#[test]
fn ray_along_middle_row_stops_at_center_block() {
    let scene = three_by_three_center_block();
    let origin = Vec2::new(0.5, 1.5);
    let p = cast_ray(&scene, origin, Vec2::new(2.5, 1.5));

    assert!(p.x >= 1.0 && p.x <= 1.000002, "x = {}", p.x);
    assert_eq!(p.y, 1.5);
    assert_eq!(hitting_cell(origin, p), (1, 1));
}

#[test]
fn ray_along_top_row_passes_the_block() {
    let scene = three_by_three_center_block();
    let origin = Vec2::new(0.5, 0.5);
    let hit = trace(&scene, origin, Vec2::new(2.5, 0.5));
    assert_eq!(hit.point, Vec2::new(3.0, 0.5));
    assert_eq!(hit.cell, (3, 0));
    assert_eq!(hit.steps, 3);
}

#[test]
fn vertical_ray_exits_through_top_boundary() {
    let scene = three_by_three_center_block();
    let origin = Vec2::new(0.5, 0.5);
    let target = Vec2::new(0.5, -5.0);

    // every sample keeps x = 0.5
    let mut p1 = origin - (target - origin);
    let mut p2 = origin;
    for _ in 0..3 {
        let p3 = ray_step(p1, p2);
        assert_eq!(p3.x, 0.5);
        p1 = p2;
        p2 = p3;
    }

    let p = cast_ray(&scene, origin, target);
    assert_eq!(p, Vec2::new(0.5, 0.0));
    assert!(!inside_scene(&scene, Vec2::new(0.0, -1.0)));
}

#[test]
fn vertical_ray_downward_hits_block_top() {
    let scene = three_by_three_center_block();
    let p = cast_ray(&scene, Vec2::new(1.5, 0.25), Vec2::new(1.5, 9.0));
    assert_eq!(p, Vec2::new(1.5, 1.0));
}

#[test]
fn diagonal_through_corner_enters_block() {
    let scene = three_by_three_center_block();
    // passes exactly through the grid corner (1, 1)
    let hit = trace(&scene, Vec2::new(0.5, 0.5), Vec2::new(0.75, 0.75));
    assert_eq!(hit.cell, (1, 1));
    assert_relative_eq!(hit.point.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(hit.point.y, 1.0, epsilon = 1e-9);
}

#[test]
fn snap_contract() {
    for i in -40..40 {
        let x = i as f64 * 0.25;
        assert!(snap(x, 0.5) > x);
        assert!(snap(x, -0.5) < x);
        assert_eq!(snap(x, 0.0), x);
    }
}

#[test]
fn every_ray_terminates_within_width_plus_height_steps() {
    let scene = Scene::parse(
        "##########\n\
         #........#\n\
         #..#.....#\n\
         #.....#..#\n\
         #........#\n\
         ##########",
        &default_palette(),
    )
    .expect("scene should parse");
    let bound = scene.width() + scene.height();

    let open = Scene::new(vec![vec![None; 10]; 6]);
    for (s, label) in [(&scene, "walled"), (&open, "open")] {
        for i in 0..360 {
            let theta = i as f64 / 360.0 * TAU;
            for origin in [Vec2::new(1.5, 1.5), Vec2::new(5.0, 2.0), Vec2::new(8.9, 4.1)] {
                let hit = trace(s, origin, origin + Vec2::from_angle(theta) * 0.5);
                assert!(
                    hit.steps <= bound,
                    "{label}: {} steps from {origin:?} at {theta}",
                    hit.steps
                );
            }
        }
    }
}

#[test]
fn bounds_are_half_open_and_stable() {
    let scene = Scene::new(vec![vec![None; 5], vec![None; 2]]);
    let size = scene_size(&scene);
    assert_eq!(size, Vec2::new(5.0, 2.0));
    assert_eq!(scene_size(&scene), size);

    for (p, inside) in [
        (Vec2::new(0.0, 0.0), true),
        (Vec2::new(4.999999, 1.999999), true),
        (Vec2::new(5.0, 0.0), false),
        (Vec2::new(0.0, 2.0), false),
        (Vec2::new(-1e-12, 0.0), false),
        (Vec2::new(4.5, 1.5), true),
    ] {
        assert_eq!(inside_scene(&scene, p), inside, "{p:?}");
    }
}

#[test]
fn short_rows_read_as_empty_during_a_cast() {
    // row 1 is only one cell long; the ray runs past its end
    let q = Some(BLUE_BLOCK);
    let scene = Scene::new(vec![vec![q, q, q, q, q], vec![None], vec![q, q, q, q, q]]);
    let hit = trace(&scene, Vec2::new(0.5, 1.5), Vec2::new(1.5, 1.5));
    assert_eq!(hit.point, Vec2::new(5.0, 1.5));
    assert_eq!(hit.cell, (5, 1));
}

#[test]
fn fov_range_for_viewer_facing_east() {
    let player = Player::new(Vec2::new(5.0, 5.0), 0.0);
    let (a, b) = player.fov_range(FRAC_PI_2, 1.0);
    let center = Vec2::new(6.0, 5.0);
    let half = (PI / 4.0).tan();
    assert_abs_diff_eq!(a.distance_to(center), half, epsilon = 1e-12);
    assert_abs_diff_eq!(b.distance_to(center), half, epsilon = 1e-12);
    assert_abs_diff_eq!(a.x, 6.0, epsilon = 1e-12);
    assert_abs_diff_eq!(b.x, 6.0, epsilon = 1e-12);
    assert_abs_diff_eq!(a.y + b.y, 10.0, epsilon = 1e-12);
}

#[test]
fn builtin_level_contains_every_cast() {
    let scene = Scene::builtin();
    let player = Player::spawn(&scene, 0.73, PI * 1.25);
    let (left, right) = player.fov_range_default();
    for x in 0..300 {
        let target = left.lerp(right, x as f64 / 300.0);
        let hit = trace(&scene, player.pos, target);
        // the level is walled in, so every ray stops on a block
        assert!(scene.is_blocked(hit.cell.0, hit.cell.1), "column {x}");
        assert!(hit.point.distance_to(player.pos) > 0.0);
    }
}
