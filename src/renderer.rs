use rayon::prelude::*;

use crate::canvas::Canvas;
use crate::config::{Config, MinimapConfig, ViewConfig};
use crate::player::Player;
use crate::raycast::{RayTrace, trace};
use crate::scene::{Rgba, Scene};
use crate::vector::Vec2;

const BACKGROUND: Rgba = Rgba::opaque(255, 255, 0);
const MINIMAP_BACKDROP: Rgba = Rgba::new(0, 0, 0, 125);
const MINIMAP_BLOCK: Rgba = Rgba::opaque(255, 0, 0);
const MINIMAP_PLAYER: Rgba = Rgba::opaque(255, 0, 255);
/// Player marker radius, in cells.
const PLAYER_RADIUS: f64 = 0.2;
/// FOV line width, in cells.
const LINE_WIDTH: f64 = 0.03;

/// Casts one ray per column, left to right across the view plane.
pub fn cast_columns(scene: &Scene, player: &Player, view: &ViewConfig) -> Vec<RayTrace> {
    let (left, right) = player.fov_range(view.fov(), view.near_clipping_plane);
    let columns = view.columns;
    (0..columns)
        .into_par_iter()
        .map(|x| {
            let target = left.lerp(right, x as f64 / columns as f64);
            trace(scene, player.pos, target)
        })
        .collect()
}

/// First-person view: one vertical strip per column, shaded by distance.
pub fn draw_3d(canvas: &mut impl Canvas, scene: &Scene, player: &Player, view: &ViewConfig) {
    let (width, height) = canvas.size();
    let (width, height) = (width as f64, height as f64);
    let strip_width = (width / view.columns as f64).ceil();
    let forward = player.forward();

    for (x, hit) in cast_columns(scene, player, view).into_iter().enumerate() {
        let Some(block) = scene.occupant(hit.cell.0, hit.cell.1) else {
            continue;
        };
        let v = hit.point - player.pos;
        let depth = v.dot(forward);
        if depth <= 0.0 {
            continue;
        }
        let t = 1.0 - v.length() / view.far_clipping_plane;
        let strip_height = height / depth;
        canvas.fill_rect(
            x as f64 * strip_width,
            (height - strip_height) * 0.5,
            strip_width,
            strip_height,
            block.shade(t),
        );
    }
}

/// Overhead map at `position` (pixels), `size` pixels across.
pub fn draw_minimap(
    canvas: &mut impl Canvas,
    scene: &Scene,
    player: &Player,
    view: &ViewConfig,
    position: Vec2,
    size: Vec2,
) {
    let scale = size.div_elem(scene.size());
    let to_px = |p: Vec2| position + p.mul_elem(scale);
    let cell_px = scale.x.min(scale.y);

    canvas.fill_rect(position.x, position.y, size.x, size.y, MINIMAP_BACKDROP);

    for (x, y, _) in scene.blocks() {
        let corner = to_px(Vec2::new(x as f64, y as f64));
        canvas.fill_rect(corner.x, corner.y, scale.x, scale.y, MINIMAP_BLOCK);
    }

    let pos = to_px(player.pos);
    canvas.fill_circle(pos, PLAYER_RADIUS * cell_px, MINIMAP_PLAYER);

    let (left, right) = player.fov_range(view.fov(), view.near_clipping_plane);
    let (left, right) = (to_px(left), to_px(right));
    let line_width = LINE_WIDTH * cell_px;
    canvas.stroke_line(left, right, line_width, MINIMAP_PLAYER);
    canvas.stroke_line(pos, left, line_width, MINIMAP_PLAYER);
    canvas.stroke_line(pos, right, line_width, MINIMAP_PLAYER);
}

/// Minimap placement: offset by `margin` of the canvas size, `width_fraction`
/// of the canvas wide, keeping the scene's aspect ratio.
pub fn minimap_rect(
    canvas_size: (usize, usize),
    scene: &Scene,
    minimap: &MinimapConfig,
) -> (Vec2, Vec2) {
    let canvas = Vec2::new(canvas_size.0 as f64, canvas_size.1 as f64);
    let position = canvas * minimap.margin;
    let cell = canvas.x * minimap.width_fraction / scene.size().x.max(1.0);
    (position, scene.size() * cell)
}

pub fn render_frame(canvas: &mut impl Canvas, scene: &Scene, player: &Player, config: &Config) {
    canvas.clear(BACKGROUND);
    draw_3d(canvas, scene, player, &config.view);
    let (position, size) = minimap_rect(canvas.size(), scene, &config.minimap);
    draw_minimap(canvas, scene, player, &config.view, position, size);
}
