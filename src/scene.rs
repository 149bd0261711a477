use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::vector::Vec2;

/// Block color, each channel in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[u8; 4]")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Scales the color channels by `t` in `[0, 1]`, leaving alpha untouched.
    pub fn shade(self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let f = |c: u8| (c as f64 * t).round() as u8;
        Self::new(f(self.r), f(self.g), f(self.b), self.a)
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

/// Content of one cell: `None` is empty, `Some` blocks rays.
pub type Occupant = Option<Rgba>;

/// The default block color.
pub const BLUE_BLOCK: Rgba = Rgba::opaque(0, 0, 255);

/// Glyph -> block color lookup used by [`Scene::parse`].
pub type Palette = HashMap<char, Rgba>;

pub fn default_palette() -> Palette {
    HashMap::from([('#', BLUE_BLOCK)])
}

/// Occupancy grid of unit cells, row-major with `rows[y][x]`.
///
/// Rows may be ragged. The scene is `max row length` wide and `row count`
/// tall; cells past the end of a short row read as empty. The size is
/// computed once on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    rows: Vec<Vec<Occupant>>,
    size: Vec2,
}

impl Scene {
    pub fn new(rows: Vec<Vec<Occupant>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let size = Vec2::new(width as f64, rows.len() as f64);
        Self { rows, size }
    }

    /// `(max row length, row count)`.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.size.x as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Half-open containment: `0 <= x < width && 0 <= y < height`.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        0.0 <= p.x && p.x < self.size.x && 0.0 <= p.y && p.y < self.size.y
    }

    /// Occupant of cell `(x, y)`. Out of bounds and missing ragged cells are empty.
    pub fn occupant(&self, x: i64, y: i64) -> Occupant {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .flatten()
    }

    #[inline]
    pub fn is_blocked(&self, x: i64, y: i64) -> bool {
        self.occupant(x, y).is_some()
    }

    /// Iterates `(x, y, color)` for every occupied cell.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize, Rgba)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, cell)| cell.map(|c| (x, y, c)))
        })
    }

    /// Parses a text map: `.` and space are empty, other glyphs come from `palette`.
    pub fn parse(text: &str, palette: &Palette) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let used = lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);

        let mut rows = Vec::with_capacity(used);
        for (li, line) in lines[..used].iter().enumerate() {
            let mut row = Vec::with_capacity(line.len());
            for (ci, glyph) in line.trim_end_matches('\r').chars().enumerate() {
                let cell = match glyph {
                    '.' | ' ' => None,
                    g => Some(*palette.get(&g).ok_or(EngineError::UnknownGlyph {
                        glyph: g,
                        line: li + 1,
                        column: ci + 1,
                    })?),
                };
                row.push(cell);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(EngineError::EmptyScene);
        }
        Ok(Self::new(rows))
    }

    /// The 20x20 demo level.
    pub fn builtin() -> Self {
        let rows = BUILTIN_MAP
            .iter()
            .map(|line| {
                line.bytes()
                    .map(|b| (b == b'#').then_some(BLUE_BLOCK))
                    .collect()
            })
            .collect();
        Self::new(rows)
    }
}

/// Free helper mirroring [`Scene::size`].
#[inline]
pub fn scene_size(scene: &Scene) -> Vec2 {
    scene.size()
}

/// Free helper mirroring [`Scene::contains`].
#[inline]
pub fn inside_scene(scene: &Scene, p: Vec2) -> bool {
    scene.contains(p)
}

const BUILTIN_MAP: [&str; 20] = [
    "####################",
    "#........##........#",
    "#........##........#",
    "#..####..##..####..#",
    "#..####..##..####..#",
    "#..................#",
    "#..................#",
    "###..####..####..###",
    "###..####..####..###",
    "#..................#",
    "#..................#",
    "#..####..##..####..#",
    "#..####..##..####..#",
    "#........##........#",
    "#........##........#",
    "###..##########..###",
    "###..##########..###",
    "#..................#",
    "#..................#",
    "####################",
];
