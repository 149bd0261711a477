//! Grid raycaster: a first-person view and an overhead map of a uniform
//! occupancy grid, rendered by marching rays from one grid-line crossing to
//! the next.
//!
//! ```text
//!   vector ──┬── scene ──┬── raycast ──┐
//!            └── player ─┘             ├── renderer ── canvas
//!   config / error ────────────────────┘      └─────── scaler
//! ```
//!
//! The core (`vector`, `scene`, `raycast`, `player`) is pure and
//! single-threaded per ray; the frame loop lives in the binary.

pub mod canvas;
pub mod config;
pub mod error;
pub mod input;
pub mod player;
pub mod raycast;
pub mod renderer;
pub mod scaler;
pub mod scene;
pub mod vector;

pub use config::Config;
pub use error::{EngineError, Result};
pub use input::Command;
pub use player::Player;
pub use raycast::{RayTrace, cast_ray, hitting_cell, ray_step, snap, trace};
pub use scene::{Occupant, Rgba, Scene, inside_scene, scene_size};
pub use vector::Vec2;
