//! **delve-core**: shared types for the delve dungeon crawler.
//!
//! This crate provides the foundational types used across the *delve*
//! crates: geometry primitives, cardinal directions, an owned generic grid
//! and the terrain classification every other layer reasons about.

pub mod geom;
pub mod grid;
pub mod tile;

pub use geom::{Direction, Point, Range};
pub use grid::Grid;
pub use tile::TerrainTile;
