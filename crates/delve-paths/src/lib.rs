//! Spatial queries for delve terrain grids.
//!
//! This crate answers the read-only questions the generator, the fog of war
//! and creature AI ask about a [`Grid<TerrainTile>`](delve_core::Grid):
//!
//! - **A\*** shortest paths ([`find_path`], [`PathRange::astar_path`])
//! - **Reachability** flood fill ([`reachable`], [`PathRange::cc_map`])
//! - **Line of sight** between cell centres ([`has_sight`])
//!
//! Search algorithms operate through [`PathRange`], which owns and reuses
//! internal caches so that repeated queries incur zero allocations after
//! warm-up.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | connected components |
//! | [`WeightedPather`] : [`Pather`] | (edge costs) |
//! | [`AstarPather`] : [`WeightedPather`] | A* |

mod astar;
mod cc;
mod distance;
mod neighbors;
mod pathrange;
mod sight;
mod terrain;
mod traits;

pub use distance::{chebyshev, euclidean_sq, manhattan, within_radius};
pub use neighbors::Neighbors;
pub use pathrange::{PathRange, UNREACHABLE};
pub use sight::has_sight;
pub use terrain::{TerrainPather, find_path, reachable};
pub use traits::{AstarPather, Pather, WeightedPather};
