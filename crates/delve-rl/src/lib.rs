//! Roguelike utilities for delve: dungeon generation, fog of war and
//! creature behavior.

pub mod behavior;
pub mod fog;
mod hallway;
pub mod mapgen;
pub mod room;

pub use behavior::{BehaviorState, Creature, DETECTION_RADIUS};
pub use fog::{FogOfWar, VISIBILITY_RADIUS, Visibility};
pub use mapgen::{Dungeon, GenConfig, GenError, MapGen, generate};
pub use room::{Room, RoomId};
