//! Session configuration.

use delve_rl::GenConfig;
use serde::{Deserialize, Serialize};

/// Everything needed to start a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub creature_count: usize,
    /// Keys placed on the map; collecting all of them wins.
    pub key_count: usize,
    /// Starting and maximum health.
    pub max_health: i32,
    /// Random cells tried per spawn before giving up.
    pub spawn_attempts: usize,
    /// Start with the fog of war on.
    pub fog: bool,
    /// Dungeon generator settings.
    pub mapgen: GenConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 60,
            height: 60,
            creature_count: 5,
            key_count: 5,
            max_health: 3,
            spawn_attempts: 10_000,
            fog: true,
            mapgen: GenConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Default configuration with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Minimum Euclidean distance between the avatar's starting cell and
    /// any creature or key.
    pub fn spawn_distance(&self) -> i32 {
        self.width.min(self.height) / 4
    }
}
