//! Terrain classification.

/// What occupies a map cell, as a semantic tag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainTile {
    /// Nothing: outside every room and hallway.
    #[default]
    Empty,
    Floor,
    Wall,
    /// A floor cell holding a key.
    Key,
    Door,
}

impl TerrainTile {
    /// Whether the tile permits movement and lets sight pass through.
    #[inline]
    pub fn traversable(self) -> bool {
        matches!(self, TerrainTile::Floor | TerrainTile::Key | TerrainTile::Door)
    }

    /// Character representation, for debugging dumps.
    pub fn glyph(self) -> char {
        match self {
            TerrainTile::Empty => ' ',
            TerrainTile::Floor => '.',
            TerrainTile::Wall => '#',
            TerrainTile::Key => 'k',
            TerrainTile::Door => '+',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversable_tiles() {
        assert!(TerrainTile::Floor.traversable());
        assert!(TerrainTile::Key.traversable());
        assert!(TerrainTile::Door.traversable());
        assert!(!TerrainTile::Wall.traversable());
        assert!(!TerrainTile::Empty.traversable());
        assert_eq!(TerrainTile::default(), TerrainTile::Empty);
    }
}
