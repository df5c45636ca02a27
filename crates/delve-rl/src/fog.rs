//! Fog of war.
//!
//! [`FogOfWar`] keeps what the avatar sees this turn and what it has ever
//! seen, together with the terrain it saw there. Memory only grows, and
//! only while the fog is on: switching it off and on again keeps what was
//! remembered but adds nothing seen in between.

use delve_core::{Grid, Point, Range, TerrainTile};
use delve_paths::{has_sight, within_radius};

/// Default sight radius of the avatar, in cells.
pub const VISIBILITY_RADIUS: i32 = 15;

/// How a cell should be presented to the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    /// In sight now: live terrain and occupants.
    Visible,
    /// Seen before: only the terrain remembered from then.
    Remembered,
    /// Never seen.
    Hidden,
}

/// Visibility tracker for a single map.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FogOfWar {
    radius: i32,
    enabled: bool,
    memory: Grid<Option<TerrainTile>>,
    visible: Grid<bool>,
}

impl FogOfWar {
    /// A tracker for a `width × height` map with nothing seen yet.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_radius(width, height, VISIBILITY_RADIUS)
    }

    pub fn with_radius(width: i32, height: i32, radius: i32) -> Self {
        Self {
            radius,
            enabled: true,
            memory: Grid::new(width, height, None),
            visible: Grid::new(width, height, false),
        }
    }

    /// Extent of the tracked map.
    pub fn bounds(&self) -> Range {
        self.memory.bounds()
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Recompute what is in sight from `avatar` and remember it. Does
    /// nothing while the fog is off.
    ///
    /// Cells holding [`TerrainTile::Empty`] are never recorded.
    pub fn refresh(&mut self, grid: &Grid<TerrainTile>, avatar: Point) {
        if !self.enabled {
            return;
        }
        self.visible.fill(false);
        for p in grid.bounds() {
            let tile = grid[p];
            if tile == TerrainTile::Empty || !within_radius(avatar, p, self.radius) {
                continue;
            }
            if has_sight(grid, avatar, p) {
                self.visible[p] = true;
                self.memory[p] = Some(tile);
            }
        }
    }

    /// Classify `p` as of the last refresh. With the fog off every cell
    /// reads as visible.
    ///
    /// # Panics
    ///
    /// Panics if `p` lies outside the map.
    pub fn classify(&self, p: Point) -> Visibility {
        if !self.enabled || self.visible[p] {
            Visibility::Visible
        } else if self.memory[p].is_some() {
            Visibility::Remembered
        } else {
            Visibility::Hidden
        }
    }

    /// Terrain remembered at `p`, if it was ever seen.
    pub fn remembered(&self, p: Point) -> Option<TerrainTile> {
        self.memory.at(p).flatten()
    }

    /// Overwrite the remembered terrain at `p` if it was ever seen, as when a
    /// key is picked up.
    pub fn remember(&mut self, p: Point, tile: TerrainTile) {
        if let Some(m) = self.memory.get_mut(p) {
            if m.is_some() {
                *m = Some(tile);
            }
        }
    }

    /// Switch the fog on or off. Switching it on recomputes sight from
    /// `avatar` straight away.
    pub fn set_enabled(&mut self, on: bool, grid: &Grid<TerrainTile>, avatar: Point) {
        self.enabled = on;
        if on {
            self.refresh(grid, avatar);
        }
    }

    pub fn toggle(&mut self, grid: &Grid<TerrainTile>, avatar: Point) {
        self.set_enabled(!self.enabled, grid, avatar);
    }

    /// Whether every internal grid covers exactly the tracked map.
    pub fn is_well_formed(&self) -> bool {
        self.memory.is_well_formed()
            && self.visible.is_well_formed()
            && self.visible.bounds() == self.memory.bounds()
    }

    /// Number of cells ever seen.
    pub fn seen(&self) -> usize {
        self.memory.count_fn(|_, m| m.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 40×11 floor with a wall border and a wall stub at (10, 3..=7).
    fn hall() -> Grid<TerrainTile> {
        Grid::from_fn(40, 11, |p| {
            let border = p.x == 0 || p.y == 0 || p.x == 39 || p.y == 10;
            let stub = p.x == 10 && (3..=7).contains(&p.y);
            if border || stub {
                TerrainTile::Wall
            } else {
                TerrainTile::Floor
            }
        })
    }

    #[test]
    fn nothing_seen_is_hidden() {
        let fog = FogOfWar::new(10, 10);
        assert_eq!(fog.classify(Point::new(3, 3)), Visibility::Hidden);
        assert_eq!(fog.seen(), 0);
    }

    #[test]
    fn seen_cells_are_remembered_after_leaving() {
        let g = hall();
        let mut fog = FogOfWar::new(40, 11);
        fog.refresh(&g, Point::new(5, 5));
        assert_eq!(fog.classify(Point::new(5, 5)), Visibility::Visible);
        fog.refresh(&g, Point::new(25, 5));
        assert_eq!(fog.classify(Point::new(5, 5)), Visibility::Remembered);
        assert_eq!(fog.remembered(Point::new(5, 5)), Some(TerrainTile::Floor));
        assert_eq!(fog.classify(Point::new(25, 5)), Visibility::Visible);
    }

    #[test]
    fn radius_and_walls_limit_sight() {
        let g = hall();
        let mut fog = FogOfWar::new(40, 11);
        fog.refresh(&g, Point::new(5, 5));
        // Beyond the radius.
        assert_eq!(fog.classify(Point::new(30, 5)), Visibility::Hidden);
        // Behind the stub.
        assert_eq!(fog.classify(Point::new(12, 5)), Visibility::Hidden);
        // The stub itself is seen.
        assert_eq!(fog.classify(Point::new(10, 5)), Visibility::Visible);
    }

    #[test]
    fn empty_tiles_are_never_recorded() {
        let mut g = Grid::new(5, 5, TerrainTile::Floor);
        g.set(Point::new(4, 4), TerrainTile::Empty);
        let mut fog = FogOfWar::new(5, 5);
        fog.refresh(&g, Point::new(0, 0));
        assert_eq!(fog.classify(Point::new(4, 4)), Visibility::Hidden);
        assert_eq!(fog.seen(), 24);
    }

    #[test]
    fn toggling_keeps_memory() {
        let g = hall();
        let mut fog = FogOfWar::new(40, 11);
        fog.refresh(&g, Point::new(5, 5));
        let seen = fog.seen();

        fog.toggle(&g, Point::new(5, 5));
        assert!(!fog.enabled());
        assert_eq!(fog.classify(Point::new(35, 5)), Visibility::Visible);

        fog.toggle(&g, Point::new(30, 5));
        assert!(fog.enabled());
        assert_eq!(fog.classify(Point::new(35, 5)), Visibility::Visible);
        assert_eq!(fog.classify(Point::new(5, 5)), Visibility::Remembered);
        assert!(fog.seen() > seen);
    }

    #[test]
    fn nothing_is_recorded_while_off() {
        let g = hall();
        let mut fog = FogOfWar::new(40, 11);
        fog.refresh(&g, Point::new(5, 5));
        let seen = fog.seen();

        fog.set_enabled(false, &g, Point::new(5, 5));
        fog.refresh(&g, Point::new(30, 5));
        assert_eq!(fog.seen(), seen);

        fog.set_enabled(true, &g, Point::new(5, 5));
        assert_eq!(fog.seen(), seen);
        assert_eq!(fog.classify(Point::new(35, 5)), Visibility::Hidden);
    }

    #[test]
    fn remember_only_touches_seen_cells() {
        let g = hall();
        let mut fog = FogOfWar::new(40, 11);
        fog.refresh(&g, Point::new(5, 5));
        fog.remember(Point::new(6, 5), TerrainTile::Key);
        fog.remember(Point::new(30, 5), TerrainTile::Key);
        assert_eq!(fog.remembered(Point::new(6, 5)), Some(TerrainTile::Key));
        assert_eq!(fog.remembered(Point::new(30, 5)), None);
    }
}
