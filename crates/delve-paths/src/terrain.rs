//! Queries over a [`TerrainTile`] grid.

use delve_core::{Grid, Point, TerrainTile};

use crate::traits::{AstarPather, Pather, WeightedPather};
use crate::{Neighbors, PathRange, manhattan};

/// Cardinal movement over traversable terrain, one unit per step.
pub struct TerrainPather<'a> {
    grid: &'a Grid<TerrainTile>,
}

impl<'a> TerrainPather<'a> {
    pub fn new(grid: &'a Grid<TerrainTile>) -> Self {
        Self { grid }
    }
}

impl Pather for TerrainPather<'_> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        let mut nb = Neighbors::new();
        buf.extend_from_slice(
            nb.cardinal(p, |q| self.grid.get(q).is_some_and(|t| t.traversable())),
        );
    }
}

impl WeightedPather for TerrainPather<'_> {
    fn cost(&self, _from: Point, _to: Point) -> i32 {
        1
    }
}

impl AstarPather for TerrainPather<'_> {
    fn estimate(&self, from: Point, to: Point) -> i32 {
        manhattan(from, to)
    }
}

impl PathRange {
    /// Shortest 4-connected path from `start` to `goal` over traversable
    /// tiles, both endpoints included. Empty when the goal cannot be
    /// reached. The range is first fitted to `grid`; caches are kept when
    /// the grid size does not change.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint lies outside the grid.
    pub fn terrain_path(
        &mut self,
        grid: &Grid<TerrainTile>,
        start: Point,
        goal: Point,
    ) -> Vec<Point> {
        assert!(
            grid.contains(start) && grid.contains(goal),
            "path query {start} -> {goal} outside grid {}",
            grid.bounds()
        );
        self.fit(grid);
        self.astar_path(&TerrainPather::new(grid), start, goal)
            .unwrap_or_default()
    }

    /// Every cell reachable from `start` by cardinal steps over traversable
    /// tiles, `start` included.
    pub fn terrain_reachable(&mut self, grid: &Grid<TerrainTile>, start: Point) -> Vec<Point> {
        self.fit(grid);
        self.cc_map(&TerrainPather::new(grid), start)
    }

    fn fit(&mut self, grid: &Grid<TerrainTile>) {
        if self.range() != grid.bounds() {
            self.set_range(grid.bounds());
        }
    }
}

/// One-off [`PathRange::terrain_path`] with fresh caches.
pub fn find_path(grid: &Grid<TerrainTile>, start: Point, goal: Point) -> Vec<Point> {
    PathRange::new(grid.bounds()).terrain_path(grid, start, goal)
}

/// One-off [`PathRange::terrain_reachable`] with fresh caches.
pub fn reachable(grid: &Grid<TerrainTile>, start: Point) -> Vec<Point> {
    PathRange::new(grid.bounds()).terrain_reachable(grid, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Parse rows of `#`, `.`, `+`, `k` and spaces.
    fn parse(rows: &[&str]) -> Grid<TerrainTile> {
        let h = rows.len() as i32;
        let w = rows[0].len() as i32;
        Grid::from_fn(w, h, |p| match rows[p.y as usize].as_bytes()[p.x as usize] {
            b'#' => TerrainTile::Wall,
            b'.' => TerrainTile::Floor,
            b'+' => TerrainTile::Door,
            b'k' => TerrainTile::Key,
            _ => TerrainTile::Empty,
        })
    }

    const MAZE: [&str; 7] = [
        "#########",
        "#...#...#",
        "#.#.#.#.#",
        "#.#...#.#",
        "#.#####+#",
        "#..k....#",
        "#########",
    ];

    #[test]
    fn path_is_valid_walk() {
        let g = parse(&MAZE);
        let (a, b) = (Point::new(1, 1), Point::new(7, 1));
        let path = find_path(&g, a, b);
        assert_eq!(path.first(), Some(&a));
        assert_eq!(path.last(), Some(&b));
        for w in path.windows(2) {
            assert!(w[0].is_adjacent(w[1]));
        }
        assert!(path.iter().all(|p| g[*p].traversable()));
        // Shortest is along the top corridor, not round through the door.
        assert_eq!(path.len(), 11);
    }

    #[test]
    fn start_equals_goal() {
        let g = parse(&MAZE);
        let p = Point::new(3, 5);
        assert_eq!(find_path(&g, p, p), vec![p]);
    }

    #[test]
    fn walls_and_empty_are_not_goals() {
        let g = parse(&MAZE);
        assert!(find_path(&g, Point::new(1, 1), Point::new(2, 2)).is_empty());
        assert!(find_path(&g, Point::new(1, 1), Point::new(0, 0)).is_empty());
    }

    #[test]
    fn path_found_exactly_when_reachable() {
        let g = parse(&[
            "#######",
            "#..#..#",
            "#..#..#",
            "#######",
        ]);
        let start = Point::new(1, 1);
        let oracle: HashSet<Point> = reachable(&g, start).into_iter().collect();
        for p in g.bounds() {
            let path = find_path(&g, start, p);
            let expect = g[p].traversable() && oracle.contains(&p);
            assert_eq!(!path.is_empty(), expect, "{p}");
        }
    }

    #[test]
    fn reused_range_matches_fresh_searches() {
        let g = parse(&MAZE);
        let mut pr = PathRange::default();
        for goal in [Point::new(7, 1), Point::new(3, 5), Point::new(2, 2), Point::new(5, 3)] {
            let start = Point::new(1, 1);
            assert_eq!(pr.terrain_path(&g, start, goal), find_path(&g, start, goal));
        }
        assert_eq!(pr.range(), g.bounds());

        // Refitting to a smaller grid keeps working.
        let small = parse(&["#####", "#...#", "#####"]);
        let path = pr.terrain_path(&small, Point::new(1, 1), Point::new(3, 1));
        assert_eq!(path.len(), 3);
        assert_eq!(pr.terrain_reachable(&small, Point::new(2, 1)).len(), 3);
    }

    #[test]
    #[should_panic(expected = "outside grid")]
    fn out_of_range_query_panics() {
        let g = parse(&MAZE);
        find_path(&g, Point::new(1, 1), Point::new(-1, 1));
    }
}
