//! Creature behavior: a two-state Patrol/Chase machine.
//!
//! The state is re-evaluated from scratch on every tick. A creature chases
//! when its target is within [`DETECTION_RADIUS`] and in sight; otherwise it
//! patrols, finishing any path left over from a chase before wandering.

use std::collections::VecDeque;

use delve_core::{Direction, Grid, Point, TerrainTile};
use delve_paths::{PathRange, has_sight, within_radius};
use log::trace;
use rand::{Rng, RngExt};

/// Maximum Euclidean distance at which a creature notices its target.
pub const DETECTION_RADIUS: i32 = 10;

/// What a creature is currently doing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorState {
    #[default]
    Patrol,
    Chase,
}

/// A wandering creature.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Creature {
    pub pos: Point,
    pub state: BehaviorState,
    /// Steps still to take, next one first.
    path: VecDeque<Point>,
}

impl Creature {
    pub fn new(pos: Point) -> Self {
        Self {
            pos,
            state: BehaviorState::Patrol,
            path: VecDeque::new(),
        }
    }

    /// Move the creature elsewhere, dropping its plans.
    pub fn respawn(&mut self, pos: Point) {
        self.pos = pos;
        self.state = BehaviorState::Patrol;
        self.path.clear();
    }

    /// Steps still queued.
    pub fn path(&self) -> impl Iterator<Item = Point> + '_ {
        self.path.iter().copied()
    }

    /// Advance one tick toward or around `target`. `others` holds the
    /// positions of the other creatures, which this one never steps onto.
    /// Chase paths are searched with the caches in `pr`.
    ///
    /// Returns whether the creature ends the tick on `target`.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        pr: &mut PathRange,
        grid: &Grid<TerrainTile>,
        target: Point,
        others: &[Point],
        rng: &mut R,
    ) -> bool {
        let next = if within_radius(self.pos, target, DETECTION_RADIUS)
            && has_sight(grid, self.pos, target)
        {
            BehaviorState::Chase
        } else {
            BehaviorState::Patrol
        };
        let changed = next != self.state;
        if changed {
            trace!("creature at {}: {:?} -> {next:?}", self.pos, self.state);
        }
        self.state = next;

        match self.state {
            BehaviorState::Chase => {
                if changed || self.path.is_empty() || self.path.back() != Some(&target) {
                    self.plan(pr, grid, target);
                }
                self.follow(grid, others);
            }
            BehaviorState::Patrol if !self.path.is_empty() => self.follow(grid, others),
            BehaviorState::Patrol => self.wander(grid, others, rng),
        }
        self.pos == target
    }

    fn plan(&mut self, pr: &mut PathRange, grid: &Grid<TerrainTile>, target: Point) {
        self.path = pr.terrain_path(grid, self.pos, target).into_iter().skip(1).collect();
    }

    /// Take the next queued step unless another creature stands on it.
    fn follow(&mut self, grid: &Grid<TerrainTile>, others: &[Point]) {
        let Some(&step) = self.path.front() else {
            return;
        };
        if !step.is_adjacent(self.pos) || !grid.get(step).is_some_and(|t| t.traversable()) {
            self.path.clear();
            return;
        }
        if others.contains(&step) {
            return;
        }
        self.pos = step;
        self.path.pop_front();
    }

    /// Stay put or take a random free cardinal step, uniformly.
    fn wander<R: Rng + ?Sized>(&mut self, grid: &Grid<TerrainTile>, others: &[Point], rng: &mut R) {
        let mut choices = vec![self.pos];
        choices.extend(Direction::ALL.iter().map(|&d| self.pos.step(d)).filter(|q| {
            grid.get(*q).is_some_and(|t| t.traversable()) && !others.contains(q)
        }));
        self.pos = choices[rng.random_range(0..choices.len())];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// A walled `w × h` room.
    fn room(w: i32, h: i32) -> Grid<TerrainTile> {
        Grid::from_fn(w, h, |p| {
            if p.x == 0 || p.y == 0 || p.x == w - 1 || p.y == h - 1 {
                TerrainTile::Wall
            } else {
                TerrainTile::Floor
            }
        })
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn chases_on_first_tick_in_range() {
        let g = room(20, 20);
        let mut c = Creature::new(Point::new(2, 2));
        let mut pr = PathRange::default();
        let caught = c.tick(&mut pr, &g, Point::new(8, 2), &[], &mut rng());
        assert!(!caught);
        assert_eq!(c.state, BehaviorState::Chase);
        assert_eq!(c.pos, Point::new(3, 2));
        assert_eq!(c.path().last(), Some(Point::new(8, 2)));
    }

    #[test]
    fn stops_chasing_when_wall_interposed() {
        let mut g = room(20, 20);
        let mut c = Creature::new(Point::new(2, 2));
        let mut pr = PathRange::default();
        let target = Point::new(8, 2);
        c.tick(&mut pr, &g, target, &[], &mut rng());
        assert_eq!(c.state, BehaviorState::Chase);

        g.set(Point::new(5, 2), TerrainTile::Wall);
        c.tick(&mut pr, &g, target, &[], &mut rng());
        assert_eq!(c.state, BehaviorState::Patrol);
        // The leftover path is still followed until it hits the wall.
        assert_eq!(c.pos, Point::new(4, 2));
        c.tick(&mut pr, &g, target, &[], &mut rng());
        assert_eq!(c.pos, Point::new(4, 2));
        assert_eq!(c.path().count(), 0);
    }

    #[test]
    fn out_of_range_patrols() {
        let g = room(30, 30);
        let mut c = Creature::new(Point::new(2, 2));
        let mut pr = PathRange::default();
        let start = c.pos;
        c.tick(&mut pr, &g, Point::new(20, 20), &[], &mut rng());
        assert_eq!(c.state, BehaviorState::Patrol);
        assert!(c.pos == start || c.pos.is_adjacent(start));
        assert!(g[c.pos].traversable());
    }

    #[test]
    fn wander_never_enters_walls_or_creatures() {
        // Two pens split by a wall column; the target sits out of sight.
        let g = Grid::from_fn(12, 4, |p| {
            if p.x == 0 || p.y == 0 || p.x == 5 || p.x == 11 || p.y == 3 {
                TerrainTile::Wall
            } else {
                TerrainTile::Floor
            }
        });
        let mut r = rng();
        let mut c = Creature::new(Point::new(1, 1));
        let mut pr = PathRange::default();
        let other = Point::new(2, 1);
        for _ in 0..50 {
            c.tick(&mut pr, &g, Point::new(8, 2), &[other], &mut r);
            assert_eq!(c.state, BehaviorState::Patrol);
            assert_ne!(c.pos, other);
            assert!(g[c.pos].traversable());
        }
    }

    #[test]
    fn blocked_step_stays_queued() {
        let g = room(20, 20);
        let mut c = Creature::new(Point::new(2, 2));
        let mut pr = PathRange::default();
        let blocker = Point::new(3, 2);
        c.tick(&mut pr, &g, Point::new(8, 2), &[blocker], &mut rng());
        assert_eq!(c.state, BehaviorState::Chase);
        assert_eq!(c.pos, Point::new(2, 2));
        assert_eq!(c.path().next(), Some(blocker));
        c.tick(&mut pr, &g, Point::new(8, 2), &[], &mut rng());
        assert_eq!(c.pos, blocker);
    }

    #[test]
    fn replans_when_target_moves() {
        let g = room(20, 20);
        let mut c = Creature::new(Point::new(2, 2));
        let mut pr = PathRange::default();
        c.tick(&mut pr, &g, Point::new(8, 2), &[], &mut rng());
        c.tick(&mut pr, &g, Point::new(8, 5), &[], &mut rng());
        assert_eq!(c.path().last(), Some(Point::new(8, 5)));
    }

    #[test]
    fn reports_reaching_target() {
        let g = room(10, 10);
        let mut c = Creature::new(Point::new(2, 2));
        let mut pr = PathRange::default();
        assert!(c.tick(&mut pr, &g, Point::new(3, 2), &[], &mut rng()));
        assert_eq!(c.pos, Point::new(3, 2));
    }

    #[test]
    fn respawn_resets() {
        let g = room(20, 20);
        let mut c = Creature::new(Point::new(2, 2));
        let mut pr = PathRange::default();
        c.tick(&mut pr, &g, Point::new(8, 2), &[], &mut rng());
        c.respawn(Point::new(15, 15));
        assert_eq!(c, Creature::new(Point::new(15, 15)));
    }

    #[test]
    fn same_seed_same_walk() {
        let g = room(30, 30);
        let walk = |seed| {
            let mut r = ChaCha8Rng::seed_from_u64(seed);
            let mut c = Creature::new(Point::new(5, 5));
            let mut pr = PathRange::default();
            (0..40)
                .map(|_| {
                    c.tick(&mut pr, &g, Point::new(28, 28), &[], &mut r);
                    c.pos
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(walk(3), walk(3));
    }
}
