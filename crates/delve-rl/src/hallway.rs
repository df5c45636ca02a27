//! Hallway carving between planned room pairs.
//!
//! A hallway is a strip `size` cells across: its two outer lines are walls
//! and the rest is floor. Strips are carved from wall to wall, so they open
//! doorways into the rooms they join.

use delve_core::{Point, Range, TerrainTile};
use rand::{Rng, RngExt};

use crate::mapgen::{Claim, Draft};
use crate::room::Room;

/// Axis a strip advances along.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// A straight strip of hallway.
#[derive(Copy, Clone, Debug)]
struct Run {
    along: Axis,
    /// Inclusive span across the strip; both ends become walls.
    side: (i32, i32),
    from: i32,
    to: i32,
}

impl Run {
    fn cell(&self, i: i32, j: i32) -> Point {
        match self.along {
            Axis::X => Point::new(i, j),
            Axis::Y => Point::new(j, i),
        }
    }
}

/// Two strips joined by a square corner block.
#[derive(Clone, Debug)]
struct Turn {
    runs: [Run; 2],
    corner: Range,
    /// Column and row of the corner that get walled off.
    outer: Point,
}

impl Draft {
    /// Carve hallways of width `size` for every pending edge: straight ones
    /// for all rooms first, then turning ones.
    pub(crate) fn carve_hallways<R: Rng + ?Sized>(&mut self, size: i32, rng: &mut R) {
        for i in 0..self.rooms.len() {
            for j in self.pending[i].clone() {
                if self.direct_hallway(i, j, size, rng) {
                    self.join(i, j);
                }
            }
        }
        for i in 0..self.rooms.len() {
            for j in self.pending[i].clone() {
                if self.turning_hallway(i, j, size) {
                    self.made_turn = true;
                    self.join(i, j);
                }
            }
        }
    }

    /// Carve a straight hallway if the rooms face each other across a span
    /// at least `size` wide.
    pub(crate) fn direct_hallway<R: Rng + ?Sized>(
        &mut self,
        i: usize,
        j: usize,
        size: i32,
        rng: &mut R,
    ) -> bool {
        let run = {
            let (a, b) = (&self.rooms[i], &self.rooms[j]);
            let across = size - 1;
            let along_x = a.x1 < b.x0 || b.x1 < a.x0;
            let (upper, lower) = if along_x {
                (a.y1.min(b.y1), a.y0.max(b.y0))
            } else {
                (a.x1.min(b.x1), a.x0.max(b.x0))
            };
            if upper - lower < across {
                return false;
            }
            let low_wall = if lower + across == upper {
                lower
            } else {
                rng.random_range(lower..upper - across)
            };
            let (from, to) = if along_x {
                (a.x1.min(b.x1), a.x0.max(b.x0))
            } else {
                (a.y1.min(b.y1), a.y0.max(b.y0))
            };
            Run {
                along: if along_x { Axis::X } else { Axis::Y },
                side: (low_wall, low_wall + across),
                from,
                to,
            }
        };
        self.carve_run(run);
        true
    }

    /// Carve an L-shaped hallway if one of the two candidate corners is free.
    pub(crate) fn turning_hallway(&mut self, i: usize, j: usize, size: i32) -> bool {
        let candidates = {
            let (r1, r2) = (&self.rooms[i], &self.rooms[j]);
            let low_x = if r1.x0 < r2.x0 { r1 } else { r2 };
            let low_y = if r1.y0 < r2.y0 { r1 } else { r2 };
            if low_x.id == low_y.id {
                let high_x = if r1.x0 < r2.x0 { r2 } else { r1 };
                [
                    turn_low_x_high_y(low_x, high_x, size),
                    turn_high_x_low_y(low_x, high_x, size),
                ]
            } else {
                [
                    turn_high_x_high_y(low_x, low_y, size),
                    turn_low_x_low_y(low_x, low_y, size),
                ]
            }
        };
        let Some(turn) = candidates
            .into_iter()
            .flatten()
            .find(|t| self.is_free(t.corner))
        else {
            return false;
        };

        for run in turn.runs {
            self.carve_run(run);
        }
        for p in turn.corner {
            self.claims[p] = Claim::Hall;
            self.tiles[p] = if p.x == turn.outer.x || p.y == turn.outer.y {
                TerrainTile::Wall
            } else {
                TerrainTile::Floor
            };
        }
        true
    }

    fn carve_run(&mut self, run: Run) {
        let step = (run.to - run.from).signum();
        let mut i = run.from;
        loop {
            for j in run.side.0..=run.side.1 {
                let p = run.cell(i, j);
                let wall = j == run.side.0 || j == run.side.1;
                if let Some(c) = self.claims.get_mut(p) {
                    *c = Claim::Hall;
                }
                if let Some(t) = self.tiles.get_mut(p) {
                    *t = if wall {
                        TerrainTile::Wall
                    } else {
                        TerrainTile::Floor
                    };
                }
            }
            if i == run.to {
                break;
            }
            i += step;
        }
    }
}

// The four corner placements. `a` is always the room with the smaller x0.

/// `b` lies beyond `a` on both axes; corner past `a`'s high y edge.
fn turn_low_x_high_y(a: &Room, b: &Room, s: i32) -> Option<Turn> {
    if b.y1 - a.y1 < s - 1 || b.x0 - a.x0 < s - 1 {
        return None;
    }
    let knee_y = a.y1.max(b.y0);
    let knee_x = a.x1.min(b.x0);
    Some(Turn {
        runs: [
            Run {
                along: Axis::Y,
                side: (knee_x - s + 1, knee_x),
                from: knee_y,
                to: a.y1,
            },
            Run {
                along: Axis::X,
                side: (knee_y, knee_y + s - 1),
                from: knee_x,
                to: b.x0,
            },
        ],
        corner: Range::new(knee_x - s + 1, knee_y + 1, knee_x, knee_y + s),
        outer: Point::new(knee_x - s + 1, knee_y + s - 1),
    })
}

/// `b` lies beyond `a` on both axes; corner past `a`'s high x edge.
fn turn_high_x_low_y(a: &Room, b: &Room, s: i32) -> Option<Turn> {
    if b.y0 - a.y0 < s - 1 || b.x1 - a.x1 < s - 1 {
        return None;
    }
    let knee_y = a.y1.min(b.y0);
    let knee_x = a.x1.max(b.x0);
    Some(Turn {
        runs: [
            Run {
                along: Axis::Y,
                side: (knee_x, knee_x + s - 1),
                from: knee_y,
                to: b.y0,
            },
            Run {
                along: Axis::X,
                side: (knee_y - s + 1, knee_y),
                from: knee_x,
                to: a.x1,
            },
        ],
        corner: Range::new(knee_x + 1, knee_y - s + 1, knee_x + s, knee_y),
        outer: Point::new(knee_x + s - 1, knee_y - s + 1),
    })
}

/// `b` has the smaller y0; corner past both high edges.
fn turn_high_x_high_y(a: &Room, b: &Room, s: i32) -> Option<Turn> {
    if a.y1 - b.y1 < s - 1 || b.x1 - a.x1 < s - 1 {
        return None;
    }
    let knee_x = a.x1.max(b.x0);
    let knee_y = a.y0.max(b.y1);
    Some(Turn {
        runs: [
            Run {
                along: Axis::X,
                side: (knee_y, knee_y + s - 1),
                from: knee_x,
                to: a.x1,
            },
            Run {
                along: Axis::Y,
                side: (knee_x, knee_x + s - 1),
                from: knee_y,
                to: b.y1,
            },
        ],
        corner: Range::new(knee_x + 1, knee_y + 1, knee_x + s, knee_y + s),
        outer: Point::new(knee_x + s - 1, knee_y + s - 1),
    })
}

/// `b` has the smaller y0; corner before both low edges.
fn turn_low_x_low_y(a: &Room, b: &Room, s: i32) -> Option<Turn> {
    if a.y0 - b.y0 < s - 1 || b.x0 - a.x0 < s - 1 {
        return None;
    }
    let knee_x = a.x1.min(b.x0);
    let knee_y = a.y0.min(b.y1);
    Some(Turn {
        runs: [
            Run {
                along: Axis::X,
                side: (knee_y - s + 1, knee_y),
                from: knee_x,
                to: b.x0,
            },
            Run {
                along: Axis::Y,
                side: (knee_x - s + 1, knee_x),
                from: knee_y,
                to: a.y0,
            },
        ],
        corner: Range::new(knee_x - s + 1, knee_y - s + 1, knee_x, knee_y),
        outer: Point::new(knee_x - s + 1, knee_y - s + 1),
    })
}
