//! Dungeon generation.
//!
//! [`MapGen`] scatters non-overlapping rectangular rooms until a target share
//! of the map is covered, links them with a minimum spanning tree over
//! centroid distances (plus a few shortcut edges from leaf rooms), and then
//! carves a hallway for every edge. A draft that leaves an edge uncarved,
//! that never needed a turning hallway, or where a later hallway walled off
//! an earlier doorway, is thrown away and the whole map is drawn again from
//! the same random stream.

use std::fmt;

use delve_core::{Grid, Point, Range, TerrainTile};
use delve_paths::PathRange;
use log::{debug, warn};
use rand::distr::Distribution;
use rand::distr::weighted::{self, WeightedIndex};
use rand::{Rng, RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::room::{Room, RoomId};

/// Smallest room side, walls included.
pub const MIN_ROOM_SIZE: i32 = 5;

/// Hallway widths tried in order, walls included.
const HALLWAY_SIZES: [i32; 2] = [4, 3];

/// Tuning knobs for [`MapGen`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenConfig {
    /// Share of the map that rooms must cover before placement stops.
    pub room_ratio: f64,
    /// Relative weight of each room side length, starting at
    /// [`MIN_ROOM_SIZE`].
    pub room_size_weights: Vec<u32>,
    /// Chance that a leaf room gets a shortcut to its nearest other room.
    pub extra_edge_chance: f64,
    /// Drafts tried before giving up.
    pub max_attempts: usize,
    /// Room rectangles sampled per draft before the draft is abandoned.
    pub max_room_samples: usize,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            room_ratio: 0.5,
            room_size_weights: vec![3, 4, 5, 6, 7, 6, 5, 4, 3, 2, 1],
            extra_edge_chance: 0.7,
            max_attempts: 1000,
            max_room_samples: 50_000,
        }
    }
}

/// Errors that can occur when generating a dungeon.
#[derive(Debug, Clone, PartialEq)]
pub enum GenError {
    /// The map cannot hold a single room.
    TooSmall { width: i32, height: i32 },
    /// The room size weights do not form a distribution.
    RoomSizes(weighted::Error),
    /// Every draft was rejected.
    AttemptsExhausted { attempts: usize },
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { width, height } => write!(
                f,
                "map {width}x{height} too small: both sides must exceed {MIN_ROOM_SIZE}"
            ),
            Self::RoomSizes(e) => write!(f, "invalid room size weights: {e}"),
            Self::AttemptsExhausted { attempts } => {
                write!(f, "no valid dungeon after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for GenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RoomSizes(e) => Some(e),
            _ => None,
        }
    }
}

/// A generated dungeon with its room layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dungeon {
    pub grid: Grid<TerrainTile>,
    /// Rooms with the hallways actually carved between them.
    pub rooms: Vec<Room>,
    /// Drafts drawn, the accepted one included.
    pub attempts: usize,
    /// Share of the map covered by rooms before hallways were carved.
    pub room_ratio: f64,
}

/// Generate a `width × height` dungeon from `seed`.
///
/// The same inputs always produce the same grid.
pub fn generate(width: i32, height: i32, seed: u64) -> Result<Grid<TerrainTile>, GenError> {
    let mut mapgen = MapGen::new(ChaCha8Rng::seed_from_u64(seed));
    Ok(mapgen.dungeon(width, height)?.grid)
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Who owns a cell while a draft is being built.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Claim {
    Free,
    Room(RoomId),
    Hall,
}

/// A map under construction.
pub(crate) struct Draft {
    pub(crate) tiles: Grid<TerrainTile>,
    pub(crate) claims: Grid<Claim>,
    pub(crate) rooms: Vec<Room>,
    /// Planned edges still waiting for a hallway, by room index.
    pub(crate) pending: Vec<Vec<usize>>,
    pub(crate) made_turn: bool,
}

impl Draft {
    pub(crate) fn new(width: i32, height: i32) -> Self {
        Self {
            tiles: Grid::new(width, height, TerrainTile::Empty),
            claims: Grid::new(width, height, Claim::Free),
            rooms: Vec::new(),
            pending: Vec::new(),
            made_turn: false,
        }
    }

    /// Whether `rng` lies inside the map and nothing has claimed it.
    pub(crate) fn is_free(&self, rng: Range) -> bool {
        rng.in_range(self.claims.bounds()) && rng.iter().all(|p| self.claims[p] == Claim::Free)
    }

    /// Claim and draw a room: a wall ring around a floor interior.
    pub(crate) fn add_room(&mut self, room: Room) {
        for p in room.range() {
            self.claims[p] = Claim::Room(room.id);
            self.tiles[p] = if room.is_border(p) {
                TerrainTile::Wall
            } else {
                TerrainTile::Floor
            };
        }
        self.rooms.push(room);
        self.pending.push(Vec::new());
    }

    /// Plan a hallway between two rooms.
    pub(crate) fn link(&mut self, a: usize, b: usize) {
        self.pending[a].push(b);
        self.pending[b].push(a);
    }

    /// Record that the planned hallway between two rooms has been carved.
    pub(crate) fn join(&mut self, a: usize, b: usize) {
        self.pending[a].retain(|&r| r != b);
        self.pending[b].retain(|&r| r != a);
        let (ida, idb) = (self.rooms[a].id, self.rooms[b].id);
        self.rooms[a].connections.push(idb);
        self.rooms[b].connections.push(ida);
    }
}

/// Why a draft was thrown away.
#[derive(Debug)]
enum Rejection {
    RoomSamples,
    NoTurn,
    Unconnected(RoomId),
    CutOff(Point),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomSamples => f.write_str("room placement stalled"),
            Self::NoTurn => f.write_str("no turning hallway"),
            Self::Unconnected(id) => write!(f, "{id} left unconnected"),
            Self::CutOff(p) => write!(f, "{p} cannot be walked to from room 1"),
        }
    }
}

// ---------------------------------------------------------------------------
// MapGen
// ---------------------------------------------------------------------------

/// Dungeon generator drawing from a caller-supplied random source.
pub struct MapGen<R: Rng> {
    pub rng: R,
    pub config: GenConfig,
    pr: PathRange,
}

impl<R: Rng> MapGen<R> {
    /// Create a generator with the default configuration.
    pub fn new(rng: R) -> Self {
        Self::with_config(rng, GenConfig::default())
    }

    pub fn with_config(rng: R, config: GenConfig) -> Self {
        Self {
            rng,
            config,
            pr: PathRange::default(),
        }
    }

    /// Generate a `width × height` dungeon, redrawing rejected drafts up to
    /// `config.max_attempts` times.
    pub fn dungeon(&mut self, width: i32, height: i32) -> Result<Dungeon, GenError> {
        if width <= MIN_ROOM_SIZE || height <= MIN_ROOM_SIZE {
            return Err(GenError::TooSmall { width, height });
        }
        let sizes =
            WeightedIndex::new(&self.config.room_size_weights).map_err(GenError::RoomSizes)?;

        for attempt in 1..=self.config.max_attempts {
            match self.draft(width, height, &sizes) {
                Ok((draft, room_ratio)) => {
                    debug!(
                        "dungeon {width}x{height}: {} rooms after {attempt} attempt(s)",
                        draft.rooms.len()
                    );
                    return Ok(Dungeon {
                        grid: draft.tiles,
                        rooms: draft.rooms,
                        attempts: attempt,
                        room_ratio,
                    });
                }
                Err(reason) => debug!("dungeon draft {attempt} rejected: {reason}"),
            }
        }
        warn!(
            "gave up on {width}x{height} dungeon after {} attempts",
            self.config.max_attempts
        );
        Err(GenError::AttemptsExhausted {
            attempts: self.config.max_attempts,
        })
    }

    fn draft(
        &mut self,
        width: i32,
        height: i32,
        sizes: &WeightedIndex<u32>,
    ) -> Result<(Draft, f64), Rejection> {
        let mut draft = Draft::new(width, height);
        let room_ratio = self.place_rooms(&mut draft, sizes)?;
        self.span_rooms(&mut draft);
        for size in HALLWAY_SIZES {
            draft.carve_hallways(size, &mut self.rng);
        }
        self.accept(&draft)?;
        Ok((draft, room_ratio))
    }

    /// Check a carved draft: a turning hallway was needed, every planned
    /// edge got its hallway, and every open cell can be walked to from the
    /// first room.
    fn accept(&mut self, draft: &Draft) -> Result<(), Rejection> {
        if !draft.made_turn {
            return Err(Rejection::NoTurn);
        }
        if let Some(i) = draft.pending.iter().position(|p| !p.is_empty()) {
            return Err(Rejection::Unconnected(draft.rooms[i].id));
        }
        let Some(first) = draft.rooms.first() else {
            return Ok(());
        };
        let start = Point::new(first.x0 + 1, first.y0 + 1);
        let mut reached = Grid::new(draft.tiles.width(), draft.tiles.height(), false);
        for p in self.pr.terrain_reachable(&draft.tiles, start) {
            reached[p] = true;
        }
        match draft
            .tiles
            .iter()
            .find(|(p, t)| t.traversable() && !reached[*p])
        {
            Some((p, _)) => Err(Rejection::CutOff(p)),
            None => Ok(()),
        }
    }

    /// Sample rooms until they cover `config.room_ratio` of the map. Returns
    /// the covered share.
    fn place_rooms(
        &mut self,
        draft: &mut Draft,
        sizes: &WeightedIndex<u32>,
    ) -> Result<f64, Rejection> {
        let (width, height) = (draft.tiles.width(), draft.tiles.height());
        let area = f64::from(width * height);
        let mut filled = 0;
        let mut samples = 0;

        while f64::from(filled) / area < self.config.room_ratio {
            if samples == self.config.max_room_samples {
                return Err(Rejection::RoomSamples);
            }
            samples += 1;

            let origin = Point::new(
                self.rng.random_range(0..width - MIN_ROOM_SIZE),
                self.rng.random_range(0..height - MIN_ROOM_SIZE),
            );
            let w = MIN_ROOM_SIZE + sizes.sample(&mut self.rng) as i32;
            let h = MIN_ROOM_SIZE + sizes.sample(&mut self.rng) as i32;
            let room = Room::new(RoomId(draft.rooms.len() as u32 + 1), origin, w, h);
            if draft.is_free(room.range()) {
                filled += w * h;
                draft.add_room(room);
            }
        }
        Ok(f64::from(filled) / area)
    }

    /// Plan a spanning tree over the rooms, then shortcut edges from leaves.
    fn span_rooms(&mut self, draft: &mut Draft) {
        let n = draft.rooms.len();
        if n == 0 {
            return;
        }
        let mut connected = vec![0];
        let mut unconnected: Vec<usize> = (1..n).collect();

        while !unconnected.is_empty() {
            // (index into unconnected, connected room, distance)
            let mut best: Option<(usize, usize, f64)> = None;
            for (ui, &u) in unconnected.iter().enumerate() {
                for &c in &connected {
                    let d = draft.rooms[u].distance(&draft.rooms[c]);
                    if best.is_none_or(|(_, _, min)| d < min) {
                        best = Some((ui, c, d));
                    }
                }
            }
            let Some((ui, c, _)) = best else {
                break;
            };
            let u = unconnected.remove(ui);
            draft.link(c, u);
            connected.push(u);
        }

        for &room in &connected {
            if draft.pending[room].len() > 1 {
                continue;
            }
            let roll: f64 = self.rng.random();
            if roll >= self.config.extra_edge_chance {
                continue;
            }
            let Some(&neighbor) = draft.pending[room].first() else {
                continue;
            };
            let mut best: Option<(usize, f64)> = None;
            for &other in &connected {
                if other == room || draft.pending[room].contains(&other) {
                    continue;
                }
                let d = draft.rooms[room].distance(&draft.rooms[other]);
                if best.is_none_or(|(_, min)| d < min) {
                    best = Some((other, d));
                }
            }
            let Some((other, d)) = best else {
                continue;
            };
            if d < draft.rooms[neighbor].distance(&draft.rooms[other]) {
                draft.link(room, other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_paths::reachable;
    use std::collections::{HashMap, HashSet, VecDeque};

    fn dungeon(width: i32, height: i32, seed: u64) -> Dungeon {
        MapGen::new(ChaCha8Rng::seed_from_u64(seed))
            .dungeon(width, height)
            .unwrap()
    }

    #[test]
    fn same_seed_same_map() {
        let a = generate(60, 40, 1234).unwrap();
        let b = generate(60, 40, 1234).unwrap();
        assert_eq!(a, b);
        let c = generate(60, 40, 4321).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn rooms_do_not_overlap_and_cover_half() {
        for seed in 0..8 {
            let d = dungeon(60, 60, seed);
            assert!(d.room_ratio >= 0.5 && d.room_ratio < 1.0, "{}", d.room_ratio);
            for (i, a) in d.rooms.iter().enumerate() {
                assert!(a.range().in_range(d.grid.bounds()));
                for b in &d.rooms[i + 1..] {
                    assert!(!a.range().overlaps(b.range()), "{} / {}", a.id, b.id);
                }
            }
        }
    }

    #[test]
    fn every_room_is_connected() {
        for seed in 0..8 {
            let d = dungeon(60, 60, seed);
            assert!(d.rooms.len() > 1);
            assert!(d.rooms.iter().all(|r| !r.connections.is_empty()));

            // The carved hallway graph spans all rooms.
            let by_id: HashMap<RoomId, &Room> = d.rooms.iter().map(|r| (r.id, r)).collect();
            let mut seen = HashSet::from([d.rooms[0].id]);
            let mut queue = VecDeque::from([d.rooms[0].id]);
            while let Some(id) = queue.pop_front() {
                for &next in &by_id[&id].connections {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            assert_eq!(seen.len(), d.rooms.len(), "seed {seed}");
        }
    }

    #[test]
    fn every_open_cell_is_walkable_from_the_first_room() {
        // The listed seeds used to wall off a doorway with a later hallway.
        for seed in (0..24).chain([283, 294, 307, 369]) {
            let d = dungeon(60, 60, seed);
            let first = &d.rooms[0];
            let open: HashSet<Point> =
                reachable(&d.grid, Point::new(first.x0 + 1, first.y0 + 1))
                    .into_iter()
                    .collect();
            for (p, t) in d.grid.iter() {
                assert!(!t.traversable() || open.contains(&p), "seed {seed}: {p}");
            }
        }
        let d = dungeon(80, 30, 53);
        let first = &d.rooms[0];
        let open = reachable(&d.grid, Point::new(first.x0 + 1, first.y0 + 1));
        assert_eq!(
            open.len(),
            d.grid.count_fn(|_, t| t.traversable()),
            "80x30 seed 53"
        );
    }

    fn two_rooms(second: Point) -> Draft {
        let mut d = Draft::new(20, 20);
        d.add_room(Room::new(RoomId(1), Point::new(0, 0), 5, 5));
        d.add_room(Room::new(RoomId(2), second, 5, 5));
        d.link(0, 1);
        d
    }

    #[test]
    fn straight_only_drafts_are_rejected() {
        let mut mg = MapGen::new(ChaCha8Rng::seed_from_u64(0));
        let mut d = two_rooms(Point::new(8, 0));
        d.carve_hallways(4, &mut mg.rng);
        assert!(d.pending.iter().all(|p| p.is_empty()));
        assert!(!d.made_turn);
        assert!(matches!(mg.accept(&d), Err(Rejection::NoTurn)));
    }

    #[test]
    fn sealed_rooms_are_rejected() {
        let mut mg = MapGen::new(ChaCha8Rng::seed_from_u64(0));
        let mut d = two_rooms(Point::new(10, 10));
        // Recorded as joined, but nothing was carved between them.
        d.join(0, 1);
        d.made_turn = true;
        match mg.accept(&d) {
            Err(Rejection::CutOff(p)) => assert!(d.rooms[1].range().contains(p)),
            other => panic!("unexpected {other:?}"),
        }

        let mut d = two_rooms(Point::new(10, 10));
        d.carve_hallways(3, &mut mg.rng);
        assert!(d.made_turn);
        assert!(mg.accept(&d).is_ok());
    }

    #[test]
    fn hallways_leave_the_rooms() {
        let d = dungeon(60, 60, 99);
        let in_room = |p: Point| d.rooms.iter().any(|r| r.range().contains(p));
        let hall_floor = d
            .grid
            .count_fn(|p, t| *t == TerrainTile::Floor && !in_room(p));
        assert!(hall_floor > 0);
    }

    #[test]
    fn too_small_maps_are_rejected() {
        assert_eq!(
            generate(5, 40, 1),
            Err(GenError::TooSmall {
                width: 5,
                height: 40
            })
        );
    }

    #[test]
    fn bad_weights_are_rejected() {
        let config = GenConfig {
            room_size_weights: vec![0, 0, 0],
            ..GenConfig::default()
        };
        let mut mg = MapGen::with_config(ChaCha8Rng::seed_from_u64(0), config);
        assert!(matches!(mg.dungeon(30, 30), Err(GenError::RoomSizes(_))));
    }

    #[test]
    fn attempts_are_bounded() {
        let config = GenConfig {
            room_ratio: 0.99,
            max_attempts: 3,
            max_room_samples: 50,
            ..GenConfig::default()
        };
        let mut mg = MapGen::with_config(ChaCha8Rng::seed_from_u64(0), config);
        assert_eq!(
            mg.dungeon(20, 20),
            Err(GenError::AttemptsExhausted { attempts: 3 })
        );
    }
}
