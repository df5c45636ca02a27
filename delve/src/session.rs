//! Core session state and the turn loop.

use std::fmt;

use delve_core::{Direction, Grid, Point, TerrainTile};
use delve_paths::{PathRange, euclidean_sq};
use delve_rl::{BehaviorState, Creature, FogOfWar, MapGen, Room, Visibility};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{Rng, RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::journal::{EntryStyle, Journal};
use crate::view::{Cell, Occupant, View};

/// Index of a creature in the session's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub usize);

/// A player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    Wait,
    /// Walk to a known cell, one turn per step.
    Travel(Point),
    ToggleFog,
}

impl Command {
    /// Command bound to a key: `w a s d` move, space waits, `0` toggles the
    /// fog.
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            'w' => Some(Self::Move(Direction::North)),
            'a' => Some(Self::Move(Direction::West)),
            's' => Some(Self::Move(Direction::South)),
            'd' => Some(Self::Move(Direction::East)),
            ' ' => Some(Self::Wait),
            '0' => Some(Self::ToggleFog),
            _ => None,
        }
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

/// Something that happened during a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    KeyFound { at: Point, keys: usize },
    Hurt { by: CreatureId, health: i32 },
    Won,
    Lost,
}

/// Search caches reused from turn to turn. They hold no game state, so they
/// are never saved, clone empty and always compare equal.
#[derive(Default)]
pub(crate) struct PathCache(PathRange);

impl Clone for PathCache {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for PathCache {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl fmt::Debug for PathCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PathCache")
    }
}

/// One game: dungeon, avatar, creatures, keys and fog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) grid: Grid<TerrainTile>,
    pub(crate) rooms: Vec<Room>,
    pub(crate) avatar: Point,
    pub(crate) creatures: Vec<Creature>,
    /// Order creatures act in; reshuffled after every tick.
    pub(crate) order: Vec<CreatureId>,
    pub(crate) health: i32,
    pub(crate) keys_found: usize,
    pub(crate) turn: u64,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) fog: FogOfWar,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) journal: Journal,
    #[serde(skip)]
    pub(crate) pr: PathCache,
}

impl Session {
    /// Generate a dungeon and populate it.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut mapgen = MapGen::with_config(rng, config.mapgen.clone());
        let dungeon = mapgen.dungeon(config.width, config.height)?;
        let mut rng = mapgen.rng;
        let mut grid = dungeon.grid;
        let attempts = config.spawn_attempts;

        let avatar = random_floor(&grid, &mut rng, attempts, |_| true)
            .ok_or(SessionError::NoSpawnPoint { what: "the avatar" })?;

        let far = far_from(avatar, config.spawn_distance());
        let mut creatures: Vec<Creature> = Vec::with_capacity(config.creature_count);
        for _ in 0..config.creature_count {
            let pos = random_floor(&grid, &mut rng, attempts, |p| {
                far(p) && creatures.iter().all(|c| c.pos != p)
            })
            .ok_or(SessionError::NoSpawnPoint { what: "a creature" })?;
            creatures.push(Creature::new(pos));
        }
        for _ in 0..config.key_count {
            let pos = random_floor(&grid, &mut rng, attempts, |p| {
                far(p) && creatures.iter().all(|c| c.pos != p)
            })
            .ok_or(SessionError::NoSpawnPoint { what: "a key" })?;
            grid[pos] = TerrainTile::Key;
        }

        let mut fog = FogOfWar::new(config.width, config.height);
        fog.set_enabled(config.fog, &grid, avatar);

        let mut journal = Journal::new();
        journal.log(&format!(
            "find the {} keys hidden in the dungeon.",
            config.key_count
        ));
        debug!(
            "session seed {}: {} rooms, avatar at {avatar}",
            config.seed,
            dungeon.rooms.len()
        );

        Ok(Self {
            order: (0..creatures.len()).map(CreatureId).collect(),
            health: config.max_health,
            config,
            grid,
            rooms: dungeon.rooms,
            avatar,
            creatures,
            keys_found: 0,
            turn: 0,
            outcome: None,
            fog,
            rng,
            journal,
            pr: PathCache::default(),
        })
    }

    /// Apply one command. Finished games ignore every command.
    pub fn apply(&mut self, cmd: Command) -> Vec<Event> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        match cmd {
            Command::Move(dir) => {
                let to = self.avatar.step(dir);
                if !self.grid.get(to).is_some_and(|t| t.traversable()) {
                    self.journal
                        .log_styled("you cannot go there.", EntryStyle::Refused);
                    return Vec::new();
                }
                self.avatar = to;
                self.end_turn()
            }
            Command::Wait => self.end_turn(),
            Command::Travel(goal) => self.travel(goal),
            Command::ToggleFog => {
                self.fog.toggle(&self.grid, self.avatar);
                let msg = if self.fog.enabled() {
                    "the fog settles again."
                } else {
                    "the fog lifts."
                };
                self.journal.log(msg);
                Vec::new()
            }
        }
    }

    /// Walk toward `goal` over known terrain, one turn per step, stopping
    /// early on any event or when a creature gives chase.
    fn travel(&mut self, goal: Point) -> Vec<Event> {
        if !self.grid.contains(goal) || self.fog.classify(goal) == Visibility::Hidden {
            self.journal
                .log_styled("you do not know the way there.", EntryStyle::Refused);
            return Vec::new();
        }
        let known = self.known_terrain();
        let path = self.pr.0.terrain_path(&known, self.avatar, goal);
        if path.len() < 2 {
            self.journal
                .log_styled("you do not know the way there.", EntryStyle::Refused);
            return Vec::new();
        }

        let mut events = Vec::new();
        for step in path.into_iter().skip(1) {
            if !self.grid[step].traversable() {
                break;
            }
            self.avatar = step;
            events.extend(self.end_turn());
            let chased = self
                .creatures
                .iter()
                .any(|c| c.state == BehaviorState::Chase);
            if !events.is_empty() || chased {
                break;
            }
        }
        events
    }

    /// Terrain as the player knows it: live where visible, remembered where
    /// seen before, empty elsewhere.
    fn known_terrain(&self) -> Grid<TerrainTile> {
        Grid::from_fn(self.grid.width(), self.grid.height(), |p| {
            match self.fog.classify(p) {
                Visibility::Visible => self.grid[p],
                Visibility::Remembered => self.fog.remembered(p).unwrap_or_default(),
                Visibility::Hidden => TerrainTile::Empty,
            }
        })
    }

    /// Resolve the avatar's cell, let the creatures act, then advance the
    /// turn.
    fn end_turn(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.resolve_avatar_cell(&mut events);
        if self.outcome.is_none() {
            self.tick_creatures(&mut events);
        }
        self.fog.refresh(&self.grid, self.avatar);
        self.turn += 1;
        self.journal.new_turn();
        events
    }

    fn resolve_avatar_cell(&mut self, events: &mut Vec<Event>) {
        if let Some(i) = self.creatures.iter().position(|c| c.pos == self.avatar) {
            self.hurt(CreatureId(i), events);
            if self.outcome.is_some() {
                return;
            }
        }
        if self.grid[self.avatar] == TerrainTile::Key {
            self.pick_key(events);
        }
    }

    /// Every creature acts once, in the current order, skipping its tick a
    /// quarter of the time. At most one collision is resolved.
    fn tick_creatures(&mut self, events: &mut Vec<Event>) {
        let mut hit = None;
        for k in 0..self.order.len() {
            let CreatureId(i) = self.order[k];
            if self.rng.random_range(0..4) == 0 {
                continue;
            }
            let others: Vec<Point> = self
                .creatures
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, c)| c.pos)
                .collect();
            if self.creatures[i].tick(
                &mut self.pr.0,
                &self.grid,
                self.avatar,
                &others,
                &mut self.rng,
            ) {
                hit = Some(CreatureId(i));
            }
        }
        if let Some(id) = hit {
            self.hurt(id, events);
        }
        self.order.shuffle(&mut self.rng);
    }

    fn hurt(&mut self, by: CreatureId, events: &mut Vec<Event>) {
        self.health -= 1;
        info!("creature {} hits the avatar; health {}", by.0, self.health);
        self.journal
            .log_styled("a creature bites you!", EntryStyle::Hurt);
        events.push(Event::Hurt {
            by,
            health: self.health,
        });
        if self.health <= 0 {
            self.finish(Outcome::Lost, events);
            return;
        }
        self.respawn(by);
    }

    /// Move a creature to a random free floor cell away from the avatar, or
    /// anywhere free if no such cell turns up.
    fn respawn(&mut self, id: CreatureId) {
        let far = far_from(self.avatar, self.config.spawn_distance());
        let avatar = self.avatar;
        let creatures = &self.creatures;
        let free = |p: Point| p != avatar && creatures.iter().all(|c| c.pos != p);
        let attempts = self.config.spawn_attempts;
        let spot = random_floor(&self.grid, &mut self.rng, attempts, |p| far(p) && free(p))
            .or_else(|| random_floor(&self.grid, &mut self.rng, attempts, free));
        if let Some(pos) = spot {
            self.creatures[id.0].respawn(pos);
        }
    }

    fn pick_key(&mut self, events: &mut Vec<Event>) {
        let at = self.avatar;
        self.grid[at] = TerrainTile::Floor;
        self.fog.remember(at, TerrainTile::Floor);
        self.keys_found += 1;
        self.health = (self.health + 1).min(self.config.max_health);
        info!("key {} of {} found at {at}", self.keys_found, self.config.key_count);
        self.journal.log_styled(
            &format!(
                "you found a key ({}/{}).",
                self.keys_found, self.config.key_count
            ),
            EntryStyle::Key,
        );
        events.push(Event::KeyFound {
            at,
            keys: self.keys_found,
        });
        if self.keys_found >= self.config.key_count {
            self.finish(Outcome::Won, events);
        }
    }

    fn finish(&mut self, outcome: Outcome, events: &mut Vec<Event>) {
        info!("game over after {} turns: {outcome:?}", self.turn);
        self.outcome = Some(outcome);
        let (msg, event) = match outcome {
            Outcome::Won => ("you hold every key. You win!", Event::Won),
            Outcome::Lost => ("you collapse. You lose.", Event::Lost),
        };
        self.journal.log_styled(msg, EntryStyle::Ending);
        events.push(event);
    }

    /// What the player sees of every cell.
    pub fn view(&self) -> View {
        View::new(Grid::from_fn(
            self.grid.width(),
            self.grid.height(),
            |p| match self.fog.classify(p) {
                Visibility::Visible => Cell::Visible {
                    terrain: self.grid[p],
                    occupant: self.occupant(p),
                },
                Visibility::Remembered => Cell::Remembered {
                    terrain: self.fog.remembered(p).unwrap_or_default(),
                },
                Visibility::Hidden if self.grid[p] == TerrainTile::Key => Cell::KeyHint,
                Visibility::Hidden => Cell::Hidden,
            },
        ))
    }

    fn occupant(&self, p: Point) -> Option<Occupant> {
        if p == self.avatar {
            Some(Occupant::Avatar)
        } else if self.creatures.iter().any(|c| c.pos == p) {
            Some(Occupant::Creature)
        } else {
            None
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid<TerrainTile> {
        &self.grid
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn avatar(&self) -> Point {
        self.avatar
    }

    pub fn creatures(&self) -> impl Iterator<Item = (CreatureId, &Creature)> + '_ {
        self.creatures
            .iter()
            .enumerate()
            .map(|(i, c)| (CreatureId(i), c))
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn keys_found(&self) -> usize {
        self.keys_found
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn fog_enabled(&self) -> bool {
        self.fog.enabled()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

/// Predicate for cells at least `dist` away from `origin`.
fn far_from(origin: Point, dist: i32) -> impl Fn(Point) -> bool {
    let min_sq = i64::from(dist) * i64::from(dist);
    move |p| euclidean_sq(origin, p) >= min_sq
}

/// Sample random cells until one is plain floor and passes `accept`.
fn random_floor<R: Rng + ?Sized>(
    grid: &Grid<TerrainTile>,
    rng: &mut R,
    attempts: usize,
    accept: impl Fn(Point) -> bool,
) -> Option<Point> {
    for _ in 0..attempts {
        let p = Point::new(
            rng.random_range(0..grid.width()),
            rng.random_range(0..grid.height()),
        );
        if grid[p] == TerrainTile::Floor && accept(p) {
            return Some(p);
        }
    }
    None
}
