//! Per-cell render snapshot handed to front ends.

use std::fmt;

use delve_core::{Grid, Point, TerrainTile};
use serde::{Deserialize, Serialize};

/// What stands on a visible cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Avatar,
    Creature,
}

/// How one map cell should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// In sight: live terrain and whoever stands there.
    Visible {
        terrain: TerrainTile,
        occupant: Option<Occupant>,
    },
    /// Seen earlier: the terrain as it was then.
    Remembered { terrain: TerrainTile },
    /// Never seen, but a key lies there.
    KeyHint,
    Hidden,
}

impl Cell {
    /// ASCII rendering of the cell.
    pub fn glyph(self) -> char {
        match self {
            Cell::Visible {
                occupant: Some(Occupant::Avatar),
                ..
            } => '@',
            Cell::Visible {
                occupant: Some(Occupant::Creature),
                ..
            } => 'c',
            Cell::Visible { terrain, .. } => terrain.glyph(),
            Cell::Remembered { terrain } => match terrain {
                TerrainTile::Floor => ',',
                t => t.glyph(),
            },
            Cell::KeyHint => '*',
            Cell::Hidden => ' ',
        }
    }
}

/// A full-map view, one [`Cell`] per map cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    cells: Grid<Cell>,
}

impl View {
    pub(crate) fn new(cells: Grid<Cell>) -> Self {
        Self { cells }
    }

    /// The cell at `p`, or `None` outside the map.
    pub fn cell(&self, p: Point) -> Option<Cell> {
        self.cells.at(p)
    }

    pub fn cells(&self) -> &Grid<Cell> {
        &self.cells
    }

    /// One string of glyphs per map row.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .rows()
            .map(|row| row.iter().map(|c| c.glyph()).collect())
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
