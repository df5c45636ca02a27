//! Rectangular rooms placed by the dungeon generator.

use std::fmt;

use delve_core::{Point, Range};

/// Room identifier. Ids are assigned from 1 in placement order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room {}", self.0)
    }
}

/// An axis-aligned room. Bounds are inclusive and include the wall ring.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    pub id: RoomId,
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    /// Rooms joined to this one by a carved hallway.
    pub connections: Vec<RoomId>,
}

impl Room {
    /// A `width × height` room with its low corner at `origin`.
    pub fn new(id: RoomId, origin: Point, width: i32, height: i32) -> Self {
        Self {
            id,
            x0: origin.x,
            y0: origin.y,
            x1: origin.x + width - 1,
            y1: origin.y + height - 1,
            connections: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0 + 1
    }

    /// Cells covered by the room, walls included, as a half-open range.
    pub fn range(&self) -> Range {
        Range::new(self.x0, self.y0, self.x1 + 1, self.y1 + 1)
    }

    /// Whether `p` lies on the wall ring.
    pub fn is_border(&self, p: Point) -> bool {
        p.x == self.x0 || p.x == self.x1 || p.y == self.y0 || p.y == self.y1
    }

    /// Integer centre used for spanning-tree distances.
    pub fn centroid(&self) -> Point {
        Point::new(self.x0 + self.width() / 2, self.y0 + self.height() / 2)
    }

    /// Euclidean distance between centroids.
    pub fn distance(&self, other: &Room) -> f64 {
        let d = self.centroid() - other.centroid();
        f64::from(d.x).hypot(f64::from(d.y))
    }
}
