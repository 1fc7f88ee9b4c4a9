//! # Room Plans
//!
//! A room the builder is laying out: its rectangle, whether it has walls, and
//! the doors punched so far against a target door count.

use crate::{DelveResult, DungeonRng, Map, Position, Rect, Tile};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a room inside its [`Builder`](crate::Builder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub usize);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room #{}", self.0)
    }
}

/// A soon-to-be room on a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPlan {
    rect: Rect,
    has_walls: bool,
    doors_target: u32,
    doors: Vec<Position>,
}

impl RoomPlan {
    /// Plans a room between two opposite corners, walls included if any.
    pub fn new(corner1: Position, corner2: Position, doors_target: u32, walls: bool) -> Self {
        Self {
            rect: Rect::new(corner1, corner2),
            has_walls: walls,
            doors_target,
            doors: Vec::new(),
        }
    }

    /// The full footprint of the room.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The footprint, or only the walkable part when `inside_walls` is set.
    ///
    /// Returns `None` when the walls leave no room for a floor.
    pub fn to_rect(&self, inside_walls: bool) -> Option<Rect> {
        if inside_walls && self.has_walls {
            self.rect.inner()
        } else {
            Some(self.rect)
        }
    }

    pub fn has_walls(&self) -> bool {
        self.has_walls
    }

    pub fn doors_target(&self) -> u32 {
        self.doors_target
    }

    pub fn doors(&self) -> &[Position] {
        &self.doors
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.rect.contains(pos)
    }

    /// Number of tiles covered by the room, walls included.
    pub fn area(&self) -> i32 {
        self.rect.width() * self.rect.height()
    }

    /// How much this room still wants doors; negative past the target.
    pub fn select_weight(&self) -> i32 {
        self.doors_target as i32 - self.doors.len() as i32
    }

    /// Records a door at `pos` and opens it on the map.
    pub fn add_door(&mut self, pos: Position, map: &mut Map) -> DelveResult<()> {
        map.set_tile(pos, Tile::DoorwayOpen)?;
        self.doors.push(pos);
        Ok(())
    }

    /// A random wall position that is not a corner.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{DungeonRng, Position, RoomPlan};
    ///
    /// let room = RoomPlan::new(Position::new(0, 0), Position::new(4, 3), 2, true);
    /// let mut rng = DungeonRng::new(5);
    /// let wall = room.rand_wall(&mut rng).unwrap();
    /// assert!(!room.rect().corners().contains(&wall));
    /// ```
    pub fn rand_wall(&self, rng: &mut DungeonRng) -> Option<Position> {
        let Rect { bl, tr } = self.rect;
        let width = self.rect.width() - 2;
        let height = self.rect.height() - 2;
        if width <= 0 && height <= 0 {
            return None;
        }
        let (width, height) = (width.max(0), height.max(0));
        let offset = rng.randrange(0, width * 2 + height * 2).ok()?;
        Some(if offset < width {
            Position::new(bl.x + offset + 1, bl.y)
        } else if offset < width * 2 {
            Position::new(bl.x + offset - width + 1, tr.y)
        } else if offset < width * 2 + height {
            Position::new(bl.x, bl.y + offset - width * 2 + 1)
        } else {
            Position::new(tr.x, bl.y + offset - width * 2 - height + 1)
        })
    }

    /// Stamps the room on the map: walls on the perimeter if any, floor inside.
    pub fn set_tiles(&self, map: &mut Map) {
        if self.has_walls {
            map.fill_rect(&self.rect, Tile::Wall);
        }
        if let Some(floor) = self.to_rect(true) {
            map.fill_rect(&floor, Tile::Floor);
        }
    }

    /// Whether the room overlaps `rect`, touching included.
    pub fn intersect(&self, rect: &Rect) -> bool {
        self.rect.intersects(rect)
    }

    /// Floor positions of the room, walls excluded.
    pub fn iter_tiles(&self) -> impl Iterator<Item = Position> {
        self.to_rect(true).into_iter().flat_map(|rect| rect.iter())
    }
}
