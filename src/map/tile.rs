//! # Tiles
//!
//! Terrain classification of a single grid cell.

use crate::Position;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a map.
pub type MapId = Uuid;

/// A tile that leads to another map, such as a staircase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    /// Glyph used when rendering, `>` or `<` for stairs
    pub glyph: char,
    /// Map reached through this connector, once linked
    pub dest_map: Option<MapId>,
    /// Arrival position on the destination map, once linked
    pub dest_pos: Option<Position>,
}

impl Connector {
    /// Creates an unlinked connector.
    pub fn new(glyph: char) -> Self {
        Self {
            glyph,
            dest_map: None,
            dest_pos: None,
        }
    }

    /// Whether both ends of the link are known.
    pub fn is_linked(&self) -> bool {
        self.dest_map.is_some() && self.dest_pos.is_some()
    }
}

/// Terrain of one grid cell.
///
/// Exactly one tile occupies each coordinate; a connector replaces the floor
/// it is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    SolidRock,
    Floor,
    Wall,
    WallV,
    WallH,
    DoorwayOpen,
    DoorwayClosed,
    Connector(Connector),
}

impl Tile {
    /// Whether an actor can stand on this tile.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Connector, Tile};
    ///
    /// assert!(Tile::Floor.is_walkable());
    /// assert!(Tile::Connector(Connector::new('>')).is_walkable());
    /// assert!(!Tile::DoorwayClosed.is_walkable());
    /// ```
    pub fn is_walkable(&self) -> bool {
        matches!(self, Tile::Floor | Tile::DoorwayOpen | Tile::Connector(_))
    }

    /// Whether light and sight go through this tile.
    pub fn is_transparent(&self) -> bool {
        matches!(self, Tile::Floor | Tile::DoorwayOpen)
    }

    /// Any of the wall variants.
    pub fn is_wall(&self) -> bool {
        matches!(self, Tile::Wall | Tile::WallV | Tile::WallH)
    }

    /// Open or closed doorway.
    pub fn is_doorway(&self) -> bool {
        matches!(self, Tile::DoorwayOpen | Tile::DoorwayClosed)
    }

    /// Glyph used by the text rendering.
    pub fn glyph(&self) -> char {
        match self {
            Tile::SolidRock => '▓',
            Tile::Floor => '.',
            Tile::Wall => '░',
            Tile::WallV => '|',
            Tile::WallH => '─',
            Tile::DoorwayOpen => '╦',
            Tile::DoorwayClosed => '╥',
            Tile::Connector(conn) => conn.glyph,
        }
    }

    /// The connector data, if this tile is a connector.
    pub fn as_connector(&self) -> Option<&Connector> {
        match self {
            Tile::Connector(conn) => Some(conn),
            _ => None,
        }
    }

    /// Mutable connector data, if this tile is a connector.
    pub fn as_connector_mut(&mut self) -> Option<&mut Connector> {
        match self {
            Tile::Connector(conn) => Some(conn),
            _ => None,
        }
    }
}
