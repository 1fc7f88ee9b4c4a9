//! # Delve
//!
//! A procedural dungeon-map engine: a 2D tile grid with typed cells, spatial
//! queries, shortest-path search and a family of maze and room generators that
//! compose into playable levels.
//!
//! ## Architecture Overview
//!
//! - **Map**: the tile store plus the actor/item/mood placement indices
//! - **Spatial queries**: rings, adjacency, line of sight and lazy [`MapScope`]s
//! - **Pathfinding**: A* single paths and Dijkstra-style [`MapMetrics`]
//! - **Generation**: the level [`Builder`], room and maze plans, and the
//!   pluggable [`MazeFiller`] algorithms
//!
//! Every randomized operation takes an explicit [`DungeonRng`], so a fixed seed
//! always reproduces the same level and independent maps can be generated on
//! different threads without sharing state.

pub mod generation;
pub mod map;
pub mod utils;

pub use generation::*;
pub use map::*;
pub use utils::*;

/// Core error type for the Delve map engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The target position is already taken
    #[error("Position {0} is already occupied")]
    Conflict(Position),

    /// No free position is left anywhere on the map
    #[error("The map is full, no free position is left")]
    MapFull,

    /// The thing is not tracked by the map
    #[error("Not on the map: {0}")]
    NotPresent(String),

    /// The map does not know how to handle this kind of thing
    #[error("Unsupported kind: {0}")]
    UnsupportedKind(String),

    /// Degenerate rectangle, non-aligned positions and similar requests
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Map links can only be made between Connector tiles
    #[error("Tile at {0} is not a connector")]
    NotAConnector(Position),

    /// The builder could not place a feature
    #[error("Placement failed: {0}")]
    PlacementFailed(String),

    /// A generated level failed validation
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A map holding the hero was restored before the hero itself
    #[error("The hero must be restored before any map that contains it")]
    HeroNotRestored,
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Map and generation constants.
pub mod config {
    /// Default map width in tiles
    pub const DEFAULT_MAP_WIDTH: i32 = 140;

    /// Default map height in tiles
    pub const DEFAULT_MAP_HEIGHT: i32 = 30;

    /// Attempts at bisecting an area before level generation settles
    pub const SPLIT_ATTEMPTS: u32 = 12;

    /// Areas with a side shorter than this are never split again
    pub const MIN_SPLIT_SIDE: i32 = 7;

    /// Smallest side of a level area; a walled room needs 3 tiles to hold floor
    pub const MIN_AREA_SIDE: i32 = 3;

    /// Largest map side accepted by `Map::try_new` and snapshot restores
    pub const MAX_MAP_SIDE: i32 = 4096;

    /// Budget spent by the builder when scattering mood markers
    pub const VIBE_BUDGET: i32 = 10;

    /// Random attempts before `Map::random_pos` falls back to a spiral search
    pub const RANDOM_POS_ATTEMPTS: u32 = 5;
}
