//! # Map Module
//!
//! The tile grid of one dungeon level together with everything placed on it.
//!
//! - Tile storage and placement indices live in this file
//! - Ring, adjacency and line-of-sight queries in [`query`]
//! - Lazy visibility/traversability/reachability scopes in [`scope`]
//! - A* and distance metrics in [`pathfinding`]
//! - The diagnostic text rendering and overlays in [`render`]
//! - Save/restore support in [`snapshot`]

pub mod occupancy;
pub mod pathfinding;
pub mod query;
pub mod render;
pub mod scope;
pub mod snapshot;
pub mod tile;

pub use occupancy::*;
pub use pathfinding::*;
pub use query::*;
pub use render::*;
pub use scope::*;
pub use snapshot::*;
pub use tile::*;

use crate::{config, DelveError, DelveResult, DungeonRng, Position, Rect};
use log::debug;
use std::collections::HashMap;
use uuid::Uuid;

/// The map of a dungeon level.
///
/// Coordinates start at `(0, 0)` in the bottom-left corner. Actors, items and
/// mood markers are tracked in [`Occupancy`] indices that every mutating
/// method keeps consistent.
///
/// # Examples
///
/// ```
/// use delve::{Actor, Map, Position, Tile};
///
/// let mut map = Map::new(5, 5, Tile::Floor);
/// let rat = Actor::new("rat", 'r');
/// let pos = map.place(rat.clone(), Position::new(2, 3), false).unwrap();
/// assert_eq!(map.actor_pos(rat.id), Some(pos));
/// assert!(!map.is_free(pos));
/// ```
#[derive(Debug, Clone)]
pub struct Map {
    id: MapId,
    /// Optional display name
    pub name: Option<String>,
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    occupancy: Occupancy,
    /// Our side of the links to neighbouring maps: map id to arrival position
    connections: HashMap<MapId, Position>,
    overlays: Vec<MapOverlay>,
}

impl Map {
    /// Creates a `width` x `height` map where every tile is `fill`.
    ///
    /// Sides are clamped to `0..=config::MAX_MAP_SIDE`; use [`Map::try_new`]
    /// for sizes coming from outside.
    pub fn new(width: i32, height: i32, fill: Tile) -> Self {
        let (width, height) = (
            width.clamp(0, config::MAX_MAP_SIDE),
            height.clamp(0, config::MAX_MAP_SIDE),
        );
        let len = width as usize * height as usize;
        Self::from_parts(width, height, vec![fill; len])
    }

    /// Like [`Map::new`], but refuses sizes that are negative or too large.
    pub fn try_new(width: i32, height: i32, fill: Tile) -> DelveResult<Self> {
        let len = tile_count(width, height)?;
        Ok(Self::from_parts(width, height, vec![fill; len]))
    }

    fn from_parts(width: i32, height: i32, tiles: Vec<Tile>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            width,
            height,
            tiles,
            occupancy: Occupancy::new(),
            connections: HashMap::new(),
            overlays: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Unique identifier of this map.
    pub fn id(&self) -> MapId {
        self.id
    }

    /// Returns `(width, height)`.
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The rectangle covering the whole map.
    pub fn rect(&self) -> Rect {
        Rect::from_coords(0, 0, self.width - 1, self.height - 1)
    }

    /// Checks if a position is within the map bounds.
    pub fn is_in_map(&self, pos: Position) -> bool {
        0 <= pos.x && pos.x < self.width && 0 <= pos.y && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.is_in_map(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// Gets the tile at a position.
    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).map(|idx| &self.tiles[idx])
    }

    /// Gets a mutable reference to the tile at a position.
    pub fn get_tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        self.index(pos).map(move |idx| &mut self.tiles[idx])
    }

    /// Replaces the tile at a position.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> DelveResult<()> {
        let idx = self.index(pos).ok_or_else(|| {
            DelveError::InvalidGeometry(format!("{pos} is outside of the map"))
        })?;
        self.tiles[idx] = tile;
        Ok(())
    }

    /// Fills every tile of `rect` that lies inside the map.
    pub fn fill_rect(&mut self, rect: &Rect, tile: Tile) {
        for pos in rect.iter() {
            if let Some(slot) = self.get_tile_mut(pos) {
                *slot = tile;
            }
        }
    }

    /// Every coordinate of the map, column by column.
    pub fn iter_coords(&self) -> impl Iterator<Item = Position> {
        self.rect().iter()
    }

    /// `(position, tile)` pairs for the whole map.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        self.iter_coords().map(move |pos| (pos, &self.tiles[(pos.y * self.width + pos.x) as usize]))
    }

    /// Whether an actor could stand at `pos`, ignoring other actors.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.get_tile(pos).is_some_and(Tile::is_walkable)
    }

    pub fn is_doorway(&self, pos: Position) -> bool {
        self.get_tile(pos).is_some_and(Tile::is_doorway)
    }

    /// Whether an actor can step on `pos` right now.
    pub fn is_free(&self, pos: Position) -> bool {
        self.is_walkable(pos) && !self.occupancy.actors.is_occupied(pos)
    }

    pub fn actor_at(&self, pos: Position) -> Option<&Actor> {
        self.occupancy.actors.at(pos)
    }

    pub fn actor_by_id(&self, id: ActorId) -> Option<&Actor> {
        self.occupancy.actors.get(id)
    }

    pub fn actor_pos(&self, id: ActorId) -> Option<Position> {
        self.occupancy.actors.position_of(id)
    }

    pub fn contains_actor(&self, id: ActorId) -> bool {
        self.occupancy.actors.get(id).is_some()
    }

    pub fn item_pos(&self, id: ItemId) -> Option<Position> {
        self.occupancy.items.position_of(id)
    }

    /// The item stack at `pos`, if anything lies there.
    pub fn items_at(&self, pos: Position) -> Option<&ItemStack> {
        self.occupancy.items.at(pos)
    }

    pub fn mood_at(&self, pos: Position) -> Option<&Mood> {
        self.occupancy.moods.get(&pos)
    }

    /// `(position, actor)` pairs in no particular order.
    pub fn iter_actors(&self) -> impl Iterator<Item = (Position, &Actor)> {
        self.occupancy.actors.iter()
    }

    /// `(position, stack)` pairs for non-empty stacks, in no particular order.
    pub fn iter_items(&self) -> impl Iterator<Item = (Position, &ItemStack)> {
        self.occupancy.items.iter()
    }

    /// `(position, mood)` pairs in no particular order.
    pub fn iter_moods(&self) -> impl Iterator<Item = (Position, &Mood)> {
        self.occupancy.moods.iter().map(|(pos, mood)| (*pos, mood))
    }

    /// Where `thing` is on the map, if it is tracked.
    pub fn find(&self, thing: &Thing) -> Option<Position> {
        match thing {
            Thing::Actor(actor) => self.actor_pos(actor.id),
            Thing::Item(item) => self.item_pos(item.id),
            Thing::Mood(_) => None,
        }
    }

    /// Puts `thing` on the map at `pos` and returns where it landed.
    ///
    /// When `pos` is taken, fails with [`DelveError::Conflict`] unless
    /// `fallback` is set, in which case the nearest open position is used,
    /// searching outward ring by ring. Anything already on the map is refused.
    pub fn place(
        &mut self,
        thing: impl Into<Thing>,
        pos: Position,
        fallback: bool,
    ) -> DelveResult<Position> {
        let thing = thing.into();
        if self.occupancy.tracks(&thing) {
            return Err(DelveError::Conflict(pos));
        }
        if !self.is_in_map(pos) {
            return Err(DelveError::InvalidGeometry(format!(
                "{pos} is outside of the map"
            )));
        }

        let pos = if self.occupancy.blocks(&thing, pos) {
            if !fallback {
                return Err(DelveError::Conflict(pos));
            }
            self.nearest_open(&thing, pos).ok_or(DelveError::MapFull)?
        } else {
            pos
        };

        debug!("placing {} at {}", thing.describe(), pos);
        self.occupancy.insert(thing, pos)?;
        Ok(pos)
    }

    /// Puts `thing` on a random free position.
    pub fn place_random(
        &mut self,
        thing: impl Into<Thing>,
        rng: &mut DungeonRng,
    ) -> DelveResult<Position> {
        let thing = thing.into();
        let pos = self.random_pos(true, rng)?;
        self.place(thing, pos, true)
    }

    /// Takes something off the map and returns where it was.
    pub fn remove(&mut self, thing: &Thing) -> DelveResult<Position> {
        match thing {
            Thing::Actor(actor) => self
                .occupancy
                .actors
                .remove(actor.id)
                .map(|(_, pos)| pos)
                .ok_or_else(|| DelveError::NotPresent(thing.describe())),
            Thing::Item(item) => self
                .occupancy
                .items
                .remove(item.id)
                .map(|(_, pos)| pos)
                .ok_or_else(|| DelveError::NotPresent(thing.describe())),
            Thing::Mood(_) => Err(DelveError::UnsupportedKind(
                "mood markers are anchored to their position".to_string(),
            )),
        }
    }

    /// Relocates something already on the map and returns its old position.
    ///
    /// Reachability and walkability are the caller's business. Two actors
    /// still cannot share a position.
    pub fn move_to(&mut self, thing: &Thing, there: Position) -> DelveResult<Position> {
        match thing {
            Thing::Actor(actor) => self.occupancy.actors.relocate(actor.id, there),
            Thing::Item(item) => self.occupancy.items.relocate(item.id, there),
            Thing::Mood(_) => Err(DelveError::UnsupportedKind(
                "mood markers cannot move".to_string(),
            )),
        }
    }

    /// Clears the mood marker at `pos`.
    pub fn clear_mood(&mut self, pos: Position) -> Option<Mood> {
        self.occupancy.moods.remove(&pos)
    }

    fn nearest_open(&self, thing: &Thing, pos: Position) -> Option<Position> {
        let max_radius = self.width.max(self.height) as u32;
        (1..=max_radius)
            .flat_map(|radius| self.ring(pos, radius))
            .find(|&candidate| match thing {
                Thing::Actor(_) => self.is_free(candidate),
                _ => !self.occupancy.blocks(thing, candidate),
            })
    }

    /// A random position inside the map, free for an actor if `free` is set.
    ///
    /// Tries a few fully random tiles, then spirals around the last attempt
    /// until the whole map has been seen.
    pub fn random_pos(&self, free: bool, rng: &mut DungeonRng) -> DelveResult<Position> {
        if self.width == 0 || self.height == 0 {
            return Err(DelveError::MapFull);
        }
        let mut last = Position::origin();
        for _ in 0..config::RANDOM_POS_ATTEMPTS {
            last = Position::new(rng.rint(0, self.width - 1), rng.rint(0, self.height - 1));
            if !free || self.is_free(last) {
                return Ok(last);
            }
        }

        let max_radius = self.width.max(self.height) as u32;
        for radius in 1..=max_radius {
            let found = self.ring_query(last, radius).free_only().shuffled(rng);
            if let Some(pos) = found.first() {
                return Ok(*pos);
            }
        }
        Err(DelveError::MapFull)
    }

    /// Links `pos1` on this map with `pos2` on `there`, in both directions.
    ///
    /// Both tiles must already be connectors.
    pub fn connect(&mut self, pos1: Position, there: &mut Map, pos2: Position) -> DelveResult<()> {
        if self.get_tile(pos1).and_then(Tile::as_connector).is_none() {
            return Err(DelveError::NotAConnector(pos1));
        }
        if there.get_tile(pos2).and_then(Tile::as_connector).is_none() {
            return Err(DelveError::NotAConnector(pos2));
        }

        self.connections.insert(there.id, pos1);
        if let Some(conn) = self.get_tile_mut(pos1).and_then(Tile::as_connector_mut) {
            conn.dest_map = Some(there.id);
            conn.dest_pos = Some(pos2);
        }

        there.connections.insert(self.id, pos2);
        if let Some(conn) = there.get_tile_mut(pos2).and_then(Tile::as_connector_mut) {
            conn.dest_map = Some(self.id);
            conn.dest_pos = Some(pos1);
        }
        debug!("connected {} {} <-> {} {}", self.id, pos1, there.id, pos2);
        Ok(())
    }

    /// Where to put someone who just arrived from `map_id`.
    pub fn arrival_pos(&self, map_id: MapId) -> Option<Position> {
        self.connections.get(&map_id).copied()
    }

    pub fn add_overlay(&mut self, overlay: MapOverlay) {
        self.overlays.push(overlay);
    }

    /// Removes every overlay equal to `overlay`.
    pub fn remove_overlay(&mut self, overlay: &MapOverlay) {
        self.overlays.retain(|o| o != overlay);
    }

    pub fn clear_overlays(&mut self) {
        self.overlays.clear();
    }

    pub fn overlays(&self) -> &[MapOverlay] {
        &self.overlays
    }
}

/// Number of tiles in a `width` x `height` map.
pub(crate) fn tile_count(width: i32, height: i32) -> DelveResult<usize> {
    let side_ok = |side: i32| (0..=config::MAX_MAP_SIDE).contains(&side);
    if !side_ok(width) || !side_ok(height) {
        return Err(DelveError::InvalidGeometry(format!(
            "a {width}x{height} map is out of bounds"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| DelveError::InvalidGeometry(format!("{width}x{height} tiles overflow")))
}
