//! # Map Snapshots
//!
//! Save/restore support. A [`MapSnapshot`] is a plain serde value holding the
//! whole state of one map, except the hero: whoever saves the game is in
//! charge of the hero, and the snapshot only remembers where it stood.

use crate::{
    Actor, ActorId, DelveError, DelveResult, ItemStack, Map, MapId, MapOverlay, Mood, Occupancy,
    Position, Tile,
};
use super::tile_count;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable state of a [`Map`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub id: MapId,
    pub name: Option<String>,
    pub width: i32,
    pub height: i32,
    /// Row-major tiles, bottom row first
    pub tiles: Vec<Tile>,
    pub actors: Vec<(Position, Actor)>,
    pub items: Vec<(Position, ItemStack)>,
    pub moods: Vec<(Position, Mood)>,
    pub connections: Vec<(MapId, Position)>,
    pub overlays: Vec<Vec<(Position, String)>>,
    /// Where the hero stood when the map was saved
    pub hero_pos: Option<Position>,
}

impl MapSnapshot {
    pub fn to_json(&self) -> DelveResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> DelveResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the snapshot as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> DelveResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads a snapshot previously written by [`MapSnapshot::save`].
    pub fn load(path: impl AsRef<Path>) -> DelveResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Map {
    /// Captures the state of the map.
    ///
    /// If `hero` is on the map it is left out of the actors and only its
    /// position is kept.
    pub fn snapshot(&self, hero: Option<ActorId>) -> MapSnapshot {
        let hero_pos = hero.and_then(|id| self.actor_pos(id));
        let actors = self
            .iter_actors()
            .filter(|(_, actor)| Some(actor.id) != hero)
            .map(|(pos, actor)| (pos, actor.clone()))
            .collect();

        MapSnapshot {
            id: self.id,
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            tiles: self.tiles.clone(),
            actors,
            items: self
                .iter_items()
                .map(|(pos, stack)| (pos, stack.clone()))
                .collect(),
            moods: self
                .iter_moods()
                .map(|(pos, mood)| (pos, mood.clone()))
                .collect(),
            connections: self.connections.iter().map(|(id, pos)| (*id, *pos)).collect(),
            overlays: self
                .overlays
                .iter()
                .map(|overlay| {
                    overlay
                        .iter()
                        .map(|(pos, text)| (pos, text.to_string()))
                        .collect()
                })
                .collect(),
            hero_pos,
        }
    }

    /// Rebuilds a map from a snapshot.
    ///
    /// A map saved with the hero on it can only be restored once the hero is
    /// available again: pass it as `hero` or get [`DelveError::HeroNotRestored`].
    pub fn restore(snapshot: MapSnapshot, hero: Option<Actor>) -> DelveResult<Map> {
        if snapshot.tiles.len() != tile_count(snapshot.width, snapshot.height)? {
            return Err(DelveError::InvalidGeometry(format!(
                "{} tiles do not fit a {}x{} map",
                snapshot.tiles.len(),
                snapshot.width,
                snapshot.height
            )));
        }

        let hero = match (snapshot.hero_pos, hero) {
            (Some(pos), Some(hero)) => Some((hero, pos)),
            (Some(_), None) => return Err(DelveError::HeroNotRestored),
            (None, _) => None,
        };

        let in_map = |pos: Position| {
            (0..snapshot.width).contains(&pos.x) && (0..snapshot.height).contains(&pos.y)
        };
        let outsider = snapshot
            .actors
            .iter()
            .map(|(pos, _)| *pos)
            .chain(snapshot.items.iter().map(|(pos, _)| *pos))
            .chain(snapshot.moods.iter().map(|(pos, _)| *pos))
            .find(|pos| !in_map(*pos));
        if let Some(pos) = outsider {
            return Err(DelveError::InvalidGeometry(format!(
                "{pos} is outside of a {}x{} map",
                snapshot.width, snapshot.height
            )));
        }

        let mut occupancy = Occupancy::new();
        for (pos, actor) in snapshot.actors {
            occupancy.actors.insert(actor, pos)?;
        }
        for (pos, stack) in snapshot.items {
            for item in stack {
                occupancy.items.insert(item, pos)?;
            }
        }
        occupancy.moods = snapshot.moods.into_iter().collect();

        let mut map = Map {
            id: snapshot.id,
            name: snapshot.name,
            width: snapshot.width,
            height: snapshot.height,
            tiles: snapshot.tiles,
            occupancy,
            connections: snapshot.connections.into_iter().collect(),
            overlays: snapshot
                .overlays
                .into_iter()
                .map(|cells| cells.into_iter().collect::<MapOverlay>())
                .collect(),
        };

        if let Some((hero, pos)) = hero {
            map.place(hero, pos, false)?;
        }
        debug!("restored map {}", map.id);
        Ok(map)
    }
}
