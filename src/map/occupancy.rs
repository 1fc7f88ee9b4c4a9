//! # Occupancy Indices
//!
//! Placement bookkeeping for everything that sits on a map: actors (one per
//! position), item stacks (many per position) and mood markers (one per
//! position, independent of actors and items).
//!
//! Both directions of every index are updated together inside the same
//! method, so a position never points at an actor that lost track of it and
//! the other way around.

use crate::{DelveError, DelveResult, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for actors.
pub type ActorId = Uuid;

/// Unique identifier for items.
pub type ItemId = Uuid;

/// Opaque handle on a creature living on the map.
///
/// The map only cares about identity, a `kind` tag used by scope predicates
/// and the glyph used for text rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub kind: String,
    pub glyph: char,
}

impl Actor {
    /// Creates an actor with a fresh identifier.
    pub fn new(kind: impl Into<String>, glyph: char) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            glyph,
        }
    }
}

/// Opaque handle on an object lying on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: String,
    pub glyph: char,
}

impl Item {
    /// Creates an item with a fresh identifier.
    pub fn new(kind: impl Into<String>, glyph: char) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            glyph,
        }
    }
}

/// Ambient marker left by a faction, one per position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub faction: String,
    pub tag: String,
}

impl Mood {
    pub fn new(faction: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            faction: faction.into(),
            tag: tag.into(),
        }
    }
}

/// Anything the map knows how to index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Thing {
    Actor(Actor),
    Item(Item),
    Mood(Mood),
}

impl Thing {
    /// Short label for error messages and logs.
    pub fn describe(&self) -> String {
        match self {
            Thing::Actor(actor) => format!("actor {} ({})", actor.id, actor.kind),
            Thing::Item(item) => format!("item {} ({})", item.id, item.kind),
            Thing::Mood(mood) => format!("mood {} ({})", mood.tag, mood.faction),
        }
    }
}

impl From<Actor> for Thing {
    fn from(actor: Actor) -> Self {
        Thing::Actor(actor)
    }
}

impl From<Item> for Thing {
    fn from(item: Item) -> Self {
        Thing::Item(item)
    }
}

impl From<Mood> for Thing {
    fn from(mood: Mood) -> Self {
        Thing::Mood(mood)
    }
}

/// Ordered pile of items sharing a position; the last item is on top.
pub type ItemStack = Vec<Item>;

/// Bijection between actors and positions.
#[derive(Debug, Clone, Default)]
pub struct ActorIndex {
    by_id: HashMap<ActorId, (Actor, Position)>,
    by_pos: HashMap<Position, ActorId>,
}

impl ActorIndex {
    pub fn insert(&mut self, actor: Actor, pos: Position) -> DelveResult<()> {
        if self.by_id.contains_key(&actor.id) {
            return Err(DelveError::Conflict(pos));
        }
        if self.by_pos.contains_key(&pos) {
            return Err(DelveError::Conflict(pos));
        }
        self.by_pos.insert(pos, actor.id);
        self.by_id.insert(actor.id, (actor, pos));
        Ok(())
    }

    pub fn remove(&mut self, id: ActorId) -> Option<(Actor, Position)> {
        let (actor, pos) = self.by_id.remove(&id)?;
        self.by_pos.remove(&pos);
        Some((actor, pos))
    }

    /// Relocates an actor. Refuses to stack two actors on one position.
    pub fn relocate(&mut self, id: ActorId, there: Position) -> DelveResult<Position> {
        if let Some(other) = self.by_pos.get(&there) {
            if *other != id {
                return Err(DelveError::Conflict(there));
            }
        }
        let entry = self
            .by_id
            .get_mut(&id)
            .ok_or_else(|| DelveError::NotPresent(format!("actor {id}")))?;
        let old = entry.1;
        entry.1 = there;
        self.by_pos.remove(&old);
        self.by_pos.insert(there, id);
        Ok(old)
    }

    pub fn position_of(&self, id: ActorId) -> Option<Position> {
        self.by_id.get(&id).map(|(_, pos)| *pos)
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.by_id.get(&id).map(|(actor, _)| actor)
    }

    pub fn at(&self, pos: Position) -> Option<&Actor> {
        self.by_pos.get(&pos).and_then(|id| self.get(*id))
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.by_pos.contains_key(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Actor)> {
        self.by_id.values().map(|(actor, pos)| (*pos, actor))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// One-to-many index between positions and item stacks.
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    by_id: HashMap<ItemId, Position>,
    stacks: HashMap<Position, ItemStack>,
}

impl ItemIndex {
    /// Puts an item on top of the stack at `pos`.
    pub fn insert(&mut self, item: Item, pos: Position) -> DelveResult<()> {
        if self.by_id.contains_key(&item.id) {
            return Err(DelveError::Conflict(pos));
        }
        self.by_id.insert(item.id, pos);
        self.stacks.entry(pos).or_default().push(item);
        Ok(())
    }

    pub fn remove(&mut self, id: ItemId) -> Option<(Item, Position)> {
        let pos = self.by_id.remove(&id)?;
        let stack = self.stacks.get_mut(&pos)?;
        let idx = stack.iter().position(|item| item.id == id)?;
        let item = stack.remove(idx);
        if stack.is_empty() {
            self.stacks.remove(&pos);
        }
        Some((item, pos))
    }

    pub fn relocate(&mut self, id: ItemId, there: Position) -> DelveResult<Position> {
        let (item, old) = self
            .remove(id)
            .ok_or_else(|| DelveError::NotPresent(format!("item {id}")))?;
        self.insert(item, there)?;
        Ok(old)
    }

    pub fn position_of(&self, id: ItemId) -> Option<Position> {
        self.by_id.get(&id).copied()
    }

    /// The stack at `pos`, never empty when present.
    pub fn at(&self, pos: Position) -> Option<&ItemStack> {
        self.stacks.get(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &ItemStack)> {
        self.stacks.iter().map(|(pos, stack)| (*pos, stack))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// All placement indices of one map.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    pub(crate) actors: ActorIndex,
    pub(crate) items: ItemIndex,
    pub(crate) moods: HashMap<Position, Mood>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether placing `thing` at `pos` would collide with something already there.
    pub fn blocks(&self, thing: &Thing, pos: Position) -> bool {
        match thing {
            Thing::Actor(_) => self.actors.is_occupied(pos),
            Thing::Item(_) => false,
            Thing::Mood(_) => self.moods.contains_key(&pos),
        }
    }

    /// Whether `thing` is already tracked.
    pub fn tracks(&self, thing: &Thing) -> bool {
        match thing {
            Thing::Actor(actor) => self.actors.get(actor.id).is_some(),
            Thing::Item(item) => self.items.position_of(item.id).is_some(),
            Thing::Mood(_) => false,
        }
    }

    pub fn insert(&mut self, thing: Thing, pos: Position) -> DelveResult<()> {
        match thing {
            Thing::Actor(actor) => self.actors.insert(actor, pos),
            Thing::Item(item) => self.items.insert(item, pos),
            Thing::Mood(mood) => {
                if self.moods.contains_key(&pos) {
                    return Err(DelveError::Conflict(pos));
                }
                self.moods.insert(pos, mood);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_index_is_a_bijection() {
        let mut index = ActorIndex::default();
        let a = Actor::new("rat", 'r');
        let b = Actor::new("bat", 'b');
        let p = Position::new(1, 1);

        index.insert(a.clone(), p).unwrap();
        assert!(matches!(
            index.insert(b.clone(), p),
            Err(DelveError::Conflict(_))
        ));
        assert!(index.insert(a.clone(), Position::new(2, 2)).is_err());

        index.insert(b.clone(), Position::new(3, 3)).unwrap();
        assert!(index.relocate(a.id, Position::new(3, 3)).is_err());
        assert_eq!(index.relocate(a.id, Position::new(4, 4)).unwrap(), p);
        assert!(!index.is_occupied(p));
        assert_eq!(index.at(Position::new(4, 4)).map(|x| x.id), Some(a.id));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_item_stacks_keep_order() {
        let mut index = ItemIndex::default();
        let p = Position::new(2, 2);
        let sword = Item::new("sword", '/');
        let coin = Item::new("coin", '$');
        index.insert(sword.clone(), p).unwrap();
        index.insert(coin.clone(), p).unwrap();

        let stack = index.at(p).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.last().unwrap().id, coin.id);

        index.relocate(sword.id, Position::new(0, 0)).unwrap();
        assert_eq!(index.at(p).unwrap().len(), 1);
        assert_eq!(index.position_of(sword.id), Some(Position::new(0, 0)));

        index.remove(coin.id).unwrap();
        assert!(index.at(p).is_none());
    }

    #[test]
    fn test_occupancy_blocks_by_kind() {
        let mut occ = Occupancy::new();
        let p = Position::new(0, 0);
        occ.insert(Mood::new("thieves", "tense").into(), p).unwrap();
        assert!(occ.blocks(&Mood::new("guild", "calm").into(), p));
        assert!(!occ.blocks(&Actor::new("rat", 'r').into(), p));
        assert!(!occ.blocks(&Item::new("coin", '$').into(), p));
    }
}
