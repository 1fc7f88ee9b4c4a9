//! # Maze Plans
//!
//! Bookkeeping for one twisty region of a level: the rooms a maze grew
//! around and the corridors it carved. A level can hold several plans while
//! it is being built; they are merged once they have grown into each other.

use crate::{raw_ring, DelveResult, DungeonRng, Map, Position, Rect, RoomId, RoomPlan, Tile};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedRoom {
    id: RoomId,
    rect: Rect,
    has_walls: bool,
}

/// Rooms and corridors of a maze.
///
/// Room corners are frozen as soon as the plan is created: no carving may
/// ever turn them into something else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MazePlan {
    rooms: Vec<PlannedRoom>,
    corridors: BTreeSet<Position>,
    frozen: HashSet<Position>,
}

impl MazePlan {
    /// Creates a plan around `rooms`, freezing their corners.
    pub fn new<'a>(rooms: impl IntoIterator<Item = (RoomId, &'a RoomPlan)>) -> Self {
        let rooms = rooms
            .into_iter()
            .map(|(id, room)| PlannedRoom {
                id,
                rect: room.rect(),
                has_walls: room.has_walls(),
            })
            .collect();
        Self::from_parts(rooms, BTreeSet::new())
    }

    fn from_parts(rooms: Vec<PlannedRoom>, corridors: BTreeSet<Position>) -> Self {
        let frozen = rooms
            .iter()
            .flat_map(|room: &PlannedRoom| room.rect.corners())
            .collect();
        Self {
            rooms,
            corridors,
            frozen,
        }
    }

    /// Identifiers of the rooms in this plan.
    pub fn room_ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.iter().map(|room| room.id)
    }

    /// Carved corridor positions in coordinate order.
    pub fn corridors(&self) -> impl Iterator<Item = Position> + '_ {
        self.corridors.iter().copied()
    }

    /// Tiles covered by corridors and rooms.
    pub fn area(&self) -> i32 {
        let rooms: i32 = self
            .rooms
            .iter()
            .map(|room| room.rect.width() * room.rect.height())
            .sum();
        self.corridors.len() as i32 + rooms
    }

    /// Adds `pos` to the maze.
    ///
    /// Walls of walled rooms become doors, positions inside open rooms are left
    /// alone, and anything else becomes a corridor.
    pub fn add(&mut self, pos: Position, map: &mut Map, rooms: &mut [RoomPlan]) -> DelveResult<()> {
        let walled = self
            .rooms
            .iter()
            .find(|room| room.has_walls && room.rect.contains(pos));
        if let Some(room) = walled {
            if map.get_tile(pos).is_some_and(Tile::is_wall) {
                if let Some(plan) = rooms.get_mut(room.id.0) {
                    plan.add_door(pos, map)?;
                }
            }
            return Ok(());
        }
        if self.in_open_room(pos) {
            return Ok(());
        }
        map.set_tile(pos, Tile::Floor)?;
        self.corridors.insert(pos);
        Ok(())
    }

    fn in_open_room(&self, pos: Position) -> bool {
        self.rooms
            .iter()
            .any(|room| !room.has_walls && room.rect.contains(pos))
    }

    /// Whether `pos` is in one of the rooms or corridors.
    pub fn contains(&self, pos: Position) -> bool {
        self.rooms.iter().any(|room| room.rect.contains(pos)) || self.corridors.contains(&pos)
    }

    /// Smallest rectangle holding every room and corridor, if any.
    pub fn bounding_rect(&self) -> Option<Rect> {
        let points = self
            .corridors
            .iter()
            .copied()
            .chain(self.rooms.iter().flat_map(|room| [room.rect.bl, room.rect.tr]));
        points.fold(None, |acc: Option<Rect>, pos| {
            Some(match acc {
                None => Rect::new(pos, pos),
                Some(rect) => Rect::from_coords(
                    rect.bl.x.min(pos.x),
                    rect.bl.y.min(pos.y),
                    rect.tr.x.max(pos.x),
                    rect.tr.y.max(pos.y),
                ),
            })
        })
    }

    /// Whether carving `pos` would run into this maze.
    ///
    /// True inside a walled room, or when a neighbour that is not in `ignore`
    /// belongs to an open room or a corridor. `ignore` typically holds the
    /// step the carver is coming from.
    pub fn touching(&self, pos: Position, ignore: &[Position]) -> bool {
        if self
            .rooms
            .iter()
            .any(|room| room.has_walls && room.rect.contains(pos))
        {
            return true;
        }
        raw_ring(pos, 1)
            .into_iter()
            .filter(|adj| !ignore.contains(adj))
            .any(|adj| self.in_open_room(adj) || self.corridors.contains(&adj))
    }

    pub fn is_frozen(&self, pos: Position) -> bool {
        self.frozen.contains(&pos)
    }

    /// A new plan holding the rooms and corridors of both plans.
    pub fn union(&self, other: &MazePlan) -> MazePlan {
        let mut rooms = self.rooms.clone();
        for room in &other.rooms {
            if !rooms.iter().any(|known| known.id == room.id) {
                rooms.push(room.clone());
            }
        }
        let corridors = self.corridors.union(&other.corridors).copied().collect();
        Self::from_parts(rooms, corridors)
    }

    /// How much this maze still wants doors, summed over its rooms.
    pub fn select_weight(&self, rooms: &[RoomPlan]) -> i32 {
        self.plans(rooms).iter().map(|room| room.select_weight()).sum()
    }

    fn plans<'r>(&self, rooms: &'r [RoomPlan]) -> Vec<&'r RoomPlan> {
        self.rooms
            .iter()
            .filter_map(|room| rooms.get(room.id.0))
            .collect()
    }

    /// A room picked by how much it still wants doors, uniformly once the
    /// door targets are (nearly) met.
    fn pick_room<'r>(&self, rooms: &'r [RoomPlan], rng: &mut DungeonRng) -> Option<&'r RoomPlan> {
        let plans = self.plans(rooms);
        let weights: Vec<f64> = plans
            .iter()
            .map(|room| room.select_weight().max(0) as f64)
            .collect();
        if weights.iter().sum::<f64>() > 1.0 {
            rng.weighted_choice(&plans, &weights).copied()
        } else {
            rng.choice(&plans).copied()
        }
    }

    /// A random non-corner wall of one of the rooms.
    pub fn rand_wall(&self, rooms: &[RoomPlan], rng: &mut DungeonRng) -> Option<Position> {
        self.pick_room(rooms, rng)?.rand_wall(rng)
    }

    /// Where to start a new corridor.
    ///
    /// A wall of a room that still needs doors when there is one, otherwise
    /// any carved corridor, otherwise any room wall.
    pub fn rand_cor_start(&self, rooms: &[RoomPlan], rng: &mut DungeonRng) -> Option<Position> {
        if self.select_weight(rooms) > 1 {
            return self.rand_wall(rooms, rng);
        }
        let corridors: Vec<Position> = self.corridors().collect();
        if let Some(pos) = rng.choice(&corridors) {
            return Some(*pos);
        }
        let plans = self.plans(rooms);
        rng.choice(&plans)?.rand_wall(rng)
    }
}
