//! # Level Builder
//!
//! Turns an empty map into a playable level: rooms placed with collision
//! checks, areas split for level layouts, straight corridors between rooms,
//! staircases, maze carving passes and mood markers.

use crate::{
    config, line, DelveError, DelveResult, DungeonRng, GenerationConfig, Map, MazeCarver,
    MazeFiller, MazePlan, MoodSource, Position, Rect, RoomId, RoomPlan, Tile, Connector,
};
use log::{debug, warn};

/// Size of a random room along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// Exactly this many tiles
    Exact(i32),
    /// Anywhere in this inclusive range
    Range(i32, i32),
}

impl Extent {
    fn sample(self, rng: &mut DungeonRng) -> i32 {
        match self {
            Extent::Exact(size) => size,
            Extent::Range(lo, hi) => rng.rint(lo, hi),
        }
    }
}

impl From<i32> for Extent {
    fn from(size: i32) -> Self {
        Extent::Exact(size)
    }
}

impl From<(i32, i32)> for Extent {
    fn from((lo, hi): (i32, i32)) -> Self {
        Extent::Range(lo, hi)
    }
}

/// Builder for the features of one map.
///
/// # Examples
///
/// ```
/// use delve::{Builder, DungeonRng, GenerationConfig, Position, Tile};
///
/// let config = GenerationConfig::for_testing(1);
/// let mut rng = config.rng();
/// let mut builder = Builder::new(config);
/// builder.generate_level(&mut rng).unwrap();
/// let stairs = builder.staircase(None, '>', None, &mut rng).unwrap();
/// assert!(builder.map().get_tile(stairs).unwrap().as_connector().is_some());
/// builder.validate_connectivity().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    map: Map,
    config: GenerationConfig,
    rooms: Vec<RoomPlan>,
    mazes: Vec<MazePlan>,
}

impl Builder {
    /// A builder over a fresh solid-rock map sized by `config`.
    pub fn new(config: GenerationConfig) -> Self {
        let map = Map::new(config.width, config.height, Tile::SolidRock);
        Self::with_map(map, config)
    }

    /// A builder working on an existing map.
    pub fn with_map(map: Map, config: GenerationConfig) -> Self {
        Self {
            map,
            config,
            rooms: Vec::new(),
            mazes: Vec::new(),
        }
    }

    /// Resets the map to `width` x `height` tiles of `fill`.
    ///
    /// Rooms and mazes planned so far are forgotten with the old tiles.
    pub fn init(&mut self, width: i32, height: i32, fill: Tile) {
        let name = self.map.name.take();
        self.map = Map::new(width, height, fill);
        self.map.name = name;
        self.rooms.clear();
        self.mazes.clear();
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Hands the finished map over.
    pub fn into_map(self) -> Map {
        self.map
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn rooms(&self) -> &[RoomPlan] {
        &self.rooms
    }

    pub fn room_plan(&self, id: RoomId) -> Option<&RoomPlan> {
        self.rooms.get(id.0)
    }

    pub fn mazes(&self) -> &[MazePlan] {
        &self.mazes
    }

    /// Whether any maze froze `pos`.
    pub fn is_frozen(&self, pos: Position) -> bool {
        self.mazes.iter().any(|maze| maze.is_frozen(pos))
    }

    /// Places a room between two corners and stamps it on the map.
    ///
    /// Without a `doors_target`, one is drawn from the configured range.
    pub fn room(
        &mut self,
        corner1: Position,
        corner2: Position,
        doors_target: Option<u32>,
        walls: bool,
        rng: &mut DungeonRng,
    ) -> RoomId {
        let doors_target = doors_target.unwrap_or_else(|| {
            let (lo, hi) = self.config.doors_range;
            rng.rint(lo as i32, hi as i32) as u32
        });
        let plan = RoomPlan::new(corner1, corner2, doors_target, walls);
        plan.set_tiles(&mut self.map);
        debug!("room {:?} with {} doors wanted", plan.rect(), doors_target);
        self.rooms.push(plan);
        RoomId(self.rooms.len() - 1)
    }

    /// Places a walled room of the given size where it overlaps no other room.
    ///
    /// Tries `nb_retry + 1` random spots and returns the room's rectangle, or
    /// `None` when every attempt collided, the room cannot fit the map or a
    /// side is shorter than one tile.
    pub fn random_room(
        &mut self,
        width: impl Into<Extent>,
        height: impl Into<Extent>,
        nb_retry: u32,
        rng: &mut DungeonRng,
    ) -> Option<Rect> {
        let width = width.into().sample(rng);
        let height = height.into().sample(rng);
        if width < 1 || height < 1 {
            warn!("refusing a {width}x{height} room");
            return None;
        }
        let (mw, mh) = self.map.size();

        for _ in 0..=nb_retry {
            let x1 = rng.randrange(0, mw - width + 1).ok()?;
            let y1 = rng.randrange(0, mh - height + 1).ok()?;
            let rect = Rect::from_coords(x1, y1, x1 + width - 1, y1 + height - 1);
            if !self.rooms.iter().any(|room| room.intersect(&rect)) {
                self.room(rect.bl, rect.tr, None, true, rng);
                return Some(rect);
            }
        }
        warn!("no room for a {width}x{height} room after {} attempts", nb_retry + 1);
        None
    }

    /// Adds a staircase and returns where it was put.
    ///
    /// Without a position, a random spot inside a random room is used. With a
    /// destination, both ends are linked right away.
    pub fn staircase(
        &mut self,
        pos: Option<Position>,
        glyph: char,
        dest: Option<(&mut Map, Position)>,
        rng: &mut DungeonRng,
    ) -> DelveResult<Position> {
        let pos = match pos {
            Some(pos) => pos,
            None => {
                if self.rooms.is_empty() {
                    return Err(DelveError::PlacementFailed(
                        "staircases can only be placed after rooms have been created".to_string(),
                    ));
                }
                let floors: Vec<Rect> = self
                    .rooms
                    .iter()
                    .filter_map(|room| room.to_rect(true))
                    .collect();
                let inside = rng.choice(&floors).ok_or_else(|| {
                    DelveError::PlacementFailed("no room has any floor".to_string())
                })?;
                rng.pos_in_rect(inside)
            }
        };
        if let Some((there, dest_pos)) = &dest {
            if there.get_tile(*dest_pos).and_then(Tile::as_connector).is_none() {
                return Err(DelveError::NotAConnector(*dest_pos));
            }
        }
        self.map.set_tile(pos, Tile::Connector(Connector::new(glyph)))?;
        if let Some((there, dest_pos)) = dest {
            self.map.connect(pos, there, dest_pos)?;
        }
        debug!("staircase '{glyph}' at {pos}");
        Ok(pos)
    }

    /// Cuts `rect` in two adjacent, non-overlapping halves across its longest
    /// side.
    ///
    /// The cut lands in the middle third and on an even coordinate when the
    /// halves allow it, which keeps mazes of both halves on the same cells.
    pub fn area_split(&self, rect: &Rect, rng: &mut DungeonRng) -> DelveResult<(Rect, Rect)> {
        let (w, h) = (rect.width(), rect.height());
        let horizontal = w > h;
        let (lo, hi, side) = if horizontal {
            (rect.bl.x, rect.tr.x, w)
        } else {
            (rect.bl.y, rect.tr.y, h)
        };
        if side < 4 {
            return Err(DelveError::InvalidGeometry(format!(
                "{rect:?} is too small to split"
            )));
        }

        let third = |ratio: f64| lo + (side as f64 * ratio).round() as i32;
        let mut border = rng.randrange(third(0.3), third(0.7))?;
        if border.rem_euclid(2) == 1 {
            border += rng.sign();
        }
        if border >= hi {
            border -= 2;
        }
        if border < lo {
            border += 2;
        }

        let halves = if horizontal {
            (
                Rect::from_coords(rect.bl.x, rect.bl.y, border, rect.tr.y),
                Rect::from_coords(border + 1, rect.bl.y, rect.tr.x, rect.tr.y),
            )
        } else {
            (
                Rect::from_coords(rect.bl.x, rect.bl.y, rect.tr.x, border),
                Rect::from_coords(rect.bl.x, border + 1, rect.tr.x, rect.tr.y),
            )
        };
        debug!("split {rect:?} into {:?} and {:?}", halves.0, halves.1);
        Ok(halves)
    }

    /// Turns the map into a playable level and returns its areas.
    ///
    /// Bisects the map into a few areas, puts a walled room in each of them
    /// and chains the rooms with straight corridors. A split leaving a half
    /// narrower than [`config::MIN_AREA_SIDE`] is thrown away, so every area
    /// gets its room.
    pub fn generate_level(&mut self, rng: &mut DungeonRng) -> DelveResult<Vec<Rect>> {
        let map_rect = self.map.rect();
        if map_rect.min_side() < config::MIN_AREA_SIDE {
            return Err(DelveError::GenerationFailed(format!(
                "a {}x{} map cannot hold a room",
                map_rect.width(),
                map_rect.height()
            )));
        }

        let (lo, hi) = self.config.area_count_range;
        let nb_areas = rng.rint(lo, hi).max(2) as usize;
        let mut areas = vec![map_rect];

        let mut attempts = self.config.split_attempts;
        while attempts > 0 && areas.len() < nb_areas {
            attempts -= 1;
            let Some(idx) = rng.index(areas.len()) else {
                break;
            };
            let splittable = areas.len() == 1 || areas[idx].min_side() >= self.config.min_split_side;
            if !splittable || areas[idx].width().max(areas[idx].height()) < 4 {
                continue;
            }
            let (a, b) = self.area_split(&areas[idx], rng)?;
            if a.min_side() < config::MIN_AREA_SIDE || b.min_side() < config::MIN_AREA_SIDE {
                debug!("dropping the split of {:?} into {a:?} and {b:?}", areas[idx]);
                continue;
            }
            areas[idx] = a;
            areas.insert(idx + 1, b);
        }
        if areas.len() < nb_areas {
            warn!("settled for {} areas out of {nb_areas}", areas.len());
        }

        let (min_side, max_side) = (self.config.room_min_side, self.config.room_max_side);
        let mut area_rooms: Vec<RoomId> = Vec::with_capacity(areas.len());
        for area in &areas {
            let rect = rng.sub_rect(area, min_side, max_side);
            area_rooms.push(self.room(rect.bl, rect.tr, None, true, rng));
        }

        for pair in area_rooms.windows(2).rev() {
            self.line_connect(pair[1], pair[0]);
        }
        debug!("level with {} rooms", area_rooms.len());
        Ok(areas)
    }

    /// Joins two rooms with a corridor as straight as possible, center to
    /// center.
    pub fn line_connect(&mut self, room1: RoomId, room2: RoomId) {
        let (Some(a), Some(b)) = (self.room_plan(room1), self.room_plan(room2)) else {
            return;
        };
        let (c1, c2) = (a.rect().center(), b.rect().center());
        for pos in line(c1, c2) {
            if let Some(tile) = self.map.get_tile_mut(pos) {
                *tile = Tile::Floor;
            }
        }
    }

    /// Indices of the mazes `pos` is touching, see [`MazePlan::touching`].
    pub fn touching_mazes(&self, pos: Position, ignore: &[Position]) -> Vec<usize> {
        self.mazes
            .iter()
            .enumerate()
            .filter(|(_, maze)| maze.touching(pos, ignore))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the mazes with `pos` in a room or a corridor.
    pub fn in_mazes(&self, pos: Position) -> Vec<usize> {
        self.mazes
            .iter()
            .enumerate()
            .filter(|(_, maze)| maze.contains(pos))
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether the three tiles ahead of `pivot`, coming from `from`, are
    /// either outside every maze or walls.
    pub fn free_front_cross(&self, from: Position, pivot: Position) -> DelveResult<bool> {
        for pos in self.map.front_cross(from, pivot)? {
            let is_wall = self.map.get_tile(pos).is_some_and(Tile::is_wall);
            if !self.in_mazes(pos).is_empty() && !is_wall {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Runs a maze algorithm over its rectangle.
    ///
    /// The rooms overlapping the rectangle join a new maze plan, which freezes
    /// their corners before any carving. Returns the index of the new plan.
    pub fn maze_fill(
        &mut self,
        algo: &mut dyn MazeFiller,
        rng: &mut DungeonRng,
    ) -> DelveResult<usize> {
        let rect = algo.rect();
        let mut plan = MazePlan::new(
            self.rooms
                .iter()
                .enumerate()
                .filter(|(_, room)| room.intersect(&rect))
                .map(|(i, room)| (RoomId(i), room)),
        );

        let carved = {
            let mut carver =
                MazeCarver::new(&mut self.map, &mut self.rooms, &mut plan, &self.mazes);
            algo.fill(&mut carver, rng)?;
            carver.carved()
        };
        debug!(
            "{} over {rect:?}: {carved} tiles carved, {} rooms",
            algo.algo_name(),
            plan.room_ids().count()
        );
        self.mazes.push(plan);
        Ok(self.mazes.len() - 1)
    }

    /// Merges every maze into a single one.
    pub fn merge_mazes(&mut self) -> Option<&MazePlan> {
        let merged = self
            .mazes
            .drain(..)
            .reduce(|merged, maze| merged.union(&maze))?;
        self.mazes.push(merged);
        self.mazes.last()
    }

    /// Scatters mood markers around a random spot of `room`.
    ///
    /// Moods are drawn from `source` until the vibe budget is spent or the
    /// source runs dry, and land on random traversable positions within
    /// `radius` of the spot, the spot itself excluded. Returns how many were
    /// placed.
    pub fn add_vibe(
        &mut self,
        room: RoomId,
        source: &mut dyn MoodSource,
        radius: u32,
        rng: &mut DungeonRng,
    ) -> DelveResult<usize> {
        let inside = self
            .room_plan(room)
            .and_then(|plan| plan.to_rect(true))
            .ok_or_else(|| DelveError::PlacementFailed(format!("{room} has no floor")))?;
        let center = rng.pos_in_rect(&inside);
        let area = self
            .map
            .traversable_scope(center, radius)
            .coords();

        let mut budget = config::VIBE_BUDGET;
        let mut placed = 0;
        while budget > 0 {
            let Some((mood, score)) = source.next_mood(rng) else {
                break;
            };
            let Some(coord) = rng.choice(&area).copied() else {
                break;
            };
            budget -= score;
            self.map.place(mood, coord, true)?;
            placed += 1;
        }
        debug!("{placed} moods around {center} in {room}");
        Ok(placed)
    }

    /// Checks that the floor of every room can be reached from the first one.
    pub fn validate_connectivity(&self) -> DelveResult<()> {
        let Some(start) = self
            .rooms
            .iter()
            .flat_map(|room| room.iter_tiles())
            .find(|pos| self.map.is_walkable(*pos))
        else {
            return Ok(());
        };

        let metrics = self.map.dist_metrics(start, None, None);
        for (i, room) in self.rooms.iter().enumerate() {
            let stranded = room
                .iter_tiles()
                .filter(|pos| self.map.is_free(*pos))
                .find(|pos| !metrics.contains(*pos));
            if let Some(pos) = stranded {
                return Err(DelveError::GenerationFailed(format!(
                    "{} is not connected to the rest of the level ({pos} is unreachable)",
                    RoomId(i)
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mood;

    fn small_builder() -> Builder {
        let mut config = GenerationConfig::for_testing(1);
        config.width = 30;
        config.height = 20;
        Builder::new(config)
    }

    #[test]
    fn test_room_uses_door_range() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(2);
        let id = builder.room(Position::new(1, 1), Position::new(6, 5), None, true, &mut rng);
        let room = builder.room_plan(id).unwrap();
        assert!((1..=5).contains(&room.doors_target()));
        assert_eq!(builder.map().get_tile(Position::new(3, 3)), Some(&Tile::Floor));
        assert_eq!(builder.map().get_tile(Position::new(1, 3)), Some(&Tile::Wall));

        let fixed = builder.room(Position::new(10, 1), Position::new(12, 3), Some(7), false, &mut rng);
        assert_eq!(builder.room_plan(fixed).unwrap().doors_target(), 7);
        assert_eq!(builder.rooms().len(), 2);
    }

    #[test]
    fn test_random_room_avoids_overlap() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(3);
        let mut placed = Vec::new();
        for _ in 0..6 {
            if let Some(rect) = builder.random_room((4, 6), 4, 10, &mut rng) {
                placed.push(rect);
            }
        }
        assert!(!placed.is_empty());
        for (i, a) in placed.iter().enumerate() {
            assert!(builder.map().rect().contains(a.tr));
            for b in &placed[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
        assert!(builder.random_room(31, 4, 3, &mut rng).is_none());
    }

    #[test]
    fn test_random_room_fails_when_crowded() {
        let mut config = GenerationConfig::for_testing(1);
        config.width = 5;
        config.height = 5;
        let mut builder = Builder::new(config);
        let mut rng = DungeonRng::new(10);
        builder.room(Position::new(1, 1), Position::new(3, 3), Some(1), true, &mut rng);
        // any 3x3 spot of a 5x5 map overlaps the middle room
        assert!(builder.random_room(3, 3, 0, &mut rng).is_none());
        assert!(builder.random_room(3, 3, 20, &mut rng).is_none());
        assert_eq!(builder.rooms().len(), 1);
    }

    #[test]
    fn test_random_room_refuses_flat_rooms() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(12);
        assert!(builder.random_room(0, 3, 0, &mut rng).is_none());
        assert!(builder.random_room(3, -2, 5, &mut rng).is_none());
        assert!(builder.random_room((-3, 0), 4, 5, &mut rng).is_none());
        assert!(builder.rooms().is_empty());
        assert!(builder.map().iter_tiles().all(|(_, t)| *t == Tile::SolidRock));
    }

    #[test]
    fn test_staircase_to_a_plain_tile_leaves_the_map_alone() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(13);
        builder.room(Position::new(2, 2), Position::new(8, 8), None, true, &mut rng);
        let before = builder.map().get_tile(Position::new(4, 4)).cloned();

        let mut below = Map::new(10, 10, Tile::Floor);
        let result = builder.staircase(
            Some(Position::new(4, 4)),
            '>',
            Some((&mut below, Position::new(5, 5))),
            &mut rng,
        );
        assert!(matches!(result, Err(DelveError::NotAConnector(_))));
        assert_eq!(builder.map().get_tile(Position::new(4, 4)).cloned(), before);
        assert_eq!(builder.map().arrival_pos(below.id()), None);
        assert_eq!(below.arrival_pos(builder.map().id()), None);
    }

    #[test]
    fn test_init_forgets_plans() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(11);
        builder.room(Position::new(1, 1), Position::new(5, 5), None, true, &mut rng);
        builder.init(12, 8, Tile::Floor);
        assert_eq!(builder.map().size(), (12, 8));
        assert!(builder.rooms().is_empty());
        assert!(builder.mazes().is_empty());
        assert_eq!(builder.map().get_tile(Position::new(1, 1)), Some(&Tile::Floor));
    }

    #[test]
    fn test_staircase_needs_rooms() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(4);
        assert!(matches!(
            builder.staircase(None, '>', None, &mut rng),
            Err(DelveError::PlacementFailed(_))
        ));

        builder.room(Position::new(2, 2), Position::new(8, 8), None, true, &mut rng);
        let pos = builder.staircase(None, '>', None, &mut rng).unwrap();
        assert!(Rect::from_coords(3, 3, 7, 7).contains(pos));

        let mut below = Map::new(10, 10, Tile::Floor);
        below
            .set_tile(Position::new(5, 5), Tile::Connector(Connector::new('<')))
            .unwrap();
        let down = builder
            .staircase(Some(Position::new(4, 4)), '>', Some((&mut below, Position::new(5, 5))), &mut rng)
            .unwrap();
        assert_eq!(below.arrival_pos(builder.map().id()), Some(Position::new(5, 5)));
        assert_eq!(builder.map().arrival_pos(below.id()), Some(down));
    }

    #[test]
    fn test_area_split_halves() {
        let builder = small_builder();
        let mut rng = DungeonRng::new(5);
        let rect = Rect::from_coords(0, 0, 29, 19);
        for _ in 0..50 {
            let (a, b) = builder.area_split(&rect, &mut rng).unwrap();
            assert!(!a.intersects(&b));
            assert_eq!(a.width() + b.width(), rect.width());
            assert_eq!(a.height(), rect.height());
            assert_eq!(a.tr.x % 2, 0);
            assert!(a.width() >= 7 && b.width() >= 7);
        }

        let tall = Rect::from_coords(3, 0, 9, 40);
        let (a, b) = builder.area_split(&tall, &mut rng).unwrap();
        assert_eq!(a.width(), tall.width());
        assert_eq!(b.tr, tall.tr);

        assert!(builder
            .area_split(&Rect::from_coords(0, 0, 2, 2), &mut rng)
            .is_err());
    }

    #[test]
    fn test_generate_level_is_connected() {
        for seed in 0..10 {
            let mut builder = small_builder();
            let mut rng = DungeonRng::new(seed);
            builder.generate_level(&mut rng).unwrap();
            assert!(builder.rooms().len() >= 2);
            builder.validate_connectivity().unwrap();
        }
    }

    #[test]
    fn test_generate_level_puts_a_room_in_every_area() {
        for seed in 0..20 {
            let mut settings = GenerationConfig::for_testing(seed);
            settings.height = 9;
            settings.min_split_side = 4;
            let mut builder = Builder::new(settings);
            let mut rng = DungeonRng::new(seed);
            let areas = builder.generate_level(&mut rng).unwrap();

            assert_eq!(builder.rooms().len(), areas.len());
            for (area, room) in areas.iter().zip(builder.rooms()) {
                assert!(area.min_side() >= config::MIN_AREA_SIDE);
                assert!(area.contains(room.rect().bl) && area.contains(room.rect().tr));
                assert!(room.to_rect(true).is_some());
            }
        }

        let mut narrow = Builder::new(GenerationConfig::for_testing(1));
        narrow.init(30, 2, Tile::SolidRock);
        assert!(matches!(
            narrow.generate_level(&mut DungeonRng::new(1)),
            Err(DelveError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_validate_connectivity_catches_islands() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(6);
        builder.room(Position::new(1, 1), Position::new(6, 6), Some(1), true, &mut rng);
        builder.room(Position::new(15, 1), Position::new(20, 6), Some(1), true, &mut rng);
        assert!(matches!(
            builder.validate_connectivity(),
            Err(DelveError::GenerationFailed(_))
        ));
        builder.line_connect(RoomId(0), RoomId(1));
        builder.validate_connectivity().unwrap();
    }

    #[test]
    fn test_maze_fill_freezes_room_corners() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(7);
        let id = builder.room(Position::new(4, 4), Position::new(10, 10), Some(3), true, &mut rng);
        let corners = builder.room_plan(id).unwrap().rect().corners();

        let rect = builder.map().rect();
        let idx = builder
            .maze_fill(&mut crate::RecursiveBacktracker::new(rect), &mut rng)
            .unwrap();
        assert_eq!(idx, 0);
        for corner in corners {
            assert!(builder.is_frozen(corner));
            assert_eq!(builder.map().get_tile(corner), Some(&Tile::Wall));
        }
        assert!(!builder.room_plan(id).unwrap().doors().is_empty());
        assert_eq!(builder.in_mazes(Position::new(5, 5)), vec![0]);
        assert!(builder.free_front_cross(Position::new(5, 7), Position::new(6, 7)).is_ok());
    }

    #[test]
    fn test_merge_mazes() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(8);
        assert!(builder.merge_mazes().is_none());

        let left = Rect::from_coords(0, 0, 14, 19);
        let right = Rect::from_coords(16, 0, 29, 19);
        builder
            .maze_fill(&mut crate::BinaryTree::new(left), &mut rng)
            .unwrap();
        builder
            .maze_fill(&mut crate::SideWinder::new(right), &mut rng)
            .unwrap();
        assert_eq!(builder.mazes().len(), 2);
        assert_eq!(builder.touching_mazes(Position::new(15, 19), &[]).len(), 2);

        let merged = builder.merge_mazes().unwrap();
        assert!(merged.contains(Position::new(0, 0)));
        assert!(merged.contains(Position::new(16, 0)));
        assert_eq!(builder.mazes().len(), 1);
    }

    #[test]
    fn test_add_vibe_spends_budget() {
        let mut builder = small_builder();
        let mut rng = DungeonRng::new(9);
        let id = builder.room(Position::new(2, 2), Position::new(12, 12), None, true, &mut rng);

        let mut source = |_: &mut DungeonRng| Some((Mood::new("guild", "calm"), 3));
        let placed = builder.add_vibe(id, &mut source, 8, &mut rng).unwrap();
        // 10 / 3 rounded up
        assert_eq!(placed, 4);
        assert_eq!(builder.map().iter_moods().count(), 4);

        // a 1x1 floor has no traversable tile around its center
        let cell = builder.room(Position::new(20, 2), Position::new(22, 4), None, true, &mut rng);
        assert_eq!(builder.add_vibe(cell, &mut source, 8, &mut rng).unwrap(), 0);
        assert!(builder.map().mood_at(Position::new(21, 3)).is_none());

        let mut empty = |_: &mut DungeonRng| -> Option<(Mood, i32)> { None };
        assert_eq!(builder.add_vibe(id, &mut empty, 8, &mut rng).unwrap(), 0);
        assert!(builder.add_vibe(RoomId(9), &mut empty, 8, &mut rng).is_err());
    }
}
