//! # Spatial Queries
//!
//! Rings, adjacency, line of sight and the small geometric helpers used by
//! the maze builders.

use crate::{line, DelveError, DelveResult, DungeonRng, Map, Position, Rect, Tile};

/// Configurable enumeration of the square ring around a center.
///
/// Built by [`Map::ring_query`]. Positions come out counter-clockwise from the
/// bottom-left corner of the ring unless shuffled. Filters apply in this
/// order: in-map, shuffle, custom filter, free.
pub struct RingQuery<'m, 'f> {
    map: &'m Map,
    center: Position,
    radius: u32,
    in_map_only: bool,
    free_only: bool,
    filter: Option<&'f dyn Fn(Position) -> bool>,
}

impl<'m, 'f> RingQuery<'m, 'f> {
    /// Keep (the default) or drop positions outside of the map.
    pub fn in_map_only(mut self, in_map_only: bool) -> Self {
        self.in_map_only = in_map_only;
        self
    }

    /// Keep only positions an actor could step on right now.
    pub fn free_only(mut self) -> Self {
        self.free_only = true;
        self
    }

    /// Keep only positions accepted by `filter`.
    pub fn filter(mut self, filter: &'f dyn Fn(Position) -> bool) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Valid positions in ring order.
    pub fn positions(self) -> Vec<Position> {
        self.sift(None).into_iter().flatten().collect()
    }

    /// Valid positions in random order.
    pub fn shuffled(self, rng: &mut DungeonRng) -> Vec<Position> {
        self.sift(Some(rng)).into_iter().flatten().collect()
    }

    /// Every raw ring slot, with `None` where a filter rejected the position.
    ///
    /// Indices stay aligned with the unfiltered ring order.
    pub fn slots(self) -> Vec<Option<Position>> {
        self.sift(None)
    }

    fn sift(self, rng: Option<&mut DungeonRng>) -> Vec<Option<Position>> {
        let map = self.map;
        let mut slots: Vec<Option<Position>> = raw_ring(self.center, self.radius)
            .into_iter()
            .map(Some)
            .collect();

        if self.in_map_only {
            keep(&mut slots, |pos| map.is_in_map(pos));
        }
        if let Some(rng) = rng {
            rng.shuffle(&mut slots);
        }
        if let Some(filter) = self.filter {
            keep(&mut slots, filter);
        }
        if self.free_only {
            keep(&mut slots, |pos| map.is_free(pos));
        }
        slots
    }
}

fn keep(slots: &mut [Option<Position>], pred: impl Fn(Position) -> bool) {
    for slot in slots.iter_mut() {
        if slot.is_some_and(|pos| !pred(pos)) {
            *slot = None;
        }
    }
}

/// The `8 * radius` coordinates at exactly `radius` from `center`,
/// counter-clockwise from the bottom-left corner.
pub fn raw_ring(center: Position, radius: u32) -> Vec<Position> {
    let r = radius as i32;
    if r == 0 {
        return vec![center];
    }
    let (x, y) = (center.x, center.y);
    let mut tiles = Vec::with_capacity(8 * radius as usize);
    for i in -r..=r {
        tiles.push(Position::new(x + i, y - r));
    }
    for j in (-r + 1)..=r {
        tiles.push(Position::new(x + r, y + j));
    }
    for i in (-r..r).rev() {
        tiles.push(Position::new(x + i, y + r));
    }
    for j in ((-r + 1)..r).rev() {
        tiles.push(Position::new(x - r, y + j));
    }
    tiles
}

impl Map {
    /// Starts a ring enumeration; see [`RingQuery`].
    pub fn ring_query(&self, center: Position, radius: u32) -> RingQuery<'_, '_> {
        RingQuery {
            map: self,
            center,
            radius,
            in_map_only: true,
            free_only: false,
            filter: None,
        }
    }

    /// In-map positions at exactly `radius` from `center`.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Map, Position, Tile};
    ///
    /// let map = Map::new(9, 9, Tile::Floor);
    /// assert_eq!(map.ring(Position::new(4, 4), 2).len(), 16);
    /// assert_eq!(map.ring(Position::new(0, 0), 1).len(), 3);
    /// ```
    pub fn ring(&self, center: Position, radius: u32) -> Vec<Position> {
        self.ring_query(center, radius).positions()
    }

    /// In-map neighbours of `pos`.
    pub fn adjacents(&self, pos: Position) -> Vec<Position> {
        self.ring(pos, 1)
    }

    /// Neighbours of `pos` an actor could step on.
    pub fn free_adjacents(&self, pos: Position) -> Vec<Position> {
        self.ring_query(pos, 1).free_only().positions()
    }

    /// Grid distance between two points: diagonal moves count as one step.
    pub fn distance(&self, a: Position, b: Position) -> u32 {
        a.grid_distance(b)
    }

    /// The tiles seen on the straight line from `a` to `b`, or `None` as soon
    /// as one of them blocks the view.
    ///
    /// Both endpoints are sampled, so the result has `distance(a, b) + 1`
    /// positions.
    pub fn line_of_sight(&self, a: Position, b: Position) -> Option<Vec<Position>> {
        let steps = line(a, b);
        for pos in &steps {
            if !self.get_tile(*pos).is_some_and(Tile::is_transparent) {
                return None;
            }
        }
        Some(steps)
    }

    /// The position opposite to `from` relative to `pivot`, if inside the map.
    pub fn opposite(&self, from: Position, pivot: Position) -> Option<Position> {
        let there = pivot + (pivot - from);
        self.is_in_map(there).then_some(there)
    }

    /// The four positions in straight line around `pos`.
    pub fn cross(&self, pos: Position) -> [Position; 4] {
        [
            pos.offset(-1, 0),
            pos.offset(1, 0),
            pos.offset(0, -1),
            pos.offset(0, 1),
        ]
    }

    /// Straight-line steps from `pivot` that do not go back to `from`.
    pub fn front_cross(&self, from: Position, pivot: Position) -> DelveResult<Vec<Position>> {
        in_line(from, pivot)?;
        Ok(self
            .cross(pivot)
            .into_iter()
            .filter(|pos| *pos != from)
            .collect())
    }

    /// The two diagonals of `pivot` moving away from `from`.
    pub fn front_diags(&self, from: Position, pivot: Position) -> DelveResult<[Position; 2]> {
        let (dx, dy) = in_line(from, pivot)?;
        Ok(if dx == 0 {
            [pivot.offset(-1, dy), pivot.offset(1, dy)]
        } else {
            [pivot.offset(dx, -1), pivot.offset(dx, 1)]
        })
    }

    /// The two diagonals of `pivot` on the side of `from`.
    pub fn back_diags(&self, from: Position, pivot: Position) -> DelveResult<[Position; 2]> {
        let (dx, dy) = in_line(from, pivot)?;
        Ok(if dx == 0 {
            [pivot.offset(-1, -dy), pivot.offset(1, -dy)]
        } else {
            [pivot.offset(-dx, -1), pivot.offset(-dx, 1)]
        })
    }

    /// Longest run of consecutive connected neighbours around `pos`.
    ///
    /// Walks the neighbour ring, wrapping around once, and counts tiles that
    /// are in the map and not solid rock. The ring must start on a diagonal
    /// for the count to mean anything, otherwise the call fails.
    pub fn connectedness(&self, pos: Position) -> DelveResult<u32> {
        let adjs = self.ring_query(pos, 1).slots();

        if let Some(first) = adjs.iter().step_by(2).flatten().next() {
            if !pos.is_diagonal_to(*first) {
                return Err(DelveError::InvalidGeometry(format!(
                    "adjacents for {pos} do not start on a diagonal"
                )));
            }
        }

        let is_conn = |slot: &Option<Position>| {
            slot.and_then(|p| self.get_tile(p).copied())
                .is_some_and(|tile| tile != Tile::SolidRock)
        };

        let size = adjs.len();
        let mut max_conn = 0;
        let mut cur_conn = 0;
        for i in 0..(size * 2 - 1) {
            if is_conn(&adjs[i % size]) {
                cur_conn += 1;
            } else {
                max_conn = max_conn.max(cur_conn);
                cur_conn = 0;
                if i >= size - 1 {
                    break;
                }
            }
        }
        Ok(max_conn.max(cur_conn).min(size as u32))
    }

    /// Shifts `pos` onto the 2x2 cell grid anchored at `rect`'s bottom-left
    /// corner, picking the shift direction at random but staying in `rect`.
    pub fn cell_align(&self, pos: Position, rect: &Rect, rng: &mut DungeonRng) -> Position {
        let shift = rng.sign();
        let mut aligned = pos;
        if (aligned.x - rect.bl.x).rem_euclid(2) == 1 {
            aligned.x += if rect.contains(aligned.offset(shift, 0)) {
                shift
            } else {
                -shift
            };
        }
        if (aligned.y - rect.bl.y).rem_euclid(2) == 1 {
            aligned.y += if rect.contains(aligned.offset(0, shift)) {
                shift
            } else {
                -shift
            };
        }
        aligned
    }
}

fn in_line(from: Position, pivot: Position) -> DelveResult<(i32, i32)> {
    let (dx, dy) = (pivot.x - from.x, pivot.y - from.y);
    if (dx == 0) == (dy == 0) {
        return Err(DelveError::InvalidGeometry(format!(
            "{from} and {pivot} are not in line"
        )));
    }
    Ok((dx.signum(), dy.signum()))
}
