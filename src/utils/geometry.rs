//! # Grid Geometry
//!
//! Cartesian helpers for the tile grid. The origin is the bottom-left corner of
//! a map and `y` grows upward.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a 2D coordinate on a map.
///
/// Positions order by `x` first, then `y`. Priority queues rely on that order
/// to break ties deterministically.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.grid_distance(Position::new(7, 9)), 4);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Grid distance allowing diagonal moves: `max(|dx|, |dy|)`.
    ///
    /// This is not the length of a path around obstacles.
    pub fn grid_distance(self, other: Position) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    /// Calculates the Manhattan distance to another position.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether `other` sits on a 45 degree diagonal from this position.
    pub fn is_diagonal_to(self, other: Position) -> bool {
        if self.x == other.x || self.y == other.y {
            return false;
        }
        (self.x - other.x).abs() == (self.y - other.y).abs()
    }

    /// Mid-point between two positions, rounded toward negative infinity.
    ///
    /// When the two are close, the mid-point can be one of them.
    pub fn mid_point(self, other: Position) -> Position {
        Position::new(
            (self.x + other.x).div_euclid(2),
            (self.y + other.y).div_euclid(2),
        )
    }

    /// Returns the position translated by `(dx, dy)`.
    pub fn offset(self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// An axis-aligned rectangle stored as canonical bottom-left and top-right
/// corners. Both corners are part of the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub bl: Position,
    pub tr: Position,
}

impl Rect {
    /// Builds the rectangle spanned by two arbitrary opposite corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Position, Rect};
    ///
    /// let rect = Rect::new(Position::new(5, 1), Position::new(2, 4));
    /// assert_eq!(rect.bl, Position::new(2, 1));
    /// assert_eq!(rect.tr, Position::new(5, 4));
    /// ```
    pub fn new(corner1: Position, corner2: Position) -> Self {
        Self {
            bl: Position::new(corner1.x.min(corner2.x), corner1.y.min(corner2.y)),
            tr: Position::new(corner1.x.max(corner2.x), corner1.y.max(corner2.y)),
        }
    }

    /// Shorthand for `Rect::new` from raw coordinates.
    pub fn from_coords(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(Position::new(x1, y1), Position::new(x2, y2))
    }

    /// Number of columns covered by the rectangle.
    pub fn width(&self) -> i32 {
        self.tr.x - self.bl.x + 1
    }

    /// Number of rows covered by the rectangle.
    pub fn height(&self) -> i32 {
        self.tr.y - self.bl.y + 1
    }

    /// Shortest side of the rectangle.
    pub fn min_side(&self) -> i32 {
        self.width().min(self.height())
    }

    /// Whether `pos` is inside the rectangle, perimeter included.
    pub fn contains(&self, pos: Position) -> bool {
        self.bl.x <= pos.x && pos.x <= self.tr.x && self.bl.y <= pos.y && pos.y <= self.tr.y
    }

    /// Axis-aligned overlap test, touching edges count as overlapping.
    pub fn intersects(&self, other: &Rect) -> bool {
        if other.bl.x > self.tr.x || other.tr.x < self.bl.x {
            return false;
        }
        if other.bl.y > self.tr.y || other.tr.y < self.bl.y {
            return false;
        }
        true
    }

    /// Center of the rectangle, rounded toward the bottom-left.
    pub fn center(&self) -> Position {
        Position::new(
            self.bl.x + (self.tr.x - self.bl.x) / 2,
            self.bl.y + (self.tr.y - self.bl.y) / 2,
        )
    }

    /// The four corners: bottom-left, bottom-right, top-left, top-right.
    pub fn corners(&self) -> [Position; 4] {
        [
            self.bl,
            Position::new(self.tr.x, self.bl.y),
            Position::new(self.bl.x, self.tr.y),
            self.tr,
        ]
    }

    /// The rectangle shrunk by one tile on every side, if anything is left.
    pub fn inner(&self) -> Option<Rect> {
        if self.width() < 3 || self.height() < 3 {
            return None;
        }
        Some(Rect::from_coords(
            self.bl.x + 1,
            self.bl.y + 1,
            self.tr.x - 1,
            self.tr.y - 1,
        ))
    }

    /// Iterates column by column over every position of the rectangle.
    pub fn iter(&self) -> impl Iterator<Item = Position> {
        let (bl, tr) = (self.bl, self.tr);
        (bl.x..=tr.x).flat_map(move |x| (bl.y..=tr.y).map(move |y| Position::new(x, y)))
    }
}

/// Samples the straight line between the centers of two tiles.
///
/// Produces `grid_distance(a, b) + 1` evenly spaced tiles, truncating the
/// interpolated coordinates. Consecutive tiles are always 8-connected, so the
/// result can be walked one step at a time.
pub fn line(a: Position, b: Position) -> Vec<Position> {
    let nb_steps = a.grid_distance(b) as i64 + 1;
    let mult = (nb_steps - 1).max(1) as f64;
    let (x1, y1) = (a.x as f64 + 0.5, a.y as f64 + 0.5);
    let (x2, y2) = (b.x as f64 + 0.5, b.y as f64 + 0.5);

    (0..nb_steps)
        .map(|i| {
            let i = i as f64;
            let x = ((mult - i) * x1 + i * x2) / mult;
            let y = ((mult - i) * y1 + i * y2) / mult;
            Position::new(x.floor() as i32, y.floor() as i32)
        })
        .collect()
}
