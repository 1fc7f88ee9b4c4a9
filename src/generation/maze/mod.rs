//! # Maze Generation
//!
//! Maze algorithms work on "cells": the positions of a rectangle whose
//! offsets from the bottom-left corner are both even. Carving a cell and the
//! tile between two neighbouring cells leaves one tile of rock between
//! parallel corridors.
//!
//! Algorithms never write to the map directly. They go through a
//! [`MazeCarver`], which skips frozen tiles and keeps the maze plan of the
//! builder up to date.

pub mod backtracker;
pub mod binary_tree;
pub mod sidewinder;

pub use backtracker::*;
pub use binary_tree::*;
pub use sidewinder::*;

use crate::{DelveError, DelveResult, DungeonRng, Map, MazePlan, Position, Rect, RoomPlan};

/// A maze generation algorithm.
pub trait MazeFiller {
    /// The area this algorithm fills.
    fn rect(&self) -> Rect;

    /// Fills [`MazeFiller::rect`] with a maze, as completely as the algorithm
    /// allows.
    fn fill(&mut self, carver: &mut MazeCarver<'_>, rng: &mut DungeonRng) -> DelveResult<()>;

    /// Short name for logs.
    fn algo_name(&self) -> &'static str;
}

/// The 2x2 cell lattice of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGrid {
    rect: Rect,
}

impl CellGrid {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Whether `pos` is a cell of the lattice.
    pub fn is_cell(&self, pos: Position) -> bool {
        self.rect.contains(pos)
            && (pos.x - self.rect.bl.x) % 2 == 0
            && (pos.y - self.rect.bl.y) % 2 == 0
    }

    /// Hands `pos` back if it is a cell, fails otherwise.
    pub fn aligned(&self, pos: Position) -> DelveResult<Position> {
        if self.is_cell(pos) {
            Ok(pos)
        } else {
            Err(DelveError::GenerationFailed(format!(
                "{pos} is not a maze cell of {:?}",
                self.rect
            )))
        }
    }

    /// Cells along one row, left to right.
    pub fn row(&self, y: i32) -> impl Iterator<Item = Position> {
        let (x1, x2) = (self.rect.bl.x, self.rect.tr.x);
        (x1..=x2).step_by(2).map(move |x| Position::new(x, y))
    }

    /// Rows of cells, bottom to top, as their `y` coordinate.
    pub fn rows(&self) -> impl Iterator<Item = i32> {
        (self.rect.bl.y..=self.rect.tr.y).step_by(2)
    }

    /// Every cell, row by row from the bottom.
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let grid = *self;
        self.rows().flat_map(move |y| grid.row(y))
    }

    /// How many cells the lattice holds.
    pub fn nb_cells(&self) -> usize {
        let w = (self.rect.width() + 1) / 2;
        let h = (self.rect.height() + 1) / 2;
        (w * h) as usize
    }

    /// No cell above `pos` in the rectangle.
    pub fn is_top_edge(&self, pos: Position) -> bool {
        !self.rect.contains(pos.offset(0, 2))
    }

    /// No cell right of `pos` in the rectangle.
    pub fn is_right_edge(&self, pos: Position) -> bool {
        !self.rect.contains(pos.offset(2, 0))
    }

    /// The cells two steps away in straight line, inside the rectangle.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        [(2, 0), (-2, 0), (0, 2), (0, -2)]
            .into_iter()
            .map(|(dx, dy)| pos.offset(dx, dy))
            .filter(|next| self.rect.contains(*next))
            .collect()
    }
}

/// Write access to the map for maze algorithms.
///
/// Every carve goes through the maze plan: walls of planned rooms become
/// doors, open rooms are left alone, and anything else becomes a corridor.
/// Frozen tiles, of this plan or of any earlier one, are never touched.
pub struct MazeCarver<'a> {
    map: &'a mut Map,
    rooms: &'a mut [RoomPlan],
    plan: &'a mut MazePlan,
    earlier: &'a [MazePlan],
    carved: usize,
}

impl<'a> MazeCarver<'a> {
    pub fn new(
        map: &'a mut Map,
        rooms: &'a mut [RoomPlan],
        plan: &'a mut MazePlan,
        earlier: &'a [MazePlan],
    ) -> Self {
        Self {
            map,
            rooms,
            plan,
            earlier,
            carved: 0,
        }
    }

    pub fn map(&self) -> &Map {
        self.map
    }

    pub fn is_frozen(&self, pos: Position) -> bool {
        self.plan.is_frozen(pos) || self.earlier.iter().any(|maze| maze.is_frozen(pos))
    }

    /// Opens `pos`. Returns whether anything was done: frozen tiles and
    /// positions outside of the map are skipped.
    pub fn carve(&mut self, pos: Position) -> DelveResult<bool> {
        if self.is_frozen(pos) || !self.map.is_in_map(pos) {
            return Ok(false);
        }
        self.plan.add(pos, self.map, self.rooms)?;
        self.carved += 1;
        Ok(true)
    }

    /// Opens two neighbouring cells and the tile between them.
    pub fn carve_link(&mut self, from: Position, to: Position) -> DelveResult<()> {
        self.carve(from.mid_point(to))?;
        self.carve(to)?;
        Ok(())
    }

    /// How many positions were carved so far.
    pub fn carved(&self) -> usize {
        self.carved
    }
}
