//! # Backtracking Mazes
//!
//! Randomized depth-first carving. Both generators keep their own stack of
//! pending cells instead of recursing, so the depth of the walk is bounded by
//! the heap rather than the call stack.

use super::{CellGrid, MazeCarver, MazeFiller};
use crate::{DelveResult, DungeonRng, Map, Position, Rect};
use log::debug;
use std::collections::HashSet;

/// Uniform recursive backtracker: long winding corridors, few branches.
#[derive(Debug, Clone)]
pub struct RecursiveBacktracker {
    grid: CellGrid,
    visited: HashSet<Position>,
}

impl RecursiveBacktracker {
    pub fn new(rect: Rect) -> Self {
        Self {
            grid: CellGrid::new(rect),
            visited: HashSet::new(),
        }
    }

    /// Cells reached by the last fill.
    pub fn visited(&self) -> &HashSet<Position> {
        &self.visited
    }

    fn unvisited_neighbors(&self, cell: Position) -> Vec<Position> {
        self.grid
            .neighbors(cell)
            .into_iter()
            .filter(|next| !self.visited.contains(next))
            .collect()
    }
}

impl MazeFiller for RecursiveBacktracker {
    fn rect(&self) -> Rect {
        self.grid.rect()
    }

    fn fill(&mut self, carver: &mut MazeCarver<'_>, rng: &mut DungeonRng) -> DelveResult<()> {
        let rect = self.grid.rect();
        let start = carver.map().cell_align(rng.pos_in_rect(&rect), &rect, rng);
        let start = self.grid.aligned(start)?;

        self.visited.clear();
        self.visited.insert(start);
        carver.carve(start)?;

        // every frame holds the options it has not tried yet, in shuffled order
        let mut options = self.unvisited_neighbors(start);
        rng.shuffle(&mut options);
        let mut stack = vec![(start, options)];

        while let Some((cell, options)) = stack.last_mut() {
            let cell = *cell;
            let Some(next) = options.pop() else {
                stack.pop();
                continue;
            };
            if self.visited.contains(&next) {
                continue;
            }
            carver.carve_link(cell, next)?;
            self.visited.insert(next);

            let mut next_options = self.unvisited_neighbors(next);
            rng.shuffle(&mut next_options);
            stack.push((next, next_options));
        }
        debug!(
            "backtracker filled {:?}: {} cells",
            rect,
            self.visited.len()
        );
        Ok(())
    }

    fn algo_name(&self) -> &'static str {
        "backtracker"
    }
}

/// A recursive backtracker whose choices can be skewed.
///
/// All biases are optional and combine by multiplying the weight of the
/// options they favour:
///
/// - straight line: keep going in the direction of the last step
/// - winding: stay close to a point of the rectangle
/// - destination: head toward a point, and stop once it is reached
///
/// Braiding turns dead ends into loops with the given probability, and the
/// fill ratio stops the walk once that fraction of the cells were visited.
///
/// # Examples
///
/// ```
/// use delve::{BiasedRecursiveBacktracker, Builder, DungeonRng, GenerationConfig};
///
/// let config = GenerationConfig::for_testing(5);
/// let mut builder = Builder::new(config);
/// let rect = builder.map().rect();
/// let mut algo = BiasedRecursiveBacktracker::new(rect)
///     .with_straight_line_bias(3.0)
///     .with_reconnect_prob(0.3)
///     .with_fill_ratio(0.5);
/// let mut rng = DungeonRng::new(5);
/// builder.maze_fill(&mut algo, &mut rng).unwrap();
/// assert!(algo.visited().len() * 2 >= algo.nb_cells());
/// ```
#[derive(Debug, Clone)]
pub struct BiasedRecursiveBacktracker {
    grid: CellGrid,
    visited: HashSet<Position>,
    start_offset: Option<(i32, i32)>,
    straight_line_bias: Option<f64>,
    winding_bias: Option<f64>,
    winding_offset: Option<(i32, i32)>,
    dest_bias: Option<f64>,
    dest_offset: Option<(i32, i32)>,
    reconnect_prob: Option<f64>,
    fill_ratio: f64,
}

/// One step of the biased walk.
#[derive(Debug, Clone, Copy)]
struct Frame {
    cur: Position,
    prev: Option<Position>,
    expanded: bool,
}

/// Where the walk starts and the points it is drawn to, once resolved.
struct Targets {
    winding: Option<Position>,
    dest: Option<Position>,
}

impl BiasedRecursiveBacktracker {
    /// An unbiased walk over the whole of `rect`.
    pub fn new(rect: Rect) -> Self {
        Self {
            grid: CellGrid::new(rect),
            visited: HashSet::new(),
            start_offset: None,
            straight_line_bias: None,
            winding_bias: None,
            winding_offset: None,
            dest_bias: None,
            dest_offset: None,
            reconnect_prob: None,
            fill_ratio: 1.0,
        }
    }

    /// Starts the walk near this offset from the bottom-left corner instead
    /// of at a random cell.
    pub fn with_start_offset(mut self, dx: i32, dy: i32) -> Self {
        self.start_offset = Some((dx, dy));
        self
    }

    pub fn with_straight_line_bias(mut self, bias: f64) -> Self {
        self.straight_line_bias = Some(bias);
        self
    }

    /// Favours the cells nearest to a point, random if `offset` is `None`.
    pub fn with_winding_bias(mut self, bias: f64, offset: Option<(i32, i32)>) -> Self {
        self.winding_bias = Some(bias);
        self.winding_offset = offset;
        self
    }

    /// Favours the cells nearest to a destination, random if `offset` is
    /// `None`. The walk stops once the destination is visited.
    pub fn with_dest_bias(mut self, bias: f64, offset: Option<(i32, i32)>) -> Self {
        self.dest_bias = Some(bias);
        self.dest_offset = offset;
        self
    }

    /// Stops the walk once the cell at `offset` is visited, without biasing
    /// the choices toward it.
    pub fn with_dest_offset(mut self, dx: i32, dy: i32) -> Self {
        self.dest_offset = Some((dx, dy));
        self
    }

    /// Probability in `0..=1` to turn a dead end into a loop.
    pub fn with_reconnect_prob(mut self, prob: f64) -> Self {
        self.reconnect_prob = Some(prob);
        self
    }

    /// Fraction of the cells in `0..=1` to visit before stopping.
    pub fn with_fill_ratio(mut self, ratio: f64) -> Self {
        self.fill_ratio = ratio;
        self
    }

    /// Cells reached by the last fill.
    pub fn visited(&self) -> &HashSet<Position> {
        &self.visited
    }

    pub fn nb_cells(&self) -> usize {
        self.grid.nb_cells()
    }

    /// The cell nearest to `offset` from the bottom-left corner, or a random
    /// cell without an offset.
    fn start_cell(
        &self,
        map: &Map,
        offset: Option<(i32, i32)>,
        rng: &mut DungeonRng,
    ) -> DelveResult<Position> {
        let rect = self.grid.rect();
        let coord = match offset {
            Some((dx, dy)) => Position::new(
                (rect.bl.x + dx).clamp(rect.bl.x, rect.tr.x),
                (rect.bl.y + dy).clamp(rect.bl.y, rect.tr.y),
            ),
            None => rng.pos_in_rect(&rect),
        };
        self.grid.aligned(map.cell_align(coord, &rect, rng))
    }

    fn is_done(&self, targets: &Targets) -> bool {
        if self.visited.len() as f64 >= self.fill_ratio * self.grid.nb_cells() as f64 {
            return true;
        }
        targets
            .dest
            .is_some_and(|dest| self.visited.contains(&dest))
    }

    fn step_options(&self, cur: Position) -> Vec<Position> {
        self.grid
            .neighbors(cur)
            .into_iter()
            .filter(|next| !self.visited.contains(next))
            .collect()
    }

    /// Multiplies the weight of the options nearest to `center`.
    fn favour_nearest(options: &[Position], weights: &mut [f64], center: Position, bias: f64) {
        let dists: Vec<f64> = options
            .iter()
            .map(|opt| center.euclidean_distance(*opt))
            .collect();
        let min_dist = dists.iter().copied().fold(f64::INFINITY, f64::min);
        for (weight, dist) in weights.iter_mut().zip(dists) {
            if dist < min_dist + 0.5 {
                *weight *= bias;
            }
        }
    }

    fn next_cell(
        &self,
        map: &Map,
        options: &[Position],
        frame: &Frame,
        targets: &Targets,
        rng: &mut DungeonRng,
    ) -> Option<Position> {
        // every bias depends on the previous step, the first one is uniform
        let Some(prev) = frame.prev else {
            return rng.choice(options).copied();
        };

        let mut weights = vec![1.0; options.len()];
        if let Some(bias) = self.straight_line_bias {
            let straight = map.opposite(prev, frame.cur);
            for (weight, opt) in weights.iter_mut().zip(options) {
                if Some(*opt) == straight {
                    *weight *= bias;
                }
            }
        }
        if let (Some(bias), Some(center)) = (self.winding_bias, targets.winding) {
            Self::favour_nearest(options, &mut weights, center, bias);
        }
        if let (Some(bias), Some(dest)) = (self.dest_bias, targets.dest) {
            Self::favour_nearest(options, &mut weights, dest, bias);
        }
        rng.weighted_choice(options, &weights).copied()
    }

    /// Opens the wall between a dead end and the cell straight ahead of it.
    ///
    /// That cell is always visited already, so this closes a loop.
    fn braid(&self, frame: &Frame, carver: &mut MazeCarver<'_>, rng: &mut DungeonRng) -> DelveResult<()> {
        let (Some(prob), Some(prev)) = (self.reconnect_prob, frame.prev) else {
            return Ok(());
        };
        if frame.expanded || !rng.rstest(prob) {
            return Ok(());
        }
        let ahead = carver
            .map()
            .opposite(prev, frame.cur)
            .filter(|pos| self.grid.rect().contains(*pos));
        if let Some(ahead) = ahead {
            carver.carve(frame.cur.mid_point(ahead))?;
        }
        Ok(())
    }
}

impl MazeFiller for BiasedRecursiveBacktracker {
    fn rect(&self) -> Rect {
        self.grid.rect()
    }

    fn fill(&mut self, carver: &mut MazeCarver<'_>, rng: &mut DungeonRng) -> DelveResult<()> {
        let start = self.start_cell(carver.map(), self.start_offset, rng)?;
        let targets = Targets {
            winding: match self.winding_bias {
                Some(_) => Some(self.start_cell(carver.map(), self.winding_offset, rng)?),
                None => None,
            },
            dest: if self.dest_bias.is_some() || self.dest_offset.is_some() {
                Some(self.start_cell(carver.map(), self.dest_offset, rng)?)
            } else {
                None
            },
        };

        self.visited.clear();
        self.visited.insert(start);
        carver.carve(start)?;
        let mut stack = vec![Frame {
            cur: start,
            prev: None,
            expanded: false,
        }];

        while let Some(frame) = stack.last().copied() {
            if self.is_done(&targets) {
                break;
            }
            let options = self.step_options(frame.cur);
            let step = self.next_cell(carver.map(), &options, &frame, &targets, rng);
            let Some(step) = step else {
                self.braid(&frame, carver, rng)?;
                stack.pop();
                continue;
            };

            carver.carve_link(frame.cur, step)?;
            self.visited.insert(step);
            if let Some(top) = stack.last_mut() {
                top.expanded = true;
            }
            stack.push(Frame {
                cur: step,
                prev: Some(frame.cur),
                expanded: false,
            });
        }
        debug!(
            "biased backtracker filled {:?}: {}/{} cells",
            self.grid.rect(),
            self.visited.len(),
            self.grid.nb_cells()
        );
        Ok(())
    }

    fn algo_name(&self) -> &'static str {
        "biased-backtracker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MazePlan, Tile};

    fn run(algo: &mut dyn MazeFiller, width: i32, height: i32, seed: u64) -> Map {
        let mut map = Map::new(width, height, Tile::SolidRock);
        let mut plan = MazePlan::default();
        let mut rng = DungeonRng::new(seed);
        let mut carver = MazeCarver::new(&mut map, &mut [], &mut plan, &[]);
        algo.fill(&mut carver, &mut rng).unwrap();
        map
    }

    fn floor_count(map: &Map) -> usize {
        map.iter_tiles().filter(|(_, t)| **t == Tile::Floor).count()
    }

    #[test]
    fn test_backtracker_visits_every_cell_once() {
        let rect = Rect::from_coords(0, 0, 20, 12);
        let mut algo = RecursiveBacktracker::new(rect);
        let map = run(&mut algo, 21, 13, 9);
        let grid = CellGrid::new(rect);

        assert_eq!(algo.visited().len(), grid.nb_cells());
        for cell in grid.cells() {
            assert_eq!(map.get_tile(cell), Some(&Tile::Floor));
        }
        // a perfect maze: one link less than cells
        assert_eq!(floor_count(&map), grid.nb_cells() * 2 - 1);
    }

    #[test]
    fn test_backtracker_is_deterministic() {
        let rect = Rect::from_coords(0, 0, 14, 8);
        let a = run(&mut RecursiveBacktracker::new(rect), 15, 9, 77);
        let b = run(&mut RecursiveBacktracker::new(rect), 15, 9, 77);
        assert_eq!(a.to_text(false), b.to_text(false));
    }

    #[test]
    fn test_unbiased_walk_fills_everything() {
        let rect = Rect::from_coords(0, 0, 16, 10);
        let mut algo = BiasedRecursiveBacktracker::new(rect).with_straight_line_bias(3.0);
        let map = run(&mut algo, 17, 11, 4);
        assert_eq!(algo.visited().len(), algo.nb_cells());
        assert_eq!(floor_count(&map), algo.nb_cells() * 2 - 1);
    }

    #[test]
    fn test_fill_ratio_stops_early() {
        let rect = Rect::from_coords(0, 0, 30, 20);
        let mut algo = BiasedRecursiveBacktracker::new(rect).with_fill_ratio(0.25);
        run(&mut algo, 31, 21, 6);
        let target = (algo.nb_cells() as f64 * 0.25).ceil() as usize;
        assert_eq!(algo.visited().len(), target);
    }

    #[test]
    fn test_destination_stops_the_walk() {
        let rect = Rect::from_coords(0, 0, 30, 20);
        let mut algo = BiasedRecursiveBacktracker::new(rect)
            .with_start_offset(0, 0)
            .with_dest_bias(5.0, Some((30, 20)));
        run(&mut algo, 31, 21, 8);
        assert!(algo.visited().contains(&Position::new(30, 20)));
        assert!(algo.visited().len() < algo.nb_cells());
    }

    #[test]
    fn test_braiding_adds_loops() {
        let rect = Rect::from_coords(0, 0, 20, 14);
        let mut perfect = BiasedRecursiveBacktracker::new(rect);
        let mut braided = BiasedRecursiveBacktracker::new(rect).with_reconnect_prob(1.0);
        let plain = run(&mut perfect, 21, 15, 12);
        let loopy = run(&mut braided, 21, 15, 12);

        assert_eq!(floor_count(&plain), perfect.nb_cells() * 2 - 1);
        assert!(floor_count(&loopy) > braided.nb_cells() * 2 - 1);
    }
}
