//! Sidewinder mazes: rows of horizontal runs, each run linked upward once.

use super::{CellGrid, MazeCarver, MazeFiller};
use crate::{DelveResult, DungeonRng, Position, Rect};
use log::debug;

/// Sidewinder maze generator.
#[derive(Debug, Clone)]
pub struct SideWinder {
    grid: CellGrid,
    close_prob: f64,
}

impl SideWinder {
    /// A sidewinder closing its runs half of the time.
    pub fn new(rect: Rect) -> Self {
        Self::with_branching(rect, 0.5)
    }

    /// A sidewinder closing its runs with probability `close_prob`; higher
    /// values give shorter runs and more vertical corridors.
    pub fn with_branching(rect: Rect, close_prob: f64) -> Self {
        Self {
            grid: CellGrid::new(rect),
            close_prob,
        }
    }

    fn finalize_run(
        &self,
        run: &mut Vec<Position>,
        carver: &mut MazeCarver<'_>,
        rng: &mut DungeonRng,
    ) -> DelveResult<()> {
        if let Some(cell) = rng.choice(run) {
            carver.carve(cell.offset(0, 1))?;
        }
        run.clear();
        Ok(())
    }
}

impl MazeFiller for SideWinder {
    fn rect(&self) -> Rect {
        self.grid.rect()
    }

    fn fill(&mut self, carver: &mut MazeCarver<'_>, rng: &mut DungeonRng) -> DelveResult<()> {
        let rect = self.grid.rect();
        for y in self.grid.rows() {
            let mut run = Vec::new();
            for cell in self.grid.row(y) {
                carver.carve(cell)?;
                run.push(cell);
                let right = cell.offset(1, 0);
                if self.grid.is_top_edge(cell) {
                    if rect.contains(right) {
                        carver.carve(right)?;
                    }
                } else if self.grid.is_right_edge(cell) || rng.rstest(self.close_prob) {
                    self.finalize_run(&mut run, carver, rng)?;
                } else {
                    carver.carve(right)?;
                }
            }
        }
        debug!("sidewinder filled {:?}", rect);
        Ok(())
    }

    fn algo_name(&self) -> &'static str {
        "sidewinder"
    }
}
