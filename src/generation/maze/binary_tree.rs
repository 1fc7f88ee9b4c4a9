//! Binary tree mazes: every cell links either up or right, which leaves two
//! long open corridors along the top and right edges.

use super::{CellGrid, MazeCarver, MazeFiller};
use crate::{DelveResult, DungeonRng, Rect};
use log::debug;

/// Binary tree maze generator.
#[derive(Debug, Clone)]
pub struct BinaryTree {
    grid: CellGrid,
}

impl BinaryTree {
    pub fn new(rect: Rect) -> Self {
        Self {
            grid: CellGrid::new(rect),
        }
    }
}

impl MazeFiller for BinaryTree {
    fn rect(&self) -> Rect {
        self.grid.rect()
    }

    fn fill(&mut self, carver: &mut MazeCarver<'_>, rng: &mut DungeonRng) -> DelveResult<()> {
        for cell in self.grid.cells() {
            carver.carve(cell)?;
            let mut choices = Vec::with_capacity(2);
            if !self.grid.is_right_edge(cell) {
                choices.push(cell.offset(1, 0));
            }
            if !self.grid.is_top_edge(cell) {
                choices.push(cell.offset(0, 1));
            }
            if let Some(link) = rng.choice(&choices) {
                carver.carve(*link)?;
            }
        }
        debug!("binary tree filled {:?}", self.grid.rect());
        Ok(())
    }

    fn algo_name(&self) -> &'static str {
        "binary-tree"
    }
}
