//! # Text Rendering
//!
//! Diagnostic Unicode rendering of a map, with optional graduated axes and
//! sparse overlays drawn on top.

use crate::{Map, MapMetrics, Position};
use std::collections::HashMap;

/// A sparse layer of text drawn on top of a map.
///
/// Cells hold strings rather than chars so multi-codepoint glyphs survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapOverlay {
    cells: HashMap<Position, String>,
}

impl MapOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text shown at `pos`, replacing what was there.
    pub fn place(&mut self, pos: Position, text: impl Into<String>) {
        self.cells.insert(pos, text.into());
    }

    pub fn text_at(&self, pos: Position) -> Option<&str> {
        self.cells.get(&pos).map(String::as_str)
    }

    /// `(position, text)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &str)> {
        self.cells.iter().map(|(pos, text)| (*pos, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(Position, String)> for MapOverlay {
    fn from_iter<I: IntoIterator<Item = (Position, String)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Map {
    /// What is drawn at `pos` before overlays: an actor beats the top item,
    /// which beats the terrain.
    pub fn glyph_at(&self, pos: Position) -> Option<char> {
        if let Some(actor) = self.actor_at(pos) {
            return Some(actor.glyph);
        }
        if let Some(item) = self.items_at(pos).and_then(|stack| stack.last()) {
            return Some(item.glyph);
        }
        self.get_tile(pos).map(|tile| tile.glyph())
    }

    /// Shows the last digit of every distance in `metrics` as a new overlay.
    pub fn add_metrics_overlay(&mut self, metrics: &MapMetrics) {
        let overlay = metrics
            .iter()
            .map(|(pos, dist)| (pos, (dist % 10).to_string()))
            .collect();
        self.add_overlay(overlay);
    }

    /// Renders the map as text, origin in the bottom-left corner.
    ///
    /// With `axes`, a one-character margin on every side shows the tens digit
    /// of each multiple of ten and a tick on each other multiple of five.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Map, Position, Tile};
    ///
    /// let mut map = Map::new(3, 2, Tile::Floor);
    /// map.set_tile(Position::new(0, 1), Tile::Wall).unwrap();
    /// assert_eq!(map.to_text(false), "░..\n...");
    /// ```
    pub fn to_text(&self, axes: bool) -> String {
        let (w, h) = (self.width() as usize, self.height() as usize);
        // rows[y][x], bottom row first
        let mut rows: Vec<Vec<String>> = (0..h)
            .map(|y| {
                (0..w)
                    .map(|x| {
                        let pos = Position::new(x as i32, y as i32);
                        self.glyph_at(pos).map(String::from).unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        for overlay in self.overlays() {
            for (pos, text) in overlay.iter() {
                if self.is_in_map(pos) {
                    rows[pos.y as usize][pos.x as usize] = text.to_string();
                }
            }
        }

        if axes {
            rows = with_axes(rows, w, h);
        }

        let lines: Vec<String> = rows.iter().rev().map(|row| row.concat()).collect();
        lines.join("\n")
    }
}

fn axis_mark(i: usize, tick: &str) -> Option<String> {
    if i % 10 == 0 {
        Some(((i / 10) % 10).to_string())
    } else if i % 5 == 0 {
        Some(tick.to_string())
    } else {
        None
    }
}

fn with_axes(rows: Vec<Vec<String>>, w: usize, h: usize) -> Vec<Vec<String>> {
    let blank = || vec![" ".to_string(); w + 2];
    let mut framed = vec![blank()];
    for row in rows {
        let mut line = Vec::with_capacity(w + 2);
        line.push(String::from(" "));
        line.extend(row);
        line.push(String::from(" "));
        framed.push(line);
    }
    framed.push(blank());

    for x in 0..w {
        if let Some(mark) = axis_mark(x, "|") {
            framed[0][x + 1] = mark.clone();
            framed[h + 1][x + 1] = mark;
        }
    }
    for y in 0..h {
        if let Some(mark) = axis_mark(y, "–") {
            framed[y + 1][0] = mark.clone();
            framed[y + 1][w + 1] = mark;
        }
    }
    framed
}
