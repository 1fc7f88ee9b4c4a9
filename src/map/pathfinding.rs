//! # Pathfinding
//!
//! A* search for single paths and a uniform-cost frontier expansion that
//! measures the distance to every reachable position.

use crate::{Map, Position};
use log::trace;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Distance metrics from a single starting point.
///
/// Built once by [`Map::dist_metrics`], read-only afterwards.
#[derive(Debug, Clone)]
pub struct MapMetrics {
    start: Position,
    dists: HashMap<Position, u32>,
    prevs: HashMap<Position, Position>,
    furthest_pos: Position,
    furthest_dist: u32,
}

impl MapMetrics {
    fn new(start: Position) -> Self {
        Self {
            start,
            dists: HashMap::from([(start, 0)]),
            prevs: HashMap::new(),
            furthest_pos: start,
            furthest_dist: 0,
        }
    }

    fn set(&mut self, pos: Position, dist: u32) {
        if dist > self.furthest_dist {
            self.furthest_dist = dist;
            self.furthest_pos = pos;
        }
        self.dists.insert(pos, dist);
    }

    /// Records that `here` is the optimal step before `there`.
    fn add_edge(&mut self, here: Position, there: Position) {
        self.prevs.insert(there, here);
    }

    pub fn start(&self) -> Position {
        self.start
    }

    /// Distance from the start, `None` if `pos` was not reached.
    pub fn get(&self, pos: Position) -> Option<u32> {
        self.dists.get(&pos).copied()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.dists.contains_key(&pos)
    }

    /// `(position, distance)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, u32)> + '_ {
        self.dists.iter().map(|(pos, dist)| (*pos, *dist))
    }

    /// Reached positions in no particular order, the start included.
    pub fn coords(&self) -> impl Iterator<Item = Position> + '_ {
        self.dists.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.dists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dists.is_empty()
    }

    /// The furthest position found and its distance.
    pub fn furthest(&self) -> (Position, u32) {
        (self.furthest_pos, self.furthest_dist)
    }

    /// Positions from the start to `pos`, both endpoints included.
    ///
    /// Returns `None` when no route to `pos` is known.
    pub fn path(&self, pos: Position) -> Option<Vec<Position>> {
        let mut path = vec![pos];
        let mut current = pos;
        while current != self.start {
            current = *self.prevs.get(&current)?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

impl Map {
    /// Optimal path from `start` to `goal` around obstacles, A* style.
    ///
    /// Steps only go through free tiles, except for `goal` itself which may be
    /// occupied. Both endpoints are part of the returned path; `None` means no
    /// route exists.
    ///
    /// The priority queue has no decrease-key: improved positions are pushed
    /// again and stale entries are skipped when popped.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Map, Position, Tile};
    ///
    /// let map = Map::new(6, 6, Tile::Floor);
    /// let path = map.shortest_path(Position::new(0, 0), Position::new(5, 3)).unwrap();
    /// assert_eq!(path.len(), 6);
    /// ```
    pub fn shortest_path(&self, start: Position, goal: Position) -> Option<Vec<Position>> {
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut g_scores: HashMap<Position, u32> = HashMap::from([(start, 0)]);
        let mut open_set: HashSet<Position> = HashSet::from([start]);
        let mut open_q = BinaryHeap::new();
        open_q.push(Reverse((self.distance(start, goal), start)));

        while let Some(Reverse((_, current))) = open_q.pop() {
            if !open_set.remove(&current) {
                continue;
            }
            if current == goal {
                let path = rebuild_path(start, goal, &came_from);
                trace!("path {start} -> {goal}: {} steps", path.len() - 1);
                return Some(path);
            }

            let g_current = g_scores[&current];
            for pos in self.adjacents(current) {
                if pos != goal && !self.is_free(pos) {
                    continue;
                }
                let g_score = g_current + self.distance(current, pos);
                if g_scores.get(&pos).map_or(true, |&known| g_score < known) {
                    came_from.insert(pos, current);
                    g_scores.insert(pos, g_score);
                    open_q.push(Reverse((g_score + self.distance(pos, goal), pos)));
                    open_set.insert(pos);
                }
            }
        }
        trace!("no path {start} -> {goal}");
        None
    }

    /// Distance to every free position reachable from `start`.
    ///
    /// Stops early once `dest` is popped from the frontier, and never expands
    /// positions already `max_dist` steps away.
    pub fn dist_metrics(
        &self,
        start: Position,
        dest: Option<Position>,
        max_dist: Option<u32>,
    ) -> MapMetrics {
        let mut metrics = MapMetrics::new(start);
        let mut open_q = BinaryHeap::from([Reverse((0u32, start))]);
        let mut done: HashSet<Position> = HashSet::new();

        while let Some(Reverse((dist, current))) = open_q.pop() {
            if Some(current) == dest {
                break;
            }
            if done.contains(&current) || Some(dist) == max_dist {
                continue;
            }
            let not_done = |pos: Position| !done.contains(&pos);
            let next = self
                .ring_query(current, 1)
                .filter(&not_done)
                .free_only()
                .positions();
            for pos in next {
                if metrics.get(pos).map_or(true, |known| known > dist + 1) {
                    metrics.set(pos, dist + 1);
                    metrics.add_edge(current, pos);
                }
                open_q.push(Reverse((dist + 1, pos)));
            }
            done.insert(current);
        }
        trace!(
            "metrics from {start}: {} positions, furthest {:?}",
            metrics.len(),
            metrics.furthest()
        );
        metrics
    }
}

fn rebuild_path(
    start: Position,
    goal: Position,
    came_from: &HashMap<Position, Position>,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}
