//! # Generation Module
//!
//! Procedural level generation: rooms, area partitioning, staircases and the
//! maze carving algorithms.
//!
//! The [`Builder`] owns the map being generated together with the room and
//! maze bookkeeping. Maze algorithms implement [`MazeFiller`] and are handed
//! to [`Builder::maze_fill`], which runs them through a carver that respects
//! frozen tiles and turns carved room walls into doors.

pub mod builder;
pub mod maze;
pub mod maze_plan;
pub mod room;

pub use builder::*;
pub use maze::*;
pub use maze_plan::*;
pub use room::*;

use crate::{config, DelveResult, DungeonRng, Mood};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for level generation.
///
/// Controls the map size, room and door budgets, and the default biases of
/// the maze algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub width: i32,
    /// Map height in tiles
    pub height: i32,
    /// Inclusive range for the door target of rooms placed without one
    pub doors_range: (u32, u32),
    /// How many times more likely a maze keeps going straight
    pub straight_line_bias: f64,
    /// Probability that a sidewinder run closes and branches upward
    pub branching_factor: f64,
    /// Inclusive width range for random rooms
    pub room_width_range: (i32, i32),
    /// Inclusive height range for random rooms
    pub room_height_range: (i32, i32),
    /// Extra attempts when a random room collides with existing rooms
    pub room_retries: u32,
    /// Inclusive range for the number of areas a level is split into
    pub area_count_range: (i32, i32),
    /// Attempts at bisecting areas before settling for fewer
    pub split_attempts: u32,
    /// Areas with a side shorter than this are not split further
    pub min_split_side: i32,
    /// Smallest side of the room placed in each area
    pub room_min_side: i32,
    /// Largest side of the room placed in each area
    pub room_max_side: i32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.seed, 7);
    /// assert!(config.room_max_side >= config.room_min_side);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::DEFAULT_MAP_WIDTH,
            height: config::DEFAULT_MAP_HEIGHT,
            doors_range: (1, 5),
            straight_line_bias: 3.0,
            branching_factor: 0.5,
            room_width_range: (5, 12),
            room_height_range: (5, 8),
            room_retries: 4,
            area_count_range: (3, 8),
            split_attempts: config::SPLIT_ATTEMPTS,
            min_split_side: config::MIN_SPLIT_SIDE,
            room_min_side: 4,
            room_max_side: 12,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 40,
            height: 20,
            room_width_range: (4, 7),
            room_height_range: (4, 6),
            area_count_range: (3, 5),
            room_max_side: 8,
            ..Self::new(seed)
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> DelveResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> DelveResult<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// A fresh random source seeded from this configuration.
    pub fn rng(&self) -> DungeonRng {
        DungeonRng::new(self.seed)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Supplier of mood markers for [`Builder::add_vibe`].
///
/// Each call returns a mood and what it costs from the vibe budget, or `None`
/// when the source has nothing more to offer.
pub trait MoodSource {
    fn next_mood(&mut self, rng: &mut DungeonRng) -> Option<(Mood, i32)>;
}

impl<F> MoodSource for F
where
    F: FnMut(&mut DungeonRng) -> Option<(Mood, i32)>,
{
    fn next_mood(&mut self, rng: &mut DungeonRng) -> Option<(Mood, i32)> {
        self(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.doors_range, (1, 5));
        assert_eq!(config.straight_line_bias, 3.0);

        let small = GenerationConfig::for_testing(3);
        assert_eq!(small.seed, 3);
        assert!(small.width < config.width);
        assert_eq!(small.split_attempts, config.split_attempts);
    }

    #[test]
    fn test_config_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");
        let config = GenerationConfig::for_testing(99);
        config.to_json_file(&path).unwrap();
        assert_eq!(GenerationConfig::from_json_file(&path).unwrap(), config);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            GenerationConfig::from_json_file(&path),
            Err(crate::DelveError::Serde(_))
        ));
        assert!(matches!(
            GenerationConfig::from_json_file(dir.path().join("missing.json")),
            Err(crate::DelveError::Io(_))
        ));
    }

    #[test]
    fn test_closures_are_mood_sources() {
        let mut left = 2;
        let mut source = |_: &mut DungeonRng| {
            if left == 0 {
                return None;
            }
            left -= 1;
            Some((Mood::new("guild", "calm"), 3))
        };
        let mut rng = DungeonRng::new(1);
        assert!(source.next_mood(&mut rng).is_some());
        assert!(source.next_mood(&mut rng).is_some());
        assert!(source.next_mood(&mut rng).is_none());
    }
}
