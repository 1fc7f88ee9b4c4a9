//! # Seeded Random Source
//!
//! Every randomized decision of the engine draws from a [`DungeonRng`] handle
//! passed in by the caller. A fixed seed reproduces the same map.

use crate::{DelveError, DelveResult, Position, Rect};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Seedable random source with the selection helpers used by map generation.
///
/// Do not share one instance between concurrent generators: give every
/// generator its own seed instead.
#[derive(Debug, Clone)]
pub struct DungeonRng {
    seed: u64,
    inner: StdRng,
}

impl DungeonRng {
    /// Creates a random source from a seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::DungeonRng;
    ///
    /// let mut a = DungeonRng::new(7);
    /// let mut b = DungeonRng::new(7);
    /// assert_eq!(a.rint(0, 100), b.rint(0, 100));
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this source was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `lo..=hi`.
    pub fn rint(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..=hi)
    }

    /// Uniform integer in `lo..hi`. Fails on an empty range.
    pub fn randrange(&mut self, lo: i32, hi: i32) -> DelveResult<i32> {
        if hi <= lo {
            return Err(DelveError::InvalidGeometry(format!(
                "empty random range {lo}..{hi}"
            )));
        }
        Ok(self.inner.gen_range(lo..hi))
    }

    /// Uniform index in `0..len`, `None` when `len` is zero.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.inner.gen_range(0..len))
        }
    }

    /// Picks one element uniformly.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Shuffles a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// Picks one element with probability proportional to its weight.
    ///
    /// Elements sharing the largest weight are equally likely. Falls back to
    /// a uniform pick when the weights are unusable (all zero, negative...).
    pub fn weighted_choice<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        match WeightedIndex::new(weights) {
            Ok(dist) if weights.len() == items.len() => items.get(dist.sample(&mut self.inner)),
            _ => self.choice(items),
        }
    }

    /// Bernoulli test: true `rate` of the time, with `rate` in `0..=1`.
    pub fn rstest(&mut self, rate: f64) -> bool {
        self.inner.gen::<f64>() <= rate
    }

    /// Coin flip returning `-1` or `1`.
    pub fn sign(&mut self) -> i32 {
        if self.inner.gen_bool(0.5) {
            1
        } else {
            -1
        }
    }

    /// Uniform position inside a rectangle, perimeter included.
    pub fn pos_in_rect(&mut self, rect: &Rect) -> Position {
        Position::new(
            self.rint(rect.bl.x, rect.tr.x),
            self.rint(rect.bl.y, rect.tr.y),
        )
    }

    /// Random sub-rectangle of `rect` with sides in `min_side..=max_side`.
    ///
    /// Sides are clamped to what `rect` can hold.
    pub fn sub_rect(&mut self, rect: &Rect, min_side: i32, max_side: i32) -> Rect {
        let w = self.rint(min_side.min(rect.width()), max_side.min(rect.width()));
        let h = self.rint(min_side.min(rect.height()), max_side.min(rect.height()));
        let x1 = self.rint(rect.bl.x, rect.tr.x - w + 1);
        let y1 = self.rint(rect.bl.y, rect.tr.y - h + 1);
        Rect::from_coords(x1, y1, x1 + w - 1, y1 + h - 1)
    }
}
