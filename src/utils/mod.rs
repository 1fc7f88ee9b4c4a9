//! # Utilities Module
//!
//! Grid geometry and the seeded random source shared by every other module.

pub mod geometry;
pub mod rng;

pub use geometry::*;
pub use rng::*;
