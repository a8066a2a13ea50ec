//! Core deterministic primitives.
//!
//! Everything in this module is built so that, given the same inputs,
//! it produces bit-identical output on every platform: no system time,
//! no host RNG, no hash-keyed iteration.

pub mod geometry;
pub mod hash;
pub mod rng;

// Re-export core types
pub use geometry::{angle_diff, bearing_to, normalize_angle, sweep_arc_contains, SweepHit, Vec2};
pub use hash::{compute_state_hash, StateHash, StateHasher};
pub use rng::BattleRng;
