//! Deterministic arena simulation
//!
//! All gameplay logic lives here. Given the same tuning, RNG seed and motion
//! signals, a round plays out identically:
//! - One fixed step per call, velocities in units per tick
//! - Seeded RNG only
//! - Stable iteration order (blocks by id, hearts by spawn)
//! - No rendering, camera or timer dependencies

pub mod arena;
pub mod collision;
pub mod state;
pub mod tick;

pub use arena::ArenaSimulation;
pub use collision::{Aabb, WallContact};
pub use state::{Ball, Block, GameEvent, HeartItem, Paddle, Phase, RoundState, SpeedLevel};
pub use tick::tick;
