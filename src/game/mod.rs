//! Game Logic Module
//!
//! All battle simulation code. Everything here is 100% deterministic:
//! fixed iteration order, no system time, no host RNG beyond the one
//! `BattleRng` instance threaded through the world.
//!
//! ## Module structure
//!
//! - `config`: battle configuration, defaults, validation
//! - `state`: world state, per-robot/bullet/mine/cookie records, snapshots
//! - `agent`: the `Agent` trait and its host, mediating every callback
//! - `collision`: discrete circle-overlap and arena-bounds tests
//! - `spawn`: mine/cookie spawn cadence and rejection-sampling placement
//! - `events`: battle events and the per-robot pending-callback queues
//! - `tick`: the fourteen-phase per-tick pipeline

pub mod agent;
pub mod collision;
pub mod config;
pub mod events;
pub mod spawn;
pub mod state;
pub mod tick;

// Re-export key types
pub use agent::{Agent, AgentHost, RobotApi};
pub use config::{BattleConfig, ConfigError, RobotDescriptor};
pub use events::{Event, PendingCallbacks, Placement, RoundEndReason};
pub use state::{Bullet, BulletId, Cookie, GameState, ItemId, Mine, RobotId, RobotSnapshot, RobotState, WorldState};
pub use tick::{tick, RoundResult, TickResult};
