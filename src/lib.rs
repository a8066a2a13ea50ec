//! # Skirmish Engine
//!
//! A deterministic, tick-based battle simulator for autonomous robot
//! agents fighting in a bounded 2D arena. Given a battle configuration,
//! a seed, and a fixed set of agent modules, the engine advances in
//! discrete ticks, producing an immutable snapshot of world state per
//! tick and a sequence of events describing what changed.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       SKIRMISH ENGINE                         │
//! ├───────────────────────────────────────────────────────────────┤
//! │  core/        - Deterministic primitives                      │
//! │  ├── rng.rs   - xoshiro128** PRNG, seeded via splitmix32       │
//! │  ├── geometry.rs - angles, swept collision, sweep-arc tests    │
//! │  └── hash.rs  - state hashing for determinism verification     │
//! │                                                                │
//! │  game/        - Battle simulation (deterministic)              │
//! │  ├── config.rs    - BattleConfig, validation, defaults        │
//! │  ├── state.rs     - WorldState, robots, bullets, items         │
//! │  ├── agent.rs     - Agent trait, RobotApi, AgentHost           │
//! │  ├── collision.rs - circle-overlap and arena-bounds tests      │
//! │  ├── spawn.rs     - mine/cookie spawn cadence and placement    │
//! │  ├── events.rs    - Event enum, pending-callback queues        │
//! │  └── tick.rs      - the fourteen-phase per-tick pipeline       │
//! │                                                                │
//! │  controller.rs - BattleController: drives ticks and rounds     │
//! │  tournament.rs - Tournament: many games, accumulated standings │
//! │  replay.rs     - replay-from-recorded-hashes verification      │
//! │  network/      - Worker protocol message shapes (boundary)     │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism guarantee
//!
//! `core/` and `game/` are fully deterministic: one `BattleRng`
//! instance per battle, `BTreeMap`/`BTreeSet` everywhere iteration
//! order matters, `f64` arithmetic with a fixed per-tick operation
//! order, no system time, no host RNG. Given identical configuration,
//! seed, and agent behavior, two battles produce bit-identical
//! snapshot sequences for every tick — this is what anchors replay,
//! batch tournament execution, and cross-platform reproducibility.
//!
//! The compiler that turns agent source into sandboxed binaries, the
//! renderer, the editor UI, local persistence, and the worker
//! transport are external collaborators; this crate only defines the
//! `Agent` interface they produce implementations of and the snapshots
//! they consume.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod controller;
pub mod core;
pub mod game;
pub mod network;
pub mod replay;
pub mod tournament;

// Re-export commonly used types.
pub use controller::BattleController;
pub use core::rng::BattleRng;
pub use game::{Agent, AgentHost, BattleConfig, ConfigError, Event, GameState, RobotApi, RobotId, WorldState};
pub use replay::{verify_replay, ReplayError};
pub use tournament::{GameResult, Progress, RosterEntry, Standings, Tournament};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
