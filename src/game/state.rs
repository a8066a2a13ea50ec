//! World State Definitions
//!
//! All mutable simulation state, plus the immutable snapshot types
//! produced at the end of every tick. Uses `BTreeMap`/`BTreeSet`
//! everywhere iteration order matters, so the same tick always visits
//! robots, bullets, mines, and cookies in the same order regardless of
//! host platform or hashing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::geometry::Vec2;
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::BattleRng;

use super::config::BattleConfig;
use super::events::{Event, PendingCallbacks};

/// Stable per-robot identity, assigned in roster order at battle
/// construction and never reassigned, including across `nextRound`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RobotId(pub u32);

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "robot#{}", self.0)
    }
}

/// Stable bullet identity, drawn from a per-battle monotonic counter
/// that never resets across rounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BulletId(pub u64);

/// Stable mine/cookie identity, drawn from a per-battle monotonic
/// counter shared between the two pickup kinds (mirrors the bullet id
/// counter's never-resets-across-rounds rule).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

/// Mutable per-robot simulation record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotState {
    /// Stable identity.
    pub id: RobotId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,

    /// Position.
    pub position: Vec2,
    /// Body heading, degrees, 0 = north, clockwise.
    pub heading: f64,
    /// Current speed, units/tick (signed; negative = reverse).
    pub speed: f64,
    /// Gun heading, degrees.
    pub gun_heading: f64,
    /// Gun heat; fire is only feasible when this reaches exactly 0.
    pub gun_heat: f64,
    /// Radar heading, degrees.
    pub radar_heading: f64,
    /// Scan width, degrees (reserved; see fat-beam open question).
    pub scan_width: f64,

    /// Current health; clamped to `[0, start_health]`.
    pub health: f64,
    /// Current energy; clamped to `[0, start_energy]`.
    pub energy: f64,
    /// Whether the robot is still alive.
    pub alive: bool,
    /// Cumulative score across rounds (persists across `nextRound`).
    pub score: f64,

    /// Ticks survived this round.
    pub ticks_survived: u32,
    /// Cumulative damage dealt.
    pub damage_dealt: f64,
    /// Cumulative damage received.
    pub damage_received: f64,
    /// Cumulative bullets fired.
    pub bullets_fired: u32,
    /// Cumulative bullets that hit a target.
    pub bullets_hit: u32,
    /// Cumulative kills credited.
    pub kills: u32,
    /// Fuel used this tick; reserved counter, see `fuel_per_tick`.
    pub fuel_used_this_tick: f64,

    /// Intended speed; persists across ticks until the agent changes it.
    pub intended_speed: f64,
    /// Intended body turn rate this tick; reset to 0 every tick.
    pub intended_turn_rate: f64,
    /// Intended gun turn rate this tick; reset to 0 every tick.
    pub intended_gun_turn_rate: f64,
    /// Intended radar turn rate this tick; reset to 0 every tick.
    pub intended_radar_turn_rate: f64,
    /// Requested fire power this tick; 0 = no fire; reset every tick.
    pub intended_fire: f64,

    /// Radar heading snapshotted at the start of the tick, used for
    /// sweep-arc containment during Phase 9.
    pub prev_radar_heading: f64,

    /// Queued callbacks awaiting delivery at the start of next tick.
    pub pending: PendingCallbacks,
}

impl RobotState {
    /// Construct a freshly-spawned robot.
    pub fn new(id: RobotId, name: String, color: String, position: Vec2, config: &BattleConfig) -> Self {
        Self {
            id,
            name,
            color,
            position,
            heading: 0.0,
            speed: 0.0,
            gun_heading: 0.0,
            gun_heat: config.initial_gun_heat,
            radar_heading: 0.0,
            scan_width: config.default_scan_width,
            health: config.start_health,
            energy: config.start_energy,
            alive: true,
            score: 0.0,
            ticks_survived: 0,
            damage_dealt: 0.0,
            damage_received: 0.0,
            bullets_fired: 0,
            bullets_hit: 0,
            kills: 0,
            fuel_used_this_tick: 0.0,
            intended_speed: 0.0,
            intended_turn_rate: 0.0,
            intended_gun_turn_rate: 0.0,
            intended_radar_turn_rate: 0.0,
            intended_fire: 0.0,
            prev_radar_heading: 0.0,
            pending: PendingCallbacks::default(),
        }
    }

    /// Reset this robot's per-round state for `nextRound`, keeping
    /// identity and cumulative score (per the data model, score
    /// persists across rounds while everything else resets).
    pub fn reset_for_round(&mut self, position: Vec2, config: &BattleConfig) {
        let (id, name, color, score) = (
            self.id,
            std::mem::take(&mut self.name),
            std::mem::take(&mut self.color),
            self.score,
        );
        *self = Self::new(id, name, color, position, config);
        self.score = score;
    }

    /// Immutable snapshot of this robot's observable fields.
    pub fn snapshot(&self) -> RobotSnapshot {
        RobotSnapshot {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
            position: self.position,
            heading: self.heading,
            speed: self.speed,
            gun_heading: self.gun_heading,
            gun_heat: self.gun_heat,
            radar_heading: self.radar_heading,
            scan_width: self.scan_width,
            health: self.health,
            energy: self.energy,
            alive: self.alive,
            score: self.score,
            ticks_survived: self.ticks_survived,
            damage_dealt: self.damage_dealt,
            damage_received: self.damage_received,
            bullets_fired: self.bullets_fired,
            bullets_hit: self.bullets_hit,
            kills: self.kills,
        }
    }
}

/// Deep-immutable, self-contained projection of a robot at one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotSnapshot {
    /// Stable identity.
    pub id: RobotId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Position.
    pub position: Vec2,
    /// Body heading, degrees.
    pub heading: f64,
    /// Current speed.
    pub speed: f64,
    /// Gun heading, degrees.
    pub gun_heading: f64,
    /// Gun heat.
    pub gun_heat: f64,
    /// Radar heading, degrees.
    pub radar_heading: f64,
    /// Scan width, degrees.
    pub scan_width: f64,
    /// Current health.
    pub health: f64,
    /// Current energy.
    pub energy: f64,
    /// Alive flag.
    pub alive: bool,
    /// Cumulative score.
    pub score: f64,
    /// Ticks survived this round.
    pub ticks_survived: u32,
    /// Cumulative damage dealt.
    pub damage_dealt: f64,
    /// Cumulative damage received.
    pub damage_received: f64,
    /// Cumulative bullets fired.
    pub bullets_fired: u32,
    /// Cumulative bullets that hit a target.
    pub bullets_hit: u32,
    /// Cumulative kills credited.
    pub kills: u32,
}

/// A live bullet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Stable identity.
    pub id: BulletId,
    /// Firing robot.
    pub owner: RobotId,
    /// Current position.
    pub position: Vec2,
    /// Heading, degrees.
    pub heading: f64,
    /// Speed, units/tick.
    pub speed: f64,
    /// Fire power (determines damage).
    pub power: f64,
}

/// A live mine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mine {
    /// Stable identity.
    pub id: ItemId,
    /// Position.
    pub position: Vec2,
}

/// A live cookie.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Stable identity.
    pub id: ItemId,
    /// Position.
    pub position: Vec2,
}

/// Immutable, self-contained projection of the whole world at one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Tick this snapshot was produced at.
    pub tick: u32,
    /// Current round (0-based).
    pub round: u32,
    /// Robot snapshots, stable index order.
    pub robots: Vec<RobotSnapshot>,
    /// Bullet snapshots, creation order.
    pub bullets: Vec<Bullet>,
    /// Mine snapshots, creation order.
    pub mines: Vec<Mine>,
    /// Cookie snapshots, creation order.
    pub cookies: Vec<Cookie>,
    /// Events emitted during this tick.
    pub events: Vec<Event>,
}

/// The mutable world owned exclusively by the battle controller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldState {
    /// Current tick, incremented in Phase 0.
    pub tick: u32,
    /// Current round, 0-based.
    pub round: u32,
    /// Robots keyed by stable id for O(log n) lookup with deterministic
    /// iteration order.
    pub robots: BTreeMap<RobotId, RobotState>,
    /// Live bullets keyed by id, in creation order.
    pub bullets: BTreeMap<BulletId, Bullet>,
    /// Live mines keyed by id.
    pub mines: BTreeMap<ItemId, Mine>,
    /// Live cookies keyed by id.
    pub cookies: BTreeMap<ItemId, Cookie>,
    /// Canonicalized `(min(a,b), max(a,b))` pairs currently overlapping,
    /// carried across ticks for Phase 7's first-contact damage rule.
    pub colliding_pairs: BTreeSet<(RobotId, RobotId)>,
    /// Events emitted so far this tick.
    pub events: Vec<Event>,
    /// The battle's single PRNG instance.
    pub rng: BattleRng,

    next_bullet_id: u64,
    next_item_id: u64,
}

impl WorldState {
    /// Construct a fresh world for a new battle, spawning robots from
    /// `config.robots` at randomized, mutually-separated positions.
    pub fn new(config: &BattleConfig) -> Self {
        let mut rng = BattleRng::new(config.master_seed);
        let mut robots = BTreeMap::new();

        let positions = spawn_positions(config, &mut rng);
        for (index, (descriptor, position)) in config.robots.iter().zip(positions).enumerate() {
            let id = RobotId(index as u32);
            robots.insert(
                id,
                RobotState::new(id, descriptor.name.clone(), descriptor.color.clone(), position, config),
            );
        }

        Self {
            tick: 0,
            round: 0,
            robots,
            bullets: BTreeMap::new(),
            mines: BTreeMap::new(),
            cookies: BTreeMap::new(),
            colliding_pairs: BTreeSet::new(),
            events: Vec::new(),
            rng,
            next_bullet_id: 0,
            next_item_id: 0,
        }
    }

    /// Reset world state for the next round: clear bullets/mines/cookies
    /// and collision memory, re-spawn robots at fresh separated
    /// positions while keeping identity and cumulative score. The PRNG
    /// itself is never reseeded.
    pub fn reset_for_round(&mut self, config: &BattleConfig) {
        self.round += 1;
        self.tick = 0;
        self.bullets.clear();
        self.mines.clear();
        self.cookies.clear();
        self.colliding_pairs.clear();
        self.events.clear();

        let positions = spawn_positions(config, &mut self.rng);
        for (robot, position) in self.robots.values_mut().zip(positions) {
            robot.reset_for_round(position, config);
        }
    }

    /// Allocate the next bullet id.
    pub fn next_bullet_id(&mut self) -> BulletId {
        let id = BulletId(self.next_bullet_id);
        self.next_bullet_id += 1;
        id
    }

    /// Allocate the next mine/cookie id.
    pub fn next_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    /// Append an event to this tick's event list.
    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Number of robots still alive.
    pub fn alive_count(&self) -> usize {
        self.robots.values().filter(|r| r.alive).count()
    }

    /// Produce an immutable, self-contained snapshot of the current
    /// tick's state, including this tick's event list.
    pub fn snapshot(&self) -> GameState {
        GameState {
            tick: self.tick,
            round: self.round,
            robots: self.robots.values().map(RobotState::snapshot).collect(),
            bullets: self.bullets.values().copied().collect(),
            mines: self.mines.values().copied().collect(),
            cookies: self.cookies.values().copied().collect(),
            events: self.events.clone(),
        }
    }

    /// Compute a deterministic hash of the current world state, used
    /// for replay / determinism verification. Hashes robots, bullets,
    /// mines, and cookies in their `BTreeMap` (id-ascending) order.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng.state()[0], |hasher| {
            for robot in self.robots.values() {
                hasher.update_vec2(robot.position);
                hasher.update_f64(robot.heading);
                hasher.update_f64(robot.speed);
                hasher.update_f64(robot.gun_heading);
                hasher.update_f64(robot.gun_heat);
                hasher.update_f64(robot.radar_heading);
                hasher.update_f64(robot.health);
                hasher.update_f64(robot.energy);
                hasher.update_bool(robot.alive);
                hasher.update_f64(robot.score);
            }
            for bullet in self.bullets.values() {
                hasher.update_u64(bullet.id.0);
                hasher.update_vec2(bullet.position);
                hasher.update_f64(bullet.heading);
                hasher.update_f64(bullet.speed);
            }
            for mine in self.mines.values() {
                hasher.update_u64(mine.id.0);
                hasher.update_vec2(mine.position);
            }
            for cookie in self.cookies.values() {
                hasher.update_u64(cookie.id.0);
                hasher.update_vec2(cookie.position);
            }
        })
    }
}

/// Generate mutually-separated spawn positions for every robot in
/// `config.robots`, via rejection sampling against
/// `min_initial_robot_spacing`. Falls back to the best-effort last
/// candidate if the attempt budget is exhausted, rather than failing
/// battle construction over a tight arena.
fn spawn_positions(config: &BattleConfig, rng: &mut BattleRng) -> Vec<Vec2> {
    let mut placed: Vec<Vec2> = Vec::with_capacity(config.robots.len());
    let r = config.robot_radius;

    for _ in 0..config.robots.len() {
        let mut candidate = Vec2::new(config.arena_width / 2.0, config.arena_height / 2.0);
        for _ in 0..config.spawn_attempt_budget.max(1) {
            let x = rng.next_float_range(r, config.arena_width - r);
            let y = rng.next_float_range(r, config.arena_height - r);
            candidate = Vec2::new(x, y);

            let far_enough = placed
                .iter()
                .all(|p| candidate.distance(*p) >= config.min_initial_robot_spacing);
            if far_enough {
                break;
            }
        }
        placed.push(candidate);
    }

    placed
}

// =============================================================================
// TESTS
// =============================================================================
