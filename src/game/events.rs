//! Battle Events
//!
//! A per-tick, append-only list of everything that happened during the
//! tick, plus the pending-callback queues that turn yesterday's events
//! into today's agent callbacks. Event ordering within a tick is part
//! of the observable contract: phase order, then per-phase iteration
//! order (robot index ascending, bullet creation order).

use serde::{Deserialize, Serialize};

use super::state::{BulletId, ItemId, RobotId};

/// Why a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    /// The configured tick limit was reached.
    TimeLimit,
    /// At most one robot remained alive.
    LastStanding,
}

/// A single placement entry attached to a `round_over` event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// The placed robot.
    pub robot_id: RobotId,
    /// 1-based placement (1 = first place).
    pub place: u32,
    /// Points awarded for this placement.
    pub points: f64,
}

/// One discriminated battle event, carrying the minimum data a
/// renderer or replay consumer needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A robot fired a bullet.
    BulletFired {
        /// Tick of emission.
        tick: u32,
        /// Firing robot.
        robot_id: RobotId,
        /// New bullet id.
        bullet_id: BulletId,
        /// Fire power.
        power: f64,
    },
    /// A bullet struck a robot.
    BulletHit {
        /// Tick of emission.
        tick: u32,
        /// Bullet that hit.
        bullet_id: BulletId,
        /// Owner of the bullet.
        shooter_id: RobotId,
        /// Robot that was hit.
        target_id: RobotId,
        /// Damage dealt.
        damage: f64,
        /// Absolute impact position.
        position: (f64, f64),
    },
    /// A bullet left the arena without hitting anything.
    BulletWall {
        /// Tick of emission.
        tick: u32,
        /// Bullet that left the arena.
        bullet_id: BulletId,
        /// Owner of the bullet.
        shooter_id: RobotId,
    },
    /// Alias of `onHit`: a robot took bullet damage. Bearing is signed,
    /// relative to the target's heading, matching the `onHit` callback
    /// it mirrors (unlike most other events, which carry absolute
    /// bearings).
    RobotHit {
        /// Tick of emission.
        tick: u32,
        /// Robot hit.
        robot_id: RobotId,
        /// Damage dealt.
        damage: f64,
        /// Bearing of the hit, relative to the robot's heading.
        bearing: f64,
    },
    /// A robot died.
    RobotDied {
        /// Tick of emission.
        tick: u32,
        /// Robot that died.
        robot_id: RobotId,
        /// Killer, if the death was bullet-caused.
        killer_id: Option<RobotId>,
    },
    /// A robot hit a wall.
    WallHit {
        /// Tick of emission.
        tick: u32,
        /// Robot that hit the wall.
        robot_id: RobotId,
        /// Damage dealt.
        damage: f64,
        /// Bearing of the wall relative to the robot, absolute degrees.
        bearing: f64,
    },
    /// Two robots collided.
    RobotCollision {
        /// Tick of emission.
        tick: u32,
        /// First robot (lower id).
        robot_a: RobotId,
        /// Second robot (higher id).
        robot_b: RobotId,
        /// Damage dealt to each side.
        damage: f64,
    },
    /// A mine detonated under a robot.
    MineDetonated {
        /// Tick of emission.
        tick: u32,
        /// Mine that detonated.
        mine_id: ItemId,
        /// Robot that triggered it.
        robot_id: RobotId,
        /// Damage dealt.
        damage: f64,
    },
    /// A robot picked up a cookie.
    CookiePickup {
        /// Tick of emission.
        tick: u32,
        /// Cookie picked up.
        cookie_id: ItemId,
        /// Robot that picked it up.
        robot_id: RobotId,
        /// Health actually gained (may be less than the configured heal
        /// amount if the robot was already near max health).
        health_gained: f64,
    },
    /// A scanner detected a target (absolute bearing).
    ScanDetection {
        /// Tick of emission.
        tick: u32,
        /// Scanning robot.
        scanner_id: RobotId,
        /// Detected robot.
        target_id: RobotId,
        /// Euclidean distance at detection time.
        distance: f64,
        /// Absolute bearing from scanner to target.
        bearing: f64,
    },
    /// A robot was scanned by another (absolute bearing, target's view).
    Scanned {
        /// Tick of emission.
        tick: u32,
        /// Scanning robot.
        scanner_id: RobotId,
        /// Detected robot.
        target_id: RobotId,
        /// Absolute bearing from target to scanner.
        bearing: f64,
    },
    /// A mine was placed on the arena.
    MineSpawned {
        /// Tick of emission.
        tick: u32,
        /// New mine id.
        mine_id: ItemId,
        /// Spawn position.
        position: (f64, f64),
    },
    /// A cookie was placed on the arena.
    CookieSpawned {
        /// Tick of emission.
        tick: u32,
        /// New cookie id.
        cookie_id: ItemId,
        /// Spawn position.
        position: (f64, f64),
    },
    /// The round ended.
    RoundOver {
        /// Tick of emission.
        tick: u32,
        /// Why the round ended.
        reason: RoundEndReason,
        /// Final placements, first place first.
        placements: Vec<Placement>,
    },
}

/// One queued scan observation: a robot saw `target_id` at `distance`
/// and relative `bearing` (signed, relative to the scanner's heading).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanObservation {
    /// The robot that was scanned.
    pub target_id: RobotId,
    /// Euclidean distance to the target.
    pub distance: f64,
    /// Bearing to the target, signed, relative to the scanner's heading.
    pub bearing: f64,
}

/// One queued "you were scanned" observation delivered to the target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScannedObservation {
    /// The robot that performed the scan.
    pub scanner_id: RobotId,
    /// Bearing to the scanner, signed, relative to the target's heading.
    pub bearing: f64,
}

/// Per-robot pending-callback queue.
///
/// Events produced in tick `N` populate these slots; they are
/// delivered to the agent as callbacks at the start of tick `N + 1`
/// (Phase 4), then cleared. Dead robots never accumulate or receive
/// callbacks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingCallbacks {
    /// Pending `onWallHit(bearing)`.
    pub wall_bearing: Option<f64>,
    /// Pending `onRobotHit(bearing)`.
    pub robot_hit_bearing: Option<f64>,
    /// Pending `onHit(damage, bearing)`.
    pub hit: Option<(f64, f64)>,
    /// Pending `onBulletHit(targetId)`.
    pub bullet_hit_target: Option<RobotId>,
    /// Pending `onBulletMiss()`.
    pub bullet_miss: bool,
    /// Pending `onRobotDeath(robotId)` for each recently-deceased robot.
    pub deaths: Vec<RobotId>,
    /// Pending `onScan(distance, bearing)` entries, as scanner.
    pub scans: Vec<ScanObservation>,
    /// Pending `onScanned(bearing)` entries, as target.
    pub scanned: Vec<ScannedObservation>,
}

impl PendingCallbacks {
    /// True if there is nothing queued.
    pub fn is_empty(&self) -> bool {
        self.wall_bearing.is_none()
            && self.robot_hit_bearing.is_none()
            && self.hit.is_none()
            && self.bullet_hit_target.is_none()
            && !self.bullet_miss
            && self.deaths.is_empty()
            && self.scans.is_empty()
            && self.scanned.is_empty()
    }

    /// Clear every slot after delivery.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
