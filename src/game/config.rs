//! Battle Configuration
//!
//! A single immutable configuration record, validated once at battle
//! construction. Every numeric default below matches the engine's
//! public contract; changing a default is a breaking change for any
//! consumer relying on it implicitly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display descriptor for one robot slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotDescriptor {
    /// Display name shown in snapshots/UI.
    pub name: String,
    /// Display color (renderer-opaque, e.g. a hex string).
    pub color: String,
}

/// Ordered placement-points table; index 0 is first place.
pub type PlacementPoints = Vec<f64>;

/// Immutable physics, spawn-policy, and scoring configuration for a battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    // --- Arena ---
    /// Arena width.
    pub arena_width: f64,
    /// Arena height.
    pub arena_height: f64,

    // --- Movement ---
    /// Maximum robot speed (units/tick).
    pub max_speed: f64,
    /// Acceleration toward a higher intended speed (units/tick^2).
    pub acceleration: f64,
    /// Deceleration toward a lower intended speed (units/tick^2).
    pub deceleration: f64,
    /// Maximum body turn rate, degrees/tick.
    pub max_turn_rate: f64,
    /// Maximum gun turn rate, degrees/tick.
    pub max_gun_turn_rate: f64,
    /// Maximum radar turn rate, degrees/tick.
    pub max_radar_turn_rate: f64,

    // --- Radar ---
    /// Default scan width, degrees (reserved; see fat-beam open question).
    pub default_scan_width: f64,
    /// Maximum scan width, degrees.
    pub max_scan_width: f64,
    /// Maximum scan range; `f64::INFINITY` by default.
    pub scan_range: f64,

    // --- Weapons ---
    /// Base bullet speed before power reduces it.
    pub bullet_base_speed: f64,
    /// Bullet speed reduction per power point.
    pub bullet_speed_power_factor: f64,
    /// Base damage per power point.
    pub damage_base: f64,
    /// Bonus damage per power point above 1.
    pub damage_bonus: f64,
    /// Minimum fire power.
    pub min_fire_power: f64,
    /// Maximum fire power.
    pub max_fire_power: f64,
    /// Energy cost per power point to fire.
    pub fire_cost_factor: f64,
    /// Gun heat decay per tick.
    pub gun_cooldown_rate: f64,
    /// Gun heat immediately after firing, `1 + power/5`, applies the
    /// constant term; kept explicit for config-driven tuning.
    pub gun_heat_base: f64,
    /// Initial gun heat at battle/round start.
    pub initial_gun_heat: f64,

    // --- Damage sources ---
    /// Wall-collision damage factor (`damage = |speed| * factor`).
    pub wall_damage_speed_factor: f64,
    /// Base ram damage on robot-robot collision.
    pub ram_damage_base: f64,
    /// Ram damage factor applied to combined speeds.
    pub ram_damage_factor: f64,
    /// Mine detonation damage.
    pub mine_damage: f64,
    /// Cookie heal amount.
    pub cookie_heal: f64,

    // --- Health / energy ---
    /// Starting and maximum health.
    pub start_health: f64,
    /// Starting and maximum energy.
    pub start_energy: f64,
    /// Energy regeneration per tick (capped at max energy).
    pub energy_regen_rate: f64,

    // --- Radii ---
    /// Robot collision radius.
    pub robot_radius: f64,
    /// Bullet collision radius.
    pub bullet_radius: f64,
    /// Cookie pickup radius.
    pub cookie_radius: f64,
    /// Mine pickup radius.
    pub mine_radius: f64,

    // --- Spawn policy ---
    /// Ticks between mine spawn attempts.
    pub mine_spawn_interval: u32,
    /// Ticks between cookie spawn attempts.
    pub cookie_spawn_interval: u32,
    /// Maximum concurrent mines.
    pub max_mines: usize,
    /// Maximum concurrent cookies.
    pub max_cookies: usize,
    /// Minimum distance from any live robot for a new mine/cookie.
    pub min_spawn_distance_from_robot: f64,
    /// Minimum initial spacing between robot spawn positions.
    pub min_initial_robot_spacing: f64,
    /// Bounded number of rejection-sampling attempts before deferring a spawn.
    pub spawn_attempt_budget: u32,

    // --- Scoring / rounds ---
    /// Placement points, index 0 = first place.
    pub placement_points: PlacementPoints,
    /// Robots participating in the battle, in stable index order.
    pub robots: Vec<RobotDescriptor>,
    /// Ticks per round before a `time_limit` end.
    pub ticks_per_round: u32,
    /// Number of rounds in the battle.
    pub round_count: u32,
    /// Master PRNG seed for the battle.
    pub master_seed: u32,

    // --- Reserved ---
    /// Fuel budget per tick; reserved, not currently debited against
    /// any consumer (see DESIGN.md Open Question resolutions).
    pub fuel_per_tick: f64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            arena_width: 800.0,
            arena_height: 600.0,

            max_speed: 100.0,
            acceleration: 1.0,
            deceleration: 2.0,
            max_turn_rate: 10.0,
            max_gun_turn_rate: 20.0,
            max_radar_turn_rate: 45.0,

            default_scan_width: 10.0,
            max_scan_width: 45.0,
            scan_range: f64::INFINITY,

            bullet_base_speed: 20.0,
            bullet_speed_power_factor: 3.0,
            damage_base: 4.0,
            damage_bonus: 2.0,
            min_fire_power: 1.0,
            max_fire_power: 5.0,
            fire_cost_factor: 1.0,
            gun_cooldown_rate: 0.1,
            gun_heat_base: 1.0,
            initial_gun_heat: 3.0,

            wall_damage_speed_factor: 0.5,
            ram_damage_base: 2.0,
            ram_damage_factor: 0.1,
            mine_damage: 30.0,
            cookie_heal: 20.0,

            start_health: 100.0,
            start_energy: 100.0,
            energy_regen_rate: 0.1,

            robot_radius: 18.0,
            bullet_radius: 3.0,
            cookie_radius: 10.0,
            mine_radius: 8.0,

            mine_spawn_interval: 300,
            cookie_spawn_interval: 200,
            max_mines: 5,
            max_cookies: 8,
            min_spawn_distance_from_robot: 60.0,
            min_initial_robot_spacing: 100.0,
            spawn_attempt_budget: 20,

            placement_points: vec![3.0, 1.0],
            robots: Vec::new(),
            ticks_per_round: 2000,
            round_count: 1,
            master_seed: 12345,

            fuel_per_tick: 0.0,
        }
    }
}

impl BattleConfig {
    /// Validate the configuration, rejecting caller errors that would
    /// otherwise surface as confusing runtime behavior. Per the engine's
    /// error-handling design, this is the *only* place configuration is
    /// rejected; everything after construction is either a valid state
    /// transition or a silently-ignored infeasible intent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena_width <= 0.0 || self.arena_height <= 0.0 {
            return Err(ConfigError::NonPositiveArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if self.ticks_per_round == 0 {
            return Err(ConfigError::ZeroTicksPerRound);
        }
        if self.robots.is_empty() && self.round_count > 0 {
            return Err(ConfigError::EmptyRosterWithRounds);
        }
        if self.max_speed <= 0.0 {
            return Err(ConfigError::NonPositivePhysicsConstant("max_speed"));
        }
        if self.robot_radius <= 0.0 {
            return Err(ConfigError::NonPositivePhysicsConstant("robot_radius"));
        }
        if self.min_fire_power > self.max_fire_power {
            return Err(ConfigError::InvalidFirePowerRange {
                min: self.min_fire_power,
                max: self.max_fire_power,
            });
        }
        if 2.0 * self.robot_radius >= self.arena_width.min(self.arena_height) {
            return Err(ConfigError::RobotTooLargeForArena);
        }
        Ok(())
    }
}

/// Configuration validation failures, rejected at battle construction.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Arena width or height was not strictly positive.
    #[error("arena dimensions must be positive, got {width}x{height}")]
    NonPositiveArena {
        /// Offending width.
        width: f64,
        /// Offending height.
        height: f64,
    },
    /// `ticks_per_round` was zero.
    #[error("ticks_per_round must be nonzero")]
    ZeroTicksPerRound,
    /// Robot roster was empty while `round_count > 0`.
    #[error("robot roster is empty but round_count > 0")]
    EmptyRosterWithRounds,
    /// A physics constant that must be positive was not.
    #[error("physics constant `{0}` must be positive")]
    NonPositivePhysicsConstant(&'static str),
    /// `min_fire_power` exceeded `max_fire_power`.
    #[error("min_fire_power ({min}) exceeds max_fire_power ({max})")]
    InvalidFirePowerRange {
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },
    /// Robot radius leaves no room to maneuver in the configured arena.
    #[error("robot_radius is too large for the configured arena")]
    RobotTooLargeForArena,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let mut config = BattleConfig::default();
        config.robots.push(RobotDescriptor {
            name: "Alpha".into(),
            color: "#ff0000".into(),
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_arena() {
        let mut config = BattleConfig::default();
        config.arena_width = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveArena {
                width: 0.0,
                height: 600.0
            })
        );
    }

    #[test]
    fn rejects_zero_ticks_per_round() {
        let mut config = BattleConfig::default();
        config.ticks_per_round = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTicksPerRound));
    }

    #[test]
    fn rejects_empty_roster_with_rounds() {
        let config = BattleConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::EmptyRosterWithRounds));
    }

    #[test]
    fn rejects_inverted_fire_power_range() {
        let mut config = BattleConfig::default();
        config.robots.push(RobotDescriptor {
            name: "Alpha".into(),
            color: "#ff0000".into(),
        });
        config.min_fire_power = 5.0;
        config.max_fire_power = 1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidFirePowerRange { min: 5.0, max: 1.0 })
        );
    }
}
