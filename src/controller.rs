//! Battle Controller
//!
//! The embedding surface most callers use: owns one battle's world,
//! agents, and configuration, and exposes tick-by-tick or batch
//! execution without exposing the pipeline's internals.

use uuid::Uuid;

use crate::game::agent::{Agent, AgentHost};
use crate::game::config::{BattleConfig, ConfigError};
use crate::game::state::{GameState, RobotId, WorldState};
use crate::game::tick::{tick, RoundResult, TickResult};

/// Owns and drives a single battle: one `WorldState`, one `AgentHost`,
/// one immutable `BattleConfig`, for as many rounds as configured.
pub struct BattleController {
    id: Uuid,
    world: WorldState,
    host: AgentHost,
    config: BattleConfig,
    round_over: bool,
    battle_over: bool,
    destroyed: bool,
}

impl BattleController {
    /// Validate `config`, construct the initial world, register
    /// `agents` against their robot ids, and run `init` on each.
    pub fn new(config: BattleConfig, agents: Vec<(RobotId, Box<dyn Agent>)>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = WorldState::new(&config);
        let mut host = AgentHost::new();
        for (id, agent) in agents {
            host.register(id, agent);
        }
        host.init_all(&mut world, &config);

        let id = Uuid::new_v4();
        tracing::info!(battle_id = %id, robots = config.robots.len(), "battle constructed");

        Ok(Self {
            id,
            world,
            host,
            config,
            round_over: false,
            battle_over: false,
            destroyed: false,
        })
    }

    /// This battle's correlation id, stable for its lifetime. Purely a
    /// logging/observability aid — never consulted by the pipeline,
    /// since simulation outcomes must depend only on config, seed, and
    /// agent behavior.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Run exactly one tick of the pipeline.
    pub fn tick(&mut self) -> TickResult {
        let result = tick(&mut self.world, &mut self.host, &self.config);
        self.round_over = result.round_over;
        if result.round_over && self.world.round + 1 >= self.config.round_count {
            self.battle_over = true;
        }
        result
    }

    /// Tick until the current round ends, returning its result.
    pub fn run_round(&mut self) -> RoundResult {
        loop {
            let result = self.tick();
            if let Some(round_result) = result.round_result {
                return round_result;
            }
        }
    }

    /// Run every remaining round to completion, advancing between them.
    pub fn run(&mut self) -> Vec<RoundResult> {
        let mut results = Vec::new();
        loop {
            results.push(self.run_round());
            if self.is_battle_over() {
                break;
            }
            self.next_round();
        }
        results
    }

    /// Current world snapshot, independent of tick().
    pub fn get_state(&self) -> GameState {
        self.world.snapshot()
    }

    /// Deterministic hash of the current world state, for replay and
    /// determinism verification (see `WorldState::compute_hash`).
    pub fn state_hash(&self) -> crate::core::hash::StateHash {
        self.world.compute_hash()
    }

    /// Advance to the next round: bullets/mines/cookies clear, robots
    /// reset (score persists), positions re-spawn from the same PRNG
    /// instance (never reseeded).
    pub fn next_round(&mut self) {
        self.world.reset_for_round(&self.config);
        self.round_over = false;
    }

    /// True if the round most recently ticked has ended.
    pub fn is_round_over(&self) -> bool {
        self.round_over
    }

    /// True if every configured round has been played.
    pub fn is_battle_over(&self) -> bool {
        self.battle_over
    }

    /// Release every agent's resources. Idempotent: a second call is a
    /// logged no-op rather than an error, mirroring the rest of the
    /// engine's fault-tolerant shutdown discipline.
    pub fn destroy(&mut self) {
        if self.destroyed {
            tracing::debug!("destroy() called on an already-destroyed battle; ignoring");
            return;
        }
        self.host.destroy_all();
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::RobotApi;
    use crate::game::config::RobotDescriptor;

    struct Idle;
    impl Agent for Idle {
        fn tick(&mut self, _api: &mut RobotApi) {}
    }

    fn test_config(n: usize, ticks_per_round: u32, round_count: u32) -> BattleConfig {
        let mut config = BattleConfig::default();
        for i in 0..n {
            config.robots.push(RobotDescriptor {
                name: format!("R{i}"),
                color: "#fff".into(),
            });
        }
        config.ticks_per_round = ticks_per_round;
        config.round_count = round_count;
        config
    }

    fn idle_agents(n: usize) -> Vec<(RobotId, Box<dyn Agent>)> {
        (0..n).map(|i| (RobotId(i as u32), Box::new(Idle) as Box<dyn Agent>)).collect()
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = BattleConfig::default();
        config.arena_width = 0.0;
        config.robots.push(RobotDescriptor {
            name: "A".into(),
            color: "#fff".into(),
        });
        assert!(BattleController::new(config, idle_agents(1)).is_err());
    }

    #[test]
    fn tick_reports_round_over_at_time_limit() {
        let config = test_config(2, 5, 1);
        let mut controller = BattleController::new(config, idle_agents(2)).unwrap();

        let mut ticks = 0;
        loop {
            let result = controller.tick();
            ticks += 1;
            if result.round_over {
                break;
            }
            assert!(ticks <= 5);
        }
        assert_eq!(ticks, 5);
        assert!(controller.is_round_over());
        assert!(controller.is_battle_over());
    }

    #[test]
    fn run_plays_every_configured_round() {
        let config = test_config(2, 5, 3);
        let mut controller = BattleController::new(config, idle_agents(2)).unwrap();

        let results = controller.run();
        assert_eq!(results.len(), 3);
        assert!(controller.is_battle_over());
    }

    #[test]
    fn destroy_is_idempotent() {
        let config = test_config(1, 5, 1);
        let mut controller = BattleController::new(config, idle_agents(1)).unwrap();
        controller.destroy();
        controller.destroy();
    }
}
