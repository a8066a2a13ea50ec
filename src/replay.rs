//! Replay Verification
//!
//! Re-simulates a battle from scratch against a recorded sequence of
//! per-tick state hashes and surfaces the first divergence as a typed
//! error, rather than leaving the caller to diff two `GameState` values
//! by hand. Mirrors the engine's own replay-from-recorded-inputs shape,
//! narrowed to the hash-comparison half of that contract.

use thiserror::Error;

use crate::core::hash::StateHash;
use crate::game::agent::{Agent, AgentHost};
use crate::game::config::{BattleConfig, ConfigError};
use crate::game::state::{RobotId, WorldState};
use crate::game::tick::tick;

/// Failures surfaced while verifying a replay against its recorded hashes.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The supplied configuration does not pass `BattleConfig::validate`.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Fewer recorded hashes were supplied than ticks requested.
    #[error("recorded hash sequence has {available} entries, need at least {needed}")]
    TruncatedInput {
        /// Number of hashes actually supplied.
        available: usize,
        /// Number of ticks the caller asked to replay.
        needed: usize,
    },
    /// An agent was supplied for a robot id the roster never spawned.
    #[error("no robot registered for id {0}")]
    MissingRobot(RobotId),
    /// The replayed tick's state hash diverged from the recorded one.
    #[error("hash mismatch at tick {tick}: recorded {recorded:?}, replayed {replayed:?}")]
    HashMismatch {
        /// Tick at which the divergence was detected.
        tick: u32,
        /// Hash recorded during the original run.
        recorded: StateHash,
        /// Hash produced by this replay.
        replayed: StateHash,
    },
}

/// Re-run `tick_count` ticks of a fresh battle built from `config` and
/// `agents`, comparing the state hash produced after every tick against
/// the corresponding entry in `recorded`.
///
/// `recorded[i]` is the expected hash after tick `i` (0-indexed). Stops
/// and returns `Err` at the first mismatch rather than running to
/// completion and leaving the caller to spot the divergence themselves.
pub fn verify_replay(
    config: BattleConfig,
    agents: Vec<(RobotId, Box<dyn Agent>)>,
    recorded: &[StateHash],
    tick_count: u32,
) -> Result<(), ReplayError> {
    if (recorded.len() as u64) < u64::from(tick_count) {
        return Err(ReplayError::TruncatedInput {
            available: recorded.len(),
            needed: tick_count as usize,
        });
    }

    config.validate()?;

    let mut world = WorldState::new(&config);
    let mut host = AgentHost::new();
    for (id, agent) in agents {
        if !world.robots.contains_key(&id) {
            return Err(ReplayError::MissingRobot(id));
        }
        host.register(id, agent);
    }
    host.init_all(&mut world, &config);

    for expected in recorded.iter().take(tick_count as usize) {
        tick(&mut world, &mut host, &config);
        let replayed = world.compute_hash();
        if replayed != *expected {
            host.destroy_all();
            return Err(ReplayError::HashMismatch {
                tick: world.tick,
                recorded: *expected,
                replayed,
            });
        }
    }

    host.destroy_all();
    Ok(())
}

/// Run `tick_count` ticks of a fresh battle and return the per-tick
/// state hashes, for use as the `recorded` input to a later
/// [`verify_replay`] call.
pub fn record_hashes(
    config: &BattleConfig,
    agents: Vec<(RobotId, Box<dyn Agent>)>,
    tick_count: u32,
) -> Result<Vec<StateHash>, ReplayError> {
    config.validate()?;

    let mut world = WorldState::new(config);
    let mut host = AgentHost::new();
    for (id, agent) in agents {
        if !world.robots.contains_key(&id) {
            return Err(ReplayError::MissingRobot(id));
        }
        host.register(id, agent);
    }
    host.init_all(&mut world, config);

    let mut hashes = Vec::with_capacity(tick_count as usize);
    for _ in 0..tick_count {
        tick(&mut world, &mut host, config);
        hashes.push(world.compute_hash());
    }

    host.destroy_all();
    Ok(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::RobotApi;
    use crate::game::config::RobotDescriptor;

    struct Circler;
    impl Agent for Circler {
        fn tick(&mut self, api: &mut RobotApi) {
            api.set_speed(30.0);
            api.set_turn_rate(4.0);
            api.set_radar_turn_rate(15.0);
            if api.gun_heat() == 0.0 && api.energy() >= 2.0 {
                api.fire(2.0);
            }
        }
    }

    fn config(n: usize) -> BattleConfig {
        let mut config = BattleConfig::default();
        config.master_seed = 7;
        for i in 0..n {
            config.robots.push(RobotDescriptor {
                name: format!("R{i}"),
                color: "#fff".into(),
            });
        }
        config
    }

    fn agents(n: usize) -> Vec<(RobotId, Box<dyn Agent>)> {
        (0..n).map(|i| (RobotId(i as u32), Box::new(Circler) as Box<dyn Agent>)).collect()
    }

    #[test]
    fn matching_replay_verifies_clean() {
        let recorded = record_hashes(&config(3), agents(3), 60).unwrap();
        assert_eq!(recorded.len(), 60);
        verify_replay(config(3), agents(3), &recorded, 60).unwrap();
    }

    #[test]
    fn tampered_hash_is_rejected() {
        let mut recorded = record_hashes(&config(3), agents(3), 40).unwrap();
        recorded[10] = [0xAA; 32];
        let err = verify_replay(config(3), agents(3), &recorded, 40).unwrap_err();
        match err {
            ReplayError::HashMismatch { tick, .. } => assert_eq!(tick, 11),
            other => panic!("expected HashMismatch, got {other:?}"),
        }
    }

    #[test]
    fn truncated_recorded_sequence_is_rejected() {
        let recorded = record_hashes(&config(2), agents(2), 10).unwrap();
        let err = verify_replay(config(2), agents(2), &recorded, 50).unwrap_err();
        assert!(matches!(err, ReplayError::TruncatedInput { available: 10, needed: 50 }));
    }

    #[test]
    fn missing_robot_is_rejected() {
        let recorded = record_hashes(&config(2), agents(2), 5).unwrap();
        let bogus_agents: Vec<(RobotId, Box<dyn Agent>)> =
            vec![(RobotId(0), Box::new(Circler)), (RobotId(99), Box::new(Circler))];
        let err = verify_replay(config(2), bogus_agents, &recorded, 5).unwrap_err();
        assert!(matches!(err, ReplayError::MissingRobot(RobotId(99))));
    }
}
