//! Worker Protocol
//!
//! Message shapes for the external batch-execution boundary: a worker
//! process runs one or more battles and reports results back over
//! whatever transport the host chooses. This module defines only the
//! message *shapes*; the socket, framing, and event loop belong to the
//! worker transport, an external collaborator out of scope for this
//! crate (see `DESIGN.md`).
//!
//! Messages are self-contained: a worker holds no state between
//! commands, so every field needed to act on a command is carried in
//! that command.

use serde::{Deserialize, Serialize};

use crate::game::config::{BattleConfig, RobotDescriptor};
use crate::game::events::Placement;
use crate::game::state::RobotId;
use crate::tournament::RosterPlacement;

/// An opaque reference to a compiled, sandboxed agent binary. The
/// loader that turns source code into this representation is an
/// external collaborator; this crate treats it as opaque bytes plus a
/// caller-supplied roster id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentBinary {
    /// Caller-supplied identity for this agent, echoed back in results
    /// so the same compiled agent can be told apart across games (or
    /// appear multiple times in one roster).
    pub roster_id: String,
    /// Opaque compiled/sandboxed representation; this crate never
    /// interprets these bytes itself.
    pub bytes: Vec<u8>,
}

/// Commands a host may send to a worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerCommand {
    /// Run a batch of games, from `start_round` up to (exclusive)
    /// `end_round`, over the given roster and shared configuration.
    RunBatch {
        /// Battle configuration shared by every game in the batch.
        config: BattleConfig,
        /// Compiled agents, in roster order.
        agent_binaries: Vec<AgentBinary>,
        /// First game index to run (inclusive).
        start_round: u32,
        /// Last game index to run (exclusive).
        end_round: u32,
    },
    /// Abort the in-progress batch as soon as the worker reaches its
    /// next cooperative yield point.
    Cancel,
}

/// Events a worker reports back to its host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerEvent {
    /// Progress update after a completed game.
    Progress {
        /// Games completed so far in this batch.
        rounds_complete: u32,
        /// Total games this batch will run.
        total_rounds: u32,
    },
    /// One game's result, reported as soon as that game ends.
    RoundResult {
        /// The completed game's result.
        result: WireGameResult,
    },
    /// The whole batch finished (including an aborted batch's partial results).
    BatchComplete {
        /// Every game result produced before completion or cancellation.
        results: Vec<WireGameResult>,
    },
    /// The worker failed to run the batch at all (e.g. invalid config).
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

/// Wire representation of one game's outcome, descriptor-independent
/// so it serializes without any agent-binary payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireGameResult {
    /// 0-based index of this game within the batch.
    pub index: u32,
    /// Seed this game's battle was constructed with.
    pub seed: u32,
    /// Final placements, keyed by roster id.
    pub placements: Vec<WirePlacement>,
}

/// One roster entry's placement in a single game, as reported over the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WirePlacement {
    /// The roster entry's caller-supplied identity.
    pub roster_id: String,
    /// 1-based placement (1 = first place).
    pub place: u32,
    /// Points awarded for this placement.
    pub points: f64,
}

impl From<RosterPlacement<String>> for WirePlacement {
    fn from(p: RosterPlacement<String>) -> Self {
        Self {
            roster_id: p.roster_id,
            place: p.place,
            points: p.points,
        }
    }
}

/// Build the roster slice a `RunBatch` command's `config.robots` should
/// carry, one descriptor per agent binary, display-named from its
/// roster id.
pub fn roster_descriptors(agent_binaries: &[AgentBinary]) -> Vec<RobotDescriptor> {
    agent_binaries
        .iter()
        .map(|a| RobotDescriptor {
            name: a.roster_id.clone(),
            color: "#ffffff".into(),
        })
        .collect()
}

/// Translate one round's raw placements into their wire form, given the
/// roster ids in slot order.
pub fn wire_placements(placements: &[Placement], roster_ids: &[String]) -> Vec<WirePlacement> {
    placements
        .iter()
        .filter_map(|p| {
            let RobotId(slot) = p.robot_id;
            roster_ids.get(slot as usize).map(|roster_id| WirePlacement {
                roster_id: roster_id.clone(),
                place: p.place,
                points: p.points,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_command_round_trips_through_json() {
        let cmd = WorkerCommand::RunBatch {
            config: BattleConfig::default(),
            agent_binaries: vec![AgentBinary {
                roster_id: "alpha".into(),
                bytes: vec![1, 2, 3],
            }],
            start_round: 0,
            end_round: 10,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let parsed: WorkerCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, parsed);
    }

    #[test]
    fn worker_event_tags_are_snake_case() {
        let event = WorkerEvent::Progress {
            rounds_complete: 1,
            total_rounds: 5,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"progress\""));
    }

    #[test]
    fn roster_descriptors_name_from_roster_id() {
        let binaries = vec![
            AgentBinary {
                roster_id: "alpha".into(),
                bytes: vec![],
            },
            AgentBinary {
                roster_id: "bravo".into(),
                bytes: vec![],
            },
        ];
        let descriptors = roster_descriptors(&binaries);
        assert_eq!(descriptors[0].name, "alpha");
        assert_eq!(descriptors[1].name, "bravo");
    }

    #[test]
    fn wire_placements_maps_slot_to_roster_id() {
        let placements = vec![Placement {
            robot_id: RobotId(1),
            place: 1,
            points: 3.0,
        }];
        let roster_ids = vec!["alpha".to_string(), "bravo".to_string()];
        let wire = wire_placements(&placements, &roster_ids);
        assert_eq!(wire[0].roster_id, "bravo");
    }
}
