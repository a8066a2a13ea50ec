//! Tournament
//!
//! An ordered sequence of single-round games over the same roster of
//! compiled agents. Game `i` seeds its battle with `base_seed + i`;
//! no simulation state is ever shared between games, matching the
//! engine's per-battle-PRNG-instance rule at the tournament layer.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::game::agent::Agent;
use crate::game::config::{BattleConfig, ConfigError};
use crate::game::events::Placement;
use crate::game::state::RobotId;

use crate::controller::BattleController;

/// One roster slot: a caller-supplied identifier (so the same
/// compiled agent can appear more than once in the roster) paired with
/// a factory that produces a fresh `Agent` instance for each game.
pub struct RosterEntry<R> {
    /// Caller-supplied identity for this slot, stable across games.
    pub roster_id: R,
    /// Builds a fresh agent instance; called once per game.
    pub make_agent: Box<dyn Fn() -> Box<dyn Agent>>,
}

/// Placement result for one roster entry in one game.
#[derive(Clone, Debug, PartialEq)]
pub struct RosterPlacement<R> {
    /// The roster entry this placement belongs to.
    pub roster_id: R,
    /// 1-based placement.
    pub place: u32,
    /// Points awarded.
    pub points: f64,
}

/// Outcome of a single game in the tournament.
#[derive(Clone, Debug, PartialEq)]
pub struct GameResult<R> {
    /// 0-based index of this game in the tournament.
    pub index: u32,
    /// Seed this game's battle was constructed with.
    pub seed: u32,
    /// Final placements, first place first.
    pub placements: Vec<RosterPlacement<R>>,
}

/// Tournament progress, emitted after each completed game; shaped to
/// match the worker protocol's `progress` message so embedded and
/// worker-mediated tournaments report the same thing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Games completed so far.
    pub games_complete: u32,
    /// Total games this tournament will run.
    pub total_games: u32,
}

/// Accumulated points and win counts, keyed by roster id.
#[derive(Clone, Debug, Default)]
pub struct Standings<R: Ord> {
    entries: BTreeMap<R, StandingEntry>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct StandingEntry {
    points: f64,
    wins: u32,
}

impl<R: Ord + Clone> Standings<R> {
    fn record(&mut self, roster_id: &R, points: f64, place: u32) {
        let entry = self.entries.entry(roster_id.clone()).or_default();
        entry.points += points;
        if place == 1 {
            entry.wins += 1;
        }
    }

    /// Standings sorted by descending points, ties broken by
    /// descending wins.
    pub fn ranked(&self) -> Vec<(R, f64, u32)> {
        let mut rows: Vec<(R, f64, u32)> = self
            .entries
            .iter()
            .map(|(id, e)| (id.clone(), e.points, e.wins))
            .collect();
        rows.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.2.cmp(&a.2))
        });
        rows
    }
}

/// Drives an ordered sequence of single-round games over a fixed
/// roster, accumulating `Standings`.
pub struct Tournament<R: Ord + Clone> {
    run_id: Uuid,
    config: BattleConfig,
    roster: Vec<RosterEntry<R>>,
    base_seed: u32,
}

impl<R: Ord + Clone> Tournament<R> {
    /// Build a tournament over `roster`, using `config` as the
    /// template for every game's battle (each game overrides
    /// `master_seed` and forces `round_count = 1`).
    pub fn new(config: BattleConfig, roster: Vec<RosterEntry<R>>, base_seed: u32) -> Self {
        let run_id = Uuid::new_v4();
        tracing::info!(run_id = %run_id, roster_size = roster.len(), base_seed, "tournament constructed");
        Self {
            run_id,
            config,
            roster,
            base_seed,
        }
    }

    /// This tournament run's correlation id, stable for its lifetime.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run `num_games` games. `should_abort` is polled before each
    /// game; `on_game_complete` and `on_progress` fire after each game
    /// completes. Returns every game's result in order.
    pub fn run(
        &self,
        num_games: u32,
        mut should_abort: impl FnMut() -> bool,
        mut on_game_complete: impl FnMut(&GameResult<R>),
        mut on_progress: impl FnMut(Progress),
    ) -> Result<Vec<GameResult<R>>, ConfigError> {
        tracing::info!(run_id = %self.run_id, num_games, "tournament run starting");
        let mut results = Vec::with_capacity(num_games as usize);

        for index in 0..num_games {
            if should_abort() {
                tracing::info!(run_id = %self.run_id, completed = index, "tournament run aborted");
                break;
            }

            let result = self.run_one_game(index)?;
            on_game_complete(&result);
            on_progress(Progress {
                games_complete: index + 1,
                total_games: num_games,
            });
            results.push(result);
        }

        Ok(results)
    }

    fn run_one_game(&self, index: u32) -> Result<GameResult<R>, ConfigError> {
        let mut config = self.config.clone();
        config.master_seed = self.base_seed.wrapping_add(index);
        config.round_count = 1;
        config.robots = (0..self.roster.len())
            .map(|slot| crate::game::config::RobotDescriptor {
                name: format!("R{slot}"),
                color: "#ffffff".into(),
            })
            .collect();

        let agents: Vec<(RobotId, Box<dyn Agent>)> = self
            .roster
            .iter()
            .enumerate()
            .map(|(i, entry)| (RobotId(i as u32), (entry.make_agent)()))
            .collect();

        let seed = config.master_seed;
        let mut controller = BattleController::new(config, agents)?;
        let round_result = controller.run_round();
        controller.destroy();

        let placements = round_result
            .placements
            .iter()
            .map(|p: &Placement| RosterPlacement {
                roster_id: self.roster[p.robot_id.0 as usize].roster_id.clone(),
                place: p.place,
                points: p.points,
            })
            .collect();

        Ok(GameResult {
            index,
            seed,
            placements,
        })
    }

    /// Accumulate `Standings` over a completed set of game results.
    pub fn standings(&self, results: &[GameResult<R>]) -> Standings<R> {
        let mut standings = Standings::default();
        for result in results {
            for placement in &result.placements {
                standings.record(&placement.roster_id, placement.points, placement.place);
            }
        }
        standings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::RobotApi;

    struct Idle;
    impl Agent for Idle {
        fn tick(&mut self, _api: &mut RobotApi) {}
    }

    fn roster(n: usize) -> Vec<RosterEntry<String>> {
        (0..n)
            .map(|i| RosterEntry {
                roster_id: format!("agent-{i}"),
                make_agent: Box::new(|| Box::new(Idle) as Box<dyn Agent>),
            })
            .collect()
    }

    #[test]
    fn runs_the_requested_number_of_games_with_distinct_seeds() {
        let mut config = BattleConfig::default();
        config.ticks_per_round = 5;
        let tournament = Tournament::new(config, roster(2), 1000);

        let results = tournament
            .run(3, || false, |_| {}, |_| {})
            .unwrap();

        assert_eq!(results.len(), 3);
        let seeds: Vec<u32> = results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![1000, 1001, 1002]);
    }

    #[test]
    fn should_abort_stops_early() {
        let mut config = BattleConfig::default();
        config.ticks_per_round = 5;
        let tournament = Tournament::new(config, roster(2), 0);

        let mut seen = 0;
        let results = tournament
            .run(10, || seen >= 2, |_| seen += 1, |_| {})
            .unwrap();

        assert!(results.len() <= 2);
    }

    #[test]
    fn standings_accumulate_points_and_wins_across_games() {
        let mut config = BattleConfig::default();
        config.ticks_per_round = 5;
        let tournament = Tournament::new(config, roster(2), 0);

        let results = tournament.run(4, || false, |_| {}, |_| {}).unwrap();
        let standings = tournament.standings(&results);
        let ranked = standings.ranked();

        assert_eq!(ranked.len(), 2);
        let total_points: f64 = ranked.iter().map(|(_, points, _)| points).sum();
        assert!(total_points > 0.0);
    }
}
