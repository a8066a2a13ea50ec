//! Skirmish Engine Demo
//!
//! Runs a short battle between a few scripted agents and verifies
//! determinism by replaying it from the same seed.

use anyhow::Context;
use chrono::Utc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use skirmish_engine::game::agent::{Agent, RobotApi};
use skirmish_engine::game::config::RobotDescriptor;
use skirmish_engine::{BattleConfig, BattleController, RobotId, VERSION};

/// A simple scripted agent: spins its radar, drives in a slow circle,
/// and fires whenever its gun is ready and it has the energy to spare.
struct Skirmisher;

impl Agent for Skirmisher {
    fn tick(&mut self, api: &mut RobotApi) {
        api.set_speed(40.0);
        api.set_turn_rate(3.0);
        api.set_radar_turn_rate(45.0);
        if api.gun_heat() == 0.0 && api.energy() >= 3.0 {
            api.fire(3.0);
        }
    }

    fn on_scan(&mut self, api: &mut RobotApi, distance: f64, bearing: f64) {
        api.set_gun_heading(api.gun_heading() + bearing);
        let _ = distance;
    }

    fn on_hit(&mut self, _api: &mut RobotApi, damage: f64, bearing: f64) {
        info!(damage, bearing, "took a hit");
    }
}

fn roster() -> Vec<(RobotId, Box<dyn Agent>)> {
    (0..3)
        .map(|i| (RobotId(i), Box::new(Skirmisher) as Box<dyn Agent>))
        .collect()
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("Skirmish Engine v{}", VERSION);
    demo_battle()
}

fn demo_battle() -> anyhow::Result<()> {
    let started_at = Utc::now();
    info!(started_at = %started_at, "=== Starting Demo Battle ===");

    let mut config = BattleConfig::default();
    config.ticks_per_round = 500;
    config.robots = vec![
        RobotDescriptor {
            name: "Alpha".into(),
            color: "#ff3b30".into(),
        },
        RobotDescriptor {
            name: "Bravo".into(),
            color: "#007aff".into(),
        },
        RobotDescriptor {
            name: "Charlie".into(),
            color: "#34c759".into(),
        },
    ];

    let mut controller = BattleController::new(config.clone(), roster()).context("invalid battle config")?;
    let mut total_events = 0;

    loop {
        let result = controller.tick();
        total_events += result.snapshot.events.len();

        if result.snapshot.tick % 100 == 0 {
            let alive = result.snapshot.robots.iter().filter(|r| r.alive).count();
            info!(tick = result.snapshot.tick, alive, total_events, "battle progress");
        }

        if let Some(round_result) = result.round_result {
            info!(reason = ?round_result.reason, "round over");
            for placement in &round_result.placements {
                info!(
                    robot = %placement.robot_id,
                    place = placement.place,
                    points = placement.points,
                    "placement"
                );
            }
            break;
        }
    }

    let hash = controller.state_hash();
    controller.destroy();
    info!("Final state hash: {}", hex::encode(hash));

    info!("=== Verifying Determinism ===");
    let mut replay = BattleController::new(config, roster()).context("invalid battle config")?;
    while !replay.is_round_over() {
        replay.tick();
    }
    let replay_hash = replay.state_hash();
    replay.destroy();
    info!("Replay state hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: hashes match");
    } else {
        info!("DETERMINISM FAILURE: hashes differ");
    }

    let finished_at = Utc::now();
    info!(
        finished_at = %finished_at,
        elapsed_ms = (finished_at - started_at).num_milliseconds(),
        "=== Demo Battle Complete ==="
    );
    Ok(())
}
