//! Mine and Cookie Spawning
//!
//! Cadence-and-cap driven placement, mirroring the engine's
//! interval-gated spawn waves elsewhere: on a qualifying tick, attempt
//! to place one new entity at a uniformly random arena point that
//! clears every alive robot by `min_spawn_distance_from_robot`, up to a
//! bounded number of rejection attempts. Exhausting the budget without
//! a valid point silently defers to the next spawn opportunity rather
//! than failing the tick.

use crate::core::geometry::Vec2;
use crate::core::rng::BattleRng;

use super::config::BattleConfig;
use super::events::Event;
use super::state::{Cookie, Mine, WorldState};

/// Run Phase 10 of the tick pipeline: attempt a mine spawn, then a
/// cookie spawn, if this tick's counter lines up with their interval
/// and the respective cap has not been reached.
pub fn maybe_spawn_entities(world: &mut WorldState, config: &BattleConfig) {
    let alive_positions: Vec<Vec2> = world
        .robots
        .values()
        .filter(|r| r.alive)
        .map(|r| r.position)
        .collect();

    if config.mine_spawn_interval > 0
        && world.tick % config.mine_spawn_interval == 0
        && world.mines.len() < config.max_mines
    {
        if let Some(position) = find_spawn_point(&alive_positions, config, &mut world.rng) {
            let id = world.next_item_id();
            world.mines.insert(id, Mine { id, position });
            world.push_event(Event::MineSpawned {
                tick: world.tick,
                mine_id: id,
                position: (position.x, position.y),
            });
        }
    }

    if config.cookie_spawn_interval > 0
        && world.tick % config.cookie_spawn_interval == 0
        && world.cookies.len() < config.max_cookies
    {
        if let Some(position) = find_spawn_point(&alive_positions, config, &mut world.rng) {
            let id = world.next_item_id();
            world.cookies.insert(id, Cookie { id, position });
            world.push_event(Event::CookieSpawned {
                tick: world.tick,
                cookie_id: id,
                position: (position.x, position.y),
            });
        }
    }
}

/// Draw a uniformly random arena point whose distance to every alive
/// robot is at least `min_spawn_distance_from_robot`, via rejection
/// sampling bounded by `config.spawn_attempt_budget`. Returns `None` if
/// no valid point was found within the budget.
fn find_spawn_point(alive: &[Vec2], config: &BattleConfig, rng: &mut BattleRng) -> Option<Vec2> {
    for _ in 0..config.spawn_attempt_budget.max(1) {
        let x = rng.next_float_range(0.0, config.arena_width);
        let y = rng.next_float_range(0.0, config.arena_height);
        let candidate = Vec2::new(x, y);

        let far_enough = alive
            .iter()
            .all(|p| candidate.distance(*p) >= config.min_spawn_distance_from_robot);
        if far_enough {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::RobotDescriptor;

    fn test_config(n: usize) -> BattleConfig {
        let mut config = BattleConfig::default();
        for i in 0..n {
            config.robots.push(RobotDescriptor {
                name: format!("R{i}"),
                color: "#fff".into(),
            });
        }
        config
    }

    #[test]
    fn spawns_mine_on_interval_tick_when_under_cap() {
        let config = test_config(2);
        let mut world = WorldState::new(&config);
        world.tick = 0;

        maybe_spawn_entities(&mut world, &config);

        assert_eq!(world.mines.len(), 1);
        let event_is_mine_spawned = world
            .events
            .iter()
            .any(|e| matches!(e, Event::MineSpawned { .. }));
        assert!(event_is_mine_spawned);
    }

    #[test]
    fn does_not_spawn_mine_past_cap() {
        let mut config = test_config(2);
        config.max_mines = 0;
        let mut world = WorldState::new(&config);
        world.tick = 0;

        maybe_spawn_entities(&mut world, &config);

        assert!(world.mines.is_empty());
    }

    #[test]
    fn spawn_point_clears_minimum_distance_from_every_robot() {
        let config = test_config(3);
        let world = WorldState::new(&config);
        let alive: Vec<Vec2> = world.robots.values().map(|r| r.position).collect();
        let mut rng = world.rng.clone();

        if let Some(point) = find_spawn_point(&alive, &config, &mut rng) {
            for p in &alive {
                assert!(point.distance(*p) >= config.min_spawn_distance_from_robot - 1e-9);
            }
        }
    }

    #[test]
    fn spawn_point_gives_up_when_budget_exhausted_in_a_packed_arena() {
        let mut config = test_config(1);
        config.min_spawn_distance_from_robot = 10_000.0;
        config.spawn_attempt_budget = 5;
        let world = WorldState::new(&config);
        let alive: Vec<Vec2> = world.robots.values().map(|r| r.position).collect();
        let mut rng = world.rng.clone();

        assert!(find_spawn_point(&alive, &config, &mut rng).is_none());
    }
}
