//! Authoritative Simulation Tick
//!
//! The core battle loop. Every phase below runs in a fixed order and
//! only reads state produced by earlier phases in the *same* tick;
//! this is what makes replay and cross-platform determinism possible.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::core::geometry::{angle_diff, bearing_to, normalize_angle, swept_segment_vs_circle, sweep_arc_contains, Vec2};

use super::agent::AgentHost;
use super::collision::{clamp_to_arena, overlapping_pairs, separate_overlap};
use super::config::BattleConfig;
use super::events::{Event, Placement, RoundEndReason};
use super::spawn::maybe_spawn_entities;
use super::state::{Bullet, BulletId, GameState, ItemId, RobotId, WorldState};

fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Outcome of one call to [`tick`].
#[derive(Debug)]
pub struct TickResult {
    /// Immutable snapshot of the world after this tick's phases ran.
    pub snapshot: GameState,
    /// True if this tick ended the round.
    pub round_over: bool,
    /// Populated iff `round_over`.
    pub round_result: Option<RoundResult>,
}

/// Summary of a finished round, duplicated here (beyond the
/// `round_over` event already in the snapshot) so callers don't need
/// to scan the event list to learn the outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundResult {
    /// The round that just ended.
    pub round: u32,
    /// Why it ended.
    pub reason: RoundEndReason,
    /// Final placements, first place first.
    pub placements: Vec<Placement>,
}

/// Run one full tick of the pipeline: advance counters, move and
/// resolve bullets, deliver last tick's callbacks, run agents, apply
/// movement and collisions, scan, spawn and resolve pickups, process
/// fire intents, then check for round end.
pub fn tick(world: &mut WorldState, host: &mut AgentHost, config: &BattleConfig) -> TickResult {
    advance_counters(world);

    let prev_bullet_positions = advance_bullets(world);
    bullet_robot_collision(world, config, &prev_bullet_positions);
    bullet_bounds_check(world, config);

    host.deliver_pending(world, config);
    host.run_tick(world, config);

    movement(world, config);
    robot_robot_collision(world, config);
    radar_scanning(world, config);

    maybe_spawn_entities(world, config);
    pickup_and_detonation(world, config);
    fire_intents(world, config);

    let round_result = round_end_check(world, config);
    let round_over = round_result.is_some();

    TickResult {
        snapshot: world.snapshot(),
        round_over,
        round_result,
    }
}

/// Phase 0 — advance counters.
fn advance_counters(world: &mut WorldState) {
    world.tick += 1;
    world.events.clear();

    for robot in world.robots.values_mut() {
        if !robot.alive {
            continue;
        }
        robot.prev_radar_heading = robot.radar_heading;
        robot.intended_turn_rate = 0.0;
        robot.intended_gun_turn_rate = 0.0;
        robot.intended_radar_turn_rate = 0.0;
        robot.intended_fire = 0.0;
    }
}

/// Phase 1 — bullet motion. Returns each bullet's pre-motion position
/// so Phase 2 can run a swept test against the full tick of travel.
fn advance_bullets(world: &mut WorldState) -> BTreeMap<BulletId, Vec2> {
    let mut prev_positions = BTreeMap::new();
    for (id, bullet) in world.bullets.iter_mut() {
        prev_positions.insert(*id, bullet.position);
        let heading_rad = to_radians(bullet.heading);
        bullet.position.x += bullet.speed * heading_rad.sin();
        bullet.position.y -= bullet.speed * heading_rad.cos();
    }
    prev_positions
}

/// Phase 2 — bullet-robot swept collision.
fn bullet_robot_collision(world: &mut WorldState, config: &BattleConfig, prev_positions: &BTreeMap<BulletId, Vec2>) {
    let bullet_ids: Vec<BulletId> = world.bullets.keys().copied().collect();
    let mut removed: Vec<BulletId> = Vec::new();
    let mut fresh_deaths: Vec<RobotId> = Vec::new();

    for bullet_id in bullet_ids {
        let bullet: Bullet = *world.bullets.get(&bullet_id).unwrap();
        let Some(&prev) = prev_positions.get(&bullet_id) else {
            continue;
        };

        let candidate_ids: Vec<RobotId> = world
            .robots
            .iter()
            .filter(|(id, r)| r.alive && **id != bullet.owner)
            .map(|(id, _)| *id)
            .collect();

        let combined_radius = config.robot_radius + config.bullet_radius;
        let mut hit: Option<(RobotId, Vec2)> = None;
        for target_id in candidate_ids {
            let target_position = world.robots.get(&target_id).unwrap().position;
            let sweep = swept_segment_vs_circle(prev, bullet.position, target_position, combined_radius);
            if sweep.hit {
                let impact = Vec2::new(
                    prev.x + (bullet.position.x - prev.x) * sweep.t,
                    prev.y + (bullet.position.y - prev.y) * sweep.t,
                );
                hit = Some((target_id, impact));
                break;
            }
        }

        let Some((target_id, impact)) = hit else {
            continue;
        };

        let power = bullet.power;
        let damage = config.damage_base * power + (power - 1.0).max(0.0) * config.damage_bonus;

        let relative_bearing_for_event = {
            let target = world.robots.get_mut(&target_id).unwrap();
            target.health = (target.health - damage).max(0.0);
            let absolute_bearing = bearing_to(target.position, impact);
            let relative_bearing = angle_diff(target.heading, absolute_bearing);
            target.pending.hit = Some((damage, relative_bearing));
            target.damage_received += damage;
            relative_bearing
        };
        if let Some(shooter) = world.robots.get_mut(&bullet.owner) {
            shooter.energy = (shooter.energy + 3.0 * power).min(config.start_energy);
            shooter.bullets_hit += 1;
            shooter.damage_dealt += damage;
            shooter.pending.bullet_hit_target = Some(target_id);
        }

        world.push_event(Event::BulletHit {
            tick: world.tick,
            bullet_id,
            shooter_id: bullet.owner,
            target_id,
            damage,
            position: (impact.x, impact.y),
        });
        world.push_event(Event::RobotHit {
            tick: world.tick,
            robot_id: target_id,
            damage,
            bearing: relative_bearing_for_event,
        });

        let died = world.robots.get(&target_id).unwrap().health <= 0.0;
        if died {
            world.robots.get_mut(&target_id).unwrap().alive = false;
            if let Some(shooter) = world.robots.get_mut(&bullet.owner) {
                shooter.kills += 1;
            }
            world.push_event(Event::RobotDied {
                tick: world.tick,
                robot_id: target_id,
                killer_id: Some(bullet.owner),
            });
            fresh_deaths.push(target_id);
        }

        removed.push(bullet_id);
    }

    for bullet_id in removed {
        world.bullets.remove(&bullet_id);
    }

    queue_deaths(world, &fresh_deaths);
}

/// Queue `onRobotDeath(deadId)` on every other alive robot, for each
/// robot in `dead`, in the order they appear.
fn queue_deaths(world: &mut WorldState, dead: &[RobotId]) {
    for &dead_id in dead {
        let others: Vec<RobotId> = world
            .robots
            .iter()
            .filter(|(id, r)| **id != dead_id && r.alive)
            .map(|(id, _)| *id)
            .collect();
        for id in others {
            if let Some(robot) = world.robots.get_mut(&id) {
                robot.pending.deaths.push(dead_id);
            }
        }
    }
}

/// Phase 3 — bullet bounds check.
fn bullet_bounds_check(world: &mut WorldState, config: &BattleConfig) {
    let bullet_ids: Vec<BulletId> = world.bullets.keys().copied().collect();
    let mut removed = Vec::new();

    for bullet_id in bullet_ids {
        let bullet = *world.bullets.get(&bullet_id).unwrap();
        let outside = bullet.position.x < 0.0
            || bullet.position.x > config.arena_width
            || bullet.position.y < 0.0
            || bullet.position.y > config.arena_height;
        if !outside {
            continue;
        }

        world.push_event(Event::BulletWall {
            tick: world.tick,
            bullet_id,
            shooter_id: bullet.owner,
        });
        if let Some(shooter) = world.robots.get_mut(&bullet.owner) {
            shooter.pending.bullet_miss = true;
        }
        removed.push(bullet_id);
    }

    for bullet_id in removed {
        world.bullets.remove(&bullet_id);
    }
}

/// Which wall a clamped robot position hit, in the horizontal-first
/// tie-break order used when a corner clamps both axes at once.
#[derive(Clone, Copy)]
enum Wall {
    West,
    East,
    North,
    South,
}

fn wall_bearing(wall: Wall, heading: f64) -> f64 {
    let absolute = match wall {
        Wall::North => 0.0,
        Wall::East => 90.0,
        Wall::South => 180.0,
        Wall::West => 270.0,
    };
    normalize_signed(absolute - heading)
}

fn normalize_signed(degrees: f64) -> f64 {
    let wrapped = normalize_angle(degrees);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Phase 6 — movement.
fn movement(world: &mut WorldState, config: &BattleConfig) {
    let ids: Vec<RobotId> = world
        .robots
        .iter()
        .filter(|(_, r)| r.alive)
        .map(|(id, _)| *id)
        .collect();

    let mut fresh_deaths = Vec::new();

    for id in ids {
        let robot = world.robots.get_mut(&id).unwrap();

        let turn = robot.intended_turn_rate.clamp(-config.max_turn_rate, config.max_turn_rate);
        robot.heading = normalize_angle(robot.heading + turn);

        let target_speed = robot.intended_speed.clamp(-config.max_speed, config.max_speed);
        robot.speed = if target_speed > robot.speed {
            (robot.speed + config.acceleration).min(target_speed)
        } else if target_speed < robot.speed {
            (robot.speed - config.deceleration).max(target_speed)
        } else {
            robot.speed
        };

        let move_heading_rad = to_radians(robot.heading - 90.0);
        let candidate = Vec2::new(
            robot.position.x + move_heading_rad.cos() * robot.speed * 0.1,
            robot.position.y + move_heading_rad.sin() * robot.speed * 0.1,
        );

        let clamp = clamp_to_arena(candidate, config.robot_radius, config.arena_width, config.arena_height);
        robot.position = clamp.position;

        if clamp.any_hit() {
            let wall = if clamp.hit_west {
                Wall::West
            } else if clamp.hit_east {
                Wall::East
            } else if clamp.hit_north {
                Wall::North
            } else {
                Wall::South
            };
            let bearing = wall_bearing(wall, robot.heading);
            let damage = robot.speed.abs() * config.wall_damage_speed_factor;
            robot.health = (robot.health - damage).max(0.0);
            robot.damage_received += damage;
            robot.speed = 0.0;

            world.events.push(Event::WallHit {
                tick: world.tick,
                robot_id: id,
                damage,
                bearing,
            });
            let robot = world.robots.get_mut(&id).unwrap();
            robot.pending.wall_bearing = Some(bearing);

            if robot.health <= 0.0 {
                robot.alive = false;
                world.events.push(Event::RobotDied {
                    tick: world.tick,
                    robot_id: id,
                    killer_id: None,
                });
                fresh_deaths.push(id);
            }
        }

        let robot = world.robots.get_mut(&id).unwrap();
        let gun_turn = robot
            .intended_gun_turn_rate
            .clamp(-config.max_gun_turn_rate, config.max_gun_turn_rate);
        robot.gun_heading = normalize_angle(robot.gun_heading + gun_turn);
        robot.gun_heat = (robot.gun_heat - config.gun_cooldown_rate).max(0.0);

        let radar_turn = robot
            .intended_radar_turn_rate
            .clamp(-config.max_radar_turn_rate, config.max_radar_turn_rate);
        robot.radar_heading = normalize_angle(robot.radar_heading + radar_turn);

        robot.energy = (robot.energy + config.energy_regen_rate).min(config.start_energy);
    }

    queue_deaths(world, &fresh_deaths);
}

/// Phase 7 — robot-robot collision.
fn robot_robot_collision(world: &mut WorldState, config: &BattleConfig) {
    let current_pairs = overlapping_pairs(world, config.robot_radius);
    let new_pairs: Vec<(RobotId, RobotId)> = current_pairs
        .iter()
        .filter(|pair| !world.colliding_pairs.contains(*pair))
        .copied()
        .collect();

    let mut fresh_deaths = Vec::new();

    for (a, b) in new_pairs {
        if !world.robots[&a].alive || !world.robots[&b].alive {
            continue;
        }

        let (speed_a, speed_b, pos_a, pos_b, heading_a, heading_b) = {
            let ra = world.robots.get(&a).unwrap();
            let rb = world.robots.get(&b).unwrap();
            (ra.speed, rb.speed, ra.position, rb.position, ra.heading, rb.heading)
        };

        let damage = config.ram_damage_base + config.ram_damage_factor * (speed_a.abs() + speed_b.abs());

        let bearing_a = angle_diff(heading_a, bearing_to(pos_a, pos_b));
        let bearing_b = angle_diff(heading_b, bearing_to(pos_b, pos_a));

        let mut died = Vec::new();
        for (id, bearing) in [(a, bearing_a), (b, bearing_b)] {
            let robot = world.robots.get_mut(&id).unwrap();
            robot.health = (robot.health - damage).max(0.0);
            robot.damage_received += damage;
            robot.pending.robot_hit_bearing = Some(bearing);
            if robot.health <= 0.0 {
                robot.alive = false;
                died.push(id);
            }
        }

        world.push_event(Event::RobotCollision {
            tick: world.tick,
            robot_a: a,
            robot_b: b,
            damage,
        });

        for id in died {
            world.push_event(Event::RobotDied {
                tick: world.tick,
                robot_id: id,
                killer_id: None,
            });
            fresh_deaths.push(id);
        }
    }

    for &(a, b) in &current_pairs {
        let (pos_a, pos_b) = {
            let ra = world.robots.get(&a).unwrap();
            let rb = world.robots.get(&b).unwrap();
            (ra.position, rb.position)
        };
        let (new_a, new_b) = separate_overlap(pos_a, pos_b, 2.0 * config.robot_radius);
        world.robots.get_mut(&a).unwrap().position =
            clamp_to_arena(new_a, config.robot_radius, config.arena_width, config.arena_height).position;
        world.robots.get_mut(&b).unwrap().position =
            clamp_to_arena(new_b, config.robot_radius, config.arena_width, config.arena_height).position;
    }

    world.colliding_pairs = current_pairs;
    queue_deaths(world, &fresh_deaths);
}

/// Phase 9 — radar scanning.
fn radar_scanning(world: &mut WorldState, config: &BattleConfig) {
    let scanners: Vec<(RobotId, Vec2, f64, f64, f64)> = world
        .robots
        .values()
        .filter(|r| r.alive)
        .map(|r| (r.id, r.position, r.heading, r.prev_radar_heading, r.radar_heading))
        .collect();

    for (scanner_id, scanner_pos, scanner_heading, prev_radar, radar) in &scanners {
        let targets: Vec<(RobotId, Vec2, f64)> = world
            .robots
            .values()
            .filter(|r| r.alive && r.id != *scanner_id)
            .map(|r| (r.id, r.position, r.heading))
            .collect();

        for (target_id, target_pos, target_heading) in targets {
            let distance = scanner_pos.distance(target_pos);
            if distance > config.scan_range {
                continue;
            }

            let absolute_bearing = bearing_to(*scanner_pos, target_pos);
            if !sweep_arc_contains(*prev_radar, *radar, absolute_bearing) {
                continue;
            }

            let scanner_relative = angle_diff(*scanner_heading, absolute_bearing);
            let target_relative = angle_diff(target_heading, bearing_to(target_pos, *scanner_pos));

            world.push_event(Event::ScanDetection {
                tick: world.tick,
                scanner_id: *scanner_id,
                target_id,
                distance,
                bearing: absolute_bearing,
            });
            world.push_event(Event::Scanned {
                tick: world.tick,
                scanner_id: *scanner_id,
                target_id,
                bearing: bearing_to(target_pos, *scanner_pos),
            });

            if let Some(robot) = world.robots.get_mut(scanner_id) {
                robot.pending.scans.push(super::events::ScanObservation {
                    target_id,
                    distance,
                    bearing: scanner_relative,
                });
            }
            if let Some(robot) = world.robots.get_mut(&target_id) {
                robot.pending.scanned.push(super::events::ScannedObservation {
                    scanner_id: *scanner_id,
                    bearing: target_relative,
                });
            }
        }
    }
}

/// Phase 11 — pickup / detonation.
fn pickup_and_detonation(world: &mut WorldState, config: &BattleConfig) {
    let robot_ids: Vec<RobotId> = world
        .robots
        .iter()
        .filter(|(_, r)| r.alive)
        .map(|(id, _)| *id)
        .collect();

    let mut fresh_deaths = Vec::new();

    for robot_id in robot_ids {
        let robot_position = world.robots.get(&robot_id).unwrap().position;

        let mine_hits: Vec<ItemId> = world
            .mines
            .values()
            .filter(|m| robot_position.distance(m.position) <= config.robot_radius + config.mine_radius)
            .map(|m| m.id)
            .collect();
        for mine_id in mine_hits {
            world.mines.remove(&mine_id);
            let robot = world.robots.get_mut(&robot_id).unwrap();
            robot.health = (robot.health - config.mine_damage).max(0.0);
            robot.damage_received += config.mine_damage;
            world.push_event(Event::MineDetonated {
                tick: world.tick,
                mine_id,
                robot_id,
                damage: config.mine_damage,
            });
            if robot.health <= 0.0 {
                robot.alive = false;
                world.push_event(Event::RobotDied {
                    tick: world.tick,
                    robot_id,
                    killer_id: None,
                });
                fresh_deaths.push(robot_id);
                break;
            }
        }

        let Some(robot) = world.robots.get(&robot_id) else {
            continue;
        };
        if !robot.alive {
            continue;
        }
        let robot_position = robot.position;

        let cookie_hits: Vec<ItemId> = world
            .cookies
            .values()
            .filter(|c| robot_position.distance(c.position) <= config.robot_radius + config.cookie_radius)
            .map(|c| c.id)
            .collect();
        for cookie_id in cookie_hits {
            world.cookies.remove(&cookie_id);
            let robot = world.robots.get_mut(&robot_id).unwrap();
            let gained = config.cookie_heal.min(config.start_health - robot.health);
            robot.health += gained;
            world.push_event(Event::CookiePickup {
                tick: world.tick,
                cookie_id,
                robot_id,
                health_gained: gained,
            });
        }
    }

    queue_deaths(world, &fresh_deaths);
}

/// Phase 12 — fire intents.
fn fire_intents(world: &mut WorldState, config: &BattleConfig) {
    let ids: Vec<RobotId> = world
        .robots
        .iter()
        .filter(|(_, r)| r.alive)
        .map(|(id, _)| *id)
        .collect();

    for id in ids {
        let robot = world.robots.get(&id).unwrap();
        if robot.intended_fire <= 0.0 || robot.gun_heat != 0.0 {
            continue;
        }
        let power = robot.intended_fire.clamp(config.min_fire_power, config.max_fire_power);
        let cost = power * config.fire_cost_factor;
        if robot.energy < cost {
            continue;
        }

        let gun_heading = robot.gun_heading;
        let gun_tip = Vec2::new(
            robot.position.x + config.robot_radius * to_radians(gun_heading).sin(),
            robot.position.y - config.robot_radius * to_radians(gun_heading).cos(),
        );
        let speed = config.bullet_base_speed - config.bullet_speed_power_factor * power;

        let robot = world.robots.get_mut(&id).unwrap();
        robot.energy -= cost;
        robot.gun_heat = config.gun_heat_base + power / 5.0;
        robot.bullets_fired += 1;

        let bullet_id = world.next_bullet_id();
        world.bullets.insert(
            bullet_id,
            Bullet {
                id: bullet_id,
                owner: id,
                position: gun_tip,
                heading: gun_heading,
                speed,
                power,
            },
        );

        world.push_event(Event::BulletFired {
            tick: world.tick,
            robot_id: id,
            bullet_id,
            power,
        });
    }
}

/// Phase 13 — round end check.
fn round_end_check(world: &mut WorldState, config: &BattleConfig) -> Option<RoundResult> {
    let alive_count = world.alive_count();
    let total = world.robots.len();

    let reason = if world.tick >= config.ticks_per_round {
        Some(RoundEndReason::TimeLimit)
    } else if total > 1 && alive_count <= 1 {
        Some(RoundEndReason::LastStanding)
    } else {
        None
    };

    let reason = reason?;

    let mut ranked: Vec<&mut super::state::RobotState> = world.robots.values_mut().collect();
    ranked.sort_by(|a, b| {
        b.alive
            .cmp(&a.alive)
            .then(b.health.partial_cmp(&a.health).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut placements = Vec::with_capacity(ranked.len());
    for (index, robot) in ranked.iter_mut().enumerate() {
        let place = (index + 1) as u32;
        let points = config.placement_points.get(index).copied().unwrap_or(0.0);
        robot.score += points;
        placements.push(Placement {
            robot_id: robot.id,
            place,
            points,
        });
    }

    world.push_event(Event::RoundOver {
        tick: world.tick,
        reason,
        placements: placements.clone(),
    });

    Some(RoundResult {
        round: world.round,
        reason,
        placements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::{Agent, RobotApi};
    use crate::game::config::RobotDescriptor;
    use crate::game::state::Mine;

    struct Idle;
    impl Agent for Idle {
        fn tick(&mut self, _api: &mut RobotApi) {}
    }

    fn test_battle(n: usize) -> (WorldState, AgentHost, BattleConfig) {
        let mut config = BattleConfig::default();
        for i in 0..n {
            config.robots.push(RobotDescriptor {
                name: format!("R{i}"),
                color: "#fff".into(),
            });
        }
        let world = WorldState::new(&config);
        let mut host = AgentHost::new();
        for id in world.robots.keys() {
            host.register(*id, Box::new(Idle));
        }
        (world, host, config)
    }

    #[test]
    fn tick_advances_counter_and_returns_snapshot() {
        let (mut world, mut host, config) = test_battle(2);
        let result = tick(&mut world, &mut host, &config);
        assert_eq!(world.tick, 1);
        assert_eq!(result.snapshot.tick, 1);
        assert!(!result.round_over);
    }

    #[test]
    fn round_ends_at_tick_limit() {
        let (mut world, mut host, mut config) = test_battle(2);
        config.ticks_per_round = 3;
        let mut last = None;
        for _ in 0..3 {
            last = Some(tick(&mut world, &mut host, &config));
        }
        let result = last.unwrap();
        assert!(result.round_over);
        assert_eq!(result.round_result.unwrap().reason, RoundEndReason::TimeLimit);
    }

    #[test]
    fn two_identical_battles_stay_bit_identical() {
        let (mut world_a, mut host_a, config) = test_battle(3);
        let (mut world_b, mut host_b, _) = test_battle(3);

        for _ in 0..50 {
            tick(&mut world_a, &mut host_a, &config);
            tick(&mut world_b, &mut host_b, &config);
        }

        assert_eq!(world_a.compute_hash(), world_b.compute_hash());
    }

    #[test]
    fn bullet_travels_and_can_leave_the_arena() {
        let (mut world, mut host, config) = test_battle(1);
        let id = RobotId(0);
        {
            let robot = world.robots.get_mut(&id).unwrap();
            robot.position = Vec2::new(10.0, 10.0);
            robot.gun_heading = 270.0;
            robot.gun_heat = 0.0;
            robot.intended_fire = 3.0;
        }
        tick(&mut world, &mut host, &config);
        assert_eq!(world.bullets.len(), 1);

        for _ in 0..50 {
            tick(&mut world, &mut host, &config);
        }
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn robot_robot_separation_never_pushes_a_robot_out_of_the_arena() {
        let (mut world, _host, config) = test_battle(2);
        {
            let a = world.robots.get_mut(&RobotId(0)).unwrap();
            a.position = Vec2::new(config.robot_radius, 300.0);
        }
        {
            let b = world.robots.get_mut(&RobotId(1)).unwrap();
            b.position = Vec2::new(config.robot_radius + 1.0, 300.0);
        }

        robot_robot_collision(&mut world, &config);

        for robot in world.robots.values() {
            assert!(robot.position.x >= config.robot_radius - 1e-9);
            assert!(robot.position.x <= config.arena_width - config.robot_radius + 1e-9);
            assert!(robot.position.y >= config.robot_radius - 1e-9);
            assert!(robot.position.y <= config.arena_height - config.robot_radius + 1e-9);
        }
    }

    #[test]
    fn robot_killed_by_the_first_of_two_newly_overlapping_pairs_is_not_re_killed() {
        let (mut world, _host, config) = test_battle(3);
        let victim = RobotId(0);
        let a = RobotId(1);
        let b = RobotId(2);

        // All three within ramming range of each other; (victim, a) sorts
        // before (victim, b) in the canonicalized pair set, so the victim
        // dies while processing the first pair and must be skipped for the
        // second.
        world.robots.get_mut(&victim).unwrap().position = Vec2::new(100.0, 100.0);
        world.robots.get_mut(&a).unwrap().position = Vec2::new(110.0, 100.0);
        world.robots.get_mut(&b).unwrap().position = Vec2::new(90.0, 100.0);
        world.robots.get_mut(&victim).unwrap().health = config.ram_damage_base;

        robot_robot_collision(&mut world, &config);

        assert!(!world.robots[&victim].alive);
        let died_events = world
            .events
            .iter()
            .filter(|e| matches!(e, Event::RobotDied { robot_id, .. } if *robot_id == victim))
            .count();
        assert_eq!(died_events, 1, "victim should be reported dead exactly once");

        // b never got to apply damage against the already-dead victim, so
        // it's still at full health and was notified of the death exactly once.
        assert_eq!(world.robots[&b].health, config.start_health);
        assert_eq!(world.robots[&b].pending.deaths, vec![victim]);
        assert_eq!(world.robots[&a].pending.deaths, vec![victim]);
    }

    #[test]
    fn robot_killed_by_the_first_of_two_overlapping_mines_is_announced_once() {
        let (mut world, _host, config) = test_battle(2);
        let victim = RobotId(0);
        let witness = RobotId(1);

        world.robots.get_mut(&victim).unwrap().health = config.mine_damage;
        let position = world.robots[&victim].position;

        let mine_a = world.next_item_id();
        world.mines.insert(mine_a, Mine { id: mine_a, position });
        let mine_b = world.next_item_id();
        world.mines.insert(mine_b, Mine { id: mine_b, position });

        pickup_and_detonation(&mut world, &config);

        assert!(!world.robots[&victim].alive);
        let died_events = world
            .events
            .iter()
            .filter(|e| matches!(e, Event::RobotDied { robot_id, .. } if *robot_id == victim))
            .count();
        assert_eq!(died_events, 1, "victim should be reported dead exactly once");
        assert_eq!(world.robots[&witness].pending.deaths, vec![victim]);

        // The mine that killed the victim is consumed; the second mine is
        // left for a future tick rather than also being detonated against
        // an already-dead robot.
        assert_eq!(world.mines.len(), 1);
    }
}
