//! Agent Interface and Host
//!
//! Agents are modeled as a fixed-capability trait object — never
//! inheritance — so the same interface serves compiled, sandboxed
//! agent binaries and in-process test stubs alike. `AgentHost` owns the
//! collection of registered agents and mediates every call into them,
//! catching faults so that one misbehaving agent never disrupts the
//! rest of the battle.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::core::geometry::{angle_diff, bearing_to};
use crate::core::rng::BattleRng;

use super::config::BattleConfig;
use super::state::{RobotId, RobotState, WorldState};

/// The view an agent has onto its own robot and the battle during a
/// callback. Observational getters return the values captured at the
/// start of the current tick; intent setters record an intent without
/// ever mutating world state directly — the pipeline consumes intents
/// in later phases of the same tick.
pub struct RobotApi<'a> {
    robot: &'a mut RobotState,
    rng: &'a mut BattleRng,
    config: &'a BattleConfig,
    tick: u32,
    robot_count: usize,
}

impl<'a> RobotApi<'a> {
    fn new(
        robot: &'a mut RobotState,
        rng: &'a mut BattleRng,
        config: &'a BattleConfig,
        tick: u32,
        robot_count: usize,
    ) -> Self {
        Self {
            robot,
            rng,
            config,
            tick,
            robot_count,
        }
    }

    // --- Observational getters ---

    /// This robot's stable id.
    pub fn id(&self) -> RobotId {
        self.robot.id
    }
    /// Position at the start of this tick.
    pub fn position(&self) -> (f64, f64) {
        (self.robot.position.x, self.robot.position.y)
    }
    /// Body heading, degrees.
    pub fn heading(&self) -> f64 {
        self.robot.heading
    }
    /// Current speed.
    pub fn speed(&self) -> f64 {
        self.robot.speed
    }
    /// Gun heading, degrees.
    pub fn gun_heading(&self) -> f64 {
        self.robot.gun_heading
    }
    /// Gun heat; fire is only feasible when this is exactly 0.
    pub fn gun_heat(&self) -> f64 {
        self.robot.gun_heat
    }
    /// Radar heading, degrees.
    pub fn radar_heading(&self) -> f64 {
        self.robot.radar_heading
    }
    /// Current health.
    pub fn health(&self) -> f64 {
        self.robot.health
    }
    /// Current energy.
    pub fn energy(&self) -> f64 {
        self.robot.energy
    }
    /// Current tick number.
    pub fn tick(&self) -> u32 {
        self.tick
    }
    /// Arena width.
    pub fn arena_width(&self) -> f64 {
        self.config.arena_width
    }
    /// Arena height.
    pub fn arena_height(&self) -> f64 {
        self.config.arena_height
    }
    /// Total number of robots in the battle (alive or not).
    pub fn robot_count(&self) -> usize {
        self.robot_count
    }
    /// Euclidean distance from this robot to an arbitrary point.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.robot.position.x;
        let dy = y - self.robot.position.y;
        (dx * dx + dy * dy).sqrt()
    }
    /// Signed bearing (relative to body heading) from this robot to an
    /// arbitrary point, in `(-180, 180]`.
    pub fn bearing_to(&self, x: f64, y: f64) -> f64 {
        let absolute = bearing_to(
            self.robot.position,
            crate::core::geometry::Vec2::new(x, y),
        );
        angle_diff(self.robot.heading, absolute)
    }
    /// Draw the next value from the engine's single shared PRNG, in
    /// `[0, 1)`. This is the only source of randomness an agent may
    /// use without breaking the determinism contract.
    pub fn random(&mut self) -> f64 {
        self.rng.next_float()
    }

    // --- Pure math helpers ---

    /// Normalize a degree value into `[0, 360)`.
    pub fn normalize_angle(&self, degrees: f64) -> f64 {
        crate::core::geometry::normalize_angle(degrees)
    }
    /// Signed shortest-path angular difference `to - from`.
    pub fn angle_diff(&self, from: f64, to: f64) -> f64 {
        angle_diff(from, to)
    }

    // --- Intent setters ---

    /// Set the intended speed (persists across ticks until changed).
    pub fn set_speed(&mut self, speed: f64) {
        self.robot.intended_speed = speed;
    }
    /// Set the intended body turn rate directly, degrees/tick.
    pub fn set_turn_rate(&mut self, rate: f64) {
        self.robot.intended_turn_rate = rate;
    }
    /// Set the intended body heading; computes the signed shortest-path
    /// turn rate needed to reach it.
    pub fn set_heading(&mut self, target_degrees: f64) {
        self.robot.intended_turn_rate = angle_diff(self.robot.heading, target_degrees);
    }
    /// Set the intended gun turn rate directly, degrees/tick.
    pub fn set_gun_turn_rate(&mut self, rate: f64) {
        self.robot.intended_gun_turn_rate = rate;
    }
    /// Set the intended gun heading; computes the signed shortest-path
    /// turn rate needed to reach it.
    pub fn set_gun_heading(&mut self, target_degrees: f64) {
        self.robot.intended_gun_turn_rate = angle_diff(self.robot.gun_heading, target_degrees);
    }
    /// Set the intended radar turn rate directly, degrees/tick.
    pub fn set_radar_turn_rate(&mut self, rate: f64) {
        self.robot.intended_radar_turn_rate = rate;
    }
    /// Set the intended radar heading; computes the signed shortest-path
    /// turn rate needed to reach it.
    pub fn set_radar_heading(&mut self, target_degrees: f64) {
        self.robot.intended_radar_turn_rate = angle_diff(self.robot.radar_heading, target_degrees);
    }
    /// Set the scan width, clamped immediately to `[1, max_scan_width]`.
    pub fn set_scan_width(&mut self, width: f64) {
        self.robot.scan_width = width.clamp(1.0, self.config.max_scan_width);
    }
    /// Request a bullet fire at the given power. Feasibility (gun heat,
    /// energy, power range) is checked by the pipeline in Phase 12; an
    /// infeasible request is silently ignored, no error is raised here.
    pub fn fire(&mut self, power: f64) {
        self.robot.intended_fire = power;
    }
}

/// An opaque, user-authored robot controller.
///
/// Every callback except `tick` has a no-op default body: most agents
/// only care about a handful of events, and requiring every
/// implementation to write out empty bodies for the rest would be
/// needless ceremony.
pub trait Agent {
    /// Called once before the first tick.
    fn init(&mut self, _api: &mut RobotApi) {}
    /// Called every tick, after this tick's callbacks are delivered.
    fn tick(&mut self, api: &mut RobotApi);
    /// A target was detected by this robot's radar.
    fn on_scan(&mut self, _api: &mut RobotApi, _distance: f64, _bearing: f64) {}
    /// This robot was detected by another robot's radar.
    fn on_scanned(&mut self, _api: &mut RobotApi, _bearing: f64) {}
    /// This robot took bullet damage.
    fn on_hit(&mut self, _api: &mut RobotApi, _damage: f64, _bearing: f64) {}
    /// A bullet fired by this robot hit a target.
    fn on_bullet_hit(&mut self, _api: &mut RobotApi, _target_id: RobotId) {}
    /// This robot hit a wall.
    fn on_wall_hit(&mut self, _api: &mut RobotApi, _bearing: f64) {}
    /// This robot collided with another robot.
    fn on_robot_hit(&mut self, _api: &mut RobotApi, _bearing: f64) {}
    /// A bullet fired by this robot left the arena without hitting anything.
    fn on_bullet_miss(&mut self, _api: &mut RobotApi) {}
    /// Another robot died.
    fn on_robot_death(&mut self, _api: &mut RobotApi, _robot_id: RobotId) {}
    /// Resource release; called exactly once, when the battle is destroyed.
    fn destroy(&mut self) {}
}

/// Wires each registered `Agent` to its `RobotApi` view of the world
/// and routes every callback through a fault boundary.
pub struct AgentHost {
    agents: BTreeMap<RobotId, Box<dyn Agent>>,
}

impl AgentHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
        }
    }

    /// Register an agent for a robot id. Replaces any prior registration.
    pub fn register(&mut self, id: RobotId, agent: Box<dyn Agent>) {
        self.agents.insert(id, agent);
    }

    /// Call `init` on every registered agent, in robot-id order.
    pub fn init_all(&mut self, world: &mut WorldState, config: &BattleConfig) {
        let ids: Vec<RobotId> = self.agents.keys().copied().collect();
        for id in ids {
            self.invoke(id, world, config, |agent, api| agent.init(api));
        }
    }

    /// Call `destroy` on every registered agent, in robot-id order.
    /// The controller guarantees this runs exactly once per battle.
    pub fn destroy_all(&mut self) {
        for agent in self.agents.values_mut() {
            let result = catch_unwind(AssertUnwindSafe(|| agent.destroy()));
            if result.is_err() {
                tracing::warn!("agent panicked during destroy");
            }
        }
    }

    /// Deliver every alive robot's queued callbacks from last tick, in
    /// the fixed per-robot category order: wall hit, robot hit, hit,
    /// bullet hit, bullet miss, deaths, scans, scanned. Matches Phase 4
    /// of the pipeline. Clears each robot's queue after delivery.
    pub fn deliver_pending(&mut self, world: &mut WorldState, config: &BattleConfig) {
        let ids: Vec<RobotId> = world
            .robots
            .iter()
            .filter(|(_, r)| r.alive)
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            let pending = match world.robots.get(&id) {
                Some(robot) if !robot.pending.is_empty() => robot.pending.clone(),
                _ => continue,
            };

            if let Some(bearing) = pending.wall_bearing {
                self.invoke(id, world, config, |agent, api| agent.on_wall_hit(api, bearing));
            }
            if let Some(bearing) = pending.robot_hit_bearing {
                self.invoke(id, world, config, |agent, api| agent.on_robot_hit(api, bearing));
            }
            if let Some((damage, bearing)) = pending.hit {
                self.invoke(id, world, config, |agent, api| agent.on_hit(api, damage, bearing));
            }
            if let Some(target_id) = pending.bullet_hit_target {
                self.invoke(id, world, config, |agent, api| agent.on_bullet_hit(api, target_id));
            }
            if pending.bullet_miss {
                self.invoke(id, world, config, |agent, api| agent.on_bullet_miss(api));
            }
            for dead_id in &pending.deaths {
                let dead_id = *dead_id;
                self.invoke(id, world, config, |agent, api| agent.on_robot_death(api, dead_id));
            }
            for scan in &pending.scans {
                let (distance, bearing) = (scan.distance, scan.bearing);
                self.invoke(id, world, config, |agent, api| agent.on_scan(api, distance, bearing));
            }
            for scanned in &pending.scanned {
                let bearing = scanned.bearing;
                self.invoke(id, world, config, |agent, api| agent.on_scanned(api, bearing));
            }

            if let Some(robot) = world.robots.get_mut(&id) {
                robot.pending.clear();
            }
        }
    }

    /// Invoke `tick()` on every alive robot's agent, in robot-index
    /// (ascending) order, matching Phase 5 of the pipeline.
    pub fn run_tick(&mut self, world: &mut WorldState, config: &BattleConfig) {
        let ids: Vec<RobotId> = world
            .robots
            .iter()
            .filter(|(_, r)| r.alive)
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            if let Some(robot) = world.robots.get_mut(&id) {
                robot.fuel_used_this_tick = 0.0;
                robot.ticks_survived += 1;
            }
            self.invoke(id, world, config, |agent, api| agent.tick(api));
        }
    }

    /// Invoke one callback on one robot's agent, with a `RobotApi` view
    /// constructed fresh for the call. Panics inside the agent are
    /// caught and logged; the callback is then treated as a no-op for
    /// this delivery, per the engine's fault-tolerance design.
    pub fn invoke<F>(&mut self, id: RobotId, world: &mut WorldState, config: &BattleConfig, f: F)
    where
        F: FnOnce(&mut dyn Agent, &mut RobotApi),
    {
        let Some(agent) = self.agents.get_mut(&id) else {
            return;
        };

        let tick = world.tick;
        let robot_count = config.robots.len();
        let WorldState { robots, rng, .. } = world;
        let Some(robot) = robots.get_mut(&id) else {
            return;
        };

        let mut api = RobotApi::new(robot, rng, config, tick, robot_count);
        let agent_ref: &mut dyn Agent = agent.as_mut();

        let result = catch_unwind(AssertUnwindSafe(|| f(agent_ref, &mut api)));
        if result.is_err() {
            tracing::warn!(robot = %id, "agent callback panicked; treated as no-op for this tick");
        }
    }
}

impl Default for AgentHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::RobotDescriptor;

    struct ScriptedAgent {
        fired: bool,
    }

    impl Agent for ScriptedAgent {
        fn tick(&mut self, api: &mut RobotApi) {
            api.set_speed(50.0);
            if !self.fired {
                api.fire(3.0);
                self.fired = true;
            }
        }
    }

    struct PanicAgent;
    impl Agent for PanicAgent {
        fn tick(&mut self, _api: &mut RobotApi) {
            panic!("boom");
        }
    }

    fn test_world(n: usize) -> (WorldState, BattleConfig) {
        let mut config = BattleConfig::default();
        for i in 0..n {
            config.robots.push(RobotDescriptor {
                name: format!("R{i}"),
                color: "#fff".into(),
            });
        }
        (WorldState::new(&config), config)
    }

    #[test]
    fn run_tick_applies_intents() {
        let (mut world, config) = test_world(1);
        let mut host = AgentHost::new();
        host.register(
            crate::game::state::RobotId(0),
            Box::new(ScriptedAgent { fired: false }),
        );

        host.run_tick(&mut world, &config);

        let robot = world.robots.get(&crate::game::state::RobotId(0)).unwrap();
        assert_eq!(robot.intended_speed, 50.0);
        assert_eq!(robot.intended_fire, 3.0);
        assert_eq!(robot.ticks_survived, 1);
    }

    #[test]
    fn panicking_agent_does_not_abort_the_tick() {
        let (mut world, config) = test_world(1);
        let mut host = AgentHost::new();
        host.register(crate::game::state::RobotId(0), Box::new(PanicAgent));

        // Must not panic or abort the process.
        host.run_tick(&mut world, &config);

        let robot = world.robots.get(&crate::game::state::RobotId(0)).unwrap();
        assert_eq!(robot.ticks_survived, 1);
    }
}
