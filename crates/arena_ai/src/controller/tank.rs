use rand::rngs::StdRng;
use tracing::{debug, trace};

use super::state::{decide_state, nearest_target, AiState};
use super::AgentController;
use crate::clock::{SimClock, TimerQueue};
use crate::config::{AiParams, BehaviorTuning};
use crate::math::{slerp_yaw, yaw_towards, Pose, Vec3};
use crate::sampling;
use crate::world::{AgentWorld, CollisionLayers, EntityId, Target, WorldQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerTimer {
    NewPatrolWaypoint,
}

/// Patrol/chase/attack controller for one spawned tank.
#[derive(Debug)]
pub struct TankController {
    entity: EntityId,
    params: AiParams,
    tuning: BehaviorTuning,
    rng: StdRng,
    clock: SimClock,
    timers: TimerQueue<ControllerTimer>,
    initialized: bool,
    state: AiState,
    target: Option<Target>,
    patrol_anchor: Vec3,
    patrol_waypoint: Vec3,
    waypoint_pending: bool,
    last_fired_at: Option<f64>,
    shots_attempted: u32,
    stuck_recoveries: u32,
    last_stuck_check_at: f64,
    last_checked_position: Vec3,
}

impl TankController {
    pub fn new(entity: EntityId, params: AiParams, tuning: BehaviorTuning, rng: StdRng) -> Self {
        Self {
            entity,
            params,
            tuning,
            rng,
            clock: SimClock::new(),
            timers: TimerQueue::new(),
            initialized: false,
            state: AiState::Patrolling,
            target: None,
            patrol_anchor: Vec3::ZERO,
            patrol_waypoint: Vec3::ZERO,
            waypoint_pending: false,
            last_fired_at: None,
            shots_attempted: 0,
            stuck_recoveries: 0,
            last_stuck_check_at: 0.0,
            last_checked_position: Vec3::ZERO,
        }
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn patrol_anchor(&self) -> Vec3 {
        self.patrol_anchor
    }

    pub fn patrol_waypoint(&self) -> Vec3 {
        self.patrol_waypoint
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.now()
    }

    pub fn shots_attempted(&self) -> u32 {
        self.shots_attempted
    }

    pub fn stuck_recoveries(&self) -> u32 {
        self.stuck_recoveries
    }

    fn initialize<Q: WorldQuery + ?Sized>(&mut self, pose: Pose, world: &Q) {
        self.initialized = true;
        self.patrol_anchor = pose.position;
        self.last_checked_position = pose.position;
        self.last_stuck_check_at = self.clock.now();
        self.pick_new_waypoint(world);
    }

    fn pick_new_waypoint<Q: WorldQuery + ?Sized>(&mut self, world: &Q) {
        let (dx, dz) = sampling::unit_disc(&mut self.rng);
        let radius = self.params.patrol_radius.max(0.0);
        let mut waypoint = self.patrol_anchor + Vec3::new(dx * radius, 0.0, dz * radius);
        let probe_origin = waypoint + Vec3::UP * self.tuning.waypoint_probe_height;
        if let Some(hit) = world.probe_ground(
            probe_origin,
            self.tuning.waypoint_probe_distance,
            CollisionLayers::ALL,
        ) {
            waypoint.y = hit.y;
        }
        self.patrol_waypoint = waypoint;
        trace!(
            agent = self.entity.0,
            x = waypoint.x,
            y = waypoint.y,
            z = waypoint.z,
            "patrol_waypoint_selected"
        );
    }

    fn run_due_timers(&mut self, world: &dyn AgentWorld) {
        while let Some(timer) = self.timers.pop_due(self.clock.now()) {
            match timer {
                ControllerTimer::NewPatrolWaypoint => {
                    self.waypoint_pending = false;
                    self.pick_new_waypoint(world);
                }
            }
        }
    }

    fn update_state(&mut self, position: Vec3, targets: &[Target]) {
        let nearest = nearest_target(position, targets);
        let next = decide_state(
            nearest.map(|found| found.distance),
            self.params.attack_range,
            self.params.detection_range,
        );
        self.target = match next {
            AiState::Patrolling => None,
            AiState::Chasing | AiState::Attacking => nearest.map(|found| found.target),
        };
        if next != self.state {
            debug!(
                agent = self.entity.0,
                from = self.state.name(),
                to = next.name(),
                "agent_state_changed"
            );
        }
        self.state = next;
    }

    fn patrol(&mut self, dt_seconds: f32, world: &mut dyn AgentWorld) {
        let waypoint = self.patrol_waypoint;
        self.move_towards(waypoint, dt_seconds, world);

        let Some(pose) = world.pose(self.entity) else {
            return;
        };
        if pose.position.distance(waypoint) < self.tuning.patrol_arrival_threshold
            && !self.waypoint_pending
        {
            self.waypoint_pending = true;
            self.timers.schedule_after(
                &self.clock,
                self.tuning.patrol_wait_seconds,
                ControllerTimer::NewPatrolWaypoint,
            );
        }
    }

    fn chase(&mut self, dt_seconds: f32, world: &mut dyn AgentWorld) {
        if let Some(target) = self.target {
            self.move_towards(target.position, dt_seconds, world);
        }
    }

    fn attack(&mut self, dt_seconds: f32, world: &mut dyn AgentWorld) {
        let Some(target) = self.target else {
            return;
        };
        let Some(mut pose) = world.pose(self.entity) else {
            return;
        };

        if let Some(facing) = yaw_towards(pose.position, target.position) {
            pose.yaw_radians = slerp_yaw(
                pose.yaw_radians,
                facing,
                self.tuning.rotation_speed * dt_seconds,
            );
            world.set_pose(self.entity, pose);
        }

        let now = self.clock.now();
        if self.fire_ready(now) {
            self.fire(world);
            self.last_fired_at = Some(now);
        }

        let distance = pose.position.distance(target.position);
        if distance > self.params.attack_range * self.tuning.attack_advance_fraction {
            self.move_towards(target.position, dt_seconds, world);
        }
    }

    fn fire_interval_seconds(&self) -> Option<f64> {
        let rate = self.params.fire_rate;
        if rate.is_finite() && rate > 0.0 {
            Some(1.0 / f64::from(rate))
        } else {
            None
        }
    }

    fn fire_ready(&self, now: f64) -> bool {
        let Some(interval) = self.fire_interval_seconds() else {
            return false;
        };
        match self.last_fired_at {
            None => true,
            Some(last) => now - last >= interval,
        }
    }

    fn fire(&mut self, world: &mut dyn AgentWorld) {
        self.shots_attempted = self.shots_attempted.saturating_add(1);
        let Some(muzzle) = world.muzzle(self.entity) else {
            debug!(agent = self.entity.0, reason = "no_muzzle", "fire_skipped");
            return;
        };
        let Some(shell) = world.instantiate_shell(self.entity, muzzle) else {
            debug!(agent = self.entity.0, reason = "no_shell", "fire_skipped");
            return;
        };
        world.set_velocity(shell, muzzle.forward() * self.tuning.projectile_launch_speed);
        world.play_fire_cue(self.entity);
        trace!(agent = self.entity.0, shell = shell.0, "shell_fired");
    }

    /// Turns part of the way toward `point`, then drives along the resulting
    /// heading. The agent never moves straight at the point, so approaches
    /// curve.
    fn move_towards(&mut self, point: Vec3, dt_seconds: f32, world: &mut dyn AgentWorld) {
        let Some(mut pose) = world.pose(self.entity) else {
            return;
        };
        if let Some(facing) = yaw_towards(pose.position, point) {
            pose.yaw_radians = slerp_yaw(
                pose.yaw_radians,
                facing,
                self.tuning.rotation_speed * dt_seconds,
            );
        }
        let step = self.params.move_speed.max(0.0) * dt_seconds.max(0.0);
        pose.position = pose.position + pose.forward() * step;
        world.set_pose(self.entity, pose);
    }

    fn check_if_stuck(&mut self, world: &mut dyn AgentWorld) {
        let now = self.clock.now();
        if now - self.last_stuck_check_at < f64::from(self.tuning.stuck_check_interval_seconds) {
            return;
        }
        let Some(pose) = world.pose(self.entity) else {
            return;
        };

        let moved = pose.position.distance(self.last_checked_position);
        if moved < self.tuning.min_move_distance && self.state != AiState::Attacking {
            self.stuck_recoveries = self.stuck_recoveries.saturating_add(1);
            if self.state == AiState::Patrolling {
                self.pick_new_waypoint(&*world);
            }
            let yaw_change_degrees =
                sampling::symmetric(&mut self.rng, 0.0, self.tuning.max_stuck_yaw_degrees);
            let turned = Pose::new(
                pose.position,
                pose.yaw_radians + yaw_change_degrees.to_radians(),
            );
            world.set_pose(self.entity, turned);
            debug!(
                agent = self.entity.0,
                moved,
                yaw_change_degrees,
                state = self.state.name(),
                "agent_unstuck"
            );
        }

        self.last_checked_position = pose.position;
        self.last_stuck_check_at = now;
    }
}

impl AgentController for TankController {
    fn entity(&self) -> EntityId {
        self.entity
    }

    fn state(&self) -> AiState {
        self.state
    }

    fn params(&self) -> AiParams {
        self.params
    }

    fn set_detection_range(&mut self, range: f32) {
        self.params.detection_range = range;
    }

    fn set_attack_range(&mut self, range: f32) {
        self.params.attack_range = range;
    }

    fn set_fire_rate(&mut self, rate: f32) {
        self.params.fire_rate = rate;
    }

    fn set_patrol_radius(&mut self, radius: f32) {
        self.params.patrol_radius = radius;
    }

    fn set_move_speed(&mut self, speed: f32) {
        self.params.move_speed = speed;
    }

    fn on_spawn(&mut self, pose: Pose, world: &dyn WorldQuery) {
        self.initialize(pose, world);
    }

    fn on_tick(&mut self, dt_seconds: f32, world: &mut dyn AgentWorld) {
        if !world.is_alive(self.entity) {
            return;
        }
        let Some(pose) = world.pose(self.entity) else {
            return;
        };
        if !self.initialized {
            self.initialize(pose, &*world);
        }

        self.clock.advance(dt_seconds);
        self.run_due_timers(&*world);

        let targets = world.targets();
        self.update_state(pose.position, &targets);

        match self.state {
            AiState::Patrolling => self.patrol(dt_seconds, world),
            AiState::Chasing => self.chase(dt_seconds, world),
            AiState::Attacking => self.attack(dt_seconds, world),
        }

        self.check_if_stuck(world);
    }
}
