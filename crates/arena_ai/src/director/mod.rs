mod placement;

pub use placement::{
    check_candidate, find_spawn_position, sample_position, PlacementRejection, SpawnCandidate,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::clock::{SimClock, TimerQueue};
use crate::config::{
    AiParams, ConfigError, DirectorConfig, JitterBands, MIN_SPAWN_INTERVAL_SECONDS,
};
use crate::controller::{AgentController, TankController};
use crate::error::SpawnError;
use crate::math::{Pose, Vec3};
use crate::sampling;
use crate::world::{DirectorWorld, EntityId, EntityStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectorTimer {
    SpawnCycle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Spawned(EntityId),
    AtCapacity,
    Skipped(SpawnError),
}

impl CycleOutcome {
    pub fn spawned(&self) -> Option<EntityId> {
        match self {
            Self::Spawned(id) => Some(*id),
            _ => None,
        }
    }
}

/// Keeps the arena populated up to `max_agents`, one spawn attempt per
/// interval. Owns the roster of agents it created and nothing else.
pub struct SpawnDirector {
    config: DirectorConfig,
    roster: Vec<EntityId>,
    rng: StdRng,
    clock: SimClock,
    timers: TimerQueue<DirectorTimer>,
}

impl SpawnDirector {
    pub fn new(config: DirectorConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: DirectorConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = SimClock::new();
        let mut timers = TimerQueue::new();
        timers.schedule_after(&clock, config.spawn_interval_seconds, DirectorTimer::SpawnCycle);
        Ok(Self {
            config,
            roster: Vec::new(),
            rng,
            clock,
            timers,
        })
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Agents spawned by this director that have not been pruned yet. May
    /// contain agents the host destroyed since the last prune.
    pub fn roster(&self) -> &[EntityId] {
        &self.roster
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.now()
    }

    /// Advances the director clock and runs a spawn cycle when one is due.
    /// A cycle runs at most once per call; the next one is scheduled a full
    /// interval after it.
    pub fn advance<W: DirectorWorld>(
        &mut self,
        dt_seconds: f32,
        world: &mut W,
    ) -> Option<CycleOutcome> {
        self.clock.advance(dt_seconds);
        let timer = self.timers.pop_due(self.clock.now())?;
        match timer {
            DirectorTimer::SpawnCycle => {
                let outcome = self.spawn_cycle(world);
                self.timers.schedule_after(
                    &self.clock,
                    self.config.spawn_interval_seconds,
                    DirectorTimer::SpawnCycle,
                );
                Some(outcome)
            }
        }
    }

    /// Prunes dead agents, then spawns one if the roster has room.
    pub fn spawn_cycle<W: DirectorWorld>(&mut self, world: &mut W) -> CycleOutcome {
        self.prune(&*world);
        if self.roster.len() >= self.config.max_agents {
            debug!(
                live = self.roster.len(),
                max_agents = self.config.max_agents,
                "spawn_cycle_at_capacity"
            );
            return CycleOutcome::AtCapacity;
        }

        match self.try_spawn(world) {
            Ok(id) => CycleOutcome::Spawned(id),
            Err(err) => {
                match &err {
                    SpawnError::NoValidPositionFound { attempts } => {
                        warn!(attempts = *attempts, "spawn_position_not_found");
                    }
                    SpawnError::MissingCollaborator(what) => {
                        debug!(missing = *what, "spawn_cycle_skipped");
                    }
                }
                CycleOutcome::Skipped(err)
            }
        }
    }

    /// Same as a scheduled cycle, without touching the schedule.
    pub fn force_spawn_now<W: DirectorWorld>(&mut self, world: &mut W) -> CycleOutcome {
        self.spawn_cycle(world)
    }

    /// Destroys every live agent on the roster and empties it. Returns how
    /// many agents were destroyed.
    pub fn clear_all<W: EntityStore + ?Sized>(&mut self, world: &mut W) -> usize {
        let mut destroyed = 0;
        for id in self.roster.drain(..) {
            if world.is_alive(id) && world.destroy(id) {
                destroyed += 1;
            }
        }
        if destroyed > 0 {
            info!(destroyed, "agents_cleared");
        }
        destroyed
    }

    pub fn live_agent_count<W: EntityStore + ?Sized>(&mut self, world: &W) -> usize {
        self.prune(world);
        self.roster.len()
    }

    /// Lowering the cap never despawns agents; it only blocks new spawns.
    pub fn set_max_agents(&mut self, max_agents: usize) {
        self.config.max_agents = max_agents;
    }

    /// Applies from the next scheduled cycle on. Clamped to a small positive
    /// minimum.
    pub fn set_spawn_interval(&mut self, seconds: f32) {
        let seconds = if seconds.is_finite() {
            seconds.max(MIN_SPAWN_INTERVAL_SECONDS)
        } else {
            MIN_SPAWN_INTERVAL_SECONDS
        };
        self.config.spawn_interval_seconds = seconds;
    }

    /// Only agents spawned after this call see the new base values.
    pub fn set_ai_parameters(&mut self, params: AiParams) {
        self.config.ai = params;
    }

    pub fn set_jitter_bands(&mut self, bands: JitterBands) {
        self.config.jitter = bands;
    }

    fn prune<W: EntityStore + ?Sized>(&mut self, world: &W) {
        let before = self.roster.len();
        self.roster.retain(|id| world.is_alive(*id));
        let pruned = before - self.roster.len();
        if pruned > 0 {
            debug!(pruned, live = self.roster.len(), "roster_pruned");
        }
    }

    fn try_spawn<W: DirectorWorld>(&mut self, world: &mut W) -> Result<EntityId, SpawnError> {
        if self.config.prefab.is_none() {
            return Err(SpawnError::MissingCollaborator("spawn prefab"));
        }

        let targets = world.targets();
        let agent_positions: Vec<Vec3> = self
            .roster
            .iter()
            .filter_map(|id| world.pose(*id))
            .map(|pose| pose.position)
            .collect();
        let candidate = find_spawn_position(
            &mut self.rng,
            &self.config.arena,
            &self.config.placement,
            &*world,
            &targets,
            &agent_positions,
        )?;
        self.materialize(candidate, world)
    }

    fn materialize<W: DirectorWorld>(
        &mut self,
        candidate: SpawnCandidate,
        world: &mut W,
    ) -> Result<EntityId, SpawnError> {
        let Some(prefab) = self.config.prefab.as_deref() else {
            return Err(SpawnError::MissingCollaborator("spawn prefab"));
        };
        let yaw = sampling::heading(&mut self.rng);
        let pose = Pose::new(candidate.ground, yaw);
        let id = world
            .instantiate(prefab, pose)
            .ok_or(SpawnError::MissingCollaborator("spawn factory"))?;

        world.disable_player_movement(id);
        world.disable_player_shooting(id);

        let params = sampling::jitter_params(&mut self.rng, &self.config.ai, &self.config.jitter);
        let controller_rng = StdRng::seed_from_u64(self.rng.gen());
        let mut controller = TankController::new(id, params, self.config.behavior, controller_rng);
        controller.on_spawn(pose, &*world);
        world.attach_controller(id, Box::new(controller));
        self.roster.push(id);

        info!(
            agent = id.0,
            x = pose.position.x,
            y = pose.position.y,
            z = pose.position.z,
            yaw_degrees = yaw.to_degrees(),
            attempts = candidate.attempts,
            detection_range = params.detection_range,
            attack_range = params.attack_range,
            fire_rate = params.fire_rate,
            live = self.roster.len(),
            "agent_spawned"
        );
        Ok(id)
    }
}
