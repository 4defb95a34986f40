use std::collections::BTreeMap;

use arena_ai::{
    AgentController, AiStateCounts, ColliderId, CollisionLayers, EntityId, EntityStore, Pose,
    ProjectileFactory, ProjectileId, SpawnFactory, Target, TargetProvider, Vec3, WorldQuery,
};
use tracing::{debug, trace};

use super::scenario::{GroundPatch, ObstacleDef, Scenario};

const MUZZLE_FORWARD_OFFSET: f32 = 1.5;
const MUZZLE_HEIGHT: f32 = 1.0;
const GROUND_FOLLOW_PROBE_HEIGHT: f32 = 2.0;
const GROUND_FOLLOW_PROBE_DISTANCE: f32 = 4.0;

pub struct ArenaAgent {
    pub prefab: String,
    pub pose: Pose,
    pub player_movement: bool,
    pub player_shooting: bool,
    pub controller: Option<Box<dyn AgentController>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shell {
    pub id: ProjectileId,
    pub owner: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub age_seconds: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellStepReport {
    pub expired: u32,
    pub blocked: u32,
    pub target_hits: u32,
}

/// In-memory arena backing every collaborator the director and its
/// controllers need. Agents live in a `BTreeMap` so iteration order is
/// stable across runs.
pub struct ArenaWorld {
    prefabs: Vec<String>,
    ground: Vec<GroundPatch>,
    obstacles: Vec<ObstacleDef>,
    targets: Vec<Target>,
    agents: BTreeMap<EntityId, ArenaAgent>,
    shells: Vec<Shell>,
    agent_radius: f32,
    shell_lifetime_seconds: f32,
    shell_hit_radius: f32,
    next_entity_id: u64,
    next_projectile_id: u64,
    shells_fired: u64,
    fire_cues: u64,
}

impl ArenaWorld {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut world = Self {
            prefabs: scenario.prefabs.clone(),
            ground: scenario.ground.clone(),
            obstacles: scenario.obstacles.clone(),
            targets: Vec::new(),
            agents: BTreeMap::new(),
            shells: Vec::new(),
            agent_radius: scenario.agent_radius,
            shell_lifetime_seconds: scenario.shell_lifetime_seconds,
            shell_hit_radius: scenario.shell_hit_radius,
            next_entity_id: 1,
            next_projectile_id: 1,
            shells_fired: 0,
            fire_cues: 0,
        };
        for position in &scenario.targets {
            let id = world.allocate_entity_id();
            world.targets.push(Target {
                id,
                position: *position,
            });
        }
        world
    }

    fn allocate_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        id
    }

    pub fn agents(&self) -> impl Iterator<Item = (&EntityId, &ArenaAgent)> {
        self.agents.iter()
    }

    #[cfg(test)]
    pub fn agent(&self, id: EntityId) -> Option<&ArenaAgent> {
        self.agents.get(&id)
    }

    #[cfg(test)]
    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut ArenaAgent> {
        self.agents.get_mut(&id)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn shells_fired(&self) -> u64 {
        self.shells_fired
    }

    pub fn fire_cues(&self) -> u64 {
        self.fire_cues
    }

    pub fn state_counts(&self) -> AiStateCounts {
        let mut counts = AiStateCounts::default();
        for agent in self.agents.values() {
            if let Some(controller) = agent.controller.as_ref() {
                counts.record(controller.state());
            }
        }
        counts
    }

    /// Ticks every attached controller once, in entity order. Each controller
    /// is taken out of its slot for the duration of its tick so it can borrow
    /// the whole world mutably.
    pub fn tick_agents(&mut self, dt_seconds: f32) {
        let agent_ids = self.agents.keys().copied().collect::<Vec<_>>();
        for agent_id in agent_ids {
            let Some(mut controller) = self
                .agents
                .get_mut(&agent_id)
                .and_then(|agent| agent.controller.take())
            else {
                continue;
            };
            controller.on_tick(dt_seconds, self);
            match self.agents.get_mut(&agent_id) {
                Some(agent) => agent.controller = Some(controller),
                None => trace!(agent = agent_id.0, "controller_dropped_with_agent"),
            }
        }
    }

    /// Moves shells in a straight line (no gravity). A shell is retired once
    /// it hits something or outlives its lifetime.
    pub fn advance_shells(&mut self, dt_seconds: f32) -> ShellStepReport {
        let mut report = ShellStepReport::default();
        let mut kept = Vec::with_capacity(self.shells.len());
        for mut shell in std::mem::take(&mut self.shells) {
            shell.position = shell.position + shell.velocity * dt_seconds;
            shell.age_seconds += dt_seconds;

            if let Some(target) = self
                .targets
                .iter()
                .find(|target| target.position.distance(shell.position) <= self.shell_hit_radius)
            {
                report.target_hits += 1;
                debug!(
                    shell = shell.id.0,
                    owner = shell.owner.0,
                    target = target.id.0,
                    "shell_hit_target"
                );
                continue;
            }
            if !self
                .overlap_obstacles(shell.position, 0.0, CollisionLayers::ALL)
                .is_empty()
            {
                report.blocked += 1;
                continue;
            }
            if shell.age_seconds >= self.shell_lifetime_seconds {
                report.expired += 1;
                continue;
            }
            kept.push(shell);
        }
        self.shells = kept;
        report
    }

    /// Highest ground surface under `point` that is not above it.
    fn ground_height_at(&self, point: Vec3, layers: CollisionLayers) -> Option<f32> {
        self.ground
            .iter()
            .filter(|patch| patch.layers.intersects(layers))
            .filter(|patch| patch.contains_horizontal(point))
            .map(|patch| patch.center.y)
            .filter(|height| *height <= point.y)
            .max_by(|a, b| a.total_cmp(b))
    }

    fn movement_blocked(&self, position: Vec3) -> bool {
        let body_center = position + Vec3::UP * self.agent_radius;
        !self
            .overlap_obstacles(body_center, self.agent_radius, CollisionLayers::ALL)
            .is_empty()
    }
}

impl WorldQuery for ArenaWorld {
    fn probe_ground(
        &self,
        origin: Vec3,
        max_distance: f32,
        layers: CollisionLayers,
    ) -> Option<Vec3> {
        let height = self.ground_height_at(origin, layers)?;
        if origin.y - height > max_distance {
            return None;
        }
        Some(origin.with_y(height))
    }

    fn overlap_obstacles(
        &self,
        center: Vec3,
        radius: f32,
        layers: CollisionLayers,
    ) -> Vec<ColliderId> {
        self.obstacles
            .iter()
            .enumerate()
            .filter(|(_, obstacle)| obstacle.layers.intersects(layers))
            .filter(|(_, obstacle)| obstacle.center.distance(center) <= obstacle.radius + radius)
            .map(|(idx, _)| ColliderId(idx as u64))
            .collect()
    }
}

impl TargetProvider for ArenaWorld {
    fn targets(&self) -> Vec<Target> {
        self.targets.clone()
    }
}

impl EntityStore for ArenaWorld {
    fn is_alive(&self, id: EntityId) -> bool {
        self.agents.contains_key(&id)
    }

    fn pose(&self, id: EntityId) -> Option<Pose> {
        self.agents.get(&id).map(|agent| agent.pose)
    }

    /// Applies the heading unconditionally. The position only moves when the
    /// agent's body stays clear of obstacles and there is ground under it; it
    /// then follows the ground height.
    fn set_pose(&mut self, id: EntityId, pose: Pose) {
        let Some(current) = self.agents.get(&id).map(|agent| agent.pose) else {
            return;
        };
        let probe_origin = pose.position.with_y(current.position.y + GROUND_FOLLOW_PROBE_HEIGHT);
        let ground = self.probe_ground(
            probe_origin,
            GROUND_FOLLOW_PROBE_DISTANCE,
            CollisionLayers::ALL,
        );
        let next_position = match ground {
            Some(ground) if !self.movement_blocked(ground) => ground,
            _ => current.position,
        };
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.pose = Pose::new(next_position, pose.yaw_radians);
        }
    }

    fn destroy(&mut self, id: EntityId) -> bool {
        self.agents.remove(&id).is_some()
    }
}

impl SpawnFactory for ArenaWorld {
    fn instantiate(&mut self, prefab: &str, pose: Pose) -> Option<EntityId> {
        if !self.prefabs.iter().any(|known| known == prefab) {
            return None;
        }
        let id = self.allocate_entity_id();
        self.agents.insert(
            id,
            ArenaAgent {
                prefab: prefab.to_string(),
                pose,
                player_movement: true,
                player_shooting: true,
                controller: None,
            },
        );
        Some(id)
    }

    fn disable_player_movement(&mut self, id: EntityId) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.player_movement = false;
        }
    }

    fn disable_player_shooting(&mut self, id: EntityId) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.player_shooting = false;
        }
    }

    fn attach_controller(&mut self, id: EntityId, controller: Box<dyn AgentController>) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.controller = Some(controller);
        }
    }
}

impl ProjectileFactory for ArenaWorld {
    fn muzzle(&self, owner: EntityId) -> Option<Pose> {
        let pose = self.agents.get(&owner)?.pose;
        let position =
            pose.position + pose.forward() * MUZZLE_FORWARD_OFFSET + Vec3::UP * MUZZLE_HEIGHT;
        Some(Pose::new(position, pose.yaw_radians))
    }

    fn instantiate_shell(&mut self, owner: EntityId, pose: Pose) -> Option<ProjectileId> {
        if !self.agents.contains_key(&owner) {
            return None;
        }
        let id = ProjectileId(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.saturating_add(1);
        self.shells.push(Shell {
            id,
            owner,
            position: pose.position,
            velocity: Vec3::ZERO,
            age_seconds: 0.0,
        });
        self.shells_fired = self.shells_fired.saturating_add(1);
        Some(id)
    }

    fn set_velocity(&mut self, projectile: ProjectileId, velocity: Vec3) {
        if let Some(shell) = self.shells.iter_mut().find(|shell| shell.id == projectile) {
            shell.velocity = velocity;
        }
    }

    fn play_fire_cue(&mut self, _owner: EntityId) {
        self.fire_cues = self.fire_cues.saturating_add(1);
    }
}
