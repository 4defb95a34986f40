use std::collections::BTreeMap;

use crate::controller::AgentController;
use crate::math::{Pose, Vec3};
use crate::world::{
    ColliderId, CollisionLayers, EntityId, EntityStore, ProjectileFactory, ProjectileId,
    SpawnFactory, Target, TargetProvider, WorldQuery,
};

pub(crate) struct FakeAgent {
    pub pose: Pose,
    pub blocked: bool,
    pub armed: bool,
    pub player_movement: bool,
    pub player_shooting: bool,
    pub controller: Option<Box<dyn AgentController>>,
}

pub(crate) struct FakeShell {
    pub id: ProjectileId,
    pub owner: EntityId,
    pub pose: Pose,
    pub velocity: Vec3,
}

pub(crate) struct FakeObstacle {
    pub center: Vec3,
    pub radius: f32,
    pub layers: CollisionLayers,
}

/// Axis-aligned square with no ground under it.
pub(crate) struct FakeHole {
    pub center: Vec3,
    pub half_size: f32,
}

/// Flat ground plane with optional holes, sphere obstacles and static
/// targets. Every fake query is answered from plain vectors.
pub(crate) struct FakeWorld {
    pub ground_height: f32,
    pub ground_layers: CollisionLayers,
    pub holes: Vec<FakeHole>,
    pub obstacles: Vec<FakeObstacle>,
    pub targets: Vec<Target>,
    pub agents: BTreeMap<EntityId, FakeAgent>,
    pub shells: Vec<FakeShell>,
    pub fire_cues: u32,
    pub prefabs: Vec<String>,
    next_id: u64,
}

impl FakeWorld {
    pub fn flat(ground_height: f32) -> Self {
        Self {
            ground_height,
            ground_layers: CollisionLayers::GROUND,
            holes: Vec::new(),
            obstacles: Vec::new(),
            targets: Vec::new(),
            agents: BTreeMap::new(),
            shells: Vec::new(),
            fire_cues: 0,
            prefabs: vec!["tank".to_string()],
            next_id: 1,
        }
    }

    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_agent(&mut self, pose: Pose) -> EntityId {
        let id = self.allocate();
        self.agents.insert(
            id,
            FakeAgent {
                pose,
                blocked: false,
                armed: true,
                player_movement: true,
                player_shooting: true,
                controller: None,
            },
        );
        id
    }

    pub fn add_target(&mut self, position: Vec3) -> EntityId {
        let id = self.allocate();
        self.targets.push(Target { id, position });
        id
    }

    pub fn add_obstacle(&mut self, center: Vec3, radius: f32, layers: CollisionLayers) {
        self.obstacles.push(FakeObstacle {
            center,
            radius,
            layers,
        });
    }

    pub fn add_hole(&mut self, center: Vec3, half_size: f32) {
        self.holes.push(FakeHole { center, half_size });
    }

    pub fn block_movement(&mut self, id: EntityId) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.blocked = true;
        }
    }

    pub fn set_armed(&mut self, id: EntityId, armed: bool) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.armed = armed;
        }
    }

    pub fn teleport(&mut self, id: EntityId, position: Vec3) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.pose.position = position;
        }
    }

    pub fn agent(&self, id: EntityId) -> &FakeAgent {
        self.agents.get(&id).expect("agent exists")
    }

    fn in_hole(&self, point: Vec3) -> bool {
        self.holes.iter().any(|hole| {
            (point.x - hole.center.x).abs() <= hole.half_size
                && (point.z - hole.center.z).abs() <= hole.half_size
        })
    }
}

impl WorldQuery for FakeWorld {
    fn probe_ground(
        &self,
        origin: Vec3,
        max_distance: f32,
        layers: CollisionLayers,
    ) -> Option<Vec3> {
        if !layers.intersects(self.ground_layers) || self.in_hole(origin) {
            return None;
        }
        let drop = origin.y - self.ground_height;
        if drop < 0.0 || drop > max_distance {
            return None;
        }
        Some(origin.with_y(self.ground_height))
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

impl TargetProvider for FakeWorld {
    fn targets(&self) -> Vec<Target> {
        self.targets.clone()
    }
}

impl EntityStore for FakeWorld {
    fn is_alive(&self, id: EntityId) -> bool {
        self.agents.contains_key(&id)
    }

    fn pose(&self, id: EntityId) -> Option<Pose> {
        self.agents.get(&id).map(|agent| agent.pose)
    }

    fn set_pose(&mut self, id: EntityId, pose: Pose) {
        let Some(agent) = self.agents.get_mut(&id) else {
            return;
        };
        if agent.blocked {
            agent.pose.yaw_radians = pose.yaw_radians;
        } else {
            agent.pose = pose;
        }
    }

    fn destroy(&mut self, id: EntityId) -> bool {
        self.agents.remove(&id).is_some()
    }
}

impl SpawnFactory for FakeWorld {
    fn instantiate(&mut self, prefab: &str, pose: Pose) -> Option<EntityId> {
        if !self.prefabs.iter().any(|known| known == prefab) {
            return None;
        }
        Some(self.add_agent(pose))
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

impl ProjectileFactory for FakeWorld {
    fn muzzle(&self, owner: EntityId) -> Option<Pose> {
        let agent = self.agents.get(&owner)?;
        let position = agent.pose.position + agent.pose.forward() * 1.5 + Vec3::UP;
        Some(Pose::new(position, agent.pose.yaw_radians))
    }

    fn instantiate_shell(&mut self, owner: EntityId, pose: Pose) -> Option<ProjectileId> {
        if !self.agents.get(&owner)?.armed {
            return None;
        }
        let id = ProjectileId(self.shells.len() as u64);
        self.shells.push(FakeShell {
            id,
            owner,
            pose,
            velocity: Vec3::ZERO,
        });
        Some(id)
    }

    fn set_velocity(&mut self, projectile: ProjectileId, velocity: Vec3) {
        if let Some(shell) = self.shells.iter_mut().find(|shell| shell.id == projectile) {
            shell.velocity = velocity;
        }
    }

    fn play_fire_cue(&mut self, _owner: EntityId) {
        self.fire_cues += 1;
    }
}
