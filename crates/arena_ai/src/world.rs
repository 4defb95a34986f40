use serde::{Deserialize, Serialize};

use crate::controller::AgentController;
use crate::math::{Pose, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColliderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u64);

/// Bitmask of collision categories a query is allowed to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionLayers(pub u32);

impl CollisionLayers {
    pub const NONE: CollisionLayers = CollisionLayers(0);
    pub const ALL: CollisionLayers = CollisionLayers(u32::MAX);
    pub const GROUND: CollisionLayers = CollisionLayers(1);

    pub fn intersects(self, other: CollisionLayers) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: EntityId,
    pub position: Vec3,
}

pub trait WorldQuery {
    /// Casts straight down from `origin`. Returns the hit point on the first
    /// surface in `layers` within `max_distance`.
    fn probe_ground(&self, origin: Vec3, max_distance: f32, layers: CollisionLayers)
        -> Option<Vec3>;

    fn overlap_obstacles(
        &self,
        center: Vec3,
        radius: f32,
        layers: CollisionLayers,
    ) -> Vec<ColliderId>;
}

/// Snapshot of the entities agents hunt and spawns keep away from.
pub trait TargetProvider {
    fn targets(&self) -> Vec<Target>;
}

pub trait EntityStore {
    fn is_alive(&self, id: EntityId) -> bool;
    fn pose(&self, id: EntityId) -> Option<Pose>;
    /// Requests a new pose. The host may resolve collisions and apply a
    /// different position; callers read it back through [`EntityStore::pose`].
    fn set_pose(&mut self, id: EntityId, pose: Pose);
    fn destroy(&mut self, id: EntityId) -> bool;
}

pub trait SpawnFactory {
    fn instantiate(&mut self, prefab: &str, pose: Pose) -> Option<EntityId>;
    fn disable_player_movement(&mut self, id: EntityId);
    fn disable_player_shooting(&mut self, id: EntityId);
    fn attach_controller(&mut self, id: EntityId, controller: Box<dyn AgentController>);
}

pub trait ProjectileFactory {
    /// Muzzle pose of `owner`. `None` when the entity carries no fire point.
    fn muzzle(&self, owner: EntityId) -> Option<Pose>;
    /// `None` when `owner` has no shell definition.
    fn instantiate_shell(&mut self, owner: EntityId, pose: Pose) -> Option<ProjectileId>;
    fn set_velocity(&mut self, projectile: ProjectileId, velocity: Vec3);
    fn play_fire_cue(&mut self, _owner: EntityId) {}
}

/// Everything an agent controller touches during a tick.
pub trait AgentWorld: WorldQuery + TargetProvider + EntityStore + ProjectileFactory {}

impl<T> AgentWorld for T where T: WorldQuery + TargetProvider + EntityStore + ProjectileFactory {}

/// Everything the spawn director touches during a cycle.
pub trait DirectorWorld: WorldQuery + TargetProvider + EntityStore + SpawnFactory {}

impl<T> DirectorWorld for T where T: WorldQuery + TargetProvider + EntityStore + SpawnFactory {}
