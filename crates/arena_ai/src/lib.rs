pub mod clock;
pub mod config;
pub mod controller;
pub mod director;
pub mod error;
pub mod math;
pub mod sampling;
pub mod world;

#[cfg(test)]
mod test_support;

pub use config::{
    AiParams, ArenaBounds, BehaviorTuning, ConfigError, DirectorConfig, JitterBands,
    PlacementConfig, MIN_SPAWN_INTERVAL_SECONDS,
};
pub use controller::{AgentController, AiState, AiStateCounts, TankController};
pub use director::{CycleOutcome, PlacementRejection, SpawnDirector};
pub use error::SpawnError;
pub use math::{Pose, Vec3};
pub use world::{
    AgentWorld, ColliderId, CollisionLayers, DirectorWorld, EntityId, EntityStore,
    ProjectileFactory, ProjectileId, SpawnFactory, Target, TargetProvider, WorldQuery,
};
