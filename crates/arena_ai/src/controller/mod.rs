mod state;
mod tank;

pub use state::{decide_state, nearest_target, AiState, AiStateCounts, NearestTarget};
pub use tank::TankController;

use crate::config::AiParams;
use crate::math::Pose;
use crate::world::{AgentWorld, EntityId, WorldQuery};

/// Per-agent behavior driven by an external simulation loop.
pub trait AgentController {
    fn entity(&self) -> EntityId;
    fn state(&self) -> AiState;
    fn params(&self) -> AiParams;
    fn set_detection_range(&mut self, range: f32);
    fn set_attack_range(&mut self, range: f32);
    fn set_fire_rate(&mut self, rate: f32);
    fn set_patrol_radius(&mut self, radius: f32);
    fn set_move_speed(&mut self, speed: f32);
    /// Called once with the pose the agent was created at.
    fn on_spawn(&mut self, pose: Pose, world: &dyn WorldQuery);
    fn on_tick(&mut self, dt_seconds: f32, world: &mut dyn AgentWorld);
}
