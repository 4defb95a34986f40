use arena_ai::AgentController;
use sha2::{Digest, Sha256};

use super::arena::ArenaWorld;

/// Hashes the observable end state of a run: every agent's pose and state,
/// every shell in flight and the shot counter. Two runs of the same seeded
/// scenario produce the same digest.
pub fn replay_digest(world: &ArenaWorld) -> String {
    let mut hasher = Sha256::new();
    for (id, agent) in world.agents() {
        hasher.update(id.0.to_le_bytes());
        hasher.update(agent.prefab.as_bytes());
        hasher.update([0u8, u8::from(agent.player_movement), u8::from(agent.player_shooting)]);
        update_f32(&mut hasher, agent.pose.position.x);
        update_f32(&mut hasher, agent.pose.position.y);
        update_f32(&mut hasher, agent.pose.position.z);
        update_f32(&mut hasher, agent.pose.yaw_radians);
        let state = agent
            .controller
            .as_ref()
            .map_or("none", |controller| controller.state().name());
        hasher.update(state.as_bytes());
        hasher.update([0u8]);
    }
    for shell in world.shells() {
        hasher.update(shell.id.0.to_le_bytes());
        hasher.update(shell.owner.0.to_le_bytes());
        update_f32(&mut hasher, shell.position.x);
        update_f32(&mut hasher, shell.position.y);
        update_f32(&mut hasher, shell.position.z);
    }
    hasher.update(world.shells_fired().to_le_bytes());
    to_hex_lower(&hasher.finalize())
}

fn update_f32(hasher: &mut Sha256, value: f32) {
    hasher.update(value.to_bits().to_le_bytes());
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(&mut output, "{byte:02x}");
    }
    output
}

#[cfg(test)]
mod tests {
    use arena_ai::{EntityStore, Pose, SpawnFactory, Vec3};

    use super::*;
    use crate::app::scenario::Scenario;

    #[test]
    fn digest_is_hex_sha256() {
        let world = ArenaWorld::from_scenario(&Scenario::default());
        let digest = replay_digest(&world);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn digest_tracks_agent_pose() {
        let mut world = ArenaWorld::from_scenario(&Scenario::default());
        let id = world
            .instantiate("tank", Pose::new(Vec3::new(-20.0, 0.0, -20.0), 0.0))
            .expect("tank");
        let before = replay_digest(&world);
        assert_eq!(before, replay_digest(&world));

        world.set_pose(id, Pose::new(Vec3::new(-20.0, 0.0, -19.0), 0.0));
        assert_ne!(before, replay_digest(&world));
    }
}
