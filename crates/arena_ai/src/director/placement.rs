use rand::Rng;
use tracing::trace;

use crate::config::{ArenaBounds, PlacementConfig};
use crate::error::SpawnError;
use crate::math::Vec3;
use crate::sampling;
use crate::world::{Target, WorldQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRejection {
    NoGround,
    ObstaclePresent,
    TooCloseToTarget,
    TooCloseToAgent,
}

impl PlacementRejection {
    pub fn name(self) -> &'static str {
        match self {
            Self::NoGround => "no_ground",
            Self::ObstaclePresent => "obstacle_present",
            Self::TooCloseToTarget => "too_close_to_target",
            Self::TooCloseToAgent => "too_close_to_agent",
        }
    }
}

/// Ground point of a sample that passed every placement check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnCandidate {
    pub ground: Vec3,
    pub attempts: u32,
}

/// Uniform point over the arena's horizontal extent, lifted to the top of
/// the ground probe so the probe can reach down to the floor.
pub fn sample_position<R: Rng + ?Sized>(
    rng: &mut R,
    arena: &ArenaBounds,
    ground_probe_distance: f32,
) -> Vec3 {
    let x = sampling::symmetric(rng, arena.center.x, arena.half_extent_x);
    let z = sampling::symmetric(rng, arena.center.z, arena.half_extent_z);
    Vec3::new(x, arena.center.y + ground_probe_distance, z)
}

/// Runs the placement checks in order and stops at the first failure.
/// Returns the ground hit point on success.
pub fn check_candidate<Q: WorldQuery + ?Sized>(
    sample: Vec3,
    placement: &PlacementConfig,
    world: &Q,
    targets: &[Target],
    agent_positions: &[Vec3],
) -> Result<Vec3, PlacementRejection> {
    let ground = world
        .probe_ground(
            sample,
            placement.ground_probe_distance,
            placement.ground_layers,
        )
        .ok_or(PlacementRejection::NoGround)?;

    let overlap_center = sample.with_y(ground.y + placement.obstacle_check_height);
    if !world
        .overlap_obstacles(
            overlap_center,
            placement.obstacle_check_radius,
            placement.obstacle_layers,
        )
        .is_empty()
    {
        return Err(PlacementRejection::ObstaclePresent);
    }

    if targets
        .iter()
        .any(|target| sample.horizontal_distance(target.position) < placement.min_player_distance)
    {
        return Err(PlacementRejection::TooCloseToTarget);
    }

    if agent_positions
        .iter()
        .any(|position| sample.horizontal_distance(*position) < placement.min_agent_distance)
    {
        return Err(PlacementRejection::TooCloseToAgent);
    }

    Ok(ground)
}

/// Samples up to `max_spawn_attempts` positions and returns the first that
/// passes [`check_candidate`].
pub fn find_spawn_position<Q: WorldQuery + ?Sized, R: Rng + ?Sized>(
    rng: &mut R,
    arena: &ArenaBounds,
    placement: &PlacementConfig,
    world: &Q,
    targets: &[Target],
    agent_positions: &[Vec3],
) -> Result<SpawnCandidate, SpawnError> {
    for attempt in 1..=placement.max_spawn_attempts {
        let sample = sample_position(rng, arena, placement.ground_probe_distance);
        match check_candidate(sample, placement, world, targets, agent_positions) {
            Ok(ground) => {
                return Ok(SpawnCandidate {
                    ground,
                    attempts: attempt,
                })
            }
            Err(rejection) => {
                trace!(
                    attempt,
                    x = sample.x,
                    z = sample.z,
                    reason = rejection.name(),
                    "spawn_candidate_rejected"
                );
            }
        }
    }

    Err(SpawnError::NoValidPositionFound {
        attempts: placement.max_spawn_attempts,
    })
}
