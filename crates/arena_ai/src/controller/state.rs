use crate::math::Vec3;
use crate::world::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiState {
    Patrolling,
    Chasing,
    Attacking,
}

impl AiState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Patrolling => "patrolling",
            Self::Chasing => "chasing",
            Self::Attacking => "attacking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestTarget {
    pub target: Target,
    pub distance: f32,
}

/// Closest target by straight-line distance. Ties keep the earlier entry.
pub fn nearest_target(from: Vec3, targets: &[Target]) -> Option<NearestTarget> {
    let mut nearest: Option<NearestTarget> = None;
    for target in targets {
        let distance = from.distance(target.position);
        if !distance.is_finite() {
            continue;
        }
        if nearest.map_or(true, |current| distance < current.distance) {
            nearest = Some(NearestTarget {
                target: *target,
                distance,
            });
        }
    }
    nearest
}

/// Pure transition rule evaluated every tick. No hysteresis: an agent
/// sitting on the attack-range boundary may alternate between chasing and
/// attacking on consecutive ticks.
pub fn decide_state(nearest_distance: Option<f32>, attack_range: f32, detection_range: f32) -> AiState {
    match nearest_distance {
        None => AiState::Patrolling,
        Some(distance) if distance <= attack_range => AiState::Attacking,
        Some(distance) if distance <= detection_range => AiState::Chasing,
        Some(_) => AiState::Patrolling,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiStateCounts {
    pub patrolling: u32,
    pub chasing: u32,
    pub attacking: u32,
}

impl AiStateCounts {
    pub fn record(&mut self, state: AiState) {
        match state {
            AiState::Patrolling => self.patrolling = self.patrolling.saturating_add(1),
            AiState::Chasing => self.chasing = self.chasing.saturating_add(1),
            AiState::Attacking => self.attacking = self.attacking.saturating_add(1),
        }
    }

    pub fn total(&self) -> u32 {
        self.patrolling
            .saturating_add(self.chasing)
            .saturating_add(self.attacking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::EntityId;

    fn target(id: u64, x: f32, z: f32) -> Target {
        Target {
            id: EntityId(id),
            position: Vec3::new(x, 0.0, z),
        }
    }

    #[test]
    fn no_target_patrols() {
        assert_eq!(decide_state(None, 10.0, 15.0), AiState::Patrolling);
    }

    #[test]
    fn target_inside_attack_range_attacks() {
        assert_eq!(decide_state(Some(8.0), 10.0, 15.0), AiState::Attacking);
        assert_eq!(decide_state(Some(10.0), 10.0, 15.0), AiState::Attacking);
    }

    #[test]
    fn target_between_ranges_chases() {
        assert_eq!(decide_state(Some(10.01), 10.0, 15.0), AiState::Chasing);
        assert_eq!(decide_state(Some(15.0), 10.0, 15.0), AiState::Chasing);
    }

    #[test]
    fn target_beyond_detection_patrols() {
        assert_eq!(decide_state(Some(15.5), 10.0, 15.0), AiState::Patrolling);
    }

    #[test]
    fn attack_range_wins_when_larger_than_detection() {
        assert_eq!(decide_state(Some(12.0), 13.0, 11.0), AiState::Attacking);
    }

    #[test]
    fn nearest_target_picks_closest() {
        let targets = [target(1, 10.0, 0.0), target(2, 0.0, 3.0), target(3, -7.0, 0.0)];
        let nearest = nearest_target(Vec3::ZERO, &targets).expect("nearest");
        assert_eq!(nearest.target.id, EntityId(2));
        assert!((nearest.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn nearest_target_uses_full_distance() {
        let targets = [
            Target {
                id: EntityId(1),
                position: Vec3::new(2.0, 10.0, 0.0),
            },
            target(2, 5.0, 0.0),
        ];
        let nearest = nearest_target(Vec3::ZERO, &targets).expect("nearest");
        assert_eq!(nearest.target.id, EntityId(2));
    }

    #[test]
    fn nearest_target_of_empty_slice_is_none() {
        assert!(nearest_target(Vec3::ZERO, &[]).is_none());
    }

    #[test]
    fn state_counts_accumulate() {
        let mut counts = AiStateCounts::default();
        counts.record(AiState::Patrolling);
        counts.record(AiState::Attacking);
        counts.record(AiState::Attacking);
        assert_eq!(counts.attacking, 2);
        assert_eq!(counts.total(), 3);
    }
}
