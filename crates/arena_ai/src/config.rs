use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec3;
use crate::world::CollisionLayers;

pub const MIN_SPAWN_INTERVAL_SECONDS: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaBounds {
    pub center: Vec3,
    pub half_extent_x: f32,
    pub half_extent_z: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            half_extent_x: 25.0,
            half_extent_z: 25.0,
        }
    }
}

impl ArenaBounds {
    pub fn contains_horizontal(&self, point: Vec3) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent_x
            && (point.z - self.center.z).abs() <= self.half_extent_z
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub min_player_distance: f32,
    pub min_agent_distance: f32,
    pub obstacle_check_radius: f32,
    /// Height above the ground hit at which the obstacle overlap is centered.
    pub obstacle_check_height: f32,
    pub ground_probe_distance: f32,
    pub max_spawn_attempts: u32,
    pub ground_layers: CollisionLayers,
    pub obstacle_layers: CollisionLayers,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_player_distance: 15.0,
            min_agent_distance: 8.0,
            obstacle_check_radius: 3.0,
            obstacle_check_height: 1.0,
            ground_probe_distance: 10.0,
            max_spawn_attempts: 50,
            ground_layers: CollisionLayers::GROUND,
            obstacle_layers: CollisionLayers::NONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiParams {
    pub detection_range: f32,
    pub attack_range: f32,
    /// Shots per second. Zero or negative never fires.
    pub fire_rate: f32,
    pub patrol_radius: f32,
    pub move_speed: f32,
}

impl Default for AiParams {
    fn default() -> Self {
        Self {
            detection_range: 15.0,
            attack_range: 10.0,
            fire_rate: 1.0,
            patrol_radius: 10.0,
            move_speed: 5.0,
        }
    }
}

/// Relative half-width of the uniform jitter applied to each [`AiParams`]
/// field at spawn time. `0.2` samples from `[0.8 * base, 1.2 * base]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterBands {
    pub detection_range: f32,
    pub attack_range: f32,
    pub fire_rate: f32,
    pub patrol_radius: f32,
    pub move_speed: f32,
}

impl Default for JitterBands {
    fn default() -> Self {
        Self {
            detection_range: 0.2,
            attack_range: 0.2,
            fire_rate: 0.3,
            patrol_radius: 0.3,
            move_speed: 0.2,
        }
    }
}

impl JitterBands {
    pub const NONE: JitterBands = JitterBands {
        detection_range: 0.0,
        attack_range: 0.0,
        fire_rate: 0.0,
        patrol_radius: 0.0,
        move_speed: 0.0,
    };

    fn iter(&self) -> [(&'static str, f32); 5] {
        [
            ("jitter.detection_range", self.detection_range),
            ("jitter.attack_range", self.attack_range),
            ("jitter.fire_rate", self.fire_rate),
            ("jitter.patrol_radius", self.patrol_radius),
            ("jitter.move_speed", self.move_speed),
        ]
    }
}

/// Fixed per-agent behavior constants. Not jittered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorTuning {
    /// Fraction of the remaining turn applied per second of tick time.
    pub rotation_speed: f32,
    pub patrol_wait_seconds: f32,
    pub patrol_arrival_threshold: f32,
    pub waypoint_probe_height: f32,
    pub waypoint_probe_distance: f32,
    pub stuck_check_interval_seconds: f32,
    pub min_move_distance: f32,
    pub max_stuck_yaw_degrees: f32,
    /// Attacking agents keep closing while farther than this fraction of
    /// their attack range.
    pub attack_advance_fraction: f32,
    pub projectile_launch_speed: f32,
}

impl Default for BehaviorTuning {
    fn default() -> Self {
        Self {
            rotation_speed: 50.0,
            patrol_wait_seconds: 2.0,
            patrol_arrival_threshold: 2.0,
            waypoint_probe_height: 10.0,
            waypoint_probe_distance: 20.0,
            stuck_check_interval_seconds: 3.0,
            min_move_distance: 1.0,
            max_stuck_yaw_degrees: 90.0,
            attack_advance_fraction: 0.7,
            projectile_launch_speed: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Prefab handed to the spawn factory. Spawning is skipped while unset.
    pub prefab: Option<String>,
    pub max_agents: usize,
    pub spawn_interval_seconds: f32,
    pub arena: ArenaBounds,
    pub placement: PlacementConfig,
    pub ai: AiParams,
    pub jitter: JitterBands,
    pub behavior: BehaviorTuning,
    pub seed: Option<u64>,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            prefab: Some("tank".to_string()),
            max_agents: 5,
            spawn_interval_seconds: 10.0,
            arena: ArenaBounds::default(),
            placement: PlacementConfig::default(),
            ai: AiParams::default(),
            jitter: JitterBands::default(),
            behavior: BehaviorTuning::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    NegativeOrNonFinite { field: &'static str, value: f32 },
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must lie in [0, 1) (got {value})")]
    JitterOutOfRange { field: &'static str, value: f32 },
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeOrNonFinite { field, value })
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

impl AiParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("ai.detection_range", self.detection_range)?;
        check_non_negative("ai.attack_range", self.attack_range)?;
        check_non_negative("ai.patrol_radius", self.patrol_radius)?;
        check_non_negative("ai.move_speed", self.move_speed)?;
        if !self.fire_rate.is_finite() {
            return Err(ConfigError::NegativeOrNonFinite {
                field: "ai.fire_rate",
                value: self.fire_rate,
            });
        }
        Ok(())
    }
}

impl JitterBands {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.iter() {
            if !(value.is_finite() && (0.0..1.0).contains(&value)) {
                return Err(ConfigError::JitterOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

impl DirectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("spawn_interval_seconds", self.spawn_interval_seconds)?;
        check_non_negative("arena.half_extent_x", self.arena.half_extent_x)?;
        check_non_negative("arena.half_extent_z", self.arena.half_extent_z)?;

        let placement = &self.placement;
        check_non_negative("placement.min_player_distance", placement.min_player_distance)?;
        check_non_negative("placement.min_agent_distance", placement.min_agent_distance)?;
        check_non_negative(
            "placement.obstacle_check_radius",
            placement.obstacle_check_radius,
        )?;
        check_non_negative(
            "placement.ground_probe_distance",
            placement.ground_probe_distance,
        )?;

        self.ai.validate()?;
        self.jitter.validate()?;

        let behavior = &self.behavior;
        check_non_negative("behavior.rotation_speed", behavior.rotation_speed)?;
        check_non_negative("behavior.patrol_wait_seconds", behavior.patrol_wait_seconds)?;
        check_non_negative(
            "behavior.patrol_arrival_threshold",
            behavior.patrol_arrival_threshold,
        )?;
        check_positive(
            "behavior.stuck_check_interval_seconds",
            behavior.stuck_check_interval_seconds,
        )?;
        check_non_negative("behavior.min_move_distance", behavior.min_move_distance)?;
        check_non_negative(
            "behavior.max_stuck_yaw_degrees",
            behavior.max_stuck_yaw_degrees,
        )?;
        check_non_negative(
            "behavior.attack_advance_fraction",
            behavior.attack_advance_fraction,
        )?;
        check_non_negative(
            "behavior.projectile_launch_speed",
            behavior.projectile_launch_speed,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        DirectorConfig::default()
            .validate()
            .expect("default config should validate");
    }

    #[test]
    fn default_agent_spacing_is_tighter_than_player_spacing() {
        let placement = PlacementConfig::default();
        assert!(placement.min_agent_distance < placement.min_player_distance);
    }

    #[test]
    fn rejects_non_positive_spawn_interval() {
        let config = DirectorConfig {
            spawn_interval_seconds: 0.0,
            ..DirectorConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "spawn_interval_seconds",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_negative_distances() {
        let mut config = DirectorConfig::default();
        config.placement.min_player_distance = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeOrNonFinite {
                field: "placement.min_player_distance",
                ..
            })
        ));
    }

    #[test]
    fn rejects_jitter_of_one_or_more() {
        let mut config = DirectorConfig::default();
        config.jitter.fire_rate = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::JitterOutOfRange {
                field: "jitter.fire_rate",
                ..
            })
        ));
    }

    #[test]
    fn zero_fire_rate_is_accepted() {
        let mut config = DirectorConfig::default();
        config.ai.fire_rate = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DirectorConfig = serde_json::from_str(
            r#"{ "max_agents": 3, "placement": { "min_player_distance": 20.0 } }"#,
        )
        .expect("parse config");
        assert_eq!(config.max_agents, 3);
        assert_eq!(config.placement.min_player_distance, 20.0);
        assert_eq!(config.placement.max_spawn_attempts, 50);
        assert_eq!(config.ai, AiParams::default());
        assert_eq!(config.prefab.as_deref(), Some("tank"));
    }

    #[test]
    fn arena_bounds_contains_edges() {
        let arena = ArenaBounds::default();
        assert!(arena.contains_horizontal(Vec3::new(25.0, 80.0, -25.0)));
        assert!(!arena.contains_horizontal(Vec3::new(25.1, 0.0, 0.0)));
    }
}
