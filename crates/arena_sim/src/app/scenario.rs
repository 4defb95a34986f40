use std::fs;
use std::path::Path;

use arena_ai::{CollisionLayers, DirectorConfig, PlacementConfig, Vec3};
use serde::{Deserialize, Serialize};

use super::loop_runner::SimError;

pub const OBSTACLE_LAYER: CollisionLayers = CollisionLayers(2);

/// Axis-aligned horizontal slab of walkable ground at height `center.y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundPatch {
    pub center: Vec3,
    pub half_extent_x: f32,
    pub half_extent_z: f32,
    pub layers: CollisionLayers,
}

impl Default for GroundPatch {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            half_extent_x: 30.0,
            half_extent_z: 30.0,
            layers: CollisionLayers::GROUND,
        }
    }
}

impl GroundPatch {
    pub fn contains_horizontal(&self, point: Vec3) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent_x
            && (point.z - self.center.z).abs() <= self.half_extent_z
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleDef {
    pub center: Vec3,
    pub radius: f32,
    pub layers: CollisionLayers,
}

impl Default for ObstacleDef {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 1.0,
            layers: OBSTACLE_LAYER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub director: DirectorConfig,
    pub ticks_per_second: u32,
    pub duration_seconds: f32,
    pub stats_interval_seconds: f32,
    pub prefabs: Vec<String>,
    pub ground: Vec<GroundPatch>,
    pub obstacles: Vec<ObstacleDef>,
    pub targets: Vec<Vec3>,
    pub agent_radius: f32,
    pub shell_lifetime_seconds: f32,
    pub shell_hit_radius: f32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            director: DirectorConfig {
                seed: Some(1),
                placement: PlacementConfig {
                    obstacle_layers: OBSTACLE_LAYER,
                    ..PlacementConfig::default()
                },
                ..DirectorConfig::default()
            },
            ticks_per_second: 60,
            duration_seconds: 120.0,
            stats_interval_seconds: 10.0,
            prefabs: vec!["tank".to_string()],
            ground: vec![GroundPatch::default()],
            obstacles: vec![
                ObstacleDef {
                    center: Vec3::new(10.0, 1.0, 10.0),
                    radius: 2.0,
                    ..ObstacleDef::default()
                },
                ObstacleDef {
                    center: Vec3::new(-12.0, 1.0, 6.0),
                    radius: 1.5,
                    ..ObstacleDef::default()
                },
                ObstacleDef {
                    center: Vec3::new(4.0, 1.0, -15.0),
                    radius: 2.5,
                    ..ObstacleDef::default()
                },
            ],
            targets: vec![Vec3::ZERO],
            agent_radius: 1.0,
            shell_lifetime_seconds: 5.0,
            shell_hit_radius: 1.0,
        }
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<(), SimError> {
        self.director.validate()?;
        if self.ticks_per_second == 0 {
            return Err(SimError::InvalidScenario {
                field: "ticks_per_second",
                reason: "must be greater than zero",
            });
        }
        let non_negative = [
            ("duration_seconds", self.duration_seconds),
            ("agent_radius", self.agent_radius),
            ("shell_lifetime_seconds", self.shell_lifetime_seconds),
            ("shell_hit_radius", self.shell_hit_radius),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidScenario {
                    field,
                    reason: "must be a finite, non-negative number",
                });
            }
        }
        if !(self.stats_interval_seconds.is_finite() && self.stats_interval_seconds > 0.0) {
            return Err(SimError::InvalidScenario {
                field: "stats_interval_seconds",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario, SimError> {
    let raw = fs::read_to_string(path).map_err(|source| SimError::ReadScenario {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scenario(&raw)
}

pub fn parse_scenario(raw: &str) -> Result<Scenario, SimError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let scenario = serde_path_to_error::deserialize::<_, Scenario>(&mut deserializer).map_err(
        |error| {
            let path = error.path().to_string();
            SimError::ParseScenario {
                at: if path.is_empty() { ".".to_string() } else { path },
                source: error.into_inner(),
            }
        },
    )?;
    scenario.validate()?;
    Ok(scenario)
}
