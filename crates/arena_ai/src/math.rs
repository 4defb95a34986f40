use std::f32::consts::{PI, TAU};
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (other - self).length()
    }

    /// Distance on the x/z plane, ignoring height.
    pub fn horizontal_distance(self, other: Vec3) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Position plus heading around the vertical axis. Yaw 0 faces +z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub yaw_radians: f32,
}

impl Pose {
    pub fn new(position: Vec3, yaw_radians: f32) -> Self {
        Self {
            position,
            yaw_radians: wrap_angle(yaw_radians),
        }
    }

    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.yaw_radians)
    }
}

pub fn forward_from_yaw(yaw_radians: f32) -> Vec3 {
    Vec3::new(yaw_radians.sin(), 0.0, yaw_radians.cos())
}

/// Heading that faces from `from` toward `to` on the horizontal plane.
/// `None` when the points coincide horizontally.
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<f32> {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx * dx + dz * dz <= f32::EPSILON {
        return None;
    }
    Some(dx.atan2(dz))
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(radians: f32) -> f32 {
    if !radians.is_finite() {
        return 0.0;
    }
    let mut wrapped = radians % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

/// Interpolates `current` toward `target` along the shortest arc. `fraction`
/// is clamped to `[0, 1]`; 1 snaps to the target.
pub fn slerp_yaw(current: f32, target: f32, fraction: f32) -> f32 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let delta = wrap_angle(target - current);
    wrap_angle(current + delta * fraction)
}
