//! Physics state and control input records

use serde::{Deserialize, Serialize};

/// 3D vector matching the wire shape `{x, y, z}`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Linear interpolation toward `target` by factor `t` in [0, 1]
    pub fn lerp(&self, target: &Vec3, t: f32) -> Vec3 {
        Vec3 {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
            z: self.z + (target.z - self.z) * t,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Normalized control input, read once per integration tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    /// Throttle lever position in percent (0..=100)
    pub throttle: f32,
    /// Elevator deflection (-1..=1, positive = nose up)
    pub elevator: f32,
    /// Rudder deflection (-1..=1)
    pub rudder: f32,
    /// Aileron deflection (-1..=1)
    pub aileron: f32,
    /// Flap detent (0..=3)
    pub flaps: u8,
    /// Landing gear extended
    pub gear_down: bool,
    /// Wheel brakes applied
    pub brake: bool,
}

impl Default for ControlInput {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            elevator: 0.0,
            rudder: 0.0,
            aileron: 0.0,
            flaps: 0,
            gear_down: true,
            brake: false,
        }
    }
}

impl ControlInput {
    /// Clamp all fields into their valid ranges, mapping NaN to neutral.
    /// The integrator assumes well-formed input; the input mapper runs
    /// this before every tick.
    pub fn sanitize(&mut self) {
        self.throttle = clamp_finite(self.throttle, 0.0, 100.0);
        self.elevator = clamp_finite(self.elevator, -1.0, 1.0);
        self.rudder = clamp_finite(self.rudder, -1.0, 1.0);
        self.aileron = clamp_finite(self.aileron, -1.0, 1.0);
        self.flaps = self.flaps.min(3);
    }
}

fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        0.0
    }
}

/// Spawn pose at the runway threshold
pub const SPAWN_POSITION: Vec3 = Vec3 {
    x: 0.0,
    y: 2.0,
    z: -1900.0,
};
pub const SPAWN_HEADING_DEG: f32 = 270.0;
pub const SPAWN_FUEL_PERCENT: f32 = 100.0;

/// Rigid-body-like aircraft state advanced by the integrator.
///
/// Angles for pitch/roll/heading are stored in degrees; the `rotation`
/// vector is the radian projection consumed by rendering and the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneState {
    /// Position in meters
    pub position: Vec3,
    /// Rotation in radians (x = pitch, y = heading, z = roll)
    pub rotation: Vec3,
    /// Velocity in m/s
    pub velocity: Vec3,
    pub pitch_deg: f32,
    pub roll_deg: f32,
    /// Wrapped to [0, 360)
    pub heading_deg: f32,
    pub fuel_percent: f32,
    /// Derived: |velocity| * 3.6
    pub speed_kmh: f32,
    /// Derived: max(0, position.y)
    pub altitude_m: f32,
    /// Derived: velocity.y
    pub vertical_speed_ms: f32,
}

impl PlaneState {
    /// State at the spawn pose
    pub fn spawned() -> Self {
        Self {
            position: SPAWN_POSITION,
            rotation: Vec3::new(0.0, SPAWN_HEADING_DEG.to_radians(), 0.0),
            velocity: Vec3::ZERO,
            pitch_deg: 0.0,
            roll_deg: 0.0,
            heading_deg: SPAWN_HEADING_DEG,
            fuel_percent: SPAWN_FUEL_PERCENT,
            speed_kmh: 0.0,
            altitude_m: SPAWN_POSITION.y,
            vertical_speed_ms: 0.0,
        }
    }

    /// Restore spawn values in place
    pub fn reset(&mut self) {
        *self = Self::spawned();
    }
}

impl Default for PlaneState {
    fn default() -> Self {
        Self::spawned()
    }
}
