use crate::eval::tick::Tick;
use crate::foundation::core::{Mat4, Vec3};

/// Whole-object rotation of a field, driven by time and pointer.
///
/// Euler angles are composed X, then Y, then Z:
///
/// - `x = bias.x + rate.x*t + sin(t*wobble_freq)*wobble_amp + pointer.y*pointer_tilt`
/// - `y = bias.y + rate.y*t + pointer.x*pointer_yaw`
/// - `z = bias.z + rate.z*t`
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Tumble {
    /// Constant angles in radians.
    pub bias: [f32; 3],
    /// Angular rates in radians per second.
    pub rate: [f32; 3],
    /// Amplitude of the X wobble in radians.
    pub wobble_amp: f32,
    /// Angular frequency of the X wobble.
    pub wobble_freq: f32,
    /// X tilt per unit of vertical pointer travel.
    pub pointer_tilt: f32,
    /// Y yaw per unit of horizontal pointer travel.
    pub pointer_yaw: f32,
}

impl Tumble {
    /// Euler angles for `tick`.
    pub fn angles(&self, tick: &Tick) -> Vec3 {
        let t = tick.elapsed;
        Vec3::new(
            self.bias[0]
                + self.rate[0] * t
                + (t * self.wobble_freq).sin() * self.wobble_amp
                + tick.pointer.y * self.pointer_tilt,
            self.bias[1] + self.rate[1] * t + tick.pointer.x * self.pointer_yaw,
            self.bias[2] + self.rate[2] * t,
        )
    }

    /// Model matrix for `tick`.
    pub fn model_matrix(&self, tick: &Tick) -> Mat4 {
        let a = self.angles(tick);
        Mat4::from_rotation_x(a.x) * Mat4::from_rotation_y(a.y) * Mat4::from_rotation_z(a.z)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/tumble.rs"]
mod tests;
