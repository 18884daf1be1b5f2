/// Seeded SplitMix64 generator. All procedural distributions draw from this so a given seed
/// always reproduces the same buffers.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)` with 53 bits of precision.
    pub fn next_f64_01(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform value in `[0, 1)` as `f32`.
    pub fn next_f32_01(&mut self) -> f32 {
        // 24 bits so the result never rounds up to 1.0.
        let v = self.next_u64() >> 40;
        (v as f32) * (1.0 / ((1u32 << 24) as f32))
    }

    /// `+1.0` or `-1.0` with equal probability.
    pub fn next_sign(&mut self) -> f32 {
        if self.next_f32_01() < 0.5 { 1.0 } else { -1.0 }
    }
}

/// GLSL `fract`.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// GLSL `mod` (result takes the sign of `y`).
pub fn glsl_mod(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

/// Hermite smoothstep between `edge0` and `edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Classic shader hash `fract(sin(dot(co, (12.9898, 78.233))) * 43758.5453)`.
///
/// Evaluated in `f64` so the result does not depend on `f32` `sin` precision at large inputs.
pub fn hash2(x: f32, y: f32) -> f32 {
    let d = f64::from(x) * 12.9898 + f64::from(y) * 78.233;
    let v = d.sin() * 43_758.545_3;
    (v - v.floor()) as f32
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
