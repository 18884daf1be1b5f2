//! Particle fields: a fixed-size point buffer generated once from a seeded procedural
//! distribution and moved every tick by a deterministic motion rule.

use std::f32::consts::{PI, TAU};

use crate::eval::tick::Tick;
use crate::field::tumble::Tumble;
use crate::foundation::core::{Mat4, Rgb, SrgbHex, Vec3};
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::foundation::math::Rng64;
use crate::scene::component::Component;
use crate::scene::stage::Stage;

/// Share of a distant particle's amplitude spent on the orbital term.
pub const ORBIT_SHARE: f32 = 0.4;

const AXIS_PHASE: [f32; 3] = [0.01, 0.02, 0.03];
const SQRT_3: f32 = 1.732_050_8;
/// Strongest per-tick pull toward home, reached at `max_drift`.
const RETURN_RATE: f32 = 0.05;

/// Positions and colors of `N` particles, `N` fixed at construction.
///
/// Index `i` addresses the same logical particle in every sequence for the buffer's lifetime.
/// Colors never change after creation. `home` keeps each particle's spawn position.
#[derive(Clone, Debug, PartialEq)]
pub struct PointBuffer {
    positions: Vec<Vec3>,
    colors: Vec<Rgb>,
    home: Vec<Vec3>,
}

impl PointBuffer {
    /// Allocate room for exactly `count` particles, reporting allocation failure as an error.
    pub(crate) fn try_with_capacity(count: usize) -> NebulaResult<Self> {
        let mut positions = Vec::new();
        let mut colors = Vec::new();
        let mut home = Vec::new();
        let fail = |e: std::collections::TryReserveError| {
            NebulaError::allocation(format!("point buffer for {count} particles: {e}"))
        };
        positions.try_reserve_exact(count).map_err(fail)?;
        colors.try_reserve_exact(count).map_err(fail)?;
        home.try_reserve_exact(count).map_err(fail)?;
        Ok(Self {
            positions,
            colors,
            home,
        })
    }

    fn push(&mut self, position: Vec3, color: Rgb) {
        self.positions.push(position);
        self.home.push(position);
        self.colors.push(color);
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Return `true` when the buffer holds no particles.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Current positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-particle colors (linear).
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Spawn positions.
    pub fn home(&self) -> &[Vec3] {
        &self.home
    }

    /// Positions as tightly packed `f32` triples, ready for a vertex buffer upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Colors as tightly packed `f32` triples.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Largest distance from the origin among current positions.
    pub fn max_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }
}

/// Spiral galaxy parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GalaxyParams {
    /// Number of spiral arms.
    pub branches: u32,
    /// Extra arm angle per unit of radius.
    pub spin: f32,
    /// Scatter magnitude relative to radius.
    pub randomness: f32,
    /// Exponent applied to the scatter draw; larger values hug the arms tighter.
    pub randomness_power: f32,
    /// Smallest spawn radius.
    pub min_radius: f32,
    /// Largest spawn radius (exclusive).
    pub max_radius: f32,
    /// Vertical flattening applied to the Y scatter.
    pub thickness: f32,
    /// Every n-th particle (by index) is an overbright highlight. `0` disables highlights.
    pub highlight_every: u32,
    /// Highlight brightness relative to white.
    pub highlight_gain: f32,
    /// Palette indexed by `floor(distance * 5) mod len`.
    pub palette: Vec<SrgbHex>,
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            branches: 5,
            spin: 1.0,
            randomness: 0.5,
            randomness_power: 3.0,
            min_radius: 0.5,
            max_radius: 4.5,
            thickness: 0.6,
            highlight_every: 15,
            highlight_gain: 1.5,
            palette: vec![
                SrgbHex(0xbd4bfc),
                SrgbHex(0x00ffcc),
                SrgbHex(0x6a5acd),
                SrgbHex(0x9370db),
                SrgbHex(0x8a2be2),
            ],
        }
    }
}

/// Uniform spherical shell parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShellParams {
    /// Inner radius.
    pub min_radius: f32,
    /// Outer radius (exclusive).
    pub max_radius: f32,
}

impl Default for ShellParams {
    fn default() -> Self {
        Self {
            min_radius: 10.0,
            max_radius: 25.0,
        }
    }
}

/// Spawn distribution of a particle field.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// Spiral arms with power-law scatter, palette colored by distance.
    Galaxy(GalaxyParams),
    /// Uniform directions on a thick spherical shell, star-like colors.
    Shell(ShellParams),
}

/// Cumulative oscillation with inverse-distance damping.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DriftParams {
    /// Oscillation frequency at the origin.
    pub base_frequency: f32,
    /// Frequency added per unit of distance.
    pub frequency_gain: f32,
    /// Amplitude at the origin.
    pub base_amplitude: f32,
    /// Amplitude is `base_amplitude / (1 + distance * damping)`.
    pub damping: f32,
    /// Particles farther than this also orbit the origin.
    pub orbit_threshold: f32,
    /// Orbital angle per second, divided by distance.
    pub orbit_speed: f32,
    /// Largest excursion from home; particles are eased back well before reaching it. `None`
    /// lets them drift freely.
    pub max_drift: Option<f32>,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            base_frequency: 0.5,
            frequency_gain: 0.2,
            base_amplitude: 0.002,
            damping: 0.5,
            orbit_threshold: 2.0,
            orbit_speed: 0.001,
            max_drift: Some(0.5),
        }
    }
}

impl DriftParams {
    /// Oscillation amplitude at `distance` from the origin.
    pub fn amplitude(&self, distance: f32) -> f32 {
        self.base_amplitude / (1.0 + distance * self.damping)
    }

    /// Upper bound of the per-tick displacement length at `distance`. Non-increasing in
    /// `distance` for non-negative damping.
    pub fn envelope(&self, distance: f32) -> f32 {
        self.amplitude(distance) * SQRT_3
    }

    /// Per-tick displacement of particle `index` currently at `p`.
    pub fn displacement(&self, p: Vec3, index: usize, t: f32) -> Vec3 {
        let d = p.length();
        let frequency = self.base_frequency + d * self.frequency_gain;
        let amplitude = self.amplitude(d);
        let phase = t * frequency;
        let i = index as f32;
        let oscillation = Vec3::new(
            (phase + i * AXIS_PHASE[0]).sin(),
            (phase + i * AXIS_PHASE[1]).cos(),
            (phase + i * AXIS_PHASE[2]).sin(),
        );

        if d > self.orbit_threshold {
            let orbit = t * self.orbit_speed / d;
            let swirl = Vec3::new(orbit.cos(), 0.0, orbit.sin());
            // The swirl bends the direction only; the length stays `amplitude * |oscillation|`.
            let bent = (1.0 - ORBIT_SHARE) * oscillation + (ORBIT_SHARE * SQRT_3) * swirl;
            let len = oscillation.length();
            match bent.try_normalize() {
                Some(dir) => dir * (amplitude * len),
                None => amplitude * oscillation,
            }
        } else {
            amplitude * oscillation
        }
    }

    /// Ease `p` back toward `home`. The pull grows with the fourth power of the excursion
    /// relative to `max`, and the result never lies farther than `max` from home.
    pub fn settle(&self, p: Vec3, home: Vec3, max: f32) -> Vec3 {
        let offset = p - home;
        let excursion = offset.length();
        if excursion <= 0.0 {
            return p;
        }
        let pull = RETURN_RATE * (excursion / max).powi(4).min(1.0);
        home + (offset * (1.0 - pull)).clamp_length_max(max)
    }
}

/// Anchored bobbing around the spawn position.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FloatParams {
    /// Per-axis offset amplitude.
    pub amplitude: [f32; 3],
    /// Per-axis angular rate.
    pub rate: [f32; 3],
}

impl Default for FloatParams {
    fn default() -> Self {
        Self {
            amplitude: [0.35, 0.25, 0.25],
            rate: [0.2, 0.3, 0.15],
        }
    }
}

impl FloatParams {
    /// Offset from home of particle `index` at time `t`.
    pub fn offset(&self, home: Vec3, index: usize, t: f32) -> Vec3 {
        let i = index as f32;
        let sx = if index % 2 == 1 { 1.0 } else { -1.0 };
        let sy = if index % 3 == 0 { -1.0 } else { 1.0 };
        Vec3::new(
            (t * self.rate[0] + home.length() * 0.05).sin() * self.amplitude[0] * sx,
            (t * self.rate[1] + i * 0.01).cos() * self.amplitude[1] * sy,
            (t * self.rate[2] + i * 0.02).sin() * self.amplitude[2],
        )
    }
}

/// Per-tick motion rule.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Motion {
    /// Integrates a damped oscillation into the previous position.
    Drift(DriftParams),
    /// Recomputes the position from home and time alone.
    Float(FloatParams),
    /// Particles never move.
    Still,
}

/// How points are drawn by the host.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PointStyle {
    /// World-space point diameter, attenuated by view depth.
    pub size: f32,
    /// Opacity applied to additive splats.
    pub opacity: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            size: 0.05,
            opacity: 1.0,
        }
    }
}

/// Full particle field definition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParticleFieldConfig {
    /// Number of particles.
    pub count: usize,
    /// Spawn distribution.
    pub distribution: Distribution,
    /// Per-tick motion.
    pub motion: Motion,
    /// Whole-object rotation.
    #[serde(default)]
    pub tumble: Tumble,
    /// Draw style.
    #[serde(default)]
    pub style: PointStyle,
}

impl ParticleFieldConfig {
    /// Spiral galaxy with damped drift.
    pub fn galaxy() -> Self {
        Self {
            count: 2500,
            distribution: Distribution::Galaxy(GalaxyParams::default()),
            motion: Motion::Drift(DriftParams::default()),
            tumble: Tumble {
                rate: [0.0, 0.05, 0.03],
                pointer_tilt: 0.05,
                pointer_yaw: 0.001,
                ..Tumble::default()
            },
            style: PointStyle {
                size: 0.05,
                opacity: 1.0,
            },
        }
    }

    /// Floating star shell around the scene.
    pub fn shell() -> Self {
        Self {
            count: 600,
            distribution: Distribution::Shell(ShellParams::default()),
            motion: Motion::Float(FloatParams::default()),
            tumble: Tumble {
                rate: [0.0, 0.03, 0.0],
                wobble_amp: 0.2,
                wobble_freq: 0.01,
                ..Tumble::default()
            },
            style: PointStyle {
                size: 0.18,
                opacity: 0.95,
            },
        }
    }

    /// Check the definition before mounting.
    pub fn validate(&self) -> NebulaResult<()> {
        if self.count == 0 {
            return Err(NebulaError::validation("particle count must be > 0"));
        }
        if !(self.style.size.is_finite() && self.style.size > 0.0) {
            return Err(NebulaError::validation("point size must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.style.opacity) {
            return Err(NebulaError::validation("point opacity must be within [0, 1]"));
        }
        match &self.distribution {
            Distribution::Galaxy(g) => {
                if g.branches == 0 {
                    return Err(NebulaError::validation("galaxy branches must be > 0"));
                }
                if g.palette.is_empty() {
                    return Err(NebulaError::validation("galaxy palette must not be empty"));
                }
                check_radii(g.min_radius, g.max_radius)?;
            }
            Distribution::Shell(s) => check_radii(s.min_radius, s.max_radius)?,
        }
        if let Motion::Drift(d) = &self.motion {
            if d.damping < 0.0 {
                return Err(NebulaError::validation("drift damping must be >= 0"));
            }
            if let Some(max) = d.max_drift
                && !(max.is_finite() && max > 0.0)
            {
                return Err(NebulaError::validation("drift max_drift must be > 0"));
            }
        }
        Ok(())
    }
}

fn check_radii(min: f32, max: f32) -> NebulaResult<()> {
    if !(min.is_finite() && max.is_finite() && min >= 0.0 && min < max) {
        return Err(NebulaError::validation(format!(
            "radius range [{min}, {max}) must satisfy 0 <= min < max"
        )));
    }
    Ok(())
}

/// A particle field component.
#[derive(Clone, Debug)]
pub struct ParticleField {
    name: &'static str,
    config: ParticleFieldConfig,
    seed: u64,
}

impl ParticleField {
    /// Build a field from a definition and a seed.
    pub fn new(name: &'static str, config: ParticleFieldConfig, seed: u64) -> Self {
        Self { name, config, seed }
    }

    /// Field definition.
    pub fn config(&self) -> &ParticleFieldConfig {
        &self.config
    }

    /// Object transform at `tick`.
    pub fn model_matrix(&self, tick: &Tick) -> Mat4 {
        self.config.tumble.model_matrix(tick)
    }

    /// Generate the initial buffer. Pure in `(config, seed)`.
    pub fn spawn(&self) -> NebulaResult<PointBuffer> {
        self.config.validate()?;
        let mut buf = PointBuffer::try_with_capacity(self.config.count)?;
        let mut rng = Rng64::new(self.seed);
        match &self.config.distribution {
            Distribution::Galaxy(g) => spawn_galaxy(&mut buf, g, self.config.count, &mut rng),
            Distribution::Shell(s) => spawn_shell(&mut buf, s, self.config.count, &mut rng),
        }
        Ok(buf)
    }
}

impl Component for ParticleField {
    type Buffers = PointBuffer;

    fn name(&self) -> &'static str {
        self.name
    }

    fn initialize(&self, stage: &mut Stage) -> NebulaResult<PointBuffer> {
        if !stage.is_available() {
            return Err(NebulaError::context_unavailable(format!(
                "{}: stage is not drawable",
                self.name
            )));
        }
        self.spawn()
    }

    fn advance(&self, buffers: &mut PointBuffer, tick: &Tick) {
        let t = tick.elapsed;
        match &self.config.motion {
            Motion::Drift(drift) => {
                for (i, (p, home)) in buffers
                    .positions
                    .iter_mut()
                    .zip(buffers.home.iter())
                    .enumerate()
                {
                    *p += drift.displacement(*p, i, t);
                    if let Some(max) = drift.max_drift {
                        *p = drift.settle(*p, *home, max);
                    }
                }
            }
            Motion::Float(float) => {
                for (i, (p, home)) in buffers
                    .positions
                    .iter_mut()
                    .zip(buffers.home.iter())
                    .enumerate()
                {
                    *p = *home + float.offset(*home, i, t);
                }
            }
            Motion::Still => {}
        }
    }
}

fn spawn_galaxy(buf: &mut PointBuffer, g: &GalaxyParams, count: usize, rng: &mut Rng64) {
    let palette: Vec<Rgb> = g.palette.iter().map(|c| c.linear()).collect();
    let highlight = Rgb::WHITE.scale(g.highlight_gain);
    let branches = g.branches as usize;

    for i in 0..count {
        let radius = rng.next_f32_01() * (g.max_radius - g.min_radius) + g.min_radius;
        let branch_angle = (i % branches) as f32 / branches as f32 * TAU;
        let spin_angle = radius * g.spin;

        let mut scatter = || {
            rng.next_f32_01().powf(g.randomness_power) * rng.next_sign() * g.randomness * radius
        };
        let rx = scatter();
        let ry = scatter();
        let rz = scatter();

        let angle = branch_angle + spin_angle;
        let position = Vec3::new(
            angle.cos() * radius + rx,
            ry * g.thickness,
            angle.sin() * radius + rz,
        );

        let color = if g.highlight_every > 0 && i % g.highlight_every as usize == 0 {
            highlight
        } else {
            let bucket = (position.length() * 5.0).floor() as usize % palette.len();
            palette[bucket]
        };
        buf.push(position, color);
    }
}

fn spawn_shell(buf: &mut PointBuffer, s: &ShellParams, count: usize, rng: &mut Rng64) {
    for _ in 0..count {
        let radius = s.min_radius + rng.next_f32_01() * (s.max_radius - s.min_radius);
        let theta = rng.next_f32_01() * TAU;
        let phi = (2.0 * rng.next_f32_01() - 1.0).clamp(-1.0, 1.0).acos();
        debug_assert!((0.0..=PI).contains(&phi));
        let position = Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        );

        let choice = rng.next_f32_01();
        let color = if choice > 0.8 {
            Rgb::new(
                0.0,
                0.98 + rng.next_f32_01() * 0.05,
                0.95 + rng.next_f32_01() * 0.1,
            )
        } else if choice > 0.5 {
            Rgb::new(0.9 + rng.next_f32_01() * 0.2, 0.4 * rng.next_f32_01(), 1.0)
        } else {
            let b = 0.85 + rng.next_f32_01() * 0.3;
            Rgb::new(b, b, b + rng.next_f32_01() * 0.5)
        };
        buf.push(position, color);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/particles.rs"]
mod tests;
