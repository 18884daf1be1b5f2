//! Animated wave surface: a subdivided plane whose per-vertex elevation is layered Perlin
//! noise plus a pointer-driven ripple, shaded by elevation with a pulsing star speckle.

use rayon::prelude::*;

use crate::eval::tick::Tick;
use crate::field::noise::perlin3;
use crate::field::tumble::Tumble;
use crate::foundation::core::{Mat4, Rgb, SrgbHex, Vec2, Vec3};
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::foundation::math::{hash2, smoothstep};
use crate::scene::component::Component;
use crate::scene::stage::Stage;

const GLOW_TINT: Vec3 = Vec3::new(0.3, 0.6, 0.9);
const SPECKLE_LEVEL: f32 = 1.5;

/// One noise layer: `perlin3(x*scale, y*scale, t*rate + offset) * amplitude`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Octave {
    /// Spatial frequency.
    pub scale: f32,
    /// Temporal frequency.
    pub rate: f32,
    /// Offset along the time axis, decorrelating layers.
    pub offset: f32,
    /// Layer weight.
    pub amplitude: f32,
}

/// Radial ripple centered on the pointer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Ripple {
    /// Plane units per unit of pointer travel.
    pub pointer_scale: f32,
    /// Radial wave number.
    pub wave_number: f32,
    /// Outward phase speed.
    pub speed: f32,
    /// Peak weight.
    pub strength: f32,
    /// Added to the distance in the falloff denominator.
    pub softening: f32,
}

impl Default for Ripple {
    fn default() -> Self {
        Self {
            pointer_scale: 5.0,
            wave_number: 3.0,
            speed: 5.0,
            strength: 0.25,
            softening: 0.1,
        }
    }
}

impl Ripple {
    /// Envelope of the ripple at planar `distance` from its center. Strictly decreasing.
    pub fn amplitude(&self, distance: f32) -> f32 {
        self.strength / (self.softening + distance)
    }

    /// Signed ripple height at planar `distance` and time `t`.
    pub fn height(&self, distance: f32, t: f32) -> f32 {
        (distance * self.wave_number - t * self.speed).sin() * self.amplitude(distance)
    }
}

/// Wave surface definition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WaveSurfaceConfig {
    /// Plane extent in world units (x, y).
    pub size: [f32; 2],
    /// Cell count along each axis.
    pub segments: [u32; 2],
    /// Noise layers, summed.
    pub octaves: Vec<Octave>,
    /// Pointer ripple.
    pub ripple: Ripple,
    /// Color at low elevation.
    pub color_low: SrgbHex,
    /// Color at high elevation.
    pub color_high: SrgbHex,
    /// Surface opacity.
    pub opacity: f32,
    /// Whole-object rotation.
    pub tumble: Tumble,
    /// Evaluate vertex rows on the rayon pool.
    pub parallel: bool,
}

impl Default for WaveSurfaceConfig {
    fn default() -> Self {
        Self {
            size: [40.0, 40.0],
            segments: [128, 128],
            octaves: vec![
                Octave {
                    scale: 0.5,
                    rate: 0.3,
                    offset: 0.0,
                    amplitude: 1.2,
                },
                Octave {
                    scale: 0.3,
                    rate: 0.1,
                    offset: 100.0,
                    amplitude: 0.7,
                },
                Octave {
                    scale: 0.8,
                    rate: 0.2,
                    offset: 300.0,
                    amplitude: 0.5,
                },
            ],
            ripple: Ripple::default(),
            color_low: SrgbHex(0x8800ff),
            color_high: SrgbHex(0x00ffff),
            opacity: 0.95,
            tumble: Tumble {
                bias: [-0.2, 0.0, 0.0],
                rate: [0.0, 0.05, 0.0],
                wobble_amp: 0.1,
                wobble_freq: 0.1,
                ..Tumble::default()
            },
            parallel: true,
        }
    }
}

impl WaveSurfaceConfig {
    /// Check the definition before mounting.
    pub fn validate(&self) -> NebulaResult<()> {
        if self.size.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(NebulaError::validation("wave size must be finite and > 0"));
        }
        if self.segments.contains(&0) {
            return Err(NebulaError::validation("wave segments must be > 0"));
        }
        let vertices = (u64::from(self.segments[0]) + 1) * (u64::from(self.segments[1]) + 1);
        if vertices > u64::from(u32::MAX) {
            return Err(NebulaError::validation(format!(
                "wave grid of {vertices} vertices exceeds u32 indexing"
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(NebulaError::validation("wave opacity must be within [0, 1]"));
        }
        let softening = self.ripple.softening;
        if !(softening.is_finite() && softening > 0.0) {
            return Err(NebulaError::validation("ripple softening must be > 0"));
        }
        Ok(())
    }
}

/// Plane mesh with per-vertex elevation and color.
///
/// Vertices are laid out row by row, top row first, `columns` vertices per row. Triangles use
/// the usual plane winding: `(a, b, d)` and `(b, c, d)` per cell.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMesh {
    columns: usize,
    rows: usize,
    base: Vec<Vec2>,
    uvs: Vec<Vec2>,
    elevation: Vec<f32>,
    colors: Vec<Rgb>,
    triangles: Vec<[u32; 3]>,
}

impl SurfaceMesh {
    fn build(size: [f32; 2], segments: [u32; 2]) -> NebulaResult<Self> {
        let grid_x = segments[0] as usize;
        let grid_y = segments[1] as usize;
        let columns = grid_x + 1;
        let rows = grid_y + 1;
        let count = columns
            .checked_mul(rows)
            .ok_or_else(|| NebulaError::allocation("wave vertex count overflows usize"))?;
        let cells = grid_x
            .checked_mul(grid_y)
            .and_then(|c| c.checked_mul(2))
            .ok_or_else(|| NebulaError::allocation("wave triangle count overflows usize"))?;

        let fail = |e: std::collections::TryReserveError| {
            NebulaError::allocation(format!("wave mesh with {count} vertices: {e}"))
        };
        let mut base = Vec::new();
        let mut uvs = Vec::new();
        let mut elevation = Vec::new();
        let mut colors = Vec::new();
        let mut triangles = Vec::new();
        base.try_reserve_exact(count).map_err(fail)?;
        uvs.try_reserve_exact(count).map_err(fail)?;
        elevation.try_reserve_exact(count).map_err(fail)?;
        colors.try_reserve_exact(count).map_err(fail)?;
        triangles.try_reserve_exact(cells).map_err(fail)?;

        let cell_w = size[0] / grid_x as f32;
        let cell_h = size[1] / grid_y as f32;
        for iy in 0..rows {
            let y = iy as f32 * cell_h - size[1] * 0.5;
            for ix in 0..columns {
                let x = ix as f32 * cell_w - size[0] * 0.5;
                base.push(Vec2::new(x, -y));
                uvs.push(Vec2::new(
                    ix as f32 / grid_x as f32,
                    1.0 - iy as f32 / grid_y as f32,
                ));
            }
        }
        elevation.resize(count, 0.0);
        colors.resize(count, Rgb::BLACK);

        let at = |ix: usize, iy: usize| (ix + columns * iy) as u32;
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = at(ix, iy);
                let b = at(ix, iy + 1);
                let c = at(ix + 1, iy + 1);
                let d = at(ix + 1, iy);
                triangles.push([a, b, d]);
                triangles.push([b, c, d]);
            }
        }

        Ok(Self {
            columns,
            rows,
            base,
            uvs,
            elevation,
            colors,
            triangles,
        })
    }

    /// Vertices per row.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of vertex rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total vertex count.
    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }

    /// Undisplaced planar coordinates.
    pub fn base(&self) -> &[Vec2] {
        &self.base
    }

    /// Texture coordinates, `0..=1` over the grid.
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Current elevations.
    pub fn elevation(&self) -> &[f32] {
        &self.elevation
    }

    /// Current vertex colors (linear, before opacity).
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Triangle index triples.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Displaced object-space position of vertex `i`.
    pub fn vertex(&self, i: usize) -> Vec3 {
        self.base[i].extend(self.elevation[i])
    }

    /// Elevations as raw bytes.
    pub fn elevation_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.elevation)
    }
}

/// The wave surface component.
#[derive(Clone, Debug)]
pub struct WaveSurface {
    config: WaveSurfaceConfig,
    color_low: Rgb,
    color_high: Rgb,
}

impl WaveSurface {
    /// Build a surface from its definition.
    pub fn new(config: WaveSurfaceConfig) -> Self {
        let color_low = config.color_low.linear();
        let color_high = config.color_high.linear();
        Self {
            config,
            color_low,
            color_high,
        }
    }

    /// Surface definition.
    pub fn config(&self) -> &WaveSurfaceConfig {
        &self.config
    }

    /// Object transform at `tick`.
    pub fn model_matrix(&self, tick: &Tick) -> Mat4 {
        self.config.tumble.model_matrix(tick)
    }

    /// Ripple center in plane units.
    pub fn ripple_center(&self, pointer: Vec2) -> Vec2 {
        pointer * self.config.ripple.pointer_scale
    }

    /// Layered noise height at planar position `pos`, time `t`.
    pub fn noise_height(&self, pos: Vec2, t: f32) -> f32 {
        self.config
            .octaves
            .iter()
            .map(|o| perlin3((pos * o.scale).extend(t * o.rate + o.offset)) * o.amplitude)
            .sum()
    }

    /// Ripple height at `pos` for `tick`.
    pub fn ripple(&self, pos: Vec2, tick: &Tick) -> f32 {
        let distance = pos.distance(self.ripple_center(tick.pointer));
        self.config.ripple.height(distance, tick.elapsed)
    }

    /// Full elevation at planar position `pos`.
    pub fn elevation(&self, pos: Vec2, tick: &Tick) -> f32 {
        self.noise_height(pos, tick.elapsed) + self.ripple(pos, tick)
    }

    /// Shaded vertex color for texture coordinate `uv` at elevation `e`, time `t`.
    pub fn shade(&self, uv: Vec2, e: f32, t: f32) -> Rgb {
        let pulse = t.sin() * 0.2 + 0.9;
        let mut color = self.color_low.mix(self.color_high, e * 2.5 + 0.5).to_vec3();

        let cell = uv * 20.0 + Vec2::splat(t * 0.1);
        let bright = smoothstep(0.8, 0.95, hash2(cell.x, cell.y));
        color = color.lerp(Vec3::splat(SPECKLE_LEVEL), bright * 0.9);

        let glow = (e + 0.5).max(0.0).powi(3);
        color += GLOW_TINT * (glow * 0.5);

        Rgb::from_vec3(color * pulse)
    }

    fn fill_row(
        &self,
        base: &[Vec2],
        uvs: &[Vec2],
        elevation: &mut [f32],
        colors: &mut [Rgb],
        tick: &Tick,
    ) {
        for (((pos, uv), e), c) in base.iter().zip(uvs).zip(elevation).zip(colors) {
            *e = self.elevation(*pos, tick);
            *c = self.shade(*uv, *e, tick.elapsed);
        }
    }
}

impl Component for WaveSurface {
    type Buffers = SurfaceMesh;

    fn name(&self) -> &'static str {
        "wave_surface"
    }

    #[tracing::instrument(skip_all, fields(segments = ?self.config.segments))]
    fn initialize(&self, stage: &mut Stage) -> NebulaResult<SurfaceMesh> {
        if !stage.is_available() {
            return Err(NebulaError::context_unavailable(
                "wave_surface: stage is not drawable",
            ));
        }
        self.config.validate()?;
        let mut mesh = SurfaceMesh::build(self.config.size, self.config.segments)?;
        self.advance(&mut mesh, &Tick::at(0.0));
        Ok(mesh)
    }

    fn advance(&self, mesh: &mut SurfaceMesh, tick: &Tick) {
        let SurfaceMesh {
            columns,
            base,
            uvs,
            elevation,
            colors,
            ..
        } = mesh;
        let columns = *columns;

        if self.config.parallel {
            base.par_chunks(columns)
                .zip(uvs.par_chunks(columns))
                .zip(elevation.par_chunks_mut(columns))
                .zip(colors.par_chunks_mut(columns))
                .for_each(|(((b, u), e), c)| self.fill_row(b, u, e, c, tick));
        } else {
            base.chunks(columns)
                .zip(uvs.chunks(columns))
                .zip(elevation.chunks_mut(columns))
                .zip(colors.chunks_mut(columns))
                .for_each(|(((b, u), e), c)| self.fill_row(b, u, e, c, tick));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/wave.rs"]
mod tests;
