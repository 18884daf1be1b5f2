//! Software rasterizer for the live backdrop.
//!
//! The wave surface is drawn as depth-tested, depth-writing triangles blended at the surface
//! opacity. Particles follow as additive discs that read but never write depth. Everything is
//! accumulated in linear HDR and resolved once at the end.

use std::f32::consts::PI;

use crate::eval::tick::Tick;
use crate::field::wave::{SurfaceMesh, WaveSurface};
use crate::foundation::core::{Rgb, Vec2, Vec3};
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
use crate::render::camera::{Camera, Projected};
use crate::render::placeholder::draw_starfield;
use crate::render::tonemap::resolve_rgba8;
use crate::scene::backdrop::{Backdrop, BackdropView, FieldView, LiveView};
use crate::scene::stage::{FogExp2, Stage};

/// Linear HDR color target with coverage and depth.
struct HdrTarget {
    width: usize,
    height: usize,
    color: Vec<Vec3>,
    alpha: Vec<f32>,
    depth: Vec<f32>,
}

impl HdrTarget {
    fn new(width: usize, height: usize) -> NebulaResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or_else(|| NebulaError::allocation("hdr target size overflows usize"))?;
        let fail = |e: std::collections::TryReserveError| {
            NebulaError::allocation(format!("hdr target {width}x{height}: {e}"))
        };
        let mut color = Vec::new();
        let mut alpha = Vec::new();
        let mut depth = Vec::new();
        color.try_reserve_exact(len).map_err(fail)?;
        alpha.try_reserve_exact(len).map_err(fail)?;
        depth.try_reserve_exact(len).map_err(fail)?;
        color.resize(len, Vec3::ZERO);
        alpha.resize(len, 0.0);
        depth.resize(len, f32::INFINITY);
        Ok(Self {
            width,
            height,
            color,
            alpha,
            depth,
        })
    }

    fn clear(&mut self, background: Option<Rgb>) {
        let (c, a) = match background {
            Some(bg) => (bg.to_vec3(), 1.0),
            None => (Vec3::ZERO, 0.0),
        };
        self.color.fill(c);
        self.alpha.fill(a);
        self.depth.fill(f32::INFINITY);
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn blend_over(&mut self, i: usize, color: Vec3, opacity: f32) {
        self.color[i] = color * opacity + self.color[i] * (1.0 - opacity);
        self.alpha[i] = opacity + self.alpha[i] * (1.0 - opacity);
    }

    fn add(&mut self, i: usize, color: Vec3, coverage: f32) {
        self.color[i] += color;
        self.alpha[i] = (self.alpha[i] + coverage).min(1.0);
    }
}

/// CPU render backend.
pub struct CpuBackend {
    settings: RenderSettings,
    target: Option<HdrTarget>,
}

impl CpuBackend {
    /// Backend with `settings`. Buffers are allocated on first render and reused while the
    /// canvas size stays the same.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            target: None,
        }
    }

    /// Current settings.
    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    fn render_live(
        &mut self,
        view: &LiveView<'_>,
        stage: &Stage,
        camera: &Camera,
        tick: &Tick,
    ) -> NebulaResult<FrameRGBA> {
        let canvas = stage.canvas();
        let (w, h) = (canvas.width as usize, canvas.height as usize);
        if self
            .target
            .as_ref()
            .is_none_or(|t| t.width != w || t.height != h)
        {
            self.target = Some(HdrTarget::new(w, h)?);
        }
        let target = self
            .target
            .as_mut()
            .ok_or_else(|| NebulaError::render("hdr target missing"))?;

        let background = if self.settings.opaque_clear {
            stage.background
        } else {
            None
        };
        target.clear(background);

        draw_surface(target, view.wave, view.mesh, camera, stage.fog.as_ref(), tick);
        for field in &view.fields {
            draw_points(target, field, camera, stage.fog.as_ref(), tick);
        }

        let mut data = vec![0u8; w * h * 4];
        resolve_rgba8(
            &target.color,
            &target.alpha,
            w,
            stage.tone_mapping,
            stage.exposure,
            &mut data,
        );
        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip_all, fields(elapsed = tick.elapsed))]
    fn render(
        &mut self,
        backdrop: &Backdrop,
        stage: &Stage,
        tick: &Tick,
    ) -> NebulaResult<FrameRGBA> {
        let canvas = stage.canvas();
        if canvas.width == 0 || canvas.height == 0 {
            return Err(NebulaError::render("canvas width/height must be > 0"));
        }
        let camera = Camera::new(&backdrop.config().camera, canvas);
        match backdrop.view() {
            BackdropView::Unmounted => {
                Err(NebulaError::disposed("cannot render an unmounted backdrop"))
            }
            BackdropView::Placeholder(stars) => {
                let clear = self
                    .settings
                    .opaque_clear
                    .then(|| backdrop.config().environment.background.linear());
                draw_starfield(stars, &camera, canvas.width, canvas.height, clear)
            }
            BackdropView::Live(view) => self.render_live(&view, stage, &camera, tick),
        }
    }
}

fn fogged(color: Vec3, fog: Option<&FogExp2>, depth: f32) -> Vec3 {
    match fog {
        Some(fog) => color.lerp(fog.color.to_vec3(), fog.factor(depth)),
        None => color,
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn draw_surface(
    target: &mut HdrTarget,
    wave: &WaveSurface,
    mesh: &SurfaceMesh,
    camera: &Camera,
    fog: Option<&FogExp2>,
    tick: &Tick,
) {
    let model = wave.model_matrix(tick);
    let opacity = wave.config().opacity;
    let projected: Vec<Option<Projected>> = (0..mesh.vertex_count())
        .map(|i| camera.project(model.transform_point3(mesh.vertex(i))))
        .collect();
    let colors = mesh.colors();

    for tri in mesh.triangles() {
        let [a, b, c] = tri.map(|i| i as usize);
        // Triangles crossing the near plane are dropped whole.
        let (Some(pa), Some(pb), Some(pc)) = (projected[a], projected[b], projected[c]) else {
            continue;
        };
        let tint = [colors[a], colors[b], colors[c]].map(Rgb::to_vec3);
        raster_triangle(target, [pa, pb, pc], tint, opacity, fog);
    }
}

fn raster_triangle(
    target: &mut HdrTarget,
    pts: [Projected; 3],
    colors: [Vec3; 3],
    opacity: f32,
    fog: Option<&FogExp2>,
) {
    let [p0, p1, p2] = pts.map(|p| p.pixel);
    let area = edge(p0, p1, p2);
    if area.abs() <= f32::EPSILON {
        return;
    }

    let x0 = p0.x.min(p1.x).min(p2.x).floor().max(0.0);
    let y0 = p0.y.min(p1.y).min(p2.y).floor().max(0.0);
    let x1 = p0.x.max(p1.x).max(p2.x).ceil().min(target.width as f32 - 1.0);
    let y1 = p0.y.max(p1.y).max(p2.y).ceil().min(target.height as f32 - 1.0);
    if x0 > x1 || y0 > y1 {
        return;
    }

    let inv_depth = pts.map(|p| 1.0 / p.depth);
    for y in y0 as usize..=y1 as usize {
        for x in x0 as usize..=x1 as usize {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            // Dividing by the signed area makes the weights positive inside for both windings.
            let w0 = edge(p1, p2, p) / area;
            let w1 = edge(p2, p0, p) / area;
            let w2 = edge(p0, p1, p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let k = [w0 * inv_depth[0], w1 * inv_depth[1], w2 * inv_depth[2]];
            let denom = k[0] + k[1] + k[2];
            if denom <= 0.0 {
                continue;
            }
            let depth = 1.0 / denom;
            let i = target.index(x, y);
            if depth >= target.depth[i] {
                continue;
            }

            let color = (colors[0] * k[0] + colors[1] * k[1] + colors[2] * k[2]) / denom;
            target.blend_over(i, fogged(color, fog, depth), opacity);
            target.depth[i] = depth;
        }
    }
}

fn draw_points(
    target: &mut HdrTarget,
    field: &FieldView<'_>,
    camera: &Camera,
    fog: Option<&FogExp2>,
    tick: &Tick,
) {
    let model = field.field.model_matrix(tick);
    let style = field.field.config().style;
    let scale = camera.point_scale();

    for (p, c) in field.points.positions().iter().zip(field.points.colors()) {
        let Some(proj) = camera.project(model.transform_point3(*p)) else {
            continue;
        };
        let radius = style.size * scale / proj.depth * 0.5;
        let color = fogged(c.to_vec3(), fog, proj.depth) * style.opacity;
        splat(target, proj, radius, color, style.opacity);
    }
}

fn splat(target: &mut HdrTarget, at: Projected, radius: f32, color: Vec3, opacity: f32) {
    let center = at.pixel;
    if radius < 0.5 {
        if center.x < 0.0 || center.y < 0.0 {
            return;
        }
        let (x, y) = (center.x as usize, center.y as usize);
        if x >= target.width || y >= target.height {
            return;
        }
        let coverage = (PI * radius * radius).min(1.0);
        deposit(target, x, y, at.depth, color * coverage, opacity * coverage);
        return;
    }

    let x0 = (center.x - radius).floor().max(0.0);
    let y0 = (center.y - radius).floor().max(0.0);
    let x1 = (center.x + radius).ceil().min(target.width as f32 - 1.0);
    let y1 = (center.y + radius).ceil().min(target.height as f32 - 1.0);
    if x0 > x1 || y0 > y1 {
        return;
    }
    for y in y0 as usize..=y1 as usize {
        for x in x0 as usize..=x1 as usize {
            let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
            let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
            if coverage > 0.0 {
                deposit(target, x, y, at.depth, color * coverage, opacity * coverage);
            }
        }
    }
}

fn deposit(target: &mut HdrTarget, x: usize, y: usize, depth: f32, color: Vec3, coverage: f32) {
    let i = target.index(x, y);
    if depth >= target.depth[i] {
        return;
    }
    target.add(i, color, coverage);
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
