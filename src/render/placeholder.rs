//! Static starfield drawn with `vello_cpu` as filled discs.

use vello_cpu::kurbo::Shape;

use crate::field::starfield::Starfield;
use crate::foundation::core::{Point, Rgb, linear_to_srgb};
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::render::backend::FrameRGBA;
use crate::render::camera::Camera;

/// Smallest disc radius in pixels, so distant stars stay visible.
const MIN_RADIUS_PX: f64 = 0.5;

/// Rasterize `stars` seen through `camera` onto a `width`×`height` frame.
///
/// `clear` is the linear background color, `None` for a transparent canvas.
pub fn draw_starfield(
    stars: &Starfield,
    camera: &Camera,
    width: u32,
    height: u32,
    clear: Option<Rgb>,
) -> NebulaResult<FrameRGBA> {
    let width_u16: u16 = width
        .try_into()
        .map_err(|_| NebulaError::render("placeholder width exceeds u16"))?;
    let height_u16: u16 = height
        .try_into()
        .map_err(|_| NebulaError::render("placeholder height exceeds u16"))?;

    let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
    let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);

    if let Some(bg) = clear {
        ctx.set_paint(color_to_cpu(bg, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
    }

    ctx.set_paint(color_to_cpu(Rgb::WHITE, 255));
    for star in stars.stars() {
        let Some(p) = camera.project(star.position) else {
            continue;
        };
        let radius = f64::from(star.size * camera.point_scale() / p.depth * 0.5);
        let radius = radius.max(MIN_RADIUS_PX);
        let center = Point::new(f64::from(p.pixel.x), f64::from(p.pixel.y));
        let disc = vello_cpu::kurbo::Circle::new(point_to_cpu(center), radius);
        ctx.fill_path(&disc.to_path(0.1));
    }

    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    Ok(FrameRGBA {
        width,
        height,
        data: pixmap.data_as_u8_slice().to_vec(),
        premultiplied: true,
    })
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn color_to_cpu(c: Rgb, a: u8) -> vello_cpu::peniko::Color {
    let encode = |v: f32| (linear_to_srgb(v) * 255.0).round() as u8;
    vello_cpu::peniko::Color::from_rgba8(encode(c.r), encode(c.g), encode(c.b), a)
}
