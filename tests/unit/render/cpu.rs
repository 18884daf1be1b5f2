use super::*;
use crate::field::particles::ParticleFieldConfig;
use crate::field::starfield::StarfieldConfig;
use crate::field::wave::WaveSurfaceConfig;
use crate::foundation::core::Canvas;
use crate::scene::config::BackdropConfig;

fn small_config() -> BackdropConfig {
    BackdropConfig {
        canvas: Canvas {
            width: 48,
            height: 32,
        },
        wave: WaveSurfaceConfig {
            segments: [12, 12],
            ..WaveSurfaceConfig::default()
        },
        galaxy: ParticleFieldConfig {
            count: 300,
            ..ParticleFieldConfig::galaxy()
        },
        shell: Some(ParticleFieldConfig {
            count: 60,
            ..ParticleFieldConfig::shell()
        }),
        starfield: StarfieldConfig {
            count: 400,
            ..StarfieldConfig::default()
        },
        ..BackdropConfig::default()
    }
}

fn live_frame(settings: RenderSettings, t: f32) -> FrameRGBA {
    let cfg = small_config();
    let mut stage = Stage::new(cfg.canvas);
    let mut backdrop = Backdrop::mount(cfg, &mut stage).unwrap();
    let tick = Tick::new(t, Vec2::new(0.2, -0.1));
    backdrop.tick(&stage, &tick).unwrap();
    CpuBackend::new(settings).render(&backdrop, &stage, &tick).unwrap()
}

fn projected(x: f32, y: f32, depth: f32) -> Projected {
    Projected {
        pixel: Vec2::new(x, y),
        depth,
    }
}

#[test]
fn live_render_is_opaque_in_dark_mode() {
    let frame = live_frame(RenderSettings { opaque_clear: true }, 1.0);
    assert_eq!((frame.width, frame.height), (48, 32));
    assert_eq!(frame.data.len(), 48 * 32 * 4);
    assert!(frame.premultiplied);
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn live_render_is_translucent_in_light_mode() {
    let frame = live_frame(RenderSettings { opaque_clear: false }, 1.0);
    assert!(frame.data.chunks_exact(4).any(|px| px[3] < 255));
    for px in frame.data.chunks_exact(4) {
        assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
    }
}

#[test]
fn identical_inputs_render_identical_bytes() {
    let a = live_frame(RenderSettings::default(), 2.5);
    let b = live_frame(RenderSettings::default(), 2.5);
    assert_eq!(a, b);
    let c = live_frame(RenderSettings::default(), 3.5);
    assert_ne!(a.data, c.data);
}

#[test]
fn placeholder_renders_stars_over_background() {
    let cfg = small_config();
    let mut stage = Stage::unavailable(cfg.canvas);
    let backdrop = Backdrop::mount(cfg, &mut stage).unwrap();
    assert!(backdrop.is_placeholder());

    let mut cpu = CpuBackend::new(RenderSettings { opaque_clear: true });
    let frame = cpu.render(&backdrop, &stage, &Tick::at(0.0)).unwrap();
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
    let bg = frame.pixel(0, 0).unwrap();
    assert!(frame.data.chunks_exact(4).any(|px| px[0] > bg[0]));

    let mut cpu = CpuBackend::new(RenderSettings { opaque_clear: false });
    let frame = cpu.render(&backdrop, &stage, &Tick::at(0.0)).unwrap();
    assert!(frame.data.chunks_exact(4).any(|px| px[3] == 0));
    assert!(frame.data.chunks_exact(4).any(|px| px[3] > 0));
}

#[test]
fn unmounted_backdrop_cannot_render() {
    let cfg = small_config();
    let mut stage = Stage::new(cfg.canvas);
    let mut backdrop = Backdrop::mount(cfg, &mut stage).unwrap();
    backdrop.unmount(&mut stage);
    let err = CpuBackend::new(RenderSettings::default())
        .render(&backdrop, &stage, &Tick::at(0.0))
        .unwrap_err();
    assert!(matches!(err, NebulaError::Disposed(_)));
}

#[test]
fn triangles_are_double_sided() {
    let mut cw = HdrTarget::new(8, 8).unwrap();
    let mut ccw = HdrTarget::new(8, 8).unwrap();
    let a = projected(0.0, 0.0, 5.0);
    let b = projected(8.0, 0.0, 5.0);
    let c = projected(0.0, 8.0, 5.0);
    let colors = [Vec3::ONE; 3];
    raster_triangle(&mut cw, [a, b, c], colors, 1.0, None);
    raster_triangle(&mut ccw, [a, c, b], colors, 1.0, None);
    assert_eq!(cw.alpha, ccw.alpha);
    assert!(cw.alpha.iter().filter(|a| **a > 0.0).count() >= 28);
    assert_eq!(cw.alpha[cw.index(7, 7)], 0.0);
}

#[test]
fn nearer_surface_wins_depth_test() {
    let mut t = HdrTarget::new(4, 4).unwrap();
    let tri = |d: f32| {
        [
            projected(-1.0, -1.0, d),
            projected(9.0, -1.0, d),
            projected(-1.0, 9.0, d),
        ]
    };
    raster_triangle(&mut t, tri(2.0), [Vec3::X; 3], 1.0, None);
    raster_triangle(&mut t, tri(3.0), [Vec3::Y; 3], 1.0, None);
    assert_eq!(t.color[0], Vec3::X);
    assert!((t.depth[0] - 2.0).abs() < 1e-5);
}

#[test]
fn points_add_light_but_respect_depth() {
    let mut t = HdrTarget::new(4, 4).unwrap();
    let covered = t.index(1, 1);
    t.depth[covered] = 1.0;
    splat(&mut t, projected(1.5, 1.5, 2.0), 0.3, Vec3::ONE, 1.0);
    assert_eq!(t.color[covered], Vec3::ZERO);

    splat(&mut t, projected(2.5, 2.5, 2.0), 1.0, Vec3::ONE, 1.0);
    splat(&mut t, projected(2.5, 2.5, 2.0), 1.0, Vec3::ONE, 1.0);
    let i = t.index(2, 2);
    assert_eq!(t.color[i], Vec3::splat(2.0));
    assert_eq!(t.alpha[i], 1.0);
    assert_eq!(t.depth[i], f32::INFINITY);
}

#[test]
fn fog_pulls_distant_fragments_toward_fog_color() {
    let fog = FogExp2 {
        color: Rgb::new(0.0, 0.0, 1.0),
        density: 0.1,
    };
    let near = fogged(Vec3::X, Some(&fog), 0.1);
    let far = fogged(Vec3::X, Some(&fog), 100.0);
    assert!(near.x > 0.99);
    assert!(far.z > 0.99);
    assert_eq!(fogged(Vec3::X, None, 100.0), Vec3::X);
}
