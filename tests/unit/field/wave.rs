use super::*;
use crate::foundation::core::Canvas;

fn small(parallel: bool) -> WaveSurface {
    WaveSurface::new(WaveSurfaceConfig {
        segments: [16, 12],
        parallel,
        ..WaveSurfaceConfig::default()
    })
}

fn stage() -> Stage {
    Stage::new(Canvas {
        width: 32,
        height: 32,
    })
}

#[test]
fn mesh_matches_plane_layout() {
    let wave = small(false);
    let mesh = wave.initialize(&mut stage()).unwrap();
    assert_eq!(mesh.columns(), 17);
    assert_eq!(mesh.rows(), 13);
    assert_eq!(mesh.vertex_count(), 17 * 13);
    assert_eq!(mesh.elevation().len(), mesh.vertex_count());
    assert_eq!(mesh.colors().len(), mesh.vertex_count());
    assert_eq!(mesh.triangles().len(), 16 * 12 * 2);
    assert_eq!(mesh.elevation_bytes().len(), mesh.vertex_count() * 4);

    assert_eq!(mesh.base()[0], Vec2::new(-20.0, 20.0));
    assert_eq!(mesh.uvs()[0], Vec2::new(0.0, 1.0));
    let last = mesh.vertex_count() - 1;
    assert!(mesh.base()[last].abs_diff_eq(Vec2::new(20.0, -20.0), 1e-5));
    assert_eq!(mesh.uvs()[last], Vec2::new(1.0, 0.0));

    assert_eq!(mesh.triangles()[0], [0, 17, 1]);
    assert_eq!(mesh.triangles()[1], [17, 18, 1]);
    let max = mesh.vertex_count() as u32;
    assert!(mesh.triangles().iter().flatten().all(|&i| i < max));
}

#[test]
fn elevation_is_continuous_in_time() {
    let wave = WaveSurface::new(WaveSurfaceConfig::default());
    let pointer = Vec2::new(0.3, -0.2);
    for pos in [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.5, -0.5),
        Vec2::new(-12.3, 7.7),
        Vec2::new(19.0, 19.0),
    ] {
        for t in [0.0f32, 0.37, 5.0, 41.2] {
            let a = wave.elevation(pos, &Tick::new(t, pointer));
            let b = wave.elevation(pos, &Tick::new(t + 1e-3, pointer));
            assert!((a - b).abs() < 0.05, "pos {pos:?} t {t}: {a} vs {b}");
        }
    }
}

#[test]
fn ripple_amplitude_strictly_decreases_with_distance() {
    let ripple = Ripple::default();
    let mut prev = ripple.amplitude(0.0);
    for step in 1..500 {
        let a = ripple.amplitude(step as f32 * 0.1);
        assert!(a < prev);
        prev = a;
    }
}

#[test]
fn ripple_is_bounded_by_its_envelope_around_the_pointer() {
    let wave = small(false);
    let tick = Tick::new(2.5, Vec2::new(-0.4, 0.6));
    let center = wave.ripple_center(tick.pointer);
    assert!(center.abs_diff_eq(Vec2::new(-2.0, 3.0), 1e-5));
    for k in 0..200 {
        let offset = Vec2::new(k as f32 * 0.07, -(k as f32) * 0.03);
        let h = wave.ripple(center + offset, &tick);
        assert!(h.abs() <= wave.config().ripple.amplitude(offset.length()) + 1e-6);
    }
}

#[test]
fn noise_height_ignores_pointer() {
    let wave = small(false);
    let pos = Vec2::new(3.0, -4.0);
    let a = wave.elevation(pos, &Tick::new(1.0, Vec2::new(0.9, 0.9)));
    let b = wave.elevation(pos, &Tick::new(1.0, Vec2::new(-0.9, -0.9)));
    let noise = wave.noise_height(pos, 1.0);
    assert!((a - noise - wave.ripple(pos, &Tick::new(1.0, Vec2::new(0.9, 0.9)))).abs() < 1e-6);
    assert_ne!(a, b);
}

#[test]
fn parallel_rows_match_sequential() {
    let seq = small(false);
    let par = small(true);
    let mut st = stage();
    let mut a = seq.initialize(&mut st).unwrap();
    let mut b = par.initialize(&mut st).unwrap();
    for f in 0..5 {
        let tick = Tick::new(f as f32 * 0.4, Vec2::new(0.1 * f as f32, -0.2));
        seq.advance(&mut a, &tick);
        par.advance(&mut b, &tick);
        assert_eq!(a, b);
    }
}

#[test]
fn advance_is_pure_in_tick() {
    let wave = small(false);
    let mut st = stage();
    let mut a = wave.initialize(&mut st).unwrap();
    let mut b = a.clone();
    wave.advance(&mut a, &Tick::at(9.0));
    wave.advance(&mut a, &Tick::at(3.0));
    wave.advance(&mut b, &Tick::at(3.0));
    assert_eq!(a, b);
}

#[test]
fn shade_mixes_by_elevation_and_stays_finite() {
    let wave = small(false);
    let low = wave.shade(Vec2::new(0.013, 0.021), -0.2, 0.0);
    let high = wave.shade(Vec2::new(0.013, 0.021), 0.2, 0.0);
    assert!(low.is_finite() && high.is_finite());
    // Higher elevation moves toward the cyan end and adds glow.
    assert!(high.g > low.g);
    for e in [-3.0f32, -0.5, 0.0, 0.5, 3.0] {
        assert!(wave.shade(Vec2::new(0.5, 0.5), e, 7.0).is_finite());
    }
}

#[test]
fn mount_requires_available_stage() {
    let mut st = Stage::unavailable(Canvas {
        width: 8,
        height: 8,
    });
    let err = small(false).initialize(&mut st).unwrap_err();
    assert!(matches!(err, NebulaError::ContextUnavailable(_)));
}

#[test]
fn validation_rejects_degenerate_grids() {
    let bad = WaveSurfaceConfig {
        segments: [0, 4],
        ..WaveSurfaceConfig::default()
    };
    assert!(bad.validate().is_err());

    let bad = WaveSurfaceConfig {
        size: [40.0, -1.0],
        ..WaveSurfaceConfig::default()
    };
    assert!(bad.validate().is_err());

    let bad = WaveSurfaceConfig {
        segments: [100_000, 100_000],
        ..WaveSurfaceConfig::default()
    };
    assert!(bad.validate().is_err());

    assert!(WaveSurfaceConfig::default().validate().is_ok());
}
