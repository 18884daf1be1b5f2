use super::*;
use crate::field::particles::ParticleFieldConfig;
use crate::field::starfield::StarfieldConfig;
use crate::field::wave::WaveSurfaceConfig;
use crate::foundation::core::{Canvas, Vec2};
use crate::scene::stage::ToneMapping;

fn small_config() -> BackdropConfig {
    BackdropConfig {
        canvas: Canvas {
            width: 64,
            height: 36,
        },
        wave: WaveSurfaceConfig {
            segments: [8, 8],
            ..WaveSurfaceConfig::default()
        },
        galaxy: ParticleFieldConfig {
            count: 200,
            ..ParticleFieldConfig::galaxy()
        },
        shell: Some(ParticleFieldConfig {
            count: 50,
            ..ParticleFieldConfig::shell()
        }),
        starfield: StarfieldConfig {
            count: 100,
            ..StarfieldConfig::default()
        },
        ..BackdropConfig::default()
    }
}

fn stage_for(cfg: &BackdropConfig) -> Stage {
    Stage::new(cfg.canvas)
}

#[test]
fn mounts_live_scene_and_advances() {
    let cfg = small_config();
    let mut stage = stage_for(&cfg);
    let mut backdrop = Backdrop::mount(cfg, &mut stage).unwrap();
    assert!(backdrop.is_live());
    assert_eq!(stage.tone_mapping, ToneMapping::AcesFilmic);
    assert!(stage.fog.is_some());

    let outcome = backdrop
        .tick(&stage, &Tick::new(0.5, Vec2::new(0.1, 0.2)))
        .unwrap();
    assert_eq!(outcome, TickOutcome::Advanced);

    let BackdropView::Live(view) = backdrop.view() else {
        panic!("expected live view");
    };
    assert_eq!(view.fields.len(), 2);
    assert_eq!(view.fields[0].points.len(), 200);
    assert_eq!(view.fields[1].points.len(), 50);
    assert_eq!(view.mesh.vertex_count(), 81);
}

#[test]
fn unavailable_stage_falls_back_to_starfield() {
    let cfg = small_config();
    let mut stage = Stage::unavailable(cfg.canvas);
    let mut backdrop = Backdrop::mount(cfg, &mut stage).unwrap();
    assert!(backdrop.is_placeholder());
    assert!(stage.fog.is_none());
    assert_eq!(stage.tone_mapping, ToneMapping::None);

    stage.resume();
    assert_eq!(
        backdrop.tick(&stage, &Tick::at(1.0)).unwrap(),
        TickOutcome::Static
    );
    let BackdropView::Placeholder(stars) = backdrop.view() else {
        panic!("expected placeholder");
    };
    assert_eq!(stars.len(), 100);
}

#[test]
fn failed_allocation_rolls_back_partial_mount() {
    let mut cfg = small_config();
    cfg.galaxy.count = usize::MAX / 4;
    let mut stage = stage_for(&cfg);
    stage.exposure = 0.9;
    let backdrop = Backdrop::mount(cfg, &mut stage).unwrap();
    assert!(backdrop.is_placeholder());
    assert!(stage.fog.is_none());
    assert!(stage.background.is_none());
    assert_eq!(stage.exposure, 0.9);
}

#[test]
fn placeholder_survives_an_ungeneratable_starfield() {
    let mut cfg = small_config();
    cfg.starfield.count = usize::MAX;
    assert!(placeholder_stars(&cfg).is_empty());

    cfg.starfield.count = 100;
    assert_eq!(placeholder_stars(&cfg).len(), 100);
}

#[test]
fn oversized_starfield_is_a_config_error() {
    let mut cfg = small_config();
    cfg.starfield.count = usize::MAX;
    let mut stage = Stage::unavailable(cfg.canvas);
    let err = Backdrop::mount(cfg, &mut stage).unwrap_err();
    assert!(matches!(err, NebulaError::Validation(_)));
}

#[test]
fn suspended_stage_skips_without_touching_buffers() {
    let cfg = small_config();
    let mut stage = stage_for(&cfg);
    let mut backdrop = Backdrop::mount(cfg, &mut stage).unwrap();
    backdrop.tick(&stage, &Tick::at(1.0)).unwrap();
    let before = match backdrop.view() {
        BackdropView::Live(v) => (v.mesh.clone(), v.fields[0].points.clone()),
        _ => panic!("expected live view"),
    };

    stage.suspend();
    assert_eq!(
        backdrop.tick(&stage, &Tick::at(2.0)).unwrap(),
        TickOutcome::Skipped
    );
    let BackdropView::Live(after) = backdrop.view() else {
        panic!("expected live view");
    };
    assert_eq!(after.mesh, &before.0);
    assert_eq!(after.fields[0].points, &before.1);
}

#[test]
fn unmount_restores_stage_and_rejects_ticks() {
    let cfg = small_config();
    let mut stage = stage_for(&cfg);
    let mut backdrop = Backdrop::mount(cfg, &mut stage).unwrap();
    backdrop.tick(&stage, &Tick::at(0.1)).unwrap();

    backdrop.unmount(&mut stage);
    backdrop.unmount(&mut stage);
    assert!(backdrop.is_unmounted());
    assert!(stage.fog.is_none());
    assert!(stage.background.is_none());
    assert_eq!(stage.tone_mapping, ToneMapping::None);
    assert_eq!(stage.exposure, 1.0);

    let err = backdrop.tick(&stage, &Tick::at(0.2)).unwrap_err();
    assert!(matches!(err, NebulaError::Disposed(_)));
    assert!(matches!(backdrop.view(), BackdropView::Unmounted));
}

#[test]
fn invalid_config_is_not_masked_by_fallback() {
    let mut cfg = small_config();
    cfg.wave.segments = [0, 0];
    let mut stage = stage_for(&cfg);
    let err = Backdrop::mount(cfg, &mut stage).unwrap_err();
    assert!(matches!(err, NebulaError::Validation(_)));
}

#[test]
fn shell_is_optional() {
    let mut cfg = small_config();
    cfg.shell = None;
    let mut stage = stage_for(&cfg);
    let backdrop = Backdrop::mount(cfg, &mut stage).unwrap();
    let BackdropView::Live(view) = backdrop.view() else {
        panic!("expected live view");
    };
    assert_eq!(view.fields.len(), 1);
}
